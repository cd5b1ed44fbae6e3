//! Document model shared with the host CMS
//!
//! The host owns document storage; this crate only reads documents. A
//! body is either a sequence of typed content blocks (block-editor
//! content) or a raw HTML string (classic content). Timestamps are kept
//! as the host's opaque strings and compared for equality only - the
//! cache never does clock arithmetic on them.

use serde::{Deserialize, Serialize};

/// Host-assigned document identifier
pub type DocumentId = u64;

/// Publish state as reported by the host CMS
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    Published,
    Draft,
    Trash,
    Revision,
}

/// One structured unit of a block-editor body
///
/// The variant set is closed: anything the converter does not recognize
/// arrives as [`ContentBlock::Generic`] and falls back to a stripped-text
/// rendering, so no block type can drop content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Paragraph {
        html: String,
    },
    Heading {
        /// Heading level 1-6; editors may omit it, in which case 2 is used
        level: Option<u8>,
        html: String,
    },
    List {
        html: String,
    },
    Image {
        url: String,
        alt: String,
    },
    Code {
        html: String,
    },
    Generic {
        /// Original block type name, kept for diagnostics
        name: String,
        html: String,
    },
}

/// Document body in either of the host's two authoring formats
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Body {
    Blocks(Vec<ContentBlock>),
    Html(String),
}

/// A rendered CMS document, read-only to this crate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub title: String,
    pub body: Body,
    /// Explicit summary; preferred over a derived description when set
    pub excerpt: Option<String>,
    /// Author display name
    pub author: String,
    /// Publish date/time, host format
    pub date: String,
    /// Last-modified timestamp, host format; staleness is equality on this
    pub modified: String,
    pub permalink: String,
    pub categories: Vec<String>,
    pub tags: Vec<String>,
    pub featured_image: Option<String>,
    pub featured_image_alt: Option<String>,
    pub status: DocumentStatus,
    /// Pinned/sticky flag, surfaced as priority in the content signal
    pub sticky: bool,
    /// Content type tag, e.g. "post" or "page"
    pub doc_type: String,
}
