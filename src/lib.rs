//! CMS Markdown Negotiator
//!
//! This library converts rendered CMS documents (block-editor or raw-HTML
//! bodies) into Markdown with YAML front matter, caches the result keyed
//! by content-modification time, and serves it to clients that ask for a
//! Markdown representation via `Accept: text/markdown`.
//!
//! # Architecture
//!
//! The library is structured into several modules:
//! - `document`: the read-only document model shared with the host CMS
//! - `converter`: block dispatch and the ordered HTML-to-Markdown passes
//! - `fence`: safe backtick-fence allocation for code content
//! - `sanitize`: residual markup stripping and entity decoding
//! - `frontmatter`: YAML front matter assembly with quoting rules
//! - `token_estimator`: heuristic token counts for agent consumers
//! - `etag`: strong ETags over the generated Markdown
//! - `cache`: staleness tracking, bulk sweep, and regeneration policy
//! - `negotiator`: `Accept`-header negotiation and response assembly
//! - `config`: resolved operator configuration, passed in explicitly
//!
//! # Collaborators
//!
//! The host CMS owns document storage, routing, scheduling, and the
//! settings UI. It reaches this crate through three seams: the
//! [`cache::DocumentStore`] trait, the scheduler entry points on
//! [`cache::CachePolicy`], and [`negotiator::Negotiator::negotiate`] on
//! the request path. Everything inside those seams is synchronous, holds
//! no shared mutable state, and is safe to call from concurrent requests.

pub mod cache;
pub mod config;
pub mod converter;
pub mod document;
pub mod error;
pub mod etag;
pub mod fence;
pub mod frontmatter;
pub mod negotiator;
pub mod sanitize;
pub mod token_estimator;

// Re-export main types for convenience
pub use cache::{CachePolicy, CachedArtifact, DocumentStore, SweepStats, SWEEP_PAGE_SIZE};
pub use config::NegotiatorConfig;
pub use converter::MarkdownConverter;
pub use document::{Body, ContentBlock, Document, DocumentId, DocumentStatus};
pub use error::StoreError;
pub use negotiator::{MarkdownRequest, MarkdownResponse, Negotiator, Outcome};
