//! YAML front matter generation from document metadata
//!
//! Every generated Markdown document opens with a `---` delimited YAML
//! header. Field order is fixed so output stays byte-stable across
//! regenerations: title, date, author, permalink, categories, tags, then
//! the optional featured image pair and description.
//!
//! All scalar values are emitted as double-quoted strings with internal
//! backslashes and double quotes escaped, and lists as inline sequences
//! of quoted strings, so the header always parses as YAML regardless of
//! what the author typed into a title or tag.

use crate::document::{Body, ContentBlock, Document};
use crate::sanitize;

/// Character budget for a derived description
const DESCRIPTION_MAX_CHARS: usize = 160;
/// Truncation point leaving room for the trailing ellipsis
const DESCRIPTION_TRUNCATE_AT: usize = 157;

/// Quote a string for a YAML value position
///
/// Backslashes are escaped before quotes so the escaping itself cannot be
/// re-interpreted.
pub fn quote(value: &str) -> String {
    format!(
        "\"{}\"",
        value.replace('\\', "\\\\").replace('"', "\\\"")
    )
}

/// Render a list value as an inline YAML sequence of quoted strings
fn quote_list(values: &[String]) -> String {
    if values.is_empty() {
        return "[]".to_string();
    }
    let quoted: Vec<String> = values.iter().map(|v| quote(v)).collect();
    format!("[ {} ]", quoted.join(", "))
}

/// Build the complete front matter header for `document`
///
/// Returns the `---` delimited block including a trailing blank line, so
/// callers can append the body Markdown directly.
pub fn build(document: &Document) -> String {
    let mut out = String::from("---\n");
    out.push_str(&format!("title: {}\n", quote(&document.title)));
    out.push_str(&format!("date: {}\n", quote(&document.date)));
    out.push_str(&format!("author: {}\n", quote(&document.author)));
    out.push_str(&format!("permalink: {}\n", quote(&document.permalink)));
    out.push_str(&format!("categories: {}\n", quote_list(&document.categories)));
    out.push_str(&format!("tags: {}\n", quote_list(&document.tags)));
    if let Some(image) = featured_image(document) {
        out.push_str(&format!("featured_image: {}\n", quote(image)));
        if let Some(alt) = &document.featured_image_alt {
            out.push_str(&format!("featured_image_alt: {}\n", quote(alt)));
        }
    }
    if let Some(description) = derive_description(document) {
        out.push_str(&format!("description: {}\n", quote(&description)));
    }
    out.push_str("---\n\n");
    out
}

/// The document's featured image URL, when one resolves to a usable value
pub fn featured_image(document: &Document) -> Option<&str> {
    document
        .featured_image
        .as_deref()
        .filter(|url| !url.trim().is_empty())
}

/// Derive the description field value
///
/// An explicit excerpt wins. Otherwise the body text is cleaned down to a
/// single line and truncated with an ellipsis when it exceeds the
/// 160-character budget. An empty result means the field is omitted.
pub fn derive_description(document: &Document) -> Option<String> {
    if let Some(excerpt) = &document.excerpt {
        let cleaned = sanitize::clean_text(excerpt);
        if !cleaned.is_empty() {
            return Some(cleaned);
        }
    }
    let raw = match &document.body {
        Body::Html(html) => html.clone(),
        Body::Blocks(blocks) => blocks
            .iter()
            .map(|block| match block {
                ContentBlock::Paragraph { html }
                | ContentBlock::Heading { html, .. }
                | ContentBlock::List { html }
                | ContentBlock::Code { html }
                | ContentBlock::Generic { html, .. } => html.as_str(),
                ContentBlock::Image { alt, .. } => alt.as_str(),
            })
            .collect::<Vec<_>>()
            .join(" "),
    };
    let cleaned = sanitize::clean_text(&raw);
    if cleaned.is_empty() {
        return None;
    }
    if cleaned.chars().count() > DESCRIPTION_MAX_CHARS {
        let truncated: String = cleaned.chars().take(DESCRIPTION_TRUNCATE_AT).collect();
        Some(format!("{truncated}..."))
    } else {
        Some(cleaned)
    }
}
