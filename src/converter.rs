//! Markdown converter - transforms CMS document bodies to Markdown
//!
//! This module provides the core conversion logic for turning a document
//! body into Markdown. A body arrives in one of two authoring formats:
//!
//! - **Block content**: a sequence of typed content blocks. Each known
//!   block kind (paragraph, heading, list, image, code) has a dedicated
//!   handler; unknown kinds fall back to a stripped-text rendering so no
//!   block can drop content.
//! - **Raw HTML**: classic content, converted through an ordered chain of
//!   text-transform passes.
//!
//! # Pass Ordering
//!
//! The HTML path runs a fixed sequence of passes. The ordering is a hard
//! contract - code protection must come first and placeholder restoration
//! last, so tag stripping and entity decoding can never corrupt code:
//!
//! 1. Protect pre-existing Markdown fences behind placeholder tokens
//! 2. Convert `<pre>`/`<code>` blocks to fenced blocks (as placeholders)
//! 3. Convert inline `<code>` spans (as placeholders)
//! 4. Convert headings `<h1>`-`<h6>`, preserving the numeric level
//! 5. Convert links
//! 6. Convert strong/em emphasis
//! 7. Convert list items to `- ` bullets (ordered lists degrade to
//!    bullets; numbering is not reproduced)
//! 8. Strip all remaining markup
//! 9. Decode HTML entities in the surviving text
//! 10. Restore placeholder tokens with their protected content
//!
//! Placeholder tokens are delimited by the C0 control characters STX and
//! ETX, which cannot appear in CMS content, so passes 3-9 never touch
//! them. The placeholder map lives on the stack of a single `convert`
//! call; the converter itself holds no state and may be shared freely
//! across concurrent requests.
//!
//! # Determinism
//!
//! Conversion is a pure function of the document: identical input yields
//! byte-identical Markdown, which is what makes modification-time keyed
//! caching and ETag generation sound.

use crate::document::{Body, ContentBlock, Document};
use crate::fence;
use crate::sanitize::{self, regex_cached};
use regex::{Captures, Regex};
use std::sync::OnceLock;

/// Start delimiter for placeholder tokens (ASCII STX)
const TOKEN_OPEN: char = '\u{2}';
/// End delimiter for placeholder tokens (ASCII ETX)
const TOKEN_CLOSE: char = '\u{3}';

/// Call-local store of protected code fragments
///
/// Tokens are generated from a monotonically increasing index, so they
/// are unique within one conversion pass by construction.
struct PlaceholderMap {
    entries: Vec<String>,
}

impl PlaceholderMap {
    fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Store `content` and return the token that stands in for it
    fn protect(&mut self, content: String) -> String {
        let token = format!("{TOKEN_OPEN}md-code:{}{TOKEN_CLOSE}", self.entries.len());
        self.entries.push(content);
        token
    }

    /// Replace every token in `text` with its stored content
    ///
    /// An unresolvable token is an internal defect; it is left in place
    /// and logged rather than failing the conversion, so a response is
    /// always produced.
    fn restore(&self, text: &str) -> String {
        static TOKEN: OnceLock<Option<Regex>> = OnceLock::new();
        let Some(re) = regex_cached(&TOKEN, "\u{2}md-code:([0-9]+)\u{3}") else {
            return text.to_string();
        };
        re.replace_all(text, |caps: &Captures<'_>| {
            let entry = caps[1]
                .parse::<usize>()
                .ok()
                .and_then(|idx| self.entries.get(idx));
            match entry {
                Some(content) => content.clone(),
                None => {
                    log::warn!("unresolved code placeholder index {}", &caps[1]);
                    caps[0].to_string()
                }
            }
        })
        .into_owned()
    }
}

/// Converts document bodies to Markdown
///
/// Stateless; construct once and share, or construct per call - both are
/// equivalent.
#[derive(Debug, Default, Clone, Copy)]
pub struct MarkdownConverter;

impl MarkdownConverter {
    pub fn new() -> Self {
        Self
    }

    /// Convert a document body to Markdown
    ///
    /// Dispatches on the body's authoring format and trims the result.
    /// Never fails: malformed markup degrades to stripped text.
    pub fn convert(&self, document: &Document) -> String {
        let body = match &document.body {
            Body::Blocks(blocks) => self.convert_blocks(blocks),
            Body::Html(html) => self.convert_html(html),
        };
        body.trim().to_string()
    }

    /// Convert a block sequence, one handler per block kind
    fn convert_blocks(&self, blocks: &[ContentBlock]) -> String {
        let mut out = String::new();
        for block in blocks {
            match block {
                ContentBlock::Paragraph { html } => {
                    out.push_str(&block_text(html));
                    out.push_str("\n\n");
                }
                ContentBlock::Heading { level, html } => {
                    let level = usize::from(level.unwrap_or(2).clamp(1, 6));
                    out.push_str(&"#".repeat(level));
                    out.push(' ');
                    out.push_str(&sanitize::collapse_whitespace(&block_text(html)));
                    out.push_str("\n\n");
                }
                ContentBlock::List { html } => {
                    out.push_str(self.convert_html(html).trim_end());
                    out.push_str("\n\n");
                }
                ContentBlock::Image { url, alt } => {
                    out.push_str(&format!("![{alt}]({url})\n\n"));
                }
                ContentBlock::Code { html } => {
                    let code = block_text(html);
                    let code = code.trim_matches('\n');
                    out.push_str(&fence::fenced_block(code, None));
                    out.push_str("\n\n");
                }
                ContentBlock::Generic { name, html } => {
                    log::debug!("generic fallback rendering for block type {name}");
                    out.push_str(&block_text(html));
                    out.push_str("\n\n");
                }
            }
        }
        out
    }

    /// Convert raw HTML through the ordered pass chain
    pub fn convert_html(&self, html: &str) -> String {
        let mut map = PlaceholderMap::new();
        let mut text = protect_existing_fences(html, &mut map);
        text = convert_pre_blocks(&text, &mut map);
        text = convert_inline_code(&text, &mut map);
        text = convert_headings(&text);
        text = convert_links(&text);
        text = convert_emphasis(&text);
        text = convert_list_items(&text);
        text = sanitize::strip_tags(&text);
        text = sanitize::decode_entities(&text);
        text = sanitize::collapse_blank_lines(&text);
        map.restore(&text)
    }
}

/// Strip markup from block inner HTML, then decode entities
///
/// Stripping runs first so once-escaped markup in the source (`&lt;b&gt;`)
/// survives as literal text instead of being re-parsed as a tag.
fn block_text(html: &str) -> String {
    sanitize::decode_entities(&sanitize::strip_tags(html))
        .trim()
        .to_string()
}

/// Length of the leading backtick run of `line`
fn leading_backticks(line: &str) -> usize {
    line.chars().take_while(|&c| c == '`').count()
}

/// Pass 1: move pre-existing Markdown fences into the placeholder map
///
/// Scans line-by-line: a line opening with three or more backticks
/// (optionally followed by a language tag) starts a protected region that
/// ends at the next backtick-only line with a run at least as long. An
/// unterminated fence is left in the text untouched.
fn protect_existing_fences(text: &str, map: &mut PlaceholderMap) -> String {
    if !text.contains("```") {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    let mut block = String::new();
    let mut open_len = 0usize;
    for line in text.split_inclusive('\n') {
        let bare = line.trim();
        let run = leading_backticks(bare);
        if open_len == 0 {
            if run >= 3 {
                open_len = run;
                block.clear();
                block.push_str(line);
            } else {
                out.push_str(line);
            }
        } else {
            block.push_str(line);
            // closing fence: backticks only, run at least the opening length
            if run >= open_len && bare.chars().all(|c| c == '`') {
                let had_newline = block.ends_with('\n');
                let protected = block.trim_end_matches('\n').to_string();
                out.push_str(&map.protect(protected));
                if had_newline {
                    out.push('\n');
                }
                open_len = 0;
            }
        }
    }
    if open_len != 0 {
        out.push_str(&block);
    }
    out
}

/// Pass 2: `<pre>` blocks (with or without nested `<code>`) to fences
///
/// Entities inside the code text are decoded, trailing newlines trimmed,
/// and the fence length chosen to exceed the longest embedded backtick
/// run. The result goes into the placeholder map so later passes cannot
/// touch it.
fn convert_pre_blocks(text: &str, map: &mut PlaceholderMap) -> String {
    static PRE: OnceLock<Option<Regex>> = OnceLock::new();
    let Some(re) = regex_cached(
        &PRE,
        r"(?is)<pre([^>]*)>\s*(?:<code([^>]*)>)?(.*?)(?:</code>)?\s*</pre>",
    ) else {
        return text.to_string();
    };
    re.replace_all(text, |caps: &Captures<'_>| {
        let pre_attrs = caps.get(1).map_or("", |m| m.as_str());
        let code_attrs = caps.get(2).map_or("", |m| m.as_str());
        let code = sanitize::decode_entities(caps.get(3).map_or("", |m| m.as_str()));
        let code = code.trim_end_matches('\n');
        let language = language_from_attrs(code_attrs).or_else(|| language_from_attrs(pre_attrs));
        map.protect(fence::fenced_block(code, language.as_deref()))
    })
    .into_owned()
}

/// Extract a `language-*`/`lang-*` class value, case-insensitive
fn language_from_attrs(attrs: &str) -> Option<String> {
    static CLASS: OnceLock<Option<Regex>> = OnceLock::new();
    let re = regex_cached(
        &CLASS,
        r#"(?is)class\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s>'"]+))"#,
    )?;
    let caps = re.captures(attrs)?;
    let classes = caps
        .get(1)
        .or_else(|| caps.get(2))
        .or_else(|| caps.get(3))?
        .as_str();
    for class in classes.split_whitespace() {
        let class = class.to_ascii_lowercase();
        if let Some(lang) = class
            .strip_prefix("language-")
            .or_else(|| class.strip_prefix("lang-"))
            && !lang.is_empty()
        {
            return Some(lang.to_string());
        }
    }
    None
}

/// Pass 3: inline `<code>` spans not consumed by the `<pre>` pass
///
/// The wrapped result goes into the placeholder map: entity decoding can
/// surface literal angle brackets inside the span, and those must not
/// look like markup to the later stripping pass.
fn convert_inline_code(text: &str, map: &mut PlaceholderMap) -> String {
    static CODE: OnceLock<Option<Regex>> = OnceLock::new();
    let Some(re) = regex_cached(&CODE, r"(?is)<code[^>]*>(.*?)</code\s*>") else {
        return text.to_string();
    };
    re.replace_all(text, |caps: &Captures<'_>| {
        map.protect(fence::inline_code(&sanitize::decode_entities(&caps[1])))
    })
    .into_owned()
}

/// Pass 4: headings, preserving the numeric level 1-6
fn convert_headings(text: &str) -> String {
    static HEADING: OnceLock<Option<Regex>> = OnceLock::new();
    let Some(re) = regex_cached(&HEADING, r"(?is)<h([1-6])[^>]*>(.*?)</h[1-6]\s*>") else {
        return text.to_string();
    };
    re.replace_all(text, |caps: &Captures<'_>| {
        let level: usize = caps[1].parse().unwrap_or(2);
        let inner = sanitize::collapse_whitespace(&caps[2]);
        format!("\n\n{} {}\n\n", "#".repeat(level), inner)
    })
    .into_owned()
}

/// Pass 5: anchors to `[text](url)`; attribute order and quoting vary
fn convert_links(text: &str) -> String {
    static LINK: OnceLock<Option<Regex>> = OnceLock::new();
    let Some(re) = regex_cached(
        &LINK,
        r#"(?is)<a\b[^>]*?href\s*=\s*(?:"([^"]*)"|'([^']*)')[^>]*>(.*?)</a\s*>"#,
    ) else {
        return text.to_string();
    };
    re.replace_all(text, |caps: &Captures<'_>| {
        let url = caps
            .get(1)
            .or_else(|| caps.get(2))
            .map_or("", |m| m.as_str());
        let label = sanitize::collapse_whitespace(&caps[3]);
        format!("[{label}]({url})")
    })
    .into_owned()
}

/// Pass 6: strong/b to `**text**`, em/i to `*text*`
fn convert_emphasis(text: &str) -> String {
    static STRONG: OnceLock<Option<Regex>> = OnceLock::new();
    static BOLD: OnceLock<Option<Regex>> = OnceLock::new();
    static EM: OnceLock<Option<Regex>> = OnceLock::new();
    static ITALIC: OnceLock<Option<Regex>> = OnceLock::new();

    let mut out = text.to_string();
    for (cell, pattern, wrap) in [
        (&STRONG, r"(?is)<strong\b[^>]*>(.*?)</strong\s*>", "**"),
        (&BOLD, r"(?is)<b\b[^>]*>(.*?)</b\s*>", "**"),
        (&EM, r"(?is)<em\b[^>]*>(.*?)</em\s*>", "*"),
        (&ITALIC, r"(?is)<i\b[^>]*>(.*?)</i\s*>", "*"),
    ] {
        if let Some(re) = regex_cached(cell, pattern) {
            out = re
                .replace_all(&out, |caps: &Captures<'_>| {
                    format!("{wrap}{}{wrap}", &caps[1])
                })
                .into_owned();
        }
    }
    out
}

/// Pass 7: list items to `- ` bullets; enclosing ul/ol tags are dropped
///
/// Ordered-list numbering is not reproduced - every item becomes an
/// unordered bullet.
fn convert_list_items(text: &str) -> String {
    static ITEM: OnceLock<Option<Regex>> = OnceLock::new();
    static WRAPPER: OnceLock<Option<Regex>> = OnceLock::new();

    let mut out = text.to_string();
    if let Some(re) = regex_cached(&ITEM, r"(?is)<li[^>]*>(.*?)</li\s*>") {
        out = re
            .replace_all(&out, |caps: &Captures<'_>| {
                format!("- {}\n", sanitize::collapse_whitespace(&caps[1]))
            })
            .into_owned();
    }
    if let Some(re) = regex_cached(&WRAPPER, r"(?is)</?(?:ul|ol)[^>]*>") {
        out = re.replace_all(&out, "").into_owned();
    }
    out
}
