//! Residual markup stripping and entity decoding
//!
//! These passes run after the structural conversions have replaced the
//! elements they understand. Whatever markup remains carries no Markdown
//! meaning and is removed; HTML entities in the surviving text are then
//! decoded so escaped characters come out as their literal forms.
//!
//! Entity decoding is single-level: `&amp;lt;` decodes to the literal
//! text `&lt;`, not to `<`. This matches what the host CMS produces when
//! it escapes user content once.

use regex::Regex;
use std::sync::OnceLock;

/// Named entities decoded by [`decode_entities`]
///
/// `&amp;` must stay last so already-decoded ampersands are not fed back
/// into the table (single-level decoding).
const NAMED_ENTITIES: &[(&str, &str)] = &[
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&quot;", "\""),
    ("&apos;", "'"),
    ("&nbsp;", " "),
    ("&hellip;", "\u{2026}"),
    ("&ndash;", "\u{2013}"),
    ("&mdash;", "\u{2014}"),
    ("&amp;", "&"),
];

/// Compile-once regex lookup shared by the conversion passes
///
/// Returns `None` when the pattern fails to compile, which callers treat
/// as "skip this pass" so a bad pattern can never take down a request.
pub(crate) fn regex_cached<'a>(
    cell: &'a OnceLock<Option<Regex>>,
    pattern: &str,
) -> Option<&'a Regex> {
    cell.get_or_init(|| Regex::new(pattern).ok()).as_ref()
}

/// Remove all markup from `html`, returning the surviving text
///
/// Script and style elements are dropped together with their contents;
/// every other tag is removed while its inner text is kept.
pub fn strip_tags(html: &str) -> String {
    static CONTAINER: OnceLock<Option<Regex>> = OnceLock::new();
    static TAG: OnceLock<Option<Regex>> = OnceLock::new();

    let mut text = html.to_string();
    if let Some(re) = regex_cached(
        &CONTAINER,
        r"(?is)<script[^>]*>.*?</script>|<style[^>]*>.*?</style>",
    ) {
        text = re.replace_all(&text, "").into_owned();
    }
    if let Some(re) = regex_cached(&TAG, r"(?s)<[^>]*>") {
        text = re.replace_all(&text, "").into_owned();
    }
    text
}

/// Decode numeric and common named HTML entities
pub fn decode_entities(text: &str) -> String {
    static HEX: OnceLock<Option<Regex>> = OnceLock::new();
    static DEC: OnceLock<Option<Regex>> = OnceLock::new();

    let mut out = text.to_string();
    if let Some(re) = regex_cached(&HEX, r"&#[xX]([0-9a-fA-F]{1,6});") {
        out = re
            .replace_all(&out, |caps: &regex::Captures<'_>| {
                decode_code_point(&caps[1], 16).unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned();
    }
    if let Some(re) = regex_cached(&DEC, r"&#([0-9]{1,7});") {
        out = re
            .replace_all(&out, |caps: &regex::Captures<'_>| {
                decode_code_point(&caps[1], 10).unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned();
    }
    for (entity, replacement) in NAMED_ENTITIES {
        out = out.replace(entity, replacement);
    }
    out
}

fn decode_code_point(digits: &str, radix: u32) -> Option<String> {
    let value = u32::from_str_radix(digits, radix).ok()?;
    let ch = char::from_u32(value)?;
    Some(ch.to_string())
}

/// Collapse whitespace runs to single spaces and trim the ends
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Collapse three or more consecutive newlines down to a blank line
///
/// The structural passes each emit their own surrounding blank lines, so
/// adjacent elements can stack up empty runs. Placeholder tokens contain
/// no newlines and pass through untouched.
pub fn collapse_blank_lines(text: &str) -> String {
    static BLANKS: OnceLock<Option<Regex>> = OnceLock::new();
    match regex_cached(&BLANKS, r"\n[ \t]*\n[\s]*\n") {
        Some(re) => re.replace_all(text, "\n\n").into_owned(),
        None => text.to_string(),
    }
}

/// Fully clean `html` down to plain single-line text
///
/// Decodes entities, strips markup, and collapses whitespace. Used for
/// description derivation and the generic block fallback, where the output
/// must be safe to embed in a quoted YAML value or a text paragraph.
pub fn clean_text(html: &str) -> String {
    collapse_whitespace(&strip_tags(&decode_entities(html)))
}
