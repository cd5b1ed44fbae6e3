//! Backtick fence allocation for code output
//!
//! Markdown code fences collide with their own content when the code
//! contains backtick runs. This module picks delimiters that are always
//! longer than any run embedded in the content:
//!
//! - Fenced blocks use `max(3, longest_run + 1)` backticks, so a block
//!   containing a ```` ``` ```` sequence is wrapped in a four-backtick
//!   fence and survives a later Markdown parse unchanged.
//! - Inline code uses `longest_run + 1` backticks with space padding
//!   when the content begins or ends with a backtick.
//!
//! All functions are pure; the same content always yields the same fence.

/// Minimum fence length for a fenced code block
const MIN_FENCE_LEN: usize = 3;

/// Length of the longest run of consecutive backticks in `text`
pub fn longest_backtick_run(text: &str) -> usize {
    let mut longest = 0;
    let mut current = 0;
    for ch in text.chars() {
        if ch == '`' {
            current += 1;
            if current > longest {
                longest = current;
            }
        } else {
            current = 0;
        }
    }
    longest
}

/// Fence string guaranteed not to collide with backtick runs in `code`
pub fn fence_for(code: &str) -> String {
    let len = MIN_FENCE_LEN.max(longest_backtick_run(code) + 1);
    "`".repeat(len)
}

/// Render `code` as a complete fenced block
///
/// Trailing newlines in the content are trimmed and the optional language
/// tag is appended to the opening fence. The fence length is chosen via
/// [`fence_for`], so content containing backtick fences round-trips
/// exactly.
pub fn fenced_block(code: &str, language: Option<&str>) -> String {
    let code = code.trim_end_matches('\n');
    let fence = fence_for(code);
    let mut out = String::with_capacity(code.len() + fence.len() * 2 + 16);
    out.push_str(&fence);
    if let Some(lang) = language
        && !lang.is_empty()
    {
        out.push_str(lang);
    }
    out.push('\n');
    out.push_str(code);
    out.push('\n');
    out.push_str(&fence);
    out
}

/// Wrap `text` as inline code
///
/// Plain content gets a single backtick delimiter. Content containing
/// backticks gets a delimiter one longer than its longest run, padded
/// with spaces when the content starts or ends with a backtick.
pub fn inline_code(text: &str) -> String {
    let run = longest_backtick_run(text);
    if run == 0 {
        return format!("`{text}`");
    }
    let delim = "`".repeat(run + 1);
    if text.starts_with('`') || text.ends_with('`') {
        format!("{delim} {text} {delim}")
    } else {
        format!("{delim}{text}{delim}")
    }
}
