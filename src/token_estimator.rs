//! Token count estimation for agent consumers
//!
//! Agents use the `X-Markdown-Tokens` header to budget context before
//! fetching a document. The estimate is the usual characters-per-token
//! heuristic, not a real tokenizer: stable, deterministic, and cheap
//! enough to run on every regeneration.

/// Characters per token for English-ish prose
const CHARS_PER_TOKEN: u32 = 4;

/// Estimate the token count of `markdown`
///
/// `ceil(character_count / 4)`, counting characters rather than bytes so
/// multibyte text is not over-counted. Monotonic under appending.
pub fn estimate_tokens(markdown: &str) -> u32 {
    let chars = markdown.chars().count() as u32;
    chars.div_ceil(CHARS_PER_TOKEN)
}
