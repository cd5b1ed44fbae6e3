//! ETag generation for Markdown responses
//!
//! Because conversion is deterministic, identical document state always
//! produces identical Markdown, so a content hash makes a sound strong
//! validator. The tag is the first 128 bits of a BLAKE3 hash, hex
//! encoded and double-quoted per RFC 9110.

/// Bytes of the hash kept in the tag (128 bits)
const ETAG_HASH_BYTES: usize = 16;

/// Strong ETag for `markdown`
///
/// Format: `"<32 hex chars>"`, quotes included.
pub fn etag_for(markdown: &str) -> String {
    let hash = blake3::hash(markdown.as_bytes());
    format!("\"{}\"", hex::encode(&hash.as_bytes()[..ETAG_HASH_BYTES]))
}
