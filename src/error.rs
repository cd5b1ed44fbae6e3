//! Error types for store-facing operations
//!
//! Conversion is fail-soft and returns plain values; only calls that
//! cross into the host's document store can fail.

use crate::document::DocumentId;
use thiserror::Error;

/// Failures reported by the host's document store
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store has no document under this id
    #[error("document {0} not found")]
    NotFound(DocumentId),
    /// The backing store could not be reached
    #[error("document store unavailable: {0}")]
    Unavailable(String),
    /// A stored artifact exists but could not be decoded
    #[error("cached artifact for document {id} is corrupt: {reason}")]
    CorruptArtifact { id: DocumentId, reason: String },
}
