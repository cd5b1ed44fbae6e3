//! Cache policy - artifact generation and staleness tracking
//!
//! Each document moves through three cache states:
//!
//! - **Uncached**: no artifact stored yet; first generation moves to fresh
//! - **Cached-Fresh**: the stored `source_modified_at` equals the
//!   document's current modification timestamp
//! - **Cached-Stale**: the document was modified after the artifact was
//!   generated; any regeneration path moves it back to fresh
//!
//! Staleness is a plain string-equality check on the host's modification
//! timestamp - no clock arithmetic, no freshness windows. The bulk sweep
//! uses that cheap check to skip unchanged documents; save-triggered
//! regeneration is unconditional.
//!
//! Artifacts are immutable snapshots once written. Writers may race on
//! the same document (sweep, save event, on-demand fallback), but every
//! writer computes a deterministic function of the same document state,
//! so last-writer-wins converges to identical content.

use crate::config::NegotiatorConfig;
use crate::converter::MarkdownConverter;
use crate::document::{Document, DocumentId, DocumentStatus};
use crate::error::StoreError;
use crate::frontmatter;
use crate::token_estimator;
use serde::{Deserialize, Serialize};

/// Documents processed per sweep invocation
///
/// Bounds the work done in one scheduler tick; the external scheduler
/// drives successive pages.
pub const SWEEP_PAGE_SIZE: usize = 50;

/// Per-document cached Markdown record
///
/// `source_modified_at` always holds the document's modification
/// timestamp at the moment `markdown` was generated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedArtifact {
    pub markdown: String,
    pub token_estimate: u32,
    pub source_modified_at: String,
}

/// Host collaborator contract for documents and cached artifacts
///
/// The host owns storage; artifacts live in a generic key-value store
/// keyed by document id. Implementations must be usable behind `&self`
/// from concurrent requests.
pub trait DocumentStore {
    fn get_document(&self, id: DocumentId) -> Result<Option<Document>, StoreError>;

    /// Ids of published documents of the given types, one bounded page
    fn list_published(
        &self,
        types: &[String],
        page: usize,
        page_size: usize,
    ) -> Result<Vec<DocumentId>, StoreError>;

    fn get_artifact(&self, id: DocumentId) -> Result<Option<CachedArtifact>, StoreError>;

    fn put_artifact(&self, id: DocumentId, artifact: &CachedArtifact) -> Result<(), StoreError>;
}

/// Counters reported to the scheduler after a sweep page
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepStats {
    pub processed: usize,
    pub regenerated: usize,
    pub skipped: usize,
}

/// Render the complete Markdown document: front matter, then body
///
/// When a featured image resolves, the body is prefixed with a
/// top-of-document image line; its alt text goes through the same quoting
/// helper the front matter uses.
pub fn render_markdown(document: &Document) -> String {
    let converter = MarkdownConverter::new();
    let mut markdown = frontmatter::build(document);
    if let Some(url) = frontmatter::featured_image(document) {
        let alt = document.featured_image_alt.as_deref().unwrap_or("");
        markdown.push_str(&format!("![{}]({url})\n\n", frontmatter::quote(alt)));
    }
    markdown.push_str(&converter.convert(document));
    markdown.trim().to_string()
}

/// Generate a fresh artifact from the document's current state
pub fn generate_artifact(document: &Document) -> CachedArtifact {
    let markdown = render_markdown(document);
    CachedArtifact {
        token_estimate: token_estimator::estimate_tokens(&markdown),
        source_modified_at: document.modified.clone(),
        markdown,
    }
}

/// Decides when cached Markdown is regenerated
pub struct CachePolicy<'a, S: DocumentStore + ?Sized> {
    store: &'a S,
    config: NegotiatorConfig,
}

impl<'a, S: DocumentStore + ?Sized> CachePolicy<'a, S> {
    pub fn new(store: &'a S, config: NegotiatorConfig) -> Self {
        Self { store, config }
    }

    /// Process one page of the bulk sweep
    ///
    /// Regenerates a document only when its stored `source_modified_at`
    /// differs from the current modification timestamp; unchanged
    /// documents cost a single artifact read.
    pub fn sweep_page(&self, page: usize) -> Result<SweepStats, StoreError> {
        let ids =
            self.store
                .list_published(&self.config.enabled_types, page, SWEEP_PAGE_SIZE)?;
        let mut stats = SweepStats::default();
        for id in ids {
            let Some(document) = self.store.get_document(id)? else {
                log::warn!("document {id} listed but not loadable, skipping");
                continue;
            };
            stats.processed += 1;
            let fresh = self
                .store
                .get_artifact(id)?
                .is_some_and(|artifact| artifact.source_modified_at == document.modified);
            if fresh {
                stats.skipped += 1;
                continue;
            }
            let artifact = generate_artifact(&document);
            self.store.put_artifact(id, &artifact)?;
            stats.regenerated += 1;
            log::debug!("regenerated markdown cache for document {id}");
        }
        log::info!(
            "sweep page {page}: {} processed, {} regenerated, {} skipped",
            stats.processed,
            stats.regenerated,
            stats.skipped
        );
        Ok(stats)
    }

    /// Unconditionally regenerate one document's artifact
    ///
    /// Returns `None` without writing when the document does not exist.
    pub fn regenerate(&self, id: DocumentId) -> Result<Option<CachedArtifact>, StoreError> {
        let Some(document) = self.store.get_document(id)? else {
            log::warn!("regeneration requested for missing document {id}");
            return Ok(None);
        };
        let artifact = generate_artifact(&document);
        self.store.put_artifact(id, &artifact)?;
        Ok(Some(artifact))
    }

    /// Save-event entry point, invoked by the host on document save
    ///
    /// Regenerates for configured types only, and never for revisions or
    /// trashed documents.
    pub fn on_document_saved(
        &self,
        id: DocumentId,
        is_update: bool,
    ) -> Result<Option<CachedArtifact>, StoreError> {
        let Some(document) = self.store.get_document(id)? else {
            return Ok(None);
        };
        if document.status == DocumentStatus::Revision {
            return Ok(None);
        }
        if !self.config.type_enabled(&document.doc_type) {
            return Ok(None);
        }
        if document.status == DocumentStatus::Trash {
            return Ok(None);
        }
        log::debug!("save event for document {id} (update: {is_update}), regenerating");
        let artifact = generate_artifact(&document);
        self.store.put_artifact(id, &artifact)?;
        Ok(Some(artifact))
    }
}
