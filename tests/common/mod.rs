//! Shared fixtures for integration tests

use cms_markdown_negotiator::{
    Body, CachedArtifact, Document, DocumentId, DocumentStatus, DocumentStore, StoreError,
};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

/// In-memory stand-in for the host CMS document store
#[derive(Default)]
pub struct MemoryStore {
    documents: Mutex<HashMap<DocumentId, Document>>,
    artifacts: Mutex<HashMap<DocumentId, CachedArtifact>>,
    fail_artifact_writes: AtomicBool,
}

#[allow(dead_code)]
impl MemoryStore {
    pub fn insert_document(&self, document: Document) {
        self.documents
            .lock()
            .unwrap()
            .insert(document.id, document);
    }

    pub fn insert_artifact(&self, id: DocumentId, artifact: CachedArtifact) {
        self.artifacts.lock().unwrap().insert(id, artifact);
    }

    pub fn artifact(&self, id: DocumentId) -> Option<CachedArtifact> {
        self.artifacts.lock().unwrap().get(&id).cloned()
    }

    /// Make subsequent `put_artifact` calls fail, to exercise best-effort
    /// persistence paths
    pub fn fail_writes(&self, fail: bool) {
        self.fail_artifact_writes.store(fail, Ordering::SeqCst);
    }
}

impl DocumentStore for MemoryStore {
    fn get_document(&self, id: DocumentId) -> Result<Option<Document>, StoreError> {
        Ok(self.documents.lock().unwrap().get(&id).cloned())
    }

    fn list_published(
        &self,
        types: &[String],
        page: usize,
        page_size: usize,
    ) -> Result<Vec<DocumentId>, StoreError> {
        let documents = self.documents.lock().unwrap();
        let mut ids: Vec<DocumentId> = documents
            .values()
            .filter(|d| {
                d.status == DocumentStatus::Published && types.iter().any(|t| *t == d.doc_type)
            })
            .map(|d| d.id)
            .collect();
        ids.sort_unstable();
        Ok(ids
            .into_iter()
            .skip(page * page_size)
            .take(page_size)
            .collect())
    }

    fn get_artifact(&self, id: DocumentId) -> Result<Option<CachedArtifact>, StoreError> {
        Ok(self.artifacts.lock().unwrap().get(&id).cloned())
    }

    fn put_artifact(&self, id: DocumentId, artifact: &CachedArtifact) -> Result<(), StoreError> {
        if self.fail_artifact_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("write rejected".to_string()));
        }
        self.artifacts.lock().unwrap().insert(id, artifact.clone());
        Ok(())
    }
}

/// A published HTML-bodied post with sensible defaults
#[allow(dead_code)]
pub fn sample_document(id: DocumentId, modified: &str) -> Document {
    Document {
        id,
        title: format!("Post {id}"),
        body: Body::Html(format!("<p>Content of post {id}.</p>")),
        excerpt: None,
        author: "Jane Doe".to_string(),
        date: "2026-01-15 09:30:00".to_string(),
        modified: modified.to_string(),
        permalink: format!("https://example.com/post-{id}"),
        categories: vec!["News".to_string()],
        tags: vec!["sample".to_string()],
        featured_image: None,
        featured_image_alt: None,
        status: DocumentStatus::Published,
        sticky: false,
        doc_type: "post".to_string(),
    }
}
