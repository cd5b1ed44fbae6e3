//! Content negotiation - serving Markdown to clients that ask for it
//!
//! The host routes every front-end request through [`Negotiator::negotiate`]
//! before normal HTML rendering. A request is intercepted only when its
//! `Accept` header contains the `text/markdown` substring (case-sensitive)
//! and the route resolves to a single identified document; everything else
//! passes through untouched and the host renders HTML as usual.
//!
//! An intercepted request is answered from the cached artifact when one
//! exists, falling back to synchronous generation otherwise. The fallback
//! artifact is persisted best-effort: a store failure downgrades to
//! serving without caching rather than failing the response.

use crate::cache::{self, CachedArtifact, DocumentStore};
use crate::config::NegotiatorConfig;
use crate::document::{Document, DocumentId};
use crate::etag;

/// Media type that triggers negotiation
pub const MARKDOWN_MEDIA_TYPE: &str = "text/markdown";

/// The slice of an incoming request the negotiator needs
///
/// The host resolves routing; `document_id` is `Some` only when the
/// request maps to exactly one document.
#[derive(Debug, Clone, Default)]
pub struct MarkdownRequest {
    pub accept: Option<String>,
    pub document_id: Option<DocumentId>,
}

/// A fully-formed Markdown response for the host to emit
#[derive(Debug, Clone, PartialEq)]
pub struct MarkdownResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl MarkdownResponse {
    /// First header value with the given name, for host shims and tests
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Result of negotiating one request
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Emit this response and stop normal rendering
    Serve(MarkdownResponse),
    /// Not a Markdown request (or nothing to serve); host renders HTML
    PassThrough,
}

/// Serves cached Markdown on matching requests
pub struct Negotiator<'a, S: DocumentStore + ?Sized> {
    store: &'a S,
    config: NegotiatorConfig,
}

impl<'a, S: DocumentStore + ?Sized> Negotiator<'a, S> {
    pub fn new(store: &'a S, config: NegotiatorConfig) -> Self {
        Self { store, config }
    }

    /// Negotiate one request
    ///
    /// Never fails: every store problem degrades to either on-demand
    /// generation or pass-through.
    pub fn negotiate(&self, request: &MarkdownRequest) -> Outcome {
        let Some(accept) = &request.accept else {
            return Outcome::PassThrough;
        };
        if !accept.contains(MARKDOWN_MEDIA_TYPE) {
            return Outcome::PassThrough;
        }
        let Some(id) = request.document_id else {
            return Outcome::PassThrough;
        };
        let document = match self.store.get_document(id) {
            Ok(Some(document)) => document,
            Ok(None) => return Outcome::PassThrough,
            Err(error) => {
                log::warn!("document {id} unavailable during negotiation: {error}");
                return Outcome::PassThrough;
            }
        };

        let artifact = match self.store.get_artifact(id) {
            Ok(Some(artifact)) if !artifact.markdown.is_empty() => artifact,
            Ok(_) => self.generate_fallback(&document),
            Err(error) => {
                log::warn!("artifact read failed for document {id}: {error}");
                self.generate_fallback(&document)
            }
        };
        if artifact.markdown.is_empty() {
            return Outcome::PassThrough;
        }

        Outcome::Serve(self.build_response(&document, artifact))
    }

    /// Generate on demand and persist best-effort
    fn generate_fallback(&self, document: &Document) -> CachedArtifact {
        let artifact = cache::generate_artifact(document);
        if !artifact.markdown.is_empty()
            && let Err(error) = self.store.put_artifact(document.id, &artifact)
        {
            log::warn!(
                "could not persist fallback artifact for document {}: {error}",
                document.id
            );
        }
        artifact
    }

    fn build_response(&self, document: &Document, artifact: CachedArtifact) -> MarkdownResponse {
        let headers = vec![
            (
                "Content-Type".to_string(),
                format!("{MARKDOWN_MEDIA_TYPE}; charset=UTF-8"),
            ),
            (
                "X-Markdown-Tokens".to_string(),
                artifact.token_estimate.to_string(),
            ),
            (
                "X-Content-Signal".to_string(),
                content_signal(document, &self.config),
            ),
            ("ETag".to_string(), etag::etag_for(&artifact.markdown)),
            ("Vary".to_string(), "Accept".to_string()),
        ];
        MarkdownResponse {
            status: 200,
            headers,
            body: artifact.markdown,
        }
    }
}

/// Machine-readable classification hints for automated consumers
///
/// Format: `type=<doc type>, depth=<technical|general>,
/// priority=<high|standard>`, then the operator-configured extra signal
/// appended verbatim.
pub fn content_signal(document: &Document, config: &NegotiatorConfig) -> String {
    let depth = if document
        .categories
        .iter()
        .any(|category| config.technical_categories.contains(category))
    {
        "technical"
    } else {
        "general"
    };
    let priority = if document.sticky { "high" } else { "standard" };
    let mut signal = format!(
        "type={}, depth={depth}, priority={priority}",
        document.doc_type
    );
    if !config.extra_signal.is_empty() {
        signal.push_str(", ");
        signal.push_str(&config.extra_signal);
    }
    signal
}
