//! Integration tests for Accept-header negotiation

mod common;

use cms_markdown_negotiator::{
    CachePolicy, CachedArtifact, MarkdownRequest, Negotiator, NegotiatorConfig, Outcome,
};
use common::{MemoryStore, sample_document};

fn markdown_request(id: u64) -> MarkdownRequest {
    MarkdownRequest {
        accept: Some("text/markdown".to_string()),
        document_id: Some(id),
    }
}

#[test]
fn test_no_accept_header_passes_through() {
    let store = MemoryStore::default();
    store.insert_document(sample_document(1, "T1"));
    let negotiator = Negotiator::new(&store, NegotiatorConfig::default());

    let request = MarkdownRequest {
        accept: None,
        document_id: Some(1),
    };
    assert_eq!(negotiator.negotiate(&request), Outcome::PassThrough);
}

#[test]
fn test_non_markdown_accept_passes_through() {
    let store = MemoryStore::default();
    store.insert_document(sample_document(1, "T1"));
    let negotiator = Negotiator::new(&store, NegotiatorConfig::default());

    let request = MarkdownRequest {
        accept: Some("text/html,application/xhtml+xml".to_string()),
        document_id: Some(1),
    };
    assert_eq!(negotiator.negotiate(&request), Outcome::PassThrough);
}

#[test]
fn test_accept_match_is_case_sensitive() {
    let store = MemoryStore::default();
    store.insert_document(sample_document(1, "T1"));
    let negotiator = Negotiator::new(&store, NegotiatorConfig::default());

    let request = MarkdownRequest {
        accept: Some("TEXT/MARKDOWN".to_string()),
        document_id: Some(1),
    };
    assert_eq!(negotiator.negotiate(&request), Outcome::PassThrough);
}

#[test]
fn test_accept_substring_in_list_matches() {
    let store = MemoryStore::default();
    store.insert_document(sample_document(1, "T1"));
    let negotiator = Negotiator::new(&store, NegotiatorConfig::default());

    let request = MarkdownRequest {
        accept: Some("application/json, text/markdown;q=0.9".to_string()),
        document_id: Some(1),
    };
    assert!(matches!(negotiator.negotiate(&request), Outcome::Serve(_)));
}

#[test]
fn test_unresolved_route_passes_through() {
    let store = MemoryStore::default();
    let negotiator = Negotiator::new(&store, NegotiatorConfig::default());

    let request = MarkdownRequest {
        accept: Some("text/markdown".to_string()),
        document_id: None,
    };
    assert_eq!(negotiator.negotiate(&request), Outcome::PassThrough);

    // resolvable id but no such document
    assert_eq!(negotiator.negotiate(&markdown_request(99)), Outcome::PassThrough);
}

#[test]
fn test_serves_cached_artifact_verbatim() {
    let store = MemoryStore::default();
    store.insert_document(sample_document(1, "T1"));
    let policy = CachePolicy::new(&store, NegotiatorConfig::default());
    policy.regenerate(1).expect("prime cache");
    let cached = store.artifact(1).expect("cached");

    let negotiator = Negotiator::new(&store, NegotiatorConfig::default());
    let Outcome::Serve(response) = negotiator.negotiate(&markdown_request(1)) else {
        panic!("expected Serve");
    };
    assert_eq!(response.status, 200);
    assert_eq!(response.body, cached.markdown);
}

#[test]
fn test_response_headers() {
    let store = MemoryStore::default();
    let mut doc = sample_document(1, "T1");
    doc.categories = vec!["Technical".to_string()];
    doc.sticky = true;
    store.insert_document(doc);
    let negotiator = Negotiator::new(&store, NegotiatorConfig::default());

    let Outcome::Serve(response) = negotiator.negotiate(&markdown_request(1)) else {
        panic!("expected Serve");
    };
    assert_eq!(
        response.header("Content-Type"),
        Some("text/markdown; charset=UTF-8")
    );
    assert_eq!(response.header("Vary"), Some("Accept"));
    assert_eq!(
        response.header("X-Content-Signal"),
        Some(
            "type=post, depth=technical, priority=high, \
             ai-train=yes, search=yes, ai-input=yes"
        )
    );

    let tokens: u32 = response
        .header("X-Markdown-Tokens")
        .expect("tokens header")
        .parse()
        .expect("integer");
    assert_eq!(
        tokens,
        (response.body.chars().count() as u32).div_ceil(4)
    );

    let etag = response.header("ETag").expect("etag header");
    assert!(etag.starts_with('"') && etag.ends_with('"'));
    assert_eq!(etag.len(), 34);
}

#[test]
fn test_fallback_generates_and_persists() {
    let store = MemoryStore::default();
    store.insert_document(sample_document(1, "T1"));
    let negotiator = Negotiator::new(&store, NegotiatorConfig::default());
    assert!(store.artifact(1).is_none());

    let Outcome::Serve(response) = negotiator.negotiate(&markdown_request(1)) else {
        panic!("expected Serve");
    };
    assert!(response.body.contains("Content of post 1."));

    // best-effort persistence kicked in
    let stored = store.artifact(1).expect("persisted fallback");
    assert_eq!(stored.markdown, response.body);
}

#[test]
fn test_fallback_serves_even_when_persistence_fails() {
    let store = MemoryStore::default();
    store.insert_document(sample_document(1, "T1"));
    store.fail_writes(true);
    let negotiator = Negotiator::new(&store, NegotiatorConfig::default());

    let Outcome::Serve(response) = negotiator.negotiate(&markdown_request(1)) else {
        panic!("expected Serve");
    };
    assert!(response.body.contains("Content of post 1."));
    assert!(store.artifact(1).is_none());
}

#[test]
fn test_empty_cached_artifact_triggers_fallback() {
    let store = MemoryStore::default();
    store.insert_document(sample_document(1, "T1"));
    store.insert_artifact(
        1,
        CachedArtifact {
            markdown: String::new(),
            token_estimate: 0,
            source_modified_at: "T1".to_string(),
        },
    );
    let negotiator = Negotiator::new(&store, NegotiatorConfig::default());

    let Outcome::Serve(response) = negotiator.negotiate(&markdown_request(1)) else {
        panic!("expected Serve");
    };
    assert!(response.body.contains("Content of post 1."));
}
