//! Resolved configuration consumed by the cache policy and negotiator
//!
//! The host CMS owns configuration storage and its settings UI; this
//! crate only sees the resolved values, passed in explicitly at
//! construction. Nothing here reads ambient global state.

use serde::{Deserialize, Serialize};

/// Operator-configured behavior knobs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NegotiatorConfig {
    /// Document types eligible for caching and save-triggered regeneration
    pub enabled_types: Vec<String>,
    /// Freeform signal string appended verbatim to `X-Content-Signal`
    pub extra_signal: String,
    /// Category names that mark a document as depth=technical
    pub technical_categories: Vec<String>,
}

impl Default for NegotiatorConfig {
    fn default() -> Self {
        Self {
            enabled_types: vec!["post".to_string(), "page".to_string()],
            extra_signal: "ai-train=yes, search=yes, ai-input=yes".to_string(),
            technical_categories: vec!["Technical".to_string(), "Code".to_string()],
        }
    }
}

impl NegotiatorConfig {
    /// Whether `doc_type` is one of the enabled document types
    pub fn type_enabled(&self, doc_type: &str) -> bool {
        self.enabled_types.iter().any(|t| t == doc_type)
    }
}
