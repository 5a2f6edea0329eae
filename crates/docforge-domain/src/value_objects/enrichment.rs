//! Value objects for the LLM enrichment contract (C4).

use serde::{Deserialize, Serialize};

use crate::entities::SnippetType;

/// Everything the enricher needs to produce a structured enrichment for one
/// snippet. Assembled by the parser from the surrounding document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichmentInput {
    pub code: String,
    /// Language hint from the parser (fence info-string / `class` attr).
    pub language_hint: Option<String>,
    pub section_title: Option<String>,
    pub section_content: Option<String>,
    pub context_before: Option<String>,
    pub context_after: Option<String>,
}

/// The structured result of LLM enrichment, per §4.4's contract:
/// `(title, description, canonical_language, snippet_type, functions[],
/// imports[], keywords[])`.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct Enrichment {
    pub title: String,
    pub description: String,
    pub language: String,
    pub snippet_type: SnippetType,
    pub functions: Vec<String>,
    pub imports: Vec<String>,
    pub keywords: Vec<String>,
}
