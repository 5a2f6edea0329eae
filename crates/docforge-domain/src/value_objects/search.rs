//! Search-related value objects (C8).

use serde::{Deserialize, Serialize};

use crate::entities::SnippetType;
use crate::value_objects::{DocumentId, JobId, SnippetId};

/// Search fallback behavior (§4.8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
    /// Run the markdown fallback only when primary results are scarce.
    #[default]
    Code,
    /// Always run the markdown fallback alongside the primary query.
    Enhanced,
}

/// Optional constraints applied to both the primary and fallback stages.
#[derive(Debug, Clone, Default, Serialize, Deserialize, schemars::JsonSchema)]
pub struct SearchFilters {
    pub language: Option<String>,
    pub source_job_id: Option<JobId>,
}

/// A ranked code-search hit, annotated with whether it came from the
/// primary snippet index or the markdown fallback.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct SearchHit {
    pub snippet_id: SnippetId,
    pub document_id: DocumentId,
    pub title: String,
    pub description: Option<String>,
    pub language: Option<String>,
    pub code_content: String,
    pub snippet_type: SnippetType,
    pub source_url: String,
    pub document_title: Option<String>,
    /// Full-text rank for primary hits; `None` for fallback hits, which sort
    /// strictly after every primary hit regardless of any notional score.
    pub rank: Option<f32>,
    /// `true` when this hit was discovered via the markdown fallback rather
    /// than the primary snippet-index query.
    pub found_via_docs: bool,
}

/// A best-matching `Source` returned by `search_libraries` (§4.9a).
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct LibraryMatch {
    pub job_id: JobId,
    pub name: String,
    pub version: Option<String>,
    pub snippet_count: u64,
    /// How the match was found, for debugging/ranking transparency.
    pub match_kind: LibraryMatchKind,
}

/// Why a `Source` matched a `search_libraries` query — exact beats prefix
/// beats trigram similarity (§4.8a).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum LibraryMatchKind {
    Exact,
    Prefix,
    Trigram,
}

/// A single page of results, with total count for client-side pagination.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
}
