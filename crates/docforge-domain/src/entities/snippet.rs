//! CodeSnippet entity — one extracted block of code with metadata.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{DocumentId, SnippetId};

/// Coarse classification of what a snippet represents, assigned by the LLM
/// enricher (or defaulted to `Code` when enrichment is skipped).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SnippetType {
    /// A single function or method definition.
    Function,
    /// A class, struct, or similar type definition.
    Class,
    /// A runnable usage example.
    Example,
    /// Configuration (YAML/JSON/TOML block, env file, ...).
    Config,
    /// Unclassified code.
    Code,
}

impl Default for SnippetType {
    fn default() -> Self {
        Self::Code
    }
}

/// One extracted block of code with metadata, belonging to exactly one
/// `Document`.
///
/// `(document_id, code_hash)` is unique (invariant 1): the same code may
/// appear under different documents or sources, but never twice in the same
/// document.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct CodeSnippet {
    pub id: SnippetId,
    pub document_id: DocumentId,
    /// LLM-assigned or synthesized title (`"<language> snippet"` when
    /// enrichment was skipped or failed permanently).
    pub title: String,
    pub description: Option<String>,
    /// Canonical language name, from LLM enrichment or the parser's
    /// info-string/`class="language-*"` hint.
    pub language: Option<String>,
    pub code_content: String,
    /// Hex digest of the trimmed code bytes (see fingerprint module).
    pub code_hash: String,
    /// 1-based line numbers in the source document; `None` when extracted
    /// from HTML without reliable anchoring (design note ii).
    pub line_start: Option<i32>,
    pub line_end: Option<i32>,
    pub context_before: Option<String>,
    pub context_after: Option<String>,
    pub section_title: Option<String>,
    pub section_content: Option<String>,
    pub functions: Vec<String>,
    pub imports: Vec<String>,
    pub keywords: Vec<String>,
    pub snippet_type: SnippetType,
    /// URL of the owning document, denormalized for direct display in
    /// search results without a join.
    pub source_url: String,
    /// Free-form metadata bag (e.g. enrichment provider/model used).
    pub meta: serde_json::Value,
    /// Whether this snippet went through LLM enrichment successfully.
    pub enriched: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CodeSnippet {
    /// Build a snippet from parser output alone, before enrichment runs.
    /// Title is synthesized as `"<language> snippet"` per §4.4's permanent-
    /// failure / cost-guard fallback.
    #[must_use]
    pub fn from_parsed(
        document_id: DocumentId,
        source_url: String,
        code_content: String,
        code_hash: String,
        language: Option<String>,
        line_start: Option<i32>,
        line_end: Option<i32>,
        context_before: Option<String>,
        context_after: Option<String>,
        section_title: Option<String>,
        section_content: Option<String>,
    ) -> Self {
        let now = Utc::now();
        let title = format!("{} snippet", language.as_deref().unwrap_or("code"));
        Self {
            id: SnippetId::new(),
            document_id,
            title,
            description: None,
            language,
            code_content,
            code_hash,
            line_start,
            line_end,
            context_before,
            context_after,
            section_title,
            section_content,
            functions: Vec::new(),
            imports: Vec::new(),
            keywords: Vec::new(),
            snippet_type: SnippetType::Code,
            source_url,
            meta: serde_json::json!({}),
            enriched: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply an enrichment result on top of the parser-derived snippet.
    pub fn apply_enrichment(&mut self, enrichment: crate::value_objects::Enrichment) {
        self.title = enrichment.title;
        self.description = Some(enrichment.description);
        self.language = Some(enrichment.language);
        self.snippet_type = enrichment.snippet_type;
        self.functions = enrichment.functions;
        self.imports = enrichment.imports;
        self.keywords = enrichment.keywords;
        self.enriched = true;
        self.updated_at = Utc::now();
    }
}
