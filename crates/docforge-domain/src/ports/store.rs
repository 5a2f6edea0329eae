//! Store port (C1) — persistence contract implemented by the infrastructure
//! crate's Postgres adapter.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::entities::{CodeSnippet, Document, FailedPage, Job, JobKind, Source, SnippetRelationship};
use crate::error::Result;
use crate::value_objects::{
    DocumentId, JobId, Page, RelatedSnippet, RelationshipId, SearchFilters, SearchHit, SnippetId,
};

/// Outcome of writing a document, distinguishing a brand-new row from an
/// unchanged re-fetch so callers can skip re-extraction (§4.5 step 2d).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentUpsertOutcome {
    Created,
    /// Content hash matched the stored row; no write was performed.
    Unchanged,
    /// Content changed; the row was updated in place.
    Updated,
}

/// Persistence contract for everything the application layer needs to
/// durably record and query. One trait per bounded concern would scatter a
/// single transaction (e.g. "insert document, then its snippets") across
/// several ports, so the Store stays a single seam, matching the original
/// system's single-repository shape (§4.1).
#[async_trait]
pub trait StoreRepository: Send + Sync {
    /// Create a new job row.
    async fn create_job(&self, job: &Job) -> Result<()>;

    /// Fetch a job by id.
    async fn get_job(&self, id: JobId) -> Result<Job>;

    /// Persist updated counters/status/phase/heartbeat for a job.
    async fn update_job(&self, job: &Job) -> Result<()>;

    /// List jobs of a kind still `Running`, for stall recovery on startup.
    async fn list_running_jobs(&self, kind: Option<JobKind>) -> Result<Vec<Job>>;

    /// Look up an existing job by its unique `(kind, name, version)`.
    async fn find_job_by_name_version(
        &self,
        kind: JobKind,
        name: &str,
        version: Option<&str>,
    ) -> Result<Option<Job>>;

    /// Insert or update a document by URL, returning which happened so the
    /// caller can decide whether to re-extract snippets.
    async fn upsert_document(&self, document: &Document) -> Result<DocumentUpsertOutcome>;

    async fn get_document(&self, id: DocumentId) -> Result<Document>;

    async fn find_document_by_url(&self, url: &str) -> Result<Option<Document>>;

    async fn list_documents_for_job(&self, job_id: JobId) -> Result<Vec<Document>>;

    /// All snippets belonging to one document, in parse order. Used by the
    /// markdown-fallback search stage to union a matched document's
    /// snippets into the result set (§4.8 step 2).
    async fn list_snippets_for_document(&self, document_id: DocumentId) -> Result<Vec<CodeSnippet>>;

    /// Replace all snippets belonging to a document (used on recrawl with a
    /// changed hash, and on first extraction). Returns the count of rows
    /// actually persisted, which can be lower than `snippets.len()` when the
    /// document contains duplicate-content blocks that collide on
    /// `(document_id, code_hash)`.
    async fn replace_snippets_for_document(
        &self,
        document_id: DocumentId,
        snippets: &[CodeSnippet],
    ) -> Result<usize>;

    async fn get_snippet(&self, id: SnippetId) -> Result<CodeSnippet>;

    /// Persist the result of LLM enrichment for one snippet, at-most-once
    /// per `(document_id, code_hash)` (§4.4).
    async fn save_enrichment(&self, snippet: &CodeSnippet) -> Result<()>;

    async fn record_failed_page(&self, page: &FailedPage) -> Result<()>;

    async fn list_failed_pages(&self, job_id: JobId) -> Result<Vec<FailedPage>>;

    async fn create_relationship(&self, relationship: &SnippetRelationship) -> Result<()>;

    /// The symmetric closure of edges touching `snippet_id`, each resolved to
    /// the other endpoint and a direction-appropriate type name (`imports`
    /// vs. `imported_by`, etc. — invariant 10).
    async fn find_related_snippets(&self, snippet_id: SnippetId) -> Result<Vec<RelatedSnippet>>;

    /// List sources (derived job/document/snippet aggregates) visible to the
    /// catalog, optionally paginated.
    async fn list_sources(&self, page: u32, limit: u32) -> Result<Page<Source>>;

    async fn get_source(&self, job_id: JobId) -> Result<Source>;

    /// Fuzzy/prefix/exact match over source names, ranked per §4.8a.
    async fn search_libraries(&self, query: &str, limit: u32) -> Result<Vec<crate::value_objects::LibraryMatch>>;

    /// Primary ranked search over the snippet full-text index (§4.8 step 1).
    async fn search_snippets(
        &self,
        query: &str,
        filters: &SearchFilters,
        limit: u32,
    ) -> Result<Vec<SearchHit>>;

    /// Markdown fallback search over document bodies (§4.8 step 2).
    async fn search_documents_markdown(
        &self,
        query: &str,
        filters: &SearchFilters,
        limit: u32,
    ) -> Result<Vec<DocumentId>>;

    /// Paginated markdown body for `get_page_markdown` (§4.9).
    async fn get_document_markdown(&self, document_id: DocumentId) -> Result<String>;

    /// Delete a job and everything it owns (documents, snippets, failed
    /// pages, relationships touching its snippets).
    async fn delete_job(&self, job_id: JobId) -> Result<()>;

    /// Mark a job cancelled; idempotent if already terminal.
    async fn cancel_job(&self, job_id: JobId) -> Result<()>;

    /// Row counts backing the `/statistics` surface.
    async fn statistics(&self) -> Result<StoreStatistics>;

    /// Record a heartbeat timestamp without re-reading/re-writing the whole
    /// job row, so frequent heartbeats stay cheap.
    async fn heartbeat_job(&self, job_id: JobId, at: DateTime<Utc>) -> Result<()>;

    async fn list_relationship_id(&self, id: RelationshipId) -> Result<SnippetRelationship>;
}

/// Aggregate counts backing the `/statistics` HTTP and MCP surfaces.
#[derive(Debug, Clone, Copy, Default)]
pub struct StoreStatistics {
    pub source_count: u64,
    pub document_count: u64,
    pub snippet_count: u64,
    pub enriched_snippet_count: u64,
    pub job_count: u64,
    pub running_job_count: u64,
}
