//! Postgres `StoreRepository` adapter (C1). A single struct wrapping
//! `sqlx::PgPool`; the trait's ~25 methods are implemented here by
//! delegating to inherent methods defined per-concern in the sibling
//! modules, so one big `impl` block doesn't force one big file.

mod documents;
mod failed_pages;
mod jobs;
mod relationships;
mod rows;
mod search;
mod snippets;
mod sources;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use docforge_domain::entities::{CodeSnippet, Document, FailedPage, Job, JobKind, Source, SnippetRelationship};
use docforge_domain::error::{Error, Result};
use docforge_domain::ports::store::{DocumentUpsertOutcome, StoreRepository, StoreStatistics};
use docforge_domain::value_objects::{
    DocumentId, JobId, LibraryMatch, Page, RelatedSnippet, RelationshipId, SearchFilters, SearchHit, SnippetId,
};

#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Connect with a bounded pool. Callers should run
    /// [`crate::migrations::apply`] against the same pool before serving
    /// traffic.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| Error::database_with_source("connect to postgres", e))?;
        Ok(Self { pool })
    }

    #[must_use]
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StoreRepository for PostgresStore {
    async fn create_job(&self, job: &Job) -> Result<()> {
        self.create_job_impl(job).await
    }

    async fn get_job(&self, id: JobId) -> Result<Job> {
        self.get_job_impl(id).await
    }

    async fn update_job(&self, job: &Job) -> Result<()> {
        self.update_job_impl(job).await
    }

    async fn list_running_jobs(&self, kind: Option<JobKind>) -> Result<Vec<Job>> {
        self.list_running_jobs_impl(kind).await
    }

    async fn find_job_by_name_version(&self, kind: JobKind, name: &str, version: Option<&str>) -> Result<Option<Job>> {
        self.find_job_by_name_version_impl(kind, name, version).await
    }

    async fn upsert_document(&self, document: &Document) -> Result<DocumentUpsertOutcome> {
        self.upsert_document_impl(document).await
    }

    async fn get_document(&self, id: DocumentId) -> Result<Document> {
        self.get_document_impl(id).await
    }

    async fn find_document_by_url(&self, url: &str) -> Result<Option<Document>> {
        self.find_document_by_url_impl(url).await
    }

    async fn list_documents_for_job(&self, job_id: JobId) -> Result<Vec<Document>> {
        self.list_documents_for_job_impl(job_id).await
    }

    async fn list_snippets_for_document(&self, document_id: DocumentId) -> Result<Vec<CodeSnippet>> {
        self.list_snippets_for_document_impl(document_id).await
    }

    async fn replace_snippets_for_document(&self, document_id: DocumentId, snippets: &[CodeSnippet]) -> Result<usize> {
        self.replace_snippets_for_document_impl(document_id, snippets).await
    }

    async fn get_snippet(&self, id: SnippetId) -> Result<CodeSnippet> {
        self.get_snippet_impl(id).await
    }

    async fn save_enrichment(&self, snippet: &CodeSnippet) -> Result<()> {
        self.save_enrichment_impl(snippet).await
    }

    async fn record_failed_page(&self, page: &FailedPage) -> Result<()> {
        self.record_failed_page_impl(page).await
    }

    async fn list_failed_pages(&self, job_id: JobId) -> Result<Vec<FailedPage>> {
        self.list_failed_pages_impl(job_id).await
    }

    async fn create_relationship(&self, relationship: &SnippetRelationship) -> Result<()> {
        self.create_relationship_impl(relationship).await
    }

    async fn find_related_snippets(&self, snippet_id: SnippetId) -> Result<Vec<RelatedSnippet>> {
        self.find_related_snippets_impl(snippet_id).await
    }

    async fn list_sources(&self, page: u32, limit: u32) -> Result<Page<Source>> {
        self.list_sources_impl(page, limit).await
    }

    async fn get_source(&self, job_id: JobId) -> Result<Source> {
        self.get_source_impl(job_id).await
    }

    async fn search_libraries(&self, query: &str, limit: u32) -> Result<Vec<LibraryMatch>> {
        self.search_libraries_impl(query, limit).await
    }

    async fn search_snippets(&self, query: &str, filters: &SearchFilters, limit: u32) -> Result<Vec<SearchHit>> {
        self.search_snippets_impl(query, filters, limit).await
    }

    async fn search_documents_markdown(&self, query: &str, filters: &SearchFilters, limit: u32) -> Result<Vec<DocumentId>> {
        self.search_documents_markdown_impl(query, filters, limit).await
    }

    async fn get_document_markdown(&self, document_id: DocumentId) -> Result<String> {
        self.get_document_markdown_impl(document_id).await
    }

    async fn delete_job(&self, job_id: JobId) -> Result<()> {
        self.delete_job_impl(job_id).await
    }

    async fn cancel_job(&self, job_id: JobId) -> Result<()> {
        self.cancel_job_impl(job_id).await
    }

    async fn statistics(&self) -> Result<StoreStatistics> {
        self.statistics_impl().await
    }

    async fn heartbeat_job(&self, job_id: JobId, at: DateTime<Utc>) -> Result<()> {
        self.heartbeat_job_impl(job_id, at).await
    }

    async fn list_relationship_id(&self, id: RelationshipId) -> Result<SnippetRelationship> {
        self.list_relationship_id_impl(id).await
    }
}

/// These exercise the real adapter against a live Postgres instance
/// (`DOCFORGE_TEST_DATABASE_URL`) rather than mocking SQL, per the
/// project's store-testing convention. `#[ignore]` by default so a normal
/// `cargo test` run doesn't require a database.
#[cfg(test)]
mod tests {
    use docforge_domain::entities::{ContentType, Document, Job, JobKind};

    use super::*;
    use crate::migrations;

    async fn test_store() -> PostgresStore {
        let url = std::env::var("DOCFORGE_TEST_DATABASE_URL").expect("DOCFORGE_TEST_DATABASE_URL must be set");
        let store = PostgresStore::connect(&url, 5).await.expect("connect");
        migrations::apply(&store.pool).await.expect("apply migrations");
        store
    }

    #[tokio::test]
    #[ignore = "requires a live Postgres instance"]
    async fn create_then_get_job_round_trips() {
        let store = test_store().await;
        let job = Job::new(JobKind::Crawl, "roundtrip-test".to_owned(), None, serde_json::json!({}));
        store.create_job(&job).await.unwrap();

        let fetched = store.get_job(job.id).await.unwrap();
        assert_eq!(fetched.id, job.id);
        assert_eq!(fetched.name, job.name);
        assert_eq!(fetched.status, job.status);
    }

    #[tokio::test]
    #[ignore = "requires a live Postgres instance"]
    async fn upserting_the_same_content_hash_reports_unchanged() {
        let store = test_store().await;
        let job = Job::new(JobKind::Upload, "upsert-test".to_owned(), None, serde_json::json!({}));
        store.create_job(&job).await.unwrap();

        let document = Document::new(
            "docforge://upload/test/inline.md".to_owned(),
            job.id,
            job.kind,
            Some("Inline".to_owned()),
            ContentType::Markdown,
            "hash-1".to_owned(),
            "# hello".to_owned(),
            0,
            None,
        );

        let first = store.upsert_document(&document).await.unwrap();
        assert_eq!(first, DocumentUpsertOutcome::Created);

        let second = store.upsert_document(&document).await.unwrap();
        assert_eq!(second, DocumentUpsertOutcome::Unchanged);
    }
}
