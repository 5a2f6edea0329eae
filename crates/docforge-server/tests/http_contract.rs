//! In-process HTTP contract tests via `tower::ServiceExt::oneshot`, mirroring
//! the teacher's axum test harness. The Store and Renderer here are stubs
//! that panic if a handler ever reaches them — every test in this file only
//! exercises code paths that must reject before touching a collaborator
//! (routing, auth middleware, health check).

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{DateTime, Utc};
use http_body_util::BodyExt;
use tower::ServiceExt;

use docforge_domain::entities::{CodeSnippet, Document, FailedPage, Job, JobKind, Source, SnippetRelationship};
use docforge_domain::error::Result;
use docforge_domain::ports::store::{DocumentUpsertOutcome, StoreStatistics};
use docforge_domain::ports::{PageRenderer, RenderedPage, StoreRepository};
use docforge_domain::value_objects::{
    DocumentId, JobId, LibraryMatch, Page, RelatedSnippet, RelationshipId, SearchFilters, SearchHit, SnippetId,
};
use docforge_infrastructure::TracingLogger;
use docforge_server::state::ServerRuntimeConfig;
use docforge_server::AppState;

struct UnreachableStore;

#[async_trait]
impl StoreRepository for UnreachableStore {
    async fn create_job(&self, _job: &Job) -> Result<()> {
        unreachable!("test never exercises the store")
    }
    async fn get_job(&self, _id: JobId) -> Result<Job> {
        unreachable!()
    }
    async fn update_job(&self, _job: &Job) -> Result<()> {
        unreachable!()
    }
    async fn list_running_jobs(&self, _kind: Option<JobKind>) -> Result<Vec<Job>> {
        unreachable!()
    }
    async fn find_job_by_name_version(&self, _kind: JobKind, _name: &str, _version: Option<&str>) -> Result<Option<Job>> {
        unreachable!()
    }
    async fn upsert_document(&self, _document: &Document) -> Result<DocumentUpsertOutcome> {
        unreachable!()
    }
    async fn get_document(&self, _id: DocumentId) -> Result<Document> {
        unreachable!()
    }
    async fn find_document_by_url(&self, _url: &str) -> Result<Option<Document>> {
        unreachable!()
    }
    async fn list_documents_for_job(&self, _job_id: JobId) -> Result<Vec<Document>> {
        unreachable!()
    }
    async fn list_snippets_for_document(&self, _document_id: DocumentId) -> Result<Vec<CodeSnippet>> {
        unreachable!()
    }
    async fn replace_snippets_for_document(&self, _document_id: DocumentId, _snippets: &[CodeSnippet]) -> Result<usize> {
        unreachable!()
    }
    async fn get_snippet(&self, _id: SnippetId) -> Result<CodeSnippet> {
        unreachable!()
    }
    async fn save_enrichment(&self, _snippet: &CodeSnippet) -> Result<()> {
        unreachable!()
    }
    async fn record_failed_page(&self, _page: &FailedPage) -> Result<()> {
        unreachable!()
    }
    async fn list_failed_pages(&self, _job_id: JobId) -> Result<Vec<FailedPage>> {
        unreachable!()
    }
    async fn create_relationship(&self, _relationship: &SnippetRelationship) -> Result<()> {
        unreachable!()
    }
    async fn find_related_snippets(&self, _snippet_id: SnippetId) -> Result<Vec<RelatedSnippet>> {
        unreachable!()
    }
    async fn list_sources(&self, _page: u32, _limit: u32) -> Result<Page<Source>> {
        unreachable!()
    }
    async fn get_source(&self, _job_id: JobId) -> Result<Source> {
        unreachable!()
    }
    async fn search_libraries(&self, _query: &str, _limit: u32) -> Result<Vec<LibraryMatch>> {
        unreachable!()
    }
    async fn search_snippets(&self, _query: &str, _filters: &SearchFilters, _limit: u32) -> Result<Vec<SearchHit>> {
        unreachable!()
    }
    async fn search_documents_markdown(&self, _query: &str, _filters: &SearchFilters, _limit: u32) -> Result<Vec<DocumentId>> {
        unreachable!()
    }
    async fn get_document_markdown(&self, _document_id: DocumentId) -> Result<String> {
        unreachable!()
    }
    async fn delete_job(&self, _job_id: JobId) -> Result<()> {
        unreachable!()
    }
    async fn cancel_job(&self, _job_id: JobId) -> Result<()> {
        unreachable!()
    }
    async fn statistics(&self) -> Result<StoreStatistics> {
        unreachable!()
    }
    async fn heartbeat_job(&self, _job_id: JobId, _at: DateTime<Utc>) -> Result<()> {
        unreachable!()
    }
    async fn list_relationship_id(&self, _id: RelationshipId) -> Result<SnippetRelationship> {
        unreachable!()
    }
}

struct UnreachableRenderer;

#[async_trait]
impl PageRenderer for UnreachableRenderer {
    async fn render(&self, _url: &str) -> Result<RenderedPage> {
        unreachable!("test never exercises the renderer")
    }
}

fn test_state(mcp_auth_token: Option<&str>) -> AppState {
    let store: Arc<dyn StoreRepository> = Arc::new(UnreachableStore);
    let logger: Arc<dyn docforge_domain::ports::OperationLogger> = Arc::new(TracingLogger::new());
    let progress = Arc::new(docforge_infrastructure::ProgressBus::new());
    let scheduler = Arc::new(docforge_application::jobs::JobScheduler::new(store.clone(), progress.clone(), chrono::Duration::seconds(60)));
    let enrichment = Arc::new(docforge_application::enrichment::Enrichment::new(None, Arc::new(tokio::sync::Semaphore::new(1)), logger.clone()));
    let git = Arc::new(docforge_providers::Git2Provider::new());
    let ingestor = Arc::new(docforge_application::ingest::Ingestor::new(store.clone(), enrichment.clone(), scheduler.clone(), git, logger.clone()));
    let searcher = Arc::new(docforge_application::search::Searcher::new(store.clone()));
    let renderer: Arc<dyn PageRenderer> = Arc::new(UnreachableRenderer);

    AppState {
        store,
        scheduler,
        searcher,
        ingestor,
        renderer,
        enrichment,
        progress,
        logger,
        cancel_tokens: Arc::new(dashmap::DashMap::new()),
        config: ServerRuntimeConfig {
            api_prefix: "/api".to_owned(),
            mcp_auth_token: mcp_auth_token.map(str::to_owned),
            default_max_concurrent: 5,
            stall_threshold_secs: 60,
        },
    }
}

async fn dispatch(app: axum::Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.oneshot(request).await.expect("router should handle request");
    let status = response.status();
    let bytes = response.into_body().collect().await.expect("collect body").to_bytes();
    let body = if bytes.is_empty() { serde_json::json!(null) } else { serde_json::from_slice(&bytes).expect("valid JSON body") };
    (status, body)
}

#[tokio::test]
async fn healthz_reports_ok_without_auth() {
    let app = docforge_server::build_router(test_state(Some("secret")));
    let request = Request::builder().uri("/healthz").body(Body::empty()).unwrap();
    let (status, body) = dispatch(app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn api_route_rejects_missing_authorization_header() {
    let app = docforge_server::build_router(test_state(Some("secret")));
    let request = Request::builder().uri("/api/jobs").body(Body::empty()).unwrap();
    let (status, body) = dispatch(app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "missing_authorization");
}

#[tokio::test]
async fn api_route_rejects_wrong_bearer_token() {
    let app = docforge_server::build_router(test_state(Some("secret")));
    let request = Request::builder().uri("/api/jobs").header("Authorization", "Bearer nope").body(Body::empty()).unwrap();
    let (status, body) = dispatch(app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "invalid_token");
}

#[tokio::test]
async fn api_route_rejects_malformed_authorization_header() {
    let app = docforge_server::build_router(test_state(Some("secret")));
    let request = Request::builder().uri("/api/jobs").header("Authorization", "Basic whatever").body(Body::empty()).unwrap();
    let (status, body) = dispatch(app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "malformed_authorization");
}
