//! Shared application state handed to every axum handler and MCP tool.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use dashmap::DashMap;
use docforge_application::crawl::CrawlDriver;
use docforge_application::enrichment::Enrichment;
use docforge_application::ingest::Ingestor;
use docforge_application::jobs::JobScheduler;
use docforge_application::search::Searcher;
use docforge_domain::ports::{OperationLogger, PageRenderer, StoreRepository};
use docforge_domain::value_objects::JobId;
use docforge_infrastructure::ProgressBus;

/// Bundles every collaborator a route handler needs. Cloned per request —
/// every field is an `Arc`, so cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn StoreRepository>,
    pub scheduler: Arc<JobScheduler>,
    pub searcher: Arc<Searcher>,
    pub ingestor: Arc<Ingestor>,
    pub renderer: Arc<dyn PageRenderer>,
    pub enrichment: Arc<Enrichment>,
    pub progress: Arc<ProgressBus>,
    pub logger: Arc<dyn OperationLogger>,
    /// Per-running-crawl-job cancellation flags, checked by `CrawlDriver`
    /// between pages (§5). Entries are removed once a job finishes.
    pub cancel_tokens: Arc<DashMap<JobId, Arc<AtomicBool>>>,
    pub config: ServerRuntimeConfig,
}

/// The slice of `AppConfig` the server layer actually needs, snapshotted at
/// startup so handlers don't depend on the infrastructure config type.
#[derive(Clone)]
pub struct ServerRuntimeConfig {
    pub api_prefix: String,
    pub mcp_auth_token: Option<String>,
    pub default_max_concurrent: usize,
    pub stall_threshold_secs: i64,
}

impl AppState {
    /// Build a fresh `CrawlDriver` for one job. A driver is stateless beyond
    /// its collaborators, so constructing one per job (rather than sharing
    /// a single long-lived instance) keeps job-scoped frontier state out of
    /// `AppState`.
    #[must_use]
    pub fn new_crawl_driver(&self) -> CrawlDriver {
        CrawlDriver::new(
            self.store.clone(),
            self.renderer.clone(),
            self.enrichment.clone(),
            self.scheduler.clone(),
            self.logger.clone(),
        )
    }

    /// Spawn a crawl job's driver on the Tokio runtime, registering a fresh
    /// cancellation flag the job-control routes can flip.
    pub fn spawn_crawl(&self, job: docforge_domain::entities::Job, config: docforge_domain::value_objects::CrawlConfig) {
        let cancel = Arc::new(AtomicBool::new(false));
        self.cancel_tokens.insert(job.id, cancel.clone());

        let driver = self.new_crawl_driver();
        let cancel_tokens = self.cancel_tokens.clone();
        let logger = self.logger.clone();
        let job_id = job.id;
        tokio::spawn(async move {
            if let Err(e) = driver.run(job, config, cancel).await {
                logger.operation_failed("crawl", &e.to_string(), &[("job_id", &job_id.to_string())]);
            }
            cancel_tokens.remove(&job_id);
        });
    }
}
