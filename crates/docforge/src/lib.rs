//! Composition root: wires `docforge-providers` adapters into
//! `docforge-application` use cases behind `docforge-domain`'s ports, then
//! hands the result to `docforge-server`. The binary's `main` is a thin
//! `clap` + exit-code wrapper around what's here.

use std::sync::Arc;

use docforge_application::enrichment::Enrichment;
use docforge_application::ingest::Ingestor;
use docforge_application::jobs::JobScheduler;
use docforge_application::search::Searcher;
use docforge_domain::constants::DEFAULT_FALLBACK_THRESHOLD;
use docforge_domain::constants::DEFAULT_FALLBACK_DOCUMENT_CAP;
use docforge_domain::error::{Error, Result};
use docforge_domain::ports::{LlmEnricher, OperationLogger, PageRenderer, StoreRepository};
use docforge_infrastructure::config::AppConfig;
use docforge_infrastructure::{build_llm_semaphore, migrations, PostgresStore, ProgressBus, TracingLogger};
use docforge_providers::{Git2Provider, HttpPageRenderer, HttpRendererConfig, OpenAiCompatibleEnricher};
use docforge_server::{AppState, McpServer, ServerRuntimeConfig};

/// Everything `main` needs to serve both transports.
pub struct App {
    pub state: AppState,
    pub mcp: McpServer,
}

/// Connect to Postgres, apply migrations, and wire every collaborator
/// described in `config`. Returns `Error::Database` if the pool can't be
/// established and `Error::Database`-wrapped errors if migrations fail —
/// both map to exit code 3 (§6).
pub async fn build_app(config: &AppConfig) -> Result<App> {
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await
        .map_err(|e| Error::database_with_source("connect to postgres", e))?;
    migrations::apply(&pool).await?;

    let store: Arc<dyn StoreRepository> = Arc::new(PostgresStore::from_pool(pool));
    let logger: Arc<dyn OperationLogger> = Arc::new(TracingLogger::new());
    let progress = Arc::new(ProgressBus::new());

    let renderer: Arc<dyn PageRenderer> = Arc::new(HttpPageRenderer::new(HttpRendererConfig {
        service_url: config.pipeline.renderer_url.clone(),
        timeout: std::time::Duration::from_secs(30),
    }));

    let enricher: Option<Arc<dyn LlmEnricher>> = config.llm.base_url.as_ref().map(|base_url| {
        Arc::new(OpenAiCompatibleEnricher::new(docforge_providers::llm::LlmConfig {
            base_url: base_url.clone(),
            api_key: config.llm.api_key.clone(),
            model: config.llm.model.clone(),
            timeout: std::time::Duration::from_secs(config.llm.timeout_secs),
            retry: docforge_providers::RetryPolicy {
                max_attempts: config.llm.max_retries as usize,
                base_backoff: std::time::Duration::from_millis(500),
            },
            extra_params: config.llm.extra_params.clone(),
        })) as Arc<dyn LlmEnricher>
    });
    let llm_semaphore = build_llm_semaphore(config.llm.concurrency);
    let enrichment = Arc::new(Enrichment::new(enricher, llm_semaphore, logger.clone()));

    let scheduler = Arc::new(JobScheduler::new(
        store.clone(),
        progress.clone() as Arc<dyn docforge_domain::ports::ProgressPublisher>,
        chrono::Duration::seconds(config.pipeline.stall_threshold_secs),
    ));

    let git = Arc::new(Git2Provider::new());
    let ingestor = Arc::new(Ingestor::new(store.clone(), enrichment.clone(), scheduler.clone(), git, logger.clone()));

    let searcher = Arc::new(Searcher::new(store.clone()).with_fallback_tuning(DEFAULT_FALLBACK_THRESHOLD, DEFAULT_FALLBACK_DOCUMENT_CAP));

    let state = AppState {
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
            api_prefix: config.server.api_prefix.clone(),
            mcp_auth_token: config.server.mcp_auth_token.clone(),
            default_max_concurrent: config.pipeline.default_max_concurrent,
            stall_threshold_secs: config.pipeline.stall_threshold_secs,
        },
    };

    let recovered = state.scheduler.recover_stalled_jobs().await?;
    if recovered > 0 {
        state.logger.warn("recovered stalled jobs on startup", &[("count", &recovered.to_string())]);
    }

    let mcp = McpServer::new(state.clone());
    Ok(App { state, mcp })
}
