//! Builds the axum `Router`: route table, auth middleware, and the
//! tracing/CORS middleware stack used across the crate's HTTP surface.

use axum::routing::{delete, get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::routes::{content, health, jobs, search, sources, ws};
use crate::state::AppState;

#[must_use]
pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/crawl", post(jobs::init_crawl))
        .route("/upload/markdown", post(jobs::upload_markdown))
        .route("/upload/files", post(jobs::upload_files))
        .route("/upload/repo", post(jobs::upload_repo))
        .route("/jobs", get(jobs::list_jobs))
        .route("/jobs/{job_id}", get(jobs::get_job).delete(jobs::delete_job))
        .route("/jobs/{job_id}/cancel", post(jobs::cancel_job))
        .route("/jobs/{job_id}/recrawl", post(jobs::recrawl_job))
        .route("/search/libraries", get(search::search_libraries))
        .route("/search/content", get(search::get_content))
        .route("/snippets/{snippet_id}", get(content::get_snippet))
        .route("/pages/markdown", get(content::get_page_markdown))
        .route("/sources", get(sources::list_sources))
        .route("/sources/search", get(sources::search_sources))
        .route("/sources/delete-matching", post(sources::delete_sources_matching))
        .route("/sources/bulk-delete", post(sources::delete_sources_bulk))
        .route(
            "/sources/{job_id}",
            get(sources::get_source).delete(sources::delete_source).put(sources::rename_source),
        )
        .route("/sources/{job_id}/snippets/delete-matching", post(sources::delete_matching_snippets))
        .route_layer(axum::middleware::from_fn_with_state(state.clone(), crate::auth::require_bearer_token));

    Router::new()
        .route("/healthz", get(health::healthz))
        .route("/ws/{client_id}", get(ws::progress_ws))
        .nest(&state.config.api_prefix.clone(), api)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
