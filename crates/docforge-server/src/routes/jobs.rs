//! Job lifecycle routes: `init_crawl`, `upload_*`, and job control
//! (status/cancel/delete/recrawl/list) from §4.9.

use std::sync::atomic::Ordering;

use axum::extract::{Path, State};
use axum::Json;
use docforge_domain::entities::JobKind;
use docforge_domain::value_objects::{CrawlConfig, JobId, RepoConfig, UploadConfig};

use crate::application::UploadFileInput;
use crate::dto::{
    InitCrawlRequest, JobAccepted, JobView, UploadFilesRequest, UploadMarkdownRequest, UploadMarkdownResponse, UploadRepoRequest,
};
use crate::error::ApiError;
use crate::state::AppState;

pub async fn init_crawl(State(state): State<AppState>, Json(request): Json<InitCrawlRequest>) -> Result<Json<JobAccepted>, ApiError> {
    let config = CrawlConfig {
        start_urls: request.start_urls,
        max_depth: request.max_depth,
        domain_filter: request.domain_filter,
        url_patterns: request.url_patterns,
        max_concurrent: request.max_concurrent.unwrap_or(state.config.default_max_concurrent),
        ignore_hash: false,
        metadata: request.metadata,
    };

    let job = state
        .scheduler
        .create_job(JobKind::Crawl, request.name, request.version, serde_json::to_value(&config)?, request.add_to_existing)
        .await
        .map_err(ApiError::from)?;

    let job_id = job.id;
    state.spawn_crawl(job, config);
    Ok(Json(JobAccepted { job_id }))
}

pub async fn upload_markdown(
    State(state): State<AppState>,
    Json(request): Json<UploadMarkdownRequest>,
) -> Result<Json<UploadMarkdownResponse>, ApiError> {
    let (document_id, snippets_count) = state
        .ingestor
        .upload_markdown(request.content, request.name, request.title, request.add_to_existing)
        .await
        .map_err(ApiError::from)?;
    Ok(Json(UploadMarkdownResponse {
        document_id,
        snippets_count,
    }))
}

pub async fn upload_files(State(state): State<AppState>, Json(request): Json<UploadFilesRequest>) -> Result<Json<JobAccepted>, ApiError> {
    let config = UploadConfig {
        version: request.version,
        title: request.title,
        max_concurrent: request.max_concurrent.unwrap_or(state.config.default_max_concurrent),
    };

    let job = state
        .scheduler
        .create_job(
            JobKind::Upload,
            request.name,
            config.version.clone(),
            serde_json::to_value(&config)?,
            request.add_to_existing,
        )
        .await
        .map_err(ApiError::from)?;

    let files = request
        .files
        .into_iter()
        .map(|f| UploadFileInput {
            path: f.path,
            content: f.content,
        })
        .collect();

    let job_id = job.id;
    crate::application::spawn_upload_files(&state, job, config, files);
    Ok(Json(JobAccepted { job_id }))
}

pub async fn upload_repo(State(state): State<AppState>, Json(request): Json<UploadRepoRequest>) -> Result<Json<JobAccepted>, ApiError> {
    let name = request.name.clone().unwrap_or_else(|| derive_repo_name(&request.repo_url));
    let config = RepoConfig {
        repo_url: request.repo_url.clone(),
        version: request.version,
        path: request.path,
        branch: request.branch,
        token: request.token,
        include: request.include,
        exclude: request.exclude,
        retain_clone: false,
    };

    let job = state
        .scheduler
        .create_job(
            JobKind::Upload,
            name,
            config.version.clone(),
            serde_json::to_value(&config)?,
            request.add_to_existing,
        )
        .await
        .map_err(ApiError::from)?;

    let host_owner_repo = parse_repo_url(&request.repo_url);
    let job_id = job.id;
    crate::application::spawn_upload_repo(&state, job, config, host_owner_repo);
    Ok(Json(JobAccepted { job_id }))
}

pub async fn get_job(State(state): State<AppState>, Path(job_id): Path<JobId>) -> Result<Json<JobView>, ApiError> {
    let job = state.scheduler.get_job(job_id).await.map_err(ApiError::from)?;
    Ok(Json(JobView::from(job)))
}

pub async fn cancel_job(State(state): State<AppState>, Path(job_id): Path<JobId>) -> Result<Json<JobView>, ApiError> {
    if let Some(token) = state.cancel_tokens.get(&job_id) {
        token.store(true, Ordering::SeqCst);
    }
    state.scheduler.cancel_job(job_id).await.map_err(ApiError::from)?;
    let job = state.scheduler.get_job(job_id).await.map_err(ApiError::from)?;
    Ok(Json(JobView::from(job)))
}

pub async fn delete_job(State(state): State<AppState>, Path(job_id): Path<JobId>) -> Result<(), ApiError> {
    state.store.delete_job(job_id).await.map_err(ApiError::from)
}

pub async fn recrawl_job(State(state): State<AppState>, Path(job_id): Path<JobId>) -> Result<Json<JobAccepted>, ApiError> {
    let existing = state.store.get_job(job_id).await.map_err(ApiError::from)?;
    let config: CrawlConfig = serde_json::from_value(existing.config.clone())?;

    // `existing` still occupies this (name, version) slot, so `add_to_existing`
    // restarts the same job id in place instead of colliding with it.
    let job = state
        .scheduler
        .create_job(
            JobKind::Crawl,
            existing.name.clone(),
            existing.version.clone(),
            serde_json::to_value(&config)?,
            true,
        )
        .await
        .map_err(ApiError::from)?;

    let job_id = job.id;
    state.spawn_crawl(job, config);
    Ok(Json(JobAccepted { job_id }))
}

pub async fn list_jobs(State(state): State<AppState>) -> Result<Json<Vec<JobView>>, ApiError> {
    let jobs = state.store.list_running_jobs(None).await.map_err(ApiError::from)?;
    Ok(Json(jobs.into_iter().map(JobView::from).collect()))
}

fn derive_repo_name(repo_url: &str) -> String {
    repo_url
        .trim_end_matches('/')
        .trim_end_matches(".git")
        .rsplit('/')
        .next()
        .unwrap_or(repo_url)
        .to_owned()
}

/// Best-effort `(host, owner, repo)` extraction for building browsable blob
/// URLs; falls back to the raw repo URL's components when parsing fails.
fn parse_repo_url(repo_url: &str) -> (String, String, String) {
    if let Ok(url) = url::Url::parse(repo_url) {
        let host = format!("{}://{}", url.scheme(), url.host_str().unwrap_or("unknown"));
        let mut segments = url.path_segments().map(|s| s.collect::<Vec<_>>()).unwrap_or_default();
        let repo = segments.pop().map(|s| s.trim_end_matches(".git").to_owned()).unwrap_or_default();
        let owner = segments.pop().unwrap_or_default().to_owned();
        return (host, owner, repo);
    }
    ("unknown".to_owned(), "unknown".to_owned(), derive_repo_name(repo_url))
}
