//! Bridges HTTP-layer requests to the long-running `Ingestor` operations,
//! which (like `CrawlDriver`) run to completion on a spawned task rather
//! than blocking the request that created the job.

use docforge_domain::entities::{ContentType, Job};
use docforge_domain::value_objects::{RepoConfig, UploadConfig};

use crate::state::AppState;

pub struct UploadFileInput {
    pub path: String,
    pub content: String,
}

fn content_type_for_path(path: &str) -> ContentType {
    if path.to_ascii_lowercase().ends_with(".html") || path.to_ascii_lowercase().ends_with(".htm") {
        ContentType::Html
    } else {
        ContentType::Markdown
    }
}

pub fn spawn_upload_files(state: &AppState, job: Job, config: UploadConfig, files: Vec<UploadFileInput>) {
    let ingestor = state.ingestor.clone();
    let logger = state.logger.clone();
    let job_id = job.id;
    tokio::spawn(async move {
        let files = files
            .into_iter()
            .map(|f| docforge_application::ingest::UploadFile {
                content_type: content_type_for_path(&f.path),
                path: f.path,
                content: f.content,
            })
            .collect();
        if let Err(e) = ingestor.upload_files(job, config, files).await {
            logger.operation_failed("upload_files", &e.to_string(), &[("job_id", &job_id.to_string())]);
        }
    });
}

pub fn spawn_upload_repo(state: &AppState, job: Job, config: RepoConfig, host_owner_repo: (String, String, String)) {
    let ingestor = state.ingestor.clone();
    let logger = state.logger.clone();
    let job_id = job.id;
    tokio::spawn(async move {
        if let Err(e) = ingestor.upload_repo(job, config, host_owner_repo).await {
            logger.operation_failed("upload_repo", &e.to_string(), &[("job_id", &job_id.to_string())]);
        }
    });
}
