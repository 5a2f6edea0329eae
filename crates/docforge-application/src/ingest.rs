//! Upload/Repo Ingestor (C6) — direct uploads and shallow-cloned Git trees,
//! both funneled through the same per-job parse/enrich/persist tail as the
//! crawl driver, minus link following.

use std::path::Path;
use std::sync::Arc;

use globset::{Glob, GlobSetBuilder};

use docforge_domain::entities::{ContentType, Document, Job, JobKind};
use docforge_domain::error::{Error, Result};
use docforge_domain::fingerprint::document_fingerprint;
use docforge_domain::ports::store::DocumentUpsertOutcome;
use docforge_domain::ports::{GitProvider, OperationLogger, StoreRepository};
use docforge_domain::value_objects::{DocumentId, RepoConfig, UploadConfig, DEFAULT_EXCLUDED_DIRS};
use docforge_providers::parser::parse;

use crate::enrichment::Enrichment;
use crate::jobs::JobScheduler;

/// One in-memory file handed to `upload_files`.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub path: String,
    pub content: String,
    pub content_type: ContentType,
}

pub struct Ingestor {
    store: Arc<dyn StoreRepository>,
    enrichment: Arc<Enrichment>,
    scheduler: Arc<JobScheduler>,
    git: Arc<dyn GitProvider>,
    logger: Arc<dyn OperationLogger>,
}

impl Ingestor {
    #[must_use]
    pub fn new(
        store: Arc<dyn StoreRepository>,
        enrichment: Arc<Enrichment>,
        scheduler: Arc<JobScheduler>,
        git: Arc<dyn GitProvider>,
        logger: Arc<dyn OperationLogger>,
    ) -> Self {
        Self {
            store,
            enrichment,
            scheduler,
            git,
            logger,
        }
    }

    /// `upload_markdown` (§4.9): a single synchronous document, no job.
    /// The URL is synthesized from a fresh document id since there is no
    /// owning job to derive one from.
    pub async fn upload_markdown(
        &self,
        content: String,
        name: String,
        title: Option<String>,
        add_to_existing: bool,
    ) -> Result<(DocumentId, usize)> {
        let job = self
            .scheduler
            .create_job(JobKind::Upload, name, None, serde_json::json!({ "kind": "markdown" }), add_to_existing)
            .await?;

        let url = format!("docforge://upload/{}/inline.md", job.id);
        let snippets_count = self
            .ingest_one_file(job.id, &url, title, ContentType::Markdown, &content)
            .await?;

        let mut job = job;
        job.counters.files_processed = 1;
        job.counters.snippets_extracted = snippets_count as u64;
        self.scheduler.complete_job(job).await?;

        let document = self
            .store
            .find_document_by_url(&url)
            .await?
            .ok_or_else(|| Error::internal("document vanished immediately after upsert"))?;
        Ok((document.id, snippets_count))
    }

    /// `upload_files` (§4.9): a batch of in-memory files under one job.
    /// Each file's URL is synthetic, derived from the job id and its path
    /// (§4.6 "Direct upload").
    pub async fn upload_files(&self, mut job: Job, config: UploadConfig, files: Vec<UploadFile>) -> Result<()> {
        let mut total_snippets = 0u64;
        for file in &files {
            let url = format!("docforge://upload/{}/{}", job.id, file.path);
            let title = config.title.clone().or_else(|| Some(file.path.clone()));
            match self
                .ingest_one_file(job.id, &url, title, file.content_type, &file.content)
                .await
            {
                Ok(count) => total_snippets += count as u64,
                Err(e) => self.logger.warn(
                    &format!("upload file {} failed: {e}", file.path),
                    &[("job_id", &job.id.to_string())],
                ),
            }
            job.counters.files_processed += 1;
            job.counters.snippets_extracted = total_snippets;
            self.scheduler.update_progress(job.clone()).await?;
        }
        self.scheduler.complete_job(job).await
    }

    /// `upload_repo` (§4.9): shallow-clone, walk respecting include/exclude
    /// globs and the always-excluded directories, ingest each file, then
    /// clean up the clone unless `retain_clone` was requested (§4.6).
    pub async fn upload_repo(&self, mut job: Job, config: RepoConfig, host_owner_repo: (String, String, String)) -> Result<()> {
        let cloned = self.git.shallow_clone(&config).await?;
        let include = build_globset(config.include.as_deref());
        let exclude = build_globset(config.exclude.as_deref());
        let branch = config.branch.clone().unwrap_or_else(|| "main".to_owned());
        let (host, owner, repo) = host_owner_repo;

        let mut total_snippets = 0u64;
        for entry in walkdir::WalkDir::new(&cloned.walk_root)
            .into_iter()
            .filter_entry(|e| !is_excluded_dir(e, &cloned.walk_root))
            .filter_map(std::result::Result::ok)
        {
            if !entry.file_type().is_file() {
                continue;
            }
            let relative = entry
                .path()
                .strip_prefix(&cloned.walk_root)
                .unwrap_or(entry.path())
                .to_string_lossy()
                .replace('\\', "/");

            if !passes_repo_filters(&relative, include.as_ref(), exclude.as_ref()) {
                continue;
            }

            let Some(content_type) = content_type_for_path(&relative) else {
                continue;
            };
            let Ok(content) = std::fs::read_to_string(entry.path()) else {
                continue;
            };

            let url = format!("{host}/{owner}/{repo}/blob/{branch}/{relative}");
            match self
                .ingest_one_file(job.id, &url, Some(relative.clone()), content_type, &content)
                .await
            {
                Ok(count) => total_snippets += count as u64,
                Err(e) => self
                    .logger
                    .warn(&format!("repo file {relative} failed: {e}"), &[("job_id", &job.id.to_string())]),
            }
            job.counters.files_processed += 1;
            job.counters.snippets_extracted = total_snippets;
            self.scheduler.update_progress(job.clone()).await?;
        }

        if !config.retain_clone {
            self.git.cleanup(&cloned).await?;
        }

        self.scheduler.complete_job(job).await
    }

    async fn ingest_one_file(
        &self,
        job_id: docforge_domain::value_objects::JobId,
        url: &str,
        title: Option<String>,
        content_type: ContentType,
        content: &str,
    ) -> Result<usize> {
        let content_hash = document_fingerprint(content);
        if let Some(existing) = self.store.find_document_by_url(url).await? {
            if existing.is_unchanged(&content_hash) {
                return Ok(0);
            }
        }

        let document = Document::new(
            url.to_owned(),
            job_id,
            JobKind::Upload,
            title,
            content_type,
            content_hash,
            content.to_owned(),
            0,
            None,
        );

        let outcome = self.store.upsert_document(&document).await?;
        if outcome == DocumentUpsertOutcome::Unchanged {
            return Ok(0);
        }

        let parsed = parse(content, content_type, docforge_domain::constants::DEFAULT_MIN_SNIPPET_LENGTH);
        let snippets = self.enrichment.enrich_document(document.id, &document.url, parsed).await?;
        let count = self.store.replace_snippets_for_document(document.id, &snippets).await?;
        Ok(count)
    }
}

fn build_globset(patterns: Option<&[String]>) -> Option<globset::GlobSet> {
    let patterns = patterns?;
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        if let Ok(glob) = Glob::new(pattern) {
            builder.add(glob);
        }
    }
    builder.build().ok()
}

fn passes_repo_filters(relative_path: &str, include: Option<&globset::GlobSet>, exclude: Option<&globset::GlobSet>) -> bool {
    if let Some(exclude) = exclude {
        if exclude.is_match(relative_path) {
            return false;
        }
    }
    match include {
        Some(include) => include.is_match(relative_path),
        None => true,
    }
}

fn is_excluded_dir(entry: &walkdir::DirEntry, root: &Path) -> bool {
    if entry.path() == root {
        return false;
    }
    entry
        .path()
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|name| DEFAULT_EXCLUDED_DIRS.contains(&name))
}

fn content_type_for_path(path: &str) -> Option<ContentType> {
    let lower = path.to_ascii_lowercase();
    if lower.ends_with(".md") || lower.ends_with(".markdown") {
        Some(ContentType::Markdown)
    } else if lower.ends_with(".html") || lower.ends_with(".htm") {
        Some(ContentType::Html)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_type_dispatches_on_extension() {
        assert_eq!(content_type_for_path("README.md"), Some(ContentType::Markdown));
        assert_eq!(content_type_for_path("index.HTML"), Some(ContentType::Html));
        assert_eq!(content_type_for_path("script.rs"), None);
    }

    #[test]
    fn exclude_globs_win_over_include_globs() {
        let include = build_globset(Some(&["docs/**".to_owned()]));
        let exclude = build_globset(Some(&["docs/internal/**".to_owned()]));
        assert!(passes_repo_filters("docs/guide.md", include.as_ref(), exclude.as_ref()));
        assert!(!passes_repo_filters("docs/internal/secret.md", include.as_ref(), exclude.as_ref()));
    }

    #[test]
    fn no_include_glob_admits_everything_not_excluded() {
        assert!(passes_repo_filters("anything.md", None, None));
    }
}
