//! Job Scheduler (C7) — job lifecycle orchestration over the Store port.

use std::sync::Arc;

use chrono::Utc;
use docforge_domain::entities::{Job, JobKind};
use docforge_domain::error::{Error, Result};
use docforge_domain::ports::progress::{CompletionData, FailureData, HeartbeatData, JobProgressData};
use docforge_domain::ports::{ProgressEvent, ProgressPublisher, StoreRepository};
use docforge_domain::value_objects::JobId;

/// Orchestrates job creation, heartbeats, cancellation, and stall recovery.
/// Holds no state of its own beyond its collaborators — jobs live entirely
/// in the Store.
pub struct JobScheduler {
    store: Arc<dyn StoreRepository>,
    progress: Arc<dyn ProgressPublisher>,
    stall_threshold: chrono::Duration,
}

impl JobScheduler {
    #[must_use]
    pub fn new(
        store: Arc<dyn StoreRepository>,
        progress: Arc<dyn ProgressPublisher>,
        stall_threshold: chrono::Duration,
    ) -> Self {
        Self {
            store,
            progress,
            stall_threshold,
        }
    }

    /// Create a new job, rejecting a duplicate `(kind, name, version)`
    /// (invariant: a job's `(name, version)` pair is unique within its
    /// kind) — unless `add_to_existing` is set, in which case an existing,
    /// non-running job occupying that slot is restarted in place and its id
    /// reused (§4.7/§7: "add to existing source — scheduler reuses the
    /// existing job id"). A *running* job can never be restarted underneath
    /// its own worker, so the conflict is still reported in that case.
    pub async fn create_job(
        &self,
        kind: JobKind,
        name: String,
        version: Option<String>,
        config: serde_json::Value,
        add_to_existing: bool,
    ) -> Result<Job> {
        if let Some(existing) = self
            .store
            .find_job_by_name_version(kind, &name, version.as_deref())
            .await?
        {
            if add_to_existing && !existing.is_running() {
                let mut existing = existing;
                existing.restart_for_reuse(config);
                self.store.update_job(&existing).await?;
                return Ok(existing);
            }
            return Err(Error::conflict(
                format!("a {} job named {name:?} (version {version:?}) already exists", kind.as_str()),
                Some(existing.id.to_string()),
            ));
        }

        let job = Job::new(kind, name, version, config);
        self.store.create_job(&job).await?;
        Ok(job)
    }

    pub async fn get_job(&self, id: JobId) -> Result<Job> {
        self.store.get_job(id).await
    }

    /// Record a heartbeat and push a heartbeat event to subscribers.
    pub async fn heartbeat(&self, id: JobId) -> Result<()> {
        let now = Utc::now();
        self.store.heartbeat_job(id, now).await?;
        self.progress.publish(ProgressEvent::Heartbeat {
            job_id: id,
            data: HeartbeatData { last_heartbeat: now },
        });
        Ok(())
    }

    /// Persist updated counters/phase for a running job and publish a
    /// `crawl_update`/`upload_update` event, chosen by the job's kind.
    pub async fn update_progress(&self, mut job: Job) -> Result<()> {
        job.heartbeat(Utc::now());
        self.store.update_job(&job).await?;
        let data = JobProgressData {
            phase: job.phase,
            pages_processed: job.counters.pages_processed,
            files_processed: job.counters.files_processed,
            snippets_extracted: job.counters.snippets_extracted,
        };
        let event = match job.kind {
            JobKind::Crawl => ProgressEvent::CrawlUpdate { job_id: job.id, data },
            JobKind::Upload => ProgressEvent::UploadUpdate { job_id: job.id, data },
        };
        self.progress.publish(event);
        Ok(())
    }

    pub async fn complete_job(&self, mut job: Job) -> Result<()> {
        job.mark_completed();
        self.store.update_job(&job).await?;
        self.progress.publish(ProgressEvent::Completed {
            job_id: job.id,
            data: CompletionData { cancelled: false },
        });
        Ok(())
    }

    pub async fn fail_job(&self, mut job: Job, message: impl Into<String>) -> Result<()> {
        let message = message.into();
        job.mark_failed(message.clone());
        self.store.update_job(&job).await?;
        self.progress.publish(ProgressEvent::Failed {
            job_id: job.id,
            data: FailureData { error_message: message },
        });
        Ok(())
    }

    /// Mark a job cancelled. Cancellation is observed by running workers at
    /// their next poll, not synchronously by this call (§5: "cancellation
    /// observable within one poll interval").
    pub async fn cancel_job(&self, id: JobId) -> Result<()> {
        self.store.cancel_job(id).await?;
        self.progress.publish(ProgressEvent::Completed {
            job_id: id,
            data: CompletionData { cancelled: true },
        });
        Ok(())
    }

    /// Sweep jobs left `running` with a stale heartbeat (e.g. after an
    /// unclean process exit) and mark them failed. Run once at startup.
    pub async fn recover_stalled_jobs(&self) -> Result<usize> {
        let now = Utc::now();
        let running = self.store.list_running_jobs(None).await?;
        let mut recovered = 0usize;
        for job in running {
            if job.is_stalled(now, self.stall_threshold) {
                self.fail_job(job, "recovered after process restart: heartbeat stalled").await?;
                recovered += 1;
            }
        }
        Ok(recovered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use docforge_domain::entities::{CodeSnippet, Document, FailedPage, Source, SnippetRelationship};
    use docforge_domain::ports::store::{DocumentUpsertOutcome, StoreStatistics};
    use docforge_domain::value_objects::{
        DocumentId, LibraryMatch, Page, RelatedSnippet, RelationshipId, SearchFilters, SearchHit, SnippetId,
    };
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeStore {
        jobs: Mutex<std::collections::HashMap<JobId, Job>>,
    }

    #[async_trait]
    #[allow(clippy::unimplemented)]
    impl StoreRepository for FakeStore {
        async fn create_job(&self, job: &Job) -> Result<()> {
            self.jobs.lock().unwrap().insert(job.id, job.clone());
            Ok(())
        }
        async fn get_job(&self, id: JobId) -> Result<Job> {
            self.jobs.lock().unwrap().get(&id).cloned().ok_or_else(|| Error::not_found("job"))
        }
        async fn update_job(&self, job: &Job) -> Result<()> {
            self.jobs.lock().unwrap().insert(job.id, job.clone());
            Ok(())
        }
        async fn list_running_jobs(&self, _kind: Option<JobKind>) -> Result<Vec<Job>> {
            Ok(self.jobs.lock().unwrap().values().filter(|j| j.is_running()).cloned().collect())
        }
        async fn find_job_by_name_version(&self, kind: JobKind, name: &str, version: Option<&str>) -> Result<Option<Job>> {
            Ok(self
                .jobs
                .lock()
                .unwrap()
                .values()
                .find(|j| j.kind == kind && j.name == name && j.version.as_deref() == version)
                .cloned())
        }
        async fn upsert_document(&self, _d: &Document) -> Result<DocumentUpsertOutcome> {
            unimplemented!()
        }
        async fn get_document(&self, _id: DocumentId) -> Result<Document> {
            unimplemented!()
        }
        async fn find_document_by_url(&self, _url: &str) -> Result<Option<Document>> {
            unimplemented!()
        }
        async fn list_documents_for_job(&self, _job_id: JobId) -> Result<Vec<Document>> {
            unimplemented!()
        }
        async fn list_snippets_for_document(&self, _document_id: DocumentId) -> Result<Vec<CodeSnippet>> {
            unimplemented!()
        }
        async fn replace_snippets_for_document(&self, _document_id: DocumentId, _snippets: &[CodeSnippet]) -> Result<usize> {
            unimplemented!()
        }
        async fn get_snippet(&self, _id: SnippetId) -> Result<CodeSnippet> {
            unimplemented!()
        }
        async fn save_enrichment(&self, _snippet: &CodeSnippet) -> Result<()> {
            unimplemented!()
        }
        async fn record_failed_page(&self, _page: &FailedPage) -> Result<()> {
            unimplemented!()
        }
        async fn list_failed_pages(&self, _job_id: JobId) -> Result<Vec<FailedPage>> {
            unimplemented!()
        }
        async fn create_relationship(&self, _relationship: &SnippetRelationship) -> Result<()> {
            unimplemented!()
        }
        async fn find_related_snippets(&self, _snippet_id: SnippetId) -> Result<Vec<RelatedSnippet>> {
            unimplemented!()
        }
        async fn list_sources(&self, _page: u32, _limit: u32) -> Result<Page<Source>> {
            unimplemented!()
        }
        async fn get_source(&self, _job_id: JobId) -> Result<Source> {
            unimplemented!()
        }
        async fn search_libraries(&self, _query: &str, _limit: u32) -> Result<Vec<LibraryMatch>> {
            unimplemented!()
        }
        async fn search_snippets(&self, _query: &str, _filters: &SearchFilters, _limit: u32) -> Result<Vec<SearchHit>> {
            unimplemented!()
        }
        async fn search_documents_markdown(&self, _query: &str, _filters: &SearchFilters, _limit: u32) -> Result<Vec<DocumentId>> {
            unimplemented!()
        }
        async fn get_document_markdown(&self, _document_id: DocumentId) -> Result<String> {
            unimplemented!()
        }
        async fn delete_job(&self, id: JobId) -> Result<()> {
            self.jobs.lock().unwrap().remove(&id);
            Ok(())
        }
        async fn cancel_job(&self, id: JobId) -> Result<()> {
            if let Some(job) = self.jobs.lock().unwrap().get_mut(&id) {
                job.mark_cancelled();
            }
            Ok(())
        }
        async fn statistics(&self) -> Result<StoreStatistics> {
            unimplemented!()
        }
        async fn heartbeat_job(&self, id: JobId, at: chrono::DateTime<Utc>) -> Result<()> {
            if let Some(job) = self.jobs.lock().unwrap().get_mut(&id) {
                job.heartbeat(at);
            }
            Ok(())
        }
        async fn list_relationship_id(&self, _id: RelationshipId) -> Result<SnippetRelationship> {
            unimplemented!()
        }
    }

    struct NullProgress;
    impl ProgressPublisher for NullProgress {
        fn publish(&self, _event: ProgressEvent) {}
    }

    fn scheduler() -> JobScheduler {
        JobScheduler::new(Arc::new(FakeStore::default()), Arc::new(NullProgress), chrono::Duration::seconds(60))
    }

    #[tokio::test]
    async fn create_job_rejects_duplicate_name_version_within_kind() {
        let scheduler = scheduler();
        scheduler
            .create_job(JobKind::Crawl, "next.js".into(), Some("v14".into()), serde_json::json!({}), false)
            .await
            .unwrap();

        let err = scheduler
            .create_job(JobKind::Crawl, "next.js".into(), Some("v14".into()), serde_json::json!({}), false)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Conflict { .. }));
    }

    #[tokio::test]
    async fn same_name_version_allowed_across_kinds() {
        let scheduler = scheduler();
        scheduler
            .create_job(JobKind::Crawl, "acme".into(), None, serde_json::json!({}), false)
            .await
            .unwrap();
        let upload = scheduler
            .create_job(JobKind::Upload, "acme".into(), None, serde_json::json!({}), false)
            .await;
        assert!(upload.is_ok());
    }

    #[tokio::test]
    async fn recover_stalled_jobs_marks_stale_running_jobs_failed() {
        let scheduler = scheduler();
        let job = scheduler
            .create_job(JobKind::Crawl, "stale".into(), None, serde_json::json!({}), false)
            .await
            .unwrap();
        scheduler.store.heartbeat_job(job.id, Utc::now() - chrono::Duration::seconds(120)).await.unwrap();

        let recovered = scheduler.recover_stalled_jobs().await.unwrap();
        assert_eq!(recovered, 1);
        let reloaded = scheduler.get_job(job.id).await.unwrap();
        assert!(!reloaded.is_running());
        assert!(reloaded.error_message.is_some());
    }

    #[tokio::test]
    async fn add_to_existing_restarts_completed_job_reusing_its_id() {
        let scheduler = scheduler();
        let first = scheduler
            .create_job(JobKind::Crawl, "acme".into(), None, serde_json::json!({"v": 1}), false)
            .await
            .unwrap();
        scheduler.store.update_job(&{
            let mut j = first.clone();
            j.counters.pages_processed = 7;
            j.mark_completed();
            j
        }).await.unwrap();

        let reused = scheduler
            .create_job(JobKind::Crawl, "acme".into(), None, serde_json::json!({"v": 2}), true)
            .await
            .unwrap();

        assert_eq!(reused.id, first.id);
        assert!(reused.is_running());
        assert_eq!(reused.counters.pages_processed, 7);
        assert_eq!(reused.config, serde_json::json!({"v": 2}));
    }

    #[tokio::test]
    async fn add_to_existing_still_conflicts_when_job_is_running() {
        let scheduler = scheduler();
        let first = scheduler
            .create_job(JobKind::Crawl, "acme".into(), None, serde_json::json!({}), false)
            .await
            .unwrap();

        let err = scheduler
            .create_job(JobKind::Crawl, "acme".into(), None, serde_json::json!({}), true)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Conflict { ref existing_id, .. } if *existing_id == Some(first.id.to_string())));
    }
}
