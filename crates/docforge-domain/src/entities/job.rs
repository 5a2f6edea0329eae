//! Job entity — lifecycle state for a crawl or upload ingestion run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::JobId;

/// Which ingestion pipeline a job drives. A job's `(name, version)` pair is
/// unique within its own kind — a crawl job and an upload job may legally
/// share a `(name, version)`, but two crawl jobs may not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    /// Driven by the web crawl driver (C5).
    Crawl,
    /// Driven by the upload/repo ingestor (C6).
    Upload,
}

impl JobKind {
    /// Short, stable string used in synthetic document URLs and log fields.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Crawl => "crawl",
            Self::Upload => "upload",
        }
    }
}

/// Binary job status. The spec deliberately keeps this binary — success,
/// cancellation and fatal error are all captured via `error_message` /
/// `cancelled` rather than additional status variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Actively processing (or resumable after a stall).
    Running,
    /// Terminal: success, cancellation, or fatal error all land here.
    Completed,
}

/// Sub-phase of a running crawl job, used for UI and for the C5 state
/// machine's `finalizing` transition before completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum JobPhase {
    /// Workers are still pulling pages from the frontier.
    Crawling,
    /// Frontier drained; flushing partial writes before completion.
    Finalizing,
}

/// Monotone progress counters for a job. Every field must only increase over
/// the job's lifetime (invariant 3 in the testable-properties list).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct JobCounters {
    /// Pages fetched and processed by a crawl job.
    pub pages_processed: u64,
    /// Files processed by an upload/repo job.
    pub files_processed: u64,
    /// Snippets extracted across all processed documents.
    pub snippets_extracted: u64,
}

/// A unit of ingestion work: either a crawl or an upload/repo job.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct Job {
    /// Opaque unique identifier.
    pub id: JobId,
    /// Which pipeline this job drives.
    pub kind: JobKind,
    /// Library/source name.
    pub name: String,
    /// Optional version tag (e.g. "v14").
    pub version: Option<String>,
    /// Current lifecycle status.
    pub status: JobStatus,
    /// Sub-phase while running; `None` once completed or for upload jobs,
    /// which have no crawl phase.
    pub phase: Option<JobPhase>,
    /// Progress counters.
    pub counters: JobCounters,
    /// When the job row was created.
    pub created_at: DateTime<Utc>,
    /// When the driver started processing (may lag `created_at` if queued).
    pub started_at: Option<DateTime<Utc>>,
    /// When the job reached `Completed`.
    pub completed_at: Option<DateTime<Utc>>,
    /// Last heartbeat write; used for stall detection.
    pub last_heartbeat: Option<DateTime<Utc>>,
    /// Count of fatal-error retries attempted by the scheduler.
    pub retry_count: u32,
    /// Retry budget; once `retry_count >= max_retries` the job is not
    /// resumed automatically.
    pub max_retries: u32,
    /// Set when the job completed due to a fatal error.
    pub error_message: Option<String>,
    /// Set when the job completed due to cancellation.
    pub cancelled: bool,
    /// Free-form config map (start URLs, filters, upload options, ...).
    pub config: serde_json::Value,
}

impl Job {
    /// Construct a freshly created, running job with zeroed counters.
    #[must_use]
    pub fn new(kind: JobKind, name: String, version: Option<String>, config: serde_json::Value) -> Self {
        let now = Utc::now();
        Self {
            id: JobId::new(),
            kind,
            name,
            version,
            status: JobStatus::Running,
            phase: match kind {
                JobKind::Crawl => Some(JobPhase::Crawling),
                JobKind::Upload => None,
            },
            counters: JobCounters::default(),
            created_at: now,
            started_at: Some(now),
            completed_at: None,
            last_heartbeat: Some(now),
            retry_count: 0,
            max_retries: 3,
            error_message: None,
            cancelled: false,
            config,
        }
    }

    /// Whether the job is still accepting heartbeats/progress.
    #[must_use]
    pub fn is_running(&self) -> bool {
        matches!(self.status, JobStatus::Running)
    }

    /// Mark the job completed successfully (no error, no cancellation).
    pub fn mark_completed(&mut self) {
        self.status = JobStatus::Completed;
        self.phase = None;
        self.completed_at = Some(Utc::now());
    }

    /// Mark the job completed due to cancellation.
    pub fn mark_cancelled(&mut self) {
        self.cancelled = true;
        self.mark_completed();
    }

    /// Mark the job completed due to a fatal error.
    pub fn mark_failed(&mut self, message: impl Into<String>) {
        self.error_message = Some(message.into());
        self.mark_completed();
    }

    /// Record a heartbeat. Enforces monotonicity: a heartbeat older than the
    /// last recorded one is silently ignored rather than rewinding the clock.
    pub fn heartbeat(&mut self, at: DateTime<Utc>) {
        if self.last_heartbeat.is_none_or(|last| at > last) {
            self.last_heartbeat = Some(at);
        }
    }

    /// Whether the job's heartbeat is older than `threshold`.
    #[must_use]
    pub fn is_stalled(&self, now: DateTime<Utc>, threshold: chrono::Duration) -> bool {
        self.is_running()
            && self
                .last_heartbeat
                .is_some_and(|last| now - last > threshold)
    }

    /// Restart this job in place for an "add to existing source" re-run
    /// (§4.7/§7): `id` and accumulated `counters` survive (invariant 3,
    /// counters only increase over a job's lifetime), everything else resets
    /// as if the job were freshly created with `config`.
    pub fn restart_for_reuse(&mut self, config: serde_json::Value) {
        let now = Utc::now();
        self.status = JobStatus::Running;
        self.phase = match self.kind {
            JobKind::Crawl => Some(JobPhase::Crawling),
            JobKind::Upload => None,
        };
        self.started_at = Some(now);
        self.last_heartbeat = Some(now);
        self.completed_at = None;
        self.retry_count = 0;
        self.error_message = None;
        self.cancelled = false;
        self.config = config;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_job_starts_running_with_zeroed_counters() {
        let job = Job::new(JobKind::Crawl, "next.js".to_owned(), Some("v14".to_owned()), serde_json::json!({}));
        assert!(job.is_running());
        assert_eq!(job.counters.pages_processed, 0);
        assert_eq!(job.phase, Some(JobPhase::Crawling));
    }

    #[test]
    fn upload_jobs_have_no_crawl_phase() {
        let job = Job::new(JobKind::Upload, "acme-docs".to_owned(), None, serde_json::json!({}));
        assert_eq!(job.phase, None);
    }

    #[test]
    fn heartbeat_is_monotonic() {
        let mut job = Job::new(JobKind::Crawl, "x".to_owned(), None, serde_json::json!({}));
        let t0 = job.last_heartbeat.unwrap();
        let earlier = t0 - chrono::Duration::seconds(10);
        job.heartbeat(earlier);
        assert_eq!(job.last_heartbeat, Some(t0));

        let later = t0 + chrono::Duration::seconds(10);
        job.heartbeat(later);
        assert_eq!(job.last_heartbeat, Some(later));
    }

    #[test]
    fn cancellation_marks_completed_with_flag() {
        let mut job = Job::new(JobKind::Crawl, "x".to_owned(), None, serde_json::json!({}));
        job.mark_cancelled();
        assert_eq!(job.status, JobStatus::Completed);
        assert!(job.cancelled);
        assert!(job.error_message.is_none());
    }

    #[test]
    fn restart_for_reuse_preserves_id_and_counters_but_resets_lifecycle() {
        let mut job = Job::new(JobKind::Crawl, "x".to_owned(), None, serde_json::json!({"a": 1}));
        let id = job.id;
        job.counters.pages_processed = 42;
        job.mark_failed("boom");

        job.restart_for_reuse(serde_json::json!({"a": 2}));

        assert_eq!(job.id, id);
        assert_eq!(job.counters.pages_processed, 42);
        assert!(job.is_running());
        assert_eq!(job.phase, Some(JobPhase::Crawling));
        assert!(job.error_message.is_none());
        assert!(!job.cancelled);
        assert_eq!(job.completed_at, None);
        assert_eq!(job.config, serde_json::json!({"a": 2}));
    }

    #[test]
    fn stall_detection_respects_threshold() {
        let mut job = Job::new(JobKind::Crawl, "x".to_owned(), None, serde_json::json!({}));
        let now = job.last_heartbeat.unwrap();
        job.last_heartbeat = Some(now - chrono::Duration::seconds(30));
        assert!(job.is_stalled(now, chrono::Duration::seconds(10)));
        assert!(!job.is_stalled(now, chrono::Duration::seconds(60)));
    }
}
