//! Progress Bus port (C10) — per-job event fan-out to WebSocket subscribers.

use serde::{Deserialize, Serialize};

use crate::entities::JobPhase;
use crate::value_objects::JobId;

/// Counters snapshot carried by `crawl_update`/`upload_update` events.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct JobProgressData {
    pub phase: Option<JobPhase>,
    pub pages_processed: u64,
    pub files_processed: u64,
    pub snippets_extracted: u64,
}

/// Payload of a `completed` event.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct CompletionData {
    pub cancelled: bool,
}

/// Payload of a `failed` event.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct FailureData {
    pub error_message: String,
}

/// Payload of a `heartbeat` event.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct HeartbeatData {
    pub last_heartbeat: chrono::DateTime<chrono::Utc>,
}

/// One progress update emitted by a running job, wired as `{type, job_id,
/// data}` (§4.10) with `type` drawn from the documented fixed set. Cheap to
/// clone; broadcast to every subscriber of the job's channel.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProgressEvent {
    CrawlUpdate { job_id: JobId, data: JobProgressData },
    UploadUpdate { job_id: JobId, data: JobProgressData },
    Completed { job_id: JobId, data: CompletionData },
    Failed { job_id: JobId, data: FailureData },
    Heartbeat { job_id: JobId, data: HeartbeatData },
}

impl ProgressEvent {
    #[must_use]
    pub fn job_id(&self) -> JobId {
        match self {
            Self::CrawlUpdate { job_id, .. }
            | Self::UploadUpdate { job_id, .. }
            | Self::Completed { job_id, .. }
            | Self::Failed { job_id, .. }
            | Self::Heartbeat { job_id, .. } => *job_id,
        }
    }
}

/// Publishing half of the Progress Bus, used by job drivers. Subscribing is
/// an infrastructure-side concern (the adapter exposes a `subscribe`
/// method returning a `tokio::sync::broadcast::Receiver`, which isn't
/// object-safe to place behind this trait) — this port only needs to be
/// mockable for the application layer's unit tests.
pub trait ProgressPublisher: Send + Sync {
    /// Publish an event to subscribers of `event.job_id()`. Never blocks and
    /// never fails when there are no subscribers — a dropped event is
    /// acceptable (§4.10: "progress is best-effort, not a system of
    /// record").
    fn publish(&self, event: ProgressEvent);
}
