//! FailedPage entity — records the last error for a page that failed to
//! process, without failing the owning job.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::JobId;

/// `(job_id, url)` is unique — a retry simply overwrites the prior error.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct FailedPage {
    pub job_id: JobId,
    pub url: String,
    pub error: String,
    pub occurred_at: DateTime<Utc>,
}

impl FailedPage {
    #[must_use]
    pub fn new(job_id: JobId, url: String, error: String) -> Self {
        Self {
            job_id,
            url,
            error,
            occurred_at: Utc::now(),
        }
    }
}
