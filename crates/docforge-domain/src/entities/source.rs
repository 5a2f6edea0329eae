//! Source — a logical, derived view over a job: `(name, version)` plus
//! aggregate counts. Not a persisted entity in its own right; it is the
//! result row of the Store's unioned `source_statistics` view.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::job::JobKind;
use crate::value_objects::JobId;

/// A named, versioned documentation corpus produced by one job. A source is
/// "visible" once its job owns at least one document.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct Source {
    pub job_id: JobId,
    pub job_kind: JobKind,
    pub name: String,
    pub version: Option<String>,
    pub document_count: u64,
    pub snippet_count: u64,
    pub last_updated: DateTime<Utc>,
}

impl Source {
    /// Display name combining `name` and `version`, e.g. `"Next.js v14"`.
    #[must_use]
    pub fn display_name(&self) -> String {
        match &self.version {
            Some(v) => format!("{} {v}", self.name),
            None => self.name.clone(),
        }
    }
}
