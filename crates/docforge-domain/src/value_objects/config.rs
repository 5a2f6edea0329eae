//! Immutable configuration value objects for crawl/upload/repo jobs.

use serde::{Deserialize, Serialize};

/// Parameters for `init_crawl` (§4.9). Stored verbatim in `Job::config` so a
/// recrawl can clone it without re-parsing the original request.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct CrawlConfig {
    pub start_urls: Vec<String>,
    pub max_depth: u32,
    /// Restrict crawling to this domain (and its subdomains), if set.
    pub domain_filter: Option<String>,
    /// Glob patterns a URL must match to be followed, if set.
    pub url_patterns: Option<Vec<String>>,
    /// Worker pool size for this job.
    pub max_concurrent: usize,
    /// Skip the content-hash fast path and force re-extraction even for
    /// unchanged pages.
    pub ignore_hash: bool,
    /// Caller-supplied free-form metadata, echoed back on the job record.
    pub metadata: serde_json::Value,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            start_urls: Vec::new(),
            max_depth: 2,
            domain_filter: None,
            url_patterns: None,
            max_concurrent: 5,
            ignore_hash: false,
            metadata: serde_json::json!({}),
        }
    }
}

/// Parameters for `upload_files` (§4.9).
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct UploadConfig {
    pub version: Option<String>,
    pub title: Option<String>,
    pub max_concurrent: usize,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            version: None,
            title: None,
            max_concurrent: 5,
        }
    }
}

/// Parameters for `upload_repo` (§4.9).
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct RepoConfig {
    pub repo_url: String,
    pub version: Option<String>,
    /// Sparse subtree to clone, if set; otherwise the whole repo.
    pub path: Option<String>,
    pub branch: Option<String>,
    /// Access token for private repos; never persisted in job metadata.
    #[serde(skip_serializing)]
    pub token: Option<String>,
    pub include: Option<Vec<String>>,
    pub exclude: Option<Vec<String>>,
    /// Keep the clone directory after the job finishes instead of deleting it.
    pub retain_clone: bool,
}

/// Directories always excluded from a repo ingestion regardless of
/// `include`/`exclude` globs.
pub const DEFAULT_EXCLUDED_DIRS: &[&str] = &[".git", "node_modules", "target", "dist", "build", ".next"];
