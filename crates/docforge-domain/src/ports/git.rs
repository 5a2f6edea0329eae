//! Git/VCS provider port (C6) — shallow clone for `upload_repo`.

use async_trait::async_trait;
use std::path::PathBuf;

use crate::error::Result;
use crate::value_objects::RepoConfig;

/// A clone checked out to a local, temporary directory. Implementations are
/// responsible for cleanup unless `RepoConfig::retain_clone` is set.
pub struct ClonedRepo {
    pub root: PathBuf,
    /// Subdirectory within `root` to walk, honoring `RepoConfig::path`.
    pub walk_root: PathBuf,
}

/// Shallow-clones a repository for ingestion by the upload/repo ingestor.
#[async_trait]
pub trait GitProvider: Send + Sync {
    async fn shallow_clone(&self, config: &RepoConfig) -> Result<ClonedRepo>;

    /// Remove a clone's directory tree. The ingestor calls this once it has
    /// finished walking `repo`, unless the originating `RepoConfig` had
    /// `retain_clone` set, in which case it is never called.
    async fn cleanup(&self, repo: &ClonedRepo) -> Result<()>;
}
