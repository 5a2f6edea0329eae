//! Git/VCS provider (C6) — shallow clone for `upload_repo` via `git2`.

use async_trait::async_trait;
use git2::{build::RepoBuilder, FetchOptions, RemoteCallbacks};
use tempfile::TempDir;

use docforge_domain::error::{Error, Result};
use docforge_domain::ports::git::{ClonedRepo, GitProvider};
use docforge_domain::value_objects::RepoConfig;

pub struct Git2Provider;

impl Git2Provider {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for Git2Provider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GitProvider for Git2Provider {
    async fn shallow_clone(&self, config: &RepoConfig) -> Result<ClonedRepo> {
        let config = config.clone();
        let (root, walk_root) = tokio::task::spawn_blocking(move || clone_blocking(&config))
            .await
            .map_err(|e| Error::internal(format!("git clone task panicked: {e}")))??;

        Ok(ClonedRepo { root, walk_root })
    }

    async fn cleanup(&self, repo: &ClonedRepo) -> Result<()> {
        let root = repo.root.clone();
        tokio::task::spawn_blocking(move || std::fs::remove_dir_all(&root))
            .await
            .map_err(|e| Error::internal(format!("cleanup task panicked: {e}")))?
            .map_err(|e| Error::Io { source: e })
    }
}

/// Clones into a fresh temp directory and always hands ownership of its
/// path to the caller (turning off the `TempDir` guard's drop-cleanup);
/// `GitProvider::cleanup` is the only thing that removes it afterwards.
fn clone_blocking(config: &RepoConfig) -> Result<(std::path::PathBuf, std::path::PathBuf)> {
    let dir = TempDir::new().map_err(|e| Error::Io { source: e })?;
    let root = dir.keep();

    let mut callbacks = RemoteCallbacks::new();
    if let Some(token) = config.token.clone() {
        callbacks.credentials(move |_url, _username, _allowed| git2::Cred::userpass_plaintext(&token, ""));
    }

    let mut fetch_options = FetchOptions::new();
    fetch_options.depth(1).remote_callbacks(callbacks);

    let mut builder = RepoBuilder::new();
    builder.fetch_options(fetch_options);
    if let Some(branch) = &config.branch {
        builder.branch(branch);
    }

    builder
        .clone(&config.repo_url, &root)
        .map_err(|e| Error::upstream_with_source("git", format!("clone of {} failed", config.repo_url), e))?;

    let walk_root = match &config.path {
        Some(sub) => root.join(sub),
        None => root.clone(),
    };

    Ok((root, walk_root))
}
