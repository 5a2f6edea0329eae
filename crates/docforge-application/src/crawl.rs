//! Web Crawl Driver (C5) — BFS-by-depth page fetcher feeding the parser
//! and enrichment stages.

use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use globset::{Glob, GlobSetBuilder};
use tokio::sync::{mpsc, Mutex, Semaphore};
use url::Url;

use docforge_domain::entities::{ContentType, Document, FailedPage, Job, JobKind, JobPhase};
use docforge_domain::error::Result;
use docforge_domain::fingerprint::document_fingerprint;
use docforge_domain::ports::store::DocumentUpsertOutcome;
use docforge_domain::ports::{OperationLogger, PageRenderer, StoreRepository};
use docforge_domain::value_objects::CrawlConfig;
use docforge_providers::parser::parse;

use crate::enrichment::Enrichment;
use crate::jobs::JobScheduler;

/// Shared, job-scoped frontier state. A `Mutex` rather than a lock-free
/// structure: the frontier is popped/pushed by at most `max_concurrent`
/// workers and contention is not the bottleneck (network I/O is).
struct Frontier {
    queue: Mutex<VecDeque<(String, i32, Option<String>)>>,
    visited: Mutex<HashSet<String>>,
}

/// Drives one crawl job to completion. Constructed fresh per job.
pub struct CrawlDriver {
    store: Arc<dyn StoreRepository>,
    renderer: Arc<dyn PageRenderer>,
    enrichment: Arc<Enrichment>,
    scheduler: Arc<JobScheduler>,
    logger: Arc<dyn OperationLogger>,
}

impl CrawlDriver {
    #[must_use]
    pub fn new(
        store: Arc<dyn StoreRepository>,
        renderer: Arc<dyn PageRenderer>,
        enrichment: Arc<Enrichment>,
        scheduler: Arc<JobScheduler>,
        logger: Arc<dyn OperationLogger>,
    ) -> Self {
        Self {
            store,
            renderer,
            enrichment,
            scheduler,
            logger,
        }
    }

    /// Run the crawl described by `config` under `job`, returning once the
    /// frontier has drained or the job has been cancelled. `cancel` is
    /// checked between pages, satisfying §5's "cancellation observed
    /// between pages and between snippet enrichments."
    pub async fn run(&self, mut job: Job, config: CrawlConfig, cancel: Arc<AtomicBool>) -> Result<()> {
        let domain_filter = config.domain_filter.clone();
        let url_patterns = build_globset(config.url_patterns.as_deref());

        let frontier = Arc::new(Frontier {
            queue: Mutex::new(config.start_urls.iter().map(|u| (u.clone(), 0, None)).collect()),
            visited: Mutex::new(config.start_urls.iter().cloned().collect()),
        });

        let semaphore = Arc::new(Semaphore::new(config.max_concurrent.max(1)));
        let (tx, mut rx) = mpsc::channel::<()>(config.max_concurrent.max(1) * 4);

        let mut in_flight = 0usize;
        loop {
            if cancel.load(Ordering::SeqCst) {
                self.scheduler.cancel_job(job.id).await?;
                return Ok(());
            }

            let next = {
                let mut queue = frontier.queue.lock().await;
                queue.pop_front()
            };

            let Some((url, depth, parent_url)) = next else {
                if in_flight == 0 {
                    break;
                }
                rx.recv().await;
                in_flight -= 1;
                continue;
            };

            if depth > config.max_depth as i32 {
                continue;
            }

            let permit = semaphore.clone().acquire_owned().await.ok();
            let tx = tx.clone();
            let frontier = frontier.clone();
            let store = self.store.clone();
            let renderer = self.renderer.clone();
            let enrichment = self.enrichment.clone();
            let domain_filter = domain_filter.clone();
            let url_patterns = url_patterns.clone();
            let job_id = job.id;
            let ignore_hash = config.ignore_hash;
            let logger = self.logger.clone();

            in_flight += 1;
            tokio::spawn(async move {
                let _permit = permit;
                let outcome = process_page(
                    &store,
                    &renderer,
                    &enrichment,
                    job_id,
                    &url,
                    depth,
                    parent_url,
                    ignore_hash,
                )
                .await;

                match outcome {
                    Ok(links) => {
                        let mut queue = frontier.queue.lock().await;
                        let mut visited = frontier.visited.lock().await;
                        for link in links {
                            if !passes_filters(&link, domain_filter.as_deref(), url_patterns.as_ref()) {
                                continue;
                            }
                            if visited.insert(link.clone()) {
                                queue.push_back((link, depth + 1, Some(url.clone())));
                            }
                        }
                    }
                    Err(e) => {
                        logger.warn(&format!("page {url} failed: {e}"), &[("job_id", &job_id.to_string())]);
                        let _ = store.record_failed_page(&FailedPage::new(job_id, url, e.to_string())).await;
                    }
                }

                let _ = tx.send(()).await;
            });

            job.counters.pages_processed += 1;
            self.scheduler.update_progress(job.clone()).await?;

            while rx.try_recv().is_ok() {
                in_flight = in_flight.saturating_sub(1);
            }
        }

        job.phase = Some(JobPhase::Finalizing);
        self.scheduler.update_progress(job.clone()).await?;
        self.scheduler.complete_job(job).await?;
        Ok(())
    }
}

#[allow(clippy::too_many_arguments)]
async fn process_page(
    store: &Arc<dyn StoreRepository>,
    renderer: &Arc<dyn PageRenderer>,
    enrichment: &Arc<Enrichment>,
    job_id: docforge_domain::value_objects::JobId,
    url: &str,
    depth: i32,
    parent_url: Option<String>,
    ignore_hash: bool,
) -> Result<Vec<String>> {
    let rendered = renderer.render(url).await?;
    let content_hash = document_fingerprint(&rendered.markdown);

    if !ignore_hash {
        if let Some(existing) = store.find_document_by_url(&rendered.final_url).await? {
            if existing.is_unchanged(&content_hash) {
                return Ok(rendered.links);
            }
        }
    }

    let document = Document::new(
        rendered.final_url.clone(),
        job_id,
        JobKind::Crawl,
        rendered.title.clone(),
        ContentType::Markdown,
        content_hash,
        rendered.markdown.clone(),
        depth,
        parent_url,
    );

    let outcome = store.upsert_document(&document).await?;
    if outcome != DocumentUpsertOutcome::Unchanged {
        let parsed = parse(&rendered.markdown, ContentType::Markdown, docforge_domain::constants::DEFAULT_MIN_SNIPPET_LENGTH);
        let snippets = enrichment.enrich_document(document.id, &document.url, parsed).await?;
        store.replace_snippets_for_document(document.id, &snippets).await?;
    }

    Ok(rendered.links)
}

fn build_globset(patterns: Option<&[String]>) -> Option<Arc<globset::GlobSet>> {
    let patterns = patterns?;
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        if let Ok(glob) = Glob::new(pattern) {
            builder.add(glob);
        }
    }
    builder.build().ok().map(Arc::new)
}

fn passes_filters(url: &str, domain_filter: Option<&str>, patterns: Option<&Arc<globset::GlobSet>>) -> bool {
    let Ok(parsed) = Url::parse(url) else {
        return false;
    };

    if let Some(domain) = domain_filter {
        let host = parsed.host_str().unwrap_or_default();
        if host != domain && !host.ends_with(&format!(".{domain}")) {
            return false;
        }
    }

    if let Some(set) = patterns {
        if !set.is_match(url) {
            return false;
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_filter_allows_subdomains_and_rejects_others() {
        assert!(passes_filters("https://docs.ex.test/a", Some("ex.test"), None));
        assert!(passes_filters("https://ex.test/a", Some("ex.test"), None));
        assert!(!passes_filters("https://other.test/a", Some("ex.test"), None));
    }

    #[test]
    fn url_pattern_glob_is_enforced_when_present() {
        let set = build_globset(Some(&["https://ex.test/docs/**".to_owned()]));
        assert!(passes_filters("https://ex.test/docs/middleware", None, set.as_ref()));
        assert!(!passes_filters("https://ex.test/blog/post", None, set.as_ref()));
    }

    #[test]
    fn malformed_url_never_passes_filters() {
        assert!(!passes_filters("not a url", None, None));
    }
}
