//! Construction of the process-wide LLM concurrency permit. One of the
//! three process-wide shared structures the design allows (§9 "Global
//! mutable state") — a single greedy job must not starve others of LLM
//! slots, so this is sized once at startup and shared across every job's
//! `Enrichment` pipeline.

use std::sync::Arc;

use tokio::sync::Semaphore;

#[must_use]
pub fn build_llm_semaphore(concurrency: usize) -> Arc<Semaphore> {
    Arc::new(Semaphore::new(concurrency.max(1)))
}
