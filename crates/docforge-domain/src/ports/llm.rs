//! LLM Enricher port (C4).

use async_trait::async_trait;

use crate::error::Result;
use crate::value_objects::{Enrichment, EnrichmentInput};

/// Structured-output enrichment of one extracted code snippet.
///
/// Implementations call out to an LLM; the application layer wraps this
/// port with concurrency limiting, retry, and the cost-guard fallback
/// described in §4.4 — this trait itself makes no retry promises.
#[async_trait]
pub trait LlmEnricher: Send + Sync {
    /// Produce a structured enrichment for one snippet. Returns
    /// `Error::Upstream` on provider failure and `Error::Transient` on
    /// retryable conditions (rate limit, timeout).
    async fn enrich(&self, input: EnrichmentInput) -> Result<Enrichment>;
}
