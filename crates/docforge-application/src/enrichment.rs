//! LLM Enrichment orchestration (C4) — at-most-once-per-fingerprint
//! application of the `LlmEnricher` port over a batch of parsed snippets.

use std::sync::Arc;

use docforge_domain::entities::CodeSnippet;
use docforge_domain::error::Result;
use docforge_domain::fingerprint::snippet_fingerprint;
use docforge_domain::ports::{LlmEnricher, OperationLogger};
use docforge_domain::value_objects::{DocumentId, EnrichmentInput, ParsedSnippet};
use tokio::sync::Semaphore;

/// Wraps an optional enricher. `None` models the cost guard: absent
/// provider credentials skip enrichment entirely, and every snippet is
/// persisted parser-only (§4.4 "cost guard").
pub struct Enrichment {
    enricher: Option<Arc<dyn LlmEnricher>>,
    semaphore: Arc<Semaphore>,
    logger: Arc<dyn OperationLogger>,
}

impl Enrichment {
    #[must_use]
    pub fn new(
        enricher: Option<Arc<dyn LlmEnricher>>,
        semaphore: Arc<Semaphore>,
        logger: Arc<dyn OperationLogger>,
    ) -> Self {
        Self {
            enricher,
            semaphore,
            logger,
        }
    }

    /// Build `CodeSnippet`s for one document's parsed output, enriching
    /// each through the LLM port unless an identical `code_hash` was
    /// already enriched earlier within the same document (§4.4 "at-most-
    /// once per fingerprint") or the cost guard is in effect.
    pub async fn enrich_document(
        &self,
        document_id: DocumentId,
        source_url: &str,
        parsed: Vec<ParsedSnippet>,
    ) -> Result<Vec<CodeSnippet>> {
        let mut by_hash: std::collections::HashMap<String, usize> = std::collections::HashMap::new();
        let mut snippets = Vec::with_capacity(parsed.len());

        for candidate in parsed {
            let code_hash = snippet_fingerprint(&candidate.code);
            if let Some(&existing_index) = by_hash.get(&code_hash) {
                let reused: &CodeSnippet = &snippets[existing_index];
                let mut snippet = reused.clone();
                snippet.id = docforge_domain::value_objects::SnippetId::new();
                snippet.line_start = candidate.line_start;
                snippet.line_end = candidate.line_end;
                snippet.context_before = candidate.context_before;
                snippet.context_after = candidate.context_after;
                snippets.push(snippet);
                continue;
            }

            let mut snippet = CodeSnippet::from_parsed(
                document_id,
                source_url.to_owned(),
                candidate.code.clone(),
                code_hash.clone(),
                candidate.language,
                candidate.line_start,
                candidate.line_end,
                candidate.context_before,
                candidate.context_after,
                candidate.section_title,
                candidate.section_content,
            );

            if let Some(enricher) = &self.enricher {
                let _permit = self.semaphore.acquire().await;
                let input = EnrichmentInput {
                    code: snippet.code_content.clone(),
                    language_hint: snippet.language.clone(),
                    section_title: snippet.section_title.clone(),
                    section_content: snippet.section_content.clone(),
                    context_before: snippet.context_before.clone(),
                    context_after: snippet.context_after.clone(),
                };
                match enricher.enrich(input).await {
                    Ok(result) => snippet.apply_enrichment(result),
                    Err(e) => {
                        self.logger.warn(
                            &format!("enrichment failed permanently for a snippet in {source_url}: {e}"),
                            &[("document_id", &document_id.to_string())],
                        );
                    }
                }
            }

            by_hash.insert(code_hash, snippets.len());
            snippets.push(snippet);
        }

        Ok(snippets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use docforge_domain::entities::SnippetType;
    use docforge_domain::value_objects::Enrichment as EnrichmentResult;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingEnricher {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl LlmEnricher for CountingEnricher {
        async fn enrich(&self, input: EnrichmentInput) -> Result<EnrichmentResult> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(EnrichmentResult {
                title: "enriched".into(),
                description: "desc".into(),
                language: input.language_hint.unwrap_or_else(|| "text".into()),
                snippet_type: SnippetType::Example,
                functions: vec![],
                imports: vec![],
                keywords: vec![],
            })
        }
    }

    struct NullLogger;
    impl OperationLogger for NullLogger {
        fn operation_started(&self, _operation: &str, _fields: &[(&str, &str)]) {}
        fn operation_completed(&self, _operation: &str, _fields: &[(&str, &str)]) {}
        fn operation_failed(&self, _operation: &str, _error: &str, _fields: &[(&str, &str)]) {}
        fn warn(&self, _message: &str, _fields: &[(&str, &str)]) {}
    }

    fn parsed(code: &str) -> ParsedSnippet {
        ParsedSnippet {
            order_index: 0,
            code: code.to_owned(),
            language: Some("python".into()),
            line_start: None,
            line_end: None,
            context_before: None,
            context_after: None,
            section_title: None,
            section_content: None,
        }
    }

    #[tokio::test]
    async fn identical_snippets_in_one_document_are_enriched_once() {
        let enricher = Arc::new(CountingEnricher {
            calls: AtomicUsize::new(0),
        });
        let pipeline = Enrichment::new(Some(enricher.clone()), Arc::new(Semaphore::new(1)), Arc::new(NullLogger));

        let doc_id = DocumentId::new();
        let snippets = pipeline
            .enrich_document(doc_id, "https://ex.test/doc", vec![parsed("print(1)\n"), parsed("print(1)\n")])
            .await
            .unwrap();

        assert_eq!(snippets.len(), 2);
        assert_eq!(enricher.calls.load(Ordering::SeqCst), 1);
        assert!(snippets.iter().all(|s| s.enriched));
    }

    #[tokio::test]
    async fn cost_guard_skips_enrichment_when_no_enricher_configured() {
        let pipeline = Enrichment::new(None, Arc::new(Semaphore::new(1)), Arc::new(NullLogger));

        let snippets = pipeline
            .enrich_document(DocumentId::new(), "https://ex.test/doc", vec![parsed("x = 1")])
            .await
            .unwrap();

        assert_eq!(snippets.len(), 1);
        assert!(!snippets[0].enriched);
        assert_eq!(snippets[0].title, "python snippet");
    }
}
