//! Searcher (C8) — library resolution and two-stage code/markdown search.

use std::sync::Arc;

use docforge_domain::constants::{DEFAULT_FALLBACK_DOCUMENT_CAP, DEFAULT_FALLBACK_THRESHOLD};
use docforge_domain::error::Result;
use docforge_domain::ports::StoreRepository;
use docforge_domain::value_objects::{
    DocumentId, LibraryMatch, Page, SearchFilters, SearchHit, SearchMode,
};

/// Drives `search_libraries` (4.8a) and `get_content` (4.8b) against the
/// Store. Stateless beyond its collaborators and the two tunables below.
pub struct Searcher {
    store: Arc<dyn StoreRepository>,
    fallback_threshold: usize,
    fallback_document_cap: usize,
}

impl Searcher {
    #[must_use]
    pub fn new(store: Arc<dyn StoreRepository>) -> Self {
        Self {
            store,
            fallback_threshold: DEFAULT_FALLBACK_THRESHOLD,
            fallback_document_cap: DEFAULT_FALLBACK_DOCUMENT_CAP,
        }
    }

    #[must_use]
    pub fn with_fallback_tuning(mut self, threshold: usize, document_cap: usize) -> Self {
        self.fallback_threshold = threshold;
        self.fallback_document_cap = document_cap;
        self
    }

    /// 4.8a: resolve a free-text library name to its best-matching Sources.
    pub async fn search_libraries(&self, query: &str, limit: u32) -> Result<Vec<LibraryMatch>> {
        self.store.search_libraries(query, limit).await
    }

    /// 4.8b: primary snippet search, with the markdown fallback stage run
    /// per `mode` and the scarcity threshold. Results are ordered
    /// `(is_primary DESC, rank DESC, id ASC)` — the Store's primary query
    /// already returns hits ranked by `ts_rank`; fallback hits are appended
    /// after every primary hit regardless of any notional score (4.8,
    /// invariant 9).
    pub async fn get_content(
        &self,
        query: &str,
        filters: &SearchFilters,
        mode: SearchMode,
        limit: u32,
    ) -> Result<Vec<SearchHit>> {
        let mut primary = self.store.search_snippets(query, filters, limit).await?;
        primary.sort_by(|a, b| {
            b.rank
                .partial_cmp(&a.rank)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.snippet_id.0.cmp(&b.snippet_id.0))
        });

        let needs_fallback = mode == SearchMode::Enhanced || primary.len() < self.fallback_threshold;
        if !needs_fallback {
            return Ok(primary);
        }

        let document_ids = self
            .store
            .search_documents_markdown(query, filters, self.fallback_document_cap as u32)
            .await?;

        let mut seen_snippets: std::collections::HashSet<_> =
            primary.iter().map(|hit| hit.snippet_id).collect();
        let mut fallback_hits = Vec::new();
        for document_id in document_ids {
            for hit in self.fallback_hits_for_document(document_id).await? {
                if seen_snippets.insert(hit.snippet_id) {
                    fallback_hits.push(hit);
                }
            }
        }
        fallback_hits.sort_by_key(|hit| hit.snippet_id.0);

        let remaining = (limit as usize).saturating_sub(primary.len());
        primary.extend(fallback_hits.into_iter().take(remaining));
        Ok(primary)
    }

    /// Turn one fallback-matched document's existing snippets into
    /// `found_via_docs=true` hits (§4.8 step 2: "retrieve all of its
    /// snippets and union them into the result set").
    async fn fallback_hits_for_document(&self, document_id: DocumentId) -> Result<Vec<SearchHit>> {
        let document = self.store.get_document(document_id).await?;
        let snippets = self.store.list_snippets_for_document(document_id).await?;
        Ok(snippets
            .into_iter()
            .map(|snippet| SearchHit {
                snippet_id: snippet.id,
                document_id,
                title: snippet.title,
                description: snippet.description,
                language: snippet.language,
                code_content: snippet.code_content,
                snippet_type: snippet.snippet_type,
                source_url: snippet.source_url,
                document_title: document.title.clone(),
                rank: None,
                found_via_docs: true,
            })
            .collect())
    }

    pub async fn list_sources(&self, page: u32, limit: u32) -> Result<Page<docforge_domain::entities::Source>> {
        self.store.list_sources(page, limit).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use docforge_domain::entities::{CodeSnippet, ContentType, Document, FailedPage, Job, JobKind, Source, SnippetRelationship, SnippetType};
    use docforge_domain::error::Error;
    use docforge_domain::ports::store::{DocumentUpsertOutcome, StoreStatistics};
    use docforge_domain::value_objects::{JobId, RelatedSnippet, RelationshipId, SnippetId};
    use std::collections::HashMap;
    use std::sync::Mutex;

    struct FakeStore {
        primary_hits: Vec<SearchHit>,
        documents: Mutex<HashMap<DocumentId, Document>>,
        document_snippets: HashMap<DocumentId, Vec<CodeSnippet>>,
        fallback_docs: Vec<DocumentId>,
    }

    #[async_trait]
    #[allow(clippy::unimplemented)]
    impl StoreRepository for FakeStore {
        async fn create_job(&self, _job: &Job) -> Result<()> {
            unimplemented!()
        }
        async fn get_job(&self, _id: JobId) -> Result<Job> {
            unimplemented!()
        }
        async fn update_job(&self, _job: &Job) -> Result<()> {
            unimplemented!()
        }
        async fn list_running_jobs(&self, _kind: Option<JobKind>) -> Result<Vec<Job>> {
            unimplemented!()
        }
        async fn find_job_by_name_version(&self, _kind: JobKind, _name: &str, _version: Option<&str>) -> Result<Option<Job>> {
            unimplemented!()
        }
        async fn upsert_document(&self, _document: &Document) -> Result<DocumentUpsertOutcome> {
            unimplemented!()
        }
        async fn get_document(&self, id: DocumentId) -> Result<Document> {
            self.documents.lock().unwrap().get(&id).cloned().ok_or_else(|| Error::not_found("document"))
        }
        async fn find_document_by_url(&self, _url: &str) -> Result<Option<Document>> {
            unimplemented!()
        }
        async fn list_documents_for_job(&self, _job_id: JobId) -> Result<Vec<Document>> {
            unimplemented!()
        }
        async fn list_snippets_for_document(&self, document_id: DocumentId) -> Result<Vec<CodeSnippet>> {
            Ok(self.document_snippets.get(&document_id).cloned().unwrap_or_default())
        }
        async fn replace_snippets_for_document(&self, _document_id: DocumentId, _snippets: &[CodeSnippet]) -> Result<usize> {
            unimplemented!()
        }
        async fn get_snippet(&self, _id: SnippetId) -> Result<CodeSnippet> {
            unimplemented!()
        }
        async fn save_enrichment(&self, _snippet: &CodeSnippet) -> Result<()> {
            unimplemented!()
        }
        async fn record_failed_page(&self, _page: &FailedPage) -> Result<()> {
            unimplemented!()
        }
        async fn list_failed_pages(&self, _job_id: JobId) -> Result<Vec<FailedPage>> {
            unimplemented!()
        }
        async fn create_relationship(&self, _relationship: &SnippetRelationship) -> Result<()> {
            unimplemented!()
        }
        async fn find_related_snippets(&self, _snippet_id: SnippetId) -> Result<Vec<RelatedSnippet>> {
            unimplemented!()
        }
        async fn list_sources(&self, _page: u32, _limit: u32) -> Result<Page<Source>> {
            unimplemented!()
        }
        async fn get_source(&self, _job_id: JobId) -> Result<Source> {
            unimplemented!()
        }
        async fn search_libraries(&self, _query: &str, _limit: u32) -> Result<Vec<LibraryMatch>> {
            unimplemented!()
        }
        async fn search_snippets(&self, _query: &str, _filters: &SearchFilters, limit: u32) -> Result<Vec<SearchHit>> {
            Ok(self.primary_hits.iter().take(limit as usize).cloned().collect())
        }
        async fn search_documents_markdown(&self, _query: &str, _filters: &SearchFilters, limit: u32) -> Result<Vec<DocumentId>> {
            Ok(self.fallback_docs.iter().take(limit as usize).copied().collect())
        }
        async fn get_document_markdown(&self, _document_id: DocumentId) -> Result<String> {
            unimplemented!()
        }
        async fn delete_job(&self, _job_id: JobId) -> Result<()> {
            unimplemented!()
        }
        async fn cancel_job(&self, _job_id: JobId) -> Result<()> {
            unimplemented!()
        }
        async fn statistics(&self) -> Result<StoreStatistics> {
            unimplemented!()
        }
        async fn heartbeat_job(&self, _job_id: JobId, _at: chrono::DateTime<chrono::Utc>) -> Result<()> {
            unimplemented!()
        }
        async fn list_relationship_id(&self, _id: RelationshipId) -> Result<SnippetRelationship> {
            unimplemented!()
        }
    }

    fn hit(snippet_id: SnippetId, document_id: DocumentId, rank: Option<f32>) -> SearchHit {
        SearchHit {
            snippet_id,
            document_id,
            title: "t".into(),
            description: None,
            language: None,
            code_content: "code".into(),
            snippet_type: SnippetType::Code,
            source_url: "https://ex.test/doc".into(),
            document_title: None,
            rank,
            found_via_docs: false,
        }
    }

    fn document(url: &str) -> Document {
        Document::new(
            url.into(),
            JobId::new(),
            JobKind::Crawl,
            None,
            ContentType::Markdown,
            "hash".into(),
            "body".into(),
            0,
            None,
        )
    }

    fn snippet(document_id: DocumentId) -> CodeSnippet {
        CodeSnippet::from_parsed(
            document_id,
            "https://ex.test/doc".into(),
            "code".into(),
            "hash".into(),
            None,
            None,
            None,
            None,
            None,
            None,
            None,
        )
    }

    #[tokio::test]
    async fn primary_hits_precede_fallback_hits_regardless_of_rank() {
        let doc_id = DocumentId::new();
        let snippet_a = SnippetId::new();
        let snippet_b = SnippetId::new();

        let mut documents = HashMap::new();
        documents.insert(doc_id, document("https://ex.test/doc"));

        let mut document_snippets = HashMap::new();
        document_snippets.insert(doc_id, vec![snippet(doc_id)]);

        let store = FakeStore {
            primary_hits: vec![hit(snippet_a, doc_id, Some(0.9)), hit(snippet_b, doc_id, Some(0.1))],
            documents: Mutex::new(documents),
            document_snippets,
            fallback_docs: vec![doc_id],
        };

        let searcher = Searcher::new(Arc::new(store)).with_fallback_tuning(1, 10);
        let hits = searcher
            .get_content("middleware", &SearchFilters::default(), SearchMode::Code, 10)
            .await
            .unwrap();

        assert_eq!(hits[0].rank, Some(0.9));
        assert!(hits.iter().any(|h| h.found_via_docs));
    }

    #[tokio::test]
    async fn skips_fallback_when_primary_is_plentiful_and_mode_is_code() {
        let doc_id = DocumentId::new();
        let store = FakeStore {
            primary_hits: (0..6).map(|i| hit(SnippetId::new(), doc_id, Some(i as f32))).collect(),
            documents: Mutex::new(HashMap::new()),
            document_snippets: HashMap::new(),
            fallback_docs: vec![doc_id],
        };

        let searcher = Searcher::new(Arc::new(store));
        let hits = searcher
            .get_content("middleware", &SearchFilters::default(), SearchMode::Code, 10)
            .await
            .unwrap();

        assert_eq!(hits.len(), 6);
        assert!(hits.iter().all(|h| !h.found_via_docs));
    }
}
