//! Request/response DTOs for the HTTP surface (§4.9). Kept separate from
//! the domain entities so wire shape can evolve independently of storage
//! shape; `From`/`TryFrom` conversions sit next to each struct.

use serde::{Deserialize, Serialize};
use validator::Validate;

use docforge_domain::entities::{CodeSnippet, Job, JobPhase, JobStatus, Source};
use docforge_domain::value_objects::{DocumentId, JobId, LibraryMatch, Page, SearchHit, SearchMode, SnippetId};

#[derive(Debug, Deserialize, Validate)]
pub struct InitCrawlRequest {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(min = 1))]
    pub start_urls: Vec<String>,
    #[validate(range(min = 0, max = 10))]
    pub max_depth: u32,
    pub version: Option<String>,
    pub domain_filter: Option<String>,
    pub url_patterns: Option<Vec<String>>,
    pub max_concurrent: Option<usize>,
    #[serde(default)]
    pub metadata: serde_json::Value,
    /// When `true` and a job with this `(name, version)` already exists and
    /// is not currently running, restart it in place rather than rejecting
    /// the request with a conflict (§4.7/§7).
    #[serde(default)]
    pub add_to_existing: bool,
}

#[derive(Debug, Serialize)]
pub struct JobAccepted {
    pub job_id: JobId,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UploadMarkdownRequest {
    #[validate(length(min = 1))]
    pub content: String,
    #[validate(length(min = 1))]
    pub name: String,
    pub title: Option<String>,
    #[serde(default)]
    pub add_to_existing: bool,
}

#[derive(Debug, Serialize)]
pub struct UploadMarkdownResponse {
    pub document_id: DocumentId,
    pub snippets_count: usize,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UploadFileDto {
    #[validate(length(min = 1))]
    pub path: String,
    pub content: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UploadFilesRequest {
    #[validate(length(min = 1))]
    pub name: String,
    pub version: Option<String>,
    pub title: Option<String>,
    pub max_concurrent: Option<usize>,
    #[validate(length(min = 1))]
    pub files: Vec<UploadFileDto>,
    #[serde(default)]
    pub add_to_existing: bool,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UploadRepoRequest {
    #[validate(url)]
    pub repo_url: String,
    pub name: Option<String>,
    pub version: Option<String>,
    pub path: Option<String>,
    pub branch: Option<String>,
    pub token: Option<String>,
    pub include: Option<Vec<String>>,
    pub exclude: Option<Vec<String>>,
    #[serde(default)]
    pub add_to_existing: bool,
}

#[derive(Debug, Deserialize)]
pub struct SearchLibrariesQuery {
    pub query: String,
    pub limit: Option<u32>,
    pub page: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct SearchLibrariesResponse {
    pub sources: Vec<LibraryMatch>,
    pub total: usize,
}

#[derive(Debug, Deserialize)]
pub struct GetContentQuery {
    pub library_id: JobId,
    pub query: Option<String>,
    pub limit: Option<u32>,
    pub page: Option<u32>,
    #[serde(default)]
    pub search_mode: SearchMode,
}

#[derive(Debug, Serialize)]
pub struct SnippetHit {
    pub snippet_id: SnippetId,
    pub document_id: DocumentId,
    pub title: String,
    pub description: Option<String>,
    pub language: Option<String>,
    pub code_content: String,
    pub source_url: String,
    pub document_title: Option<String>,
    pub found_via_docs: bool,
}

impl From<SearchHit> for SnippetHit {
    fn from(hit: SearchHit) -> Self {
        Self {
            snippet_id: hit.snippet_id,
            document_id: hit.document_id,
            title: hit.title,
            description: hit.description,
            language: hit.language,
            code_content: hit.code_content,
            source_url: hit.source_url,
            document_title: hit.document_title,
            found_via_docs: hit.found_via_docs,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct GetSnippetQuery {
    pub max_tokens: Option<usize>,
    #[serde(default)]
    pub chunk_index: usize,
}

#[derive(Debug, Serialize)]
pub struct ChunkedSnippet {
    pub snippet_id: SnippetId,
    pub title: String,
    pub code_content: String,
    pub chunk_index: usize,
    pub total_chunks: usize,
}

#[derive(Debug, Deserialize)]
pub struct GetPageMarkdownQuery {
    pub url: Option<String>,
    pub snippet_id: Option<SnippetId>,
    pub query: Option<String>,
    pub max_tokens: Option<usize>,
    #[serde(default)]
    pub chunk_index: usize,
}

#[derive(Debug, Serialize)]
pub struct ChunkedMarkdown {
    pub document_id: DocumentId,
    pub url: String,
    pub markdown: String,
    pub chunk_index: usize,
    pub total_chunks: usize,
    /// Snippets of surrounding text around each `query` match, when `query`
    /// was supplied (§4.9 "optional highlighted excerpts").
    pub highlights: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct JobView {
    pub id: JobId,
    pub kind: &'static str,
    pub name: String,
    pub version: Option<String>,
    pub status: JobStatus,
    pub phase: Option<JobPhase>,
    pub pages_processed: u64,
    pub files_processed: u64,
    pub snippets_extracted: u64,
    pub error_message: Option<String>,
    pub cancelled: bool,
}

impl From<Job> for JobView {
    fn from(job: Job) -> Self {
        Self {
            id: job.id,
            kind: job.kind.as_str(),
            name: job.name,
            version: job.version,
            status: job.status,
            phase: job.phase,
            pages_processed: job.counters.pages_processed,
            files_processed: job.counters.files_processed,
            snippets_extracted: job.counters.snippets_extracted,
            error_message: job.error_message,
            cancelled: job.cancelled,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ListSourcesQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    20
}

#[derive(Debug, Serialize)]
pub struct SourceView {
    pub job_id: JobId,
    pub name: String,
    pub version: Option<String>,
    pub display_name: String,
    pub document_count: u64,
    pub snippet_count: u64,
}

impl From<Source> for SourceView {
    fn from(source: Source) -> Self {
        Self {
            job_id: source.job_id,
            name: source.name.clone(),
            version: source.version.clone(),
            display_name: source.display_name(),
            document_count: source.document_count,
            snippet_count: source.snippet_count,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SourcesPage {
    pub items: Vec<SourceView>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
}

impl From<Page<Source>> for SourcesPage {
    fn from(page: Page<Source>) -> Self {
        Self {
            items: page.items.into_iter().map(SourceView::from).collect(),
            total: page.total,
            page: page.page,
            limit: page.limit,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct RenameSourceRequest {
    #[validate(length(min = 1))]
    pub name: String,
    pub version: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteSnippetsMatchingRequest {
    pub language: Option<String>,
    pub code_hash_prefix: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SourceFilterQuery {
    pub name_prefix: Option<String>,
}

#[must_use]
pub fn snippet_view(snippet: &CodeSnippet) -> SnippetHit {
    SnippetHit {
        snippet_id: snippet.id,
        document_id: snippet.document_id,
        title: snippet.title.clone(),
        description: snippet.description.clone(),
        language: snippet.language.clone(),
        code_content: snippet.code_content.clone(),
        source_url: snippet.source_url.clone(),
        document_title: None,
        found_via_docs: false,
    }
}
