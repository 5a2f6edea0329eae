//! MCP tool surface (§4.9) over the same application services the HTTP
//! routes use. Each tool mirrors one HTTP operation; `#[tool_router]` /
//! `#[tool_handler]` generate the `tools/list` and `tools/call` dispatch.

use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo};
use rmcp::{tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use schemars::JsonSchema;
use serde::Deserialize;

use docforge_domain::entities::JobKind;
use docforge_domain::value_objects::{CrawlConfig, JobId, SearchFilters, SearchMode, SnippetId};

use crate::chunking::chunk_at;
use crate::error::to_mcp_error;
use crate::state::AppState;

#[derive(Debug, Deserialize, JsonSchema)]
pub struct InitCrawlArgs {
    pub name: String,
    pub start_urls: Vec<String>,
    pub max_depth: u32,
    pub version: Option<String>,
    pub domain_filter: Option<String>,
    #[serde(default)]
    pub add_to_existing: bool,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct UploadMarkdownArgs {
    pub content: String,
    pub name: String,
    pub title: Option<String>,
    #[serde(default)]
    pub add_to_existing: bool,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SearchLibrariesArgs {
    pub query: String,
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetContentArgs {
    pub library_id: JobId,
    pub query: String,
    pub limit: Option<u32>,
    #[serde(default)]
    pub enhanced: bool,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetSnippetArgs {
    pub snippet_id: SnippetId,
    pub max_tokens: Option<usize>,
    #[serde(default)]
    pub chunk_index: usize,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetJobStatusArgs {
    pub job_id: JobId,
}

fn text_result(value: impl serde::Serialize) -> Result<CallToolResult, McpError> {
    let text = serde_json::to_string_pretty(&value).map_err(|e| McpError::internal_error(e.to_string(), None))?;
    Ok(CallToolResult::success(vec![Content::text(text)]))
}

/// Holds the same `AppState` the HTTP routes share; every tool method is a
/// thin translation from MCP arguments into an application-service call.
#[derive(Clone)]
pub struct McpServer {
    state: AppState,
}

#[tool_router]
impl McpServer {
    #[must_use]
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    #[tool(description = "Start crawling a documentation site and index its code snippets")]
    pub async fn init_crawl(&self, Parameters(args): Parameters<InitCrawlArgs>) -> Result<CallToolResult, McpError> {
        let config = CrawlConfig {
            start_urls: args.start_urls,
            max_depth: args.max_depth,
            domain_filter: args.domain_filter,
            url_patterns: None,
            max_concurrent: self.state.config.default_max_concurrent,
            ignore_hash: false,
            metadata: serde_json::json!({}),
        };
        let config_value = serde_json::to_value(&config).map_err(|e| McpError::internal_error(e.to_string(), None))?;
        let job = self
            .state
            .scheduler
            .create_job(JobKind::Crawl, args.name, args.version, config_value, args.add_to_existing)
            .await
            .map_err(to_mcp_error)?;
        let job_id = job.id;
        self.state.spawn_crawl(job, config);
        text_result(serde_json::json!({ "job_id": job_id }))
    }

    #[tool(description = "Upload a single Markdown document for indexing, synchronously")]
    pub async fn upload_markdown(&self, Parameters(args): Parameters<UploadMarkdownArgs>) -> Result<CallToolResult, McpError> {
        let (document_id, snippets_count) = self
            .state
            .ingestor
            .upload_markdown(args.content, args.name, args.title, args.add_to_existing)
            .await
            .map_err(to_mcp_error)?;
        text_result(serde_json::json!({ "document_id": document_id, "snippets_count": snippets_count }))
    }

    #[tool(description = "Resolve a free-text library name to its best-matching indexed sources")]
    pub async fn search_libraries(&self, Parameters(args): Parameters<SearchLibrariesArgs>) -> Result<CallToolResult, McpError> {
        let matches = self
            .state
            .searcher
            .search_libraries(&args.query, args.limit.unwrap_or(20))
            .await
            .map_err(to_mcp_error)?;
        text_result(matches)
    }

    #[tool(description = "Search indexed code snippets within one library, with an optional markdown fallback")]
    pub async fn get_content(&self, Parameters(args): Parameters<GetContentArgs>) -> Result<CallToolResult, McpError> {
        let filters = SearchFilters {
            language: None,
            source_job_id: Some(args.library_id),
        };
        let mode = if args.enhanced { SearchMode::Enhanced } else { SearchMode::Code };
        let hits = self
            .state
            .searcher
            .get_content(&args.query, &filters, mode, args.limit.unwrap_or(20))
            .await
            .map_err(to_mcp_error)?;
        text_result(hits)
    }

    #[tool(description = "Fetch one code snippet by id, chunked to a token budget")]
    pub async fn get_snippet(&self, Parameters(args): Parameters<GetSnippetArgs>) -> Result<CallToolResult, McpError> {
        let snippet = self.state.store.get_snippet(args.snippet_id).await.map_err(to_mcp_error)?;
        let chunk = chunk_at(&snippet.code_content, args.max_tokens, args.chunk_index);
        text_result(serde_json::json!({
            "snippet_id": snippet.id,
            "title": snippet.title,
            "code_content": chunk.text,
            "chunk_index": chunk.index,
            "total_chunks": chunk.total,
        }))
    }

    #[tool(description = "Check a crawl or upload job's progress and terminal status")]
    pub async fn get_job_status(&self, Parameters(args): Parameters<GetJobStatusArgs>) -> Result<CallToolResult, McpError> {
        let job = self.state.scheduler.get_job(args.job_id).await.map_err(to_mcp_error)?;
        text_result(job)
    }
}

#[tool_handler]
impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "docforge".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Default::default()
            },
            instructions: Some(
                "Crawl, upload, and search documentation as ranked code snippets with source URLs.".to_string(),
            ),
            ..Default::default()
        }
    }
}
