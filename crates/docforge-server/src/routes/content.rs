//! `get_snippet` and `get_page_markdown` (§4.9), both paginated via the
//! shared chunk/token policy.

use axum::extract::{Path, Query, State};
use axum::Json;
use docforge_domain::error::Error as DomainError;
use docforge_domain::value_objects::SnippetId;

use crate::chunking::{chunk_at, highlight_excerpts};
use crate::dto::{ChunkedMarkdown, ChunkedSnippet, GetPageMarkdownQuery, GetSnippetQuery};
use crate::error::ApiError;
use crate::state::AppState;

const HIGHLIGHT_WINDOW_CHARS: usize = 80;

pub async fn get_snippet(
    State(state): State<AppState>,
    Path(snippet_id): Path<SnippetId>,
    Query(query): Query<GetSnippetQuery>,
) -> Result<Json<ChunkedSnippet>, ApiError> {
    let snippet = state.store.get_snippet(snippet_id).await.map_err(ApiError::from)?;
    let chunk = chunk_at(&snippet.code_content, query.max_tokens, query.chunk_index);
    Ok(Json(ChunkedSnippet {
        snippet_id: snippet.id,
        title: snippet.title,
        code_content: chunk.text,
        chunk_index: chunk.index,
        total_chunks: chunk.total,
    }))
}

pub async fn get_page_markdown(
    State(state): State<AppState>,
    Query(query): Query<GetPageMarkdownQuery>,
) -> Result<Json<ChunkedMarkdown>, ApiError> {
    let document = if let Some(snippet_id) = query.snippet_id {
        let snippet = state.store.get_snippet(snippet_id).await.map_err(ApiError::from)?;
        state.store.get_document(snippet.document_id).await.map_err(ApiError::from)?
    } else if let Some(url) = &query.url {
        state
            .store
            .find_document_by_url(url)
            .await
            .map_err(ApiError::from)?
            .ok_or_else(|| ApiError::from(DomainError::not_found(format!("document with url {url:?}"))))?
    } else {
        return Err(ApiError::from(DomainError::validation("one of `url` or `snippet_id` is required")));
    };

    let markdown = state.store.get_document_markdown(document.id).await.map_err(ApiError::from)?;
    let chunk = chunk_at(&markdown, query.max_tokens, query.chunk_index);
    let highlights = query
        .query
        .as_deref()
        .map(|q| highlight_excerpts(&chunk.text, q, HIGHLIGHT_WINDOW_CHARS))
        .unwrap_or_default();

    Ok(Json(ChunkedMarkdown {
        document_id: document.id,
        url: document.url,
        markdown: chunk.text,
        chunk_index: chunk.index,
        total_chunks: chunk.total,
        highlights,
    }))
}
