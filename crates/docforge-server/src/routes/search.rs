//! `search_libraries` and `get_content` (§4.8a/§4.8b).

use axum::extract::{Query, State};
use axum::Json;
use docforge_domain::value_objects::SearchFilters;

use crate::dto::{GetContentQuery, SearchLibrariesQuery, SearchLibrariesResponse, SnippetHit};
use crate::error::ApiError;
use crate::state::AppState;

const DEFAULT_LIMIT: u32 = 20;

pub async fn search_libraries(
    State(state): State<AppState>,
    Query(query): Query<SearchLibrariesQuery>,
) -> Result<Json<SearchLibrariesResponse>, ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT);
    let matches = state.searcher.search_libraries(&query.query, limit).await.map_err(ApiError::from)?;
    Ok(Json(SearchLibrariesResponse {
        total: matches.len(),
        sources: matches,
    }))
}

pub async fn get_content(State(state): State<AppState>, Query(query): Query<GetContentQuery>) -> Result<Json<Vec<SnippetHit>>, ApiError> {
    let filters = SearchFilters {
        language: None,
        source_job_id: Some(query.library_id),
    };
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT);
    let hits = state
        .searcher
        .get_content(query.query.as_deref().unwrap_or(""), &filters, query.search_mode, limit)
        .await
        .map_err(ApiError::from)?;
    Ok(Json(hits.into_iter().map(SnippetHit::from).collect()))
}
