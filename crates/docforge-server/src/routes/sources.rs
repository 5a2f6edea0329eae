//! Source management (§4.9): list, search, rename, and delete. A `Source`
//! is a derived view over a `Job` (no dedicated storage row), so rename and
//! delete are expressed in terms of the job it's derived from.

use axum::extract::{Path, Query, State};
use axum::Json;
use docforge_domain::error::Error as DomainError;
use docforge_domain::value_objects::JobId;

use crate::dto::{
    DeleteSnippetsMatchingRequest, ListSourcesQuery, RenameSourceRequest, SearchLibrariesQuery, SourceFilterQuery, SourceView, SourcesPage,
};
use crate::error::ApiError;
use crate::state::AppState;

pub async fn list_sources(State(state): State<AppState>, Query(query): Query<ListSourcesQuery>) -> Result<Json<SourcesPage>, ApiError> {
    let page = state.store.list_sources(query.page, query.limit).await.map_err(ApiError::from)?;
    Ok(Json(SourcesPage::from(page)))
}

pub async fn search_sources(State(state): State<AppState>, Query(query): Query<SearchLibrariesQuery>) -> Result<Json<Vec<SourceView>>, ApiError> {
    let limit = query.limit.unwrap_or(20);
    let matches = state.searcher.search_libraries(&query.query, limit).await.map_err(ApiError::from)?;
    let mut sources = Vec::with_capacity(matches.len());
    for m in matches {
        sources.push(SourceView::from(state.store.get_source(m.job_id).await.map_err(ApiError::from)?));
    }
    Ok(Json(sources))
}

pub async fn get_source(State(state): State<AppState>, Path(job_id): Path<JobId>) -> Result<Json<SourceView>, ApiError> {
    let source = state.store.get_source(job_id).await.map_err(ApiError::from)?;
    Ok(Json(SourceView::from(source)))
}

pub async fn rename_source(
    State(state): State<AppState>,
    Path(job_id): Path<JobId>,
    Json(request): Json<RenameSourceRequest>,
) -> Result<Json<SourceView>, ApiError> {
    let mut job = state.store.get_job(job_id).await.map_err(ApiError::from)?;
    if let Some(existing) = state
        .store
        .find_job_by_name_version(job.kind, &request.name, request.version.as_deref())
        .await
        .map_err(ApiError::from)?
    {
        if existing.id != job_id {
            return Err(ApiError::from(DomainError::conflict(
                format!("a {} job named {:?} already exists", job.kind.as_str(), request.name),
                Some(existing.id.to_string()),
            )));
        }
    }

    job.name = request.name;
    job.version = request.version;
    state.store.update_job(&job).await.map_err(ApiError::from)?;

    let source = state.store.get_source(job_id).await.map_err(ApiError::from)?;
    Ok(Json(SourceView::from(source)))
}

pub async fn delete_source(State(state): State<AppState>, Path(job_id): Path<JobId>) -> Result<(), ApiError> {
    state.store.delete_job(job_id).await.map_err(ApiError::from)
}

#[derive(serde::Deserialize)]
pub struct BulkDeleteRequest {
    pub job_ids: Vec<JobId>,
}

pub async fn delete_sources_bulk(State(state): State<AppState>, Json(request): Json<BulkDeleteRequest>) -> Result<(), ApiError> {
    for job_id in request.job_ids {
        state.store.delete_job(job_id).await.map_err(ApiError::from)?;
    }
    Ok(())
}

pub async fn delete_sources_matching(State(state): State<AppState>, Query(filter): Query<SourceFilterQuery>) -> Result<Json<usize>, ApiError> {
    let page = state.store.list_sources(1, u32::MAX).await.map_err(ApiError::from)?;
    let matching: Vec<_> = page
        .items
        .into_iter()
        .filter(|source| filter.name_prefix.as_deref().is_none_or(|prefix| source.name.starts_with(prefix)))
        .collect();
    let count = matching.len();
    for source in matching {
        state.store.delete_job(source.job_id).await.map_err(ApiError::from)?;
    }
    Ok(Json(count))
}

/// Deletes every snippet under `job_id` matching the filter, by rewriting
/// each affected document's snippet set minus the matches. There is no
/// dedicated bulk-delete-snippets storage operation, so this walks the
/// job's documents through the existing `list_snippets_for_document` /
/// `replace_snippets_for_document` pair.
pub async fn delete_matching_snippets(
    State(state): State<AppState>,
    Path(job_id): Path<JobId>,
    Json(filter): Json<DeleteSnippetsMatchingRequest>,
) -> Result<Json<usize>, ApiError> {
    let documents = state.store.list_documents_for_job(job_id).await.map_err(ApiError::from)?;
    let mut deleted = 0usize;

    for document in documents {
        let snippets = state.store.list_snippets_for_document(document.id).await.map_err(ApiError::from)?;
        let (keep, remove): (Vec<_>, Vec<_>) = snippets.into_iter().partition(|s| !matches_filter(s, &filter));
        if remove.is_empty() {
            continue;
        }
        deleted += remove.len();
        state.store.replace_snippets_for_document(document.id, &keep).await.map_err(ApiError::from)?;
    }

    Ok(Json(deleted))
}

fn matches_filter(snippet: &docforge_domain::entities::CodeSnippet, filter: &DeleteSnippetsMatchingRequest) -> bool {
    if let Some(language) = &filter.language {
        if snippet.language.as_deref() != Some(language.as_str()) {
            return false;
        }
    }
    if let Some(prefix) = &filter.code_hash_prefix {
        if !snippet.code_hash.starts_with(prefix.as_str()) {
            return false;
        }
    }
    true
}
