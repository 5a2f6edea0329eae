use docforge_domain::entities::SnippetType;
use docforge_domain::error::{Error, Result};
use docforge_domain::value_objects::{DocumentId, LibraryMatch, LibraryMatchKind, SearchFilters, SearchHit, SnippetId};

use super::PostgresStore;

#[derive(sqlx::FromRow)]
struct SearchHitRow {
    snippet_id: uuid::Uuid,
    document_id: uuid::Uuid,
    title: String,
    description: Option<String>,
    language: Option<String>,
    code_content: String,
    snippet_type: String,
    source_url: String,
    document_title: Option<String>,
    rank: f32,
}

fn hit_from_row(row: SearchHitRow) -> Result<SearchHit> {
    Ok(SearchHit {
        snippet_id: SnippetId(row.snippet_id),
        document_id: DocumentId(row.document_id),
        title: row.title,
        description: row.description,
        language: row.language,
        code_content: row.code_content,
        snippet_type: match row.snippet_type.as_str() {
            "function" => SnippetType::Function,
            "class" => SnippetType::Class,
            "example" => SnippetType::Example,
            "config" => SnippetType::Config,
            "code" => SnippetType::Code,
            other => return Err(Error::internal(format!("unknown snippet type {other:?} in storage"))),
        },
        source_url: row.source_url,
        document_title: row.document_title,
        rank: Some(row.rank),
        found_via_docs: false,
    })
}

impl PostgresStore {
    /// Primary ranked search over the weighted `search_vector` (§4.8 step 1).
    pub(super) async fn search_snippets_impl(
        &self,
        query: &str,
        filters: &SearchFilters,
        limit: u32,
    ) -> Result<Vec<SearchHit>> {
        let rows: Vec<SearchHitRow> = sqlx::query_as(
            "SELECT s.id AS snippet_id, s.document_id, s.title, s.description, s.language,
                s.code_content, s.snippet_type, s.source_url, d.title AS document_title,
                ts_rank(s.search_vector, plainto_tsquery('english', $1))::real AS rank
             FROM code_snippets s
             JOIN documents d ON d.id = s.document_id
             WHERE s.search_vector @@ plainto_tsquery('english', $1)
               AND ($2::uuid IS NULL OR d.job_id = $2)
               AND ($3::text IS NULL OR s.language = $3)
             ORDER BY rank DESC, s.id ASC
             LIMIT $4",
        )
        .bind(query)
        .bind(filters.source_job_id.map(|id| id.0))
        .bind(&filters.language)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| Error::database_with_source("search_snippets", e))?;
        rows.into_iter().map(hit_from_row).collect()
    }

    /// Markdown fallback: ranked document ids whose body matches the query
    /// (§4.8 step 2); the application layer unions each document's snippets.
    pub(super) async fn search_documents_markdown_impl(
        &self,
        query: &str,
        filters: &SearchFilters,
        limit: u32,
    ) -> Result<Vec<DocumentId>> {
        let rows: Vec<(uuid::Uuid,)> = sqlx::query_as(
            "SELECT d.id
             FROM documents d
             WHERE d.markdown_search_vector @@ plainto_tsquery('english', $1)
               AND ($2::uuid IS NULL OR d.job_id = $2)
             ORDER BY ts_rank(d.markdown_search_vector, plainto_tsquery('english', $1)) DESC, d.id ASC
             LIMIT $3",
        )
        .bind(query)
        .bind(filters.source_job_id.map(|id| id.0))
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| Error::database_with_source("search_documents_markdown", e))?;
        Ok(rows.into_iter().map(|(id,)| DocumentId(id)).collect())
    }

    /// Exact match beats prefix beats trigram similarity (§4.8a). Each tier
    /// is queried separately and concatenated so ordering never depends on a
    /// single blended score.
    pub(super) async fn search_libraries_impl(&self, query: &str, limit: u32) -> Result<Vec<LibraryMatch>> {
        let mut matches = Vec::new();
        let mut seen = std::collections::HashSet::new();

        for (kind, sql) in [
            (
                LibraryMatchKind::Exact,
                "SELECT job_id, name, version, snippet_count FROM source_statistics
                 WHERE document_count > 0 AND lower(name) = lower($1)
                 ORDER BY last_updated DESC",
            ),
            (
                LibraryMatchKind::Prefix,
                "SELECT job_id, name, version, snippet_count FROM source_statistics
                 WHERE document_count > 0 AND lower(name) LIKE lower($1) || '%' AND lower(name) != lower($1)
                 ORDER BY last_updated DESC",
            ),
            (
                LibraryMatchKind::Trigram,
                "SELECT job_id, name, version, snippet_count FROM source_statistics
                 WHERE document_count > 0 AND similarity(name, $1) > 0.2
                 ORDER BY similarity(name, $1) DESC",
            ),
        ] {
            if matches.len() as u32 >= limit {
                break;
            }
            let rows: Vec<(uuid::Uuid, String, Option<String>, i64)> = sqlx::query_as(sql)
                .bind(query)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| Error::database_with_source("search_libraries", e))?;

            for (job_id, name, version, snippet_count) in rows {
                if matches.len() as u32 >= limit || !seen.insert(job_id) {
                    continue;
                }
                matches.push(LibraryMatch {
                    job_id: docforge_domain::value_objects::JobId(job_id),
                    name,
                    version,
                    snippet_count: snippet_count.max(0) as u64,
                    match_kind: kind,
                });
            }
        }

        Ok(matches)
    }
}
