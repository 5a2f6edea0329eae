use docforge_domain::entities::Source;
use docforge_domain::error::{Error, Result};
use docforge_domain::ports::store::StoreStatistics;
use docforge_domain::value_objects::{JobId, Page};

use super::rows::job_kind_from_str;
use super::PostgresStore;

#[derive(sqlx::FromRow)]
struct SourceRow {
    job_id: uuid::Uuid,
    job_type: String,
    name: String,
    version: Option<String>,
    document_count: i64,
    snippet_count: i64,
    last_updated: chrono::DateTime<chrono::Utc>,
}

fn source_from_row(row: SourceRow) -> Result<Source> {
    Ok(Source {
        job_id: JobId(row.job_id),
        job_kind: job_kind_from_str(&row.job_type)?,
        name: row.name,
        version: row.version,
        document_count: row.document_count.max(0) as u64,
        snippet_count: row.snippet_count.max(0) as u64,
        last_updated: row.last_updated,
    })
}

impl PostgresStore {
    /// A source is only "visible" once its job owns at least one document
    /// (the view's `LEFT JOIN` keeps zero-document jobs, so we filter here).
    pub(super) async fn list_sources_impl(&self, page: u32, limit: u32) -> Result<Page<Source>> {
        let offset = i64::from(page.saturating_sub(1)) * i64::from(limit);

        let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM source_statistics WHERE document_count > 0")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| Error::database_with_source("list_sources count", e))?;

        let rows: Vec<SourceRow> = sqlx::query_as(
            "SELECT job_id, job_type, name, version, document_count, snippet_count, last_updated
             FROM source_statistics
             WHERE document_count > 0
             ORDER BY last_updated DESC
             LIMIT $1 OFFSET $2",
        )
        .bind(i64::from(limit))
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| Error::database_with_source("list_sources", e))?;

        Ok(Page {
            items: rows.into_iter().map(source_from_row).collect::<Result<Vec<_>>>()?,
            total: total.0.max(0) as u64,
            page,
            limit,
        })
    }

    pub(super) async fn get_source_impl(&self, job_id: JobId) -> Result<Source> {
        let row: SourceRow = sqlx::query_as(
            "SELECT job_id, job_type, name, version, document_count, snippet_count, last_updated
             FROM source_statistics WHERE job_id = $1",
        )
        .bind(job_id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Error::database_with_source("get_source", e))?
        .ok_or_else(|| Error::not_found(format!("source for job {job_id}")))?;
        source_from_row(row)
    }

    pub(super) async fn statistics_impl(&self) -> Result<StoreStatistics> {
        let row: (i64, i64, i64, i64, i64, i64) = sqlx::query_as(
            "SELECT
                (SELECT COUNT(*) FROM source_statistics WHERE document_count > 0),
                (SELECT COUNT(*) FROM documents),
                (SELECT COUNT(*) FROM code_snippets),
                (SELECT COUNT(*) FROM code_snippets WHERE enriched),
                (SELECT COUNT(*) FROM jobs),
                (SELECT COUNT(*) FROM jobs WHERE status = 'running')",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| Error::database_with_source("statistics", e))?;

        Ok(StoreStatistics {
            source_count: row.0.max(0) as u64,
            document_count: row.1.max(0) as u64,
            snippet_count: row.2.max(0) as u64,
            enriched_snippet_count: row.3.max(0) as u64,
            job_count: row.4.max(0) as u64,
            running_job_count: row.5.max(0) as u64,
        })
    }
}

