use docforge_domain::entities::FailedPage;
use docforge_domain::error::{Error, Result};
use docforge_domain::value_objects::JobId;

use super::rows::{failed_page_from_row, FailedPageRow};
use super::PostgresStore;

impl PostgresStore {
    /// `(job_id, url)` is the primary key: a retry simply overwrites the
    /// prior error rather than accumulating a history.
    pub(super) async fn record_failed_page_impl(&self, page: &FailedPage) -> Result<()> {
        sqlx::query(
            "INSERT INTO failed_pages (job_id, url, error, occurred_at)
             VALUES ($1,$2,$3,$4)
             ON CONFLICT (job_id, url) DO UPDATE SET error = $3, occurred_at = $4",
        )
        .bind(page.job_id.0)
        .bind(&page.url)
        .bind(&page.error)
        .bind(page.occurred_at)
        .execute(&self.pool)
        .await
        .map_err(|e| Error::database_with_source("record_failed_page", e))?;
        Ok(())
    }

    pub(super) async fn list_failed_pages_impl(&self, job_id: JobId) -> Result<Vec<FailedPage>> {
        let rows: Vec<FailedPageRow> =
            sqlx::query_as("SELECT job_id, url, error, occurred_at FROM failed_pages WHERE job_id = $1 ORDER BY occurred_at")
                .bind(job_id.0)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| Error::database_with_source("list_failed_pages", e))?;
        Ok(rows.into_iter().map(failed_page_from_row).collect())
    }
}
