use chrono::{DateTime, Utc};

use docforge_domain::entities::{Job, JobKind};
use docforge_domain::error::{Error, Result};
use docforge_domain::value_objects::JobId;

use super::rows::{job_from_row, job_kind_to_str, JobRow};
use super::PostgresStore;

impl PostgresStore {
    pub(super) async fn create_job_impl(&self, job: &Job) -> Result<()> {
        sqlx::query(
            "INSERT INTO jobs (id, kind, name, version, status, phase, pages_processed, files_processed,
                snippets_extracted, created_at, started_at, completed_at, last_heartbeat, retry_count,
                max_retries, error_message, cancelled, config)
             VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$13,$14,$15,$16,$17,$18)",
        )
        .bind(job.id.0)
        .bind(job_kind_to_str(job.kind))
        .bind(&job.name)
        .bind(&job.version)
        .bind(status_to_str(job))
        .bind(job.phase.map(phase_to_str))
        .bind(job.counters.pages_processed as i64)
        .bind(job.counters.files_processed as i64)
        .bind(job.counters.snippets_extracted as i64)
        .bind(job.created_at)
        .bind(job.started_at)
        .bind(job.completed_at)
        .bind(job.last_heartbeat)
        .bind(job.retry_count as i32)
        .bind(job.max_retries as i32)
        .bind(&job.error_message)
        .bind(job.cancelled)
        .bind(&job.config)
        .execute(&self.pool)
        .await
        .map_err(|e| Error::database_with_source("create_job", e))?;
        Ok(())
    }

    pub(super) async fn get_job_impl(&self, id: JobId) -> Result<Job> {
        let row: JobRow = sqlx::query_as("SELECT * FROM jobs WHERE id = $1")
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| Error::database_with_source("get_job", e))?
            .ok_or_else(|| Error::not_found(format!("job {id}")))?;
        job_from_row(row)
    }

    pub(super) async fn update_job_impl(&self, job: &Job) -> Result<()> {
        sqlx::query(
            "UPDATE jobs SET status = $2, phase = $3, pages_processed = $4, files_processed = $5,
                snippets_extracted = $6, started_at = $7, completed_at = $8, last_heartbeat = $9,
                retry_count = $10, error_message = $11, cancelled = $12, config = $13
             WHERE id = $1",
        )
        .bind(job.id.0)
        .bind(status_to_str(job))
        .bind(job.phase.map(phase_to_str))
        .bind(job.counters.pages_processed as i64)
        .bind(job.counters.files_processed as i64)
        .bind(job.counters.snippets_extracted as i64)
        .bind(job.started_at)
        .bind(job.completed_at)
        .bind(job.last_heartbeat)
        .bind(job.retry_count as i32)
        .bind(&job.error_message)
        .bind(job.cancelled)
        .bind(&job.config)
        .execute(&self.pool)
        .await
        .map_err(|e| Error::database_with_source("update_job", e))?;
        Ok(())
    }

    pub(super) async fn list_running_jobs_impl(&self, kind: Option<JobKind>) -> Result<Vec<Job>> {
        let rows: Vec<JobRow> = match kind {
            Some(kind) => sqlx::query_as("SELECT * FROM jobs WHERE status = 'running' AND kind = $1 ORDER BY created_at")
                .bind(job_kind_to_str(kind))
                .fetch_all(&self.pool)
                .await,
            None => sqlx::query_as("SELECT * FROM jobs WHERE status = 'running' ORDER BY created_at")
                .fetch_all(&self.pool)
                .await,
        }
        .map_err(|e| Error::database_with_source("list_running_jobs", e))?;
        rows.into_iter().map(job_from_row).collect()
    }

    pub(super) async fn find_job_by_name_version_impl(
        &self,
        kind: JobKind,
        name: &str,
        version: Option<&str>,
    ) -> Result<Option<Job>> {
        let row: Option<JobRow> = sqlx::query_as(
            "SELECT * FROM jobs WHERE kind = $1 AND name = $2 AND version IS NOT DISTINCT FROM $3",
        )
        .bind(job_kind_to_str(kind))
        .bind(name)
        .bind(version)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Error::database_with_source("find_job_by_name_version", e))?;
        row.map(job_from_row).transpose()
    }

    pub(super) async fn delete_job_impl(&self, job_id: JobId) -> Result<()> {
        sqlx::query("DELETE FROM jobs WHERE id = $1")
            .bind(job_id.0)
            .execute(&self.pool)
            .await
            .map_err(|e| Error::database_with_source("delete_job", e))?;
        Ok(())
    }

    pub(super) async fn cancel_job_impl(&self, job_id: JobId) -> Result<()> {
        sqlx::query(
            "UPDATE jobs SET status = 'completed', phase = NULL, cancelled = true,
                completed_at = COALESCE(completed_at, now())
             WHERE id = $1 AND status != 'completed'",
        )
        .bind(job_id.0)
        .execute(&self.pool)
        .await
        .map_err(|e| Error::database_with_source("cancel_job", e))?;
        Ok(())
    }

    pub(super) async fn heartbeat_job_impl(&self, job_id: JobId, at: DateTime<Utc>) -> Result<()> {
        sqlx::query(
            "UPDATE jobs SET last_heartbeat = $2
             WHERE id = $1 AND (last_heartbeat IS NULL OR last_heartbeat < $2)",
        )
        .bind(job_id.0)
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(|e| Error::database_with_source("heartbeat_job", e))?;
        Ok(())
    }
}

fn status_to_str(job: &Job) -> &'static str {
    use docforge_domain::entities::JobStatus;
    match job.status {
        JobStatus::Running => "running",
        JobStatus::Completed => "completed",
    }
}

fn phase_to_str(phase: docforge_domain::entities::JobPhase) -> &'static str {
    use docforge_domain::entities::JobPhase;
    match phase {
        JobPhase::Crawling => "crawling",
        JobPhase::Finalizing => "finalizing",
    }
}
