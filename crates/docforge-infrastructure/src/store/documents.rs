use docforge_domain::entities::Document;
use docforge_domain::error::{Error, Result};
use docforge_domain::ports::store::DocumentUpsertOutcome;
use docforge_domain::value_objects::{DocumentId, JobId};

use super::rows::{content_type_to_str, document_from_row, job_kind_to_str, DocumentRow};
use super::PostgresStore;

impl PostgresStore {
    /// Insert by URL, or update in place when the row already exists. The
    /// content-hash comparison that decides `Unchanged` vs. `Updated` is
    /// done before this call (§4.5 step 2d); here we only need to know
    /// whether the row existed.
    pub(super) async fn upsert_document_impl(&self, document: &Document) -> Result<DocumentUpsertOutcome> {
        let existing: Option<(String,)> = sqlx::query_as("SELECT content_hash FROM documents WHERE url = $1")
            .bind(&document.url)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| Error::database_with_source("upsert_document lookup", e))?;

        match existing {
            Some((hash,)) if hash == document.content_hash => Ok(DocumentUpsertOutcome::Unchanged),
            Some(_) => {
                sqlx::query(
                    "UPDATE documents SET title = $2, content_type = $3, content_hash = $4,
                        markdown_content = $5, crawl_depth = $6, parent_url = $7, updated_at = now()
                     WHERE url = $1",
                )
                .bind(&document.url)
                .bind(&document.title)
                .bind(content_type_to_str(document.content_type))
                .bind(&document.content_hash)
                .bind(&document.markdown_content)
                .bind(document.crawl_depth)
                .bind(&document.parent_url)
                .execute(&self.pool)
                .await
                .map_err(|e| Error::database_with_source("upsert_document update", e))?;
                Ok(DocumentUpsertOutcome::Updated)
            }
            None => {
                sqlx::query(
                    "INSERT INTO documents (id, url, job_id, job_kind, title, content_type, content_hash,
                        markdown_content, crawl_depth, parent_url)
                     VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10)",
                )
                .bind(document.id.0)
                .bind(&document.url)
                .bind(document.job_id.0)
                .bind(job_kind_to_str(document.job_kind))
                .bind(&document.title)
                .bind(content_type_to_str(document.content_type))
                .bind(&document.content_hash)
                .bind(&document.markdown_content)
                .bind(document.crawl_depth)
                .bind(&document.parent_url)
                .execute(&self.pool)
                .await
                .map_err(|e| Error::database_with_source("upsert_document insert", e))?;
                Ok(DocumentUpsertOutcome::Created)
            }
        }
    }

    pub(super) async fn get_document_impl(&self, id: DocumentId) -> Result<Document> {
        let row: DocumentRow = sqlx::query_as(
            "SELECT id, url, job_id, job_kind, title, content_type, content_hash, markdown_content,
                crawl_depth, parent_url, created_at, updated_at
             FROM documents WHERE id = $1",
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Error::database_with_source("get_document", e))?
        .ok_or_else(|| Error::not_found(format!("document {id}")))?;
        document_from_row(row)
    }

    pub(super) async fn find_document_by_url_impl(&self, url: &str) -> Result<Option<Document>> {
        let row: Option<DocumentRow> = sqlx::query_as(
            "SELECT id, url, job_id, job_kind, title, content_type, content_hash, markdown_content,
                crawl_depth, parent_url, created_at, updated_at
             FROM documents WHERE url = $1",
        )
        .bind(url)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Error::database_with_source("find_document_by_url", e))?;
        row.map(document_from_row).transpose()
    }

    pub(super) async fn list_documents_for_job_impl(&self, job_id: JobId) -> Result<Vec<Document>> {
        let rows: Vec<DocumentRow> = sqlx::query_as(
            "SELECT id, url, job_id, job_kind, title, content_type, content_hash, markdown_content,
                crawl_depth, parent_url, created_at, updated_at
             FROM documents WHERE job_id = $1 ORDER BY created_at",
        )
        .bind(job_id.0)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| Error::database_with_source("list_documents_for_job", e))?;
        rows.into_iter().map(document_from_row).collect()
    }

    pub(super) async fn get_document_markdown_impl(&self, document_id: DocumentId) -> Result<String> {
        let row: Option<(String,)> = sqlx::query_as("SELECT markdown_content FROM documents WHERE id = $1")
            .bind(document_id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| Error::database_with_source("get_document_markdown", e))?;
        row.map(|(content,)| content).ok_or_else(|| Error::not_found(format!("document {document_id}")))
    }
}
