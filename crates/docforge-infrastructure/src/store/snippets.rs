use docforge_domain::entities::CodeSnippet;
use docforge_domain::error::{Error, Result};
use docforge_domain::value_objects::{DocumentId, SnippetId};

use super::rows::{snippet_from_row, snippet_type_to_str, SnippetRow};
use super::PostgresStore;

const SNIPPET_COLUMNS: &str = "id, document_id, title, description, language, code_content, code_hash,
    line_start, line_end, context_before, context_after, section_title, section_content,
    functions, imports, keywords, snippet_type, source_url, meta, enriched, created_at, updated_at";

impl PostgresStore {
    pub(super) async fn list_snippets_for_document_impl(&self, document_id: DocumentId) -> Result<Vec<CodeSnippet>> {
        let rows: Vec<SnippetRow> = sqlx::query_as(&format!(
            "SELECT {SNIPPET_COLUMNS} FROM code_snippets WHERE document_id = $1 ORDER BY line_start NULLS LAST, created_at"
        ))
        .bind(document_id.0)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| Error::database_with_source("list_snippets_for_document", e))?;
        rows.into_iter().map(snippet_from_row).collect()
    }

    /// Replace every snippet belonging to `document_id` in one transaction:
    /// delete the old set, insert the new one. `snippet_relationships` rows
    /// cascade away with their deleted endpoints. Two snippets in the same
    /// document hashing to the same `code_hash` collide on the unique index;
    /// the second is a no-op rather than a transaction-aborting error, and
    /// the returned count reflects only the rows actually persisted.
    pub(super) async fn replace_snippets_for_document_impl(
        &self,
        document_id: DocumentId,
        snippets: &[CodeSnippet],
    ) -> Result<usize> {
        let mut tx = self.pool.begin().await.map_err(|e| Error::database_with_source("begin replace_snippets", e))?;

        sqlx::query("DELETE FROM code_snippets WHERE document_id = $1")
            .bind(document_id.0)
            .execute(&mut *tx)
            .await
            .map_err(|e| Error::database_with_source("replace_snippets delete", e))?;

        let mut persisted = 0usize;
        for snippet in snippets {
            let result = sqlx::query(
                "INSERT INTO code_snippets (id, document_id, title, description, language, code_content,
                    code_hash, line_start, line_end, context_before, context_after, section_title,
                    section_content, functions, imports, keywords, snippet_type, source_url, meta, enriched)
                 VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$13,$14,$15,$16,$17,$18,$19,$20)
                 ON CONFLICT (document_id, code_hash) DO NOTHING",
            )
            .bind(snippet.id.0)
            .bind(document_id.0)
            .bind(&snippet.title)
            .bind(&snippet.description)
            .bind(&snippet.language)
            .bind(&snippet.code_content)
            .bind(&snippet.code_hash)
            .bind(snippet.line_start)
            .bind(snippet.line_end)
            .bind(&snippet.context_before)
            .bind(&snippet.context_after)
            .bind(&snippet.section_title)
            .bind(&snippet.section_content)
            .bind(serde_json::Value::from(snippet.functions.clone()))
            .bind(serde_json::Value::from(snippet.imports.clone()))
            .bind(serde_json::Value::from(snippet.keywords.clone()))
            .bind(snippet_type_to_str(snippet.snippet_type))
            .bind(&snippet.source_url)
            .bind(&snippet.meta)
            .bind(snippet.enriched)
            .execute(&mut *tx)
            .await
            .map_err(|e| Error::database_with_source("replace_snippets insert", e))?;
            persisted += result.rows_affected() as usize;
        }

        tx.commit().await.map_err(|e| Error::database_with_source("commit replace_snippets", e))?;
        Ok(persisted)
    }

    pub(super) async fn get_snippet_impl(&self, id: SnippetId) -> Result<CodeSnippet> {
        let row: SnippetRow = sqlx::query_as(&format!("SELECT {SNIPPET_COLUMNS} FROM code_snippets WHERE id = $1"))
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| Error::database_with_source("get_snippet", e))?
            .ok_or_else(|| Error::not_found(format!("snippet {id}")))?;
        snippet_from_row(row)
    }

    /// Persist an enriched snippet's title/description/language/classification
    /// in place (§4.4). At-most-once per `(document_id, code_hash)` is
    /// enforced by the caller checking `enriched` before re-running.
    pub(super) async fn save_enrichment_impl(&self, snippet: &CodeSnippet) -> Result<()> {
        sqlx::query(
            "UPDATE code_snippets SET title = $2, description = $3, language = $4, snippet_type = $5,
                functions = $6, imports = $7, keywords = $8, enriched = $9, updated_at = now()
             WHERE id = $1",
        )
        .bind(snippet.id.0)
        .bind(&snippet.title)
        .bind(&snippet.description)
        .bind(&snippet.language)
        .bind(snippet_type_to_str(snippet.snippet_type))
        .bind(serde_json::Value::from(snippet.functions.clone()))
        .bind(serde_json::Value::from(snippet.imports.clone()))
        .bind(serde_json::Value::from(snippet.keywords.clone()))
        .bind(snippet.enriched)
        .execute(&self.pool)
        .await
        .map_err(|e| Error::database_with_source("save_enrichment", e))?;
        Ok(())
    }
}
