use docforge_domain::entities::SnippetRelationship;
use docforge_domain::error::{Error, Result};
use docforge_domain::value_objects::{RelatedSnippet, RelationshipId, SnippetId};

use super::rows::{relationship_from_row, relationship_type_to_str, RelationshipRow};
use super::PostgresStore;

const RELATIONSHIP_COLUMNS: &str = "id, source_id, target_id, relationship_type, description, created_at";

impl PostgresStore {
    pub(super) async fn create_relationship_impl(&self, relationship: &SnippetRelationship) -> Result<()> {
        sqlx::query(
            "INSERT INTO snippet_relationships (id, source_id, target_id, relationship_type, description)
             VALUES ($1,$2,$3,$4,$5)
             ON CONFLICT (source_id, target_id, relationship_type) DO NOTHING",
        )
        .bind(relationship.id.0)
        .bind(relationship.source_id.0)
        .bind(relationship.target_id.0)
        .bind(relationship_type_to_str(relationship.relationship_type))
        .bind(&relationship.description)
        .execute(&self.pool)
        .await
        .map_err(|e| Error::database_with_source("create_relationship", e))?;
        Ok(())
    }

    /// Every edge touching `snippet_id`, in either direction, resolved to the
    /// other endpoint with a direction-appropriate type name via
    /// `RelatedSnippet::from_edge`.
    pub(super) async fn find_related_snippets_impl(&self, snippet_id: SnippetId) -> Result<Vec<RelatedSnippet>> {
        let rows: Vec<RelationshipRow> = sqlx::query_as(&format!(
            "SELECT {RELATIONSHIP_COLUMNS} FROM snippet_relationships
             WHERE source_id = $1 OR target_id = $1
             ORDER BY created_at"
        ))
        .bind(snippet_id.0)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| Error::database_with_source("find_related_snippets", e))?;
        rows.into_iter()
            .map(relationship_from_row)
            .map(|r| r.map(|edge| RelatedSnippet::from_edge(snippet_id, edge)))
            .collect()
    }

    pub(super) async fn list_relationship_id_impl(&self, id: RelationshipId) -> Result<SnippetRelationship> {
        let row: RelationshipRow =
            sqlx::query_as(&format!("SELECT {RELATIONSHIP_COLUMNS} FROM snippet_relationships WHERE id = $1"))
                .bind(id.0)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| Error::database_with_source("list_relationship_id", e))?
                .ok_or_else(|| Error::not_found(format!("relationship {id}")))?;
        relationship_from_row(row)
    }
}
