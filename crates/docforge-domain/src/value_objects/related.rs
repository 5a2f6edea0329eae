//! Direction-resolved relationship edges returned by `find_related_snippets`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::SnippetRelationship;
use crate::value_objects::{RelationshipId, SnippetId};

/// One edge of `find_related_snippets`'s symmetric closure, reported from the
/// perspective of the snippet that was queried: `type_name` is
/// `relationship_type.forward_name()` when `queried` is the edge's source,
/// and `relationship_type.inverse_name()` when `queried` is the target
/// (§4.1, invariant 10).
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct RelatedSnippet {
    pub relationship_id: RelationshipId,
    pub snippet_id: SnippetId,
    pub type_name: &'static str,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl RelatedSnippet {
    /// Resolve `edge`'s direction and inverse name relative to `queried`.
    #[must_use]
    pub fn from_edge(queried: SnippetId, edge: SnippetRelationship) -> Self {
        let (snippet_id, type_name) = if edge.source_id == queried {
            (edge.target_id, edge.relationship_type.forward_name())
        } else {
            (edge.source_id, edge.relationship_type.inverse_name())
        };
        Self {
            relationship_id: edge.id,
            snippet_id,
            type_name,
            description: edge.description,
            created_at: edge.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::RelationshipType;

    #[test]
    fn forward_edge_reports_forward_name() {
        let queried = SnippetId::new();
        let other = SnippetId::new();
        let edge = SnippetRelationship::new(queried, other, RelationshipType::Imports, None);
        let related = RelatedSnippet::from_edge(queried, edge);
        assert_eq!(related.snippet_id, other);
        assert_eq!(related.type_name, "imports");
    }

    #[test]
    fn reverse_edge_reports_inverse_name() {
        let queried = SnippetId::new();
        let other = SnippetId::new();
        let edge = SnippetRelationship::new(other, queried, RelationshipType::Imports, None);
        let related = RelatedSnippet::from_edge(queried, edge);
        assert_eq!(related.snippet_id, other);
        assert_eq!(related.type_name, "imported_by");
    }
}
