//! SnippetRelationship entity — a directed edge between two snippets.
//!
//! Edges are stored in a join table rather than embedded neighbor pointers
//! so the graph (which may contain cycles) never requires recursive
//! ownership or borrowing tricks to represent.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{RelationshipId, SnippetId};

/// Relationship type. Each variant has a named inverse used by
/// `find_related_snippets` to report the symmetric closure of stored edges
/// (e.g. `imports` inverts to `imported_by`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipType {
    Imports,
    Extends,
    Implements,
    Uses,
    ExampleOf,
    ConfigurationFor,
    Related,
}

impl RelationshipType {
    /// The name used when this edge is traversed in the forward direction.
    #[must_use]
    pub fn forward_name(self) -> &'static str {
        match self {
            Self::Imports => "imports",
            Self::Extends => "extends",
            Self::Implements => "implements",
            Self::Uses => "uses",
            Self::ExampleOf => "example_of",
            Self::ConfigurationFor => "configuration_for",
            Self::Related => "related",
        }
    }

    /// The name used when this edge is traversed in the inverse direction.
    /// Symmetric types (`related`) invert to themselves.
    #[must_use]
    pub fn inverse_name(self) -> &'static str {
        match self {
            Self::Imports => "imported_by",
            Self::Extends => "extended_by",
            Self::Implements => "implemented_by",
            Self::Uses => "used_by",
            Self::ExampleOf => "has_example",
            Self::ConfigurationFor => "configured_by",
            Self::Related => "related",
        }
    }
}

/// Directed edge between two `CodeSnippet`s. `(source, target, type)` is
/// unique; relationships are deleted when either endpoint is deleted.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct SnippetRelationship {
    pub id: RelationshipId,
    pub source_id: SnippetId,
    pub target_id: SnippetId,
    pub relationship_type: RelationshipType,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl SnippetRelationship {
    #[must_use]
    pub fn new(
        source_id: SnippetId,
        target_id: SnippetId,
        relationship_type: RelationshipType,
        description: Option<String>,
    ) -> Self {
        Self {
            id: RelationshipId::new(),
            source_id,
            target_id,
            relationship_type,
            description,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symmetric_type_inverts_to_itself() {
        assert_eq!(
            RelationshipType::Related.inverse_name(),
            RelationshipType::Related.forward_name()
        );
    }

    #[test]
    fn imports_inverts_to_imported_by() {
        assert_eq!(RelationshipType::Imports.inverse_name(), "imported_by");
    }
}
