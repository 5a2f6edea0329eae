//! Newtype identifiers for domain entities.
//!
//! Wrapping `Uuid` in a distinct type per entity prevents accidentally
//! passing a `DocumentId` where a `SnippetId` is expected — the compiler
//! catches what a bare `Uuid` parameter would not.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! uuid_id {
    ($name:ident) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, schemars::JsonSchema,
        )]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Generate a new random identifier.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

uuid_id!(JobId);
uuid_id!(DocumentId);
uuid_id!(SnippetId);
uuid_id!(RelationshipId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_display_and_from_str() {
        let id = JobId::new();
        let text = id.to_string();
        let parsed: JobId = text.parse().expect("valid uuid");
        assert_eq!(id, parsed);
    }

    #[test]
    fn new_ids_are_not_nil() {
        assert!(!JobId::new().0.is_nil());
        assert!(!DocumentId::new().0.is_nil());
    }
}
