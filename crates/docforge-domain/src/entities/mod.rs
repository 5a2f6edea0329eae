//! Core business entities with identity.

pub mod document;
pub mod failed_page;
pub mod job;
pub mod relationship;
pub mod snippet;
pub mod source;

pub use document::{ContentType, Document};
pub use failed_page::FailedPage;
pub use job::{Job, JobCounters, JobKind, JobPhase, JobStatus};
pub use relationship::{RelationshipType, SnippetRelationship};
pub use snippet::{CodeSnippet, SnippetType};
pub use source::Source;
