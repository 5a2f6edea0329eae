//! Immutable value objects.

pub mod config;
pub mod enrichment;
pub mod ids;
pub mod parsed;
pub mod related;
pub mod search;

pub use config::{CrawlConfig, RepoConfig, UploadConfig, DEFAULT_EXCLUDED_DIRS};
pub use enrichment::{Enrichment, EnrichmentInput};
pub use ids::{DocumentId, JobId, RelationshipId, SnippetId};
pub use parsed::ParsedSnippet;
pub use related::RelatedSnippet;
pub use search::{LibraryMatch, LibraryMatchKind, Page, SearchFilters, SearchHit, SearchMode};
