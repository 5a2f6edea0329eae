//! Application layer — use-case orchestration over the domain ports.
//!
//! Each module is one of the spec's core components: job lifecycle
//! (`jobs`), search (`search`), LLM enrichment (`enrichment`), the web
//! crawl driver (`crawl`), and the upload/repo ingestor (`ingest`). None of
//! these modules touch a concrete adapter directly; they depend only on
//! `docforge_domain`'s port traits, which are satisfied by
//! `docforge-infrastructure` and `docforge-providers` at the composition
//! root.

pub mod crawl;
pub mod enrichment;
pub mod ingest;
pub mod jobs;
pub mod search;

pub use crawl::CrawlDriver;
pub use enrichment::Enrichment;
pub use ingest::{Ingestor, UploadFile};
pub use jobs::JobScheduler;
pub use search::Searcher;
