//! Outbound port traits implemented by the infrastructure and providers
//! crates. Domain and application code depend only on these, never on a
//! concrete adapter.

pub mod git;
pub mod llm;
pub mod logging;
pub mod progress;
pub mod renderer;
pub mod store;

pub use git::{ClonedRepo, GitProvider};
pub use llm::LlmEnricher;
pub use logging::OperationLogger;
pub use progress::{ProgressEvent, ProgressPublisher};
pub use renderer::{PageRenderer, RenderedPage};
pub use store::{DocumentUpsertOutcome, StoreRepository, StoreStatistics};
