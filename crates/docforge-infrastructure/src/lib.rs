//! Infrastructure layer: Postgres `StoreRepository` adapter, migrations,
//! layered configuration, `tracing` logging, the progress bus, and LLM
//! concurrency-permit construction. The composition root (the `docforge`
//! binary) is the only other place allowed to depend on this crate.

pub mod config;
pub mod llm;
pub mod logging;
pub mod migrations;
pub mod progress;
pub mod store;

pub use config::AppConfig;
pub use llm::build_llm_semaphore;
pub use logging::{init_tracing, TracingLogger};
pub use progress::ProgressBus;
pub use store::PostgresStore;
