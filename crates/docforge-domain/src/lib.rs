//! Domain layer: entities, value objects, ports, and error types for the
//! documentation indexer. No I/O, no async runtime dependency beyond the
//! `async_trait` macro used to declare port signatures — adapters living in
//! other crates provide every side effect.

pub mod constants;
pub mod entities;
pub mod error;
pub mod fingerprint;
pub mod ports;
pub mod value_objects;

pub use error::{Error, Result};
