//! HTTP and MCP surface over the application layer (§4.9, §4.10). A single
//! `AppState` backs both transports; `build_router` and `McpServer` are the
//! two entry points the `docforge` binary composes at startup.

pub mod application;
pub mod auth;
pub mod chunking;
pub mod dto;
pub mod error;
pub mod mcp;
pub mod router;
pub mod routes;
pub mod state;

pub use error::{to_mcp_error, ApiError};
pub use mcp::McpServer;
pub use router::build_router;
pub use state::{AppState, ServerRuntimeConfig};
