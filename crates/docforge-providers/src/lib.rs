//! Concrete adapters for docforge's external collaborators: the LLM
//! enricher, the page renderer, the git client, and the pure Markdown/HTML
//! snippet parser. Depends only on `docforge-domain`'s port traits.

pub mod git;
pub mod llm;
pub mod parser;
pub mod renderer;

pub use git::Git2Provider;
pub use llm::{LlmConfig, OpenAiCompatibleEnricher, RetryPolicy};
pub use parser::parse;
pub use renderer::{HttpPageRenderer, HttpRendererConfig};
