//! Page Renderer port (C5) — fetches a crawled URL's rendered content.

use async_trait::async_trait;

use crate::error::Result;

/// A rendered page: cleaned markdown content and the outbound links
/// discovered on it, used to grow the crawl frontier (§4.5).
#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub final_url: String,
    pub markdown: String,
    pub title: Option<String>,
    /// Absolute URLs discovered on the page, before domain/pattern filtering.
    pub links: Vec<String>,
}

/// Fetches and (if the implementation renders JavaScript) executes a page.
/// Kept as a port so the crawl driver is agnostic to whether rendering is a
/// plain HTTP GET or a headless-browser round trip.
#[async_trait]
pub trait PageRenderer: Send + Sync {
    async fn render(&self, url: &str) -> Result<RenderedPage>;
}
