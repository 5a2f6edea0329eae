//! Page Renderer provider (C5) — HTTP client implementing the domain
//! `PageRenderer` port against a configurable rendering service.
//!
//! The spec treats actual browser rendering as out of scope; this client's
//! contract with the renderer service is "POST url, get back
//! `{markdown, title, links[]}`".

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use docforge_domain::error::{Error, Result};
use docforge_domain::ports::renderer::RenderedPage;
use docforge_domain::ports::PageRenderer;

#[derive(Debug, Clone)]
pub struct HttpRendererConfig {
    pub service_url: String,
    pub timeout: Duration,
}

pub struct HttpPageRenderer {
    client: reqwest::Client,
    config: HttpRendererConfig,
}

impl HttpPageRenderer {
    #[must_use]
    pub fn new(config: HttpRendererConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .unwrap_or_default();
        Self { client, config }
    }
}

#[derive(Debug, Deserialize)]
struct RenderResponse {
    markdown: String,
    title: Option<String>,
    #[serde(default)]
    links: Vec<String>,
    final_url: Option<String>,
}

#[async_trait]
impl PageRenderer for HttpPageRenderer {
    async fn render(&self, url: &str) -> Result<RenderedPage> {
        let response = self
            .client
            .post(&self.config.service_url)
            .json(&serde_json::json!({ "url": url }))
            .send()
            .await
            .map_err(|e| Error::network(format!("renderer request for {url} failed: {e}")))?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
            return Err(Error::transient(format!("renderer returned {status} for {url}")));
        }
        if !status.is_success() {
            return Err(Error::upstream("renderer", format!("status {status} for {url}")));
        }

        let parsed: RenderResponse = response
            .json()
            .await
            .map_err(|e| Error::upstream("renderer", format!("invalid response for {url}: {e}")))?;

        Ok(RenderedPage {
            final_url: parsed.final_url.unwrap_or_else(|| url.to_string()),
            markdown: parsed.markdown,
            title: parsed.title,
            links: parsed.links,
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn renderer(service_url: String) -> HttpPageRenderer {
        HttpPageRenderer::new(HttpRendererConfig {
            service_url,
            timeout: Duration::from_secs(5),
        })
    }

    #[tokio::test]
    async fn render_parses_successful_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "markdown": "# Hello",
                "title": "Hello",
                "links": ["https://example.com/a"],
                "final_url": "https://example.com/page",
            })))
            .mount(&server)
            .await;

        let page = renderer(server.uri()).render("https://example.com/page").await.unwrap();
        assert_eq!(page.markdown, "# Hello");
        assert_eq!(page.title.as_deref(), Some("Hello"));
        assert_eq!(page.final_url, "https://example.com/page");
        assert_eq!(page.links, vec!["https://example.com/a".to_owned()]);
    }

    #[tokio::test]
    async fn render_defaults_final_url_to_requested_url_when_absent() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "markdown": "body",
                "title": null,
                "links": [],
            })))
            .mount(&server)
            .await;

        let page = renderer(server.uri()).render("https://example.com/x").await.unwrap();
        assert_eq!(page.final_url, "https://example.com/x");
        assert!(page.links.is_empty());
    }

    #[tokio::test]
    async fn render_maps_server_error_to_transient() {
        let server = MockServer::start().await;
        Mock::given(method("POST")).respond_with(ResponseTemplate::new(503)).mount(&server).await;

        let err = renderer(server.uri()).render("https://example.com/x").await.unwrap_err();
        assert!(matches!(err, Error::Transient { .. }), "expected Transient, got {err:?}");
    }

    #[tokio::test]
    async fn render_maps_client_error_to_upstream() {
        let server = MockServer::start().await;
        Mock::given(method("POST")).respond_with(ResponseTemplate::new(404)).mount(&server).await;

        let err = renderer(server.uri()).render("https://example.com/x").await.unwrap_err();
        assert!(matches!(err, Error::Upstream { .. }), "expected Upstream, got {err:?}");
    }
}
