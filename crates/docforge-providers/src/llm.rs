//! OpenAI-compatible LLM Enricher (C4) — implements the domain `LlmEnricher`
//! port over a `{base_url}/chat/completions` JSON endpoint.

use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::json;

use docforge_domain::entities::SnippetType;
use docforge_domain::error::{Error, Result};
use docforge_domain::ports::LlmEnricher;
use docforge_domain::value_objects::{Enrichment, EnrichmentInput};

/// Retry/backoff parameters for transient upstream failures. The teacher's
/// own provider retry constants are this shape (count + base backoff); a
/// jittered exponential backoff loop over `tokio::time::sleep` replaces a
/// dedicated backoff crate.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: usize,
    pub base_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_backoff: Duration::from_millis(500),
        }
    }
}

/// Configuration for one OpenAI-compatible endpoint.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub timeout: Duration,
    pub retry: RetryPolicy,
    /// Forwarded verbatim into the request body (§4.4: "must accept
    /// arbitrary extra parameters").
    pub extra_params: serde_json::Value,
}

pub struct OpenAiCompatibleEnricher {
    client: reqwest::Client,
    config: LlmConfig,
}

impl OpenAiCompatibleEnricher {
    #[must_use]
    pub fn new(config: LlmConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .unwrap_or_default();
        Self { client, config }
    }

    fn request_body(&self, input: &EnrichmentInput) -> serde_json::Value {
        let mut body = json!({
            "model": self.config.model,
            "response_format": {"type": "json_object"},
            "messages": [
                {"role": "system", "content": SYSTEM_PROMPT},
                {"role": "user", "content": build_user_prompt(input)},
            ],
        });
        if let serde_json::Value::Object(extra) = &self.config.extra_params {
            if let Some(map) = body.as_object_mut() {
                for (key, value) in extra {
                    map.insert(key.clone(), value.clone());
                }
            }
        }
        body
    }

    async fn call_once(&self, input: &EnrichmentInput) -> Result<Enrichment> {
        let url = format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'));
        let mut request = self.client.post(&url).json(&self.request_body(input));
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::network(format!("LLM request failed: {e}")))?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
            return Err(Error::transient(format!("LLM upstream returned {status}")));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::upstream("llm", format!("status {status}: {body}")));
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| Error::upstream("llm", format!("invalid response body: {e}")))?;

        let content = parsed
            .choices
            .first()
            .map(|c| c.message.content.clone())
            .ok_or_else(|| Error::upstream("llm", "response had no choices"))?;

        let raw: RawEnrichment = serde_json::from_str(&content)
            .map_err(|e| Error::upstream("llm", format!("response was not valid enrichment JSON: {e}")))?;

        Ok(raw.into())
    }
}

#[async_trait]
impl LlmEnricher for OpenAiCompatibleEnricher {
    async fn enrich(&self, input: EnrichmentInput) -> Result<Enrichment> {
        let mut attempt = 0usize;
        loop {
            attempt += 1;
            match self.call_once(&input).await {
                Ok(enrichment) => return Ok(enrichment),
                Err(Error::Transient { message }) if attempt < self.config.retry.max_attempts => {
                    tracing::warn!(attempt, message = %message, "retrying LLM enrichment");
                    let jitter_ms = rand::rng().random_range(0..100);
                    let backoff = self.config.retry.base_backoff * 2u32.pow(attempt as u32 - 1)
                        + Duration::from_millis(jitter_ms);
                    tokio::time::sleep(backoff).await;
                }
                Err(other) => return Err(other),
            }
        }
    }
}

const SYSTEM_PROMPT: &str = "You classify and describe a single code snippet extracted from \
documentation. Respond with a single JSON object matching the requested schema only.";

fn build_user_prompt(input: &EnrichmentInput) -> String {
    format!(
        "Language hint: {}\nSection: {}\n\nSurrounding text before:\n{}\n\nCode:\n{}\n\nSurrounding text after:\n{}\n\n\
        Return JSON: {{\"title\": string, \"description\": string, \"language\": string, \
        \"snippet_type\": \"function\"|\"class\"|\"example\"|\"config\"|\"code\", \
        \"functions\": string[], \"imports\": string[], \"keywords\": string[]}}",
        input.language_hint.as_deref().unwrap_or("unknown"),
        input.section_title.as_deref().unwrap_or(""),
        input.context_before.as_deref().unwrap_or(""),
        input.code,
        input.context_after.as_deref().unwrap_or(""),
    )
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

#[derive(Debug, Deserialize, Serialize)]
struct RawEnrichment {
    title: String,
    description: String,
    language: String,
    snippet_type: SnippetType,
    #[serde(default)]
    functions: Vec<String>,
    #[serde(default)]
    imports: Vec<String>,
    #[serde(default)]
    keywords: Vec<String>,
}

impl From<RawEnrichment> for Enrichment {
    fn from(raw: RawEnrichment) -> Self {
        Self {
            title: raw.title,
            description: raw.description,
            language: raw.language,
            snippet_type: raw.snippet_type,
            functions: raw.functions,
            imports: raw.imports,
            keywords: raw.keywords,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn input() -> EnrichmentInput {
        EnrichmentInput {
            code: "fn main() {}".to_owned(),
            language_hint: Some("rust".to_owned()),
            section_title: None,
            section_content: None,
            context_before: None,
            context_after: None,
        }
    }

    fn chat_response(body: serde_json::Value) -> serde_json::Value {
        json!({
            "choices": [{"message": {"content": body.to_string()}}],
        })
    }

    #[tokio::test]
    async fn enrich_parses_successful_response() {
        let server = MockServer::start().await;
        let payload = chat_response(json!({
            "title": "main entry point",
            "description": "the program's entry point",
            "language": "rust",
            "snippet_type": "function",
            "functions": ["main"],
            "imports": [],
            "keywords": ["entry"],
        }));
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(payload))
            .mount(&server)
            .await;

        let enricher = OpenAiCompatibleEnricher::new(LlmConfig {
            base_url: server.uri(),
            api_key: None,
            model: "gpt-test".to_owned(),
            timeout: Duration::from_secs(5),
            retry: RetryPolicy::default(),
            extra_params: serde_json::Value::Null,
        });

        let enrichment = enricher.enrich(input()).await.unwrap();
        assert_eq!(enrichment.title, "main entry point");
        assert_eq!(enrichment.functions, vec!["main".to_owned()]);
    }

    #[tokio::test]
    async fn enrich_retries_on_server_error_then_succeeds() {
        let server = MockServer::start().await;
        let payload = chat_response(json!({
            "title": "t", "description": "d", "language": "rust",
            "snippet_type": "code", "functions": [], "imports": [], "keywords": [],
        }));
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(payload))
            .mount(&server)
            .await;

        let enricher = OpenAiCompatibleEnricher::new(LlmConfig {
            base_url: server.uri(),
            api_key: None,
            model: "gpt-test".to_owned(),
            timeout: Duration::from_secs(5),
            retry: RetryPolicy {
                max_attempts: 3,
                base_backoff: Duration::from_millis(1),
            },
            extra_params: serde_json::Value::Null,
        });

        let enrichment = enricher.enrich(input()).await.unwrap();
        assert_eq!(enrichment.title, "t");
    }

    #[tokio::test]
    async fn enrich_surfaces_upstream_error_on_client_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(400).set_body_string("bad request"))
            .mount(&server)
            .await;

        let enricher = OpenAiCompatibleEnricher::new(LlmConfig {
            base_url: server.uri(),
            api_key: None,
            model: "gpt-test".to_owned(),
            timeout: Duration::from_secs(5),
            retry: RetryPolicy::default(),
            extra_params: serde_json::Value::Null,
        });

        let err = enricher.enrich(input()).await.unwrap_err();
        assert!(matches!(err, Error::Upstream { .. }), "expected Upstream, got {err:?}");
    }

    #[test]
    fn request_body_forwards_extra_params() {
        let enricher = OpenAiCompatibleEnricher::new(LlmConfig {
            base_url: "http://localhost".to_owned(),
            api_key: None,
            model: "gpt-test".to_owned(),
            timeout: Duration::from_secs(5),
            retry: RetryPolicy::default(),
            extra_params: json!({"temperature": 0.2}),
        });
        let body = enricher.request_body(&input());
        assert_eq!(body["temperature"], 0.2);
        assert_eq!(body["model"], "gpt-test");
    }
}
