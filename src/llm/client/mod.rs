//! Client for the remote text-generation service.
//!
//! Talks to Google's Generative Language API (Gemini). The enhancer only
//! sees the [`GenerativeApi`] trait: model listing and content generation.

mod config;
mod prompts;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

pub use config::AiConfig;
pub use prompts::{insight_prompt, INSIGHT_PROMPT, INSIGHT_SCHEMA};

/// Remote bodies are cut to this many chars before logging.
const LOG_BODY_CHARS: usize = 2000;

/// Errors that can occur talking to the remote service.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("API error (HTTP {status}): {body}")]
    Api { status: u16, body: String },

    #[error("Parse error: {0}")]
    Parse(String),
}

/// A model offered by the remote service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelInfo {
    /// Model id without the `models/` prefix, e.g. `gemini-1.5-flash`.
    pub id: String,
    /// Whether the model accepts content-generation requests.
    pub supports_generation: bool,
}

impl ModelInfo {
    pub fn new(id: impl Into<String>, supports_generation: bool) -> Self {
        Self {
            id: id.into(),
            supports_generation,
        }
    }
}

/// The remote text-generation capability.
#[async_trait]
pub trait GenerativeApi: Send + Sync {
    /// List the models available to the configured credential.
    async fn list_models(&self) -> Result<Vec<ModelInfo>, LlmError>;

    /// Run a generation request and return the raw response envelope.
    async fn generate(&self, model: &str, prompt: &str, schema: &Value) -> Result<Value, LlmError>;
}

#[derive(Debug, Serialize)]
struct GeminiRequest<'a> {
    contents: Vec<GeminiContent<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GeminiGenerationConfig<'a>,
}

#[derive(Debug, Serialize)]
struct GeminiContent<'a> {
    parts: Vec<GeminiPart<'a>>,
}

#[derive(Debug, Serialize)]
struct GeminiPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct GeminiGenerationConfig<'a> {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
    #[serde(rename = "responseMimeType")]
    response_mime_type: &'static str,
    #[serde(rename = "responseSchema")]
    response_schema: &'a Value,
}

/// Gemini implementation of [`GenerativeApi`].
pub struct GeminiClient {
    client: Client,
    endpoint: String,
    api_key: String,
    temperature: f32,
    max_output_tokens: u32,
}

impl GeminiClient {
    /// Create a client from configuration.
    ///
    /// A missing credential yields a client whose calls fail with HTTP 4xx;
    /// callers are expected to check [`AiConfig::is_configured`] first.
    pub fn new(config: &AiConfig) -> Result<Self, LlmError> {
        let client = Client::builder()
            .connect_timeout(config.discovery_timeout())
            .build()
            .map_err(|e| LlmError::Connection(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            api_key: config.credential().unwrap_or_default().to_string(),
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
        })
    }

    /// Send a request and decode the body as JSON, mapping failures.
    async fn send_json(&self, request: reqwest::RequestBuilder) -> Result<Value, LlmError> {
        let resp = request
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| LlmError::Connection(e.without_url().to_string()))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| LlmError::Connection(e.without_url().to_string()))?;

        if !status.is_success() {
            warn!(
                "Gemini returned HTTP {} - body (truncated): {}",
                status.as_u16(),
                truncate_chars(&body, LOG_BODY_CHARS)
            );
            return Err(LlmError::Api {
                status: status.as_u16(),
                body: truncate_chars(&body, LOG_BODY_CHARS).to_string(),
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            warn!(
                "Gemini response is not JSON: {} - body (truncated): {}",
                e,
                truncate_chars(&body, LOG_BODY_CHARS)
            );
            LlmError::Parse(e.to_string())
        })
    }
}

#[async_trait]
impl GenerativeApi for GeminiClient {
    async fn list_models(&self) -> Result<Vec<ModelInfo>, LlmError> {
        let url = format!("{}/models", self.endpoint);
        debug!("Listing models at {}", url);
        let listing = self
            .send_json(self.client.get(&url).query(&[("pageSize", "1000")]))
            .await?;
        Ok(parse_model_list(&listing))
    }

    async fn generate(&self, model: &str, prompt: &str, schema: &Value) -> Result<Value, LlmError> {
        let request = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart { text: prompt }],
            }],
            generation_config: GeminiGenerationConfig {
                temperature: self.temperature,
                max_output_tokens: self.max_output_tokens,
                response_mime_type: "application/json",
                response_schema: schema,
            },
        };

        let url = format!("{}/models/{}:generateContent", self.endpoint, model);
        debug!("Generating with {} ({} prompt chars)", model, prompt.len());
        self.send_json(self.client.post(&url).json(&request)).await
    }
}

/// Normalize a model listing into [`ModelInfo`] entries.
///
/// Accepts the Gemini shape (`{"models": [{"name": "models/x",
/// "supportedGenerationMethods": [...]}]}`) and the OpenAI-style
/// `{"data": [{"id": "x"}]}`. Entries that do not list their methods are
/// assumed to support generation.
pub fn parse_model_list(listing: &Value) -> Vec<ModelInfo> {
    let entries = listing
        .get("models")
        .or_else(|| listing.get("data"))
        .and_then(Value::as_array);

    let Some(entries) = entries else {
        return Vec::new();
    };

    entries
        .iter()
        .filter_map(|entry| {
            let name = entry
                .get("name")
                .or_else(|| entry.get("id"))
                .and_then(Value::as_str)?;
            let id = name.rsplit('/').next().unwrap_or(name).trim();
            if id.is_empty() {
                return None;
            }
            let supports_generation = match entry
                .get("supportedGenerationMethods")
                .and_then(Value::as_array)
            {
                Some(methods) => methods
                    .iter()
                    .any(|m| m.as_str() == Some("generateContent")),
                None => true,
            };
            Some(ModelInfo::new(id, supports_generation))
        })
        .collect()
}

/// Truncate to at most `max` chars (UTF-8 safe).
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_gemini_listing() {
        let listing = json!({
            "models": [
                {
                    "name": "models/embedding-001",
                    "supportedGenerationMethods": ["embedContent"]
                },
                {
                    "name": "models/gemini-1.5-flash",
                    "supportedGenerationMethods": ["generateContent", "countTokens"]
                }
            ]
        });
        assert_eq!(
            parse_model_list(&listing),
            vec![
                ModelInfo::new("embedding-001", false),
                ModelInfo::new("gemini-1.5-flash", true),
            ]
        );
    }

    #[test]
    fn test_parse_openai_style_listing() {
        let listing = json!({ "data": [{ "id": "gemini-pro" }, { "id": "" }, { "object": "x" }] });
        assert_eq!(parse_model_list(&listing), vec![ModelInfo::new("gemini-pro", true)]);
    }

    #[test]
    fn test_parse_unexpected_listing() {
        assert!(parse_model_list(&json!({ "error": { "code": 403 } })).is_empty());
        assert!(parse_model_list(&json!("models")).is_empty());
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("hello", 10), "hello");
        assert_eq!(truncate_chars("hello", 2), "he");
        assert_eq!(truncate_chars("héllo", 2), "hé");
    }

    #[test]
    fn test_request_shape() {
        let schema = json!({ "type": "OBJECT" });
        let request = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart { text: "prompt" }],
            }],
            generation_config: GeminiGenerationConfig {
                temperature: 0.5,
                max_output_tokens: 256,
                response_mime_type: "application/json",
                response_schema: &schema,
            },
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["contents"][0]["parts"][0]["text"], "prompt");
        assert_eq!(value["generationConfig"]["maxOutputTokens"], 256);
        assert_eq!(value["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(value["generationConfig"]["responseSchema"]["type"], "OBJECT");
    }
}
