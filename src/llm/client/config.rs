//! Remote generation configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for the AI enhancement step.
///
/// Built once at startup and shared read-only; nothing mutates it mid-request.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct AiConfig {
    /// API key for the Generative Language API. Unset disables enhancement.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// API base URL (models are listed at `{endpoint}/models`)
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Model ids to prefer, in order, when discovery succeeds
    #[serde(default = "default_preferred_models")]
    pub preferred_models: Vec<String>,
    /// Model used when discovery fails or returns nothing
    #[serde(default = "default_fallback_model")]
    pub fallback_model: String,
    #[serde(default = "default_discovery_timeout_secs")]
    pub discovery_timeout_secs: u64,
    #[serde(default = "default_generation_timeout_secs")]
    pub generation_timeout_secs: u64,
    /// Temperature for generation (0.0 - 1.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
    /// Maximum characters of document content to send to the model
    #[serde(default = "default_max_content_chars")]
    pub max_content_chars: usize,
}

fn default_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_preferred_models() -> Vec<String> {
    ["gemini-1.5-flash", "gemini-pro-1.5", "gemini-pro", "gemini-1.0-pro"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_fallback_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_discovery_timeout_secs() -> u64 {
    10
}

fn default_generation_timeout_secs() -> u64 {
    60
}

fn default_temperature() -> f32 {
    0.4
}

fn default_max_output_tokens() -> u32 {
    1024
}

fn default_max_content_chars() -> usize {
    30000
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: default_endpoint(),
            preferred_models: default_preferred_models(),
            fallback_model: default_fallback_model(),
            discovery_timeout_secs: default_discovery_timeout_secs(),
            generation_timeout_secs: default_generation_timeout_secs(),
            temperature: default_temperature(),
            max_output_tokens: default_max_output_tokens(),
            max_content_chars: default_max_content_chars(),
        }
    }
}

impl std::fmt::Debug for AiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AiConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("endpoint", &self.endpoint)
            .field("preferred_models", &self.preferred_models)
            .field("fallback_model", &self.fallback_model)
            .field("discovery_timeout_secs", &self.discovery_timeout_secs)
            .field("generation_timeout_secs", &self.generation_timeout_secs)
            .field("temperature", &self.temperature)
            .field("max_output_tokens", &self.max_output_tokens)
            .field("max_content_chars", &self.max_content_chars)
            .finish()
    }
}

impl AiConfig {
    /// Apply environment variable overrides.
    ///
    /// Supported env vars:
    /// - `GEMINI_API_KEY`, then `GOOGLE_API_KEY`: API credential
    /// - `GEMINI_ENDPOINT`: API base URL
    /// - `GEMINI_MODEL`: Pin a model (tried before the preference list)
    /// - `GEMINI_FALLBACK_MODEL`: Model used when discovery fails
    /// - `GEMINI_DISCOVERY_TIMEOUT_SECS`: Bound on the model listing call
    /// - `GEMINI_TIMEOUT_SECS`: Bound on the generation call
    /// - `GEMINI_MAX_CONTENT_CHARS`: Max document chars to send
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|name| std::env::var(name).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    pub fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(key) = lookup("GEMINI_API_KEY").or_else(|| lookup("GOOGLE_API_KEY")) {
            self.api_key = Some(key);
        }
        if let Some(endpoint) = lookup("GEMINI_ENDPOINT") {
            self.endpoint = endpoint;
        }
        if let Some(model) = lookup("GEMINI_MODEL") {
            self.preferred_models.retain(|m| m != &model);
            self.preferred_models.insert(0, model);
        }
        if let Some(model) = lookup("GEMINI_FALLBACK_MODEL") {
            self.fallback_model = model;
        }
        if let Some(n) = lookup("GEMINI_DISCOVERY_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
            self.discovery_timeout_secs = n;
        }
        if let Some(n) = lookup("GEMINI_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
            self.generation_timeout_secs = n;
        }
        if let Some(n) = lookup("GEMINI_MAX_CONTENT_CHARS").and_then(|v| v.parse().ok()) {
            self.max_content_chars = n;
        }
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.to_string();
        self
    }

    /// The credential, if one is configured. Blank keys count as missing.
    pub fn credential(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }

    pub fn is_configured(&self) -> bool {
        self.credential().is_some()
    }

    pub fn discovery_timeout(&self) -> Duration {
        Duration::from_secs(self.discovery_timeout_secs)
    }

    pub fn generation_timeout(&self) -> Duration {
        Duration::from_secs(self.generation_timeout_secs)
    }
}
