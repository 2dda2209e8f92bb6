//! Best-effort AI enhancement of extracted text.
//!
//! [`AiEnhancer::enhance`] never fails: every problem along the way
//! (missing key, discovery failure, timeouts, remote errors, malformed
//! payloads) degrades to an [`AiOutcome`] variant.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use super::client::{
    insight_prompt, truncate_chars, AiConfig, GeminiClient, GenerativeApi, LlmError, ModelInfo,
    INSIGHT_SCHEMA,
};
use super::envelope::extract_payload_text;
use super::insight::parse_insight;
use crate::models::AiOutcome;

/// Envelope bodies are cut to this many chars before logging.
const LOG_ENVELOPE_CHARS: usize = 2000;

/// Orchestrates model selection, generation and payload parsing.
pub struct AiEnhancer {
    config: AiConfig,
    api: Arc<dyn GenerativeApi>,
}

impl AiEnhancer {
    /// Create an enhancer over an explicit remote capability.
    pub fn new(config: AiConfig, api: Arc<dyn GenerativeApi>) -> Self {
        Self { config, api }
    }

    /// Create an enhancer talking to Gemini.
    pub fn from_config(config: AiConfig) -> Result<Self, LlmError> {
        let api = Arc::new(GeminiClient::new(&config)?);
        Ok(Self::new(config, api))
    }

    pub fn config(&self) -> &AiConfig {
        &self.config
    }

    /// Attempt to enrich `text` with a structured insight.
    pub async fn enhance(&self, text: &str) -> AiOutcome {
        if !self.config.is_configured() {
            info!("No GEMINI_API_KEY/GOOGLE_API_KEY configured; skipping AI enhancement");
            return AiOutcome::NoKey;
        }

        debug!("AI enhancement requested for {} chars of text", text.len());
        let model = self.select_model().await;
        let content = truncate_chars(text, self.config.max_content_chars);
        if content.len() < text.len() {
            debug!("Truncated document to {} chars for the model", self.config.max_content_chars);
        }
        let prompt = insight_prompt(content);

        let start = Instant::now();
        let generation = tokio::time::timeout(
            self.config.generation_timeout(),
            self.api.generate(&model, &prompt, &INSIGHT_SCHEMA),
        )
        .await;

        let envelope = match generation {
            Ok(Ok(envelope)) => envelope,
            Ok(Err(e)) => {
                warn!("Generation with {} failed: {}", model, e);
                return AiOutcome::Unavailable;
            }
            Err(_) => {
                warn!(
                    "Generation with {} timed out after {:?}",
                    model,
                    self.config.generation_timeout()
                );
                return AiOutcome::Unavailable;
            }
        };
        info!("Generation with {} completed in {:?}", model, start.elapsed());

        let Some(raw) = extract_payload_text(&envelope) else {
            warn!(
                "No text payload in response from {} (truncated): {}",
                model,
                truncate_chars(&envelope.to_string(), LOG_ENVELOPE_CHARS)
            );
            return AiOutcome::Unavailable;
        };

        match parse_insight(&raw) {
            Ok(insight) => AiOutcome::Structured {
                model,
                raw,
                insight,
            },
            Err(e) => {
                warn!("Model payload rejected ({}); returning raw text only", e);
                AiOutcome::RawOnly { model, raw }
            }
        }
    }

    /// Resolve the model to use for generation.
    ///
    /// Discovery failures and empty listings fall back to the configured
    /// default model rather than failing.
    pub async fn select_model(&self) -> String {
        let fallback = || self.config.fallback_model.clone();

        let listing =
            tokio::time::timeout(self.config.discovery_timeout(), self.api.list_models()).await;

        let models = match listing {
            Ok(Ok(models)) => models,
            Ok(Err(e)) => {
                warn!("Model discovery failed ({}); using {}", e, self.config.fallback_model);
                return fallback();
            }
            Err(_) => {
                warn!(
                    "Model discovery timed out after {:?}; using {}",
                    self.config.discovery_timeout(),
                    self.config.fallback_model
                );
                return fallback();
            }
        };

        debug!(
            "Available models: {:?}",
            models.iter().take(10).map(|m| &m.id).collect::<Vec<_>>()
        );

        match choose_model(&models, &self.config.preferred_models) {
            Some(model) => {
                info!("Selected model {}", model);
                model
            }
            None => {
                warn!("No capable model listed; using {}", self.config.fallback_model);
                fallback()
            }
        }
    }
}

/// Pick a model from a listing.
///
/// Preferences are tried in order; each matches an exact id first
/// (case-insensitive), then any id containing it. Without a preferred match
/// the first capable model wins. Models that cannot generate are ignored.
pub fn choose_model(models: &[ModelInfo], preferred: &[String]) -> Option<String> {
    let capable: Vec<&ModelInfo> = models.iter().filter(|m| m.supports_generation).collect();

    let preferred_match = preferred.iter().find_map(|pref| {
        let pref = pref.to_lowercase();
        capable
            .iter()
            .find(|m| m.id.to_lowercase() == pref)
            .or_else(|| capable.iter().find(|m| m.id.to_lowercase().contains(&pref)))
    });

    preferred_match
        .or_else(|| capable.first())
        .map(|m| m.id.clone())
}
