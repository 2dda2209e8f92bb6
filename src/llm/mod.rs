//! AI enhancement via a remote text-generation service.
//!
//! - [`client`]: the remote capability and its Gemini implementation
//! - envelope/insight parsing: turning replies into [`StructuredInsight`]
//! - [`AiEnhancer`]: the best-effort orchestration that never fails
//!
//! [`StructuredInsight`]: crate::models::StructuredInsight

pub mod client;
mod enhancer;
mod envelope;
mod insight;

pub use client::{AiConfig, GeminiClient, GenerativeApi, LlmError, ModelInfo};
pub use enhancer::{choose_model, AiEnhancer};
pub use envelope::extract_payload_text;
pub use insight::{normalize_insight, parse_insight, strip_code_fence, InsightError};
