//! Analysis results returned to callers.

use serde::{Deserialize, Serialize};

use super::document::{ExtractionResult, ExtractorKind};

/// Deterministic engagement metrics computed from extracted text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    pub word_count: usize,
    pub hashtag_count: usize,
    pub link_count: usize,
}

/// Normalized AI enrichment. Every field is always present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredInsight {
    pub summary: String,
    pub sentiment: String,
    /// Hashtags without the leading `#`.
    pub hashtags: Vec<String>,
    pub key_points: Vec<String>,
    /// Predicted engagement score, 0-100.
    pub engagement_prediction: u8,
}

impl Default for StructuredInsight {
    fn default() -> Self {
        Self {
            summary: String::new(),
            sentiment: "Neutral".to_string(),
            hashtags: Vec::new(),
            key_points: Vec::new(),
            engagement_prediction: 0,
        }
    }
}

/// Outcome of the best-effort AI enhancement step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AiOutcome {
    /// No credential configured; nothing was attempted.
    NoKey,
    /// The model replied with a payload that parsed and normalized.
    Structured {
        model: String,
        raw: String,
        insight: StructuredInsight,
    },
    /// The model replied, but the payload was not valid structured data.
    RawOnly { model: String, raw: String },
    /// Transport failure, remote error, timeout, or a reply without a payload.
    Unavailable,
}

/// Short machine-readable tag for an [`AiOutcome`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AiStatus {
    NoKey,
    Structured,
    RawOnly,
    Unavailable,
}

impl AiOutcome {
    pub fn status(&self) -> AiStatus {
        match self {
            Self::NoKey => AiStatus::NoKey,
            Self::Structured { .. } => AiStatus::Structured,
            Self::RawOnly { .. } => AiStatus::RawOnly,
            Self::Unavailable => AiStatus::Unavailable,
        }
    }

    pub fn insight(&self) -> Option<&StructuredInsight> {
        match self {
            Self::Structured { insight, .. } => Some(insight),
            _ => None,
        }
    }

    pub fn raw(&self) -> Option<&str> {
        match self {
            Self::Structured { raw, .. } | Self::RawOnly { raw, .. } => Some(raw),
            _ => None,
        }
    }

    pub fn model(&self) -> Option<&str> {
        match self {
            Self::Structured { model, .. } | Self::RawOnly { model, .. } => Some(model),
            _ => None,
        }
    }
}

/// The unit returned to the caller for one analyzed document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisResponse {
    pub extraction: ExtractionResult,
    pub metrics: Metrics,
    pub ai: AiOutcome,
}

/// JSON shape consumed by the presentation layer.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ResponseBody<'a> {
    text: &'a str,
    extractor: ExtractorKind,
    analysis: &'a Metrics,
    ai: Option<&'a StructuredInsight>,
    ai_raw: Option<&'a str>,
    ai_model: Option<&'a str>,
    ai_status: AiStatus,
}

impl Serialize for AnalysisResponse {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        ResponseBody {
            text: &self.extraction.text,
            extractor: self.extraction.extractor,
            analysis: &self.metrics,
            ai: self.ai.insight(),
            ai_raw: self.ai.raw(),
            ai_model: self.ai.model(),
            ai_status: self.ai.status(),
        }
        .serialize(serializer)
    }
}
