//! Parsing and normalization of model payloads into [`StructuredInsight`].
//!
//! Models drift: they fence their JSON in markdown, drop fields, or send
//! numbers as strings. Parsing only fails when the payload is not a JSON
//! object at all; every field-level problem is repaired with a default.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::models::StructuredInsight;

/// Why a payload could not be turned into an insight.
#[derive(Debug, Error)]
pub enum InsightError {
    #[error("payload is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("payload is JSON but not an object")]
    NotAnObject,
}

/// Remove a surrounding markdown code fence (```` ```json ... ``` ````), if any.
pub fn strip_code_fence(payload: &str) -> &str {
    let trimmed = payload.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    // Drop the info string (`json`, `JSON`, ...) up to the first newline.
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric()),
    };
    let body = body.trim_end();
    body.strip_suffix("```").unwrap_or(body).trim()
}

/// Parse a model payload and normalize it.
pub fn parse_insight(payload: &str) -> Result<StructuredInsight, InsightError> {
    let value: Value = serde_json::from_str(strip_code_fence(payload))?;
    match value {
        Value::Object(object) => Ok(normalize_insight(&object)),
        // Some models wrap the object in a one-element array.
        Value::Array(items) => match items.first() {
            Some(Value::Object(object)) => Ok(normalize_insight(object)),
            _ => Err(InsightError::NotAnObject),
        },
        _ => Err(InsightError::NotAnObject),
    }
}

/// Coerce a parsed object into a [`StructuredInsight`], field by field.
///
/// A blank `sentiment` string becomes `"Neutral"` just like a missing one, and
/// hashtag strings that are empty after trimming and removing `#` (`"#"`,
/// `"  "`) are dropped along with non-string entries. Both are deliberate:
/// an empty label carries no information for the presentation layer.
pub fn normalize_insight(object: &Map<String, Value>) -> StructuredInsight {
    let defaults = StructuredInsight::default();
    let field = |snake: &str, camel: &str| object.get(snake).or_else(|| object.get(camel));

    let summary = object
        .get("summary")
        .and_then(Value::as_str)
        .map(String::from)
        .unwrap_or(defaults.summary);

    let sentiment = object
        .get("sentiment")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .unwrap_or(defaults.sentiment);

    let hashtags = strings(object.get("hashtags"))
        .map(|tag| tag.trim().trim_start_matches('#').trim().to_string())
        .filter(|tag| !tag.is_empty())
        .collect();

    let key_points = strings(field("key_points", "keyPoints"))
        .map(String::from)
        .collect();

    let engagement_prediction = field("engagement_prediction", "engagementPrediction")
        .and_then(score)
        .unwrap_or(defaults.engagement_prediction);

    StructuredInsight {
        summary,
        sentiment,
        hashtags,
        key_points,
        engagement_prediction,
    }
}

/// String members of an array value; anything else is dropped.
fn strings(value: Option<&Value>) -> impl Iterator<Item = &str> {
    value
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
}

/// Numeric score clamped to 0-100 and rounded. Accepts numeric strings
/// such as `"72"` or `"72%"`.
fn score(value: &Value) -> Option<u8> {
    let raw = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().trim_end_matches('%').trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if !raw.is_finite() {
        return None;
    }
    Some(raw.clamp(0.0, 100.0).round() as u8)
}
