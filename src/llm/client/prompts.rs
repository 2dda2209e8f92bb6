//! Prompt and structured-output schema for document insights.

use std::sync::LazyLock;

use serde_json::{json, Value};

/// Instruction template. `{content}` is replaced by the document text.
pub const INSIGHT_PROMPT: &str = r#"You are an expert social media content strategist. Analyze the document below and respond with a single JSON object containing exactly these fields:

- "summary": a 2-3 sentence summary of the content
- "sentiment": the overall tone, one of "Positive", "Neutral", "Negative" or "Mixed"
- "hashtags": an array of 3-8 relevant hashtags, as strings, without the leading '#'
- "key_points": an array of short, actionable suggestions for improving engagement
- "engagement_prediction": an integer from 0 to 100 estimating how well the content will perform

Respond with ONLY the JSON object. Do NOT wrap it in markdown code fences and do NOT add any explanation or text before or after it.

Document:
{content}"#;

/// Gemini `responseSchema` matching [`INSIGHT_PROMPT`].
pub static INSIGHT_SCHEMA: LazyLock<Value> = LazyLock::new(|| {
    json!({
        "type": "OBJECT",
        "properties": {
            "summary": { "type": "STRING" },
            "sentiment": { "type": "STRING" },
            "hashtags": { "type": "ARRAY", "items": { "type": "STRING" } },
            "key_points": { "type": "ARRAY", "items": { "type": "STRING" } },
            "engagement_prediction": { "type": "INTEGER" }
        },
        "required": ["summary", "sentiment", "hashtags", "key_points", "engagement_prediction"]
    })
});

/// Build the prompt for a document.
///
/// `content` is appended as given. Callers cap it first: the enhancer cuts
/// the document to `AiConfig::max_content_chars` before building the prompt.
pub fn insight_prompt(content: &str) -> String {
    INSIGHT_PROMPT.replace("{content}", content)
}
