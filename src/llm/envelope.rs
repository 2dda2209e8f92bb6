//! Payload extraction from remote response envelopes.
//!
//! Provider versions disagree on where the generated text lives. Each
//! extractor knows one shape; they are tried in order and the first
//! non-blank text wins.

use serde_json::Value;

type Extractor = fn(&Value) -> Option<String>;

/// Known envelope shapes, most specific first.
const EXTRACTORS: &[(&str, Extractor)] = &[
    ("candidates.content.parts", candidate_parts),
    ("candidates.content", candidate_content_text),
    ("candidates.output", candidate_output),
    ("output.content", output_content),
    ("result.output.content", result_output_content),
    ("text", top_level_text),
];

/// Pull the model's text payload out of a response envelope.
///
/// Returns `None` when no known shape carries any text.
pub fn extract_payload_text(envelope: &Value) -> Option<String> {
    EXTRACTORS.iter().find_map(|(shape, extract)| {
        let text = extract(envelope).filter(|t| !t.trim().is_empty())?;
        tracing::debug!("Found {} payload chars at {}", text.len(), shape);
        Some(text)
    })
}

fn string_at(envelope: &Value, pointer: &str) -> Option<String> {
    envelope
        .pointer(pointer)
        .and_then(Value::as_str)
        .map(String::from)
}

/// Gemini `generateContent`: text split across `parts`.
fn candidate_parts(envelope: &Value) -> Option<String> {
    let parts = envelope
        .pointer("/candidates/0/content/parts")?
        .as_array()?;
    let text: String = parts
        .iter()
        .filter_map(|part| part.get("text").and_then(Value::as_str))
        .collect();
    Some(text)
}

fn candidate_content_text(envelope: &Value) -> Option<String> {
    string_at(envelope, "/candidates/0/content")
}

/// PaLM `generateText`.
fn candidate_output(envelope: &Value) -> Option<String> {
    string_at(envelope, "/candidates/0/output")
}

fn output_content(envelope: &Value) -> Option<String> {
    string_at(envelope, "/output/0/content")
}

fn result_output_content(envelope: &Value) -> Option<String> {
    string_at(envelope, "/result/output/0/content")
}

fn top_level_text(envelope: &Value) -> Option<String> {
    string_at(envelope, "/text")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_gemini_parts_are_joined() {
        let envelope = json!({
            "candidates": [{
                "content": { "parts": [{ "text": "{\"summary\":" }, { "text": "\"ok\"}" }] },
                "finishReason": "STOP"
            }]
        });
        assert_eq!(
            extract_payload_text(&envelope).as_deref(),
            Some("{\"summary\":\"ok\"}")
        );
    }

    #[test]
    fn test_legacy_shapes() {
        let cases = [
            json!({ "candidates": [{ "content": "a" }] }),
            json!({ "candidates": [{ "output": "a" }] }),
            json!({ "output": [{ "content": "a" }] }),
            json!({ "result": { "output": [{ "content": "a" }] } }),
            json!({ "text": "a" }),
        ];
        for envelope in cases {
            assert_eq!(extract_payload_text(&envelope).as_deref(), Some("a"), "{}", envelope);
        }
    }

    #[test]
    fn test_priority_order() {
        let envelope = json!({
            "candidates": [{ "content": { "parts": [{ "text": "first" }] } }],
            "text": "last"
        });
        assert_eq!(extract_payload_text(&envelope).as_deref(), Some("first"));
    }

    #[test]
    fn test_blank_parts_fall_through() {
        let envelope = json!({
            "candidates": [{ "content": { "parts": [{ "text": "  " }] } }],
            "text": "fallback"
        });
        assert_eq!(extract_payload_text(&envelope).as_deref(), Some("fallback"));
    }

    #[test]
    fn test_no_payload() {
        assert_eq!(extract_payload_text(&json!({})), None);
        assert_eq!(
            extract_payload_text(&json!({ "candidates": [{ "finishReason": "SAFETY" }] })),
            None
        );
        assert_eq!(extract_payload_text(&json!({ "candidates": [] })), None);
    }
}
