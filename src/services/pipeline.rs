//! Document analysis pipeline.
//!
//! extract text → compute metrics → attempt AI enhancement → assemble.
//! Only extraction can fail the pipeline; the AI step is strictly additive.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::time::Instant;

use futures::FutureExt;
use tracing::{error, info};

use crate::analysis::analyze_text;
use crate::config::Settings;
use crate::llm::{AiEnhancer, LlmError};
use crate::models::{AiOutcome, AnalysisResponse, SourceDocument};
use crate::ocr::{ExtractionError, TextExtractor};

/// Runs the end-to-end analysis of one document.
///
/// Holds no per-request state, so one instance serves concurrent requests.
pub struct AnalysisService {
    extractor: TextExtractor,
    enhancer: Option<AiEnhancer>,
}

impl AnalysisService {
    /// Create a service from explicit parts. `None` disables enhancement.
    pub fn new(extractor: TextExtractor, enhancer: Option<AiEnhancer>) -> Self {
        Self {
            extractor,
            enhancer,
        }
    }

    /// Create a service with the external tools and Gemini client.
    pub fn from_settings(settings: &Settings) -> Result<Self, LlmError> {
        Ok(Self::new(
            TextExtractor::from_config(&settings.extraction),
            Some(AiEnhancer::from_config(settings.ai.clone())?),
        ))
    }

    /// Whether a credential for the AI step is configured.
    pub fn ai_configured(&self) -> bool {
        self.enhancer
            .as_ref()
            .is_some_and(|e| e.config().is_configured())
    }

    /// Analyze one document.
    ///
    /// Fails only if text extraction fails. The document bytes are dropped
    /// as soon as the text is out.
    pub async fn process(
        &self,
        document: SourceDocument,
    ) -> Result<AnalysisResponse, ExtractionError> {
        let start = Instant::now();
        let extraction = self.extractor.extract(&document).await?;
        drop(document);

        let metrics = analyze_text(&extraction.text);
        let ai = self.enhance(&extraction.text).await;

        info!(
            "Analyzed document with {} adapter: {} words, AI {:?}, {:?}",
            extraction.extractor,
            metrics.word_count,
            ai.status(),
            start.elapsed()
        );

        Ok(AnalysisResponse {
            extraction,
            metrics,
            ai,
        })
    }

    /// Run the enhancer, turning a panic inside it into `Unavailable`.
    async fn enhance(&self, text: &str) -> AiOutcome {
        let Some(enhancer) = &self.enhancer else {
            return AiOutcome::NoKey;
        };

        match AssertUnwindSafe(enhancer.enhance(text)).catch_unwind().await {
            Ok(outcome) => outcome,
            Err(panic) => {
                error!("AI enhancement crashed: {}", panic_message(panic.as_ref()));
                AiOutcome::Unavailable
            }
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    panic
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| panic.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{AiConfig, GenerativeApi, ModelInfo};
    use crate::models::{ExtractorKind, Metrics};
    use crate::ocr::{OcrBackend, OcrError, PdfParseError, PdfParser};
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::Arc;

    struct BrokenPdf;

    #[async_trait]
    impl PdfParser for BrokenPdf {
        fn name(&self) -> &'static str {
            "broken"
        }

        fn is_available(&self) -> bool {
            true
        }

        async fn parse(&self, _pdf: &[u8]) -> Result<String, PdfParseError> {
            Err(PdfParseError::InvalidPdf("May not be a PDF file".to_string()))
        }
    }

    struct NoOcr;

    #[async_trait]
    impl OcrBackend for NoOcr {
        fn name(&self) -> &'static str {
            "none"
        }

        fn is_available(&self) -> bool {
            false
        }

        async fn recognize(&self, _: &[u8], _: &str, _: &str) -> Result<String, OcrError> {
            Err(OcrError::BackendNotAvailable("none".to_string()))
        }
    }

    enum Behavior {
        Reply(&'static str),
        Panic,
    }

    struct ScriptedApi(Behavior);

    #[async_trait]
    impl GenerativeApi for ScriptedApi {
        async fn list_models(&self) -> Result<Vec<ModelInfo>, LlmError> {
            Ok(vec![ModelInfo::new("gemini-1.5-flash", true)])
        }

        async fn generate(&self, _: &str, _: &str, _: &Value) -> Result<Value, LlmError> {
            match self.0 {
                Behavior::Reply(text) => Ok(json!({
                    "candidates": [{ "content": { "parts": [{ "text": text }] } }]
                })),
                Behavior::Panic => panic!("provider schema changed"),
            }
        }
    }

    fn service(ai: Option<Behavior>) -> AnalysisService {
        let extractor = TextExtractor::new(Arc::new(BrokenPdf), Arc::new(NoOcr));
        let enhancer = ai.map(|behavior| {
            AiEnhancer::new(
                AiConfig::default().with_api_key("key"),
                Arc::new(ScriptedApi(behavior)),
            )
        });
        AnalysisService::new(extractor, enhancer)
    }

    fn text_document(text: &str) -> SourceDocument {
        SourceDocument::new(text.as_bytes().to_vec(), "text/plain")
    }

    #[tokio::test]
    async fn test_plain_text_without_ai() {
        let response = service(None)
            .process(text_document("New drop #launch2024 https://shop.example"))
            .await
            .unwrap();

        assert_eq!(response.extraction.extractor, ExtractorKind::PlainText);
        assert_eq!(
            response.metrics,
            Metrics {
                word_count: 4,
                hashtag_count: 1,
                link_count: 1,
            }
        );
        assert_eq!(response.ai, AiOutcome::NoKey);
    }

    #[tokio::test]
    async fn test_structured_ai() {
        let response = service(Some(Behavior::Reply(
            r#"{"summary":"s","engagement_prediction":150}"#,
        )))
        .process(text_document("hello"))
        .await
        .unwrap();

        let insight = response.ai.insight().unwrap();
        assert_eq!(insight.summary, "s");
        assert_eq!(insight.engagement_prediction, 100);
        assert_eq!(response.ai.model(), Some("gemini-1.5-flash"));
    }

    #[tokio::test]
    async fn test_enhancer_panic_is_unavailable() {
        let response = service(Some(Behavior::Panic))
            .process(text_document("hello world"))
            .await
            .unwrap();

        assert_eq!(response.ai, AiOutcome::Unavailable);
        assert_eq!(response.metrics.word_count, 2);
        assert_eq!(response.extraction.text, "hello world");
    }

    #[tokio::test]
    async fn test_extraction_failure_propagates() {
        let result = service(Some(Behavior::Reply("{}")))
            .process(SourceDocument::new(b"not a pdf".to_vec(), "application/pdf"))
            .await;

        assert!(matches!(result, Err(ExtractionError::Pdf(_))));
    }

    #[test]
    fn test_ai_configured() {
        assert!(!service(None).ai_configured());
        assert!(service(Some(Behavior::Reply("{}"))).ai_configured());
    }
}
