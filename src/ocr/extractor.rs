//! Text extraction dispatch over the PDF, OCR and plain-text adapters.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, warn};

use super::backend::{OcrBackend, OcrError, PdfParseError, PdfParser};
use super::pdf::PdfToTextParser;
use super::tesseract::TesseractBackend;
use super::tools::check_binary;
use crate::config::ExtractionConfig;
use crate::models::{ExtractionResult, ExtractorKind, SourceDocument};

/// Errors that can occur during text extraction.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("PDF extraction failed: {0}")]
    Pdf(#[from] PdfParseError),

    #[error("OCR failed: {0}")]
    Ocr(#[from] OcrError),

    #[error("{extractor} extraction timed out after {}s", .timeout.as_secs())]
    Timeout {
        extractor: ExtractorKind,
        timeout: Duration,
    },
}

/// Selects an adapter by declared content type and runs it once.
pub struct TextExtractor {
    pdf: Arc<dyn PdfParser>,
    ocr: Arc<dyn OcrBackend>,
    ocr_language: String,
    timeout: Duration,
}

impl TextExtractor {
    /// Create an extractor over explicit capabilities.
    pub fn new(pdf: Arc<dyn PdfParser>, ocr: Arc<dyn OcrBackend>) -> Self {
        let defaults = ExtractionConfig::default();
        Self {
            pdf,
            ocr,
            ocr_language: defaults.ocr_language.clone(),
            timeout: defaults.timeout(),
        }
    }

    /// Create an extractor backed by pdftotext and Tesseract.
    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self::new(
            Arc::new(PdfToTextParser::with_command(&config.pdftotext_command)),
            Arc::new(TesseractBackend::with_command(&config.tesseract_command)),
        )
        .with_language(&config.ocr_language)
        .with_timeout(config.timeout())
    }

    /// Set OCR language.
    pub fn with_language(mut self, lang: &str) -> Self {
        self.ocr_language = lang.to_string();
        self
    }

    /// Set the bound on a single adapter call.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Which adapter handles a declared content type.
    ///
    /// Parameters (`; charset=...`) and case are ignored.
    pub fn select(content_type: &str) -> ExtractorKind {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        if essence == "application/pdf" {
            ExtractorKind::Pdf
        } else if essence.starts_with("image/") {
            ExtractorKind::Ocr
        } else {
            ExtractorKind::PlainText
        }
    }

    /// Extract text from a document based on its declared content type.
    pub async fn extract(
        &self,
        document: &SourceDocument,
    ) -> Result<ExtractionResult, ExtractionError> {
        let extractor = Self::select(document.content_type());
        debug!(
            "Extracting {} bytes of {} with {} adapter",
            document.size_bytes(),
            document.content_type(),
            extractor
        );

        let text = match extractor {
            ExtractorKind::Pdf => {
                let parse = self.pdf.parse(document.bytes());
                self.bounded(extractor, parse).await??
            }
            ExtractorKind::Ocr => {
                let recognize = self.ocr.recognize(
                    document.bytes(),
                    document.content_type(),
                    &self.ocr_language,
                );
                self.bounded(extractor, recognize).await??
            }
            ExtractorKind::PlainText => decode_plain_text(document.bytes()),
        };

        Ok(ExtractionResult { text, extractor })
    }

    async fn bounded<F: std::future::Future>(
        &self,
        extractor: ExtractorKind,
        future: F,
    ) -> Result<F::Output, ExtractionError> {
        tokio::time::timeout(self.timeout, future)
            .await
            .map_err(|_| {
                warn!("{} extraction timed out after {:?}", extractor, self.timeout);
                ExtractionError::Timeout {
                    extractor,
                    timeout: self.timeout,
                }
            })
    }

    /// Check if required tools are available.
    pub fn check_tools(config: &ExtractionConfig) -> Vec<(String, bool)> {
        [&config.pdftotext_command, &config.tesseract_command]
            .iter()
            .map(|tool| (tool.to_string(), check_binary(tool)))
            .collect()
    }
}

/// Decode bytes as UTF-8 text.
///
/// Content that is not valid UTF-8 is untranslatable rather than an error
/// and yields an empty string. A leading byte-order mark is dropped.
pub fn decode_plain_text(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(e) => {
            debug!("Plain-text upload is not valid UTF-8 ({}), using empty text", e);
            String::new()
        }
    }
}
