//! Capability interfaces for the extraction adapters.
//!
//! The pipeline sees PDF parsing and OCR only through these traits, so the
//! engines behind them can be swapped (or faked in tests) freely.

use async_trait::async_trait;
use thiserror::Error;

/// Errors from OCR backends.
#[derive(Debug, Error)]
pub enum OcrError {
    #[error("Backend not available: {0}")]
    BackendNotAvailable(String),

    /// The image could not be decoded at all. An image without any
    /// recognizable text is not an error.
    #[error("Image could not be decoded: {0}")]
    DecodeFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from PDF text-layer parsers.
#[derive(Debug, Error)]
pub enum PdfParseError {
    #[error("Backend not available: {0}")]
    BackendNotAvailable(String),

    #[error("Invalid PDF: {0}")]
    InvalidPdf(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Recognizes text in raw image bytes.
#[async_trait]
pub trait OcrBackend: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &'static str;

    /// Check if this backend can run (dependencies installed).
    fn is_available(&self) -> bool;

    /// Recognize text in an image. Returns an empty string for blank images.
    async fn recognize(
        &self,
        image: &[u8],
        content_type: &str,
        language: &str,
    ) -> Result<String, OcrError>;
}

/// Produces the text layer of a PDF held in memory.
#[async_trait]
pub trait PdfParser: Send + Sync {
    /// Short parser name for logs.
    fn name(&self) -> &'static str;

    /// Check if this parser can run (dependencies installed).
    fn is_available(&self) -> bool;

    async fn parse(&self, pdf: &[u8]) -> Result<String, PdfParseError>;
}
