//! Uploaded documents and the text extracted from them.

use serde::{Deserialize, Serialize};

/// A document handed to the pipeline by the ingestion boundary.
///
/// The buffer is already validated (non-empty, within the upload limit) and
/// is owned by exactly one pipeline invocation.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    bytes: Vec<u8>,
    content_type: String,
}

impl SourceDocument {
    pub fn new(bytes: impl Into<Vec<u8>>, content_type: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            content_type: content_type.into(),
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Declared MIME type, as supplied at ingestion.
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn size_bytes(&self) -> usize {
        self.bytes.len()
    }
}

/// Which extraction strategy produced the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractorKind {
    /// PDF text layer.
    Pdf,
    /// OCR over an image.
    Ocr,
    /// Direct UTF-8 decoding.
    PlainText,
}

impl ExtractorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Ocr => "ocr",
            Self::PlainText => "plaintext",
        }
    }
}

impl std::fmt::Display for ExtractorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of text extraction. `text` may be empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionResult {
    pub text: String,
    pub extractor: ExtractorKind,
}
