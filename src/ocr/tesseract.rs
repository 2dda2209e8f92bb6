//! Tesseract OCR backend implementation.
//!
//! Runs the `tesseract` binary with the image piped over stdin, so the
//! upload never has to touch the filesystem.

use std::io::ErrorKind;
use std::time::Instant;

use async_trait::async_trait;
use tracing::debug;

use super::backend::{OcrBackend, OcrError};
use super::tools::{check_binary, run_with_stdin, stderr_message};

/// Tesseract OCR backend.
pub struct TesseractBackend {
    command: String,
}

impl TesseractBackend {
    pub fn new() -> Self {
        Self::with_command("tesseract")
    }

    /// Use a specific tesseract executable.
    pub fn with_command(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

impl Default for TesseractBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OcrBackend for TesseractBackend {
    fn name(&self) -> &'static str {
        "tesseract"
    }

    fn is_available(&self) -> bool {
        check_binary(&self.command)
    }

    async fn recognize(
        &self,
        image: &[u8],
        content_type: &str,
        language: &str,
    ) -> Result<String, OcrError> {
        let start = Instant::now();
        let output = run_with_stdin(&self.command, &["stdin", "stdout", "-l", language], image)
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => OcrError::BackendNotAvailable(
                    "tesseract not found (install tesseract-ocr)".to_string(),
                ),
                _ => OcrError::Io(e),
            })?;

        if !output.status.success() {
            return Err(OcrError::DecodeFailed(format!(
                "tesseract failed on {}: {}",
                content_type,
                stderr_message(&output)
            )));
        }

        let text = String::from_utf8_lossy(&output.stdout).to_string();
        debug!(
            "tesseract recognized {} chars from {} bytes of {} in {:?}",
            text.len(),
            image.len(),
            content_type,
            start.elapsed()
        );
        Ok(text)
    }
}
