//! PDF text-layer extraction via Poppler's `pdftotext`.

use std::io::ErrorKind;

use async_trait::async_trait;
use tracing::debug;

use super::backend::{PdfParseError, PdfParser};
use super::tools::{check_binary, run_with_stdin, stderr_message};

/// Reads the PDF from stdin (`fd://0`) and writes UTF-8 text to stdout.
pub struct PdfToTextParser {
    command: String,
}

impl PdfToTextParser {
    pub fn new() -> Self {
        Self::with_command("pdftotext")
    }

    /// Use a specific pdftotext executable.
    pub fn with_command(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

impl Default for PdfToTextParser {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PdfParser for PdfToTextParser {
    fn name(&self) -> &'static str {
        "pdftotext"
    }

    fn is_available(&self) -> bool {
        check_binary(&self.command)
    }

    async fn parse(&self, pdf: &[u8]) -> Result<String, PdfParseError> {
        let output = run_with_stdin(
            &self.command,
            &["-layout", "-enc", "UTF-8", "fd://0", "-"],
            pdf,
        )
        .await
        .map_err(|e| match e.kind() {
            ErrorKind::NotFound => PdfParseError::BackendNotAvailable(
                "pdftotext not found (install poppler-utils)".to_string(),
            ),
            _ => PdfParseError::Io(e),
        })?;

        if !output.status.success() {
            return Err(PdfParseError::InvalidPdf(stderr_message(&output)));
        }

        let text = String::from_utf8_lossy(&output.stdout).to_string();
        debug!("pdftotext produced {} chars from {} bytes", text.len(), pdf.len());
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_tool_is_not_available() {
        let parser = PdfToTextParser::with_command("docsight-missing-pdftotext");
        assert!(!parser.is_available());
        let err = parser.parse(b"%PDF-1.4").await.unwrap_err();
        assert!(matches!(err, PdfParseError::BackendNotAvailable(_)));
    }
}
