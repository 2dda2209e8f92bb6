//! OCR and text extraction module.
//!
//! Extracts text from uploaded documents using:
//! - pdftotext (Poppler) for the text layer of PDFs
//! - Tesseract OCR for image files
//! - direct UTF-8 decoding for everything else
//!
//! The external tools are reached through the [`PdfParser`] and
//! [`OcrBackend`] traits and are fed from memory over stdin.

mod backend;
mod extractor;
mod pdf;
mod tesseract;
mod tools;

pub use backend::{OcrBackend, OcrError, PdfParseError, PdfParser};
pub use extractor::{decode_plain_text, ExtractionError, TextExtractor};
pub use pdf::PdfToTextParser;
pub use tesseract::TesseractBackend;
