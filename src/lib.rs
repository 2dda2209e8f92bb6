//! docsight - document text extraction with engagement metrics and AI insights.
//!
//! Accepts a PDF, image or plain-text document, extracts its text, counts
//! words, hashtags and links, and optionally asks a Gemini model for a
//! structured insight (summary, sentiment, hashtags, key points, predicted
//! engagement). The AI step is best-effort: it never fails a request.

pub mod analysis;
pub mod cli;
pub mod config;
pub mod llm;
pub mod models;
pub mod ocr;
pub mod server;
pub mod services;
