//! Data models for docsight.

mod analysis;
mod document;

pub use analysis::{AiOutcome, AiStatus, AnalysisResponse, Metrics, StructuredInsight};
pub use document::{ExtractionResult, ExtractorKind, SourceDocument};
