//! Rule-based text analysis.
//!
//! Computes deterministic engagement metrics from extracted text. No I/O,
//! no configuration: the same text always yields the same [`Metrics`].
//!
//! [`Metrics`]: crate::models::Metrics

mod rules;

pub use rules::analyze_text;
