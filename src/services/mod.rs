//! Service layer for docsight business logic.
//!
//! Services are independent of the transport: the web server and the CLI
//! both drive the same [`AnalysisService`].

pub mod pipeline;

pub use pipeline::AnalysisService;
