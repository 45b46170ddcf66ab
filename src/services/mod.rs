//! Service layer for vault-pdf-export
//!
//! The service layer ties the source adapters, the filter stage, and the
//! renderer into one export run.

pub mod export;

pub use export::{ExportService, ExportSummary};
