//! vault-pdf-export - password-manager entries to a protected PDF
//!
//! Entries are read from one of three sources, normalized into a single
//! [`models::Entry`] shape, filtered, and rendered into a paginated PDF that
//! only opens with a caller-chosen password.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Configuration and path management
//! - `error`: Custom error types
//! - `models`: Canonical entry and rendering options
//! - `import`: Source adapters (op CLI, CSV, 1PUX archive)
//! - `filter`: Vault and text filtering
//! - `export`: Layout, fonts, and PDF rendering
//! - `services`: The export pipeline
//! - `storage`: Atomic file writes
//! - `crypto`: Zeroizing secrets
//! - `cli`: Command handlers
//!
//! # Example
//!
//! ```rust,ignore
//! use vault_pdf_export::export::BuiltinFontOnly;
//! use vault_pdf_export::filter::EntryFilter;
//! use vault_pdf_export::import::CsvSource;
//! use vault_pdf_export::models::RenderOptions;
//! use vault_pdf_export::services::ExportService;
//!
//! let source = CsvSource::new("export.csv");
//! let options = RenderOptions::new("csv", "secret");
//! ExportService::new(BuiltinFontOnly).run(&source, &EntryFilter::new(), &options, "out.pdf".as_ref())?;
//! ```

pub mod cli;
pub mod config;
pub mod crypto;
pub mod error;
pub mod export;
pub mod filter;
pub mod import;
pub mod models;
pub mod services;
pub mod storage;

pub use error::{ExportError, ExportResult};
