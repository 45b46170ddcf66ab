//! Custom error types for vault-pdf-export
//!
//! This module defines the error hierarchy for the exporter using thiserror
//! for ergonomic error definitions.

use thiserror::Error;

/// The main error type for export operations
#[derive(Error, Debug)]
pub enum ExportError {
    /// The external credential-manager process could not be invoked or
    /// returned an unparseable listing
    #[error("Source unavailable: {0}")]
    SourceUnavailable(String),

    /// The source contained no rows or entries at all
    #[error("Source is empty: {0}")]
    EmptySource(String),

    /// An archive was readable but none of its members looked like entries
    #[error("No supported items found in {0}")]
    NoSupportedItems(String),

    /// The document protection password was not supplied
    #[error("An access password is required to protect the document")]
    MissingAccessPassword,

    /// Vault and search filters excluded every entry
    #[error("No entries left after applying filters")]
    NoEntriesAfterFilter,

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Delimited-text parsing errors
    #[error("CSV error: {0}")]
    Csv(String),

    /// ZIP container errors
    #[error("Archive error: {0}")]
    Archive(String),

    /// Document generation or protection errors
    #[error("Render error: {0}")]
    Render(String),

    /// Invalid user input
    #[error("Validation error: {0}")]
    Validation(String),

    /// The user declined to continue
    #[error("Cancelled: {0}")]
    Cancelled(String),
}

impl ExportError {
    /// Create a "source unavailable" error for a failed external command
    pub fn command_failed(command: &str, detail: impl Into<String>) -> Self {
        Self::SourceUnavailable(format!("`{}` failed: {}", command, detail.into()))
    }

    /// Check if this error was raised by a source adapter before filtering
    pub fn is_source_error(&self) -> bool {
        matches!(
            self,
            Self::SourceUnavailable(_) | Self::EmptySource(_) | Self::NoSupportedItems(_)
        )
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::MissingAccessPassword)
    }
}

impl From<std::io::Error> for ExportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for ExportError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

impl From<csv::Error> for ExportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err.to_string())
    }
}

impl From<zip::result::ZipError> for ExportError {
    fn from(err: zip::result::ZipError) -> Self {
        Self::Archive(err.to_string())
    }
}

/// Result type alias for export operations
pub type ExportResult<T> = Result<T, ExportError>;
