//! Source adapters
//!
//! Each adapter turns one external format into canonical [`Entry`] values:
//! - [`op`]: the credential-manager CLI (list, then detail per item)
//! - [`csv`]: header-driven delimited text
//! - [`archive`]: ZIP export archives with drifting JSON layouts
//!
//! [`Entry`]: crate::models::Entry

pub mod archive;
pub mod csv;
pub mod fields;
pub mod op;

pub use self::archive::ArchiveSource;
pub use self::csv::CsvSource;
pub use self::op::{OpCli, OpRunner, OpSource, VaultSummary};

use crate::error::ExportResult;
use crate::models::Entry;

/// Entries produced by one adapter run
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    /// Normalized entries in source order
    pub entries: Vec<Entry>,
    /// Records that were dropped on a recoverable failure
    pub skipped: usize,
}

impl LoadReport {
    pub fn new(entries: Vec<Entry>) -> Self {
        Self {
            entries,
            skipped: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A source of canonical entries
pub trait EntrySource {
    /// Short label printed in the document header
    fn label(&self) -> &str;

    /// Read the whole source
    fn load(&self) -> ExportResult<LoadReport>;
}

/// The three supported input kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Op,
    Csv,
    Archive,
}

impl SourceKind {
    /// Pick a source from the optional file paths: CSV wins, then archive,
    /// otherwise the CLI.
    pub fn detect(csv_path: Option<&str>, archive_path: Option<&str>) -> Self {
        let given = |p: Option<&str>| p.map(|s| !s.trim().is_empty()).unwrap_or(false);
        if given(csv_path) {
            Self::Csv
        } else if given(archive_path) {
            Self::Archive
        } else {
            Self::Op
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Op => "op",
            Self::Csv => "csv",
            Self::Archive => "1pux",
        }
    }
}
