//! Delimited-text adapter
//!
//! Columns are resolved by header name (case-insensitive), never by
//! position, so exports with reordered or missing columns still load.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::PathBuf;

use ::csv::{ReaderBuilder, StringRecord};
use tracing::{debug, info};

use super::{EntrySource, LoadReport};
use crate::error::{ExportError, ExportResult};
use crate::models::Entry;

/// Category assigned to every CSV entry
pub const CSV_CATEGORY: &str = "login";

/// Resolve a configured delimiter; anything empty or non-ASCII means comma
pub fn parse_delimiter(configured: &str) -> u8 {
    match configured.chars().next() {
        Some(c) if c.is_ascii() => c as u8,
        _ => b',',
    }
}

/// Header positions of the columns we understand
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMapping {
    pub title: Option<usize>,
    pub username: Option<usize>,
    pub password: Option<usize>,
    pub url: Option<usize>,
    pub notes: Option<usize>,
}

impl ColumnMapping {
    /// Detect column positions from the header record
    pub fn from_headers(headers: &StringRecord) -> Self {
        let normalized: Vec<String> = headers
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim().to_lowercase())
            .collect();
        let find = |name: &str| normalized.iter().position(|h| h == name);

        Self {
            title: find("title").or_else(|| find("name")),
            username: find("username"),
            password: find("password"),
            url: find("url"),
            notes: find("notes"),
        }
    }

    /// Build an entry from one row; short rows read as empty cells
    pub fn map_record(&self, record: &StringRecord) -> Entry {
        let get = |column: Option<usize>| {
            column
                .and_then(|i| record.get(i))
                .map(str::to_string)
                .unwrap_or_default()
        };

        let mut entry = Entry {
            title: get(self.title),
            category: CSV_CATEGORY.to_string(),
            vault: String::new(),
            username: get(self.username),
            password: get(self.password),
            notes: get(self.notes),
            ..Default::default()
        };

        let url = get(self.url);
        let url = url.trim();
        if !url.is_empty() {
            entry.urls.push(url.to_string());
        }

        entry
    }
}

/// Parse delimited text from any reader
pub fn parse_entries<R: Read>(reader: R, delimiter: u8) -> ExportResult<Vec<Entry>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(reader);

    let mut records = reader.records();
    let headers = match records.next() {
        Some(headers) => headers?,
        None => return Err(ExportError::EmptySource("the CSV file has no header row".into())),
    };

    let mapping = ColumnMapping::from_headers(&headers);
    debug!(?mapping, "resolved CSV columns");

    records
        .map(|record| -> ExportResult<Entry> { Ok(mapping.map_record(&record?)) })
        .collect()
}

/// Entry source reading a CSV file
#[derive(Debug, Clone)]
pub struct CsvSource {
    path: PathBuf,
    delimiter: u8,
}

impl CsvSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            delimiter: b',',
        }
    }

    /// Use the first character of `delimiter`, or comma when unusable
    pub fn with_delimiter(mut self, delimiter: &str) -> Self {
        self.delimiter = parse_delimiter(delimiter);
        self
    }
}

impl EntrySource for CsvSource {
    fn label(&self) -> &str {
        "csv"
    }

    fn load(&self) -> ExportResult<LoadReport> {
        info!(path = %self.path.display(), "reading CSV export");
        let file = File::open(&self.path).map_err(|e| {
            ExportError::Io(format!("Failed to open {}: {}", self.path.display(), e))
        })?;
        let entries = parse_entries(BufReader::new(file), self.delimiter)?;
        Ok(LoadReport::new(entries))
    }
}
