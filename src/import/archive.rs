//! Archive adapter
//!
//! Best-effort reader for ZIP export archives (`.1pux`). The internal layout
//! drifts between exporter versions, so every JSON member whose path looks
//! item-related is tried as either a list of records or a single record.
//! Members that fit neither shape are skipped.

use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::PathBuf;

use serde_json::{Map, Value};
use tracing::{debug, info, warn};
use zip::ZipArchive;

use super::fields::{
    first_match, CATEGORY_KEYS, NOTES_KEYS, OTP_KEYS, PASSWORD_KEYS, TITLE_KEYS, URL_KEYS,
    USERNAME_KEYS, VAULT_KEYS,
};
use super::{EntrySource, LoadReport};
use crate::error::{ExportError, ExportResult};
use crate::models::Entry;

type Record = Map<String, Value>;

/// Path fragments that mark a member as worth parsing
const MEMBER_HINTS: [&str; 3] = ["vault", "item", "data"];

/// Check whether an archive member should be parsed
pub fn is_candidate_member(name: &str) -> bool {
    let lower = name.to_lowercase();
    lower.ends_with(".json") && MEMBER_HINTS.iter().any(|hint| lower.contains(hint))
}

/// Map one generic record; `None` when it has neither a title nor a name.
///
/// Every string-valued key that did not supply a named attribute is kept as
/// an extra field, except the reserved labels.
pub fn map_record(record: &Record) -> Option<Entry> {
    let mut consumed = Vec::new();
    let mut take = |candidates: &[&'static str]| match first_match(record, candidates) {
        Some((key, value)) => {
            consumed.push(key);
            value.to_string()
        }
        None => String::new(),
    };

    let title = take(TITLE_KEYS);
    if title.is_empty() {
        return None;
    }

    let mut entry = Entry {
        title,
        vault: take(VAULT_KEYS),
        category: take(CATEGORY_KEYS),
        username: take(USERNAME_KEYS),
        password: take(PASSWORD_KEYS),
        notes: take(NOTES_KEYS),
        otp: take(OTP_KEYS),
        ..Default::default()
    };

    let url = take(URL_KEYS);
    if !url.is_empty() {
        entry.urls.push(url);
    }

    for (key, value) in record {
        if let Value::String(s) = value {
            if !consumed.iter().any(|used| *used == key.as_str()) {
                entry.set_extra(key.as_str(), s.as_str());
            }
        }
    }

    Some(entry)
}

/// Parse a member body as a record list first, then as a single record
fn parse_member(bytes: &[u8]) -> Option<Vec<Record>> {
    if let Ok(records) = serde_json::from_slice::<Vec<Record>>(bytes) {
        return Some(records);
    }
    serde_json::from_slice::<Record>(bytes)
        .ok()
        .map(|record| vec![record])
}

/// Extract entries from an archive held by any seekable reader
pub fn parse_archive<R: Read + Seek>(reader: R) -> ExportResult<LoadReport> {
    let mut archive = ZipArchive::new(reader)
        .map_err(|e| ExportError::Archive(format!("Could not read the file as ZIP: {}", e)))?;

    let mut report = LoadReport::default();

    for index in 0..archive.len() {
        let mut member = match archive.by_index(index) {
            Ok(member) => member,
            Err(e) => {
                warn!(index = index, error = %e, "skipping unreadable archive member");
                continue;
            }
        };

        let name = member.name().to_string();
        if !is_candidate_member(&name) {
            continue;
        }

        let mut bytes = Vec::new();
        if let Err(e) = member.read_to_end(&mut bytes) {
            warn!(member = %name, error = %e, "skipping unreadable archive member");
            report.skipped += 1;
            continue;
        }

        let Some(records) = parse_member(&bytes) else {
            debug!(member = %name, "member is neither a record nor a record list");
            report.skipped += 1;
            continue;
        };

        let before = report.entries.len();
        report.entries.extend(records.iter().filter_map(map_record));
        debug!(
            member = %name,
            records = records.len(),
            entries = report.entries.len() - before,
            "parsed archive member"
        );
    }

    if report.entries.is_empty() {
        return Err(ExportError::NoSupportedItems(
            "the archive (format may be unsupported)".into(),
        ));
    }

    Ok(report)
}

/// Entry source reading a ZIP export archive
#[derive(Debug, Clone)]
pub struct ArchiveSource {
    path: PathBuf,
}

impl ArchiveSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl EntrySource for ArchiveSource {
    fn label(&self) -> &str {
        "1pux"
    }

    fn load(&self) -> ExportResult<LoadReport> {
        info!(path = %self.path.display(), "reading export archive");
        let file = File::open(&self.path).map_err(|e| {
            ExportError::Io(format!("Failed to open {}: {}", self.path.display(), e))
        })?;
        parse_archive(BufReader::new(file))
    }
}
