//! Export service
//!
//! Runs the whole pipeline for one export: password check, load, filter,
//! render, and an all-or-nothing write to the destination.

use std::path::{Path, PathBuf};

use chrono::{Local, SecondsFormat};
use tracing::{info, warn};

use crate::error::{ExportError, ExportResult};
use crate::export::{FontProvider, PdfRenderer};
use crate::filter::EntryFilter;
use crate::import::EntrySource;
use crate::models::RenderOptions;
use crate::storage::file_io::write_bytes_atomic;

/// Outcome of a successful export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub output: PathBuf,
    pub source: String,
    /// Entries produced by the adapter
    pub loaded: usize,
    /// Records the adapter dropped on recoverable failures
    pub skipped: usize,
    /// Entries written to the document
    pub exported: usize,
    pub pages: usize,
    pub unicode: bool,
}

/// Append `.pdf` unless the path already ends with it (any case)
pub fn with_pdf_extension(path: &Path) -> PathBuf {
    let has_pdf = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false);
    if has_pdf {
        return path.to_path_buf();
    }
    let mut name = path.as_os_str().to_os_string();
    name.push(".pdf");
    PathBuf::from(name)
}

/// Local time in RFC 3339 with second precision and UTC offset
pub fn export_timestamp() -> String {
    Local::now().to_rfc3339_opts(SecondsFormat::Secs, false)
}

/// Service driving a source through filter and renderer
pub struct ExportService<F: FontProvider> {
    renderer: PdfRenderer<F>,
}

impl<F: FontProvider> ExportService<F> {
    pub fn new(fonts: F) -> Self {
        Self {
            renderer: PdfRenderer::new(fonts),
        }
    }

    /// Export with the current time as the header timestamp
    pub fn run(
        &self,
        source: &dyn EntrySource,
        filter: &EntryFilter,
        options: &RenderOptions,
        output: &Path,
    ) -> ExportResult<ExportSummary> {
        self.run_at(source, filter, options, output, &export_timestamp())
    }

    /// Export with an explicit header timestamp.
    ///
    /// Nothing is written unless every stage succeeds.
    pub fn run_at(
        &self,
        source: &dyn EntrySource,
        filter: &EntryFilter,
        options: &RenderOptions,
        output: &Path,
        exported_at: &str,
    ) -> ExportResult<ExportSummary> {
        if !options.has_access_password() {
            return Err(ExportError::MissingAccessPassword);
        }

        info!(source = source.label(), "loading entries");
        let report = source.load()?;
        if report.is_empty() {
            return Err(ExportError::EmptySource(format!(
                "the {} source returned no entries",
                source.label()
            )));
        }
        if report.skipped > 0 {
            warn!(skipped = report.skipped, "some records could not be loaded");
        }

        let loaded = report.entries.len();
        let entries = filter.apply(report.entries);
        info!(loaded = loaded, kept = entries.len(), "applied filters");
        if entries.is_empty() {
            return Err(ExportError::NoEntriesAfterFilter);
        }

        let document = self.renderer.render(&entries, options, exported_at)?;
        write_bytes_atomic(output, &document.bytes)?;
        info!(path = %output.display(), "wrote export");

        Ok(ExportSummary {
            output: output.to_path_buf(),
            source: source.label().to_string(),
            loaded,
            skipped: report.skipped,
            exported: entries.len(),
            pages: document.pages,
            unicode: document.unicode,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::BuiltinFontOnly;
    use crate::import::LoadReport;
    use crate::models::Entry;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    struct StaticSource {
        result: fn() -> ExportResult<LoadReport>,
        loads: AtomicUsize,
    }

    impl StaticSource {
        fn new(result: fn() -> ExportResult<LoadReport>) -> Self {
            Self {
                result,
                loads: AtomicUsize::new(0),
            }
        }
    }

    impl EntrySource for StaticSource {
        fn label(&self) -> &str {
            "test"
        }

        fn load(&self) -> ExportResult<LoadReport> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            (self.result)()
        }
    }

    fn two_vaults() -> ExportResult<LoadReport> {
        let mut report = LoadReport::new(vec![
            Entry::new("Bank").with_vault("Personal"),
            Entry::new("Jira").with_vault("Work"),
        ]);
        report.skipped = 1;
        Ok(report)
    }

    fn nothing() -> ExportResult<LoadReport> {
        Ok(LoadReport::default())
    }

    fn unavailable() -> ExportResult<LoadReport> {
        Err(ExportError::command_failed("op item list", "not signed in"))
    }

    fn service() -> ExportService<BuiltinFontOnly> {
        ExportService::new(BuiltinFontOnly)
    }

    #[test]
    fn test_missing_password_checked_before_loading() {
        let temp_dir = TempDir::new().unwrap();
        let output = temp_dir.path().join("out.pdf");
        let source = StaticSource::new(two_vaults);

        let err = service()
            .run(&source, &EntryFilter::new(), &RenderOptions::new("test", ""), &output)
            .unwrap_err();

        assert!(matches!(err, ExportError::MissingAccessPassword));
        assert_eq!(source.loads.load(Ordering::SeqCst), 0);
        assert!(!output.exists());
    }

    #[test]
    fn test_empty_source_fails() {
        let temp_dir = TempDir::new().unwrap();
        let output = temp_dir.path().join("out.pdf");

        let err = service()
            .run(
                &StaticSource::new(nothing),
                &EntryFilter::new(),
                &RenderOptions::new("test", "pw"),
                &output,
            )
            .unwrap_err();

        assert!(matches!(err, ExportError::EmptySource(_)));
        assert!(!output.exists());
    }

    #[test]
    fn test_source_failure_propagates() {
        let temp_dir = TempDir::new().unwrap();
        let output = temp_dir.path().join("out.pdf");

        let err = service()
            .run(
                &StaticSource::new(unavailable),
                &EntryFilter::new(),
                &RenderOptions::new("test", "pw"),
                &output,
            )
            .unwrap_err();

        assert!(err.is_source_error());
        assert!(!output.exists());
    }

    #[test]
    fn test_filtered_to_nothing_writes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let output = temp_dir.path().join("out.pdf");
        let filter = EntryFilter::new().with_vaults(["Archive"]);

        let err = service()
            .run(
                &StaticSource::new(two_vaults),
                &filter,
                &RenderOptions::new("test", "pw"),
                &output,
            )
            .unwrap_err();

        assert!(matches!(err, ExportError::NoEntriesAfterFilter));
        assert!(!output.exists());
    }

    #[test]
    fn test_successful_export() {
        let temp_dir = TempDir::new().unwrap();
        let output = temp_dir.path().join("nested").join("out.pdf");
        let filter = EntryFilter::new().with_vaults(["work"]);

        let summary = service()
            .run_at(
                &StaticSource::new(two_vaults),
                &filter,
                &RenderOptions::new("test", "pw"),
                &output,
                "2024-05-01T12:00:00+02:00",
            )
            .unwrap();

        assert_eq!(summary.loaded, 2);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.exported, 1);
        assert_eq!(summary.pages, 1);
        assert_eq!(summary.source, "test");

        let bytes = std::fs::read(&output).unwrap();
        assert!(bytes.starts_with(b"%PDF"));

        let mut doc = lopdf::Document::load_mem(&bytes).unwrap();
        assert!(doc.authenticate_user_password("wrong").is_err());
        assert!(doc.authenticate_user_password("").is_err());
        doc.decrypt("pw").unwrap();
        let text = doc.extract_text(&[1]).unwrap();
        assert!(text.contains("Jira"));
        assert!(!text.contains("Bank"));
        assert!(text.contains("2024-05-01T12:00:00+02:00"));
    }

    #[test]
    fn test_with_pdf_extension() {
        assert_eq!(with_pdf_extension(Path::new("out")), PathBuf::from("out.pdf"));
        assert_eq!(with_pdf_extension(Path::new("out.PDF")), PathBuf::from("out.PDF"));
        assert_eq!(
            with_pdf_extension(Path::new("dir/export.txt")),
            PathBuf::from("dir/export.txt.pdf")
        );
    }

    #[test]
    fn test_export_timestamp_is_rfc3339_with_offset() {
        let stamp = export_timestamp();
        let parsed = chrono::DateTime::parse_from_rfc3339(&stamp).unwrap();
        assert_eq!(parsed.to_rfc3339_opts(SecondsFormat::Secs, false), stamp);
        assert!(!stamp.contains('.'));
    }
}
