//! Credential-manager CLI adapter
//!
//! Drives the external `op` process in two steps: a light item listing,
//! then one detail call per listed item. A failed listing aborts the run; a
//! failed detail call only drops that item.

use std::process::Command;

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::{debug, info, warn};

use super::fields::{classify_field, stringify_value, FieldTarget};
use super::{EntrySource, LoadReport};
use crate::error::{ExportError, ExportResult};
use crate::models::Entry;

/// Progress is logged every this many detail fetches
const PROGRESS_INTERVAL: usize = 50;

/// Runs the external CLI and returns its JSON stdout
///
/// This is the seam tests replace with canned responses.
pub trait OpRunner: Send + Sync {
    fn run_json(&self, args: &[&str]) -> ExportResult<Vec<u8>>;
}

/// Runs the real credential-manager executable
#[derive(Debug, Clone)]
pub struct OpCli {
    binary: String,
}

impl OpCli {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl Default for OpCli {
    fn default() -> Self {
        Self::new("op")
    }
}

impl OpRunner for OpCli {
    fn run_json(&self, args: &[&str]) -> ExportResult<Vec<u8>> {
        let command_line = format!("{} {}", self.binary, args.join(" "));
        debug!(command = %command_line, "invoking credential-manager CLI");

        let output = Command::new(&self.binary)
            .args(args)
            .args(["--format", "json"])
            .output()
            .map_err(|e| ExportError::command_failed(&command_line, e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let detail = if stderr.is_empty() {
                output.status.to_string()
            } else {
                stderr
            };
            return Err(ExportError::command_failed(&command_line, detail));
        }

        Ok(output.stdout)
    }
}

/// A vault as reported by `vault list`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VaultSummary {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct VaultRef {
    #[serde(default)]
    name: String,
}

/// One record of the light item listing
#[derive(Debug, Clone, Deserialize)]
pub struct ItemSummary {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    vault: VaultRef,
}

impl ItemSummary {
    pub fn vault_name(&self) -> &str {
        &self.vault.name
    }
}

#[derive(Debug, Deserialize)]
struct ItemDetail {
    #[serde(default)]
    title: String,
    #[serde(default)]
    category: String,
    #[serde(default)]
    vault: VaultRef,
    #[serde(default)]
    fields: Vec<DetailField>,
    #[serde(default)]
    urls: Vec<DetailUrl>,
    #[serde(default, rename = "notesPlain")]
    notes_plain: String,
}

#[derive(Debug, Deserialize)]
struct DetailField {
    #[serde(default)]
    label: String,
    #[serde(default, rename = "type")]
    field_type: String,
    /// `None` only when the key is missing; an explicit `null` is kept
    #[serde(default, deserialize_with = "present_value")]
    value: Option<Value>,
}

fn present_value<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(deserializer).map(Some)
}

#[derive(Debug, Deserialize)]
struct DetailUrl {
    #[serde(default)]
    href: String,
}

/// Entry source backed by the credential-manager CLI
pub struct OpSource<R: OpRunner> {
    runner: R,
    workers: usize,
    vaults: Vec<String>,
}

impl<R: OpRunner> OpSource<R> {
    /// Create a sequential source
    pub fn new(runner: R) -> Self {
        Self {
            runner,
            workers: 1,
            vaults: Vec::new(),
        }
    }

    /// Fetch details with up to `workers` concurrent CLI calls
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Only fetch details for items in these vaults (case-insensitive)
    pub fn with_vaults(mut self, vaults: &[String]) -> Self {
        self.vaults = vaults
            .iter()
            .map(|v| v.trim().to_lowercase())
            .filter(|v| !v.is_empty())
            .collect();
        self
    }

    /// List all vaults visible to the signed-in account
    pub fn list_vaults(&self) -> ExportResult<Vec<VaultSummary>> {
        let raw = self.runner.run_json(&["vault", "list"])?;
        serde_json::from_slice(&raw)
            .map_err(|e| ExportError::SourceUnavailable(format!("Malformed vault list: {}", e)))
    }

    /// Fetch the light item listing
    pub fn list_items(&self) -> ExportResult<Vec<ItemSummary>> {
        let raw = self.runner.run_json(&["item", "list"])?;
        serde_json::from_slice(&raw)
            .map_err(|e| ExportError::SourceUnavailable(format!("Malformed item list: {}", e)))
    }

    /// Fetch and normalize one item
    pub fn item_detail(&self, id: &str) -> ExportResult<Entry> {
        let raw = self.runner.run_json(&["item", "get", id])?;
        let detail: ItemDetail = serde_json::from_slice(&raw)?;
        Ok(map_detail(detail))
    }

    fn wants_vault(&self, vault: &str) -> bool {
        self.vaults.is_empty() || self.vaults.contains(&vault.to_lowercase())
    }

    fn fetch_one(&self, item: &ItemSummary) -> Option<Entry> {
        match self.item_detail(&item.id) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(id = %item.id, error = %e, "skipping item whose details could not be fetched");
                None
            }
        }
    }

    /// Fetch details for `items`, keeping listing order regardless of which
    /// fetch finishes first. Failed items are counted, not returned.
    pub fn fetch_details(&self, items: &[ItemSummary]) -> LoadReport {
        let workers = self.workers.min(items.len()).max(1);
        let mut slots: Vec<Option<Entry>> = vec![None; items.len()];

        if workers == 1 {
            for (index, item) in items.iter().enumerate() {
                slots[index] = self.fetch_one(item);
                log_progress(index + 1, items.len());
            }
        } else {
            let (job_tx, job_rx) = crossbeam_channel::unbounded::<(usize, &ItemSummary)>();
            let (result_tx, result_rx) = crossbeam_channel::unbounded::<(usize, Option<Entry>)>();

            for job in items.iter().enumerate() {
                let _ = job_tx.send(job);
            }
            drop(job_tx);

            std::thread::scope(|scope| {
                for _ in 0..workers {
                    let job_rx = job_rx.clone();
                    let result_tx = result_tx.clone();
                    scope.spawn(move || {
                        for (index, item) in job_rx.iter() {
                            let _ = result_tx.send((index, self.fetch_one(item)));
                        }
                    });
                }
            });
            drop(result_tx);

            for (done, (index, entry)) in result_rx.iter().enumerate() {
                slots[index] = entry;
                log_progress(done + 1, items.len());
            }
        }

        let skipped = slots.iter().filter(|slot| slot.is_none()).count();
        LoadReport {
            entries: slots.into_iter().flatten().collect(),
            skipped,
        }
    }
}

impl<R: OpRunner> EntrySource for OpSource<R> {
    fn label(&self) -> &str {
        "op"
    }

    fn load(&self) -> ExportResult<LoadReport> {
        info!("loading item list");
        let listed = self.list_items()?;
        if listed.is_empty() {
            return Err(ExportError::EmptySource("the item list is empty".into()));
        }

        let selected: Vec<ItemSummary> = listed
            .into_iter()
            .filter(|item| self.wants_vault(item.vault_name()))
            .collect();
        if selected.is_empty() {
            return Err(ExportError::NoEntriesAfterFilter);
        }

        info!(items = selected.len(), workers = self.workers, "fetching item details");
        let report = self.fetch_details(&selected);
        if report.skipped > 0 {
            warn!(skipped = report.skipped, "some items were skipped");
        }
        Ok(report)
    }
}

fn log_progress(done: usize, total: usize) {
    if done % PROGRESS_INTERVAL == 0 {
        info!("{}/{} items processed", done, total);
    }
}

/// Map a detail record onto an entry.
///
/// Named attributes keep the first field that claims them; later claimants
/// are dropped rather than moved into the extra fields.
fn map_detail(detail: ItemDetail) -> Entry {
    let mut entry = Entry {
        title: detail.title,
        category: detail.category,
        vault: detail.vault.name,
        ..Default::default()
    };

    entry.urls = detail
        .urls
        .into_iter()
        .map(|u| u.href)
        .filter(|href| !href.trim().is_empty())
        .collect();

    if !detail.notes_plain.trim().is_empty() {
        entry.notes = detail.notes_plain;
    }

    for field in detail.fields {
        let value = field.value.as_ref().map(stringify_value).unwrap_or_default();
        let label = field.label.trim();

        match classify_field(label, &field.field_type) {
            FieldTarget::Username => {
                if entry.username.is_empty() {
                    entry.username = value;
                }
            }
            FieldTarget::Password => {
                if entry.password.is_empty() {
                    entry.password = value;
                }
            }
            FieldTarget::Otp => {
                if entry.otp.is_empty() {
                    entry.otp = value;
                }
            }
            FieldTarget::Extra => {
                if label.is_empty() || value.is_empty() {
                    continue;
                }
                if entry.extra_fields.contains_key(label) {
                    debug!(label = %label, "later extra field replaces an earlier one");
                }
                if !entry.set_extra(label, value) {
                    debug!(label = %label, "dropping extra field with reserved label");
                }
            }
        }
    }

    entry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::is_reserved_label;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Canned CLI responses keyed by the joined argument list
    #[derive(Default)]
    struct FakeRunner {
        responses: HashMap<String, Result<String, String>>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeRunner {
        fn respond(mut self, args: &str, body: &str) -> Self {
            self.responses.insert(args.to_string(), Ok(body.to_string()));
            self
        }

        fn fail(mut self, args: &str, message: &str) -> Self {
            self.responses
                .insert(args.to_string(), Err(message.to_string()));
            self
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl OpRunner for FakeRunner {
        fn run_json(&self, args: &[&str]) -> ExportResult<Vec<u8>> {
            let key = args.join(" ");
            self.calls.lock().unwrap().push(key.clone());
            match self.responses.get(&key) {
                Some(Ok(body)) => Ok(body.clone().into_bytes()),
                Some(Err(message)) => Err(ExportError::command_failed(&key, message.clone())),
                None => Err(ExportError::command_failed(&key, "no such item")),
            }
        }
    }

    const LISTING: &str = r#"[
        {"id": "a1", "title": "Bank", "category": "LOGIN", "vault": {"id": "v1", "name": "Personal"}},
        {"id": "b2", "title": "Jira", "category": "LOGIN", "vault": {"id": "v2", "name": "Work"}},
        {"id": "c3", "title": "Wifi", "category": "PASSWORD", "vault": {"id": "v1", "name": "Personal"}}
    ]"#;

    fn detail(title: &str, vault: &str) -> String {
        format!(
            r#"{{"id": "x", "title": "{}", "category": "LOGIN", "vault": {{"name": "{}"}},
                "fields": [{{"id": "u", "label": "username", "type": "STRING", "value": "{}-user"}}]}}"#,
            title, vault, title
        )
    }

    fn full_runner() -> FakeRunner {
        FakeRunner::default()
            .respond("item list", LISTING)
            .respond("item get a1", &detail("Bank", "Personal"))
            .respond("item get b2", &detail("Jira", "Work"))
            .respond("item get c3", &detail("Wifi", "Personal"))
    }

    #[test]
    fn test_map_detail_heuristics() {
        let raw = r#"{
            "id": "a1", "title": "Bank", "category": "LOGIN", "vault": {"name": "Personal"},
            "fields": [
                {"id": "1", "label": "Username", "type": "STRING", "value": "alice"},
                {"id": "2", "label": "user_name", "type": "STRING", "value": "mallory"},
                {"id": "3", "label": "password", "type": "CONCEALED", "value": "hunter2"},
                {"id": "4", "label": "PIN", "type": "CONCEALED", "value": "1234"},
                {"id": "5", "label": "one-time otp", "type": "OTP", "value": "otpauth://totp/x"},
                {"id": "6", "label": "Account no", "type": "STRING", "value": 123456},
                {"id": "7", "label": "Empty", "type": "STRING"},
                {"id": "8", "label": "", "type": "STRING", "value": "orphan"},
                {"id": "9", "label": "notes", "type": "STRING", "value": "should not be extra"}
            ],
            "urls": [{"label": "site", "href": "https://bank.example"}, {"href": "  "}],
            "notesPlain": "security questions"
        }"#;
        let entry = map_detail(serde_json::from_str(raw).unwrap());

        assert_eq!(entry.title, "Bank");
        assert_eq!(entry.vault, "Personal");
        assert_eq!(entry.category, "LOGIN");
        assert_eq!(entry.username, "alice");
        assert_eq!(entry.password, "hunter2");
        assert_eq!(entry.otp, "otpauth://totp/x");
        assert_eq!(entry.notes, "security questions");
        assert_eq!(entry.urls, vec!["https://bank.example"]);
        assert_eq!(entry.extra_fields.len(), 1);
        assert_eq!(
            entry.extra_fields.get("Account no").map(String::as_str),
            Some("123456")
        );
    }

    #[test]
    fn test_second_user_field_is_dropped_not_kept() {
        let raw = r#"{"title": "t", "fields": [
            {"label": "Username", "type": "STRING", "value": "first"},
            {"label": "user_name", "type": "STRING", "value": "second"}
        ]}"#;
        let entry = map_detail(serde_json::from_str(raw).unwrap());

        assert_eq!(entry.username, "first");
        assert!(entry.extra_fields.is_empty());
    }

    #[test]
    fn test_duplicate_extra_label_keeps_last_value() {
        let raw = r#"{"title": "t", "fields": [
            {"label": "PIN", "type": "STRING", "value": "1111"},
            {"label": "PIN", "type": "STRING", "value": "2222"},
            {"label": "PIN", "type": "STRING", "value": ""},
            {"label": "Recovery", "type": "STRING", "value": "first"},
            {"label": "Recovery", "type": "STRING", "value": "second"}
        ]}"#;
        let entry = map_detail(serde_json::from_str(raw).unwrap());

        assert_eq!(entry.extra_fields.get("PIN").map(String::as_str), Some("2222"));
        assert_eq!(
            entry.extra_fields.get("Recovery").map(String::as_str),
            Some("second")
        );
        assert_eq!(entry.extra_fields.len(), 2);
    }

    #[test]
    fn test_null_value_is_rendered_as_json_text() {
        let raw = r#"{"title": "t", "fields": [
            {"label": "Expiry", "type": "STRING", "value": null},
            {"label": "Missing", "type": "STRING"},
            {"label": "Codes", "type": "STRING", "value": [1, 2]}
        ]}"#;
        let entry = map_detail(serde_json::from_str(raw).unwrap());

        assert_eq!(entry.extra_fields.get("Expiry").map(String::as_str), Some("null"));
        assert_eq!(entry.extra_fields.get("Codes").map(String::as_str), Some("[1,2]"));
        assert!(!entry.extra_fields.contains_key("Missing"));
    }

    #[test]
    fn test_extra_fields_never_hold_reserved_labels() {
        let raw = r#"{"title": "t", "fields": [
            {"label": "Notes", "type": "STRING", "value": "a"},
            {"label": "OTP", "type": "STRING", "value": "b"},
            {"label": "Password", "type": "STRING", "value": "c"},
            {"label": "Username", "type": "STRING", "value": "d"},
            {"label": "Recovery", "type": "STRING", "value": "e"}
        ]}"#;
        let entry = map_detail(serde_json::from_str(raw).unwrap());

        assert!(entry.extra_fields.keys().all(|k| !is_reserved_label(k)));
        assert!(entry.extra_fields.contains_key("Recovery"));
    }

    #[test]
    fn test_load_keeps_listing_order() {
        let source = OpSource::new(full_runner()).with_workers(4);
        let report = source.load().unwrap();

        let titles: Vec<_> = report.entries.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["Bank", "Jira", "Wifi"]);
        assert_eq!(report.skipped, 0);
        assert_eq!(report.entries[1].username, "Jira-user");
    }

    #[test]
    fn test_detail_failure_is_skipped() {
        let runner = FakeRunner::default()
            .respond("item list", LISTING)
            .respond("item get a1", &detail("Bank", "Personal"))
            .fail("item get b2", "rate limited")
            .respond("item get c3", "not json");
        let report = OpSource::new(runner).load().unwrap();

        assert_eq!(report.entries.len(), 1);
        assert_eq!(report.entries[0].title, "Bank");
        assert_eq!(report.skipped, 2);
    }

    #[test]
    fn test_listing_failure_is_fatal() {
        let runner = FakeRunner::default().fail("item list", "not signed in");
        let err = OpSource::new(runner).load().unwrap_err();
        assert!(matches!(err, ExportError::SourceUnavailable(_)));
    }

    #[test]
    fn test_malformed_listing_is_source_unavailable() {
        let runner = FakeRunner::default().respond("item list", "{\"oops\": true}");
        let err = OpSource::new(runner).load().unwrap_err();
        assert!(matches!(err, ExportError::SourceUnavailable(_)));
    }

    #[test]
    fn test_empty_listing_is_empty_source() {
        let runner = FakeRunner::default().respond("item list", "[]");
        let err = OpSource::new(runner).load().unwrap_err();
        assert!(matches!(err, ExportError::EmptySource(_)));
    }

    #[test]
    fn test_vault_prefilter_skips_detail_calls() {
        let source = OpSource::new(full_runner()).with_vaults(&[" work ".to_string()]);
        let report = source.load().unwrap();

        assert_eq!(report.entries.len(), 1);
        assert_eq!(report.entries[0].vault, "Work");
        let calls = source.runner.calls();
        assert!(!calls.contains(&"item get a1".to_string()));
        assert!(calls.contains(&"item get b2".to_string()));
    }

    #[test]
    fn test_vault_prefilter_excluding_everything() {
        let source = OpSource::new(full_runner()).with_vaults(&["Archive".to_string()]);
        let err = source.load().unwrap_err();
        assert!(matches!(err, ExportError::NoEntriesAfterFilter));
    }

    #[test]
    fn test_list_vaults() {
        let runner = FakeRunner::default().respond(
            "vault list",
            r#"[{"id": "v1", "name": "Personal"}, {"id": "v2", "name": "Work"}]"#,
        );
        let vaults = OpSource::new(runner).list_vaults().unwrap();
        assert_eq!(vaults.len(), 2);
        assert_eq!(vaults[1].name, "Work");
    }

    #[test]
    fn test_missing_binary_is_source_unavailable() {
        let cli = OpCli::new("definitely-not-an-installed-binary-7f3a");
        let err = cli.run_json(&["item", "list"]).unwrap_err();
        assert!(matches!(err, ExportError::SourceUnavailable(_)));
    }
}
