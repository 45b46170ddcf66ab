//! Filter stage
//!
//! Narrows adapter output by vault name and a free-text query. Entries are
//! only selected or dropped, never modified, and input order is preserved.

use crate::models::Entry;

/// Vault and text filters, composed with logical AND
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryFilter {
    /// Lower-cased vault names; empty means every vault
    vaults: Vec<String>,
    /// Lower-cased, trimmed query; empty means no text filter
    query: String,
}

impl EntryFilter {
    /// Create a filter that keeps everything
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to entries whose vault matches one of `vaults` (case-insensitive)
    pub fn with_vaults<I, S>(mut self, vaults: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.vaults = vaults
            .into_iter()
            .map(|v| v.as_ref().trim().to_lowercase())
            .filter(|v| !v.is_empty())
            .collect();
        self
    }

    /// Restrict to entries whose title, username, or URLs contain `query`
    pub fn with_query(mut self, query: &str) -> Self {
        self.query = query.trim().to_lowercase();
        self
    }

    /// Check whether any restriction is active
    pub fn is_active(&self) -> bool {
        !self.vaults.is_empty() || !self.query.is_empty()
    }

    pub fn vaults(&self) -> &[String] {
        &self.vaults
    }

    /// Check a single entry against both filters
    pub fn matches(&self, entry: &Entry) -> bool {
        self.matches_vault(entry) && self.matches_query(entry)
    }

    fn matches_vault(&self, entry: &Entry) -> bool {
        if self.vaults.is_empty() {
            return true;
        }
        let vault = entry.vault.to_lowercase();
        self.vaults.iter().any(|v| *v == vault)
    }

    fn matches_query(&self, entry: &Entry) -> bool {
        if self.query.is_empty() {
            return true;
        }
        entry.title.to_lowercase().contains(&self.query)
            || entry.username.to_lowercase().contains(&self.query)
            || entry.joined_urls().to_lowercase().contains(&self.query)
    }

    /// Keep matching entries in their original order
    pub fn apply(&self, entries: Vec<Entry>) -> Vec<Entry> {
        entries.into_iter().filter(|e| self.matches(e)).collect()
    }
}
