//! Canonical entry model
//!
//! Every source adapter normalizes its records into [`Entry`], the single
//! source-independent shape consumed by the filter stage and the renderer.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Labels owned by named attributes; never allowed as `extra_fields` keys.
pub const RESERVED_LABELS: [&str; 4] = ["username", "password", "notes", "otp"];

/// Source-specific labeled values that did not map onto a named attribute
pub type ExtraFields = BTreeMap<String, String>;

/// One credential item, normalized from any source
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Display label; may be empty for API and CSV sources
    pub title: String,

    /// Free-form classification such as "login"
    #[serde(default)]
    pub category: String,

    /// Grouping label; empty for CSV sources
    #[serde(default)]
    pub vault: String,

    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub password: String,

    #[serde(default)]
    pub notes: String,

    /// One-time-password secret or URI
    #[serde(default)]
    pub otp: String,

    /// Ordered website addresses
    #[serde(default)]
    pub urls: Vec<String>,

    /// Every unmapped source field, keyed by its original label
    #[serde(default)]
    pub extra_fields: ExtraFields,
}

impl Entry {
    /// Create an entry with just a title
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    /// Set the vault label
    pub fn with_vault(mut self, vault: impl Into<String>) -> Self {
        self.vault = vault.into();
        self
    }

    /// Set the category label
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Set the login credentials
    pub fn with_login(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = username.into();
        self.password = password.into();
        self
    }

    /// Append a URL
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.urls.push(url.into());
        self
    }

    /// Store an extra field unless its label is reserved. A later value for
    /// the same label replaces the earlier one.
    ///
    /// Returns `true` when the field was stored.
    pub fn set_extra(&mut self, label: impl Into<String>, value: impl Into<String>) -> bool {
        let label = label.into();
        if is_reserved_label(&label) {
            return false;
        }
        self.extra_fields.insert(label, value.into());
        true
    }

    /// Title to show in documents, or `placeholder` when the entry has none
    pub fn display_title<'a>(&'a self, placeholder: &'a str) -> &'a str {
        if self.title.trim().is_empty() {
            placeholder
        } else {
            &self.title
        }
    }

    /// Vault and category joined with `separator`, or `None` when both are empty
    pub fn metadata_line(&self, separator: &str) -> Option<String> {
        match (self.vault.is_empty(), self.category.is_empty()) {
            (true, true) => None,
            (false, true) => Some(self.vault.clone()),
            (true, false) => Some(self.category.clone()),
            (false, false) => Some(format!("{}{}{}", self.vault, separator, self.category)),
        }
    }

    /// URLs joined by single spaces
    pub fn joined_urls(&self) -> String {
        self.urls.join(" ")
    }
}

/// Check whether a label collides case-insensitively with a named attribute
pub fn is_reserved_label(label: &str) -> bool {
    let label = label.trim();
    RESERVED_LABELS
        .iter()
        .any(|reserved| label.eq_ignore_ascii_case(reserved))
}
