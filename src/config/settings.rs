//! User settings for vault-pdf-export
//!
//! Persisted defaults for layout, masking, the CSV delimiter, and how the
//! external credential-manager CLI is invoked. Command-line flags always win.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::paths::ExportPaths;
use crate::error::ExportError;
use crate::models::Layout;
use crate::storage::file_io::{read_json, write_json_atomic};

/// Upper bound for concurrent detail fetches
pub const MAX_DETAIL_WORKERS: usize = 16;

/// User settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Layout used when none is given on the command line
    #[serde(default)]
    pub default_layout: Layout,

    /// Mask passwords unless told otherwise
    #[serde(default)]
    pub mask_passwords: bool,

    /// Delimiter for CSV sources; only the first character is used
    #[serde(default = "default_delimiter")]
    pub csv_delimiter: String,

    /// Executable name or path of the credential-manager CLI
    #[serde(default = "default_op_binary")]
    pub op_binary: String,

    /// Concurrent detail fetches against the CLI (1 = sequential)
    #[serde(default = "default_detail_workers")]
    pub detail_workers: usize,

    /// Explicit Unicode TrueType font to embed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_path: Option<PathBuf>,

    /// Output file suggested in interactive mode
    #[serde(default = "default_output")]
    pub default_output: String,
}

fn default_schema_version() -> u32 {
    1
}

fn default_delimiter() -> String {
    ",".to_string()
}

fn default_op_binary() -> String {
    "op".to_string()
}

fn default_detail_workers() -> usize {
    4
}

fn default_output() -> String {
    "vault-export.pdf".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            default_layout: Layout::default(),
            mask_passwords: false,
            csv_delimiter: default_delimiter(),
            op_binary: default_op_binary(),
            detail_workers: default_detail_workers(),
            font_path: None,
            default_output: default_output(),
        }
    }
}

impl Settings {
    /// Worker count clamped to `1..=MAX_DETAIL_WORKERS`
    pub fn effective_workers(&self) -> usize {
        self.detail_workers.clamp(1, MAX_DETAIL_WORKERS)
    }

    /// Load settings from disk, or return defaults if the file doesn't exist
    pub fn load_or_create(paths: &ExportPaths) -> Result<Self, ExportError> {
        // Don't save defaults here; `config --init` decides when to persist
        read_json(paths.settings_file())
    }

    /// Save settings to disk
    pub fn save(&self, paths: &ExportPaths) -> Result<(), ExportError> {
        paths.ensure_directories()?;
        write_json_atomic(paths.settings_file(), self)
    }
}
