//! Path management for vault-pdf-export
//!
//! ## Path Resolution Order
//!
//! 1. `VAULT_PDF_EXPORT_DIR` environment variable (if set); config and font
//!    cache both live below it
//! 2. Platform directories from the `directories` crate, e.g.
//!    `~/.config/vault-pdf-export` and `~/.cache/vault-pdf-export`

use std::path::PathBuf;

use directories::ProjectDirs;

use crate::error::ExportError;

/// Environment variable overriding every resolved directory
pub const DIR_OVERRIDE_ENV: &str = "VAULT_PDF_EXPORT_DIR";

/// Manages all paths used by vault-pdf-export
#[derive(Debug, Clone)]
pub struct ExportPaths {
    config_dir: PathBuf,
    cache_dir: PathBuf,
}

impl ExportPaths {
    /// Resolve paths from the environment
    ///
    /// # Errors
    ///
    /// Returns an error if no home directory can be determined and no
    /// override is set.
    pub fn new() -> Result<Self, ExportError> {
        if let Ok(custom) = std::env::var(DIR_OVERRIDE_ENV) {
            if !custom.trim().is_empty() {
                return Ok(Self::with_base_dir(PathBuf::from(custom)));
            }
        }

        let dirs = ProjectDirs::from("", "", "vault-pdf-export").ok_or_else(|| {
            ExportError::Config("Could not determine a home directory".into())
        })?;

        Ok(Self {
            config_dir: dirs.config_dir().to_path_buf(),
            cache_dir: dirs.cache_dir().to_path_buf(),
        })
    }

    /// Create paths rooted in a single directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self {
            cache_dir: base_dir.join("cache"),
            config_dir: base_dir,
        }
    }

    pub fn config_dir(&self) -> &PathBuf {
        &self.config_dir
    }

    pub fn cache_dir(&self) -> &PathBuf {
        &self.cache_dir
    }

    /// Get the path to the settings file
    pub fn settings_file(&self) -> PathBuf {
        self.config_dir.join("config.json")
    }

    /// Directory searched for a cached Unicode font
    pub fn font_dir(&self) -> PathBuf {
        self.cache_dir.join("fonts")
    }

    /// Ensure the config directory exists
    pub fn ensure_directories(&self) -> Result<(), ExportError> {
        std::fs::create_dir_all(&self.config_dir)
            .map_err(|e| ExportError::Io(format!("Failed to create config directory: {}", e)))
    }
}
