//! Rendering options
//!
//! Configuration consumed by the document renderer.

use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::crypto::SecureString;

/// Per-entry body layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    /// Standard fields only, notes in smaller type
    #[default]
    Compact,
    /// Standard fields plus every extra field
    Detailed,
}

impl Layout {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Compact => "compact",
            Self::Detailed => "detailed",
        }
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Layout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "detailed" => Ok(Self::Detailed),
            other => Err(format!("unknown layout '{}'", other)),
        }
    }
}

/// Everything the renderer needs besides the entries themselves
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub layout: Layout,
    /// Replace passwords with a fixed-length mask
    pub mask_password: bool,
    /// Informational label printed in the header, e.g. "op" or "csv"
    pub source_label: String,
    /// Secret required to open the document
    pub access_password: SecureString,
}

impl RenderOptions {
    /// Create options with the default layout and no masking
    pub fn new(source_label: impl Into<String>, access_password: impl Into<SecureString>) -> Self {
        Self {
            layout: Layout::default(),
            mask_password: false,
            source_label: source_label.into(),
            access_password: access_password.into(),
        }
    }

    /// Set the layout
    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    /// Enable or disable password masking
    pub fn with_masking(mut self, mask_password: bool) -> Self {
        self.mask_password = mask_password;
        self
    }

    /// Check whether a non-blank access password was supplied
    pub fn has_access_password(&self) -> bool {
        !self.access_password.is_blank()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_parse() {
        assert_eq!("Detailed".parse::<Layout>().unwrap(), Layout::Detailed);
        assert_eq!(" compact ".parse::<Layout>().unwrap(), Layout::Compact);
        assert!("fancy".parse::<Layout>().is_err());
    }

    #[test]
    fn test_layout_serde() {
        let json = serde_json::to_string(&Layout::Detailed).unwrap();
        assert_eq!(json, "\"detailed\"");
    }

    #[test]
    fn test_options_debug_hides_password() {
        let options = RenderOptions::new("csv", "hunter2").with_layout(Layout::Detailed);
        assert!(options.has_access_password());
        assert!(!format!("{:?}", options).contains("hunter2"));
    }

    #[test]
    fn test_empty_password_detected() {
        let options = RenderOptions::new("csv", "");
        assert!(!options.has_access_password());
    }
}
