//! Configuration module for vault-pdf-export
//!
//! This module provides configuration management including:
//! - Platform-aware path resolution
//! - User settings persistence

pub mod paths;
pub mod settings;

pub use paths::ExportPaths;
pub use settings::{Settings, MAX_DETAIL_WORKERS};
