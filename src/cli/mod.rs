//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the service layer.

pub mod config;
pub mod export;
pub mod prompt;
pub mod vaults;

pub use config::{handle_config_command, ConfigArgs};
pub use export::{handle_export_command, ExportArgs};
pub use vaults::handle_vaults_command;
