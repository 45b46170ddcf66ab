//! Storage helpers
//!
//! Atomic file writes for the exported document and the settings file.

pub mod file_io;

pub use file_io::{read_json, write_bytes_atomic, write_json_atomic};
