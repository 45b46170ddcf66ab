//! Core data models
//!
//! The canonical entry every source normalizes into, and the options that
//! steer document rendering.

pub mod entry;
pub mod options;

pub use entry::{is_reserved_label, Entry, ExtraFields, RESERVED_LABELS};
pub use options::{Layout, RenderOptions};
