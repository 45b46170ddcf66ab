//! Font resolution
//!
//! The renderer asks a [`FontProvider`] for a Unicode-capable TrueType face.
//! When none is available it falls back to the built-in Helvetica family and
//! transliterates every string to ASCII instead of failing the export.

use std::path::PathBuf;

use tracing::debug;

use crate::config::{ExportPaths, Settings};

/// File name of the preferred Unicode face
pub const FONT_FILE: &str = "DejaVuSans.ttf";

/// Well-known system locations of the preferred face
const SYSTEM_FONT_PATHS: [&str; 4] = [
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/Library/Fonts/DejaVuSans.ttf",
];

/// Outcome of a font lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FontResolution {
    /// A TrueType file that covers the full Unicode range we render
    Available(PathBuf),
    /// Use the restricted built-in face
    Unavailable,
}

/// Supplies a Unicode-capable font
pub trait FontProvider {
    fn unicode_font(&self) -> FontResolution;
}

/// Returns the first existing file out of a candidate list
#[derive(Debug, Clone, Default)]
pub struct FontFileProvider {
    candidates: Vec<PathBuf>,
}

impl FontFileProvider {
    pub fn new(candidates: Vec<PathBuf>) -> Self {
        Self { candidates }
    }

    /// Candidates in priority order: the configured file, the font cache,
    /// then common system locations.
    pub fn from_config(paths: &ExportPaths, settings: &Settings) -> Self {
        let mut candidates = Vec::new();
        if let Some(explicit) = &settings.font_path {
            candidates.push(explicit.clone());
        }
        candidates.push(paths.font_dir().join(FONT_FILE));
        candidates.extend(SYSTEM_FONT_PATHS.iter().map(PathBuf::from));
        Self { candidates }
    }
}

impl FontProvider for FontFileProvider {
    fn unicode_font(&self) -> FontResolution {
        match self.candidates.iter().find(|p| p.is_file()) {
            Some(path) => {
                debug!(path = %path.display(), "found Unicode font");
                FontResolution::Available(path.clone())
            }
            None => FontResolution::Unavailable,
        }
    }
}

/// Always falls back to the built-in face
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinFontOnly;

impl FontProvider for BuiltinFontOnly {
    fn unicode_font(&self) -> FontResolution {
        FontResolution::Unavailable
    }
}

/// Which character range text is rendered in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextMode {
    Unicode,
    /// Built-in faces only cover ASCII reliably
    Ascii,
}

impl TextMode {
    /// Prepare `text` for drawing in this mode
    pub fn prepare(&self, text: &str) -> String {
        match self {
            Self::Unicode => text.to_string(),
            Self::Ascii if text.is_ascii() => text.to_string(),
            Self::Ascii => deunicode::deunicode(text),
        }
    }
}
