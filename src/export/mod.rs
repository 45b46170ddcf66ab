//! Document export
//!
//! - `layout`: pure page composition (masking, wrapping, pagination)
//! - `fonts`: Unicode font lookup with an ASCII fallback
//! - `metrics`: glyph advance widths used for wrapping
//! - `pdf`: drawing and password protection

pub mod fonts;
pub mod layout;
pub mod metrics;
pub mod pdf;

pub use fonts::{BuiltinFontOnly, FontFileProvider, FontProvider, FontResolution, TextMode};
pub use layout::{compose, mask, DocumentLayout};
pub use metrics::{HelveticaMetrics, TextMeasure, TrueTypeMetrics};
pub use pdf::{protect, PdfRenderer, RenderedDocument};
