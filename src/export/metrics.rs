//! Glyph metrics
//!
//! Wrapping is driven by real advance widths so long tokens (passwords, OTP
//! URIs, keys) never run past the right margin. The built-in face uses the
//! published Helvetica widths; an embedded face is measured from its own
//! `hmtx` table.

use ttf_parser::{Face, GlyphId};

use super::layout::FontStyle;

/// Points to millimetres
pub const PT_TO_MM: f32 = 0.3528;

/// Advance assumed for characters a face has no width for
const UNKNOWN_ADVANCE_EM: f32 = 1.0;

/// Measures text set in one document's fonts
pub trait TextMeasure {
    /// Advance of `c` as a fraction of the font size
    fn advance(&self, c: char, style: FontStyle) -> f32;

    fn char_width_mm(&self, c: char, style: FontStyle, size_pt: f32) -> f32 {
        self.advance(c, style) * size_pt * PT_TO_MM
    }

    fn width_mm(&self, text: &str, style: FontStyle, size_pt: f32) -> f32 {
        text.chars()
            .map(|c| self.char_width_mm(c, style, size_pt))
            .sum()
    }
}

/// Helvetica advances for ASCII 32..=126, in thousandths of an em
#[rustfmt::skip]
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 222, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

/// Helvetica-Bold advances for ASCII 32..=126, in thousandths of an em
#[rustfmt::skip]
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 278, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

/// Metrics of the built-in Helvetica family
#[derive(Debug, Clone, Copy, Default)]
pub struct HelveticaMetrics;

impl TextMeasure for HelveticaMetrics {
    fn advance(&self, c: char, style: FontStyle) -> f32 {
        let table = match style {
            FontStyle::Regular => &HELVETICA,
            FontStyle::Bold => &HELVETICA_BOLD,
        };
        match (c as usize).checked_sub(32).and_then(|i| table.get(i)) {
            Some(&width) => f32::from(width) / 1000.0,
            None => UNKNOWN_ADVANCE_EM,
        }
    }
}

/// Metrics of an embedded TrueType face; bold runs use the same face
pub struct TrueTypeMetrics<'a> {
    face: Face<'a>,
    units_per_em: f32,
    missing: f32,
}

impl<'a> TrueTypeMetrics<'a> {
    /// Parse `data`; `None` when it is not a usable TrueType face
    pub fn parse(data: &'a [u8]) -> Option<Self> {
        let face = Face::parse(data, 0).ok()?;
        let units_per_em = f32::from(face.units_per_em());
        if units_per_em <= 0.0 {
            return None;
        }
        // Characters without a glyph are drawn as .notdef
        let missing = face
            .glyph_hor_advance(GlyphId(0))
            .map(|units| f32::from(units) / units_per_em)
            .unwrap_or(UNKNOWN_ADVANCE_EM);
        Some(Self {
            face,
            units_per_em,
            missing,
        })
    }
}

impl TextMeasure for TrueTypeMetrics<'_> {
    fn advance(&self, c: char, _style: FontStyle) -> f32 {
        self.face
            .glyph_index(c)
            .and_then(|glyph| self.face.glyph_hor_advance(glyph))
            .map(|units| f32::from(units) / self.units_per_em)
            .unwrap_or(self.missing)
    }
}
