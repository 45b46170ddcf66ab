//! Document layout
//!
//! Turns entries into positioned text runs on A4 pages. Nothing here touches
//! a PDF library, so pagination and masking are tested on plain data.
//!
//! Vertical positions are measured in millimetres from the top edge of the
//! page. Two limits drive pagination:
//!
//! - after an entry block, a cursor below [`BREAK_THRESHOLD_MM`] starts a new
//!   page before the next entry;
//! - inside a block, a line that would cross [`FLOW_LIMIT_MM`] continues on a
//!   new page, so long notes never run off the paper.

use crate::models::{Entry, Layout, RenderOptions};

use super::fonts::TextMode;
use super::metrics::TextMeasure;

pub const PAGE_WIDTH_MM: f32 = 210.0;
pub const PAGE_HEIGHT_MM: f32 = 297.0;
pub const MARGIN_LEFT_MM: f32 = 10.0;
pub const MARGIN_TOP_MM: f32 = 10.0;
pub const TEXT_WIDTH_MM: f32 = 190.0;
pub const LABEL_WIDTH_MM: f32 = 30.0;
pub const VALUE_X_MM: f32 = MARGIN_LEFT_MM + LABEL_WIDTH_MM;
pub const VALUE_WIDTH_MM: f32 = TEXT_WIDTH_MM - LABEL_WIDTH_MM;

/// Cursor position past which the next entry starts on a fresh page
pub const BREAK_THRESHOLD_MM: f32 = 270.0;
/// Lowest position any line may reach
pub const FLOW_LIMIT_MM: f32 = 277.0;

pub const TITLE_SIZE_PT: f32 = 13.0;
/// The Unicode face has no bold cut, so titles are set larger instead
pub const TITLE_SIZE_UNICODE_PT: f32 = 14.0;
pub const META_SIZE_PT: f32 = 10.0;
pub const BODY_SIZE_PT: f32 = 11.0;
pub const COMPACT_NOTES_SIZE_PT: f32 = 10.0;

const TITLE_LINE_MM: f32 = 7.0;
const BODY_LINE_MM: f32 = 6.0;
const SMALL_LINE_MM: f32 = 5.0;
const BLOCK_GAP_MM: f32 = 4.0;

/// Space kept between a label and the value column
const LABEL_GAP_MM: f32 = 2.0;

pub const MASK_CHAR: char = '•';
pub const MASK_LEN: usize = 8;
pub const UNTITLED: &str = "(untitled)";
pub const META_SEPARATOR: &str = " · ";

/// Hide a password behind a run whose length is independent of the input
pub fn mask(password: &str, enabled: bool) -> String {
    if !enabled || password.is_empty() {
        return password.to_string();
    }
    std::iter::repeat(MASK_CHAR).take(MASK_LEN).collect()
}

/// Greedy word wrap by measured width.
///
/// Explicit line breaks are kept. A word wider than `max_width` is split
/// between characters, so no line ever exceeds it unless a single glyph does.
pub fn wrap_text(text: &str, max_width: f32, char_width: impl Fn(char) -> f32) -> Vec<String> {
    let space = char_width(' ');
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let mut current = String::new();
        let mut current_width = 0.0;

        for word in paragraph.split_whitespace() {
            let word_width: f32 = word.chars().map(&char_width).sum();

            if word_width > max_width {
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                }
                current_width = 0.0;
                for c in word.chars() {
                    let w = char_width(c);
                    if !current.is_empty() && current_width + w > max_width {
                        lines.push(std::mem::take(&mut current));
                        current_width = 0.0;
                    }
                    current.push(c);
                    current_width += w;
                }
                continue;
            }

            if !current.is_empty() && current_width + space + word_width > max_width {
                lines.push(std::mem::take(&mut current));
                current_width = 0.0;
            }
            if !current.is_empty() {
                current.push(' ');
                current_width += space;
            }
            current.push_str(word);
            current_width += word_width;
        }

        lines.push(current);
    }

    lines
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontStyle {
    Regular,
    Bold,
}

/// What a run represents in the document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunKind {
    Header,
    Title,
    Meta,
    Label,
    Value,
}

/// A single line of text at a fixed position
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub x: f32,
    /// Baseline, millimetres from the top edge
    pub y: f32,
    pub size: f32,
    pub style: FontStyle,
    pub kind: RunKind,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub runs: Vec<TextRun>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentLayout {
    pub pages: Vec<Page>,
}

impl DocumentLayout {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// All run texts in drawing order, one per line
    pub fn text(&self) -> String {
        self.pages
            .iter()
            .flat_map(|p| p.runs.iter())
            .map(|r| r.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Tracks the current page and vertical cursor while laying out
struct Composer<'m> {
    mode: TextMode,
    measure: &'m dyn TextMeasure,
    pages: Vec<Page>,
    cursor: f32,
}

impl<'m> Composer<'m> {
    fn new(mode: TextMode, measure: &'m dyn TextMeasure) -> Self {
        Self {
            mode,
            measure,
            pages: vec![Page::default()],
            cursor: MARGIN_TOP_MM,
        }
    }

    fn new_page(&mut self) {
        self.pages.push(Page::default());
        self.cursor = MARGIN_TOP_MM;
    }

    /// Reserve `height` for the next line, moving to a new page if it would
    /// cross the flow limit. Returns the baseline.
    fn reserve(&mut self, height: f32) -> f32 {
        if self.cursor + height > FLOW_LIMIT_MM {
            self.new_page();
        }
        let baseline = self.cursor + height * 0.8;
        self.cursor += height;
        baseline
    }

    fn push(&mut self, run: TextRun) {
        if let Some(page) = self.pages.last_mut() {
            page.runs.push(run);
        }
    }

    fn wrap(&self, text: &str, width: f32, size: f32, style: FontStyle) -> Vec<String> {
        let measure = self.measure;
        wrap_text(&self.mode.prepare(text), width, |c| {
            measure.char_width_mm(c, style, size)
        })
    }

    fn line(&mut self, text: &str, size: f32, style: FontStyle, kind: RunKind, height: f32) {
        for wrapped in self.wrap(text, TEXT_WIDTH_MM, size, style) {
            let y = self.reserve(height);
            self.push(TextRun {
                x: MARGIN_LEFT_MM,
                y,
                size,
                style,
                kind,
                text: wrapped,
            });
        }
    }

    /// A label in the left column with its value wrapped in the right column.
    ///
    /// A label too wide for its column gets lines of its own above the value.
    fn field(&mut self, label: &str, value: &str, size: f32, height: f32) {
        let label = self.mode.prepare(&format!("{}:", label));
        let label_width = self.measure.width_mm(&label, FontStyle::Bold, size);
        let mut inline_label = None;

        if label_width <= LABEL_WIDTH_MM - LABEL_GAP_MM {
            inline_label = Some(label);
        } else {
            self.line(&label, size, FontStyle::Bold, RunKind::Label, height);
        }

        for wrapped in self.wrap(value, VALUE_WIDTH_MM, size, FontStyle::Regular) {
            let y = self.reserve(height);
            if let Some(text) = inline_label.take() {
                self.push(TextRun {
                    x: MARGIN_LEFT_MM,
                    y,
                    size,
                    style: FontStyle::Bold,
                    kind: RunKind::Label,
                    text,
                });
            }
            self.push(TextRun {
                x: VALUE_X_MM,
                y,
                size,
                style: FontStyle::Regular,
                kind: RunKind::Value,
                text: wrapped,
            });
        }
    }

    fn gap(&mut self, height: f32) {
        self.cursor += height;
    }

    fn finish(self) -> DocumentLayout {
        DocumentLayout { pages: self.pages }
    }
}

/// Lay out the header and every entry block
pub fn compose(
    entries: &[Entry],
    options: &RenderOptions,
    exported_at: &str,
    mode: TextMode,
    measure: &dyn TextMeasure,
) -> DocumentLayout {
    let mut composer = Composer::new(mode, measure);

    composer.line(
        &format!("Exported at: {}", exported_at),
        META_SIZE_PT,
        FontStyle::Regular,
        RunKind::Header,
        SMALL_LINE_MM,
    );
    composer.line(
        &format!(
            "Source: {} | Entries: {}",
            options.source_label,
            entries.len()
        ),
        META_SIZE_PT,
        FontStyle::Regular,
        RunKind::Header,
        SMALL_LINE_MM,
    );
    composer.gap(BLOCK_GAP_MM);

    let title_size = match mode {
        TextMode::Unicode => TITLE_SIZE_UNICODE_PT,
        TextMode::Ascii => TITLE_SIZE_PT,
    };

    for (index, entry) in entries.iter().enumerate() {
        if index > 0 && composer.cursor > BREAK_THRESHOLD_MM {
            composer.new_page();
        }
        entry_block(&mut composer, entry, options, title_size);
    }

    composer.finish()
}

fn entry_block(composer: &mut Composer, entry: &Entry, options: &RenderOptions, title_size: f32) {
    composer.line(
        entry.display_title(UNTITLED),
        title_size,
        FontStyle::Bold,
        RunKind::Title,
        TITLE_LINE_MM,
    );

    if let Some(meta) = entry.metadata_line(META_SEPARATOR) {
        composer.line(
            &meta,
            META_SIZE_PT,
            FontStyle::Regular,
            RunKind::Meta,
            SMALL_LINE_MM,
        );
    }

    let password = mask(&entry.password, options.mask_password);
    let urls = entry.joined_urls();
    let standard = [
        ("Username", entry.username.as_str()),
        ("Password", password.as_str()),
        ("URL", urls.as_str()),
        ("OTP", entry.otp.as_str()),
    ];
    for (label, value) in standard {
        if !value.is_empty() {
            composer.field(label, value, BODY_SIZE_PT, BODY_LINE_MM);
        }
    }

    if !entry.notes.is_empty() {
        match options.layout {
            Layout::Compact => {
                composer.field("Notes", &entry.notes, COMPACT_NOTES_SIZE_PT, SMALL_LINE_MM)
            }
            Layout::Detailed => composer.field("Notes", &entry.notes, BODY_SIZE_PT, BODY_LINE_MM),
        }
    }

    if options.layout == Layout::Detailed {
        for (key, value) in &entry.extra_fields {
            if is_standard_extra(key) || value.is_empty() {
                continue;
            }
            composer.field(key, value, BODY_SIZE_PT, BODY_LINE_MM);
        }
    }

    composer.gap(BLOCK_GAP_MM);
}

/// Extra labels already shown as standard fields. An extra labelled otp is
/// still printed.
fn is_standard_extra(key: &str) -> bool {
    let key = key.trim().to_lowercase();
    matches!(key.as_str(), "username" | "password" | "notes")
}
