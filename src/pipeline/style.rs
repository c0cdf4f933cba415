//! Style classification: font-name emphasis, heading levels, list items.
//!
//! Heading levels come from font-size ratios against the document-wide
//! median fragment size, not from any structure embedded in the PDF. Lines
//! that look like list items are classified first and never become
//! headings, however large their font.

use crate::model::{TextFragment, VisualLine};
use once_cell::sync::Lazy;
use regex::Regex;

/// Size assumed for fragments without a usable font size when computing the
/// document median.
pub const FALLBACK_FONT_SIZE: f32 = 12.0;

/// Heading level multipliers of the median size, level 1 first.
const HEADING_RATIOS: [f32; 4] = [1.8, 1.6, 1.4, 1.2];

static RE_BOLD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(Bold|Black|Semibold|Medium)").unwrap());
static RE_ITALIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)(Italic|Oblique)").unwrap());

// • ◦ ▪ or `12.` / `12)`, followed by whitespace.
static RE_LIST_ITEM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:([\x{2022}\x{25E6}\x{25AA}])|(\d+)[.)])\s+").unwrap());

/// Emphasis implied by a font name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FontStyle {
    pub bold: bool,
    pub italic: bool,
}

impl FontStyle {
    pub fn from_font_name(name: &str) -> Self {
        Self {
            bold: RE_BOLD.is_match(name),
            italic: RE_ITALIC.is_match(name),
        }
    }
}

/// Median of all fragment sizes across the document.
///
/// Fragments without a usable size count as [`FALLBACK_FONT_SIZE`]. For an
/// even count the upper middle value is used. An empty document yields the
/// fallback size.
pub fn median_font_size<'a>(fragments: impl IntoIterator<Item = &'a TextFragment>) -> f32 {
    let mut sizes: Vec<f32> = fragments
        .into_iter()
        .map(|f| f.usable_size().unwrap_or(FALLBACK_FONT_SIZE))
        .collect();
    if sizes.is_empty() {
        return FALLBACK_FONT_SIZE;
    }
    sizes.sort_by(f32::total_cmp);
    sizes[sizes.len() / 2]
}

/// Size cut-offs for heading levels 1–4, derived once per document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeadingThresholds {
    pub median: f32,
    levels: [f32; 4],
}

impl HeadingThresholds {
    pub fn from_median(median: f32) -> Self {
        Self {
            median,
            levels: HEADING_RATIOS.map(|r| median * r),
        }
    }

    /// Heading level for a line of the given average size, if any.
    pub fn level_for(&self, avg_size: f32) -> Option<u8> {
        self.levels
            .iter()
            .position(|&threshold| avg_size >= threshold)
            .map(|i| i as u8 + 1)
    }

    /// Arithmetic mean of the line's fragment sizes; fragments without a
    /// usable size count as the document median.
    pub fn line_average(&self, line: &VisualLine) -> f32 {
        if line.fragments.is_empty() {
            return self.median;
        }
        let total: f32 = line
            .fragments
            .iter()
            .map(|f| f.usable_size().unwrap_or(self.median))
            .sum();
        total / line.fragments.len() as f32
    }
}

/// How a line is emitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind {
    /// A list item, already normalised to `- text` or `N. text`.
    ListItem(String),
    /// A heading of the given level (1–4).
    Heading(u8),
    /// Plain paragraph text.
    Plain,
}

/// Normalise a trimmed line to Markdown list syntax if it starts with a
/// bullet glyph or an `N.` / `N)` marker.
pub fn list_item(trimmed: &str) -> Option<String> {
    let caps = RE_LIST_ITEM.captures(trimmed)?;
    let rest = &trimmed[caps.get(0)?.end()..];
    match caps.get(2) {
        Some(number) => Some(format!("{}. {}", number.as_str(), rest)),
        None => Some(format!("- {rest}")),
    }
}

/// Classify a line from its trimmed Markdown text and average font size.
/// List detection takes priority over size-based heading inference.
pub fn classify(trimmed: &str, avg_size: f32, thresholds: &HeadingThresholds) -> LineKind {
    if let Some(item) = list_item(trimmed) {
        return LineKind::ListItem(item);
    }
    match thresholds.level_for(avg_size) {
        Some(level) => LineKind::Heading(level),
        None => LineKind::Plain,
    }
}
