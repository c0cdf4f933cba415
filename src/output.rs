//! Conversion results: per-page Markdown, assembled documents, stats.

use crate::config::EngineKind;
use crate::pipeline::images::IMAGE_PLACEHOLDER;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Separator placed between consecutive pages of the assembled Markdown.
pub const PAGE_SEPARATOR: &str = "\n\n---\n\n";

/// Markdown recovered from one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageResult {
    /// 1-indexed page number.
    pub page_num: usize,
    /// Emitted Markdown lines, top to bottom.
    pub lines: Vec<String>,
    /// Whether the page paints at least one image.
    pub has_image: bool,
}

impl PageResult {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty() && !self.has_image
    }

    /// The page's Markdown: its lines, then the image placeholder paragraph
    /// if the page has images.
    pub fn markdown(&self) -> String {
        let mut md = self.lines.join("\n");
        if self.has_image {
            if !md.is_empty() {
                md.push_str("\n\n");
            }
            md.push_str(IMAGE_PLACEHOLDER);
        }
        md
    }
}

/// All pages of a document, in page order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentResult {
    pub pages: Vec<PageResult>,
}

impl DocumentResult {
    /// Pages joined with a `---` rule between consecutive pages. A document
    /// with nothing to emit on any page yields an empty string.
    pub fn to_markdown(&self) -> String {
        if self.pages.iter().all(PageResult::is_empty) {
            return String::new();
        }
        self.pages
            .iter()
            .map(PageResult::markdown)
            .collect::<Vec<_>>()
            .join(PAGE_SEPARATOR)
    }

    pub fn image_pages(&self) -> usize {
        self.pages.iter().filter(|p| p.has_image).count()
    }
}

/// Statistics about one conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionStats {
    /// Engine requested by the configuration.
    pub requested_engine: EngineKind,
    /// Engine that produced the output.
    pub engine_used: EngineKind,
    /// Pages in the source (PDF→MD) or produced (MD→PDF) document.
    pub page_count: usize,
    /// Pages carrying an image (PDF→MD rich engine only).
    pub image_pages: usize,
    pub duration_ms: u64,
}

impl ConversionStats {
    /// Whether the rich engine failed and the core engine took over.
    pub fn fell_back(&self) -> bool {
        self.requested_engine != self.engine_used
    }
}

/// Result of a PDF → Markdown conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkdownOutput {
    pub markdown: String,
    /// Per-page results; empty when the core engine produced the output.
    pub pages: Vec<PageResult>,
    pub stats: ConversionStats,
}

/// Result of a Markdown → PDF conversion.
#[derive(Debug, Clone)]
pub struct PdfOutput {
    pub bytes: Vec<u8>,
    pub stats: ConversionStats,
}

/// Which direction a file conversion ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    Pdf,
    Markdown,
}

/// Summary of [`crate::convert::convert_file`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileConversion {
    pub input: PathBuf,
    pub input_kind: InputKind,
    /// Written file, or None when the result went to standard output.
    pub output: Option<PathBuf>,
    pub stats: ConversionStats,
}
