//! Data types shared by the PDF-to-Markdown pipeline stages.
//!
//! Everything here is plain data. [`PageSnapshot`] is the boundary between
//! the pdfium-facing extractor and the pure layout heuristics: once a page
//! has been snapshotted, nothing downstream touches the PDF engine again.

use serde::{Deserialize, Serialize};

/// One atomic run of text with position and font metadata.
///
/// Coordinates are PDF user space (bottom-left origin): `y` grows upwards,
/// so the top of the page has the largest `y`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextFragment {
    pub text: String,
    pub font_name: String,
    /// Effective font size. `0.0` (or any non-positive value) means the
    /// engine reported no usable size.
    pub font_size: f32,
    pub x: f32,
    pub y: f32,
    pub width: Option<f32>,
    pub height: Option<f32>,
}

impl TextFragment {
    /// Fragment with no width/height information.
    pub fn new(
        text: impl Into<String>,
        font_name: impl Into<String>,
        font_size: f32,
        x: f32,
        y: f32,
    ) -> Self {
        Self {
            text: text.into(),
            font_name: font_name.into(),
            font_size,
            x,
            y,
            width: None,
            height: None,
        }
    }

    pub fn with_size(mut self, width: f32, height: f32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    /// The font size, if the engine reported a usable one.
    pub fn usable_size(&self) -> Option<f32> {
        (self.font_size.is_finite() && self.font_size > 0.0).then_some(self.font_size)
    }
}

/// Fragments sharing an inferred baseline, sorted left-to-right by `x`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VisualLine {
    pub fragments: Vec<TextFragment>,
}

impl VisualLine {
    pub fn is_blank(&self) -> bool {
        self.fragments.iter().all(|f| f.text.trim().is_empty())
    }
}

/// A link annotation as read from the page: the raw annotation rectangle in
/// PDF space (`[x1, y1, x2, y2]`, corners in any order) and its URI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkAnnotation {
    pub rect: [f32; 4],
    pub url: String,
}

/// A link target rectangle normalised for hit-testing fragment positions.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkRect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    pub url: String,
}

/// Summary of one page-painting instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaintOp {
    Text,
    Path,
    Shading,
    /// A form XObject (nested content); not an image by itself.
    Form,
    /// A raster image XObject.
    ImageXObject,
    /// An image embedded inline in the content stream. pdfium reports
    /// these as ordinary image objects, so the extractor never produces
    /// this; it is for snapshots built from other sources.
    InlineImage,
    /// A DCT (JPEG) encoded image XObject.
    JpegXObject,
    Other,
}

impl PaintOp {
    pub fn paints_image(self) -> bool {
        matches!(
            self,
            PaintOp::ImageXObject | PaintOp::InlineImage | PaintOp::JpegXObject
        )
    }
}

/// Everything the layout heuristics need from one page.
#[derive(Debug, Clone)]
pub struct PageSnapshot {
    pub width: f32,
    pub height: f32,
    pub fragments: Vec<TextFragment>,
    pub links: Vec<LinkAnnotation>,
    /// The page's paint operators, or the reason they could not be read.
    pub paint_ops: Result<Vec<PaintOp>, String>,
}

impl PageSnapshot {
    /// A page of the given size with nothing on it.
    pub fn blank(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            fragments: Vec::new(),
            links: Vec::new(),
            paint_ops: Ok(Vec::new()),
        }
    }
}
