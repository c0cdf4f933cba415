//! Page layout for generated PDFs: a top-down cursor that wraps styled text
//! into lines, breaks pages, and records positioned draw operations.
//!
//! Coordinates in [`DrawOp`] are PDF user space (bottom-left origin). Text
//! positions are baselines.

use image::DynamicImage;

/// US Letter, in points.
pub const PAGE_WIDTH: f32 = 612.0;
pub const PAGE_HEIGHT: f32 = 792.0;

/// Line height as a multiple of the font size.
pub const LINE_SPACING: f32 = 1.2;

/// The standard fonts generated documents use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Font {
    Regular,
    Bold,
    Italic,
    BoldItalic,
    Mono,
}

impl Font {
    pub fn styled(bold: bool, italic: bool) -> Self {
        match (bold, italic) {
            (true, true) => Font::BoldItalic,
            (true, false) => Font::Bold,
            (false, true) => Font::Italic,
            (false, false) => Font::Regular,
        }
    }

    /// Average glyph advance as a fraction of the em.
    fn advance(self) -> f32 {
        match self {
            Font::Mono => 0.6,
            _ => 0.5,
        }
    }
}

/// Approximate rendered width of `text`.
pub fn measure(text: &str, font: Font, size: f32) -> f32 {
    text.chars().count() as f32 * font.advance() * size
}

#[derive(Debug, Clone)]
pub enum DrawOp {
    Text {
        x: f32,
        y: f32,
        text: String,
        font: Font,
        size: f32,
    },
    /// Rectangle with bottom-left corner `(x, y)`. `fill` is a grey level
    /// in `0..=255`; without one the outline is stroked.
    Rect {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        fill: Option<u8>,
    },
    Line {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
    },
    Image {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        image: DynamicImage,
    },
}

#[derive(Debug, Clone, Default)]
pub struct LaidOutPage {
    pub ops: Vec<DrawOp>,
}

impl LaidOutPage {
    /// Text of every text op, in draw order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

/// A piece of text in one font, as fed to [`Layout::paragraph`].
#[derive(Debug, Clone, PartialEq)]
pub struct Run {
    pub text: String,
    pub font: Font,
}

impl Run {
    pub fn new(text: impl Into<String>, font: Font) -> Self {
        Self {
            text: text.into(),
            font,
        }
    }
}

/// A word-level piece: text up to and including one trailing space.
#[derive(Debug, Clone)]
struct Piece {
    text: String,
    font: Font,
}

/// Cursor-based layout over a sequence of pages.
#[derive(Debug)]
pub struct Layout {
    margin: f32,
    pages: Vec<LaidOutPage>,
    /// Distance of the cursor from the page bottom.
    top: f32,
}

impl Layout {
    pub fn new(margin: f32) -> Self {
        Self {
            margin,
            pages: vec![LaidOutPage::default()],
            top: PAGE_HEIGHT - margin,
        }
    }

    pub fn left(&self) -> f32 {
        self.margin
    }

    pub fn right(&self) -> f32 {
        PAGE_WIDTH - self.margin
    }

    pub fn content_width(&self) -> f32 {
        self.right() - self.left()
    }

    /// Current cursor position (top of the next line).
    pub fn cursor(&self) -> f32 {
        self.top
    }

    /// Height available between the cursor and the bottom margin.
    pub fn remaining(&self) -> f32 {
        self.top - self.margin
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn new_page(&mut self) {
        self.pages.push(LaidOutPage::default());
        self.top = PAGE_HEIGHT - self.margin;
    }

    /// Start a new page unless `height` fits below the cursor. A page that
    /// is still empty is never abandoned.
    pub fn ensure(&mut self, height: f32) {
        if height > self.remaining() && self.current_has_content() {
            self.new_page();
        }
    }

    /// Move the cursor down, stopping at the bottom margin.
    pub fn advance(&mut self, dy: f32) {
        self.top = (self.top - dy).max(self.margin);
    }

    pub fn push(&mut self, op: DrawOp) {
        if let Some(page) = self.pages.last_mut() {
            page.ops.push(op);
        }
    }

    fn current_has_content(&self) -> bool {
        self.pages.last().is_some_and(|p| !p.ops.is_empty())
    }

    /// Place one line of pre-measured text at `x`, advancing the cursor.
    pub fn line(&mut self, x: f32, text: impl Into<String>, font: Font, size: f32) {
        let height = size * LINE_SPACING;
        self.ensure(height);
        let y = self.top - size;
        self.push(DrawOp::Text {
            x,
            y,
            text: text.into(),
            font,
            size,
        });
        self.advance(height);
    }

    /// Word-wrap runs between `left + indent` and the right margin. Each
    /// word becomes its own text op carrying its trailing space.
    pub fn paragraph(&mut self, runs: &[Run], size: f32, indent: f32) {
        let x0 = self.left() + indent;
        let max_x = self.right();
        let height = size * LINE_SPACING;

        let mut line: Vec<(f32, Piece)> = Vec::new();
        let mut x = x0;
        for word in words(runs) {
            let word_width: f32 = word
                .iter()
                .map(|p| measure(p.text.trim_end(), p.font, size))
                .sum();
            if !line.is_empty() && x + word_width > max_x {
                self.flush_line(&mut line, size, height);
                x = x0;
            }
            for piece in word {
                let w = measure(&piece.text, piece.font, size);
                line.push((x, piece));
                x += w;
            }
        }
        if !line.is_empty() {
            self.flush_line(&mut line, size, height);
        }
    }

    fn flush_line(&mut self, line: &mut Vec<(f32, Piece)>, size: f32, height: f32) {
        self.ensure(height);
        let y = self.top - size;
        for (x, piece) in line.drain(..) {
            self.push(DrawOp::Text {
                x,
                y,
                text: piece.text,
                font: piece.font,
                size,
            });
        }
        self.advance(height);
    }

    pub fn finish(self) -> Vec<LaidOutPage> {
        self.pages
    }
}

/// Split runs into words. A word is a list of pieces (a run boundary can
/// fall inside a word) and ends after whitespace; runs of whitespace
/// collapse to one space.
fn words(runs: &[Run]) -> Vec<Vec<Piece>> {
    let mut words: Vec<Vec<Piece>> = Vec::new();
    let mut current: Vec<Piece> = Vec::new();
    let mut piece = String::new();

    for run in runs {
        for ch in run.text.chars() {
            if ch.is_whitespace() {
                if !piece.is_empty() {
                    piece.push(' ');
                    current.push(Piece {
                        text: std::mem::take(&mut piece),
                        font: run.font,
                    });
                    words.push(std::mem::take(&mut current));
                } else if let Some(last) = current.last_mut() {
                    // Whitespace right after a run boundary closes the word.
                    last.text.push(' ');
                    words.push(std::mem::take(&mut current));
                }
            } else {
                piece.push(ch);
            }
        }
        if !piece.is_empty() {
            current.push(Piece {
                text: std::mem::take(&mut piece),
                font: run.font,
            });
        }
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}
