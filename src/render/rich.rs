//! Rich Markdown → page layout: walks the token tree and lays out each block.

use crate::render::assets::{fit_within, resolve_image};
use crate::render::layout::{measure, DrawOp, Font, LaidOutPage, Layout, Run, LINE_SPACING};
use crate::render::tokens::{parse, Block, List, Span};
use std::path::Path;
use tracing::debug;

const BODY_SIZE: f32 = 12.0;
const CODE_SIZE: f32 = 10.0;
const CODE_PADDING: f32 = 6.0;
/// Light grey behind code blocks.
const CODE_FILL: u8 = 240;
const LIST_INDENT: f32 = 8.0;
const NESTED_LIST_INDENT: f32 = 26.0;
const QUOTE_INDENT: f32 = 14.0;
const QUOTE_RULE_HEIGHT: f32 = 12.0;
const TABLE_ROW_HEIGHT: f32 = 18.0;
const TABLE_CELL_PADDING: f32 = 4.0;
const TABLE_TEXT_SIZE: f32 = 10.0;
const IMAGE_MAX_HEIGHT: f32 = 300.0;

/// Font size for a heading level.
pub fn heading_size(level: u8) -> f32 {
    match level {
        1 => 26.0,
        2 => 20.0,
        3 => 18.0,
        _ => 14.0,
    }
}

/// Parse and lay out a Markdown document.
pub fn layout_markdown(markdown: &str, margin: f32, base_dir: Option<&Path>) -> Vec<LaidOutPage> {
    let blocks = parse(markdown);
    debug!("Parsed {} Markdown blocks", blocks.len());
    layout_blocks(&blocks, margin, base_dir)
}

pub fn layout_blocks(blocks: &[Block], margin: f32, base_dir: Option<&Path>) -> Vec<LaidOutPage> {
    let mut renderer = RichRenderer {
        layout: Layout::new(margin),
        base_dir,
    };
    for block in blocks {
        renderer.block(block);
    }
    renderer.layout.finish()
}

struct RichRenderer<'a> {
    layout: Layout,
    base_dir: Option<&'a Path>,
}

impl RichRenderer<'_> {
    fn block(&mut self, block: &Block) {
        match block {
            Block::Heading { level, text } => self.heading(*level, text),
            Block::Paragraph(spans) => {
                self.layout.paragraph(&runs(spans), BODY_SIZE, 0.0);
                self.layout.advance(10.0);
            }
            Block::List(list) => self.list(list),
            Block::Code(code) => self.code(code),
            Block::Blockquote(paragraphs) => self.blockquote(paragraphs),
            Block::Rule => self.rule(),
            Block::Table { header, rows } => self.table(header, rows),
            Block::Image { src, .. } => self.image(src),
        }
    }

    fn heading(&mut self, level: u8, spans: &[Span]) {
        let size = heading_size(level);
        let runs: Vec<Run> = spans
            .iter()
            .map(|s| Run::new(s.text.as_str(), Font::styled(true, s.italic)))
            .collect();
        self.layout.paragraph(&runs, size, 0.0);
        self.layout.advance(8.0);
    }

    fn list(&mut self, list: &List) {
        for (i, item) in list.items.iter().enumerate() {
            let prefix = if list.ordered {
                format!("{}. ", list.start + i as u64)
            } else {
                "- ".to_string()
            };
            self.list_line(prefix, &item.text, LIST_INDENT);

            if let Some(sub) = &item.sublist {
                for (j, sub_item) in sub.items.iter().enumerate() {
                    let prefix = if sub.ordered {
                        format!("{}. ", sub.start + j as u64)
                    } else {
                        "-- ".to_string()
                    };
                    self.list_line(prefix, &sub_item.text, NESTED_LIST_INDENT);
                }
            }
        }
        self.layout.advance(0.3 * BODY_SIZE * LINE_SPACING);
    }

    fn list_line(&mut self, prefix: String, spans: &[Span], indent: f32) {
        let mut line = vec![Run::new(prefix, Font::Regular)];
        line.extend(runs(spans));
        self.layout.paragraph(&line, BODY_SIZE, indent);
    }

    /// Shaded monospace box. A block taller than the space left is split
    /// across pages, one box per page.
    fn code(&mut self, code: &str) {
        let width = self.layout.content_width();
        let line_height = CODE_SIZE * LINE_SPACING + 1.0;
        let lines: Vec<String> = code
            .split('\n')
            .flat_map(|l| hard_wrap(l, Font::Mono, CODE_SIZE, width - 2.0 * CODE_PADDING))
            .collect();

        let mut rest = &lines[..];
        while !rest.is_empty() {
            let mut fit = ((self.layout.remaining() - 2.0 * CODE_PADDING) / line_height).floor();
            if fit < 1.0 {
                self.layout.new_page();
                fit = ((self.layout.remaining() - 2.0 * CODE_PADDING) / line_height)
                    .floor()
                    .max(1.0);
            }
            let n = (fit as usize).min(rest.len());
            let (chunk, tail) = rest.split_at(n);
            self.code_box(chunk, width, line_height);
            rest = tail;
            if !rest.is_empty() {
                self.layout.new_page();
            }
        }
        self.layout.advance(0.4 * BODY_SIZE * LINE_SPACING);
    }

    fn code_box(&mut self, lines: &[String], width: f32, line_height: f32) {
        let top = self.layout.cursor();
        let left = self.layout.left();
        let height = lines.len() as f32 * line_height + 2.0 * CODE_PADDING;
        self.layout.push(DrawOp::Rect {
            x: left,
            y: top - height,
            w: width,
            h: height,
            fill: Some(CODE_FILL),
        });
        for (i, line) in lines.iter().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            self.layout.push(DrawOp::Text {
                x: left + CODE_PADDING,
                y: top - CODE_PADDING - CODE_SIZE - i as f32 * line_height,
                text: line.clone(),
                font: Font::Mono,
                size: CODE_SIZE,
            });
        }
        self.layout.advance(height);
    }

    fn blockquote(&mut self, paragraphs: &[Vec<Span>]) {
        if paragraphs.is_empty() {
            return;
        }
        self.layout.ensure(BODY_SIZE * LINE_SPACING);
        let x = self.layout.left() + 2.0;
        let top = self.layout.cursor();
        self.layout.push(DrawOp::Line {
            x1: x,
            y1: top,
            x2: x,
            y2: top - QUOTE_RULE_HEIGHT,
        });
        for spans in paragraphs {
            let runs: Vec<Run> = spans
                .iter()
                .map(|s| Run::new(s.text.as_str(), Font::styled(s.bold, true)))
                .collect();
            self.layout.paragraph(&runs, BODY_SIZE, QUOTE_INDENT);
        }
        self.layout.advance(10.0);
    }

    fn rule(&mut self) {
        self.layout.ensure(8.0);
        let y = self.layout.cursor() - 4.0;
        let (left, right) = (self.layout.left(), self.layout.right());
        self.layout.push(DrawOp::Line {
            x1: left,
            y1: y,
            x2: right,
            y2: y,
        });
        self.layout.advance(8.0 + 0.5 * BODY_SIZE * LINE_SPACING);
    }

    /// Fixed grid: equal column widths, one stroked cell per column per row.
    fn table(&mut self, header: &[String], rows: &[Vec<String>]) {
        let cols = rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(header.len()))
            .max()
            .unwrap_or(0);
        if cols == 0 {
            return;
        }
        let col_width = self.layout.content_width() / cols as f32;

        self.table_row(header, cols, col_width, Font::Bold);
        for row in rows {
            self.table_row(row, cols, col_width, Font::Regular);
        }
        self.layout.advance(0.5 * BODY_SIZE * LINE_SPACING);
    }

    fn table_row(&mut self, cells: &[String], cols: usize, col_width: f32, font: Font) {
        self.layout.ensure(TABLE_ROW_HEIGHT);
        let top = self.layout.cursor();
        let left = self.layout.left();
        let baseline = top - TABLE_CELL_PADDING - TABLE_TEXT_SIZE;

        for i in 0..cols {
            let x = left + i as f32 * col_width;
            self.layout.push(DrawOp::Rect {
                x,
                y: top - TABLE_ROW_HEIGHT,
                w: col_width,
                h: TABLE_ROW_HEIGHT,
                fill: None,
            });

            let Some(cell) = cells.get(i) else { continue };
            let limit = x + col_width - TABLE_CELL_PADDING;
            let mut cx = x + TABLE_CELL_PADDING;
            for word in cell.split_inclusive(' ') {
                let w = measure(word.trim_end(), font, TABLE_TEXT_SIZE);
                if cx + w > limit {
                    break;
                }
                self.layout.push(DrawOp::Text {
                    x: cx,
                    y: baseline,
                    text: word.to_string(),
                    font,
                    size: TABLE_TEXT_SIZE,
                });
                cx += measure(word, font, TABLE_TEXT_SIZE);
            }
        }
        self.layout.advance(TABLE_ROW_HEIGHT);
    }

    fn image(&mut self, src: &str) {
        let Some(image) = resolve_image(src, self.base_dir) else {
            return;
        };
        let (w, h) = fit_within(
            image.width() as f32,
            image.height() as f32,
            self.layout.content_width(),
            IMAGE_MAX_HEIGHT,
        );
        if w <= 0.0 || h <= 0.0 {
            return;
        }
        self.layout.ensure(h);
        let top = self.layout.cursor();
        self.layout.push(DrawOp::Image {
            x: self.layout.left(),
            y: top - h,
            w,
            h,
            image,
        });
        self.layout.advance(h + 6.0);
    }
}

fn runs(spans: &[Span]) -> Vec<Run> {
    spans
        .iter()
        .map(|s| {
            let font = if s.code {
                Font::Mono
            } else {
                Font::styled(s.bold, s.italic)
            };
            Run::new(s.text.as_str(), font)
        })
        .collect()
}

/// Break a line into chunks no wider than `width`, preserving spacing.
pub fn hard_wrap(line: &str, font: Font, size: f32, width: f32) -> Vec<String> {
    let per_line = ((width / measure("m", font, size)).floor() as usize).max(1);
    let chars: Vec<char> = line.chars().collect();
    if chars.len() <= per_line {
        return vec![line.to_string()];
    }
    chars
        .chunks(per_line)
        .map(|c| c.iter().collect())
        .collect()
}
