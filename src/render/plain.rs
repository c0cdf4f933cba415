//! Core Markdown → page layout: a line-oriented renderer that recognises
//! only fences, rules, headings, quotes and list markers. Inline markup is
//! drawn as written.

use crate::render::layout::{DrawOp, Font, LaidOutPage, Layout, Run, LINE_SPACING};
use crate::render::rich::hard_wrap;
use once_cell::sync::Lazy;
use regex::Regex;

const BODY_SIZE: f32 = 12.0;
const CODE_SIZE: f32 = 10.0;
const QUOTE_INDENT: f32 = 20.0;
const LIST_INDENT_STEP: f32 = 18.0;

static RE_FENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*```").unwrap());
static RE_RULE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(\*\s*\*\s*\*|-{3,}|_{3,})\s*$").unwrap());
static RE_HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*(#{1,6})\s+(.*)$").unwrap());
static RE_QUOTE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*>\s?(.*)$").unwrap());
static RE_ORDERED: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\s*)(\d+)[.)]\s+(.*)$").unwrap());
static RE_UNORDERED: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\s*)[-*+]\s+(.*)$").unwrap());

pub fn heading_size(level: usize) -> f32 {
    match level {
        1 => 24.0,
        2 => 20.0,
        3 => 18.0,
        4 => 16.0,
        5 => 14.0,
        _ => 13.0,
    }
}

/// Lay out Markdown line by line.
pub fn layout_plain(markdown: &str, margin: f32) -> Vec<LaidOutPage> {
    let mut layout = Layout::new(margin);
    let gap = 0.4 * BODY_SIZE * LINE_SPACING;
    let mut in_code = false;

    for line in markdown.replace("\r\n", "\n").split('\n') {
        if RE_FENCE.is_match(line) {
            in_code = !in_code;
            layout.advance(gap);
            continue;
        }

        if in_code {
            if line.trim().is_empty() {
                layout.advance(CODE_SIZE * LINE_SPACING);
                continue;
            }
            let x = layout.left();
            for chunk in hard_wrap(line, Font::Mono, CODE_SIZE, layout.content_width()) {
                layout.line(x, chunk, Font::Mono, CODE_SIZE);
            }
            continue;
        }

        if RE_RULE.is_match(line) {
            layout.advance(gap);
            layout.ensure(1.0);
            let y = layout.cursor();
            let (x1, x2) = (layout.left(), layout.right());
            layout.push(DrawOp::Line { x1, y1: y, x2, y2: y });
            layout.advance(gap);
            continue;
        }

        if let Some(caps) = RE_HEADING.captures(line) {
            let size = heading_size(caps[1].len());
            layout.advance(0.6 * BODY_SIZE * LINE_SPACING);
            layout.paragraph(&[Run::new(caps[2].trim(), Font::Bold)], size, 0.0);
            layout.advance(0.2 * BODY_SIZE * LINE_SPACING);
            continue;
        }

        if let Some(caps) = RE_QUOTE.captures(line) {
            layout.advance(0.2 * BODY_SIZE * LINE_SPACING);
            layout.paragraph(&[Run::new(&caps[1], Font::Italic)], BODY_SIZE, QUOTE_INDENT);
            layout.advance(2.0);
            continue;
        }

        if let Some(caps) = RE_ORDERED.captures(line) {
            let indent = nesting(&caps[1]) * LIST_INDENT_STEP;
            let text = format!("{}. {}", &caps[2], &caps[3]);
            layout.paragraph(&[Run::new(text, Font::Regular)], BODY_SIZE, indent);
            layout.advance(2.0);
            continue;
        }

        if let Some(caps) = RE_UNORDERED.captures(line) {
            let indent = nesting(&caps[1]) * LIST_INDENT_STEP;
            let text = format!("- {}", &caps[2]);
            layout.paragraph(&[Run::new(text, Font::Regular)], BODY_SIZE, indent);
            layout.advance(2.0);
            continue;
        }

        if line.trim().is_empty() {
            layout.advance(gap);
            continue;
        }

        layout.paragraph(&[Run::new(line, Font::Regular)], BODY_SIZE, 0.0);
        layout.advance(4.0);
    }

    layout.finish()
}

/// List nesting depth: one level per two columns of leading whitespace.
fn nesting(leading: &str) -> f32 {
    leading.chars().count() as f32 / 2.0
}
