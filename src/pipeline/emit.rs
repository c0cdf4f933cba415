//! Markdown emission: classified, link-annotated lines → Markdown lines.
//!
//! Per fragment, emphasis from the font name is applied to the text first
//! and the link wrapper second, so a bold linked word comes out as
//! `[**word**](url)`. Whitespace at the edges of a fragment stays outside
//! the markers. Fragments are concatenated in the line's left-to-right
//! order; a space is inserted only where the geometry shows a visible gap
//! that neither fragment already accounts for.

use crate::model::{PageSnapshot, TextFragment, VisualLine};
use crate::output::{DocumentResult, PageResult};
use crate::pipeline::images::page_has_image;
use crate::pipeline::lines::reconstruct_lines;
use crate::pipeline::links::LinkOverlay;
use crate::pipeline::style::{
    classify, median_font_size, FontStyle, HeadingThresholds, LineKind, FALLBACK_FONT_SIZE,
};
use crate::progress::ProgressCallback;
use tracing::{debug, info};

/// Horizontal gap, as a fraction of the font size, above which two
/// fragments on one line are treated as separate words.
const WORD_GAP_RATIO: f32 = 0.2;

/// Run the rich pipeline over snapshotted pages.
///
/// The heading thresholds are derived once from every fragment in the
/// document before any line is classified; after that each page is
/// processed on its own, in page order.
pub fn emit_document(pages: &[PageSnapshot], progress: Option<&ProgressCallback>) -> DocumentResult {
    let median = median_font_size(pages.iter().flat_map(|p| p.fragments.iter()));
    let thresholds = HeadingThresholds::from_median(median);
    info!(
        "Emitting {} pages (median font size {:.2})",
        pages.len(),
        median
    );

    let total = pages.len();
    let pages = pages
        .iter()
        .enumerate()
        .map(|(idx, page)| {
            let result = emit_page(page, idx + 1, &thresholds);
            if let Some(cb) = progress {
                cb.on_page_complete(result.page_num, total, result.markdown().len());
            }
            result
        })
        .collect();

    DocumentResult { pages }
}

/// Turn one page into Markdown lines plus its image flag.
pub fn emit_page(page: &PageSnapshot, page_num: usize, thresholds: &HeadingThresholds) -> PageResult {
    let overlay = LinkOverlay::from_annotations(&page.links, page.height);
    let lines: Vec<String> = reconstruct_lines(&page.fragments)
        .iter()
        .filter_map(|line| emit_line(line, thresholds, &overlay))
        .collect();
    let has_image = page_has_image(page, page_num);

    debug!(
        "Page {}: {} fragments → {} lines{}",
        page_num,
        page.fragments.len(),
        lines.len(),
        if has_image { " + image" } else { "" }
    );

    PageResult {
        page_num,
        lines,
        has_image,
    }
}

/// Emit one visual line, or None for a line with no visible text.
pub fn emit_line(
    line: &VisualLine,
    thresholds: &HeadingThresholds,
    overlay: &LinkOverlay,
) -> Option<String> {
    if line.is_blank() {
        return None;
    }

    let avg_size = thresholds.line_average(line);
    let text = compose(line, overlay, false);
    let trimmed = text.trim();

    let out = match classify(trimmed, avg_size, thresholds) {
        LineKind::ListItem(item) => item,
        LineKind::Heading(level) => {
            let hashes = "#".repeat(level as usize);
            if all_bold(line) {
                format!("{hashes} {}", compose(line, overlay, true).trim())
            } else {
                format!("{hashes} {trimmed}")
            }
        }
        LineKind::Plain => trimmed.to_string(),
    };
    Some(out)
}

/// Whether every visible fragment of the line is set in a bold face.
fn all_bold(line: &VisualLine) -> bool {
    line.fragments
        .iter()
        .filter(|f| !f.text.trim().is_empty())
        .all(|f| FontStyle::from_font_name(&f.font_name).bold)
}

/// Concatenate the line's decorated fragments.
fn compose(line: &VisualLine, overlay: &LinkOverlay, suppress_bold: bool) -> String {
    let mut out = String::new();
    let mut prev: Option<&TextFragment> = None;
    for fragment in &line.fragments {
        if let Some(p) = prev {
            if separated_by_gap(p, fragment) {
                out.push(' ');
            }
        }
        out.push_str(&decorate(fragment, overlay, suppress_bold));
        prev = Some(fragment);
    }
    out
}

fn separated_by_gap(prev: &TextFragment, next: &TextFragment) -> bool {
    let Some(prev_width) = prev.width else {
        return false;
    };
    if prev.text.ends_with(char::is_whitespace) || next.text.starts_with(char::is_whitespace) {
        return false;
    }
    let size = next
        .usable_size()
        .or_else(|| prev.usable_size())
        .unwrap_or(FALLBACK_FONT_SIZE);
    next.x - (prev.x + prev_width) > WORD_GAP_RATIO * size
}

/// Apply emphasis, then the link wrapper, to the fragment's visible text.
fn decorate(fragment: &TextFragment, overlay: &LinkOverlay, suppress_bold: bool) -> String {
    let text = fragment.text.as_str();
    let core = text.trim();
    if core.is_empty() {
        return text.to_string();
    }
    let lead = &text[..text.len() - text.trim_start().len()];
    let trail = &text[text.trim_end().len()..];

    let style = FontStyle::from_font_name(&fragment.font_name);
    let bold = style.bold && !suppress_bold;
    let mut s = match (bold, style.italic) {
        (true, true) => format!("***{core}***"),
        (true, false) => format!("**{core}**"),
        (false, true) => format!("*{core}*"),
        (false, false) => core.to_string(),
    };
    if let Some(url) = overlay.url_at(fragment.x, fragment.y) {
        s = format!("[{s}]({url})");
    }
    format!("{lead}{s}{trail}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LinkAnnotation;

    fn frag(text: &str, font: &str, size: f32, x: f32, y: f32) -> TextFragment {
        TextFragment::new(text, font, size, x, y)
    }

    fn line(fragments: Vec<TextFragment>) -> VisualLine {
        VisualLine { fragments }
    }

    fn plain_overlay() -> LinkOverlay {
        LinkOverlay::default()
    }

    #[test]
    fn emphasis_markers_from_font_names() {
        let t = HeadingThresholds::from_median(12.0);
        let l = line(vec![
            frag("plain ", "Helvetica", 12.0, 0.0, 700.0),
            frag("bold ", "Helvetica-Bold", 12.0, 40.0, 700.0),
            frag("slanted ", "Helvetica-Oblique", 12.0, 80.0, 700.0),
            frag("both", "Helvetica-BoldOblique", 12.0, 130.0, 700.0),
        ]);
        assert_eq!(
            emit_line(&l, &t, &plain_overlay()).unwrap(),
            "plain **bold** *slanted* ***both***"
        );
    }

    #[test]
    fn link_wraps_emphasis() {
        let t = HeadingThresholds::from_median(12.0);
        let overlay = LinkOverlay::from_annotations(
            &[LinkAnnotation {
                rect: [95.0, 695.0, 160.0, 712.0],
                url: "https://example.com".into(),
            }],
            792.0,
        );
        let l = line(vec![
            frag("see ", "Helvetica", 12.0, 50.0, 700.0),
            frag("bold text", "Helvetica-Bold", 12.0, 100.0, 700.0),
        ]);
        assert_eq!(
            emit_line(&l, &t, &overlay).unwrap(),
            "see [**bold text**](https://example.com)"
        );
    }

    #[test]
    fn heading_prefix_by_level() {
        let t = HeadingThresholds::from_median(12.0);
        let l = line(vec![frag("Title", "Helvetica", 26.0, 50.0, 700.0)]);
        assert_eq!(emit_line(&l, &t, &plain_overlay()).unwrap(), "# Title");
        let l = line(vec![frag("Section", "Helvetica", 15.0, 50.0, 700.0)]);
        assert_eq!(emit_line(&l, &t, &plain_overlay()).unwrap(), "#### Section");
    }

    #[test]
    fn bold_heading_drops_redundant_markers() {
        let t = HeadingThresholds::from_median(12.0);
        let l = line(vec![
            frag("Hello ", "Helvetica-Bold", 24.0, 50.0, 700.0),
            frag("PDF", "Helvetica-Bold", 24.0, 120.0, 700.0),
        ]);
        assert_eq!(emit_line(&l, &t, &plain_overlay()).unwrap(), "# Hello PDF");
    }

    #[test]
    fn mixed_heading_keeps_markers() {
        let t = HeadingThresholds::from_median(12.0);
        let l = line(vec![
            frag("Hello ", "Helvetica-Bold", 24.0, 50.0, 700.0),
            frag("PDF", "Helvetica", 24.0, 120.0, 700.0),
        ]);
        assert_eq!(emit_line(&l, &t, &plain_overlay()).unwrap(), "# **Hello** PDF");
    }

    #[test]
    fn bullet_lines_are_normalised_and_never_headings() {
        let t = HeadingThresholds::from_median(12.0);
        let l = line(vec![
            frag("• ", "Helvetica", 30.0, 50.0, 700.0),
            frag("Item", "Helvetica", 30.0, 60.0, 700.0),
        ]);
        assert_eq!(emit_line(&l, &t, &plain_overlay()).unwrap(), "- Item");
        let l = line(vec![frag("2) Second", "Helvetica", 12.0, 50.0, 700.0)]);
        assert_eq!(emit_line(&l, &t, &plain_overlay()).unwrap(), "2. Second");
    }

    #[test]
    fn gap_between_measured_fragments_becomes_space() {
        let t = HeadingThresholds::from_median(12.0);
        let l = line(vec![
            frag("Body", "Helvetica", 12.0, 50.0, 700.0).with_size(25.0, 12.0),
            frag("text.", "Helvetica", 12.0, 79.0, 700.0).with_size(25.0, 12.0),
        ]);
        assert_eq!(emit_line(&l, &t, &plain_overlay()).unwrap(), "Body text.");
    }

    #[test]
    fn touching_fragments_are_not_split() {
        let t = HeadingThresholds::from_median(12.0);
        let l = line(vec![
            frag("Hyper", "Helvetica", 12.0, 50.0, 700.0).with_size(30.0, 12.0),
            frag("link", "Helvetica", 12.0, 80.5, 700.0).with_size(20.0, 12.0),
        ]);
        assert_eq!(emit_line(&l, &t, &plain_overlay()).unwrap(), "Hyperlink");
    }

    #[test]
    fn blank_lines_are_skipped() {
        let t = HeadingThresholds::from_median(12.0);
        let l = line(vec![frag("   ", "Helvetica", 12.0, 50.0, 700.0)]);
        assert_eq!(emit_line(&l, &t, &plain_overlay()), None);
    }

    #[test]
    fn document_median_is_shared_across_pages() {
        // Page 2 alone would have a median of 20 and no heading; with the
        // document-wide median of 12 its 20pt line is a level-2 heading.
        let p1 = PageSnapshot {
            fragments: vec![
                frag("a", "Helvetica", 12.0, 50.0, 700.0),
                frag("b", "Helvetica", 12.0, 50.0, 680.0),
                frag("c", "Helvetica", 12.0, 50.0, 660.0),
            ],
            ..PageSnapshot::blank(612.0, 792.0)
        };
        let p2 = PageSnapshot {
            fragments: vec![frag("Big", "Helvetica", 20.0, 50.0, 700.0)],
            ..PageSnapshot::blank(612.0, 792.0)
        };
        let doc = emit_document(&[p1, p2], None);
        assert_eq!(doc.pages[1].lines, ["## Big"]);
        assert_eq!(doc.to_markdown(), "a\nb\nc\n\n---\n\n## Big");
    }
}
