//! Page snapshots: read text objects, link annotations and paint operators
//! from a loaded pdfium document.
//!
//! This is the only PDF→Markdown stage that talks to pdfium. Each page is
//! copied into a [`PageSnapshot`] and released before the heuristics run.
//!
//! Page objects are read into a small [`PageNode`] tree first. Form
//! XObjects (imported or stamped pages, watermarks) become
//! [`PageNode::Form`] with their own children, and [`flatten_nodes`] maps
//! everything into page space. Child coordinates are relative to the form,
//! so each form's matrix is composed onto its children on the way down.

use crate::error::ConvertError;
use crate::model::{LinkAnnotation, PageSnapshot, PaintOp, TextFragment};
use pdfium_render::prelude::*;
use tracing::{debug, trace};

/// Forms nested deeper than this are not entered.
const MAX_FORM_DEPTH: usize = 16;

/// Affine transform `[a b c d e f]` in PDF matrix order:
/// `x' = a·x + c·y + e`, `y' = b·x + d·y + f`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub e: f32,
    pub f: f32,
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    /// Map a point from this transform's inner space to its outer space.
    pub fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        (
            self.a * x + self.c * y + self.e,
            self.b * x + self.d * y + self.f,
        )
    }

    /// `inner` followed by `self`: maps the inner form's child space
    /// straight to this transform's outer space.
    pub fn compose(&self, inner: &Transform) -> Transform {
        Transform {
            a: self.a * inner.a + self.c * inner.b,
            b: self.b * inner.a + self.d * inner.b,
            c: self.a * inner.c + self.c * inner.d,
            d: self.b * inner.c + self.d * inner.d,
            e: self.a * inner.e + self.c * inner.f + self.e,
            f: self.b * inner.e + self.d * inner.f + self.f,
        }
    }

    /// Length of the unit x vector after the transform.
    fn x_scale(&self) -> f32 {
        self.a.hypot(self.b)
    }

    /// Length of the unit y vector after the transform.
    fn y_scale(&self) -> f32 {
        self.c.hypot(self.d)
    }
}

/// One page object as read from pdfium, before flattening.
#[derive(Debug, Clone)]
pub enum PageNode {
    /// A text object with visible text.
    Text(TextFragment),
    /// Any other object (including text objects with no text).
    Paint(PaintOp),
    /// A form XObject: its matrix and the objects it contains.
    Form {
        transform: Transform,
        children: Vec<PageNode>,
    },
}

/// Flatten a node tree into page-space fragments and paint operators, in
/// content order. A form contributes [`PaintOp::Form`] followed by its
/// children's operators.
pub fn flatten_nodes(nodes: &[PageNode]) -> (Vec<TextFragment>, Vec<PaintOp>) {
    let mut fragments = Vec::new();
    let mut ops = Vec::new();
    flatten_into(nodes, &Transform::IDENTITY, &mut fragments, &mut ops);
    (fragments, ops)
}

fn flatten_into(
    nodes: &[PageNode],
    ctm: &Transform,
    fragments: &mut Vec<TextFragment>,
    ops: &mut Vec<PaintOp>,
) {
    for node in nodes {
        match node {
            PageNode::Text(fragment) => {
                ops.push(PaintOp::Text);
                fragments.push(to_page_space(fragment, ctm));
            }
            PageNode::Paint(op) => ops.push(*op),
            PageNode::Form {
                transform,
                children,
            } => {
                ops.push(PaintOp::Form);
                flatten_into(children, &ctm.compose(transform), fragments, ops);
            }
        }
    }
}

fn to_page_space(fragment: &TextFragment, ctm: &Transform) -> TextFragment {
    if *ctm == Transform::IDENTITY {
        return fragment.clone();
    }
    let (x, y) = ctm.apply(fragment.x, fragment.y);
    let (sx, sy) = (ctm.x_scale(), ctm.y_scale());
    TextFragment {
        text: fragment.text.clone(),
        font_name: fragment.font_name.clone(),
        font_size: fragment.font_size * sy,
        x,
        y,
        width: fragment.width.map(|w| w * sx),
        height: fragment.height.map(|h| h * sy),
    }
}

/// Snapshot every page of the document, in page order.
pub fn snapshot_pages(document: &PdfDocument) -> Vec<PageSnapshot> {
    document
        .pages()
        .iter()
        .enumerate()
        .map(|(idx, page)| snapshot_page(&page, idx + 1))
        .collect()
}

/// Copy one page's fragments, links and paint operator summary.
pub fn snapshot_page(page: &PdfPage, page_num: usize) -> PageSnapshot {
    let nodes: Vec<PageNode> = page
        .objects()
        .iter()
        .map(|object| read_node(&object, page_num, 0))
        .collect();
    let (fragments, paint_ops) = flatten_nodes(&nodes);

    let links = link_annotations(page, page_num);
    debug!(
        "Snapshot page {}: {} fragments, {} links, {} objects",
        page_num,
        fragments.len(),
        links.len(),
        paint_ops.len()
    );

    PageSnapshot {
        width: page.width().value,
        height: page.height().value,
        fragments,
        links,
        paint_ops: Ok(paint_ops),
    }
}

fn read_node(object: &PdfPageObject, page_num: usize, depth: usize) -> PageNode {
    if let Some(text_object) = object.as_text_object() {
        return match fragment_from(text_object, object) {
            Some(fragment) => PageNode::Text(fragment),
            None => PageNode::Paint(PaintOp::Text),
        };
    }
    if let Some(form) = object.as_x_object_form_object() {
        if depth >= MAX_FORM_DEPTH {
            debug!("Page {page_num}: form nested deeper than {MAX_FORM_DEPTH}, not entered");
            return PageNode::Paint(PaintOp::Form);
        }
        let transform = match form.matrix() {
            Ok(m) => Transform {
                a: m.a(),
                b: m.b(),
                c: m.c(),
                d: m.d(),
                e: m.e(),
                f: m.f(),
            },
            Err(e) => {
                debug!("Page {page_num}: form matrix unavailable ({e:?}); using identity");
                Transform::IDENTITY
            }
        };
        let children = form
            .iter()
            .map(|child| read_node(&child, page_num, depth + 1))
            .collect();
        return PageNode::Form {
            transform,
            children,
        };
    }
    PageNode::Paint(paint_op(object))
}

fn fragment_from(text_object: &PdfPageTextObject, object: &PdfPageObject) -> Option<TextFragment> {
    let text = text_object.text();
    if text.is_empty() {
        return None;
    }
    let x = text_object.get_horizontal_translation().value;
    let y = text_object.get_vertical_translation().value;
    let mut fragment = TextFragment::new(
        text,
        text_object.font().name(),
        text_object.scaled_font_size().value,
        x,
        y,
    );
    if let (Ok(w), Ok(h)) = (object.width(), object.height()) {
        fragment = fragment.with_size(w.value, h.value);
    }
    Some(fragment)
}

fn paint_op(object: &PdfPageObject) -> PaintOp {
    match object.object_type() {
        PdfPageObjectType::Text => PaintOp::Text,
        PdfPageObjectType::Path => PaintOp::Path,
        PdfPageObjectType::Shading => PaintOp::Shading,
        PdfPageObjectType::XObjectForm => PaintOp::Form,
        PdfPageObjectType::Image => match object.as_image_object() {
            Some(image) if is_dct_encoded(image) => PaintOp::JpegXObject,
            _ => PaintOp::ImageXObject,
        },
        _ => PaintOp::Other,
    }
}

fn is_dct_encoded(image: &PdfPageImageObject) -> bool {
    image
        .filters()
        .iter()
        .any(|filter| is_dct_filter(filter.name()))
}

fn is_dct_filter(name: &str) -> bool {
    matches!(name.trim_start_matches('/'), "DCTDecode" | "DCT")
}

/// URI link annotations of the page. Annotations that are not links, or
/// whose action is not a URI, are ignored; unreadable ones are logged.
fn link_annotations(page: &PdfPage, page_num: usize) -> Vec<LinkAnnotation> {
    page.annotations()
        .iter()
        .filter_map(|annotation| {
            let link = match annotation.as_link_annotation()?.link() {
                Ok(link) => link,
                Err(e) => {
                    debug!("Page {page_num}: skipping link annotation without link ({e:?})");
                    return None;
                }
            };
            let url = match link.action()? {
                PdfAction::Uri(action) => match action.uri() {
                    Ok(uri) => uri,
                    Err(e) => {
                        debug!("Page {page_num}: skipping link with unreadable URI ({e:?})");
                        return None;
                    }
                },
                _ => return None,
            };
            let bounds = match annotation.bounds() {
                Ok(bounds) => bounds,
                Err(e) => {
                    debug!("Page {page_num}: skipping link to {url} without bounds ({e:?})");
                    return None;
                }
            };
            trace!("Page {}: link to {}", page_num, url);
            Some(LinkAnnotation {
                rect: [
                    bounds.left().value,
                    bounds.bottom().value,
                    bounds.right().value,
                    bounds.top().value,
                ],
                url,
            })
        })
        .collect()
}

/// Plain text of each page, in page order, for the core engine.
pub fn plain_text_pages(document: &PdfDocument) -> Result<Vec<String>, ConvertError> {
    document
        .pages()
        .iter()
        .enumerate()
        .map(|(idx, page)| {
            page.text().map(|text| text.all()).map_err(|e| {
                ConvertError::failure(format!("text extraction failed on page {}: {e:?}", idx + 1))
            })
        })
        .collect()
}

/// Core-engine Markdown: each page's text trimmed, empty pages skipped,
/// pages separated by a blank line.
pub fn join_plain_pages(pages: &[String]) -> String {
    pages
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}
