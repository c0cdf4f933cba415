//! Link overlay: attach annotation URLs to fragments by position.
//!
//! Annotation rectangles arrive in PDF space with corners in arbitrary
//! order. Each one is taken through viewport space (top-left origin) to get
//! a normalised min corner, width and height, then flipped back with
//! `viewport_height - y - h` so the stored rectangle shares the coordinate
//! space of fragment baselines.
//!
//! Hit-testing uses the fragment's own `(x, y)` origin. Overlapping
//! rectangles resolve to the first one in annotation order.

use crate::model::{LinkAnnotation, LinkRect};

impl LinkRect {
    /// Normalise a raw annotation rectangle for a page of the given height.
    pub fn from_annotation(annotation: &LinkAnnotation, viewport_height: f32) -> Self {
        let [x1, y1, x2, y2] = annotation.rect;
        // Viewport transform at scale 1: (x, y) → (x, height - y).
        let (vx1, vy1) = (x1, viewport_height - y1);
        let (vx2, vy2) = (x2, viewport_height - y2);

        let x = vx1.min(vx2);
        let vy = vy1.min(vy2);
        let w = (vx2 - vx1).abs();
        let h = (vy2 - vy1).abs();

        Self {
            x,
            y: viewport_height - vy - h,
            w,
            h,
            url: annotation.url.clone(),
        }
    }

    /// Inclusive point-in-rectangle test.
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x <= self.x + self.w && y >= self.y && y <= self.y + self.h
    }
}

/// All link rectangles of one page, in annotation order.
#[derive(Debug, Clone, Default)]
pub struct LinkOverlay {
    rects: Vec<LinkRect>,
}

impl LinkOverlay {
    /// Build the overlay for a page. Annotations without a URL are skipped.
    pub fn from_annotations(annotations: &[LinkAnnotation], viewport_height: f32) -> Self {
        let rects = annotations
            .iter()
            .filter(|a| !a.url.trim().is_empty())
            .map(|a| LinkRect::from_annotation(a, viewport_height))
            .collect();
        Self { rects }
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    /// URL of the first rectangle containing the point.
    pub fn url_at(&self, x: f32, y: f32) -> Option<&str> {
        self.rects
            .iter()
            .find(|r| r.contains(x, y))
            .map(|r| r.url.as_str())
    }
}
