//! Image presence detection from a page's paint operators.
//!
//! This is a presence marker only: the page gets a single `![image]`
//! placeholder no matter how many images it paints, and nothing is
//! extracted.

use crate::model::PageSnapshot;
use tracing::debug;

/// Placeholder paragraph appended after the text of a page with images.
pub const IMAGE_PLACEHOLDER: &str = "![image]";

/// Whether the page paints at least one raster, inline or JPEG image.
///
/// A page whose operators could not be inspected counts as image-free.
pub fn page_has_image(page: &PageSnapshot, page_num: usize) -> bool {
    match &page.paint_ops {
        Ok(ops) => ops.iter().any(|op| op.paints_image()),
        Err(reason) => {
            debug!("Page {page_num}: paint operators unavailable ({reason}); assuming no images");
            false
        }
    }
}
