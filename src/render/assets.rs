//! Image sources referenced from Markdown.
//!
//! A source is either a `data:image/png;base64,…` / `data:image/jpeg;…` URI
//! or a file path, resolved against the base directory when relative. An
//! image that cannot be resolved or decoded is simply absent: the failure
//! is logged at `debug` and the document renders without it.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::DynamicImage;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};
use tracing::debug;

static RE_DATA_URI: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^data:image/(png|jpeg);base64,").unwrap());

/// Load the image behind `src`, or None if it cannot be had.
pub fn resolve_image(src: &str, base_dir: Option<&Path>) -> Option<DynamicImage> {
    match load(src, base_dir) {
        Ok(image) => {
            debug!("Image {}: {}x{}", short(src), image.width(), image.height());
            Some(image)
        }
        Err(reason) => {
            debug!("Skipping image {}: {}", short(src), reason);
            None
        }
    }
}

fn load(src: &str, base_dir: Option<&Path>) -> Result<DynamicImage, String> {
    if let Some(m) = RE_DATA_URI.find(src) {
        let bytes = STANDARD
            .decode(src[m.end()..].trim())
            .map_err(|e| format!("bad base64: {e}"))?;
        return image::load_from_memory(&bytes).map_err(|e| e.to_string());
    }
    if src.starts_with("http://") || src.starts_with("https://") || src.starts_with("data:") {
        return Err("unsupported image source".to_string());
    }
    let path = resolve_path(src, base_dir);
    image::open(&path).map_err(|e| format!("{}: {e}", path.display()))
}

/// `src` joined to the base directory unless it is already absolute.
pub fn resolve_path(src: &str, base_dir: Option<&Path>) -> PathBuf {
    let path = Path::new(src);
    match base_dir {
        Some(base) if path.is_relative() => base.join(path),
        _ => path.to_path_buf(),
    }
}

/// Scale `(w, h)` proportionally to fit inside `(max_w, max_h)`.
pub fn fit_within(w: f32, h: f32, max_w: f32, max_h: f32) -> (f32, f32) {
    if w <= 0.0 || h <= 0.0 {
        return (0.0, 0.0);
    }
    let scale = (max_w / w).min(max_h / h);
    (w * scale, h * scale)
}

fn short(src: &str) -> &str {
    match src.char_indices().nth(48) {
        Some((idx, _)) => &src[..idx],
        None => src,
    }
}
