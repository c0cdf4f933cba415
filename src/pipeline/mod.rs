//! Pipeline stages for PDF-to-Markdown conversion.
//!
//! Each submodule implements one step. Only [`extract`] touches pdfium;
//! everything after it works on [`crate::model::PageSnapshot`]s and can be
//! tested without the native library.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ extract ──▶ lines ──▶ style ──▶ links ──▶ images ──▶ emit
//! (detect)  (pdfium)    (group)   (classify) (overlay) (presence) (Markdown)
//! ```
//!
//! 1. [`input`]   — pick the conversion direction; plan and write the output
//! 2. [`extract`] — snapshot fragments, link annotations and paint operators
//! 3. [`lines`]   — cluster fragments into visual lines by baseline
//! 4. [`style`]   — emphasis from font names, headings from size ratios,
//!    list markers
//! 5. [`links`]   — map annotation rectangles onto fragment positions
//! 6. [`images`]  — detect image-painting operators
//! 7. [`emit`]    — assemble Markdown lines and pages

pub mod emit;
pub mod extract;
pub mod images;
pub mod input;
pub mod lines;
pub mod links;
pub mod style;
