//! # convert-pdf-md
//!
//! Convert between PDF and Markdown in both directions.
//!
//! PDF → Markdown infers structure from layout alone. Text fragments are
//! grouped into visual lines by baseline, font names give emphasis, font
//! sizes relative to the document median give heading levels, link
//! annotations are matched to fragments by position, and pages that paint
//! images get an `![image]` placeholder.
//!
//! Markdown → PDF lays the token tree out on US Letter pages with the
//! standard Helvetica and Courier fonts.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF ──▶ extract ──▶ lines ──▶ style ──▶ links ──▶ images ──▶ emit ──▶ Markdown
//!         (pdfium)   (baseline  (bold,    (annot.   (paint     (lines,
//!                     clusters)  headings) rects)    ops)       pages)
//!
//! Markdown ──▶ tokens ──▶ layout ──▶ paint ──▶ PDF
//!             (pulldown   (cursor,   (pdfium)
//!              -cmark)     wrapping)
//! ```
//!
//! Both directions have a rich engine and a plain core engine. With the
//! default [`EngineKind::Rich`], a recoverable failure of the rich engine
//! reruns the whole document through the core engine.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use convert_pdf_md::{pdf_to_markdown, ConversionConfig, PdfEngine};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::default();
//!     let engine = PdfEngine::bind(&config)?;
//!     let bytes = std::fs::read("document.pdf")?;
//!     let output = pdf_to_markdown(&engine, &bytes, &config)?;
//!     println!("{}", output.markdown);
//!     eprintln!("{} pages via {}", output.stats.page_count, output.stats.engine_used);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `convert-pdf-md` binary (clap + anyhow + tracing-subscriber + indicatif + serde_json) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! convert-pdf-md = { version = "0.3", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod engine;
pub mod error;
pub mod model;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod render;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionConfig, ConversionConfigBuilder, EngineKind};
pub use convert::{
    convert_file, convert_file_async, markdown_to_pdf, pdf_to_markdown, with_fallback,
};
pub use engine::PdfEngine;
pub use error::ConvertError;
pub use model::{LinkAnnotation, PageSnapshot, PaintOp, TextFragment, VisualLine};
pub use output::{
    ConversionStats, DocumentResult, FileConversion, InputKind, MarkdownOutput, PageResult,
    PdfOutput,
};
pub use pipeline::emit::emit_document;
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback};
