//! Error types for the convert-pdf-md library.
//!
//! One enum, [`ConvertError`], covers every failure the library reports.
//! Variants fall into two groups:
//!
//! * **Recoverable** — the rich engine tripped over the document itself
//!   (malformed structure, an unreadable object). [`crate::convert`] catches
//!   these and reruns the whole document through the core engine.
//!
//! * **Fatal** — the request cannot be satisfied by any engine: the input
//!   type is unsupported, the output already exists, pdfium is missing, or
//!   the file system refused a read/write. These always surface.
//!
//! Narrower feature failures (an image that cannot be decoded, a page whose
//! paint operators cannot be inspected) never become a `ConvertError`; the
//! stage that hits them logs at `debug` and treats the feature as absent.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the convert-pdf-md library.
#[derive(Debug, Error)]
pub enum ConvertError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Extension absent or not one of the PDF/Markdown families, and the
    /// content does not start with the PDF magic.
    #[error("Unsupported input type for '{path}'\nSupported: .pdf, .md, .markdown, .mkd, .mdown")]
    UnsupportedInputType { path: PathBuf },

    /// The input could not be read.
    #[error("Failed to read input '{path}': {source}")]
    InputReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Output errors ─────────────────────────────────────────────────────
    /// Output file exists and overwriting was not requested.
    #[error("Refusing to overwrite existing file without --force: {path}")]
    OutputExists { path: PathBuf },

    /// Could not create or write the output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF is corrupt: {detail}")]
    CorruptPdf { detail: String },

    /// PDF requires a password; encrypted documents are not supported.
    #[error("PDF is encrypted and requires a password")]
    PasswordRequired,

    /// The rich pipeline failed for any reason tied to the document.
    #[error("Conversion failed: {detail}")]
    ConversionFailure { detail: String },

    // ── Engine errors ─────────────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
You can:\n\
  • Set PDFIUM_LIB_PATH=/path/to/libpdfium to use an existing copy.\n\
  • Pass --pdfium-lib /path/to/libpdfium.\n\
  • Install pdfium system-wide.\n"
    )]
    EngineUnavailable(String),

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ConvertError {
    /// Shorthand for a [`ConvertError::ConversionFailure`].
    pub fn failure(detail: impl Into<String>) -> Self {
        ConvertError::ConversionFailure {
            detail: detail.into(),
        }
    }

    /// Whether the core engine should be tried after the rich engine failed
    /// with this error.
    ///
    /// Only document-level failures qualify. Engine, configuration and I/O
    /// errors would fail the core engine in exactly the same way, and
    /// `OutputExists`/`UnsupportedInputType` must always reach the caller.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ConvertError::ConversionFailure { .. } | ConvertError::CorruptPdf { .. }
        )
    }
}
