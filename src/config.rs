//! Configuration types for PDF ⇄ Markdown conversion.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. The same config drives both
//! directions; fields that only apply to one direction (the image base
//! directory and page margin for Markdown-to-PDF) are simply ignored by the
//! other.

use crate::error::ConvertError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Default page margin in PDF points for generated documents.
pub const DEFAULT_MARGIN: f32 = 50.0;

/// Configuration for a conversion.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use convert_pdf_md::{ConversionConfig, EngineKind};
///
/// let config = ConversionConfig::builder()
///     .engine(EngineKind::Rich)
///     .force(true)
///     .margin(72.0)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Conversion engine. Default: [`EngineKind::Rich`].
    ///
    /// `Rich` runs the layout-inference pipeline and falls back to `Core` on
    /// recoverable failures; `Core` runs only the plain engine.
    pub engine: EngineKind,

    /// Output path. If None, the input's extension is swapped in place
    /// (`report.pdf` → `report.md`).
    pub output: Option<PathBuf>,

    /// Write the result to standard output instead of a file. Default: false.
    pub to_stdout: bool,

    /// Overwrite an existing output file. Default: false.
    pub force: bool,

    /// Directory against which relative image paths in Markdown are
    /// resolved. If None, the input file's directory is used by
    /// [`crate::convert::convert_file`], and the working directory by the
    /// in-memory entry points.
    pub base_dir: Option<PathBuf>,

    /// Uniform page margin (PDF points) for generated PDFs. Default: 50.
    pub margin: f32,

    /// Explicit path to a pdfium shared library. If None, `PDFIUM_LIB_PATH`,
    /// the working directory and the system library are tried in turn.
    pub pdfium_library: Option<PathBuf>,

    /// Optional per-page progress callback.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            engine: EngineKind::default(),
            output: None,
            to_stdout: false,
            force: false,
            base_dir: None,
            margin: DEFAULT_MARGIN,
            pdfium_library: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("engine", &self.engine)
            .field("output", &self.output)
            .field("to_stdout", &self.to_stdout)
            .field("force", &self.force)
            .field("base_dir", &self.base_dir)
            .field("margin", &self.margin)
            .field("pdfium_library", &self.pdfium_library)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn ConversionProgressCallback>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn engine(mut self, engine: EngineKind) -> Self {
        self.config.engine = engine;
        self
    }

    pub fn output(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.output = Some(path.into());
        self
    }

    pub fn to_stdout(mut self, v: bool) -> Self {
        self.config.to_stdout = v;
        self
    }

    pub fn force(mut self, v: bool) -> Self {
        self.config.force = v;
        self
    }

    pub fn base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.base_dir = Some(dir.into());
        self
    }

    pub fn margin(mut self, points: f32) -> Self {
        self.config.margin = points;
        self
    }

    pub fn pdfium_library(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdfium_library = Some(path.into());
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, ConvertError> {
        let c = &self.config;
        if !c.margin.is_finite() || c.margin <= 0.0 || c.margin >= 200.0 {
            return Err(ConvertError::InvalidConfig(format!(
                "Margin must be between 0 and 200 points (exclusive), got {}",
                c.margin
            )));
        }
        if c.to_stdout && c.output.is_some() {
            return Err(ConvertError::InvalidConfig(
                "Output path and stdout are mutually exclusive".into(),
            ));
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Which conversion engine to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    /// Layout inference (headings, lists, emphasis, links, images), with
    /// automatic fallback to `Core`. (default)
    #[default]
    Rich,
    /// Plain top-to-bottom text extraction / line-oriented rendering.
    Core,
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineKind::Rich => f.write_str("rich"),
            EngineKind::Core => f.write_str("core"),
        }
    }
}

impl FromStr for EngineKind {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "rich" => Ok(EngineKind::Rich),
            "core" => Ok(EngineKind::Core),
            other => Err(ConvertError::InvalidConfig(format!(
                "Unknown engine: {other} (expected \"rich\" or \"core\")"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = ConversionConfig::default();
        assert_eq!(c.engine, EngineKind::Rich);
        assert_eq!(c.margin, 50.0);
        assert!(!c.force);
        assert!(!c.to_stdout);
        assert!(c.output.is_none());
    }

    #[test]
    fn builder_sets_fields() {
        let c = ConversionConfig::builder()
            .engine(EngineKind::Core)
            .force(true)
            .base_dir("/tmp/assets")
            .margin(36.0)
            .build()
            .unwrap();
        assert_eq!(c.engine, EngineKind::Core);
        assert!(c.force);
        assert_eq!(c.base_dir, Some(PathBuf::from("/tmp/assets")));
        assert_eq!(c.margin, 36.0);
    }

    #[test]
    fn rejects_bad_margin() {
        for m in [0.0, -5.0, 250.0, f32::NAN] {
            let r = ConversionConfig::builder().margin(m).build();
            assert!(matches!(r, Err(ConvertError::InvalidConfig(_))), "margin {m}");
        }
    }

    #[test]
    fn rejects_stdout_with_output_path() {
        let r = ConversionConfig::builder()
            .output("out.md")
            .to_stdout(true)
            .build();
        assert!(r.is_err());
    }

    #[test]
    fn engine_kind_parses() {
        assert_eq!("rich".parse::<EngineKind>().unwrap(), EngineKind::Rich);
        assert_eq!(" CORE ".parse::<EngineKind>().unwrap(), EngineKind::Core);
        assert!("fancy".parse::<EngineKind>().is_err());
        assert_eq!(EngineKind::Core.to_string(), "core");
    }

    #[test]
    fn engine_kind_serialises_lowercase() {
        assert_eq!(serde_json::to_string(&EngineKind::Rich).unwrap(), "\"rich\"");
    }
}
