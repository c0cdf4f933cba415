//! pdfium binding, owned by the caller.
//!
//! Binding a pdfium library is relatively expensive and must happen once per
//! thread that uses it, so the library never binds implicitly: callers build a
//! [`PdfEngine`] and pass it to the conversion functions.
//!
//! Lookup order:
//!
//! 1. [`ConversionConfig::pdfium_library`] (file or directory)
//! 2. the `PDFIUM_LIB_PATH` environment variable (file or directory)
//! 3. the platform library name in the current directory
//! 4. the system library search path

use crate::config::ConversionConfig;
use crate::error::ConvertError;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Environment variable pointing at a pdfium library or its directory.
pub const PDFIUM_LIB_PATH_ENV: &str = "PDFIUM_LIB_PATH";

/// A bound pdfium library.
pub struct PdfEngine {
    pdfium: Pdfium,
}

impl std::fmt::Debug for PdfEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PdfEngine").finish_non_exhaustive()
    }
}

impl PdfEngine {
    /// Bind pdfium following the lookup order in the module docs.
    pub fn bind(config: &ConversionConfig) -> Result<Self, ConvertError> {
        if let Some(path) = &config.pdfium_library {
            return Self::bind_at(path);
        }
        if let Ok(path) = std::env::var(PDFIUM_LIB_PATH_ENV) {
            return Self::bind_at(Path::new(&path));
        }

        let bindings = Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library())
            .map_err(|e| ConvertError::EngineUnavailable(e.to_string()))?;
        info!("Bound pdfium from the working directory or system path");
        Ok(Self::from_pdfium(Pdfium::new(bindings)))
    }

    /// Bind pdfium from an explicit library file, or a directory holding the
    /// platform library.
    pub fn bind_at(path: &Path) -> Result<Self, ConvertError> {
        let lib = library_file(path);
        let bindings = Pdfium::bind_to_library(&lib).map_err(|e| {
            ConvertError::EngineUnavailable(format!("{} ({e})", lib.display()))
        })?;
        info!("Bound pdfium: {}", lib.display());
        Ok(Self::from_pdfium(Pdfium::new(bindings)))
    }

    /// Wrap an already bound library.
    pub fn from_pdfium(pdfium: Pdfium) -> Self {
        Self { pdfium }
    }

    pub fn pdfium(&self) -> &Pdfium {
        &self.pdfium
    }

    /// Open a PDF held in memory.
    ///
    /// Encrypted documents map to [`ConvertError::PasswordRequired`]; any
    /// other load failure is [`ConvertError::CorruptPdf`].
    pub fn load<'a>(&'a self, bytes: &'a [u8]) -> Result<PdfDocument<'a>, ConvertError> {
        let document = self
            .pdfium
            .load_pdf_from_byte_slice(bytes, None)
            .map_err(map_load_error)?;
        debug!("Loaded PDF: {} pages", document.pages().len());
        Ok(document)
    }
}

fn library_file(path: &Path) -> PathBuf {
    if path.is_dir() {
        Pdfium::pdfium_platform_library_name_at_path(path)
    } else {
        path.to_path_buf()
    }
}

fn map_load_error(err: PdfiumError) -> ConvertError {
    let detail = format!("{err:?}");
    if detail.contains("Password") || detail.contains("password") {
        ConvertError::PasswordRequired
    } else {
        ConvertError::CorruptPdf { detail }
    }
}
