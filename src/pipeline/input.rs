//! File resolution: input type detection, output path planning, and the
//! final write.
//!
//! The direction of a conversion is chosen from the input's extension. An
//! unknown or missing extension falls back to sniffing the `%PDF-` magic;
//! anything else is rejected before an engine is touched. The overwrite
//! check also runs before conversion, so a refused run does no work.

use crate::config::ConversionConfig;
use crate::error::ConvertError;
use crate::output::InputKind;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Leading bytes of every PDF file.
pub const PDF_MAGIC: &[u8] = b"%PDF-";

/// Extensions treated as Markdown, compared case-insensitively.
pub const MARKDOWN_EXTENSIONS: [&str; 4] = ["md", "markdown", "mkd", "mdown"];

/// Conversion direction implied by the file extension alone.
pub fn kind_from_extension(path: &Path) -> Option<InputKind> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    if ext == "pdf" {
        Some(InputKind::Pdf)
    } else if MARKDOWN_EXTENSIONS.contains(&ext.as_str()) {
        Some(InputKind::Markdown)
    } else {
        None
    }
}

/// Decide the conversion direction from the extension, then the content.
pub fn detect_kind(path: &Path, content: &[u8]) -> Result<InputKind, ConvertError> {
    if let Some(kind) = kind_from_extension(path) {
        return Ok(kind);
    }
    if content.starts_with(PDF_MAGIC) {
        debug!("{}: no known extension, PDF magic found", path.display());
        return Ok(InputKind::Pdf);
    }
    Err(ConvertError::UnsupportedInputType {
        path: path.to_path_buf(),
    })
}

/// Read the whole input and classify it.
pub fn read_input(path: &Path) -> Result<(InputKind, Vec<u8>), ConvertError> {
    let bytes = fs::read(path).map_err(|source| ConvertError::InputReadFailed {
        path: path.to_path_buf(),
        source,
    })?;
    let kind = detect_kind(path, &bytes)?;
    debug!("Read {} ({} bytes) as {:?}", path.display(), bytes.len(), kind);
    Ok((kind, bytes))
}

/// The input path with its extension swapped for the opposite format.
pub fn default_output_path(input: &Path, kind: InputKind) -> PathBuf {
    match kind {
        InputKind::Pdf => input.with_extension("md"),
        InputKind::Markdown => input.with_extension("pdf"),
    }
}

/// Where the result goes: `None` for standard output, otherwise the explicit
/// output path or the default sibling of the input.
pub fn plan_output(
    input: &Path,
    kind: InputKind,
    config: &ConversionConfig,
) -> Result<Option<PathBuf>, ConvertError> {
    if config.to_stdout {
        return Ok(None);
    }
    let path = config
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(input, kind));
    ensure_writable(&path, config.force)?;
    Ok(Some(path))
}

/// Refuse an existing output path unless overwriting was requested.
pub fn ensure_writable(path: &Path, force: bool) -> Result<(), ConvertError> {
    if !force && path.exists() {
        return Err(ConvertError::OutputExists {
            path: path.to_path_buf(),
        });
    }
    Ok(())
}

/// Write the output, creating missing parent directories.
///
/// Without `force` the file is created exclusively, so a file that appeared
/// since [`ensure_writable`] is still not clobbered. With `force` the bytes
/// go to a temporary file in the same directory which then replaces the
/// target.
pub fn write_output(path: &Path, bytes: &[u8], force: bool) -> Result<(), ConvertError> {
    let write_err = |source| ConvertError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).map_err(write_err)?;

    if force {
        let mut tmp = tempfile::NamedTempFile::new_in(parent).map_err(write_err)?;
        tmp.write_all(bytes).map_err(write_err)?;
        tmp.persist(path).map_err(|e| write_err(e.error))?;
    } else {
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .map_err(|e| match e.kind() {
                ErrorKind::AlreadyExists => ConvertError::OutputExists {
                    path: path.to_path_buf(),
                },
                _ => write_err(e),
            })?;
        file.write_all(bytes).map_err(write_err)?;
    }

    debug!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

/// Async counterpart of [`write_output`] on `tokio::fs`. With `force` the
/// bytes are staged in a sibling `*.tmp` file and renamed over the target.
pub async fn write_output_async(path: &Path, bytes: &[u8], force: bool) -> Result<(), ConvertError> {
    use tokio::io::AsyncWriteExt;

    let write_err = |source| ConvertError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
    }

    if force {
        let tmp_path = staging_path(path);
        tokio::fs::write(&tmp_path, bytes).await.map_err(write_err)?;
        if let Err(e) = tokio::fs::rename(&tmp_path, path).await {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(write_err(e));
        }
    } else {
        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::AlreadyExists => ConvertError::OutputExists {
                    path: path.to_path_buf(),
                },
                _ => write_err(e),
            })?;
        file.write_all(bytes).await.map_err(write_err)?;
        file.flush().await.map_err(write_err)?;
    }

    debug!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(format!(".{}.tmp", std::process::id()));
    path.with_file_name(name)
}
