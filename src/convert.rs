//! Conversion entry points.
//!
//! The in-memory functions [`pdf_to_markdown`] and [`markdown_to_pdf`] take a
//! caller-owned [`PdfEngine`]. [`convert_file`] adds input detection and the
//! output side; [`convert_file_async`] does the same on tokio, binding its
//! own engine on a blocking worker.
//!
//! With [`EngineKind::Rich`] every conversion runs under [`with_fallback`]:
//! a recoverable rich-engine failure reruns the whole document through the
//! core engine.

use crate::config::{ConversionConfig, EngineKind};
use crate::engine::PdfEngine;
use crate::error::ConvertError;
use crate::output::{
    ConversionStats, FileConversion, InputKind, MarkdownOutput, PageResult, PdfOutput,
};
use crate::pipeline::{emit, extract, input};
use crate::progress::ProgressCallback;
use crate::render::{layout::LaidOutPage, paint, plain, rich};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Run `rich`; if it fails with a recoverable error, run `core` instead.
///
/// Returns the value together with the engine that produced it. Errors that
/// are not recoverable (see [`ConvertError::is_recoverable`]) surface from
/// `rich` unchanged, and a `core` failure always surfaces.
pub fn with_fallback<T>(
    rich: impl FnOnce() -> Result<T, ConvertError>,
    core: impl FnOnce() -> Result<T, ConvertError>,
    progress: Option<&ProgressCallback>,
) -> Result<(T, EngineKind), ConvertError> {
    match rich() {
        Ok(value) => Ok((value, EngineKind::Rich)),
        Err(e) if e.is_recoverable() => {
            warn!("Rich engine failed, falling back to core: {}", e);
            if let Some(cb) = progress {
                cb.on_fallback(&e.to_string());
            }
            core().map(|value| (value, EngineKind::Core))
        }
        Err(e) => Err(e),
    }
}

struct Recovered {
    markdown: String,
    pages: Vec<PageResult>,
    page_count: usize,
}

/// Convert PDF bytes to Markdown.
pub fn pdf_to_markdown(
    engine: &PdfEngine,
    bytes: &[u8],
    config: &ConversionConfig,
) -> Result<MarkdownOutput, ConvertError> {
    let start = Instant::now();
    let progress = config.progress_callback.as_ref();

    let (recovered, engine_used) = match config.engine {
        EngineKind::Rich => with_fallback(
            || rich_markdown(engine, bytes, progress),
            || core_markdown(engine, bytes, progress),
            progress,
        )?,
        EngineKind::Core => (core_markdown(engine, bytes, progress)?, EngineKind::Core),
    };

    let stats = ConversionStats {
        requested_engine: config.engine,
        engine_used,
        page_count: recovered.page_count,
        image_pages: recovered.pages.iter().filter(|p| p.has_image).count(),
        duration_ms: start.elapsed().as_millis() as u64,
    };
    if let Some(cb) = progress {
        cb.on_conversion_complete(stats.page_count);
    }
    info!(
        "PDF → Markdown: {} pages, {} bytes, engine={}, {}ms",
        stats.page_count,
        recovered.markdown.len(),
        stats.engine_used,
        stats.duration_ms
    );

    Ok(MarkdownOutput {
        markdown: recovered.markdown,
        pages: recovered.pages,
        stats,
    })
}

fn rich_markdown(
    engine: &PdfEngine,
    bytes: &[u8],
    progress: Option<&ProgressCallback>,
) -> Result<Recovered, ConvertError> {
    let document = engine.load(bytes)?;
    let snapshots = extract::snapshot_pages(&document);
    if let Some(cb) = progress {
        cb.on_conversion_start(snapshots.len());
    }
    let result = emit::emit_document(&snapshots, progress);
    Ok(Recovered {
        markdown: result.to_markdown(),
        page_count: result.pages.len(),
        pages: result.pages,
    })
}

fn core_markdown(
    engine: &PdfEngine,
    bytes: &[u8],
    progress: Option<&ProgressCallback>,
) -> Result<Recovered, ConvertError> {
    let document = engine.load(bytes)?;
    let texts = extract::plain_text_pages(&document)?;
    if let Some(cb) = progress {
        cb.on_conversion_start(texts.len());
    }
    Ok(Recovered {
        markdown: extract::join_plain_pages(&texts),
        pages: Vec::new(),
        page_count: texts.len(),
    })
}

/// Convert Markdown text to PDF bytes.
///
/// Relative image paths resolve against `config.base_dir`, or the working
/// directory when it is unset.
pub fn markdown_to_pdf(
    engine: &PdfEngine,
    markdown: &str,
    config: &ConversionConfig,
) -> Result<PdfOutput, ConvertError> {
    render_markdown(engine, markdown, config, config.base_dir.as_deref())
}

fn render_markdown(
    engine: &PdfEngine,
    markdown: &str,
    config: &ConversionConfig,
    base_dir: Option<&Path>,
) -> Result<PdfOutput, ConvertError> {
    let start = Instant::now();
    let progress = config.progress_callback.as_ref();
    if let Some(cb) = progress {
        cb.on_conversion_start(0);
    }

    let margin = config.margin;
    let paint_rich = || paint_layout(engine, rich::layout_markdown(markdown, margin, base_dir));
    let paint_core = || paint_layout(engine, plain::layout_plain(markdown, margin));

    let ((bytes, page_count), engine_used) = match config.engine {
        EngineKind::Rich => with_fallback(paint_rich, paint_core, progress)?,
        EngineKind::Core => (paint_core()?, EngineKind::Core),
    };

    let stats = ConversionStats {
        requested_engine: config.engine,
        engine_used,
        page_count,
        image_pages: 0,
        duration_ms: start.elapsed().as_millis() as u64,
    };
    if let Some(cb) = progress {
        cb.on_conversion_complete(page_count);
    }
    info!(
        "Markdown → PDF: {} pages, {} bytes, engine={}, {}ms",
        page_count,
        bytes.len(),
        engine_used,
        stats.duration_ms
    );

    Ok(PdfOutput { bytes, stats })
}

fn paint_layout(
    engine: &PdfEngine,
    pages: Vec<LaidOutPage>,
) -> Result<(Vec<u8>, usize), ConvertError> {
    let count = pages.len();
    let bytes = paint::paint_pages(engine, &pages)?;
    Ok((bytes, count))
}

/// Convert one file, choosing the direction from its extension or content.
///
/// The output path is checked before any conversion work; an existing file
/// is only replaced with `config.force`. With `config.to_stdout` the result
/// goes to standard output instead.
pub fn convert_file(
    engine: &PdfEngine,
    input_path: &Path,
    config: &ConversionConfig,
) -> Result<FileConversion, ConvertError> {
    info!("Converting {}", input_path.display());
    let (kind, bytes) = input::read_input(input_path)?;
    let target = input::plan_output(input_path, kind, config)?;

    let (out, stats) = convert_bytes(engine, input_path, kind, &bytes, config)?;
    match &target {
        Some(path) => input::write_output(path, &out, config.force)?,
        None => write_stdout(&out)?,
    }

    Ok(FileConversion {
        input: input_path.to_path_buf(),
        input_kind: kind,
        output: target,
        stats,
    })
}

/// Async [`convert_file`]: file I/O on `tokio::fs`, conversion on a
/// blocking worker that binds its own engine from `config`.
pub async fn convert_file_async(
    input_path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<FileConversion, ConvertError> {
    let input_path = input_path.as_ref().to_path_buf();
    info!("Converting {}", input_path.display());

    let bytes = tokio::fs::read(&input_path)
        .await
        .map_err(|source| ConvertError::InputReadFailed {
            path: input_path.clone(),
            source,
        })?;
    let kind = input::detect_kind(&input_path, &bytes)?;
    let target = input::plan_output(&input_path, kind, config)?;

    let task_config = config.clone();
    let task_input = input_path.clone();
    let (out, stats) = tokio::task::spawn_blocking(move || {
        let engine = PdfEngine::bind(&task_config)?;
        convert_bytes(&engine, &task_input, kind, &bytes, &task_config)
    })
    .await
    .map_err(|e| ConvertError::Internal(format!("Conversion task panicked: {e}")))??;

    match &target {
        Some(path) => input::write_output_async(path, &out, config.force).await?,
        None => {
            use tokio::io::AsyncWriteExt;
            let mut stdout = tokio::io::stdout();
            stdout.write_all(&out).await.map_err(stdout_error)?;
            stdout.flush().await.map_err(stdout_error)?;
        }
    }

    Ok(FileConversion {
        input: input_path,
        input_kind: kind,
        output: target,
        stats,
    })
}

fn convert_bytes(
    engine: &PdfEngine,
    input_path: &Path,
    kind: InputKind,
    bytes: &[u8],
    config: &ConversionConfig,
) -> Result<(Vec<u8>, ConversionStats), ConvertError> {
    match kind {
        InputKind::Pdf => {
            let output = pdf_to_markdown(engine, bytes, config)?;
            Ok((output.markdown.into_bytes(), output.stats))
        }
        InputKind::Markdown => {
            let text = std::str::from_utf8(bytes).map_err(|e| ConvertError::InputReadFailed {
                path: input_path.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::InvalidData, e),
            })?;
            let base_dir = config
                .base_dir
                .clone()
                .or_else(|| input_path.parent().map(Path::to_path_buf));
            debug!("Image base directory: {:?}", base_dir);
            let output = render_markdown(engine, text, config, base_dir.as_deref())?;
            Ok((output.bytes, output.stats))
        }
    }
}

fn write_stdout(bytes: &[u8]) -> Result<(), ConvertError> {
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(bytes).map_err(stdout_error)?;
    stdout.flush().map_err(stdout_error)
}

fn stdout_error(source: std::io::Error) -> ConvertError {
    ConvertError::OutputWriteFailed {
        path: PathBuf::from("<stdout>"),
        source,
    }
}
