//! CLI binary for convert-pdf-md.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ConversionConfig` and reports where the result went.

use anyhow::{Context, Result};
use clap::Parser;
use convert_pdf_md::{
    convert_file_async, ConversionConfig, ConversionProgressCallback, EngineKind, FileConversion,
    InputKind, ProgressCallback,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

/// Terminal progress: a spinner until the page count is known, then a bar
/// advanced once per converted page.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);
        bar.set_style(spinner_style);
        bar.set_prefix("Converting");
        bar.set_message("Opening input…");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_conversion_start(&self, total_pages: usize) {
        if total_pages == 0 {
            self.bar.set_message("Laying out pages…");
            return;
        }
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  [{bar:42.green/238}] {pos:>3}/{len} pages  ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);
        self.bar.set_length(total_pages as u64);
        self.bar.set_style(style);
    }

    fn on_page_complete(&self, page_num: usize, total_pages: usize, markdown_len: usize) {
        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {}",
            green("✓"),
            page_num,
            total_pages,
            dim(&format!("{markdown_len:>5} chars")),
        ));
        self.bar.inc(1);
    }

    fn on_fallback(&self, reason: &str) {
        self.bar.println(format!(
            "  {} rich engine failed, using core engine  {}",
            yellow("⚠"),
            dim(reason)
        ));
    }

    fn on_conversion_complete(&self, _total_pages: usize) {
        self.bar.finish_and_clear();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # PDF → Markdown next to the input (report.md)
  convert-pdf-md report.pdf

  # Markdown → PDF at an explicit path, replacing it if present
  convert-pdf-md notes.md -o build/notes.pdf --force

  # Print the Markdown instead of writing a file
  convert-pdf-md report.pdf --stdout

  # Plain text extraction only
  convert-pdf-md report.pdf --engine core

  # Resolve images in Markdown against another directory
  convert-pdf-md README.md --base-dir docs/ --margin 72

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH         Path to libpdfium (file or directory)
  RUST_LOG                Override the log filter (e.g. convert_pdf_md=debug)
"#;

/// Convert between PDF and Markdown (direction chosen from the input).
#[derive(Parser, Debug)]
#[command(
    name = "convert-pdf-md",
    version,
    about = "Convert between PDF and Markdown (autodetects by extension)",
    long_about = "Convert a PDF to Markdown by inferring headings, emphasis, lists and links \
from the page layout, or render Markdown to a PDF. The direction is chosen from the input's \
extension; files without one are sniffed for the PDF header.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Input file: .pdf, or .md / .markdown / .mkd / .mdown.
    input: PathBuf,

    /// Write output to this path. Defaults to swapping the extension.
    #[arg(short = 'o', long = "out", env = "CONVERT_PDF_MD_OUT")]
    out: Option<PathBuf>,

    /// Write the result to stdout instead of a file.
    #[arg(long, env = "CONVERT_PDF_MD_STDOUT", conflicts_with = "out")]
    stdout: bool,

    /// Overwrite the output if it exists.
    #[arg(long, env = "CONVERT_PDF_MD_FORCE")]
    force: bool,

    /// Conversion engine.
    #[arg(long, env = "CONVERT_PDF_MD_ENGINE", value_enum, default_value = "rich")]
    engine: EngineArg,

    /// Directory for resolving relative image paths (Markdown input).
    /// Defaults to the input's directory.
    #[arg(long, env = "CONVERT_PDF_MD_BASE_DIR")]
    base_dir: Option<PathBuf>,

    /// Page margin in points for generated PDFs.
    #[arg(long, env = "CONVERT_PDF_MD_MARGIN", default_value_t = convert_pdf_md::config::DEFAULT_MARGIN)]
    margin: f32,

    /// Path to the pdfium shared library (file or directory).
    #[arg(long, env = "CONVERT_PDF_MD_PDFIUM_LIB")]
    pdfium_lib: Option<PathBuf>,

    /// Print a JSON report of the conversion instead of the summary line.
    #[arg(long, env = "CONVERT_PDF_MD_JSON", conflicts_with = "stdout")]
    json: bool,

    /// Disable the progress display.
    #[arg(long, env = "CONVERT_PDF_MD_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "CONVERT_PDF_MD_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "CONVERT_PDF_MD_QUIET", conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum EngineArg {
    /// Layout inference / token-tree rendering, falling back to core.
    Rich,
    /// Plain text extraction / line-based rendering only.
    Core,
}

impl From<EngineArg> for EngineKind {
    fn from(v: EngineArg) -> Self {
        match v {
            EngineArg::Rich => EngineKind::Rich,
            EngineArg::Core => EngineKind::Core,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress display replaces INFO-level library logs.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && !cli.stdout;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    match run(&cli, show_progress).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli, show_progress: bool) -> Result<()> {
    let progress: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn ConversionProgressCallback>)
    } else {
        None
    };
    let config = build_config(cli, progress)?;

    let report = convert_file_async(&cli.input, &config).await?;

    if cli.json {
        println!("{}", report_json(&report)?);
    } else if !cli.quiet {
        print_summary(&report);
    }
    Ok(())
}

/// Map CLI args to `ConversionConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ConversionConfig> {
    let mut builder = ConversionConfig::builder()
        .engine(cli.engine.into())
        .to_stdout(cli.stdout)
        .force(cli.force)
        .margin(cli.margin);

    if let Some(ref out) = cli.out {
        builder = builder.output(out);
    }
    if let Some(ref dir) = cli.base_dir {
        builder = builder.base_dir(dir);
    }
    if let Some(ref lib) = cli.pdfium_lib {
        builder = builder.pdfium_library(lib);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

fn report_json(report: &FileConversion) -> Result<String> {
    serde_json::to_string_pretty(report).context("Failed to serialise report")
}

fn print_summary(report: &FileConversion) {
    let Some(ref path) = report.output else {
        return;
    };
    println!("Wrote {}", absolute(path).display());

    let stats = &report.stats;
    let direction = match report.input_kind {
        InputKind::Pdf => "PDF → Markdown",
        InputKind::Markdown => "Markdown → PDF",
    };
    let mut line = format!(
        "{direction}: {} pages, {}ms",
        stats.page_count, stats.duration_ms
    );
    if stats.fell_back() {
        line.push_str(", fell back to core engine");
    }
    eprintln!("{}", dim(&line));
}

fn absolute(path: &Path) -> PathBuf {
    std::fs::canonicalize(path)
        .or_else(|_| std::path::absolute(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn engine_flag_maps_to_kind() {
        let cli = Cli::try_parse_from(["convert-pdf-md", "a.pdf", "--engine", "core"]).unwrap();
        assert_eq!(EngineKind::from(cli.engine), EngineKind::Core);
        let cli = Cli::try_parse_from(["convert-pdf-md", "a.pdf"]).unwrap();
        assert_eq!(EngineKind::from(cli.engine), EngineKind::Rich);
    }

    #[test]
    fn unknown_engine_is_rejected() {
        assert!(Cli::try_parse_from(["convert-pdf-md", "a.pdf", "--engine", "fast"]).is_err());
    }

    #[test]
    fn stdout_conflicts_with_out() {
        let res = Cli::try_parse_from(["convert-pdf-md", "a.pdf", "--stdout", "-o", "b.md"]);
        assert!(res.is_err());
    }

    #[test]
    fn json_report_fields() {
        use convert_pdf_md::ConversionStats;
        let report = FileConversion {
            input: PathBuf::from("report.pdf"),
            input_kind: InputKind::Pdf,
            output: Some(PathBuf::from("report.md")),
            stats: ConversionStats {
                requested_engine: EngineKind::Rich,
                engine_used: EngineKind::Core,
                page_count: 3,
                image_pages: 0,
                duration_ms: 12,
            },
        };
        let json: serde_json::Value = serde_json::from_str(&report_json(&report).unwrap()).unwrap();
        assert_eq!(json["input_kind"], "pdf");
        assert_eq!(json["output"], "report.md");
        assert_eq!(json["stats"]["engine_used"], "core");
        assert_eq!(json["stats"]["page_count"], 3);
    }

    #[test]
    fn flags_build_config() {
        let cli = Cli::try_parse_from([
            "convert-pdf-md",
            "notes.md",
            "-o",
            "out/notes.pdf",
            "--force",
            "--margin",
            "72",
            "--base-dir",
            "assets",
        ])
        .unwrap();
        let config = build_config(&cli, None).unwrap();
        assert!(config.force);
        assert_eq!(config.margin, 72.0);
        assert_eq!(config.output, Some(PathBuf::from("out/notes.pdf")));
        assert_eq!(config.base_dir, Some(PathBuf::from("assets")));
    }
}
