//! End-to-end integration tests for convert-pdf-md.
//!
//! These tests render real PDFs with pdfium and read them back. They skip
//! themselves when no pdfium library can be bound.
//!
//! Run with:
//!   PDFIUM_LIB_PATH=/path/to/libpdfium.so cargo test --test e2e -- --nocapture
//!
//! To restrict to a specific test:
//!   cargo test --test e2e round_trip -- --nocapture

use convert_pdf_md::{
    convert_file, convert_file_async, markdown_to_pdf, pdf_to_markdown, ConversionConfig,
    ConvertError, EngineKind, InputKind, PdfEngine,
};
use pdfium_render::prelude::*;
use regex::Regex;
use std::fs;

// ── Test helpers ─────────────────────────────────────────────────────────────

/// Bind pdfium or skip the test.
macro_rules! engine_or_skip {
    () => {{
        match PdfEngine::bind(&ConversionConfig::default()) {
            Ok(engine) => engine,
            Err(e) => {
                println!("SKIP: {e}");
                println!("      Set PDFIUM_LIB_PATH to a pdfium library to run e2e tests");
                return;
            }
        }
    }};
}

fn render(engine: &PdfEngine, markdown: &str) -> Vec<u8> {
    let output = markdown_to_pdf(engine, markdown, &ConversionConfig::default())
        .expect("Markdown renders");
    assert!(output.bytes.starts_with(b"%PDF-"), "output is not a PDF");
    output.bytes
}

fn read_back(engine: &PdfEngine, pdf: &[u8]) -> String {
    pdf_to_markdown(engine, pdf, &ConversionConfig::default())
        .expect("PDF converts")
        .markdown
}

fn letter() -> PdfPagePaperSize {
    PdfPagePaperSize::Custom(PdfPoints::new(612.0), PdfPoints::new(792.0))
}

/// One page showing "click" at (100, 700), covered by a URI link.
fn link_pdf(engine: &PdfEngine) -> Result<Vec<u8>, PdfiumError> {
    let mut document = engine.pdfium().create_new_pdf()?;
    let font = document.fonts_mut().helvetica();
    {
        let mut page = document.pages_mut().create_page_at_end(letter())?;
        page.objects_mut().create_text_object(
            PdfPoints::new(100.0),
            PdfPoints::new(700.0),
            "click",
            font,
            PdfPoints::new(12.0),
        )?;
        let mut link = page
            .annotations_mut()
            .create_link_annotation("https://example.com")?;
        link.set_bounds(PdfRect::new_from_values(695.0, 95.0, 712.0, 140.0))?;
    }
    document.save_to_bytes()
}

/// Re-import every page of `pdf` one-up onto new pages. pdfium wraps each
/// imported page in a form XObject, the way N-up and stamping tools do.
fn wrap_pages_in_forms(engine: &PdfEngine, pdf: &[u8]) -> Result<Vec<u8>, PdfiumError> {
    let source = engine.pdfium().load_pdf_from_byte_slice(pdf, None)?;
    let wrapped = source.pages().tile_into_new_document(1, 1, letter())?;
    wrapped.save_to_bytes()
}

fn first_page_has_form(engine: &PdfEngine, pdf: &[u8]) -> bool {
    let document = engine.pdfium().load_pdf_from_byte_slice(pdf, None).unwrap();
    let page = document.pages().get(0).unwrap();
    let has_form = page
        .objects()
        .iter()
        .any(|o| o.object_type() == PdfPageObjectType::XObjectForm);
    has_form
}

fn heading_level(md: &str, title: &str) -> usize {
    md.lines()
        .find(|l| l.trim_end().ends_with(title))
        .map(|l| l.chars().take_while(|&c| c == '#').count())
        .unwrap_or_else(|| panic!("{title:?} not found in:\n{md}"))
}

// ── Round trips ──────────────────────────────────────────────────────────────

#[test]
fn round_trip_title_and_body() {
    let engine = engine_or_skip!();
    let pdf = render(&engine, "# Title\n\nBody text.");
    let md = read_back(&engine, &pdf);
    println!("{md}");

    let heading = Regex::new(r"(?m)^#\s+Title").unwrap();
    assert!(heading.is_match(&md), "no title heading in:\n{md}");
    assert!(md.contains("Body text."), "body missing from:\n{md}");
}

#[test]
fn round_trip_bullets() {
    let engine = engine_or_skip!();
    let pdf = render(&engine, "Shopping:\n\n- First bullet\n- Second bullet\n");
    let md = read_back(&engine, &pdf);
    println!("{md}");

    let bullet = Regex::new(r"(?m)^\s*[-*]\s+First bullet").unwrap();
    assert!(bullet.is_match(&md), "first bullet missing from:\n{md}");
    let bullet = Regex::new(r"(?m)^\s*[-*]\s+Second bullet").unwrap();
    assert!(bullet.is_match(&md), "second bullet missing from:\n{md}");
}

#[test]
fn round_trip_keeps_heading_prominence() {
    let engine = engine_or_skip!();
    let pdf = render(
        &engine,
        "# Alpha\n\n## Beta\n\n### Gamma\n\nOne paragraph of body text.\n\nAnother one.\n",
    );
    let md = read_back(&engine, &pdf);
    println!("{md}");

    let (a, b, c) = (
        heading_level(&md, "Alpha"),
        heading_level(&md, "Beta"),
        heading_level(&md, "Gamma"),
    );
    assert!(a >= 1 && b >= 1 && c >= 1, "headings lost in:\n{md}");
    assert!(a <= b && b <= c, "prominence inverted ({a}, {b}, {c}) in:\n{md}");
}

#[test]
fn long_document_spans_pages() {
    let engine = engine_or_skip!();
    let body: String = (1..=120)
        .map(|i| format!("Paragraph number {i} of the long document.\n\n"))
        .collect();
    let output = markdown_to_pdf(&engine, &body, &ConversionConfig::default()).unwrap();
    assert!(output.stats.page_count > 1);

    let md = read_back(&engine, &output.bytes);
    assert!(md.contains("\n\n---\n\n"), "no page separator in output");
    assert!(md.contains("Paragraph number 120"));
}

#[test]
fn core_engine_is_deterministic() {
    let engine = engine_or_skip!();
    let pdf = render(&engine, "# Notes\n\nSome plain text.\n\n- item\n");
    let config = ConversionConfig::builder()
        .engine(EngineKind::Core)
        .build()
        .unwrap();

    let first = pdf_to_markdown(&engine, &pdf, &config).unwrap();
    let second = pdf_to_markdown(&engine, &pdf, &config).unwrap();
    assert_eq!(first.markdown, second.markdown);
    assert_eq!(first.stats.engine_used, EngineKind::Core);
    assert!(first.markdown.contains("Some plain text."));
}

#[test]
fn core_rendering_produces_a_pdf() {
    let engine = engine_or_skip!();
    let config = ConversionConfig::builder()
        .engine(EngineKind::Core)
        .build()
        .unwrap();
    let output =
        markdown_to_pdf(&engine, "# Plain\n\n```\ncode line\n```\n\n> quoted\n", &config).unwrap();
    assert!(output.bytes.starts_with(b"%PDF-"));
    assert_eq!(output.stats.engine_used, EngineKind::Core);

    let md = read_back(&engine, &output.bytes);
    assert!(md.contains("code line"), "code line missing from:\n{md}");
}

#[test]
fn link_annotation_becomes_markdown_link() {
    let engine = engine_or_skip!();
    let pdf = link_pdf(&engine).expect("link PDF builds");
    let md = read_back(&engine, &pdf);
    println!("{md}");
    assert!(md.contains("[click](https://example.com)"), "no link in:\n{md}");
}

#[test]
fn text_inside_form_xobject_is_extracted() {
    let engine = engine_or_skip!();
    let pdf = render(&engine, "# Title\n\nBody text.");
    let wrapped = wrap_pages_in_forms(&engine, &pdf).expect("pages re-import");
    assert!(first_page_has_form(&engine, &wrapped), "import did not produce a form");

    let output = pdf_to_markdown(&engine, &wrapped, &ConversionConfig::default()).unwrap();
    println!("{}", output.markdown);
    assert_eq!(output.stats.engine_used, EngineKind::Rich);
    assert!(output.markdown.contains("Title"), "{}", output.markdown);
    assert!(output.markdown.contains("Body text."), "{}", output.markdown);
}

#[test]
fn image_inside_form_xobject_is_detected() {
    let engine = engine_or_skip!();
    let png = image::RgbImage::from_pixel(8, 8, image::Rgb([30, 30, 200]));
    let mut bytes = std::io::Cursor::new(Vec::new());
    png.write_to(&mut bytes, image::ImageFormat::Png).unwrap();
    let uri = {
        use base64::Engine as _;
        base64::engine::general_purpose::STANDARD.encode(bytes.into_inner())
    };
    let pdf = render(&engine, &format!("Caption.\n\n![dot](data:image/png;base64,{uri})\n"));
    let wrapped = wrap_pages_in_forms(&engine, &pdf).expect("pages re-import");

    let md = read_back(&engine, &wrapped);
    println!("{md}");
    assert!(md.contains("Caption."), "{md}");
    assert!(md.contains("![image]"), "image marker missing from:\n{md}");
}

// ── Error paths ──────────────────────────────────────────────────────────────

#[test]
fn garbage_bytes_are_corrupt() {
    let engine = engine_or_skip!();
    let config = ConversionConfig::builder()
        .engine(EngineKind::Core)
        .build()
        .unwrap();
    let err = pdf_to_markdown(&engine, b"%PDF-1.7 this is not a pdf", &config).unwrap_err();
    assert!(matches!(err, ConvertError::CorruptPdf { .. }), "{err:?}");
}

// ── File conversions ─────────────────────────────────────────────────────────

#[test]
fn convert_file_both_directions() {
    let engine = engine_or_skip!();
    let dir = tempfile::tempdir().unwrap();
    let md_path = dir.path().join("notes.md");
    fs::write(&md_path, "# Notes\n\nHello from a file.\n").unwrap();

    let config = ConversionConfig::default();
    let to_pdf = convert_file(&engine, &md_path, &config).unwrap();
    assert_eq!(to_pdf.input_kind, InputKind::Markdown);
    let pdf_path = to_pdf.output.clone().unwrap();
    assert_eq!(pdf_path, dir.path().join("notes.pdf"));
    assert!(fs::read(&pdf_path).unwrap().starts_with(b"%PDF-"));

    let out_md = dir.path().join("back.md");
    let config = ConversionConfig::builder().output(&out_md).build().unwrap();
    let to_md = convert_file(&engine, &pdf_path, &config).unwrap();
    assert_eq!(to_md.input_kind, InputKind::Pdf);
    let text = fs::read_to_string(&out_md).unwrap();
    assert!(text.contains("Hello from a file."), "{text}");
}

#[test]
fn convert_file_refuses_overwrite() {
    let engine = engine_or_skip!();
    let dir = tempfile::tempdir().unwrap();
    let md_path = dir.path().join("doc.md");
    let pdf_path = dir.path().join("doc.pdf");
    fs::write(&md_path, "Body.\n").unwrap();
    fs::write(&pdf_path, "not replaced").unwrap();

    let err = convert_file(&engine, &md_path, &ConversionConfig::default()).unwrap_err();
    assert!(matches!(err, ConvertError::OutputExists { .. }));
    assert_eq!(fs::read_to_string(&pdf_path).unwrap(), "not replaced");

    let forced = ConversionConfig::builder().force(true).build().unwrap();
    convert_file(&engine, &md_path, &forced).unwrap();
    assert!(fs::read(&pdf_path).unwrap().starts_with(b"%PDF-"));
}

#[test]
fn extensionless_pdf_is_detected() {
    let engine = engine_or_skip!();
    let dir = tempfile::tempdir().unwrap();
    let blob = dir.path().join("download");
    fs::write(&blob, render(&engine, "Sniffed content.")).unwrap();

    let report = convert_file(&engine, &blob, &ConversionConfig::default()).unwrap();
    assert_eq!(report.input_kind, InputKind::Pdf);
    let out = report.output.unwrap();
    assert_eq!(out, dir.path().join("download.md"));
    assert!(fs::read_to_string(out).unwrap().contains("Sniffed content."));
}

#[test]
fn markdown_images_resolve_against_input_dir() {
    let engine = engine_or_skip!();
    let dir = tempfile::tempdir().unwrap();
    let png = image::RgbImage::from_pixel(8, 8, image::Rgb([200, 30, 30]));
    png.save(dir.path().join("dot.png")).unwrap();
    let md_path = dir.path().join("pic.md");
    fs::write(&md_path, "Caption.\n\n![dot](dot.png)\n").unwrap();

    let report = convert_file(&engine, &md_path, &ConversionConfig::default()).unwrap();
    let pdf = fs::read(report.output.unwrap()).unwrap();
    let md = read_back(&engine, &pdf);
    assert!(md.contains("![image]"), "image not detected in:\n{md}");
}

#[tokio::test]
async fn async_conversion_writes_output() {
    // Only to decide whether pdfium is present; the async path binds its own.
    let _engine = engine_or_skip!();
    let dir = tempfile::tempdir().unwrap();
    let md_path = dir.path().join("async.md");
    tokio::fs::write(&md_path, "# Async\n\nDone.\n").await.unwrap();

    let report = convert_file_async(&md_path, &ConversionConfig::default())
        .await
        .unwrap();
    let out = report.output.unwrap();
    assert!(tokio::fs::read(&out).await.unwrap().starts_with(b"%PDF-"));
    assert_eq!(report.stats.requested_engine, EngineKind::Rich);
}
