//! Replay laid-out pages onto a new pdfium document and serialise it.

use crate::engine::PdfEngine;
use crate::error::ConvertError;
use crate::render::layout::{DrawOp, Font, LaidOutPage, PAGE_HEIGHT, PAGE_WIDTH};
use pdfium_render::prelude::*;
use tracing::debug;

const STROKE_WIDTH: f32 = 1.0;

struct Fonts {
    regular: PdfFontToken,
    bold: PdfFontToken,
    italic: PdfFontToken,
    bold_italic: PdfFontToken,
    mono: PdfFontToken,
}

impl Fonts {
    fn load(document: &mut PdfDocument) -> Self {
        let fonts = document.fonts_mut();
        Self {
            regular: fonts.helvetica(),
            bold: fonts.helvetica_bold(),
            italic: fonts.helvetica_oblique(),
            bold_italic: fonts.helvetica_bold_oblique(),
            mono: fonts.courier(),
        }
    }

    fn token(&self, font: Font) -> PdfFontToken {
        match font {
            Font::Regular => self.regular,
            Font::Bold => self.bold,
            Font::Italic => self.italic,
            Font::BoldItalic => self.bold_italic,
            Font::Mono => self.mono,
        }
    }
}

/// Paint every page and return the PDF bytes.
pub fn paint_pages(engine: &PdfEngine, pages: &[LaidOutPage]) -> Result<Vec<u8>, ConvertError> {
    let mut document = engine.pdfium().create_new_pdf().map_err(paint_error)?;
    let fonts = Fonts::load(&mut document);

    for (idx, laid_out) in pages.iter().enumerate() {
        let mut page = document
            .pages_mut()
            .create_page_at_end(PdfPagePaperSize::Custom(
                PdfPoints::new(PAGE_WIDTH),
                PdfPoints::new(PAGE_HEIGHT),
            ))
            .map_err(paint_error)?;

        for op in &laid_out.ops {
            paint_op(&mut page, op, &fonts).map_err(paint_error)?;
        }
        debug!("Painted page {}: {} ops", idx + 1, laid_out.ops.len());
    }

    document.save_to_bytes().map_err(paint_error)
}

fn paint_op(page: &mut PdfPage, op: &DrawOp, fonts: &Fonts) -> Result<(), PdfiumError> {
    let objects = page.objects_mut();
    match op {
        DrawOp::Text {
            x,
            y,
            text,
            font,
            size,
        } => {
            objects.create_text_object(
                PdfPoints::new(*x),
                PdfPoints::new(*y),
                text,
                fonts.token(*font),
                PdfPoints::new(*size),
            )?;
        }
        DrawOp::Rect { x, y, w, h, fill } => {
            let rect = PdfRect::new_from_values(*y, *x, *y + *h, *x + *w);
            match fill {
                Some(grey) => objects.create_path_object_rect(
                    rect,
                    None,
                    None,
                    Some(PdfColor::new(*grey, *grey, *grey, 255)),
                )?,
                None => objects.create_path_object_rect(
                    rect,
                    Some(PdfColor::new(0, 0, 0, 255)),
                    Some(PdfPoints::new(STROKE_WIDTH)),
                    None,
                )?,
            };
        }
        DrawOp::Line { x1, y1, x2, y2 } => {
            objects.create_path_object_line(
                PdfPoints::new(*x1),
                PdfPoints::new(*y1),
                PdfPoints::new(*x2),
                PdfPoints::new(*y2),
                PdfColor::new(0, 0, 0, 255),
                PdfPoints::new(STROKE_WIDTH),
            )?;
        }
        DrawOp::Image { x, y, w, h, image } => {
            // A broken image is left out, the rest of the page still paints.
            if let Err(e) = objects.create_image_object(
                PdfPoints::new(*x),
                PdfPoints::new(*y),
                image,
                Some(PdfPoints::new(*w)),
                Some(PdfPoints::new(*h)),
            ) {
                debug!("Skipping image at ({x}, {y}): {e:?}");
            }
        }
    }
    Ok(())
}

fn paint_error(err: PdfiumError) -> ConvertError {
    ConvertError::failure(format!("PDF generation failed: {err:?}"))
}
