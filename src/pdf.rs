//! Single-page A4 posture report.
//!
//! Layout: title and date across the top, the annotated photograph on the left,
//! tilt measurements and joint angles in a column on the right. Text uses the
//! standard Helvetica fonts with WinAnsi encoding, the photograph is embedded as JPEG.

use std::io::Write;

use anyhow::{Context, Result};
use image::codecs::jpeg::JpegEncoder;
use image::RgbImage;

use crate::examination::Examination;
use crate::summary::{self, DEGENERATE_NOTE};

pub const PAGE_WIDTH: f32 = 595.0;
pub const PAGE_HEIGHT: f32 = 842.0;
const JPEG_QUALITY: u8 = 85;

const CATALOG: usize = 1;
const PAGES: usize = 2;
const PAGE: usize = 3;
const FONT_REGULAR: usize = 4;
const FONT_BOLD: usize = 5;
const PHOTO: usize = 6;
const CONTENTS: usize = 7;

fn mm(v: f32) -> f32 {
    v * 72.0 / 25.4
}

/// Text as a PDF literal string body. Characters outside Latin-1 become `?`.
fn encode_text(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '(' | ')' | '\\' => {
                out.push(b'\\');
                out.push(c as u8);
            }
            c if (c as u32) < 0x100 => out.push(c as u32 as u8),
            _ => out.push(b'?'),
        }
    }
    out
}

#[derive(Default)]
struct Content {
    ops: Vec<u8>,
}

impl Content {
    /// `top` is measured from the top edge of the page, in millimeters.
    fn text(&mut self, font: usize, size: f32, x: f32, top: f32, text: &str) -> Result<()> {
        let font_name = if font == FONT_BOLD { "F2" } else { "F1" };
        write!(
            self.ops,
            "BT /{} {} Tf {:.2} {:.2} Td (",
            font_name,
            size,
            x,
            PAGE_HEIGHT - mm(top)
        )?;
        self.ops.extend_from_slice(&encode_text(text));
        self.ops.extend_from_slice(b") Tj ET\n");
        Ok(())
    }

    fn centered(&mut self, font: usize, size: f32, top: f32, text: &str) -> Result<()> {
        // Helvetica averages about half an em per glyph
        let width = text.chars().count() as f32 * size * 0.5;
        self.text(font, size, ((PAGE_WIDTH - width) / 2.0).max(0.0), top, text)
    }

    fn image(&mut self, x: f32, top: f32, width: f32, height: f32) -> Result<()> {
        writeln!(
            self.ops,
            "q {:.2} 0 0 {:.2} {:.2} {:.2} cm /Im1 Do Q",
            width,
            height,
            x,
            PAGE_HEIGHT - mm(top) - height
        )?;
        Ok(())
    }
}

struct PdfWriter {
    buf: Vec<u8>,
    offsets: Vec<usize>,
}

impl PdfWriter {
    fn new() -> Self {
        let mut buf = Vec::new();
        buf.extend_from_slice(b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n");
        Self {
            buf,
            offsets: Vec::new(),
        }
    }

    fn object(&mut self, id: usize, dict: &str) -> Result<()> {
        self.begin(id)?;
        writeln!(self.buf, "{}\nendobj", dict)?;
        Ok(())
    }

    fn stream(&mut self, id: usize, dict: &str, data: &[u8]) -> Result<()> {
        self.begin(id)?;
        writeln!(self.buf, "<< {} /Length {} >>\nstream", dict, data.len())?;
        self.buf.extend_from_slice(data);
        writeln!(self.buf, "\nendstream\nendobj")?;
        Ok(())
    }

    fn begin(&mut self, id: usize) -> Result<()> {
        if id != self.offsets.len() + 1 {
            anyhow::bail!("pdf object {} written out of order", id);
        }
        self.offsets.push(self.buf.len());
        writeln!(self.buf, "{} 0 obj", id)?;
        Ok(())
    }

    fn finish(mut self, root: usize) -> Result<Vec<u8>> {
        let xref = self.buf.len();
        writeln!(self.buf, "xref\n0 {}", self.offsets.len() + 1)?;
        self.buf.extend_from_slice(b"0000000000 65535 f \n");
        for offset in &self.offsets {
            write!(self.buf, "{:010} 00000 n \n", offset)?;
        }
        write!(
            self.buf,
            "trailer\n<< /Size {} /Root {} 0 R >>\nstartxref\n{}\n%%EOF\n",
            self.offsets.len() + 1,
            root,
            xref
        )?;
        Ok(self.buf)
    }
}

fn encode_jpeg(img: &RgbImage) -> Result<Vec<u8>> {
    let mut jpeg = Vec::new();
    img.write_with_encoder(JpegEncoder::new_with_quality(&mut jpeg, JPEG_QUALITY))
        .context("encoding report photo")?;
    Ok(jpeg)
}

fn layout(exam: &Examination, photo: &RgbImage) -> Result<Vec<u8>> {
    let mut c = Content::default();
    let report = &exam.report;

    c.centered(
        FONT_BOLD,
        16.0,
        20.0,
        &format!("BILAN POSTURAL : {}", report.patient),
    )?;
    c.text(
        FONT_REGULAR,
        11.0,
        mm(10.0),
        30.0,
        &format!("Date de l'examen : {}", exam.date_label()),
    )?;

    let width = mm(110.0);
    let height = width * photo.height() as f32 / photo.width().max(1) as f32;
    let height = height.min(PAGE_HEIGHT - mm(60.0));
    c.image(mm(10.0), 40.0, width, height)?;

    let sections = summary::sections(exam);
    let column = mm(125.0);

    c.text(FONT_BOLD, 12.0, column, 50.0, "Mesures de bascule :")?;
    let mut top = 60.0;
    for (label, value) in &sections.tilts {
        c.text(FONT_REGULAR, 11.0, column, top, &format!("- {} : {}", label, value))?;
        top += 7.0;
    }

    c.text(FONT_BOLD, 12.0, column, 85.0, "Angles articulaires :")?;
    let mut top = 95.0;
    for (label, value) in &sections.joints {
        c.text(FONT_REGULAR, 11.0, column, top, &format!("- {} : {}", label, value))?;
        top += 7.0;
    }

    c.text(
        FONT_REGULAR,
        9.0,
        column,
        top + 8.0,
        &format!("Taille déclarée : {:.0} cm", report.declared_height_cm),
    )?;
    if !report.degenerate_fields().is_empty() {
        c.text(FONT_REGULAR, 9.0, column, top + 14.0, DEGENERATE_NOTE)?;
    }

    Ok(c.ops)
}

/// Render the examination and its annotated photograph as PDF bytes.
pub fn render(exam: &Examination, photo: &RgbImage) -> Result<Vec<u8>> {
    let contents = layout(exam, photo)?;
    let jpeg = encode_jpeg(photo)?;

    let mut w = PdfWriter::new();
    w.object(
        CATALOG,
        &format!("<< /Type /Catalog /Pages {} 0 R >>", PAGES),
    )?;
    w.object(
        PAGES,
        &format!("<< /Type /Pages /Kids [{} 0 R] /Count 1 >>", PAGE),
    )?;
    w.object(
        PAGE,
        &format!(
            "<< /Type /Page /Parent {} 0 R /MediaBox [0 0 {} {}] \
             /Resources << /Font << /F1 {} 0 R /F2 {} 0 R >> /XObject << /Im1 {} 0 R >> >> \
             /Contents {} 0 R >>",
            PAGES, PAGE_WIDTH, PAGE_HEIGHT, FONT_REGULAR, FONT_BOLD, PHOTO, CONTENTS
        ),
    )?;
    w.object(
        FONT_REGULAR,
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>",
    )?;
    w.object(
        FONT_BOLD,
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica-Bold /Encoding /WinAnsiEncoding >>",
    )?;
    w.stream(
        PHOTO,
        &format!(
            "/Type /XObject /Subtype /Image /Width {} /Height {} \
             /ColorSpace /DeviceRGB /BitsPerComponent 8 /Filter /DCTDecode",
            photo.width(),
            photo.height()
        ),
        &jpeg,
    )?;
    w.stream(CONTENTS, "", &contents)?;
    w.finish(CATALOG)
}

pub fn write(path: &std::path::Path, exam: &Examination, photo: &RgbImage) -> Result<()> {
    let bytes = render(exam, photo)?;
    std::fs::write(path, bytes).with_context(|| format!("writing report {}", path.display()))
}
