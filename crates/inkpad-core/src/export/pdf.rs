//! Minimal PDF assembly for paginated image exports.
//!
//! Each page carries one JPEG band of the rendered view, drawn at the top
//! margin with the full usable width.

use std::fmt::Write as _;
use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, RgbImage};

use super::layout::{PageBand, PageGeometry, PageLayout};
use crate::{Error, Result};

const PDF_HEADER: &[u8] = b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n";
const PRODUCER: &str = "inkpad";

/// Render `view` into a PDF following `layout`.
pub fn render_pdf(
    view: &RgbImage,
    layout: &PageLayout,
    geometry: PageGeometry,
    jpeg_quality: u8,
    title: &str,
) -> Result<Vec<u8>> {
    if layout.bands.is_empty() {
        return Err(Error::Document("Layout has no pages".to_string()));
    }

    let mut writer = PdfWriter::new();
    let catalog_id = writer.allocate();
    let pages_id = writer.allocate();
    let info_id = writer.allocate();

    let page_ids = layout
        .bands
        .iter()
        .map(|band| {
            let page = writer.allocate();
            let content = writer.allocate();
            let image = (band.source_height_px > 0).then(|| writer.allocate());
            (page, content, image)
        })
        .collect::<Vec<_>>();

    writer.object(
        catalog_id,
        &format!("<< /Type /Catalog /Pages {pages_id} 0 R >>"),
    );

    let kids = page_ids
        .iter()
        .map(|(page, _, _)| format!("{page} 0 R"))
        .collect::<Vec<_>>()
        .join(" ");
    writer.object(
        pages_id,
        &format!(
            "<< /Type /Pages /Kids [{kids}] /Count {} >>",
            page_ids.len()
        ),
    );

    writer.object(
        info_id,
        &format!(
            "<< /Title {} /Producer {} >>",
            pdf_text_string(title),
            pdf_text_string(PRODUCER)
        ),
    );

    for (band, (page_id, content_id, image_id)) in layout.bands.iter().zip(&page_ids) {
        let resources = image_id.map_or_else(
            || "<< >>".to_string(),
            |image| format!("<< /XObject << /Im0 {image} 0 R >> >>"),
        );
        writer.object(
            *page_id,
            &format!(
                "<< /Type /Page /Parent {pages_id} 0 R /MediaBox [0 0 {} {}] /Resources {resources} /Contents {content_id} 0 R >>",
                fmt_num(geometry.width),
                fmt_num(geometry.height),
            ),
        );

        let content = image_id.map_or_else(String::new, |_| {
            band_drawing(band, layout.image_width_pt, geometry)
        });
        writer.stream(*content_id, "", content.as_bytes());

        if let Some(image_id) = image_id {
            let (width, jpeg) = encode_band(view, band, jpeg_quality)?;
            writer.stream(
                *image_id,
                &format!(
                    "/Type /XObject /Subtype /Image /Width {width} /Height {} /ColorSpace /DeviceRGB /BitsPerComponent 8 /Filter /DCTDecode",
                    band.source_height_px
                ),
                &jpeg,
            );
        }
    }

    Ok(writer.finish(catalog_id, info_id))
}

/// Content stream placing the band image below the top margin.
fn band_drawing(band: &PageBand, image_width_pt: f64, geometry: PageGeometry) -> String {
    let y = geometry.height - geometry.margin - band.height_pt;
    format!(
        "q\n{} 0 0 {} {} {} cm\n/Im0 Do\nQ\n",
        fmt_num(image_width_pt),
        fmt_num(band.height_pt),
        fmt_num(geometry.margin),
        fmt_num(y)
    )
}

fn encode_band(view: &RgbImage, band: &PageBand, quality: u8) -> Result<(u32, Vec<u8>)> {
    let slice = image::imageops::crop_imm(
        view,
        0,
        band.source_top_px,
        view.width(),
        band.source_height_px,
    )
    .to_image();

    let mut cursor = Cursor::new(Vec::new());
    let mut encoder = JpegEncoder::new_with_quality(&mut cursor, quality);
    encoder
        .encode_image(&DynamicImage::ImageRgb8(slice))
        .map_err(|error| Error::Document(format!("Failed to encode page image: {error}")))?;

    Ok((view.width(), cursor.into_inner()))
}

fn fmt_num(value: f64) -> String {
    let formatted = format!("{value:.2}");
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    if trimmed.is_empty() || trimmed == "-" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Encode text as a PDF string: literal for ASCII, UTF-16BE hex otherwise.
fn pdf_text_string(text: &str) -> String {
    if text.chars().all(|ch| ch.is_ascii() && !ch.is_ascii_control()) {
        let mut out = String::with_capacity(text.len() + 2);
        out.push('(');
        for ch in text.chars() {
            if matches!(ch, '(' | ')' | '\\') {
                out.push('\\');
            }
            out.push(ch);
        }
        out.push(')');
        out
    } else {
        let mut out = String::from("<FEFF");
        for unit in text.encode_utf16() {
            let _ = write!(out, "{unit:04X}");
        }
        out.push('>');
        out
    }
}

struct PdfWriter {
    buf: Vec<u8>,
    offsets: Vec<usize>,
}

impl PdfWriter {
    fn new() -> Self {
        Self {
            buf: PDF_HEADER.to_vec(),
            offsets: Vec::new(),
        }
    }

    fn allocate(&mut self) -> usize {
        self.offsets.push(0);
        self.offsets.len()
    }

    fn begin(&mut self, id: usize) {
        self.offsets[id - 1] = self.buf.len();
        self.buf.extend_from_slice(format!("{id} 0 obj\n").as_bytes());
    }

    fn object(&mut self, id: usize, body: &str) {
        self.begin(id);
        self.buf.extend_from_slice(body.as_bytes());
        self.buf.extend_from_slice(b"\nendobj\n");
    }

    fn stream(&mut self, id: usize, dict_entries: &str, data: &[u8]) {
        self.begin(id);
        let separator = if dict_entries.is_empty() { "" } else { " " };
        self.buf.extend_from_slice(
            format!("<< {dict_entries}{separator}/Length {} >>\nstream\n", data.len()).as_bytes(),
        );
        self.buf.extend_from_slice(data);
        self.buf.extend_from_slice(b"\nendstream\nendobj\n");
    }

    fn finish(mut self, root_id: usize, info_id: usize) -> Vec<u8> {
        let xref_offset = self.buf.len();
        let mut xref = format!("xref\n0 {}\n0000000000 65535 f \n", self.offsets.len() + 1);
        for offset in &self.offsets {
            let _ = writeln!(xref, "{offset:010} 00000 n ");
        }
        let _ = write!(
            xref,
            "trailer\n<< /Size {} /Root {root_id} 0 R /Info {info_id} 0 R >>\nstartxref\n{xref_offset}\n%%EOF\n",
            self.offsets.len() + 1
        );
        self.buf.extend_from_slice(xref.as_bytes());
        self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::layout::plan_pages;
    use image::Rgb;

    fn view(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |_x, y| {
            if y % 2 == 0 {
                Rgb([17, 24, 39])
            } else {
                Rgb([209, 213, 219])
            }
        })
    }

    fn count(haystack: &[u8], needle: &str) -> usize {
        haystack
            .windows(needle.len())
            .filter(|window| *window == needle.as_bytes())
            .count()
    }

    #[test]
    fn renders_one_page_per_band() {
        let image = view(200, 600);
        let layout = plan_pages(200, 600, PageGeometry::A4).unwrap();
        let pdf = render_pdf(&image, &layout, PageGeometry::A4, 80, "Report").unwrap();

        assert!(pdf.starts_with(b"%PDF-1.4"));
        assert!(pdf.ends_with(b"%%EOF\n"));
        assert_eq!(count(&pdf, "/Type /Page "), 3);
        assert_eq!(count(&pdf, "/Count 3"), 1);
        assert_eq!(count(&pdf, "/Subtype /Image"), 3);
        assert_eq!(count(&pdf, "/MediaBox [0 0 595.28 841.89]"), 3);
        assert_eq!(count(&pdf, "(Report)"), 1);
    }

    #[test]
    fn xref_offsets_point_at_objects() {
        let image = view(50, 40);
        let layout = plan_pages(50, 40, PageGeometry::A4).unwrap();
        let pdf = render_pdf(&image, &layout, PageGeometry::A4, 80, "x").unwrap();

        let marker = b"startxref\n";
        let marker_at = pdf
            .windows(marker.len())
            .rposition(|window| window == marker)
            .unwrap();
        let trailer = std::str::from_utf8(&pdf[marker_at + marker.len()..]).unwrap();
        let xref_offset: usize = trailer.lines().next().unwrap().parse().unwrap();

        let xref = std::str::from_utf8(&pdf[xref_offset..marker_at]).unwrap();
        assert!(xref.starts_with("xref\n"));

        let entries = xref
            .lines()
            .skip(3)
            .take_while(|line| !line.starts_with("trailer"))
            .collect::<Vec<_>>();
        assert!(!entries.is_empty());
        for (index, entry) in entries.iter().enumerate() {
            let offset: usize = entry[..10].parse().unwrap();
            let expected = format!("{} 0 obj", index + 1);
            assert!(pdf[offset..].starts_with(expected.as_bytes()), "object {}", index + 1);
        }
    }

    #[test]
    fn empty_view_renders_blank_page() {
        let image = RgbImage::new(100, 0);
        let layout = plan_pages(100, 0, PageGeometry::A4).unwrap();
        let pdf = render_pdf(&image, &layout, PageGeometry::A4, 80, "").unwrap();

        assert_eq!(count(&pdf, "/Type /Page "), 1);
        assert_eq!(count(&pdf, "/Subtype /Image"), 0);
    }

    #[test]
    fn band_is_drawn_at_top_margin() {
        let band = PageBand {
            source_top_px: 0,
            source_height_px: 100,
            height_pt: 200.0,
        };
        let drawing = band_drawing(&band, 555.28, PageGeometry::A4);
        assert_eq!(drawing, "q\n555.28 0 0 200 20 621.89 cm\n/Im0 Do\nQ\n");
    }

    #[test]
    fn text_strings_escape_or_hex_encode() {
        assert_eq!(pdf_text_string("a(b)\\c"), "(a\\(b\\)\\\\c)");
        assert_eq!(pdf_text_string("é"), "<FEFF00E9>");
    }

    #[test]
    fn numbers_are_compact() {
        assert_eq!(fmt_num(20.0), "20");
        assert_eq!(fmt_num(595.28), "595.28");
        assert_eq!(fmt_num(0.5), "0.5");
        assert_eq!(fmt_num(0.0), "0");
    }
}
