use crate::canvas::{Command, Document, ImageResource, Page};
use crate::types::{Color, Pt, Size};
use fixed::types::I32F32;
use std::collections::{BTreeMap, BTreeSet};
use std::io;

const PDF_CATALOG_ID: usize = 1;
const PDF_PAGES_ID: usize = 2;
const DEFAULT_FONT: &str = "Times-Roman";

/// Serialises a recorded document into PDF 1.4 bytes.
///
/// Fonts are referenced as base-14 Type1 fonts with WinAnsi encoding, images
/// are embedded as uncompressed RGB XObjects.
pub fn document_to_pdf(document: &Document, title: Option<&str>) -> io::Result<Vec<u8>> {
    if document.pages.is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "document has no pages",
        ));
    }

    let font_names = collect_font_names(document);
    let mut objects: Vec<String> = Vec::new();
    // Catalog and page tree are patched in once the kids are known.
    objects.push(String::new());
    objects.push(String::new());

    let mut font_resources: Vec<(String, usize)> = Vec::new();
    let mut font_map: BTreeMap<String, String> = BTreeMap::new();
    for (index, name) in font_names.iter().enumerate() {
        objects.push(font_object(name));
        let resource = format!("F{}", index + 1);
        font_resources.push((resource.clone(), objects.len()));
        font_map.insert(name.clone(), resource);
    }

    let mut image_resources: Vec<(String, usize)> = Vec::new();
    let mut image_map: BTreeMap<String, String> = BTreeMap::new();
    for (index, (resource_id, image)) in document.images.iter().enumerate() {
        objects.push(image_object(image));
        let name = format!("Im{}", index + 1);
        image_resources.push((name.clone(), objects.len()));
        image_map.insert(resource_id.clone(), name);
    }

    let resources = format!(
        "<< /Font {} /XObject {} >>",
        resource_dict(&font_resources),
        resource_dict(&image_resources)
    );

    let mut kids: Vec<usize> = Vec::new();
    for page in &document.pages {
        let content = render_page(page, document.page_size.height, &font_map, &image_map);
        objects.push(stream_object(&content));
        let content_id = objects.len();
        objects.push(page_object(document.page_size, content_id, &resources));
        kids.push(objects.len());
    }

    objects[PDF_CATALOG_ID - 1] = format!("<< /Type /Catalog /Pages {} 0 R >>", PDF_PAGES_ID);
    objects[PDF_PAGES_ID - 1] = format!(
        "<< /Type /Pages /Kids [{}] /Count {} >>",
        kids.iter()
            .map(|id| format!("{} 0 R", id))
            .collect::<Vec<_>>()
            .join(" "),
        kids.len()
    );

    objects.push(info_object(title));
    let info_id = objects.len();
    Ok(build_pdf(objects, PDF_CATALOG_ID, Some(info_id)))
}

fn collect_font_names(document: &Document) -> BTreeSet<String> {
    let mut names = BTreeSet::new();
    for page in &document.pages {
        let mut current_font = DEFAULT_FONT.to_string();
        for cmd in &page.commands {
            match cmd {
                Command::SetFontName(name) => current_font = name.clone(),
                Command::DrawString { .. } => {
                    names.insert(current_font.clone());
                }
                _ => {}
            }
        }
    }
    if names.is_empty() {
        names.insert(DEFAULT_FONT.to_string());
    }
    names
}

fn render_page(
    page: &Page,
    page_height: Pt,
    font_map: &BTreeMap<String, String>,
    image_map: &BTreeMap<String, String>,
) -> String {
    let mut out = String::new();
    let mut current_font_size = Pt::from_f32(12.0);
    let mut current_font_name = DEFAULT_FONT.to_string();

    for cmd in &page.commands {
        match cmd {
            Command::SetFillColor(color) => out.push_str(&color_to_pdf_fill(*color)),
            Command::SetStrokeColor(color) => out.push_str(&color_to_pdf_stroke(*color)),
            Command::SetLineWidth(width) => {
                out.push_str(&format!("{} w\n", fmt_pt(*width)));
            }
            Command::SetFontName(name) => current_font_name = name.clone(),
            Command::SetFontSize(size) => current_font_size = *size,
            Command::MoveTo { x, y } => {
                out.push_str(&format!("{} {} m\n", fmt_pt(*x), fmt_pt(page_height - *y)));
            }
            Command::LineTo { x, y } => {
                out.push_str(&format!("{} {} l\n", fmt_pt(*x), fmt_pt(page_height - *y)));
            }
            Command::Stroke => out.push_str("S\n"),
            Command::DrawRect {
                x,
                y,
                width,
                height,
            } => {
                out.push_str(&format!(
                    "{} {} {} {} re\nf\n",
                    fmt_pt(*x),
                    fmt_pt(page_height - *y - *height),
                    fmt_pt(*width),
                    fmt_pt(*height)
                ));
            }
            Command::StrokeRect {
                x,
                y,
                width,
                height,
            } => {
                out.push_str(&format!(
                    "{} {} {} {} re\nS\n",
                    fmt_pt(*x),
                    fmt_pt(page_height - *y - *height),
                    fmt_pt(*width),
                    fmt_pt(*height)
                ));
            }
            Command::DrawString { x, y, text } => {
                let resource = font_map
                    .get(&current_font_name)
                    .map(String::as_str)
                    .unwrap_or("F1");
                out.push_str("BT\n");
                out.push_str(&format!("/{} {} Tf\n", resource, fmt_pt(current_font_size)));
                out.push_str(&format!(
                    "{} {} Td\n",
                    fmt_pt(*x),
                    fmt_pt(page_height - *y)
                ));
                out.push_str(&format!("({}) Tj\n", encode_winansi_pdf_string(text)));
                out.push_str("ET\n");
            }
            Command::DrawImage {
                x,
                y,
                width,
                height,
                resource_id,
            } => {
                let Some(name) = image_map.get(resource_id) else {
                    continue;
                };
                out.push_str("q\n");
                out.push_str(&format!(
                    "{} 0 0 {} {} {} cm\n",
                    fmt_pt(*width),
                    fmt_pt(*height),
                    fmt_pt(*x),
                    fmt_pt(page_height - *y - *height)
                ));
                out.push_str(&format!("/{} Do\n", name));
                out.push_str("Q\n");
            }
        }
    }

    out
}

fn font_object(name: &str) -> String {
    format!(
        "<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>",
        sanitize_font_name(name)
    )
}

fn sanitize_font_name(name: &str) -> String {
    let out: String = name
        .chars()
        .filter(|ch| ch.is_ascii_alphanumeric() || *ch == '-')
        .collect();
    if out.is_empty() {
        DEFAULT_FONT.to_string()
    } else {
        out
    }
}

fn image_object(image: &ImageResource) -> String {
    let mut stream_data = ascii_hex_encode(&image.rgb);
    stream_data.push('>');
    format!(
        "<< /Type /XObject /Subtype /Image /Width {} /Height {} /ColorSpace /DeviceRGB /BitsPerComponent 8 /Length {} /Filter /ASCIIHexDecode >>\nstream\n{}\nendstream",
        image.width,
        image.height,
        stream_data.len(),
        stream_data
    )
}

fn resource_dict(entries: &[(String, usize)]) -> String {
    let entries: Vec<String> = entries
        .iter()
        .map(|(name, id)| format!("/{} {} 0 R", name, id))
        .collect();
    format!("<< {} >>", entries.join(" "))
}

fn page_object(page_size: Size, content_id: usize, resources: &str) -> String {
    format!(
        "<< /Type /Page /Parent {} 0 R /MediaBox [0 0 {} {}] /Resources {} /Contents {} 0 R >>",
        PDF_PAGES_ID,
        fmt_pt(page_size.width),
        fmt_pt(page_size.height),
        resources,
        content_id
    )
}

fn stream_object(content: &str) -> String {
    format!(
        "<< /Length {} >>\nstream\n{}\nendstream",
        content.len(),
        content
    )
}

fn info_object(title: Option<&str>) -> String {
    let mut entries = vec!["/Producer (reservation-receipt)".to_string()];
    if let Some(title) = title {
        entries.push(format!("/Title ({})", encode_winansi_pdf_string(title)));
    }
    format!("<< {} >>", entries.join(" "))
}

fn build_pdf(objects: Vec<String>, catalog_id: usize, info_id: Option<usize>) -> Vec<u8> {
    let mut out: Vec<u8> = Vec::new();
    out.extend_from_slice(b"%PDF-1.4\n");
    out.extend_from_slice(b"%\xE2\xE3\xCF\xD3\n");

    let mut offsets = Vec::with_capacity(objects.len());
    for (index, obj) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.extend_from_slice(format!("{} 0 obj\n", index + 1).as_bytes());
        out.extend_from_slice(obj.as_bytes());
        out.extend_from_slice(b"\nendobj\n");
    }

    let xref_start = out.len();
    out.extend_from_slice(format!("xref\n0 {}\n", objects.len() + 1).as_bytes());
    out.extend_from_slice(b"0000000000 65535 f \n");
    for offset in offsets {
        out.extend_from_slice(format!("{:010} 00000 n \n", offset).as_bytes());
    }

    let mut trailer = format!(
        "trailer\n<< /Size {} /Root {} 0 R",
        objects.len() + 1,
        catalog_id
    );
    if let Some(info_id) = info_id {
        trailer.push_str(&format!(" /Info {} 0 R", info_id));
    }
    trailer.push_str(&format!(" >>\nstartxref\n{}\n%%EOF", xref_start));
    out.extend_from_slice(trailer.as_bytes());
    out
}

/// Escapes a string for a literal PDF string in WinAnsi encoding. Latin-1
/// characters are written as octal escapes; anything else becomes `?`.
fn encode_winansi_pdf_string(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '(' => out.push_str("\\("),
            ')' => out.push_str("\\)"),
            '\n' | '\r' | '\t' => out.push(' '),
            ' '..='~' => out.push(ch),
            '\u{A0}'..='\u{FF}' => out.push_str(&format!("\\{:03o}", ch as u32)),
            '\u{2013}' => out.push_str("\\226"),
            '\u{2014}' => out.push_str("\\227"),
            '\u{20AC}' => out.push_str("\\200"),
            _ => out.push('?'),
        }
    }
    out
}

fn ascii_hex_encode(data: &[u8]) -> String {
    const HEX: &[u8; 16] = b"0123456789ABCDEF";
    let mut out = String::with_capacity(data.len() * 2);
    for byte in data {
        out.push(HEX[(byte >> 4) as usize] as char);
        out.push(HEX[(byte & 0x0F) as usize] as char);
    }
    out
}

fn fmt(value: f32) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }
    let fixed = I32F32::from_num(value);
    let scaled = (fixed * I32F32::from_num(1000)).round();
    let milli: i64 = scaled.to_num();
    format_milli(milli)
}

fn format_milli(milli: i64) -> String {
    if milli == 0 {
        return "0".to_string();
    }
    let sign = if milli < 0 { "-" } else { "" };
    let abs = milli.abs();
    let int_part = abs / 1000;
    let frac_part = abs % 1000;
    if frac_part == 0 {
        return format!("{}{}", sign, int_part);
    }
    let mut s = format!("{}{}.{:03}", sign, int_part, frac_part);
    while s.ends_with('0') {
        s.pop();
    }
    s
}

fn fmt_pt(value: Pt) -> String {
    format_milli(value.to_milli_i64())
}

fn color_to_pdf_fill(color: Color) -> String {
    format!("{} {} {} rg\n", fmt(color.r), fmt(color.g), fmt(color.b))
}

fn color_to_pdf_stroke(color: Color) -> String {
    format!("{} {} {} RG\n", fmt(color.r), fmt(color.g), fmt(color.b))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one_page_document(commands: Vec<Command>) -> Document {
        Document {
            page_size: Size::a4(),
            pages: vec![Page { commands }],
            images: BTreeMap::new(),
        }
    }

    fn contains(haystack: &[u8], needle: &str) -> bool {
        haystack
            .windows(needle.len())
            .any(|window| window == needle.as_bytes())
    }

    #[test]
    fn empty_document_is_rejected() {
        let doc = Document {
            page_size: Size::a4(),
            pages: Vec::new(),
            images: BTreeMap::new(),
        };
        let err = document_to_pdf(&doc, None).expect_err("no pages");
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn text_uses_baseline_coordinates_and_registered_font() {
        let doc = one_page_document(vec![
            Command::SetFontName("Times-Bold".to_string()),
            Command::SetFontSize(Pt::from_f32(10.0)),
            Command::DrawString {
                x: Pt::from_f32(10.0),
                y: Pt::from_f32(100.0),
                text: "Total (incl.)".to_string(),
            },
        ]);
        let bytes = document_to_pdf(&doc, Some("Receipt")).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.4"));
        assert!(contains(&bytes, "/BaseFont /Times-Bold"));
        assert!(contains(&bytes, "/F1 10 Tf"));
        assert!(contains(&bytes, "(Total \\(incl.\\)) Tj"));
        assert!(contains(&bytes, "/Title (Receipt)"));
    }

    #[test]
    fn images_become_xobjects() {
        let mut doc = one_page_document(vec![Command::DrawImage {
            x: Pt::from_f32(10.0),
            y: Pt::from_f32(10.0),
            width: Pt::from_f32(20.0),
            height: Pt::from_f32(20.0),
            resource_id: "code".to_string(),
        }]);
        doc.images.insert(
            "code".to_string(),
            ImageResource {
                width: 1,
                height: 1,
                rgb: vec![0xFF, 0x00, 0x10],
            },
        );
        let bytes = document_to_pdf(&doc, None).unwrap();
        assert!(contains(&bytes, "/Subtype /Image /Width 1 /Height 1"));
        assert!(contains(&bytes, "FF0010>"));
        assert!(contains(&bytes, "/Im1 Do"));
    }

    #[test]
    fn unknown_image_references_are_skipped() {
        let doc = one_page_document(vec![Command::DrawImage {
            x: Pt::ZERO,
            y: Pt::ZERO,
            width: Pt::from_f32(5.0),
            height: Pt::from_f32(5.0),
            resource_id: "missing".to_string(),
        }]);
        let bytes = document_to_pdf(&doc, None).unwrap();
        assert!(!contains(&bytes, " Do\n"));
    }

    #[test]
    fn winansi_encoding_escapes_and_replaces() {
        assert_eq!(encode_winansi_pdf_string("a(b)\\"), "a\\(b\\)\\\\");
        assert_eq!(encode_winansi_pdf_string("café"), "caf\\351");
        assert_eq!(encode_winansi_pdf_string("\u{20B9}10"), "?10");
    }

    #[test]
    fn milli_formatting_trims_trailing_zeros() {
        assert_eq!(format_milli(12_500), "12.5");
        assert_eq!(format_milli(-3_000), "-3");
        assert_eq!(fmt(0.25), "0.25");
    }
}
