use crate::canvas::{Canvas, ImageResource, Page};
use crate::capability::{Raster, RenderSurface, RenderingEngine, Stroke, TextAlign, TextStyle};
use crate::error::Result;
use crate::font;
use crate::pdf;
use crate::types::{Color, PageFormat, Pt, Rect};
use base64::Engine;

pub const PDF_DATA_URI_PREFIX: &str = "data:application/pdf;filename=generated.pdf;base64,";

/// The bundled rendering engine: records commands per page and writes PDF.
#[derive(Debug, Clone, Default)]
pub struct PdfEngine {
    title: Option<String>,
}

impl PdfEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

impl RenderingEngine for PdfEngine {
    fn name(&self) -> &str {
        "pdf"
    }

    fn create_surface(&self, format: PageFormat) -> Box<dyn RenderSurface> {
        Box::new(PdfSurface::new(format).with_title(self.title.clone()))
    }
}

pub struct PdfSurface {
    format: PageFormat,
    canvas: Canvas,
    title: Option<String>,
    next_image: usize,
}

impl PdfSurface {
    pub fn new(format: PageFormat) -> Self {
        Self {
            format,
            canvas: Canvas::new(format.size()),
            title: None,
            next_image: 0,
        }
    }

    fn with_title(mut self, title: Option<String>) -> Self {
        self.title = title;
        self
    }

    /// Recorded commands, one entry per page.
    pub fn pages(&self) -> &[Page] {
        self.canvas.pages()
    }

    fn apply_text_style(&mut self, style: TextStyle) {
        self.canvas.set_font_name(style.face.base_font());
        self.canvas.set_font_size(Pt::from_f32(style.size));
        self.canvas.set_fill_color(style.color);
    }

    fn apply_stroke(&mut self, stroke: Stroke) {
        self.canvas.set_stroke_color(stroke.color);
        self.canvas.set_line_width(Pt::from_mm(stroke.width));
    }
}

impl RenderSurface for PdfSurface {
    fn format(&self) -> PageFormat {
        self.format
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.canvas.set_fill_color(color);
        self.canvas.draw_rect(
            Pt::from_mm(rect.x),
            Pt::from_mm(rect.y),
            Pt::from_mm(rect.width),
            Pt::from_mm(rect.height),
        );
    }

    fn stroke_rect(&mut self, rect: Rect, stroke: Stroke) {
        self.apply_stroke(stroke);
        self.canvas.stroke_rect(
            Pt::from_mm(rect.x),
            Pt::from_mm(rect.y),
            Pt::from_mm(rect.width),
            Pt::from_mm(rect.height),
        );
    }

    fn stroke_line(&mut self, from: (f32, f32), to: (f32, f32), stroke: Stroke) {
        self.apply_stroke(stroke);
        self.canvas.line(
            Pt::from_mm(from.0),
            Pt::from_mm(from.1),
            Pt::from_mm(to.0),
            Pt::from_mm(to.1),
        );
    }

    fn place_text(&mut self, text: &str, x: f32, y: f32, style: TextStyle, align: TextAlign) {
        let x = match align {
            TextAlign::Left => x,
            TextAlign::Center => x - self.measure_text(text, style) / 2.0,
            TextAlign::Right => x - self.measure_text(text, style),
        };
        self.apply_text_style(style);
        self.canvas
            .draw_string(Pt::from_mm(x), Pt::from_mm(y), text.to_string());
    }

    fn measure_text(&self, text: &str, style: TextStyle) -> f32 {
        font::measure_text_width(style.face.base_font(), Pt::from_f32(style.size), text).to_mm()
    }

    fn place_image(&mut self, raster: &Raster, rect: Rect) {
        let Ok(decoded) = image::load_from_memory(&raster.png) else {
            tracing::warn!("skipping undecodable raster");
            return;
        };
        let rgb = decoded.to_rgb8();
        self.next_image += 1;
        let resource_id = format!("raster-{}", self.next_image);
        self.canvas.register_image(
            resource_id.clone(),
            ImageResource {
                width: rgb.width(),
                height: rgb.height(),
                rgb: rgb.into_raw(),
            },
        );
        self.canvas.draw_image(
            Pt::from_mm(rect.x),
            Pt::from_mm(rect.y),
            Pt::from_mm(rect.width),
            Pt::from_mm(rect.height),
            resource_id,
        );
    }

    fn add_page(&mut self) {
        self.canvas.add_page();
    }

    fn set_page(&mut self, index: usize) {
        if !self.canvas.select_page(index) {
            tracing::warn!(index, pages = self.canvas.page_count(), "page index out of range");
        }
    }

    fn current_page(&self) -> usize {
        self.canvas.current_page()
    }

    fn page_count(&self) -> usize {
        self.canvas.page_count()
    }

    fn encode(self: Box<Self>) -> Result<String> {
        let title = self.title.clone();
        let document = self.canvas.finish();
        let bytes = pdf::document_to_pdf(&document, title.as_deref())?;
        Ok(format!(
            "{}{}",
            PDF_DATA_URI_PREFIX,
            base64::engine::general_purpose::STANDARD.encode(bytes)
        ))
    }
}
