use crate::types::{Color, Pt, Size};
use std::collections::BTreeMap;

/// Drawing operations recorded per page. Coordinates are points with a
/// top-left origin; `DrawString` uses `y` as the text baseline.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    SetFillColor(Color),
    SetStrokeColor(Color),
    SetLineWidth(Pt),
    SetFontName(String),
    SetFontSize(Pt),
    MoveTo {
        x: Pt,
        y: Pt,
    },
    LineTo {
        x: Pt,
        y: Pt,
    },
    Stroke,
    DrawRect {
        x: Pt,
        y: Pt,
        width: Pt,
        height: Pt,
    },
    StrokeRect {
        x: Pt,
        y: Pt,
        width: Pt,
        height: Pt,
    },
    DrawString {
        x: Pt,
        y: Pt,
        text: String,
    },
    DrawImage {
        x: Pt,
        y: Pt,
        width: Pt,
        height: Pt,
        resource_id: String,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub commands: Vec<Command>,
}

impl Page {
    pub fn strings(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|cmd| match cmd {
            Command::DrawString { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

/// A raster registered with the canvas under a resource id.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageResource {
    pub width: u32,
    pub height: u32,
    /// Packed 8-bit RGB samples.
    pub rgb: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct Document {
    pub page_size: Size,
    pub pages: Vec<Page>,
    pub images: BTreeMap<String, ImageResource>,
}

#[derive(Debug, Clone)]
struct GraphicsState {
    fill_color: Color,
    stroke_color: Color,
    line_width: Pt,
    font_size: Pt,
    font_name: String,
}

impl Default for GraphicsState {
    fn default() -> Self {
        Self {
            fill_color: Color::BLACK,
            stroke_color: Color::BLACK,
            line_width: Pt::from_f32(1.0),
            font_size: Pt::from_f32(12.0),
            font_name: "Times-Roman".to_string(),
        }
    }
}

/// Multi-page command recorder. Unlike a streaming canvas, any earlier page can
/// be re-selected and appended to, which the final numbering pass relies on.
pub struct Canvas {
    page_size: Size,
    pages: Vec<Page>,
    states: Vec<GraphicsState>,
    current: usize,
    images: BTreeMap<String, ImageResource>,
}

impl Canvas {
    pub fn new(page_size: Size) -> Self {
        Self {
            page_size,
            pages: vec![Page::default()],
            states: vec![GraphicsState::default()],
            current: 0,
            images: BTreeMap::new(),
        }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Zero-based index of the page receiving commands.
    pub fn current_page(&self) -> usize {
        self.current
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    fn push(&mut self, command: Command) {
        self.pages[self.current].commands.push(command);
    }

    fn state(&mut self) -> &mut GraphicsState {
        &mut self.states[self.current]
    }

    pub fn add_page(&mut self) {
        self.pages.push(Page::default());
        self.states.push(GraphicsState::default());
        self.current = self.pages.len() - 1;
    }

    /// Selects an existing page. Returns false when the index is out of range.
    pub fn select_page(&mut self, index: usize) -> bool {
        if index >= self.pages.len() {
            return false;
        }
        self.current = index;
        true
    }

    pub fn set_fill_color(&mut self, color: Color) {
        if self.state().fill_color == color {
            return;
        }
        self.state().fill_color = color;
        self.push(Command::SetFillColor(color));
    }

    pub fn set_stroke_color(&mut self, color: Color) {
        if self.state().stroke_color == color {
            return;
        }
        self.state().stroke_color = color;
        self.push(Command::SetStrokeColor(color));
    }

    pub fn set_line_width(&mut self, width: Pt) {
        let width = width.max(Pt::ZERO);
        if self.state().line_width == width {
            return;
        }
        self.state().line_width = width;
        self.push(Command::SetLineWidth(width));
    }

    pub fn set_font_name(&mut self, name: &str) {
        if self.state().font_name == name {
            return;
        }
        self.state().font_name = name.to_string();
        self.push(Command::SetFontName(name.to_string()));
    }

    pub fn set_font_size(&mut self, size: Pt) {
        if self.state().font_size == size {
            return;
        }
        self.state().font_size = size;
        self.push(Command::SetFontSize(size));
    }

    pub fn line(&mut self, x1: Pt, y1: Pt, x2: Pt, y2: Pt) {
        self.push(Command::MoveTo { x: x1, y: y1 });
        self.push(Command::LineTo { x: x2, y: y2 });
        self.push(Command::Stroke);
    }

    pub fn draw_rect(&mut self, x: Pt, y: Pt, width: Pt, height: Pt) {
        self.push(Command::DrawRect {
            x,
            y,
            width,
            height,
        });
    }

    pub fn stroke_rect(&mut self, x: Pt, y: Pt, width: Pt, height: Pt) {
        self.push(Command::StrokeRect {
            x,
            y,
            width,
            height,
        });
    }

    pub fn draw_string(&mut self, x: Pt, y: Pt, text: impl Into<String>) {
        self.push(Command::DrawString {
            x,
            y,
            text: text.into(),
        });
    }

    /// Registers a raster once; repeated ids keep the first registration.
    pub fn register_image(&mut self, resource_id: impl Into<String>, image: ImageResource) {
        self.images.entry(resource_id.into()).or_insert(image);
    }

    pub fn draw_image(
        &mut self,
        x: Pt,
        y: Pt,
        width: Pt,
        height: Pt,
        resource_id: impl Into<String>,
    ) {
        self.push(Command::DrawImage {
            x,
            y,
            width,
            height,
            resource_id: resource_id.into(),
        });
    }

    pub fn finish(self) -> Document {
        Document {
            page_size: self.page_size,
            pages: self.pages,
            images: self.images,
        }
    }
}
