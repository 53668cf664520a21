//! Capability interfaces resolved by the asset loader.
//!
//! The assembler only talks to these traits, so any engine that can fill,
//! stroke, place and measure text, place images, manage pages and encode its
//! output can back a receipt.

use crate::error::Result;
use crate::font::FontFace;
use crate::types::{Color, PageFormat, Rect};
use base64::Engine;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

/// Font, size (points) and color for a text run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub face: FontFace,
    pub size: f32,
    pub color: Color,
}

impl TextStyle {
    pub fn new(face: FontFace, size: f32, color: Color) -> Self {
        Self { face, size, color }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub color: Color,
    /// Line width in document units.
    pub width: f32,
}

impl Stroke {
    pub fn new(color: Color, width: f32) -> Self {
        Self { color, width }
    }
}

/// Decoded raster, normalised to PNG bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    pub width: u32,
    pub height: u32,
    pub png: Vec<u8>,
}

impl Raster {
    pub fn from_image(image: &image::DynamicImage) -> Option<Self> {
        let mut png = Vec::new();
        image
            .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
            .ok()?;
        Some(Self {
            width: image.width(),
            height: image.height(),
            png,
        })
    }

    /// Decodes a `data:` URI (base64 payload) or fails with `None`.
    pub fn from_data_uri(uri: &str) -> Option<Self> {
        let (header, payload) = uri.strip_prefix("data:")?.split_once(',')?;
        if !header.contains("base64") {
            return None;
        }
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(payload.trim())
            .ok()?;
        let decoded = image::load_from_memory(&bytes).ok()?;
        Self::from_image(&decoded)
    }

    pub fn to_data_uri(&self) -> String {
        format!(
            "data:image/png;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(&self.png)
        )
    }
}

/// A drawing surface for one document. Coordinates are document units
/// (millimetres) with a top-left origin; text `y` is the baseline.
pub trait RenderSurface: Send {
    fn format(&self) -> PageFormat;

    fn fill_rect(&mut self, rect: Rect, color: Color);

    fn stroke_rect(&mut self, rect: Rect, stroke: Stroke);

    fn stroke_line(&mut self, from: (f32, f32), to: (f32, f32), stroke: Stroke);

    fn place_text(&mut self, text: &str, x: f32, y: f32, style: TextStyle, align: TextAlign);

    /// Width of `text` in document units.
    fn measure_text(&self, text: &str, style: TextStyle) -> f32;

    fn place_image(&mut self, raster: &Raster, rect: Rect);

    /// Appends a page and makes it current.
    fn add_page(&mut self);

    /// Makes an existing zero-based page current; out-of-range indexes are ignored.
    fn set_page(&mut self, index: usize);

    fn current_page(&self) -> usize;

    fn page_count(&self) -> usize;

    /// Serialises every page into a single encoded string.
    fn encode(self: Box<Self>) -> Result<String>;
}

/// The required rendering capability.
pub trait RenderingEngine: Send + Sync {
    fn name(&self) -> &str;

    fn create_surface(&self, format: PageFormat) -> Box<dyn RenderSurface>;
}

/// Output an encoder leaves in a transient container.
#[derive(Debug, Clone)]
pub enum ContainerNode {
    /// An image element; `src` is normally a data URI.
    Image { src: String },
    /// A canvas-like pixel buffer.
    Canvas(image::DynamicImage),
}

/// Off-document container an encoder renders into. Cloning shares the same
/// node list, so an encoder may finish rendering from another task.
#[derive(Debug, Clone, Default)]
pub struct TransientContainer {
    nodes: Arc<Mutex<Vec<ContainerNode>>>,
}

impl TransientContainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&self, node: ContainerNode) {
        if let Ok(mut nodes) = self.nodes.lock() {
            nodes.push(node);
        }
    }

    /// First image element's source, if any.
    pub fn image_source(&self) -> Option<String> {
        let nodes = self.nodes.lock().ok()?;
        nodes.iter().find_map(|node| match node {
            ContainerNode::Image { src } => Some(src.clone()),
            ContainerNode::Canvas(_) => None,
        })
    }

    pub fn canvas(&self) -> Option<image::DynamicImage> {
        let nodes = self.nodes.lock().ok()?;
        nodes.iter().find_map(|node| match node {
            ContainerNode::Canvas(image) => Some(image.clone()),
            ContainerNode::Image { .. } => None,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.lock().map(|nodes| nodes.is_empty()).unwrap_or(true)
    }

    /// Detaches the container, dropping whatever the encoder produced.
    pub fn remove(self) {
        if let Ok(mut nodes) = self.nodes.lock() {
            nodes.clear();
        }
    }
}

/// The optional scannable-code capability.
pub trait CodeEncoder: Send + Sync {
    /// Renders `payload` as a `size`×`size` pixel code into `container`.
    fn render(
        &self,
        container: &TransientContainer,
        payload: &str,
        size: u32,
    ) -> std::result::Result<(), String>;
}
