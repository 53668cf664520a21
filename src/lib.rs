mod assembler;
mod assets;
mod canvas;
mod capability;
mod encoder;
mod engine;
mod error;
mod font;
mod format;
mod inspect;
mod layout;
mod menu_filter;
mod model;
mod pdf;
mod totals;
mod types;

pub use assembler::{
    BRAND, CompositionSummary, POLICY_TEXT, ReceiptContext, UNKNOWN_ITEM, code_payload, compose,
};
pub use assets::{
    AssetLoader, BundledHost, CapabilityHost, DEFAULT_CODE_RENDER_GRACE, EncoderAvailability,
};
pub use canvas::{Command, Document, ImageResource, Page};
pub use capability::{
    CodeEncoder, ContainerNode, Raster, RenderSurface, RenderingEngine, Stroke, TextAlign,
    TextStyle, TransientContainer,
};
pub use encoder::{QrCodeEncoder, QrOutput};
pub use engine::{PDF_DATA_URI_PREFIX, PdfEngine, PdfSurface};
pub use error::{ReceiptError, Result};
pub use font::FontFace;
pub use format::{
    CurrencyStyle, MISSING, display_identifier, format_arrival_date, format_currency,
    format_generated_at, round_money, safe_text, safe_text_or_na,
};
pub use inspect::{
    DocumentReport, InspectError, InspectErrorCode, decode_data_uri, inspect_document,
    inspect_pdf_bytes,
};
pub use layout::{Layout, TableHeader, row_height, wrap_text};
pub use menu_filter::{MenuFilter, MenuFilterHost};
pub use model::{OrderLine, ReservationRecord};
pub use pdf::document_to_pdf;
pub use totals::{OrderTotals, RunningTotals, TAX_RATE};
pub use types::{Color, Margins, PageFormat, Pt, Rect, Size};

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use std::sync::Arc;
use std::time::Duration;

/// Source of "now" for timestamps and synthesised identifiers.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

pub const DEFAULT_CODE_IMAGE_SIZE_PX: u32 = 70;
const MAX_CODE_RENDER_GRACE: Duration = Duration::from_secs(5);

/// A generated document and what went into it.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedReceipt {
    pub data_uri: String,
    pub summary: CompositionSummary,
}

pub struct ReceiptRenderer {
    loader: Arc<AssetLoader>,
    currency_style: CurrencyStyle,
    time_zone: Tz,
    code_image_size_px: u32,
    code_render_grace: Option<Duration>,
    clock: Clock,
}

pub struct ReceiptRendererBuilder {
    loader: Option<Arc<AssetLoader>>,
    currency_style: CurrencyStyle,
    time_zone: Tz,
    code_image_size_px: u32,
    code_render_grace: Option<Duration>,
    clock: Option<Clock>,
}

impl ReceiptRenderer {
    pub fn builder() -> ReceiptRendererBuilder {
        ReceiptRendererBuilder::new()
    }

    pub fn loader(&self) -> &Arc<AssetLoader> {
        &self.loader
    }

    /// Renders the confirmation and returns it as a PDF data URI.
    pub async fn render(&self, record: &ReservationRecord, lines: &[OrderLine]) -> Result<String> {
        Ok(self.render_receipt(record, lines).await?.data_uri)
    }

    pub async fn render_receipt(
        &self,
        record: &ReservationRecord,
        lines: &[OrderLine],
    ) -> Result<RenderedReceipt> {
        let engine = self.loader.load_rendering_engine().await?;
        let now = (self.clock)();

        let identifier = display_identifier(record.id.as_deref(), now);
        let payload = code_payload(&identifier);
        let code_image = match self.code_render_grace {
            Some(grace) => {
                self.loader
                    .render_code_image_within(&payload, self.code_image_size_px, grace)
                    .await
            }
            None => {
                self.loader
                    .render_code_image(&payload, self.code_image_size_px)
                    .await
            }
        };

        let context = ReceiptContext {
            generated_at: now,
            time_zone: self.time_zone,
            currency_style: self.currency_style,
            code_image,
        };
        let mut surface = engine.create_surface(PageFormat::a4());
        let summary = compose(surface.as_mut(), record, lines, &context);
        let data_uri = surface.encode()?;

        tracing::info!(
            engine = engine.name(),
            pages = summary.pages,
            lines = lines.len(),
            bytes = data_uri.len(),
            code_image = summary.code_image_placed,
            "reservation document generated"
        );
        Ok(RenderedReceipt { data_uri, summary })
    }
}

impl Default for ReceiptRendererBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReceiptRendererBuilder {
    pub fn new() -> Self {
        Self {
            loader: None,
            currency_style: CurrencyStyle::default(),
            time_zone: chrono_tz::Asia::Kolkata,
            code_image_size_px: DEFAULT_CODE_IMAGE_SIZE_PX,
            code_render_grace: None,
            clock: None,
        }
    }

    /// Shares `loader` instead of the process-wide default.
    pub fn asset_loader(mut self, loader: Arc<AssetLoader>) -> Self {
        self.loader = Some(loader);
        self
    }

    pub fn currency_style(mut self, style: CurrencyStyle) -> Self {
        self.currency_style = style;
        self
    }

    pub fn time_zone(mut self, tz: Tz) -> Self {
        self.time_zone = tz;
        self
    }

    pub fn code_image_size_px(mut self, size: u32) -> Self {
        self.code_image_size_px = size;
        self
    }

    /// Overrides the loader's wait for asynchronous encoder output.
    pub fn code_render_grace(mut self, grace: Duration) -> Self {
        self.code_render_grace = Some(grace);
        self
    }

    pub fn clock(mut self, clock: impl Fn() -> DateTime<Utc> + Send + Sync + 'static) -> Self {
        let clock: Clock = Arc::new(clock);
        self.clock = Some(clock);
        self
    }

    pub fn build(self) -> Result<ReceiptRenderer> {
        if !(16..=1024).contains(&self.code_image_size_px) {
            return Err(ReceiptError::InvalidConfiguration(format!(
                "code_image_size_px must be within 16..=1024, got {}",
                self.code_image_size_px
            )));
        }
        if let Some(grace) = self.code_render_grace.filter(|g| *g > MAX_CODE_RENDER_GRACE) {
            return Err(ReceiptError::InvalidConfiguration(format!(
                "code_render_grace must not exceed {:?}, got {:?}",
                MAX_CODE_RENDER_GRACE, grace
            )));
        }
        Ok(ReceiptRenderer {
            loader: self.loader.unwrap_or_else(AssetLoader::process_default),
            currency_style: self.currency_style,
            time_zone: self.time_zone,
            code_image_size_px: self.code_image_size_px,
            code_render_grace: self.code_render_grace,
            clock: self.clock.unwrap_or_else(system_clock),
        })
    }
}

fn system_clock() -> Clock {
    Arc::new(Utc::now)
}

/// Renders with the process-wide loader and default settings.
pub async fn generate_reservation_document(
    record: &ReservationRecord,
    lines: &[OrderLine],
) -> Result<String> {
    ReceiptRenderer::builder().build()?.render(record, lines).await
}
