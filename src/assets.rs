//! Lazy, single-flight access to the rendering and code-encoding capabilities.
//!
//! One `AssetLoader` is meant to live for the whole process and be shared by
//! every renderer. Each capability is fetched at most once; concurrent callers
//! await the same in-flight fetch and every later caller reuses its outcome,
//! including a failed one.

use crate::capability::{CodeEncoder, Raster, RenderingEngine, TransientContainer};
use crate::encoder::QrCodeEncoder;
use crate::engine::PdfEngine;
use crate::error::{ReceiptError, Result};
use async_trait::async_trait;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tokio::sync::OnceCell;

pub const DEFAULT_CODE_RENDER_GRACE: Duration = Duration::from_millis(50);

/// Where capabilities come from.
#[async_trait]
pub trait CapabilityHost: Send + Sync {
    /// Whether an interactive document context exists to load capabilities into.
    fn has_document_context(&self) -> bool;

    async fn fetch_rendering_engine(&self) -> std::result::Result<Arc<dyn RenderingEngine>, String>;

    async fn fetch_code_encoder(&self) -> std::result::Result<Arc<dyn CodeEncoder>, String>;
}

/// Outcome of loading the optional encoder. Absence is a normal result.
#[derive(Clone)]
pub enum EncoderAvailability {
    Available(Arc<dyn CodeEncoder>),
    Unavailable,
}

impl EncoderAvailability {
    pub fn is_available(&self) -> bool {
        matches!(self, EncoderAvailability::Available(_))
    }
}

impl std::fmt::Debug for EncoderAvailability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EncoderAvailability::Available(_) => f.write_str("Available"),
            EncoderAvailability::Unavailable => f.write_str("Unavailable"),
        }
    }
}

pub struct AssetLoader {
    host: Arc<dyn CapabilityHost>,
    engine: OnceCell<std::result::Result<Arc<dyn RenderingEngine>, String>>,
    encoder: OnceCell<EncoderAvailability>,
    code_render_grace: Duration,
}

impl AssetLoader {
    pub fn new(host: Arc<dyn CapabilityHost>) -> Self {
        Self {
            host,
            engine: OnceCell::new(),
            encoder: OnceCell::new(),
            code_render_grace: DEFAULT_CODE_RENDER_GRACE,
        }
    }

    /// How long `render_code_image` waits for asynchronous encoder output.
    pub fn with_code_render_grace(mut self, grace: Duration) -> Self {
        self.code_render_grace = grace;
        self
    }

    /// Loader over the bundled PDF engine and QR encoder.
    pub fn bundled() -> Self {
        Self::new(Arc::new(BundledHost::new()))
    }

    /// The process-wide loader, created on first use and never reset.
    pub fn process_default() -> Arc<AssetLoader> {
        static SHARED: OnceLock<Arc<AssetLoader>> = OnceLock::new();
        SHARED
            .get_or_init(|| Arc::new(AssetLoader::bundled()))
            .clone()
    }

    pub async fn load_rendering_engine(&self) -> Result<Arc<dyn RenderingEngine>> {
        if !self.host.has_document_context() {
            return Err(ReceiptError::EnvironmentUnavailable(
                "no interactive document context".to_string(),
            ));
        }
        let outcome = self
            .engine
            .get_or_init(|| async {
                tracing::debug!("fetching rendering engine");
                let fetched = self.host.fetch_rendering_engine().await;
                match &fetched {
                    Ok(engine) => tracing::debug!(engine = engine.name(), "rendering engine ready"),
                    Err(err) => tracing::error!(error = %err, "rendering engine fetch failed"),
                }
                fetched
            })
            .await;
        match outcome {
            Ok(engine) => Ok(Arc::clone(engine)),
            Err(message) => Err(ReceiptError::EngineLoadFailure(message.clone())),
        }
    }

    pub async fn load_code_encoder(&self) -> EncoderAvailability {
        if !self.host.has_document_context() {
            return EncoderAvailability::Unavailable;
        }
        self.encoder
            .get_or_init(|| async {
                tracing::debug!("fetching code encoder");
                match self.host.fetch_code_encoder().await {
                    Ok(encoder) => EncoderAvailability::Available(encoder),
                    Err(err) => {
                        tracing::warn!(error = %err, "code encoder unavailable");
                        EncoderAvailability::Unavailable
                    }
                }
            })
            .await
            .clone()
    }

    /// Renders `payload` as a scannable code through a transient container.
    /// Never fails: any problem yields `None`.
    pub async fn render_code_image(&self, payload: &str, size: u32) -> Option<Raster> {
        self.render_code_image_within(payload, size, self.code_render_grace)
            .await
    }

    /// As [`AssetLoader::render_code_image`], waiting `grace` instead of the
    /// loader's configured period.
    pub async fn render_code_image_within(
        &self,
        payload: &str,
        size: u32,
        grace: Duration,
    ) -> Option<Raster> {
        let EncoderAvailability::Available(encoder) = self.load_code_encoder().await else {
            return None;
        };

        let container = TransientContainer::new();
        let rendered = std::panic::catch_unwind(AssertUnwindSafe(|| {
            encoder.render(&container, payload, size)
        }));
        match rendered {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                tracing::warn!(error = %err, "code image rendering failed");
                container.remove();
                return None;
            }
            Err(_) => {
                tracing::warn!("code encoder panicked");
                container.remove();
                return None;
            }
        }

        tokio::time::sleep(grace).await;

        let raster = container
            .image_source()
            .and_then(|src| Raster::from_data_uri(&src))
            .or_else(|| container.canvas().and_then(|canvas| Raster::from_image(&canvas)));
        container.remove();
        if raster.is_none() {
            tracing::warn!("code encoder produced no usable raster");
        }
        raster
    }
}

/// In-process host serving the bundled PDF engine and QR encoder.
#[derive(Debug, Clone)]
pub struct BundledHost {
    document_context: bool,
    encoder: bool,
    engine: PdfEngine,
}

impl BundledHost {
    pub fn new() -> Self {
        Self {
            document_context: true,
            encoder: true,
            engine: PdfEngine::new().with_title("Reservation Confirmation"),
        }
    }

    /// A host with no document context; engine loads fail with
    /// `EnvironmentUnavailable`.
    pub fn detached() -> Self {
        Self {
            document_context: false,
            ..Self::new()
        }
    }

    pub fn without_encoder(mut self) -> Self {
        self.encoder = false;
        self
    }
}

impl Default for BundledHost {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CapabilityHost for BundledHost {
    fn has_document_context(&self) -> bool {
        self.document_context
    }

    async fn fetch_rendering_engine(&self) -> std::result::Result<Arc<dyn RenderingEngine>, String> {
        Ok(Arc::new(self.engine.clone()))
    }

    async fn fetch_code_encoder(&self) -> std::result::Result<Arc<dyn CodeEncoder>, String> {
        if !self.encoder {
            return Err("code encoder is not bundled".to_string());
        }
        Ok(Arc::new(QrCodeEncoder::new()))
    }
}
