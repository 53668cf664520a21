use crate::capability::{CodeEncoder, ContainerNode, Raster, TransientContainer};
use image::{DynamicImage, Luma};
use qrcode::QrCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QrOutput {
    /// Leave a pixel buffer in the container.
    #[default]
    Canvas,
    /// Leave an image element whose source is a PNG data URI.
    ImageElement,
}

/// QR encoder backed by the `qrcode` crate.
#[derive(Debug, Clone, Default)]
pub struct QrCodeEncoder {
    output: QrOutput,
}

impl QrCodeEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_output(mut self, output: QrOutput) -> Self {
        self.output = output;
        self
    }
}

impl CodeEncoder for QrCodeEncoder {
    fn render(
        &self,
        container: &TransientContainer,
        payload: &str,
        size: u32,
    ) -> Result<(), String> {
        let code = QrCode::new(payload.as_bytes()).map_err(|err| err.to_string())?;
        let image = code
            .render::<Luma<u8>>()
            .max_dimensions(size, size)
            .build();
        let image = DynamicImage::ImageLuma8(image);
        match self.output {
            QrOutput::Canvas => container.append(ContainerNode::Canvas(image)),
            QrOutput::ImageElement => {
                let raster = Raster::from_image(&image)
                    .ok_or_else(|| "failed to encode code image".to_string())?;
                container.append(ContainerNode::Image {
                    src: raster.to_data_uri(),
                });
            }
        }
        Ok(())
    }
}
