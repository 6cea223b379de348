//! PNG QR renderer backed by the `qrcode` and `image` crates

use std::io::Cursor;

use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, Luma};
use link_core::{DomainError, QrRenderer, QrSize, QR_FORMAT_PNG};
use qrcode::{EcLevel, QrCode};

/// Renders square PNG QR codes with medium error correction
#[derive(Debug, Clone, Copy, Default)]
pub struct PngQrRenderer;

impl QrRenderer for PngQrRenderer {
    fn format(&self) -> &'static str {
        QR_FORMAT_PNG
    }

    fn render(&self, data: &str, size: QrSize) -> Result<Vec<u8>, DomainError> {
        if data.is_empty() {
            return Err(DomainError::RenderError("QR payload cannot be empty".to_string()));
        }

        let code = QrCode::with_error_correction_level(data.as_bytes(), EcLevel::M)
            .map_err(|e| DomainError::RenderError(e.to_string()))?;

        let pixels = size.pixels();
        let rendered = code
            .render::<Luma<u8>>()
            .min_dimensions(pixels, pixels)
            .build();

        // The module grid rarely divides the target size evenly
        let exact = if rendered.width() == pixels && rendered.height() == pixels {
            rendered
        } else {
            imageops::resize(&rendered, pixels, pixels, FilterType::Nearest)
        };

        let mut bytes = Vec::new();
        DynamicImage::ImageLuma8(exact)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .map_err(|e| DomainError::RenderError(e.to_string()))?;

        Ok(bytes)
    }
}
