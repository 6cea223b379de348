//! QR code value objects

use chrono::{DateTime, Utc};
use std::fmt;

use crate::error::DomainError;

/// Stored image format for rendered QR codes
pub const QR_FORMAT_PNG: &str = "png";

/// Allowed QR image edge lengths in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum QrSize {
    #[default]
    Small,
    Medium,
    Large,
}

impl QrSize {
    pub const ALLOWED: [QrSize; 3] = [QrSize::Small, QrSize::Medium, QrSize::Large];

    pub fn pixels(self) -> u32 {
        match self {
            Self::Small => 256,
            Self::Medium => 512,
            Self::Large => 1024,
        }
    }
}

impl TryFrom<u32> for QrSize {
    type Error = DomainError;

    fn try_from(pixels: u32) -> Result<Self, Self::Error> {
        Self::ALLOWED
            .into_iter()
            .find(|size| size.pixels() == pixels)
            .ok_or(DomainError::InvalidQrSize(pixels))
    }
}

impl fmt::Display for QrSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.pixels())
    }
}

/// Cached QR metadata kept alongside a link (no image bytes)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrMetadata {
    pub size: u32,
    pub format: String,
    pub generated_at: DateTime<Utc>,
}

/// A rendered QR image plus its metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrImage {
    pub bytes: Vec<u8>,
    pub metadata: QrMetadata,
}

impl QrImage {
    pub fn content_type(&self) -> &'static str {
        match self.metadata.format.as_str() {
            "svg" => "image/svg+xml",
            _ => "image/png",
        }
    }
}
