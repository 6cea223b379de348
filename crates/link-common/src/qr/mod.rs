//! QR code rendering

mod png_renderer;

pub use png_renderer::PngQrRenderer;
