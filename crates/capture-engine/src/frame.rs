//! Still-frame rasterization.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, RgbaImage};
use linkcard_card_model::{ArtifactRef, ContainerKind};
use linkcard_common::config::CaptureSettings;
use linkcard_common::error::{LinkcardError, LinkcardResult};

/// A raw RGBA frame taken from a visual stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    /// Row-major RGBA8 pixels.
    pub rgba: Vec<u8>,
}

impl Frame {
    pub fn new(width: u32, height: u32, rgba: Vec<u8>) -> Self {
        Self {
            width,
            height,
            rgba,
        }
    }

    /// A frame filled with one color.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let pixels = (width as usize) * (height as usize);
        Self::new(width, height, rgba.repeat(pixels))
    }

    /// Devices report zero-sized frames before the first picture arrives.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Encodes frames into image artifacts.
#[derive(Debug, Clone)]
pub struct Rasterizer {
    fallback_width: u32,
    fallback_height: u32,
    jpeg_quality: u8,
}

impl Rasterizer {
    pub fn new(settings: &CaptureSettings) -> Self {
        Self {
            fallback_width: settings.fallback_frame_width.max(1),
            fallback_height: settings.fallback_frame_height.max(1),
            jpeg_quality: settings.thumbnail_jpeg_quality.clamp(1, 100),
        }
    }

    /// Lossless still, used for photo captures.
    pub fn to_png(&self, frame: &Frame) -> LinkcardResult<ArtifactRef> {
        let image = self.prepare(frame)?;
        let mut buf = Vec::new();
        DynamicImage::ImageRgba8(image)
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .map_err(|e| LinkcardError::capture(format!("PNG encoding failed: {e}")))?;
        Ok(ArtifactRef::from_container(ContainerKind::Png, buf))
    }

    /// Compressed still, used for video thumbnails.
    pub fn to_jpeg(&self, frame: &Frame) -> LinkcardResult<ArtifactRef> {
        let rgb = DynamicImage::ImageRgba8(self.prepare(frame)?).to_rgb8();
        let mut buf = Vec::new();
        JpegEncoder::new_with_quality(&mut buf, self.jpeg_quality)
            .encode_image(&rgb)
            .map_err(|e| LinkcardError::capture(format!("JPEG encoding failed: {e}")))?;
        Ok(ArtifactRef::from_container(ContainerKind::Jpeg, buf))
    }

    fn prepare(&self, frame: &Frame) -> LinkcardResult<RgbaImage> {
        if frame.is_empty() {
            tracing::debug!(
                width = self.fallback_width,
                height = self.fallback_height,
                "Empty frame; rasterizing blank fallback canvas"
            );
            return Ok(RgbaImage::new(self.fallback_width, self.fallback_height));
        }

        RgbaImage::from_raw(frame.width, frame.height, frame.rgba.clone()).ok_or_else(|| {
            LinkcardError::capture(format!(
                "Frame buffer of {} bytes does not match {}x{} RGBA",
                frame.rgba.len(),
                frame.width,
                frame.height
            ))
        })
    }
}
