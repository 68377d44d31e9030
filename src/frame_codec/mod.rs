//! FrameCodec - JPEG decode/encode for relayed frames
//!
//! ## Responsibilities
//!
//! - Decode uploaded image bytes into an owned RGB frame
//! - Encode frames to JPEG for snapshots, stream parts and saved spill frames
//! - Run codec work on the blocking pool so request tasks never stall

use crate::error::{Error, Result};
use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::RgbImage;
use std::sync::Arc;

/// Default JPEG quality
pub const DEFAULT_JPEG_QUALITY: u8 = 90;

/// Decoded camera frame
///
/// Pixel data is shared behind an `Arc`, so cloning a frame out of a lock
/// is a pointer copy and never exposes a partially written image.
#[derive(Debug, Clone)]
pub struct Frame {
    image: Arc<RgbImage>,
}

impl Frame {
    pub fn new(image: RgbImage) -> Self {
        Self {
            image: Arc::new(image),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    /// True if both frames share the same pixel buffer
    pub fn same_buffer(&self, other: &Frame) -> bool {
        Arc::ptr_eq(&self.image, &other.image)
    }
}

/// Decode image bytes
///
/// Returns `None` for malformed or unsupported input.
pub fn decode(data: &[u8]) -> Option<Frame> {
    match image::load_from_memory(data) {
        Ok(img) if img.width() > 0 && img.height() > 0 => Some(Frame::new(img.to_rgb8())),
        Ok(_) => None,
        Err(e) => {
            tracing::trace!(error = %e, size = data.len(), "Image decode failed");
            None
        }
    }
}

/// Encode frame as JPEG
pub fn encode(frame: &Frame, quality: u8) -> Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(frame.image.as_raw().len() / 8);
    {
        let mut encoder = JpegEncoder::new_with_quality(&mut buf, quality.clamp(1, 100));
        encoder.encode_image(frame.image())?;
    }
    Ok(buf)
}

/// Decode on the blocking pool
pub async fn decode_blocking(data: Bytes) -> Result<Option<Frame>> {
    Ok(tokio::task::spawn_blocking(move || decode(&data)).await?)
}

/// Encode on the blocking pool
pub async fn encode_blocking(frame: Frame, quality: u8) -> Result<Bytes> {
    let jpeg = tokio::task::spawn_blocking(move || encode(&frame, quality)).await??;
    Ok(Bytes::from(jpeg))
}

/// Decode or fail with [`Error::InvalidImage`]
pub async fn decode_required(data: Bytes) -> Result<Frame> {
    let size = data.len();
    decode_blocking(data)
        .await?
        .ok_or_else(|| Error::InvalidImage(format!("{} bytes could not be decoded", size)))
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use image::Rgb;

    /// Solid-colour frame
    pub fn solid_frame(width: u32, height: u32, rgb: [u8; 3]) -> Frame {
        Frame::new(RgbImage::from_pixel(width, height, Rgb(rgb)))
    }

    /// JPEG bytes of a solid-colour frame
    pub fn solid_jpeg(width: u32, height: u32, rgb: [u8; 3]) -> Vec<u8> {
        encode(&solid_frame(width, height, rgb), 95).unwrap()
    }
}
