// SPDX-License-Identifier: GPL-3.0-only

//! Still photo encoding
//!
//! A captured frame is drawn into an off-screen RGB raster sized to the
//! frame's native dimensions, then compressed to JPEG.

use crate::backends::VideoFrame;
use crate::errors::PhotoError;
use chrono::{DateTime, Local};
use image::RgbImage;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// Encoding quality settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EncodingQuality {
    /// Low quality (high compression)
    Low,
    /// Medium quality (balanced)
    Medium,
    /// High quality (low compression)
    #[default]
    High,
    /// Maximum quality (minimal compression)
    Maximum,
}

impl EncodingQuality {
    /// Get JPEG quality value (0-100)
    pub fn jpeg_quality(&self) -> u8 {
        match self {
            EncodingQuality::Low => 60,
            EncodingQuality::Medium => 80,
            EncodingQuality::High => 92,
            EncodingQuality::Maximum => 98,
        }
    }
}

/// An encoded still, ready to display or upload
#[derive(Debug, Clone)]
pub struct CapturedPhoto {
    /// Unique per capture, so a retake is never mistaken for the original
    pub id: Uuid,
    pub data: Arc<[u8]>,
    pub width: u32,
    pub height: u32,
    pub captured_at: DateTime<Local>,
}

impl CapturedPhoto {
    pub fn mime_type(&self) -> &'static str {
        "image/jpeg"
    }

    pub fn extension(&self) -> &'static str {
        "jpg"
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Photo encoder
#[derive(Debug, Clone, Copy, Default)]
pub struct PhotoEncoder {
    quality: EncodingQuality,
}

impl PhotoEncoder {
    pub fn new(quality: EncodingQuality) -> Self {
        Self { quality }
    }

    pub fn quality(&self) -> EncodingQuality {
        self.quality
    }

    /// Rasterise and encode a frame
    ///
    /// Runs synchronously; a single 720p still encodes in a few milliseconds.
    pub fn encode(&self, frame: &VideoFrame) -> Result<CapturedPhoto, PhotoError> {
        if !frame.has_native_size() {
            return Err(PhotoError::NoFrameAvailable);
        }

        let raster = draw_frame(frame)?;
        let data = encode_jpeg(&raster, self.quality)?;

        info!(
            width = frame.width,
            height = frame.height,
            size = data.len(),
            quality = self.quality.jpeg_quality(),
            "Photo encoded"
        );

        Ok(CapturedPhoto {
            id: Uuid::new_v4(),
            data: Arc::from(data.into_boxed_slice()),
            width: frame.width,
            height: frame.height,
            captured_at: Local::now(),
        })
    }
}

/// Draw a frame into an RGB raster of its native size
///
/// Fails when the buffer is shorter than its declared geometry, e.g. a
/// truncated device buffer.
pub fn draw_frame(frame: &VideoFrame) -> Result<RgbImage, PhotoError> {
    if !frame.has_native_size() {
        return Err(PhotoError::NoFrameAvailable);
    }

    let bpp = frame.format.bytes_per_pixel();
    let row_bytes = (frame.width * bpp) as usize;
    let stride = frame.stride as usize;

    if stride < row_bytes {
        return Err(PhotoError::RasterUnavailable(format!(
            "stride {} shorter than row {}",
            stride, row_bytes
        )));
    }
    let needed = stride * (frame.height as usize - 1) + row_bytes;
    if frame.data.len() < needed {
        return Err(PhotoError::RasterUnavailable(format!(
            "buffer holds {} bytes, frame needs {}",
            frame.data.len(),
            needed
        )));
    }

    let mut raster = RgbImage::new(frame.width, frame.height);
    for (y, row) in raster.rows_mut().enumerate() {
        let src = &frame.data[y * stride..y * stride + row_bytes];
        for (pixel, px) in row.zip(src.chunks_exact(bpp as usize)) {
            pixel.0 = [px[0], px[1], px[2]];
        }
    }

    debug!(width = frame.width, height = frame.height, "Frame drawn to raster");
    Ok(raster)
}

/// Encode image as JPEG
fn encode_jpeg(image: &RgbImage, quality: EncodingQuality) -> Result<Vec<u8>, PhotoError> {
    let mut buffer = Vec::new();
    let mut cursor = std::io::Cursor::new(&mut buffer);

    let mut encoder =
        image::codecs::jpeg::JpegEncoder::new_with_quality(&mut cursor, quality.jpeg_quality());

    encoder
        .encode(
            image.as_raw(),
            image.width(),
            image.height(),
            image::ExtendedColorType::Rgb8,
        )
        .map_err(|e| PhotoError::EncodingFailed(format!("JPEG encoding failed: {}", e)))?;

    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jpeg_quality_values() {
        assert_eq!(EncodingQuality::Low.jpeg_quality(), 60);
        assert_eq!(EncodingQuality::Medium.jpeg_quality(), 80);
        assert_eq!(EncodingQuality::High.jpeg_quality(), 92);
        assert_eq!(EncodingQuality::Maximum.jpeg_quality(), 98);
        assert_eq!(EncodingQuality::default(), EncodingQuality::High);
    }

    #[test]
    fn test_encode_produces_jpeg_of_native_size() {
        let frame = VideoFrame::from_rgba(16, 8, vec![200; 16 * 8 * 4]);
        let photo = PhotoEncoder::default().encode(&frame).unwrap();

        assert_eq!((photo.width, photo.height), (16, 8));
        assert_eq!(&photo.data[..2], &[0xFF, 0xD8]);

        let decoded = image::load_from_memory(&photo.data).unwrap();
        assert_eq!(decoded.width(), 16);
        assert_eq!(decoded.height(), 8);
    }

    #[test]
    fn test_zero_sized_frame_is_not_ready() {
        let frame = VideoFrame::from_rgba(0, 0, Vec::new());
        assert_eq!(
            PhotoEncoder::default().encode(&frame).unwrap_err(),
            PhotoError::NoFrameAvailable
        );
    }

    #[test]
    fn test_truncated_buffer_has_no_raster() {
        let frame = VideoFrame::from_rgba(16, 8, vec![0; 10]);
        assert!(matches!(
            draw_frame(&frame),
            Err(PhotoError::RasterUnavailable(_))
        ));
    }

    #[test]
    fn test_padded_stride_is_respected() {
        let mut frame = VideoFrame::from_rgba(2, 2, Vec::new());
        frame.stride = 12;
        // Row 0: red, red, padding; row 1: blue, blue
        let mut data = vec![255, 0, 0, 255, 255, 0, 0, 255, 9, 9, 9, 9];
        data.extend_from_slice(&[0, 0, 255, 255, 0, 0, 255, 255]);
        frame.data = Arc::from(data.into_boxed_slice());

        let raster = draw_frame(&frame).unwrap();
        assert_eq!(raster.get_pixel(1, 0).0, [255, 0, 0]);
        assert_eq!(raster.get_pixel(0, 1).0, [0, 0, 255]);
    }

    #[test]
    fn test_each_capture_gets_unique_id() {
        let frame = VideoFrame::from_rgba(4, 4, vec![0; 64]);
        let encoder = PhotoEncoder::new(EncodingQuality::Low);
        let a = encoder.encode(&frame).unwrap();
        let b = encoder.encode(&frame).unwrap();
        assert_ne!(a.id, b.id);
    }
}
