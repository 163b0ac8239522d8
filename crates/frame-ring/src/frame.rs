//! Camera frame type and capture trait

use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, ImageError};
use thiserror::Error;

/// Frame handling errors
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("Frame dimensions do not match data length")]
    Geometry,

    #[error("JPEG encode failed: {0}")]
    Encode(#[from] ImageError),
}

/// Decoded RGB camera frame
#[derive(Debug, Clone)]
pub struct CameraFrame {
    /// RGB pixel data (width * height * 3)
    pub data: Vec<u8>,
    /// Frame width
    pub width: u32,
    /// Frame height
    pub height: u32,
    /// Capture timestamp (milliseconds since the Unix epoch)
    pub timestamp_ms: u64,
    /// Frame sequence number
    pub sequence: u64,
}

impl CameraFrame {
    /// Create a new frame from raw RGB data
    pub fn new(
        data: Vec<u8>,
        width: u32,
        height: u32,
        timestamp_ms: u64,
        sequence: u64,
    ) -> Result<Self, FrameError> {
        if data.len() != (width * height * 3) as usize {
            return Err(FrameError::Geometry);
        }
        Ok(Self {
            data,
            width,
            height,
            timestamp_ms,
            sequence,
        })
    }

    /// Total pixel area of the frame
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Convert to grayscale (luminance 0.299R + 0.587G + 0.114B)
    pub fn to_grayscale(&self) -> Vec<u8> {
        self.data
            .chunks_exact(3)
            .map(|px| {
                (px[0] as f32 * 0.299 + px[1] as f32 * 0.587 + px[2] as f32 * 0.114) as u8
            })
            .collect()
    }

    /// Encode the frame as a JPEG byte stream
    pub fn to_jpeg(&self, quality: u8) -> Result<Vec<u8>, FrameError> {
        let mut out = Vec::new();
        let mut encoder = JpegEncoder::new_with_quality(&mut out, quality);
        encoder.encode(&self.data, self.width, self.height, ExtendedColorType::Rgb8)?;
        Ok(out)
    }
}

/// Camera driver contract; frame acquisition itself is out of scope
pub trait CameraSource {
    /// Grab the next frame, `None` if the device produced nothing
    fn capture_frame(&mut self) -> Option<CameraFrame>;
}
