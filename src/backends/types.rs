// SPDX-License-Identifier: GPL-3.0-only

//! Shared types for media device backends

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;

/// Which way the requested camera should face
///
/// Only ever an ideal: backends that cannot tell cameras apart ignore it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacingMode {
    /// Rear camera, pointing away from the guest
    #[default]
    Environment,
    /// Front camera, pointing at the guest
    User,
}

impl std::fmt::Display for FacingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FacingMode::Environment => write!(f, "environment"),
            FacingMode::User => write!(f, "user"),
        }
    }
}

/// Constraints for a stream request
///
/// All values are negotiated ideals. A device may hand back a different
/// resolution, so consumers read dimensions from the frames themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamConstraints {
    /// Audio is never requested by the capture flow
    pub audio: bool,
    pub facing_mode: FacingMode,
    pub ideal_width: u32,
    pub ideal_height: u32,
}

impl Default for StreamConstraints {
    fn default() -> Self {
        Self {
            audio: false,
            facing_mode: FacingMode::Environment,
            ideal_width: crate::constants::stream::IDEAL_WIDTH,
            ideal_height: crate::constants::stream::IDEAL_HEIGHT,
        }
    }
}

/// Pixel layout of a [`VideoFrame`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// 8-bit RGBA, 4 bytes per pixel
    RGBA,
    /// 8-bit RGB, 3 bytes per pixel
    RGB,
}

impl PixelFormat {
    pub fn bytes_per_pixel(&self) -> u32 {
        match self {
            PixelFormat::RGBA => 4,
            PixelFormat::RGB => 3,
        }
    }
}

/// A single decoded frame from a live stream
#[derive(Debug, Clone)]
pub struct VideoFrame {
    pub width: u32,
    pub height: u32,
    pub data: Arc<[u8]>,
    pub format: PixelFormat,
    /// Bytes per row, may include padding
    pub stride: u32,
    pub captured_at: Instant,
}

impl VideoFrame {
    /// Build a tightly packed RGBA frame
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            data: Arc::from(data.into_boxed_slice()),
            format: PixelFormat::RGBA,
            stride: width * 4,
            captured_at: Instant::now(),
        }
    }

    /// True once the frame carries real, non-zero dimensions
    pub fn has_native_size(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

/// Latest-frame feed published by a live stream
///
/// Holds `None` until the device delivered its first frame.
pub type FrameFeed = watch::Receiver<Option<Arc<VideoFrame>>>;

/// Producer half of a [`FrameFeed`]
pub type FramePublisher = watch::Sender<Option<Arc<VideoFrame>>>;

/// Create an empty feed pair
pub fn frame_channel() -> (FramePublisher, FrameFeed) {
    watch::channel(None)
}

/// Description of a capture device as reported by a backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub name: String,
    pub path: String,
    pub driver: Option<String>,
}
