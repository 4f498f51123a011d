// SPDX-License-Identifier: GPL-3.0-only

//! Media device abstraction
//!
//! The capture flow never talks to hardware directly. It goes through the
//! [`MediaDevices`] capability and receives live [`MediaStream`]s, which it
//! keeps wrapped in a [`DeviceHandle`] so every exit path releases them.
//!
//! ```text
//! ┌──────────────────┐  acquire   ┌───────────────┐
//! │   CaptureFlow    │──────────▶ │ MediaDevices  │
//! └────────┬─────────┘            └───────┬───────┘
//!          │ owns                         │
//!          ▼                              ▼
//! ┌──────────────────┐  wraps     ┌───────────────┐
//! │   DeviceHandle   │──────────▶ │  MediaStream  │──▶ FrameFeed
//! └──────────────────┘            └───────────────┘
//! ```
//!
//! # Backends
//!
//! - [`v4l2`]: Linux capture devices through Video4Linux2
//! - [`virtual_camera`]: synthetic test pattern or still image source

pub mod capture_loop;
pub mod format_converters;
pub mod types;
#[cfg(feature = "v4l2")]
pub mod v4l2;
pub mod virtual_camera;

pub use types::*;

use crate::errors::AcquireError;
use futures::future::BoxFuture;
use tracing::debug;

/// Platform capability for camera-like capture devices
pub trait MediaDevices: Send + Sync {
    /// Whether this environment can grant access to a capture device at all
    ///
    /// Must not open any device.
    fn is_supported(&self) -> bool;

    /// Request a live video stream matching `constraints` as closely as possible
    fn acquire<'a>(
        &'a self,
        constraints: &'a StreamConstraints,
    ) -> BoxFuture<'a, Result<Box<dyn MediaStream>, AcquireError>>;
}

/// A live video source
pub trait MediaStream: Send + Sync {
    /// Stable identifier for logging
    fn id(&self) -> &str;

    /// Feed of the most recent frame
    fn frames(&self) -> FrameFeed;

    /// Number of tracks still producing data
    fn live_tracks(&self) -> usize;

    /// Stop every track. Calling this more than once is harmless.
    fn stop(&self);
}

/// Exclusive ownership of an acquired stream
///
/// Dropping the handle stops all tracks.
pub struct DeviceHandle {
    stream: Box<dyn MediaStream>,
}

impl DeviceHandle {
    pub fn new(stream: Box<dyn MediaStream>) -> Self {
        Self { stream }
    }

    pub fn id(&self) -> &str {
        self.stream.id()
    }

    pub fn frames(&self) -> FrameFeed {
        self.stream.frames()
    }

    pub fn is_live(&self) -> bool {
        self.stream.live_tracks() > 0
    }
}

impl Drop for DeviceHandle {
    fn drop(&mut self) {
        debug!(stream = %self.stream.id(), "Releasing device handle");
        self.stream.stop();
    }
}

impl std::fmt::Debug for DeviceHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceHandle")
            .field("id", &self.stream.id())
            .field("live_tracks", &self.stream.live_tracks())
            .finish()
    }
}

/// Pick the device backend for this build
///
/// An explicit V4L2 node wins; otherwise the first capture node found.
#[cfg(feature = "v4l2")]
pub fn default_devices(device_path: Option<std::path::PathBuf>) -> Box<dyn MediaDevices> {
    Box::new(v4l2::V4l2Devices::new(device_path))
}

/// Without V4L2 support only the virtual test pattern is available
#[cfg(not(feature = "v4l2"))]
pub fn default_devices(_device_path: Option<std::path::PathBuf>) -> Box<dyn MediaDevices> {
    Box::new(virtual_camera::VirtualDevices::test_pattern())
}
