// SPDX-License-Identifier: GPL-3.0-only

//! Video4Linux2 capture devices
//!
//! Opens a `/dev/video*` node, negotiates MJPEG (falling back to YUYV) near
//! the ideal resolution and runs a capture thread that decodes each buffer
//! to RGBA and publishes it on the stream's frame feed.
//!
//! V4L2 does not report which way a camera faces, so the facing-mode
//! preference is logged and otherwise ignored.

use super::capture_loop::CaptureLoop;
use super::format_converters::{mjpeg_to_rgba, yuyv_to_rgba};
use super::types::{
    DeviceInfo, FrameFeed, FramePublisher, StreamConstraints, VideoFrame, frame_channel,
};
use super::{MediaDevices, MediaStream};
use crate::constants::stream::{V4L2_BUFFER_COUNT, V4L2_DEQUEUE_TIMEOUT};
use crate::errors::AcquireError;
use futures::FutureExt;
use futures::future::BoxFuture;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info};
use v4l::buffer::Type;
use v4l::io::mmap::Stream as MmapStream;
use v4l::io::traits::CaptureStream;
use v4l::video::Capture;
use v4l::{Device, Format, FourCC};

/// Enumerate V4L2 capture nodes
pub fn enumerate_devices() -> Vec<DeviceInfo> {
    let mut devices: Vec<DeviceInfo> = v4l::context::enum_devices()
        .into_iter()
        .filter_map(|node| {
            let path = node.path().to_string_lossy().to_string();
            let device = Device::with_path(node.path()).ok()?;
            let caps = device.query_caps().ok()?;
            if !caps
                .capabilities
                .contains(v4l::capability::Flags::VIDEO_CAPTURE)
            {
                return None;
            }
            Some(DeviceInfo {
                name: node.name().unwrap_or_else(|| caps.card.clone()),
                path,
                driver: Some(caps.driver),
            })
        })
        .collect();

    devices.sort_by(|a, b| a.path.cmp(&b.path));
    devices
}

/// V4L2 device capability
#[derive(Debug, Clone, Default)]
pub struct V4l2Devices {
    /// Explicit node to open; the first capture node otherwise
    device_path: Option<PathBuf>,
}

impl V4l2Devices {
    pub fn new(device_path: Option<PathBuf>) -> Self {
        Self { device_path }
    }

    fn resolve_path(&self) -> Result<PathBuf, AcquireError> {
        if let Some(path) = &self.device_path {
            return Ok(path.clone());
        }
        enumerate_devices()
            .into_iter()
            .next()
            .map(|d| PathBuf::from(d.path))
            .ok_or_else(|| AcquireError::NotFound("No V4L2 capture device".into()))
    }

    async fn open(
        &self,
        constraints: &StreamConstraints,
    ) -> Result<Box<dyn MediaStream>, AcquireError> {
        let path = self.resolve_path()?;
        let constraints = constraints.clone();

        info!(
            path = %path.display(),
            width = constraints.ideal_width,
            height = constraints.ideal_height,
            facing = %constraints.facing_mode,
            "Opening V4L2 device"
        );

        // Opening and format negotiation are blocking ioctls
        let stream = tokio::task::spawn_blocking(move || V4l2Stream::open(&path, &constraints))
            .await
            .map_err(|e| AcquireError::Other(format!("Device open task error: {}", e)))??;

        Ok(Box::new(stream))
    }
}

impl MediaDevices for V4l2Devices {
    fn is_supported(&self) -> bool {
        match &self.device_path {
            Some(path) => path.exists(),
            None => !v4l::context::enum_devices().is_empty(),
        }
    }

    fn acquire<'a>(
        &'a self,
        constraints: &'a StreamConstraints,
    ) -> BoxFuture<'a, Result<Box<dyn MediaStream>, AcquireError>> {
        self.open(constraints).boxed()
    }
}

/// Negotiated wire format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WireFormat {
    Mjpeg,
    Yuyv,
}

/// A running V4L2 capture stream
///
/// Stopping joins the capture thread, so the device node is closed and its
/// buffers unmapped by the time `stop` returns.
pub struct V4l2Stream {
    id: String,
    feed: FrameFeed,
    capture: CaptureLoop,
}

impl V4l2Stream {
    fn open(path: &Path, constraints: &StreamConstraints) -> Result<Self, AcquireError> {
        let device = Device::with_path(path)?;

        let wire = negotiate_format(&device, constraints)?;
        let (publisher, feed) = frame_channel();
        let id = format!("v4l2:{}", path.display());

        let capture = CaptureLoop::spawn("v4l2-capture", move |running| {
            capture_loop(device, wire, publisher, running)
        })
        .map_err(|e| AcquireError::Other(format!("Failed to spawn capture thread: {}", e)))?;

        Ok(Self { id, feed, capture })
    }
}

impl MediaStream for V4l2Stream {
    fn id(&self) -> &str {
        &self.id
    }

    fn frames(&self) -> FrameFeed {
        self.feed.clone()
    }

    fn live_tracks(&self) -> usize {
        usize::from(self.capture.is_running())
    }

    fn stop(&self) {
        // Bounded by the dequeue timeout of the capture loop
        self.capture.stop();
        debug!(stream = %self.id, "V4L2 stream stopped, device closed");
    }
}

fn negotiate_format(
    device: &Device,
    constraints: &StreamConstraints,
) -> Result<WireFormat, AcquireError> {
    for (fourcc, wire) in [(b"MJPG", WireFormat::Mjpeg), (b"YUYV", WireFormat::Yuyv)] {
        let requested = Format::new(
            constraints.ideal_width,
            constraints.ideal_height,
            FourCC::new(fourcc),
        );
        let applied = device.set_format(&requested)?;

        if applied.fourcc == FourCC::new(fourcc) {
            info!(
                width = applied.width,
                height = applied.height,
                format = ?wire,
                "Negotiated V4L2 format"
            );
            return Ok(wire);
        }
        debug!(requested = ?wire, got = ?applied.fourcc, "Format not accepted, trying next");
    }

    Err(AcquireError::NotReadable(
        "Device supports neither MJPEG nor YUYV".into(),
    ))
}

fn capture_loop(
    device: Device,
    wire: WireFormat,
    publisher: FramePublisher,
    running: &AtomicBool,
) -> std::io::Result<()> {
    let format = device.format()?;
    let mut stream = MmapStream::with_buffers(&device, Type::VideoCapture, V4L2_BUFFER_COUNT)?;
    stream.set_timeout(V4L2_DEQUEUE_TIMEOUT);

    while running.load(Ordering::SeqCst) && !publisher.is_closed() {
        let (buffer, _metadata) = match CaptureStream::next(&mut stream) {
            Ok(dequeued) => dequeued,
            Err(e) if e.kind() == std::io::ErrorKind::TimedOut => continue,
            Err(e) => return Err(e),
        };

        let frame = match wire {
            WireFormat::Mjpeg => match mjpeg_to_rgba(buffer) {
                Some((rgba, width, height)) => VideoFrame::from_rgba(width, height, rgba),
                None => {
                    debug!("Skipping corrupt MJPEG buffer");
                    continue;
                }
            },
            WireFormat::Yuyv => VideoFrame::from_rgba(
                format.width,
                format.height,
                yuyv_to_rgba(buffer, format.width, format.height, format.stride),
            ),
        };

        publisher.send_replace(Some(Arc::new(frame)));
    }

    Ok(())
}
