// SPDX-License-Identifier: GPL-3.0-only

//! Virtual capture devices
//!
//! Stand-ins for real hardware: an animated test pattern rendered at the
//! requested resolution, or a still image file served as a one-frame feed.
//! Used by the CLI (`snap --virtual`, `snap --image`) and by tests.

use super::types::{FrameFeed, FramePublisher, StreamConstraints, VideoFrame, frame_channel};
use super::{MediaDevices, MediaStream};
use crate::errors::AcquireError;
use futures::FutureExt;
use futures::future::BoxFuture;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, info};

/// Frame interval of the animated test pattern (~30 fps)
const PATTERN_FRAME_INTERVAL: Duration = Duration::from_millis(33);

/// What a virtual device streams
#[derive(Debug, Clone)]
pub enum VirtualSource {
    /// Animated gradient at the requested resolution
    TestPattern,
    /// A still image decoded from disk
    ImageFile(PathBuf),
}

/// Virtual device capability
#[derive(Debug)]
pub struct VirtualDevices {
    source: VirtualSource,
    supported: bool,
    opened: AtomicU64,
}

impl VirtualDevices {
    pub fn test_pattern() -> Self {
        Self::new(VirtualSource::TestPattern)
    }

    pub fn from_image(path: impl Into<PathBuf>) -> Self {
        Self::new(VirtualSource::ImageFile(path.into()))
    }

    /// An environment without any capture capability
    pub fn unsupported() -> Self {
        Self {
            supported: false,
            ..Self::test_pattern()
        }
    }

    fn new(source: VirtualSource) -> Self {
        Self {
            source,
            supported: true,
            opened: AtomicU64::new(0),
        }
    }

    /// Number of streams handed out so far
    pub fn opened(&self) -> u64 {
        self.opened.load(Ordering::SeqCst)
    }

    async fn open(
        &self,
        constraints: &StreamConstraints,
    ) -> Result<Box<dyn MediaStream>, AcquireError> {
        if !self.supported {
            return Err(AcquireError::NotFound("No virtual device available".into()));
        }

        let serial = self.opened.fetch_add(1, Ordering::SeqCst) + 1;
        let (publisher, feed) = frame_channel();
        let live = Arc::new(AtomicBool::new(true));

        match &self.source {
            VirtualSource::TestPattern => {
                let (width, height) = (constraints.ideal_width, constraints.ideal_height);
                info!(width, height, facing = %constraints.facing_mode, "Starting virtual test pattern");
                publisher.send_replace(Some(Arc::new(render_pattern(width, height, 0))));
                tokio::spawn(animate_pattern(publisher, Arc::clone(&live), width, height));
            }
            VirtualSource::ImageFile(path) => {
                let frame = load_image_frame(path).await?;
                publisher.send_replace(Some(Arc::new(frame)));
            }
        }

        Ok(Box::new(VirtualStream {
            id: format!("virtual:{}", serial),
            feed,
            live,
        }))
    }
}

impl MediaDevices for VirtualDevices {
    fn is_supported(&self) -> bool {
        self.supported
    }

    fn acquire<'a>(
        &'a self,
        constraints: &'a StreamConstraints,
    ) -> BoxFuture<'a, Result<Box<dyn MediaStream>, AcquireError>> {
        self.open(constraints).boxed()
    }
}

/// A stream served by [`VirtualDevices`]
pub struct VirtualStream {
    id: String,
    feed: FrameFeed,
    live: Arc<AtomicBool>,
}

impl MediaStream for VirtualStream {
    fn id(&self) -> &str {
        &self.id
    }

    fn frames(&self) -> FrameFeed {
        self.feed.clone()
    }

    fn live_tracks(&self) -> usize {
        usize::from(self.live.load(Ordering::SeqCst))
    }

    fn stop(&self) {
        if self.live.swap(false, Ordering::SeqCst) {
            debug!(stream = %self.id, "Virtual stream stopped");
        }
    }
}

async fn animate_pattern(publisher: FramePublisher, live: Arc<AtomicBool>, width: u32, height: u32) {
    let mut interval = tokio::time::interval(PATTERN_FRAME_INTERVAL);
    let mut tick = 0u32;

    loop {
        interval.tick().await;
        if !live.load(Ordering::SeqCst) || publisher.is_closed() {
            break;
        }
        tick = tick.wrapping_add(1);
        publisher.send_replace(Some(Arc::new(render_pattern(width, height, tick))));
    }
}

/// Render one gradient frame with a sweeping blue band
pub fn render_pattern(width: u32, height: u32, tick: u32) -> VideoFrame {
    let mut data = Vec::with_capacity((width * height * 4) as usize);
    let w = width.max(1);
    let h = height.max(1);
    let offset = tick.wrapping_mul(8);

    for y in 0..height {
        for x in 0..width {
            data.push((x * 255 / w) as u8);
            data.push((y * 255 / h) as u8);
            data.push((x.wrapping_add(offset) % w * 255 / w) as u8);
            data.push(255);
        }
    }

    VideoFrame::from_rgba(width, height, data)
}

async fn load_image_frame(path: &Path) -> Result<VideoFrame, AcquireError> {
    info!(path = %path.display(), "Loading image file as virtual feed");

    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || {
        let img = image::open(&path).map_err(|e| {
            AcquireError::NotReadable(format!("Failed to load image '{}': {}", path.display(), e))
        })?;
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        Ok(VideoFrame::from_rgba(width, height, rgba.into_raw()))
    })
    .await
    .map_err(|e| AcquireError::Other(format!("Image load task error: {}", e)))?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_has_requested_size() {
        let frame = render_pattern(8, 4, 3);
        assert_eq!(frame.width, 8);
        assert_eq!(frame.height, 4);
        assert_eq!(frame.data.len(), 8 * 4 * 4);
        assert!(frame.has_native_size());
    }

    #[tokio::test]
    async fn test_stream_delivers_first_frame_immediately() {
        let devices = VirtualDevices::test_pattern();
        let constraints = StreamConstraints {
            ideal_width: 32,
            ideal_height: 18,
            ..Default::default()
        };

        let stream = devices.acquire(&constraints).await.unwrap();
        let frame = stream.frames().borrow().clone().unwrap();
        assert_eq!((frame.width, frame.height), (32, 18));
        assert_eq!(stream.live_tracks(), 1);

        stream.stop();
        stream.stop();
        assert_eq!(stream.live_tracks(), 0);
        assert_eq!(devices.opened(), 1);
    }

    #[tokio::test]
    async fn test_unsupported_devices_refuse() {
        let devices = VirtualDevices::unsupported();
        assert!(!devices.is_supported());
        let result = devices.acquire(&StreamConstraints::default()).await;
        assert!(matches!(result, Err(AcquireError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_missing_image_is_not_readable() {
        let devices = VirtualDevices::from_image("/nonexistent/guest.jpg");
        let result = devices.acquire(&StreamConstraints::default()).await;
        assert!(matches!(result, Err(AcquireError::NotReadable(_))));
    }
}
