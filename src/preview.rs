// SPDX-License-Identifier: GPL-3.0-only

//! Live preview surface
//!
//! The capture flow binds the active stream's frame feed to a preview
//! surface and reads the still for capture back from it. The surface is a
//! sink only: it never owns or stops the stream.

use crate::backends::{FrameFeed, VideoFrame};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;

/// Where the live feed is shown
pub trait PreviewSurface: Send + Sync {
    /// Bind a feed, replacing any previous binding
    fn attach(&self, feed: FrameFeed);

    /// Drop the current binding
    fn detach(&self);

    fn is_attached(&self) -> bool;

    /// Native size of the most recent frame, if it has real dimensions
    fn native_size(&self) -> Option<(u32, u32)>;

    /// The frame currently on screen
    fn current_frame(&self) -> Option<Arc<VideoFrame>>;
}

/// In-memory preview that tracks the latest frame of the bound feed
#[derive(Debug, Default)]
pub struct VideoPreview {
    feed: Mutex<Option<FrameFeed>>,
}

impl VideoPreview {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreviewSurface for VideoPreview {
    fn attach(&self, feed: FrameFeed) {
        debug!("Preview attached");
        *self.feed.lock().unwrap_or_else(PoisonError::into_inner) = Some(feed);
    }

    fn detach(&self) {
        if self
            .feed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .is_some()
        {
            debug!("Preview detached");
        }
    }

    fn is_attached(&self) -> bool {
        self.feed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    fn native_size(&self) -> Option<(u32, u32)> {
        self.current_frame()
            .filter(|frame| frame.has_native_size())
            .map(|frame| (frame.width, frame.height))
    }

    fn current_frame(&self) -> Option<Arc<VideoFrame>> {
        let guard = self.feed.lock().unwrap_or_else(PoisonError::into_inner);
        guard.as_ref().and_then(|feed| feed.borrow().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::frame_channel;

    #[test]
    fn test_unbound_preview_has_no_size() {
        let preview = VideoPreview::new();
        assert!(!preview.is_attached());
        assert_eq!(preview.native_size(), None);
    }

    #[test]
    fn test_size_follows_latest_frame() {
        let preview = VideoPreview::new();
        let (publisher, feed) = frame_channel();
        preview.attach(feed);

        // Bound but nothing delivered yet
        assert_eq!(preview.native_size(), None);

        publisher.send_replace(Some(Arc::new(VideoFrame::from_rgba(0, 0, Vec::new()))));
        assert_eq!(preview.native_size(), None);

        publisher.send_replace(Some(Arc::new(VideoFrame::from_rgba(
            2,
            1,
            vec![0; 8],
        ))));
        assert_eq!(preview.native_size(), Some((2, 1)));

        preview.detach();
        assert!(!preview.is_attached());
        assert_eq!(preview.native_size(), None);
    }
}
