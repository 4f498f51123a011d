// SPDX-License-Identifier: GPL-3.0-only

//! Capture session state

use crate::pipelines::photo::CapturedPhoto;

/// Whether the environment can capture at all
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SupportStatus {
    /// Not probed yet
    #[default]
    Unknown,
    Supported,
    Unsupported,
}

/// Streaming state machine
///
/// ```text
/// Idle ──start──▶ Activating ──ok──▶ Streaming ──stop/upload──▶ Idle
///                     │
///                     └──fail──▶ Error ──start──▶ Activating
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StreamingState {
    #[default]
    Idle,
    /// A stream request is in flight
    Activating,
    Streaming,
    /// The last stream request failed
    Error,
}

impl StreamingState {
    pub fn is_streaming(&self) -> bool {
        matches!(self, StreamingState::Streaming)
    }

    pub fn is_activating(&self) -> bool {
        matches!(self, StreamingState::Activating)
    }
}

/// Upload state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UploadState {
    #[default]
    NotUploading,
    Uploading,
}

/// Observable state of one guest's camera session
///
/// A copy is published to observers after every transition.
#[derive(Debug, Clone, Default)]
pub struct CaptureSession {
    pub support_status: SupportStatus,
    pub streaming_state: StreamingState,
    /// Whether a device handle is currently held
    pub has_device_handle: bool,
    pub captured_frame: Option<CapturedPhoto>,
    pub upload_state: UploadState,
    pub status_message: String,
    pub error_message: Option<String>,
}

impl CaptureSession {
    pub fn is_uploading(&self) -> bool {
        self.upload_state == UploadState::Uploading
    }

    /// Which controls a front end should enable for this state
    pub fn controls(&self) -> Controls {
        let streaming = self.streaming_state.is_streaming();
        let has_frame = self.captured_frame.is_some();

        Controls {
            can_start: !streaming
                && !self.streaming_state.is_activating()
                && self.support_status != SupportStatus::Unsupported,
            can_capture: streaming,
            can_stop: streaming,
            can_upload: has_frame && !self.is_uploading(),
            can_retake: has_frame,
            show_unsupported_banner: self.support_status == SupportStatus::Unsupported,
        }
    }
}

/// Control availability derived from a [`CaptureSession`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Controls {
    /// "Launch camera"; disabled while a request is in flight
    pub can_start: bool,
    pub can_capture: bool,
    /// "Stop preview"
    pub can_stop: bool,
    pub can_upload: bool,
    pub can_retake: bool,
    pub show_unsupported_banner: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_session_can_only_start() {
        let controls = CaptureSession::default().controls();
        assert!(controls.can_start);
        assert!(!controls.can_capture);
        assert!(!controls.can_upload);
        assert!(!controls.can_retake);
        assert!(!controls.show_unsupported_banner);
    }

    #[test]
    fn test_start_disabled_while_activating() {
        let session = CaptureSession {
            streaming_state: StreamingState::Activating,
            ..Default::default()
        };
        assert!(!session.controls().can_start);
    }

    #[test]
    fn test_unsupported_shows_banner_and_blocks_start() {
        let session = CaptureSession {
            support_status: SupportStatus::Unsupported,
            ..Default::default()
        };
        let controls = session.controls();
        assert!(!controls.can_start);
        assert!(controls.show_unsupported_banner);
    }

    #[test]
    fn test_error_state_allows_retry() {
        let session = CaptureSession {
            support_status: SupportStatus::Supported,
            streaming_state: StreamingState::Error,
            ..Default::default()
        };
        assert!(session.controls().can_start);
    }
}
