// SPDX-License-Identifier: GPL-3.0-only

//! Capture flow operations
//!
//! All state lives in one mutex that is never held across an `.await`.
//! Every transition publishes a [`CaptureSession`] snapshot to observers
//! and then fires at most one notification, outside the lock.

use super::state::{CaptureSession, StreamingState, SupportStatus, UploadState};
use crate::backends::{DeviceHandle, MediaDevices, StreamConstraints};
use crate::config::Config;
use crate::constants::messages;
use crate::errors::CaptureError;
use crate::notify::{Notification, NotificationSink};
use crate::pipelines::photo::{CapturedPhoto, PhotoEncoder};
use crate::preview::PreviewSurface;
use crate::upload::Uploader;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

struct Inner {
    session: CaptureSession,
    handle: Option<DeviceHandle>,
    /// Set when a stop arrives while a stream request is in flight
    cancel_pending: bool,
}

/// One guest's camera session and the operations on it
pub struct CaptureFlow {
    devices: Arc<dyn MediaDevices>,
    uploader: Arc<dyn Uploader>,
    notifier: Arc<dyn NotificationSink>,
    preview: Arc<dyn PreviewSurface>,
    constraints: StreamConstraints,
    encoder: PhotoEncoder,
    inner: Mutex<Inner>,
    observers: watch::Sender<CaptureSession>,
}

impl CaptureFlow {
    pub fn new(
        devices: Arc<dyn MediaDevices>,
        uploader: Arc<dyn Uploader>,
        notifier: Arc<dyn NotificationSink>,
        preview: Arc<dyn PreviewSurface>,
    ) -> Self {
        let session = CaptureSession::default();
        let (observers, _) = watch::channel(session.clone());

        Self {
            devices,
            uploader,
            notifier,
            preview,
            constraints: StreamConstraints::default(),
            encoder: PhotoEncoder::default(),
            inner: Mutex::new(Inner {
                session,
                handle: None,
                cancel_pending: false,
            }),
            observers,
        }
    }

    /// Apply stream and encoding preferences
    pub fn with_config(mut self, config: &Config) -> Self {
        self.constraints = config.stream_constraints();
        self.encoder = PhotoEncoder::new(config.jpeg_quality);
        self
    }

    pub fn with_constraints(mut self, constraints: StreamConstraints) -> Self {
        self.constraints = constraints;
        self
    }

    /// Mount the session: probe the environment once
    pub fn mount(self) -> Self {
        self.probe_support();
        self
    }

    /// Current state
    pub fn snapshot(&self) -> CaptureSession {
        self.lock().session.clone()
    }

    /// Observe every state transition
    pub fn subscribe(&self) -> watch::Receiver<CaptureSession> {
        self.observers.subscribe()
    }

    pub fn constraints(&self) -> &StreamConstraints {
        &self.constraints
    }

    /// Check whether the environment exposes a capture capability
    pub fn probe_support(&self) -> SupportStatus {
        let status = if self.devices.is_supported() {
            SupportStatus::Supported
        } else {
            SupportStatus::Unsupported
        };

        info!(?status, "Probed camera support");

        let mut inner = self.lock();
        inner.session.support_status = status;
        self.publish(inner, None);
        status
    }

    /// Acquire the camera and bind it to the preview
    ///
    /// Ignored while a request is already in flight or the camera is
    /// streaming. Failures leave the session in `Error` with no handle held.
    pub async fn start_camera(&self) -> Result<(), CaptureError> {
        {
            let mut inner = self.lock();

            match inner.session.streaming_state {
                StreamingState::Activating | StreamingState::Streaming => {
                    debug!(state = ?inner.session.streaming_state, "Start ignored");
                    return Ok(());
                }
                StreamingState::Idle | StreamingState::Error => {}
            }

            if inner.session.support_status == SupportStatus::Unknown {
                inner.session.support_status = if self.devices.is_supported() {
                    SupportStatus::Supported
                } else {
                    SupportStatus::Unsupported
                };
            }

            if inner.session.support_status == SupportStatus::Unsupported {
                warn!("Camera start requested on an unsupported environment");
                inner.session.error_message = Some(messages::ERROR_UNSUPPORTED.to_string());
                self.publish(inner, Some(Notification::info(messages::TOAST_UNSUPPORTED)));
                return Err(CaptureError::UnsupportedEnvironment);
            }

            inner.session.streaming_state = StreamingState::Activating;
            inner.session.error_message = None;
            inner.session.status_message = messages::STATUS_REQUESTING.to_string();
            inner.cancel_pending = false;
            self.publish(inner, None);
        }

        info!(
            width = self.constraints.ideal_width,
            height = self.constraints.ideal_height,
            facing = %self.constraints.facing_mode,
            "Requesting camera stream"
        );
        let result = self.devices.acquire(&self.constraints).await;

        let mut inner = self.lock();

        if std::mem::take(&mut inner.cancel_pending) {
            if let Ok(stream) = result {
                // Handle drop stops the tracks straight away
                drop(DeviceHandle::new(stream));
            }
            info!("Camera stopped while starting, stream released");
            inner.session.streaming_state = StreamingState::Idle;
            self.publish(inner, None);
            return Ok(());
        }

        match result {
            Ok(stream) => {
                let handle = DeviceHandle::new(stream);
                self.preview.attach(handle.frames());
                info!(stream = %handle.id(), "Camera streaming");

                inner.handle = Some(handle);
                inner.session.has_device_handle = true;
                inner.session.streaming_state = StreamingState::Streaming;
                inner.session.error_message = None;
                inner.session.status_message = messages::STATUS_READY.to_string();
                self.publish(inner, Some(Notification::info(messages::TOAST_READY)));
                Ok(())
            }
            Err(e) => {
                let err = CaptureError::from(e);
                error!(error = %err, "Camera acquisition failed");

                Self::release_stream(&mut inner, self.preview.as_ref());
                inner.session.streaming_state = StreamingState::Error;
                inner.session.error_message = Some(err.user_message().to_string());
                inner.session.status_message = messages::STATUS_BLOCKED.to_string();
                self.publish(inner, Some(Notification::error(messages::TOAST_UNAVAILABLE)));
                Err(err)
            }
        }
    }

    /// Grab the frame on the preview as a JPEG still
    ///
    /// The live stream keeps running. Failures only set the error message.
    pub fn capture_photo(&self) -> Result<(), CaptureError> {
        let mut inner = self.lock();

        let frame = if inner.session.streaming_state.is_streaming()
            && self.preview.native_size().is_some()
        {
            self.preview.current_frame()
        } else {
            None
        };

        let result = match frame {
            Some(frame) => self.encoder.encode(&frame).map_err(CaptureError::from),
            None => Err(CaptureError::FrameNotReady),
        };

        match result {
            Ok(photo) => {
                info!(id = %photo.id, width = photo.width, height = photo.height, "Photo captured");
                inner.session.captured_frame = Some(photo);
                inner.session.error_message = None;
                inner.session.status_message = messages::STATUS_CAPTURED.to_string();
                self.publish(inner, Some(Notification::success(messages::TOAST_CAPTURED)));
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "Photo capture failed");
                inner.session.error_message = Some(err.user_message().to_string());
                self.publish(inner, Some(Notification::error(messages::TOAST_CAPTURE_FAILED)));
                Err(err)
            }
        }
    }

    /// Release the camera and return to `Idle`. Safe to call at any time.
    ///
    /// A request still in flight is released as soon as it resolves.
    pub fn stop_camera(&self) {
        let mut inner = self.lock();

        if inner.session.streaming_state.is_activating() {
            debug!("Stop requested while starting, stream will be released on arrival");
            inner.cancel_pending = true;
            return;
        }

        let released = Self::release_stream(&mut inner, self.preview.as_ref());
        if !released && inner.session.streaming_state == StreamingState::Idle {
            return;
        }

        info!(released, "Camera stopped");
        inner.session.streaming_state = StreamingState::Idle;
        self.publish(inner, None);
    }

    /// Discard the captured photo so a new one can be taken
    pub fn reset_capture(&self) {
        let mut inner = self.lock();
        inner.session.captured_frame = None;
        inner.session.error_message = None;
        inner.session.status_message = messages::STATUS_RETAKE.to_string();
        debug!("Capture reset");
        self.publish(inner, None);
    }

    /// Upload the captured photo
    ///
    /// On success the photo is cleared and the camera stopped. On failure
    /// the photo is kept for another attempt. The upload state is cleared on
    /// every exit path, including a panicking or dropped upload.
    pub async fn upload_photo(&self) -> Result<(), CaptureError> {
        let photo = {
            let mut inner = self.lock();

            if inner.session.is_uploading() {
                debug!("Upload already running");
                return Ok(());
            }
            let Some(photo) = inner.session.captured_frame.clone() else {
                debug!("Nothing to upload");
                return Ok(());
            };

            inner.session.upload_state = UploadState::Uploading;
            inner.session.status_message = messages::STATUS_UPLOADING.to_string();
            self.publish(inner, None);
            photo
        };

        let guard = UploadGuard {
            flow: self,
            armed: true,
        };
        let result = self.uploader.upload(&photo).await;
        guard.disarm();

        let mut inner = self.lock();
        inner.session.upload_state = UploadState::NotUploading;

        match result {
            Ok(()) => {
                info!(id = %photo.id, "Photo uploaded");
                Self::forget_photo(&mut inner.session, &photo);
                inner.session.error_message = None;
                inner.session.status_message = messages::STATUS_UPLOADED.to_string();

                Self::release_stream(&mut inner, self.preview.as_ref());
                if inner.session.streaming_state.is_activating() {
                    inner.cancel_pending = true;
                } else {
                    inner.session.streaming_state = StreamingState::Idle;
                }

                self.publish(inner, Some(Notification::success(messages::TOAST_UPLOADED)));
                Ok(())
            }
            Err(e) => {
                let err = CaptureError::from(e);
                warn!(id = %photo.id, error = %err, "Photo upload failed");
                inner.session.error_message = Some(err.user_message().to_string());
                inner.session.status_message = messages::STATUS_UPLOAD_FAILED.to_string();
                self.publish(inner, Some(Notification::error(messages::TOAST_UPLOAD_FAILED)));
                Err(err)
            }
        }
    }

    /// Tear the session down when its view goes away
    pub fn unmount(&self) {
        info!("Unmounting capture flow");
        self.stop_camera();
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Publish the new state under the lock, then notify with it released
    ///
    /// Observers never lag behind `snapshot()`.
    fn publish(&self, inner: MutexGuard<'_, Inner>, notification: Option<Notification>) {
        self.observers.send_replace(inner.session.clone());
        drop(inner);

        if let Some(notification) = notification {
            self.notifier.notify(notification);
        }
    }

    fn release_stream(inner: &mut Inner, preview: &dyn PreviewSurface) -> bool {
        preview.detach();
        inner.session.has_device_handle = false;
        inner.handle.take().is_some()
    }

    /// Clear the captured photo unless it was replaced by a retake meanwhile
    fn forget_photo(session: &mut CaptureSession, uploaded: &CapturedPhoto) {
        if session
            .captured_frame
            .as_ref()
            .is_some_and(|current| current.id == uploaded.id)
        {
            session.captured_frame = None;
        }
    }
}

impl Drop for CaptureFlow {
    fn drop(&mut self) {
        let inner = self.inner.get_mut().unwrap_or_else(PoisonError::into_inner);
        if inner.handle.take().is_some() {
            self.preview.detach();
            debug!("Capture flow dropped, device released");
        }
    }
}

impl std::fmt::Debug for CaptureFlow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.lock();
        f.debug_struct("CaptureFlow")
            .field("session", &inner.session)
            .field("handle", &inner.handle)
            .finish()
    }
}

/// Clears `Uploading` if an upload never reaches its normal completion
struct UploadGuard<'a> {
    flow: &'a CaptureFlow,
    armed: bool,
}

impl UploadGuard<'_> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for UploadGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }

        let mut inner = self.flow.lock();
        if !inner.session.is_uploading() {
            return;
        }

        error!("Upload aborted before completion");
        inner.session.upload_state = UploadState::NotUploading;
        inner.session.error_message = Some(messages::ERROR_UPLOAD.to_string());
        inner.session.status_message = messages::STATUS_UPLOAD_FAILED.to_string();
        self.flow.publish(inner, Some(Notification::error(messages::TOAST_UPLOAD_FAILED)));
    }
}
