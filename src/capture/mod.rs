// SPDX-License-Identifier: GPL-3.0-only

//! Guest capture flow
//!
//! Coordinates a capture device, the live preview, still capture and the
//! upload of the result:
//!
//! ```text
//! Idle ─▶ Activating ─▶ Streaming ─▶ (Captured) ─▶ Uploading ─▶ Idle
//!              │             │
//!              ▼             ▼
//!            Error     frame errors (session keeps streaming)
//! ```
//!
//! Collaborators are passed in explicitly: a [`MediaDevices`] capability,
//! a [`PreviewSurface`], an [`Uploader`] and a [`NotificationSink`].
//!
//! [`MediaDevices`]: crate::backends::MediaDevices
//! [`PreviewSurface`]: crate::preview::PreviewSurface
//! [`Uploader`]: crate::upload::Uploader
//! [`NotificationSink`]: crate::notify::NotificationSink

pub mod flow;
pub mod state;

pub use flow::CaptureFlow;
pub use state::{CaptureSession, Controls, StreamingState, SupportStatus, UploadState};
