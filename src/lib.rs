// SPDX-License-Identifier: GPL-3.0-only

//! Guest Camera - live photo capture for wedding guests
//!
//! This library provides the guest photo booth flow: acquiring a camera,
//! streaming it to a preview, capturing a still and uploading it, with
//! every outcome reported through a notification sink.
//!
//! # Architecture
//!
//! - [`capture`]: The capture flow state machine
//! - [`backends`]: Media device abstraction (V4L2 and virtual devices)
//! - [`preview`]: Preview surface the live feed is bound to
//! - [`pipelines`]: Still photo rasterisation and JPEG encoding
//! - [`upload`]: Upload destinations
//! - [`notify`]: Notification sinks and the toast queue
//! - [`config`]: User configuration handling
//!
//! # Example
//!
//! ```no_run
//! use guest_camera::backends::virtual_camera::VirtualDevices;
//! use guest_camera::notify::LogSink;
//! use guest_camera::preview::VideoPreview;
//! use guest_camera::upload::SimulatedUploader;
//! use guest_camera::CaptureFlow;
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), guest_camera::errors::CaptureError> {
//! let flow = CaptureFlow::new(
//!     Arc::new(VirtualDevices::test_pattern()),
//!     Arc::new(SimulatedUploader::default()),
//!     Arc::new(LogSink),
//!     Arc::new(VideoPreview::new()),
//! )
//! .mount();
//!
//! flow.start_camera().await?;
//! flow.capture_photo()?;
//! flow.upload_photo().await?;
//! # Ok(())
//! # }
//! ```

pub mod backends;
pub mod capture;
pub mod config;
pub mod constants;
pub mod errors;
pub mod notify;
pub mod pipelines;
pub mod preview;
pub mod upload;

// Re-export commonly used types
pub use capture::{CaptureFlow, CaptureSession, Controls, StreamingState, SupportStatus, UploadState};
pub use config::Config;
pub use errors::CaptureError;
pub use notify::{Notification, NotificationSink, Severity, ToastQueue};
