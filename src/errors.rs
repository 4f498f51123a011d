// SPDX-License-Identifier: GPL-3.0-only

//! Error types for the guest camera

use crate::constants::messages;
use std::fmt;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Top-level error type used by the command-line front end
#[derive(Debug, Clone)]
pub enum AppError {
    /// Capture flow errors
    Capture(CaptureError),
    /// Configuration errors
    Config(String),
    /// Storage/filesystem errors
    Storage(String),
    /// Generic error with message
    Other(String),
}

/// Errors handled by the capture flow
///
/// Every variant is recoverable: the session stays interactive after it
/// has been reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureError {
    /// The environment cannot grant camera access at all
    UnsupportedEnvironment,
    /// The user or the platform refused camera access
    PermissionDenied(String),
    /// Any other failure while acquiring the stream
    AcquisitionFailure(String),
    /// Capture attempted before the stream delivered a usable frame
    FrameNotReady,
    /// The frame could not be rasterised or encoded
    ProcessingFailure(String),
    /// The upload did not complete; the captured frame is kept
    UploadFailure(String),
}

impl CaptureError {
    /// Guest-facing explanation shown next to the capture controls
    pub fn user_message(&self) -> &'static str {
        match self {
            CaptureError::UnsupportedEnvironment => messages::ERROR_UNSUPPORTED,
            CaptureError::PermissionDenied(_) => messages::ERROR_PERMISSION,
            CaptureError::AcquisitionFailure(_) => messages::ERROR_ACQUISITION,
            CaptureError::FrameNotReady => messages::ERROR_FEED_NOT_READY,
            CaptureError::ProcessingFailure(_) => messages::ERROR_PROCESSING,
            CaptureError::UploadFailure(_) => messages::ERROR_UPLOAD,
        }
    }
}

/// Device-level stream acquisition errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcquireError {
    /// Access to the device was refused
    PermissionDenied(String),
    /// No device matched the request
    NotFound(String),
    /// The device exists but could not be opened or started
    NotReadable(String),
    /// Anything else reported by the platform
    Other(String),
}

/// Photo processing errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhotoError {
    /// Frame has no usable dimensions yet
    NoFrameAvailable,
    /// Off-screen raster could not be prepared from the frame
    RasterUnavailable(String),
    /// Encoding failed
    EncodingFailed(String),
}

/// Upload errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadError {
    /// The remote end refused the photo
    Rejected(String),
    /// Local I/O failed while handing the photo over
    Io(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Capture(e) => write!(f, "Capture error: {}", e),
            AppError::Config(msg) => write!(f, "Configuration error: {}", msg),
            AppError::Storage(msg) => write!(f, "Storage error: {}", msg),
            AppError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl fmt::Display for CaptureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureError::UnsupportedEnvironment => write!(f, "Camera capture is not supported"),
            CaptureError::PermissionDenied(msg) => write!(f, "Camera permission denied: {}", msg),
            CaptureError::AcquisitionFailure(msg) => write!(f, "Could not start camera: {}", msg),
            CaptureError::FrameNotReady => write!(f, "Video feed not ready"),
            CaptureError::ProcessingFailure(msg) => write!(f, "Could not process photo: {}", msg),
            CaptureError::UploadFailure(msg) => write!(f, "Upload failed: {}", msg),
        }
    }
}

impl fmt::Display for AcquireError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AcquireError::PermissionDenied(msg) => write!(f, "Permission denied: {}", msg),
            AcquireError::NotFound(msg) => write!(f, "Device not found: {}", msg),
            AcquireError::NotReadable(msg) => write!(f, "Device not readable: {}", msg),
            AcquireError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl fmt::Display for PhotoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhotoError::NoFrameAvailable => write!(f, "No frame available for capture"),
            PhotoError::RasterUnavailable(msg) => write!(f, "Raster unavailable: {}", msg),
            PhotoError::EncodingFailed(msg) => write!(f, "Encoding failed: {}", msg),
        }
    }
}

impl fmt::Display for UploadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadError::Rejected(msg) => write!(f, "Upload rejected: {}", msg),
            UploadError::Io(msg) => write!(f, "Upload I/O error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}
impl std::error::Error for CaptureError {}
impl std::error::Error for AcquireError {}
impl std::error::Error for PhotoError {}
impl std::error::Error for UploadError {}

impl From<CaptureError> for AppError {
    fn from(err: CaptureError) -> Self {
        AppError::Capture(err)
    }
}

impl From<AcquireError> for CaptureError {
    fn from(err: AcquireError) -> Self {
        match err {
            AcquireError::PermissionDenied(msg) => CaptureError::PermissionDenied(msg),
            other => CaptureError::AcquisitionFailure(other.to_string()),
        }
    }
}

impl From<PhotoError> for CaptureError {
    fn from(err: PhotoError) -> Self {
        match err {
            PhotoError::NoFrameAvailable => CaptureError::FrameNotReady,
            other => CaptureError::ProcessingFailure(other.to_string()),
        }
    }
}

impl From<UploadError> for CaptureError {
    fn from(err: UploadError) -> Self {
        CaptureError::UploadFailure(err.to_string())
    }
}

impl From<String> for AppError {
    fn from(msg: String) -> Self {
        AppError::Other(msg)
    }
}

impl From<&str> for AppError {
    fn from(msg: &str) -> Self {
        AppError::Other(msg.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<std::io::Error> for UploadError {
    fn from(err: std::io::Error) -> Self {
        UploadError::Io(err.to_string())
    }
}

/// Classify an I/O error raised while opening a capture device
impl From<std::io::Error> for AcquireError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::PermissionDenied => AcquireError::PermissionDenied(err.to_string()),
            std::io::ErrorKind::NotFound => AcquireError::NotFound(err.to_string()),
            _ => AcquireError::NotReadable(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_error_maps_to_permission_denied() {
        let err: CaptureError = AcquireError::PermissionDenied("blocked".into()).into();
        assert!(matches!(err, CaptureError::PermissionDenied(_)));
        assert!(err.user_message().contains("allow camera permissions"));
    }

    #[test]
    fn test_other_acquire_errors_map_to_acquisition_failure() {
        let err: CaptureError = AcquireError::NotFound("/dev/video9".into()).into();
        assert!(matches!(err, CaptureError::AcquisitionFailure(_)));
        assert!(err.user_message().contains("switching browsers"));
    }

    #[test]
    fn test_io_permission_denied_is_classified() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "EACCES");
        assert!(matches!(
            AcquireError::from(io),
            AcquireError::PermissionDenied(_)
        ));
    }

    #[test]
    fn test_missing_frame_maps_to_frame_not_ready() {
        let err: CaptureError = PhotoError::NoFrameAvailable.into();
        assert_eq!(err, CaptureError::FrameNotReady);
    }
}
