// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

use std::time::Duration;

/// Stream request defaults
pub mod stream {
    use std::time::Duration;

    /// Ideal capture width requested from the device
    pub const IDEAL_WIDTH: u32 = 1280;
    /// Ideal capture height requested from the device
    pub const IDEAL_HEIGHT: u32 = 720;
    /// Mmap buffers queued on V4L2 devices
    pub const V4L2_BUFFER_COUNT: u32 = 4;
    /// Longest a V4L2 capture thread waits for a buffer before rechecking
    /// whether it was stopped
    pub const V4L2_DEQUEUE_TIMEOUT: Duration = Duration::from_millis(200);
}

/// Default lifetime of a toast before it is dismissed automatically
pub const DEFAULT_TOAST_DURATION: Duration = Duration::from_millis(4200);

/// Duration of the simulated upload round trip
pub const DEFAULT_SIMULATED_UPLOAD: Duration = Duration::from_millis(1800);

/// Directory name used under the config and pictures directories
pub const APP_DIR_NAME: &str = "guest-camera";

/// Guest-facing text
pub mod messages {
    // Status line
    pub const STATUS_REQUESTING: &str = "Requesting camera access…";
    pub const STATUS_READY: &str = "Camera ready. Capture a moment!";
    pub const STATUS_BLOCKED: &str = "Camera access blocked";
    pub const STATUS_CAPTURED: &str = "Photo captured. Share it with the couple!";
    pub const STATUS_RETAKE: &str = "Ready for another shot.";
    pub const STATUS_UPLOADING: &str = "Uploading your memory…";
    pub const STATUS_UPLOADED: &str = "Upload successful. Capture another moment!";
    pub const STATUS_UPLOAD_FAILED: &str = "Upload failed. You can try again.";

    // Inline error panel
    pub const ERROR_UNSUPPORTED: &str = "Camera access is not available on this device.";
    pub const ERROR_PERMISSION: &str = "We could not access the camera. Please allow camera permissions in your browser and try again.";
    pub const ERROR_ACQUISITION: &str = "We were unable to start the camera. Try switching browsers or refreshing the page.";
    pub const ERROR_FEED_NOT_READY: &str = "The video feed is not ready yet. Please try again.";
    pub const ERROR_PROCESSING: &str = "We could not process the photo. Please try again.";
    pub const ERROR_UPLOAD: &str =
        "We could not upload your photo. Please check your connection and try again.";

    /// Persistent banner shown when the environment cannot capture
    pub const BANNER_UNSUPPORTED: &str = "It looks like this device or browser does not support camera capture. You can still upload photos through the gallery feature.";

    // Notifications: (title, description)
    pub const TOAST_READY: (&str, &str) = (
        "Camera ready",
        "Tap capture to snap your favourite wedding moment.",
    );
    pub const TOAST_UNAVAILABLE: (&str, &str) = (
        "Camera unavailable",
        "Please check permissions and try launching again.",
    );
    pub const TOAST_UNSUPPORTED: (&str, &str) = (
        "Camera not supported",
        "This device cannot share a live camera feed.",
    );
    pub const TOAST_CAPTURED: (&str, &str) = (
        "Moment captured",
        "Review your photo and upload when ready.",
    );
    pub const TOAST_CAPTURE_FAILED: (&str, &str) = ("Capture failed", "Please try again in a moment.");
    pub const TOAST_UPLOADED: (&str, &str) = (
        "Photo uploaded",
        "Thank you for sharing your memory with the couple.",
    );
    pub const TOAST_UPLOAD_FAILED: (&str, &str) = (
        "Upload failed",
        "Please check your connection and try again.",
    );
}
