// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for constants module

use guest_camera::constants::messages;

#[test]
fn test_error_messages_point_to_a_remedy() {
    assert!(messages::ERROR_PERMISSION.contains("allow camera permissions"));
    assert!(messages::ERROR_ACQUISITION.contains("switching browsers"));
    assert!(messages::ERROR_UPLOAD.contains("try again"));
}

#[test]
fn test_toasts_have_title_and_description() {
    let toasts = [
        messages::TOAST_READY,
        messages::TOAST_UNAVAILABLE,
        messages::TOAST_UNSUPPORTED,
        messages::TOAST_CAPTURED,
        messages::TOAST_CAPTURE_FAILED,
        messages::TOAST_UPLOADED,
        messages::TOAST_UPLOAD_FAILED,
    ];

    for (title, description) in toasts {
        assert!(!title.is_empty());
        assert!(!description.is_empty());
    }
}

#[test]
fn test_unsupported_banner_offers_gallery() {
    assert!(messages::BANNER_UNSUPPORTED.contains("gallery"));
}
