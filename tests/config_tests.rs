// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for configuration module

use guest_camera::Config;
use guest_camera::backends::FacingMode;
use guest_camera::pipelines::photo::EncodingQuality;
use std::path::PathBuf;
use std::time::Duration;

fn scratch_path(name: &str) -> PathBuf {
    std::env::temp_dir()
        .join(format!("guest-camera-test-{}", uuid::Uuid::new_v4()))
        .join(name)
}

#[test]
fn test_config_default() {
    let config = Config::default();

    assert_eq!(config.facing_mode, FacingMode::Environment);
    assert_eq!((config.ideal_width, config.ideal_height), (1280, 720));
    assert_eq!(config.jpeg_quality, EncodingQuality::High);
    assert_eq!(config.toast_duration(), Duration::from_millis(4200));
    assert_eq!(config.simulated_upload(), Duration::from_millis(1800));
}

#[test]
fn test_stream_constraints_never_request_audio() {
    let constraints = Config::default().stream_constraints();

    assert!(!constraints.audio);
    assert_eq!(constraints.facing_mode, FacingMode::Environment);
    assert_eq!(constraints.ideal_width, 1280);
}

#[test]
fn test_missing_file_yields_defaults() {
    let config = Config::load_from(&scratch_path("config.json")).unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_save_and_reload() {
    let path = scratch_path("config.json");
    let config = Config {
        facing_mode: FacingMode::User,
        jpeg_quality: EncodingQuality::Maximum,
        gallery_dir: Some(PathBuf::from("/srv/wedding/gallery")),
        ..Config::default()
    };

    config.save_to(&path).unwrap();
    let loaded = Config::load_from(&path).unwrap();
    assert_eq!(loaded, config);
    assert_eq!(loaded.gallery_dir(), PathBuf::from("/srv/wedding/gallery"));

    let _ = std::fs::remove_dir_all(path.parent().unwrap());
}

#[test]
fn test_malformed_file_is_a_config_error() {
    let path = scratch_path("config.json");
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, "{ not json").unwrap();

    let err = Config::load_from(&path).unwrap_err();
    assert!(matches!(err, guest_camera::errors::AppError::Config(_)));

    let _ = std::fs::remove_dir_all(path.parent().unwrap());
}
