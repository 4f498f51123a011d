// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands for the guest camera
//!
//! This module provides command-line functionality for:
//! - Probing camera support
//! - Listing capture devices
//! - Running the full capture flow once (`snap`)

use guest_camera::backends::virtual_camera::VirtualDevices;
use guest_camera::backends::{self, MediaDevices};
use guest_camera::constants::messages;
use guest_camera::notify::Toast;
use guest_camera::preview::{PreviewSurface, VideoPreview};
use guest_camera::upload::{DirectoryUploader, SimulatedUploader, Uploader};
use guest_camera::{CaptureFlow, Config, SupportStatus, ToastQueue};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// How long `snap` waits for the first usable frame
const FIRST_FRAME_TIMEOUT: Duration = Duration::from_secs(5);
/// Let auto-exposure settle before grabbing the still
const WARMUP: Duration = Duration::from_millis(500);

/// Options for the `snap` command
#[derive(Debug, Clone, Default)]
pub struct SnapOptions {
    pub virtual_camera: bool,
    pub image: Option<PathBuf>,
    pub device: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub simulate: bool,
    pub fail_upload: bool,
}

fn select_devices(options: &SnapOptions, config: &Config) -> Arc<dyn MediaDevices> {
    if let Some(image) = &options.image {
        Arc::new(VirtualDevices::from_image(image))
    } else if options.virtual_camera {
        Arc::new(VirtualDevices::test_pattern())
    } else {
        let device = options.device.clone().or_else(|| config.device_path.clone());
        Arc::from(backends::default_devices(device))
    }
}

/// Report whether a camera can be acquired
pub fn probe(device: Option<PathBuf>, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let devices = backends::default_devices(device.or_else(|| config.device_path.clone()));

    if devices.is_supported() {
        println!("Camera capture: supported");
    } else {
        println!("Camera capture: unsupported");
        println!("{}", messages::BANNER_UNSUPPORTED);
    }
    Ok(())
}

/// List all capture devices
#[cfg(feature = "v4l2")]
pub fn list_cameras() -> Result<(), Box<dyn std::error::Error>> {
    let cameras = backends::v4l2::enumerate_devices();

    if cameras.is_empty() {
        println!("No cameras found.");
        return Ok(());
    }

    println!("Available cameras:");
    println!();
    for (index, camera) in cameras.iter().enumerate() {
        println!("  [{}] {}", index, camera.name);
        println!("      Path: {}", camera.path);
        if let Some(driver) = &camera.driver {
            println!("      Driver: {}", driver);
        }
        println!();
    }

    Ok(())
}

#[cfg(not(feature = "v4l2"))]
pub fn list_cameras() -> Result<(), Box<dyn std::error::Error>> {
    println!("Built without V4L2 support; only the virtual camera is available.");
    Ok(())
}

/// Run mount → start → capture → upload once and print what the guest would see
pub fn snap(options: SnapOptions, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let devices = select_devices(&options, config);

    let uploader: Arc<dyn Uploader> = if options.simulate || options.fail_upload {
        let simulated = SimulatedUploader::new(config.simulated_upload());
        simulated.set_failing(options.fail_upload);
        Arc::new(simulated)
    } else {
        let dir = options.output.clone().unwrap_or_else(|| config.gallery_dir());
        println!("Gallery: {}", dir.display());
        Arc::new(DirectoryUploader::new(dir))
    };

    let toasts = Arc::new(ToastQueue::new(config.toast_duration()));
    let preview = Arc::new(VideoPreview::new());

    let rt = tokio::runtime::Runtime::new()?;
    let result = rt.block_on(async {
        let flow = CaptureFlow::new(devices, uploader, toasts.clone(), preview.clone())
            .with_config(config)
            .mount();

        if flow.snapshot().support_status == SupportStatus::Unsupported {
            println!("{}", messages::BANNER_UNSUPPORTED);
            return Ok(());
        }

        println!("{}", messages::STATUS_REQUESTING);
        flow.start_camera().await?;

        wait_for_first_frame(preview.as_ref()).await;
        tokio::time::sleep(WARMUP).await;

        flow.capture_photo()?;
        if let Some(photo) = &flow.snapshot().captured_frame {
            println!("Captured {}x{} ({} bytes)", photo.width, photo.height, photo.len());
        }

        println!("{}", messages::STATUS_UPLOADING);
        let uploaded = flow.upload_photo().await;
        flow.unmount();
        uploaded
    });

    print_toasts(&toasts.drain());

    if let Err(err) = result {
        println!("{}", err.user_message());
        return Err(err.into());
    }
    Ok(())
}

async fn wait_for_first_frame(preview: &dyn PreviewSurface) {
    let start = Instant::now();
    while preview.native_size().is_none() && start.elapsed() < FIRST_FRAME_TIMEOUT {
        tokio::time::sleep(Duration::from_millis(16)).await;
    }
}

fn print_toasts(toasts: &[Toast]) {
    for toast in toasts {
        println!(
            "[{}] {}: {}",
            toast.notification.severity, toast.notification.title, toast.notification.description
        );
    }
}
