// SPDX-License-Identifier: GPL-3.0-only

//! Photo upload
//!
//! The capture flow only needs a success/failure answer from an
//! [`Uploader`]. Two are provided: a timed simulation of the remote round
//! trip, and a gallery directory drop that writes the JPEG to disk.

use crate::constants::DEFAULT_SIMULATED_UPLOAD;
use crate::errors::UploadError;
use crate::pipelines::photo::CapturedPhoto;
use futures::FutureExt;
use futures::future::BoxFuture;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tracing::{info, warn};

/// Hands a captured photo to its destination
pub trait Uploader: Send + Sync {
    fn upload<'a>(&'a self, photo: &'a CapturedPhoto) -> BoxFuture<'a, Result<(), UploadError>>;
}

/// Waits a fixed delay, then succeeds (or fails when told to)
#[derive(Debug)]
pub struct SimulatedUploader {
    delay: Duration,
    failing: AtomicBool,
    uploads: AtomicU64,
}

impl Default for SimulatedUploader {
    fn default() -> Self {
        Self::new(DEFAULT_SIMULATED_UPLOAD)
    }
}

impl SimulatedUploader {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            failing: AtomicBool::new(false),
            uploads: AtomicU64::new(0),
        }
    }

    /// Make subsequent uploads fail (or succeed again)
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of completed successful uploads
    pub fn uploads(&self) -> u64 {
        self.uploads.load(Ordering::SeqCst)
    }

    async fn run(&self, photo: &CapturedPhoto) -> Result<(), UploadError> {
        info!(id = %photo.id, size = photo.len(), delay_ms = self.delay.as_millis() as u64, "Simulating upload");
        tokio::time::sleep(self.delay).await;

        if self.failing.load(Ordering::SeqCst) {
            warn!(id = %photo.id, "Simulated upload rejected");
            return Err(UploadError::Rejected("simulated network failure".into()));
        }

        self.uploads.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

impl Uploader for SimulatedUploader {
    fn upload<'a>(&'a self, photo: &'a CapturedPhoto) -> BoxFuture<'a, Result<(), UploadError>> {
        self.run(photo).boxed()
    }
}

/// Writes uploads into a gallery directory
#[derive(Debug, Clone)]
pub struct DirectoryUploader {
    dir: PathBuf,
}

impl DirectoryUploader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File name for a photo: capture timestamp plus a short id suffix
    pub fn file_name(photo: &CapturedPhoto) -> String {
        let timestamp = photo.captured_at.format("%Y%m%d_%H%M%S");
        let id = photo.id.simple().to_string();
        format!("IMG_{}_{}.{}", timestamp, &id[..8], photo.extension())
    }

    async fn save(&self, photo: &CapturedPhoto) -> Result<(), UploadError> {
        let filepath = self.dir.join(Self::file_name(photo));
        info!(path = %filepath.display(), "Saving photo to gallery");

        let dir = self.dir.clone();
        let data = photo.data.clone();
        let target = filepath.clone();
        tokio::task::spawn_blocking(move || {
            std::fs::create_dir_all(&dir)?;
            std::fs::write(&target, &data)?;
            Ok::<_, UploadError>(())
        })
        .await
        .map_err(|e| UploadError::Io(format!("Save task error: {}", e)))??;

        info!(path = %filepath.display(), "Photo saved successfully");
        Ok(())
    }
}

impl Uploader for DirectoryUploader {
    fn upload<'a>(&'a self, photo: &'a CapturedPhoto) -> BoxFuture<'a, Result<(), UploadError>> {
        self.save(photo).boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::VideoFrame;
    use crate::pipelines::photo::PhotoEncoder;

    fn photo() -> CapturedPhoto {
        PhotoEncoder::default()
            .encode(&VideoFrame::from_rgba(4, 4, vec![128; 64]))
            .unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_simulated_upload_success_and_failure() {
        let uploader = SimulatedUploader::default();
        let photo = photo();

        uploader.upload(&photo).await.unwrap();
        assert_eq!(uploader.uploads(), 1);

        uploader.set_failing(true);
        assert!(matches!(
            uploader.upload(&photo).await,
            Err(UploadError::Rejected(_))
        ));
        assert_eq!(uploader.uploads(), 1);
    }

    #[tokio::test]
    async fn test_directory_upload_writes_jpeg() {
        let dir = std::env::temp_dir().join(format!("guest-camera-{}", uuid::Uuid::new_v4()));
        let uploader = DirectoryUploader::new(&dir);
        let photo = photo();

        uploader.upload(&photo).await.unwrap();

        let written = std::fs::read(dir.join(DirectoryUploader::file_name(&photo))).unwrap();
        assert_eq!(written.as_slice(), &*photo.data);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_file_name_shape() {
        let name = DirectoryUploader::file_name(&photo());
        assert!(name.starts_with("IMG_"));
        assert!(name.ends_with(".jpg"));
    }
}
