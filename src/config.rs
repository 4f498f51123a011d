// SPDX-License-Identifier: GPL-3.0-only

//! User configuration
//!
//! Stored as JSON in `$XDG_CONFIG_HOME/guest-camera/config.json`. A missing
//! file yields the defaults; unknown or absent fields fall back per field.

use crate::backends::{FacingMode, StreamConstraints};
use crate::constants::{self, APP_DIR_NAME};
use crate::errors::{AppError, AppResult};
use crate::pipelines::photo::EncodingQuality;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

const CONFIG_FILE_NAME: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Preferred camera direction (ideal only)
    pub facing_mode: FacingMode,
    /// Ideal capture width
    pub ideal_width: u32,
    /// Ideal capture height
    pub ideal_height: u32,
    /// JPEG quality preset for captured stills
    pub jpeg_quality: EncodingQuality,
    /// How long a toast stays up
    pub toast_duration_ms: u64,
    /// Round-trip time of the simulated upload
    pub simulated_upload_ms: u64,
    /// Where uploaded photos are written; `~/Pictures/guest-camera` if unset
    pub gallery_dir: Option<PathBuf>,
    /// V4L2 node to open; the first capture device if unset
    pub device_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            facing_mode: FacingMode::Environment,
            ideal_width: constants::stream::IDEAL_WIDTH,
            ideal_height: constants::stream::IDEAL_HEIGHT,
            jpeg_quality: EncodingQuality::High,
            toast_duration_ms: constants::DEFAULT_TOAST_DURATION.as_millis() as u64,
            simulated_upload_ms: constants::DEFAULT_SIMULATED_UPLOAD.as_millis() as u64,
            gallery_dir: None,
            device_path: None,
        }
    }
}

impl Config {
    /// Default location of the config file
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Load from the default location
    pub fn load() -> AppResult<Self> {
        match Self::default_path() {
            Some(path) => Self::load_from(&path),
            None => {
                debug!("No config directory, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load from a file; a missing file yields the defaults
    pub fn load_from(path: &Path) -> AppResult<Self> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "Config file missing, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };

        let config: Config = serde_json::from_str(&text)
            .map_err(|e| AppError::Config(format!("{}: {}", path.display(), e)))?;
        info!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    /// Write to a file, creating its directory
    pub fn save_to(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn stream_constraints(&self) -> StreamConstraints {
        StreamConstraints {
            audio: false,
            facing_mode: self.facing_mode,
            ideal_width: self.ideal_width,
            ideal_height: self.ideal_height,
        }
    }

    pub fn toast_duration(&self) -> Duration {
        Duration::from_millis(self.toast_duration_ms)
    }

    pub fn simulated_upload(&self) -> Duration {
        Duration::from_millis(self.simulated_upload_ms)
    }

    /// Gallery directory, falling back to the user's pictures directory
    pub fn gallery_dir(&self) -> PathBuf {
        self.gallery_dir.clone().unwrap_or_else(|| {
            dirs::picture_dir()
                .or_else(dirs::home_dir)
                .unwrap_or_else(|| PathBuf::from("."))
                .join(APP_DIR_NAME)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: Config = serde_json::from_str(r#"{ "ideal_width": 640 }"#).unwrap();
        assert_eq!(config.ideal_width, 640);
        assert_eq!(config.ideal_height, 720);
        assert_eq!(config.jpeg_quality, EncodingQuality::High);
    }

    #[test]
    fn test_facing_mode_uses_lowercase_names() {
        let config: Config = serde_json::from_str(r#"{ "facing_mode": "user" }"#).unwrap();
        assert_eq!(config.facing_mode, FacingMode::User);
    }
}
