// SPDX-License-Identifier: GPL-3.0-only

//! Still photo capture pipeline
//!
//! 1. **Rasterise**: copy the preview frame into an RGB buffer of its native size
//! 2. **Encode**: compress to JPEG at the configured quality

pub mod encoding;

pub use encoding::{CapturedPhoto, EncodingQuality, PhotoEncoder};
