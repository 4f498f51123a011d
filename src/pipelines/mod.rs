// SPDX-License-Identifier: GPL-3.0-only

//! Processing pipelines for captured media
//!
//! ```text
//! ┌──────────────┐     ┌───────────────────┐     ┌──────────────┐
//! │ Video Frame  │ ──▶ │  Photo Pipeline   │ ──▶ │  JPEG still  │
//! │   (RGBA)     │     │  - Rasterise      │     │              │
//! │              │     │  - JPEG encoding  │     │              │
//! └──────────────┘     └───────────────────┘     └──────────────┘
//! ```
//!
//! The live preview keeps running while a still is processed.

pub mod photo;
