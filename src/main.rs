// SPDX-License-Identifier: GPL-3.0-only

use clap::{Parser, Subcommand};
use guest_camera::Config;
use std::path::PathBuf;

mod cli;

#[derive(Parser)]
#[command(name = "guest-camera")]
#[command(about = "Live photo capture for wedding guests")]
#[command(version = env!("GIT_VERSION"))]
struct Cli {
    /// Config file (default: ~/.config/guest-camera/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check whether a camera can be acquired
    Probe {
        /// V4L2 device node (e.g. /dev/video0)
        #[arg(short, long)]
        device: Option<PathBuf>,
    },

    /// List available cameras
    List,

    /// Capture one photo and upload it
    Snap {
        /// Use the virtual test pattern instead of a real camera
        #[arg(long = "virtual")]
        virtual_camera: bool,

        /// Serve a still image file as the camera feed
        #[arg(long, conflicts_with = "virtual_camera")]
        image: Option<PathBuf>,

        /// V4L2 device node (e.g. /dev/video0)
        #[arg(short, long)]
        device: Option<PathBuf>,

        /// Gallery directory the photo is uploaded to
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Simulate the upload instead of writing to the gallery
        #[arg(long)]
        simulate: bool,

        /// Make the simulated upload fail
        #[arg(long)]
        fail_upload: bool,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Set RUST_LOG environment variable to control log level
    // Examples: RUST_LOG=debug, RUST_LOG=guest_camera=debug
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(true)
        .with_level(true)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    match cli.command {
        Commands::Probe { device } => cli::probe(device, &config),
        Commands::List => cli::list_cameras(),
        Commands::Snap {
            virtual_camera,
            image,
            device,
            output,
            simulate,
            fail_upload,
        } => cli::snap(
            cli::SnapOptions {
                virtual_camera,
                image,
                device,
                output,
                simulate,
                fail_upload,
            },
            &config,
        ),
    }
}
