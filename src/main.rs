// SPDX-License-Identifier: GPL-3.0-only

use barcode_filter::constants::app_info;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cli;

#[derive(Parser)]
#[command(name = "barcode-filter")]
#[command(about = "Rate-limited barcode decoding for camera frames")]
#[command(version = app_info::version())]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode barcodes in image files or directories of images
    Scan {
        /// Image files or directories
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Symbologies to look for, comma separated (default: any)
        #[arg(short, long, value_delimiter = ',')]
        formats: Vec<String>,

        /// Do not search rotated orientations
        #[arg(long)]
        no_rotate: bool,

        /// Faster, less thorough search
        #[arg(long)]
        fast: bool,

        /// Treat the images as consecutive frames of one stream, applying the cooldown
        #[arg(long)]
        stream: bool,

        /// Config file (default: user config directory)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Read inputs as raw frames with this FourCC (e.g. YUYV, NV12, GREY)
        #[arg(long, requires = "size")]
        raw_format: Option<String>,

        /// Raw frame size as WIDTHxHEIGHT
        #[arg(long, requires = "raw_format")]
        size: Option<String>,
    },

    /// List supported symbologies
    Formats,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    // Set RUST_LOG environment variable to control log level
    // Examples: RUST_LOG=debug, RUST_LOG=barcode_filter=trace
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(true)
        .with_level(true)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Scan {
            paths,
            formats,
            no_rotate,
            fast,
            stream,
            config,
            raw_format,
            size,
        } => cli::scan(cli::ScanOptions {
            paths,
            formats,
            no_rotate,
            fast,
            stream,
            config,
            raw_format,
            size,
        }),
        Commands::Formats => cli::list_formats(),
    }
}
