// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands
//!
//! - Decoding barcodes in still images or raw frame dumps
//! - Listing supported symbologies

use barcode_filter::backends::camera::types::{CameraFrame, PixelFormat};
use barcode_filter::config::Config;
use barcode_filter::constants::file_formats;
use barcode_filter::errors::AppError;
use barcode_filter::frame_processor::{
    BarcodeFormat, BarcodeFormats, BarcodeResult, FilterEvent, QrDetector, VideoFilter,
};
use futures::channel::mpsc;
use image::DynamicImage;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Options for the `scan` command
pub struct ScanOptions {
    pub paths: Vec<PathBuf>,
    pub formats: Vec<String>,
    pub no_rotate: bool,
    pub fast: bool,
    pub stream: bool,
    pub config: Option<PathBuf>,
    /// Read the inputs as raw frames of this FourCC instead of image files
    pub raw_format: Option<String>,
    /// Geometry of raw frames as `WIDTHxHEIGHT`
    pub size: Option<String>,
}

/// Geometry and layout shared by all raw frame dumps of one scan
struct RawLayout {
    format: PixelFormat,
    width: u32,
    height: u32,
}

/// Decode barcodes in the given images
pub fn scan(options: ScanOptions) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = match &options.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    // Independent images each get a decode; a stream is rate limited
    if !options.stream {
        config.cooldown_ms = 0;
    }

    let raw = raw_layout(&options)?;
    let paths = match raw {
        Some(_) => options.paths.clone(),
        None => collect_image_paths(&options.paths)?,
    };
    if paths.is_empty() {
        println!("No images found.");
        return Ok(());
    }

    let filter = VideoFilter::from_config(QrDetector, &config);
    if !options.formats.is_empty() {
        filter.set_formats(parse_formats(&options.formats)?);
    }
    if options.no_rotate {
        filter.set_try_rotate(false);
    }
    if options.fast {
        filter.set_try_harder(false);
    }
    let mut events = filter.subscribe();

    let mut frames = Vec::with_capacity(paths.len());
    for path in &paths {
        let frame = match &raw {
            Some(layout) => load_raw_frame(path, layout),
            None => image::open(path)
                .map(frame_from_image)
                .map_err(AppError::from),
        };
        match frame {
            Ok(frame) => frames.push((path.clone(), frame)),
            Err(e) => warn!(path = %path.display(), error = %e, "Failed to load frame"),
        }
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let mut found = 0;
    for (path, frame) in frames {
        runtime.block_on(filter.run(futures::stream::iter([frame])));
        found += report(&path, &mut events);
    }

    println!();
    println!("{} of {} image(s) contained a barcode", found, paths.len());
    Ok(())
}

/// List the supported symbologies
pub fn list_formats() -> Result<(), Box<dyn std::error::Error>> {
    println!("Supported symbologies:");
    println!();
    for format in BarcodeFormat::ALL {
        let kind = if BarcodeFormats::TWO_D_CODES.contains(format) {
            "2D"
        } else {
            "1D"
        };
        let decoder = if format == BarcodeFormat::QRCode {
            " (decoded)"
        } else {
            ""
        };
        println!("  {:<18} {}{}", format.name(), kind, decoder);
    }
    Ok(())
}

fn parse_formats(names: &[String]) -> Result<BarcodeFormats, Box<dyn std::error::Error>> {
    let mut formats = BarcodeFormats::empty();
    for name in names {
        formats.insert(name.parse::<BarcodeFormat>()?);
    }
    Ok(formats)
}

/// Parse `--raw-format` and `--size`; both or neither must be given
fn raw_layout(options: &ScanOptions) -> Result<Option<RawLayout>, Box<dyn std::error::Error>> {
    let (fourcc, size) = match (&options.raw_format, &options.size) {
        (None, None) => return Ok(None),
        (Some(fourcc), Some(size)) => (fourcc, size),
        _ => return Err("--raw-format and --size must be used together".into()),
    };

    let format = PixelFormat::from_fourcc(fourcc);
    if format == PixelFormat::Unknown {
        return Err(format!("Unknown pixel format: {}", fourcc).into());
    }

    let (width, height) = size
        .split_once(['x', 'X'])
        .and_then(|(w, h)| Some((w.trim().parse().ok()?, h.trim().parse().ok()?)))
        .ok_or_else(|| format!("Invalid size '{}', expected WIDTHxHEIGHT", size))?;

    Ok(Some(RawLayout {
        format,
        width,
        height,
    }))
}

/// Load a raw frame dump with rows packed at the format's pixel width
fn load_raw_frame(path: &Path, layout: &RawLayout) -> Result<CameraFrame, AppError> {
    let data = std::fs::read(path)?;
    let bytes_per_pixel = layout.format.bytes_per_pixel().unwrap_or(1) as u32;
    Ok(CameraFrame::new(
        layout.width,
        layout.height,
        layout.width * bytes_per_pixel,
        layout.format,
        data,
    ))
}

/// Print the results published for one image; returns 1 if a barcode was found
fn report(path: &Path, events: &mut mpsc::UnboundedReceiver<FilterEvent>) -> usize {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_default();

    let mut attempted = false;
    let mut found = 0;
    while let Ok(Some(event)) = events.try_next() {
        match event {
            FilterEvent::NewResult(result) => {
                attempted = true;
                if !result.is_valid() {
                    println!("{}: {} ({} ms)", name, result.status(), result.run_time().as_millis());
                }
            }
            FilterEvent::FoundBarcode(result) => {
                found = 1;
                print_result(&name, &result);
            }
            _ => {}
        }
    }

    if !attempted {
        println!("{}: skipped (cooldown)", name);
    }
    found
}

fn print_result(name: &str, result: &BarcodeResult) {
    println!("{}: {} \"{}\"", name, result.format_name(), result.text());
    println!("    position: {}", result.position());
    println!("    bytes: {}, time: {} ms", result.raw_bytes().len(), result.run_time().as_millis());
}

/// Wrap a decoded image as a camera frame without converting native layouts
fn frame_from_image(img: DynamicImage) -> CameraFrame {
    let (width, height) = (img.width(), img.height());
    match img {
        DynamicImage::ImageLuma8(buf) => {
            CameraFrame::new(width, height, width, PixelFormat::Gray8, buf.into_raw())
        }
        DynamicImage::ImageRgb8(buf) => {
            CameraFrame::new(width, height, width * 3, PixelFormat::RGB24, buf.into_raw())
        }
        DynamicImage::ImageRgba8(buf) => {
            CameraFrame::new(width, height, width * 4, PixelFormat::RGBA, buf.into_raw())
        }
        other => CameraFrame::new(
            width,
            height,
            width * 4,
            PixelFormat::RGBA,
            other.to_rgba8().into_raw(),
        ),
    }
}

/// Collect all image paths from input (files or directories)
fn collect_image_paths(input: &[PathBuf]) -> Result<Vec<PathBuf>, Box<dyn std::error::Error>> {
    let mut paths = Vec::new();

    for path in input {
        if path.is_dir() {
            for entry in std::fs::read_dir(path)? {
                let file_path = entry?.path();
                if file_formats::is_image(&file_path) {
                    paths.push(file_path);
                }
            }
        } else {
            paths.push(path.clone());
        }
    }

    // Sort by filename for consistent ordering
    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    Ok(paths)
}
