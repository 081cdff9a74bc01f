// SPDX-License-Identifier: GPL-3.0-only

//! Barcode Filter - rate-limited barcode decoding for camera streams
//!
//! This library turns camera frames into barcode results without copying
//! frame memory whenever the layout allows it, and schedules decoding so a
//! live stream never queues up work.
//!
//! # Architecture
//!
//! - [`backends`]: camera frame types and the frame mapping boundary
//! - [`frame_processor`]: format adaptation, decoding, gating and publication
//! - [`media`]: slow-path pixel format conversion
//! - [`config`]: user configuration handling
//!
//! # Example
//!
//! ```no_run
//! use barcode_filter::{DecodeHints, QrDetector, VideoFilter};
//! use barcode_filter::backends::camera::{CameraFrame, PixelFormat};
//! use std::time::Duration;
//!
//! let filter = VideoFilter::new(QrDetector, DecodeHints::default(), Duration::from_millis(200));
//! let mut events = filter.subscribe();
//!
//! let frame = CameraFrame::new(640, 480, 640, PixelFormat::Gray8, vec![0u8; 640 * 480]);
//! filter.process(&frame);
//! while let Ok(Some(event)) = events.try_next() {
//!     println!("{:?}", event);
//! }
//! ```

pub mod backends;
pub mod config;
pub mod constants;
pub mod errors;
pub mod frame_processor;
pub mod media;

// Re-export commonly used types
pub use config::Config;
pub use errors::{AppError, AppResult};
pub use frame_processor::{
    BarcodeFormat, BarcodeFormats, BarcodeResult, DecodeEngine, DecodeHints, DecodeStatus,
    FilterEvent, QrDetector, VideoFilter,
};
