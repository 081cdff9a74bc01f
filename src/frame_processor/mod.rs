// SPDX-License-Identifier: GPL-3.0-only

//! Barcode decoding for video streams
//!
//! Frames flow through three stages:
//!
//! - [`adapter`]: describe the frame memory the way the engine reads it,
//!   copying only when the layout has no direct description
//! - [`engine`]: the decode engine boundary, implemented by [`tasks::QrDetector`]
//! - [`filter`]: rate-gated scheduling ([`gate`]) and result publication
//!
//! Results are projected into the owned [`types::BarcodeResult`].

pub mod adapter;
pub mod engine;
pub mod filter;
pub mod gate;
pub mod reader;
pub mod tasks;
pub mod types;

pub use adapter::{Adaptation, ImageFormat, ImageView, adapt};
pub use engine::{DecodeEngine, DecodeHints, RawPoint, RawResult};
pub use filter::{FilterEvent, VideoFilter};
pub use gate::{FrameGate, GateState};
pub use reader::{read_frame, read_image, try_read_frame};
pub use tasks::QrDetector;
pub use types::{BarcodeFormat, BarcodeFormats, BarcodeResult, DecodeStatus, Point, Position};
