// SPDX-License-Identifier: MPL-2.0

//! Decode engine boundary
//!
//! The engine is a black box: it takes a canonical [`ImageView`] and a set of
//! [`DecodeHints`] and answers with a [`RawResult`]. It never fails hard; an
//! image with nothing in it, or with geometry it cannot use, is simply
//! "not found".

use crate::constants::decode;
use crate::frame_processor::adapter::ImageView;
use crate::frame_processor::types::{BarcodeFormat, BarcodeFormats, DecodeStatus};

/// Options understood by the decode engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeHints {
    /// Symbologies to look for (empty = any)
    pub formats: BarcodeFormats,
    /// Also look for symbols rotated by 90 degrees
    pub try_rotate: bool,
    /// Spend more time to find hard-to-read symbols
    pub try_harder: bool,
}

impl Default for DecodeHints {
    fn default() -> Self {
        Self {
            formats: BarcodeFormats::empty(),
            try_rotate: decode::DEFAULT_TRY_ROTATE,
            try_harder: decode::DEFAULT_TRY_HARDER,
        }
    }
}

impl DecodeHints {
    pub fn with_formats(mut self, formats: impl Into<BarcodeFormats>) -> Self {
        self.formats = formats.into();
        self
    }

    pub fn with_try_rotate(mut self, try_rotate: bool) -> Self {
        self.try_rotate = try_rotate;
        self
    }

    pub fn with_try_harder(mut self, try_harder: bool) -> Self {
        self.try_harder = try_harder;
        self
    }
}

/// Corner point in the engine's sub-pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RawPoint {
    pub x: f32,
    pub y: f32,
}

impl RawPoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Result as reported by the engine
///
/// Text is kept in the engine's native UTF-16 form; the projector turns it
/// into a `String`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawResult {
    pub status: DecodeStatus,
    pub format: BarcodeFormat,
    pub text: Vec<u16>,
    pub raw_bytes: Vec<u8>,
    /// Top-left, top-right, bottom-right, bottom-left
    pub position: [RawPoint; 4],
}

impl RawResult {
    /// Nothing detected
    pub fn not_found() -> Self {
        Self::default()
    }

    /// A symbol was located but could not be decoded
    pub fn failed(format: BarcodeFormat, status: DecodeStatus) -> Self {
        Self {
            status,
            format,
            ..Self::default()
        }
    }

    /// A successfully decoded symbol
    pub fn found(
        format: BarcodeFormat,
        text: &str,
        raw_bytes: Vec<u8>,
        position: [RawPoint; 4],
    ) -> Self {
        Self {
            status: DecodeStatus::NoError,
            format,
            text: text.encode_utf16().collect(),
            raw_bytes,
            position,
        }
    }
}

/// A barcode decoder
///
/// Implementations must not keep the image data beyond the call.
pub trait DecodeEngine {
    fn decode(&self, image: &ImageView<'_>, hints: &DecodeHints) -> RawResult;
}

impl<E: DecodeEngine + ?Sized> DecodeEngine for Box<E> {
    fn decode(&self, image: &ImageView<'_>, hints: &DecodeHints) -> RawResult {
        (**self).decode(image, hints)
    }
}
