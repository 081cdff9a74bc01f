// SPDX-License-Identifier: GPL-3.0-only

//! QR code decode engine
//!
//! This module implements the [`DecodeEngine`] boundary using the rqrr
//! crate. It reads luminance straight from the canonical view, so any
//! layout the adapter produces works without another copy.

use crate::frame_processor::adapter::ImageView;
use crate::frame_processor::engine::{DecodeEngine, DecodeHints, RawPoint, RawResult};
use crate::frame_processor::types::{BarcodeFormat, DecodeStatus};
use rqrr::{DeQRError, PreparedImage};
use std::time::Instant;
use tracing::{debug, trace};

/// QR code detector
///
/// Only knows QR codes; asking for any other symbology alone yields
/// "not found". With `try_harder` set, an inverted copy of the image is
/// searched as well to pick up light-on-dark codes.
///
/// `try_rotate` has no effect: rqrr finds grids in any orientation.
#[derive(Debug, Default, Clone, Copy)]
pub struct QrDetector;

impl QrDetector {
    pub fn new() -> Self {
        Self
    }
}

impl DecodeEngine for QrDetector {
    fn decode(&self, image: &ImageView<'_>, hints: &DecodeHints) -> RawResult {
        if !hints.formats.accepts(BarcodeFormat::QRCode) {
            trace!(formats = %hints.formats, "QR codes not requested");
            return RawResult::not_found();
        }
        if image.is_empty() {
            return RawResult::not_found();
        }

        let start = Instant::now();
        let mut result = detect(image, false);
        if result.status == DecodeStatus::NotFound && hints.try_harder {
            result = detect(image, true);
        }

        trace!(
            width = image.width(),
            height = image.height(),
            status = %result.status,
            detection_ms = start.elapsed().as_millis(),
            "QR detection complete"
        );

        result
    }
}

/// Map an rqrr decode failure onto a result status
fn failure_status(error: &DeQRError) -> DecodeStatus {
    match error {
        DeQRError::DataEcc => DecodeStatus::ChecksumError,
        _ => DecodeStatus::FormatError,
    }
}

/// Run one detection pass, returning the first decodable grid
fn detect(image: &ImageView<'_>, invert: bool) -> RawResult {
    let mut prepared = PreparedImage::prepare_from_greyscale(
        image.width() as usize,
        image.height() as usize,
        |x, y| {
            let luma = image.luma(x as u32, y as u32);
            if invert { 255 - luma } else { luma }
        },
    );

    let grids = prepared.detect_grids();
    let mut failure = None;

    for grid in grids {
        let mut bytes = Vec::new();
        match grid.decode_to(&mut bytes) {
            Ok(_) => {
                let text = String::from_utf8_lossy(&bytes).into_owned();
                let position = grid
                    .bounds
                    .map(|p| RawPoint::new(p.x as f32, p.y as f32));

                debug!(content = %text, invert, "Detected QR code");
                return RawResult::found(BarcodeFormat::QRCode, &text, bytes, position);
            }
            Err(e) => {
                debug!(error = %e, "Failed to decode QR code");
                failure = Some(failure_status(&e));
            }
        }
    }

    match failure {
        Some(status) => RawResult::failed(BarcodeFormat::QRCode, status),
        None => RawResult::not_found(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame_processor::adapter::ImageFormat;
    use crate::frame_processor::types::BarcodeFormats;

    #[test]
    fn test_blank_image_is_not_found() {
        let data = vec![255u8; 64 * 64];
        let view = ImageView::new(&data, 64, 64, ImageFormat::Lum, 64);
        let result = QrDetector::new().decode(&view, &DecodeHints::default());
        assert_eq!(result.status, DecodeStatus::NotFound);
        assert!(result.text.is_empty());
    }

    #[test]
    fn test_empty_image_is_not_found() {
        let view = ImageView::new(&[], 0, 0, ImageFormat::Lum, 0);
        let result = QrDetector::new().decode(&view, &DecodeHints::default());
        assert_eq!(result.status, DecodeStatus::NotFound);
    }

    #[test]
    fn test_other_formats_only_is_not_found() {
        let data = vec![0u8; 16];
        let view = ImageView::new(&data, 4, 4, ImageFormat::Lum, 4);
        let hints = DecodeHints::default().with_formats(BarcodeFormats::ONE_D_CODES);
        let result = QrDetector::new().decode(&view, &hints);
        assert_eq!(result.status, DecodeStatus::NotFound);
    }

    #[test]
    fn test_try_rotate_does_not_change_result() {
        let data: Vec<u8> = (0..64 * 64).map(|i| if (i / 64 + i % 64) % 7 == 0 { 0 } else { 255 }).collect();
        let view = ImageView::new(&data, 64, 64, ImageFormat::Lum, 64);
        let detector = QrDetector::new();

        let rotated = detector.decode(&view, &DecodeHints::default().with_try_rotate(true));
        let upright = detector.decode(&view, &DecodeHints::default().with_try_rotate(false));
        assert_eq!(rotated, upright);
    }

    #[test]
    fn test_ecc_failure_is_checksum_error() {
        assert_eq!(failure_status(&DeQRError::DataEcc), DecodeStatus::ChecksumError);
        assert_eq!(failure_status(&DeQRError::FormatEcc), DecodeStatus::FormatError);
    }
}
