// SPDX-License-Identifier: GPL-3.0-only

//! One-shot barcode reading from frames and still images

use crate::backends::camera::types::VideoFrame;
use crate::frame_processor::adapter::{Adaptation, ImageFormat, ImageView, adapt};
use crate::frame_processor::engine::{DecodeEngine, DecodeHints};
use crate::frame_processor::types::BarcodeResult;
use crate::media::formats::conversions::to_luma8;
use image::DynamicImage;
use tracing::{debug, trace, warn};

/// Decode a camera frame
///
/// Returns `None` when the engine could not be invoked at all: the frame
/// memory did not map, or its layout has no luminance conversion.
pub fn try_read_frame<F>(
    engine: &dyn DecodeEngine,
    frame: &F,
    hints: &DecodeHints,
) -> Option<BarcodeResult>
where
    F: VideoFrame + ?Sized,
{
    let mapped = match frame.map() {
        Ok(mapped) => mapped,
        Err(e) => {
            warn!(error = %e, "Invalid video frame: could not map memory");
            return None;
        }
    };

    let raw = match adapt(&mapped) {
        Adaptation::Direct(view) => engine.decode(&view, hints),
        Adaptation::NeedsConversion => {
            trace!(format = %mapped.format, "Converting frame to luminance");
            match to_luma8(&mapped) {
                Ok(luma) => engine.decode(&luma.view(), hints),
                Err(e) => {
                    debug!(error = %e, "Frame skipped");
                    return None;
                }
            }
        }
    };

    Some(BarcodeResult::project(&raw))
}

/// Decode a camera frame, falling back to a not-found result
pub fn read_frame<F>(engine: &dyn DecodeEngine, frame: &F, hints: &DecodeHints) -> BarcodeResult
where
    F: VideoFrame + ?Sized,
{
    try_read_frame(engine, frame, hints).unwrap_or_default()
}

/// Decode a still image
///
/// Layouts the engine reads natively are passed without copying; anything
/// else is converted to 8-bit luma first.
pub fn read_image(engine: &dyn DecodeEngine, image: &DynamicImage, hints: &DecodeHints) -> BarcodeResult {
    let (width, height) = (image.width(), image.height());
    let raw = match image {
        DynamicImage::ImageLuma8(buf) => {
            engine.decode(&ImageView::new(buf.as_raw(), width, height, ImageFormat::Lum, width as usize), hints)
        }
        DynamicImage::ImageRgb8(buf) => engine.decode(
            &ImageView::new(buf.as_raw(), width, height, ImageFormat::RGB, width as usize * 3),
            hints,
        ),
        DynamicImage::ImageRgba8(buf) => engine.decode(
            &ImageView::new(buf.as_raw(), width, height, ImageFormat::RGBX, width as usize * 4),
            hints,
        ),
        other => {
            let luma = other.to_luma8();
            engine.decode(
                &ImageView::new(luma.as_raw(), width, height, ImageFormat::Lum, width as usize),
                hints,
            )
        }
    };

    BarcodeResult::project(&raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::camera::types::{CameraFrame, PixelFormat};
    use crate::frame_processor::engine::RawResult;
    use crate::frame_processor::types::{BarcodeFormat, DecodeStatus};
    use std::cell::RefCell;

    /// Records what the engine was handed
    #[derive(Default)]
    struct Recorder {
        seen: RefCell<Vec<(ImageFormat, usize, usize, u8)>>,
    }

    impl DecodeEngine for Recorder {
        fn decode(&self, image: &ImageView<'_>, _hints: &DecodeHints) -> RawResult {
            self.seen.borrow_mut().push((
                image.format(),
                image.pix_stride(),
                image.row_stride(),
                image.luma(0, 0),
            ));
            RawResult::found(BarcodeFormat::QRCode, "ok", b"ok".to_vec(), Default::default())
        }
    }

    #[test]
    fn test_direct_frame_is_not_copied() {
        let engine = Recorder::default();
        let frame = CameraFrame::new(2, 1, 4, PixelFormat::UYVY, vec![0, 42, 0, 43]);
        let result = read_frame(&engine, &frame, &DecodeHints::default());

        assert!(result.is_valid());
        assert_eq!(*engine.seen.borrow(), vec![(ImageFormat::Lum, 2, 4, 42)]);
    }

    #[test]
    fn test_rgb_frame_is_converted() {
        let engine = Recorder::default();
        let frame = CameraFrame::new(2, 1, 8, PixelFormat::BGRA, vec![255, 255, 255, 255, 0, 0, 0, 255]);
        let result = read_frame(&engine, &frame, &DecodeHints::default());

        assert!(result.is_valid());
        // Packed luma: one byte per pixel, stride equals width
        assert_eq!(*engine.seen.borrow(), vec![(ImageFormat::Lum, 1, 2, 255)]);
    }

    #[test]
    fn test_unmappable_frame_skips_engine() {
        let engine = Recorder::default();
        let frame = CameraFrame::new(10, 10, 10, PixelFormat::Gray8, vec![0u8; 3]);

        assert!(try_read_frame(&engine, &frame, &DecodeHints::default()).is_none());
        let result = read_frame(&engine, &frame, &DecodeHints::default());
        assert_eq!(result.status(), DecodeStatus::NotFound);
        assert!(engine.seen.borrow().is_empty());
    }

    #[test]
    fn test_unknown_layout_skips_engine() {
        let engine = Recorder::default();
        let frame = CameraFrame::new(2, 2, 2, PixelFormat::Unknown, vec![0u8; 4]);
        assert!(try_read_frame(&engine, &frame, &DecodeHints::default()).is_none());
        assert!(engine.seen.borrow().is_empty());
    }

    #[test]
    fn test_read_image_native_layouts() {
        let engine = Recorder::default();
        let hints = DecodeHints::default();

        let rgb = DynamicImage::ImageRgb8(image::RgbImage::from_pixel(3, 2, image::Rgb([255, 255, 255])));
        read_image(&engine, &rgb, &hints);

        let gray = DynamicImage::ImageLuma8(image::GrayImage::from_pixel(3, 2, image::Luma([9])));
        read_image(&engine, &gray, &hints);

        let wide = DynamicImage::ImageLuma16(image::ImageBuffer::from_pixel(3, 2, image::Luma([0xffffu16])));
        read_image(&engine, &wide, &hints);

        assert_eq!(
            *engine.seen.borrow(),
            vec![
                (ImageFormat::RGB, 3, 9, 255),
                (ImageFormat::Lum, 1, 3, 9),
                (ImageFormat::Lum, 1, 3, 255),
            ]
        );
    }
}
