// SPDX-License-Identifier: GPL-3.0-only

//! Pixel format adapter
//!
//! Maps a camera frame onto the layout the decode engine reads, without
//! copying: only the format tag and the stride/offset pair change. Layouts
//! whose luma samples cannot be reached that way are reported as
//! [`Adaptation::NeedsConversion`] and go through
//! [`crate::media::formats::conversions::to_luma8`] instead.

use crate::backends::camera::types::{MappedFrame, PixelFormat};
use crate::media::formats::conversions::rgb_to_luma;

/// Pixel layout of an [`ImageView`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    /// 8-bit luminance
    Lum,
    /// R G B
    RGB,
    /// B G R
    BGR,
    /// R G B, padding byte
    RGBX,
    /// Padding byte, R G B
    XRGB,
    /// B G R, padding byte
    BGRX,
    /// Padding byte, B G R
    XBGR,
}

impl ImageFormat {
    /// Natural distance in bytes between neighbouring pixels
    pub fn pixel_width(&self) -> usize {
        match self {
            Self::Lum => 1,
            Self::RGB | Self::BGR => 3,
            Self::RGBX | Self::XRGB | Self::BGRX | Self::XBGR => 4,
        }
    }

    /// Byte positions of R, G and B within a pixel
    fn rgb_offsets(&self) -> Option<[usize; 3]> {
        match self {
            Self::Lum => None,
            Self::RGB | Self::RGBX => Some([0, 1, 2]),
            Self::BGR | Self::BGRX => Some([2, 1, 0]),
            Self::XRGB => Some([1, 2, 3]),
            Self::XBGR => Some([3, 2, 1]),
        }
    }
}

/// Borrowed, engine-native description of an image
///
/// Pixel `(x, y)` starts at byte `pix_offset + y * row_stride + x * pix_stride`
/// of `data`.
#[derive(Debug, Clone, Copy)]
pub struct ImageView<'a> {
    data: &'a [u8],
    width: u32,
    height: u32,
    format: ImageFormat,
    row_stride: usize,
    pix_stride: usize,
    pix_offset: usize,
}

impl<'a> ImageView<'a> {
    /// Create a view with the format's natural pixel stride
    pub fn new(data: &'a [u8], width: u32, height: u32, format: ImageFormat, row_stride: usize) -> Self {
        Self {
            data,
            width,
            height,
            format,
            row_stride,
            pix_stride: format.pixel_width(),
            pix_offset: 0,
        }
    }

    /// Override the pixel stride and the offset of the first sample
    pub fn with_sampling(mut self, pix_stride: usize, pix_offset: usize) -> Self {
        self.pix_stride = pix_stride;
        self.pix_offset = pix_offset;
        self
    }

    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    pub fn row_stride(&self) -> usize {
        self.row_stride
    }

    pub fn pix_stride(&self) -> usize {
        self.pix_stride
    }

    pub fn pix_offset(&self) -> usize {
        self.pix_offset
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Luminance of one pixel
    ///
    /// Samples outside the buffer read as black.
    pub fn luma(&self, x: u32, y: u32) -> u8 {
        let start = self.pix_offset + y as usize * self.row_stride + x as usize * self.pix_stride;
        match self.format.rgb_offsets() {
            None => self.data.get(start).copied().unwrap_or(0),
            Some([r, g, b]) => {
                let sample = |i: usize| self.data.get(start + i).copied().unwrap_or(0);
                rgb_to_luma(sample(r), sample(g), sample(b))
            }
        }
    }
}

/// Outcome of adapting a frame
#[derive(Debug, Clone, Copy)]
pub enum Adaptation<'a> {
    /// The frame can be handed to the engine as-is
    Direct(ImageView<'a>),
    /// The frame must be converted to 8-bit luminance first
    NeedsConversion,
}

/// Luma sampling (pixel stride, offset) for layouts readable in place
fn luma_sampling(format: PixelFormat) -> Option<(usize, usize)> {
    match format {
        PixelFormat::Gray8 => Some((1, 0)),
        // Little-endian, keep the significant byte
        PixelFormat::Y16 => Some((2, 1)),
        PixelFormat::YUYV | PixelFormat::YVYU => Some((2, 0)),
        PixelFormat::UYVY | PixelFormat::VYUY => Some((2, 1)),
        PixelFormat::AYUV => Some((4, 1)),
        // Chroma planes follow the Y plane and are ignored
        f if f.is_planar_yuv() => Some((1, 0)),
        _ => None,
    }
}

/// Map a frame onto an engine-native view
///
/// Never reads pixel data and never copies. Zero-area frames pass through;
/// the engine deals with degenerate geometry.
pub fn adapt<'a>(frame: &MappedFrame<'a>) -> Adaptation<'a> {
    match luma_sampling(frame.format) {
        Some((pix_stride, pix_offset)) => Adaptation::Direct(
            ImageView::new(
                frame.data,
                frame.width,
                frame.height,
                ImageFormat::Lum,
                frame.stride as usize,
            )
            .with_sampling(pix_stride, pix_offset),
        ),
        None => Adaptation::NeedsConversion,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapped(format: PixelFormat, data: &[u8], width: u32, height: u32, stride: u32) -> MappedFrame<'_> {
        MappedFrame {
            data,
            width,
            height,
            stride,
            format,
        }
    }

    fn direct<'a>(frame: &MappedFrame<'a>) -> ImageView<'a> {
        match adapt(frame) {
            Adaptation::Direct(view) => view,
            Adaptation::NeedsConversion => panic!("{} should adapt directly", frame.format),
        }
    }

    #[test]
    fn test_luma_table() {
        let cases = [
            (PixelFormat::Gray8, 1, 0),
            (PixelFormat::Y16, 2, 1),
            (PixelFormat::YUYV, 2, 0),
            (PixelFormat::YVYU, 2, 0),
            (PixelFormat::UYVY, 2, 1),
            (PixelFormat::VYUY, 2, 1),
            (PixelFormat::AYUV, 4, 1),
            (PixelFormat::I420, 1, 0),
            (PixelFormat::YV12, 1, 0),
            (PixelFormat::NV12, 1, 0),
            (PixelFormat::NV21, 1, 0),
            (PixelFormat::IMC1, 1, 0),
            (PixelFormat::IMC2, 1, 0),
            (PixelFormat::IMC3, 1, 0),
            (PixelFormat::IMC4, 1, 0),
            (PixelFormat::YUV422P, 1, 0),
        ];

        let data = [0u8; 64];
        for (format, pix_stride, pix_offset) in cases {
            let frame = mapped(format, &data, 4, 2, 16);
            let view = direct(&frame);
            assert_eq!(view.format(), ImageFormat::Lum, "{}", format);
            assert_eq!(view.pix_stride(), pix_stride, "{}", format);
            assert_eq!(view.pix_offset(), pix_offset, "{}", format);
            assert_eq!(view.row_stride(), 16, "{}", format);
            assert_eq!((view.width(), view.height()), (4, 2));
        }
    }

    #[test]
    fn test_view_borrows_source() {
        let data = vec![7u8; 32];
        let frame = mapped(PixelFormat::Gray8, &data, 8, 4, 8);
        let view = direct(&frame);
        assert!(std::ptr::eq(view.data().as_ptr(), data.as_ptr()));
    }

    #[test]
    fn test_conversion_required() {
        let unsupported = [
            PixelFormat::RGBA,
            PixelFormat::BGRA,
            PixelFormat::ARGB,
            PixelFormat::ABGR,
            PixelFormat::RGBX,
            PixelFormat::BGRX,
            PixelFormat::RGB24,
            PixelFormat::BGR24,
            PixelFormat::BayerRGGB,
            PixelFormat::BayerBGGR,
            PixelFormat::BayerGRBG,
            PixelFormat::BayerGBRG,
            PixelFormat::Unknown,
        ];

        let data = [0u8; 64];
        for format in unsupported {
            let frame = mapped(format, &data, 4, 2, 16);
            assert!(
                matches!(adapt(&frame), Adaptation::NeedsConversion),
                "{} should need conversion",
                format
            );
        }
    }

    #[test]
    fn test_zero_area_passes_through() {
        let frame = mapped(PixelFormat::YUYV, &[], 0, 0, 0);
        let view = direct(&frame);
        assert!(view.is_empty());
        assert_eq!(view.pix_stride(), 2);
    }

    #[test]
    fn test_uyvy_samples_luma() {
        // U Y0 V Y1 per 4-byte group, two groups per row, stride padded to 10
        let data = [
            1, 10, 2, 20, 3, 30, 4, 40, 0, 0, //
            5, 50, 6, 60, 7, 70, 8, 80, 0, 0,
        ];
        let frame = mapped(PixelFormat::UYVY, &data, 4, 2, 10);
        let view = direct(&frame);
        let row0: Vec<u8> = (0..4).map(|x| view.luma(x, 0)).collect();
        let row1: Vec<u8> = (0..4).map(|x| view.luma(x, 1)).collect();
        assert_eq!(row0, [10, 20, 30, 40]);
        assert_eq!(row1, [50, 60, 70, 80]);
    }

    #[test]
    fn test_y16_keeps_high_byte() {
        let data = [0x34, 0x12, 0xff, 0xab];
        let frame = mapped(PixelFormat::Y16, &data, 2, 1, 4);
        let view = direct(&frame);
        assert_eq!(view.luma(0, 0), 0x12);
        assert_eq!(view.luma(1, 0), 0xab);
    }

    #[test]
    fn test_rgb_view_luma() {
        let data = [255, 255, 255, 0, 0, 0, 0, 0];
        let view = ImageView::new(&data, 2, 1, ImageFormat::RGBX, 8);
        assert_eq!(view.luma(0, 0), 255);
        assert_eq!(view.luma(1, 0), 0);
        // Out of bounds reads as black
        assert_eq!(view.luma(5, 5), 0);
    }
}
