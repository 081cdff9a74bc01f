// SPDX-License-Identifier: GPL-3.0-only

//! Conversion of arbitrary frame layouts to 8-bit luminance
//!
//! This is the slow path behind the pixel format adapter: a full copy into
//! an owned, tightly packed luma buffer. Every layout except
//! [`PixelFormat::Unknown`] converts.

use crate::backends::camera::types::{BackendError, BackendResult, MappedFrame, PixelFormat};
use crate::frame_processor::adapter::{ImageFormat, ImageView};
use tracing::trace;

/// Owned 8-bit luminance image, rows packed without padding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LumaBuffer {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl LumaBuffer {
    /// Engine-native view of this buffer
    pub fn view(&self) -> ImageView<'_> {
        ImageView::new(
            &self.data,
            self.width,
            self.height,
            ImageFormat::Lum,
            self.width as usize,
        )
    }
}

/// BT.601 luma from 8-bit RGB, in 10-bit fixed point
pub fn rgb_to_luma(r: u8, g: u8, b: u8) -> u8 {
    ((306 * r as u32 + 601 * g as u32 + 117 * b as u32 + 512) >> 10) as u8
}

/// Byte positions of R, G and B within a packed RGB pixel
fn rgb_layout(format: PixelFormat) -> Option<(usize, [usize; 3])> {
    match format {
        PixelFormat::RGBA | PixelFormat::RGBX => Some((4, [0, 1, 2])),
        PixelFormat::BGRA | PixelFormat::BGRX => Some((4, [2, 1, 0])),
        PixelFormat::ARGB => Some((4, [1, 2, 3])),
        PixelFormat::ABGR => Some((4, [3, 2, 1])),
        PixelFormat::RGB24 => Some((3, [0, 1, 2])),
        PixelFormat::BGR24 => Some((3, [2, 1, 0])),
        _ => None,
    }
}

/// Luma sample position (bytes per pixel, offset) for YUV and gray layouts
fn luma_layout(format: PixelFormat) -> Option<(usize, usize)> {
    match format {
        PixelFormat::Gray8 => Some((1, 0)),
        PixelFormat::Y16 => Some((2, 1)),
        PixelFormat::YUYV | PixelFormat::YVYU => Some((2, 0)),
        PixelFormat::UYVY | PixelFormat::VYUY => Some((2, 1)),
        PixelFormat::AYUV => Some((4, 1)),
        f if f.is_planar_yuv() => Some((1, 0)),
        _ => None,
    }
}

/// Colour channel at (dx, dy) within a 2x2 Bayer block: 0=R, 1=G, 2=B
fn bayer_channels(format: PixelFormat) -> Option<[[usize; 2]; 2]> {
    match format {
        PixelFormat::BayerRGGB => Some([[0, 1], [1, 2]]),
        PixelFormat::BayerBGGR => Some([[2, 1], [1, 0]]),
        PixelFormat::BayerGRBG => Some([[1, 0], [2, 1]]),
        PixelFormat::BayerGBRG => Some([[1, 2], [0, 1]]),
        _ => None,
    }
}

/// Convert any known layout to a packed luma buffer
///
/// Fails with [`BackendError::FormatNotSupported`] for
/// [`PixelFormat::Unknown`]. Samples past the end of a short buffer read as
/// black.
pub fn to_luma8(frame: &MappedFrame<'_>) -> BackendResult<LumaBuffer> {
    let width = frame.width as usize;
    let height = frame.height as usize;
    let stride = frame.stride as usize;
    let get = |offset: usize| frame.data.get(offset).copied().unwrap_or(0);

    let data = if let Some((bpp, [r, g, b])) = rgb_layout(frame.format) {
        let mut out = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                let px = y * stride + x * bpp;
                out.push(rgb_to_luma(get(px + r), get(px + g), get(px + b)));
            }
        }
        out
    } else if let Some((bpp, offset)) = luma_layout(frame.format) {
        let mut out = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                out.push(get(y * stride + x * bpp + offset));
            }
        }
        out
    } else if let Some(channels) = bayer_channels(frame.format) {
        bayer_to_luma(frame, channels)
    } else {
        trace!(format = %frame.format, "No luma conversion for format");
        return Err(BackendError::FormatNotSupported(frame.format.to_string()));
    };

    Ok(LumaBuffer {
        width: frame.width,
        height: frame.height,
        data,
    })
}

/// Nearest-neighbour demosaic: every pixel of a 2x2 block gets the block's luma
///
/// Blocks cut short by an odd width or height reuse their last row/column.
fn bayer_to_luma(frame: &MappedFrame<'_>, channels: [[usize; 2]; 2]) -> Vec<u8> {
    let width = frame.width as usize;
    let height = frame.height as usize;
    let stride = frame.stride as usize;
    let mut out = vec![0u8; width * height];

    for by in (0..height).step_by(2) {
        for bx in (0..width).step_by(2) {
            let mut sums = [0u32; 3];
            let mut counts = [0u32; 3];
            for (dy, row) in channels.iter().enumerate() {
                for (dx, &channel) in row.iter().enumerate() {
                    let sx = (bx + dx).min(width - 1);
                    let sy = (by + dy).min(height - 1);
                    sums[channel] += frame.data.get(sy * stride + sx).copied().unwrap_or(0) as u32;
                    counts[channel] += 1;
                }
            }
            let avg = |c: usize| (sums[c] / counts[c].max(1)) as u8;
            let luma = rgb_to_luma(avg(0), avg(1), avg(2));

            for y in by..(by + 2).min(height) {
                for x in bx..(bx + 2).min(width) {
                    out[y * width + x] = luma;
                }
            }
        }
    }

    out
}
