// SPDX-License-Identifier: GPL-3.0-only
// Shared types for the capture-device boundary

//! Frame types handed over by the capture device
//!
//! The capture device owns frame memory. A frame is only readable through
//! [`VideoFrame::map`], which borrows the bytes for as long as one
//! notification is being handled.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Pixel layout of a camera frame
///
/// Closed set of layouts a capture device may produce. Luma-bearing YUV
/// layouts are read in place; everything else goes through a full conversion
/// to 8-bit luminance before decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PixelFormat {
    /// RGBA - 32-bit (R G B A byte order)
    RGBA,
    /// BGRA - 32-bit (B G R A byte order)
    BGRA,
    /// ARGB - 32-bit (A R G B byte order)
    ARGB,
    /// ABGR - 32-bit (A B G R byte order)
    ABGR,
    /// RGBX - 32-bit, padding byte last
    RGBX,
    /// BGRX - 32-bit, padding byte last
    BGRX,
    /// RGB24 - 24-bit RGB (3 bytes per pixel, no alpha)
    RGB24,
    /// BGR24 - 24-bit BGR (3 bytes per pixel, no alpha)
    BGR24,
    /// YUYV - Packed 4:2:2 (Y0 U Y1 V interleaved)
    YUYV,
    /// YVYU - Packed 4:2:2 (Y0 V Y1 U interleaved)
    YVYU,
    /// UYVY - Packed 4:2:2 (U Y0 V Y1 interleaved)
    UYVY,
    /// VYUY - Packed 4:2:2 (V Y0 U Y1 interleaved)
    VYUY,
    /// AYUV - Packed 4:4:4 with alpha (A Y U V byte order)
    AYUV,
    /// I420 - Planar 4:2:0 (Y plane, then U, then V)
    I420,
    /// YV12 - Planar 4:2:0 (Y plane, then V, then U)
    YV12,
    /// NV12 - Semi-planar 4:2:0 (Y plane + interleaved UV plane)
    NV12,
    /// NV21 - Semi-planar 4:2:0 (Y plane + interleaved VU plane)
    NV21,
    /// IMC1 - Planar 4:2:0, V and U planes padded to the Y stride
    IMC1,
    /// IMC2 - Like IMC1 with V and U sharing rows
    IMC2,
    /// IMC3 - Like IMC1 with U before V
    IMC3,
    /// IMC4 - Like IMC2 with U before V
    IMC4,
    /// YUV422P - Planar 4:2:2
    YUV422P,
    /// Gray8 - 8-bit luminance (single channel)
    Gray8,
    /// Y16 - 16-bit little-endian luminance
    Y16,
    /// RGGB Bayer pattern - Raw sensor data
    BayerRGGB,
    /// BGGR Bayer pattern - Raw sensor data
    BayerBGGR,
    /// GRBG Bayer pattern - Raw sensor data
    BayerGRBG,
    /// GBRG Bayer pattern - Raw sensor data
    BayerGBRG,
    /// Layout the capture device could not name
    Unknown,
}

impl PixelFormat {
    /// Check if this format starts with a contiguous full-resolution Y plane
    pub fn is_planar_yuv(&self) -> bool {
        matches!(
            self,
            Self::I420
                | Self::YV12
                | Self::NV12
                | Self::NV21
                | Self::IMC1
                | Self::IMC2
                | Self::IMC3
                | Self::IMC4
                | Self::YUV422P
        )
    }

    /// Bytes occupied by one pixel in the first plane
    ///
    /// Packed 4:2:2 layouts average two bytes per pixel. Planar layouts report
    /// the Y plane only. `None` for [`PixelFormat::Unknown`].
    pub fn bytes_per_pixel(&self) -> Option<usize> {
        match self {
            Self::RGBA | Self::BGRA | Self::ARGB | Self::ABGR | Self::RGBX | Self::BGRX => Some(4),
            Self::RGB24 | Self::BGR24 => Some(3),
            Self::YUYV | Self::YVYU | Self::UYVY | Self::VYUY => Some(2),
            Self::AYUV => Some(4),
            Self::Y16 => Some(2),
            Self::Gray8 => Some(1),
            Self::BayerRGGB | Self::BayerBGGR | Self::BayerGRBG | Self::BayerGBRG => Some(1),
            f if f.is_planar_yuv() => Some(1),
            _ => None,
        }
    }

    /// Parse format from a FourCC or format name string
    pub fn from_fourcc(format: &str) -> Self {
        match format.trim() {
            "RGBA" => Self::RGBA,
            "BGRA" => Self::BGRA,
            "ARGB" => Self::ARGB,
            "ABGR" => Self::ABGR,
            "RGBx" | "RGBX" => Self::RGBX,
            "BGRx" | "BGRX" => Self::BGRX,
            "RGB" | "RGB3" => Self::RGB24,
            "BGR" | "BGR3" => Self::BGR24,
            "YUYV" | "YUY2" => Self::YUYV,
            "YVYU" => Self::YVYU,
            "UYVY" => Self::UYVY,
            "VYUY" => Self::VYUY,
            "AYUV" => Self::AYUV,
            "I420" | "YU12" => Self::I420,
            "YV12" => Self::YV12,
            "NV12" => Self::NV12,
            "NV21" => Self::NV21,
            "IMC1" => Self::IMC1,
            "IMC2" => Self::IMC2,
            "IMC3" => Self::IMC3,
            "IMC4" => Self::IMC4,
            "Y42B" | "422P" => Self::YUV422P,
            "GRAY8" | "GREY" | "Y8" | "Y800" => Self::Gray8,
            "GRAY16_LE" | "Y16" => Self::Y16,
            "rggb" | "RGGB" => Self::BayerRGGB,
            "bggr" | "BGGR" => Self::BayerBGGR,
            "grbg" | "GRBG" => Self::BayerGRBG,
            "gbrg" | "GBRG" => Self::BayerGBRG,
            _ => Self::Unknown,
        }
    }
}

impl std::fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Borrowed view of a mapped frame
///
/// Valid only while the frame it came from is borrowed. Nothing downstream
/// may keep the slice past the notification that produced it.
#[derive(Debug, Clone, Copy)]
pub struct MappedFrame<'a> {
    pub data: &'a [u8],
    pub width: u32,
    pub height: u32,
    /// Bytes between the starts of consecutive rows of the first plane
    pub stride: u32,
    pub format: PixelFormat,
}

/// A frame delivered by the capture device
///
/// Mapping is the only way to reach pixel memory and it may fail, e.g. when
/// the device has already recycled the buffer.
pub trait VideoFrame {
    /// Map the frame memory for reading
    fn map(&self) -> BackendResult<MappedFrame<'_>>;
}

/// A single owned frame from the camera
///
/// `data` holds the whole buffer; for planar formats the Y plane comes first.
#[derive(Debug, Clone)]
pub struct CameraFrame {
    pub width: u32,
    pub height: u32,
    pub data: Arc<[u8]>,
    /// Pixel format of the data
    pub format: PixelFormat,
    /// Row stride for the first plane (bytes per row, may include padding)
    pub stride: u32,
}

impl CameraFrame {
    /// Create a frame from owned bytes
    pub fn new(
        width: u32,
        height: u32,
        stride: u32,
        format: PixelFormat,
        data: impl Into<Arc<[u8]>>,
    ) -> Self {
        Self {
            width,
            height,
            data: data.into(),
            format,
            stride,
        }
    }

    /// Bytes the first plane must span for the declared geometry
    fn required_len(&self) -> Option<usize> {
        if self.width == 0 || self.height == 0 {
            return Some(0);
        }
        let row_bytes = self.format.bytes_per_pixel()? * self.width as usize;
        Some((self.height as usize - 1) * self.stride as usize + row_bytes)
    }
}

impl VideoFrame for CameraFrame {
    fn map(&self) -> BackendResult<MappedFrame<'_>> {
        if let Some(required) = self.required_len() {
            if self.data.len() < required {
                return Err(BackendError::MapFailed(format!(
                    "{}x{} {} frame needs {} bytes, buffer holds {}",
                    self.width,
                    self.height,
                    self.format,
                    required,
                    self.data.len()
                )));
            }
            let row_bytes = self.format.bytes_per_pixel().unwrap_or(0) * self.width as usize;
            if self.height > 1 && (self.stride as usize) < row_bytes {
                return Err(BackendError::InvalidFrame(format!(
                    "stride {} shorter than a {}-byte row",
                    self.stride, row_bytes
                )));
            }
        }

        Ok(MappedFrame {
            data: &self.data[..],
            width: self.width,
            height: self.height,
            stride: self.stride,
            format: self.format,
        })
    }
}

/// Result type for backend operations
pub type BackendResult<T> = Result<T, BackendError>;

/// Error types for frame access
#[derive(Debug, Clone)]
pub enum BackendError {
    /// Frame geometry is inconsistent
    InvalidFrame(String),
    /// Frame memory could not be mapped
    MapFailed(String),
    /// No luminance conversion exists for the format
    FormatNotSupported(String),
}

impl std::fmt::Display for BackendError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendError::InvalidFrame(msg) => write!(f, "Invalid frame: {}", msg),
            BackendError::MapFailed(msg) => write!(f, "Could not map frame memory: {}", msg),
            BackendError::FormatNotSupported(msg) => write!(f, "Format not supported: {}", msg),
        }
    }
}

impl std::error::Error for BackendError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fourcc_parsing() {
        assert_eq!(PixelFormat::from_fourcc("YUY2"), PixelFormat::YUYV);
        assert_eq!(PixelFormat::from_fourcc("GREY"), PixelFormat::Gray8);
        assert_eq!(PixelFormat::from_fourcc("NV21"), PixelFormat::NV21);
        assert_eq!(PixelFormat::from_fourcc("BGRx"), PixelFormat::BGRX);
        assert_eq!(PixelFormat::from_fourcc("MJPG"), PixelFormat::Unknown);
    }

    #[test]
    fn test_map_checks_buffer_length() {
        let frame = CameraFrame::new(4, 4, 4, PixelFormat::Gray8, vec![0u8; 15]);
        assert!(matches!(frame.map(), Err(BackendError::MapFailed(_))));

        let frame = CameraFrame::new(4, 4, 4, PixelFormat::Gray8, vec![0u8; 16]);
        let mapped = frame.map().expect("exact-size buffer should map");
        assert_eq!(mapped.data.len(), 16);
        assert_eq!(mapped.stride, 4);
    }

    #[test]
    fn test_map_last_row_without_padding() {
        // Padding after the last row is optional
        let frame = CameraFrame::new(2, 2, 8, PixelFormat::YUYV, vec![0u8; 12]);
        assert!(frame.map().is_ok());
    }

    #[test]
    fn test_map_rejects_short_stride() {
        let frame = CameraFrame::new(4, 2, 4, PixelFormat::RGBA, vec![0u8; 64]);
        assert!(matches!(frame.map(), Err(BackendError::InvalidFrame(_))));
    }

    #[test]
    fn test_zero_area_frame_maps() {
        let frame = CameraFrame::new(0, 0, 0, PixelFormat::Gray8, Vec::new());
        let mapped = frame.map().expect("zero-area frame should map");
        assert_eq!((mapped.width, mapped.height), (0, 0));
    }
}
