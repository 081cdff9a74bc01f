// SPDX-License-Identifier: MPL-2.0

//! Core types for decode results
//!
//! [`BarcodeResult`] is the value handed to subscribers. It owns copies of
//! everything it exposes, so the engine's [`RawResult`] can be dropped as
//! soon as it has been projected.

use crate::frame_processor::engine::{RawPoint, RawResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitOr, BitOrAssign};
use std::str::FromStr;
use std::time::Duration;

/// Barcode symbology
///
/// Each symbology owns one bit so that a set of them fits in a
/// [`BarcodeFormats`] mask. The numeric values are stable and shared with
/// integer-typed consumers through [`BarcodeFormat::bits`] and
/// [`BarcodeFormat::from_bits`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u32)]
pub enum BarcodeFormat {
    /// No barcode detected
    #[default]
    None = 0,
    /// Aztec (2D)
    Aztec = 1 << 0,
    /// Codabar (1D)
    Codabar = 1 << 1,
    /// Code39 (1D)
    Code39 = 1 << 2,
    /// Code93 (1D)
    Code93 = 1 << 3,
    /// Code128 (1D)
    Code128 = 1 << 4,
    /// GS1 DataBar, formerly known as RSS 14
    DataBar = 1 << 5,
    /// GS1 DataBar Expanded
    DataBarExpanded = 1 << 6,
    /// DataMatrix (2D)
    DataMatrix = 1 << 7,
    /// EAN-8 (1D)
    EAN8 = 1 << 8,
    /// EAN-13 (1D)
    EAN13 = 1 << 9,
    /// ITF, Interleaved Two of Five (1D)
    ITF = 1 << 10,
    /// MaxiCode (2D)
    MaxiCode = 1 << 11,
    /// PDF417 (stacked)
    PDF417 = 1 << 12,
    /// QR Code (2D)
    QRCode = 1 << 13,
    /// UPC-A (1D)
    UPCA = 1 << 14,
    /// UPC-E (1D)
    UPCE = 1 << 15,
    /// Micro QR Code (2D)
    MicroQRCode = 1 << 16,
}

impl BarcodeFormat {
    /// Every real symbology, in bit order
    pub const ALL: [BarcodeFormat; 17] = [
        BarcodeFormat::Aztec,
        BarcodeFormat::Codabar,
        BarcodeFormat::Code39,
        BarcodeFormat::Code93,
        BarcodeFormat::Code128,
        BarcodeFormat::DataBar,
        BarcodeFormat::DataBarExpanded,
        BarcodeFormat::DataMatrix,
        BarcodeFormat::EAN8,
        BarcodeFormat::EAN13,
        BarcodeFormat::ITF,
        BarcodeFormat::MaxiCode,
        BarcodeFormat::PDF417,
        BarcodeFormat::QRCode,
        BarcodeFormat::UPCA,
        BarcodeFormat::UPCE,
        BarcodeFormat::MicroQRCode,
    ];

    /// Numeric value of this symbology
    pub fn bits(self) -> u32 {
        self as u32
    }

    /// Look up a symbology by its exact numeric value
    pub fn from_bits(bits: u32) -> Option<Self> {
        if bits == 0 {
            return Some(Self::None);
        }
        Self::ALL.into_iter().find(|f| f.bits() == bits)
    }

    /// Display name of the symbology
    pub fn name(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Aztec => "Aztec",
            Self::Codabar => "Codabar",
            Self::Code39 => "Code39",
            Self::Code93 => "Code93",
            Self::Code128 => "Code128",
            Self::DataBar => "DataBar",
            Self::DataBarExpanded => "DataBarExpanded",
            Self::DataMatrix => "DataMatrix",
            Self::EAN8 => "EAN-8",
            Self::EAN13 => "EAN-13",
            Self::ITF => "ITF",
            Self::MaxiCode => "MaxiCode",
            Self::PDF417 => "PDF417",
            Self::QRCode => "QRCode",
            Self::UPCA => "UPC-A",
            Self::UPCE => "UPC-E",
            Self::MicroQRCode => "MicroQRCode",
        }
    }
}

impl fmt::Display for BarcodeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Lower-case a symbology name and drop separators ("EAN-13" -> "ean13")
fn normalize_name(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '-' | '_' | ' '))
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

impl FromStr for BarcodeFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = normalize_name(s);
        if wanted == "none" {
            return Ok(Self::None);
        }
        Self::ALL
            .into_iter()
            .find(|f| normalize_name(f.name()) == wanted)
            .ok_or_else(|| format!("unknown barcode format '{}'", s))
    }
}

/// Set of symbologies as a bitmask
///
/// An empty set means "any format" to the decode engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BarcodeFormats(u32);

impl BarcodeFormats {
    pub const ONE_D_CODES: BarcodeFormats = BarcodeFormats(
        BarcodeFormat::Codabar as u32
            | BarcodeFormat::Code39 as u32
            | BarcodeFormat::Code93 as u32
            | BarcodeFormat::Code128 as u32
            | BarcodeFormat::EAN8 as u32
            | BarcodeFormat::EAN13 as u32
            | BarcodeFormat::ITF as u32
            | BarcodeFormat::DataBar as u32
            | BarcodeFormat::DataBarExpanded as u32
            | BarcodeFormat::UPCA as u32
            | BarcodeFormat::UPCE as u32,
    );

    pub const TWO_D_CODES: BarcodeFormats = BarcodeFormats(
        BarcodeFormat::Aztec as u32
            | BarcodeFormat::DataMatrix as u32
            | BarcodeFormat::MaxiCode as u32
            | BarcodeFormat::PDF417 as u32
            | BarcodeFormat::QRCode as u32
            | BarcodeFormat::MicroQRCode as u32,
    );

    /// The empty set ("any format")
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Every known symbology
    pub const fn all() -> Self {
        Self(Self::ONE_D_CODES.0 | Self::TWO_D_CODES.0)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn contains(self, format: BarcodeFormat) -> bool {
        format != BarcodeFormat::None && self.0 & format.bits() != 0
    }

    /// Whether a decoder honoring this set would look for `format`
    pub fn accepts(self, format: BarcodeFormat) -> bool {
        self.is_empty() || self.contains(format)
    }

    pub fn insert(&mut self, format: BarcodeFormat) {
        self.0 |= format.bits();
    }

    /// Iterate the symbologies in this set, in bit order
    pub fn iter(self) -> impl Iterator<Item = BarcodeFormat> {
        BarcodeFormat::ALL
            .into_iter()
            .filter(move |f| self.contains(*f))
    }
}

impl From<BarcodeFormat> for BarcodeFormats {
    fn from(format: BarcodeFormat) -> Self {
        Self(format.bits())
    }
}

impl BitOr for BarcodeFormats {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOr<BarcodeFormat> for BarcodeFormats {
    type Output = Self;

    fn bitor(self, rhs: BarcodeFormat) -> Self {
        Self(self.0 | rhs.bits())
    }
}

impl BitOrAssign<BarcodeFormat> for BarcodeFormats {
    fn bitor_assign(&mut self, rhs: BarcodeFormat) {
        self.insert(rhs);
    }
}

impl FromIterator<BarcodeFormat> for BarcodeFormats {
    fn from_iter<I: IntoIterator<Item = BarcodeFormat>>(iter: I) -> Self {
        let mut formats = Self::empty();
        for format in iter {
            formats.insert(format);
        }
        formats
    }
}

impl fmt::Display for BarcodeFormats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("Any");
        }
        let names: Vec<&str> = self.iter().map(BarcodeFormat::name).collect();
        f.write_str(&names.join("|"))
    }
}

/// Outcome of one decode attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DecodeStatus {
    /// A symbol was found and decoded
    NoError,
    /// No symbol in the image
    #[default]
    NotFound,
    /// A symbol was found but its structure is invalid
    FormatError,
    /// A symbol was found but failed error correction
    ChecksumError,
}

impl fmt::Display for DecodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeStatus::NoError => write!(f, "NoError"),
            DecodeStatus::NotFound => write!(f, "NotFound"),
            DecodeStatus::FormatError => write!(f, "FormatError"),
            DecodeStatus::ChecksumError => write!(f, "ChecksumError"),
        }
    }
}

/// Integer pixel coordinate in the source frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl From<RawPoint> for Point {
    fn from(p: RawPoint) -> Self {
        // `as` saturates and maps NaN to 0
        Self {
            x: p.x.round() as i32,
            y: p.y.round() as i32,
        }
    }
}

/// Quadrilateral bounding a detected symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Position {
    pub top_left: Point,
    pub top_right: Point,
    pub bottom_right: Point,
    pub bottom_left: Point,
}

impl Position {
    pub fn new(top_left: Point, top_right: Point, bottom_right: Point, bottom_left: Point) -> Self {
        Self {
            top_left,
            top_right,
            bottom_right,
            bottom_left,
        }
    }

    /// Corners in top-left, top-right, bottom-right, bottom-left order
    pub fn corners(&self) -> [Point; 4] {
        [
            self.top_left,
            self.top_right,
            self.bottom_right,
            self.bottom_left,
        ]
    }

    /// True when all four corners coincide
    pub fn is_degenerate(&self) -> bool {
        let [a, b, c, d] = self.corners();
        a == b && b == c && c == d
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d] = self.corners();
        write!(
            f,
            "({},{}) ({},{}) ({},{}) ({},{})",
            a.x, a.y, b.x, b.y, c.x, c.y, d.x, d.y
        )
    }
}

/// Result of one decode attempt
///
/// Immutable once built. When the status is anything but
/// [`DecodeStatus::NoError`] the text and bytes are empty and the position
/// is degenerate.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BarcodeResult {
    format: BarcodeFormat,
    status: DecodeStatus,
    text: String,
    raw_bytes: Vec<u8>,
    position: Position,
    run_time: Duration,
}

impl BarcodeResult {
    /// Copy an engine result into an owned value
    pub fn project(raw: &RawResult) -> Self {
        if raw.status != DecodeStatus::NoError {
            return Self {
                format: raw.format,
                status: raw.status,
                ..Self::default()
            };
        }

        let [tl, tr, br, bl] = raw.position;
        Self {
            format: raw.format,
            status: raw.status,
            text: String::from_utf16_lossy(&raw.text),
            raw_bytes: raw.raw_bytes.clone(),
            position: Position::new(tl.into(), tr.into(), br.into(), bl.into()),
            run_time: Duration::ZERO,
        }
    }

    /// Attach the time the attempt took
    pub fn with_run_time(mut self, run_time: Duration) -> Self {
        self.run_time = run_time;
        self
    }

    pub fn format(&self) -> BarcodeFormat {
        self.format
    }

    pub fn format_name(&self) -> &'static str {
        self.format.name()
    }

    pub fn status(&self) -> DecodeStatus {
        self.status
    }

    /// Whether a symbol was successfully decoded
    pub fn is_valid(&self) -> bool {
        self.status == DecodeStatus::NoError
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn raw_bytes(&self) -> &[u8] {
        &self.raw_bytes
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    /// Time spent on the attempt (diagnostic only)
    pub fn run_time(&self) -> Duration {
        self.run_time
    }
}

impl From<&RawResult> for BarcodeResult {
    fn from(raw: &RawResult) -> Self {
        Self::project(raw)
    }
}
