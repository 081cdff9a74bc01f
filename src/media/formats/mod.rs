// SPDX-License-Identifier: MPL-2.0

//! Pixel format conversions

pub mod conversions;

pub use conversions::{LumaBuffer, to_luma8};
