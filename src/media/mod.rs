// SPDX-License-Identifier: MPL-2.0

//! Media processing utilities
//!
//! # Format Conversion
//!
//! Frames the decode engine cannot read in place are converted to packed
//! 8-bit luminance by the [`formats`] module.

pub mod formats;
