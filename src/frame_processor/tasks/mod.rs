// SPDX-License-Identifier: GPL-3.0-only

//! Decode engine implementations
//!
//! This module contains concrete [`crate::frame_processor::DecodeEngine`]
//! implementations.

pub mod qr_detector;

pub use qr_detector::QrDetector;
