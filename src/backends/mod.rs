// SPDX-License-Identifier: MPL-2.0

//! Boundary with the capture device
//!
//! Frames arrive from a device integration that owns their memory. This
//! module only describes what such a frame looks like and how its memory is
//! reached; it does not talk to any hardware itself.

pub mod camera;
