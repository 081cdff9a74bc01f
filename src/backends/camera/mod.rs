// SPDX-License-Identifier: MPL-2.0

//! Camera frame abstraction
//!
//! ```text
//! ┌─────────────────────┐
//! │   Capture device    │  ← owns frame memory
//! └──────────┬──────────┘
//!            │ VideoFrame::map()
//!            ▼
//! ┌─────────────────────┐
//! │    MappedFrame      │  ← borrowed for one notification
//! └─────────────────────┘
//! ```

pub mod types;

pub use types::*;
