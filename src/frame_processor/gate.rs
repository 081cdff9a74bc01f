// SPDX-License-Identifier: MPL-2.0

//! Decode gating state machine
//!
//! Two independent guards decide whether an arriving frame is decoded:
//!
//! - in-flight exclusion: no new attempt while one is running
//! - cooldown: after an attempt reaches the engine, no new attempt starts
//!   until one window has passed since it started
//!
//! ```text
//!           frame                 done, window still open
//!   Idle ──────────▶ Decoding ──────────────────────────▶ Cooling
//!    ▲                  │                                    │
//!    │   done, window   │                                    │
//!    ├──────────────────┘          window boundary           │
//!    └───────────────────────────────────────────────────────┘
//! ```

use std::time::{Duration, Instant};

/// Current gate state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    /// Ready to decode the next frame
    Idle,
    /// A decode attempt is running
    Decoding,
    /// Frames are dropped until `until`
    Cooling { until: Instant },
}

/// Gate deciding which frames reach the decode engine
///
/// Time is passed in explicitly, so the gate itself never reads a clock.
#[derive(Debug, Clone)]
pub struct FrameGate {
    state: GateState,
    window: Duration,
    started_at: Option<Instant>,
}

impl FrameGate {
    /// Create an idle gate
    ///
    /// A zero `window` disables the cooldown guard.
    pub fn new(window: Duration) -> Self {
        Self {
            state: GateState::Idle,
            window,
            started_at: None,
        }
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Enter `Decoding` if the gate is idle at `now`
    ///
    /// Returns `false` when the frame must be dropped.
    pub fn try_begin(&mut self, now: Instant) -> bool {
        self.expire(now);
        match self.state {
            GateState::Idle => {
                self.state = GateState::Decoding;
                self.started_at = Some(now);
                true
            }
            GateState::Decoding | GateState::Cooling { .. } => false,
        }
    }

    /// Leave `Decoding`
    ///
    /// `engine_invoked` is false when the attempt stopped before reaching the
    /// engine (unmappable or unconvertible frame); such attempts do not use
    /// up the window.
    pub fn finish(&mut self, now: Instant, engine_invoked: bool) {
        if self.state != GateState::Decoding {
            return;
        }
        let started_at = self.started_at.take().unwrap_or(now);

        self.state = if engine_invoked && !self.window.is_zero() {
            let until = started_at + self.window;
            if now >= until {
                GateState::Idle
            } else {
                GateState::Cooling { until }
            }
        } else {
            GateState::Idle
        };
    }

    /// Periodic timer event
    pub fn timer_elapsed(&mut self, now: Instant) {
        self.expire(now);
    }

    fn expire(&mut self, now: Instant) {
        if let GateState::Cooling { until } = self.state
            && now >= until
        {
            self.state = GateState::Idle;
        }
    }
}
