// SPDX-License-Identifier: GPL-3.0-only

//! Rate-gated barcode decoding over a stream of camera frames
//!
//! [`VideoFilter`] receives every frame the capture device produces, lets a
//! [`FrameGate`] decide which of them are decoded, and publishes each
//! completed attempt to its subscribers.
//!
//! Everything runs on one execution context. Entry points take `&self`, so a
//! frame notification delivered while the engine is still busy is observed
//! (and dropped) instead of being ruled out by the borrow checker.

use crate::backends::camera::types::VideoFrame;
use crate::config::Config;
use crate::frame_processor::engine::{DecodeEngine, DecodeHints};
use crate::frame_processor::gate::{FrameGate, GateState};
use crate::frame_processor::reader::try_read_frame;
use crate::frame_processor::types::{BarcodeFormats, BarcodeResult};
use futures::channel::mpsc;
use futures::{Stream, StreamExt};
use std::cell::RefCell;
use std::time::{Duration, Instant};
use tokio::time::Interval;
use tracing::{debug, info, trace};

/// Notification published by a [`VideoFilter`]
#[derive(Debug, Clone, PartialEq)]
pub enum FilterEvent {
    /// A decode attempt completed, successful or not
    NewResult(BarcodeResult),
    /// A decode attempt found a barcode (follows the matching `NewResult`)
    FoundBarcode(BarcodeResult),
    FormatsChanged(BarcodeFormats),
    TryRotateChanged(bool),
    TryHarderChanged(bool),
}

/// Barcode decoding filter for a video stream
pub struct VideoFilter {
    engine: Box<dyn DecodeEngine>,
    hints: RefCell<DecodeHints>,
    gate: RefCell<FrameGate>,
    subscribers: RefCell<Vec<mpsc::UnboundedSender<FilterEvent>>>,
}

impl VideoFilter {
    /// Create a filter
    ///
    /// After each decode, frames are dropped until `cooldown` has passed
    /// since that decode started. A zero `cooldown` only keeps the in-flight
    /// guard.
    pub fn new(engine: impl DecodeEngine + 'static, hints: DecodeHints, cooldown: Duration) -> Self {
        Self {
            engine: Box::new(engine),
            hints: RefCell::new(hints),
            gate: RefCell::new(FrameGate::new(cooldown)),
            subscribers: RefCell::new(Vec::new()),
        }
    }

    /// Create a filter from user configuration
    pub fn from_config(engine: impl DecodeEngine + 'static, config: &Config) -> Self {
        Self::new(engine, config.hints(), config.cooldown())
    }

    /// Register for events
    ///
    /// Dropping the receiver unsubscribes.
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<FilterEvent> {
        let (tx, rx) = mpsc::unbounded();
        self.subscribers.borrow_mut().push(tx);
        rx
    }

    pub fn state(&self) -> GateState {
        self.gate.borrow().state()
    }

    pub fn cooldown(&self) -> Duration {
        self.gate.borrow().window()
    }

    /// Snapshot of the current decode hints
    pub fn hints(&self) -> DecodeHints {
        self.hints.borrow().clone()
    }

    pub fn formats(&self) -> BarcodeFormats {
        self.hints.borrow().formats
    }

    pub fn try_rotate(&self) -> bool {
        self.hints.borrow().try_rotate
    }

    pub fn try_harder(&self) -> bool {
        self.hints.borrow().try_harder
    }

    /// Set the symbologies to look for; returns whether the value changed
    pub fn set_formats(&self, formats: BarcodeFormats) -> bool {
        if self.formats() == formats {
            return false;
        }
        self.hints.borrow_mut().formats = formats;
        debug!(%formats, "Decode formats changed");
        self.publish(FilterEvent::FormatsChanged(formats));
        true
    }

    /// Enable or disable rotated search; returns whether the value changed
    pub fn set_try_rotate(&self, try_rotate: bool) -> bool {
        if self.try_rotate() == try_rotate {
            return false;
        }
        self.hints.borrow_mut().try_rotate = try_rotate;
        self.publish(FilterEvent::TryRotateChanged(try_rotate));
        true
    }

    /// Enable or disable the thorough search; returns whether the value changed
    pub fn set_try_harder(&self, try_harder: bool) -> bool {
        if self.try_harder() == try_harder {
            return false;
        }
        self.hints.borrow_mut().try_harder = try_harder;
        self.publish(FilterEvent::TryHarderChanged(try_harder));
        true
    }

    /// Handle a frame-arrived notification
    ///
    /// Returns the published result, or `None` when the frame was dropped
    /// because a decode is in flight or the cooldown window is active.
    pub fn process<F>(&self, frame: &F) -> Option<BarcodeResult>
    where
        F: VideoFrame + ?Sized,
    {
        self.process_at(frame, Instant::now())
    }

    /// [`VideoFilter::process`] with an explicit arrival time
    pub fn process_at<F>(&self, frame: &F, now: Instant) -> Option<BarcodeResult>
    where
        F: VideoFrame + ?Sized,
    {
        if !self.gate.borrow_mut().try_begin(now) {
            trace!(state = ?self.state(), "Frame dropped");
            return None;
        }

        // No borrow may be held across the engine call
        let hints = self.hints();
        let timer = Instant::now();
        let outcome = try_read_frame(self.engine.as_ref(), frame, &hints);
        let elapsed = timer.elapsed();

        let engine_invoked = outcome.is_some();
        let result = outcome.unwrap_or_default().with_run_time(elapsed);

        if result.is_valid() {
            info!(
                format = result.format_name(),
                text = result.text(),
                run_ms = elapsed.as_millis(),
                "Barcode found"
            );
        }

        self.publish(FilterEvent::NewResult(result.clone()));
        if result.is_valid() {
            self.publish(FilterEvent::FoundBarcode(result.clone()));
        }

        self.gate.borrow_mut().finish(now + elapsed, engine_invoked);
        Some(result)
    }

    /// Handle the periodic cooldown timer
    pub fn timer_elapsed(&self, now: Instant) {
        self.gate.borrow_mut().timer_elapsed(now);
    }

    /// Drive the filter from a frame stream until it ends
    ///
    /// Frames and cooldown timer ticks are handled one at a time on the
    /// calling task. Decoding blocks the task, so frames queue up in the
    /// stream meanwhile and are then subject to the gate as usual.
    pub async fn run<S>(&self, mut frames: S)
    where
        S: Stream + Unpin,
        S::Item: VideoFrame,
    {
        let window = self.cooldown();
        let mut ticker = (!window.is_zero()).then(|| tokio::time::interval(window));
        let mut processed = 0u64;

        loop {
            tokio::select! {
                frame = frames.next() => match frame {
                    Some(frame) => {
                        processed += 1;
                        self.process(&frame);
                    }
                    None => break,
                },
                _ = next_tick(ticker.as_mut()) => self.timer_elapsed(Instant::now()),
            }
        }

        debug!(frames = processed, "Frame stream ended");
    }

    /// Send an event to every live subscriber, dropping closed ones
    fn publish(&self, event: FilterEvent) {
        self.subscribers
            .borrow_mut()
            .retain(|tx| tx.unbounded_send(event.clone()).is_ok());
    }
}

async fn next_tick(ticker: Option<&mut Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}
