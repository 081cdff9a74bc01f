// SPDX-License-Identifier: GPL-3.0-only

//! End-to-end tests for frame decoding and scheduling

use barcode_filter::backends::camera::types::{
    BackendError, BackendResult, CameraFrame, MappedFrame, PixelFormat, VideoFrame,
};
use barcode_filter::frame_processor::{
    BarcodeFormat, BarcodeResult, DecodeEngine, DecodeHints, DecodeStatus, FilterEvent, GateState,
    ImageView, RawPoint, RawResult, VideoFilter,
};
use barcode_filter::QrDetector;
use futures::channel::mpsc;
use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

const WINDOW: Duration = Duration::from_millis(200);

/// Engine that reports "TEST123" at a fixed square and counts calls
struct StubEngine {
    calls: Rc<Cell<usize>>,
}

impl DecodeEngine for StubEngine {
    fn decode(&self, image: &ImageView<'_>, _hints: &DecodeHints) -> RawResult {
        self.calls.set(self.calls.get() + 1);
        assert_eq!((image.width(), image.height()), (100, 100));
        RawResult::found(
            BarcodeFormat::QRCode,
            "TEST123",
            b"TEST123".to_vec(),
            [
                RawPoint::new(20.0, 20.0),
                RawPoint::new(80.0, 20.0),
                RawPoint::new(80.0, 80.0),
                RawPoint::new(20.0, 80.0),
            ],
        )
    }
}

/// Frame whose memory never maps
struct UnmappableFrame;

impl VideoFrame for UnmappableFrame {
    fn map(&self) -> BackendResult<MappedFrame<'_>> {
        Err(BackendError::MapFailed("device buffer gone".into()))
    }
}

fn stub_filter(window: Duration) -> (VideoFilter, Rc<Cell<usize>>) {
    let calls = Rc::new(Cell::new(0));
    let filter = VideoFilter::new(
        StubEngine {
            calls: calls.clone(),
        },
        DecodeHints::default(),
        window,
    );
    (filter, calls)
}

fn gray_frame() -> CameraFrame {
    CameraFrame::new(100, 100, 100, PixelFormat::Gray8, vec![200u8; 100 * 100])
}

fn drain(rx: &mut mpsc::UnboundedReceiver<FilterEvent>) -> Vec<FilterEvent> {
    let mut events = Vec::new();
    while let Ok(Some(event)) = rx.try_next() {
        events.push(event);
    }
    events
}

#[test]
fn test_gray_frame_end_to_end() {
    let t0 = Instant::now();
    let (filter, calls) = stub_filter(WINDOW);
    let mut rx = filter.subscribe();

    filter.process_at(&gray_frame(), t0);
    assert_eq!(calls.get(), 1);

    let events = drain(&mut rx);
    let found: Vec<&BarcodeResult> = events
        .iter()
        .filter_map(|e| match e {
            FilterEvent::FoundBarcode(r) => Some(r),
            _ => None,
        })
        .collect();

    assert_eq!(found.len(), 1);
    let result = found[0];
    assert_eq!(result.text(), "TEST123");
    assert_eq!(result.format(), BarcodeFormat::QRCode);
    assert_eq!(result.raw_bytes(), b"TEST123");
    assert!(!result.position().is_degenerate());
    assert_eq!(result.position().top_left.x, 20);
}

#[test]
fn test_unmappable_frame_publishes_default_result() {
    let t0 = Instant::now();
    let (filter, calls) = stub_filter(WINDOW);
    let mut rx = filter.subscribe();

    let result = filter.process_at(&UnmappableFrame, t0).expect("attempt is published");
    assert_eq!(calls.get(), 0);
    assert_eq!(result.status(), DecodeStatus::NotFound);
    assert!(result.text().is_empty());
    assert_eq!(filter.state(), GateState::Idle);

    let events = drain(&mut rx);
    assert_eq!(events.len(), 1);
    assert!(matches!(&events[0], FilterEvent::NewResult(r) if !r.is_valid()));

    // No cooldown was consumed, so the next frame decodes straight away
    assert!(filter.process_at(&gray_frame(), t0 + Duration::from_millis(1)).is_some());
    assert_eq!(calls.get(), 1);
}

#[test]
fn test_cooldown_bounds_decode_rate() {
    let t0 = Instant::now();
    let (filter, calls) = stub_filter(WINDOW);
    let elapsed = Duration::from_millis(1000);

    // 30 fps camera
    let mut t = Duration::ZERO;
    while t < elapsed {
        filter.process_at(&gray_frame(), t0 + t);
        t += Duration::from_millis(33);
    }

    let bound = elapsed.as_millis().div_ceil(WINDOW.as_millis()) as usize;
    assert!(calls.get() <= bound, "{} decodes > {}", calls.get(), bound);
    assert!(calls.get() >= 1);
}

#[test]
fn test_rate_bound_when_frames_start_late() {
    let t0 = Instant::now();
    let (filter, calls) = stub_filter(WINDOW);

    // Frames begin 150 ms into the stream, every 10 ms for 100 ms
    let mut t = Duration::from_millis(150);
    while t < Duration::from_millis(250) {
        filter.process_at(&gray_frame(), t0 + t);
        t += Duration::from_millis(10);
    }
    assert_eq!(calls.get(), 1);

    // One window after the first decode started, the next frame decodes
    filter.process_at(&gray_frame(), t0 + Duration::from_millis(350));
    assert_eq!(calls.get(), 2);
}

#[test]
fn test_timer_reopens_gate() {
    let t0 = Instant::now();
    let (filter, calls) = stub_filter(WINDOW);

    filter.process_at(&gray_frame(), t0);
    assert!(matches!(filter.state(), GateState::Cooling { .. }));

    filter.timer_elapsed(t0 + WINDOW);
    assert_eq!(filter.state(), GateState::Idle);
    filter.process_at(&gray_frame(), t0 + WINDOW);
    assert_eq!(calls.get(), 2);
}

#[test]
fn test_qr_detector_on_blank_frame() {
    let filter = VideoFilter::new(QrDetector, DecodeHints::default(), Duration::ZERO);
    let result = filter.process(&gray_frame()).expect("idle filter decodes");
    assert_eq!(result.status(), DecodeStatus::NotFound);
    assert!(!result.is_valid());
}

#[tokio::test]
async fn test_run_drops_burst_within_window() {
    let (filter, calls) = stub_filter(Duration::from_secs(60));
    let mut rx = filter.subscribe();

    filter
        .run(futures::stream::iter((0..10).map(|_| gray_frame())))
        .await;

    assert_eq!(calls.get(), 1);
    let results = drain(&mut rx)
        .into_iter()
        .filter(|e| matches!(e, FilterEvent::NewResult(_)))
        .count();
    assert_eq!(results, 1);
}
