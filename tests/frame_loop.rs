use first_person_input::frame_loop::{FrameHandler, LoopState};
use first_person_input::prelude::*;
use std::cell::RefCell;
use std::time::Duration;

/// A display signal whose wake-ups are delivered by hand
#[derive(Debug, Default)]
struct ManualSignal {
    next: u64,
    pending: Vec<FrameRequest>,
    cancelled: Vec<FrameRequest>,
}

impl DisplaySignal for ManualSignal {
    fn request_frame(&mut self) -> FrameRequest {
        self.next += 1;
        let request = FrameRequest(self.next);
        self.pending.push(request);
        request
    }

    fn cancel_frame(&mut self, request: FrameRequest) {
        self.pending.retain(|pending| *pending != request);
        self.cancelled.push(request);
    }
}

/// Delivers every pending wake-up at `now`, returning how many ticks fired
fn deliver<H: FrameHandler>(
    frame_loop: &mut FrameLoop<H>,
    signal: &mut ManualSignal,
    now: Duration,
) -> usize {
    let mut ticks = 0;
    for request in std::mem::take(&mut signal.pending) {
        if frame_loop.on_display_frame(&mut *signal, request, now) {
            ticks += 1;
        }
    }
    ticks
}

fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

#[test]
fn invalid_rates_are_rejected() {
    for fps in [0.0, -30.0, f64::NAN, f64::INFINITY] {
        assert!(matches!(
            FrameLoop::<fn(FrameTick)>::new(fps),
            Err(FrameLoopError::InvalidFrameRate { .. })
        ));
    }

    let mut frame_loop = FrameLoop::<fn(FrameTick)>::new(50.0).unwrap();
    assert_eq!(
        frame_loop.set_target_fps(0.0),
        Err(FrameLoopError::InvalidFrameRate { fps: 0.0 })
    );
    assert_eq!(frame_loop.target_interval(), ms(20));
}

#[test]
fn throttles_a_faster_display() {
    let ticks = RefCell::new(Vec::new());
    let mut signal = ManualSignal::default();
    let mut frame_loop = FrameLoop::new(60.0).unwrap();
    frame_loop.start(&mut signal, |tick: FrameTick| ticks.borrow_mut().push(tick));

    // A display refreshing every 8ms
    for frame in 0..=12 {
        deliver(&mut frame_loop, &mut signal, ms(frame * 8));
    }

    // The first wake-up only records the time,
    // then a tick fires on the first wake-up at least 1/60s after the previous one
    let ticks = ticks.borrow();
    let times: Vec<_> = ticks.iter().map(|tick| tick.now).collect();
    assert_eq!(times, [ms(24), ms(48), ms(72), ms(96)]);

    // The elapsed time is the true spacing, never the nominal 1/60s
    assert!(ticks.iter().all(|tick| tick.elapsed == ms(24)));
    let total: Duration = ticks.iter().map(|tick| tick.elapsed).sum();
    assert_eq!(total, ms(96));
}

#[test]
fn every_wake_up_is_rescheduled() {
    let mut signal = ManualSignal::default();
    let mut frame_loop = FrameLoop::new(10.0).unwrap();
    frame_loop.start(&mut signal, |_tick: FrameTick| {});
    assert_eq!(frame_loop.state(), LoopState::Running);

    for frame in 0..5 {
        let before = frame_loop.pending_request();
        deliver(&mut frame_loop, &mut signal, ms(frame));

        assert_eq!(signal.pending.len(), 1);
        assert_ne!(frame_loop.pending_request(), before);
    }
}

#[test]
fn a_slower_display_ticks_every_frame() {
    let ticks = RefCell::new(Vec::new());
    let mut signal = ManualSignal::default();
    let mut frame_loop = FrameLoop::new(60.0).unwrap();
    frame_loop.start(&mut signal, |tick: FrameTick| {
        ticks.borrow_mut().push(tick.elapsed)
    });

    // Uneven 30 Hz-ish frames
    for now in [0, 33, 67, 100, 140] {
        deliver(&mut frame_loop, &mut signal, ms(now));
    }

    assert_eq!(*ticks.borrow(), [ms(33), ms(34), ms(33), ms(40)]);
}

#[test]
fn pausing_stops_every_call() {
    let calls = RefCell::new(0);
    let mut signal = ManualSignal::default();
    let mut frame_loop = FrameLoop::new(60.0).unwrap();
    frame_loop.start(&mut signal, |_tick: FrameTick| *calls.borrow_mut() += 1);

    deliver(&mut frame_loop, &mut signal, ms(0));
    deliver(&mut frame_loop, &mut signal, ms(20));
    assert_eq!(*calls.borrow(), 1);

    let pending = frame_loop.pending_request().unwrap();
    frame_loop.pause(&mut signal);

    assert!(!frame_loop.is_running());
    assert_eq!(signal.cancelled, [pending]);
    assert!(signal.pending.is_empty());
    assert_eq!(frame_loop.pending_request(), None);

    // A wake-up that raced with the cancellation is ignored
    assert!(!frame_loop.on_display_frame(&mut signal, pending, ms(40)));
    assert!(signal.pending.is_empty());
    assert_eq!(*calls.borrow(), 1);

    // Pausing twice is harmless
    frame_loop.pause(&mut signal);
    assert_eq!(signal.cancelled.len(), 1);
}

#[test]
fn stale_wake_ups_are_ignored() {
    let calls = RefCell::new(0);
    let mut signal = ManualSignal::default();
    let mut frame_loop = FrameLoop::new(60.0).unwrap();
    frame_loop.start(&mut signal, |_tick: FrameTick| *calls.borrow_mut() += 1);

    let first = frame_loop.pending_request().unwrap();
    deliver(&mut frame_loop, &mut signal, ms(0));

    // Delivering the same request twice does not double-tick
    assert!(!frame_loop.on_display_frame(&mut signal, first, ms(100)));
    assert_eq!(*calls.borrow(), 0);
    assert_eq!(signal.pending.len(), 1);
}

#[test]
fn restarting_measures_from_scratch() {
    let ticks = RefCell::new(Vec::new());
    let mut signal = ManualSignal::default();
    let mut frame_loop = FrameLoop::new(60.0).unwrap();
    let record = |tick: FrameTick| ticks.borrow_mut().push(tick.elapsed);

    frame_loop.start(&mut signal, record);
    deliver(&mut frame_loop, &mut signal, ms(0));
    deliver(&mut frame_loop, &mut signal, ms(20));
    frame_loop.stop(&mut signal);

    frame_loop.start(&mut signal, record);
    // The pause is not counted as elapsed time
    assert_eq!(deliver(&mut frame_loop, &mut signal, ms(5_000)), 0);
    assert_eq!(deliver(&mut frame_loop, &mut signal, ms(5_017)), 1);

    assert_eq!(*ticks.borrow(), [ms(20), ms(17)]);
}

#[test]
fn starting_twice_replaces_the_running_loop() {
    let mut signal = ManualSignal::default();
    let mut frame_loop = FrameLoop::new(60.0).unwrap();
    let noop = |_tick: FrameTick| {};

    frame_loop.start(&mut signal, noop);
    let first = frame_loop.pending_request().unwrap();
    frame_loop.start(&mut signal, noop);

    assert_eq!(signal.cancelled, [first]);
    assert_eq!(signal.pending.len(), 1);
}
