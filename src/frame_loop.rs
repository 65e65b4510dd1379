//! Throttles a variable-rate display signal down to a target tick rate.
//!
//! The display asks to be woken up once per frame, at whatever rate it refreshes.
//! The [`FrameLoop`] reschedules itself on every wake-up, and only fires its handler once
//! at least the target interval has elapsed since the last tick.
//! The handler always receives the true elapsed time, never the nominal interval,
//! so consumers integrating over it do not drift when the display signal jitters.

use std::time::Duration;

use bevy::log::debug;

use crate::errors::FrameLoopError;

/// Identifies one scheduled wake-up of a [`DisplaySignal`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameRequest(pub u64);

/// A display-driven source of "new frame available" wake-ups
pub trait DisplaySignal {
    /// Schedules a single wake-up for the next display frame
    ///
    /// The host later delivers it by calling [`FrameLoop::on_display_frame`] with the returned request.
    fn request_frame(&mut self) -> FrameRequest;

    /// Cancels a wake-up that has not been delivered yet
    fn cancel_frame(&mut self, request: FrameRequest);
}

/// The data passed to the handler on every tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameTick {
    /// Monotonic timestamp of this tick
    pub now: Duration,
    /// Time since the previous tick
    pub elapsed: Duration,
}

/// Receives the ticks of a [`FrameLoop`]
pub trait FrameHandler {
    /// Called once per tick
    fn on_frame(&mut self, tick: FrameTick);
}

impl<F: FnMut(FrameTick)> FrameHandler for F {
    fn on_frame(&mut self, tick: FrameTick) {
        self(tick)
    }
}

/// Is the loop currently scheduling wake-ups?
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum LoopState {
    /// No wake-up is pending and the handler will not be called
    #[default]
    Stopped,
    /// A wake-up is pending
    Running,
}

/// Fires a [`FrameHandler`] no more often than a target rate, driven by a [`DisplaySignal`]
///
/// # Example
/// ```rust
/// use std::time::Duration;
/// use first_person_input::frame_loop::{DisplaySignal, FrameLoop, FrameRequest, FrameTick};
///
/// #[derive(Default)]
/// struct Vsync {
///     next: u64,
///     pending: Option<FrameRequest>,
/// }
///
/// impl DisplaySignal for Vsync {
///     fn request_frame(&mut self) -> FrameRequest {
///         self.next += 1;
///         let request = FrameRequest(self.next);
///         self.pending = Some(request);
///         request
///     }
///
///     fn cancel_frame(&mut self, _request: FrameRequest) {
///         self.pending = None;
///     }
/// }
///
/// let mut vsync = Vsync::default();
/// let mut ticks = Vec::new();
/// let mut frame_loop = FrameLoop::new(60.0).unwrap();
/// frame_loop.start(&mut vsync, |tick: FrameTick| ticks.push(tick.elapsed));
///
/// // A 120 Hz display: only every other frame is a tick
/// for frame in 0..5_u64 {
///     let request = vsync.pending.unwrap();
///     frame_loop.on_display_frame(&mut vsync, request, Duration::from_micros(frame * 8_334));
/// }
/// frame_loop.stop(&mut vsync);
///
/// assert_eq!(ticks, [Duration::from_micros(16_668), Duration::from_micros(16_668)]);
/// ```
#[derive(Debug, Clone)]
pub struct FrameLoop<H: FrameHandler> {
    state: LoopState,
    target_interval: Duration,
    handler: Option<H>,
    last_tick: Option<Duration>,
    pending: Option<FrameRequest>,
}

// Deriving default induces an undesired bound on the generic
impl<H: FrameHandler> Default for FrameLoop<H> {
    /// A stopped loop targeting 60 ticks per second
    fn default() -> Self {
        Self {
            state: LoopState::Stopped,
            target_interval: Duration::from_nanos(1_000_000_000 / 60),
            handler: None,
            last_tick: None,
            pending: None,
        }
    }
}

fn interval_for(fps: f64) -> Result<Duration, FrameLoopError> {
    if !fps.is_finite() || fps <= 0.0 {
        return Err(FrameLoopError::InvalidFrameRate { fps });
    }

    Ok(Duration::from_secs_f64(1.0 / fps))
}

impl<H: FrameHandler> FrameLoop<H> {
    /// Creates a stopped loop targeting `fps` ticks per second
    pub fn new(fps: f64) -> Result<Self, FrameLoopError> {
        Ok(Self {
            state: LoopState::Stopped,
            target_interval: interval_for(fps)?,
            handler: None,
            last_tick: None,
            pending: None,
        })
    }

    /// Changes the target rate; takes effect from the next wake-up
    pub fn set_target_fps(&mut self, fps: f64) -> Result<(), FrameLoopError> {
        self.target_interval = interval_for(fps)?;
        Ok(())
    }

    /// The minimum time between two ticks
    #[must_use]
    pub fn target_interval(&self) -> Duration {
        self.target_interval
    }

    /// Whether the loop is running
    #[must_use]
    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Is the loop running?
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state == LoopState::Running
    }

    /// The wake-up the loop is currently waiting for
    #[must_use]
    pub fn pending_request(&self) -> Option<FrameRequest> {
        self.pending
    }

    /// The handler of the running loop
    #[must_use]
    pub fn handler_mut(&mut self) -> Option<&mut H> {
        self.handler.as_mut()
    }

    /// Starts calling `handler`, stopping any loop that was already running
    pub fn start(&mut self, signal: &mut impl DisplaySignal, handler: H) {
        if self.is_running() {
            self.stop(signal);
        }

        debug!(
            "Frame loop started with a target interval of {:?}",
            self.target_interval
        );
        self.handler = Some(handler);
        self.last_tick = None;
        self.pending = Some(signal.request_frame());
        self.state = LoopState::Running;
    }

    /// Stops the loop, cancelling the pending wake-up
    ///
    /// No handler call can happen after this returns. Pausing a stopped loop does nothing.
    pub fn pause(&mut self, signal: &mut impl DisplaySignal) {
        if !self.is_running() {
            return;
        }

        if let Some(request) = self.pending.take() {
            signal.cancel_frame(request);
        }
        self.handler = None;
        self.last_tick = None;
        self.state = LoopState::Stopped;
        debug!("Frame loop stopped");
    }

    /// Same as [`FrameLoop::pause`]
    pub fn stop(&mut self, signal: &mut impl DisplaySignal) {
        self.pause(signal);
    }

    /// Delivers a display wake-up at monotonic time `now`
    ///
    /// Returns `true` if the handler fired.
    /// Wake-ups for anything but the pending request (for example, one that was cancelled) are ignored.
    pub fn on_display_frame(
        &mut self,
        signal: &mut impl DisplaySignal,
        request: FrameRequest,
        now: Duration,
    ) -> bool {
        if !self.is_running() || self.pending != Some(request) {
            return false;
        }

        // Reschedule first, so a slow handler cannot stall the loop
        self.pending = Some(signal.request_frame());

        let Some(last_tick) = self.last_tick else {
            self.last_tick = Some(now);
            return false;
        };

        let elapsed = now.saturating_sub(last_tick);
        if elapsed < self.target_interval {
            return false;
        }

        let Some(handler) = self.handler.as_mut() else {
            return false;
        };

        handler.on_frame(FrameTick { now, elapsed });
        self.last_tick = Some(now);
        true
    }
}
