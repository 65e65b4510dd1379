//! Pointer capture lifecycle and relative mouse movement for mouse-look.
//!
//! The tracker is an explicit state machine:
//!
//! ```text
//!             request_capture            capture changed (captured)
//! Uncaptured ----------------> Requesting --------------------------> Captured
//!     ^                            |                                   |    ^
//!     |   capture error / loss     |          release_capture          |    | start/stop_listening
//!     +----------------------------+       <-- Releasing <-------------+    v
//!     +---------------------------------------------------- capture loss   (listening suspended)
//! ```
//!
//! The platform is never trusted to only change capture in response to our own requests:
//! the host forwards every capture-change notification to [`MouseLookTracker::on_capture_changed`],
//! and a loss of capture the tracker did not ask for (Escape, focus loss...) is handled exactly like a release.

use bevy::{
    ecs::event::Event,
    log::{debug, warn},
    math::Vec2,
    prelude::Resource,
    reflect::Reflect,
};
use serde::{Deserialize, Serialize};

use crate::errors::CaptureError;

/// Optional features requested together with pointer capture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Reflect)]
pub struct CaptureOptions {
    /// Ask for raw movement, without OS pointer acceleration
    pub unadjusted_movement: bool,
}

impl CaptureOptions {
    /// The options tried first
    pub const PRECISE: CaptureOptions = CaptureOptions {
        unadjusted_movement: true,
    };

    /// The fallback options, when [`CaptureOptions::PRECISE`] is unsupported
    pub const BASIC: CaptureOptions = CaptureOptions {
        unadjusted_movement: false,
    };
}

/// The platform primitives used to acquire and release exclusive relative-pointer input
///
/// Both calls only *initiate* the change:
/// the outcome is reported back through [`MouseLookTracker::on_capture_changed`]
/// or [`MouseLookTracker::on_capture_error`].
pub trait CapturePlatform {
    /// Asks the platform to capture the pointer
    ///
    /// Returns [`CaptureError::Unsupported`] if `options` cannot be honored.
    fn request_capture(&mut self, options: CaptureOptions) -> Result<(), CaptureError>;

    /// Asks the platform to release the pointer
    fn release_capture(&mut self);
}

/// Where the tracker is in the capture lifecycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Reflect)]
pub enum CaptureState {
    /// The pointer is free and mouse movement is ignored
    #[default]
    Uncaptured,
    /// A capture request is waiting for the platform to confirm
    Requesting,
    /// The pointer is captured
    Captured,
    /// A release request is waiting for the platform to confirm
    Releasing,
}

/// A capture request failed and the pointer stayed uncaptured
#[derive(Event, Debug, Clone, PartialEq, Eq)]
pub struct CaptureFailed {
    /// Why the platform did not capture the pointer
    pub error: CaptureError,
}

/// Manages pointer capture and accumulates mouse movement between ticks
#[derive(Resource, Debug, Clone, Default, PartialEq, Serialize, Deserialize, Reflect)]
pub struct MouseLookTracker {
    state: CaptureState,
    listening: bool,
    /// Summed movement since the last read, with `y` pointing up
    accumulated: Vec2,
    moved: bool,
    #[serde(skip)]
    #[reflect(ignore)]
    failures: Vec<CaptureFailed>,
}

impl MouseLookTracker {
    /// Creates an uncaptured tracker
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The current lifecycle state
    #[must_use]
    #[inline]
    pub fn state(&self) -> CaptureState {
        self.state
    }

    /// Is the pointer currently captured?
    #[must_use]
    #[inline]
    pub fn is_captured(&self) -> bool {
        self.state == CaptureState::Captured
    }

    /// Is mouse movement currently being accumulated?
    ///
    /// This can only be true while captured.
    #[must_use]
    #[inline]
    pub fn is_listening(&self) -> bool {
        self.listening
    }

    /// The movement summed since the last read, with `y` pointing up
    #[must_use]
    #[inline]
    pub fn accumulated(&self) -> Vec2 {
        self.accumulated
    }

    /// Asks `platform` to capture the pointer
    ///
    /// Precise (unadjusted) movement is requested first.
    /// If the platform reports it as unsupported, the request is retried once without it.
    /// Any other failure leaves the tracker uncaptured, is returned,
    /// and is queued for [`MouseLookTracker::drain_failures`].
    ///
    /// Requesting while already captured or requesting does nothing.
    pub fn request_capture(
        &mut self,
        platform: &mut impl CapturePlatform,
    ) -> Result<(), CaptureError> {
        if matches!(
            self.state,
            CaptureState::Captured | CaptureState::Requesting
        ) {
            return Ok(());
        }

        let result = match platform.request_capture(CaptureOptions::PRECISE) {
            Err(CaptureError::Unsupported) => {
                debug!("Unadjusted pointer movement is unsupported, retrying without it");
                platform.request_capture(CaptureOptions::BASIC)
            }
            result => result,
        };

        match result {
            Ok(()) => {
                debug!("Pointer capture requested");
                self.state = CaptureState::Requesting;
                Ok(())
            }
            Err(error) => {
                warn!("Pointer capture failed: {error}");
                self.reset();
                self.failures.push(CaptureFailed {
                    error: error.clone(),
                });
                Err(error)
            }
        }
    }

    /// Asks `platform` to release the pointer
    ///
    /// Releasing while uncaptured or already releasing does nothing.
    pub fn release_capture(&mut self, platform: &mut impl CapturePlatform) {
        if matches!(
            self.state,
            CaptureState::Uncaptured | CaptureState::Releasing
        ) {
            return;
        }

        debug!("Pointer release requested");
        self.stop_listening();
        platform.release_capture();
        self.state = CaptureState::Releasing;
    }

    /// The platform reports whether the pointer is now captured
    ///
    /// This is the only way the tracker enters [`CaptureState::Captured`] or, after a release,
    /// [`CaptureState::Uncaptured`].
    /// Losing capture without a prior [`MouseLookTracker::release_capture`] is treated the same as a release.
    pub fn on_capture_changed(&mut self, captured: bool) {
        if captured {
            if self.state != CaptureState::Captured {
                debug!("Pointer captured");
            }
            self.state = CaptureState::Captured;
            self.start_listening();
        } else {
            if self.state != CaptureState::Uncaptured {
                debug!("Pointer capture ended");
            }
            self.reset();
        }
    }

    /// The platform reports that a pending capture request failed
    ///
    /// Returns the error to surface to whoever requested capture,
    /// or `None` if no request was pending.
    /// The error is also queued for [`MouseLookTracker::drain_failures`].
    pub fn on_capture_error(&mut self) -> Option<CaptureError> {
        if self.state != CaptureState::Requesting {
            return None;
        }

        warn!("Pointer capture request failed");
        self.reset();
        self.failures.push(CaptureFailed {
            error: CaptureError::Unknown,
        });
        Some(CaptureError::Unknown)
    }

    /// Drains the capture failures queued since the last call
    pub fn drain_failures(&mut self) -> std::vec::Drain<'_, CaptureFailed> {
        self.failures.drain(..)
    }

    /// Resumes accumulating movement, discarding anything left over
    ///
    /// Only possible while captured.
    pub fn start_listening(&mut self) {
        if self.state != CaptureState::Captured {
            return;
        }

        self.clear();
        self.listening = true;
    }

    /// Suspends accumulating movement without giving up capture, discarding anything accumulated
    pub fn stop_listening(&mut self) {
        self.clear();
        self.listening = false;
    }

    /// Relative pointer movement, in pixels with `y` pointing down
    ///
    /// Every sample before the next read is summed, with the vertical axis inverted so that up is positive.
    pub fn on_move(&mut self, dx: f32, dy: f32) {
        if !self.listening {
            return;
        }

        self.accumulated.x += dx;
        self.accumulated.y -= dy;
        self.moved = true;
    }

    /// Reads and clears the accumulated movement
    ///
    /// Returns `None` if the pointer has not moved since the previous read.
    pub fn take_delta(&mut self) -> Option<Vec2> {
        let moved = std::mem::take(&mut self.moved);
        let delta = std::mem::take(&mut self.accumulated);
        moved.then_some(delta)
    }

    fn clear(&mut self) {
        self.accumulated = Vec2::ZERO;
        self.moved = false;
    }

    fn reset(&mut self) {
        self.stop_listening();
        self.state = CaptureState::Uncaptured;
    }
}
