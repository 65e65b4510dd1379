//! Tunable constants for the trackers, the arbiter, the frame loop and the pose integrator.
//!
//! Every group implements [`Default`] with the values the controller ships with,
//! and can be adjusted using the builder-style `with_*` methods:
//!
//! ```rust
//! use first_person_input::settings::{ControllerSettings, ControlSettings};
//!
//! let settings = ControllerSettings::default()
//!     .with_control(ControlSettings::default().with_mouse_sensitivity(0.25));
//!
//! assert_eq!(settings.control.mouse_sensitivity, 0.25);
//! assert_eq!(settings.frame.target_fps, 60.0);
//! ```

use std::time::Duration;

use bevy::prelude::{Reflect, Resource};
use serde::{Deserialize, Serialize};

/// All configuration used by [`FirstPersonInputPlugin`](crate::plugin::FirstPersonInputPlugin)
///
/// Insert this resource before adding the plugin to override the defaults.
#[derive(Resource, Debug, Clone, Default, PartialEq, Serialize, Deserialize, Reflect)]
#[serde(default)]
pub struct ControllerSettings {
    /// Drag classification thresholds
    pub touch: TouchSettings,
    /// Output scaling used when turning samples into control vectors
    pub control: ControlSettings,
    /// Tick cadence
    pub frame: FrameSettings,
    /// Limits applied when integrating the control vectors into a pose
    pub pose: PoseSettings,
}

impl ControllerSettings {
    /// Replaces the [`TouchSettings`]
    #[must_use]
    pub fn with_touch(mut self, touch: TouchSettings) -> Self {
        self.touch = touch;
        self
    }

    /// Replaces the [`ControlSettings`]
    #[must_use]
    pub fn with_control(mut self, control: ControlSettings) -> Self {
        self.control = control;
        self
    }

    /// Replaces the [`FrameSettings`]
    #[must_use]
    pub fn with_frame(mut self, frame: FrameSettings) -> Self {
        self.frame = frame;
        self
    }

    /// Replaces the [`PoseSettings`]
    #[must_use]
    pub fn with_pose(mut self, pose: PoseSettings) -> Self {
        self.pose = pose;
        self
    }
}

/// Thresholds used by the [`TouchTracker`](crate::touch::TouchTracker)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Reflect)]
#[serde(default)]
pub struct TouchSettings {
    /// Distance (in pixels) from the origin below which a contact is not yet a drag.
    ///
    /// This is also where the normalized drag magnitude is `0.0`.
    pub min_drag_distance: f32,
    /// Distance (in pixels) from the origin at which the normalized drag magnitude reaches `1.0`.
    pub max_drag_distance: f32,
    /// Half-width of the ambiguous center band, as a fraction of the tracking area width.
    ///
    /// Drags starting inside the band are assigned by their initial direction.
    pub center_band: f32,
    /// Contacts held for longer than this without becoming a drag are not taps.
    pub max_tap_duration: Duration,
}

impl Default for TouchSettings {
    fn default() -> Self {
        Self {
            min_drag_distance: 10.0,
            max_drag_distance: 100.0,
            center_band: 0.05,
            max_tap_duration: Duration::from_millis(500),
        }
    }
}

impl TouchSettings {
    /// Sets the distances at which the normalized drag magnitude is `0.0` and `1.0`
    #[must_use]
    pub fn with_drag_distances(mut self, min: f32, max: f32) -> Self {
        self.min_drag_distance = min;
        self.max_drag_distance = max;
        self
    }

    /// Sets the half-width of the ambiguous center band
    #[must_use]
    pub fn with_center_band(mut self, center_band: f32) -> Self {
        self.center_band = center_band;
        self
    }

    /// Sets how long a contact may be held and still count as a tap
    #[must_use]
    pub fn with_max_tap_duration(mut self, max_tap_duration: Duration) -> Self {
        self.max_tap_duration = max_tap_duration;
        self
    }

    /// Maps a raw distance from the origin into `[0.0, 1.0]`
    #[must_use]
    #[inline]
    pub fn normalize_distance(&self, distance: f32) -> f32 {
        let span = self.max_drag_distance - self.min_drag_distance;
        if span <= 0.0 {
            return if distance > self.min_drag_distance {
                1.0
            } else {
                0.0
            };
        }

        ((distance - self.min_drag_distance) / span).clamp(0.0, 1.0)
    }
}

/// Scaling used by the [`ControlArbiter`](crate::arbiter::ControlArbiter) sources
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Reflect)]
#[serde(default)]
pub struct ControlSettings {
    /// Movement speed (world units per second) of a full-strength drag or a held movement key
    pub base_move_speed: f32,
    /// Turn rate (radians per second) of a full-strength drag or a held look key
    pub base_turn_speed: f32,
    /// Turn rate produced per pixel of accumulated mouse movement
    pub mouse_sensitivity: f32,
}

impl Default for ControlSettings {
    fn default() -> Self {
        Self {
            base_move_speed: 3.0,
            base_turn_speed: 2.0,
            mouse_sensitivity: 0.1,
        }
    }
}

impl ControlSettings {
    /// Sets the base movement speed
    #[must_use]
    pub fn with_base_move_speed(mut self, speed: f32) -> Self {
        self.base_move_speed = speed;
        self
    }

    /// Sets the base turn speed
    #[must_use]
    pub fn with_base_turn_speed(mut self, speed: f32) -> Self {
        self.base_turn_speed = speed;
        self
    }

    /// Sets the mouse-look sensitivity
    #[must_use]
    pub fn with_mouse_sensitivity(mut self, sensitivity: f32) -> Self {
        self.mouse_sensitivity = sensitivity;
        self
    }
}

/// Cadence of the [`FrameLoop`](crate::frame_loop::FrameLoop)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Reflect)]
#[serde(default)]
pub struct FrameSettings {
    /// The maximum number of ticks per second
    pub target_fps: f64,
}

impl Default for FrameSettings {
    fn default() -> Self {
        Self { target_fps: 60.0 }
    }
}

/// Limits used by [`AvatarPose::integrate`](crate::pose::AvatarPose::integrate)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Reflect)]
#[serde(default)]
pub struct PoseSettings {
    /// Maximum absolute pitch, in radians
    pub pitch_limit: f32,
    /// Height of the camera above the avatar's feet
    pub eye_height: f32,
}

impl Default for PoseSettings {
    fn default() -> Self {
        Self {
            pitch_limit: 1.5,
            eye_height: 1.62,
        }
    }
}
