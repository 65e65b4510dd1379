//! The two control channels and the vectors they produce each tick.

use bevy::prelude::Reflect;
use serde::{Deserialize, Serialize};

/// One of the two independent control outputs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Reflect)]
pub enum Channel {
    /// Translation of the avatar, driven from the left side of the tracking area
    Movement,
    /// Rotation of the camera, driven from the right side of the tracking area
    Look,
}

/// How fast and in which direction the avatar should move
///
/// `angle` is measured in radians relative to the avatar's facing:
/// `0` is straight ahead, `+PI/2` is to the right and `PI` is straight back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, Reflect)]
pub struct MovementControl {
    /// Movement speed, always `>= 0`
    pub speed: f32,
    /// Movement direction, in radians
    pub angle: f32,
}

impl MovementControl {
    /// No movement at all
    pub const IDLE: MovementControl = MovementControl {
        speed: 0.0,
        angle: 0.0,
    };

    /// Is this control vector producing any motion?
    #[must_use]
    #[inline]
    pub fn is_idle(&self) -> bool {
        self.speed == 0.0
    }
}

/// How fast the camera should turn along each axis
///
/// Positive `horizontal` turns right and positive `vertical` looks up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, Reflect)]
pub struct TurnControl {
    /// Yaw rate, in radians per second
    pub horizontal: f32,
    /// Pitch rate, in radians per second
    pub vertical: f32,
}

impl TurnControl {
    /// No rotation at all
    pub const IDLE: TurnControl = TurnControl {
        horizontal: 0.0,
        vertical: 0.0,
    };

    /// Is this control vector producing any rotation?
    #[must_use]
    #[inline]
    pub fn is_idle(&self) -> bool {
        self.horizontal == 0.0 && self.vertical == 0.0
    }
}
