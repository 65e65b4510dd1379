//! Integrates the control vectors into the avatar's position and orientation.
//!
//! This is direct velocity control: there is no acceleration, inertia or collision.

use std::time::Duration;

use bevy::{
    math::{EulerRot, Quat, Vec3},
    prelude::{Component, Transform},
    reflect::Reflect,
};
use serde::{Deserialize, Serialize};

use crate::{
    control::{MovementControl, TurnControl},
    settings::PoseSettings,
};

/// Where the avatar stands and where it is looking
///
/// Add this component to a camera entity to have [`FirstPersonInputPlugin`](crate::plugin::FirstPersonInputPlugin)
/// drive its [`Transform`].
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, Reflect)]
pub struct AvatarPose {
    /// Position of the avatar's feet
    pub position: Vec3,
    /// Rotation around the vertical axis, in radians
    pub yaw: f32,
    /// Rotation around the horizontal axis, in radians; positive looks up
    pub pitch: f32,
    /// Height of the camera above [`AvatarPose::position`]
    pub eye_height: f32,
}

impl AvatarPose {
    /// Creates a pose at `position` looking along `yaw` and `pitch`
    #[must_use]
    pub fn new(position: Vec3, yaw: f32, pitch: f32, eye_height: f32) -> Self {
        Self {
            position,
            yaw,
            pitch,
            eye_height,
        }
    }

    /// Creates a level pose at `position` facing `-Z`, with the configured eye height
    #[must_use]
    pub fn standing_at(position: Vec3, settings: &PoseSettings) -> Self {
        Self::new(position, 0.0, 0.0, settings.eye_height)
    }

    /// Advances the pose by `elapsed`
    ///
    /// Turning happens first, so movement follows the updated heading.
    /// Pitch is clamped to `[-pitch_limit, pitch_limit]`.
    pub fn integrate(
        &mut self,
        movement: MovementControl,
        turn: TurnControl,
        elapsed: Duration,
        pitch_limit: f32,
    ) {
        let seconds = elapsed.as_secs_f32();

        self.yaw -= turn.horizontal * seconds;
        self.pitch = (self.pitch + turn.vertical * seconds).clamp(-pitch_limit, pitch_limit);

        if movement.is_idle() {
            return;
        }

        let distance = movement.speed * seconds;
        let heading = self.yaw - movement.angle;

        self.position.x -= distance * heading.sin();
        self.position.z -= distance * heading.cos();
    }

    /// The camera orientation, applying yaw before pitch
    #[must_use]
    pub fn rotation(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.yaw, self.pitch, 0.0)
    }

    /// The camera transform: eye position and orientation
    #[must_use]
    pub fn transform(&self) -> Transform {
        Transform::from_translation(self.position + Vec3::Y * self.eye_height)
            .with_rotation(self.rotation())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    const SECOND: Duration = Duration::from_secs(1);

    fn assert_close(a: Vec3, b: Vec3) {
        assert!((a - b).length() < 1e-5, "{a} was not close to {b}");
    }

    #[test]
    fn forward_is_negative_z() {
        let mut pose = AvatarPose::default();
        let forward = MovementControl {
            speed: 3.0,
            angle: 0.0,
        };

        pose.integrate(forward, TurnControl::IDLE, SECOND / 2, 1.5);
        assert_close(pose.position, Vec3::new(0.0, 0.0, -1.5));
    }

    #[test]
    fn strafing_right_is_positive_x() {
        let mut pose = AvatarPose::default();
        let right = MovementControl {
            speed: 2.0,
            angle: FRAC_PI_2,
        };

        pose.integrate(right, TurnControl::IDLE, SECOND, 1.5);
        assert_close(pose.position, Vec3::new(2.0, 0.0, 0.0));
    }

    #[test]
    fn turning_right_decreases_yaw_and_pitch_is_clamped() {
        let mut pose = AvatarPose::default();
        let turn = TurnControl {
            horizontal: 2.0,
            vertical: 4.0,
        };

        pose.integrate(MovementControl::IDLE, turn, SECOND, 1.5);
        assert_eq!(pose.yaw, -2.0);
        assert_eq!(pose.pitch, 1.5);
    }

    #[test]
    fn transform_lifts_the_camera_to_eye_height() {
        let pose = AvatarPose::new(Vec3::new(1.0, 0.0, 2.0), 0.0, 0.0, 1.62);
        let transform = pose.transform();

        assert_close(transform.translation, Vec3::new(1.0, 1.62, 2.0));
        assert_close(transform.forward().into(), Vec3::NEG_Z);
    }
}
