//! Picks exactly one source per control channel each tick.
//!
//! Sources are consulted in precedence order, highest first:
//!
//! | Channel  | 1st          | 2nd               | 3rd              |
//! |----------|--------------|-------------------|------------------|
//! | movement | touch drag   | held move keys    |                  |
//! | turn     | touch drag   | held look keys    | mouse-look delta |
//!
//! If no source claims a channel, it is idle.
//! Every source is sampled exactly once per tick, even when a higher-priority source wins,
//! so per-tick accumulators (like mouse movement) never leak into a later tick.

use std::f32::consts::{FRAC_PI_2, PI};

use bevy::prelude::Resource;

use crate::{
    control::{Channel, MovementControl, TurnControl},
    keyboard::KeyboardTracker,
    mouse_look::MouseLookTracker,
    nav_action::NavAction,
    settings::ControlSettings,
    touch::TouchTracker,
};

/// An input source that can drive the movement channel
pub trait MovementSource {
    /// Samples this source for the current tick
    ///
    /// Returns `None` if the source does not want the channel this tick.
    /// This is called exactly once per tick, so it may reset per-tick state.
    fn movement_sample(&mut self, settings: &ControlSettings) -> Option<MovementControl>;
}

/// An input source that can drive the turn channel
pub trait TurnSource {
    /// Samples this source for the current tick
    ///
    /// Returns `None` if the source does not want the channel this tick.
    /// This is called exactly once per tick, so it may reset per-tick state.
    fn turn_sample(&mut self, settings: &ControlSettings) -> Option<TurnControl>;
}

/// Owns the two control vectors and recomputes them once per tick
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq)]
pub struct ControlArbiter {
    movement: MovementControl,
    turn: TurnControl,
}

impl ControlArbiter {
    /// Creates an arbiter with both channels idle
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The movement vector computed on the last tick
    #[must_use]
    #[inline]
    pub fn movement(&self) -> MovementControl {
        self.movement
    }

    /// The turn vector computed on the last tick
    #[must_use]
    #[inline]
    pub fn turn(&self) -> TurnControl {
        self.turn
    }

    /// Recomputes both control vectors
    ///
    /// `movement_sources` and `turn_sources` must be ordered from highest to lowest precedence.
    pub fn update(
        &mut self,
        settings: &ControlSettings,
        movement_sources: &mut [&mut dyn MovementSource],
        turn_sources: &mut [&mut dyn TurnSource],
    ) {
        self.movement = first_claim(
            movement_sources
                .iter_mut()
                .map(|source| source.movement_sample(settings)),
        )
        .unwrap_or(MovementControl::IDLE);

        self.turn = first_claim(
            turn_sources
                .iter_mut()
                .map(|source| source.turn_sample(settings)),
        )
        .unwrap_or(TurnControl::IDLE);
    }

    /// Recomputes both control vectors from the standard touch > keyboard > mouse precedence
    pub fn update_from_trackers(
        &mut self,
        settings: &ControlSettings,
        touch: &mut TouchTracker,
        keyboard: &mut KeyboardTracker<NavAction>,
        mouse: &mut MouseLookTracker,
    ) {
        self.movement = first_claim(
            [
                touch.movement_sample(settings),
                keyboard.movement_sample(settings),
            ]
            .into_iter(),
        )
        .unwrap_or(MovementControl::IDLE);

        self.turn = first_claim(
            [
                touch.turn_sample(settings),
                keyboard.turn_sample(settings),
                mouse.turn_sample(settings),
            ]
            .into_iter(),
        )
        .unwrap_or(TurnControl::IDLE);
    }
}

/// Consumes every sample and keeps the first claim
fn first_claim<T>(samples: impl Iterator<Item = Option<T>>) -> Option<T> {
    samples.fold(None, |winner, sample| winner.or(sample))
}

impl MovementSource for TouchTracker {
    fn movement_sample(&mut self, settings: &ControlSettings) -> Option<MovementControl> {
        let (angle, magnitude) = self.sample_channel(Channel::Movement)?;

        Some(MovementControl {
            speed: magnitude * settings.base_move_speed,
            angle,
        })
    }
}

impl TurnSource for TouchTracker {
    fn turn_sample(&mut self, settings: &ControlSettings) -> Option<TurnControl> {
        let (angle, magnitude) = self.sample_channel(Channel::Look)?;
        let rate = magnitude * settings.base_turn_speed;

        Some(TurnControl {
            horizontal: rate * angle.sin(),
            vertical: rate * angle.cos(),
        })
    }
}

impl MovementSource for KeyboardTracker<NavAction> {
    /// Claims the channel while any movement key is held
    ///
    /// Diagonals bisect for forward combinations, and mirror around straight back for backward ones.
    /// Opposing keys cancel out to zero speed, while still holding the channel.
    fn movement_sample(&mut self, settings: &ControlSettings) -> Option<MovementControl> {
        if !self.any_pressed(NavAction::MOVE) {
            return None;
        }

        let mut horizontal = 0;
        let mut vertical = 0;
        let mut angle = 0.0;

        if self.pressed(NavAction::MoveRight) {
            horizontal += 1;
            angle += FRAC_PI_2;
        }
        if self.pressed(NavAction::MoveLeft) {
            horizontal -= 1;
            angle -= FRAC_PI_2;
        }
        if self.pressed(NavAction::MoveFwd) {
            vertical += 1;
            angle /= 2.0;
        }
        if self.pressed(NavAction::MoveBack) {
            vertical -= 1;
            angle = PI - angle / 2.0;
        }

        if horizontal == 0 && vertical == 0 {
            return Some(MovementControl::IDLE);
        }

        Some(MovementControl {
            speed: settings.base_move_speed,
            angle,
        })
    }
}

impl TurnSource for KeyboardTracker<NavAction> {
    /// Claims the channel while any look key is held; opposing keys cancel out
    fn turn_sample(&mut self, settings: &ControlSettings) -> Option<TurnControl> {
        if !self.any_pressed(NavAction::LOOK) {
            return None;
        }

        let axis = |positive: NavAction, negative: NavAction| -> f32 {
            let mut value = 0.0;
            if self.pressed(positive) {
                value += 1.0;
            }
            if self.pressed(negative) {
                value -= 1.0;
            }
            value
        };

        Some(TurnControl {
            horizontal: settings.base_turn_speed * axis(NavAction::LookRight, NavAction::LookLeft),
            vertical: settings.base_turn_speed * axis(NavAction::LookUp, NavAction::LookDown),
        })
    }
}

impl TurnSource for MouseLookTracker {
    /// Claims the channel if the pointer moved since the last tick, always clearing the accumulator
    fn turn_sample(&mut self, settings: &ControlSettings) -> Option<TurnControl> {
        let delta = self.take_delta()?;

        Some(TurnControl {
            horizontal: delta.x * settings.mouse_sensitivity,
            vertical: delta.y * settings.mouse_sensitivity,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(Option<TurnControl>, usize);

    impl TurnSource for Fixed {
        fn turn_sample(&mut self, _settings: &ControlSettings) -> Option<TurnControl> {
            self.1 += 1;
            self.0
        }
    }

    #[test]
    fn every_source_is_sampled_once() {
        let settings = ControlSettings::default();
        let mut arbiter = ControlArbiter::new();

        let first = TurnControl {
            horizontal: 1.0,
            vertical: 0.0,
        };
        let second = TurnControl {
            horizontal: 0.0,
            vertical: 1.0,
        };
        let mut absent = Fixed(None, 0);
        let mut high = Fixed(Some(first), 0);
        let mut low = Fixed(Some(second), 0);

        arbiter.update(&settings, &mut [], &mut [&mut absent, &mut high, &mut low]);

        assert_eq!(arbiter.turn(), first);
        assert_eq!(arbiter.movement(), MovementControl::IDLE);
        assert_eq!((absent.1, high.1, low.1), (1, 1, 1));
    }
}
