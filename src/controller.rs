//! A self-contained controller for hosts that do not use the Bevy plugin.

use bevy::utils::HashSet;

use crate::{
    action_diff::ActionDiff,
    arbiter::ControlArbiter,
    control::{MovementControl, TurnControl},
    indicator::IndicatorSink,
    keyboard::KeyboardTracker,
    mouse_look::MouseLookTracker,
    nav_action::{Keymap, NavAction},
    settings::ControllerSettings,
    touch::TouchTracker,
};

/// The three input trackers and the arbiter that combines them
///
/// The host feeds platform events straight into the public trackers,
/// then calls [`FirstPersonController::update`] once per tick.
///
/// # Example
/// ```rust
/// use bevy::input::keyboard::KeyCode;
/// use first_person_input::prelude::*;
///
/// let mut controller = FirstPersonController::new(ControllerSettings::default(), 1280.0);
/// controller.on_focus_changed(true);
///
/// controller.keyboard.on_key_down(KeyCode::KeyW, false);
/// controller.update(&mut Vec::new());
///
/// assert_eq!(controller.movement().speed, 3.0);
/// assert_eq!(controller.movement().angle, 0.0);
/// ```
#[derive(Debug, Clone)]
pub struct FirstPersonController {
    /// Configuration shared by every part of the controller
    pub settings: ControllerSettings,
    /// Touch drags
    pub touch: TouchTracker,
    /// Held keys
    pub keyboard: KeyboardTracker<NavAction>,
    /// Pointer capture and mouse movement
    pub mouse: MouseLookTracker,
    arbiter: ControlArbiter,
    held: HashSet<NavAction>,
}

impl FirstPersonController {
    /// Creates a controller for a tracking area `area_width` pixels wide
    ///
    /// The keyboard starts out not listening, as if the window were unfocused.
    #[must_use]
    pub fn new(settings: ControllerSettings, area_width: f32) -> Self {
        Self {
            touch: TouchTracker::new(settings.touch, area_width),
            keyboard: KeyboardTracker::new(Keymap::default()),
            mouse: MouseLookTracker::new(),
            arbiter: ControlArbiter::new(),
            held: HashSet::default(),
            settings,
        }
    }

    /// Window focus changed: keyboard and mouse-look only listen while focused
    pub fn on_focus_changed(&mut self, focused: bool) {
        if focused {
            self.keyboard.start_listening();
            self.mouse.start_listening();
        } else {
            self.keyboard.stop_listening();
            self.mouse.stop_listening();
        }
    }

    /// Runs one tick: recomputes both control vectors and flushes indicator changes into `indicators`
    ///
    /// Returns the keyboard transitions that happened since the previous tick.
    pub fn update(&mut self, indicators: &mut impl IndicatorSink) -> Vec<ActionDiff<NavAction>> {
        self.arbiter.update_from_trackers(
            &self.settings.control,
            &mut self.touch,
            &mut self.keyboard,
            &mut self.mouse,
        );

        for event in self.touch.drain_indicator_events() {
            indicators.apply(event);
        }

        let diffs: Vec<_> = self.keyboard.drain_diffs().collect();
        for diff in &diffs {
            diff.apply_to(&mut self.held);
        }
        diffs
    }

    /// The movement vector computed on the last tick
    #[must_use]
    pub fn movement(&self) -> MovementControl {
        self.arbiter.movement()
    }

    /// The turn vector computed on the last tick
    #[must_use]
    pub fn turn(&self) -> TurnControl {
        self.arbiter.turn()
    }

    /// The held actions as reconstructed from the transitions reported by [`FirstPersonController::update`]
    #[must_use]
    pub fn reported_held(&self) -> &HashSet<NavAction> {
        &self.held
    }
}
