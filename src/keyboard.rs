//! Held/released state of logical actions driven by physical key events.
//!
//! Transitions are edge-triggered: a key-repeat while the action is already held does nothing,
//! and every genuine transition queues exactly one [`ActionDiff`].
//!
//! Listening is expected to follow window focus:
//! call [`KeyboardTracker::stop_listening`] when focus is lost and
//! [`KeyboardTracker::start_listening`] when it is regained.
//! Stopping releases every held action, so a key lifted while unfocused can never stay stuck.

use bevy::{input::keyboard::KeyCode, log::debug, prelude::Resource};

use crate::{action_diff::ActionDiff, nav_action::Keymap, Actionlike};

/// Tracks which actions of type `A` currently have their key held down
///
/// # Example
/// ```rust
/// use bevy::input::keyboard::KeyCode;
/// use first_person_input::prelude::*;
///
/// let mut keyboard = KeyboardTracker::new(Keymap::<NavAction>::default());
/// keyboard.start_listening();
///
/// keyboard.on_key_down(KeyCode::KeyW, false);
/// // Key-repeat is suppressed
/// keyboard.on_key_down(KeyCode::KeyW, true);
/// assert!(keyboard.pressed(NavAction::MoveFwd));
///
/// let diffs: Vec<_> = keyboard.drain_diffs().collect();
/// assert_eq!(diffs, [ActionDiff::Pressed { action: NavAction::MoveFwd }]);
/// ```
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct KeyboardTracker<A: Actionlike> {
    keymap: Keymap<A>,
    /// Indexed by [`Actionlike::index`]
    held: Vec<bool>,
    listening: bool,
    diffs: Vec<ActionDiff<A>>,
}

impl<A: Actionlike> KeyboardTracker<A> {
    /// Creates a tracker using `keymap`, with every action released and listening off
    #[must_use]
    pub fn new(keymap: Keymap<A>) -> Self {
        Self {
            keymap,
            held: vec![false; A::N_VARIANTS],
            listening: false,
            diffs: Vec::new(),
        }
    }

    /// The key bindings in use
    #[must_use]
    pub fn keymap(&self) -> &Keymap<A> {
        &self.keymap
    }

    /// Replaces the key bindings, releasing every held action first
    pub fn set_keymap(&mut self, keymap: Keymap<A>) {
        self.release_all();
        self.keymap = keymap;
    }

    /// Is the tracker currently processing key events?
    #[must_use]
    pub fn is_listening(&self) -> bool {
        self.listening
    }

    /// Starts processing key events
    pub fn start_listening(&mut self) {
        if self.listening {
            return;
        }

        debug!("Keyboard tracker started listening");
        self.listening = true;
    }

    /// Stops processing key events, releasing every held action
    ///
    /// One [`ActionDiff::Released`] is queued for each action that was held.
    pub fn stop_listening(&mut self) {
        if !self.listening {
            return;
        }

        debug!("Keyboard tracker stopped listening");
        self.release_all();
        self.listening = false;
    }

    /// A physical key went down
    ///
    /// Ignored if the key is unmapped, the tracker is not listening, the event is a key-repeat,
    /// or the action is already held.
    /// Returns the resulting transition, if any.
    pub fn on_key_down(&mut self, key: KeyCode, repeat: bool) -> Option<ActionDiff<A>> {
        if !self.listening || repeat {
            return None;
        }

        let action = self.keymap.action(key)?;
        self.set_held(action, true)
    }

    /// A physical key went up
    ///
    /// Ignored if the key is unmapped, the tracker is not listening, or the action is not held.
    /// Returns the resulting transition, if any.
    pub fn on_key_up(&mut self, key: KeyCode) -> Option<ActionDiff<A>> {
        if !self.listening {
            return None;
        }

        let action = self.keymap.action(key)?;
        self.set_held(action, false)
    }

    /// Is `action` currently held?
    #[must_use]
    #[inline]
    pub fn pressed(&self, action: A) -> bool {
        self.held[action.index()]
    }

    /// Is `action` currently released?
    #[must_use]
    #[inline]
    pub fn released(&self, action: A) -> bool {
        !self.pressed(action)
    }

    /// Is any of `actions` currently held?
    #[must_use]
    pub fn any_pressed(&self, actions: impl IntoIterator<Item = A>) -> bool {
        actions.into_iter().any(|action| self.pressed(action))
    }

    /// Iterates over every held action, in declaration order
    pub fn get_pressed(&self) -> impl Iterator<Item = A> + '_ {
        A::variants().filter(|action| self.pressed(*action))
    }

    /// Drains the transitions queued since the last call
    pub fn drain_diffs(&mut self) -> std::vec::Drain<'_, ActionDiff<A>> {
        self.diffs.drain(..)
    }

    /// Releases every held action, queueing a [`ActionDiff::Released`] for each
    pub fn release_all(&mut self) {
        for action in A::variants() {
            self.set_held(action, false);
        }
    }

    fn set_held(&mut self, action: A, pressed: bool) -> Option<ActionDiff<A>> {
        let held = &mut self.held[action.index()];
        if *held == pressed {
            return None;
        }

        *held = pressed;
        let diff = if pressed {
            ActionDiff::Pressed { action }
        } else {
            ActionDiff::Released { action }
        };
        self.diffs.push(diff);
        Some(diff)
    }
}

impl<A: Actionlike> Default for KeyboardTracker<A>
where
    Keymap<A>: Default,
{
    fn default() -> Self {
        Self::new(Keymap::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nav_action::NavAction;

    #[test]
    fn ignores_events_while_not_listening() {
        let mut keyboard = KeyboardTracker::<NavAction>::default();

        assert_eq!(keyboard.on_key_down(KeyCode::KeyW, false), None);
        assert!(keyboard.released(NavAction::MoveFwd));
        assert_eq!(keyboard.drain_diffs().count(), 0);
    }

    #[test]
    fn unmapped_keys_have_no_effect() {
        let mut keyboard = KeyboardTracker::<NavAction>::default();
        keyboard.start_listening();

        assert_eq!(keyboard.on_key_down(KeyCode::KeyQ, false), None);
        assert_eq!(keyboard.on_key_up(KeyCode::KeyQ), None);
        assert_eq!(keyboard.get_pressed().count(), 0);
        assert_eq!(keyboard.drain_diffs().count(), 0);
    }

    #[test]
    fn rebinding_releases_held_actions() {
        let mut keyboard = KeyboardTracker::<NavAction>::default();
        keyboard.start_listening();
        keyboard.on_key_down(KeyCode::KeyD, false);
        keyboard.drain_diffs();

        keyboard.set_keymap(Keymap::new([(NavAction::MoveRight, KeyCode::KeyL)]));
        assert!(keyboard.released(NavAction::MoveRight));
        assert_eq!(
            keyboard.drain_diffs().collect::<Vec<_>>(),
            [ActionDiff::Released {
                action: NavAction::MoveRight
            }]
        );

        keyboard.on_key_down(KeyCode::KeyD, false);
        assert!(keyboard.released(NavAction::MoveRight));
        keyboard.on_key_down(KeyCode::KeyL, false);
        assert!(keyboard.pressed(NavAction::MoveRight));
    }
}
