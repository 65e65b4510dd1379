//! The logical navigation actions and their physical key bindings.

use bevy::{input::keyboard::KeyCode, reflect::Reflect, utils::HashMap};
use serde::{Deserialize, Serialize};

use crate as first_person_input;
use crate::Actionlike;

/// The logical actions understood by the keyboard path of the controller
#[derive(Actionlike, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Reflect)]
pub enum NavAction {
    /// Walk forward
    MoveFwd,
    /// Walk backward
    MoveBack,
    /// Strafe left
    MoveLeft,
    /// Strafe right
    MoveRight,
    /// Pitch the camera up
    LookUp,
    /// Pitch the camera down
    LookDown,
    /// Yaw the camera left
    LookLeft,
    /// Yaw the camera right
    LookRight,
}

impl NavAction {
    /// The four movement actions
    pub const MOVE: [NavAction; 4] = [
        NavAction::MoveFwd,
        NavAction::MoveBack,
        NavAction::MoveLeft,
        NavAction::MoveRight,
    ];

    /// The four look actions
    pub const LOOK: [NavAction; 4] = [
        NavAction::LookUp,
        NavAction::LookDown,
        NavAction::LookLeft,
        NavAction::LookRight,
    ];

    /// Does this action drive the movement channel?
    #[must_use]
    #[inline]
    pub fn is_move(&self) -> bool {
        Self::MOVE.contains(self)
    }

    /// Does this action drive the look channel?
    #[must_use]
    #[inline]
    pub fn is_look(&self) -> bool {
        Self::LOOK.contains(self)
    }
}

/// A one-to-one mapping between physical keys and logical actions
///
/// Each key is bound to at most one action, and each action to at most one key.
///
/// # Example
/// ```rust
/// use bevy::input::keyboard::KeyCode;
/// use first_person_input::prelude::*;
///
/// let mut keymap = Keymap::<NavAction>::default();
/// assert_eq!(keymap.action(KeyCode::KeyW), Some(NavAction::MoveFwd));
///
/// // Rebinding a key displaces its previous action
/// keymap.insert(NavAction::LookUp, KeyCode::KeyW);
/// assert_eq!(keymap.action(KeyCode::KeyW), Some(NavAction::LookUp));
/// assert_eq!(keymap.key(NavAction::MoveFwd), None);
/// assert_eq!(keymap.key(NavAction::LookUp), Some(KeyCode::KeyW));
/// assert_eq!(keymap.action(KeyCode::ArrowUp), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keymap<A: Actionlike> {
    key_to_action: HashMap<KeyCode, A>,
    action_to_key: HashMap<A, KeyCode>,
}

// Deriving default induces an undesired bound on the generic
impl<A: Actionlike> Keymap<A> {
    /// Creates a keymap without any bindings
    #[must_use]
    pub fn empty() -> Self {
        Self {
            key_to_action: HashMap::default(),
            action_to_key: HashMap::default(),
        }
    }

    /// Creates a keymap from `(action, key)` pairs, later pairs displacing earlier ones
    #[must_use]
    pub fn new(bindings: impl IntoIterator<Item = (A, KeyCode)>) -> Self {
        let mut keymap = Self::empty();
        for (action, key) in bindings {
            keymap.insert(action, key);
        }
        keymap
    }

    /// Binds `action` to `key`, removing any previous binding of either
    pub fn insert(&mut self, action: A, key: KeyCode) {
        if let Some(previous_key) = self.action_to_key.remove(&action) {
            self.key_to_action.remove(&previous_key);
        }
        if let Some(previous_action) = self.key_to_action.remove(&key) {
            self.action_to_key.remove(&previous_action);
        }

        self.key_to_action.insert(key, action);
        self.action_to_key.insert(action, key);
    }

    /// Removes the binding of `action`, returning the key it was bound to
    pub fn remove(&mut self, action: A) -> Option<KeyCode> {
        let key = self.action_to_key.remove(&action)?;
        self.key_to_action.remove(&key);
        Some(key)
    }

    /// The action bound to `key`, if any
    #[must_use]
    pub fn action(&self, key: KeyCode) -> Option<A> {
        self.key_to_action.get(&key).copied()
    }

    /// The key bound to `action`, if any
    #[must_use]
    pub fn key(&self, action: A) -> Option<KeyCode> {
        self.action_to_key.get(&action).copied()
    }

    /// The number of bindings
    #[must_use]
    pub fn len(&self) -> usize {
        self.action_to_key.len()
    }

    /// Are there no bindings at all?
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.action_to_key.is_empty()
    }
}

impl Default for Keymap<NavAction> {
    /// WASD for movement, arrow keys for looking around
    fn default() -> Self {
        Self::new([
            (NavAction::MoveFwd, KeyCode::KeyW),
            (NavAction::MoveBack, KeyCode::KeyS),
            (NavAction::MoveLeft, KeyCode::KeyA),
            (NavAction::MoveRight, KeyCode::KeyD),
            (NavAction::LookUp, KeyCode::ArrowUp),
            (NavAction::LookDown, KeyCode::ArrowDown),
            (NavAction::LookLeft, KeyCode::ArrowLeft),
            (NavAction::LookRight, KeyCode::ArrowRight),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_indices_follow_declaration_order() {
        assert_eq!(NavAction::N_VARIANTS, 8);
        assert_eq!(NavAction::MoveFwd.index(), 0);
        assert_eq!(NavAction::LookRight.index(), 7);
        assert_eq!(NavAction::get_at(4), Some(NavAction::LookUp));
        assert_eq!(NavAction::get_at(8), None);

        let all: Vec<NavAction> = NavAction::variants().collect();
        assert_eq!(all[..4], NavAction::MOVE);
        assert_eq!(all[4..], NavAction::LOOK);
    }

    #[test]
    fn actions_belong_to_exactly_one_channel() {
        for action in NavAction::variants() {
            assert_ne!(action.is_move(), action.is_look());
        }

        assert!(NavAction::MoveBack.is_move());
        assert!(NavAction::LookLeft.is_look());
        assert!(!NavAction::LookUp.is_move());
    }

    #[test]
    fn removing_a_binding_frees_both_sides() {
        let mut keymap = Keymap::<NavAction>::default();

        assert_eq!(keymap.remove(NavAction::MoveLeft), Some(KeyCode::KeyA));
        assert_eq!(keymap.action(KeyCode::KeyA), None);
        assert_eq!(keymap.key(NavAction::MoveLeft), None);
        assert_eq!(keymap.len(), NavAction::N_VARIANTS - 1);

        // Already unbound
        assert_eq!(keymap.remove(NavAction::MoveLeft), None);

        keymap.insert(NavAction::LookLeft, KeyCode::KeyA);
        assert_eq!(keymap.action(KeyCode::ArrowLeft), None);
        assert_eq!(keymap.action(KeyCode::KeyA), Some(NavAction::LookLeft));
    }

    #[test]
    fn default_keymap_is_one_to_one() {
        let keymap = Keymap::<NavAction>::default();
        assert_eq!(keymap.len(), NavAction::N_VARIANTS);

        for action in NavAction::variants() {
            let key = keymap.key(action).unwrap();
            assert_eq!(keymap.action(key), Some(action));
        }
    }
}
