//! Edge-triggered notifications of held-state changes.
//!
//! The [`KeyboardTracker`](crate::keyboard::KeyboardTracker) queues exactly one [`ActionDiff`]
//! per genuine transition, so the held set can be fully reconstructed from the stream.

use bevy::ecs::event::Event;
use serde::{Deserialize, Serialize};

use crate::Actionlike;

/// An action started or stopped being held
#[derive(Event, Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionDiff<A: Actionlike> {
    /// The action was pressed
    Pressed {
        /// The action that changed
        action: A,
    },
    /// The action was released
    Released {
        /// The action that changed
        action: A,
    },
}

impl<A: Actionlike> ActionDiff<A> {
    /// The action that changed
    #[must_use]
    #[inline]
    pub fn action(&self) -> A {
        match *self {
            ActionDiff::Pressed { action } | ActionDiff::Released { action } => action,
        }
    }

    /// Is the action held after this change?
    #[must_use]
    #[inline]
    pub fn is_pressed(&self) -> bool {
        matches!(self, ActionDiff::Pressed { .. })
    }

    /// Applies this change to a set of held actions
    pub fn apply_to(&self, held: &mut bevy::utils::HashSet<A>) {
        match *self {
            ActionDiff::Pressed { action } => {
                held.insert(action);
            }
            ActionDiff::Released { action } => {
                held.remove(&action);
            }
        }
    }
}
