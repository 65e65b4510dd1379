#![forbid(missing_docs)]
#![forbid(unsafe_code)]
#![warn(clippy::doc_markdown)]
#![doc = include_str!("../README.md")]

use std::fmt::Debug;
use std::hash::Hash;
use std::marker::PhantomData;

pub mod action_diff;
pub mod arbiter;
pub mod control;
pub mod controller;
pub mod errors;
pub mod frame_loop;
pub mod indicator;
pub mod keyboard;
pub mod mouse_look;
pub mod nav_action;
pub mod plugin;
pub mod pose;
pub mod settings;
pub mod systems;
pub mod touch;

// Importing the derive macro
pub use first_person_input_macros::Actionlike;

/// Everything you need to get started
pub mod prelude {
    pub use crate::action_diff::ActionDiff;
    pub use crate::arbiter::{ControlArbiter, MovementSource, TurnSource};
    pub use crate::control::{Channel, MovementControl, TurnControl};
    pub use crate::controller::FirstPersonController;
    pub use crate::errors::{CaptureError, FrameLoopError};
    pub use crate::frame_loop::{DisplaySignal, FrameLoop, FrameRequest, FrameTick};
    pub use crate::indicator::{IndicatorEvent, IndicatorSink};
    pub use crate::keyboard::KeyboardTracker;
    pub use crate::mouse_look::{CaptureFailed, CapturePlatform, CaptureState, MouseLookTracker};
    pub use crate::nav_action::{Keymap, NavAction};
    pub use crate::plugin::{FirstPersonInputPlugin, FirstPersonInputSystem};
    pub use crate::pose::AvatarPose;
    pub use crate::settings::{
        ControlSettings, ControllerSettings, FrameSettings, PoseSettings, TouchSettings,
    };
    pub use crate::touch::{Classification, Contact, ContactId, TouchTracker};

    pub use crate::Actionlike;
}

/// Allows a type to be used as a logical action, independent of the keys bound to it
///
/// The trackers store per-action state in flat arrays indexed by [`Actionlike::index`],
/// so implementors are expected to be small, data-less enums.
/// Use the derive macro rather than implementing this by hand.
///
/// # Example
/// ```rust
/// use first_person_input::Actionlike;
///
/// #[derive(Actionlike, Debug, PartialEq, Eq, Clone, Copy, Hash)]
/// enum EditorAction {
///    Orbit,
///    Pan,
///    Zoom,
/// }
///
/// assert_eq!(EditorAction::N_VARIANTS, 3);
/// assert_eq!(EditorAction::Pan.index(), 1);
/// assert_eq!(EditorAction::get_at(2), Some(EditorAction::Zoom));
/// assert_eq!(EditorAction::variants().count(), 3);
/// ```
pub trait Actionlike: Debug + Copy + Eq + Hash + Send + Sync + 'static {
    /// The number of variants of this action type
    const N_VARIANTS: usize;

    /// Iterates over the possible actions in the order they were defined
    fn variants() -> ActionIter<Self> {
        ActionIter::default()
    }

    /// Returns the action stored at the provided index if it exists
    fn get_at(index: usize) -> Option<Self>;

    /// Returns the position in the defining enum of the given action
    fn index(&self) -> usize;
}

/// An iterator of [`Actionlike`] actions
///
/// Created by calling [`Actionlike::variants`].
#[derive(Debug, Clone)]
pub struct ActionIter<A: Actionlike> {
    index: usize,
    _phantom: PhantomData<A>,
}

impl<A: Actionlike> Iterator for ActionIter<A> {
    type Item = A;

    fn next(&mut self) -> Option<A> {
        let item = A::get_at(self.index);
        if item.is_some() {
            self.index += 1;
        }

        item
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = A::N_VARIANTS.saturating_sub(self.index);
        (remaining, Some(remaining))
    }
}

impl<A: Actionlike> ExactSizeIterator for ActionIter<A> {}

// We can't derive this, because otherwise it won't work when A is not default
impl<A: Actionlike> Default for ActionIter<A> {
    fn default() -> Self {
        ActionIter {
            index: 0,
            _phantom: PhantomData,
        }
    }
}
