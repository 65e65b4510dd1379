//! Contains the main plugin exported by this crate.

use bevy::app::{App, Plugin, PreUpdate, Startup};
use bevy::ecs::prelude::*;
use bevy::input::InputSystem;
use bevy::window::{WindowFocused, WindowResized};

use crate::action_diff::ActionDiff;
use crate::arbiter::ControlArbiter;
use crate::control::{Channel, MovementControl, TurnControl};
use crate::indicator::IndicatorEvent;
use crate::keyboard::KeyboardTracker;
use crate::mouse_look::{CaptureFailed, CaptureOptions, CaptureState, MouseLookTracker};
use crate::nav_action::NavAction;
use crate::pose::AvatarPose;
use crate::settings::{
    ControlSettings, ControllerSettings, FrameSettings, PoseSettings, TouchSettings,
};
use crate::systems::FrameClock;
use crate::touch::TouchTracker;

/// A [`Plugin`] that turns keyboard, mouse and touch input into first-person movement and look controls
///
/// Requires Bevy's `InputPlugin` (for keyboard, mouse and touch events) and `TimePlugin`.
/// The primary window, if there is one, is used as the touch tracking area and as the pointer-capture target.
///
/// Settings are read from the [`ControllerSettings`] resource, which is initialized with its default values
/// if it does not exist yet. Changing it at runtime is picked up on the next update.
///
/// Entities with both an [`AvatarPose`] and a `Transform` are moved every tick.
///
/// ## Systems
///
/// All systems run during [`PreUpdate`], after [`InputSystem`].
/// If you have systems that read the control vectors in that schedule,
/// order them after [`FirstPersonInputSystem::Arbitrate`].
///
/// Complete list:
///
/// - [`FirstPersonInputSystem::Collect`]: forwards platform events into the trackers
///     - [`apply_settings`](crate::systems::apply_settings)
///     - [`track_focus`](crate::systems::track_focus)
///     - [`track_resize`](crate::systems::track_resize)
///     - [`collect_keyboard`](crate::systems::collect_keyboard)
///     - [`collect_mouse_motion`](crate::systems::collect_mouse_motion)
///     - [`collect_touches`](crate::systems::collect_touches)
///     - [`toggle_capture`](crate::systems::toggle_capture)
///     - [`sync_capture`](crate::systems::sync_capture)
/// - [`FirstPersonInputSystem::Tick`]: [`tick_frame_loop`](crate::systems::tick_frame_loop), which decides whether this update is a tick
/// - [`FirstPersonInputSystem::Arbitrate`]: [`arbitrate`](crate::systems::arbitrate) recomputes the [`ControlArbiter`] on ticks,
///   then [`forward_events`](crate::systems::forward_events) re-emits queued [`IndicatorEvent`]s, [`ActionDiff`]s
///   and [`CaptureFailed`]s every update
/// - [`FirstPersonInputSystem::Integrate`]: [`integrate_poses`](crate::systems::integrate_poses) moves every [`AvatarPose`] on ticks
#[derive(Debug, Default, Clone, Copy)]
pub struct FirstPersonInputPlugin;

impl Plugin for FirstPersonInputPlugin {
    fn build(&self, app: &mut App) {
        use crate::systems::*;

        app.configure_sets(
            PreUpdate,
            (
                FirstPersonInputSystem::Collect,
                FirstPersonInputSystem::Tick,
                FirstPersonInputSystem::Arbitrate,
                FirstPersonInputSystem::Integrate,
            )
                .chain()
                .after(InputSystem),
        );

        app.add_systems(Startup, start_controller)
            .add_systems(
                PreUpdate,
                (
                    apply_settings,
                    track_focus,
                    track_resize,
                    collect_keyboard,
                    collect_mouse_motion,
                    collect_touches,
                    toggle_capture,
                    sync_capture,
                )
                    .chain()
                    .in_set(FirstPersonInputSystem::Collect),
            )
            .add_systems(
                PreUpdate,
                tick_frame_loop.in_set(FirstPersonInputSystem::Tick),
            )
            .add_systems(
                PreUpdate,
                (arbitrate.run_if(frame_ticked), forward_events)
                    .chain()
                    .in_set(FirstPersonInputSystem::Arbitrate),
            )
            .add_systems(
                PreUpdate,
                integrate_poses
                    .run_if(frame_ticked)
                    .in_set(FirstPersonInputSystem::Integrate),
            );

        // Window events are normally registered by the `WindowPlugin`,
        // but headless apps still need them to exist.
        app.add_event::<WindowFocused>()
            .add_event::<WindowResized>()
            .add_event::<IndicatorEvent>()
            .add_event::<ActionDiff<NavAction>>()
            .add_event::<CaptureFailed>();

        // Resources
        app.init_resource::<ControllerSettings>();
        let settings = app.world().resource::<ControllerSettings>().clone();

        app.insert_resource(TouchTracker::new(settings.touch, 0.0))
            .init_resource::<KeyboardTracker<NavAction>>()
            .init_resource::<MouseLookTracker>()
            .init_resource::<ControlArbiter>()
            .insert_resource(FrameClock::new(&settings.frame));

        // Reflection
        app.register_type::<ControllerSettings>()
            .register_type::<TouchSettings>()
            .register_type::<ControlSettings>()
            .register_type::<FrameSettings>()
            .register_type::<PoseSettings>()
            .register_type::<MouseLookTracker>()
            .register_type::<CaptureState>()
            .register_type::<CaptureOptions>()
            .register_type::<Channel>()
            .register_type::<MovementControl>()
            .register_type::<TurnControl>()
            .register_type::<AvatarPose>();
    }
}

/// [`SystemSet`]s for the [`crate::systems`] used by this crate
///
/// The sets are chained in declaration order.
#[derive(SystemSet, Clone, Copy, Hash, Debug, PartialEq, Eq)]
pub enum FirstPersonInputSystem {
    /// Forwards keyboard, mouse, touch and window events into the trackers
    Collect,
    /// Drives the frame loop, deciding whether this update is a tick
    Tick,
    /// Recomputes the control vectors on ticks, and re-emits tracker notifications as events
    Arbitrate,
    /// Moves every [`AvatarPose`] on ticks
    Integrate,
}
