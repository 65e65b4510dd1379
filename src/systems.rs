//! The systems that power the [`FirstPersonInputPlugin`](crate::plugin::FirstPersonInputPlugin).

use std::time::Duration;

use bevy::ecs::prelude::*;
use bevy::{
    input::{
        keyboard::{KeyCode, KeyboardInput},
        mouse::{MouseButton, MouseMotion},
        touch::{TouchInput, TouchPhase},
        ButtonInput, ButtonState,
    },
    log::{trace, warn},
    time::{Real, Time},
    transform::components::Transform,
    window::{CursorGrabMode, PrimaryWindow, Window, WindowFocused, WindowResized},
};

use crate::{
    action_diff::ActionDiff,
    arbiter::ControlArbiter,
    errors::{CaptureError, FrameLoopError},
    frame_loop::{DisplaySignal, FrameHandler, FrameLoop, FrameRequest, FrameTick},
    indicator::IndicatorEvent,
    keyboard::KeyboardTracker,
    mouse_look::{CaptureFailed, CaptureOptions, CapturePlatform, CaptureState, MouseLookTracker},
    nav_action::NavAction,
    pose::AvatarPose,
    settings::{ControllerSettings, FrameSettings},
    touch::{Classification, ContactId, TouchTracker},
};

/// Treats every app update as one display frame
///
/// A wake-up requested during one update is delivered on the next.
#[derive(Debug, Clone, Default)]
struct UpdateSignal {
    next: u64,
    pending: Option<FrameRequest>,
}

impl DisplaySignal for UpdateSignal {
    fn request_frame(&mut self) -> FrameRequest {
        self.next += 1;
        let request = FrameRequest(self.next);
        self.pending = Some(request);
        request
    }

    fn cancel_frame(&mut self, request: FrameRequest) {
        if self.pending == Some(request) {
            self.pending = None;
        }
    }
}

/// Remembers the last tick, until it is read back by the [`FrameClock`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickLatch {
    tick: Option<FrameTick>,
}

impl FrameHandler for TickLatch {
    fn on_frame(&mut self, tick: FrameTick) {
        self.tick = Some(tick);
    }
}

/// The frame loop used by the plugin, driven once per app update by [`Time<Real>`]
///
/// Pause it to freeze the controller: while paused, no update counts as a tick,
/// so the control vectors are not recomputed and poses do not move.
#[derive(Resource, Debug, Clone)]
pub struct FrameClock {
    frame_loop: FrameLoop<TickLatch>,
    signal: UpdateSignal,
    last_tick: Option<FrameTick>,
}

impl FrameClock {
    /// Creates a stopped clock ticking at `settings.target_fps`
    ///
    /// An invalid rate is reported and replaced by the default rate.
    #[must_use]
    pub fn new(settings: &FrameSettings) -> Self {
        let mut frame_loop = FrameLoop::default();
        if let Err(error) = frame_loop.set_target_fps(settings.target_fps) {
            warn!("Keeping the default tick rate: {error}");
        }

        Self {
            frame_loop,
            signal: UpdateSignal::default(),
            last_tick: None,
        }
    }

    /// Starts ticking; the first update after this only records the time
    pub fn start(&mut self) {
        self.frame_loop.start(&mut self.signal, TickLatch::default());
        self.last_tick = None;
    }

    /// Stops ticking
    pub fn pause(&mut self) {
        self.frame_loop.pause(&mut self.signal);
        self.last_tick = None;
    }

    /// Is the clock ticking?
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.frame_loop.is_running()
    }

    /// The minimum time between two ticks
    #[must_use]
    pub fn target_interval(&self) -> Duration {
        self.frame_loop.target_interval()
    }

    /// Changes the tick rate
    pub fn set_target_fps(&mut self, fps: f64) -> Result<(), FrameLoopError> {
        self.frame_loop.set_target_fps(fps)
    }

    /// The tick fired during the current update, if any
    #[must_use]
    pub fn last_tick(&self) -> Option<FrameTick> {
        self.last_tick
    }

    /// Delivers the pending wake-up at time `now`, returning the tick if one fired
    pub fn advance(&mut self, now: Duration) -> Option<FrameTick> {
        self.last_tick = None;

        let request = self.signal.pending.take()?;
        if self.frame_loop.on_display_frame(&mut self.signal, request, now) {
            self.last_tick = self
                .frame_loop
                .handler_mut()
                .and_then(|latch| latch.tick.take());
        }

        self.last_tick
    }
}

/// Grabs the cursor of a Bevy [`Window`]
///
/// Unadjusted movement maps to [`CursorGrabMode::Locked`], which is unavailable on Windows;
/// the basic fallback maps to [`CursorGrabMode::Confined`].
/// The cursor is hidden while grabbed.
impl CapturePlatform for Window {
    fn request_capture(&mut self, options: CaptureOptions) -> Result<(), CaptureError> {
        let grab_mode = if options.unadjusted_movement {
            CursorGrabMode::Locked
        } else {
            CursorGrabMode::Confined
        };

        if cfg!(target_os = "windows") && grab_mode == CursorGrabMode::Locked {
            return Err(CaptureError::Unsupported);
        }

        self.cursor.grab_mode = grab_mode;
        self.cursor.visible = false;
        Ok(())
    }

    fn release_capture(&mut self) {
        self.cursor.grab_mode = CursorGrabMode::None;
        self.cursor.visible = true;
    }
}

/// Events from any window count when there is no primary window, as in headless apps
fn is_tracked(primary: &Query<(), With<PrimaryWindow>>, window: Entity) -> bool {
    primary.is_empty() || primary.contains(window)
}

/// Reads the initial window state and starts the [`FrameClock`]
pub fn start_controller(
    windows: Query<&Window, With<PrimaryWindow>>,
    mut touch: ResMut<TouchTracker>,
    mut keyboard: ResMut<KeyboardTracker<NavAction>>,
    mut clock: ResMut<FrameClock>,
) {
    match windows.get_single() {
        Ok(window) => {
            touch.on_tracking_area_resized(window.width());
            if window.focused {
                keyboard.start_listening();
            }
        }
        // Headless: there is no focus to wait for
        Err(_) => keyboard.start_listening(),
    }

    clock.start();
}

/// Pushes changes of [`ControllerSettings`] into the trackers and the [`FrameClock`]
pub fn apply_settings(
    settings: Res<ControllerSettings>,
    mut touch: ResMut<TouchTracker>,
    mut clock: ResMut<FrameClock>,
) {
    if !settings.is_changed() {
        return;
    }

    touch.set_settings(settings.touch);
    if let Err(error) = clock.set_target_fps(settings.frame.target_fps) {
        warn!("Ignoring the new tick rate: {error}");
    }
}

/// Keyboard and mouse-look only listen while the primary window is focused
pub fn track_focus(
    mut events: EventReader<WindowFocused>,
    primary: Query<(), With<PrimaryWindow>>,
    mut keyboard: ResMut<KeyboardTracker<NavAction>>,
    mut mouse: ResMut<MouseLookTracker>,
) {
    for event in events.read() {
        if !is_tracked(&primary, event.window) {
            continue;
        }

        if event.focused {
            keyboard.start_listening();
            mouse.start_listening();
        } else {
            keyboard.stop_listening();
            mouse.stop_listening();
        }
    }
}

/// The primary window is the touch tracking area: resizing it invalidates every contact
pub fn track_resize(
    mut events: EventReader<WindowResized>,
    primary: Query<(), With<PrimaryWindow>>,
    mut touch: ResMut<TouchTracker>,
) {
    for event in events.read() {
        if is_tracked(&primary, event.window) {
            touch.on_tracking_area_resized(event.width);
        }
    }
}

/// Feeds [`KeyboardInput`] events into the [`KeyboardTracker`]
pub fn collect_keyboard(
    mut events: EventReader<KeyboardInput>,
    mut keyboard: ResMut<KeyboardTracker<NavAction>>,
) {
    for event in events.read() {
        match event.state {
            // Repeats are deduplicated by the tracker
            ButtonState::Pressed => keyboard.on_key_down(event.key_code, false),
            ButtonState::Released => keyboard.on_key_up(event.key_code),
        };
    }
}

/// Feeds [`MouseMotion`] events into the [`MouseLookTracker`]
pub fn collect_mouse_motion(
    mut events: EventReader<MouseMotion>,
    mut mouse: ResMut<MouseLookTracker>,
) {
    for event in events.read() {
        mouse.on_move(event.delta.x, event.delta.y);
    }
}

/// Feeds [`TouchInput`] events from the primary window into the [`TouchTracker`]
///
/// Contacts are timestamped with [`Time<Real>`], so taps are measured in wall-clock time.
pub fn collect_touches(
    mut events: EventReader<TouchInput>,
    primary: Query<(), With<PrimaryWindow>>,
    time: Res<Time<Real>>,
    mut touch: ResMut<TouchTracker>,
) {
    let now = time.elapsed();

    for event in events.read() {
        // Other windows have their own geometry
        if !is_tracked(&primary, event.window) {
            continue;
        }

        let id = ContactId(event.id);
        match event.phase {
            TouchPhase::Started => {
                touch.on_contact_start(id, event.position, now);
            }
            TouchPhase::Moved => touch.on_contact_move(id, event.position),
            TouchPhase::Ended => {
                if let Some(contact) = touch.on_contact_end(id, now) {
                    if contact.classification() == Classification::Tap {
                        trace!("Touch contact {id:?} was a tap at {}", contact.position());
                    }
                }
            }
            TouchPhase::Canceled => {
                touch.on_contact_cancel(id);
            }
        }
    }
}

/// A left click toggles pointer capture on the primary window, and Escape releases it
pub fn toggle_capture(
    mouse_buttons: Res<ButtonInput<MouseButton>>,
    keys: Res<ButtonInput<KeyCode>>,
    mut windows: Query<&mut Window, With<PrimaryWindow>>,
    mut mouse: ResMut<MouseLookTracker>,
) {
    let Ok(mut window) = windows.get_single_mut() else {
        return;
    };

    if keys.just_pressed(KeyCode::Escape) {
        mouse.release_capture(&mut *window);
        return;
    }

    if !mouse_buttons.just_pressed(MouseButton::Left) {
        return;
    }

    match mouse.state() {
        CaptureState::Uncaptured | CaptureState::Releasing => {
            // Failures are queued by the tracker and sent by `forward_events`
            let _ = mouse.request_capture(&mut *window);
        }
        CaptureState::Requesting | CaptureState::Captured => {
            mouse.release_capture(&mut *window);
        }
    }
}

/// Reports the primary window's cursor grab state back to the [`MouseLookTracker`]
///
/// This also picks up grabs and releases made by anything other than [`toggle_capture`].
pub fn sync_capture(
    windows: Query<&Window, With<PrimaryWindow>>,
    mut mouse: ResMut<MouseLookTracker>,
) {
    let Ok(window) = windows.get_single() else {
        return;
    };

    let grabbed = window.cursor.grab_mode != CursorGrabMode::None;
    match (mouse.state(), grabbed) {
        (CaptureState::Captured, true) | (CaptureState::Uncaptured, false) => {}
        _ => mouse.on_capture_changed(grabbed),
    }
}

/// Delivers this update's wake-up to the [`FrameClock`]
pub fn tick_frame_loop(time: Res<Time<Real>>, mut clock: ResMut<FrameClock>) {
    clock.advance(time.elapsed());
}

/// Run condition: did the [`FrameClock`] tick during this update?
pub fn frame_ticked(clock: Res<FrameClock>) -> bool {
    clock.last_tick().is_some()
}

/// Recomputes the [`ControlArbiter`] from the three trackers
pub fn arbitrate(
    settings: Res<ControllerSettings>,
    mut touch: ResMut<TouchTracker>,
    mut keyboard: ResMut<KeyboardTracker<NavAction>>,
    mut mouse: ResMut<MouseLookTracker>,
    mut arbiter: ResMut<ControlArbiter>,
) {
    arbiter.update_from_trackers(&settings.control, &mut touch, &mut keyboard, &mut mouse);
}

/// Re-emits the notifications queued by the trackers as Bevy events
pub fn forward_events(
    mut touch: ResMut<TouchTracker>,
    mut keyboard: ResMut<KeyboardTracker<NavAction>>,
    mut mouse: ResMut<MouseLookTracker>,
    mut indicator_events: EventWriter<IndicatorEvent>,
    mut action_diffs: EventWriter<ActionDiff<NavAction>>,
    mut capture_failures: EventWriter<CaptureFailed>,
) {
    indicator_events.send_batch(touch.drain_indicator_events());
    action_diffs.send_batch(keyboard.drain_diffs());
    capture_failures.send_batch(mouse.drain_failures());
}

/// Moves every [`AvatarPose`] by the current control vectors and copies it into its [`Transform`]
pub fn integrate_poses(
    settings: Res<ControllerSettings>,
    arbiter: Res<ControlArbiter>,
    clock: Res<FrameClock>,
    mut query: Query<(&mut AvatarPose, &mut Transform)>,
) {
    let Some(tick) = clock.last_tick() else {
        return;
    };

    for (mut pose, mut transform) in query.iter_mut() {
        pose.integrate(
            arbiter.movement(),
            arbiter.turn(),
            tick.elapsed,
            settings.pose.pitch_limit,
        );

        let target = pose.transform();
        transform.translation = target.translation;
        transform.rotation = target.rotation;
    }
}
