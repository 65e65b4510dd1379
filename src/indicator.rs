//! Output for the on-screen drag indicators.
//!
//! The [`TouchTracker`](crate::touch::TouchTracker) never draws anything itself:
//! it queues [`IndicatorEvent`]s which the host forwards to an [`IndicatorSink`].
//! Nothing flows back from the sink into the trackers.

use bevy::{ecs::event::Event, math::Vec2};
use serde::{Deserialize, Serialize};

use crate::control::Channel;

/// A change to the visual indicator of one [`Channel`]
#[derive(Event, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum IndicatorEvent {
    /// A drag took control of the channel at `origin`
    Show {
        /// The channel whose indicator should appear
        channel: Channel,
        /// Where the controlling drag started, in tracking-area pixels
        origin: Vec2,
    },
    /// The controlling drag moved
    Update {
        /// The channel whose indicator should change
        channel: Channel,
        /// Drag direction in radians, rotated so that `0` points up the screen
        angle: f32,
        /// Drag strength, in `[0.0, 1.0]`
        magnitude: f32,
    },
    /// The channel is idle again
    Hide {
        /// The channel whose indicator should disappear
        channel: Channel,
    },
}

impl IndicatorEvent {
    /// The channel this event refers to
    #[must_use]
    pub fn channel(&self) -> Channel {
        match *self {
            IndicatorEvent::Show { channel, .. }
            | IndicatorEvent::Update { channel, .. }
            | IndicatorEvent::Hide { channel } => channel,
        }
    }
}

/// Something that can display the per-channel drag indicators
pub trait IndicatorSink {
    /// Display the indicator for `channel`, anchored at `origin`
    fn show(&mut self, channel: Channel, origin: Vec2);

    /// Point the indicator for `channel` in the direction `angle`, with strength `magnitude`
    fn update(&mut self, channel: Channel, angle: f32, magnitude: f32);

    /// Hide the indicator for `channel`
    fn hide(&mut self, channel: Channel);

    /// Dispatches a queued [`IndicatorEvent`] to the matching method
    fn apply(&mut self, event: IndicatorEvent) {
        match event {
            IndicatorEvent::Show { channel, origin } => self.show(channel, origin),
            IndicatorEvent::Update {
                channel,
                angle,
                magnitude,
            } => self.update(channel, angle, magnitude),
            IndicatorEvent::Hide { channel } => self.hide(channel),
        }
    }
}

/// Collects every event it is shown, which is handy for tests and for deferred rendering
impl IndicatorSink for Vec<IndicatorEvent> {
    fn show(&mut self, channel: Channel, origin: Vec2) {
        self.push(IndicatorEvent::Show { channel, origin });
    }

    fn update(&mut self, channel: Channel, angle: f32, magnitude: f32) {
        self.push(IndicatorEvent::Update {
            channel,
            angle,
            magnitude,
        });
    }

    fn hide(&mut self, channel: Channel) {
        self.push(IndicatorEvent::Hide { channel });
    }
}
