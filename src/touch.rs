//! Tracks touch contacts and turns drags into movement or look control.
//!
//! Each contact starts [`Classification::Unclassified`].
//! Once it strays further than [`TouchSettings::min_drag_distance`] from its origin it becomes a drag,
//! and is assigned to a [`Channel`] based on where on the tracking area it started:
//!
//! - the left side (up to the center band) controls [`Channel::Movement`]
//! - the right side (from the center band on) controls [`Channel::Look`]
//! - inside the center band, the initial direction of the drag decides:
//!   rightward drags look, leftward drags move
//!
//! The first drag classified on a channel becomes its control touch.
//! Later drags on the same channel are tracked, but have no effect until the control touch is lifted.
//! At that point the earliest-classified remaining drag on the channel takes over,
//! rather than staying inert until it is lifted and placed again.
//!
//! A contact released before it ever became a drag, and within [`TouchSettings::max_tap_duration`]
//! of landing, is a [`Classification::Tap`].
//! A contact held still for longer is released as it was, [`Classification::Unclassified`].

use std::{f32::consts::FRAC_PI_2, time::Duration};

use bevy::{
    log::{debug, trace},
    math::Vec2,
    prelude::Resource,
    reflect::Reflect,
    utils::HashMap,
};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::{control::Channel, indicator::IndicatorEvent, settings::TouchSettings};

/// The platform-provided identifier of a touch contact
///
/// Identifiers are only unique among simultaneously active contacts,
/// and may be reused by the platform after a contact ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Reflect)]
pub struct ContactId(pub u64);

/// What a [`Contact`] has turned out to be
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Reflect)]
pub enum Classification {
    /// The contact has not moved far enough to count as a drag
    Unclassified,
    /// The contact was released quickly, without ever becoming a drag
    Tap,
    /// The contact is a drag assigned to the given channel
    Drag(Channel),
}

/// A single touch point, from the moment it lands until it is lifted, cancelled or invalidated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Reflect)]
pub struct Contact {
    id: ContactId,
    origin: Vec2,
    position: Vec2,
    started_at: Duration,
    distance: f32,
    angle: f32,
    magnitude: f32,
    classification: Classification,
    /// Order in which this contact became a drag, used to hand over control
    drag_order: u64,
    /// Has this contact moved since the arbiter last sampled it?
    updated: bool,
}

impl Contact {
    fn new(id: ContactId, origin: Vec2, started_at: Duration) -> Self {
        Self {
            id,
            origin,
            position: origin,
            started_at,
            distance: 0.0,
            angle: 0.0,
            magnitude: 0.0,
            classification: Classification::Unclassified,
            drag_order: 0,
            updated: false,
        }
    }

    /// The platform identifier of this contact
    #[must_use]
    #[inline]
    pub fn id(&self) -> ContactId {
        self.id
    }

    /// Where the contact first landed, in tracking-area pixels
    #[must_use]
    #[inline]
    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    /// Where the contact currently is, in tracking-area pixels
    #[must_use]
    #[inline]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// When the contact landed, on the clock passed to [`TouchTracker::on_contact_start`]
    #[must_use]
    #[inline]
    pub fn started_at(&self) -> Duration {
        self.started_at
    }

    /// Straight-line distance travelled from the origin, in pixels
    #[must_use]
    #[inline]
    pub fn distance(&self) -> f32 {
        self.distance
    }

    /// Direction from the origin to the current position, in screen space (y grows downward)
    ///
    /// This is `atan2(dy, dx)`, so `0` points right and `-PI/2` points up.
    #[must_use]
    #[inline]
    pub fn angle(&self) -> f32 {
        self.angle
    }

    /// The drag distance remapped into `[0.0, 1.0]`
    #[must_use]
    #[inline]
    pub fn magnitude(&self) -> f32 {
        self.magnitude
    }

    /// What this contact has been classified as
    #[must_use]
    #[inline]
    pub fn classification(&self) -> Classification {
        self.classification
    }

    /// The channel this contact is dragging on, if it is a drag
    #[must_use]
    #[inline]
    pub fn channel(&self) -> Option<Channel> {
        match self.classification {
            Classification::Drag(channel) => Some(channel),
            _ => None,
        }
    }

    fn indicator_update(&self, channel: Channel) -> IndicatorEvent {
        IndicatorEvent::Update {
            channel,
            angle: self.angle + FRAC_PI_2,
            magnitude: self.magnitude,
        }
    }
}

/// Owns every in-progress [`Contact`] and decides which of them control each [`Channel`]
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct TouchTracker {
    settings: TouchSettings,
    area_width: f32,
    listening: bool,
    contacts: HashMap<ContactId, Contact>,
    control: [Option<ContactId>; 2],
    next_drag_order: u64,
    indicator_events: Vec<IndicatorEvent>,
}

impl Default for TouchTracker {
    fn default() -> Self {
        Self::new(TouchSettings::default(), 0.0)
    }
}

#[inline]
fn slot(channel: Channel) -> usize {
    match channel {
        Channel::Movement => 0,
        Channel::Look => 1,
    }
}

impl TouchTracker {
    /// Creates a listening tracker for a tracking area `area_width` pixels wide
    #[must_use]
    pub fn new(settings: TouchSettings, area_width: f32) -> Self {
        Self {
            settings,
            area_width,
            listening: true,
            contacts: HashMap::default(),
            control: [None; 2],
            next_drag_order: 0,
            indicator_events: Vec::new(),
        }
    }

    /// The thresholds used to classify contacts
    #[must_use]
    pub fn settings(&self) -> &TouchSettings {
        &self.settings
    }

    /// Replaces the thresholds used to classify contacts
    ///
    /// Contacts that were already classified keep their classification.
    pub fn set_settings(&mut self, settings: TouchSettings) {
        self.settings = settings;
    }

    /// The current width of the tracking area, in pixels
    #[must_use]
    pub fn area_width(&self) -> f32 {
        self.area_width
    }

    /// Is the tracker currently accepting contact events?
    #[must_use]
    pub fn is_listening(&self) -> bool {
        self.listening
    }

    /// Starts accepting contact events
    pub fn start_listening(&mut self) {
        self.listening = true;
    }

    /// Stops accepting contact events, discarding every in-progress contact
    pub fn stop_listening(&mut self) {
        if !self.listening {
            return;
        }

        self.invalidate_all();
        self.listening = false;
    }

    /// Looks up an active contact
    #[must_use]
    pub fn contact(&self, id: ContactId) -> Option<&Contact> {
        self.contacts.get(&id)
    }

    /// Iterates over all active contacts, in no particular order
    pub fn contacts(&self) -> impl Iterator<Item = &Contact> {
        self.contacts.values()
    }

    /// The contact currently controlling `channel`, if any
    #[must_use]
    pub fn control_touch(&self, channel: Channel) -> Option<&Contact> {
        self.control[slot(channel)].and_then(|id| self.contacts.get(&id))
    }

    /// Registers a new unclassified contact that landed at `position` at time `now`
    ///
    /// Returns `false` if the event was ignored,
    /// either because the tracker is not listening or because `id` is already active.
    pub fn on_contact_start(&mut self, id: ContactId, position: Vec2, now: Duration) -> bool {
        if !self.listening {
            return false;
        }

        if self.contacts.contains_key(&id) {
            trace!("Ignoring duplicate start for touch contact {id:?}");
            return false;
        }

        self.contacts.insert(id, Contact::new(id, position, now));
        true
    }

    /// Moves an active contact to `position`, classifying it as a drag once it strays far enough
    ///
    /// Unknown identifiers are ignored.
    pub fn on_contact_move(&mut self, id: ContactId, position: Vec2) {
        if !self.listening {
            return;
        }

        let settings = self.settings;
        let Some(contact) = self.contacts.get_mut(&id) else {
            return;
        };

        let delta = position - contact.origin;
        contact.position = position;
        contact.distance = delta.length();
        contact.angle = delta.y.atan2(delta.x);
        contact.magnitude = settings.normalize_distance(contact.distance);

        if contact.classification == Classification::Unclassified
            && contact.distance > settings.min_drag_distance
        {
            self.start_drag(id);
        }

        let Some(contact) = self.contacts.get_mut(&id) else {
            return;
        };

        if let Classification::Drag(channel) = contact.classification {
            if self.control[slot(channel)] == Some(id) {
                contact.updated = true;
            }
        }
    }

    /// Lifts an active contact at time `now`, returning its final state
    ///
    /// A contact that never became a drag is returned as a [`Classification::Tap`],
    /// unless it was held for longer than [`TouchSettings::max_tap_duration`].
    /// Unknown identifiers are ignored and return `None`.
    pub fn on_contact_end(&mut self, id: ContactId, now: Duration) -> Option<Contact> {
        let max_tap_duration = self.settings.max_tap_duration;
        let mut contact = self.remove_contact(id, true)?;
        if contact.classification == Classification::Unclassified
            && now.saturating_sub(contact.started_at) <= max_tap_duration
        {
            contact.classification = Classification::Tap;
        }

        Some(contact)
    }

    /// Cancels an active contact, returning its final state
    ///
    /// Unlike [`TouchTracker::on_contact_end`], a cancelled contact is never a tap.
    pub fn on_contact_cancel(&mut self, id: ContactId) -> Option<Contact> {
        self.remove_contact(id, true)
    }

    /// The tracking area changed size: every in-progress contact is discarded
    ///
    /// The screen-side boundaries depend on the width,
    /// so gestures that started under the old geometry can no longer be classified reliably.
    pub fn on_tracking_area_resized(&mut self, width: f32) {
        self.area_width = width;
        if !self.listening {
            return;
        }

        self.invalidate_all();
    }

    /// Ends every active contact without promoting any remaining drags
    pub fn invalidate_all(&mut self) {
        if self.contacts.is_empty() {
            return;
        }

        debug!("Invalidating {} touch contacts", self.contacts.len());

        let ids = self.contacts.keys().copied().sorted().collect_vec();
        for id in ids {
            self.remove_contact(id, false);
        }
    }

    /// Drains the indicator changes queued since the last call
    pub fn drain_indicator_events(&mut self) -> std::vec::Drain<'_, IndicatorEvent> {
        self.indicator_events.drain(..)
    }

    /// Reads the control touch of `channel` for the current tick
    ///
    /// Returns the control touch's angle (rotated by `PI/2`, so `0` points up the screen)
    /// and normalized magnitude.
    /// If the control touch moved since the previous sample, an indicator update is queued
    /// and the touch is marked as read.
    pub(crate) fn sample_channel(&mut self, channel: Channel) -> Option<(f32, f32)> {
        let id = self.control[slot(channel)]?;
        let contact = self.contacts.get_mut(&id)?;

        if contact.updated {
            contact.updated = false;
            self.indicator_events.push(contact.indicator_update(channel));
        }

        Some((contact.angle + FRAC_PI_2, contact.magnitude))
    }

    fn start_drag(&mut self, id: ContactId) {
        let channel = {
            let Some(contact) = self.contacts.get(&id) else {
                return;
            };
            self.channel_for_drag(contact.origin, contact.angle)
        };

        let drag_order = self.next_drag_order;
        self.next_drag_order += 1;

        if let Some(contact) = self.contacts.get_mut(&id) {
            contact.classification = Classification::Drag(channel);
            contact.drag_order = drag_order;
        }

        if self.control[slot(channel)].is_none() {
            debug!("Touch contact {id:?} took control of {channel:?}");
            self.grant_control(id, channel);
        } else {
            trace!("Touch contact {id:?} is dragging on {channel:?}, which is already controlled");
        }
    }

    fn channel_for_drag(&self, origin: Vec2, initial_angle: f32) -> Channel {
        let half_width = self.area_width / 2.0;
        let band = self.area_width * self.settings.center_band;
        let left_boundary = half_width - band;
        let right_boundary = half_width + band;

        if origin.x <= left_boundary {
            Channel::Movement
        } else if origin.x >= right_boundary {
            Channel::Look
        } else if (-FRAC_PI_2..=FRAC_PI_2).contains(&initial_angle) {
            Channel::Look
        } else {
            Channel::Movement
        }
    }

    fn grant_control(&mut self, id: ContactId, channel: Channel) {
        let Some(contact) = self.contacts.get_mut(&id) else {
            return;
        };

        self.control[slot(channel)] = Some(id);
        contact.updated = true;
        self.indicator_events.push(IndicatorEvent::Show {
            channel,
            origin: contact.origin,
        });
    }

    fn remove_contact(&mut self, id: ContactId, promote: bool) -> Option<Contact> {
        if !self.listening {
            return None;
        }

        let mut contact = self.contacts.remove(&id)?;
        contact.updated = false;

        let Some(channel) = contact.channel() else {
            return Some(contact);
        };

        if self.control[slot(channel)] != Some(id) {
            return Some(contact);
        }

        self.control[slot(channel)] = None;
        self.indicator_events.push(IndicatorEvent::Hide { channel });
        debug!("Touch contact {id:?} released control of {channel:?}");

        if promote {
            let successor = self
                .contacts
                .values()
                .filter(|other| other.channel() == Some(channel))
                .min_by_key(|other| other.drag_order)
                .map(Contact::id);

            if let Some(successor) = successor {
                debug!("Touch contact {successor:?} took over control of {channel:?}");
                self.grant_control(successor, channel);
            }
        }

        Some(contact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker() -> TouchTracker {
        TouchTracker::new(TouchSettings::default(), 1000.0)
    }

    #[test]
    fn small_moves_stay_unclassified() {
        let mut touch = tracker();
        touch.on_contact_start(ContactId(1), Vec2::new(100.0, 100.0), Duration::ZERO);
        touch.on_contact_move(ContactId(1), Vec2::new(106.0, 108.0));

        let contact = touch.contact(ContactId(1)).unwrap();
        assert_eq!(contact.distance(), 10.0);
        assert_eq!(contact.magnitude(), 0.0);
        assert_eq!(contact.classification(), Classification::Unclassified);
    }

    #[test]
    fn grant_marks_the_control_touch_updated() {
        let mut touch = tracker();
        touch.on_contact_start(ContactId(1), Vec2::new(100.0, 500.0), Duration::ZERO);
        touch.on_contact_move(ContactId(1), Vec2::new(100.0, 400.0));

        let (angle, magnitude) = touch.sample_channel(Channel::Movement).unwrap();
        // Straight up the screen
        assert!(angle.abs() < 1e-6);
        assert!((magnitude - 1.0).abs() < 1e-6);

        // Sampling again without movement does not repeat the indicator update
        touch.sample_channel(Channel::Movement).unwrap();
        let updates = touch
            .drain_indicator_events()
            .filter(|event| matches!(event, IndicatorEvent::Update { .. }))
            .count();
        assert_eq!(updates, 1);
    }

    #[test]
    fn stopping_discards_contacts() {
        let mut touch = tracker();
        touch.on_contact_start(ContactId(1), Vec2::new(10.0, 10.0), Duration::ZERO);
        touch.stop_listening();

        assert!(touch.contact(ContactId(1)).is_none());
        assert!(!touch.on_contact_start(ContactId(2), Vec2::ZERO, Duration::ZERO));

        touch.start_listening();
        assert!(touch.on_contact_start(ContactId(2), Vec2::ZERO, Duration::ZERO));
    }
}
