use bevy::math::Vec2;
use bevy_log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_EVENT_CAPACITY, DEFAULT_EVENT_LIFETIME, INACTIVE_EVENT_AGE, INACTIVE_EVENT_RADIUS,
};
use crate::error::WaterError;

/// One ripple on the surface, laid out the way the renderer consumes it.
///
/// A slot is active while `radius >= 0`. Inactive slots carry
/// [`INACTIVE_EVENT_RADIUS`] and [`INACTIVE_EVENT_AGE`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InteractionEvent {
    /// Position on the surface plane, (x, z)
    pub position: Vec2,
    pub radius: f32,
    /// Seconds since the event was triggered
    pub age: f32,
}

impl InteractionEvent {
    pub const INACTIVE: Self = Self {
        position: Vec2::ZERO,
        radius: INACTIVE_EVENT_RADIUS,
        age: INACTIVE_EVENT_AGE,
    };

    #[inline]
    pub fn is_active(&self) -> bool {
        self.radius >= 0.0
    }

    /// `[x, z, radius, age]`, the layout of one shader vector.
    pub fn to_array(&self) -> [f32; 4] {
        [self.position.x, self.position.y, self.radius, self.age]
    }
}

/// Borrowed view of the ring handed to the rendering stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EventSnapshot<'a> {
    pub events: &'a [InteractionEvent],
    /// Whether the events changed since the last published snapshot.
    pub dirty: bool,
}

/// Fixed-capacity ring of recent interaction events.
///
/// New events overwrite the oldest slot. Events expire once their age
/// reaches the maximum lifetime. The dirty flag stays raised for as long as
/// anything is active, so a consumer pushing only dirty snapshots never
/// misses an age update or an expiry.
#[derive(Debug, Clone, PartialEq)]
pub struct InteractionEventRing {
    events: Vec<InteractionEvent>,
    /// Trigger time of each slot; kept in f64 so ages stay exact on long runs
    start_times: Vec<f64>,
    next_index: usize,
    max_lifetime: f32,
    /// Something changed that has not been published yet.
    pending: bool,
    /// Result of the last `advance`.
    published: bool,
}

impl InteractionEventRing {
    /// An empty ring. A capacity of zero is raised to one.
    pub fn new(capacity: usize, max_lifetime: f32, now: f64) -> Self {
        let capacity = if capacity == 0 {
            warn!("Interaction ring capacity 0 raised to 1");
            1
        } else {
            capacity
        };
        let max_lifetime = sanitize_lifetime(max_lifetime);

        Self {
            events: vec![InteractionEvent::INACTIVE; capacity],
            start_times: vec![now - f64::from(max_lifetime + 1.0); capacity],
            next_index: 0,
            max_lifetime,
            // Start dirty so the cleared state is published once
            pending: true,
            published: true,
        }
    }

    pub fn capacity(&self) -> usize {
        self.events.len()
    }

    pub fn max_lifetime(&self) -> f32 {
        self.max_lifetime
    }

    /// Takes effect from the next `advance`.
    pub fn set_max_lifetime(&mut self, max_lifetime: f32) {
        self.max_lifetime = sanitize_lifetime(max_lifetime);
        self.pending = true;
    }

    pub fn active_count(&self) -> usize {
        self.events.iter().filter(|e| e.is_active()).count()
    }

    pub fn slot(&self, index: usize) -> Result<&InteractionEvent, WaterError> {
        self.events.get(index).ok_or(WaterError::EventSlotOutOfRange {
            index,
            capacity: self.events.len(),
        })
    }

    /// Record an event, overwriting the oldest slot.
    pub fn trigger(&mut self, position: Vec2, radius: f32, now: f64) {
        let index = self.next_index;
        self.events[index] = InteractionEvent {
            position,
            radius: radius.max(0.0),
            age: 0.0,
        };
        self.start_times[index] = now;
        self.next_index = (index + 1) % self.events.len();
        self.pending = true;
        debug!("Interaction event {} at {:?}", index, position);
    }

    /// Age every active event to `now` and expire the ones past their
    /// lifetime.
    ///
    /// Returns whether the snapshot should be pushed this frame: true when
    /// any event was aged or expired, or when something was triggered since
    /// the last call.
    pub fn advance(&mut self, now: f64) -> bool {
        let mut changed = false;
        let mut any_active = false;

        for (event, start) in self.events.iter_mut().zip(&self.start_times) {
            if !event.is_active() {
                continue;
            }

            let age = now - start;
            if age >= f64::from(self.max_lifetime) {
                *event = InteractionEvent {
                    radius: INACTIVE_EVENT_RADIUS,
                    age: INACTIVE_EVENT_AGE,
                    ..*event
                };
            } else {
                event.age = age as f32;
                any_active = true;
            }
            changed = true;
        }

        self.published = self.pending || changed;
        if self.published {
            self.pending = any_active;
        }
        self.published
    }

    pub fn snapshot(&self) -> EventSnapshot<'_> {
        EventSnapshot {
            events: &self.events,
            dirty: self.published,
        }
    }
}

impl Default for InteractionEventRing {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY, DEFAULT_EVENT_LIFETIME, 0.0)
    }
}

fn sanitize_lifetime(max_lifetime: f32) -> f32 {
    if max_lifetime > 0.0 {
        max_lifetime
    } else {
        warn!(
            "Interaction lifetime {} is not positive, using {}",
            max_lifetime, DEFAULT_EVENT_LIFETIME
        );
        DEFAULT_EVENT_LIFETIME
    }
}
