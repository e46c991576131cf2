//! Named gameplay signals and the subscriber bus that delivers them.
//!
//! Systems [`post`](EventBus::post) events while they run; nothing is
//! delivered until the world calls [`dispatch`](EventBus::dispatch) at the end
//! of the frame. Subscribers are plain closures (sound, particles, UI) and the
//! core never waits on anything they do.

use std::collections::HashMap;
use std::fmt;

use burrow_ecs::entity::EntityId;
use serde::{Deserialize, Serialize};

use crate::math::Vec2;

// ---------------------------------------------------------------------------
// Event
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    PlayerJump,
    PlayerDash,
    PlayerGrounded,
    ProjectileExplosion,
}

impl EventKind {
    /// Signal name as exposed to subscribers.
    pub fn name(self) -> &'static str {
        match self {
            EventKind::PlayerJump => "player_jump",
            EventKind::PlayerDash => "player_dash",
            EventKind::PlayerGrounded => "player_grounded",
            EventKind::ProjectileExplosion => "projectile_explosion",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One emitted signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameEvent {
    pub kind: EventKind,
    /// The entity the signal is about.
    pub entity: EntityId,
    /// Entity position when the signal was raised.
    pub pos: Vec2,
    /// Entity velocity when the signal was raised.
    pub vel: Vec2,
    /// Kind-specific vector: the dash impulse, the jump impulse, or zero.
    pub vec: Vec2,
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

type Subscriber = Box<dyn FnMut(&GameEvent)>;

/// Frame-buffered publish/subscribe for [`GameEvent`]s.
#[derive(Default)]
pub struct EventBus {
    pending: Vec<GameEvent>,
    subscribers: HashMap<EventKind, Vec<Subscriber>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callback` for every future event of `kind`.
    pub fn subscribe<F>(&mut self, kind: EventKind, callback: F)
    where
        F: FnMut(&GameEvent) + 'static,
    {
        self.subscribers
            .entry(kind)
            .or_default()
            .push(Box::new(callback));
    }

    /// Queue an event for delivery at the end of the frame.
    pub fn post(&mut self, event: GameEvent) {
        tracing::debug!(event = %event.kind, entity = %event.entity, "event posted");
        self.pending.push(event);
    }

    /// Events queued so far this frame.
    pub fn pending(&self) -> &[GameEvent] {
        &self.pending
    }

    /// Deliver every queued event to its subscribers, in posting order, and
    /// return the delivered events.
    pub fn dispatch(&mut self) -> Vec<GameEvent> {
        let events = std::mem::take(&mut self.pending);
        for event in &events {
            if let Some(subscribers) = self.subscribers.get_mut(&event.kind) {
                for callback in subscribers.iter_mut() {
                    callback(event);
                }
            }
        }
        if !events.is_empty() {
            tracing::trace!(count = events.len(), "events dispatched");
        }
        events
    }

    pub fn subscriber_count(&self, kind: EventKind) -> usize {
        self.subscribers.get(&kind).map_or(0, Vec::len)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut counts: Vec<(EventKind, usize)> = self
            .subscribers
            .iter()
            .map(|(kind, subs)| (*kind, subs.len()))
            .collect();
        counts.sort_by_key(|(kind, _)| kind.name());
        f.debug_struct("EventBus")
            .field("pending", &self.pending.len())
            .field("subscribers", &counts)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
