//! In-process domain event bus.
//!
//! A thin wrapper around `tokio::sync::broadcast`. Publishing is
//! fire-and-forget: [`EventBus::publish`] never blocks and
//! never fails. Durability comes from the persistence task subscribing
//! like any other consumer. Dropping the bus closes the channel; each
//! subscriber then drains whatever is still buffered before observing
//! `Closed`, which is how background tasks are shut down without losing
//! in-flight events.

use chrono::{DateTime, Utc};
use fixline_core::types::DbId;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// DomainEvent
// ---------------------------------------------------------------------------

/// Something that happened to a run, draft, approval, or export.
///
/// Built from a [`crate::names`] constant plus whatever context the
/// publisher has on hand:
///
/// ```rust
/// use fixline_events::bus::DomainEvent;
/// use fixline_events::names;
///
/// let event = DomainEvent::new(names::RUN_SUCCEEDED)
///     .with_source("playbook_run", 42)
///     .with_actor(7);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainEvent {
    /// Dot-separated event name, e.g. `"run.succeeded"`. Must match a
    /// seeded `event_types` row or persistence will reject it.
    pub event_type: String,

    /// Kind of the entity the event is about (e.g. `"playbook_run"`).
    pub source_entity_type: Option<String>,

    /// Database id of that entity.
    pub source_entity_id: Option<DbId>,

    /// User whose action produced the event, when there is one. Events
    /// raised by background work carry no actor.
    pub actor_user_id: Option<DbId>,

    /// Event-specific JSON details. Defaults to `{}`.
    pub payload: serde_json::Value,

    /// When the event happened. Recorded at construction time, not at
    /// persist time -- the persistence task may run arbitrarily later.
    pub occurred_at: DateTime<Utc>,
}

impl DomainEvent {
    /// Event with only a name; everything else is filled in by the
    /// `with_*` builders.
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            source_entity_type: None,
            source_entity_id: None,
            actor_user_id: None,
            payload: serde_json::Value::Object(serde_json::Map::new()),
            occurred_at: Utc::now(),
        }
    }

    /// Point the event at the entity it is about.
    pub fn with_source(mut self, entity_type: impl Into<String>, entity_id: DbId) -> Self {
        self.source_entity_type = Some(entity_type.into());
        self.source_entity_id = Some(entity_id);
        self
    }

    /// Record which user caused the event.
    pub fn with_actor(mut self, user_id: DbId) -> Self {
        self.actor_user_id = Some(user_id);
        self
    }

    /// Replace the payload with event-specific details.
    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Broadcast buffer size. A subscriber that falls more than this many
/// events behind starts losing the oldest ones (`RecvError::Lagged`).
const DEFAULT_CAPACITY: usize = 1024;

/// Fan-out hub shared as `Arc<EventBus>` between the HTTP handlers, the
/// run engine, and the persistence task. Every subscriber receives its
/// own copy of every event published after it subscribed.
pub struct EventBus {
    sender: broadcast::Sender<DomainEvent>,
}

impl EventBus {
    /// Bus with an explicit buffer capacity. Tests use small capacities
    /// to exercise lag behaviour; production code uses [`Default`].
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Deliver an event to every current subscriber.
    ///
    /// Returns how many subscribers received it. Zero is not an error:
    /// nothing in the system requires a listener to be up before work
    /// that publishes may proceed.
    pub fn publish(&self, event: DomainEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    /// Open a new subscription starting at the current position.
    pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
