//! Domain events emitted by scheduling operations.
//!
//! Events are published on an in-process broadcast channel. The
//! notification layer of the surrounding LMS subscribes to them to send
//! "your live class was scheduled" style messages.

pub mod meeting;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

pub use meeting::MeetingEvent;

/// Wrapper for domain events with metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainEvent {
    /// Unique event ID.
    pub id: Uuid,
    /// When the event occurred.
    pub timestamp: DateTime<Utc>,
    /// The event payload.
    pub payload: MeetingEvent,
}

impl DomainEvent {
    /// Create a new domain event stamped with the given time.
    pub fn new(timestamp: DateTime<Utc>, payload: MeetingEvent) -> Self {
        Self {
            id: Uuid::now_v7(),
            timestamp,
            payload,
        }
    }
}

/// Fan-out channel for [`DomainEvent`]s.
///
/// Publishing never blocks and never fails the operation that emitted the
/// event; with no subscribers the event is dropped.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<DomainEvent>,
}

impl EventBus {
    /// Create a bus buffering up to `capacity` events per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event.
    pub fn publish(&self, event: DomainEvent) {
        if self.sender.send(event).is_err() {
            tracing::trace!("No event subscribers; event dropped");
        }
    }

    /// Subscribe to future events.
    pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> {
        self.sender.subscribe()
    }
}
