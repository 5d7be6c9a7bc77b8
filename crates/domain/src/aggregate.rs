//! Core aggregate and domain event traits.

use chrono::{DateTime, Utc};
use common::AggregateId;
use serde::Serialize;

/// Trait for domain events.
///
/// Domain events are immutable facts raised by an aggregate. They are named
/// in the past tense and carry at least the aggregate they belong to and the
/// instant they occurred.
pub trait DomainEvent: Serialize + Send + Sync + Clone {
    /// Stable, dot-separated identifier used as the storage discriminator
    /// (e.g. `"product.created"`).
    fn event_type(&self) -> &'static str;

    /// The aggregate that raised the event.
    fn aggregate_id(&self) -> AggregateId;

    /// When the event occurred.
    fn occurred_at(&self) -> DateTime<Utc>;
}

/// An aggregate root that queues the events raised by its methods until a
/// use case pulls them for persistence.
pub trait AggregateRoot: Send + Sync {
    /// The type of events this aggregate raises.
    type Event: DomainEvent;

    /// Returns the aggregate type name.
    fn aggregate_type() -> &'static str;

    /// Returns the aggregate's identity.
    fn id(&self) -> AggregateId;

    /// Events raised since the last pull, oldest first.
    fn pending_events(&self) -> &[Self::Event];

    /// Returns the pending events and clears the queue, so each event is
    /// handed out exactly once.
    fn pull_pending_events(&mut self) -> Vec<Self::Event>;
}
