//! Transactional outbox records.

use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use common::AggregateId;
use domain::DomainEvent;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::mutation::{Mutation, Value};
use crate::schema::outbox_events as col;

/// Unique identifier for an outbox row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(Uuid);

impl EventId {
    /// Creates a new random event ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates an event ID from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Delivery status of an outbox row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutboxStatus {
    /// Written with the state change, not yet relayed.
    #[default]
    Pending,

    /// Relayed downstream.
    Processed,
}

impl OutboxStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutboxStatus::Pending => "PENDING",
            OutboxStatus::Processed => "PROCESSED",
        }
    }
}

impl std::fmt::Display for OutboxStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutboxStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(OutboxStatus::Pending),
            "PROCESSED" => Ok(OutboxStatus::Processed),
            other => Err(format!("unknown outbox status: {other}")),
        }
    }
}

/// The serialized facts of a domain event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboxPayload {
    pub aggregate_id: AggregateId,
    pub event_type: String,
    /// RFC 3339 with nanoseconds, UTC.
    pub occurred_at: String,
}

impl OutboxPayload {
    pub fn from_event<E: DomainEvent>(event: &E) -> Self {
        Self {
            aggregate_id: event.aggregate_id(),
            event_type: event.event_type().to_string(),
            occurred_at: event
                .occurred_at()
                .to_rfc3339_opts(SecondsFormat::Nanos, true),
        }
    }
}

/// A domain event in its persisted, relayable shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboxEvent {
    /// Unique identifier, generated when the record is built.
    pub event_id: EventId,

    /// Dot-separated event type, e.g. `"product.discount_applied"`.
    pub event_type: String,

    /// The aggregate that raised the event.
    pub aggregate_id: AggregateId,

    /// The event facts as JSON.
    pub payload: serde_json::Value,

    pub status: OutboxStatus,

    /// When the record was built.
    pub created_at: DateTime<Utc>,

    /// When the relay picked it up; `None` while pending.
    pub processed_at: Option<DateTime<Utc>>,
}

impl OutboxEvent {
    /// Creates a new outbox event builder.
    pub fn builder() -> OutboxEventBuilder {
        OutboxEventBuilder::default()
    }

    /// Builds a pending record for `event`.
    pub fn from_domain_event<E: DomainEvent>(
        event: &E,
        now: DateTime<Utc>,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self {
            event_id: EventId::new(),
            event_type: event.event_type().to_string(),
            aggregate_id: event.aggregate_id(),
            payload: serde_json::to_value(OutboxPayload::from_event(event))?,
            status: OutboxStatus::Pending,
            created_at: now,
            processed_at: None,
        })
    }

    /// The full-row insert for this record.
    pub fn to_insert(&self) -> Mutation {
        Mutation::insert(
            col::TABLE,
            vec![
                (col::EVENT_ID, Value::uuid(self.event_id.as_uuid())),
                (col::EVENT_TYPE, Value::text(self.event_type.as_str())),
                (col::AGGREGATE_ID, Value::uuid(self.aggregate_id.as_uuid())),
                (col::PAYLOAD, Value::Json(self.payload.clone())),
                (col::STATUS, Value::text(self.status.as_str())),
                (col::CREATED_AT, Value::timestamp(self.created_at)),
                (col::PROCESSED_AT, Value::Timestamp(self.processed_at)),
            ],
        )
    }
}

/// Builder for constructing outbox events.
#[derive(Debug, Default)]
pub struct OutboxEventBuilder {
    event_id: Option<EventId>,
    event_type: Option<String>,
    aggregate_id: Option<AggregateId>,
    payload: Option<serde_json::Value>,
    status: OutboxStatus,
    created_at: Option<DateTime<Utc>>,
    processed_at: Option<DateTime<Utc>>,
}

impl OutboxEventBuilder {
    /// Sets the event ID. If not set, a new ID will be generated.
    pub fn event_id(mut self, id: EventId) -> Self {
        self.event_id = Some(id);
        self
    }

    pub fn event_type(mut self, event_type: impl Into<String>) -> Self {
        self.event_type = Some(event_type.into());
        self
    }

    pub fn aggregate_id(mut self, id: AggregateId) -> Self {
        self.aggregate_id = Some(id);
        self
    }

    /// Sets the payload from a raw JSON value.
    pub fn payload_raw(mut self, payload: serde_json::Value) -> Self {
        self.payload = Some(payload);
        self
    }

    pub fn status(mut self, status: OutboxStatus) -> Self {
        self.status = status;
        self
    }

    pub fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    pub fn processed_at(mut self, processed_at: DateTime<Utc>) -> Self {
        self.processed_at = Some(processed_at);
        self
    }

    /// Tries to build the record, returning None if the type, aggregate or
    /// payload is missing.
    pub fn try_build(self, now: DateTime<Utc>) -> Option<OutboxEvent> {
        Some(OutboxEvent {
            event_id: self.event_id.unwrap_or_default(),
            event_type: self.event_type?,
            aggregate_id: self.aggregate_id?,
            payload: self.payload?,
            status: self.status,
            created_at: self.created_at.unwrap_or(now),
            processed_at: self.processed_at,
        })
    }
}

/// Builds one pending outbox record per event, in order.
///
/// An empty slice yields an empty vector.
pub fn build_outbox_events<E: DomainEvent>(
    events: &[E],
    now: DateTime<Utc>,
) -> Result<Vec<OutboxEvent>, serde_json::Error> {
    events
        .iter()
        .map(|event| OutboxEvent::from_domain_event(event, now))
        .collect()
}
