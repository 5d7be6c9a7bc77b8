//! Product domain events.

use chrono::{DateTime, Utc};
use common::AggregateId;
use serde::{Deserialize, Serialize};

use crate::aggregate::DomainEvent;

/// Facts shared by every product event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventMeta {
    pub aggregate_id: AggregateId,
    pub occurred_at: DateTime<Utc>,
}

/// Events raised by the product aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ProductEvent {
    /// Product was created.
    ProductCreated(EventMeta),

    /// Name, description or category changed.
    ProductUpdated(EventMeta),

    /// Product became active.
    ProductActivated(EventMeta),

    /// Product became inactive.
    ProductDeactivated(EventMeta),

    /// A discount was attached.
    DiscountApplied(EventMeta),

    /// The discount was cleared.
    DiscountRemoved(EventMeta),
}

impl ProductEvent {
    pub fn created(aggregate_id: AggregateId, occurred_at: DateTime<Utc>) -> Self {
        ProductEvent::ProductCreated(EventMeta {
            aggregate_id,
            occurred_at,
        })
    }

    pub fn updated(aggregate_id: AggregateId, occurred_at: DateTime<Utc>) -> Self {
        ProductEvent::ProductUpdated(EventMeta {
            aggregate_id,
            occurred_at,
        })
    }

    pub fn activated(aggregate_id: AggregateId, occurred_at: DateTime<Utc>) -> Self {
        ProductEvent::ProductActivated(EventMeta {
            aggregate_id,
            occurred_at,
        })
    }

    pub fn deactivated(aggregate_id: AggregateId, occurred_at: DateTime<Utc>) -> Self {
        ProductEvent::ProductDeactivated(EventMeta {
            aggregate_id,
            occurred_at,
        })
    }

    pub fn discount_applied(aggregate_id: AggregateId, occurred_at: DateTime<Utc>) -> Self {
        ProductEvent::DiscountApplied(EventMeta {
            aggregate_id,
            occurred_at,
        })
    }

    pub fn discount_removed(aggregate_id: AggregateId, occurred_at: DateTime<Utc>) -> Self {
        ProductEvent::DiscountRemoved(EventMeta {
            aggregate_id,
            occurred_at,
        })
    }

    /// The shared facts of this event.
    pub fn meta(&self) -> &EventMeta {
        match self {
            ProductEvent::ProductCreated(meta)
            | ProductEvent::ProductUpdated(meta)
            | ProductEvent::ProductActivated(meta)
            | ProductEvent::ProductDeactivated(meta)
            | ProductEvent::DiscountApplied(meta)
            | ProductEvent::DiscountRemoved(meta) => meta,
        }
    }
}

impl DomainEvent for ProductEvent {
    fn event_type(&self) -> &'static str {
        match self {
            ProductEvent::ProductCreated(_) => "product.created",
            ProductEvent::ProductUpdated(_) => "product.updated",
            ProductEvent::ProductActivated(_) => "product.activated",
            ProductEvent::ProductDeactivated(_) => "product.deactivated",
            ProductEvent::DiscountApplied(_) => "product.discount_applied",
            ProductEvent::DiscountRemoved(_) => "product.discount_removed",
        }
    }

    fn aggregate_id(&self) -> AggregateId {
        self.meta().aggregate_id
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        self.meta().occurred_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type() {
        let id = AggregateId::new();
        let at = Utc::now();

        assert_eq!(ProductEvent::created(id, at).event_type(), "product.created");
        assert_eq!(ProductEvent::updated(id, at).event_type(), "product.updated");
        assert_eq!(
            ProductEvent::activated(id, at).event_type(),
            "product.activated"
        );
        assert_eq!(
            ProductEvent::deactivated(id, at).event_type(),
            "product.deactivated"
        );
        assert_eq!(
            ProductEvent::discount_applied(id, at).event_type(),
            "product.discount_applied"
        );
        assert_eq!(
            ProductEvent::discount_removed(id, at).event_type(),
            "product.discount_removed"
        );
    }

    #[test]
    fn test_every_variant_exposes_the_shared_facts() {
        let id = AggregateId::new();
        let at = Utc::now();
        let event = ProductEvent::discount_removed(id, at);

        assert_eq!(event.aggregate_id(), id);
        assert_eq!(event.occurred_at(), at);
        assert_eq!(event.meta(), &EventMeta { aggregate_id: id, occurred_at: at });
    }

    #[test]
    fn test_event_serialization() {
        let id = AggregateId::new();
        let event = ProductEvent::activated(id, Utc::now());

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("ProductActivated"));

        let deserialized: ProductEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, event);
    }
}
