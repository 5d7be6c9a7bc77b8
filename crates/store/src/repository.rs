//! Storage contracts used by the command and query sides.

use async_trait::async_trait;
use common::AggregateId;
use domain::Product;

use crate::{
    ActiveProductsQuery, CommitPlan, Mutation, OutboxEvent, ProductPage, ProductRecord, Result,
    mapping,
};

/// Loads product aggregates and turns them into mutations.
///
/// Building a mutation never writes; callers add it to a [`CommitPlan`].
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Loads a product, or fails with `StoreError::NotFound`.
    async fn find_by_id(&self, id: AggregateId) -> Result<Product>;

    /// Full-row insert for a new product.
    fn insert_op(&self, product: &Product) -> Result<Mutation> {
        mapping::product_insert(product)
    }

    /// Update of the dirty columns, or `None` when the product is clean.
    /// A `None` must not be added to a plan.
    fn update_op(&self, product: &Product) -> Result<Option<Mutation>> {
        mapping::product_update(product)
    }
}

/// Turns outbox records into mutations.
pub trait OutboxRepository: Send + Sync {
    fn insert_event_op(&self, event: &OutboxEvent) -> Mutation {
        event.to_insert()
    }
}

/// Reads back outbox records.
#[async_trait]
pub trait OutboxReader: Send + Sync {
    /// Every record of one aggregate, oldest first.
    async fn events_for_aggregate(&self, aggregate_id: AggregateId) -> Result<Vec<OutboxEvent>>;
}

/// Commits a plan as one atomic unit.
#[async_trait]
pub trait PlanApplier: Send + Sync {
    /// Applies every mutation or none of them. An empty plan is a no-op.
    async fn apply(&self, plan: CommitPlan) -> Result<()>;
}

/// Query-side access to flat product rows, bypassing the aggregate.
#[async_trait]
pub trait ProductReadModel: Send + Sync {
    async fn get_by_id(&self, id: AggregateId) -> Result<ProductRecord>;

    /// Active products, newest first.
    async fn list_active(&self, query: &ActiveProductsQuery) -> Result<ProductPage>;
}
