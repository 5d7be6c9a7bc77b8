//! Storage side of the product catalog.
//!
//! Use cases never write directly. They turn aggregates and outbox records
//! into [`Mutation`]s, collect them in a [`CommitPlan`] and hand the plan to a
//! [`PlanApplier`], which commits it atomically. Two backends implement every
//! contract: [`InMemoryStore`] and [`PostgresStore`].

pub mod error;
pub mod mapping;
pub mod memory;
pub mod mutation;
pub mod outbox;
pub mod postgres;
pub mod query;
pub mod record;
pub mod repository;
pub mod schema;

pub use common::AggregateId;
pub use error::{Result, StoreError};
pub use memory::InMemoryStore;
pub use mutation::{CommitPlan, Mutation, MutationKind, Value};
pub use outbox::{
    EventId, OutboxEvent, OutboxEventBuilder, OutboxPayload, OutboxStatus, build_outbox_events,
};
pub use postgres::PostgresStore;
pub use query::{ActiveProductsQuery, DEFAULT_PAGE_SIZE};
pub use record::{ProductPage, ProductRecord};
pub use repository::{
    OutboxReader, OutboxRepository, PlanApplier, ProductReadModel, ProductRepository,
};
