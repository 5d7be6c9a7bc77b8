//! Domain layer for the product catalog.
//!
//! This crate provides:
//! - Money and Discount value objects with exact rational arithmetic
//! - The pricing function shared by the write and read paths
//! - The Product aggregate with its state machine, change tracking and events
//! - AggregateRoot and DomainEvent traits

pub mod aggregate;
pub mod discount;
pub mod error;
pub mod money;
pub mod pricing;
pub mod product;

pub use aggregate::{AggregateRoot, DomainEvent};
pub use discount::Discount;
pub use error::DomainError;
pub use money::Money;
pub use pricing::{PricingCalculator, discounted_price};
pub use product::{
    ChangeTracker, EventMeta, Field, Product, ProductEvent, ProductState, ProductStatus,
    UnknownStatus,
};

/// Result type for domain operations.
pub type Result<T> = std::result::Result<T, DomainError>;
