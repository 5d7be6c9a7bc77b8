//! Command side of the product catalog.
//!
//! [`ProductService`] is the only writer: each use case loads a product,
//! mutates it through the aggregate, and commits the row change together with
//! its outbox events in one atomic plan.

pub mod commands;
pub mod error;
pub mod service;

pub use commands::{ApplyDiscount, CreateProduct, UpdateProduct};
pub use error::{CommandError, Result};
pub use service::ProductService;
