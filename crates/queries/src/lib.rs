//! Query side of the product catalog.
//!
//! Queries read flat rows from a [`store::ProductReadModel`] and never load
//! the aggregate. Effective prices are recomputed from the raw rational parts
//! with the domain's shared pricing function.

pub mod error;
pub mod handlers;
pub mod views;

pub use error::{QueryError, Result};
pub use handlers::{GetProduct, ListProducts, ProductQueries};
pub use views::{DiscountView, ProductListView, ProductView};
