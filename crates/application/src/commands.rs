//! Product commands.

use chrono::{DateTime, Utc};
use common::AggregateId;

/// Command to create a new product.
#[derive(Debug, Clone)]
pub struct CreateProduct {
    /// The product ID to create.
    pub product_id: AggregateId,
    pub name: String,
    pub description: String,
    pub category: String,
    /// Base price as `price_numerator / price_denominator`.
    pub price_numerator: i64,
    pub price_denominator: i64,
}

impl CreateProduct {
    /// Creates a new CreateProduct command with a generated product ID.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        category: impl Into<String>,
        price_numerator: i64,
        price_denominator: i64,
    ) -> Self {
        Self {
            product_id: AggregateId::new(),
            name: name.into(),
            description: description.into(),
            category: category.into(),
            price_numerator,
            price_denominator,
        }
    }

    /// Uses a caller-chosen product ID.
    pub fn with_id(mut self, product_id: AggregateId) -> Self {
        self.product_id = product_id;
        self
    }
}

/// Command to replace a product's name, description and category.
#[derive(Debug, Clone)]
pub struct UpdateProduct {
    pub product_id: AggregateId,
    pub name: String,
    pub description: String,
    pub category: String,
}

impl UpdateProduct {
    pub fn new(
        product_id: AggregateId,
        name: impl Into<String>,
        description: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            product_id,
            name: name.into(),
            description: description.into(),
            category: category.into(),
        }
    }
}

/// Command to attach a discount to an active product.
#[derive(Debug, Clone)]
pub struct ApplyDiscount {
    pub product_id: AggregateId,

    /// Decimal percentage, e.g. `"20"` or `"12.5"`.
    pub percent: String,

    /// Start of the validity window (inclusive).
    pub start: DateTime<Utc>,

    /// End of the validity window (exclusive).
    pub end: DateTime<Utc>,
}

impl ApplyDiscount {
    pub fn new(
        product_id: AggregateId,
        percent: impl Into<String>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Self {
        Self {
            product_id,
            percent: percent.into(),
            start,
            end,
        }
    }
}
