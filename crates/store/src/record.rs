//! Flat product rows returned by the read model.

use chrono::{DateTime, Utc};
use common::AggregateId;
use domain::{Discount, DomainError, Money, ProductState, ProductStatus};
use serde::{Deserialize, Serialize};

use crate::{Result, StoreError};

/// One product row, denormalized.
///
/// Prices are kept as the raw rational parts so readers can recompute the
/// effective price exactly. The discount columns are either all set or all
/// null.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub id: AggregateId,
    pub name: String,
    pub description: String,
    pub category: String,
    pub base_price_numerator: i64,
    pub base_price_denominator: i64,
    pub discount_percent_numerator: Option<i64>,
    pub discount_percent_denominator: Option<i64>,
    pub discount_start_date: Option<DateTime<Utc>>,
    pub discount_end_date: Option<DateTime<Utc>>,
    pub status: ProductStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub archived_at: Option<DateTime<Utc>>,
}

impl ProductRecord {
    pub fn base_price(&self) -> std::result::Result<Money, DomainError> {
        Money::new(self.base_price_numerator, self.base_price_denominator)
    }

    /// The stored discount, or `None` unless all four discount columns are set.
    pub fn discount(&self) -> std::result::Result<Option<Discount>, DomainError> {
        match (
            self.discount_percent_numerator,
            self.discount_percent_denominator,
            self.discount_start_date,
            self.discount_end_date,
        ) {
            (Some(numerator), Some(denominator), Some(start), Some(end)) => {
                Discount::from_parts(numerator, denominator, start, end).map(Some)
            }
            _ => Ok(None),
        }
    }

    /// Converts the row into the state the aggregate is rehydrated from.
    pub fn into_state(self) -> Result<ProductState> {
        let corrupt = |e: DomainError| StoreError::CorruptRow(format!("product {}: {e}", self.id));
        let base_price = self.base_price().map_err(corrupt)?;
        let discount = self.discount().map_err(corrupt)?;

        Ok(ProductState {
            id: self.id,
            name: self.name,
            description: self.description,
            category: self.category,
            base_price,
            discount,
            status: self.status,
            created_at: self.created_at,
            updated_at: self.updated_at,
            archived_at: self.archived_at,
        })
    }
}

/// One page of active products.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductPage {
    pub items: Vec<ProductRecord>,

    /// Token for the next page; `None` when this page was not full.
    pub next_page_token: Option<String>,
}
