//! Product views returned by the query side.

use chrono::{DateTime, Utc};
use common::AggregateId;
use domain::{ProductStatus, discounted_price};
use serde::Serialize;
use store::{ProductPage, ProductRecord};

use crate::{QueryError, Result};

/// A discount that is valid at the query instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscountView {
    /// Percentage with two decimal places, e.g. `"12.50"`.
    pub percent: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// A product priced at the query instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductView {
    pub id: AggregateId,
    pub name: String,
    pub description: String,
    pub category: String,
    pub status: ProductStatus,
    pub base_price: String,
    pub effective_price: String,
    /// Present only while the discount is valid.
    pub discount: Option<DiscountView>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub archived_at: Option<DateTime<Utc>>,
}

impl ProductView {
    /// Prices a flat record at `at` with the same rational arithmetic the
    /// aggregate uses.
    pub fn from_record(record: ProductRecord, at: DateTime<Utc>) -> Result<Self> {
        let corrupt =
            |e: domain::DomainError| QueryError::CorruptRecord(format!("{}: {e}", record.id));
        let base_price = record.base_price().map_err(corrupt)?;
        let discount = record.discount().map_err(corrupt)?;
        let effective_price =
            discounted_price(&base_price, discount.as_ref(), at).map_err(corrupt)?;

        let discount = discount
            .filter(|d| d.is_valid_at(at))
            .map(|d| DiscountView {
                percent: d.percentage_display(),
                start: d.start(),
                end: d.end(),
            });

        Ok(Self {
            id: record.id,
            name: record.name,
            description: record.description,
            category: record.category,
            status: record.status,
            base_price: base_price.to_display_string(),
            effective_price: effective_price.to_display_string(),
            discount,
            created_at: record.created_at,
            updated_at: record.updated_at,
            archived_at: record.archived_at,
        })
    }
}

/// One page of priced products.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProductListView {
    pub products: Vec<ProductView>,
    pub next_page_token: Option<String>,
}

impl ProductListView {
    pub fn from_page(page: ProductPage, at: DateTime<Utc>) -> Result<Self> {
        let products = page
            .items
            .into_iter()
            .map(|record| ProductView::from_record(record, at))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            products,
            next_page_token: page.next_page_token,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap()
    }

    fn record() -> ProductRecord {
        ProductRecord {
            id: AggregateId::new(),
            name: "Kettle".into(),
            description: "1.7l".into(),
            category: "kitchen".into(),
            base_price_numerator: 1000,
            base_price_denominator: 100,
            discount_percent_numerator: Some(20),
            discount_percent_denominator: Some(1),
            discount_start_date: Some(t0()),
            discount_end_date: Some(t0() + Duration::days(1)),
            status: ProductStatus::Active,
            created_at: t0(),
            updated_at: t0(),
            archived_at: None,
        }
    }

    #[test]
    fn valid_discount_is_priced_and_shown() {
        let view = ProductView::from_record(record(), t0()).unwrap();
        assert_eq!(view.base_price, "10.00");
        assert_eq!(view.effective_price, "8.00");
        assert_eq!(view.discount.unwrap().percent, "20.00");
    }

    #[test]
    fn expired_discount_is_hidden() {
        let view = ProductView::from_record(record(), t0() + Duration::days(1)).unwrap();
        assert_eq!(view.effective_price, "10.00");
        assert_eq!(view.discount, None);
    }

    #[test]
    fn unpriceable_record_is_corrupt() {
        let mut record = record();
        record.base_price_denominator = 0;
        assert!(matches!(
            ProductView::from_record(record, t0()),
            Err(QueryError::CorruptRecord(_))
        ));
    }
}
