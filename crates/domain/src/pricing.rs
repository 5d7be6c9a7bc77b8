//! Effective price computation.
//!
//! Both the aggregate and the read side price through [`discounted_price`],
//! so they share one rational computation.

use chrono::{DateTime, Utc};

use crate::{Discount, DomainError, Money, Product};

/// Applies `discount` to `base` if it is valid at `at`.
///
/// Returns `base - base * fraction`, or `base` unchanged when there is no
/// discount or it is outside its window.
pub fn discounted_price(
    base: &Money,
    discount: Option<&Discount>,
    at: DateTime<Utc>,
) -> Result<Money, DomainError> {
    match discount {
        Some(discount) if discount.is_valid_at(at) => {
            let reduction = base.multiply(&discount.as_fraction())?;
            base.subtract(&reduction)
        }
        _ => Ok(base.clone()),
    }
}

/// Stateless calculator pricing a product at a given instant.
#[derive(Debug, Clone, Copy, Default)]
pub struct PricingCalculator;

impl PricingCalculator {
    pub fn new() -> Self {
        Self
    }

    /// Returns the product's price at `at`, never mutating the product.
    pub fn effective_price(&self, product: &Product, at: DateTime<Utc>) -> Result<Money, DomainError> {
        discounted_price(product.base_price(), product.discount(), at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use common::AggregateId;
    use num_bigint::BigInt;
    use num_rational::BigRational;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn discount(percent: i64, start: DateTime<Utc>, end: DateTime<Utc>) -> Discount {
        Discount::new(BigRational::from_integer(BigInt::from(percent)), start, end).unwrap()
    }

    fn active_product(price: Money) -> Product {
        let mut product =
            Product::create(AggregateId::new(), "Book", "", "books", price, now()).unwrap();
        product.activate(now()).unwrap();
        product
    }

    #[test]
    fn test_no_discount_returns_base_price() {
        let base = Money::new(1000, 100).unwrap();
        assert_eq!(discounted_price(&base, None, now()).unwrap(), base);
    }

    #[test]
    fn test_twenty_percent_off_ten() {
        let base = Money::new(1000, 100).unwrap();
        let d = discount(20, now() - Duration::hours(1), now() + Duration::hours(1));
        let price = discounted_price(&base, Some(&d), now()).unwrap();
        assert_eq!(price.to_string(), "8.00");
    }

    #[test]
    fn test_discount_outside_window_is_ignored() {
        let base = Money::new(1999, 100).unwrap();
        let d = discount(50, now() + Duration::hours(1), now() + Duration::hours(2));
        assert_eq!(discounted_price(&base, Some(&d), now()).unwrap(), base);
    }

    #[test]
    fn test_full_discount_is_free() {
        let base = Money::new(1999, 100).unwrap();
        let d = discount(100, now(), now() + Duration::hours(1));
        assert!(discounted_price(&base, Some(&d), now()).unwrap().is_zero());
    }

    #[test]
    fn test_fractional_percent_keeps_precision() {
        // 33% of 19.99 is 6.5967, leaving 13.3933 which presents as 13.39.
        let base = Money::new(1999, 100).unwrap();
        let d = discount(33, now(), now() + Duration::hours(1));
        let price = discounted_price(&base, Some(&d), now()).unwrap();
        assert_eq!(price, Money::new(133_933, 10_000).unwrap());
        assert_eq!(price.to_string(), "13.39");
    }

    #[test]
    fn test_calculator_prices_the_aggregate() {
        let mut product = active_product(Money::new(1000, 100).unwrap());
        let d = discount(20, now(), now() + Duration::days(1));
        product.apply_discount(d, now()).unwrap();

        let calculator = PricingCalculator::new();
        assert_eq!(
            calculator.effective_price(&product, now()).unwrap().to_string(),
            "8.00"
        );
        assert_eq!(
            calculator
                .effective_price(&product, now() + Duration::days(2))
                .unwrap()
                .to_string(),
            "10.00"
        );
        assert_eq!(product.base_price().to_string(), "10.00");
    }
}
