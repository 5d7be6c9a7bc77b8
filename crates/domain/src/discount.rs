//! Time-bounded percentage discounts.

use std::str::FromStr;

use chrono::{DateTime, TimeZone, Utc};
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{Signed, ToPrimitive};
use rust_decimal::Decimal;

use crate::DomainError;

/// A percentage-off discount valid within the half-open window `[start, end)`.
///
/// Immutable once built; every constructor validates the percentage and the
/// window.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Discount {
    percentage: BigRational,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl Discount {
    /// Creates a discount of `percentage` percent (e.g. `20` for 20%).
    ///
    /// Fails with [`DomainError::InvalidDiscountPercent`] unless the
    /// percentage is in `(0, 100]` and its reduced parts fit an `i64`, and
    /// with
    /// [`DomainError::InvalidDiscountPeriod`] unless `end` is after `start`.
    /// Both instants are normalised to UTC.
    pub fn new<Tz: TimeZone>(
        percentage: BigRational,
        start: DateTime<Tz>,
        end: DateTime<Tz>,
    ) -> Result<Self, DomainError> {
        let hundred = BigRational::from_integer(BigInt::from(100));
        if !percentage.is_positive() || percentage > hundred {
            return Err(DomainError::InvalidDiscountPercent);
        }
        if percentage.numer().to_i64().is_none() || percentage.denom().to_i64().is_none() {
            return Err(DomainError::InvalidDiscountPercent);
        }
        let start = start.with_timezone(&Utc);
        let end = end.with_timezone(&Utc);
        if end <= start {
            return Err(DomainError::InvalidDiscountPeriod);
        }
        Ok(Self {
            percentage,
            start,
            end,
        })
    }

    /// Creates a discount from a persisted `numerator / denominator`
    /// percentage.
    pub fn from_parts(
        numerator: i64,
        denominator: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if denominator == 0 {
            return Err(DomainError::InvalidDiscountPercent);
        }
        let percentage = BigRational::new(BigInt::from(numerator), BigInt::from(denominator));
        Self::new(percentage, start, end)
    }

    /// Parses a decimal percentage such as `"20"` or `"12.5"` exactly.
    pub fn parse_percentage(input: &str) -> Result<BigRational, DomainError> {
        let decimal =
            Decimal::from_str(input.trim()).map_err(|_| DomainError::InvalidDiscountPercent)?;
        let scale = BigInt::from(10).pow(decimal.scale());
        Ok(BigRational::new(BigInt::from(decimal.mantissa()), scale))
    }

    /// The percentage, e.g. `20` for 20%.
    pub fn percentage(&self) -> &BigRational {
        &self.percentage
    }

    /// Returns the percentage as `(numerator, denominator)` in lowest terms
    /// when both fit in an `i64`.
    pub fn percentage_parts(&self) -> Option<(i64, i64)> {
        Some((
            self.percentage.numer().to_i64()?,
            self.percentage.denom().to_i64()?,
        ))
    }

    /// The percentage with two decimal places (`25/2` → `"12.50"`).
    pub fn percentage_display(&self) -> String {
        crate::money::format_two_places(&self.percentage)
    }

    /// Start of the validity window (inclusive).
    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// End of the validity window (exclusive).
    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Returns true if `start <= instant < end`.
    pub fn is_valid_at(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }

    /// The percentage as a fraction of one (20% → 1/5).
    pub fn as_fraction(&self) -> BigRational {
        &self.percentage / BigRational::from_integer(BigInt::from(100))
    }
}
