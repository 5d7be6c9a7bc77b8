//! Exact, non-negative monetary amounts.

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{Signed, ToPrimitive, Zero};

use crate::DomainError;

/// A non-negative amount of money held as an exact rational.
///
/// Arithmetic always happens on the unrounded rational; rounding to two
/// decimal places is for presentation only.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money {
    amount: BigRational,
}

impl Money {
    /// Creates an amount of `numerator / denominator`.
    ///
    /// Fails with [`DomainError::InvalidPrice`] for a zero denominator or a
    /// negative value.
    pub fn new(numerator: i64, denominator: i64) -> Result<Self, DomainError> {
        if denominator == 0 {
            return Err(DomainError::InvalidPrice);
        }
        Self::from_ratio(BigRational::new(
            BigInt::from(numerator),
            BigInt::from(denominator),
        ))
    }

    /// Wraps an existing rational, rejecting negative values.
    pub fn from_ratio(amount: BigRational) -> Result<Self, DomainError> {
        if amount.is_negative() {
            return Err(DomainError::InvalidPrice);
        }
        Ok(Self { amount })
    }

    /// Returns zero money.
    pub fn zero() -> Self {
        Self {
            amount: BigRational::zero(),
        }
    }

    /// Returns the exact amount.
    pub fn amount(&self) -> &BigRational {
        &self.amount
    }

    /// Numerator of the amount in lowest terms.
    pub fn numerator(&self) -> &BigInt {
        self.amount.numer()
    }

    /// Denominator of the amount in lowest terms (always positive).
    pub fn denominator(&self) -> &BigInt {
        self.amount.denom()
    }

    /// Returns `(numerator, denominator)` in lowest terms when both fit in an
    /// `i64`, which is how amounts are persisted.
    pub fn to_i64_parts(&self) -> Option<(i64, i64)> {
        Some((self.numerator().to_i64()?, self.denominator().to_i64()?))
    }

    /// Returns true if the amount is strictly greater than zero.
    pub fn is_positive(&self) -> bool {
        self.amount.is_positive()
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    /// Returns `self - other`, failing with [`DomainError::InvalidPrice`]
    /// when the result would be negative.
    pub fn subtract(&self, other: &Money) -> Result<Money, DomainError> {
        Money::from_ratio(&self.amount - &other.amount)
    }

    /// Returns `self * factor`, failing with [`DomainError::InvalidPrice`]
    /// when the result would be negative.
    pub fn multiply(&self, factor: &BigRational) -> Result<Money, DomainError> {
        Money::from_ratio(&self.amount * factor)
    }

    /// Formats the amount with exactly two decimal places, rounding half away
    /// from zero (`1999/100` → `"19.99"`, `1/3` → `"0.33"`).
    pub fn to_display_string(&self) -> String {
        format_two_places(&self.amount)
    }
}

/// Formats a non-negative rational with two decimal places, rounding half
/// away from zero.
pub(crate) fn format_two_places(value: &BigRational) -> String {
    let hundred = BigInt::from(100);
    let cents = (value * BigRational::from_integer(hundred.clone()))
        .round()
        .to_integer();
    let whole = &cents / &hundred;
    let fraction = &cents % &hundred;
    format!("{whole}.{:0>2}", fraction.to_string())
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_display_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ratio(n: i64, d: i64) -> BigRational {
        BigRational::new(BigInt::from(n), BigInt::from(d))
    }

    #[test]
    fn test_money_display() {
        assert_eq!(Money::new(1999, 100).unwrap().to_string(), "19.99");
        assert_eq!(Money::new(1000, 100).unwrap().to_string(), "10.00");
        assert_eq!(Money::new(5, 100).unwrap().to_string(), "0.05");
        assert_eq!(Money::new(0, 1).unwrap().to_string(), "0.00");
        assert_eq!(Money::new(1, 3).unwrap().to_string(), "0.33");
        assert_eq!(Money::new(2, 3).unwrap().to_string(), "0.67");
        assert_eq!(Money::new(1, 200).unwrap().to_string(), "0.01");
        assert_eq!(Money::new(123_456_789, 1).unwrap().to_string(), "123456789.00");
    }

    #[test]
    fn test_money_zero_denominator_fails() {
        assert_eq!(Money::new(100, 0), Err(DomainError::InvalidPrice));
    }

    #[test]
    fn test_money_negative_fails() {
        assert_eq!(Money::new(-1, 100), Err(DomainError::InvalidPrice));
        assert_eq!(Money::new(1, -100), Err(DomainError::InvalidPrice));
    }

    #[test]
    fn test_money_two_negatives_make_a_positive() {
        let money = Money::new(-1000, -100).unwrap();
        assert_eq!(money.to_i64_parts(), Some((10, 1)));
    }

    #[test]
    fn test_money_is_kept_in_lowest_terms() {
        let money = Money::new(1000, 100).unwrap();
        assert_eq!(money.to_i64_parts(), Some((10, 1)));
        assert_eq!(money, Money::new(10, 1).unwrap());
    }

    #[test]
    fn test_money_subtract() {
        let a = Money::new(1000, 100).unwrap();
        let b = Money::new(250, 100).unwrap();
        assert_eq!(a.subtract(&b).unwrap().to_string(), "7.50");
        assert!(a.subtract(&a).unwrap().is_zero());
        assert_eq!(b.subtract(&a), Err(DomainError::InvalidPrice));
    }

    #[test]
    fn test_money_multiply() {
        let price = Money::new(1000, 100).unwrap();
        assert_eq!(price.multiply(&ratio(1, 5)).unwrap().to_string(), "2.00");
        assert_eq!(
            price.multiply(&ratio(-1, 5)),
            Err(DomainError::InvalidPrice)
        );
    }

    #[test]
    fn test_money_arithmetic_does_not_round_intermediates() {
        // 1/3 of 10.00 is 3.333..., three of them add back up to exactly 10.00.
        let price = Money::new(10, 1).unwrap();
        let third = price.multiply(&ratio(1, 3)).unwrap();
        assert_eq!(third.to_string(), "3.33");
        let rest = price.subtract(&third).unwrap().subtract(&third).unwrap();
        assert_eq!(rest, third);
    }

    #[test]
    fn test_money_operations_do_not_mutate_operands() {
        let a = Money::new(500, 100).unwrap();
        let b = Money::new(200, 100).unwrap();
        let _ = a.subtract(&b).unwrap();
        let _ = a.multiply(&ratio(1, 2)).unwrap();
        assert_eq!(a.to_string(), "5.00");
        assert_eq!(b.to_string(), "2.00");
    }

    #[test]
    fn test_money_positive_and_zero() {
        assert!(Money::new(1, 100).unwrap().is_positive());
        assert!(!Money::zero().is_positive());
        assert!(Money::default().is_zero());
    }
}
