//! Domain error kinds.

use thiserror::Error;

/// Validation and precondition failures raised by the product aggregate and
/// its value objects.
///
/// These are returned from the method that detects them; deciding whether a
/// kind is a client error or a failed precondition is left to the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum DomainError {
    #[error("invalid product name")]
    InvalidName,

    #[error("invalid product category")]
    InvalidCategory,

    /// Zero denominator, negative amount, or a non-positive base price.
    #[error("invalid price")]
    InvalidPrice,

    #[error("invalid discount percent")]
    InvalidDiscountPercent,

    #[error("invalid discount period")]
    InvalidDiscountPeriod,

    #[error("product is not active")]
    ProductNotActive,

    #[error("product is archived")]
    ProductArchived,

    #[error("product already has an active discount")]
    OverlappingDiscount,

    #[error("product has no discount")]
    NoDiscount,
}

impl DomainError {
    /// Returns true for kinds caused by malformed input rather than by the
    /// current state of the aggregate.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            DomainError::InvalidName
                | DomainError::InvalidCategory
                | DomainError::InvalidPrice
                | DomainError::InvalidDiscountPercent
                | DomainError::InvalidDiscountPeriod
        )
    }

    /// Returns true for kinds caused by the aggregate's current state.
    pub fn is_failed_precondition(&self) -> bool {
        !self.is_invalid_argument()
    }
}
