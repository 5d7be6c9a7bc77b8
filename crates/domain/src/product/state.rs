//! Product lifecycle states.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The lifecycle status of a product.
///
/// State transitions:
/// ```text
/// Inactive ◄──► Active
///     │            │
///     └─────┬──────┘
///           ▼
///       Archived  (terminal; re-archiving is a no-op)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductStatus {
    /// Newly created or deactivated; not sellable.
    #[default]
    Inactive,

    /// Sellable; discounts may be applied.
    Active,

    /// Retired (terminal state).
    Archived,
}

impl ProductStatus {
    /// Returns true if business mutations are allowed in this state.
    pub fn can_mutate(&self) -> bool {
        !self.is_terminal()
    }

    /// Returns true if a discount may be applied in this state.
    pub fn can_apply_discount(&self) -> bool {
        matches!(self, ProductStatus::Active)
    }

    /// Returns true if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ProductStatus::Archived)
    }

    /// Returns the persisted name of the state.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductStatus::Inactive => "INACTIVE",
            ProductStatus::Active => "ACTIVE",
            ProductStatus::Archived => "ARCHIVED",
        }
    }
}

impl std::fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Returned when a persisted status string is not a known state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown product status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for ProductStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "INACTIVE" => Ok(ProductStatus::Inactive),
            "ACTIVE" => Ok(ProductStatus::Active),
            "ARCHIVED" => Ok(ProductStatus::Archived),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state_is_inactive() {
        assert_eq!(ProductStatus::default(), ProductStatus::Inactive);
    }

    #[test]
    fn test_only_archived_is_terminal() {
        assert!(!ProductStatus::Inactive.is_terminal());
        assert!(!ProductStatus::Active.is_terminal());
        assert!(ProductStatus::Archived.is_terminal());
        assert!(ProductStatus::Active.can_mutate());
        assert!(!ProductStatus::Archived.can_mutate());
    }

    #[test]
    fn test_only_active_accepts_discounts() {
        assert!(!ProductStatus::Inactive.can_apply_discount());
        assert!(ProductStatus::Active.can_apply_discount());
        assert!(!ProductStatus::Archived.can_apply_discount());
    }

    #[test]
    fn test_round_trips_through_its_name() {
        for status in [
            ProductStatus::Inactive,
            ProductStatus::Active,
            ProductStatus::Archived,
        ] {
            assert_eq!(status.as_str().parse::<ProductStatus>(), Ok(status));
        }
        assert_eq!(
            "DELETED".parse::<ProductStatus>(),
            Err(UnknownStatus("DELETED".to_string()))
        );
    }

    #[test]
    fn test_serializes_as_persisted_name() {
        let json = serde_json::to_string(&ProductStatus::Archived).unwrap();
        assert_eq!(json, "\"ARCHIVED\"");
    }
}
