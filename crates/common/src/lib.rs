//! Shared identifiers and the time source used across the product catalog.

pub mod clock;
pub mod types;

pub use clock::{Clock, FixedClock, SystemClock};
pub use types::{AggregateId, ParseAggregateIdError};
