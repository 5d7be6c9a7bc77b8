//! Query error types.

use common::AggregateId;
use store::StoreError;
use thiserror::Error;

/// Errors that can occur while answering a query.
#[derive(Debug, Error)]
pub enum QueryError {
    /// The product does not exist.
    #[error("Product not found: {0}")]
    NotFound(AggregateId),

    /// The read model failed.
    #[error("Read model error: {0}")]
    Store(StoreError),

    /// A row could not be priced.
    #[error("Corrupt product record: {0}")]
    CorruptRecord(String),
}

impl From<StoreError> for QueryError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound(id) => QueryError::NotFound(id),
            other => QueryError::Store(other),
        }
    }
}

/// Result type for query operations.
pub type Result<T> = std::result::Result<T, QueryError>;
