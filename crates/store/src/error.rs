use common::AggregateId;
use thiserror::Error;

/// Errors that can occur when reading from or writing to the catalog store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No product row exists for the id.
    #[error("Product not found: {0}")]
    NotFound(AggregateId),

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A serialization/deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A persisted row could not be turned back into a product or event.
    #[error("Corrupt row: {0}")]
    CorruptRow(String),

    /// A value does not fit the column it is written to.
    #[error("Value out of range: {0}")]
    OutOfRange(String),

    /// An insert hit an existing key, or an update found no row.
    #[error("Write conflict: {0}")]
    Conflict(String),

    /// The store refused the write as a whole.
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
