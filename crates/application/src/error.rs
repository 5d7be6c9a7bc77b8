use common::AggregateId;
use domain::DomainError;
use store::StoreError;
use thiserror::Error;

/// Errors returned by the command-side use cases.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The aggregate rejected the command.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// The product does not exist.
    #[error("Product not found: {0}")]
    NotFound(AggregateId),

    /// The product could not be loaded.
    #[error("Failed to load product: {0}")]
    Load(#[source] StoreError),

    /// The product could not be turned into a mutation.
    #[error("Failed to build commit plan: {0}")]
    Plan(#[source] StoreError),

    /// An outbox payload could not be serialized.
    #[error("Failed to build outbox event: {0}")]
    Outbox(#[from] serde_json::Error),

    /// The commit plan was not applied; nothing was written.
    #[error("Failed to apply commit plan: {0}")]
    Apply(#[source] StoreError),
}

impl CommandError {
    /// Maps a load failure, keeping not-found distinct.
    pub fn from_load(error: StoreError) -> Self {
        match error {
            StoreError::NotFound(id) => CommandError::NotFound(id),
            other => CommandError::Load(other),
        }
    }

    /// Returns true only for apply failures, the one kind worth retrying.
    pub fn is_transient(&self) -> bool {
        matches!(self, CommandError::Apply(_))
    }

    /// Short label used as the `outcome` of command metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            CommandError::Domain(_) => "rejected",
            CommandError::NotFound(_) => "not_found",
            CommandError::Load(_) => "load_failed",
            CommandError::Plan(_) => "plan_failed",
            CommandError::Outbox(_) => "outbox_failed",
            CommandError::Apply(_) => "apply_failed",
        }
    }
}

/// Result type for command operations.
pub type Result<T> = std::result::Result<T, CommandError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_is_kept_apart_from_load_failures() {
        let id = AggregateId::new();
        assert!(matches!(
            CommandError::from_load(StoreError::NotFound(id)),
            CommandError::NotFound(missing) if missing == id
        ));
        assert!(matches!(
            CommandError::from_load(StoreError::CorruptRow("x".into())),
            CommandError::Load(_)
        ));
    }

    #[test]
    fn only_apply_failures_are_transient() {
        assert!(CommandError::Apply(StoreError::Unavailable("down".into())).is_transient());
        assert!(!CommandError::Domain(DomainError::NoDiscount).is_transient());
        assert!(!CommandError::NotFound(AggregateId::new()).is_transient());
    }

    #[test]
    fn domain_errors_display_unchanged() {
        let error = CommandError::from(DomainError::OverlappingDiscount);
        assert_eq!(error.to_string(), DomainError::OverlappingDiscount.to_string());
    }
}
