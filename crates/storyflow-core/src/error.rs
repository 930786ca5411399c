//! Domain error types.

use thiserror::Error;

/// Top-level domain error type shared by every Storyflow crate.
#[derive(Debug, Error)]
pub enum DomainError {
    /// A catalog entry or player profile was not found.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The kind of entity that was looked up.
        entity: &'static str,
        /// The identifier that did not resolve.
        id: String,
    },

    /// A validation error in domain logic or in loaded content.
    #[error("validation error: {0}")]
    Validation(String),

    /// Fetching catalog data failed. Blocks entry into a story; retryable.
    #[error("catalog load failed: {0}")]
    CatalogLoad(String),

    /// Optimistic concurrency conflict on a player profile write.
    #[error("concurrency conflict on player {player_id}: expected version {expected}, found {actual}")]
    ConcurrencyConflict {
        /// The player whose profile had the conflict.
        player_id: String,
        /// The expected version.
        expected: i64,
        /// The actual version found.
        actual: i64,
    },

    /// An infrastructure/persistence error.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}

impl DomainError {
    /// Shorthand for a [`DomainError::NotFound`].
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Returns `true` when retrying the same operation may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::CatalogLoad(_) | Self::ConcurrencyConflict { .. } | Self::Infrastructure(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message_names_entity_and_id() {
        let err = DomainError::not_found("story", 42);
        assert_eq!(err.to_string(), "story not found: 42");
    }

    #[test]
    fn test_validation_is_not_retryable() {
        assert!(!DomainError::Validation("bad".into()).is_retryable());
        assert!(DomainError::CatalogLoad("timeout".into()).is_retryable());
    }
}
