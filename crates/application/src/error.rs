//! Application-level errors

use domain::{DomainError, Identity};
use thiserror::Error;

/// Errors that can occur in the application layer
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// Domain-level error
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// A registration for this identity already exists
    #[error("Identity {0} is already registered")]
    DuplicateIdentity(Identity),

    /// Storage backend unavailable or failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// A reply could not be handed to the transport
    #[error("Delivery error: {0}")]
    Delivery(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApplicationError {
    /// Check if this error is retryable
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Storage(_))
    }

    /// Check if this error is the uniqueness conflict raised on insert
    pub const fn is_duplicate_identity(&self) -> bool {
        matches!(self, Self::DuplicateIdentity(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_errors_are_retryable() {
        assert!(ApplicationError::Storage("locked".into()).is_retryable());
        assert!(!ApplicationError::DuplicateIdentity(Identity::from(1)).is_retryable());
        assert!(!ApplicationError::Internal("bug".into()).is_retryable());
    }

    #[test]
    fn duplicate_identity_is_distinguishable() {
        let err = ApplicationError::DuplicateIdentity(Identity::from(42));
        assert!(err.is_duplicate_identity());
        assert_eq!(err.to_string(), "Identity 42 is already registered");
        assert!(!ApplicationError::Storage("x".into()).is_duplicate_identity());
    }

    #[test]
    fn domain_errors_convert() {
        let err: ApplicationError = DomainError::EmptyInput.into();
        assert!(matches!(err, ApplicationError::Domain(DomainError::EmptyInput)));
    }
}
