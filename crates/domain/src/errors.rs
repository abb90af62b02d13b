//! Domain-level errors

use thiserror::Error;

use crate::dialog::ValidationFailure;

/// Errors that can occur in the domain layer
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// Input was empty or contained only whitespace
    #[error("Input is empty")]
    EmptyInput,

    /// Identity could not be parsed
    #[error("Invalid identity: {0}")]
    InvalidIdentity(String),

    /// Language code is not one of the supported codes
    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    /// Invalid phone number format
    #[error("Invalid phone number: {0}")]
    InvalidPhoneNumber(String),

    /// Invalid postal address
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Child name is not exactly a given name and a surname
    #[error("Invalid child name: {0}")]
    InvalidChildName(String),

    /// Requested child count is outside the accepted range
    #[error("Invalid child count: {0}")]
    InvalidChildCount(u8),

    /// Slot date, time or selection key could not be parsed
    #[error("Invalid slot: {0}")]
    InvalidSlot(String),

    /// A registration was requested before every field was collected
    #[error("Registration is incomplete: missing {0}")]
    IncompleteRegistration(&'static str),
}

impl DomainError {
    /// Map a validation error to the structured failure reported to users
    ///
    /// Returns `None` for errors that are not the result of user input.
    pub const fn validation_failure(&self) -> Option<ValidationFailure> {
        match self {
            Self::EmptyInput => Some(ValidationFailure::EmptyInput),
            Self::InvalidPhoneNumber(_) => Some(ValidationFailure::InvalidPhoneNumber),
            Self::InvalidAddress(_) => Some(ValidationFailure::InvalidAddress),
            Self::InvalidChildName(_) => Some(ValidationFailure::IncompleteChildName),
            Self::InvalidChildCount(_) => Some(ValidationFailure::InvalidChildCount),
            Self::InvalidIdentity(_)
            | Self::UnsupportedLanguage(_)
            | Self::InvalidSlot(_)
            | Self::IncompleteRegistration(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_phone_error_message() {
        let err = DomainError::InvalidPhoneNumber("123".to_string());
        assert_eq!(err.to_string(), "Invalid phone number: 123");
    }

    #[test]
    fn incomplete_registration_message() {
        let err = DomainError::IncompleteRegistration("address");
        assert_eq!(err.to_string(), "Registration is incomplete: missing address");
    }

    #[test]
    fn input_errors_map_to_validation_failures() {
        assert_eq!(
            DomainError::EmptyInput.validation_failure(),
            Some(ValidationFailure::EmptyInput)
        );
        assert_eq!(
            DomainError::InvalidAddress("x".into()).validation_failure(),
            Some(ValidationFailure::InvalidAddress)
        );
        assert_eq!(
            DomainError::InvalidChildCount(7).validation_failure(),
            Some(ValidationFailure::InvalidChildCount)
        );
    }

    #[test]
    fn internal_errors_have_no_validation_failure() {
        assert!(DomainError::InvalidSlot("x".into()).validation_failure().is_none());
        assert!(
            DomainError::IncompleteRegistration("phone")
                .validation_failure()
                .is_none()
        );
    }
}
