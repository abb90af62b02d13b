//! Phone number value object with Moldovan local-number validation

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// International dialling prefix accepted in front of the subscriber number
const COUNTRY_PREFIX: &str = "+373";

/// Trunk prefix used for numbers dialled domestically
const TRUNK_PREFIX: &str = "0";

/// Number of digits following either prefix
const SUBSCRIBER_DIGITS: usize = 8;

/// A validated phone number in local (`0XXXXXXXX`) or international
/// (`+373XXXXXXXX`) form
///
/// The number is stored exactly as the applicant typed it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PhoneNumber {
    value: String,
}

impl PhoneNumber {
    /// Create a new phone number
    ///
    /// Accepted forms:
    /// - `+373` followed by exactly 8 digits
    /// - `0` followed by exactly 8 digits
    pub fn new(number: impl Into<String>) -> Result<Self, DomainError> {
        let value = number.into();

        if value.trim().is_empty() {
            return Err(DomainError::EmptyInput);
        }

        let subscriber = value
            .strip_prefix(COUNTRY_PREFIX)
            .or_else(|| value.strip_prefix(TRUNK_PREFIX))
            .ok_or_else(|| {
                DomainError::InvalidPhoneNumber(
                    "Phone number must start with +373 or 0".to_string(),
                )
            })?;

        if subscriber.len() != SUBSCRIBER_DIGITS
            || !subscriber.chars().all(|c| c.is_ascii_digit())
        {
            return Err(DomainError::InvalidPhoneNumber(format!(
                "Phone number must have exactly {SUBSCRIBER_DIGITS} digits after the prefix"
            )));
        }

        Ok(Self { value })
    }

    /// Get the phone number as typed
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// The 8 subscriber digits, without prefix
    pub fn subscriber_digits(&self) -> &str {
        self.value
            .strip_prefix(COUNTRY_PREFIX)
            .or_else(|| self.value.strip_prefix(TRUNK_PREFIX))
            .unwrap_or(&self.value)
    }

    /// The number in international `+373XXXXXXXX` form
    pub fn to_international(&self) -> String {
        format!("{COUNTRY_PREFIX}{}", self.subscriber_digits())
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl TryFrom<String> for PhoneNumber {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for PhoneNumber {
    type Error = DomainError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PhoneNumber> for String {
    fn from(phone: PhoneNumber) -> Self {
        phone.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn international_number_is_accepted() {
        let phone = PhoneNumber::new("+37369123456").unwrap();
        assert_eq!(phone.as_str(), "+37369123456");
        assert_eq!(phone.subscriber_digits(), "69123456");
    }

    #[test]
    fn local_number_is_accepted() {
        let phone = PhoneNumber::new("069123456").unwrap();
        assert_eq!(phone.subscriber_digits(), "69123456");
        assert_eq!(phone.to_international(), "+37369123456");
    }

    #[test]
    fn number_without_prefix_is_rejected() {
        assert!(PhoneNumber::new("69123456").is_err());
        assert!(PhoneNumber::new("37369123456").is_err());
    }

    #[test]
    fn foreign_country_code_is_rejected() {
        assert!(PhoneNumber::new("+40769123456").is_err());
    }

    #[test]
    fn wrong_length_is_rejected() {
        assert!(PhoneNumber::new("06912345").is_err());
        assert!(PhoneNumber::new("0691234567").is_err());
        assert!(PhoneNumber::new("+3736912345").is_err());
        assert!(PhoneNumber::new("+373691234567").is_err());
    }

    #[test]
    fn separators_are_not_accepted() {
        assert!(PhoneNumber::new("069 123 456").is_err());
        assert!(PhoneNumber::new("+373-69-123-456").is_err());
    }

    #[test]
    fn empty_input_reports_empty() {
        assert_eq!(PhoneNumber::new("   ").unwrap_err(), DomainError::EmptyInput);
    }

    #[test]
    fn serialization() {
        let phone = PhoneNumber::new("069123456").unwrap();
        let json = serde_json::to_string(&phone).unwrap();
        assert_eq!(json, "\"069123456\"");
        let parsed: PhoneNumber = serde_json::from_str(&json).unwrap();
        assert_eq!(phone, parsed);
    }

    #[test]
    fn deserializing_invalid_number_fails() {
        let result: Result<PhoneNumber, _> = serde_json::from_str("\"12345\"");
        assert!(result.is_err());
    }
}

#[cfg(test)]
mod proptest_tests {
    use proptest::prelude::*;

    use super::*;

    proptest! {
        #[test]
        fn international_numbers_accepted(digits in "[0-9]{8}") {
            let phone_str = format!("+373{digits}");
            prop_assert!(PhoneNumber::new(&phone_str).is_ok());
        }

        #[test]
        fn local_numbers_accepted(digits in "[0-9]{8}") {
            let phone_str = format!("0{digits}");
            prop_assert!(PhoneNumber::new(&phone_str).is_ok());
        }

        #[test]
        fn wrong_digit_count_rejected(digits in "[0-9]{0,7}|[0-9]{9,12}") {
            let local = format!("0{digits}");
            let international = format!("+373{digits}");
            prop_assert!(PhoneNumber::new(&local).is_err());
            prop_assert!(PhoneNumber::new(&international).is_err());
        }

        #[test]
        fn numbers_with_letters_rejected(
            head in "[0-9]{1,4}",
            letter in "[a-zA-Z]",
            tail in "[0-9]{3}"
        ) {
            let phone_str = format!("0{head}{letter}{tail}");
            prop_assert!(PhoneNumber::new(&phone_str).is_err());
        }

        #[test]
        fn other_leading_characters_rejected(first in "[1-9]", rest in "[0-9]{8}") {
            let phone_str = format!("{first}{rest}");
            prop_assert!(PhoneNumber::new(&phone_str).is_err());
        }
    }
}
