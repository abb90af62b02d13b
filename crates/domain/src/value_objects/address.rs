//! Postal address value object

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// Minimum number of characters in an address
pub const MIN_ADDRESS_LEN: usize = 5;

/// A postal address made of letters, digits, spaces, commas and periods
///
/// Letters are not limited to ASCII, so addresses written with Romanian
/// diacritics or in Cyrillic are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

impl Address {
    /// Create a new address, validating length and character set
    pub fn new(address: impl Into<String>) -> Result<Self, DomainError> {
        let value = address.into();

        if value.trim().is_empty() {
            return Err(DomainError::EmptyInput);
        }

        if value.chars().count() < MIN_ADDRESS_LEN {
            return Err(DomainError::InvalidAddress(format!(
                "Address must have at least {MIN_ADDRESS_LEN} characters"
            )));
        }

        if let Some(c) = value.chars().find(|c| !is_allowed(*c)) {
            return Err(DomainError::InvalidAddress(format!(
                "Address contains unsupported character '{c}'"
            )));
        }

        Ok(Self(value))
    }

    /// Get the address as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn is_allowed(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, ' ' | ',' | '.')
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Address {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.0
    }
}
