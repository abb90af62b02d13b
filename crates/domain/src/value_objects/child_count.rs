//! Number of children an applicant registers

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// How many children are being registered, between 1 and 4
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct ChildCount(u8);

impl ChildCount {
    /// Smallest accepted count
    pub const MIN: u8 = 1;
    /// Largest accepted count
    pub const MAX: u8 = 4;

    /// Create a child count, rejecting values outside `MIN..=MAX`
    pub fn new(count: u8) -> Result<Self, DomainError> {
        if count < Self::MIN || count > Self::MAX {
            return Err(DomainError::InvalidChildCount(count));
        }
        Ok(Self(count))
    }

    /// The count as an integer
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Every accepted count in ascending order
    pub fn all() -> impl Iterator<Item = Self> {
        (Self::MIN..=Self::MAX).map(Self)
    }
}

impl fmt::Display for ChildCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u8> for ChildCount {
    type Error = DomainError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ChildCount> for u8 {
    fn from(count: ChildCount) -> Self {
        count.0
    }
}
