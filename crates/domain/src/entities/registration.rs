//! Registration entity - A committed applicant record

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    errors::DomainError,
    value_objects::{Address, Identity, Language, PhoneNumber, SlotKey},
};

/// A child listed on a registration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Child {
    /// Given name
    pub name: String,
    /// Family name
    pub surname: String,
}

impl Child {
    /// Parse a child from a message containing exactly a given name and a surname
    pub fn parse(text: &str) -> Result<Self, DomainError> {
        let tokens: Vec<&str> = text.split_whitespace().collect();
        match tokens.as_slice() {
            [] => Err(DomainError::EmptyInput),
            [name, surname] => Ok(Self {
                name: (*name).to_string(),
                surname: (*surname).to_string(),
            }),
            [_] => Err(DomainError::InvalidChildName(
                "Surname is missing".to_string(),
            )),
            _ => Err(DomainError::InvalidChildName(format!(
                "Expected a name and a surname, got {} words",
                tokens.len()
            ))),
        }
    }
}

/// A finalized registration, created exactly once per identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    /// Chat identity of the applicant, unique across registrations
    pub identity: Identity,
    /// Applicant's full name
    pub full_name: String,
    /// Contact phone number
    pub phone_number: PhoneNumber,
    /// Postal address
    pub address: Address,
    /// Children in the order they were entered
    pub children: Vec<Child>,
    /// Language the applicant registered in
    pub language: Language,
    /// The slot the applicant booked
    pub selected_slot: SlotKey,
    /// When the registration was committed
    pub created_at: DateTime<Utc>,
}
