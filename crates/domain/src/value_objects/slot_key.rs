//! Slot key value object
//!
//! A slot is addressed by its date and start time. The key has two textual
//! forms: the display label (`2024-12-25 10:00`), which is also what a
//! registration stores, and the transport token (`2024-12-25_1000`), which
//! drops characters that chat platforms reject in button payloads.

use std::{fmt, str::FromStr};

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M";
const TOKEN_TIME_FORMAT: &str = "%H%M";
const TOKEN_SEPARATOR: char = '_';

/// Date and start time identifying one bookable slot
///
/// Ordering is chronological: by date, then by time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SlotKey {
    date: NaiveDate,
    time: NaiveTime,
}

impl SlotKey {
    /// Create a key from an already parsed date and time
    pub const fn new(date: NaiveDate, time: NaiveTime) -> Self {
        Self { date, time }
    }

    /// Parse a key from its stored date (`YYYY-MM-DD`) and time (`HH:MM`)
    pub fn parse(date: &str, time: &str) -> Result<Self, DomainError> {
        let date = NaiveDate::parse_from_str(date.trim(), DATE_FORMAT)
            .map_err(|e| DomainError::InvalidSlot(format!("bad date '{date}': {e}")))?;
        let time = NaiveTime::parse_from_str(time.trim(), TIME_FORMAT)
            .map_err(|e| DomainError::InvalidSlot(format!("bad time '{time}': {e}")))?;
        Ok(Self { date, time })
    }

    /// Parse the display label form, `YYYY-MM-DD HH:MM`
    pub fn parse_label(label: &str) -> Result<Self, DomainError> {
        let (date, time) = label
            .trim()
            .split_once(' ')
            .ok_or_else(|| DomainError::InvalidSlot(format!("bad slot label '{label}'")))?;
        Self::parse(date, time)
    }

    /// Parse the transport token form, `YYYY-MM-DD_HHMM`
    pub fn parse_token(token: &str) -> Result<Self, DomainError> {
        let (date, time) = token
            .trim()
            .split_once(TOKEN_SEPARATOR)
            .ok_or_else(|| DomainError::InvalidSlot(format!("bad slot token '{token}'")))?;
        let date = NaiveDate::parse_from_str(date, DATE_FORMAT)
            .map_err(|e| DomainError::InvalidSlot(format!("bad date '{date}': {e}")))?;
        let time = NaiveTime::parse_from_str(time, TOKEN_TIME_FORMAT)
            .map_err(|e| DomainError::InvalidSlot(format!("bad time '{time}': {e}")))?;
        Ok(Self { date, time })
    }

    /// The slot date
    pub const fn date(&self) -> NaiveDate {
        self.date
    }

    /// The slot start time
    pub const fn time(&self) -> NaiveTime {
        self.time
    }

    /// Date in storage form, `YYYY-MM-DD`
    pub fn date_string(&self) -> String {
        self.date.format(DATE_FORMAT).to_string()
    }

    /// Time in storage form, `HH:MM`
    pub fn time_string(&self) -> String {
        self.time.format(TIME_FORMAT).to_string()
    }

    /// Human readable label, `YYYY-MM-DD HH:MM`
    pub fn label(&self) -> String {
        format!("{} {}", self.date_string(), self.time_string())
    }

    /// Transport-safe token, `YYYY-MM-DD_HHMM`
    pub fn token(&self) -> String {
        format!(
            "{}{TOKEN_SEPARATOR}{}",
            self.date_string(),
            self.time.format(TOKEN_TIME_FORMAT)
        )
    }
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

impl FromStr for SlotKey {
    type Err = DomainError;

    /// Accepts either the label or the token form
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.contains(TOKEN_SEPARATOR) {
            Self::parse_token(s)
        } else {
            Self::parse_label(s)
        }
    }
}

impl TryFrom<String> for SlotKey {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SlotKey> for String {
    fn from(key: SlotKey) -> Self {
        key.label()
    }
}
