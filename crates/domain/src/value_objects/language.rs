//! Interface language chosen at the start of a conversation

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// One of the two languages the registration flow is offered in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    /// Romanian (`ro`)
    #[serde(rename = "ro")]
    Romanian,
    /// Russian (`ru`)
    #[serde(rename = "ru")]
    Russian,
}

impl Language {
    /// Every supported language, in the order they are offered
    pub const ALL: [Self; 2] = [Self::Romanian, Self::Russian];

    /// Two-letter language code used on the wire and in storage
    pub const fn code(self) -> &'static str {
        match self {
            Self::Romanian => "ro",
            Self::Russian => "ru",
        }
    }

    /// Name of the language in the language itself, used as a button label
    pub const fn native_name(self) -> &'static str {
        match self {
            Self::Romanian => "Română",
            Self::Russian => "Русский",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ro" => Ok(Self::Romanian),
            "ru" => Ok(Self::Russian),
            other => Err(DomainError::UnsupportedLanguage(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip() {
        for language in Language::ALL {
            assert_eq!(language.code().parse::<Language>().unwrap(), language);
        }
    }

    #[test]
    fn parsing_is_case_insensitive() {
        assert_eq!("RO".parse::<Language>().unwrap(), Language::Romanian);
        assert_eq!(" ru ".parse::<Language>().unwrap(), Language::Russian);
    }

    #[test]
    fn unknown_code_is_rejected() {
        let err = "en".parse::<Language>().unwrap_err();
        assert_eq!(err, DomainError::UnsupportedLanguage("en".to_string()));
    }

    #[test]
    fn serializes_as_code() {
        assert_eq!(serde_json::to_string(&Language::Russian).unwrap(), "\"ru\"");
        let parsed: Language = serde_json::from_str("\"ro\"").unwrap();
        assert_eq!(parsed, Language::Romanian);
    }
}
