//! Structured replies produced by the conversation engine
//!
//! A reply names what happened, not what to say. Presentation layers pick
//! the text from `(message, language)`.

use domain::{
    ChildCount, Identity, Language, Prompt, RegistrationStep, SlotKey, ValidationFailure,
};
use serde::Serialize;

use crate::{callback::CallbackPayload, services::OpenSlot};

/// Where an existing registration was detected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Detection {
    /// Found by the repository lookup before the flow started or continued
    AtEntry,
    /// Reported by the uniqueness constraint while committing
    AtCommit,
}

/// What a reply communicates
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReplyMessage {
    /// Greeting with the bilingual language choice
    ChooseLanguage,
    /// Ask for the first name
    AskGivenName,
    /// Ask for the family name
    AskSurname,
    /// Thank the applicant by name and ask for a phone number
    AskPhoneNumber { full_name: String },
    /// Ask for a postal address
    AskAddress,
    /// Ask how many children will attend
    AskChildCount,
    /// Ask for the name of the child at `ordinal` (1-based)
    AskChildName { ordinal: u8 },
    /// Offer the open slots
    ChooseSlot,
    /// Every slot is full
    NoSlotsAvailable,
    /// Input was rejected at `step`
    InvalidInput {
        step: RegistrationStep,
        failure: ValidationFailure,
    },
    /// The commit sequence has started
    Processing,
    /// The registration was stored
    Registered { slot: SlotKey },
    /// The identity already holds a registration for `slot`
    AlreadyRegistered { slot: SlotKey, detected: Detection },
    /// The chosen slot filled up before the commit
    SlotUnavailable { slot: SlotKey },
    /// Storage failed; the applicant may try again
    StorageFailure,
}

impl From<Prompt> for ReplyMessage {
    fn from(prompt: Prompt) -> Self {
        match prompt {
            Prompt::GivenName => Self::AskGivenName,
            Prompt::Surname => Self::AskSurname,
            Prompt::PhoneNumber { full_name } => Self::AskPhoneNumber { full_name },
            Prompt::Address => Self::AskAddress,
            Prompt::ChildCount => Self::AskChildCount,
            Prompt::ChildName { ordinal } => Self::AskChildName { ordinal },
        }
    }
}

/// A button offered with a reply
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Choice {
    /// Button caption
    pub label: String,
    /// Payload sent back when the button is tapped
    pub data: String,
}

impl Choice {
    fn new(label: impl Into<String>, payload: CallbackPayload) -> Self {
        Self {
            label: label.into(),
            data: payload.encode(),
        }
    }
}

/// An outbound message for one identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reply {
    /// Recipient
    pub identity: Identity,
    /// Language to render in; `None` before a language was chosen
    pub language: Option<Language>,
    /// What happened
    pub message: ReplyMessage,
    /// Buttons to show, empty for plain messages
    pub choices: Vec<Choice>,
}

impl Reply {
    /// Create a reply without buttons
    pub fn new(identity: Identity, language: Option<Language>, message: ReplyMessage) -> Self {
        Self {
            identity,
            language,
            message,
            choices: Vec::new(),
        }
    }

    /// Attach buttons
    #[must_use]
    pub fn with_choices(mut self, choices: Vec<Choice>) -> Self {
        self.choices = choices;
        self
    }

    /// One button per supported language
    pub fn language_choices() -> Vec<Choice> {
        Language::ALL
            .iter()
            .map(|language| Choice::new(language.native_name(), CallbackPayload::Language(*language)))
            .collect()
    }

    /// One button per accepted child count
    pub fn child_count_choices() -> Vec<Choice> {
        ChildCount::all()
            .map(|count| Choice::new(count.to_string(), CallbackPayload::ChildCount(count.get())))
            .collect()
    }

    /// One button per open slot, in the order given
    pub fn slot_choices(slots: &[OpenSlot]) -> Vec<Choice> {
        slots
            .iter()
            .map(|slot| Choice::new(slot.label(), CallbackPayload::Slot(slot.key)))
            .collect()
    }
}
