//! Dialog vocabulary for the registration state machine
//!
//! A [`DialogEvent`] is fed to [`ConversationState::apply`], which returns a
//! [`DialogEffect`] describing what the caller has to do next. The state
//! machine itself never performs I/O: listing slots and committing the
//! registration are effects carried out by the application layer.
//!
//! [`ConversationState::apply`]: crate::entities::ConversationState::apply

use serde::{Deserialize, Serialize};

use crate::value_objects::{Language, SlotKey};

/// An input that can move a conversation forward
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogEvent {
    /// A language button was tapped
    LanguageChosen(Language),
    /// A free-text message was received
    Text(String),
    /// A child-count button was tapped
    ChildCountChosen(u8),
    /// A slot button was tapped
    DateChosen(SlotKey),
}

impl DialogEvent {
    /// The kind of this event, used for transition table lookups
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::LanguageChosen(_) => EventKind::LanguageChosen,
            Self::Text(_) => EventKind::Text,
            Self::ChildCountChosen(_) => EventKind::ChildCountChosen,
            Self::DateChosen(_) => EventKind::DateChosen,
        }
    }
}

/// Payload-free discriminant of [`DialogEvent`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    LanguageChosen,
    Text,
    ChildCountChosen,
    DateChosen,
}

/// The next piece of information to ask the applicant for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "prompt", rename_all = "snake_case")]
pub enum Prompt {
    /// First name
    GivenName,
    /// Family name, after a single-word first message
    Surname,
    /// Phone number; carries the name just collected for the greeting
    PhoneNumber { full_name: String },
    /// Postal address
    Address,
    /// Number of children, offered as a bounded choice
    ChildCount,
    /// Name and surname of the child at `ordinal` (1-based)
    ChildName { ordinal: u8 },
}

/// Why an input was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationFailure {
    /// Empty or whitespace-only message
    EmptyInput,
    /// Not `+373` or `0` followed by 8 digits
    InvalidPhoneNumber,
    /// Too short or contains characters outside the allowed set
    InvalidAddress,
    /// Child name without a surname, or with extra words
    IncompleteChildName,
    /// Child count outside 1 to 4
    InvalidChildCount,
}

/// Outcome of applying an event to a conversation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogEffect {
    /// Input accepted; ask for the next piece of information
    Prompt(Prompt),
    /// Input rejected; the step is unchanged and should be re-prompted
    Rejected(ValidationFailure),
    /// Every child has been entered, or a message arrived while choosing a
    /// date; open slots must be offered
    SlotSelectionOpened,
    /// A slot was picked; the commit sequence must run
    CommitRequested(SlotKey),
    /// The event does not apply to the current step
    Ignored,
}
