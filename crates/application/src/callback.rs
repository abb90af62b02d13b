//! Inbound events and the button payload codec
//!
//! Transports deliver five kinds of events. Button taps arrive as short
//! payload strings; the codec here is shared by every transport so the
//! payloads a reply offers are exactly the ones the engine understands.
//!
//! Payload formats:
//! - language: `ro`, `ru`
//! - child count: `children_<n>`
//! - slot: `date_<YYYY-MM-DD>_<HHMM>`

use domain::{Language, SlotKey};
use serde::{Deserialize, Serialize};

const CHILD_COUNT_PREFIX: &str = "children_";
const SLOT_PREFIX: &str = "date_";

/// An event forwarded by a transport adapter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "value", rename_all = "snake_case")]
pub enum InboundEvent {
    /// The user sent `/start`
    Start,
    /// A language button was tapped; carries the language code
    LanguageSelected(String),
    /// A free-text message
    Text(String),
    /// A child-count button was tapped
    ChildCountSelected(u8),
    /// A slot button was tapped; carries the slot token
    DateSelected(String),
}

impl InboundEvent {
    /// Decode a button payload into an event
    ///
    /// Returns `None` for payloads no reply ever offers.
    pub fn from_callback(data: &str) -> Option<Self> {
        CallbackPayload::parse(data).map(CallbackPayload::into_event)
    }

    /// Short name for logs
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::LanguageSelected(_) => "language_selected",
            Self::Text(_) => "text",
            Self::ChildCountSelected(_) => "child_count_selected",
            Self::DateSelected(_) => "date_selected",
        }
    }
}

/// Decoded button payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackPayload {
    Language(Language),
    ChildCount(u8),
    Slot(SlotKey),
}

impl CallbackPayload {
    /// Encode for use as a button payload
    pub fn encode(&self) -> String {
        match self {
            Self::Language(language) => language.code().to_string(),
            Self::ChildCount(count) => format!("{CHILD_COUNT_PREFIX}{count}"),
            Self::Slot(key) => format!("{SLOT_PREFIX}{}", key.token()),
        }
    }

    /// Decode a button payload
    pub fn parse(data: &str) -> Option<Self> {
        let data = data.trim();
        if let Some(count) = data.strip_prefix(CHILD_COUNT_PREFIX) {
            return count.parse().ok().map(Self::ChildCount);
        }
        if let Some(token) = data.strip_prefix(SLOT_PREFIX) {
            return SlotKey::parse_token(token).ok().map(Self::Slot);
        }
        data.parse().ok().map(Self::Language)
    }

    /// The inbound event this payload stands for
    pub fn into_event(self) -> InboundEvent {
        match self {
            Self::Language(language) => InboundEvent::LanguageSelected(language.code().to_string()),
            Self::ChildCount(count) => InboundEvent::ChildCountSelected(count),
            Self::Slot(key) => InboundEvent::DateSelected(key.token()),
        }
    }
}
