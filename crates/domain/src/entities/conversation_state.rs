//! Conversation state entity - Per-identity progress through the registration flow

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    dialog::{DialogEffect, DialogEvent, EventKind, Prompt, ValidationFailure},
    entities::{Child, Registration},
    errors::DomainError,
    value_objects::{Address, ChildCount, Identity, Language, PhoneNumber, SlotKey},
};

/// Step of the registration flow
///
/// Steps only ever move to [`RegistrationStep::next`]; a reset starts a new
/// conversation at [`RegistrationStep::INITIAL`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationStep {
    LanguageSelection,
    NameCollection,
    PhoneCollection,
    AddressCollection,
    ChildCountSelection,
    ChildNameCollection,
    DateSelection,
    Completed,
}

impl RegistrationStep {
    /// Step every new or reset conversation starts at
    pub const INITIAL: Self = Self::LanguageSelection;

    /// The step following this one; `Completed` is its own successor
    pub const fn next(self) -> Self {
        match self {
            Self::LanguageSelection => Self::NameCollection,
            Self::NameCollection => Self::PhoneCollection,
            Self::PhoneCollection => Self::AddressCollection,
            Self::AddressCollection => Self::ChildCountSelection,
            Self::ChildCountSelection => Self::ChildNameCollection,
            Self::ChildNameCollection => Self::DateSelection,
            Self::DateSelection | Self::Completed => Self::Completed,
        }
    }

    /// Check if this is the terminal step
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed)
    }

    /// Transition table: whether an event of `kind` is handled at this step
    pub const fn accepts(self, kind: EventKind) -> bool {
        matches!(
            (self, kind),
            (Self::LanguageSelection, EventKind::LanguageChosen)
                | (
                    Self::NameCollection
                        | Self::PhoneCollection
                        | Self::AddressCollection
                        | Self::ChildNameCollection,
                    EventKind::Text
                )
                | (Self::ChildCountSelection, EventKind::ChildCountChosen)
                | (Self::DateSelection, EventKind::DateChosen | EventKind::Text)
        )
    }

    /// Stable snake_case name, as used in logs
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LanguageSelection => "language_selection",
            Self::NameCollection => "name_collection",
            Self::PhoneCollection => "phone_collection",
            Self::AddressCollection => "address_collection",
            Self::ChildCountSelection => "child_count_selection",
            Self::ChildNameCollection => "child_name_collection",
            Self::DateSelection => "date_selection",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for RegistrationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// In-progress registration for one identity
///
/// Fields are private: the only way to move the conversation is
/// [`ConversationState::apply`], which consults the transition table and
/// never skips a step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationState {
    identity: Identity,
    step: RegistrationStep,
    language: Option<Language>,
    name_tokens: Vec<String>,
    full_name: Option<String>,
    phone_number: Option<PhoneNumber>,
    address: Option<Address>,
    requested_children: Option<ChildCount>,
    children: Vec<Child>,
    selected_slot: Option<SlotKey>,
    started_at: DateTime<Utc>,
    last_activity_at: DateTime<Utc>,
}

impl ConversationState {
    /// Start a fresh conversation at the initial step
    pub fn new(identity: Identity, now: DateTime<Utc>) -> Self {
        Self {
            identity,
            step: RegistrationStep::INITIAL,
            language: None,
            name_tokens: Vec::new(),
            full_name: None,
            phone_number: None,
            address: None,
            requested_children: None,
            children: Vec::new(),
            selected_slot: None,
            started_at: now,
            last_activity_at: now,
        }
    }

    pub const fn identity(&self) -> &Identity {
        &self.identity
    }

    pub const fn step(&self) -> RegistrationStep {
        self.step
    }

    pub const fn language(&self) -> Option<Language> {
        self.language
    }

    pub fn full_name(&self) -> Option<&str> {
        self.full_name.as_deref()
    }

    pub const fn phone_number(&self) -> Option<&PhoneNumber> {
        self.phone_number.as_ref()
    }

    pub const fn address(&self) -> Option<&Address> {
        self.address.as_ref()
    }

    pub const fn requested_children(&self) -> Option<ChildCount> {
        self.requested_children
    }

    pub fn children(&self) -> &[Child] {
        &self.children
    }

    pub const fn selected_slot(&self) -> Option<SlotKey> {
        self.selected_slot
    }

    /// When the conversation was created or last reset
    pub const fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// When the applicant last sent an input this conversation handled
    pub const fn last_activity_at(&self) -> DateTime<Utc> {
        self.last_activity_at
    }

    /// Apply an event and report what has to happen next
    ///
    /// Events the current step does not handle are [`DialogEffect::Ignored`]
    /// and leave the state untouched, which makes repeated button taps
    /// harmless. Rejected input keeps the current step.
    pub fn apply(&mut self, event: DialogEvent, now: DateTime<Utc>) -> DialogEffect {
        if !self.step.accepts(event.kind()) {
            return DialogEffect::Ignored;
        }

        let effect = match event {
            DialogEvent::LanguageChosen(language) => {
                self.language = Some(language);
                self.advance();
                DialogEffect::Prompt(Prompt::GivenName)
            },
            DialogEvent::Text(text) => self.apply_text(&text),
            DialogEvent::ChildCountChosen(count) => match ChildCount::new(count) {
                Ok(count) => {
                    self.requested_children = Some(count);
                    self.children.clear();
                    self.advance();
                    DialogEffect::Prompt(Prompt::ChildName { ordinal: 1 })
                },
                Err(e) => reject(&e),
            },
            DialogEvent::DateChosen(slot) => {
                self.selected_slot = Some(slot);
                DialogEffect::CommitRequested(slot)
            },
        };

        if effect != DialogEffect::Ignored {
            self.last_activity_at = now;
        }
        effect
    }

    fn apply_text(&mut self, text: &str) -> DialogEffect {
        let text = text.trim();

        // Commands are routed by the transport and never count as data
        if text.starts_with('/') {
            return DialogEffect::Ignored;
        }
        if text.is_empty() {
            return DialogEffect::Rejected(ValidationFailure::EmptyInput);
        }

        match self.step {
            RegistrationStep::NameCollection => self.collect_name(text),
            RegistrationStep::PhoneCollection => match PhoneNumber::new(text) {
                Ok(phone) => {
                    self.phone_number = Some(phone);
                    self.advance();
                    DialogEffect::Prompt(Prompt::Address)
                },
                Err(e) => reject(&e),
            },
            RegistrationStep::AddressCollection => match Address::new(text) {
                Ok(address) => {
                    self.address = Some(address);
                    self.advance();
                    DialogEffect::Prompt(Prompt::ChildCount)
                },
                Err(e) => reject(&e),
            },
            RegistrationStep::ChildNameCollection => self.collect_child(text),
            // Any message while choosing a date lists the open slots again
            RegistrationStep::DateSelection => DialogEffect::SlotSelectionOpened,
            _ => DialogEffect::Ignored,
        }
    }

    fn collect_name(&mut self, text: &str) -> DialogEffect {
        let token = text.split_whitespace().collect::<Vec<_>>().join(" ");
        let whole_name = token.contains(' ');
        self.name_tokens.push(token);

        if whole_name || self.name_tokens.len() >= 2 {
            let full_name = self.name_tokens.join(" ");
            self.full_name = Some(full_name.clone());
            self.advance();
            DialogEffect::Prompt(Prompt::PhoneNumber { full_name })
        } else {
            DialogEffect::Prompt(Prompt::Surname)
        }
    }

    fn collect_child(&mut self, text: &str) -> DialogEffect {
        let Some(requested) = self.requested_children else {
            return DialogEffect::Ignored;
        };

        match Child::parse(text) {
            Ok(child) => {
                self.children.push(child);
                if self.children.len() < usize::from(requested.get()) {
                    let ordinal = u8::try_from(self.children.len() + 1).unwrap_or(u8::MAX);
                    DialogEffect::Prompt(Prompt::ChildName { ordinal })
                } else {
                    self.advance();
                    DialogEffect::SlotSelectionOpened
                }
            },
            Err(e) => reject(&e),
        }
    }

    /// Build the registration from everything collected so far
    ///
    /// Only succeeds once a slot has been chosen at `date_selection`.
    pub fn build_registration(&self, now: DateTime<Utc>) -> Result<Registration, DomainError> {
        if self.step != RegistrationStep::DateSelection {
            return Err(DomainError::IncompleteRegistration("date selection"));
        }
        let requested = self
            .requested_children
            .ok_or(DomainError::IncompleteRegistration("child count"))?;
        if self.children.len() != usize::from(requested.get()) {
            return Err(DomainError::IncompleteRegistration("children"));
        }

        Ok(Registration {
            identity: self.identity.clone(),
            full_name: self
                .full_name
                .clone()
                .ok_or(DomainError::IncompleteRegistration("full name"))?,
            phone_number: self
                .phone_number
                .clone()
                .ok_or(DomainError::IncompleteRegistration("phone number"))?,
            address: self
                .address
                .clone()
                .ok_or(DomainError::IncompleteRegistration("address"))?,
            children: self.children.clone(),
            language: self
                .language
                .ok_or(DomainError::IncompleteRegistration("language"))?,
            selected_slot: self
                .selected_slot
                .ok_or(DomainError::IncompleteRegistration("selected slot"))?,
            created_at: now,
        })
    }

    /// Mark the conversation finished after its registration was stored
    pub fn complete(&mut self) {
        if self.step == RegistrationStep::DateSelection {
            self.advance();
        }
    }

    fn advance(&mut self) {
        self.step = self.step.next();
    }
}

fn reject(error: &DomainError) -> DialogEffect {
    DialogEffect::Rejected(
        error
            .validation_failure()
            .unwrap_or(ValidationFailure::EmptyInput),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn started() -> ConversationState {
        ConversationState::new(Identity::from(42), Utc::now())
    }

    fn text(s: &str) -> DialogEvent {
        DialogEvent::Text(s.to_string())
    }

    fn apply(state: &mut ConversationState, event: DialogEvent) -> DialogEffect {
        state.apply(event, Utc::now())
    }

    /// Drive a conversation up to the given step with valid inputs
    fn at_step(step: RegistrationStep) -> ConversationState {
        let mut state = started();
        let script = [
            DialogEvent::LanguageChosen(Language::Romanian),
            text("Ion Popescu"),
            text("+37369123456"),
            text("Chisinau, str. Test 5"),
            DialogEvent::ChildCountChosen(1),
            text("Ana Popescu"),
        ];
        for event in script {
            if state.step() == step {
                break;
            }
            apply(&mut state, event);
        }
        assert_eq!(state.step(), step);
        state
    }

    #[test]
    fn steps_advance_one_at_a_time() {
        let mut step = RegistrationStep::INITIAL;
        let mut seen = vec![step];
        while !step.is_terminal() {
            step = step.next();
            seen.push(step);
        }
        assert_eq!(
            seen,
            vec![
                RegistrationStep::LanguageSelection,
                RegistrationStep::NameCollection,
                RegistrationStep::PhoneCollection,
                RegistrationStep::AddressCollection,
                RegistrationStep::ChildCountSelection,
                RegistrationStep::ChildNameCollection,
                RegistrationStep::DateSelection,
                RegistrationStep::Completed,
            ]
        );
        assert_eq!(RegistrationStep::Completed.next(), RegistrationStep::Completed);
    }

    #[test]
    fn transition_table_accepts_one_event_kind_per_step() {
        assert!(RegistrationStep::LanguageSelection.accepts(EventKind::LanguageChosen));
        assert!(!RegistrationStep::LanguageSelection.accepts(EventKind::Text));
        assert!(RegistrationStep::PhoneCollection.accepts(EventKind::Text));
        assert!(!RegistrationStep::PhoneCollection.accepts(EventKind::DateChosen));
        assert!(RegistrationStep::ChildCountSelection.accepts(EventKind::ChildCountChosen));
        assert!(!RegistrationStep::ChildCountSelection.accepts(EventKind::Text));
        assert!(RegistrationStep::DateSelection.accepts(EventKind::DateChosen));
        assert!(RegistrationStep::DateSelection.accepts(EventKind::Text));
        assert!(!RegistrationStep::Completed.accepts(EventKind::DateChosen));
    }

    #[test]
    fn language_choice_advances_to_name() {
        let mut state = started();
        let effect = apply(&mut state, DialogEvent::LanguageChosen(Language::Russian));
        assert_eq!(effect, DialogEffect::Prompt(Prompt::GivenName));
        assert_eq!(state.step(), RegistrationStep::NameCollection);
        assert_eq!(state.language(), Some(Language::Russian));
    }

    #[test]
    fn repeated_language_choice_is_ignored() {
        let mut state = at_step(RegistrationStep::NameCollection);
        let effect = apply(&mut state, DialogEvent::LanguageChosen(Language::Russian));
        assert_eq!(effect, DialogEffect::Ignored);
        assert_eq!(state.language(), Some(Language::Romanian));
    }

    #[test]
    fn name_in_two_messages() {
        let mut state = at_step(RegistrationStep::NameCollection);
        assert_eq!(
            apply(&mut state, text("Ion")),
            DialogEffect::Prompt(Prompt::Surname)
        );
        assert_eq!(state.step(), RegistrationStep::NameCollection);
        assert_eq!(
            apply(&mut state, text("Popescu")),
            DialogEffect::Prompt(Prompt::PhoneNumber {
                full_name: "Ion Popescu".to_string()
            })
        );
        assert_eq!(state.full_name(), Some("Ion Popescu"));
        assert_eq!(state.step(), RegistrationStep::PhoneCollection);
    }

    #[test]
    fn name_in_one_message_is_normalized() {
        let mut state = at_step(RegistrationStep::NameCollection);
        apply(&mut state, text("  Ion   Popescu "));
        assert_eq!(state.full_name(), Some("Ion Popescu"));
        assert_eq!(state.step(), RegistrationStep::PhoneCollection);
    }

    #[test]
    fn blank_name_is_rejected() {
        let mut state = at_step(RegistrationStep::NameCollection);
        assert_eq!(
            apply(&mut state, text("   ")),
            DialogEffect::Rejected(ValidationFailure::EmptyInput)
        );
        assert_eq!(state.step(), RegistrationStep::NameCollection);
        assert!(state.full_name().is_none());
    }

    #[test]
    fn commands_are_not_data() {
        let mut state = at_step(RegistrationStep::NameCollection);
        assert_eq!(apply(&mut state, text("/help")), DialogEffect::Ignored);
        assert_eq!(state.step(), RegistrationStep::NameCollection);
    }

    #[test]
    fn invalid_phone_keeps_step() {
        let mut state = at_step(RegistrationStep::PhoneCollection);
        let before = state.clone();
        assert_eq!(
            apply(&mut state, text("12345")),
            DialogEffect::Rejected(ValidationFailure::InvalidPhoneNumber)
        );
        assert_eq!(state.step(), RegistrationStep::PhoneCollection);
        assert_eq!(state.phone_number(), before.phone_number());
    }

    #[test]
    fn invalid_address_keeps_step() {
        let mut state = at_step(RegistrationStep::AddressCollection);
        assert_eq!(
            apply(&mut state, text("str#")),
            DialogEffect::Rejected(ValidationFailure::InvalidAddress)
        );
        assert_eq!(state.step(), RegistrationStep::AddressCollection);
    }

    #[test]
    fn text_at_button_steps_is_ignored() {
        let mut state = at_step(RegistrationStep::ChildCountSelection);
        assert_eq!(apply(&mut state, text("2")), DialogEffect::Ignored);
        assert_eq!(state.step(), RegistrationStep::ChildCountSelection);
    }

    #[test]
    fn out_of_range_child_count_is_rejected() {
        let mut state = at_step(RegistrationStep::ChildCountSelection);
        assert_eq!(
            apply(&mut state, DialogEvent::ChildCountChosen(5)),
            DialogEffect::Rejected(ValidationFailure::InvalidChildCount)
        );
        assert_eq!(state.step(), RegistrationStep::ChildCountSelection);
    }

    #[test]
    fn children_are_collected_in_order() {
        let mut state = at_step(RegistrationStep::ChildCountSelection);
        assert_eq!(
            apply(&mut state, DialogEvent::ChildCountChosen(3)),
            DialogEffect::Prompt(Prompt::ChildName { ordinal: 1 })
        );
        assert_eq!(
            apply(&mut state, text("Ana Popescu")),
            DialogEffect::Prompt(Prompt::ChildName { ordinal: 2 })
        );
        assert_eq!(
            apply(&mut state, text("Maria")),
            DialogEffect::Rejected(ValidationFailure::IncompleteChildName)
        );
        assert_eq!(
            apply(&mut state, text("Maria Popescu")),
            DialogEffect::Prompt(Prompt::ChildName { ordinal: 3 })
        );
        assert_eq!(
            apply(&mut state, text("Ion Popescu")),
            DialogEffect::SlotSelectionOpened
        );

        let names: Vec<&str> = state.children().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Ana", "Maria", "Ion"]);
        assert_eq!(state.step(), RegistrationStep::DateSelection);
    }

    #[test]
    fn repeated_child_count_is_ignored() {
        let mut state = at_step(RegistrationStep::ChildNameCollection);
        assert_eq!(
            apply(&mut state, DialogEvent::ChildCountChosen(4)),
            DialogEffect::Ignored
        );
        assert_eq!(state.requested_children().map(ChildCount::get), Some(1));
    }

    #[test]
    fn date_before_date_selection_is_ignored() {
        let mut state = at_step(RegistrationStep::AddressCollection);
        let slot = SlotKey::parse("2024-12-25", "10:00").unwrap();
        assert_eq!(
            apply(&mut state, DialogEvent::DateChosen(slot)),
            DialogEffect::Ignored
        );
        assert!(state.selected_slot().is_none());
    }

    #[test]
    fn date_choice_requests_commit_and_builds_registration() {
        let mut state = at_step(RegistrationStep::DateSelection);
        let slot = SlotKey::parse("2024-12-25", "10:00").unwrap();
        assert_eq!(
            apply(&mut state, DialogEvent::DateChosen(slot)),
            DialogEffect::CommitRequested(slot)
        );

        let registration = state.build_registration(Utc::now()).unwrap();
        assert_eq!(registration.identity, Identity::from(42));
        assert_eq!(registration.full_name, "Ion Popescu");
        assert_eq!(registration.phone_number.as_str(), "+37369123456");
        assert_eq!(registration.children.len(), 1);
        assert_eq!(registration.language, Language::Romanian);
        assert_eq!(registration.selected_slot, slot);
    }

    #[test]
    fn text_while_choosing_a_date_reopens_slot_selection() {
        let mut state = at_step(RegistrationStep::DateSelection);
        assert_eq!(
            apply(&mut state, text("which dates?")),
            DialogEffect::SlotSelectionOpened
        );
        assert_eq!(state.step(), RegistrationStep::DateSelection);
        assert!(state.selected_slot().is_none());
        assert_eq!(apply(&mut state, text("/menu")), DialogEffect::Ignored);
    }

    #[test]
    fn registration_cannot_be_built_early() {
        let state = at_step(RegistrationStep::AddressCollection);
        assert_eq!(
            state.build_registration(Utc::now()).unwrap_err(),
            DomainError::IncompleteRegistration("date selection")
        );
    }

    #[test]
    fn completing_moves_to_terminal_step() {
        let mut state = at_step(RegistrationStep::DateSelection);
        state.complete();
        assert!(state.step().is_terminal());
    }

    #[test]
    fn ignored_events_do_not_touch_activity() {
        let mut state = started();
        let before = state.last_activity_at();
        let later = before + chrono::Duration::minutes(5);
        state.apply(text("hello"), later);
        assert_eq!(state.last_activity_at(), before);
        state.apply(DialogEvent::LanguageChosen(Language::Romanian), later);
        assert_eq!(state.last_activity_at(), later);
    }
}
