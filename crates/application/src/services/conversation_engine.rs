//! Conversation engine - Drives the registration dialog for every identity
//!
//! The engine owns no state of its own. Each inbound event loads the
//! identity's conversation from the session store, applies the event to the
//! domain state machine, carries out the resulting effect (listing slots,
//! committing the registration) and enqueues the replies.
//!
//! Before any event reaches the dialog the registration store is consulted:
//! an identity that already holds a registration never gets a new
//! conversation, whatever it sends.
//!
//! Handlers only return an error when a reply could not be enqueued. Storage
//! failures are reported to the applicant as a [`ReplyMessage::StorageFailure`]
//! and leave the conversation where it was so the applicant can retry.

use std::{str::FromStr, sync::Arc};

use chrono::Utc;
use domain::{
    ConversationState, DialogEffect, DialogEvent, Identity, Language, Prompt, Registration,
    RegistrationStep, SlotKey,
};
use tracing::{debug, info, instrument, warn};

use crate::{
    callback::InboundEvent,
    error::ApplicationError,
    ports::{ApplicantRepository, ConversationStateStore, ReplyOutbox, SlotCatalog},
    reply::{Detection, Reply, ReplyMessage},
    services::SlotLedger,
};

/// Result of the commit sequence
enum CommitOutcome {
    Registered(Registration),
    DuplicateIdentity,
    SlotUnavailable,
    Failed(ApplicationError),
}

/// Registration dialog orchestrator
pub struct ConversationEngine {
    applicants: Arc<dyn ApplicantRepository>,
    ledger: SlotLedger,
    sessions: Arc<dyn ConversationStateStore>,
    outbox: Arc<dyn ReplyOutbox>,
}

impl std::fmt::Debug for ConversationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversationEngine")
            .field("ledger", &self.ledger)
            .finish_non_exhaustive()
    }
}

impl ConversationEngine {
    /// Create an engine over its four collaborators
    pub fn new(
        applicants: Arc<dyn ApplicantRepository>,
        catalog: Arc<dyn SlotCatalog>,
        sessions: Arc<dyn ConversationStateStore>,
        outbox: Arc<dyn ReplyOutbox>,
    ) -> Self {
        let ledger = SlotLedger::new(catalog, Arc::clone(&applicants));
        Self {
            applicants,
            ledger,
            sessions,
            outbox,
        }
    }

    /// The slot ledger used for listing and headroom checks
    pub const fn ledger(&self) -> &SlotLedger {
        &self.ledger
    }

    /// Number of conversations currently in progress
    pub async fn active_conversations(&self) -> Result<usize, ApplicationError> {
        self.sessions.count().await
    }

    /// Route a transport event to its handler
    #[instrument(skip(self, identity, event), fields(identity = %identity, event = event.name()))]
    pub async fn handle(
        &self,
        identity: &Identity,
        event: InboundEvent,
    ) -> Result<(), ApplicationError> {
        match event {
            InboundEvent::Start => self.on_start(identity).await,
            InboundEvent::LanguageSelected(code) => self.on_language_chosen(identity, &code).await,
            InboundEvent::Text(text) => self.on_text_input(identity, &text).await,
            InboundEvent::ChildCountSelected(count) => {
                self.on_child_count_chosen(identity, count).await
            },
            InboundEvent::DateSelected(token) => self.on_date_chosen(identity, &token).await,
        }
    }

    /// Begin or restart a conversation
    ///
    /// Any conversation in progress for the identity is discarded.
    #[instrument(skip(self, identity), fields(identity = %identity))]
    pub async fn on_start(&self, identity: &Identity) -> Result<(), ApplicationError> {
        if self.short_circuit(identity).await? {
            return Ok(());
        }

        let state = ConversationState::new(identity.clone(), Utc::now());
        if !self.persist(state).await? {
            return Ok(());
        }

        info!("Conversation started");
        self.send(
            Reply::new(identity.clone(), None, ReplyMessage::ChooseLanguage)
                .with_choices(Reply::language_choices()),
        )
        .await
    }

    /// A language button was tapped
    #[instrument(skip(self, identity), fields(identity = %identity))]
    pub async fn on_language_chosen(
        &self,
        identity: &Identity,
        code: &str,
    ) -> Result<(), ApplicationError> {
        match Language::from_str(code) {
            Ok(language) => {
                self.dispatch(identity, DialogEvent::LanguageChosen(language))
                    .await
            },
            Err(e) => {
                debug!(error = %e, "Ignoring unknown language");
                Ok(())
            },
        }
    }

    /// A free-text message arrived
    #[instrument(skip(self, identity, text), fields(identity = %identity))]
    pub async fn on_text_input(
        &self,
        identity: &Identity,
        text: &str,
    ) -> Result<(), ApplicationError> {
        self.dispatch(identity, DialogEvent::Text(text.to_string()))
            .await
    }

    /// A child-count button was tapped
    #[instrument(skip(self, identity), fields(identity = %identity))]
    pub async fn on_child_count_chosen(
        &self,
        identity: &Identity,
        count: u8,
    ) -> Result<(), ApplicationError> {
        self.dispatch(identity, DialogEvent::ChildCountChosen(count))
            .await
    }

    /// A slot button was tapped; `slot_key` is the token or the label form
    #[instrument(skip(self, identity), fields(identity = %identity))]
    pub async fn on_date_chosen(
        &self,
        identity: &Identity,
        slot_key: &str,
    ) -> Result<(), ApplicationError> {
        match SlotKey::from_str(slot_key) {
            Ok(slot) => self.dispatch(identity, DialogEvent::DateChosen(slot)).await,
            Err(e) => {
                debug!(error = %e, "Ignoring malformed slot selection");
                Ok(())
            },
        }
    }

    async fn dispatch(&self, identity: &Identity, event: DialogEvent) -> Result<(), ApplicationError> {
        if self.short_circuit(identity).await? {
            return Ok(());
        }

        let mut state = match self.sessions.get(identity).await {
            Ok(Some(state)) => state,
            Ok(None) => {
                debug!("No conversation in progress, ignoring event");
                return Ok(());
            },
            Err(e) => {
                warn!(error = %e, "Failed to load conversation");
                return self.storage_failure(identity, None).await;
            },
        };

        let step = state.step();
        let effect = state.apply(event, Utc::now());
        let language = state.language();

        match effect {
            DialogEffect::Ignored => {
                debug!(step = %step, "Event does not apply at this step");
                Ok(())
            },
            DialogEffect::Rejected(failure) => {
                info!(step = %step, ?failure, "Input rejected");
                if !self.persist(state).await? {
                    return Ok(());
                }
                let choices = if step == RegistrationStep::ChildCountSelection {
                    Reply::child_count_choices()
                } else {
                    Vec::new()
                };
                self.send(
                    Reply::new(
                        identity.clone(),
                        language,
                        ReplyMessage::InvalidInput { step, failure },
                    )
                    .with_choices(choices),
                )
                .await
            },
            DialogEffect::Prompt(prompt) => {
                info!(from = %step, to = %state.step(), "Input accepted");
                let choices = if prompt == Prompt::ChildCount {
                    Reply::child_count_choices()
                } else {
                    Vec::new()
                };
                if !self.persist(state).await? {
                    return Ok(());
                }
                self.send(
                    Reply::new(identity.clone(), language, prompt.into()).with_choices(choices),
                )
                .await
            },
            DialogEffect::SlotSelectionOpened => {
                info!(children = state.children().len(), "Slot selection opened");
                if !self.persist(state).await? {
                    return Ok(());
                }
                self.offer_slots(identity, language).await
            },
            DialogEffect::CommitRequested(slot) => self.commit(state, slot).await,
        }
    }

    /// Returns true when the event must not reach the dialog
    async fn short_circuit(&self, identity: &Identity) -> Result<bool, ApplicationError> {
        match self.applicants.find_by_identity(identity).await {
            Ok(None) => Ok(false),
            Ok(Some(existing)) => {
                info!(slot = %existing.selected_slot, "Identity already registered");
                self.send(Reply::new(
                    identity.clone(),
                    Some(existing.language),
                    ReplyMessage::AlreadyRegistered {
                        slot: existing.selected_slot,
                        detected: Detection::AtEntry,
                    },
                ))
                .await?;
                Ok(true)
            },
            Err(e) => {
                warn!(error = %e, "Registration lookup failed");
                let language = self
                    .sessions
                    .get(identity)
                    .await
                    .ok()
                    .flatten()
                    .and_then(|state| state.language());
                self.storage_failure(identity, language).await?;
                Ok(true)
            },
        }
    }

    /// Store the conversation; on failure tell the applicant and return false
    async fn persist(&self, state: ConversationState) -> Result<bool, ApplicationError> {
        let identity = state.identity().clone();
        let language = state.language();

        match self.sessions.put(state).await {
            Ok(()) => Ok(true),
            Err(e) => {
                warn!(error = %e, "Failed to store conversation");
                self.storage_failure(&identity, language).await?;
                Ok(false)
            },
        }
    }

    async fn offer_slots(
        &self,
        identity: &Identity,
        language: Option<Language>,
    ) -> Result<(), ApplicationError> {
        match self.ledger.list_open_slots().await {
            Ok(slots) if slots.is_empty() => {
                warn!("No open slots left");
                self.send(Reply::new(
                    identity.clone(),
                    language,
                    ReplyMessage::NoSlotsAvailable,
                ))
                .await
            },
            Ok(slots) => {
                debug!(open = slots.len(), "Offering slots");
                self.send(
                    Reply::new(identity.clone(), language, ReplyMessage::ChooseSlot)
                        .with_choices(Reply::slot_choices(&slots)),
                )
                .await
            },
            Err(e) => {
                warn!(error = %e, "Failed to list open slots");
                self.storage_failure(identity, language).await
            },
        }
    }

    #[instrument(skip(self, state, slot), fields(identity = %state.identity(), slot = %slot))]
    async fn commit(
        &self,
        mut state: ConversationState,
        slot: SlotKey,
    ) -> Result<(), ApplicationError> {
        let identity = state.identity().clone();
        let language = state.language();

        self.send(Reply::new(
            identity.clone(),
            language,
            ReplyMessage::Processing,
        ))
        .await?;

        match self.run_commit(&state, slot).await {
            CommitOutcome::Registered(registration) => {
                state.complete();
                self.discard(&identity).await;
                info!(
                    step = %state.step(),
                    children = registration.children.len(),
                    "Registration committed"
                );
                self.send(Reply::new(
                    identity,
                    language,
                    ReplyMessage::Registered {
                        slot: registration.selected_slot,
                    },
                ))
                .await
            },
            CommitOutcome::DuplicateIdentity => {
                info!("Identity was registered by a concurrent commit");
                self.discard(&identity).await;
                let slot = self
                    .applicants
                    .find_by_identity(&identity)
                    .await
                    .ok()
                    .flatten()
                    .map_or(slot, |existing| existing.selected_slot);
                self.send(Reply::new(
                    identity,
                    language,
                    ReplyMessage::AlreadyRegistered {
                        slot,
                        detected: Detection::AtCommit,
                    },
                ))
                .await
            },
            CommitOutcome::SlotUnavailable => {
                info!("Slot is full or no longer offered");
                if !self.persist(state).await? {
                    return Ok(());
                }
                self.send(Reply::new(
                    identity.clone(),
                    language,
                    ReplyMessage::SlotUnavailable { slot },
                ))
                .await?;
                self.offer_slots(&identity, language).await
            },
            CommitOutcome::Failed(e) => {
                warn!(error = %e, "Commit failed, conversation kept");
                if !self.persist(state).await? {
                    return Ok(());
                }
                self.storage_failure(&identity, language).await
            },
        }
    }

    async fn run_commit(&self, state: &ConversationState, slot: SlotKey) -> CommitOutcome {
        match self.ledger.has_headroom(&slot).await {
            Ok(true) => {},
            Ok(false) => return CommitOutcome::SlotUnavailable,
            Err(e) => return CommitOutcome::Failed(e),
        }

        let registration = match state.build_registration(Utc::now()) {
            Ok(registration) => registration,
            Err(e) => return CommitOutcome::Failed(e.into()),
        };

        match self.applicants.insert(&registration).await {
            Ok(stored) => CommitOutcome::Registered(stored),
            Err(e) if e.is_duplicate_identity() => CommitOutcome::DuplicateIdentity,
            Err(e) => CommitOutcome::Failed(e),
        }
    }

    async fn discard(&self, identity: &Identity) {
        if let Err(e) = self.sessions.remove(identity).await {
            warn!(error = %e, "Failed to drop finished conversation");
        }
    }

    async fn storage_failure(
        &self,
        identity: &Identity,
        language: Option<Language>,
    ) -> Result<(), ApplicationError> {
        self.send(Reply::new(
            identity.clone(),
            language,
            ReplyMessage::StorageFailure,
        ))
        .await
    }

    async fn send(&self, reply: Reply) -> Result<(), ApplicationError> {
        debug!(message = ?reply.message, "Enqueueing reply");
        self.outbox.enqueue(reply).await
    }
}
