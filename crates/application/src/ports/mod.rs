//! Port definitions for application layer
//!
//! Ports are interfaces that define how the application interacts with
//! external systems. Adapters in the infrastructure layer implement these ports.

mod applicant_repository;
mod conversation_state_store;
mod reply_outbox;
mod slot_catalog;

pub use applicant_repository::ApplicantRepository;
#[cfg(test)]
pub use applicant_repository::MockApplicantRepository;
pub use conversation_state_store::ConversationStateStore;
pub use reply_outbox::ReplyOutbox;
pub use slot_catalog::SlotCatalog;
#[cfg(test)]
pub use slot_catalog::MockSlotCatalog;
