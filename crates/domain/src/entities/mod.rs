//! Domain entities - Objects with identity and lifecycle

mod conversation_state;
mod registration;
mod slot;

pub use conversation_state::{ConversationState, RegistrationStep};
pub use registration::{Child, Registration};
pub use slot::Slot;
