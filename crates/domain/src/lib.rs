//! Domain layer for the holiday registration bot
//!
//! Contains the registration vocabulary: value objects with their validation
//! rules, the persisted entities, and the per-identity conversation state
//! machine. This layer performs no I/O.

pub mod dialog;
pub mod entities;
pub mod errors;
pub mod value_objects;

pub use dialog::{DialogEffect, DialogEvent, EventKind, Prompt, ValidationFailure};
pub use entities::*;
pub use errors::DomainError;
pub use value_objects::*;
