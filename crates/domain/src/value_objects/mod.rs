//! Value Objects - Immutable, identity-less domain primitives

mod address;
mod child_count;
mod identity;
mod language;
mod phone_number;
mod slot_key;

pub use address::Address;
pub use child_count::ChildCount;
pub use identity::Identity;
pub use language::Language;
pub use phone_number::PhoneNumber;
pub use slot_key::SlotKey;
