//! Application services - Use case implementations

mod conversation_engine;
mod slot_ledger;

pub use conversation_engine::ConversationEngine;
pub use slot_ledger::{OpenSlot, SlotLedger};
