//! Application layer - Use cases and orchestration
//!
//! Contains the conversation engine, the slot ledger, and the port
//! definitions that storage and transport adapters implement.

pub mod callback;
pub mod error;
pub mod ports;
pub mod reply;
pub mod services;

pub use callback::{CallbackPayload, InboundEvent};
pub use error::ApplicationError;
pub use ports::*;
pub use reply::{Choice, Detection, Reply, ReplyMessage};
pub use services::*;
