//! Conversation state store port
//!
//! Holds the in-progress conversation of every identity. The engine owns
//! the store exclusively; the backing can be a plain map, a TTL-bounded
//! cache, or something durable.

use async_trait::async_trait;
use domain::{ConversationState, Identity};

use crate::error::ApplicationError;

/// Port for per-identity conversation state
#[async_trait]
pub trait ConversationStateStore: Send + Sync {
    /// Get the conversation of an identity
    async fn get(&self, identity: &Identity) -> Result<Option<ConversationState>, ApplicationError>;

    /// Insert or replace the conversation keyed by its identity
    async fn put(&self, state: ConversationState) -> Result<(), ApplicationError>;

    /// Remove the conversation of an identity
    ///
    /// Returns true if a conversation was removed.
    async fn remove(&self, identity: &Identity) -> Result<bool, ApplicationError>;

    /// Number of conversations currently held
    async fn count(&self) -> Result<usize, ApplicationError>;
}
