//! Unbounded in-memory session store

use std::collections::HashMap;

use application::{error::ApplicationError, ports::ConversationStateStore};
use async_trait::async_trait;
use domain::{ConversationState, Identity};
use parking_lot::RwLock;
use tracing::{debug, instrument};

/// Conversations keyed by identity, never evicted
#[derive(Debug, Default)]
pub struct InMemoryConversationStateStore {
    states: RwLock<HashMap<Identity, ConversationState>>,
}

impl InMemoryConversationStateStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConversationStateStore for InMemoryConversationStateStore {
    async fn get(&self, identity: &Identity) -> Result<Option<ConversationState>, ApplicationError> {
        Ok(self.states.read().get(identity).cloned())
    }

    #[instrument(skip(self, state), fields(identity = %state.identity(), step = %state.step()))]
    async fn put(&self, state: ConversationState) -> Result<(), ApplicationError> {
        self.states.write().insert(state.identity().clone(), state);
        debug!("Stored conversation");
        Ok(())
    }

    async fn remove(&self, identity: &Identity) -> Result<bool, ApplicationError> {
        Ok(self.states.write().remove(identity).is_some())
    }

    async fn count(&self) -> Result<usize, ApplicationError> {
        Ok(self.states.read().len())
    }
}
