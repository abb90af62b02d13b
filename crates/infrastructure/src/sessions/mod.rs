//! Session stores for in-progress conversations
//!
//! Two adapters implement [`ConversationStateStore`]: an unbounded map that
//! keeps abandoned conversations for the life of the process, and a Moka
//! cache that evicts conversations left idle for a configured time.

mod in_memory;
mod moka_store;

use std::sync::Arc;

use application::ports::ConversationStateStore;
use tracing::info;

pub use in_memory::InMemoryConversationStateStore;
pub use moka_store::MokaConversationStateStore;

use crate::config::ConversationConfig;

/// Pick the session store the configuration asks for
pub fn session_store(config: &ConversationConfig) -> Arc<dyn ConversationStateStore> {
    match config.idle_ttl() {
        Some(idle_ttl) => {
            info!(
                idle_ttl_secs = idle_ttl.as_secs(),
                max_sessions = config.max_sessions,
                "Using idle-evicting session store"
            );
            Arc::new(MokaConversationStateStore::new(config.max_sessions, idle_ttl))
        },
        None => {
            info!("Using unbounded session store");
            Arc::new(InMemoryConversationStateStore::new())
        },
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use domain::{ConversationState, Identity};

    use super::*;

    #[tokio::test]
    async fn selected_store_round_trips_state() {
        for config in [
            ConversationConfig::default(),
            ConversationConfig {
                idle_ttl_secs: Some(600),
                max_sessions: 10,
            },
        ] {
            let store = session_store(&config);
            let state = ConversationState::new(Identity::from(5), Utc::now());

            store.put(state.clone()).await.unwrap();

            assert_eq!(store.get(&Identity::from(5)).await.unwrap(), Some(state));
        }
    }
}
