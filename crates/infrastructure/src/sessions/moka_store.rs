//! Moka-backed session store with idle eviction

use std::time::Duration;

use application::{error::ApplicationError, ports::ConversationStateStore};
use async_trait::async_trait;
use domain::{ConversationState, Identity};
use moka::future::Cache;
use tracing::{debug, instrument};

/// Conversations keyed by identity, evicted after a period without input
///
/// Capacity is counted in conversations. When full, Moka evicts the entries
/// it considers least likely to be used again.
pub struct MokaConversationStateStore {
    cache: Cache<Identity, ConversationState>,
}

impl std::fmt::Debug for MokaConversationStateStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MokaConversationStateStore")
            .field("entries", &self.cache.entry_count())
            .finish()
    }
}

impl MokaConversationStateStore {
    /// Create a store holding at most `max_sessions`, each evicted after
    /// `idle_ttl` without a read or write
    #[must_use]
    pub fn new(max_sessions: u64, idle_ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_sessions)
            .time_to_idle(idle_ttl)
            .build();
        Self { cache }
    }
}

#[async_trait]
impl ConversationStateStore for MokaConversationStateStore {
    async fn get(&self, identity: &Identity) -> Result<Option<ConversationState>, ApplicationError> {
        Ok(self.cache.get(identity).await)
    }

    #[instrument(skip(self, state), fields(identity = %state.identity(), step = %state.step()))]
    async fn put(&self, state: ConversationState) -> Result<(), ApplicationError> {
        self.cache.insert(state.identity().clone(), state).await;
        debug!("Stored conversation");
        Ok(())
    }

    async fn remove(&self, identity: &Identity) -> Result<bool, ApplicationError> {
        Ok(self.cache.remove(identity).await.is_some())
    }

    async fn count(&self) -> Result<usize, ApplicationError> {
        self.cache.run_pending_tasks().await;
        Ok(usize::try_from(self.cache.entry_count()).unwrap_or(usize::MAX))
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn store(idle: Duration) -> MokaConversationStateStore {
        MokaConversationStateStore::new(100, idle)
    }

    #[tokio::test]
    async fn put_get_remove() {
        let store = store(Duration::from_secs(60));
        let id = Identity::from(1);

        store
            .put(ConversationState::new(id.clone(), Utc::now()))
            .await
            .unwrap();
        assert!(store.get(&id).await.unwrap().is_some());
        assert_eq!(store.count().await.unwrap(), 1);

        assert!(store.remove(&id).await.unwrap());
        assert!(store.get(&id).await.unwrap().is_none());
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn idle_conversation_is_evicted() {
        let store = store(Duration::from_millis(50));
        let id = Identity::from(2);

        store
            .put(ConversationState::new(id.clone(), Utc::now()))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(150)).await;

        assert!(store.get(&id).await.unwrap().is_none());
    }

    #[test]
    fn debug_output() {
        let store = store(Duration::from_secs(1));
        assert!(format!("{store:?}").contains("MokaConversationStateStore"));
    }
}
