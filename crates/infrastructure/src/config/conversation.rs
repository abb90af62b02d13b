//! In-progress conversation storage settings.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Session store configuration
///
/// Without `idle_ttl_secs` abandoned conversations are kept until the
/// process exits. With it, a conversation untouched for that long is
/// evicted and the applicant has to `/start` again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationConfig {
    /// Evict conversations idle for this many seconds (default: never)
    #[serde(default)]
    pub idle_ttl_secs: Option<u64>,

    /// Upper bound on conversations held at once when eviction is enabled
    #[serde(default = "default_max_sessions")]
    pub max_sessions: u64,
}

const fn default_max_sessions() -> u64 {
    10_000
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            idle_ttl_secs: None,
            max_sessions: default_max_sessions(),
        }
    }
}

impl ConversationConfig {
    /// Idle timeout, if eviction is enabled
    pub fn idle_ttl(&self) -> Option<Duration> {
        self.idle_ttl_secs.map(Duration::from_secs)
    }
}
