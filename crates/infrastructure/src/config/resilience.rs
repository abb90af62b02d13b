//! Startup resilience: retrying the database connection.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// How often and how patiently to retry opening the database
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectRetryConfig {
    /// Total connection attempts, including the first (default: 5)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Fixed pause between attempts in seconds (default: 20)
    #[serde(default = "default_backoff_secs")]
    pub backoff_secs: u64,
}

const fn default_max_attempts() -> u32 {
    5
}

const fn default_backoff_secs() -> u64 {
    20
}

impl Default for ConnectRetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            backoff_secs: default_backoff_secs(),
        }
    }
}

impl ConnectRetryConfig {
    /// Pause between attempts
    pub const fn backoff(&self) -> Duration {
        Duration::from_secs(self.backoff_secs)
    }
}
