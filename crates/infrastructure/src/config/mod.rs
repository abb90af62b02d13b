//! Application configuration
//!
//! Split into focused sub-modules:
//! - `database`: SQLite database settings
//! - `resilience`: connection retry at startup
//! - `conversation`: in-progress session storage
//! - `logging`: log format and filter
//!
//! Sources are layered: built-in defaults, then an optional `config.toml`,
//! then `REGISTRATION_*` environment variables where `__` separates nested
//! keys (e.g. `REGISTRATION_DATABASE__PATH`).

mod conversation;
mod database;
mod logging;
mod resilience;

use std::path::Path;

use serde::{Deserialize, Serialize};

pub use conversation::ConversationConfig;
pub use database::DatabaseConfig;
pub use logging::{LogFormat, LoggingConfig};
pub use resilience::ConnectRetryConfig;

/// Prefix of environment variable overrides
pub const ENV_PREFIX: &str = "REGISTRATION";

/// Shared default for boolean `true` fields across config structs
pub(crate) const fn default_true() -> bool {
    true
}

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Registration and slot storage
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Database connection retry
    #[serde(default)]
    pub connect_retry: ConnectRetryConfig,

    /// In-progress conversations
    #[serde(default)]
    pub conversation: ConversationConfig,

    /// Log output
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from `config.toml` (if present) and the environment
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::layered(None)
    }

    /// Load configuration from an explicit file, still applying env overrides
    pub fn load_from(path: &Path) -> Result<Self, config::ConfigError> {
        Self::layered(Some(path))
    }

    fn layered(path: Option<&Path>) -> Result<Self, config::ConfigError> {
        let file = path.map_or_else(
            || config::File::with_name("config").required(false),
            |path| config::File::from(path).required(true),
        );

        let config = config::Config::builder()
            // Start with defaults
            .set_default("database.path", "registrations.db")?
            .set_default("logging.format", "text")?
            .add_source(file)
            // Override with environment variables (e.g., REGISTRATION_DATABASE__PATH)
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn defaults() {
        let config = AppConfig::default();
        assert_eq!(config.database.path, "registrations.db");
        assert_eq!(config.database.max_connections, 5);
        assert!(config.database.run_migrations);
        assert_eq!(config.connect_retry.max_attempts, 5);
        assert_eq!(config.connect_retry.backoff_secs, 20);
        assert_eq!(config.conversation.idle_ttl_secs, None);
        assert!(config.conversation.idle_ttl().is_none());
        assert_eq!(config.logging.format, LogFormat::Text);
        assert_eq!(config.logging.filter, "info");
    }

    #[test]
    fn load_from_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[database]
path = "/var/lib/registration/data.db"

[connect_retry]
max_attempts = 2
backoff_secs = 1

[conversation]
idle_ttl_secs = 3600
max_sessions = 50

[logging]
format = "json"
"#
        )
        .unwrap();

        let config = AppConfig::load_from(file.path()).unwrap();

        assert_eq!(config.database.path, "/var/lib/registration/data.db");
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.connect_retry.max_attempts, 2);
        assert_eq!(
            config.conversation.idle_ttl(),
            Some(std::time::Duration::from_secs(3600))
        );
        assert_eq!(config.conversation.max_sessions, 50);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.logging.filter, "info");
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let result = AppConfig::load_from(Path::new("/nonexistent/registration.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn deserialize_partial_json() {
        let config: AppConfig =
            serde_json::from_str(r#"{"database": {"path": ":memory:"}}"#).unwrap();
        assert_eq!(config.database.path, ":memory:");
        assert_eq!(config.connect_retry, ConnectRetryConfig::default());
    }

    #[test]
    fn in_memory_database_uses_one_connection() {
        let config = DatabaseConfig::in_memory();
        assert_eq!(config.path, ":memory:");
        assert_eq!(config.max_connections, 1);
    }

    #[test]
    fn log_format_parsing() {
        assert_eq!("json".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("TEXT".parse::<LogFormat>().unwrap(), LogFormat::Text);
        assert!("xml".parse::<LogFormat>().is_err());
        assert_eq!(LogFormat::Json.to_string(), "json");
    }

    #[test]
    fn connect_backoff_duration() {
        let retry = ConnectRetryConfig {
            max_attempts: 3,
            backoff_secs: 7,
        };
        assert_eq!(retry.backoff(), std::time::Duration::from_secs(7));
    }
}
