//! Infrastructure layer - Adapters for external systems
//!
//! Implements ports defined in the application layer: SQLite storage for
//! slots and registrations, session stores, the reply channel, plus
//! configuration loading and logging setup.

pub mod config;
pub mod outbox;
pub mod persistence;
pub mod retry;
pub mod sessions;
pub mod telemetry;

pub use config::{
    AppConfig, ConnectRetryConfig, ConversationConfig, DatabaseConfig, LogFormat, LoggingConfig,
};
pub use outbox::ChannelOutbox;
pub use persistence::{
    ConnectionPool, DatabaseError, SqliteApplicantRepository, SqliteSlotCatalog,
    connect_with_retry, create_pool,
};
pub use retry::{RetryPolicy, RetryResult, Retryable, retry, with_retry};
pub use sessions::{InMemoryConversationStateStore, MokaConversationStateStore, session_store};
pub use telemetry::{TelemetryError, init_logging};
