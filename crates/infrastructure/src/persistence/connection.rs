//! Database connection management
//!
//! Provides SQLite connection pooling via r2d2.

use std::path::Path;

use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{Connection, ErrorCode};
use thiserror::Error;
use tokio::task;
use tracing::{debug, info, instrument};

use crate::{
    config::{ConnectRetryConfig, DatabaseConfig},
    retry::{RetryPolicy, Retryable, retry},
};

/// Database errors
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Migration error: {0}")]
    Migration(String),

    #[error("I/O error: {0}")]
    Io(String),
}

impl Retryable for DatabaseError {
    fn is_retryable(&self) -> bool {
        match self {
            Self::Pool(_) | Self::Io(_) => true,
            Self::Sqlite(rusqlite::Error::SqliteFailure(err, _)) => matches!(
                err.code,
                ErrorCode::DatabaseBusy
                    | ErrorCode::DatabaseLocked
                    | ErrorCode::CannotOpen
                    | ErrorCode::SystemIoFailure
            ),
            Self::Sqlite(_) | Self::Migration(_) => false,
        }
    }
}

/// SQLite connection pool type alias
pub type ConnectionPool = Pool<SqliteConnectionManager>;

/// Pooled connection type alias
pub type PooledConn = PooledConnection<SqliteConnectionManager>;

/// Create a new connection pool
pub fn create_pool(config: &DatabaseConfig) -> Result<ConnectionPool, DatabaseError> {
    info!(path = %config.path, max_connections = config.max_connections, "Creating database connection pool");

    let in_memory = config.path == ":memory:";
    let manager = if in_memory {
        SqliteConnectionManager::memory()
    } else {
        if let Some(parent) = Path::new(&config.path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    DatabaseError::Io(format!("Failed to create database directory: {e}"))
                })?;
            }
        }
        SqliteConnectionManager::file(&config.path)
    };

    // Each in-memory connection is a separate database
    let max_size = if in_memory { 1 } else { config.max_connections };
    let pool = Pool::builder().max_size(max_size).build(manager)?;

    {
        let conn = pool.get()?;
        initialize_database(&conn)?;
    }

    if config.run_migrations {
        let conn = pool.get()?;
        crate::persistence::migrations::run_migrations(&conn)?;
    }

    debug!("Database connection pool created successfully");
    Ok(pool)
}

/// Create a pool, retrying transient failures
///
/// Attempts are bounded by `retry.max_attempts` with a fixed pause of
/// `retry.backoff_secs` between them. Migration errors are not retried.
#[instrument(skip_all, fields(path = %config.path, max_attempts = retry_config.max_attempts))]
pub async fn connect_with_retry(
    config: &DatabaseConfig,
    retry_config: &ConnectRetryConfig,
) -> Result<ConnectionPool, DatabaseError> {
    let policy = RetryPolicy::from(retry_config);

    retry(&policy, || {
        let config = config.clone();
        async move {
            task::spawn_blocking(move || create_pool(&config))
                .await
                .map_err(|e| DatabaseError::Io(e.to_string()))?
        }
    })
    .await
}

/// Initialize database with basic settings
fn initialize_database(conn: &Connection) -> Result<(), DatabaseError> {
    conn.execute_batch(
        "
        PRAGMA foreign_keys = ON;
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA busy_timeout = 5000;
        ",
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_in_memory_pool() {
        let pool = create_pool(&DatabaseConfig::in_memory());
        assert!(pool.is_ok());
    }

    #[test]
    fn in_memory_pool_is_migrated() {
        let pool = create_pool(&DatabaseConfig::in_memory()).unwrap();
        let conn = pool.get().unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM registrations", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn in_memory_pool_holds_one_connection() {
        let config = DatabaseConfig {
            path: ":memory:".to_string(),
            max_connections: 5,
            run_migrations: true,
        };
        let pool = create_pool(&config).unwrap();
        assert_eq!(pool.max_size(), 1);

        let conn = pool.get().unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM available_slots", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn file_pool_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("registrations.db");
        let config = DatabaseConfig {
            path: path.to_string_lossy().into_owned(),
            max_connections: 2,
            run_migrations: true,
        };

        create_pool(&config).unwrap();
        assert!(path.exists());
    }

    #[tokio::test]
    async fn connect_with_retry_succeeds() {
        let retry_config = ConnectRetryConfig {
            max_attempts: 2,
            backoff_secs: 0,
        };
        let pool = connect_with_retry(&DatabaseConfig::in_memory(), &retry_config).await;
        assert!(pool.is_ok());
    }

    #[tokio::test]
    async fn connect_with_retry_gives_up() {
        let blocker = tempfile::NamedTempFile::new().unwrap();
        let config = DatabaseConfig {
            path: blocker
                .path()
                .join("data")
                .join("registrations.db")
                .to_string_lossy()
                .into_owned(),
            max_connections: 1,
            run_migrations: true,
        };
        let retry_config = ConnectRetryConfig {
            max_attempts: 3,
            backoff_secs: 0,
        };

        let result = connect_with_retry(&config, &retry_config).await;
        assert!(matches!(result, Err(DatabaseError::Io(_))));
    }

    #[test]
    fn migration_errors_are_not_retried() {
        assert!(!DatabaseError::Migration("bad".into()).is_retryable());
        assert!(DatabaseError::Io("not mounted".into()).is_retryable());
    }

    #[test]
    fn database_error_display() {
        let err = DatabaseError::Io("disk gone".to_string());
        assert!(err.to_string().contains("disk gone"));
    }
}
