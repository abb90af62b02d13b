//! Persistence module
//!
//! SQLite-based storage for bookable slots and committed registrations.

pub mod applicant_repository;
pub mod connection;
pub mod migrations;
pub mod slot_catalog;

use application::ApplicationError;

pub use applicant_repository::SqliteApplicantRepository;
pub use connection::{ConnectionPool, DatabaseError, PooledConn, connect_with_retry, create_pool};
pub use slot_catalog::SqliteSlotCatalog;

/// Check out a pooled connection for a port call
pub(crate) fn pooled(pool: &ConnectionPool) -> Result<PooledConn, ApplicationError> {
    pool.get().map_err(storage)
}

/// Report a database failure as a storage error
pub(crate) fn storage(e: impl std::fmt::Display) -> ApplicationError {
    ApplicationError::Storage(e.to_string())
}
