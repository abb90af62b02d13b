//! SQLite applicant repository implementation
//!
//! Implements the ApplicantRepository port using SQLite. The `identity`
//! primary key is the one-registration-per-identity guard: a second insert
//! fails inside SQLite and is reported as a duplicate.

use std::{collections::HashMap, sync::Arc};

use application::{error::ApplicationError, ports::ApplicantRepository};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::{Address, Child, Identity, Language, PhoneNumber, Registration, SlotKey};
use rusqlite::{OptionalExtension, Row, ffi, params};
use tokio::task;
use tracing::{debug, instrument};

use super::{connection::ConnectionPool, pooled, storage};

/// SQLite-based registration store
#[derive(Debug, Clone)]
pub struct SqliteApplicantRepository {
    pool: Arc<ConnectionPool>,
}

impl SqliteApplicantRepository {
    /// Create a new SQLite applicant repository
    #[must_use]
    pub const fn new(pool: Arc<ConnectionPool>) -> Self {
        Self { pool }
    }
}

fn is_identity_conflict(error: &rusqlite::Error) -> bool {
    matches!(
        error,
        rusqlite::Error::SqliteFailure(err, _)
            if err.extended_code == ffi::SQLITE_CONSTRAINT_PRIMARYKEY
                || err.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

#[async_trait]
impl ApplicantRepository for SqliteApplicantRepository {
    #[instrument(skip(self, identity), fields(identity = %identity))]
    async fn find_by_identity(
        &self,
        identity: &Identity,
    ) -> Result<Option<Registration>, ApplicationError> {
        let pool = Arc::clone(&self.pool);
        let identity = identity.clone();

        task::spawn_blocking(move || {
            let conn = pooled(&pool)?;

            conn.query_row(
                "SELECT identity, full_name, phone_number, address, children, language,
                        selected_slot, created_at
                 FROM registrations WHERE identity = ?1",
                [identity.as_str()],
                row_to_registration,
            )
            .optional()
            .map_err(storage)
        })
        .await
        .map_err(|e| ApplicationError::Internal(e.to_string()))?
    }

    #[instrument(skip(self, registration), fields(identity = %registration.identity, slot = %registration.selected_slot))]
    async fn insert(&self, registration: &Registration) -> Result<Registration, ApplicationError> {
        let pool = Arc::clone(&self.pool);
        let registration = registration.clone();

        task::spawn_blocking(move || {
            let conn = pooled(&pool)?;

            let children = serde_json::to_string(&registration.children).map_err(|e| {
                ApplicationError::Internal(format!("Failed to serialize children: {e}"))
            })?;

            let inserted = conn.execute(
                "INSERT INTO registrations
                 (identity, full_name, phone_number, address, children, language,
                  selected_slot, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    registration.identity.as_str(),
                    registration.full_name,
                    registration.phone_number.as_str(),
                    registration.address.as_str(),
                    children,
                    registration.language.code(),
                    registration.selected_slot.label(),
                    registration.created_at.to_rfc3339(),
                ],
            );

            match inserted {
                Ok(_) => {
                    debug!("Inserted registration");
                    Ok(registration)
                },
                Err(e) if is_identity_conflict(&e) => {
                    debug!("Identity already registered");
                    Err(ApplicationError::DuplicateIdentity(registration.identity))
                },
                Err(e) => Err(storage(e)),
            }
        })
        .await
        .map_err(|e| ApplicationError::Internal(e.to_string()))?
    }

    #[instrument(skip(self), fields(slot = %slot))]
    async fn count_for_slot(&self, slot: &SlotKey) -> Result<u32, ApplicationError> {
        let pool = Arc::clone(&self.pool);
        let label = slot.label();

        task::spawn_blocking(move || {
            let conn = pooled(&pool)?;

            let count: i64 = conn
                .query_row(
                    "SELECT COUNT(*) FROM registrations WHERE selected_slot = ?1",
                    [&label],
                    |row| row.get(0),
                )
                .map_err(storage)?;

            Ok(u32::try_from(count).unwrap_or(u32::MAX))
        })
        .await
        .map_err(|e| ApplicationError::Internal(e.to_string()))?
    }

    #[instrument(skip(self))]
    async fn occupancy(&self) -> Result<HashMap<SlotKey, u32>, ApplicationError> {
        let pool = Arc::clone(&self.pool);

        task::spawn_blocking(move || {
            let conn = pooled(&pool)?;

            let mut stmt = conn
                .prepare(
                    "SELECT selected_slot, COUNT(*) FROM registrations GROUP BY selected_slot",
                )
                .map_err(storage)?;

            let rows = stmt
                .query_map([], |row| {
                    Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
                })
                .map_err(storage)?;

            let mut occupancy = HashMap::new();
            for row in rows {
                let (label, count) = row.map_err(storage)?;
                let key = SlotKey::parse_label(&label).map_err(storage)?;
                occupancy.insert(key, u32::try_from(count).unwrap_or(u32::MAX));
            }
            Ok(occupancy)
        })
        .await
        .map_err(|e| ApplicationError::Internal(e.to_string()))?
    }

    #[instrument(skip(self))]
    async fn list_all(&self) -> Result<Vec<Registration>, ApplicationError> {
        let pool = Arc::clone(&self.pool);

        task::spawn_blocking(move || {
            let conn = pooled(&pool)?;

            let mut stmt = conn
                .prepare(
                    "SELECT identity, full_name, phone_number, address, children, language,
                            selected_slot, created_at
                     FROM registrations ORDER BY selected_slot ASC, created_at ASC",
                )
                .map_err(storage)?;

            let registrations = stmt
                .query_map([], row_to_registration)
                .map_err(storage)?
                .collect::<Result<Vec<_>, _>>()
                .map_err(storage)?;

            Ok(registrations)
        })
        .await
        .map_err(|e| ApplicationError::Internal(e.to_string()))?
    }
}

fn conversion_error(
    column: usize,
    e: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(column, rusqlite::types::Type::Text, Box::new(e))
}

fn row_to_registration(row: &Row<'_>) -> Result<Registration, rusqlite::Error> {
    let identity: String = row.get(0)?;
    let full_name: String = row.get(1)?;
    let phone_number: String = row.get(2)?;
    let address: String = row.get(3)?;
    let children: String = row.get(4)?;
    let language: String = row.get(5)?;
    let selected_slot: String = row.get(6)?;
    let created_at: String = row.get(7)?;

    let children: Vec<Child> =
        serde_json::from_str(&children).map_err(|e| conversion_error(4, e))?;
    let created_at = DateTime::parse_from_rfc3339(&created_at)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion_error(7, e))?;

    Ok(Registration {
        identity: Identity::new(identity).map_err(|e| conversion_error(0, e))?,
        full_name,
        phone_number: PhoneNumber::new(phone_number).map_err(|e| conversion_error(2, e))?,
        address: Address::new(address).map_err(|e| conversion_error(3, e))?,
        children,
        language: language
            .parse::<Language>()
            .map_err(|e| conversion_error(5, e))?,
        selected_slot: SlotKey::parse_label(&selected_slot)
            .map_err(|e| conversion_error(6, e))?,
        created_at,
    })
}
