//! SQLite slot catalog implementation
//!
//! Slots live in `available_slots`, one row per date and start time with
//! its registration limit. The conversation flow only reads them; `seed`
//! is used by the seeding tooling.

use std::sync::Arc;

use application::{error::ApplicationError, ports::SlotCatalog};
use async_trait::async_trait;
use domain::{Slot, SlotKey};
use rusqlite::{Connection, Row, params};
use tokio::task;
use tracing::{info, instrument};

use super::{connection::ConnectionPool, pooled, storage};

/// SQLite-based slot catalog
#[derive(Debug, Clone)]
pub struct SqliteSlotCatalog {
    pool: Arc<ConnectionPool>,
}

impl SqliteSlotCatalog {
    /// Create a new SQLite slot catalog
    #[must_use]
    pub const fn new(pool: Arc<ConnectionPool>) -> Self {
        Self { pool }
    }

    /// Create a slot, or change the limit of an existing one
    #[instrument(skip(self, slot), fields(slot = %slot.key, limit = slot.limit))]
    pub async fn seed(&self, slot: Slot) -> Result<(), ApplicationError> {
        let pool = Arc::clone(&self.pool);

        task::spawn_blocking(move || {
            let conn = pooled(&pool)?;

            conn.execute(
                r#"INSERT INTO available_slots (date, time, "limit") VALUES (?1, ?2, ?3)
                   ON CONFLICT(date, time) DO UPDATE SET "limit" = excluded."limit""#,
                params![slot.key.date_string(), slot.key.time_string(), slot.limit],
            )
            .map_err(storage)?;

            info!("Seeded slot");
            Ok(())
        })
        .await
        .map_err(|e| ApplicationError::Internal(e.to_string()))?
    }
}

#[async_trait]
impl SlotCatalog for SqliteSlotCatalog {
    #[instrument(skip(self))]
    async fn list_slots(&self) -> Result<Vec<Slot>, ApplicationError> {
        let pool = Arc::clone(&self.pool);

        task::spawn_blocking(move || {
            let conn = pooled(&pool)?;
            load_slots(&conn)
        })
        .await
        .map_err(|e| ApplicationError::Internal(e.to_string()))?
    }

    #[instrument(skip(self, key), fields(slot = %key))]
    async fn find_slot(&self, key: &SlotKey) -> Result<Option<Slot>, ApplicationError> {
        let pool = Arc::clone(&self.pool);
        let key = *key;

        // Rows are matched on the parsed key, not the stored text: slots seeded
        // by other tools may store `9:00` where the key renders `09:00`.
        task::spawn_blocking(move || {
            let conn = pooled(&pool)?;
            Ok(load_slots(&conn)?.into_iter().find(|slot| slot.key == key))
        })
        .await
        .map_err(|e| ApplicationError::Internal(e.to_string()))?
    }
}

fn load_slots(conn: &Connection) -> Result<Vec<Slot>, ApplicationError> {
    let mut stmt = conn
        .prepare(r#"SELECT date, time, "limit" FROM available_slots ORDER BY date ASC, time ASC"#)
        .map_err(storage)?;

    let mut slots = stmt
        .query_map([], row_to_slot)
        .map_err(storage)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(storage)?;

    // Text ordering puts `10:00` before `9:00`
    slots.sort_by_key(|slot| slot.key);
    Ok(slots)
}

fn row_to_slot(row: &Row<'_>) -> Result<Slot, rusqlite::Error> {
    let date: String = row.get(0)?;
    let time: String = row.get(1)?;
    let limit: u32 = row.get(2)?;

    let key = SlotKey::parse(&date, &time).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(Slot::new(key, limit))
}
