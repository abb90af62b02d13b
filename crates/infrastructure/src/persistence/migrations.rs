//! Database migrations
//!
//! Manages database schema versioning and migrations.
//!
//! ## Rollback Strategy
//!
//! Rollbacks are manual - if a migration fails:
//! 1. Check the error message for details
//! 2. Fix the underlying issue
//! 3. Manually repair the database if needed
//! 4. Re-run migrations
//!
//! ## Adding New Migrations
//!
//! 1. Increment `SCHEMA_VERSION` constant
//! 2. Add a new `migrate_vX` function
//! 3. Update `run_migrations` to call the new function

use rusqlite::Connection;
use tracing::{debug, error, info};

use super::connection::DatabaseError;

/// Current schema version
pub const SCHEMA_VERSION: i32 = 2;

/// Run all pending migrations
pub fn run_migrations(conn: &Connection) -> Result<(), DatabaseError> {
    let current_version = get_schema_version(conn)?;

    if current_version < SCHEMA_VERSION {
        info!(
            from_version = current_version,
            to_version = SCHEMA_VERSION,
            "Running database migrations"
        );

        if current_version < 1 {
            if let Err(e) = migrate_v1(conn) {
                error!(version = 1, error = %e, "Migration V001 (available slots) failed");
                return Err(e);
            }
        }

        if current_version < 2 {
            if let Err(e) = migrate_v2(conn) {
                error!(version = 2, error = %e, "Migration V002 (registrations) failed");
                return Err(e);
            }
        }

        set_schema_version(conn, SCHEMA_VERSION)?;
        info!(version = SCHEMA_VERSION, "Database migrations complete");
    } else {
        debug!(version = current_version, "Database schema is up to date");
    }

    Ok(())
}

/// Get current schema version
fn get_schema_version(conn: &Connection) -> Result<i32, DatabaseError> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        )",
        [],
    )?;

    let version: i32 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_version",
            [],
            |row| row.get(0),
        )
        .unwrap_or(0);

    Ok(version)
}

/// Set schema version
fn set_schema_version(conn: &Connection, version: i32) -> Result<(), DatabaseError> {
    conn.execute("DELETE FROM schema_version", [])?;
    conn.execute(
        "INSERT INTO schema_version (version) VALUES (?1)",
        [version],
    )?;
    Ok(())
}

/// Migration to version 1: bookable slots
///
/// Rows are written by the seeding process, one per date and start time.
fn migrate_v1(conn: &Connection) -> Result<(), DatabaseError> {
    debug!("Applying migration V001: available slots");

    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS available_slots (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            date TEXT NOT NULL,
            time TEXT NOT NULL,
            "limit" INTEGER NOT NULL CHECK("limit" >= 0),
            UNIQUE(date, time)
        );
        "#,
    )?;

    Ok(())
}

/// Migration to version 2: committed registrations
///
/// `identity` is the primary key: the insert itself rejects a second
/// registration for the same identity.
fn migrate_v2(conn: &Connection) -> Result<(), DatabaseError> {
    debug!("Applying migration V002: registrations");

    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS registrations (
            identity TEXT PRIMARY KEY,
            full_name TEXT NOT NULL,
            phone_number TEXT NOT NULL,
            address TEXT NOT NULL,
            children TEXT NOT NULL,
            language TEXT NOT NULL CHECK(language IN ('ro', 'ru')),
            selected_slot TEXT NOT NULL,
            created_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_registrations_slot ON registrations(selected_slot);
        ",
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_connection() -> Connection {
        Connection::open_in_memory().unwrap()
    }

    #[test]
    fn migrations_run_successfully() {
        let conn = create_test_connection();
        run_migrations(&conn).unwrap();
        assert_eq!(get_schema_version(&conn).unwrap(), SCHEMA_VERSION);
    }

    #[test]
    fn migrations_are_idempotent() {
        let conn = create_test_connection();
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();
        assert_eq!(get_schema_version(&conn).unwrap(), SCHEMA_VERSION);
    }

    #[test]
    fn upgrade_from_version_one() {
        let conn = create_test_connection();
        get_schema_version(&conn).unwrap();
        migrate_v1(&conn).unwrap();
        set_schema_version(&conn, 1).unwrap();

        run_migrations(&conn).unwrap();

        let tables: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'registrations'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 1);
    }

    #[test]
    fn slot_date_and_time_are_unique() {
        let conn = create_test_connection();
        run_migrations(&conn).unwrap();

        conn.execute(
            r#"INSERT INTO available_slots (date, time, "limit") VALUES ('2024-12-25', '10:00', 10)"#,
            [],
        )
        .unwrap();
        let duplicate = conn.execute(
            r#"INSERT INTO available_slots (date, time, "limit") VALUES ('2024-12-25', '10:00', 5)"#,
            [],
        );
        assert!(duplicate.is_err());
    }

    #[test]
    fn registration_identity_is_unique() {
        let conn = create_test_connection();
        run_migrations(&conn).unwrap();

        let insert = "INSERT INTO registrations
             (identity, full_name, phone_number, address, children, language, selected_slot, created_at)
             VALUES ('42', 'Ion Popescu', '069123456', 'Chisinau 1', '[]', 'ro', '2024-12-25 10:00', '2024-12-01T00:00:00Z')";
        conn.execute(insert, []).unwrap();
        assert!(conn.execute(insert, []).is_err());
    }

    #[test]
    fn registration_language_is_checked() {
        let conn = create_test_connection();
        run_migrations(&conn).unwrap();

        let result = conn.execute(
            "INSERT INTO registrations
             (identity, full_name, phone_number, address, children, language, selected_slot, created_at)
             VALUES ('43', 'Ion Popescu', '069123456', 'Chisinau 1', '[]', 'en', '2024-12-25 10:00', '2024-12-01T00:00:00Z')",
            [],
        );
        assert!(result.is_err());
    }
}
