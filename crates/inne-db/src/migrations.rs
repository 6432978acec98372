//! Embedded SQL migrations and runner.
//!
//! Migrations are stored as `&str` constants with an `up` and a `down`
//! script and executed in version order. A `schema_migrations` table tracks
//! which versions have been applied.

use inne_core::{Error, Result};
use rusqlite::Connection;

/// A single reversible schema delta.
#[derive(Debug, Clone, Copy)]
pub struct Migration {
    pub version: i64,
    pub name: &'static str,
    pub up: &'static str,
    pub down: &'static str,
}

/// A row of the `schema_migrations` tracking table.
#[derive(Debug, Clone)]
pub struct AppliedMigration {
    pub version: i64,
    pub name: String,
    pub applied_at: String,
}

/// V1: initial schema -- the seven booking tables.
const V1_INITIAL_UP: &str = r#"
CREATE TABLE locations (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    name         TEXT NOT NULL,
    address      TEXT NOT NULL,
    contact_info TEXT NOT NULL CHECK (json_valid(contact_info))
);

CREATE TABLE therapists (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    name           TEXT NOT NULL,
    specialty      TEXT NOT NULL,
    experience     INTEGER NOT NULL,
    certifications TEXT,
    availability   TEXT CHECK (availability IS NULL OR json_valid(availability)),
    contact_info   TEXT NOT NULL CHECK (json_valid(contact_info)),
    location_id    INTEGER NOT NULL REFERENCES locations(id) ON DELETE RESTRICT
);

CREATE TABLE customers (
    id                     INTEGER PRIMARY KEY AUTOINCREMENT,
    name                   TEXT NOT NULL,
    age                    INTEGER NOT NULL,
    contact_info           TEXT NOT NULL CHECK (json_valid(contact_info)),
    health_records         TEXT CHECK (health_records IS NULL OR json_valid(health_records)),
    preferred_therapist_id INTEGER REFERENCES therapists(id) ON DELETE SET NULL,
    payment_preferences    TEXT CHECK (payment_preferences IS NULL OR json_valid(payment_preferences))
);

CREATE TABLE rooms (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    room_number  TEXT NOT NULL,
    capacity     INTEGER NOT NULL,
    equipment    TEXT CHECK (equipment IS NULL OR json_valid(equipment)),
    availability TEXT CHECK (availability IS NULL OR json_valid(availability)),
    location_id  INTEGER NOT NULL REFERENCES locations(id) ON DELETE RESTRICT
);

CREATE TABLE payment_types (
    id       INTEGER PRIMARY KEY AUTOINCREMENT,
    type     TEXT NOT NULL,
    discount REAL
);

CREATE TABLE therapy_options (
    id                           INTEGER PRIMARY KEY AUTOINCREMENT,
    name                         TEXT NOT NULL,
    type                         TEXT NOT NULL,
    duration                     INTEGER NOT NULL,
    price                        REAL NOT NULL,
    equipment_needed             TEXT CHECK (equipment_needed IS NULL OR json_valid(equipment_needed)),
    therapist_specialty_required TEXT NOT NULL
);

CREATE TABLE sessions (
    id                INTEGER PRIMARY KEY AUTOINCREMENT,
    therapist_id      INTEGER NOT NULL REFERENCES therapists(id) ON DELETE RESTRICT,
    customer_id       INTEGER NOT NULL REFERENCES customers(id) ON DELETE RESTRICT,
    room_id           INTEGER NOT NULL REFERENCES rooms(id) ON DELETE RESTRICT,
    therapy_option_id INTEGER NOT NULL REFERENCES therapy_options(id) ON DELETE RESTRICT,
    date              TEXT NOT NULL,
    duration          INTEGER NOT NULL,
    status            TEXT NOT NULL CHECK (status IN ('scheduled', 'completed', 'canceled')),
    feedback          TEXT,
    payment_status    TEXT NOT NULL CHECK (payment_status IN ('pending', 'completed')),
    location_id       INTEGER NOT NULL REFERENCES locations(id) ON DELETE RESTRICT
);
"#;

const V1_INITIAL_DOWN: &str = r#"
DROP TABLE sessions;
DROP TABLE customers;
DROP TABLE therapy_options;
DROP TABLE payment_types;
DROP TABLE rooms;
DROP TABLE therapists;
DROP TABLE locations;
"#;

/// V2: indexes backing the reverse-relationship lookups.
const V2_REVERSE_INDEXES_UP: &str = r#"
CREATE INDEX idx_therapists_location     ON therapists(location_id);
CREATE INDEX idx_therapists_specialty    ON therapists(specialty COLLATE NOCASE);
CREATE INDEX idx_customers_preferred     ON customers(preferred_therapist_id);
CREATE INDEX idx_rooms_location          ON rooms(location_id);
CREATE INDEX idx_sessions_location       ON sessions(location_id);
CREATE INDEX idx_sessions_therapist      ON sessions(therapist_id);
CREATE INDEX idx_sessions_customer       ON sessions(customer_id);
CREATE INDEX idx_sessions_room           ON sessions(room_id);
CREATE INDEX idx_sessions_therapy_option ON sessions(therapy_option_id);
"#;

const V2_REVERSE_INDEXES_DOWN: &str = r#"
DROP INDEX idx_sessions_therapy_option;
DROP INDEX idx_sessions_room;
DROP INDEX idx_sessions_customer;
DROP INDEX idx_sessions_therapist;
DROP INDEX idx_sessions_location;
DROP INDEX idx_rooms_location;
DROP INDEX idx_customers_preferred;
DROP INDEX idx_therapists_specialty;
DROP INDEX idx_therapists_location;
"#;

/// Ordered list of schema deltas.
pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "initial_schema",
        up: V1_INITIAL_UP,
        down: V1_INITIAL_DOWN,
    },
    Migration {
        version: 2,
        name: "reverse_relationship_indexes",
        up: V2_REVERSE_INDEXES_UP,
        down: V2_REVERSE_INDEXES_DOWN,
    },
];

fn ensure_tracking_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version    INTEGER PRIMARY KEY,
            name       TEXT NOT NULL,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
    )
    .map_err(|e| Error::database(format!("Failed to create schema_migrations: {e}")))
}

/// Run all pending migrations on `conn`.
///
/// Creates the `schema_migrations` tracking table if it does not exist,
/// then applies each outstanding migration inside a transaction.
pub fn run_migrations(conn: &Connection) -> Result<()> {
    ensure_tracking_table(conn)?;

    for m in MIGRATIONS {
        let already: bool = conn
            .query_row(
                "SELECT COUNT(*) > 0 FROM schema_migrations WHERE version = ?1",
                [m.version],
                |row| row.get(0),
            )
            .map_err(|e| Error::database(e.to_string()))?;

        if already {
            continue;
        }

        tracing::info!(version = m.version, name = m.name, "Applying migration");
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| Error::database(e.to_string()))?;

        tx.execute_batch(m.up)
            .map_err(|e| Error::database(format!("Migration V{} failed: {e}", m.version)))?;

        tx.execute(
            "INSERT INTO schema_migrations (version, name) VALUES (?1, ?2)",
            rusqlite::params![m.version, m.name],
        )
        .map_err(|e| Error::database(e.to_string()))?;

        tx.commit().map_err(|e| Error::database(e.to_string()))?;
    }

    Ok(())
}

/// Revert applied migrations newest-first until `target` is the highest
/// applied version. Returns the versions that were rolled back.
pub fn rollback_to(conn: &Connection, target: i64) -> Result<Vec<i64>> {
    if target < 0 {
        return Err(Error::Validation(format!("rollback target must be >= 0, got {target}")));
    }
    ensure_tracking_table(conn)?;

    let applied = applied_migrations(conn)?;
    let mut reverted = Vec::new();

    for entry in applied.iter().rev().filter(|a| a.version > target) {
        let m = MIGRATIONS
            .iter()
            .find(|m| m.version == entry.version)
            .ok_or_else(|| {
                Error::Internal(format!(
                    "applied migration V{} is unknown to this build",
                    entry.version
                ))
            })?;

        tracing::info!(version = m.version, name = m.name, "Reverting migration");
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| Error::database(e.to_string()))?;

        tx.execute_batch(m.down)
            .map_err(|e| Error::database(format!("Rollback of V{} failed: {e}", m.version)))?;

        tx.execute(
            "DELETE FROM schema_migrations WHERE version = ?1",
            [m.version],
        )
        .map_err(|e| Error::database(e.to_string()))?;

        tx.commit().map_err(|e| Error::database(e.to_string()))?;
        reverted.push(m.version);
    }

    Ok(reverted)
}

/// List applied migrations in version order.
pub fn applied_migrations(conn: &Connection) -> Result<Vec<AppliedMigration>> {
    ensure_tracking_table(conn)?;

    let mut stmt = conn
        .prepare("SELECT version, name, applied_at FROM schema_migrations ORDER BY version")
        .map_err(|e| Error::database(e.to_string()))?;
    let rows = stmt
        .query_map([], |row| {
            Ok(AppliedMigration {
                version: row.get(0)?,
                name: row.get(1)?,
                applied_at: row.get(2)?,
            })
        })
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::database(e.to_string()))?;
    Ok(rows)
}

/// Migrations known to this build that are not yet applied.
pub fn pending_migrations(conn: &Connection) -> Result<Vec<&'static Migration>> {
    let applied = applied_migrations(conn)?;
    Ok(MIGRATIONS
        .iter()
        .filter(|m| !applied.iter().any(|a| a.version == m.version))
        .collect())
}

/// Highest applied version, or 0 for an empty database.
pub fn current_version(conn: &Connection) -> Result<i64> {
    Ok(applied_migrations(conn)?
        .last()
        .map(|a| a.version)
        .unwrap_or(0))
}
