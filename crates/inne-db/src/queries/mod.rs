//! Database query modules, plus the constraint helpers they share.

pub mod customers;
pub mod locations;
pub mod payment_types;
pub mod rooms;
pub mod sessions;
pub mod therapists;
pub mod therapy_options;

use inne_core::{Error, Result};
use rusqlite::{ffi, Connection};
use serde::Serialize;
use serde_json::Value;

use crate::models::JsonMap;

/// Every entity table, in creation order.
pub const TABLES: [&str; 7] = [
    "locations",
    "therapists",
    "customers",
    "rooms",
    "payment_types",
    "therapy_options",
    "sessions",
];

/// Map an INSERT/UPDATE failure to the error taxonomy.
///
/// Foreign-key targets are checked up front, so an FK failure here means a
/// concurrent writer removed the target between the check and the write.
pub(crate) fn write_err(e: rusqlite::Error) -> Error {
    if let rusqlite::Error::SqliteFailure(ref err, ref msg) = e {
        let detail = msg.clone().unwrap_or_else(|| e.to_string());
        match err.extended_code {
            ffi::SQLITE_CONSTRAINT_FOREIGNKEY
            | ffi::SQLITE_CONSTRAINT_NOTNULL
            | ffi::SQLITE_CONSTRAINT_CHECK => return Error::Validation(detail),
            _ => {}
        }
    }
    Error::database(e.to_string())
}

/// Map a DELETE failure; FK failures mean dependents still exist.
pub(crate) fn delete_err(e: rusqlite::Error) -> Error {
    if let rusqlite::Error::SqliteFailure(ref err, _) = e {
        if err.extended_code == ffi::SQLITE_CONSTRAINT_FOREIGNKEY {
            return Error::Conflict(format!("row is still referenced: {e}"));
        }
    }
    Error::database(e.to_string())
}

/// Fail with [`Error::ForeignKey`] unless `table` has a row with `id`.
pub(crate) fn ensure_exists(
    conn: &Connection,
    table: &str,
    field: &str,
    entity: &str,
    id: i64,
) -> Result<()> {
    let exists: bool = conn
        .query_row(
            &format!("SELECT EXISTS(SELECT 1 FROM {table} WHERE id = ?1)"),
            [id],
            |row| row.get(0),
        )
        .map_err(|e| Error::database(e.to_string()))?;
    if exists {
        Ok(())
    } else {
        Err(Error::foreign_key(field, entity, id))
    }
}

/// Count rows of `table` whose `column` points at `id`.
pub(crate) fn count_references(
    conn: &Connection,
    table: &str,
    column: &str,
    id: i64,
) -> Result<i64> {
    conn.query_row(
        &format!("SELECT COUNT(*) FROM {table} WHERE {column} = ?1"),
        [id],
        |row| row.get(0),
    )
    .map_err(|e| Error::database(e.to_string()))
}

/// Contact info is required and must carry at least one entry.
pub(crate) fn validate_contact_info(contact_info: &JsonMap) -> Result<()> {
    if contact_info.is_empty() {
        return Err(Error::Validation("contact_info is required".into()));
    }
    Ok(())
}

/// SQLite stores NaN as NULL, so non-finite amounts never reach a write.
pub(crate) fn validate_finite(field: &str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(Error::Validation(format!("{field} must be a finite number, got {value}")))
    }
}

pub(crate) fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(|e| Error::Internal(e.to_string()))
}

/// Serialize an optional flexible field; JSON `null` is stored as SQL NULL.
pub(crate) fn opt_json(value: Option<&Value>) -> Result<Option<String>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(v) => to_json(v).map(Some),
    }
}

/// Row count of every entity table, in [`TABLES`] order.
pub fn table_counts(conn: &Connection) -> Result<Vec<(&'static str, i64)>> {
    TABLES
        .iter()
        .map(|&table| {
            conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
                row.get(0)
            })
            .map(|n| (table, n))
            .map_err(|e| Error::database(e.to_string()))
        })
        .collect()
}
