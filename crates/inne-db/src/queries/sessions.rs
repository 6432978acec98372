//! Session CRUD and lookup operations.
//!
//! A session ties together one therapist, customer, room, therapy option
//! and location. Every reference is checked before the row is written, and
//! the check and the write share a transaction, so a rejected booking leaves
//! nothing behind.

use inne_core::{CustomerId, Error, LocationId, Result, SessionId, TherapistId};
use rusqlite::Connection;

use super::{ensure_exists, write_err};
use crate::models::{NewSession, Session, DATETIME_FORMAT};

const COLS: &str = "id, therapist_id, customer_id, room_id, therapy_option_id, location_id,
    date, duration, status, feedback, payment_status";

/// Check every reference in field order; the first missing target wins.
fn check_refs(conn: &Connection, new: &NewSession) -> Result<()> {
    ensure_exists(conn, "therapists", "therapist_id", "therapist", new.therapist_id.get())?;
    ensure_exists(conn, "customers", "customer_id", "customer", new.customer_id.get())?;
    ensure_exists(conn, "rooms", "room_id", "room", new.room_id.get())?;
    ensure_exists(
        conn,
        "therapy_options",
        "therapy_option_id",
        "therapy option",
        new.therapy_option_id.get(),
    )?;
    ensure_exists(conn, "locations", "location_id", "location", new.location_id.get())?;
    Ok(())
}

fn query_list(conn: &Connection, sql: &str, param: i64) -> Result<Vec<Session>> {
    let mut stmt = conn
        .prepare(sql)
        .map_err(|e| Error::database(e.to_string()))?;
    let rows = stmt
        .query_map([param], Session::from_row)
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::database(e.to_string()))?;
    Ok(rows)
}

/// Book a new session.
pub fn create_session(conn: &Connection, new: &NewSession) -> Result<Session> {
    let tx = conn
        .unchecked_transaction()
        .map_err(|e| Error::database(e.to_string()))?;
    check_refs(&tx, new)?;

    tx.execute(
        "INSERT INTO sessions (therapist_id, customer_id, room_id, therapy_option_id,
            location_id, date, duration, status, feedback, payment_status)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        rusqlite::params![
            new.therapist_id.get(),
            new.customer_id.get(),
            new.room_id.get(),
            new.therapy_option_id.get(),
            new.location_id.get(),
            new.date.format(DATETIME_FORMAT).to_string(),
            new.duration_minutes,
            new.status.as_str(),
            new.feedback,
            new.payment_status.as_str(),
        ],
    )
    .map_err(write_err)?;
    let id = SessionId::from(tx.last_insert_rowid());
    tx.commit().map_err(|e| Error::database(e.to_string()))?;

    tracing::debug!(
        session_id = %id,
        therapist_id = %new.therapist_id,
        date = %new.date,
        "Session booked"
    );
    Ok(Session::from_new(id, new))
}

/// Get a session by ID.
pub fn get_session(conn: &Connection, id: SessionId) -> Result<Option<Session>> {
    let result = conn.query_row(
        &format!("SELECT {COLS} FROM sessions WHERE id = ?1"),
        [id.get()],
        Session::from_row,
    );
    match result {
        Ok(s) => Ok(Some(s)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(Error::database(e.to_string())),
    }
}

/// List all sessions ordered by ID.
pub fn list_sessions(conn: &Connection) -> Result<Vec<Session>> {
    let mut stmt = conn
        .prepare(&format!("SELECT {COLS} FROM sessions ORDER BY id"))
        .map_err(|e| Error::database(e.to_string()))?;
    let rows = stmt
        .query_map([], Session::from_row)
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::database(e.to_string()))?;
    Ok(rows)
}

/// Reverse relationship: sessions held at `location_id`.
pub fn list_sessions_by_location(
    conn: &Connection,
    location_id: LocationId,
) -> Result<Vec<Session>> {
    query_list(
        conn,
        &format!("SELECT {COLS} FROM sessions WHERE location_id = ?1 ORDER BY id"),
        location_id.get(),
    )
}

/// A therapist's sessions in chronological order.
pub fn list_sessions_for_therapist(
    conn: &Connection,
    therapist_id: TherapistId,
) -> Result<Vec<Session>> {
    query_list(
        conn,
        &format!("SELECT {COLS} FROM sessions WHERE therapist_id = ?1 ORDER BY date, id"),
        therapist_id.get(),
    )
}

/// A customer's sessions in chronological order.
pub fn list_sessions_for_customer(
    conn: &Connection,
    customer_id: CustomerId,
) -> Result<Vec<Session>> {
    query_list(
        conn,
        &format!("SELECT {COLS} FROM sessions WHERE customer_id = ?1 ORDER BY date, id"),
        customer_id.get(),
    )
}

/// Overwrite a session's fields.
pub fn update_session(conn: &Connection, id: SessionId, new: &NewSession) -> Result<bool> {
    let tx = conn
        .unchecked_transaction()
        .map_err(|e| Error::database(e.to_string()))?;
    check_refs(&tx, new)?;

    let n = tx
        .execute(
            "UPDATE sessions SET therapist_id = ?1, customer_id = ?2, room_id = ?3,
                therapy_option_id = ?4, location_id = ?5, date = ?6, duration = ?7,
                status = ?8, feedback = ?9, payment_status = ?10
             WHERE id = ?11",
            rusqlite::params![
                new.therapist_id.get(),
                new.customer_id.get(),
                new.room_id.get(),
                new.therapy_option_id.get(),
                new.location_id.get(),
                new.date.format(DATETIME_FORMAT).to_string(),
                new.duration_minutes,
                new.status.as_str(),
                new.feedback,
                new.payment_status.as_str(),
                id.get(),
            ],
        )
        .map_err(write_err)?;
    tx.commit().map_err(|e| Error::database(e.to_string()))?;
    Ok(n > 0)
}

/// Delete a session.
pub fn delete_session(conn: &Connection, id: SessionId) -> Result<bool> {
    let n = conn
        .execute("DELETE FROM sessions WHERE id = ?1", [id.get()])
        .map_err(|e| Error::database(e.to_string()))?;
    Ok(n > 0)
}
