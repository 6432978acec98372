//! Therapy option CRUD operations.

use inne_core::{Error, Result, TherapyOptionId};
use rusqlite::Connection;

use super::{count_references, delete_err, opt_json, validate_finite, write_err};
use crate::models::{NewTherapyOption, TherapyOption};

const COLS: &str =
    "id, name, type, duration, price, equipment_needed, therapist_specialty_required";

/// Create a new therapy option.
pub fn create_therapy_option(conn: &Connection, new: &NewTherapyOption) -> Result<TherapyOption> {
    validate_finite("price", new.price)?;
    conn.execute(
        "INSERT INTO therapy_options (name, type, duration, price, equipment_needed,
            therapist_specialty_required)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        rusqlite::params![
            new.name,
            new.kind,
            new.duration_minutes,
            new.price,
            opt_json(new.equipment_needed.as_ref())?,
            new.therapist_specialty_required,
        ],
    )
    .map_err(write_err)?;

    let id = TherapyOptionId::from(conn.last_insert_rowid());
    Ok(TherapyOption::from_new(id, new))
}

/// Get a therapy option by ID.
pub fn get_therapy_option(conn: &Connection, id: TherapyOptionId) -> Result<Option<TherapyOption>> {
    let result = conn.query_row(
        &format!("SELECT {COLS} FROM therapy_options WHERE id = ?1"),
        [id.get()],
        TherapyOption::from_row,
    );
    match result {
        Ok(o) => Ok(Some(o)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(Error::database(e.to_string())),
    }
}

/// List all therapy options ordered by ID.
pub fn list_therapy_options(conn: &Connection) -> Result<Vec<TherapyOption>> {
    let mut stmt = conn
        .prepare(&format!("SELECT {COLS} FROM therapy_options ORDER BY id"))
        .map_err(|e| Error::database(e.to_string()))?;
    let rows = stmt
        .query_map([], TherapyOption::from_row)
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::database(e.to_string()))?;
    Ok(rows)
}

/// Overwrite a therapy option's fields.
pub fn update_therapy_option(
    conn: &Connection,
    id: TherapyOptionId,
    new: &NewTherapyOption,
) -> Result<bool> {
    validate_finite("price", new.price)?;
    let n = conn
        .execute(
            "UPDATE therapy_options SET name = ?1, type = ?2, duration = ?3, price = ?4,
                equipment_needed = ?5, therapist_specialty_required = ?6
             WHERE id = ?7",
            rusqlite::params![
                new.name,
                new.kind,
                new.duration_minutes,
                new.price,
                opt_json(new.equipment_needed.as_ref())?,
                new.therapist_specialty_required,
                id.get(),
            ],
        )
        .map_err(write_err)?;
    Ok(n > 0)
}

/// Delete a therapy option no session was booked with.
pub fn delete_therapy_option(conn: &Connection, id: TherapyOptionId) -> Result<bool> {
    let tx = conn
        .unchecked_transaction()
        .map_err(|e| Error::database(e.to_string()))?;

    let sessions = count_references(&tx, "sessions", "therapy_option_id", id.get())?;
    if sessions > 0 {
        return Err(Error::Conflict(format!(
            "therapy option {id} is still referenced by {sessions} session(s)"
        )));
    }

    let n = tx
        .execute("DELETE FROM therapy_options WHERE id = ?1", [id.get()])
        .map_err(delete_err)?;
    tx.commit().map_err(|e| Error::database(e.to_string()))?;
    Ok(n > 0)
}
