//! Therapist CRUD and lookup operations.

use inne_core::{Error, LocationId, Result, TherapistId};
use rusqlite::Connection;

use super::{
    count_references, delete_err, ensure_exists, opt_json, to_json, validate_contact_info,
    write_err,
};
use crate::models::{NewTherapist, Therapist};

/// Column list used in SELECT statements.
const COLS: &str = "id, name, specialty, experience, certifications, availability,
    contact_info, location_id";

fn query_list(conn: &Connection, sql: &str, param: impl rusqlite::ToSql) -> Result<Vec<Therapist>> {
    let mut stmt = conn
        .prepare(sql)
        .map_err(|e| Error::database(e.to_string()))?;
    let rows = stmt
        .query_map([param], Therapist::from_row)
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::database(e.to_string()))?;
    Ok(rows)
}

/// Create a new therapist at an existing location.
pub fn create_therapist(conn: &Connection, new: &NewTherapist) -> Result<Therapist> {
    validate_contact_info(&new.contact_info)?;

    let tx = conn
        .unchecked_transaction()
        .map_err(|e| Error::database(e.to_string()))?;
    ensure_exists(&tx, "locations", "location_id", "location", new.location_id.get())?;

    tx.execute(
        "INSERT INTO therapists (name, specialty, experience, certifications, availability,
            contact_info, location_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        rusqlite::params![
            new.name,
            new.specialty,
            new.experience,
            new.certifications,
            opt_json(new.availability.as_ref())?,
            to_json(&new.contact_info)?,
            new.location_id.get(),
        ],
    )
    .map_err(write_err)?;
    let id = TherapistId::from(tx.last_insert_rowid());
    tx.commit().map_err(|e| Error::database(e.to_string()))?;

    Ok(Therapist::from_new(id, new))
}

/// Get a therapist by ID.
pub fn get_therapist(conn: &Connection, id: TherapistId) -> Result<Option<Therapist>> {
    let result = conn.query_row(
        &format!("SELECT {COLS} FROM therapists WHERE id = ?1"),
        [id.get()],
        Therapist::from_row,
    );
    match result {
        Ok(t) => Ok(Some(t)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(Error::database(e.to_string())),
    }
}

/// List all therapists ordered by ID.
pub fn list_therapists(conn: &Connection) -> Result<Vec<Therapist>> {
    let mut stmt = conn
        .prepare(&format!("SELECT {COLS} FROM therapists ORDER BY id"))
        .map_err(|e| Error::database(e.to_string()))?;
    let rows = stmt
        .query_map([], Therapist::from_row)
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::database(e.to_string()))?;
    Ok(rows)
}

/// Reverse relationship: therapists working at `location_id`.
pub fn list_therapists_by_location(
    conn: &Connection,
    location_id: LocationId,
) -> Result<Vec<Therapist>> {
    query_list(
        conn,
        &format!("SELECT {COLS} FROM therapists WHERE location_id = ?1 ORDER BY id"),
        location_id.get(),
    )
}

/// Therapists whose specialty matches `specialty`, ignoring ASCII case.
///
/// This is the match key a `TherapyOption` names in
/// `therapist_specialty_required`.
pub fn list_therapists_by_specialty(conn: &Connection, specialty: &str) -> Result<Vec<Therapist>> {
    query_list(
        conn,
        &format!("SELECT {COLS} FROM therapists WHERE specialty = ?1 COLLATE NOCASE ORDER BY id"),
        specialty,
    )
}

/// Overwrite a therapist's fields.
pub fn update_therapist(conn: &Connection, id: TherapistId, new: &NewTherapist) -> Result<bool> {
    validate_contact_info(&new.contact_info)?;

    let tx = conn
        .unchecked_transaction()
        .map_err(|e| Error::database(e.to_string()))?;
    ensure_exists(&tx, "locations", "location_id", "location", new.location_id.get())?;

    let n = tx
        .execute(
            "UPDATE therapists SET name = ?1, specialty = ?2, experience = ?3,
                certifications = ?4, availability = ?5, contact_info = ?6, location_id = ?7
             WHERE id = ?8",
            rusqlite::params![
                new.name,
                new.specialty,
                new.experience,
                new.certifications,
                opt_json(new.availability.as_ref())?,
                to_json(&new.contact_info)?,
                new.location_id.get(),
                id.get(),
            ],
        )
        .map_err(write_err)?;
    tx.commit().map_err(|e| Error::database(e.to_string()))?;
    Ok(n > 0)
}

/// Delete a therapist.
///
/// Customers who preferred this therapist fall back to "no preference";
/// a therapist with booked sessions cannot be deleted.
pub fn delete_therapist(conn: &Connection, id: TherapistId) -> Result<bool> {
    let tx = conn
        .unchecked_transaction()
        .map_err(|e| Error::database(e.to_string()))?;

    let sessions = count_references(&tx, "sessions", "therapist_id", id.get())?;
    if sessions > 0 {
        return Err(Error::Conflict(format!(
            "therapist {id} is still referenced by {sessions} session(s)"
        )));
    }

    let n = tx
        .execute("DELETE FROM therapists WHERE id = ?1", [id.get()])
        .map_err(delete_err)?;
    tx.commit().map_err(|e| Error::database(e.to_string()))?;
    Ok(n > 0)
}
