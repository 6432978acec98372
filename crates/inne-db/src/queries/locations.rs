//! Location CRUD operations.
//!
//! Deletion is restricted: a location that is still referenced by any
//! therapist, room or session cannot be removed.

use inne_core::{Error, LocationId, Result};
use rusqlite::Connection;

use super::{count_references, delete_err, to_json, validate_contact_info, write_err};
use crate::models::{Location, NewLocation};

const COLS: &str = "id, name, address, contact_info";

/// Create a new location.
pub fn create_location(conn: &Connection, new: &NewLocation) -> Result<Location> {
    validate_contact_info(&new.contact_info)?;

    conn.execute(
        "INSERT INTO locations (name, address, contact_info) VALUES (?1, ?2, ?3)",
        rusqlite::params![new.name, new.address, to_json(&new.contact_info)?],
    )
    .map_err(write_err)?;

    let id = LocationId::from(conn.last_insert_rowid());
    Ok(Location::from_new(id, new))
}

/// Get a location by ID.
pub fn get_location(conn: &Connection, id: LocationId) -> Result<Option<Location>> {
    let result = conn.query_row(
        &format!("SELECT {COLS} FROM locations WHERE id = ?1"),
        [id.get()],
        Location::from_row,
    );
    match result {
        Ok(l) => Ok(Some(l)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(Error::database(e.to_string())),
    }
}

/// List all locations ordered by ID.
pub fn list_locations(conn: &Connection) -> Result<Vec<Location>> {
    let mut stmt = conn
        .prepare(&format!("SELECT {COLS} FROM locations ORDER BY id"))
        .map_err(|e| Error::database(e.to_string()))?;
    let rows = stmt
        .query_map([], Location::from_row)
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::database(e.to_string()))?;
    Ok(rows)
}

/// Overwrite a location's fields.
pub fn update_location(conn: &Connection, id: LocationId, new: &NewLocation) -> Result<bool> {
    validate_contact_info(&new.contact_info)?;

    let n = conn
        .execute(
            "UPDATE locations SET name = ?1, address = ?2, contact_info = ?3 WHERE id = ?4",
            rusqlite::params![new.name, new.address, to_json(&new.contact_info)?, id.get()],
        )
        .map_err(write_err)?;
    Ok(n > 0)
}

/// Delete a location that nothing references.
///
/// Returns `Error::Conflict` naming the dependent counts otherwise.
pub fn delete_location(conn: &Connection, id: LocationId) -> Result<bool> {
    let tx = conn
        .unchecked_transaction()
        .map_err(|e| Error::database(e.to_string()))?;

    let therapists = count_references(&tx, "therapists", "location_id", id.get())?;
    let rooms = count_references(&tx, "rooms", "location_id", id.get())?;
    let sessions = count_references(&tx, "sessions", "location_id", id.get())?;
    if therapists + rooms + sessions > 0 {
        return Err(Error::Conflict(format!(
            "location {id} is still referenced by {therapists} therapist(s), \
             {rooms} room(s) and {sessions} session(s)"
        )));
    }

    let n = tx
        .execute("DELETE FROM locations WHERE id = ?1", [id.get()])
        .map_err(delete_err)?;
    tx.commit().map_err(|e| Error::database(e.to_string()))?;
    Ok(n > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::init_memory_pool;
    use crate::queries::fixtures;
    use serde_json::json;

    #[test]
    fn round_trip() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();

        let new = NewLocation {
            name: "Downtown".into(),
            address: "123 Main St".into(),
            contact_info: fixtures::contact("555-0100"),
        };
        let created = create_location(&conn, &new).unwrap();

        let found = get_location(&conn, created.id).unwrap().unwrap();
        assert_eq!(found, created);
        assert_eq!(found.name, "Downtown");
        assert_eq!(found.address, "123 Main St");
        assert_eq!(found.contact_info["phone"], json!("555-0100"));
    }

    #[test]
    fn crud() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();

        let loc = fixtures::location(&conn);
        assert_eq!(list_locations(&conn).unwrap().len(), 1);

        let mut contact = fixtures::contact("555-0199");
        contact.insert("email".into(), json!("uptown@example.com"));
        assert!(update_location(
            &conn,
            loc.id,
            &NewLocation {
                name: "Uptown".into(),
                address: "9 Hill Rd".into(),
                contact_info: contact,
            },
        )
        .unwrap());

        let updated = get_location(&conn, loc.id).unwrap().unwrap();
        assert_eq!(updated.name, "Uptown");
        assert_eq!(updated.contact_info["email"], json!("uptown@example.com"));

        assert!(delete_location(&conn, loc.id).unwrap());
        assert!(get_location(&conn, loc.id).unwrap().is_none());
        assert!(!delete_location(&conn, loc.id).unwrap());
    }

    #[test]
    fn missing_contact_info_rejected() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();

        let err = create_location(
            &conn,
            &NewLocation {
                name: "Nowhere".into(),
                address: "-".into(),
                contact_info: Default::default(),
            },
        )
        .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(list_locations(&conn).unwrap().is_empty());
    }

    #[test]
    fn delete_with_dependent_therapist_is_restricted() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();

        let loc = fixtures::location(&conn);
        let therapist = fixtures::therapist(&conn, &loc);

        let err = delete_location(&conn, loc.id).unwrap_err();
        match err {
            Error::Conflict(msg) => assert!(msg.contains("1 therapist(s)"), "{msg}"),
            other => panic!("expected Conflict, got {other:?}"),
        }

        // Nothing was removed.
        assert!(get_location(&conn, loc.id).unwrap().is_some());
        assert!(crate::queries::therapists::get_therapist(&conn, therapist.id)
            .unwrap()
            .is_some());
    }

    #[test]
    fn update_missing_returns_false() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();

        let new = NewLocation {
            name: "Ghost".into(),
            address: "0 Nowhere".into(),
            contact_info: fixtures::contact("555-0000"),
        };
        assert!(!update_location(&conn, LocationId::from(999), &new).unwrap());
    }
}
