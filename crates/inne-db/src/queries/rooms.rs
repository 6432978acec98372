//! Room CRUD operations.

use inne_core::{Error, LocationId, Result, RoomId};
use rusqlite::Connection;

use super::{count_references, delete_err, ensure_exists, opt_json, write_err};
use crate::models::{NewRoom, Room};

const COLS: &str = "id, room_number, capacity, equipment, availability, location_id";

/// Create a new room at an existing location.
pub fn create_room(conn: &Connection, new: &NewRoom) -> Result<Room> {
    let tx = conn
        .unchecked_transaction()
        .map_err(|e| Error::database(e.to_string()))?;
    ensure_exists(&tx, "locations", "location_id", "location", new.location_id.get())?;

    tx.execute(
        "INSERT INTO rooms (room_number, capacity, equipment, availability, location_id)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        rusqlite::params![
            new.room_number,
            new.capacity,
            opt_json(new.equipment.as_ref())?,
            opt_json(new.availability.as_ref())?,
            new.location_id.get(),
        ],
    )
    .map_err(write_err)?;
    let id = RoomId::from(tx.last_insert_rowid());
    tx.commit().map_err(|e| Error::database(e.to_string()))?;

    Ok(Room::from_new(id, new))
}

/// Get a room by ID.
pub fn get_room(conn: &Connection, id: RoomId) -> Result<Option<Room>> {
    let result = conn.query_row(
        &format!("SELECT {COLS} FROM rooms WHERE id = ?1"),
        [id.get()],
        Room::from_row,
    );
    match result {
        Ok(r) => Ok(Some(r)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(Error::database(e.to_string())),
    }
}

/// List all rooms ordered by ID.
pub fn list_rooms(conn: &Connection) -> Result<Vec<Room>> {
    let mut stmt = conn
        .prepare(&format!("SELECT {COLS} FROM rooms ORDER BY id"))
        .map_err(|e| Error::database(e.to_string()))?;
    let rows = stmt
        .query_map([], Room::from_row)
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::database(e.to_string()))?;
    Ok(rows)
}

/// Reverse relationship: rooms at `location_id`.
pub fn list_rooms_by_location(conn: &Connection, location_id: LocationId) -> Result<Vec<Room>> {
    let mut stmt = conn
        .prepare(&format!("SELECT {COLS} FROM rooms WHERE location_id = ?1 ORDER BY id"))
        .map_err(|e| Error::database(e.to_string()))?;
    let rows = stmt
        .query_map([location_id.get()], Room::from_row)
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::database(e.to_string()))?;
    Ok(rows)
}

/// Overwrite a room's fields.
pub fn update_room(conn: &Connection, id: RoomId, new: &NewRoom) -> Result<bool> {
    let tx = conn
        .unchecked_transaction()
        .map_err(|e| Error::database(e.to_string()))?;
    ensure_exists(&tx, "locations", "location_id", "location", new.location_id.get())?;

    let n = tx
        .execute(
            "UPDATE rooms SET room_number = ?1, capacity = ?2, equipment = ?3,
                availability = ?4, location_id = ?5
             WHERE id = ?6",
            rusqlite::params![
                new.room_number,
                new.capacity,
                opt_json(new.equipment.as_ref())?,
                opt_json(new.availability.as_ref())?,
                new.location_id.get(),
                id.get(),
            ],
        )
        .map_err(write_err)?;
    tx.commit().map_err(|e| Error::database(e.to_string()))?;
    Ok(n > 0)
}

/// Delete a room with no booked sessions.
pub fn delete_room(conn: &Connection, id: RoomId) -> Result<bool> {
    let tx = conn
        .unchecked_transaction()
        .map_err(|e| Error::database(e.to_string()))?;

    let sessions = count_references(&tx, "sessions", "room_id", id.get())?;
    if sessions > 0 {
        return Err(Error::Conflict(format!(
            "room {id} is still referenced by {sessions} session(s)"
        )));
    }

    let n = tx
        .execute("DELETE FROM rooms WHERE id = ?1", [id.get()])
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
    fn crud() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        let loc = fixtures::location(&conn);

        let mut new = fixtures::new_room(&loc);
        new.equipment = Some(json!(["massage table", "hot stones"]));
        new.availability = Some(json!([{"day": "tue", "from": "08:00", "to": "18:00"}]));
        let room = create_room(&conn, &new).unwrap();

        let found = get_room(&conn, room.id).unwrap().unwrap();
        assert_eq!(found, room);
        assert_eq!(found.room_number, "2B");

        new.capacity = 6;
        new.equipment = None;
        assert!(update_room(&conn, room.id, &new).unwrap());
        let updated = get_room(&conn, room.id).unwrap().unwrap();
        assert_eq!(updated.capacity, 6);
        assert_eq!(updated.equipment, None);

        assert_eq!(list_rooms(&conn).unwrap().len(), 1);
        assert!(delete_room(&conn, room.id).unwrap());
        assert!(get_room(&conn, room.id).unwrap().is_none());
    }

    #[test]
    fn optional_fields_accept_absent_values() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        let loc = fixtures::location(&conn);

        let mut new = fixtures::new_room(&loc);
        new.equipment = Some(json!([]));
        let room = create_room(&conn, &new).unwrap();
        let found = get_room(&conn, room.id).unwrap().unwrap();
        assert_eq!(found.equipment, Some(json!([])));
        assert_eq!(found.availability, None);
    }

    #[test]
    fn unknown_location_rejected() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        let loc = fixtures::location(&conn);

        let mut new = fixtures::new_room(&loc);
        new.location_id = LocationId::from(12);
        let err = create_room(&conn, &new).unwrap_err();
        assert!(matches!(err, Error::ForeignKey { ref field, .. } if field == "location_id"));

        let room = fixtures::room(&conn, &loc);
        let err = update_room(&conn, room.id, &new).unwrap_err();
        assert!(matches!(err, Error::ForeignKey { .. }));
        assert_eq!(get_room(&conn, room.id).unwrap().unwrap().location_id, loc.id);
    }

    #[test]
    fn reverse_lookup_by_location() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        let a = fixtures::location(&conn);
        let b = fixtures::location(&conn);

        fixtures::room(&conn, &a);
        fixtures::room(&conn, &b);
        fixtures::room(&conn, &b);

        assert_eq!(list_rooms_by_location(&conn, a.id).unwrap().len(), 1);
        let rooms_b = list_rooms_by_location(&conn, b.id).unwrap();
        assert_eq!(rooms_b.len(), 2);
        assert!(rooms_b.iter().all(|r| r.location_id == b.id));
    }
}
