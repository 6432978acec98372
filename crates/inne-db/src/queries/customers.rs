//! Customer CRUD operations.

use inne_core::{CustomerId, Error, Result};
use rusqlite::Connection;

use super::{
    count_references, delete_err, ensure_exists, opt_json, to_json, validate_contact_info,
    write_err,
};
use crate::models::{Customer, NewCustomer};

const COLS: &str = "id, name, age, contact_info, health_records, preferred_therapist_id,
    payment_preferences";

fn check_refs(conn: &Connection, new: &NewCustomer) -> Result<()> {
    validate_contact_info(&new.contact_info)?;
    if let Some(t) = new.preferred_therapist_id {
        ensure_exists(conn, "therapists", "preferred_therapist_id", "therapist", t.get())?;
    }
    Ok(())
}

/// Create a new customer.
pub fn create_customer(conn: &Connection, new: &NewCustomer) -> Result<Customer> {
    let tx = conn
        .unchecked_transaction()
        .map_err(|e| Error::database(e.to_string()))?;
    check_refs(&tx, new)?;

    tx.execute(
        "INSERT INTO customers (name, age, contact_info, health_records,
            preferred_therapist_id, payment_preferences)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        rusqlite::params![
            new.name,
            new.age,
            to_json(&new.contact_info)?,
            opt_json(new.health_records.as_ref())?,
            new.preferred_therapist_id.map(|t| t.get()),
            opt_json(new.payment_preferences.as_ref())?,
        ],
    )
    .map_err(write_err)?;
    let id = CustomerId::from(tx.last_insert_rowid());
    tx.commit().map_err(|e| Error::database(e.to_string()))?;

    Ok(Customer::from_new(id, new))
}

/// Get a customer by ID.
pub fn get_customer(conn: &Connection, id: CustomerId) -> Result<Option<Customer>> {
    let result = conn.query_row(
        &format!("SELECT {COLS} FROM customers WHERE id = ?1"),
        [id.get()],
        Customer::from_row,
    );
    match result {
        Ok(c) => Ok(Some(c)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(Error::database(e.to_string())),
    }
}

/// List all customers ordered by ID.
pub fn list_customers(conn: &Connection) -> Result<Vec<Customer>> {
    let mut stmt = conn
        .prepare(&format!("SELECT {COLS} FROM customers ORDER BY id"))
        .map_err(|e| Error::database(e.to_string()))?;
    let rows = stmt
        .query_map([], Customer::from_row)
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::database(e.to_string()))?;
    Ok(rows)
}

/// Overwrite a customer's fields.
pub fn update_customer(conn: &Connection, id: CustomerId, new: &NewCustomer) -> Result<bool> {
    let tx = conn
        .unchecked_transaction()
        .map_err(|e| Error::database(e.to_string()))?;
    check_refs(&tx, new)?;

    let n = tx
        .execute(
            "UPDATE customers SET name = ?1, age = ?2, contact_info = ?3, health_records = ?4,
                preferred_therapist_id = ?5, payment_preferences = ?6
             WHERE id = ?7",
            rusqlite::params![
                new.name,
                new.age,
                to_json(&new.contact_info)?,
                opt_json(new.health_records.as_ref())?,
                new.preferred_therapist_id.map(|t| t.get()),
                opt_json(new.payment_preferences.as_ref())?,
                id.get(),
            ],
        )
        .map_err(write_err)?;
    tx.commit().map_err(|e| Error::database(e.to_string()))?;
    Ok(n > 0)
}

/// Delete a customer with no booked sessions.
pub fn delete_customer(conn: &Connection, id: CustomerId) -> Result<bool> {
    let tx = conn
        .unchecked_transaction()
        .map_err(|e| Error::database(e.to_string()))?;

    let sessions = count_references(&tx, "sessions", "customer_id", id.get())?;
    if sessions > 0 {
        return Err(Error::Conflict(format!(
            "customer {id} is still referenced by {sessions} session(s)"
        )));
    }

    let n = tx
        .execute("DELETE FROM customers WHERE id = ?1", [id.get()])
        .map_err(delete_err)?;
    tx.commit().map_err(|e| Error::database(e.to_string()))?;
    Ok(n > 0)
}
