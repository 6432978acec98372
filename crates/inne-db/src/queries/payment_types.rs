//! Payment type CRUD operations.
//!
//! A payment type is a label plus an optional discount; nothing references
//! it by key.

use inne_core::{Error, PaymentTypeId, Result};
use rusqlite::Connection;

use super::{validate_finite, write_err};
use crate::models::{NewPaymentType, PaymentType};

fn check_discount(new: &NewPaymentType) -> Result<()> {
    match new.discount {
        Some(discount) => validate_finite("discount", discount),
        None => Ok(()),
    }
}

/// Create a new payment type.
pub fn create_payment_type(conn: &Connection, new: &NewPaymentType) -> Result<PaymentType> {
    check_discount(new)?;
    conn.execute(
        "INSERT INTO payment_types (type, discount) VALUES (?1, ?2)",
        rusqlite::params![new.kind, new.discount],
    )
    .map_err(write_err)?;

    let id = PaymentTypeId::from(conn.last_insert_rowid());
    Ok(PaymentType::from_new(id, new))
}

/// Get a payment type by ID.
pub fn get_payment_type(conn: &Connection, id: PaymentTypeId) -> Result<Option<PaymentType>> {
    let result = conn.query_row(
        "SELECT id, type, discount FROM payment_types WHERE id = ?1",
        [id.get()],
        PaymentType::from_row,
    );
    match result {
        Ok(p) => Ok(Some(p)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(Error::database(e.to_string())),
    }
}

/// List all payment types ordered by ID.
pub fn list_payment_types(conn: &Connection) -> Result<Vec<PaymentType>> {
    let mut stmt = conn
        .prepare("SELECT id, type, discount FROM payment_types ORDER BY id")
        .map_err(|e| Error::database(e.to_string()))?;
    let rows = stmt
        .query_map([], PaymentType::from_row)
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::database(e.to_string()))?;
    Ok(rows)
}

/// Overwrite a payment type's label and discount.
pub fn update_payment_type(
    conn: &Connection,
    id: PaymentTypeId,
    new: &NewPaymentType,
) -> Result<bool> {
    check_discount(new)?;
    let n = conn
        .execute(
            "UPDATE payment_types SET type = ?1, discount = ?2 WHERE id = ?3",
            rusqlite::params![new.kind, new.discount, id.get()],
        )
        .map_err(write_err)?;
    Ok(n > 0)
}

/// Delete a payment type.
pub fn delete_payment_type(conn: &Connection, id: PaymentTypeId) -> Result<bool> {
    let n = conn
        .execute("DELETE FROM payment_types WHERE id = ?1", [id.get()])
        .map_err(|e| Error::database(e.to_string()))?;
    Ok(n > 0)
}
