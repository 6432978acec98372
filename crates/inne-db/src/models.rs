//! Rust structs mapping to database tables.
//!
//! Each stored model implements `from_row` for constructing itself from a
//! `rusqlite::Row`; each `New*` struct carries the caller-supplied fields
//! for inserts and updates.

use chrono::NaiveDateTime;
use inne_core::{
    CustomerId, LocationId, PaymentStatus, PaymentTypeId, RoomId, SessionId, SessionStatus,
    TherapistId, TherapyOptionId,
};
use rusqlite::types::Type;
use serde_json::Value;

/// Free-form mapping of string keys to loosely-typed values (contact info).
pub type JsonMap = serde_json::Map<String, Value>;

/// Storage format for session timestamps.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

// ---------------------------------------------------------------------------
// helpers
// ---------------------------------------------------------------------------

fn conversion_err(
    idx: usize,
    e: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))
}

/// Parse an integer-keyed ID from a column.
fn parse_id<T: From<i64>>(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<T> {
    let raw: i64 = row.get(idx)?;
    Ok(T::from(raw))
}

fn parse_opt_id<T: From<i64>>(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<Option<T>> {
    let raw: Option<i64> = row.get(idx)?;
    Ok(raw.map(T::from))
}

fn parse_json_map(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<JsonMap> {
    let s: String = row.get(idx)?;
    serde_json::from_str(&s).map_err(|e| conversion_err(idx, e))
}

fn parse_opt_json(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<Option<Value>> {
    let s: Option<String> = row.get(idx)?;
    s.map(|v| serde_json::from_str(&v).map_err(|e| conversion_err(idx, e)))
        .transpose()
}

fn parse_datetime(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<NaiveDateTime> {
    let s: String = row.get(idx)?;
    NaiveDateTime::parse_from_str(&s, DATETIME_FORMAT).map_err(|e| conversion_err(idx, e))
}

/// JSON `null` in a flexible field means "absent".
fn present(value: &Option<Value>) -> Option<Value> {
    value.clone().filter(|v| !v.is_null())
}

fn parse_label<T>(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<T>
where
    T: std::str::FromStr<Err = inne_core::Error>,
{
    let s: String = row.get(idx)?;
    s.parse().map_err(|e| conversion_err(idx, e))
}

// ---------------------------------------------------------------------------
// Location
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct NewLocation {
    pub name: String,
    pub address: String,
    pub contact_info: JsonMap,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    pub id: LocationId,
    pub name: String,
    pub address: String,
    pub contact_info: JsonMap,
}

impl Location {
    pub fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: parse_id(row, 0)?,
            name: row.get(1)?,
            address: row.get(2)?,
            contact_info: parse_json_map(row, 3)?,
        })
    }

    pub(crate) fn from_new(id: LocationId, new: &NewLocation) -> Self {
        Self {
            id,
            name: new.name.clone(),
            address: new.address.clone(),
            contact_info: new.contact_info.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Therapist
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct NewTherapist {
    pub name: String,
    pub specialty: String,
    /// Years of experience.
    pub experience: u32,
    pub certifications: Option<String>,
    /// Schema-free time-slot data.
    pub availability: Option<Value>,
    pub contact_info: JsonMap,
    pub location_id: LocationId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Therapist {
    pub id: TherapistId,
    pub name: String,
    pub specialty: String,
    pub experience: u32,
    pub certifications: Option<String>,
    pub availability: Option<Value>,
    pub contact_info: JsonMap,
    pub location_id: LocationId,
}

impl Therapist {
    pub fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: parse_id(row, 0)?,
            name: row.get(1)?,
            specialty: row.get(2)?,
            experience: row.get(3)?,
            certifications: row.get(4)?,
            availability: parse_opt_json(row, 5)?,
            contact_info: parse_json_map(row, 6)?,
            location_id: parse_id(row, 7)?,
        })
    }

    pub(crate) fn from_new(id: TherapistId, new: &NewTherapist) -> Self {
        Self {
            id,
            name: new.name.clone(),
            specialty: new.specialty.clone(),
            experience: new.experience,
            certifications: new.certifications.clone(),
            availability: present(&new.availability),
            contact_info: new.contact_info.clone(),
            location_id: new.location_id,
        }
    }
}

// ---------------------------------------------------------------------------
// Customer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct NewCustomer {
    pub name: String,
    pub age: u32,
    pub contact_info: JsonMap,
    /// Free-form notes and therapy history.
    pub health_records: Option<Value>,
    /// `None` means "no preference".
    pub preferred_therapist_id: Option<TherapistId>,
    /// Accepted payment types.
    pub payment_preferences: Option<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    pub age: u32,
    pub contact_info: JsonMap,
    pub health_records: Option<Value>,
    pub preferred_therapist_id: Option<TherapistId>,
    pub payment_preferences: Option<Value>,
}

impl Customer {
    pub fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: parse_id(row, 0)?,
            name: row.get(1)?,
            age: row.get(2)?,
            contact_info: parse_json_map(row, 3)?,
            health_records: parse_opt_json(row, 4)?,
            preferred_therapist_id: parse_opt_id(row, 5)?,
            payment_preferences: parse_opt_json(row, 6)?,
        })
    }

    pub(crate) fn from_new(id: CustomerId, new: &NewCustomer) -> Self {
        Self {
            id,
            name: new.name.clone(),
            age: new.age,
            contact_info: new.contact_info.clone(),
            health_records: present(&new.health_records),
            preferred_therapist_id: new.preferred_therapist_id,
            payment_preferences: present(&new.payment_preferences),
        }
    }
}

// ---------------------------------------------------------------------------
// Room
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct NewRoom {
    /// Free text; not guaranteed numeric (e.g. "2B").
    pub room_number: String,
    pub capacity: u32,
    pub equipment: Option<Value>,
    pub availability: Option<Value>,
    pub location_id: LocationId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Room {
    pub id: RoomId,
    pub room_number: String,
    pub capacity: u32,
    pub equipment: Option<Value>,
    pub availability: Option<Value>,
    pub location_id: LocationId,
}

impl Room {
    pub fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: parse_id(row, 0)?,
            room_number: row.get(1)?,
            capacity: row.get(2)?,
            equipment: parse_opt_json(row, 3)?,
            availability: parse_opt_json(row, 4)?,
            location_id: parse_id(row, 5)?,
        })
    }

    pub(crate) fn from_new(id: RoomId, new: &NewRoom) -> Self {
        Self {
            id,
            room_number: new.room_number.clone(),
            capacity: new.capacity,
            equipment: present(&new.equipment),
            availability: present(&new.availability),
            location_id: new.location_id,
        }
    }
}

// ---------------------------------------------------------------------------
// PaymentType
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct NewPaymentType {
    /// Label such as "cash", "card" or "insurance" (column `type`).
    pub kind: String,
    /// Fractional discount rate.
    pub discount: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PaymentType {
    pub id: PaymentTypeId,
    pub kind: String,
    pub discount: Option<f64>,
}

impl PaymentType {
    pub fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: parse_id(row, 0)?,
            kind: row.get(1)?,
            discount: row.get(2)?,
        })
    }

    pub(crate) fn from_new(id: PaymentTypeId, new: &NewPaymentType) -> Self {
        Self {
            id,
            kind: new.kind.clone(),
            discount: new.discount,
        }
    }
}

// ---------------------------------------------------------------------------
// TherapyOption
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct NewTherapyOption {
    pub name: String,
    /// Category label: individual, group, specialized (column `type`).
    pub kind: String,
    pub duration_minutes: u32,
    pub price: f64,
    pub equipment_needed: Option<Value>,
    /// Matched against `Therapist::specialty`; not a foreign key.
    pub therapist_specialty_required: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TherapyOption {
    pub id: TherapyOptionId,
    pub name: String,
    pub kind: String,
    pub duration_minutes: u32,
    pub price: f64,
    pub equipment_needed: Option<Value>,
    pub therapist_specialty_required: String,
}

impl TherapyOption {
    pub fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: parse_id(row, 0)?,
            name: row.get(1)?,
            kind: row.get(2)?,
            duration_minutes: row.get(3)?,
            price: row.get(4)?,
            equipment_needed: parse_opt_json(row, 5)?,
            therapist_specialty_required: row.get(6)?,
        })
    }

    pub(crate) fn from_new(id: TherapyOptionId, new: &NewTherapyOption) -> Self {
        Self {
            id,
            name: new.name.clone(),
            kind: new.kind.clone(),
            duration_minutes: new.duration_minutes,
            price: new.price,
            equipment_needed: present(&new.equipment_needed),
            therapist_specialty_required: new.therapist_specialty_required.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct NewSession {
    pub therapist_id: TherapistId,
    pub customer_id: CustomerId,
    pub room_id: RoomId,
    pub therapy_option_id: TherapyOptionId,
    pub location_id: LocationId,
    pub date: NaiveDateTime,
    pub duration_minutes: u32,
    pub status: SessionStatus,
    pub feedback: Option<String>,
    pub payment_status: PaymentStatus,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub id: SessionId,
    pub therapist_id: TherapistId,
    pub customer_id: CustomerId,
    pub room_id: RoomId,
    pub therapy_option_id: TherapyOptionId,
    pub location_id: LocationId,
    pub date: NaiveDateTime,
    pub duration_minutes: u32,
    pub status: SessionStatus,
    pub feedback: Option<String>,
    pub payment_status: PaymentStatus,
}

impl Session {
    pub fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: parse_id(row, 0)?,
            therapist_id: parse_id(row, 1)?,
            customer_id: parse_id(row, 2)?,
            room_id: parse_id(row, 3)?,
            therapy_option_id: parse_id(row, 4)?,
            location_id: parse_id(row, 5)?,
            date: parse_datetime(row, 6)?,
            duration_minutes: row.get(7)?,
            status: parse_label(row, 8)?,
            feedback: row.get(9)?,
            payment_status: parse_label(row, 10)?,
        })
    }

    pub(crate) fn from_new(id: SessionId, new: &NewSession) -> Self {
        Self {
            id,
            therapist_id: new.therapist_id,
            customer_id: new.customer_id,
            room_id: new.room_id,
            therapy_option_id: new.therapy_option_id,
            location_id: new.location_id,
            date: new.date,
            duration_minutes: new.duration_minutes,
            status: new.status,
            feedback: new.feedback.clone(),
            payment_status: new.payment_status,
        }
    }
}
