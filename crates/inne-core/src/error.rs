//! Unified error type for the inneapp booking system.
//!
//! All crates funnel their failures into [`Error`], which carries enough context
//! for API handlers to derive an HTTP status code via [`Error::http_status`].

use std::fmt;

/// Unified error type covering all failure modes in inneapp.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The requested entity could not be found.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The kind of entity (e.g. "therapist", "room").
        entity: String,
        /// The identifier that was looked up.
        id: String,
    },

    /// Request data failed validation (missing required field, bad shape,
    /// unknown status label).
    #[error("Validation error: {0}")]
    Validation(String),

    /// A foreign-key field points at a row that does not exist.
    #[error("Foreign key violation on {field}: {entity} {id} does not exist")]
    ForeignKey {
        /// The offending column (e.g. "therapist_id").
        field: String,
        /// The referenced entity kind.
        entity: String,
        /// The identifier that was not found.
        id: i64,
    },

    /// The operation conflicts with existing rows (e.g. deleting a row that
    /// still has dependents).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A database operation failed.
    #[error("Database error: {source}")]
    Database {
        /// The underlying database error.
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// An I/O operation failed.
    #[error("IO error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Catch-all for unexpected internal errors.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Map this error to an appropriate HTTP status code.
    pub fn http_status(&self) -> u16 {
        match self {
            Error::NotFound { .. } => 404,
            Error::Validation(_) => 400,
            Error::ForeignKey { .. } => 422,
            Error::Conflict(_) => 409,
            Error::Database { .. } => 500,
            Error::Io { .. } => 500,
            Error::Internal(_) => 500,
        }
    }

    /// Convenience constructor for [`Error::NotFound`].
    pub fn not_found(entity: impl Into<String>, id: impl fmt::Display) -> Self {
        Error::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Convenience constructor for [`Error::ForeignKey`].
    pub fn foreign_key(field: impl Into<String>, entity: impl Into<String>, id: i64) -> Self {
        Error::ForeignKey {
            field: field.into(),
            entity: entity.into(),
            id,
        }
    }

    /// Convenience constructor for [`Error::Database`].
    pub fn database(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Error::Database {
            source: source.into(),
        }
    }
}

/// Result alias using the crate-level [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_display() {
        let err = Error::not_found("therapist", 42);
        assert_eq!(err.to_string(), "therapist not found: 42");
        assert_eq!(err.http_status(), 404);
    }

    #[test]
    fn validation_display() {
        let err = Error::Validation("contact_info is required".into());
        assert_eq!(err.to_string(), "Validation error: contact_info is required");
        assert_eq!(err.http_status(), 400);
    }

    #[test]
    fn foreign_key_names_the_field() {
        let err = Error::foreign_key("therapist_id", "therapist", 99);
        assert_eq!(
            err.to_string(),
            "Foreign key violation on therapist_id: therapist 99 does not exist"
        );
        assert_eq!(err.http_status(), 422);
    }

    #[test]
    fn conflict_display() {
        let err = Error::Conflict("location 1 still has dependents".into());
        assert_eq!(err.to_string(), "Conflict: location 1 still has dependents");
        assert_eq!(err.http_status(), 409);
    }

    #[test]
    fn database_display() {
        let err = Error::database("disk I/O error");
        assert!(err.to_string().contains("disk I/O error"));
        assert_eq!(err.http_status(), 500);
    }

    #[test]
    fn io_from_std() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err = Error::from(io_err);
        assert!(matches!(err, Error::Io { .. }));
        assert_eq!(err.http_status(), 500);
    }

    #[test]
    fn internal_display() {
        let err = Error::Internal("unexpected state".into());
        assert_eq!(err.to_string(), "Internal error: unexpected state");
        assert_eq!(err.http_status(), 500);
    }
}
