//! inne-core: shared types, IDs, errors, configuration, and status enums.
//!
//! This crate is the foundational dependency for the other inne-* crates,
//! providing type-safe surrogate-key identifiers, a unified error type,
//! the closed session/payment status enumerations, and application
//! configuration.

pub mod config;
pub mod error;
pub mod ids;
pub mod status;

// Re-export the most commonly used items at the crate root.
pub use error::{Error, Result};
pub use ids::*;
pub use status::{PaymentStatus, SessionStatus};
