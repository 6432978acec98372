//! inne-db: database access and persistence layer.
//!
//! This crate provides SQLite-backed storage with connection pooling,
//! embedded reversible migrations, typed models, and query modules for
//! the seven booking entities.

pub mod migrations;
pub mod models;
pub mod pool;
pub mod queries;
