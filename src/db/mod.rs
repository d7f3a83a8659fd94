//! Database module
//!
//! Handles SQLite connection, migrations and the event store used by reporting.

pub mod connection;
pub mod instant;
pub mod migrations;
pub mod store;

pub use connection::{Database, DbError, DbResult};
