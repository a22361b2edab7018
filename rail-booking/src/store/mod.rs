//! Persistence for routes, clients, trips and tickets.
//!
//! SQLite through an r2d2 pool. The schema enforces the booking rules that
//! must hold under concurrent writers: one client per natural key, one
//! ticket per client and itinerary, and insert-only tickets.

mod connection;
mod error;
mod migrations;
mod sqlite;

pub use connection::{ConnectionPool, create_pool};
pub use error::StoreError;
pub use migrations::{SCHEMA_VERSION, get_schema_version, run_migrations};
pub use sqlite::{SqliteStore, StoreStatistics};
