//! Database migrations
//!
//! Schema versioning for the booking store. Each version is applied once
//! and recorded in `schema_version`.

use rusqlite::Connection;
use tracing::{debug, error, info};

use super::error::StoreError;

/// Current schema version
pub const SCHEMA_VERSION: i32 = 2;

/// Run all pending migrations
pub fn run_migrations(conn: &Connection) -> Result<(), StoreError> {
    let current_version = get_schema_version(conn)?;

    if current_version > SCHEMA_VERSION {
        return Err(StoreError::Migration(format!(
            "database schema version {current_version} is newer than supported version {SCHEMA_VERSION}"
        )));
    }

    if current_version < SCHEMA_VERSION {
        info!(
            from_version = current_version,
            to_version = SCHEMA_VERSION,
            "Running database migrations"
        );

        if current_version < 1 {
            if let Err(e) = migrate_v1(conn) {
                error!(version = 1, error = %e, "Migration V001 (booking schema) failed");
                return Err(e);
            }
        }

        if current_version < 2 {
            if let Err(e) = migrate_v2(conn) {
                error!(version = 2, error = %e, "Migration V002 (trip leg snapshots) failed");
                return Err(e);
            }
        }

        set_schema_version(conn, SCHEMA_VERSION)?;
        info!(version = SCHEMA_VERSION, "Database migrations complete");
    } else {
        debug!(version = current_version, "Database schema is up to date");
    }

    Ok(())
}

/// Get current schema version
pub fn get_schema_version(conn: &Connection) -> Result<i32, StoreError> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        )",
        [],
    )?;

    let version: i32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )?;

    Ok(version)
}

fn set_schema_version(conn: &Connection, version: i32) -> Result<(), StoreError> {
    conn.execute("DELETE FROM schema_version", [])?;
    conn.execute(
        "INSERT INTO schema_version (version) VALUES (?1)",
        [version],
    )?;
    Ok(())
}

/// Version 1: routes, clients, trips, trip legs and tickets.
fn migrate_v1(conn: &Connection) -> Result<(), StoreError> {
    debug!("Applying migration V001: booking schema");

    conn.execute_batch(
        "
        BEGIN;

        CREATE TABLE IF NOT EXISTS routes (
            id TEXT PRIMARY KEY,
            origin TEXT NOT NULL,
            destination TEXT NOT NULL,
            departure_minute INTEGER NOT NULL CHECK(departure_minute BETWEEN 0 AND 1439),
            arrival_minute INTEGER NOT NULL CHECK(arrival_minute BETWEEN 0 AND 1439),
            arrival_day_offset INTEGER NOT NULL DEFAULT 0 CHECK(arrival_day_offset >= 0),
            carrier TEXT NOT NULL DEFAULT '',
            operating_days TEXT NOT NULL DEFAULT 'Daily',
            first_class_cents INTEGER NOT NULL CHECK(first_class_cents >= 0),
            second_class_cents INTEGER NOT NULL CHECK(second_class_cents >= 0)
        );

        CREATE TABLE IF NOT EXISTS clients (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            last_name_key TEXT NOT NULL,
            external_id TEXT NOT NULL,
            age INTEGER NOT NULL CHECK(age >= 0),
            created_at TEXT NOT NULL,
            UNIQUE(last_name_key, external_id)
        );

        CREATE TABLE IF NOT EXISTS trips (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            created_at TEXT NOT NULL,
            departure_date TEXT NOT NULL,
            itinerary_signature TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS trip_legs (
            trip_id INTEGER NOT NULL,
            position INTEGER NOT NULL CHECK(position >= 0),
            route_id TEXT NOT NULL,
            PRIMARY KEY (trip_id, position),
            FOREIGN KEY (trip_id) REFERENCES trips(id) ON DELETE CASCADE,
            FOREIGN KEY (route_id) REFERENCES routes(id)
        );

        CREATE TABLE IF NOT EXISTS tickets (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            trip_id INTEGER NOT NULL,
            client_id INTEGER NOT NULL,
            itinerary_signature TEXT NOT NULL,
            issued_at TEXT NOT NULL,
            UNIQUE(trip_id, client_id),
            UNIQUE(client_id, itinerary_signature),
            FOREIGN KEY (trip_id) REFERENCES trips(id),
            FOREIGN KEY (client_id) REFERENCES clients(id)
        );

        CREATE INDEX IF NOT EXISTS idx_tickets_client ON tickets(client_id);
        CREATE INDEX IF NOT EXISTS idx_trips_created ON trips(created_at);
        CREATE INDEX IF NOT EXISTS idx_trip_legs_route ON trip_legs(route_id);

        CREATE TRIGGER IF NOT EXISTS tickets_no_update
        BEFORE UPDATE ON tickets
        BEGIN
            SELECT RAISE(ABORT, 'tickets are immutable');
        END;

        CREATE TRIGGER IF NOT EXISTS tickets_no_delete
        BEFORE DELETE ON tickets
        BEGIN
            SELECT RAISE(ABORT, 'tickets are immutable');
        END;

        COMMIT;
        ",
    )?;

    Ok(())
}

/// Version 2: trip legs keep a copy of the route as it was when booked.
///
/// Trips are rebuilt from these columns, so later catalog edits synced into
/// `routes` never change a booked trip. Existing rows are backfilled from
/// `routes`.
fn migrate_v2(conn: &Connection) -> Result<(), StoreError> {
    debug!("Applying migration V002: trip leg snapshots");

    conn.execute_batch(
        "
        BEGIN;

        ALTER TABLE trip_legs ADD COLUMN origin TEXT NOT NULL DEFAULT '';
        ALTER TABLE trip_legs ADD COLUMN destination TEXT NOT NULL DEFAULT '';
        ALTER TABLE trip_legs ADD COLUMN departure_minute INTEGER NOT NULL DEFAULT 0;
        ALTER TABLE trip_legs ADD COLUMN arrival_minute INTEGER NOT NULL DEFAULT 0;
        ALTER TABLE trip_legs ADD COLUMN arrival_day_offset INTEGER NOT NULL DEFAULT 0;
        ALTER TABLE trip_legs ADD COLUMN carrier TEXT NOT NULL DEFAULT '';
        ALTER TABLE trip_legs ADD COLUMN operating_days TEXT NOT NULL DEFAULT 'Daily';
        ALTER TABLE trip_legs ADD COLUMN first_class_cents INTEGER NOT NULL DEFAULT 0;
        ALTER TABLE trip_legs ADD COLUMN second_class_cents INTEGER NOT NULL DEFAULT 0;

        UPDATE trip_legs SET
            origin = r.origin,
            destination = r.destination,
            departure_minute = r.departure_minute,
            arrival_minute = r.arrival_minute,
            arrival_day_offset = r.arrival_day_offset,
            carrier = r.carrier,
            operating_days = r.operating_days,
            first_class_cents = r.first_class_cents,
            second_class_cents = r.second_class_cents
        FROM routes r
        WHERE r.id = trip_legs.route_id;

        CREATE TRIGGER IF NOT EXISTS trip_legs_no_update
        BEFORE UPDATE ON trip_legs
        BEGIN
            SELECT RAISE(ABORT, 'trip legs are immutable');
        END;

        COMMIT;
        ",
    )?;

    Ok(())
}
