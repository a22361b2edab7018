//! SQLite-backed booking store.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, Row, TransactionBehavior, params};
use tracing::{debug, info, instrument, warn};

use crate::booking::{BookingStore, NewBooking};
use crate::catalog::RouteCatalog;
use crate::config::DatabaseConfig;
use crate::domain::{
    Client, ClockTime, Fare, Itinerary, Leg, LegId, Location, NaturalKey, OperatingDays,
    Reservation, Ticket, TicketId, TravelClass, Trip, TripId,
};

use super::connection::{ConnectionPool, create_pool};
use super::error::{StoreError, is_foreign_key_violation, is_unique_violation};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Row counts per table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
pub struct StoreStatistics {
    pub routes: u64,
    pub clients: u64,
    pub trips: u64,
    pub trip_legs: u64,
    pub tickets: u64,
}

/// Booking store on a pooled SQLite database.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: Arc<ConnectionPool>,
}

impl SqliteStore {
    #[must_use]
    pub fn new(pool: Arc<ConnectionPool>) -> Self {
        Self { pool }
    }

    /// Open (and migrate, if configured) the database described by `config`.
    pub fn open(config: &DatabaseConfig) -> Result<Self, StoreError> {
        Ok(Self::new(Arc::new(create_pool(config)?)))
    }

    /// Insert or update every catalog leg in `routes`, so trip legs can
    /// reference them. Returns the number of legs written.
    ///
    /// Booked trips are unaffected: each trip leg keeps its own copy of the
    /// route as it was at booking time.
    #[instrument(skip(self, catalog), fields(legs = catalog.len()))]
    pub fn sync_catalog(&self, catalog: &RouteCatalog) -> Result<usize, StoreError> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        {
            let mut stmt = tx.prepare(
                "INSERT INTO routes (
                    id, origin, destination, departure_minute, arrival_minute,
                    arrival_day_offset, carrier, operating_days,
                    first_class_cents, second_class_cents
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                ON CONFLICT(id) DO UPDATE SET
                    origin = excluded.origin,
                    destination = excluded.destination,
                    departure_minute = excluded.departure_minute,
                    arrival_minute = excluded.arrival_minute,
                    arrival_day_offset = excluded.arrival_day_offset,
                    carrier = excluded.carrier,
                    operating_days = excluded.operating_days,
                    first_class_cents = excluded.first_class_cents,
                    second_class_cents = excluded.second_class_cents",
            )?;

            for leg in catalog.legs() {
                stmt.execute(params![
                    leg.id().as_str(),
                    leg.origin().as_str(),
                    leg.destination().as_str(),
                    leg.departure().minute_of_day(),
                    leg.arrival().minute_of_day(),
                    leg.arrival_day_offset(),
                    leg.carrier(),
                    leg.operating_days().to_string(),
                    cents_to_sql(leg.fare(TravelClass::First))?,
                    cents_to_sql(leg.fare(TravelClass::Second))?,
                ])?;
            }
        }

        tx.commit()?;
        info!(legs = catalog.len(), "Synchronised route catalog");
        Ok(catalog.len())
    }

    /// Row counts for every booking table.
    #[instrument(skip(self))]
    pub fn statistics(&self) -> Result<StoreStatistics, StoreError> {
        let conn = self.pool.get()?;
        let count = |table: &str| -> Result<u64, StoreError> {
            let n: i64 =
                conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))?;
            Ok(u64::try_from(n).unwrap_or(0))
        };

        Ok(StoreStatistics {
            routes: count("routes")?,
            clients: count("clients")?,
            trips: count("trips")?,
            trip_legs: count("trip_legs")?,
            tickets: count("tickets")?,
        })
    }
}

impl BookingStore for SqliteStore {
    #[instrument(skip(self, booking), fields(signature = %booking.itinerary.signature(), travelers = booking.clients.len()))]
    fn commit_booking(&self, booking: &NewBooking<'_>) -> Result<Trip, StoreError> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let signature = booking.itinerary.signature();
        let signature_text = signature.to_string();
        let booked_at = timestamp(booking.booked_at);

        for client in booking.clients {
            let key = client.natural_key();
            let existing: Option<i64> = tx
                .query_row(
                    "SELECT tk.id FROM tickets tk
                     JOIN clients c ON c.id = tk.client_id
                     WHERE c.last_name_key = ?1 AND c.external_id = ?2
                       AND tk.itinerary_signature = ?3
                     LIMIT 1",
                    params![key.last_name(), key.external_id(), signature_text],
                    |row| row.get(0),
                )
                .optional()?;
            if existing.is_some() {
                return Err(StoreError::DuplicateBooking {
                    key: key.clone(),
                    signature: signature.clone(),
                });
            }
        }

        tx.execute(
            "INSERT INTO trips (created_at, departure_date, itinerary_signature)
             VALUES (?1, ?2, ?3)",
            params![
                booked_at,
                booking.departure_date.format(DATE_FORMAT).to_string(),
                signature_text
            ],
        )?;
        let trip_id = tx.last_insert_rowid();

        for (position, leg) in booking.itinerary.legs().iter().enumerate() {
            tx.execute(
                "INSERT INTO trip_legs (
                    trip_id, position, route_id, origin, destination,
                    departure_minute, arrival_minute, arrival_day_offset,
                    carrier, operating_days, first_class_cents, second_class_cents
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                params![
                    trip_id,
                    position as i64,
                    leg.id().as_str(),
                    leg.origin().as_str(),
                    leg.destination().as_str(),
                    leg.departure().minute_of_day(),
                    leg.arrival().minute_of_day(),
                    leg.arrival_day_offset(),
                    leg.carrier(),
                    leg.operating_days().to_string(),
                    cents_to_sql(leg.fare(TravelClass::First))?,
                    cents_to_sql(leg.fare(TravelClass::Second))?,
                ],
            )
            .map_err(|e| {
                if is_foreign_key_violation(&e) {
                    StoreError::UnknownRoute(leg.id().clone())
                } else {
                    StoreError::Sqlite(e)
                }
            })?;
        }

        for client in booking.clients {
            let client_id = find_or_insert_client(&tx, client, &booked_at)?;
            tx.execute(
                "INSERT INTO tickets (trip_id, client_id, itinerary_signature, issued_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![trip_id, client_id, signature_text, booked_at],
            )
            .map_err(|e| {
                if is_unique_violation(&e, "itinerary_signature") {
                    StoreError::DuplicateBooking {
                        key: client.natural_key().clone(),
                        signature: signature.clone(),
                    }
                } else {
                    StoreError::Sqlite(e)
                }
            })?;
        }

        let trip = load_trip(&tx, trip_id)?.ok_or_else(|| {
            StoreError::Corrupt(format!("trip {trip_id} vanished before commit"))
        })?;
        tx.commit()?;

        debug!(trip_id, "Committed booking");
        Ok(trip)
    }

    #[instrument(skip(self), fields(trip_id = %id))]
    fn trip(&self, id: TripId) -> Result<Option<Trip>, StoreError> {
        let conn = self.pool.get()?;
        load_trip(&conn, id.0)
    }

    #[instrument(skip(self), fields(client = %key))]
    fn trips_for_client(&self, key: &NaturalKey) -> Result<Vec<Trip>, StoreError> {
        let conn = self.pool.get()?;

        let ids: Vec<i64> = {
            let mut stmt = conn.prepare(
                "SELECT DISTINCT t.id, t.created_at FROM tickets tk
                 JOIN clients c ON c.id = tk.client_id
                 JOIN trips t ON t.id = tk.trip_id
                 WHERE c.last_name_key = ?1 AND c.external_id = ?2
                 ORDER BY t.created_at DESC, t.id DESC",
            )?;
            let rows = stmt.query_map(params![key.last_name(), key.external_id()], |row| {
                row.get(0)
            })?;
            let ids = rows.collect::<Result<_, _>>()?;
            ids
        };

        let trips = load_trips(&conn, ids)?;
        debug!(count = trips.len(), "Loaded client trips");
        Ok(trips)
    }

    #[instrument(skip(self))]
    fn all_trips(&self) -> Result<Vec<Trip>, StoreError> {
        let conn = self.pool.get()?;

        let ids: Vec<i64> = {
            let mut stmt = conn.prepare("SELECT id FROM trips ORDER BY created_at DESC, id DESC")?;
            let rows = stmt.query_map([], |row| row.get(0))?;
            let ids = rows.collect::<Result<_, _>>()?;
            ids
        };

        let trips = load_trips(&conn, ids)?;
        debug!(count = trips.len(), "Loaded all trips");
        Ok(trips)
    }
}

/// Load trips in the given order. A trip whose rows no longer form a valid
/// trip is logged and left out, so it cannot hide the others.
fn load_trips(conn: &Connection, ids: Vec<i64>) -> Result<Vec<Trip>, StoreError> {
    let mut trips = Vec::with_capacity(ids.len());
    for id in ids {
        match load_trip(conn, id) {
            Ok(Some(trip)) => trips.push(trip),
            Ok(None) => {}
            Err(StoreError::Corrupt(reason)) => {
                warn!(trip_id = id, %reason, "Skipping unreadable trip");
            }
            Err(e) => return Err(e),
        }
    }
    Ok(trips)
}

/// Return the id of the stored client with `client`'s natural key, inserting
/// the client if there is none.
fn find_or_insert_client(
    conn: &Connection,
    client: &Client,
    created_at: &str,
) -> Result<i64, StoreError> {
    let key = client.natural_key();
    let existing: Option<i64> = conn
        .query_row(
            "SELECT id FROM clients WHERE last_name_key = ?1 AND external_id = ?2",
            params![key.last_name(), key.external_id()],
            |row| row.get(0),
        )
        .optional()?;

    if let Some(id) = existing {
        return Ok(id);
    }

    conn.execute(
        "INSERT INTO clients (first_name, last_name, last_name_key, external_id, age, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            client.first_name(),
            client.last_name(),
            key.last_name(),
            key.external_id(),
            client.age(),
            created_at
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Read one trip with its legs and tickets.
fn load_trip(conn: &Connection, trip_id: i64) -> Result<Option<Trip>, StoreError> {
    let header: Option<(String, String)> = conn
        .query_row(
            "SELECT created_at, departure_date FROM trips WHERE id = ?1",
            [trip_id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;

    let Some((created_at, departure_date)) = header else {
        return Ok(None);
    };

    let legs = {
        let mut stmt = conn.prepare(
            "SELECT route_id, origin, destination, departure_minute, arrival_minute,
                    arrival_day_offset, carrier, operating_days,
                    first_class_cents, second_class_cents
             FROM trip_legs
             WHERE trip_id = ?1
             ORDER BY position",
        )?;
        let rows = stmt.query_map([trip_id], LegRow::from_row)?;
        let rows: Vec<LegRow> = rows.collect::<Result<_, _>>()?;
        rows
    };
    let legs = legs
        .into_iter()
        .map(|r| r.into_leg().map(Arc::new))
        .collect::<Result<Vec<_>, _>>()?;
    let itinerary = Itinerary::new(legs)
        .map_err(|e| StoreError::Corrupt(format!("trip {trip_id}: {e}")))?;

    let tickets: Vec<TicketRow> = {
        let mut stmt = conn.prepare(
            "SELECT tk.id, tk.itinerary_signature, tk.issued_at,
                    c.first_name, c.last_name, c.external_id, c.age
             FROM tickets tk JOIN clients c ON c.id = tk.client_id
             WHERE tk.trip_id = ?1
             ORDER BY tk.id",
        )?;
        let rows = stmt.query_map([trip_id], TicketRow::from_row)?;
        let tickets = rows.collect::<Result<_, _>>()?;
        tickets
    };

    let trip_id = TripId(trip_id);
    let mut reservations = Vec::with_capacity(tickets.len());
    for row in tickets {
        let client = Client::new(&row.first_name, &row.last_name, &row.external_id, row.age)
            .map_err(|e| StoreError::Corrupt(format!("client on ticket {}: {e}", row.id)))?;
        let signature = row
            .signature
            .parse()
            .map_err(|e| StoreError::Corrupt(format!("ticket {}: {e}", row.id)))?;
        let ticket = Ticket::new(
            TicketId(row.id),
            trip_id,
            client.clone(),
            signature,
            parse_timestamp(&row.issued_at)?,
        );
        let reservation = Reservation::new(client, ticket)
            .map_err(|e| StoreError::Corrupt(format!("ticket {}: {e}", row.id)))?;
        reservations.push(reservation);
    }

    let departure_date = NaiveDate::parse_from_str(&departure_date, DATE_FORMAT)
        .map_err(|e| StoreError::Corrupt(format!("trip {trip_id} departure date: {e}")))?;

    let trip = Trip::new(
        trip_id,
        parse_timestamp(&created_at)?,
        departure_date,
        itinerary,
        reservations,
    )
    .map_err(|e| StoreError::Corrupt(format!("trip {trip_id}: {e}")))?;

    Ok(Some(trip))
}

/// A trip leg as stored at booking time.
struct LegRow {
    id: String,
    origin: String,
    destination: String,
    departure_minute: u32,
    arrival_minute: u32,
    arrival_day_offset: u8,
    carrier: String,
    operating_days: String,
    first_class_cents: i64,
    second_class_cents: i64,
}

impl LegRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            origin: row.get(1)?,
            destination: row.get(2)?,
            departure_minute: row.get(3)?,
            arrival_minute: row.get(4)?,
            arrival_day_offset: row.get(5)?,
            carrier: row.get(6)?,
            operating_days: row.get(7)?,
            first_class_cents: row.get(8)?,
            second_class_cents: row.get(9)?,
        })
    }

    fn into_leg(self) -> Result<Leg, StoreError> {
        let corrupt = |what: &str, e: &dyn std::fmt::Display| {
            StoreError::Corrupt(format!("route {}: {what}: {e}", self.id))
        };

        let id = LegId::parse(&self.id).map_err(|e| corrupt("id", &e))?;
        let origin = Location::parse(&self.origin).map_err(|e| corrupt("origin", &e))?;
        let destination =
            Location::parse(&self.destination).map_err(|e| corrupt("destination", &e))?;
        let departure =
            ClockTime::from_minutes(self.departure_minute).map_err(|e| corrupt("departure", &e))?;
        let arrival =
            ClockTime::from_minutes(self.arrival_minute).map_err(|e| corrupt("arrival", &e))?;
        let days =
            OperatingDays::parse(&self.operating_days).map_err(|e| corrupt("days", &e))?;
        let first = fare_from_sql(self.first_class_cents).map_err(|e| corrupt("fare", &e))?;
        let second = fare_from_sql(self.second_class_cents).map_err(|e| corrupt("fare", &e))?;

        let leg = Leg::new(
            id,
            origin,
            destination,
            departure,
            arrival,
            Some(self.arrival_day_offset),
        )
        .map_err(|e| corrupt("leg", &e))?;

        Ok(leg
            .with_carrier(self.carrier.clone())
            .with_operating_days(days)
            .with_fares(first, second))
    }
}

struct TicketRow {
    id: i64,
    signature: String,
    issued_at: String,
    first_name: String,
    last_name: String,
    external_id: String,
    age: i64,
}

impl TicketRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            signature: row.get(1)?,
            issued_at: row.get(2)?,
            first_name: row.get(3)?,
            last_name: row.get(4)?,
            external_id: row.get(5)?,
            age: row.get(6)?,
        })
    }
}

/// Fixed-width UTC timestamps so text order matches time order.
fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::Corrupt(format!("timestamp {s:?}: {e}")))
}

fn cents_to_sql(fare: Fare) -> Result<i64, StoreError> {
    i64::try_from(fare.cents()).map_err(|_| StoreError::Corrupt(format!("fare {fare} too large")))
}

fn fare_from_sql(cents: i64) -> Result<Fare, String> {
    u64::try_from(cents)
        .map(Fare::from_cents)
        .map_err(|_| format!("negative fare {cents}"))
}
