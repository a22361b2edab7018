//! Trips, reservations and tickets.
//!
//! A `Trip` is one committed booking: an itinerary plus one reservation per
//! traveler. Each reservation carries an immutable `Ticket`. These values
//! are built by the store after a booking commits or when a trip is read
//! back, never by callers directly.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};

use super::{Client, DomainError, Itinerary, ItinerarySignature};

/// Store-assigned trip identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TripId(pub i64);

impl fmt::Display for TripId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Store-assigned ticket identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TicketId(pub i64);

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Proof of one client's seat on one itinerary. Never modified once issued.
#[derive(Debug, Clone)]
pub struct Ticket {
    id: TicketId,
    trip_id: TripId,
    client: Client,
    signature: ItinerarySignature,
    issued_at: DateTime<Utc>,
}

impl Ticket {
    pub fn new(
        id: TicketId,
        trip_id: TripId,
        client: Client,
        signature: ItinerarySignature,
        issued_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            trip_id,
            client,
            signature,
            issued_at,
        }
    }

    pub fn id(&self) -> TicketId {
        self.id
    }

    pub fn trip_id(&self) -> TripId {
        self.trip_id
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn signature(&self) -> &ItinerarySignature {
        &self.signature
    }

    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }
}

/// A client paired with their ticket.
#[derive(Debug, Clone)]
pub struct Reservation {
    client: Client,
    ticket: Ticket,
}

impl Reservation {
    /// Pair a client with a ticket.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the ticket belongs to a different client.
    pub fn new(client: Client, ticket: Ticket) -> Result<Self, DomainError> {
        if ticket.client() != &client {
            return Err(DomainError::ReservationMismatch);
        }
        Ok(Self { client, ticket })
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn ticket(&self) -> &Ticket {
        &self.ticket
    }
}

/// A committed booking of one itinerary for one or more travelers.
///
/// # Invariants
///
/// - At least one reservation
/// - Every ticket's signature equals the itinerary's signature
#[derive(Debug, Clone)]
pub struct Trip {
    id: TripId,
    created_at: DateTime<Utc>,
    departure_date: NaiveDate,
    itinerary: Itinerary,
    reservations: Vec<Reservation>,
}

impl Trip {
    pub fn new(
        id: TripId,
        created_at: DateTime<Utc>,
        departure_date: NaiveDate,
        itinerary: Itinerary,
        reservations: Vec<Reservation>,
    ) -> Result<Self, DomainError> {
        if reservations.is_empty() {
            return Err(DomainError::EmptyTrip);
        }
        for r in &reservations {
            if r.ticket().signature() != itinerary.signature() {
                return Err(DomainError::TicketItineraryMismatch(r.ticket().id()));
            }
        }
        Ok(Self {
            id,
            created_at,
            departure_date,
            itinerary,
            reservations,
        })
    }

    pub fn id(&self) -> TripId {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Date the first leg departs.
    pub fn departure_date(&self) -> NaiveDate {
        self.departure_date
    }

    pub fn itinerary(&self) -> &Itinerary {
        &self.itinerary
    }

    pub fn reservations(&self) -> &[Reservation] {
        &self.reservations
    }

    pub fn traveler_count(&self) -> usize {
        self.reservations.len()
    }

    pub fn clients(&self) -> impl Iterator<Item = &Client> {
        self.reservations.iter().map(Reservation::client)
    }

    /// A trip is past once its departure date is before `today`.
    pub fn is_past(&self, today: NaiveDate) -> bool {
        self.departure_date < today
    }
}
