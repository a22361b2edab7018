//! Booking transaction engine.
//!
//! Checks every precondition that does not need the store, then hands the
//! validated booking to a [`BookingStore`], which runs the duplicate-booking
//! check and all inserts in a single write transaction.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, info, instrument, warn};

use crate::domain::{Client, Itinerary, NaturalKey, TravelerInput, Trip, TripId};
use crate::store::StoreError;

use super::error::{BookingError, PreconditionViolation};

/// A validated booking ready to be written.
#[derive(Debug, Clone, Copy)]
pub struct NewBooking<'a> {
    pub itinerary: &'a Itinerary,

    /// Pairwise distinct by natural key.
    pub clients: &'a [Client],

    /// Date the first leg departs.
    pub departure_date: NaiveDate,

    pub booked_at: DateTime<Utc>,
}

/// Transactional storage for trips.
///
/// Implementations must make `commit_booking` atomic: either every row of
/// the booking is written, or none is.
pub trait BookingStore: Send + Sync {
    /// Write a trip, its legs, any new clients and one ticket per client.
    ///
    /// Fails with [`StoreError::DuplicateBooking`] if any client already
    /// holds a ticket for the same itinerary.
    fn commit_booking(&self, booking: &NewBooking<'_>) -> Result<Trip, StoreError>;

    fn trip(&self, id: TripId) -> Result<Option<Trip>, StoreError>;

    /// Every trip holding a ticket for `key`, newest first.
    fn trips_for_client(&self, key: &NaturalKey) -> Result<Vec<Trip>, StoreError>;

    /// Every trip, newest first.
    fn all_trips(&self) -> Result<Vec<Trip>, StoreError>;
}

impl<T: BookingStore + ?Sized> BookingStore for Arc<T> {
    fn commit_booking(&self, booking: &NewBooking<'_>) -> Result<Trip, StoreError> {
        (**self).commit_booking(booking)
    }

    fn trip(&self, id: TripId) -> Result<Option<Trip>, StoreError> {
        (**self).trip(id)
    }

    fn trips_for_client(&self, key: &NaturalKey) -> Result<Vec<Trip>, StoreError> {
        (**self).trips_for_client(key)
    }

    fn all_trips(&self) -> Result<Vec<Trip>, StoreError> {
        (**self).all_trips()
    }
}

/// A client's trips split around a reference date.
#[derive(Debug, Clone, Default)]
pub struct ClientTrips {
    /// Departing on or after the reference date, newest booking first.
    pub current: Vec<Trip>,

    /// Departed before the reference date, newest booking first.
    pub past: Vec<Trip>,
}

/// Books itineraries for groups of travelers.
#[derive(Debug, Clone)]
pub struct BookingEngine<S> {
    store: S,
}

impl<S: BookingStore> BookingEngine<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Book `itinerary` for `travelers`, departing today.
    pub fn book(
        &self,
        itinerary: &Itinerary,
        travelers: &[TravelerInput],
    ) -> Result<Trip, BookingError> {
        let now = Utc::now();
        self.book_at(itinerary, travelers, now.date_naive(), now)
    }

    /// Book `itinerary` for `travelers`, departing on `departure_date`.
    pub fn book_on(
        &self,
        itinerary: &Itinerary,
        travelers: &[TravelerInput],
        departure_date: NaiveDate,
    ) -> Result<Trip, BookingError> {
        self.book_at(itinerary, travelers, departure_date, Utc::now())
    }

    #[instrument(skip(self, itinerary, travelers), fields(signature = %itinerary.signature(), travelers = travelers.len(), %departure_date))]
    pub fn book_at(
        &self,
        itinerary: &Itinerary,
        travelers: &[TravelerInput],
        departure_date: NaiveDate,
        booked_at: DateTime<Utc>,
    ) -> Result<Trip, BookingError> {
        let clients = validate_travelers(travelers)?;

        let booking = NewBooking {
            itinerary,
            clients: &clients,
            departure_date,
            booked_at,
        };

        match self.store.commit_booking(&booking) {
            Ok(trip) => {
                info!(trip_id = %trip.id(), tickets = trip.traveler_count(), "Booking committed");
                Ok(trip)
            }
            Err(e) => {
                let err = BookingError::from(e);
                match &err {
                    BookingError::Precondition(reason) => debug!(%reason, "Booking rejected"),
                    BookingError::Persistence(e) => {
                        warn!(error = %e, retryable = err.is_retryable(), "Booking failed")
                    }
                }
                Err(err)
            }
        }
    }

    pub fn trip(&self, id: TripId) -> Result<Option<Trip>, BookingError> {
        Ok(self.store.trip(id)?)
    }

    /// Every booked trip, newest first.
    pub fn all_trips(&self) -> Result<Vec<Trip>, BookingError> {
        Ok(self.store.all_trips()?)
    }

    /// A client's trips, split into current and past as of today.
    pub fn trips_for_client(
        &self,
        last_name: &str,
        external_id: &str,
    ) -> Result<ClientTrips, BookingError> {
        self.trips_for_client_as_of(last_name, external_id, Utc::now().date_naive())
    }

    /// A client's trips, split into current and past as of `today`.
    #[instrument(skip(self))]
    pub fn trips_for_client_as_of(
        &self,
        last_name: &str,
        external_id: &str,
        today: NaiveDate,
    ) -> Result<ClientTrips, BookingError> {
        let key = NaturalKey::new(last_name, external_id);
        let trips = self.store.trips_for_client(&key)?;

        let (past, current): (Vec<Trip>, Vec<Trip>) =
            trips.into_iter().partition(|t| t.is_past(today));

        debug!(current = current.len(), past = past.len(), "Loaded client trips");
        Ok(ClientTrips { current, past })
    }
}

/// Validate a booking's travelers and convert them to clients.
///
/// # Errors
///
/// Returns the first violation found: no travelers, an invalid traveler,
/// or two travelers with the same natural key.
pub fn validate_travelers(
    travelers: &[TravelerInput],
) -> Result<Vec<Client>, PreconditionViolation> {
    if travelers.is_empty() {
        return Err(PreconditionViolation::NoTravelers);
    }

    let mut seen = HashSet::with_capacity(travelers.len());
    let mut clients = Vec::with_capacity(travelers.len());

    for (index, traveler) in travelers.iter().enumerate() {
        let client = traveler
            .to_client()
            .map_err(|source| PreconditionViolation::InvalidTraveler { index, source })?;

        if !seen.insert(client.natural_key().clone()) {
            return Err(PreconditionViolation::DuplicateTraveler {
                key: client.natural_key().clone(),
            });
        }
        clients.push(client);
    }

    Ok(clients)
}
