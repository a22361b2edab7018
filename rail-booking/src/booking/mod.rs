//! Booking transactions.
//!
//! Turns a chosen itinerary and a list of travelers into a persisted trip
//! with one ticket per traveler, or into an error with nothing written.

mod engine;
mod error;

pub use engine::{BookingEngine, BookingStore, ClientTrips, NewBooking, validate_travelers};
pub use error::{BookingError, PreconditionViolation};
