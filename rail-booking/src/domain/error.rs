//! Domain error types.
//!
//! These errors represent validation failures and data inconsistencies
//! in the domain layer. They are distinct from persistence and HTTP errors.

use super::{Location, TicketId};

/// Domain-level errors for validation and data consistency.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    /// Invalid leg construction (e.g., arrival not after departure)
    #[error("invalid leg: {0}")]
    InvalidLeg(&'static str),

    /// Itinerary has no legs
    #[error("itinerary must have at least one leg")]
    EmptyItinerary,

    /// Itinerary has more legs than the planner ever produces
    #[error("itinerary has {0} legs, at most 3 are allowed")]
    TooManyLegs(usize),

    /// Consecutive legs don't share a location
    #[error("legs do not connect: arrives at {0}, next departs from {1}")]
    LegsNotConnected(Location, Location),

    /// A traveler field failed validation
    #[error("invalid traveler: {0}")]
    InvalidTraveler(&'static str),

    /// Age below zero
    #[error("invalid age: {0}")]
    NegativeAge(i64),

    /// Reservation pairs a ticket with a different client
    #[error("ticket client does not match reservation client")]
    ReservationMismatch,

    /// A ticket on a trip refers to a different itinerary
    #[error("ticket {0} is for a different itinerary than its trip")]
    TicketItineraryMismatch(TicketId),

    /// Trip has no reservations
    #[error("trip must have at least one reservation")]
    EmptyTrip,
}
