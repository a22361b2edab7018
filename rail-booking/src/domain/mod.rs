//! Domain types for rail itinerary search and booking.
//!
//! This module contains the core domain model types. All types enforce
//! their invariants at construction time, so code that receives these
//! types can trust their validity.

mod client;
mod error;
mod fare;
mod itinerary;
mod leg;
mod leg_id;
mod location;
mod operating_days;
mod time;
mod trip;

pub use client::{Client, NaturalKey, TravelerInput};
pub use error::DomainError;
pub use fare::{Fare, InvalidFare, InvalidTravelClass, TravelClass};
pub use itinerary::{Itinerary, ItinerarySignature, MAX_LEGS, Transfer};
pub use leg::Leg;
pub use leg_id::{InvalidLegId, LegId};
pub use location::{InvalidLocation, Location};
pub use operating_days::{InvalidOperatingDays, OperatingDays, parse_weekday};
pub use time::{ClockTime, MINUTES_PER_DAY, TimeError, parse_timetable_time};
pub use trip::{Reservation, Ticket, TicketId, Trip, TripId};
