//! Web layer for the rail booking service.
//!
//! Provides HTTP endpoints for searching itineraries, booking them and
//! looking up trips.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
