//! Application state for the web layer.

use std::sync::Arc;

use crate::booking::BookingEngine;
use crate::cache::CachedPlanner;
use crate::store::SqliteStore;

/// Shared application state.
///
/// Contains all the services needed to handle requests.
#[derive(Clone)]
pub struct AppState {
    /// Itinerary search over the loaded catalog, with cached results
    pub planner: Arc<CachedPlanner>,

    /// Booking engine over the SQLite store
    pub bookings: Arc<BookingEngine<SqliteStore>>,
}

impl AppState {
    /// Create a new app state.
    pub fn new(planner: CachedPlanner, bookings: BookingEngine<SqliteStore>) -> Self {
        Self {
            planner: Arc::new(planner),
            bookings: Arc::new(bookings),
        }
    }
}
