//! Itinerary planner.
//!
//! This module answers "how can I get from here to there": it enumerates
//! direct and connecting itineraries over the route catalog, checks every
//! transfer against the layover policy, then deduplicates and ranks the
//! results.

mod config;
mod layover;
mod rank;
mod search;

#[cfg(test)]
mod search_tests;

pub use config::SearchConfig;
pub use layover::{
    ConnectionRejection, DayPeriod, GapBounds, InvalidPolicyMode, LayoverPolicy, LayoverRejection,
    PolicyMode,
};
pub use rank::{InvalidSortKey, SortKey, deduplicate, rank_itineraries};
pub use search::{Planner, SearchError, SearchQuery, SearchResult};
