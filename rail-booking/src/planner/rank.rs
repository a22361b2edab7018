//! Itinerary ranking for search results.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::domain::{Itinerary, TravelClass};

/// Primary ordering for search results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortKey {
    /// Shortest door-to-door time first
    #[default]
    Duration,
    /// Cheapest fare in the requested class first
    Price,
}

impl SortKey {
    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::Duration => "duration",
            SortKey::Price => "price",
        }
    }
}

/// Error returned when parsing an unknown sort key.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown sort key: {0:?}")]
pub struct InvalidSortKey(String);

impl FromStr for SortKey {
    type Err = InvalidSortKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "duration" | "time" => Ok(SortKey::Duration),
            "price" | "fare" => Ok(SortKey::Price),
            _ => Err(InvalidSortKey(s.to_string())),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rank itineraries by preference.
///
/// Itineraries are ranked by:
/// 1. The requested key (duration or price in `class`), ascending
/// 2. Number of transfers (fewer is better)
/// 3. Leg id sequence, so equal itineraries always come out in the same order
pub fn rank_itineraries(
    mut itineraries: Vec<Itinerary>,
    sort: SortKey,
    class: TravelClass,
) -> Vec<Itinerary> {
    itineraries.sort_by(|a, b| {
        let primary = match sort {
            SortKey::Duration => a.total_duration_minutes().cmp(&b.total_duration_minutes()),
            SortKey::Price => a.price(class).cmp(&b.price(class)),
        };
        if primary != Ordering::Equal {
            return primary;
        }

        let transfers = a.transfer_count().cmp(&b.transfer_count());
        if transfers != Ordering::Equal {
            return transfers;
        }

        a.signature().cmp(b.signature())
    });

    itineraries
}

/// Remove itineraries with the same leg sequence, keeping the first.
pub fn deduplicate(itineraries: Vec<Itinerary>) -> Vec<Itinerary> {
    let mut seen = HashSet::with_capacity(itineraries.len());
    itineraries
        .into_iter()
        .filter(|it| seen.insert(it.signature().clone()))
        .collect()
}
