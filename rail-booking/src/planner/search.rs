//! Itinerary search.
//!
//! Enumerates direct, one-transfer and two-transfer itineraries between two
//! locations. The search is a depth-first expansion over the catalog's
//! origin index, bounded to `max_transfers + 1` legs, that checks each
//! transfer as soon as it is formed so infeasible prefixes are never
//! extended. Itineraries never pass through the same location twice.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::catalog::{LegFilter, RouteCatalog};
use crate::domain::{Itinerary, Leg, Location, MAX_LEGS, MINUTES_PER_DAY, TravelClass};

use super::config::SearchConfig;
use super::layover::{LayoverPolicy, PolicyMode};
use super::rank::{SortKey, deduplicate, rank_itineraries};

/// Error from itinerary search.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    /// Invalid search request
    #[error("invalid search request: {0}")]
    InvalidRequest(String),
}

/// Request for itinerary search.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SearchQuery {
    pub origin: Location,
    pub destination: Location,

    /// Per-leg filters; every leg of a result must pass them.
    pub filter: LegFilter,

    /// 0 for direct only, up to 2.
    pub max_transfers: usize,

    /// Hard floor on every transfer gap, applied before the layover policy.
    pub min_transfer_mins: u32,

    /// Class used for pricing and price ranking.
    pub class: TravelClass,

    pub sort: SortKey,

    pub policy: PolicyMode,

    /// Cap on returned itineraries; the configured maximum still applies.
    pub limit: Option<usize>,
}

impl SearchQuery {
    /// Create a query with default options: up to two transfers, 15-minute
    /// minimum transfer, second class, sorted by duration, strict policy.
    pub fn new(origin: Location, destination: Location) -> Self {
        Self {
            origin,
            destination,
            filter: LegFilter::default(),
            max_transfers: MAX_LEGS - 1,
            min_transfer_mins: 15,
            class: TravelClass::default(),
            sort: SortKey::default(),
            policy: PolicyMode::default(),
            limit: None,
        }
    }

    /// Validate the query.
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.max_transfers > MAX_LEGS - 1 {
            return Err(SearchError::InvalidRequest(format!(
                "max_transfers must be between 0 and {}, got {}",
                MAX_LEGS - 1,
                self.max_transfers
            )));
        }

        if self.origin == self.destination {
            return Err(SearchError::InvalidRequest(
                "origin and destination must differ".to_string(),
            ));
        }

        if self.min_transfer_mins >= MINUTES_PER_DAY {
            return Err(SearchError::InvalidRequest(
                "min_transfer_mins must be less than a day".to_string(),
            ));
        }

        if self.limit == Some(0) {
            return Err(SearchError::InvalidRequest(
                "limit must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

/// Result of itinerary search.
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// Found itineraries, ranked best-first.
    pub itineraries: Vec<Itinerary>,

    /// Number of partial itineraries expanded during search.
    pub candidates_examined: usize,
}

/// Per-search state shared by every expansion step.
struct Expansion<'q> {
    query: &'q SearchQuery,
    policy: LayoverPolicy,
    max_legs: usize,
    found: Vec<Itinerary>,
    examined: usize,
}

/// Itinerary planner over a route catalog.
pub struct Planner<'a> {
    catalog: &'a RouteCatalog,
    config: &'a SearchConfig,
}

impl<'a> Planner<'a> {
    /// Create a new planner.
    pub fn new(catalog: &'a RouteCatalog, config: &'a SearchConfig) -> Self {
        Self { catalog, config }
    }

    /// Search for itineraries matching `query`.
    ///
    /// Unknown locations give an empty result rather than an error.
    pub fn search(&self, query: &SearchQuery) -> Result<SearchResult, SearchError> {
        query.validate()?;

        let mut state = Expansion {
            query,
            policy: self.config.layover.with_mode(query.policy),
            max_legs: query.max_transfers + 1,
            found: Vec::new(),
            examined: 0,
        };

        let mut path = Vec::with_capacity(state.max_legs);
        for first in self.catalog.departures_from(&query.origin) {
            if !query.filter.matches(first) {
                continue;
            }
            path.push(first.clone());
            self.expand(&mut state, &mut path);
            path.pop();
        }

        let found = state.found.len();
        let itineraries = deduplicate(state.found);
        let mut itineraries = rank_itineraries(itineraries, query.sort, query.class);

        let cap = query
            .limit
            .map_or(self.config.max_results, |l| l.min(self.config.max_results));
        itineraries.truncate(cap);

        debug!(
            origin = %query.origin,
            destination = %query.destination,
            found,
            returned = itineraries.len(),
            examined = state.examined,
            "Search complete"
        );

        Ok(SearchResult {
            itineraries,
            candidates_examined: state.examined,
        })
    }

    /// Extend `path` towards the destination, recording complete itineraries.
    fn expand(&self, state: &mut Expansion<'_>, path: &mut Vec<Arc<Leg>>) {
        state.examined += 1;

        let Some(last) = path.last().cloned() else {
            return;
        };

        if last.destination() == &state.query.destination {
            if let Ok(itinerary) = Itinerary::new(path.clone()) {
                state.found.push(itinerary);
            }
            return;
        }

        if path.len() >= state.max_legs {
            return;
        }
        let final_hop = path.len() + 1 == state.max_legs;

        for next in self.catalog.departures_from(last.destination()) {
            if !state.query.filter.matches(next) {
                continue;
            }
            if final_hop && next.destination() != &state.query.destination {
                continue;
            }
            if path.iter().any(|leg| leg.origin() == next.destination()) {
                continue;
            }
            if !self.transfer_ok(state, &last, next) {
                continue;
            }

            path.push(next.clone());
            self.expand(state, path);
            path.pop();
        }
    }

    /// Check the gap between two consecutive legs.
    fn transfer_ok(&self, state: &Expansion<'_>, inbound: &Leg, outbound: &Leg) -> bool {
        let gap = inbound.arrival().minutes_until(outbound.departure());
        if gap < state.query.min_transfer_mins {
            trace!(
                from = %inbound.id(),
                to = %outbound.id(),
                gap,
                "Transfer below minimum"
            );
            return false;
        }

        match state.policy.evaluate(inbound.arrival(), outbound.departure()) {
            Ok(_) => true,
            Err(reason) => {
                trace!(
                    from = %inbound.id(),
                    to = %outbound.id(),
                    %reason,
                    "Transfer rejected by layover policy"
                );
                false
            }
        }
    }
}
