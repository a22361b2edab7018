//! Route catalog.
//!
//! The catalog holds every scheduled leg, loaded once at startup and never
//! mutated afterwards. It is indexed by origin location so the planner can
//! expand a partial itinerary in constant time per hop, and by leg id so
//! bookings can resolve the legs a client picked.

mod load;

pub use load::LegRecord;

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::Weekday;

use crate::domain::{DomainError, Itinerary, Leg, LegId, Location};

/// Errors from loading or querying the catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Catalog file could not be read
    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Catalog file is not valid JSON for a list of records
    #[error("catalog JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A record failed validation
    #[error("invalid catalog record {index} ({route_id:?}): {reason}")]
    InvalidRecord {
        index: usize,
        route_id: String,
        reason: String,
    },

    /// Two records share an id
    #[error("duplicate leg id {0}")]
    DuplicateId(LegId),

    /// A requested leg is not in the catalog
    #[error("unknown leg id {0}")]
    UnknownLeg(LegId),

    /// Requested legs do not form a valid itinerary
    #[error(transparent)]
    InvalidItinerary(#[from] DomainError),
}

/// Optional per-leg filters applied during search.
///
/// A leg passes when it matches every filter that is set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct LegFilter {
    /// Carrier or train type, matched case-insensitively
    pub carrier: Option<String>,
    /// Leg must run on this weekday
    pub day: Option<Weekday>,
}

impl LegFilter {
    pub fn matches(&self, leg: &Leg) -> bool {
        let carrier_ok = self
            .carrier
            .as_deref()
            .is_none_or(|c| leg.carrier().eq_ignore_ascii_case(c));
        let day_ok = self
            .day
            .is_none_or(|d| leg.operating_days().contains(d));
        carrier_ok && day_ok
    }
}

/// Immutable, indexed collection of catalog legs.
#[derive(Debug, Default)]
pub struct RouteCatalog {
    legs: Vec<Arc<Leg>>,
    by_id: HashMap<LegId, Arc<Leg>>,
    by_origin: HashMap<Location, Vec<Arc<Leg>>>,
}

impl RouteCatalog {
    /// Build a catalog from validated legs.
    ///
    /// Legs keep their input order within each origin bucket, which keeps
    /// search enumeration deterministic.
    pub fn new(legs: Vec<Leg>) -> Result<Self, CatalogError> {
        let mut by_id = HashMap::with_capacity(legs.len());
        let mut by_origin: HashMap<Location, Vec<Arc<Leg>>> = HashMap::new();
        let mut all = Vec::with_capacity(legs.len());

        for leg in legs {
            let leg = Arc::new(leg);
            if by_id.insert(leg.id().clone(), leg.clone()).is_some() {
                return Err(CatalogError::DuplicateId(leg.id().clone()));
            }
            by_origin
                .entry(leg.origin().clone())
                .or_default()
                .push(leg.clone());
            all.push(leg);
        }

        Ok(Self {
            legs: all,
            by_id,
            by_origin,
        })
    }

    pub fn len(&self) -> usize {
        self.legs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.legs.is_empty()
    }

    /// All legs in load order.
    pub fn legs(&self) -> &[Arc<Leg>] {
        &self.legs
    }

    pub fn get(&self, id: &LegId) -> Option<&Arc<Leg>> {
        self.by_id.get(id)
    }

    /// Legs departing from a location.
    pub fn departures_from(&self, location: &Location) -> &[Arc<Leg>] {
        self.by_origin
            .get(location)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Resolve leg ids into a connected itinerary.
    pub fn resolve(&self, ids: &[LegId]) -> Result<Itinerary, CatalogError> {
        let legs = ids
            .iter()
            .map(|id| {
                self.get(id)
                    .cloned()
                    .ok_or_else(|| CatalogError::UnknownLeg(id.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Itinerary::new(legs)?)
    }
}
