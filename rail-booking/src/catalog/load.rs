//! Catalog loading from JSON.
//!
//! The catalog file is a JSON array of leg records. Field names follow the
//! snake_case form (`route_id`, `departure_city`, ...) and also accept the
//! column headers of the timetable spreadsheet the data is exported from
//! (`"Route ID"`, `"Departure City"`, ...). Every record is validated into a
//! [`Leg`]; the first malformed record fails the whole load.

use std::path::Path;

use serde::Deserialize;

use crate::domain::{Fare, Leg, LegId, Location, OperatingDays, parse_timetable_time};

use super::{CatalogError, RouteCatalog};

/// One leg as it appears in the catalog file.
#[derive(Debug, Clone, Deserialize)]
pub struct LegRecord {
    #[serde(alias = "Route ID")]
    pub route_id: String,

    #[serde(alias = "Departure City")]
    pub departure_city: String,

    #[serde(alias = "Arrival City")]
    pub arrival_city: String,

    /// "HH:MM", departure day is always day 0
    #[serde(alias = "Departure Time")]
    pub departure_time: String,

    /// "HH:MM" with an optional "(+Nd)" suffix
    #[serde(alias = "Arrival Time")]
    pub arrival_time: String,

    #[serde(default, alias = "Train Type")]
    pub train_type: String,

    #[serde(default = "default_days", alias = "Days of Operation")]
    pub days_of_operation: String,

    #[serde(default, alias = "First Class ticket rate (in euro)")]
    pub first_class_rate: f64,

    #[serde(default, alias = "Second Class ticket rate (in euro)")]
    pub second_class_rate: f64,
}

fn default_days() -> String {
    "Daily".to_string()
}

impl LegRecord {
    /// Validate this record into a leg.
    pub fn to_leg(&self) -> Result<Leg, String> {
        let id = LegId::parse(self.route_id.trim()).map_err(|e| e.to_string())?;
        let origin = Location::parse(&self.departure_city).map_err(|e| e.to_string())?;
        let destination = Location::parse(&self.arrival_city).map_err(|e| e.to_string())?;

        let (departure, departure_offset) =
            parse_timetable_time(&self.departure_time).map_err(|e| e.to_string())?;
        if departure_offset.is_some_and(|d| d > 0) {
            return Err("departure time cannot carry a day offset".to_string());
        }
        let (arrival, arrival_offset) =
            parse_timetable_time(&self.arrival_time).map_err(|e| e.to_string())?;

        let days = OperatingDays::parse(&self.days_of_operation).map_err(|e| e.to_string())?;
        let first = Fare::from_decimal(self.first_class_rate).map_err(|e| e.to_string())?;
        let second = Fare::from_decimal(self.second_class_rate).map_err(|e| e.to_string())?;

        let leg = Leg::new(id, origin, destination, departure, arrival, arrival_offset)
            .map_err(|e| e.to_string())?
            .with_carrier(self.train_type.trim())
            .with_operating_days(days)
            .with_fares(first, second);

        Ok(leg)
    }
}

impl RouteCatalog {
    /// Build a catalog from parsed records.
    pub fn from_records(records: &[LegRecord]) -> Result<Self, CatalogError> {
        let legs = records
            .iter()
            .enumerate()
            .map(|(index, record)| {
                record.to_leg().map_err(|reason| CatalogError::InvalidRecord {
                    index,
                    route_id: record.route_id.clone(),
                    reason,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(legs)
    }

    /// Parse a catalog from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let records: Vec<LegRecord> = serde_json::from_str(json)?;
        Self::from_records(&records)
    }

    /// Load a catalog from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self, CatalogError> {
        let json = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = Self::from_json_str(&json)?;
        tracing::info!(
            path = %path.display(),
            legs = catalog.len(),
            "Loaded route catalog"
        );
        Ok(catalog)
    }
}
