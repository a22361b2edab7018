//! Data transfer objects for web requests and responses.

use chrono::{NaiveDate, SecondsFormat};
use serde::{Deserialize, Serialize};

use crate::booking::ClientTrips;
use crate::catalog::LegFilter;
use crate::domain::{
    Itinerary, Leg, Location, TravelClass, TravelerInput, Trip, parse_weekday,
};
use crate::planner::{PolicyMode, SearchConfig, SearchError, SearchQuery, SearchResult, SortKey};
use crate::store::StoreStatistics;

/// Query string for `GET /search`.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub origin: String,
    pub destination: String,

    /// 0, 1 or 2 (defaults to the configured value)
    pub max_transfers: Option<usize>,

    /// Minimum minutes between legs (defaults to the configured value)
    pub min_transfer_mins: Option<u32>,

    /// "first" or "second"
    pub class: Option<String>,

    /// "duration" or "price"
    pub sort: Option<String>,

    /// "strict" or "lenient"
    pub policy: Option<String>,

    /// Only use legs run by this carrier
    pub carrier: Option<String>,

    /// Only use legs running on this weekday (e.g. "Mon")
    pub day: Option<String>,

    pub limit: Option<usize>,
}

impl SearchParams {
    /// Validate the parameters into a search query.
    pub fn to_query(&self, config: &SearchConfig) -> Result<SearchQuery, SearchError> {
        let invalid = |msg: String| SearchError::InvalidRequest(msg);

        let origin = Location::parse(&self.origin).map_err(|e| invalid(format!("origin: {e}")))?;
        let destination = Location::parse(&self.destination)
            .map_err(|e| invalid(format!("destination: {e}")))?;

        let mut query = SearchQuery::new(origin, destination);
        query.max_transfers = self.max_transfers.unwrap_or(config.default_max_transfers);
        query.min_transfer_mins = self
            .min_transfer_mins
            .unwrap_or(config.default_min_transfer_mins);
        query.limit = self.limit;

        if let Some(class) = non_blank(&self.class) {
            query.class = class.parse().map_err(|e| invalid(format!("{e}")))?;
        }
        if let Some(sort) = non_blank(&self.sort) {
            query.sort = sort.parse::<SortKey>().map_err(|e| invalid(format!("{e}")))?;
        }
        if let Some(policy) = non_blank(&self.policy) {
            query.policy = policy
                .parse::<PolicyMode>()
                .map_err(|e| invalid(format!("{e}")))?;
        }

        let carrier = non_blank(&self.carrier).map(str::to_string);
        let day = match non_blank(&self.day) {
            Some(d) => Some(parse_weekday(d).ok_or_else(|| invalid(format!("unknown day: {d:?}")))?),
            None => None,
        };
        query.filter = LegFilter { carrier, day };

        query.validate()?;
        Ok(query)
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Query string for `GET /routes`.
#[derive(Debug, Default, Deserialize)]
pub struct RoutesParams {
    pub class: Option<String>,
    pub carrier: Option<String>,
    pub day: Option<String>,
}

impl RoutesParams {
    /// Fare class to show and the filter to apply.
    pub fn to_filter(&self) -> Result<(TravelClass, LegFilter), SearchError> {
        let invalid = |msg: String| SearchError::InvalidRequest(msg);

        let class = match non_blank(&self.class) {
            Some(c) => c.parse().map_err(|e| invalid(format!("{e}")))?,
            None => TravelClass::default(),
        };
        let carrier = non_blank(&self.carrier).map(str::to_string);
        let day = match non_blank(&self.day) {
            Some(d) => Some(parse_weekday(d).ok_or_else(|| invalid(format!("unknown day: {d:?}")))?),
            None => None,
        };

        Ok((class, LegFilter { carrier, day }))
    }
}

/// Response for `GET /routes`.
#[derive(Debug, Serialize)]
pub struct RoutesResponse {
    pub class: TravelClass,
    pub routes: Vec<LegResult>,
}

/// Query string for `GET /policy`.
#[derive(Debug, Default, Deserialize)]
pub struct PolicyParams {
    pub mode: Option<String>,
}

/// Response for `GET /policy`.
#[derive(Debug, Serialize)]
pub struct PolicyResponse {
    pub mode: String,
    pub description: String,
}

/// Response for `GET /search`.
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    /// Found itineraries, best first
    pub itineraries: Vec<ItineraryResult>,

    /// Number of partial itineraries explored
    pub candidates_examined: usize,
}

impl SearchResponse {
    pub fn from_result(result: &SearchResult, class: TravelClass) -> Self {
        Self {
            itineraries: result
                .itineraries
                .iter()
                .map(|it| ItineraryResult::from_itinerary(it, class))
                .collect(),
            candidates_examined: result.candidates_examined,
        }
    }
}

/// An itinerary in results.
#[derive(Debug, Serialize)]
pub struct ItineraryResult {
    /// Leg ids joined by '>'
    pub signature: String,
    pub legs: Vec<LegResult>,
    pub departure: String,
    pub arrival: String,

    /// Days after departure that the final leg arrives
    pub arrival_day_offset: u32,
    pub duration_mins: u32,
    pub transfer_mins: u32,
    pub transfers: usize,

    /// Total fare in `class`, as a decimal string
    pub price: String,
    pub class: TravelClass,
}

impl ItineraryResult {
    pub fn from_itinerary(itinerary: &Itinerary, class: TravelClass) -> Self {
        Self {
            signature: itinerary.signature().to_string(),
            legs: itinerary
                .legs()
                .iter()
                .map(|leg| LegResult::from_leg(leg, class))
                .collect(),
            departure: itinerary.departure().to_string(),
            arrival: itinerary.arrival().to_string(),
            arrival_day_offset: itinerary.arrival_day_offset(),
            duration_mins: itinerary.total_duration_minutes(),
            transfer_mins: itinerary.transfer_minutes(),
            transfers: itinerary.transfer_count(),
            price: itinerary.price(class).to_string(),
            class,
        }
    }
}

/// One leg of an itinerary.
#[derive(Debug, Serialize)]
pub struct LegResult {
    pub id: String,
    pub origin: String,
    pub destination: String,
    pub departure: String,
    pub arrival: String,
    pub arrival_day_offset: u8,
    pub carrier: String,
    pub operating_days: String,
    pub fare: String,
}

impl LegResult {
    pub fn from_leg(leg: &Leg, class: TravelClass) -> Self {
        Self {
            id: leg.id().to_string(),
            origin: leg.origin().to_string(),
            destination: leg.destination().to_string(),
            departure: leg.departure().to_string(),
            arrival: leg.arrival().to_string(),
            arrival_day_offset: leg.arrival_day_offset(),
            carrier: leg.carrier().to_string(),
            operating_days: leg.operating_days().to_string(),
            fare: leg.fare(class).to_string(),
        }
    }
}

/// Body for `POST /bookings`.
#[derive(Debug, Deserialize)]
pub struct BookingRequest {
    /// Legs of the chosen itinerary, in travel order
    pub leg_ids: Vec<String>,
    pub travelers: Vec<TravelerInput>,

    /// Travel date (defaults to today)
    pub departure_date: Option<NaiveDate>,

    /// Class used to price the returned trip
    #[serde(default)]
    pub class: Option<TravelClass>,
}

/// A booked trip.
#[derive(Debug, Serialize)]
pub struct TripResult {
    pub id: i64,
    pub created_at: String,
    pub departure_date: String,
    pub itinerary: ItineraryResult,
    pub tickets: Vec<TicketResult>,
}

impl TripResult {
    pub fn from_trip(trip: &Trip, class: TravelClass) -> Self {
        Self {
            id: trip.id().0,
            created_at: trip.created_at().to_rfc3339_opts(SecondsFormat::Secs, true),
            departure_date: trip.departure_date().format("%Y-%m-%d").to_string(),
            itinerary: ItineraryResult::from_itinerary(trip.itinerary(), class),
            tickets: trip
                .reservations()
                .iter()
                .map(|r| {
                    let ticket = r.ticket();
                    let client = r.client();
                    TicketResult {
                        id: ticket.id().0,
                        first_name: client.first_name().to_string(),
                        last_name: client.last_name().to_string(),
                        external_id: client.external_id().to_string(),
                        age: client.age(),
                        issued_at: ticket.issued_at().to_rfc3339_opts(SecondsFormat::Secs, true),
                    }
                })
                .collect(),
        }
    }
}

/// A ticket within a trip.
#[derive(Debug, Serialize)]
pub struct TicketResult {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub external_id: String,
    pub age: u32,
    pub issued_at: String,
}

/// Response for `GET /clients/:last_name/:external_id/trips`.
#[derive(Debug, Serialize)]
pub struct ClientTripsResponse {
    pub current: Vec<TripResult>,
    pub past: Vec<TripResult>,
}

impl ClientTripsResponse {
    pub fn from_trips(trips: &ClientTrips) -> Self {
        let convert = |ts: &[Trip]| {
            ts.iter()
                .map(|t| TripResult::from_trip(t, TravelClass::default()))
                .collect()
        };
        Self {
            current: convert(&trips.current),
            past: convert(&trips.past),
        }
    }
}

/// Response for `GET /trips`.
#[derive(Debug, Serialize)]
pub struct TripsResponse {
    pub trips: Vec<TripResult>,
}

impl TripsResponse {
    pub fn from_trips(trips: &[Trip]) -> Self {
        Self {
            trips: trips
                .iter()
                .map(|t| TripResult::from_trip(t, TravelClass::default()))
                .collect(),
        }
    }
}

/// Response for `GET /stats`.
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub catalog_legs: usize,
    pub cached_searches: u64,
    #[serde(flatten)]
    pub store: StoreStatistics,
}

/// Error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}
