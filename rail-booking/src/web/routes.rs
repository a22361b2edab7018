//! HTTP route handlers.

use std::sync::Arc;

use axum::body::Bytes;
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use crate::booking::{BookingError, PreconditionViolation};
use crate::catalog::CatalogError;
use crate::domain::{LegId, TravelClass, TripId};
use crate::planner::{PolicyMode, SearchError};

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/policy", get(policy))
        .route("/search", get(search))
        .route("/routes", get(list_routes))
        .route("/bookings", post(create_booking))
        .route("/trips", get(list_trips))
        .route("/trips/:id", get(get_trip))
        .route("/clients/:last_name/:external_id/trips", get(client_trips))
        .route("/stats", get(stats))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Describe the layover policy in the requested mode.
async fn policy(
    State(state): State<AppState>,
    Query(params): Query<PolicyParams>,
) -> Result<Json<PolicyResponse>, AppError> {
    let mode = match params.mode.as_deref() {
        Some(m) => m.parse::<PolicyMode>().map_err(|e| AppError::BadRequest {
            message: e.to_string(),
        })?,
        None => state.planner.config().layover.mode,
    };

    let policy = state.planner.config().layover.with_mode(mode);
    Ok(Json(PolicyResponse {
        mode: mode.to_string(),
        description: policy.describe(),
    }))
}

/// Search for itineraries.
async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, AppError> {
    let query = params.to_query(state.planner.config())?;
    let result = state.planner.search(&query).await?;

    Ok(Json(SearchResponse::from_result(&result, query.class)))
}

/// List catalog legs, optionally filtered by carrier and operating day.
async fn list_routes(
    State(state): State<AppState>,
    Query(params): Query<RoutesParams>,
) -> Result<Json<RoutesResponse>, AppError> {
    let (class, filter) = params.to_filter()?;
    let routes = state
        .planner
        .catalog()
        .legs()
        .iter()
        .filter(|leg| filter.matches(leg))
        .map(|leg| LegResult::from_leg(leg, class))
        .collect();

    Ok(Json(RoutesResponse { class, routes }))
}

/// Book an itinerary for a group of travelers.
async fn create_booking(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Response, AppError> {
    // Parse JSON manually so the rejection carries our error shape
    let req: BookingRequest = serde_json::from_slice(&body).map_err(|e| {
        warn!(error = %e, "Rejected booking body");
        AppError::BadRequest {
            message: format!("Invalid JSON: {e}"),
        }
    })?;

    let leg_ids = req
        .leg_ids
        .iter()
        .map(|id| LegId::parse(id))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| AppError::BadRequest {
            message: e.to_string(),
        })?;
    let itinerary = state.planner.catalog().resolve(&leg_ids)?;

    let engine = Arc::clone(&state.bookings);
    let travelers = req.travelers;
    let departure_date = req.departure_date;
    let trip = tokio::task::spawn_blocking(move || match departure_date {
        Some(date) => engine.book_on(&itinerary, &travelers, date),
        None => engine.book(&itinerary, &travelers),
    })
    .await
    .map_err(AppError::from_join)??;

    let class = req.class.unwrap_or_default();
    Ok((
        StatusCode::CREATED,
        Json(TripResult::from_trip(&trip, class)),
    )
        .into_response())
}

/// Fetch one trip.
async fn get_trip(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<TripResult>, AppError> {
    let engine = Arc::clone(&state.bookings);
    let trip = tokio::task::spawn_blocking(move || engine.trip(TripId(id)))
        .await
        .map_err(AppError::from_join)??
        .ok_or_else(|| AppError::NotFound {
            message: format!("Trip {id} not found"),
        })?;

    Ok(Json(TripResult::from_trip(&trip, TravelClass::default())))
}

/// Every booked trip, newest first.
async fn list_trips(State(state): State<AppState>) -> Result<Json<TripsResponse>, AppError> {
    let engine = Arc::clone(&state.bookings);
    let trips = tokio::task::spawn_blocking(move || engine.all_trips())
        .await
        .map_err(AppError::from_join)??;

    Ok(Json(TripsResponse::from_trips(&trips)))
}

/// List a client's trips, split into current and past.
async fn client_trips(
    State(state): State<AppState>,
    Path((last_name, external_id)): Path<(String, String)>,
) -> Result<Json<ClientTripsResponse>, AppError> {
    let engine = Arc::clone(&state.bookings);
    let trips =
        tokio::task::spawn_blocking(move || engine.trips_for_client(&last_name, &external_id))
            .await
            .map_err(AppError::from_join)??;

    Ok(Json(ClientTripsResponse::from_trips(&trips)))
}

/// Row counts and cache size.
async fn stats(State(state): State<AppState>) -> Result<Json<StatsResponse>, AppError> {
    let engine = Arc::clone(&state.bookings);
    let store = tokio::task::spawn_blocking(move || engine.store().statistics())
        .await
        .map_err(AppError::from_join)?
        .map_err(|e| AppError::from(BookingError::from(e)))?;

    Ok(Json(StatsResponse {
        catalog_legs: state.planner.catalog().len(),
        cached_searches: state.planner.cache().entry_count(),
        store,
    }))
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    Conflict { message: String },
    Unavailable { message: String },
    Internal { message: String },
}

impl AppError {
    fn from_join(e: tokio::task::JoinError) -> Self {
        AppError::Internal {
            message: format!("worker task failed: {e}"),
        }
    }
}

impl From<SearchError> for AppError {
    fn from(e: SearchError) -> Self {
        match e {
            SearchError::InvalidRequest(msg) => AppError::BadRequest { message: msg },
        }
    }
}

impl From<CatalogError> for AppError {
    fn from(e: CatalogError) -> Self {
        match e {
            CatalogError::UnknownLeg(_) => AppError::NotFound {
                message: e.to_string(),
            },
            _ => AppError::BadRequest {
                message: e.to_string(),
            },
        }
    }
}

impl From<BookingError> for AppError {
    fn from(e: BookingError) -> Self {
        let message = e.to_string();
        match e {
            BookingError::Precondition(PreconditionViolation::DuplicateBooking { .. }) => {
                AppError::Conflict { message }
            }
            BookingError::Precondition(_) => AppError::BadRequest { message },
            BookingError::Persistence(_) => AppError::Unavailable { message },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
            AppError::Conflict { message } => (StatusCode::CONFLICT, message),
            AppError::Unavailable { message } => (StatusCode::SERVICE_UNAVAILABLE, message),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        if status.is_server_error() {
            error!(%status, %message, "Request failed");
        } else {
            warn!(%status, %message, "Request rejected");
        }

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}
