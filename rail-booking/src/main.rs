use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use rail_booking::booking::BookingEngine;
use rail_booking::cache::CachedPlanner;
use rail_booking::catalog::RouteCatalog;
use rail_booking::config::AppConfig;
use rail_booking::store::SqliteStore;
use rail_booking::web::{AppState, create_router};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env()?;

    // Catalog is loaded once and never changes while serving
    let catalog = Arc::new(RouteCatalog::load_json(&config.catalog_path)?);

    let store = SqliteStore::open(&config.database)?;
    store.sync_catalog(&catalog)?;

    let planner = CachedPlanner::new(catalog, Arc::new(config.search.clone()), &config.cache);
    let state = AppState::new(planner, BookingEngine::new(store));
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!(addr = %config.bind_addr, "Rail booking service listening");
    info!("  GET  /health");
    info!("  GET  /policy?mode=strict|lenient");
    info!("  GET  /search?origin=..&destination=..");
    info!("  GET  /routes");
    info!("  POST /bookings");
    info!("  GET  /trips");
    info!("  GET  /trips/:id");
    info!("  GET  /clients/:last_name/:external_id/trips");
    info!("  GET  /stats");

    axum::serve(listener, app).await?;
    Ok(())
}
