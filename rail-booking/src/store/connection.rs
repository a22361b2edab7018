//! Database connection management
//!
//! Provides SQLite connection pooling via r2d2.

use std::path::Path;
use std::time::Duration;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;
use tracing::{debug, info};

use crate::config::DatabaseConfig;

use super::error::StoreError;
use super::migrations::run_migrations;

/// SQLite connection pool type alias
pub type ConnectionPool = Pool<SqliteConnectionManager>;

/// Create a new connection pool.
///
/// Every connection enforces foreign keys and waits up to the configured
/// busy timeout for locks. File databases use WAL journaling. An in-memory
/// database is private to its connection, so its pool holds exactly one.
pub fn create_pool(config: &DatabaseConfig) -> Result<ConnectionPool, StoreError> {
    info!(path = %config.path, max_connections = config.max_connections, "Creating database connection pool");

    let busy_timeout = config.busy_timeout();
    let (manager, max_size, idle_timeout) = if config.is_in_memory() {
        let manager = SqliteConnectionManager::memory()
            .with_init(move |c| init_connection(c, busy_timeout, false));
        (manager, 1, None)
    } else {
        if let Some(parent) = Path::new(&config.path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let manager = SqliteConnectionManager::file(&config.path)
            .with_init(move |c| init_connection(c, busy_timeout, true));
        (
            manager,
            config.max_connections.max(1),
            Some(Duration::from_secs(600)),
        )
    };

    let pool = Pool::builder()
        .max_size(max_size)
        .connection_timeout(config.pool_timeout())
        .idle_timeout(idle_timeout)
        .build(manager)?;

    if config.run_migrations {
        let conn = pool.get()?;
        run_migrations(&conn)?;
    }

    debug!("Database connection pool created successfully");
    Ok(pool)
}

/// Per-connection settings.
fn init_connection(
    conn: &mut Connection,
    busy_timeout: Duration,
    wal: bool,
) -> Result<(), rusqlite::Error> {
    conn.busy_timeout(busy_timeout)?;
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    if wal {
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            ",
        )?;
    }
    Ok(())
}
