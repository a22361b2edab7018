//! Application configuration.
//!
//! Every setting has a default; `RAIL_*` environment variables override
//! them at startup.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::planner::SearchConfig;

/// Error reading configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value:?} ({reason})")]
    InvalidValue {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// SQLite database settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the database file, or `:memory:`
    #[serde(default = "default_db_path")]
    pub path: String,

    /// Maximum pooled connections
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// How long SQLite waits on a locked database before failing (ms)
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,

    /// How long to wait for a free pooled connection (ms)
    #[serde(default = "default_pool_timeout_ms")]
    pub pool_timeout_ms: u64,

    /// Whether to run pending migrations when the pool is created
    #[serde(default = "default_true")]
    pub run_migrations: bool,
}

fn default_db_path() -> String {
    "rail-booking.db".to_string()
}

const fn default_max_connections() -> u32 {
    4
}

const fn default_busy_timeout_ms() -> u64 {
    5000
}

const fn default_pool_timeout_ms() -> u64 {
    10_000
}

const fn default_true() -> bool {
    true
}

impl DatabaseConfig {
    /// Configuration for a private in-memory database.
    pub fn in_memory() -> Self {
        Self {
            path: ":memory:".to_string(),
            ..Self::default()
        }
    }

    pub fn is_in_memory(&self) -> bool {
        self.path == ":memory:"
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }

    pub fn pool_timeout(&self) -> Duration {
        Duration::from_millis(self.pool_timeout_ms)
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            max_connections: default_max_connections(),
            busy_timeout_ms: default_busy_timeout_ms(),
            pool_timeout_ms: default_pool_timeout_ms(),
            run_migrations: default_true(),
        }
    }
}

/// Search result cache settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CacheConfig {
    /// Time to live for cached results (seconds)
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,

    /// Maximum number of cached queries
    #[serde(default = "default_max_capacity")]
    pub max_capacity: u64,
}

const fn default_ttl_secs() -> u64 {
    300
}

const fn default_max_capacity() -> u64 {
    1000
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
            max_capacity: default_max_capacity(),
        }
    }
}

/// Top-level configuration for the server binary.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub catalog_path: PathBuf,
    pub database: DatabaseConfig,
    pub cache: CacheConfig,
    pub search: SearchConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            catalog_path: PathBuf::from("data/catalog.json"),
            database: DatabaseConfig::default(),
            cache: CacheConfig::default(),
            search: SearchConfig::default(),
        }
    }
}

impl AppConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read configuration through `lookup`, which maps a variable name to
    /// its value if set.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(addr) = parsed(&lookup, "RAIL_BIND_ADDR")? {
            config.bind_addr = addr;
        }
        if let Some(path) = lookup("RAIL_CATALOG_PATH") {
            config.catalog_path = PathBuf::from(path);
        }
        if let Some(path) = lookup("RAIL_DB_PATH") {
            config.database.path = path;
        }
        if let Some(n) = parsed(&lookup, "RAIL_DB_MAX_CONNECTIONS")? {
            config.database.max_connections = n;
        }
        if let Some(ms) = parsed(&lookup, "RAIL_DB_BUSY_TIMEOUT_MS")? {
            config.database.busy_timeout_ms = ms;
        }
        if let Some(mins) = parsed(&lookup, "RAIL_MIN_TRANSFER_MINS")? {
            config.search.default_min_transfer_mins = mins;
        }
        if let Some(secs) = parsed(&lookup, "RAIL_CACHE_TTL_SECS")? {
            config.cache.ttl_secs = secs;
        }

        if config.database.max_connections == 0 {
            return Err(ConfigError::InvalidValue {
                var: "RAIL_DB_MAX_CONNECTIONS",
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(config)
    }
}

fn parsed<F, T>(lookup: &F, var: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let Some(value) = lookup(var) else {
        return Ok(None);
    };
    value
        .trim()
        .parse()
        .map(Some)
        .map_err(|e: T::Err| ConfigError::InvalidValue {
            var,
            reason: e.to_string(),
            value,
        })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| vars.get(k).cloned()
    }

    #[test]
    fn defaults_without_environment() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();

        assert_eq!(config.bind_addr, SocketAddr::from(([127, 0, 0, 1], 3000)));
        assert_eq!(config.catalog_path, PathBuf::from("data/catalog.json"));
        assert_eq!(config.database, DatabaseConfig::default());
        assert_eq!(config.cache, CacheConfig::default());
        assert_eq!(config.search.default_min_transfer_mins, 15);
    }

    #[test]
    fn environment_overrides() {
        let config = AppConfig::from_lookup(lookup(&[
            ("RAIL_BIND_ADDR", "0.0.0.0:8080"),
            ("RAIL_DB_PATH", "/tmp/rail.db"),
            ("RAIL_DB_MAX_CONNECTIONS", "8"),
            ("RAIL_DB_BUSY_TIMEOUT_MS", "250"),
            ("RAIL_MIN_TRANSFER_MINS", " 20 "),
            ("RAIL_CACHE_TTL_SECS", "5"),
        ]))
        .unwrap();

        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.database.path, "/tmp/rail.db");
        assert_eq!(config.database.max_connections, 8);
        assert_eq!(config.database.busy_timeout(), Duration::from_millis(250));
        assert_eq!(config.search.default_min_transfer_mins, 20);
        assert_eq!(config.cache.ttl(), Duration::from_secs(5));
    }

    #[test]
    fn invalid_values_are_rejected() {
        let err = AppConfig::from_lookup(lookup(&[("RAIL_DB_MAX_CONNECTIONS", "lots")]))
            .unwrap_err();
        assert!(err.to_string().contains("RAIL_DB_MAX_CONNECTIONS"));

        assert!(AppConfig::from_lookup(lookup(&[("RAIL_DB_MAX_CONNECTIONS", "0")])).is_err());
        assert!(AppConfig::from_lookup(lookup(&[("RAIL_BIND_ADDR", "nowhere")])).is_err());
    }

    #[test]
    fn database_config_serde_defaults() {
        let config: DatabaseConfig = serde_json::from_str(r#"{"path": "x.db"}"#).unwrap();
        assert_eq!(config.path, "x.db");
        assert_eq!(config.max_connections, 4);
        assert_eq!(config.busy_timeout_ms, 5000);
        assert!(config.run_migrations);

        assert!(DatabaseConfig::in_memory().is_in_memory());
    }

    #[test]
    fn cache_config_serde_defaults() {
        let config: CacheConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, CacheConfig::default());
        assert_eq!(config.ttl(), Duration::from_secs(300));
    }
}
