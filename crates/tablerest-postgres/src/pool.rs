//! Connection pool setup.

use std::str::FromStr;
use std::time::Duration;

use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};

use crate::error::Result;

/// Pool sizing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolSettings {
    /// Upper bound on open connections.
    pub max_connections: u32,
    /// Connections kept open while idle.
    pub min_connections: u32,
    /// Age after which a connection is closed and replaced.
    pub max_lifetime: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_connections: 25,
            min_connections: 5,
            max_lifetime: Duration::from_secs(3600),
        }
    }
}

impl PoolSettings {
    fn pool_options(&self) -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(self.max_connections)
            .min_connections(self.min_connections)
            .max_lifetime(self.max_lifetime)
    }
}

/// Parses `url` into connect options with the statement cache disabled.
///
/// The same statement text resolves against a different `search_path` for
/// each tenant, so a statement prepared for one tenant must never be reused
/// for another on the same connection.
///
/// # Errors
///
/// Returns [`sqlx::Error::Configuration`] for a malformed URL.
pub fn connect_options(url: &str) -> Result<PgConnectOptions> {
    Ok(PgConnectOptions::from_str(url)?.statement_cache_capacity(0))
}

/// Opens a pool and establishes the first connection.
///
/// # Errors
///
/// Returns an error if the URL is malformed or the server is unreachable.
pub async fn connect(url: &str, settings: &PoolSettings) -> Result<PgPool> {
    let pool = settings
        .pool_options()
        .connect_with(connect_options(url)?)
        .await?;
    Ok(pool)
}

/// Creates a pool that connects on first use.
///
/// # Errors
///
/// Returns an error if the URL is malformed.
pub fn connect_lazy(url: &str, settings: &PoolSettings) -> Result<PgPool> {
    Ok(settings.pool_options().connect_lazy_with(connect_options(url)?))
}
