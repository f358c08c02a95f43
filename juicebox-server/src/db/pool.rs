//! Database connection pool management
//!
//! Repositories borrow a `PgPool`; nothing holds a process-wide connection.
//! [`PoolSettings`] is the one place pool limits are decided, shared by the
//! binary, the offline router tests and the integration test harness.

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

/// Default maximum connections for the pool.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// How long a request waits for a free connection before failing.
pub const DEFAULT_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// Pool limits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolSettings {
    /// Upper bound on open connections. Also caps how many per-post lookups
    /// a fan-out (e.g. enriching every post of a tag) has in flight.
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_connections: DEFAULT_MAX_CONNECTIONS,
            acquire_timeout: DEFAULT_ACQUIRE_TIMEOUT,
        }
    }
}

impl PoolSettings {
    pub fn with_max_connections(max_connections: u32) -> Self {
        Self {
            max_connections,
            ..Self::default()
        }
    }

    /// Options carrying these limits, for callers that need extra hooks
    /// (e.g. `after_connect`) before connecting.
    pub fn options(&self) -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(self.max_connections)
            .acquire_timeout(self.acquire_timeout)
    }
}

/// Connect a PostgreSQL pool, failing fast if the database is unreachable.
///
/// # Example
///
/// ```ignore
/// let pool = create_pool("postgres://localhost:5432/juicebox-dev", PoolSettings::default()).await?;
/// ```
pub async fn create_pool(database_url: &str, settings: PoolSettings) -> Result<PgPool, sqlx::Error> {
    tracing::debug!(
        max_connections = settings.max_connections,
        acquire_timeout_ms = settings.acquire_timeout.as_millis() as u64,
        "connecting to database"
    );
    settings.options().connect(database_url).await
}

/// Build a pool that opens connections on first use.
///
/// Only the URL is validated here.
pub fn create_lazy_pool(database_url: &str, settings: PoolSettings) -> Result<PgPool, sqlx::Error> {
    settings.options().connect_lazy(database_url)
}
