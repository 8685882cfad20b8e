use crate::shared::errors::{ScalingError, ScalingResult};
use diesel::pg::PgConnection;
use diesel::r2d2::{self, ConnectionManager, Pool};
use std::time::Duration;

pub type DbPool = Pool<ConnectionManager<PgConnection>>;
pub type DbConnection = r2d2::PooledConnection<ConnectionManager<PgConnection>>;

/// Sizing and timeouts for short-lived probe pools
#[derive(Debug, Clone)]
pub struct PoolSettings {
    pub max_size: u32,
    pub connection_timeout: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_size: 2,
            connection_timeout: Duration::from_secs(10),
        }
    }
}

/// Validate a PostgreSQL connection URL without exposing credentials in errors
pub fn validate_database_url(database_url: &str) -> ScalingResult<()> {
    if !database_url.starts_with("postgres://") && !database_url.starts_with("postgresql://") {
        return Err(ScalingError::InvalidConfiguration(format!(
            "Invalid database URL for host '{}'. Must start with postgres:// or postgresql://",
            redact_url(database_url)
        )));
    }
    Ok(())
}

/// Host part of a connection URL, safe for logs
pub fn redact_url(database_url: &str) -> &str {
    database_url.rsplit('@').next().unwrap_or("unknown_host")
}

/// Build a pool that opens no connection until the first checkout.
///
/// Connections are only established by probes, and every connection is closed
/// when the last clone of the pool is dropped.
pub fn build_lazy_pool(database_url: &str, settings: &PoolSettings) -> ScalingResult<DbPool> {
    validate_database_url(database_url)?;

    let manager = ConnectionManager::<PgConnection>::new(database_url);
    let pool = r2d2::Pool::builder()
        .max_size(settings.max_size.max(1))
        .min_idle(Some(0))
        .connection_timeout(settings.connection_timeout)
        .test_on_check_out(false)
        .build_unchecked(manager);

    log::debug!(
        "Probe pool created for {} (max_size: {})",
        redact_url(database_url),
        pool.max_size()
    );

    Ok(pool)
}
