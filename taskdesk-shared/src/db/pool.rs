/// PostgreSQL connection pool
///
/// Built once at startup from [`DatabaseConfig`] and owned by
/// [`PgStore`](crate::store::postgres::PgStore).

use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Pool settings, read from `DATABASE_*` environment variables by the API
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Upper bound on open connections
    pub max_connections: u32,

    /// Seconds to wait for a free connection
    pub acquire_timeout_seconds: u64,

    /// Idle connections are closed after this many seconds
    pub idle_timeout_seconds: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: 10,
            acquire_timeout_seconds: 30,
            idle_timeout_seconds: 30,
        }
    }
}

/// Connects and probes the database once before returning
pub async fn create_pool(config: DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    info!(
        max_connections = config.max_connections,
        idle_timeout_seconds = config.idle_timeout_seconds,
        "Creating database connection pool"
    );

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_seconds))
        .idle_timeout(Duration::from_secs(config.idle_timeout_seconds))
        .connect(&config.url)
        .await?;

    health_check(&pool).await?;

    info!("Database pool ready");
    Ok(pool)
}

/// Runs `SELECT 1` against the pool
pub async fn health_check(pool: &PgPool) -> Result<(), sqlx::Error> {
    let one: i32 = sqlx::query_scalar("SELECT 1").fetch_one(pool).await?;
    if one != 1 {
        warn!(value = one, "Unexpected health check result");
        return Err(sqlx::Error::Protocol("unexpected health check result".into()));
    }

    debug!(size = pool.size(), idle = pool.num_idle(), "Database reachable");
    Ok(())
}

pub async fn close_pool(pool: PgPool) {
    info!(open = pool.size(), "Closing database pool");
    pool.close().await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_api_config() {
        let config = DatabaseConfig::default();
        assert_eq!(config.max_connections, 10);
        assert_eq!(config.idle_timeout_seconds, 30);
        assert!(config.url.is_empty());
    }

    #[tokio::test]
    async fn test_create_pool_rejects_malformed_url() {
        let result = create_pool(DatabaseConfig {
            url: "not-a-database-url".to_string(),
            acquire_timeout_seconds: 1,
            ..Default::default()
        })
        .await;
        assert!(result.is_err());
    }
}
