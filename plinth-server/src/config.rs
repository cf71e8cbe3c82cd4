//! Server configuration from environment variables, plus the database
//! pool it describes.
//!
//! Variables:
//!   PLINTH_ADDR                 # bind address (default: 127.0.0.1:3030)
//!   PLINTH_CORS_PERMISSIVE      # "1"/"true" allows any origin
//!   DATABASE_URL                # PostgreSQL connection string
//!   PLINTH_DB_MAX_CONNECTIONS   # pool size (default: 5)

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

/// How long to wait for a connection before giving up.
const POOL_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to (default: 127.0.0.1:3030)
    pub bind_addr: SocketAddr,

    /// Allow permissive CORS (default: false = localhost only)
    ///
    /// WARNING: Setting this to true allows any origin.
    pub cors_permissive: bool,

    /// PostgreSQL connection string
    pub database_url: String,

    /// Maximum connections in the pool
    pub max_connections: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3030)),
            cors_permissive: false,
            database_url: "postgres://localhost/plinth".to_string(),
            max_connections: 5,
        }
    }
}

impl ServerConfig {
    /// Load from the environment, falling back to defaults for anything
    /// unset or unparsable.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            bind_addr: env::var("PLINTH_ADDR")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.bind_addr),
            cors_permissive: env::var("PLINTH_CORS_PERMISSIVE")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(defaults.cors_permissive),
            database_url: env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            max_connections: env::var("PLINTH_DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_connections),
        }
    }

    /// Connect a PostgreSQL pool sized by this configuration.
    pub async fn connect_pool(&self) -> Result<PgPool, sqlx::Error> {
        tracing::debug!(max_connections = self.max_connections, "connecting database pool");
        PgPoolOptions::new()
            .max_connections(self.max_connections)
            .acquire_timeout(POOL_ACQUIRE_TIMEOUT)
            .connect(&self.database_url)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr.port(), 3030);
        assert!(!config.cors_permissive);
        assert_eq!(config.max_connections, 5);
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn configured_pool_answers_queries() {
        let config = ServerConfig {
            database_url: std::env::var("DATABASE_URL").expect("DATABASE_URL required"),
            ..Default::default()
        };
        let pool = config.connect_pool().await.expect("pool");

        let answer: (i32,) = sqlx::query_as("SELECT 21 * 2")
            .fetch_one(&pool)
            .await
            .expect("query");
        assert_eq!(answer.0, 42);
    }
}
