//! PostgreSQL pool setup and the stores built on top of it.

use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

use tablebook_core::config::DatabaseConfig;
use tablebook_core::result::AppResult;

use crate::error::map_sqlx;
use crate::repositories::UserRepository;
use crate::store::PgReservationStore;

/// Connected PostgreSQL pool plus the settings every store on it shares.
#[derive(Debug, Clone)]
pub struct DatabasePool {
    pool: PgPool,
    /// Per-transaction lock wait bound handed to reservation stores.
    lock_timeout_ms: u64,
}

impl DatabasePool {
    /// Connect using `config`. The URL is only ever logged redacted.
    pub async fn connect(config: &DatabaseConfig) -> AppResult<Self> {
        info!(
            url = %redact_url(&config.url),
            max_connections = config.max_connections,
            lock_timeout_ms = config.lock_timeout_ms,
            "Connecting to PostgreSQL"
        );

        let pool = pool_options(config)
            .connect(&config.url)
            .await
            .map_err(|e| map_sqlx("Failed to connect to database", e))?;

        info!("Connected to PostgreSQL");
        Ok(Self {
            pool,
            lock_timeout_ms: config.lock_timeout_ms,
        })
    }

    /// The underlying sqlx pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// A reservation store on this pool with the configured lock timeout.
    pub fn reservation_store(&self) -> PgReservationStore {
        PgReservationStore::new(self.pool.clone(), self.lock_timeout_ms)
    }

    /// A user repository on this pool.
    pub fn user_repository(&self) -> UserRepository {
        UserRepository::new(self.pool.clone())
    }

    /// Close all connections in the pool.
    pub async fn close(&self) {
        self.pool.close().await;
        info!("Database pool closed");
    }
}

fn pool_options(config: &DatabaseConfig) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout_seconds))
        .idle_timeout(Duration::from_secs(config.idle_timeout_seconds))
}

/// Replace the password in a database URL with `****`.
///
/// The userinfo ends at the last `@`; the username ends at the first `:`
/// inside it, so a password may itself contain `:` or `@`.
pub fn redact_url(url: &str) -> String {
    let authority = url.find("://").map_or(0, |p| p + 3);
    let Some(at) = url[authority..].rfind('@').map(|p| p + authority) else {
        return url.to_string();
    };

    match url[authority..at].find(':') {
        Some(colon) => format!("{}:****{}", &url[..authority + colon], &url[at..]),
        None => url.to_string(),
    }
}
