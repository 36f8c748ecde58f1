//! Lazy, memoized connection pool for SQL Server.
//!
//! The pool is not built at startup. The first operation that needs the
//! database builds it, verifies one connection can actually be checked out,
//! and memoizes the handle for every later operation. A failed attempt leaves
//! nothing behind, so the next invocation retries from scratch.

use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{DbError, DbResult};

/// Shared bb8 pool over the tiberius TDS driver.
pub type MssqlPool = bb8::Pool<bb8_tiberius::ConnectionManager>;

/// Owns the memoized pool and the configuration needed to (re)build it.
pub struct ConnectionProvider {
    config: Config,
    // Mutex serializes concurrent first use: exactly one establishment
    // attempt proceeds at a time.
    pool: Mutex<Option<MssqlPool>>,
}

impl ConnectionProvider {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            pool: Mutex::new(None),
        }
    }

    /// Get the shared pool, establishing it on first use.
    ///
    /// On failure the slot stays empty and the error propagates to the
    /// caller; a later call re-attempts establishment.
    pub async fn acquire(&self) -> DbResult<MssqlPool> {
        let mut slot = self.pool.lock().await;
        if let Some(pool) = slot.as_ref() {
            return Ok(pool.clone());
        }

        debug!(database = %self.config.summary(), "establishing connection pool");
        let pool = self.build_pool().await?;

        // Check out one connection so bad hosts and bad credentials fail
        // here, not on the first statement.
        pool.get().await.map_err(DbError::from)?;

        info!(database = %self.config.summary(), "connection pool established");
        *slot = Some(pool.clone());
        Ok(pool)
    }

    async fn build_pool(&self) -> DbResult<MssqlPool> {
        let manager = bb8_tiberius::ConnectionManager::new(self.config.to_tiberius());

        let min_idle = (self.config.pool_min > 0).then_some(self.config.pool_min);
        bb8::Pool::builder()
            .max_size(self.config.pool_max)
            .min_idle(min_idle)
            .idle_timeout(Some(self.config.pool_idle_timeout_duration()))
            .connection_timeout(self.config.connect_timeout_duration())
            .build(manager)
            .await
            .map_err(|e| DbError::connection(e.to_string()))
    }

    /// Whether a pool has been established and memoized.
    pub async fn is_initialized(&self) -> bool {
        self.pool.lock().await.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn unreachable_config() -> Config {
        Config::parse_from([
            "mssql-mcp-server",
            "--server",
            "127.0.0.1",
            "--port",
            "1",
            "--username",
            "sa",
            "--password",
            "x",
            "--connect-timeout",
            "1",
        ])
    }

    #[tokio::test]
    async fn test_acquire_failure_leaves_provider_uninitialized() {
        let provider = ConnectionProvider::new(unreachable_config());
        assert!(!provider.is_initialized().await);

        let result = provider.acquire().await;
        assert!(result.is_err());

        // No failure caching: the slot must stay empty for retry.
        assert!(!provider.is_initialized().await);
    }

    #[tokio::test]
    async fn test_acquire_failure_is_retryable() {
        let provider = ConnectionProvider::new(unreachable_config());
        let err = match provider.acquire().await {
            Err(e) => e,
            Ok(_) => panic!("acquire against port 1 should fail"),
        };
        assert!(err.is_retryable());
    }
}
