use crate::config::var_or;
use crate::core::{AppError, Result};
use serde::Deserialize;
use sqlx::mysql::{MySqlPool, MySqlPoolOptions};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    /// Connections kept open while idle
    pub pool_size: u32,
    pub max_connections: u32,
}

fn parse_count(raw: String, key: &str) -> Result<u32> {
    raw.trim()
        .parse()
        .map_err(|_| AppError::Configuration(format!("Invalid {}", key)))
}

impl DatabaseConfig {
    pub(crate) fn from_vars(lookup: &impl Fn(&str) -> Option<String>) -> Result<Self> {
        Ok(DatabaseConfig {
            url: lookup("DATABASE_URL")
                .ok_or_else(|| AppError::Configuration("DATABASE_URL not set".to_string()))?,
            pool_size: parse_count(
                var_or(lookup, "DATABASE_POOL_SIZE", "10"),
                "DATABASE_POOL_SIZE",
            )?,
            max_connections: parse_count(
                var_or(lookup, "DATABASE_MAX_CONNECTIONS", "20"),
                "DATABASE_MAX_CONNECTIONS",
            )?,
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.pool_size == 0 || self.max_connections == 0 {
            return Err(AppError::Configuration(
                "Database pool sizes must be greater than 0".to_string(),
            ));
        }

        if self.pool_size > self.max_connections {
            return Err(AppError::Configuration(format!(
                "DATABASE_POOL_SIZE ({}) exceeds DATABASE_MAX_CONNECTIONS ({})",
                self.pool_size, self.max_connections
            )));
        }

        Ok(())
    }

    /// Create a MySQL connection pool
    ///
    /// The caller owns the pool and closes it on shutdown.
    pub async fn create_pool(&self) -> Result<MySqlPool> {
        MySqlPoolOptions::new()
            .max_connections(self.max_connections)
            .min_connections(self.pool_size)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600)) // 10 minutes
            .max_lifetime(Duration::from_secs(1800)) // 30 minutes
            .test_before_acquire(true)
            .connect(&self.url)
            .await
            .map_err(AppError::Database)
    }
}
