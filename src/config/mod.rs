use crate::core::{AppError, Result};
use crate::modules::payments::PaymentMethod;
use serde::Deserialize;
use std::env;
use std::str::FromStr;

pub mod database;

pub use database::DatabaseConfig;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub env: String,
    pub log_level: String,
    /// `pretty` or `json`
    pub log_format: String,
    pub default_payment_method: PaymentMethod,
}

/// Read a variable through `lookup`, falling back to `default`
pub(crate) fn var_or(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: &str,
) -> String {
    lookup(key).unwrap_or_else(|| default.to_string())
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        Self::from_vars(|key| env::var(key).ok())
    }

    /// Build configuration from any key/value source
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let default_payment_method = PaymentMethod::from_str(&var_or(
            &lookup,
            "DEFAULT_PAYMENT_METHOD",
            PaymentMethod::default().as_str(),
        ))
        .map_err(|_| AppError::Configuration("Invalid DEFAULT_PAYMENT_METHOD".to_string()))?;

        let config = Config {
            app: AppConfig {
                env: var_or(&lookup, "APP_ENV", "development"),
                log_level: var_or(&lookup, "LOG_LEVEL", "info"),
                log_format: var_or(&lookup, "LOG_FORMAT", "pretty").to_lowercase(),
                default_payment_method,
            },
            database: DatabaseConfig::from_vars(&lookup)?,
        };

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !matches!(self.app.log_format.as_str(), "pretty" | "json") {
            return Err(AppError::Configuration(format!(
                "LOG_FORMAT must be 'pretty' or 'json', got '{}'",
                self.app.log_format
            )));
        }

        self.database.validate()
    }
}
