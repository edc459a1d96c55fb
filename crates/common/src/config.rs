//! Configuration management following 12-factor app principles
//!
//! All configuration is loaded from environment variables to ensure
//! clean separation between code and config.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// PostgreSQL connection URL
    pub database_url: String,

    /// Base URL for the application (used in invitation links)
    pub app_base_url: String,

    /// Runtime configuration
    pub log_level: String,
    pub rust_log: String,
    pub port: u16,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if it exists

        let config = Self {
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL is required"))?,

            app_base_url: env::var("APP_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),

            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            rust_log: env::var("RUST_LOG").unwrap_or_else(|_| "coterie=debug".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .unwrap_or(3000),
        };

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[ignore] // Requires .env file with all config vars - run locally only
    fn test_config_from_env_loads_successfully() {
        let result = Config::from_env();
        assert!(
            result.is_ok(),
            "Config should load successfully in development environment: {}",
            result
                .err()
                .map_or("Unknown error".to_string(), |e| e.to_string())
        );

        let config = result.unwrap();
        assert!(
            !config.database_url.is_empty(),
            "DATABASE_URL should be populated"
        );
        assert!(config.port > 0, "PORT should be a valid port number");
    }
}
