//! Configuration management for the Weather Dashboard server
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with WXD_ prefix

use config::{ConfigError, Environment, File};
use rust_decimal::Decimal;
use serde::Deserialize;
use shared::{GpsCoordinates, LocationQuery};

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Weather provider configuration
    pub weather: WeatherConfig,

    /// Background alert refresh
    pub refresh: RefreshConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WeatherConfig {
    /// Base URL for current weather, forecast and air pollution
    pub api_endpoint: String,

    /// Base URL for the One Call API (native alerts)
    pub onecall_endpoint: String,

    /// Weather API key
    pub api_key: String,

    /// Request timeout
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RefreshConfig {
    pub enabled: bool,

    pub interval_secs: u64,

    pub latitude: Option<Decimal>,

    pub longitude: Option<Decimal>,

    pub city: Option<String>,
}

impl RefreshConfig {
    /// Location the poller refreshes; coordinates win over a city name
    pub fn location(&self) -> Option<LocationQuery> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => {
                let coords = GpsCoordinates::new(latitude, longitude);
                coords.is_valid().then_some(LocationQuery::Coordinates(coords))
            }
            _ => self
                .city
                .as_ref()
                .map(|c| c.trim())
                .filter(|c| !c.is_empty())
                .map(|c| LocationQuery::City(c.to_string())),
        }
    }
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment = std::env::var("WXD_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("weather.api_endpoint", "https://api.openweathermap.org/data/2.5")?
            .set_default("weather.onecall_endpoint", "https://api.openweathermap.org/data/3.0")?
            .set_default("weather.timeout_secs", 10)?
            .set_default("refresh.enabled", false)?
            .set_default("refresh.interval_secs", 600)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (WXD_ prefix)
            .add_source(
                Environment::with_prefix("WXD")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "0.0.0.0".to_string(),
        }
    }
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            interval_secs: 600,
            latitude: None,
            longitude: None,
            city: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refresh_location_prefers_coordinates() {
        let refresh = RefreshConfig {
            latitude: Some(Decimal::new(1375, 2)),
            longitude: Some(Decimal::new(10050, 2)),
            city: Some("Bangkok".to_string()),
            ..RefreshConfig::default()
        };

        assert!(matches!(refresh.location(), Some(LocationQuery::Coordinates(_))));
    }

    #[test]
    fn test_refresh_location_falls_back_to_city() {
        let refresh = RefreshConfig {
            city: Some("  Chiang Mai ".to_string()),
            ..RefreshConfig::default()
        };

        assert_eq!(
            refresh.location(),
            Some(LocationQuery::City("Chiang Mai".to_string()))
        );
    }

    #[test]
    fn test_refresh_location_rejects_out_of_range() {
        let refresh = RefreshConfig {
            latitude: Some(Decimal::from(120)),
            longitude: Some(Decimal::from(10)),
            ..RefreshConfig::default()
        };

        assert!(refresh.location().is_none());
    }
}
