//! Process-wide configuration, resolved once at startup and injected into
//! components. Values come from defaults, an optional TOML file, and
//! environment overrides, in that order.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub geocoding: GeocodingConfig,
    pub routing: RoutingConfig,
    pub payment: PaymentConfig,
    pub rides: RidesConfig,
    pub polling: PollingConfig,
}

/// Autocomplete collaborator settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocodingConfig {
    pub base_url: String,
    pub api_key: String,
    /// Settle delay before a typed query triggers a lookup.
    pub debounce_ms: u64,
    /// Queries shorter than this yield an empty result set with no call.
    pub min_query_len: usize,
    /// Maximum candidates requested per lookup.
    pub limit: usize,
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.geoapify.com/v1/geocode/autocomplete".to_string(),
            api_key: String::new(),
            debounce_ms: 300,
            min_query_len: 3,
            limit: 5,
        }
    }
}

/// Routing collaborator settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    pub base_url: String,
    pub api_key: String,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.geoapify.com/v1/routing".to_string(),
            api_key: String::new(),
        }
    }
}

/// Payment collaborator settings. Amounts go over the wire in minor units.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentConfig {
    pub base_url: String,
    pub currency: String,
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000/api".to_string(),
            currency: "inr".to_string(),
        }
    }
}

/// Ride-state service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RidesConfig {
    pub base_url: String,
}

impl Default for RidesConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:4000/api".to_string(),
        }
    }
}

/// Cadences for the two polling loops.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    /// Trip-tracking poll interval. One source of truth for every trip view.
    pub trip_interval_ms: u64,
    /// Active-trip discovery interval.
    pub discovery_interval_ms: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            trip_interval_ms: 2_000,
            discovery_interval_ms: 5_000,
        }
    }
}

impl PollingConfig {
    pub fn trip_interval(&self) -> Duration {
        Duration::from_millis(self.trip_interval_ms)
    }

    pub fn discovery_interval(&self) -> Duration {
        Duration::from_millis(self.discovery_interval_ms)
    }
}

impl AppConfig {
    /// Parse a TOML config file.
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = tokio::fs::read_to_string(path).await?;
        let config: AppConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Resolve configuration: file if present, defaults otherwise, then
    /// environment overrides on top.
    pub async fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(p) => Self::from_file(p).await?,
            None => Self::default(),
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment-variable overrides for deploy-time wiring.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("GEOAPIFY_API_KEY") {
            self.geocoding.api_key = v.clone();
            self.routing.api_key = v;
        }
        if let Ok(v) = std::env::var("BOOKING_GEOCODING_URL") {
            self.geocoding.base_url = v;
        }
        if let Ok(v) = std::env::var("BOOKING_ROUTING_URL") {
            self.routing.base_url = v;
        }
        if let Ok(v) = std::env::var("BOOKING_PAYMENT_URL") {
            self.payment.base_url = v;
        }
        if let Ok(v) = std::env::var("BOOKING_RIDES_URL") {
            self.rides.base_url = v;
        }
        if let Ok(v) = std::env::var("BOOKING_TRIP_INTERVAL_MS") {
            if let Ok(ms) = v.parse() {
                self.polling.trip_interval_ms = ms;
            }
        }
        if let Ok(v) = std::env::var("BOOKING_DISCOVERY_INTERVAL_MS") {
            if let Ok(ms) = v.parse() {
                self.polling.discovery_interval_ms = ms;
            }
        }
    }
}
