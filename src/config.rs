//! Configuration management

use anyhow::{Context, Result};

use crate::defaults::{DEFAULT_WAREHOUSE_LAT, DEFAULT_WAREHOUSE_LON};

/// Default geocode cache lifetime (1 hour)
const DEFAULT_CACHE_EXPIRY_SECS: i64 = 3600;

/// Default geocode cache capacity
const DEFAULT_CACHE_MAX_ENTRIES: usize = 1000;

/// Default HTTP timeout for openrouteservice calls
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// openrouteservice base URL
    pub ors_base_url: String,

    /// openrouteservice API key
    pub ors_api_key: String,

    /// Warehouse (depot) location - vehicles start and end here, and
    /// geocoding is biased towards it
    pub warehouse_lat: f64,
    pub warehouse_lon: f64,

    /// ISO alpha-2 country filter for geocoding
    pub geocode_country: String,

    /// Geocode cache blob location
    pub cache_path: String,

    /// Cache entry lifetime in seconds
    pub cache_expiry_secs: i64,

    /// Cache capacity bound
    pub cache_max_entries: usize,

    /// HTTP timeout for external calls, seconds
    pub http_timeout_secs: u64,

    /// Optional JSON fleet file; a single default vehicle is used when unset
    pub fleet_path: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let ors_base_url = std::env::var("ORS_BASE_URL")
            .unwrap_or_else(|_| "https://api.openrouteservice.org".to_string());

        let ors_api_key = std::env::var("ORS_API_KEY")
            .context("ORS_API_KEY must be set — request one at https://openrouteservice.org")?;

        let warehouse_lat = env_parsed("WAREHOUSE_LAT", DEFAULT_WAREHOUSE_LAT);
        let warehouse_lon = env_parsed("WAREHOUSE_LON", DEFAULT_WAREHOUSE_LON);

        let geocode_country =
            std::env::var("GEOCODE_COUNTRY").unwrap_or_else(|_| "RU".to_string());

        let cache_path = std::env::var("GEOCODE_CACHE_PATH")
            .unwrap_or_else(|_| "geocode_cache.json".to_string());

        let cache_expiry_secs = env_parsed("CACHE_EXPIRY_SECS", DEFAULT_CACHE_EXPIRY_SECS);
        let cache_max_entries = env_parsed("CACHE_MAX_ENTRIES", DEFAULT_CACHE_MAX_ENTRIES);
        let http_timeout_secs = env_parsed("HTTP_TIMEOUT_SECS", DEFAULT_HTTP_TIMEOUT_SECS);

        let fleet_path = std::env::var("FLEET_PATH").ok();

        Ok(Self {
            ors_base_url,
            ors_api_key,
            warehouse_lat,
            warehouse_lon,
            geocode_country,
            cache_path,
            cache_expiry_secs,
            cache_max_entries,
            http_timeout_secs,
            fleet_path,
        })
    }
}

fn env_parsed<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[ignore] // requires --test-threads=1 due to env var race
    fn test_config_requires_api_key() {
        std::env::remove_var("ORS_API_KEY");
        assert!(Config::from_env().is_err());
    }

    #[test]
    #[ignore] // requires --test-threads=1 due to env var race
    fn test_config_defaults() {
        std::env::set_var("ORS_API_KEY", "test-key");
        std::env::remove_var("ORS_BASE_URL");
        std::env::remove_var("WAREHOUSE_LAT");
        std::env::remove_var("CACHE_EXPIRY_SECS");
        std::env::remove_var("FLEET_PATH");

        let config = Config::from_env().unwrap();
        assert_eq!(config.ors_base_url, "https://api.openrouteservice.org");
        assert_eq!(config.warehouse_lat, DEFAULT_WAREHOUSE_LAT);
        assert_eq!(config.warehouse_lon, DEFAULT_WAREHOUSE_LON);
        assert_eq!(config.cache_expiry_secs, DEFAULT_CACHE_EXPIRY_SECS);
        assert_eq!(config.geocode_country, "RU");
        assert!(config.fleet_path.is_none());
    }

    #[test]
    #[ignore] // requires --test-threads=1 due to env var race
    fn test_config_unparseable_number_falls_back() {
        std::env::set_var("ORS_API_KEY", "test-key");
        std::env::set_var("CACHE_MAX_ENTRIES", "not-a-number");

        let config = Config::from_env().unwrap();
        assert_eq!(config.cache_max_entries, DEFAULT_CACHE_MAX_ENTRIES);

        std::env::remove_var("CACHE_MAX_ENTRIES");
    }
}
