//! Geocoding abstraction layer
//!
//! One object-safe `Geocoder` trait with three implementations:
//! - `OpenRouteGeocoder` - raw Pelias lookup against openrouteservice,
//!   converting the service's `[lon, lat]` wire order into `Coordinates`
//! - `CachingGeocoder` - explicit cache composition around any inner
//!   geocoder; this is what the optimizer is wired with in production
//! - `MockGeocoder` - deterministic, networkless, for tests
//!
//! Failures are typed (`GeocodeError`) and never escape as panics; callers
//! decide whether a failure is fatal. Failed lookups are never cached, so a
//! persistently failing address re-queries the live service on every call.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::{error, warn};

use crate::services::geocode_cache::GeocodeCache;
use crate::services::openroute::{GeocodeFeature, OpenRouteClient, OrsError};
use crate::types::Coordinates;

/// Why an address could not be geocoded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GeocodeError {
    #[error("address is empty")]
    InvalidInput,
    #[error("address not found")]
    NotFound,
    #[error("geocoding service rejected the API key")]
    Auth,
    #[error("geocoding service unavailable: {0}")]
    Transport(String),
}

/// Geocoder trait - abstraction for all geocoding implementations
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Resolve an address to coordinates or a typed failure.
    async fn geocode(&self, address: &str) -> Result<Coordinates, GeocodeError>;

    /// Get the name of this geocoder implementation
    fn name(&self) -> &'static str;
}

// ==========================================================================
// OpenRouteGeocoder - raw service lookup
// ==========================================================================

/// Uncached lookup against the openrouteservice geocoding endpoint,
/// constrained to the configured focus point and country.
pub struct OpenRouteGeocoder {
    client: Arc<OpenRouteClient>,
    /// `(lon, lat)` bias point - the warehouse.
    focus: (f64, f64),
    country: String,
}

impl OpenRouteGeocoder {
    pub fn new(client: Arc<OpenRouteClient>, focus: (f64, f64), country: impl Into<String>) -> Self {
        Self {
            client,
            focus,
            country: country.into(),
        }
    }
}

/// Convert a geocoding feature to domain coordinates. The feature carries
/// `[lon, lat]`; everything downstream of the geocoder speaks `Coordinates`.
fn feature_coordinates(feature: &GeocodeFeature) -> Coordinates {
    Coordinates::from_lon_lat(feature.geometry.coordinates)
}

#[async_trait]
impl Geocoder for OpenRouteGeocoder {
    async fn geocode(&self, address: &str) -> Result<Coordinates, GeocodeError> {
        let features = self
            .client
            .pelias_search(address, self.focus, &self.country)
            .await
            .map_err(|err| match err {
                OrsError::Auth(status) => {
                    error!("Geocoding auth failure ({}): check ORS_API_KEY", status);
                    GeocodeError::Auth
                }
                other => {
                    error!("Geocoding request for '{}' failed: {}", address, other);
                    GeocodeError::Transport(other.to_string())
                }
            })?;

        match features.first() {
            Some(feature) => Ok(feature_coordinates(feature)),
            None => {
                warn!("Address not found: {}", address);
                Err(GeocodeError::NotFound)
            }
        }
    }

    fn name(&self) -> &'static str {
        "openroute"
    }
}

// ==========================================================================
// CachingGeocoder - explicit cache composition
// ==========================================================================

/// Cache-first wrapper around an inner geocoder.
///
/// The cache is an injected, explicitly constructed object; its lifetime is
/// owned by whoever builds the pipeline. Only successful lookups are written.
pub struct CachingGeocoder {
    inner: Arc<dyn Geocoder>,
    cache: Mutex<GeocodeCache>,
}

impl CachingGeocoder {
    pub fn new(inner: Arc<dyn Geocoder>, cache: GeocodeCache) -> Self {
        Self {
            inner,
            cache: Mutex::new(cache),
        }
    }
}

#[async_trait]
impl Geocoder for CachingGeocoder {
    async fn geocode(&self, address: &str) -> Result<Coordinates, GeocodeError> {
        if address.trim().is_empty() {
            return Err(GeocodeError::InvalidInput);
        }

        if let Some(pair) = self.cache.lock().get(address) {
            return Ok(Coordinates::from_lon_lat(pair));
        }

        let coords = self.inner.geocode(address).await?;
        self.cache.lock().set(address, coords.to_lon_lat());
        Ok(coords)
    }

    fn name(&self) -> &'static str {
        self.inner.name()
    }
}

// ==========================================================================
// MockGeocoder
// ==========================================================================

/// Mock geocoder for tests - deterministic coordinates inside the Saint
/// Petersburg service area, with injectable failures and a call counter.
pub struct MockGeocoder {
    failing: HashSet<String>,
    calls: AtomicUsize,
}

impl MockGeocoder {
    pub fn new() -> Self {
        Self {
            failing: HashSet::new(),
            calls: AtomicUsize::new(0),
        }
    }

    /// Addresses in `failing` resolve to `GeocodeError::NotFound`.
    pub fn with_failures<I, S>(failing: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            failing: failing.into_iter().map(Into::into).collect(),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of geocode calls that reached this mock.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Hash the address into the service-area bounding box.
    fn hash_to_coordinates(address: &str) -> Coordinates {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        address.hash(&mut hasher);
        let hash = hasher.finish();

        // Saint Petersburg bounds: lat 59.80-60.10, lon 30.10-30.60
        const LAT_MIN: f64 = 59.80;
        const LAT_MAX: f64 = 60.10;
        const LON_MIN: f64 = 30.10;
        const LON_MAX: f64 = 30.60;

        let lat_normalized = ((hash >> 32) as f64) / (u32::MAX as f64);
        let lon_normalized = ((hash & 0xFFFF_FFFF) as f64) / (u32::MAX as f64);

        Coordinates {
            lat: LAT_MIN + lat_normalized * (LAT_MAX - LAT_MIN),
            lon: LON_MIN + lon_normalized * (LON_MAX - LON_MIN),
        }
    }
}

impl Default for MockGeocoder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Geocoder for MockGeocoder {
    async fn geocode(&self, address: &str) -> Result<Coordinates, GeocodeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if address.trim().is_empty() {
            return Err(GeocodeError::InvalidInput);
        }
        if self.failing.contains(address) {
            return Err(GeocodeError::NotFound);
        }
        Ok(Self::hash_to_coordinates(address))
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
