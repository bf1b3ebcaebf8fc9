//! openrouteservice client
//!
//! One keyed HTTP client for the two endpoints the pipeline consumes:
//! Pelias-style forward geocoding and the VROOM-style optimization solver.
//! Both speak `[lon, lat]` positional pairs on the wire.

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// openrouteservice client configuration
#[derive(Debug, Clone)]
pub struct OpenRouteConfig {
    /// Base URL, e.g. "https://api.openrouteservice.org"
    pub base_url: String,
    pub api_key: String,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

impl OpenRouteConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            timeout_seconds: 30,
        }
    }
}

/// Errors from the openrouteservice endpoints, split so callers can tell an
/// authentication problem from a transport problem.
#[derive(Debug, thiserror::Error)]
pub enum OrsError {
    #[error("openrouteservice rejected the API key ({0})")]
    Auth(StatusCode),
    #[error("openrouteservice returned {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("openrouteservice request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// openrouteservice HTTP client
pub struct OpenRouteClient {
    client: Client,
    config: OpenRouteConfig,
}

impl OpenRouteClient {
    pub fn new(config: OpenRouteConfig) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_seconds))
            .build()
            .expect("Failed to create HTTP client");

        Self { client, config }
    }

    /// Forward-geocode a free-text query, biased towards `focus` (a
    /// `(lon, lat)` pair) and restricted to `country` (ISO alpha-2 code).
    /// An empty feature list means "not found".
    pub async fn pelias_search(
        &self,
        text: &str,
        focus: (f64, f64),
        country: &str,
    ) -> Result<Vec<GeocodeFeature>, OrsError> {
        let url = format!(
            "{}/geocode/search?text={}&focus.point.lon={}&focus.point.lat={}&boundary.country={}&size=1",
            self.config.base_url,
            urlencoding::encode(text),
            focus.0,
            focus.1,
            country,
        );

        debug!("Geocoding '{}' via openrouteservice", text);

        let response = self
            .client
            .get(&url)
            .header("Authorization", &self.config.api_key)
            .send()
            .await?;

        let response = check_status(response).await?;
        let body: GeocodeResponse = response.json().await?;
        Ok(body.features)
    }

    /// Submit jobs and vehicles to the optimization solver. Path geometry is
    /// included when `request.geometry` is set.
    pub async fn optimization(
        &self,
        request: &OptimizationRequest,
    ) -> Result<OptimizationResponse, OrsError> {
        let url = format!("{}/optimization", self.config.base_url);

        debug!(
            "Submitting optimization request: {} jobs, {} vehicles",
            request.jobs.len(),
            request.vehicles.len()
        );

        let response = self
            .client
            .post(&url)
            .header("Authorization", &self.config.api_key)
            .json(request)
            .send()
            .await?;

        let response = check_status(response).await?;
        Ok(response.json().await?)
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, OrsError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(OrsError::Auth(status));
    }
    let body = response.text().await.unwrap_or_default();
    Err(OrsError::Status { status, body })
}

// Geocoding API types

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    #[serde(default)]
    features: Vec<GeocodeFeature>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeocodeFeature {
    pub geometry: FeatureGeometry,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeatureGeometry {
    /// `[lon, lat]` - Pelias wire order.
    pub coordinates: [f64; 2],
}

// Optimization API types

#[derive(Debug, Clone, Serialize)]
pub struct OptimizationRequest {
    pub jobs: Vec<OptimizationJob>,
    pub vehicles: Vec<OptimizationVehicle>,
    pub geometry: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct OptimizationJob {
    pub id: u32,
    /// `[lon, lat]`
    pub location: [f64; 2],
    /// Demand in capacity units, one entry per capacity dimension.
    pub amount: Vec<u32>,
    /// Service time at the destination, seconds.
    pub service: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct OptimizationVehicle {
    pub id: u32,
    pub profile: String,
    /// Depot location, `[lon, lat]`.
    pub start: [f64; 2],
    pub end: [f64; 2],
    pub capacity: Vec<u32>,
    /// Working window in seconds since midnight.
    pub time_window: [u32; 2],
}

#[derive(Debug, Clone, Deserialize)]
pub struct OptimizationResponse {
    #[serde(default)]
    pub routes: Vec<SolvedRoute>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SolvedRoute {
    pub vehicle: u32,
    #[serde(default)]
    pub steps: Vec<SolvedStep>,
    /// Encoded polyline, present when geometry was requested.
    #[serde(default)]
    pub geometry: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SolvedStep {
    #[serde(rename = "type")]
    pub kind: StepKind,
    /// Job id, present on `job` steps only.
    pub job: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepKind {
    Start,
    Job,
    End,
    #[serde(other)]
    Other,
}
