//! Route optimizer
//!
//! The orchestrator of the pipeline: geocodes destination records into
//! route points, builds the constrained multi-vehicle optimization request,
//! submits it to the external solver and reassembles the response into one
//! ordered `Route` per vehicle.
//!
//! Job ids are indices into the prepared points vector - that vector is the
//! only lookup table reconstruction has, so it is never reordered or
//! filtered between preparation and reconstruction.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::defaults::{
    CAPACITY_UNIT_KG, SERVICE_DURATION_SECS, SHIFT_END_SECS, SHIFT_START_SECS, VEHICLE_PROFILE,
};
use crate::services::geocoding::Geocoder;
use crate::services::openroute::{
    OpenRouteClient, OptimizationJob, OptimizationRequest, OptimizationResponse,
    OptimizationVehicle, OrsError, StepKind,
};
use crate::types::{AddressRecord, Coordinates, Route, RoutePoint, Vehicle};

/// Seam over the external optimization call so tests can script responses.
#[async_trait]
pub trait OptimizationSolver: Send + Sync {
    async fn solve(&self, request: &OptimizationRequest)
        -> Result<OptimizationResponse, OrsError>;

    fn name(&self) -> &'static str;
}

#[async_trait]
impl OptimizationSolver for OpenRouteClient {
    async fn solve(
        &self,
        request: &OptimizationRequest,
    ) -> Result<OptimizationResponse, OrsError> {
        self.optimization(request).await
    }

    fn name(&self) -> &'static str {
        "openroute"
    }
}

/// Which stage produced the plan's (possibly empty) route mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanOutcome {
    /// The input sequence was empty; no external call was made.
    NoInput,
    /// Every record was skipped or failed geocoding.
    NothingGeocoded,
    /// The solver call failed; a later attempt may succeed.
    SolverFailed,
    Solved,
}

/// Result of one `optimize` call: the per-vehicle routes plus enough
/// context for callers to tell the empty cases apart.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutePlan {
    pub routes: HashMap<u32, Route>,
    pub outcome: PlanOutcome,
    /// Records dropped because geocoding failed.
    pub geocode_failures: u32,
    /// Records dropped because they carried no address text.
    pub skipped_no_address: u32,
}

impl RoutePlan {
    fn empty(outcome: PlanOutcome) -> Self {
        Self {
            routes: HashMap::new(),
            outcome,
            geocode_failures: 0,
            skipped_no_address: 0,
        }
    }
}

struct PreparedPoints {
    points: Vec<RoutePoint>,
    geocode_failures: u32,
    skipped_no_address: u32,
}

/// Route optimizer - stateless between calls; every dependency is injected.
pub struct RouteOptimizer {
    geocoder: Arc<dyn Geocoder>,
    solver: Arc<dyn OptimizationSolver>,
    fleet: Vec<Vehicle>,
    warehouse: Coordinates,
}

impl RouteOptimizer {
    pub fn new(
        geocoder: Arc<dyn Geocoder>,
        solver: Arc<dyn OptimizationSolver>,
        fleet: Vec<Vehicle>,
        warehouse: Coordinates,
    ) -> Self {
        Self {
            geocoder,
            solver,
            fleet,
            warehouse,
        }
    }

    /// Run the whole pipeline for one batch of destination records.
    ///
    /// Geocoding failures drop individual records; a solver failure empties
    /// the whole batch. Neither aborts the process.
    pub async fn optimize(&self, addresses: &[AddressRecord]) -> RoutePlan {
        if addresses.is_empty() {
            debug!("No destinations to optimize");
            return RoutePlan::empty(PlanOutcome::NoInput);
        }

        let prepared = self.prepare_points(addresses).await;
        if prepared.points.is_empty() {
            warn!(
                "No destinations survived preparation ({} without address, {} geocode failures)",
                prepared.skipped_no_address, prepared.geocode_failures
            );
            return RoutePlan {
                routes: HashMap::new(),
                outcome: PlanOutcome::NothingGeocoded,
                geocode_failures: prepared.geocode_failures,
                skipped_no_address: prepared.skipped_no_address,
            };
        }

        let request = self.build_request(&prepared.points);
        info!(
            "Optimizing {} destinations across {} vehicles via {}",
            prepared.points.len(),
            self.fleet.len(),
            self.solver.name()
        );

        match self.solver.solve(&request).await {
            Ok(response) => {
                let routes = reconstruct_routes(&response, &prepared.points);
                info!(
                    "Solver assigned {} of {} destinations to {} route(s)",
                    routes.values().map(|r| r.points.len()).sum::<usize>(),
                    prepared.points.len(),
                    routes.len()
                );
                RoutePlan {
                    routes,
                    outcome: PlanOutcome::Solved,
                    geocode_failures: prepared.geocode_failures,
                    skipped_no_address: prepared.skipped_no_address,
                }
            }
            Err(err) => {
                warn!("Optimization solve failed: {}", err);
                RoutePlan {
                    routes: HashMap::new(),
                    outcome: PlanOutcome::SolverFailed,
                    geocode_failures: prepared.geocode_failures,
                    skipped_no_address: prepared.skipped_no_address,
                }
            }
        }
    }

    /// Geocode each record, dropping the ones that cannot be placed on the
    /// map. Partial success is the norm for spreadsheet-sourced batches.
    async fn prepare_points(&self, addresses: &[AddressRecord]) -> PreparedPoints {
        let mut points = Vec::with_capacity(addresses.len());
        let mut geocode_failures = 0u32;
        let mut skipped_no_address = 0u32;

        for record in addresses {
            if record.address.trim().is_empty() {
                skipped_no_address += 1;
                debug!("Skipping '{}': no address text", record.company);
                continue;
            }

            match self.geocoder.geocode(&record.address).await {
                Ok(coords) => points.push(RoutePoint {
                    company: record.company.clone(),
                    address: record.address.clone(),
                    weight: record.weight,
                    lon: coords.lon,
                    lat: coords.lat,
                    delivery_date: record.delivery_date.clone(),
                    manager: record.manager.clone(),
                }),
                Err(err) => {
                    geocode_failures += 1;
                    warn!("Dropping '{}' ({}): {}", record.address, record.company, err);
                }
            }
        }

        PreparedPoints {
            points,
            geocode_failures,
            skipped_no_address,
        }
    }

    fn build_request(&self, points: &[RoutePoint]) -> OptimizationRequest {
        let jobs = points
            .iter()
            .enumerate()
            .map(|(idx, point)| OptimizationJob {
                id: idx as u32,
                location: [point.lon, point.lat],
                amount: vec![(point.weight / CAPACITY_UNIT_KG).ceil() as u32],
                service: SERVICE_DURATION_SECS,
            })
            .collect();

        let depot = self.warehouse.to_lon_lat();
        let vehicles = self
            .fleet
            .iter()
            .map(|vehicle| OptimizationVehicle {
                id: vehicle.id,
                profile: VEHICLE_PROFILE.to_string(),
                start: depot,
                end: depot,
                capacity: vec![vehicle.capacity],
                time_window: [SHIFT_START_SECS, SHIFT_END_SECS],
            })
            .collect();

        OptimizationRequest {
            jobs,
            vehicles,
            geometry: true,
        }
    }
}

/// Rebuild per-vehicle routes from the solver response.
///
/// Steps of type `job` reference job ids, which are indices into `points`;
/// the resulting point order is exactly the solver's visiting order. The
/// depot appears only as `start`/`end` steps and is never a route point.
/// Vehicles without any job step get no entry in the mapping.
fn reconstruct_routes(
    response: &OptimizationResponse,
    points: &[RoutePoint],
) -> HashMap<u32, Route> {
    let mut routes = HashMap::new();

    for solved in &response.routes {
        let mut ordered = Vec::new();
        for step in &solved.steps {
            if step.kind != StepKind::Job {
                continue;
            }
            let Some(job_id) = step.job else {
                warn!("Solver returned a job step without a job id, skipping");
                continue;
            };
            match points.get(job_id as usize) {
                Some(point) => ordered.push(point.clone()),
                None => warn!("Solver returned unknown job id {}, skipping", job_id),
            }
        }

        if ordered.is_empty() {
            continue;
        }

        routes.insert(
            solved.vehicle,
            Route::new(ordered, solved.geometry.clone().unwrap_or_default()),
        );
    }

    routes
}
