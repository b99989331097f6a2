//! Optimisation request and result contracts.
//!
//! Callers resolve all inputs (fleet, shipments, hubs) before calling the
//! core; each call is a pure synchronous computation. Validation errors
//! surface before any solving. Infeasibility is data, not an error: a
//! result with `feasible: false` and a populated unassigned list.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::matrix::MatrixError;
use crate::{Algorithm, Hub, Route, ServiceKind, Shipment, TimeWindow, Vehicle};

/// Constraint enable switches and optional ceilings for one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintFlags {
    /// Enforce vehicle weight/volume capacity.
    pub capacity: bool,
    /// Enforce shipment time windows.
    pub time_windows: bool,
    /// Enforce hub operating-hour sequencing.
    pub hub_sequencing: bool,
    /// Reject routes longer than this distance, when set.
    pub max_route_distance_km: Option<f64>,
    /// Reject routes longer than this duration, when set.
    pub max_route_duration_min: Option<f64>,
    /// Apply city regulatory rules (time-of-day, odd-even, pollution).
    pub city_rules: bool,
}

impl Default for ConstraintFlags {
    fn default() -> Self {
        Self {
            capacity: true,
            time_windows: true,
            hub_sequencing: false,
            max_route_distance_km: None,
            max_route_duration_min: None,
            city_rules: true,
        }
    }
}

/// A routing request: the full input of one optimisation call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizeRequest {
    /// Candidate fleet.
    pub vehicles: Vec<Vehicle>,
    /// Shipments to place.
    pub shipments: Vec<Shipment>,
    /// Available consolidation hubs; empty disables hub routing.
    pub hubs: Vec<Hub>,
    /// Constraint switches.
    pub constraints: ConstraintFlags,
    /// Overall operation window; solve-time checks use its start.
    pub window: TimeWindow,
    /// Requested service mode override for the whole request.
    pub service: Option<ServiceKind>,
    /// Customers whose shipments are treated as premium.
    pub premium_customers: Vec<String>,
}

/// Errors surfaced by [`OptimizeRequest::validate`] before any solving.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestValidationError {
    /// The vehicle list is empty.
    #[error("request contains no vehicles")]
    NoVehicles,
    /// The shipment list is empty.
    #[error("request contains no shipments")]
    NoShipments,
    /// The operation window closes before it opens.
    #[error("request window closes before it opens")]
    InvalidWindow,
}

impl OptimizeRequest {
    /// A request over the given fleet and shipments with default
    /// constraints, no hubs, and no premium overrides.
    #[must_use]
    pub fn new(vehicles: Vec<Vehicle>, shipments: Vec<Shipment>, window: TimeWindow) -> Self {
        Self {
            vehicles,
            shipments,
            hubs: Vec::new(),
            constraints: ConstraintFlags::default(),
            window,
            service: None,
            premium_customers: Vec::new(),
        }
    }

    /// Check structural validity; called by every entry point before
    /// solving.
    pub fn validate(&self) -> Result<(), RequestValidationError> {
        if self.vehicles.is_empty() {
            return Err(RequestValidationError::NoVehicles);
        }
        if self.shipments.is_empty() {
            return Err(RequestValidationError::NoShipments);
        }
        if self.window.latest < self.window.earliest {
            return Err(RequestValidationError::InvalidWindow);
        }
        Ok(())
    }

    /// Whether a shipment is premium under this request: either marked
    /// premium itself, owned by a premium customer, or the whole request
    /// runs in premium mode.
    #[must_use]
    pub fn is_premium(&self, shipment: &Shipment) -> bool {
        self.service == Some(ServiceKind::Premium)
            || shipment.service == ServiceKind::Premium
            || self.premium_customers.contains(&shipment.customer_id)
    }
}

/// Transient solver failure. Distinct from infeasibility, which is
/// returned as data; the dispatcher converts these into a bounded
/// fallback invocation instead of propagating them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolveError {
    /// Travel matrix construction failed.
    #[error(transparent)]
    Matrix(#[from] MatrixError),
    /// An internal invariant did not hold.
    #[error("internal solver failure: {0}")]
    Internal(String),
}

/// Terminal status of the primary solver.
///
/// `Optimal` is a label, not a proof: the heuristic reports it whenever
/// at least one route was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolverStatus {
    /// At least one route was produced.
    Optimal,
    /// No compliant vehicle remained after filtering.
    Infeasible,
}

/// Aggregate distance, duration and cost over a route set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteTotals {
    /// Kilometres across all routes.
    pub distance_km: f64,
    /// Minutes across all routes.
    pub duration_min: f64,
    /// Fuel cost in currency units across all routes.
    pub cost: f64,
}

impl RouteTotals {
    /// Sum totals over a route set.
    #[must_use]
    pub fn from_routes(routes: &[Route]) -> Self {
        routes.iter().fold(Self::default(), |acc, route| Self {
            distance_km: acc.distance_km + route.distance_km,
            duration_min: acc.duration_min + route.duration_min,
            cost: acc.cost + route.fuel_cost,
        })
    }
}

/// A premium allocation entry: one shipment, one exclusive vehicle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PremiumAllocation {
    /// The premium shipment.
    pub shipment_id: String,
    /// The exclusively allocated vehicle.
    pub vehicle_id: String,
    /// Window the service is guaranteed within.
    pub guaranteed_window: TimeWindow,
    /// Always true; recorded for the caller's contract.
    pub exclusive: bool,
}

/// Final result of an `optimize*` entry point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizeResult {
    /// Whether the call produced a usable (possibly partial) plan.
    pub success: bool,
    /// Produced routes.
    pub routes: Vec<Route>,
    /// Aggregates over `routes`.
    pub totals: RouteTotals,
    /// Wall-clock optimisation time in milliseconds.
    pub optimization_ms: u64,
    /// Algorithm that produced the final plan.
    pub algorithm: Algorithm,
    /// Objective value (total distance for the distance-minimising
    /// heuristics).
    pub objective: f64,
    /// Optional human-readable note.
    pub message: Option<String>,
    /// Whether a fallback heuristic produced the final plan.
    pub fallback_used: bool,
    /// Ids of shipments (or fragments) no route serves.
    pub unassigned: Vec<String>,
    /// Premium allocations, when premium mode ran.
    pub premium: Vec<PremiumAllocation>,
}

/// Uniform result shape shared by all fallback heuristics, enabling
/// direct comparison against the primary solver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeuristicResult {
    /// Produced routes.
    pub routes: Vec<Route>,
    /// Aggregates over `routes`.
    pub totals: RouteTotals,
    /// Producing algorithm tag.
    pub algorithm: Algorithm,
    /// Wall-clock processing time in milliseconds.
    pub processing_ms: u64,
    /// Whether at least one shipment was placed.
    pub feasible: bool,
    /// Ids of shipments no route serves.
    pub unassigned: Vec<String>,
}

/// The seam shared by the primary solver and every fallback heuristic.
///
/// Implementations must be pure over the request and matrix; `Send +
/// Sync` so concurrent requests can share one solver instance.
pub trait RouteSolver: Send + Sync {
    /// Produce a plan for `request` over a prebuilt `matrix`.
    fn solve(
        &self,
        request: &OptimizeRequest,
        matrix: &crate::TravelMatrix,
    ) -> Result<HeuristicResult, SolveError>;
}
