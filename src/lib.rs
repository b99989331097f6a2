//! Facade crate for the Fleetroute routing core.
//!
//! This crate re-exports the core domain types and exposes the solver
//! implementations behind a feature flag.

#![forbid(unsafe_code)]

pub use fleetroute_core::{
    Algorithm, CapacitySpec, ConstraintFlags, HeuristicResult, Hub, HubClass, HubStatus,
    OptimizeRequest, OptimizeResult, PremiumAllocation, Priority, RequestValidationError, Route,
    RouteKind, RouteSolver, RouteStop, RouteTotals, ServiceKind, Shipment, SolveError,
    SolverStatus, StopKind, TimeWindow, TravelMatrix, Vehicle, VehicleCategory, VehicleStatus,
    ZoneKind,
};

#[cfg(feature = "solver")]
pub use fleetroute_solver::{
    optimize, optimize_hub_and_spoke, Dispatcher, FallbackConfig, HeuristicComparison,
    SavingsSolver,
};
