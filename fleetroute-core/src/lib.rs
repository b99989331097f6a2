//! Core domain types and rule engines for the Fleetroute routing core.
//!
//! This crate carries everything the solvers share: the fleet, shipment,
//! hub and route models, the geo-distance model, the regulatory
//! feasibility engine, the travel-matrix builder, and the request/result
//! contracts. It performs no I/O; every input is resolved by the caller
//! and every function is a pure computation over it.

#![forbid(unsafe_code)]

pub mod distance;
pub mod feasibility;
pub mod hub;
pub mod matrix;
pub mod route;
pub mod shipment;
pub mod solve;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
pub mod time_window;
pub mod vehicle;

pub use feasibility::{
    AccessDecision, ClockWindow, ComplianceSink, KeywordZoneClassifier, LogComplianceSink,
    OddEvenDecision, OddEvenExemption, PollutionDecision, PollutionSeverity, ZoneClassifier,
    ZoneKind, ZoneLimits,
};
pub use hub::{Hub, HubClass, HubStatus, Utilisation};
pub use matrix::{LocationIndex, MatrixError, Slot, TravelMatrix};
pub use route::{
    Algorithm, OptimizationMeta, Route, RouteKind, RouteStop, StopKind, StopStatus,
};
pub use shipment::{Priority, ServiceKind, Shipment};
pub use solve::{
    ConstraintFlags, HeuristicResult, OptimizeRequest, OptimizeResult, PremiumAllocation,
    RequestValidationError, RouteSolver, RouteTotals, SolveError, SolverStatus,
};
pub use time_window::{TimeWindow, TimeWindowError};
pub use vehicle::{
    CapacitySpec, Compliance, Dimensions, FuelKind, PollutionTier, Vehicle, VehicleCategory,
    VehicleStatus,
};
