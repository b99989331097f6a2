//! Dispatch entry points.
//!
//! A [`Dispatcher`] validates the request, builds the travel matrix and
//! routes work to the premium allocator, the hub engine and the savings
//! solver. Transient solver failures and infeasible primary plans
//! trigger exactly one nearest-neighbour fallback before returning, so
//! callers always receive a result for structurally valid input.

use std::time::{Duration, Instant};

use fleetroute_core::feasibility::{
    ComplianceSink, KeywordZoneClassifier, LogComplianceSink, ZoneClassifier,
};
use fleetroute_core::{
    Algorithm, HeuristicResult, OptimizeRequest, OptimizeResult, PremiumAllocation,
    RequestValidationError, Route, RouteTotals, SolveError, SolverStatus, TravelMatrix,
};

use crate::fallback::{
    emergency_routing, greedy_assignment, nearest_neighbor, FallbackConfig,
};
use crate::hub::hub_and_spoke;
use crate::premium::premium_dedicated;
use crate::savings::SavingsSolver;

/// Stateless request router with injectable compliance collaborators.
pub struct Dispatcher {
    classifier: Box<dyn ZoneClassifier>,
    sink: Box<dyn ComplianceSink>,
    /// Knobs handed to the fallback heuristics.
    pub fallback: FallbackConfig,
    /// Advisory per-call deadline for the savings merge loop.
    pub deadline: Option<Duration>,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self {
            classifier: Box::new(KeywordZoneClassifier),
            sink: Box::new(LogComplianceSink),
            fallback: FallbackConfig::default(),
            deadline: None,
        }
    }
}

impl Dispatcher {
    /// A dispatcher with the keyword classifier and log sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the zone classifier.
    #[must_use]
    pub fn with_classifier(
        mut self,
        classifier: Box<dyn ZoneClassifier>,
    ) -> Self {
        self.classifier = classifier;
        self
    }

    /// Replace the compliance sink.
    #[must_use]
    pub fn with_sink(mut self, sink: Box<dyn ComplianceSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Set the advisory deadline.
    #[must_use]
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Optimise a request end to end.
    ///
    /// Premium shipments are carved out first, oversized loads go through
    /// the hub engine when hubs are supplied, and the residual shared
    /// load is routed by the savings solver. A solver failure or an
    /// infeasible primary plan triggers one nearest-neighbour fallback.
    pub fn optimize(
        &self,
        request: &OptimizeRequest,
    ) -> Result<OptimizeResult, RequestValidationError> {
        request.validate()?;
        let started = Instant::now();
        let deadline = self.deadline.map(|d| started + d);

        match self.plan(request, deadline) {
            Ok(result) if result.success => Ok(stamped(result, started)),
            Ok(result) => {
                log::warn!("primary plan infeasible; invoking nearest-neighbour fallback");
                Ok(self.rescue(request, started, result.premium.clone()))
            }
            Err(err) => {
                log::error!("solver failure: {err}; invoking nearest-neighbour fallback");
                Ok(self.rescue(request, started, Vec::new()))
            }
        }
    }

    /// Explicit hub-and-spoke entry point.
    ///
    /// Delegates to [`Dispatcher::optimize`]; when the request carries no
    /// hubs that is a plain point-to-point solve.
    pub fn optimize_hub_and_spoke(
        &self,
        request: &OptimizeRequest,
    ) -> Result<OptimizeResult, RequestValidationError> {
        if request.hubs.is_empty() {
            log::info!("hub optimisation requested without hubs; solving point-to-point");
        }
        self.optimize(request)
    }

    /// Run the nearest-neighbour heuristic directly.
    pub fn nearest_neighbor(
        &self,
        request: &OptimizeRequest,
    ) -> Result<HeuristicResult, SolveError> {
        let matrix = TravelMatrix::build(&request.vehicles, &request.shipments, &request.hubs)?;
        Ok(nearest_neighbor(
            request,
            &matrix,
            &self.fallback,
            self.classifier.as_ref(),
        ))
    }

    /// Run the greedy pair-scoring heuristic directly.
    pub fn greedy_assignment(
        &self,
        request: &OptimizeRequest,
    ) -> Result<HeuristicResult, SolveError> {
        let matrix = TravelMatrix::build(&request.vehicles, &request.shipments, &request.hubs)?;
        Ok(greedy_assignment(
            request,
            &matrix,
            &self.fallback,
            self.classifier.as_ref(),
        ))
    }

    /// Run the emergency heuristic directly.
    pub fn emergency_routing(
        &self,
        request: &OptimizeRequest,
    ) -> Result<HeuristicResult, SolveError> {
        let matrix = TravelMatrix::build(&request.vehicles, &request.shipments, &request.hubs)?;
        Ok(emergency_routing(
            request,
            &matrix,
            &self.fallback,
            self.classifier.as_ref(),
        ))
    }

    fn plan(
        &self,
        request: &OptimizeRequest,
        deadline: Option<Instant>,
    ) -> Result<OptimizeResult, SolveError> {
        let matrix = TravelMatrix::build(&request.vehicles, &request.shipments, &request.hubs)?;

        let mut routes: Vec<Route> = Vec::new();
        let mut unassigned: Vec<String> = Vec::new();
        let mut allocations: Vec<PremiumAllocation> = Vec::new();
        let mut vehicle_pool: Vec<usize> = (0..request.vehicles.len()).collect();

        let (premium_indices, mut shared): (Vec<usize>, Vec<usize>) = (0..request
            .shipments
            .len())
            .partition(|&s| request.is_premium(&request.shipments[s]));

        if !premium_indices.is_empty() {
            let outcome = premium_dedicated(
                request,
                &matrix,
                &premium_indices,
                self.classifier.as_ref(),
                self.sink.as_ref(),
            );
            vehicle_pool.retain(|v| !outcome.vehicles_used.contains(v));
            routes.extend(outcome.routes);
            unassigned.extend(outcome.unassigned);
            allocations.extend(outcome.allocations);
        }

        let mut hub_routes_built = false;
        if !request.hubs.is_empty() && !shared.is_empty() {
            let outcome = hub_and_spoke(
                request,
                &matrix,
                &shared,
                &vehicle_pool,
                self.classifier.as_ref(),
            );
            hub_routes_built = !outcome.routes.is_empty();
            vehicle_pool.retain(|v| !outcome.vehicles_used.contains(v));
            routes.extend(outcome.routes);
            unassigned.extend(outcome.unassigned);
            shared = outcome.residual_shipments;
        }

        let mut savings_routes_built = false;
        if !shared.is_empty() {
            let outcome = SavingsSolver.solve_subset(
                request,
                &matrix,
                &vehicle_pool,
                &shared,
                self.classifier.as_ref(),
                self.sink.as_ref(),
                deadline,
            )?;
            savings_routes_built = outcome.status == SolverStatus::Optimal;
            routes.extend(outcome.result.routes);
            unassigned.extend(outcome.result.unassigned);
        }

        let algorithm = if hub_routes_built {
            Algorithm::HubAndSpoke
        } else if savings_routes_built || allocations.is_empty() {
            Algorithm::ClarkeWrightSavings
        } else {
            Algorithm::PremiumDedicated
        };

        let totals = RouteTotals::from_routes(&routes);
        Ok(OptimizeResult {
            success: !routes.is_empty(),
            objective: totals.distance_km,
            totals,
            optimization_ms: 0,
            algorithm,
            message: None,
            fallback_used: false,
            unassigned,
            premium: allocations,
            routes,
        })
    }

    /// The single bounded fallback: one nearest-neighbour attempt.
    fn rescue(
        &self,
        request: &OptimizeRequest,
        started: Instant,
        allocations: Vec<PremiumAllocation>,
    ) -> OptimizeResult {
        let heuristic = match self.nearest_neighbor(request) {
            Ok(heuristic) => heuristic,
            Err(err) => {
                log::error!("fallback failed as well: {err}");
                return OptimizeResult {
                    success: false,
                    routes: Vec::new(),
                    totals: RouteTotals::default(),
                    optimization_ms: started.elapsed().as_millis() as u64,
                    algorithm: Algorithm::NearestNeighbor,
                    objective: 0.0,
                    message: Some(format!("primary solver and fallback failed: {err}")),
                    fallback_used: true,
                    unassigned: request.shipments.iter().map(|s| s.id.clone()).collect(),
                    premium: allocations,
                };
            }
        };

        OptimizeResult {
            success: heuristic.feasible,
            objective: heuristic.totals.distance_km,
            totals: heuristic.totals,
            optimization_ms: started.elapsed().as_millis() as u64,
            algorithm: Algorithm::NearestNeighbor,
            message: Some("primary solver unavailable; nearest-neighbour plan".to_owned()),
            fallback_used: true,
            unassigned: heuristic.unassigned,
            premium: allocations,
            routes: heuristic.routes,
        }
    }
}

fn stamped(mut result: OptimizeResult, started: Instant) -> OptimizeResult {
    result.optimization_ms = started.elapsed().as_millis() as u64;
    result
}

/// Optimise with the default dispatcher.
pub fn optimize(request: &OptimizeRequest) -> Result<OptimizeResult, RequestValidationError> {
    Dispatcher::default().optimize(request)
}

/// Hub-and-spoke entry with the default dispatcher.
pub fn optimize_hub_and_spoke(
    request: &OptimizeRequest,
) -> Result<OptimizeResult, RequestValidationError> {
    Dispatcher::default().optimize_hub_and_spoke(request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use fleetroute_core::feasibility::ZoneKind;
    use fleetroute_core::test_support::{
        sample_hub, sample_shipment, sample_vehicle, sample_window,
    };
    use fleetroute_core::{RouteKind, ServiceKind, TimeWindow, VehicleCategory, VehicleStatus};
    use rstest::rstest;

    #[rstest]
    fn assigns_all_shipments_on_a_clean_request() {
        let request = OptimizeRequest::new(
            vec![
                sample_vehicle("V1", 1000.0, 5.0),
                sample_vehicle("V2", 1500.0, 8.0),
            ],
            vec![
                sample_shipment("S1", 500.0, 1.0),
                sample_shipment("S2", 300.0, 1.0),
                sample_shipment("S3", 800.0, 1.0),
            ],
            sample_window(),
        );
        let result = optimize(&request).expect("valid request");

        assert!(result.success);
        assert!(!result.fallback_used);
        assert!(result.unassigned.is_empty());
        assert_eq!(result.algorithm, Algorithm::ClarkeWrightSavings);
    }

    #[rstest]
    fn invalid_request_is_rejected_before_solving() {
        let request =
            OptimizeRequest::new(Vec::new(), vec![sample_shipment("S1", 1.0, 0.1)], sample_window());
        assert_eq!(
            optimize(&request),
            Err(RequestValidationError::NoVehicles)
        );
    }

    #[rstest]
    fn downed_fleet_triggers_the_fallback_once() {
        let mut request = OptimizeRequest::new(
            vec![sample_vehicle("V1", 1000.0, 5.0)],
            vec![sample_shipment("S1", 500.0, 1.0)],
            sample_window(),
        );
        request.vehicles[0].status = VehicleStatus::Maintenance;
        let result = optimize(&request).expect("valid request");

        assert!(!result.success);
        assert!(result.fallback_used);
        assert_eq!(result.algorithm, Algorithm::NearestNeighbor);
        assert_eq!(result.unassigned, vec!["S1".to_owned()]);
    }

    #[rstest]
    fn premium_shipment_gets_a_dedicated_vehicle() {
        let mut request = OptimizeRequest::new(
            vec![
                sample_vehicle("V1", 900.0, 4.0),
                sample_vehicle("V2", 900.0, 4.0),
            ],
            vec![
                sample_shipment("PREM", 300.0, 1.0),
                sample_shipment("SHARED", 300.0, 1.0),
            ],
            sample_window(),
        );
        request.shipments[0].service = ServiceKind::Premium;
        let result = optimize(&request).expect("valid request");

        assert!(result.success);
        assert_eq!(result.premium.len(), 1);
        assert_eq!(result.premium[0].shipment_id, "PREM");
        let premium_route = result
            .routes
            .iter()
            .find(|r| r.kind == RouteKind::PremiumDedicated)
            .expect("dedicated route exists");
        assert_eq!(premium_route.shipment_ids(), vec!["PREM"]);
        // The shared shipment must not ride the dedicated vehicle.
        let shared_route = result
            .routes
            .iter()
            .find(|r| r.kind == RouteKind::Direct)
            .expect("shared route exists");
        assert_ne!(shared_route.vehicle_id, premium_route.vehicle_id);
    }

    #[rstest]
    fn oversized_load_routes_through_hubs() {
        let mut request = OptimizeRequest::new(
            vec![
                sample_vehicle("V1", 3000.0, 18.0),
                sample_vehicle("V2", 3000.0, 18.0),
                sample_vehicle("V3", 3000.0, 18.0),
            ],
            vec![sample_shipment("BULK", 8000.0, 40.0)],
            sample_window(),
        );
        request.hubs = vec![sample_hub("HUB-A", 77.20, 28.62)];
        let result = optimize_hub_and_spoke(&request).expect("valid request");

        assert!(result.success);
        assert_eq!(result.algorithm, Algorithm::HubAndSpoke);
        assert!(result
            .routes
            .iter()
            .all(|r| r.kind == RouteKind::HubDelivery));
        assert!(result.unassigned.is_empty());
    }

    #[rstest]
    fn hub_entry_without_hubs_solves_point_to_point() {
        let request = OptimizeRequest::new(
            vec![sample_vehicle("V1", 1000.0, 5.0)],
            vec![sample_shipment("S1", 500.0, 1.0)],
            sample_window(),
        );
        let result = optimize_hub_and_spoke(&request).expect("valid request");

        assert!(result.success);
        assert_eq!(result.algorithm, Algorithm::ClarkeWrightSavings);
    }

    struct IndustrialEverywhere;

    impl ZoneClassifier for IndustrialEverywhere {
        fn classify(&self, _address: &str) -> ZoneKind {
            ZoneKind::Industrial
        }
    }

    #[rstest]
    fn injected_classifier_governs_the_heuristic_entry_points() {
        // At 02:00 the keyword default classifies blank addresses as
        // mixed, where the truck curfew applies; an industrial zoning
        // lookup lifts it.
        let night = TimeWindow::new(
            chrono::Utc
                .with_ymd_and_hms(2024, 3, 15, 2, 0, 0)
                .single()
                .expect("valid"),
            chrono::Utc
                .with_ymd_and_hms(2024, 3, 15, 6, 0, 0)
                .single()
                .expect("valid"),
        )
        .expect("ordered window");
        let mut truck = sample_vehicle("TRUCK", 2000.0, 10.0);
        truck.category = VehicleCategory::Truck;
        let request = OptimizeRequest::new(
            vec![truck],
            vec![sample_shipment("S1", 500.0, 1.0)],
            night,
        );

        let keyword = Dispatcher::new()
            .nearest_neighbor(&request)
            .expect("matrix builds");
        assert!(!keyword.feasible);
        assert_eq!(keyword.unassigned, vec!["S1".to_owned()]);

        let injected = Dispatcher::new()
            .with_classifier(Box::new(IndustrialEverywhere))
            .nearest_neighbor(&request)
            .expect("matrix builds");
        assert!(injected.feasible);
        assert!(injected.unassigned.is_empty());
    }

    #[rstest]
    fn direct_fallback_entry_points_run() {
        let request = OptimizeRequest::new(
            vec![sample_vehicle("V1", 1000.0, 5.0)],
            vec![sample_shipment("S1", 500.0, 1.0)],
            sample_window(),
        );
        let dispatcher = Dispatcher::new();
        for result in [
            dispatcher.nearest_neighbor(&request),
            dispatcher.greedy_assignment(&request),
            dispatcher.emergency_routing(&request),
        ] {
            let heuristic = result.expect("matrix builds");
            assert!(heuristic.feasible);
            assert!(heuristic.unassigned.is_empty());
        }
    }
}
