//! Primary capacitated solver: Clarke-Wright savings heuristic.
//!
//! Savings `S(i,j) = d(depot,i) + d(depot,j) - d(i,j)` are computed once
//! over all shipment delivery locations, sorted descending, and merged
//! greedily into the first vehicle with spare capacity that passes the
//! feasibility engine for both shipments. This is deliberately the
//! single-pass variant: savings are never re-scored after a merge, which
//! may under-optimise relative to the textbook algorithm.

use std::time::Instant;

use fleetroute_core::feasibility::{shipment_feasible, ComplianceSink, ZoneClassifier};
use fleetroute_core::{
    Algorithm, HeuristicResult, OptimizeRequest, Route, RouteKind, RouteTotals, Shipment,
    SolveError, SolverStatus, TravelMatrix,
};

use crate::plan::{assemble_route, exceeds_route_limits, PlannedStop, RouteSpec, VehicleLoad};

/// Outcome of a savings solve: the result plus an explicit status so the
/// dispatcher can trigger fallback on infeasibility without inspecting
/// route counts.
#[derive(Debug, Clone)]
pub struct SavingsOutcome {
    /// Terminal status; `Infeasible` when no route could be produced.
    pub status: SolverStatus,
    /// Uniform result shape.
    pub result: HeuristicResult,
}

/// Per-vehicle accumulator used during the merge loop.
#[derive(Debug, Clone, Default)]
struct VehiclePlan {
    shipments: Vec<usize>,
    load: VehicleLoad,
}

/// Clarke-Wright savings solver over a prebuilt travel matrix.
#[derive(Debug, Clone, Copy, Default)]
pub struct SavingsSolver;

impl SavingsSolver {
    /// Solve the full request.
    ///
    /// `deadline` is advisory: it is checked between merges, and the
    /// solver returns what it has when the deadline passes.
    pub fn solve(
        &self,
        request: &OptimizeRequest,
        matrix: &TravelMatrix,
        classifier: &dyn ZoneClassifier,
        sink: &dyn ComplianceSink,
        deadline: Option<Instant>,
    ) -> Result<SavingsOutcome, SolveError> {
        let vehicle_indices: Vec<usize> = (0..request.vehicles.len()).collect();
        let shipment_indices: Vec<usize> = (0..request.shipments.len()).collect();
        self.solve_subset(
            request,
            matrix,
            &vehicle_indices,
            &shipment_indices,
            classifier,
            sink,
            deadline,
        )
    }

    /// Solve over a subset of the request's vehicles and shipments,
    /// identified by their input-order indices. The dispatcher uses this
    /// to route residual shared load after premium carve-out.
    #[allow(clippy::too_many_arguments)]
    pub fn solve_subset(
        &self,
        request: &OptimizeRequest,
        matrix: &TravelMatrix,
        vehicle_indices: &[usize],
        shipment_indices: &[usize],
        classifier: &dyn ZoneClassifier,
        sink: &dyn ComplianceSink,
        deadline: Option<Instant>,
    ) -> Result<SavingsOutcome, SolveError> {
        let started = Instant::now();
        let at = request.window.earliest;

        let fleet: Vec<usize> = vehicle_indices
            .iter()
            .copied()
            .filter(|&v| request.vehicles[v].is_available())
            .collect();

        if fleet.is_empty() {
            log::warn!("savings solver: no available vehicles after filtering");
            return Ok(Self::infeasible_outcome(
                request,
                shipment_indices,
                started,
            ));
        }

        let index = *matrix.index();
        let depot = index.vehicle(fleet[0]);

        // Pairwise savings over delivery locations, computed once.
        let mut savings = Vec::new();
        for (a, &i) in shipment_indices.iter().enumerate() {
            for &j in &shipment_indices[a + 1..] {
                let di = index.delivery(i);
                let dj = index.delivery(j);
                let value =
                    matrix.distance(depot, di) + matrix.distance(depot, dj)
                        - matrix.distance(di, dj);
                savings.push((i, j, value));
            }
        }
        // Descending by value; ties resolve by pair index so the merge
        // order is a total order and stays reproducible.
        savings.sort_by(|lhs, rhs| {
            rhs.2
                .total_cmp(&lhs.2)
                .then_with(|| (lhs.0, lhs.1).cmp(&(rhs.0, rhs.1)))
        });

        let mut assigned: Vec<Option<usize>> = vec![None; request.shipments.len()];
        let mut plans: Vec<VehiclePlan> = vec![VehiclePlan::default(); request.vehicles.len()];
        let mut deadline_hit = false;

        for &(i, j, value) in &savings {
            if let Some(limit) = deadline {
                if Instant::now() >= limit {
                    log::warn!("savings solver: advisory deadline reached mid-merge");
                    deadline_hit = true;
                    break;
                }
            }
            if value <= 0.0 {
                break;
            }
            match (assigned[i], assigned[j]) {
                (None, None) => {
                    if let Some(v) = self.find_vehicle_for_pair(
                        request, &fleet, &plans, i, j, classifier, sink, at,
                    ) {
                        plans[v].shipments.push(i);
                        plans[v].shipments.push(j);
                        let (si, sj) = (&request.shipments[i], &request.shipments[j]);
                        plans[v].load.add(si.weight_kg, si.volume_m3);
                        plans[v].load.add(sj.weight_kg, sj.volume_m3);
                        assigned[i] = Some(v);
                        assigned[j] = Some(v);
                    }
                }
                (Some(v), None) => {
                    if self.vehicle_takes(request, &plans[v], v, j, classifier, sink, at) {
                        plans[v].shipments.push(j);
                        let s = &request.shipments[j];
                        plans[v].load.add(s.weight_kg, s.volume_m3);
                        assigned[j] = Some(v);
                    }
                }
                (None, Some(v)) => {
                    if self.vehicle_takes(request, &plans[v], v, i, classifier, sink, at) {
                        plans[v].shipments.push(i);
                        let s = &request.shipments[i];
                        plans[v].load.add(s.weight_kg, s.volume_m3);
                        assigned[i] = Some(v);
                    }
                }
                (Some(_), Some(_)) => {}
            }
        }

        // Remainder pass: place singles the savings merges never touched.
        if !deadline_hit {
            for &i in shipment_indices {
                if assigned[i].is_some() {
                    continue;
                }
                for &v in &fleet {
                    if self.vehicle_takes(request, &plans[v], v, i, classifier, sink, at) {
                        plans[v].shipments.push(i);
                        let s = &request.shipments[i];
                        plans[v].load.add(s.weight_kg, s.volume_m3);
                        assigned[i] = Some(v);
                        break;
                    }
                }
            }
        }

        let (routes, dropped) = self.build_routes(request, &plans, &fleet);
        for s in dropped {
            assigned[s] = None;
        }
        let unassigned: Vec<String> = shipment_indices
            .iter()
            .filter(|&&i| assigned[i].is_none())
            .map(|&i| request.shipments[i].id.clone())
            .collect();

        let totals = RouteTotals::from_routes(&routes);
        let status = if routes.is_empty() {
            SolverStatus::Infeasible
        } else {
            SolverStatus::Optimal
        };
        Ok(SavingsOutcome {
            status,
            result: HeuristicResult {
                feasible: !routes.is_empty(),
                routes,
                totals,
                algorithm: Algorithm::ClarkeWrightSavings,
                processing_ms: started.elapsed().as_millis() as u64,
                unassigned,
            },
        })
    }

    fn infeasible_outcome(
        request: &OptimizeRequest,
        shipment_indices: &[usize],
        started: Instant,
    ) -> SavingsOutcome {
        SavingsOutcome {
            status: SolverStatus::Infeasible,
            result: HeuristicResult {
                routes: Vec::new(),
                totals: RouteTotals::default(),
                algorithm: Algorithm::ClarkeWrightSavings,
                processing_ms: started.elapsed().as_millis() as u64,
                feasible: false,
                unassigned: shipment_indices
                    .iter()
                    .map(|&i| request.shipments[i].id.clone())
                    .collect(),
            },
        }
    }

    /// Whether vehicle `v` (with its current plan) can additionally take
    /// shipment `s`.
    #[allow(clippy::too_many_arguments)]
    fn vehicle_takes(
        &self,
        request: &OptimizeRequest,
        plan: &VehiclePlan,
        v: usize,
        s: usize,
        classifier: &dyn ZoneClassifier,
        sink: &dyn ComplianceSink,
        at: chrono::DateTime<chrono::Utc>,
    ) -> bool {
        let vehicle = &request.vehicles[v];
        let shipment = &request.shipments[s];
        if request.constraints.capacity
            && !plan.load.fits(vehicle, shipment.weight_kg, shipment.volume_m3)
        {
            return false;
        }
        if request.constraints.time_windows && !shipment.window.overlaps(&request.window) {
            return false;
        }
        if request.constraints.city_rules
            && !shipment_feasible(vehicle, shipment, classifier, at)
        {
            sink.record_rejection(
                &vehicle.id,
                classifier.classify(&shipment.delivery_address),
                at,
                &format!("savings merge rejected shipment {}", shipment.id),
            );
            return false;
        }
        true
    }

    #[allow(clippy::too_many_arguments)]
    fn find_vehicle_for_pair(
        &self,
        request: &OptimizeRequest,
        fleet: &[usize],
        plans: &[VehiclePlan],
        i: usize,
        j: usize,
        classifier: &dyn ZoneClassifier,
        sink: &dyn ComplianceSink,
        at: chrono::DateTime<chrono::Utc>,
    ) -> Option<usize> {
        let (si, sj) = (&request.shipments[i], &request.shipments[j]);
        fleet.iter().copied().find(|&v| {
            let vehicle = &request.vehicles[v];
            let combined_fits = !request.constraints.capacity
                || plans[v].load.fits(
                    vehicle,
                    si.weight_kg + sj.weight_kg,
                    si.volume_m3 + sj.volume_m3,
                );
            combined_fits
                && self.vehicle_takes(request, &plans[v], v, i, classifier, sink, at)
                && self.vehicle_takes(request, &plans[v], v, j, classifier, sink, at)
        })
    }

    /// Assemble routes from the merged plans. Routes that break the
    /// optional distance or duration ceilings are dropped; the second
    /// return value lists the shipment indices they carried so the
    /// caller can report them unassigned.
    fn build_routes(
        &self,
        request: &OptimizeRequest,
        plans: &[VehiclePlan],
        fleet: &[usize],
    ) -> (Vec<Route>, Vec<usize>) {
        let mut routes = Vec::new();
        let mut dropped = Vec::new();
        for &v in fleet {
            let plan = &plans[v];
            if plan.shipments.is_empty() {
                continue;
            }
            let vehicle = &request.vehicles[v];
            let mut stops = Vec::new();
            for &s in &plan.shipments {
                let shipment: &Shipment = &request.shipments[s];
                stops.push(PlannedStop::pickup(shipment.pickup, &shipment.id));
                stops.push(PlannedStop::delivery(shipment.delivery, &shipment.id));
            }
            let spec = RouteSpec {
                id: format!("cw-{}", routes.len() + 1),
                vehicle,
                kind: RouteKind::Direct,
                algorithm: Algorithm::ClarkeWrightSavings,
                fallback: false,
                constraints_applied: applied_constraints(request),
                start: request.window.earliest,
                premium: false,
            };
            let route = assemble_route(&spec, &stops);
            if exceeds_route_limits(&request.constraints, &route) {
                log::warn!(
                    "savings route for vehicle {} exceeds the route ceilings, dropping it",
                    vehicle.id
                );
                dropped.extend(plan.shipments.iter().copied());
                continue;
            }
            routes.push(route);
        }
        (routes, dropped)
    }
}

impl fleetroute_core::RouteSolver for SavingsSolver {
    fn solve(
        &self,
        request: &OptimizeRequest,
        matrix: &TravelMatrix,
    ) -> Result<HeuristicResult, SolveError> {
        let outcome = Self::solve(
            self,
            request,
            matrix,
            &fleetroute_core::KeywordZoneClassifier,
            &fleetroute_core::LogComplianceSink,
            None,
        )?;
        Ok(outcome.result)
    }
}

pub(crate) fn applied_constraints(request: &OptimizeRequest) -> Vec<String> {
    let mut applied = Vec::new();
    if request.constraints.capacity {
        applied.push("capacity".to_owned());
    }
    if request.constraints.time_windows {
        applied.push("time_windows".to_owned());
    }
    if request.constraints.hub_sequencing {
        applied.push("hub_sequencing".to_owned());
    }
    if request.constraints.city_rules {
        applied.push("city_rules".to_owned());
    }
    applied
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleetroute_core::test_support::{sample_shipment, sample_vehicle, sample_window};
    use fleetroute_core::{KeywordZoneClassifier, LogComplianceSink, VehicleStatus};
    use rstest::rstest;

    fn solve(request: &OptimizeRequest) -> SavingsOutcome {
        let matrix = TravelMatrix::build(&request.vehicles, &request.shipments, &request.hubs)
            .expect("non-empty request");
        SavingsSolver
            .solve(request, &matrix, &KeywordZoneClassifier, &LogComplianceSink, None)
            .expect("solver should not fail")
    }

    #[rstest]
    fn assigns_all_shipments_when_capacity_suffices() {
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
        let outcome = solve(&request);

        assert_eq!(outcome.status, SolverStatus::Optimal);
        assert!(outcome.result.feasible);
        assert!(outcome.result.unassigned.is_empty());
        let placed: usize = outcome
            .result
            .routes
            .iter()
            .map(|r| r.shipment_ids().len())
            .sum();
        assert_eq!(placed, 3);
    }

    #[rstest]
    fn respects_vehicle_capacity() {
        let request = OptimizeRequest::new(
            vec![sample_vehicle("V1", 600.0, 5.0)],
            vec![
                sample_shipment("S1", 400.0, 1.0),
                sample_shipment("S2", 400.0, 1.0),
            ],
            sample_window(),
        );
        let outcome = solve(&request);

        for route in &outcome.result.routes {
            let carried: f64 = route
                .shipment_ids()
                .iter()
                .map(|id| {
                    request
                        .shipments
                        .iter()
                        .find(|s| s.id == **id)
                        .map_or(0.0, |s| s.weight_kg)
                })
                .sum();
            assert!(carried <= 600.0);
        }
        assert_eq!(outcome.result.unassigned.len(), 1);
    }

    #[rstest]
    fn infeasible_when_fleet_is_down() {
        let mut request = OptimizeRequest::new(
            vec![sample_vehicle("V1", 1000.0, 5.0)],
            vec![sample_shipment("S1", 500.0, 1.0)],
            sample_window(),
        );
        request.vehicles[0].status = VehicleStatus::Maintenance;
        let outcome = solve(&request);

        assert_eq!(outcome.status, SolverStatus::Infeasible);
        assert!(!outcome.result.feasible);
        assert!(outcome.result.routes.is_empty());
        assert_eq!(outcome.result.unassigned, vec!["S1".to_owned()]);
    }

    #[rstest]
    fn equal_savings_resolve_deterministically() {
        // Identical shipments produce identical savings for every pair;
        // merge order must not depend on float comparison quirks.
        let request = OptimizeRequest::new(
            vec![sample_vehicle("V1", 2000.0, 10.0)],
            vec![
                sample_shipment("S1", 300.0, 1.0),
                sample_shipment("S2", 300.0, 1.0),
                sample_shipment("S3", 300.0, 1.0),
            ],
            sample_window(),
        );
        let first = solve(&request);
        let second = solve(&request);

        assert!(first.result.unassigned.is_empty());
        assert_eq!(first.result.routes, second.result.routes);
    }

    #[rstest]
    fn route_distance_ceiling_drops_the_route() {
        let mut request = OptimizeRequest::new(
            vec![sample_vehicle("V1", 1000.0, 5.0)],
            vec![sample_shipment("S1", 500.0, 1.0)],
            sample_window(),
        );
        request.constraints.max_route_distance_km = Some(1.0);
        let outcome = solve(&request);

        assert_eq!(outcome.status, SolverStatus::Infeasible);
        assert!(outcome.result.routes.is_empty());
        assert_eq!(outcome.result.unassigned, vec!["S1".to_owned()]);
    }

    #[rstest]
    fn route_duration_ceiling_is_enforced() {
        let mut request = OptimizeRequest::new(
            vec![sample_vehicle("V1", 1000.0, 5.0)],
            vec![sample_shipment("S1", 500.0, 1.0)],
            sample_window(),
        );
        request.constraints.max_route_duration_min = Some(5.0);
        let outcome = solve(&request);

        assert!(outcome.result.routes.is_empty());
        assert_eq!(outcome.result.unassigned, vec!["S1".to_owned()]);
    }

    #[rstest]
    fn stops_alternate_pickup_delivery_in_merge_order() {
        let request = OptimizeRequest::new(
            vec![sample_vehicle("V1", 2000.0, 10.0)],
            vec![
                sample_shipment("S1", 500.0, 1.0),
                sample_shipment("S2", 300.0, 1.0),
            ],
            sample_window(),
        );
        let outcome = solve(&request);
        let route = &outcome.result.routes[0];
        let kinds: Vec<_> = route.stops.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![
                fleetroute_core::StopKind::Pickup,
                fleetroute_core::StopKind::Delivery,
                fleetroute_core::StopKind::Pickup,
                fleetroute_core::StopKind::Delivery,
            ]
        );
    }
}
