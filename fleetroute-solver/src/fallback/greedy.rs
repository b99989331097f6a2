//! Greedy pair-scoring fallback.

use std::time::Instant;

use fleetroute_core::feasibility::{shipment_feasible, ZoneClassifier};
use fleetroute_core::{
    Algorithm, HeuristicResult, OptimizeRequest, RouteKind, RouteTotals, TravelMatrix,
};

use crate::fallback::FallbackConfig;
use crate::plan::{assemble_route, exceeds_route_limits, PlannedStop, RouteSpec, VehicleLoad};
use crate::savings::applied_constraints;

/// Score weights: distance 40%, capacity fit 30%, time-window overlap
/// 30%, the sum multiplied by the shipment's priority factor.
const DISTANCE_WEIGHT: f64 = 0.4;
const CAPACITY_WEIGHT: f64 = 0.3;
const TIME_WINDOW_WEIGHT: f64 = 0.3;

/// Greedy assignment: every (shipment, vehicle) pair is scored, pairs
/// are taken best-first, and a pair is skipped when it would violate
/// capacity or the feasibility engine.
#[must_use]
pub fn greedy_assignment(
    request: &OptimizeRequest,
    matrix: &TravelMatrix,
    _config: &FallbackConfig,
    classifier: &dyn ZoneClassifier,
) -> HeuristicResult {
    let started = Instant::now();
    let at = request.window.earliest;
    let index = *matrix.index();

    let mut scored = Vec::new();
    for (s, shipment) in request.shipments.iter().enumerate() {
        for (v, vehicle) in request.vehicles.iter().enumerate() {
            if !vehicle.is_available() {
                continue;
            }
            let distance = matrix.distance(index.vehicle(v), index.pickup(s));
            let distance_score = 100.0 / (1.0 + distance);

            let fit = (shipment.weight_kg / vehicle.capacity.weight_kg)
                .max(shipment.volume_m3 / vehicle.capacity.volume_m3);
            let capacity_score = if fit > 1.0 { 0.0 } else { fit * 100.0 };

            let window_score = if shipment.window.overlaps(&request.window) {
                100.0
            } else {
                0.0
            };

            let score = (DISTANCE_WEIGHT * distance_score
                + CAPACITY_WEIGHT * capacity_score
                + TIME_WINDOW_WEIGHT * window_score)
                * shipment.priority.score_factor();
            scored.push((s, v, score));
        }
    }
    scored.sort_by(|lhs, rhs| rhs.2.partial_cmp(&lhs.2).unwrap_or(std::cmp::Ordering::Equal));

    let mut taken = vec![false; request.shipments.len()];
    let mut loads: Vec<VehicleLoad> = vec![VehicleLoad::default(); request.vehicles.len()];
    let mut assignments: Vec<Vec<usize>> = vec![Vec::new(); request.vehicles.len()];

    for &(s, v, _) in &scored {
        if taken[s] {
            continue;
        }
        let vehicle = &request.vehicles[v];
        let shipment = &request.shipments[s];
        if !loads[v].fits(vehicle, shipment.weight_kg, shipment.volume_m3) {
            continue;
        }
        if request.constraints.city_rules
            && !shipment_feasible(vehicle, shipment, classifier, at)
        {
            continue;
        }
        taken[s] = true;
        loads[v].add(shipment.weight_kg, shipment.volume_m3);
        assignments[v].push(s);
    }

    let mut routes = Vec::new();
    for (v, shipment_ids) in assignments.iter().enumerate() {
        if shipment_ids.is_empty() {
            continue;
        }
        let vehicle = &request.vehicles[v];
        let mut stops = Vec::new();
        for &s in shipment_ids {
            let shipment = &request.shipments[s];
            stops.push(PlannedStop::pickup(shipment.pickup, &shipment.id));
            stops.push(PlannedStop::delivery(shipment.delivery, &shipment.id));
        }
        let spec = RouteSpec {
            id: format!("greedy-{}", routes.len() + 1),
            vehicle,
            kind: RouteKind::Direct,
            algorithm: Algorithm::GreedyAssignment,
            fallback: true,
            constraints_applied: applied_constraints(request),
            start: request.window.earliest,
            premium: false,
        };
        let route = assemble_route(&spec, &stops);
        if exceeds_route_limits(&request.constraints, &route) {
            log::warn!(
                "greedy route for vehicle {} exceeds the route ceilings, dropping it",
                vehicle.id
            );
            for &s in shipment_ids {
                taken[s] = false;
            }
            continue;
        }
        routes.push(route);
    }

    let unassigned: Vec<String> = request
        .shipments
        .iter()
        .enumerate()
        .filter(|(s, _)| !taken[*s])
        .map(|(_, shipment)| shipment.id.clone())
        .collect();

    HeuristicResult {
        totals: RouteTotals::from_routes(&routes),
        feasible: !routes.is_empty(),
        algorithm: Algorithm::GreedyAssignment,
        processing_ms: started.elapsed().as_millis() as u64,
        routes,
        unassigned,
    }
}
