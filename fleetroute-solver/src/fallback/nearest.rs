//! Nearest-neighbour fallback.

use std::time::Instant;

use fleetroute_core::feasibility::{shipment_feasible, ZoneClassifier};
use fleetroute_core::{
    Algorithm, HeuristicResult, OptimizeRequest, RouteKind, RouteTotals, TravelMatrix,
};

use crate::fallback::FallbackConfig;
use crate::plan::{assemble_route, exceeds_route_limits, PlannedStop, RouteSpec, VehicleLoad};
use crate::savings::applied_constraints;

/// Nearest-neighbour construction: each vehicle, in input order,
/// repeatedly takes the nearest unassigned shipment that fits its
/// remaining capacity and passes the feasibility engine, until none
/// remain. Time windows are deliberately relaxed; capacity and legal
/// access are not.
#[must_use]
pub fn nearest_neighbor(
    request: &OptimizeRequest,
    matrix: &TravelMatrix,
    _config: &FallbackConfig,
    classifier: &dyn ZoneClassifier,
) -> HeuristicResult {
    let started = Instant::now();
    let at = request.window.earliest;
    let index = *matrix.index();

    let mut taken = vec![false; request.shipments.len()];
    let mut routes = Vec::new();

    for (v, vehicle) in request.vehicles.iter().enumerate() {
        if !vehicle.is_available() {
            continue;
        }
        let mut load = VehicleLoad::default();
        let mut position = index.vehicle(v);
        let mut stops = Vec::new();
        let mut picked = Vec::new();

        loop {
            let next = request
                .shipments
                .iter()
                .enumerate()
                .filter(|(s, shipment)| {
                    !taken[*s]
                        && load.fits(vehicle, shipment.weight_kg, shipment.volume_m3)
                        && (!request.constraints.city_rules
                            || shipment_feasible(vehicle, shipment, classifier, at))
                })
                .min_by(|(a, _), (b, _)| {
                    let da = matrix.distance(position, index.pickup(*a));
                    let db = matrix.distance(position, index.pickup(*b));
                    da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
                });

            let Some((s, shipment)) = next else { break };
            taken[s] = true;
            picked.push(s);
            load.add(shipment.weight_kg, shipment.volume_m3);
            stops.push(PlannedStop::pickup(shipment.pickup, &shipment.id));
            stops.push(PlannedStop::delivery(shipment.delivery, &shipment.id));
            position = index.delivery(s);
        }

        if stops.is_empty() {
            continue;
        }
        let spec = RouteSpec {
            id: format!("nn-{}", routes.len() + 1),
            vehicle,
            kind: RouteKind::Direct,
            algorithm: Algorithm::NearestNeighbor,
            fallback: true,
            constraints_applied: applied_constraints(request),
            start: request.window.earliest,
            premium: false,
        };
        let route = assemble_route(&spec, &stops);
        if exceeds_route_limits(&request.constraints, &route) {
            log::warn!(
                "nearest-neighbour route for vehicle {} exceeds the route ceilings, dropping it",
                vehicle.id
            );
            for s in picked {
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
        algorithm: Algorithm::NearestNeighbor,
        processing_ms: started.elapsed().as_millis() as u64,
        routes,
        unassigned,
    }
}
