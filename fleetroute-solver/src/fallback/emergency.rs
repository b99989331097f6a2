//! Emergency one-shipment-per-vehicle fallback.
//!
//! The simplest and fastest path, intended for outage pressure: no
//! sharing, no sequencing decisions, just priority-ordered direct
//! assignments under caller-supplied distance/duration ceilings.

use std::time::Instant;

use fleetroute_core::feasibility::{shipment_feasible, ZoneClassifier};
use fleetroute_core::{
    Algorithm, HeuristicResult, OptimizeRequest, RouteKind, RouteTotals, TravelMatrix,
};

use crate::fallback::FallbackConfig;
use crate::plan::{assemble_route, exceeds_route_limits, PlannedStop, RouteSpec};
use crate::savings::applied_constraints;

/// Emergency routing: shipments sorted by priority descending, one
/// shipment per vehicle, rejecting any pairing whose direct distance or
/// duration exceeds the configured ceilings.
#[must_use]
pub fn emergency_routing(
    request: &OptimizeRequest,
    matrix: &TravelMatrix,
    config: &FallbackConfig,
    classifier: &dyn ZoneClassifier,
) -> HeuristicResult {
    let started = Instant::now();
    let at = request.window.earliest;
    let index = *matrix.index();

    let mut order: Vec<usize> = (0..request.shipments.len()).collect();
    order.sort_by(|&a, &b| {
        request.shipments[b]
            .priority
            .cmp(&request.shipments[a].priority)
    });

    let mut vehicle_used = vec![false; request.vehicles.len()];
    let mut routes = Vec::new();
    let mut unassigned = Vec::new();

    for s in order {
        let shipment = &request.shipments[s];
        let chosen = request.vehicles.iter().enumerate().find(|(v, vehicle)| {
            if vehicle_used[*v] || !vehicle.is_available() {
                return false;
            }
            if !vehicle.can_carry(shipment.weight_kg, shipment.volume_m3) {
                return false;
            }
            if request.constraints.city_rules
                && !shipment_feasible(vehicle, shipment, classifier, at)
            {
                return false;
            }
            within_ceilings(matrix, &index, *v, s, config)
        });

        let Some((v, vehicle)) = chosen else {
            unassigned.push(shipment.id.clone());
            continue;
        };

        let stops = vec![
            PlannedStop::pickup(shipment.pickup, &shipment.id),
            PlannedStop::delivery(shipment.delivery, &shipment.id),
        ];
        let spec = RouteSpec {
            id: format!("emg-{}", routes.len() + 1),
            vehicle,
            kind: RouteKind::Direct,
            algorithm: Algorithm::EmergencyRouting,
            fallback: true,
            constraints_applied: applied_constraints(request),
            start: request.window.earliest,
            premium: false,
        };
        let route = assemble_route(&spec, &stops);
        if exceeds_route_limits(&request.constraints, &route) {
            log::warn!(
                "emergency route for vehicle {} exceeds the route ceilings, dropping it",
                vehicle.id
            );
            unassigned.push(shipment.id.clone());
            continue;
        }
        vehicle_used[v] = true;
        routes.push(route);
    }

    HeuristicResult {
        totals: RouteTotals::from_routes(&routes),
        feasible: !routes.is_empty(),
        algorithm: Algorithm::EmergencyRouting,
        processing_ms: started.elapsed().as_millis() as u64,
        routes,
        unassigned,
    }
}

/// Direct vehicle→pickup→delivery legs against the configured ceilings.
fn within_ceilings(
    matrix: &TravelMatrix,
    index: &fleetroute_core::LocationIndex,
    v: usize,
    s: usize,
    config: &FallbackConfig,
) -> bool {
    let approach = matrix.distance(index.vehicle(v), index.pickup(s));
    let haul = matrix.distance(index.pickup(s), index.delivery(s));
    if let Some(max_km) = config.max_direct_distance_km {
        if approach + haul > max_km {
            return false;
        }
    }
    if let Some(max_min) = config.max_direct_duration_min {
        let minutes = matrix.duration(index.vehicle(v), index.pickup(s))
            + matrix.duration(index.pickup(s), index.delivery(s));
        if minutes > max_min {
            return false;
        }
    }
    true
}
