//! Consolidated hub-to-hub transfer routes.
//!
//! Fragments whose source hub differs from their assigned hub ride a
//! shared transfer vehicle: one route per (source, destination) pair.
//! Loading is modelled as one hub stop per fragment at the source, so
//! service time scales with the consolidated load. Vehicle selection
//! consumes the shared pool sequentially; hub pairs are independent
//! after that, so route assembly runs on rayon.

use std::collections::BTreeMap;

use rayon::prelude::*;

use fleetroute_core::feasibility::ZoneClassifier;
use fleetroute_core::{Algorithm, OptimizeRequest, Route, RouteKind};

use crate::hub::{regulatory_admissible, HubFragment};
use crate::plan::{assemble_route, PlannedStop, RouteSpec};
use crate::savings::applied_constraints;

/// Transfer-vehicle score: load utilisation 50%, drivetrain fuel
/// efficiency 30%, condition by age 20%.
const UTILISATION_WEIGHT: f64 = 0.5;
const FUEL_WEIGHT: f64 = 0.3;
const CONDITION_WEIGHT: f64 = 0.2;

/// Routes plus the ids of fragments no transfer vehicle could move.
pub(crate) struct TransferOutcome {
    pub routes: Vec<Route>,
    pub unmoved: Vec<String>,
}

/// Build one consolidated transfer route per (source hub, destination
/// hub) pair, consuming vehicles from `pool`.
///
/// Fragments already at their assigned hub are skipped; the caller
/// routes them straight to last-mile.
pub(crate) fn build_transfer_routes(
    request: &OptimizeRequest,
    fragments: &[HubFragment],
    pool: &mut Vec<usize>,
    classifier: &dyn ZoneClassifier,
) -> TransferOutcome {
    let mut groups: BTreeMap<(usize, usize), Vec<&HubFragment>> = BTreeMap::new();
    for fragment in fragments {
        if fragment.source_hub_idx != fragment.hub_idx {
            groups
                .entry((fragment.source_hub_idx, fragment.hub_idx))
                .or_default()
                .push(fragment);
        }
    }

    let mut outcome = TransferOutcome {
        routes: Vec::new(),
        unmoved: Vec::new(),
    };

    // Vehicle selection consumes the pool and must stay sequential.
    let mut planned: Vec<((usize, usize), Vec<&HubFragment>, usize)> = Vec::new();
    for ((src, dst), group) in groups {
        let weight_kg: f64 = group.iter().map(|f| f.shipment.weight_kg).sum();
        let volume_m3: f64 = group.iter().map(|f| f.shipment.volume_m3).sum();

        let chosen = pool
            .iter()
            .copied()
            .filter(|&v| {
                request.vehicles[v].is_available()
                    && request.vehicles[v].can_carry(weight_kg, volume_m3)
                    && group
                        .iter()
                        .all(|f| regulatory_admissible(request, v, &f.shipment, classifier))
            })
            .fold(None::<(usize, f64)>, |best, v| {
                let score = transfer_score(request, v, weight_kg, volume_m3);
                match best {
                    Some((_, best_score)) if score <= best_score => best,
                    _ => Some((v, score)),
                }
            });

        let Some((v, _)) = chosen else {
            log::warn!(
                "hub transfer {} -> {}: no vehicle can carry {weight_kg:.0} kg, \
                 leaving {} fragment(s) unassigned",
                request.hubs[src].id,
                request.hubs[dst].id,
                group.len()
            );
            outcome
                .unmoved
                .extend(group.iter().map(|f| f.shipment.id.clone()));
            continue;
        };
        pool.retain(|&p| p != v);
        planned.push(((src, dst), group, v));
    }

    outcome.routes = planned
        .par_iter()
        .map(|((src, dst), group, v)| transfer_route(request, *src, *dst, group, *v))
        .collect();
    outcome
}

fn transfer_route(
    request: &OptimizeRequest,
    src: usize,
    dst: usize,
    group: &[&HubFragment],
    v: usize,
) -> Route {
    let source = &request.hubs[src];
    let destination = &request.hubs[dst];
    let mut stops: Vec<PlannedStop> = group
        .iter()
        .map(|f| PlannedStop::hub(source.location, &source.id).with_shipment(&f.shipment.id))
        .collect();
    stops.push(PlannedStop::hub(destination.location, &destination.id));

    let spec = RouteSpec {
        id: format!("xfer-{}-{}", source.id, destination.id),
        vehicle: &request.vehicles[v],
        kind: RouteKind::HubTransfer,
        algorithm: Algorithm::HubAndSpoke,
        fallback: false,
        constraints_applied: applied_constraints(request),
        start: request.window.earliest,
        premium: false,
    };
    assemble_route(&spec, &stops)
}

fn transfer_score(request: &OptimizeRequest, v: usize, weight_kg: f64, volume_m3: f64) -> f64 {
    let vehicle = &request.vehicles[v];
    let utilisation = (weight_kg / vehicle.capacity.weight_kg)
        .max(volume_m3 / vehicle.capacity.volume_m3)
        .min(1.0)
        * 100.0;
    UTILISATION_WEIGHT * utilisation
        + FUEL_WEIGHT * vehicle.fuel_efficiency_score()
        + CONDITION_WEIGHT * vehicle.condition_score()
}
