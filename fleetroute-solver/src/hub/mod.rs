//! Hub-and-spoke routing for loads no single vehicle can carry.
//!
//! The pipeline: detect shipments that need splitting, assign each to
//! its best-scoring operational hub, carve the load into per-vehicle
//! fragments, move fragments between hubs on consolidated transfer
//! routes, then deliver hub-to-door. Shipments that fit a single vehicle
//! are returned untouched for the primary solver.
//!
//! Un-placeable fragments are logged and reported unassigned; the call
//! still succeeds with partial routes.

mod assignment;
mod last_mile;
mod split;
mod transfer;

pub use assignment::{assign_hub, nearest_pickup_hub, score_hub, HubScore};
pub use split::{needs_split, split_load, SplitFragment, SplitPlan};

use fleetroute_core::feasibility::{zone_violations, ZoneClassifier};
use fleetroute_core::{OptimizeRequest, Route, Shipment, TravelMatrix};

use last_mile::build_last_mile_routes;
use transfer::build_transfer_routes;

/// A split fragment annotated with its place in the hub network.
#[derive(Debug, Clone)]
pub(crate) struct HubFragment {
    /// The derived shipment record.
    pub shipment: Shipment,
    /// Assigned destination hub (index into the request's hub list).
    pub hub_idx: usize,
    /// Hub nearest the original pickup; differs from `hub_idx` when a
    /// transfer leg is needed.
    pub source_hub_idx: usize,
    /// Vehicle pre-assigned at split time, when one still holds the
    /// fragment's capacity reservation.
    pub vehicle_idx: Option<usize>,
}

/// Output of one hub-and-spoke pass.
#[derive(Debug, Clone, Default)]
pub struct HubSpokeOutcome {
    /// Transfer and hub-delivery routes.
    pub routes: Vec<Route>,
    /// Fragment ids no vehicle could take.
    pub unassigned: Vec<String>,
    /// Indices of shipments that fit a single vehicle; the caller routes
    /// them with the primary solver.
    pub residual_shipments: Vec<usize>,
    /// Vehicle indices consumed by transfer and last-mile routes.
    pub vehicles_used: Vec<usize>,
}

/// Whether a vehicle may legally serve both endpoints of a shipment.
///
/// Capacity is deliberately not checked here: split candidates are
/// sized per fragment later, and an oversized original load never fits
/// any single vehicle.
pub(crate) fn regulatory_admissible(
    request: &OptimizeRequest,
    v: usize,
    shipment: &Shipment,
    classifier: &dyn ZoneClassifier,
) -> bool {
    if !request.constraints.city_rules {
        return true;
    }
    let at = request.window.earliest;
    let vehicle = &request.vehicles[v];
    let pickup_zone = classifier.classify(&shipment.pickup_address);
    let delivery_zone = classifier.classify(&shipment.delivery_address);
    zone_violations(vehicle, pickup_zone, at).is_empty()
        && zone_violations(vehicle, delivery_zone, at).is_empty()
}

/// Run the hub pipeline over `shipment_indices`, drawing vehicles from
/// `vehicle_pool`.
pub fn hub_and_spoke(
    request: &OptimizeRequest,
    matrix: &TravelMatrix,
    shipment_indices: &[usize],
    vehicle_pool: &[usize],
    classifier: &dyn ZoneClassifier,
) -> HubSpokeOutcome {
    let operational: Vec<usize> = (0..request.hubs.len())
        .filter(|&h| request.hubs[h].is_operational())
        .collect();

    let mut outcome = HubSpokeOutcome::default();
    let mut pool: Vec<usize> = vehicle_pool
        .iter()
        .copied()
        .filter(|&v| request.vehicles[v].is_available())
        .collect();
    let initial_pool = pool.clone();

    if operational.is_empty() {
        if !request.hubs.is_empty() {
            log::warn!("hub routing requested but no hub is operational");
        }
        outcome.residual_shipments = shipment_indices.to_vec();
        return outcome;
    }

    let mut fragments: Vec<HubFragment> = Vec::new();
    for &s in shipment_indices {
        let shipment = &request.shipments[s];
        // Only vehicles that pass the feasibility engine for this
        // shipment's zones may carry its fragments.
        let carriers: Vec<usize> = pool
            .iter()
            .copied()
            .filter(|&v| regulatory_admissible(request, v, shipment, classifier))
            .collect();
        if !split::needs_split(shipment, &request.vehicles, &carriers) {
            outcome.residual_shipments.push(s);
            continue;
        }

        let Some(assigned) = assignment::assign_hub(request, matrix, s, &operational) else {
            outcome.unassigned.push(shipment.id.clone());
            continue;
        };
        let source = assignment::nearest_pickup_hub(matrix, s, &operational)
            .unwrap_or(assigned.hub_idx);

        let plan = split::split_load(shipment, &request.vehicles, &carriers);
        if !plan.complete() {
            log::warn!(
                "load split for {}: {:.0} kg / {:.2} m3 left after the pool ran out",
                shipment.id,
                plan.leftover_kg,
                plan.leftover_m3
            );
        }
        for fragment in &plan.fragments {
            pool.retain(|&p| p != fragment.vehicle_idx);
            fragments.push(HubFragment {
                shipment: fragment.shipment.clone(),
                hub_idx: assigned.hub_idx,
                source_hub_idx: source,
                vehicle_idx: Some(fragment.vehicle_idx),
            });
        }
        if !plan.complete() {
            // The leftover becomes one more fragment with no capacity
            // reservation; last-mile packing gets a chance at it before
            // it lands in the unassigned set.
            fragments.push(HubFragment {
                shipment: shipment.fragment(
                    plan.fragments.len() + 1,
                    plan.leftover_kg,
                    plan.leftover_m3,
                ),
                hub_idx: assigned.hub_idx,
                source_hub_idx: source,
                vehicle_idx: None,
            });
        }
    }

    let transfers = build_transfer_routes(request, &fragments, &mut pool, classifier);
    outcome.routes.extend(transfers.routes);
    fragments.retain(|f| !transfers.unmoved.contains(&f.shipment.id));
    outcome.unassigned.extend(transfers.unmoved);

    let last_mile = build_last_mile_routes(request, &fragments, &mut pool, classifier);
    outcome.routes.extend(last_mile.routes);
    outcome.unassigned.extend(last_mile.unassigned);

    outcome.vehicles_used = initial_pool
        .into_iter()
        .filter(|v| !pool.contains(v))
        .collect();
    outcome
}
