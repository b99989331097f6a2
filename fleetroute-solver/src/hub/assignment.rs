//! Hub assignment scoring.
//!
//! Every shipment scores every operational hub on a weighted blend of
//! detour distance, spare hub capacity, hub class, buffer-vehicle count
//! and total transfer time; the highest score wins, with ties resolved
//! in favour of the first hub in input order.

use fleetroute_core::{OptimizeRequest, TravelMatrix};

/// Blend weights: detour 40%, spare vehicle capacity 25%, hub class
/// 20%, buffer vehicles 10%, transfer+delivery time 5%.
const DETOUR_WEIGHT: f64 = 0.40;
const CAPACITY_WEIGHT: f64 = 0.25;
const CLASS_WEIGHT: f64 = 0.20;
const BUFFER_WEIGHT: f64 = 0.10;
const TIME_WEIGHT: f64 = 0.05;

/// Extra kilometres cost ten score points each; floored at zero.
const DETOUR_PENALTY_PER_KM: f64 = 10.0;
/// Each buffer vehicle adds twenty points, capped at one hundred.
const BUFFER_POINTS_PER_VEHICLE: f64 = 20.0;
/// Transfer minutes cost half a point each; floored at zero.
const TIME_PENALTY_PER_MIN: f64 = 0.5;

/// A chosen hub and its winning score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HubScore {
    /// Index into the request's hub list.
    pub hub_idx: usize,
    /// Winning blended score.
    pub score: f64,
}

/// Blended score for routing `shipment_idx` through `hub_idx`.
#[must_use]
pub fn score_hub(
    request: &OptimizeRequest,
    matrix: &TravelMatrix,
    shipment_idx: usize,
    hub_idx: usize,
) -> f64 {
    let index = *matrix.index();
    let pickup = index.pickup(shipment_idx);
    let delivery = index.delivery(shipment_idx);
    let hub_slot = index.hub(hub_idx);
    let hub = &request.hubs[hub_idx];

    let direct = matrix.distance(pickup, delivery);
    let via_hub = matrix.distance(pickup, hub_slot) + matrix.distance(hub_slot, delivery);
    let detour_score = (100.0 - (via_hub - direct).max(0.0) * DETOUR_PENALTY_PER_KM).max(0.0);

    let capacity_score = hub.vehicle_capacity.free_fraction() * 100.0;
    let class_score = hub.class_score();
    let buffer_score = (f64::from(hub.buffer_vehicles) * BUFFER_POINTS_PER_VEHICLE).min(100.0);

    let transit_min = matrix.duration(pickup, hub_slot) + matrix.duration(hub_slot, delivery);
    let time_score = (100.0 - transit_min * TIME_PENALTY_PER_MIN).max(0.0);

    DETOUR_WEIGHT * detour_score
        + CAPACITY_WEIGHT * capacity_score
        + CLASS_WEIGHT * class_score
        + BUFFER_WEIGHT * buffer_score
        + TIME_WEIGHT * time_score
}

/// Pick the best operational hub for a shipment, first hub winning ties.
#[must_use]
pub fn assign_hub(
    request: &OptimizeRequest,
    matrix: &TravelMatrix,
    shipment_idx: usize,
    operational: &[usize],
) -> Option<HubScore> {
    let mut best: Option<HubScore> = None;
    for &hub_idx in operational {
        let score = score_hub(request, matrix, shipment_idx, hub_idx);
        // Strict comparison keeps the first hub on ties.
        if best.map_or(true, |b| score > b.score) {
            best = Some(HubScore { hub_idx, score });
        }
    }
    best
}

/// The operational hub nearest to a shipment's pickup.
#[must_use]
pub fn nearest_pickup_hub(
    matrix: &TravelMatrix,
    shipment_idx: usize,
    operational: &[usize],
) -> Option<usize> {
    let index = *matrix.index();
    let pickup = index.pickup(shipment_idx);
    operational.iter().copied().min_by(|&a, &b| {
        let da = matrix.distance(pickup, index.hub(a));
        let db = matrix.distance(pickup, index.hub(b));
        da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
    })
}
