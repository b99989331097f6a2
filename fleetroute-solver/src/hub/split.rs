//! Load splitting for shipments no single vehicle can carry.
//!
//! An oversized shipment is carved into fragments, each sized to the
//! vehicle that will carry it. Weight and volume are reduced by the same
//! fraction so a fragment's density matches the original load. Fragment
//! weights and volumes always sum back to the original (the tolerances
//! below bound float drift, nothing more).

use fleetroute_core::{Shipment, Vehicle};

/// Remaining weight below this is considered fully placed.
pub(crate) const WEIGHT_TOLERANCE_KG: f64 = 0.1;
/// Remaining volume below this is considered fully placed.
pub(crate) const VOLUME_TOLERANCE_M3: f64 = 0.01;

/// One carved fragment and the vehicle pre-assigned to carry it.
#[derive(Debug, Clone)]
pub struct SplitFragment {
    /// The derived shipment record (`id` suffixed, `split_from` set).
    pub shipment: Shipment,
    /// Index into the request's vehicle list.
    pub vehicle_idx: usize,
}

/// Result of splitting one shipment across a vehicle pool.
#[derive(Debug, Clone, Default)]
pub struct SplitPlan {
    /// Fragments in carve order; seq suffixes start at 1.
    pub fragments: Vec<SplitFragment>,
    /// Weight left unplaced after the pool ran out, if any.
    pub leftover_kg: f64,
    /// Volume left unplaced after the pool ran out, if any.
    pub leftover_m3: f64,
}

impl SplitPlan {
    /// Whether the full load was placed.
    #[must_use]
    pub fn complete(&self) -> bool {
        self.leftover_kg <= WEIGHT_TOLERANCE_KG && self.leftover_m3 <= VOLUME_TOLERANCE_M3
    }
}

/// Whether any vehicle in the pool can carry the whole shipment alone.
#[must_use]
pub fn needs_split(shipment: &Shipment, vehicles: &[Vehicle], pool: &[usize]) -> bool {
    !pool.iter().any(|&v| {
        vehicles[v].is_available() && vehicles[v].can_carry(shipment.weight_kg, shipment.volume_m3)
    })
}

/// Carve `shipment` into per-vehicle fragments.
///
/// Candidate vehicles are taken largest first (by weight capacity, then
/// volume). Each fragment takes the largest same-density slice its
/// vehicle can hold; the carve stops when the remainder falls under the
/// tolerances or the pool is exhausted.
#[must_use]
pub fn split_load(shipment: &Shipment, vehicles: &[Vehicle], pool: &[usize]) -> SplitPlan {
    let mut candidates: Vec<usize> = pool
        .iter()
        .copied()
        .filter(|&v| vehicles[v].is_available())
        .collect();
    candidates.sort_by(|&a, &b| {
        let ca = &vehicles[a].capacity;
        let cb = &vehicles[b].capacity;
        cb.weight_kg
            .partial_cmp(&ca.weight_kg)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| {
                cb.volume_m3
                    .partial_cmp(&ca.volume_m3)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
    });

    let mut plan = SplitPlan::default();
    let mut remaining_kg = shipment.weight_kg;
    let mut remaining_m3 = shipment.volume_m3;
    let mut seq = 1;

    for v in candidates {
        if remaining_kg <= WEIGHT_TOLERANCE_KG && remaining_m3 <= VOLUME_TOLERANCE_M3 {
            break;
        }
        let capacity = &vehicles[v].capacity;
        // Same fraction of weight and volume keeps fragment density equal
        // to the original load.
        let fraction = weight_fraction(remaining_kg, capacity.weight_kg)
            .min(volume_fraction(remaining_m3, capacity.volume_m3))
            .min(1.0);
        if fraction <= 0.0 {
            continue;
        }
        let take_kg = remaining_kg * fraction;
        let take_m3 = remaining_m3 * fraction;
        plan.fragments.push(SplitFragment {
            shipment: shipment.fragment(seq, take_kg, take_m3),
            vehicle_idx: v,
        });
        seq += 1;
        remaining_kg -= take_kg;
        remaining_m3 -= take_m3;
    }

    if remaining_kg > WEIGHT_TOLERANCE_KG || remaining_m3 > VOLUME_TOLERANCE_M3 {
        plan.leftover_kg = remaining_kg;
        plan.leftover_m3 = remaining_m3;
    }
    plan
}

fn weight_fraction(remaining_kg: f64, capacity_kg: f64) -> f64 {
    if remaining_kg <= WEIGHT_TOLERANCE_KG {
        1.0
    } else {
        capacity_kg / remaining_kg
    }
}

fn volume_fraction(remaining_m3: f64, capacity_m3: f64) -> f64 {
    if remaining_m3 <= VOLUME_TOLERANCE_M3 {
        1.0
    } else {
        capacity_m3 / remaining_m3
    }
}
