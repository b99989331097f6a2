//! Premium dedicated routing: one vehicle exclusively per shipment.
//!
//! Premium shipments are processed in input order (first come, first
//! served). Each allocation removes the chosen vehicle from the pool, so
//! later premium shipments may go entirely unserved when premium-grade
//! vehicles run out — that is the contract, not a failure.

use fleetroute_core::feasibility::{shipment_feasible, ComplianceSink, ZoneClassifier};
use fleetroute_core::{
    Algorithm, OptimizeRequest, PremiumAllocation, Route, RouteKind, Shipment, TravelMatrix,
    Vehicle, VehicleCategory, ZoneKind,
};

use crate::plan::{assemble_route, PlannedStop, RouteSpec};
use crate::savings::applied_constraints;

/// Selection weights: proximity 40%, capacity-utilisation efficiency
/// 20%, type suitability 20%, drivetrain efficiency 10%, condition 10%.
const PROXIMITY_WEIGHT: f64 = 0.4;
const UTILISATION_WEIGHT: f64 = 0.2;
const SUITABILITY_WEIGHT: f64 = 0.2;
const FUEL_WEIGHT: f64 = 0.1;
const CONDITION_WEIGHT: f64 = 0.1;

/// Premium vehicle floor: age and capacity minimums for dedicated
/// service.
const MAX_AGE_YEARS: u8 = 7;
const MIN_WEIGHT_KG: f64 = 500.0;
const MIN_VOLUME_M3: f64 = 2.0;

/// Output of the premium allocator.
#[derive(Debug, Clone, Default)]
pub struct PremiumOutcome {
    /// One dedicated route per served premium shipment.
    pub routes: Vec<Route>,
    /// Allocation records mirroring `routes`.
    pub allocations: Vec<PremiumAllocation>,
    /// Premium shipments left unserved after the pool was exhausted.
    pub unassigned: Vec<String>,
    /// Indices (into the request's vehicle list) of vehicles consumed by
    /// premium allocations.
    pub vehicles_used: Vec<usize>,
}

/// Allocate one exclusive vehicle per premium shipment.
///
/// `shipment_indices` are indices into `request.shipments`, processed in
/// the given order.
pub fn premium_dedicated(
    request: &OptimizeRequest,
    matrix: &TravelMatrix,
    shipment_indices: &[usize],
    classifier: &dyn ZoneClassifier,
    sink: &dyn ComplianceSink,
) -> PremiumOutcome {
    let at = request.window.earliest;
    let index = *matrix.index();
    let mut pool: Vec<usize> = (0..request.vehicles.len())
        .filter(|&v| request.vehicles[v].is_available())
        .collect();
    let mut outcome = PremiumOutcome::default();

    for &s in shipment_indices {
        let shipment = &request.shipments[s];
        let best = pool
            .iter()
            .copied()
            .filter(|&v| {
                let vehicle = &request.vehicles[v];
                if !premium_eligible(vehicle) {
                    return false;
                }
                if request.constraints.city_rules
                    && !shipment_feasible(vehicle, shipment, classifier, at)
                {
                    sink.record_rejection(
                        &vehicle.id,
                        classifier.classify(&shipment.delivery_address),
                        at,
                        &format!("premium allocation rejected shipment {}", shipment.id),
                    );
                    return false;
                }
                vehicle.can_carry(shipment.weight_kg, shipment.volume_m3)
            })
            .fold(None::<(usize, f64)>, |best, v| {
                let score = selection_score(
                    &request.vehicles[v],
                    shipment,
                    matrix.distance(index.vehicle(v), index.pickup(s)),
                );
                match best {
                    // Strict comparison keeps the first-seen vehicle on ties.
                    Some((_, best_score)) if score <= best_score => best,
                    _ => Some((v, score)),
                }
            });

        let Some((v, _)) = best else {
            log::warn!(
                "premium: no eligible vehicle left for shipment {}",
                shipment.id
            );
            outcome.unassigned.push(shipment.id.clone());
            continue;
        };

        pool.retain(|&p| p != v);
        outcome.vehicles_used.push(v);
        let vehicle = &request.vehicles[v];
        let stops = vec![
            PlannedStop::pickup(shipment.pickup, &shipment.id),
            PlannedStop::delivery(shipment.delivery, &shipment.id),
        ];
        let spec = RouteSpec {
            id: format!("prm-{}", outcome.routes.len() + 1),
            vehicle,
            kind: RouteKind::PremiumDedicated,
            algorithm: Algorithm::PremiumDedicated,
            fallback: false,
            constraints_applied: applied_constraints(request),
            start: request.window.earliest,
            premium: true,
        };
        outcome.routes.push(assemble_route(&spec, &stops));
        outcome.allocations.push(PremiumAllocation {
            shipment_id: shipment.id.clone(),
            vehicle_id: vehicle.id.clone(),
            guaranteed_window: shipment.window,
            exclusive: true,
        });
    }

    outcome
}

/// Premium eligibility floor: young enough, big enough, residential and
/// commercial access, current certificate and permit.
#[must_use]
pub fn premium_eligible(vehicle: &Vehicle) -> bool {
    vehicle.age_years <= MAX_AGE_YEARS
        && vehicle.capacity.weight_kg >= MIN_WEIGHT_KG
        && vehicle.capacity.volume_m3 >= MIN_VOLUME_M3
        && vehicle.has_zone_access(ZoneKind::Residential)
        && vehicle.has_zone_access(ZoneKind::Commercial)
        && vehicle.compliance.pollution_certificate
        && vehicle.compliance.permit_valid
}

fn selection_score(vehicle: &Vehicle, shipment: &Shipment, pickup_distance_km: f64) -> f64 {
    let proximity = 100.0 / (1.0 + pickup_distance_km);

    // Tighter fit wastes less capacity on a dedicated run.
    let utilisation = (shipment.weight_kg / vehicle.capacity.weight_kg)
        .max(shipment.volume_m3 / vehicle.capacity.volume_m3)
        .min(1.0)
        * 100.0;

    let suitability = type_suitability(vehicle, shipment);

    PROXIMITY_WEIGHT * proximity
        + UTILISATION_WEIGHT * utilisation
        + SUITABILITY_WEIGHT * suitability
        + FUEL_WEIGHT * vehicle.fuel_efficiency_score()
        + CONDITION_WEIGHT * vehicle.condition_score()
}

fn type_suitability(vehicle: &Vehicle, shipment: &Shipment) -> f64 {
    let base: f64 = match vehicle.category {
        VehicleCategory::Van => 80.0,
        VehicleCategory::Electric => 75.0,
        VehicleCategory::Tempo => 70.0,
        VehicleCategory::Truck => {
            if shipment.weight_kg > 2000.0 {
                90.0
            } else {
                50.0
            }
        }
        VehicleCategory::ThreeWheeler => {
            if shipment.weight_kg <= 200.0 {
                70.0
            } else {
                30.0
            }
        }
    };
    // Vans handle fragile premium loads best.
    if vehicle.category == VehicleCategory::Van && shipment.fragile {
        (base + 20.0).min(100.0)
    } else {
        base
    }
}
