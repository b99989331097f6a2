//! Route assembly shared by every solver.
//!
//! Solvers decide *which* stops a vehicle makes; this module turns an
//! ordered stop list into a [`Route`] with leg distances, cumulative
//! ETAs and a fuel-cost estimate, and tracks per-vehicle load
//! accumulation so capacity is enforced identically everywhere.

use chrono::{DateTime, Duration, Utc};
use geo::Coord;

use fleetroute_core::distance::{fuel_cost, haversine_km, travel_minutes};
use fleetroute_core::{
    Algorithm, ConstraintFlags, Route, RouteKind, RouteStop, StopKind, StopStatus, Vehicle,
};

/// Default on-site service time per stop.
pub(crate) const DEFAULT_SERVICE_MINUTES: f64 = 10.0;

/// A stop a solver has decided on, before timing and sequencing.
#[derive(Debug, Clone)]
pub(crate) struct PlannedStop {
    pub location: Coord<f64>,
    pub kind: StopKind,
    pub shipment_id: Option<String>,
    pub hub_id: Option<String>,
    pub service_minutes: f64,
}

impl PlannedStop {
    pub(crate) fn pickup(location: Coord<f64>, shipment_id: &str) -> Self {
        Self {
            location,
            kind: StopKind::Pickup,
            shipment_id: Some(shipment_id.to_owned()),
            hub_id: None,
            service_minutes: DEFAULT_SERVICE_MINUTES,
        }
    }

    pub(crate) fn delivery(location: Coord<f64>, shipment_id: &str) -> Self {
        Self {
            location,
            kind: StopKind::Delivery,
            shipment_id: Some(shipment_id.to_owned()),
            hub_id: None,
            service_minutes: DEFAULT_SERVICE_MINUTES,
        }
    }

    pub(crate) fn hub(location: Coord<f64>, hub_id: &str) -> Self {
        Self {
            location,
            kind: StopKind::Hub,
            shipment_id: None,
            hub_id: Some(hub_id.to_owned()),
            service_minutes: DEFAULT_SERVICE_MINUTES,
        }
    }

    pub(crate) fn with_shipment(mut self, shipment_id: &str) -> Self {
        self.shipment_id = Some(shipment_id.to_owned());
        self
    }
}

/// Parameters for [`assemble_route`].
pub(crate) struct RouteSpec<'a> {
    pub id: String,
    pub vehicle: &'a Vehicle,
    pub kind: RouteKind,
    pub algorithm: Algorithm,
    pub fallback: bool,
    pub constraints_applied: Vec<String>,
    pub start: DateTime<Utc>,
    pub premium: bool,
}

/// Build a timed route from an ordered stop list.
///
/// The first leg runs from the vehicle's current location to the first
/// stop; ETAs accumulate travel plus service time from `spec.start`.
pub(crate) fn assemble_route(spec: &RouteSpec<'_>, stops: &[PlannedStop]) -> Route {
    let mut route = Route::new(
        spec.id.clone(),
        spec.vehicle.id.clone(),
        spec.kind,
        spec.algorithm,
    );
    route.meta.fallback = spec.fallback;
    route.meta.constraints_applied = spec.constraints_applied.clone();

    let mut position = spec.vehicle.location;
    let mut clock = spec.start;
    let mut total_km = 0.0;
    let mut total_min = 0.0;

    for planned in stops {
        let leg_km = haversine_km(position, planned.location);
        let leg_min = travel_minutes(leg_km);
        total_km += leg_km;
        total_min += leg_min + planned.service_minutes;

        let eta = clock + minutes(leg_min);
        let etd = eta + minutes(planned.service_minutes);
        route.push_stop(RouteStop {
            sequence: 0,
            location: planned.location,
            kind: planned.kind,
            shipment_id: planned.shipment_id.clone(),
            hub_id: planned.hub_id.clone(),
            eta,
            etd,
            service_minutes: planned.service_minutes,
            status: StopStatus::Pending,
        });

        position = planned.location;
        clock = etd;
    }

    route.distance_km = total_km;
    route.duration_min = total_min;
    route.fuel_cost = fuel_cost(total_km, spec.vehicle.category, spec.premium);
    route.meta.objective = total_km;
    route
}

fn minutes(min: f64) -> Duration {
    Duration::seconds((min * 60.0).round() as i64)
}

/// Whether an assembled route breaks the request's optional distance or
/// duration ceilings. Solvers drop such routes and report their
/// shipments unassigned.
pub(crate) fn exceeds_route_limits(constraints: &ConstraintFlags, route: &Route) -> bool {
    constraints
        .max_route_distance_km
        .is_some_and(|max| route.distance_km > max)
        || constraints
            .max_route_duration_min
            .is_some_and(|max| route.duration_min > max)
}

/// Running load of one vehicle during greedy accumulation.
///
/// Returned and threaded explicitly instead of mutating shared maps.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct VehicleLoad {
    pub weight_kg: f64,
    pub volume_m3: f64,
}

impl VehicleLoad {
    /// Whether `vehicle` can additionally take the given load.
    pub(crate) fn fits(&self, vehicle: &Vehicle, weight_kg: f64, volume_m3: f64) -> bool {
        vehicle
            .capacity
            .fits(self.weight_kg + weight_kg, self.volume_m3 + volume_m3)
    }

    pub(crate) fn add(&mut self, weight_kg: f64, volume_m3: f64) {
        self.weight_kg += weight_kg;
        self.volume_m3 += volume_m3;
    }
}
