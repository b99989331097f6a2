//! Geo-distance and travel-time model.
//!
//! Distances are great-circle (haversine) kilometres. Travel time uses a
//! three-band piecewise multiplier approximating denser traffic on short
//! urban hops: short trips spend proportionally more time per kilometre
//! than long arterial runs.

use geo::Coord;

use crate::VehicleCategory;

/// Mean Earth radius in kilometres.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Premium dedicated routes are costed at 1.5x the per-km fuel rate.
pub const PREMIUM_COST_FACTOR: f64 = 1.5;

/// Great-circle distance between two coordinates in kilometres.
///
/// Coordinates are `(x = longitude, y = latitude)` in degrees.
///
/// # Examples
/// ```
/// use fleetroute_core::distance::haversine_km;
/// use geo::Coord;
///
/// let connaught_place = Coord { x: 77.2167, y: 28.6315 };
/// let india_gate = Coord { x: 77.2295, y: 28.6129 };
/// let km = haversine_km(connaught_place, india_gate);
/// assert!((km - 2.4).abs() < 0.2);
/// ```
#[must_use]
pub fn haversine_km(a: Coord<f64>, b: Coord<f64>) -> f64 {
    let lat_a = a.y.to_radians();
    let lat_b = b.y.to_radians();
    let d_lat = (b.y - a.y).to_radians();
    let d_lon = (b.x - a.x).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}

/// Estimated travel time in minutes for a hop of `distance_km`.
///
/// Piecewise bands: up to 5 km at 8 min/km, up to 20 km at 6 min/km,
/// beyond that 4 min/km.
#[must_use]
pub fn travel_minutes(distance_km: f64) -> f64 {
    let rate = if distance_km <= 5.0 {
        8.0
    } else if distance_km <= 20.0 {
        6.0
    } else {
        4.0
    };
    distance_km * rate
}

/// Per-kilometre fuel cost in currency units for a vehicle category.
#[must_use]
pub const fn fuel_rate_per_km(category: VehicleCategory) -> f64 {
    match category {
        VehicleCategory::Truck => 12.0,
        VehicleCategory::Van => 9.0,
        VehicleCategory::Tempo => 8.0,
        VehicleCategory::ThreeWheeler => 5.0,
        VehicleCategory::Electric => 3.0,
    }
}

/// Fuel cost of driving `distance_km` with the given category; premium
/// dedicated routes pay the [`PREMIUM_COST_FACTOR`] surcharge.
#[must_use]
pub fn fuel_cost(distance_km: f64, category: VehicleCategory, premium: bool) -> f64 {
    let base = distance_km * fuel_rate_per_km(category);
    if premium {
        base * PREMIUM_COST_FACTOR
    } else {
        base
    }
}
