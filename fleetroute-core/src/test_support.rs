//! Shared fixtures for unit and behaviour tests.
//!
//! All fixtures are anchored to 2024-03-15 (a Friday with an odd
//! day-of-month) so odd-even and weekday rules behave predictably, and to
//! central Delhi coordinates so distances are urban-scale.

use chrono::{DateTime, NaiveTime, TimeZone, Utc};
use geo::Coord;

use crate::{
    CapacitySpec, Hub, HubClass, HubStatus, Shipment, TimeWindow, Utilisation, Vehicle,
    VehicleCategory,
};

/// 10:00 UTC on the anchor date.
#[must_use]
pub fn anchor_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 15, 10, 0, 0).unwrap()
}

/// A 10:00-18:00 operation window on the anchor date.
#[must_use]
pub fn sample_window() -> TimeWindow {
    TimeWindow::new(
        anchor_time(),
        Utc.with_ymd_and_hms(2024, 3, 15, 18, 0, 0).unwrap(),
    )
    .expect("anchor window is ordered")
}

/// An available van with the given capacity, parked near Connaught
/// Place. The plate ends in an odd digit, so it is odd-even compliant on
/// the anchor date.
#[must_use]
pub fn sample_vehicle(id: &str, weight_kg: f64, volume_m3: f64) -> Vehicle {
    let mut vehicle = Vehicle::new(
        id,
        VehicleCategory::Van,
        CapacitySpec::new(weight_kg, volume_m3),
        Coord { x: 77.2167, y: 28.6315 },
    );
    vehicle.plate = format!("DL01{}1233", id.replace('-', ""));
    vehicle
}

/// A shared-service shipment from Karol Bagh to Lajpat Nagar within the
/// anchor window.
#[must_use]
pub fn sample_shipment(id: &str, weight_kg: f64, volume_m3: f64) -> Shipment {
    Shipment::new(
        id,
        Coord { x: 77.1900, y: 28.6519 },
        Coord { x: 77.2430, y: 28.5677 },
        sample_window(),
        weight_kg,
        volume_m3,
    )
}

/// An operational primary hub with spare capacity at the given position.
#[must_use]
pub fn sample_hub(id: &str, x: f64, y: f64) -> Hub {
    Hub {
        id: id.to_owned(),
        location: Coord { x, y },
        vehicle_capacity: Utilisation {
            current: 4.0,
            max: 20.0,
        },
        storage_capacity: Utilisation {
            current: 100.0,
            max: 1000.0,
        },
        buffer_vehicles: 3,
        opens: NaiveTime::from_hms_opt(6, 0, 0).expect("valid time"),
        closes: NaiveTime::from_hms_opt(22, 0, 0).expect("valid time"),
        class: HubClass::Primary,
        status: HubStatus::Operational,
    }
}
