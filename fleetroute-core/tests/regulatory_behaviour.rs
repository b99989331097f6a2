//! Regulatory feasibility behaviour over realistic Delhi scenarios.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use fleetroute_core::feasibility::{
    check_access, odd_even_compliance, shipment_feasible, ClockWindow, KeywordZoneClassifier,
    ZoneKind,
};
use fleetroute_core::{
    CapacitySpec, Shipment, TimeWindow, Vehicle, VehicleCategory,
};
use geo::Coord;
use rstest::rstest;

fn truck(plate: &str) -> Vehicle {
    let mut vehicle = Vehicle::new(
        "TRK-1",
        VehicleCategory::Truck,
        CapacitySpec::new(2000.0, 10.0),
        Coord { x: 77.2167, y: 28.6315 },
    );
    vehicle.plate = plate.to_owned();
    vehicle
}

fn at(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 15, hour, 0, 0)
        .single()
        .expect("valid time")
}

fn residential_shipment(window: TimeWindow) -> Shipment {
    let mut shipment = Shipment::new(
        "S1",
        Coord { x: 77.1900, y: 28.6519 },
        Coord { x: 77.2430, y: 28.5677 },
        window,
        500.0,
        1.0,
    );
    shipment.pickup_address = "Karol Bagh residential colony".to_owned();
    shipment.delivery_address = "Defence Colony, block C".to_owned();
    shipment
}

#[rstest]
fn truck_in_residential_zone_at_two_am_is_turned_away() {
    let decision = check_access(&truck("DL01AB1233"), ZoneKind::Residential, at(2));

    assert!(!decision.allowed);
    assert_eq!(
        decision.restricted_window,
        Some(ClockWindow::from_hours(23, 7))
    );
    assert_eq!(decision.alternatives, vec![ClockWindow::from_hours(7, 23)]);
}

#[rstest]
fn same_truck_is_welcome_at_noon() {
    assert!(check_access(&truck("DL01AB1233"), ZoneKind::Residential, at(12)).allowed);
}

#[rstest]
fn odd_plate_on_an_odd_date_is_compliant() {
    // 2024-03-15: odd day-of-month.
    let date = NaiveDate::from_ymd_opt(2024, 3, 15).expect("valid date");
    let decision = odd_even_compliance("DL01AB1233", date);

    assert!(decision.compliant);
    assert!(decision.odd_plate);
    assert!(decision.odd_date);
    assert_eq!(decision.exemption, None);
}

#[rstest]
fn odd_even_check_is_idempotent() {
    let date = NaiveDate::from_ymd_opt(2024, 3, 16).expect("valid date");
    let first = odd_even_compliance("DL01AB1233", date);
    for _ in 0..3 {
        assert_eq!(odd_even_compliance("DL01AB1233", date), first);
    }
}

#[rstest]
fn night_residential_shipment_is_infeasible_for_a_truck() {
    let window = TimeWindow::new(at(2), at(6)).expect("ordered window");
    let shipment = residential_shipment(window);

    assert!(!shipment_feasible(
        &truck("DL01AB1233"),
        &shipment,
        &KeywordZoneClassifier,
        at(2)
    ));
    // The same triple is admissible at mid-day.
    assert!(shipment_feasible(
        &truck("DL01AB1233"),
        &shipment,
        &KeywordZoneClassifier,
        at(12)
    ));
}

#[rstest]
fn even_plate_truck_is_infeasible_on_an_odd_date() {
    let window = TimeWindow::new(at(10), at(18)).expect("ordered window");
    let shipment = residential_shipment(window);

    assert!(!shipment_feasible(
        &truck("DL01AB1234"),
        &shipment,
        &KeywordZoneClassifier,
        at(12)
    ));
}
