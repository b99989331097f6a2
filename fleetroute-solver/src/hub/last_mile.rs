//! Hub-to-door last-mile routes.
//!
//! Fragments are grouped by their assigned hub, then by pre-assigned
//! vehicle. Fragments without a pre-assignment are greedily bin-packed
//! into the remaining pool, largest weight/volume-ratio vehicles first.
//! Stop order within a route is repeated nearest-neighbour starting from
//! the hub. Hubs are independent, so route construction for the grouped
//! work runs on rayon and is joined before totals.

use std::collections::BTreeMap;

use rayon::prelude::*;

use fleetroute_core::distance::haversine_km;
use fleetroute_core::feasibility::{shipment_feasible, ZoneClassifier};
use fleetroute_core::{Algorithm, OptimizeRequest, Route, RouteKind, Shipment};

use crate::hub::HubFragment;
use crate::plan::{assemble_route, PlannedStop, RouteSpec, VehicleLoad};
use crate::savings::applied_constraints;

/// Routes plus ids of fragments no last-mile vehicle could take.
pub(crate) struct LastMileOutcome {
    pub routes: Vec<Route>,
    pub unassigned: Vec<String>,
}

/// Build last-mile delivery routes, consuming vehicles from `pool`.
///
/// Pre-assigned vehicles are honoured first; they were sized to their
/// fragments at split time. The rest of the fragments are packed into
/// whatever the pool still holds.
pub(crate) fn build_last_mile_routes(
    request: &OptimizeRequest,
    fragments: &[HubFragment],
    pool: &mut Vec<usize>,
    classifier: &dyn ZoneClassifier,
) -> LastMileOutcome {
    let at = request.window.earliest;
    // (hub, vehicle) -> fragments for that pairing.
    let mut groups: BTreeMap<(usize, usize), Vec<Shipment>> = BTreeMap::new();
    let mut unpacked: BTreeMap<usize, Vec<&HubFragment>> = BTreeMap::new();

    for fragment in fragments {
        match fragment.vehicle_idx {
            Some(v) => groups
                .entry((fragment.hub_idx, v))
                .or_default()
                .push(fragment.shipment.clone()),
            None => unpacked.entry(fragment.hub_idx).or_default().push(fragment),
        }
    }

    let mut unassigned = Vec::new();
    for (hub_idx, mut pending) in unpacked {
        // Largest carriers first: capacity weight per cubic metre.
        let mut carriers: Vec<usize> = pool
            .iter()
            .copied()
            .filter(|&v| request.vehicles[v].is_available())
            .collect();
        carriers.sort_by(|&a, &b| {
            let ra = capacity_ratio(request, a);
            let rb = capacity_ratio(request, b);
            rb.partial_cmp(&ra).unwrap_or(std::cmp::Ordering::Equal)
        });

        for v in carriers {
            if pending.is_empty() {
                break;
            }
            let vehicle = &request.vehicles[v];
            let mut load = VehicleLoad::default();
            let mut taken: Vec<Shipment> = Vec::new();
            pending.retain(|fragment| {
                let shipment = &fragment.shipment;
                if !load.fits(vehicle, shipment.weight_kg, shipment.volume_m3) {
                    return true;
                }
                if request.constraints.city_rules
                    && !shipment_feasible(vehicle, shipment, classifier, at)
                {
                    return true;
                }
                load.add(shipment.weight_kg, shipment.volume_m3);
                taken.push(shipment.clone());
                false
            });
            if taken.is_empty() {
                continue;
            }
            pool.retain(|&p| p != v);
            groups.entry((hub_idx, v)).or_default().extend(taken);
        }

        for fragment in pending {
            log::warn!(
                "last mile: no vehicle left for fragment {} at hub {}",
                fragment.shipment.id,
                request.hubs[fragment.hub_idx].id
            );
            unassigned.push(fragment.shipment.id.clone());
        }
    }

    let grouped: Vec<((usize, usize), Vec<Shipment>)> = groups.into_iter().collect();
    let routes: Vec<Route> = grouped
        .par_iter()
        .map(|((hub_idx, v), shipments)| delivery_route(request, *hub_idx, *v, shipments))
        .collect();

    LastMileOutcome { routes, unassigned }
}

fn capacity_ratio(request: &OptimizeRequest, v: usize) -> f64 {
    let capacity = &request.vehicles[v].capacity;
    if capacity.volume_m3 <= 0.0 {
        0.0
    } else {
        capacity.weight_kg / capacity.volume_m3
    }
}

/// One hub-delivery route: hub stop first, then deliveries by repeated
/// nearest-neighbour from the hub.
fn delivery_route(
    request: &OptimizeRequest,
    hub_idx: usize,
    v: usize,
    shipments: &[Shipment],
) -> Route {
    let hub = &request.hubs[hub_idx];
    let vehicle = &request.vehicles[v];

    let mut remaining: Vec<&Shipment> = shipments.iter().collect();
    let mut position = hub.location;
    let mut stops = vec![PlannedStop::hub(hub.location, &hub.id)];
    while !remaining.is_empty() {
        let (next, _) = remaining
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                let da = haversine_km(position, a.delivery);
                let db = haversine_km(position, b.delivery);
                da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|(i, s)| (i, *s))
            .unwrap_or((0, remaining[0]));
        let shipment = remaining.remove(next);
        stops.push(PlannedStop::delivery(shipment.delivery, &shipment.id));
        position = shipment.delivery;
    }

    let spec = RouteSpec {
        id: format!("lm-{}-{}", hub.id, vehicle.id),
        vehicle,
        kind: RouteKind::HubDelivery,
        algorithm: Algorithm::HubAndSpoke,
        fallback: false,
        constraints_applied: applied_constraints(request),
        start: request.window.earliest,
        premium: false,
    };
    assemble_route(&spec, &stops)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleetroute_core::test_support::{
        sample_hub, sample_shipment, sample_vehicle, sample_window,
    };
    use fleetroute_core::{KeywordZoneClassifier, StopKind};
    use geo::Coord;
    use rstest::rstest;

    fn fixture() -> (OptimizeRequest, Vec<HubFragment>) {
        let mut request = OptimizeRequest::new(
            vec![
                sample_vehicle("V1", 1000.0, 6.0),
                sample_vehicle("V2", 1000.0, 6.0),
            ],
            vec![sample_shipment("S1", 1500.0, 8.0)],
            sample_window(),
        );
        request.hubs = vec![sample_hub("HUB-A", 77.20, 28.62)];
        let base = request.shipments[0].clone();
        let fragments = vec![
            HubFragment {
                shipment: base.fragment(1, 800.0, 4.0),
                hub_idx: 0,
                source_hub_idx: 0,
                vehicle_idx: Some(0),
            },
            HubFragment {
                shipment: base.fragment(2, 700.0, 4.0),
                hub_idx: 0,
                source_hub_idx: 0,
                vehicle_idx: None,
            },
        ];
        (request, fragments)
    }

    #[rstest]
    fn honours_preassignment_and_packs_the_rest() {
        let (request, fragments) = fixture();
        let mut pool = vec![1];
        let outcome =
            build_last_mile_routes(&request, &fragments, &mut pool, &KeywordZoneClassifier);

        assert_eq!(outcome.routes.len(), 2);
        assert!(outcome.unassigned.is_empty());
        assert!(pool.is_empty());
        let vehicles: Vec<&str> = outcome
            .routes
            .iter()
            .map(|r| r.vehicle_id.as_str())
            .collect();
        assert!(vehicles.contains(&"V1"));
        assert!(vehicles.contains(&"V2"));
    }

    #[rstest]
    fn routes_start_at_the_hub() {
        let (request, fragments) = fixture();
        let mut pool = vec![1];
        let outcome =
            build_last_mile_routes(&request, &fragments, &mut pool, &KeywordZoneClassifier);

        for route in &outcome.routes {
            assert_eq!(route.kind, RouteKind::HubDelivery);
            assert_eq!(route.stops[0].kind, StopKind::Hub);
            assert_eq!(route.stops[0].hub_id.as_deref(), Some("HUB-A"));
        }
    }

    #[rstest]
    fn deliveries_follow_nearest_neighbour_order() {
        let (mut request, _) = fixture();
        let base = request.shipments[0].clone();
        let mut near = base.fragment(1, 300.0, 1.5);
        near.delivery = Coord { x: 77.21, y: 28.61 };
        let mut far = base.fragment(2, 300.0, 1.5);
        far.delivery = Coord { x: 77.40, y: 28.40 };
        request.vehicles = vec![sample_vehicle("V1", 1000.0, 6.0)];
        let fragments = vec![
            HubFragment {
                shipment: far,
                hub_idx: 0,
                source_hub_idx: 0,
                vehicle_idx: Some(0),
            },
            HubFragment {
                shipment: near,
                hub_idx: 0,
                source_hub_idx: 0,
                vehicle_idx: Some(0),
            },
        ];
        let mut pool = Vec::new();
        let outcome =
            build_last_mile_routes(&request, &fragments, &mut pool, &KeywordZoneClassifier);

        assert_eq!(outcome.routes.len(), 1);
        let stops = &outcome.routes[0].stops;
        assert_eq!(stops[1].shipment_id.as_deref(), Some("S1-part1"));
        assert_eq!(stops[2].shipment_id.as_deref(), Some("S1-part2"));
    }

    #[rstest]
    fn leftover_fragments_are_reported_unassigned() {
        let (request, mut fragments) = fixture();
        fragments[1].vehicle_idx = None;
        fragments[0].vehicle_idx = None;
        let mut pool = Vec::new();
        let outcome =
            build_last_mile_routes(&request, &fragments, &mut pool, &KeywordZoneClassifier);

        assert!(outcome.routes.is_empty());
        assert_eq!(outcome.unassigned.len(), 2);
    }
}
