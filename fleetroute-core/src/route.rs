//! Route output artifacts.
//!
//! A [`Route`] is the sole output of an optimisation call: an ordered
//! stop sequence for one vehicle with aggregate distance, duration and
//! fuel-cost estimates, plus metadata recording how it was produced.

use chrono::{DateTime, Utc};
use geo::Coord;
use serde::{Deserialize, Serialize};

/// How the route was produced and what it represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteKind {
    /// Point-to-point pickup and delivery.
    Direct,
    /// Hub-to-hub consolidation leg.
    HubTransfer,
    /// Hub-to-door last-mile leg.
    HubDelivery,
    /// Exclusive premium allocation.
    PremiumDedicated,
}

/// What happens at a stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopKind {
    /// Collect a shipment.
    Pickup,
    /// Hand over a shipment.
    Delivery,
    /// Call at a consolidation hub.
    Hub,
    /// Pass-through point with no service.
    Waypoint,
}

/// Execution status of a stop. Routes are emitted with every stop
/// pending; the monitoring collaborator advances these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopStatus {
    /// Not yet visited.
    Pending,
    /// Service completed.
    Completed,
    /// Skipped by the driver or dispatcher.
    Skipped,
}

/// One stop on a route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteStop {
    /// Zero-based position in the stop sequence.
    pub sequence: u32,
    /// Stop position (longitude `x`, latitude `y`).
    pub location: Coord<f64>,
    /// Service performed at this stop.
    pub kind: StopKind,
    /// Serviced shipment, for pickup/delivery stops.
    pub shipment_id: Option<String>,
    /// Visited hub, for hub stops.
    pub hub_id: Option<String>,
    /// Estimated arrival.
    pub eta: DateTime<Utc>,
    /// Estimated departure.
    pub etd: DateTime<Utc>,
    /// On-site service time in minutes.
    pub service_minutes: f64,
    /// Execution status.
    pub status: StopStatus,
}

/// Identifies which algorithm produced a route or result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    /// Clarke-Wright savings heuristic.
    ClarkeWrightSavings,
    /// Hub-and-spoke engine.
    HubAndSpoke,
    /// Premium dedicated allocation.
    PremiumDedicated,
    /// Nearest-neighbour fallback.
    NearestNeighbor,
    /// Greedy pair-scoring fallback.
    GreedyAssignment,
    /// Emergency one-shipment-per-vehicle fallback.
    EmergencyRouting,
}

impl Algorithm {
    /// Stable tag used in logs and serialized results.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ClarkeWrightSavings => "clarke_wright_savings",
            Self::HubAndSpoke => "hub_and_spoke",
            Self::PremiumDedicated => "premium_dedicated",
            Self::NearestNeighbor => "nearest_neighbor",
            Self::GreedyAssignment => "greedy_assignment",
            Self::EmergencyRouting => "emergency_routing",
        }
    }
}

impl std::fmt::Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a route was produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationMeta {
    /// Producing algorithm.
    pub algorithm: Algorithm,
    /// Objective value at the time the route was emitted.
    pub objective: f64,
    /// Constraint families that were enforced.
    pub constraints_applied: Vec<String>,
    /// Whether the route came from a fallback heuristic.
    pub fallback: bool,
}

/// A concrete stop-by-stop plan for one vehicle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    /// Route identifier, unique within one optimisation result.
    pub id: String,
    /// Assigned vehicle.
    pub vehicle_id: String,
    /// Ordered stops.
    pub stops: Vec<RouteStop>,
    /// Total driving distance in kilometres.
    pub distance_km: f64,
    /// Total driving plus service duration in minutes.
    pub duration_min: f64,
    /// Estimated fuel cost in currency units.
    pub fuel_cost: f64,
    /// Route category.
    pub kind: RouteKind,
    /// Whether every stop passed the feasibility engine at solve time.
    pub compliant: bool,
    /// Production metadata.
    pub meta: OptimizationMeta,
}

impl Route {
    /// An empty route shell for `vehicle_id`.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        vehicle_id: impl Into<String>,
        kind: RouteKind,
        algorithm: Algorithm,
    ) -> Self {
        Self {
            id: id.into(),
            vehicle_id: vehicle_id.into(),
            stops: Vec::new(),
            distance_km: 0.0,
            duration_min: 0.0,
            fuel_cost: 0.0,
            kind,
            compliant: true,
            meta: OptimizationMeta {
                algorithm,
                objective: 0.0,
                constraints_applied: Vec::new(),
                fallback: false,
            },
        }
    }

    /// Append a stop, assigning the next sequence number.
    pub fn push_stop(&mut self, mut stop: RouteStop) {
        stop.sequence = u32::try_from(self.stops.len()).unwrap_or(u32::MAX);
        self.stops.push(stop);
    }

    /// Ids of all shipments serviced on this route, in stop order,
    /// without duplicates.
    #[must_use]
    pub fn shipment_ids(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for stop in &self.stops {
            if let Some(id) = stop.shipment_id.as_deref() {
                if !seen.contains(&id) {
                    seen.push(id);
                }
            }
        }
        seen
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn stop(shipment: Option<&str>) -> RouteStop {
        RouteStop {
            sequence: 99,
            location: Coord { x: 77.2, y: 28.6 },
            kind: StopKind::Pickup,
            shipment_id: shipment.map(str::to_owned),
            hub_id: None,
            eta: Utc::now(),
            etd: Utc::now(),
            service_minutes: 10.0,
            status: StopStatus::Pending,
        }
    }

    #[rstest]
    fn push_stop_renumbers_sequence() {
        let mut route = Route::new(
            "R1",
            "V1",
            RouteKind::Direct,
            Algorithm::ClarkeWrightSavings,
        );
        route.push_stop(stop(Some("S1")));
        route.push_stop(stop(Some("S2")));
        let sequences: Vec<u32> = route.stops.iter().map(|s| s.sequence).collect();
        assert_eq!(sequences, vec![0, 1]);
    }

    #[rstest]
    fn shipment_ids_deduplicates_in_order() {
        let mut route = Route::new(
            "R1",
            "V1",
            RouteKind::Direct,
            Algorithm::ClarkeWrightSavings,
        );
        route.push_stop(stop(Some("S1")));
        route.push_stop(stop(Some("S2")));
        route.push_stop(stop(Some("S1")));
        route.push_stop(stop(None));
        assert_eq!(route.shipment_ids(), vec!["S1", "S2"]);
    }
}
