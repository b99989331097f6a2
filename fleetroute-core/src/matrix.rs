//! Travel matrix over a flat location index.
//!
//! Vehicles, per-shipment pickup/delivery pairs and hubs are flattened
//! into one index space; pairwise haversine distances and piecewise
//! travel durations are fully precomputed per optimisation call. Nothing
//! is persisted: vehicle and shipment sets change between calls.

use geo::Coord;
use thiserror::Error;

use crate::distance::{haversine_km, travel_minutes};
use crate::{Hub, Shipment, Vehicle};

/// Errors from [`TravelMatrix::build`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatrixError {
    /// No locations to index: both vehicle and shipment lists are empty.
    #[error("cannot build a travel matrix without any locations")]
    EmptyInput,
}

/// Resolves domain entities to slots in the flat index space.
///
/// Layout: vehicles first, then `pickup,delivery` pairs per shipment in
/// input order, then hubs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocationIndex {
    vehicles: usize,
    shipments: usize,
    hubs: usize,
}

/// What a flat index slot refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// Start position of vehicle `i` (input order).
    Vehicle(usize),
    /// Pickup location of shipment `i`.
    Pickup(usize),
    /// Delivery location of shipment `i`.
    Delivery(usize),
    /// Location of hub `i`.
    Hub(usize),
}

impl LocationIndex {
    /// Index layout for the given entity counts.
    #[must_use]
    pub const fn new(vehicles: usize, shipments: usize, hubs: usize) -> Self {
        Self {
            vehicles,
            shipments,
            hubs,
        }
    }

    /// Total slot count.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.vehicles + 2 * self.shipments + self.hubs
    }

    /// Whether the index is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Slot of vehicle `i`.
    #[must_use]
    pub const fn vehicle(&self, i: usize) -> usize {
        i
    }

    /// Slot of shipment `i`'s pickup.
    #[must_use]
    pub const fn pickup(&self, i: usize) -> usize {
        self.vehicles + 2 * i
    }

    /// Slot of shipment `i`'s delivery.
    #[must_use]
    pub const fn delivery(&self, i: usize) -> usize {
        self.vehicles + 2 * i + 1
    }

    /// Slot of hub `i`.
    #[must_use]
    pub const fn hub(&self, i: usize) -> usize {
        self.vehicles + 2 * self.shipments + i
    }

    /// Reverse lookup: what entity does a flat slot refer to?
    #[must_use]
    pub const fn resolve(&self, slot: usize) -> Option<Slot> {
        if slot < self.vehicles {
            return Some(Slot::Vehicle(slot));
        }
        let offset = slot - self.vehicles;
        if offset < 2 * self.shipments {
            let shipment = offset / 2;
            if offset % 2 == 0 {
                return Some(Slot::Pickup(shipment));
            }
            return Some(Slot::Delivery(shipment));
        }
        let hub = offset - 2 * self.shipments;
        if hub < self.hubs {
            return Some(Slot::Hub(hub));
        }
        None
    }
}

/// Precomputed pairwise distances and durations.
///
/// Invariants: square, fully populated, zero diagonal for both distance
/// and duration. Symmetry is not enforced; the duration model happens to
/// be symmetric but callers must not rely on it.
#[derive(Debug, Clone, PartialEq)]
pub struct TravelMatrix {
    index: LocationIndex,
    coords: Vec<Coord<f64>>,
    distance_km: Vec<Vec<f64>>,
    duration_min: Vec<Vec<f64>>,
}

impl TravelMatrix {
    /// Flatten the inputs and compute all pairwise distances/durations.
    pub fn build(
        vehicles: &[Vehicle],
        shipments: &[Shipment],
        hubs: &[Hub],
    ) -> Result<Self, MatrixError> {
        let index = LocationIndex::new(vehicles.len(), shipments.len(), hubs.len());
        if index.is_empty() {
            return Err(MatrixError::EmptyInput);
        }

        let mut coords = Vec::with_capacity(index.len());
        coords.extend(vehicles.iter().map(|v| v.location));
        for shipment in shipments {
            coords.push(shipment.pickup);
            coords.push(shipment.delivery);
        }
        coords.extend(hubs.iter().map(|h| h.location));

        let n = coords.len();
        let mut distance_km = vec![vec![0.0; n]; n];
        let mut duration_min = vec![vec![0.0; n]; n];
        for i in 0..n {
            for j in 0..n {
                if i == j {
                    continue;
                }
                let km = haversine_km(coords[i], coords[j]);
                distance_km[i][j] = km;
                duration_min[i][j] = travel_minutes(km);
            }
        }

        Ok(Self {
            index,
            coords,
            distance_km,
            duration_min,
        })
    }

    /// The index layout this matrix was built over.
    #[must_use]
    pub const fn index(&self) -> &LocationIndex {
        &self.index
    }

    /// Distance in kilometres between two slots.
    #[must_use]
    pub fn distance(&self, from: usize, to: usize) -> f64 {
        self.distance_km[from][to]
    }

    /// Travel duration in minutes between two slots.
    #[must_use]
    pub fn duration(&self, from: usize, to: usize) -> f64 {
        self.duration_min[from][to]
    }

    /// Coordinate stored at a slot.
    #[must_use]
    pub fn coord_at(&self, slot: usize) -> Coord<f64> {
        self.coords[slot]
    }

    /// Total slot count.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether the matrix has no slots.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}
