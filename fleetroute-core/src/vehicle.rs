//! Fleet vehicle model.
//!
//! Vehicles are read-only inputs to an optimisation call: the core never
//! mutates fleet state, it only filters and scores vehicles. Mutation
//! belongs to the fleet-management collaborator.

use geo::Coord;
use serde::{Deserialize, Serialize};

use crate::feasibility::ZoneKind;

/// Broad vehicle class used for capacity defaults, fuel rates and
/// regulatory gating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleCategory {
    /// Heavy goods vehicle; subject to time-of-day zone restrictions.
    Truck,
    /// Light commercial carrier.
    Tempo,
    /// Delivery van.
    Van,
    /// Three-wheeled cargo carrier.
    ThreeWheeler,
    /// Battery-electric vehicle of any size.
    Electric,
}

/// Operational status reported by the fleet-status provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleStatus {
    /// Ready for assignment.
    Available,
    /// Currently executing a route.
    InTransit,
    /// At a hub or depot being loaded.
    Loading,
    /// Scheduled or unscheduled maintenance.
    Maintenance,
    /// Broken down; requires recovery.
    Breakdown,
}

/// Drivetrain, as recorded on the registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FuelKind {
    /// Diesel engine.
    Diesel,
    /// Petrol engine.
    Petrol,
    /// Compressed natural gas.
    Cng,
    /// Battery electric.
    Electric,
}

/// Emission tier ladder. Ordering is meaningful: a vehicle is admitted to
/// a pollution-controlled zone only when its tier is at least the zone's
/// required tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PollutionTier {
    /// Bharat Stage 3.
    Bs3,
    /// Bharat Stage 4.
    Bs4,
    /// Bharat Stage 6.
    Bs6,
    /// Zero tailpipe emissions.
    Electric,
}

/// External cargo dimensions in metres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Length in metres.
    pub length_m: f64,
    /// Width in metres.
    pub width_m: f64,
    /// Height in metres.
    pub height_m: f64,
}

/// Weight and volume capacity of a vehicle, with optional dimension
/// ceilings for zone checks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CapacitySpec {
    /// Maximum payload weight in kilograms.
    pub weight_kg: f64,
    /// Maximum payload volume in cubic metres.
    pub volume_m3: f64,
    /// Outer dimensions, when known.
    pub max_dimensions: Option<Dimensions>,
}

impl CapacitySpec {
    /// Capacity with no recorded dimensions.
    #[must_use]
    pub const fn new(weight_kg: f64, volume_m3: f64) -> Self {
        Self {
            weight_kg,
            volume_m3,
            max_dimensions: None,
        }
    }

    /// Whether a load of the given weight and volume fits outright.
    #[must_use]
    pub fn fits(&self, weight_kg: f64, volume_m3: f64) -> bool {
        weight_kg <= self.weight_kg && volume_m3 <= self.volume_m3
    }
}

/// Regulatory compliance flags carried on the registration documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Compliance {
    /// Pollution-under-control certificate is current.
    pub pollution_certificate: bool,
    /// Certified emission tier.
    pub pollution_tier: PollutionTier,
    /// Commercial permit is valid.
    pub permit_valid: bool,
}

/// A fleet vehicle as seen by the routing core.
///
/// # Examples
/// ```
/// use fleetroute_core::{CapacitySpec, Vehicle, VehicleCategory};
/// use geo::Coord;
///
/// let vehicle = Vehicle::new(
///     "DL-01-1234",
///     VehicleCategory::Van,
///     CapacitySpec::new(800.0, 4.0),
///     Coord { x: 77.21, y: 28.64 },
/// );
/// assert!(vehicle.is_available());
/// assert!(vehicle.can_carry(500.0, 2.0));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    /// Unique fleet identifier; by convention the registration number.
    pub id: String,
    /// Vehicle class.
    pub category: VehicleCategory,
    /// Payload limits.
    pub capacity: CapacitySpec,
    /// Current position (longitude `x`, latitude `y`).
    pub location: Coord<f64>,
    /// Operational status.
    pub status: VehicleStatus,
    /// Registration compliance flags.
    pub compliance: Compliance,
    /// Number plate, e.g. `"DL01AB1234"`.
    pub plate: String,
    /// Drivetrain.
    pub fuel: FuelKind,
    /// Vehicle age in whole years.
    pub age_years: u8,
    /// Zone kinds this vehicle holds access privileges for.
    pub zone_access: Vec<ZoneKind>,
    /// Emergency-service vehicle; exempt from time-of-day restrictions.
    pub emergency: bool,
    /// Essential-service (medical, utilities) exemption flag.
    pub essential_service: bool,
    /// Assigned driver, when one is rostered.
    pub driver_id: Option<String>,
}

impl Vehicle {
    /// A ready-to-route vehicle with permissive defaults: available,
    /// diesel, BS6, three years old, access to every zone kind.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        category: VehicleCategory,
        capacity: CapacitySpec,
        location: Coord<f64>,
    ) -> Self {
        let id = id.into();
        Self {
            plate: id.clone(),
            id,
            category,
            capacity,
            location,
            status: VehicleStatus::Available,
            compliance: Compliance {
                pollution_certificate: true,
                pollution_tier: PollutionTier::Bs6,
                permit_valid: true,
            },
            fuel: FuelKind::Diesel,
            age_years: 3,
            zone_access: vec![
                ZoneKind::Residential,
                ZoneKind::Industrial,
                ZoneKind::Commercial,
                ZoneKind::Mixed,
            ],
            emergency: false,
            essential_service: false,
            driver_id: None,
        }
    }

    /// Whether the vehicle can take new assignments.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.status == VehicleStatus::Available
    }

    /// Whether the payload fits within weight and volume limits.
    #[must_use]
    pub fn can_carry(&self, weight_kg: f64, volume_m3: f64) -> bool {
        self.capacity.fits(weight_kg, volume_m3)
    }

    /// Whether the vehicle holds access privileges for `zone`.
    #[must_use]
    pub fn has_zone_access(&self, zone: ZoneKind) -> bool {
        self.zone_access.contains(&zone)
    }

    /// Effective emission tier: an electric drivetrain always counts as
    /// the top tier, regardless of what the certificate records.
    #[must_use]
    pub fn effective_tier(&self) -> PollutionTier {
        if self.fuel == FuelKind::Electric || self.category == VehicleCategory::Electric {
            PollutionTier::Electric
        } else {
            self.compliance.pollution_tier
        }
    }

    /// Condition score in `[0, 100]`, decaying ten points per year of age.
    #[must_use]
    pub fn condition_score(&self) -> f64 {
        (100.0 - f64::from(self.age_years) * 10.0).max(0.0)
    }

    /// Relative drivetrain fuel-efficiency score in `[0, 100]`.
    #[must_use]
    pub fn fuel_efficiency_score(&self) -> f64 {
        match self.fuel {
            FuelKind::Electric => 100.0,
            FuelKind::Cng => 80.0,
            FuelKind::Petrol => 60.0,
            FuelKind::Diesel => 50.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn van() -> Vehicle {
        Vehicle::new(
            "DL-01-0001",
            VehicleCategory::Van,
            CapacitySpec::new(800.0, 4.0),
            Coord { x: 77.2, y: 28.6 },
        )
    }

    #[rstest]
    #[case(800.0, 4.0, true)]
    #[case(800.1, 4.0, false)]
    #[case(500.0, 4.1, false)]
    fn capacity_bounds_are_inclusive(
        #[case] weight: f64,
        #[case] volume: f64,
        #[case] fits: bool,
    ) {
        assert_eq!(van().can_carry(weight, volume), fits);
    }

    #[rstest]
    fn electric_drivetrain_overrides_certified_tier() {
        let mut vehicle = van();
        vehicle.compliance.pollution_tier = PollutionTier::Bs3;
        vehicle.fuel = FuelKind::Electric;
        assert_eq!(vehicle.effective_tier(), PollutionTier::Electric);
    }

    #[rstest]
    fn condition_score_floors_at_zero() {
        let mut vehicle = van();
        vehicle.age_years = 25;
        assert_eq!(vehicle.condition_score(), 0.0);
    }

    #[rstest]
    fn tier_ordering_matches_ladder() {
        assert!(PollutionTier::Bs3 < PollutionTier::Bs4);
        assert!(PollutionTier::Bs4 < PollutionTier::Bs6);
        assert!(PollutionTier::Bs6 < PollutionTier::Electric);
    }
}
