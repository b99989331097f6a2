//! Consolidation hub model.
//!
//! The core reads hub capacity and availability to score assignments; it
//! never mutates hub state. Assignments are advisory and applied by the
//! hub-management collaborator.

use chrono::NaiveTime;
use geo::Coord;
use serde::{Deserialize, Serialize};

/// Hub tier within the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HubClass {
    /// Major consolidation site.
    Primary,
    /// Satellite site.
    Secondary,
}

/// Hub operational status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HubStatus {
    /// Accepting transfers.
    Operational,
    /// Temporarily not accepting work.
    Suspended,
}

/// Current versus maximum utilisation of a hub resource.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Utilisation {
    /// Units currently in use.
    pub current: f64,
    /// Maximum units.
    pub max: f64,
}

impl Utilisation {
    /// Unused fraction in `[0, 1]`; zero when `max` is zero.
    #[must_use]
    pub fn free_fraction(&self) -> f64 {
        if self.max <= 0.0 {
            0.0
        } else {
            ((self.max - self.current) / self.max).clamp(0.0, 1.0)
        }
    }
}

/// A consolidation hub.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hub {
    /// Unique hub identifier.
    pub id: String,
    /// Hub position (longitude `x`, latitude `y`).
    pub location: Coord<f64>,
    /// Vehicle bays in use versus total.
    pub vehicle_capacity: Utilisation,
    /// Storage floor in use versus total, in cubic metres.
    pub storage_capacity: Utilisation,
    /// Spare vehicles stationed at the hub.
    pub buffer_vehicles: u32,
    /// Daily opening time.
    pub opens: NaiveTime,
    /// Daily closing time.
    pub closes: NaiveTime,
    /// Hub tier.
    pub class: HubClass,
    /// Operational status.
    pub status: HubStatus,
}

impl Hub {
    /// Whether the hub currently accepts transfers.
    #[must_use]
    pub fn is_operational(&self) -> bool {
        self.status == HubStatus::Operational
    }

    /// Class contribution used by hub-assignment scoring.
    #[must_use]
    pub const fn class_score(&self) -> f64 {
        match self.class {
            HubClass::Primary => 100.0,
            HubClass::Secondary => 75.0,
        }
    }
}
