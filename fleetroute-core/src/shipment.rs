//! Shipment (delivery order) model and load-split fragments.

use geo::Coord;
use serde::{Deserialize, Serialize};

use crate::TimeWindow;

/// Delivery urgency tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    /// Deferred delivery; may be bumped by anything else.
    Low,
    /// Default tier.
    Medium,
    /// Same-day expectation.
    High,
    /// Time-critical.
    Urgent,
}

impl Priority {
    /// Multiplier applied to assignment scores by the greedy fallback.
    #[must_use]
    pub const fn score_factor(self) -> f64 {
        match self {
            Self::Urgent => 2.0,
            Self::High => 1.5,
            Self::Medium => 1.0,
            Self::Low => 0.8,
        }
    }
}

/// Requested service mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceKind {
    /// Load may share a vehicle with other shipments.
    Shared,
    /// Dedicated premium: one vehicle exclusively for this shipment.
    Premium,
}

/// A shipment to move from pickup to delivery within a time window.
///
/// Shipments are immutable for the duration of one optimisation call.
/// Load splitting derives new shipment records via [`Shipment::fragment`];
/// fragments carry the original id in [`Shipment::split_from`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shipment {
    /// Unique shipment identifier.
    pub id: String,
    /// Pickup position (longitude `x`, latitude `y`).
    pub pickup: Coord<f64>,
    /// Delivery position.
    pub delivery: Coord<f64>,
    /// Free-text pickup address, used for zone classification.
    pub pickup_address: String,
    /// Free-text delivery address.
    pub delivery_address: String,
    /// Earliest/latest service window.
    pub window: TimeWindow,
    /// Load weight in kilograms.
    pub weight_kg: f64,
    /// Load volume in cubic metres.
    pub volume_m3: f64,
    /// Requires careful handling.
    pub fragile: bool,
    /// Contains regulated hazardous goods.
    pub hazardous: bool,
    /// Urgency tier.
    pub priority: Priority,
    /// Owning customer identifier.
    pub customer_id: String,
    /// Requested service mode.
    pub service: ServiceKind,
    /// Id of the original shipment when this record is a split fragment.
    pub split_from: Option<String>,
}

impl Shipment {
    /// A shared-service shipment with medium priority and no handling
    /// flags.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        pickup: Coord<f64>,
        delivery: Coord<f64>,
        window: TimeWindow,
        weight_kg: f64,
        volume_m3: f64,
    ) -> Self {
        Self {
            id: id.into(),
            pickup,
            delivery,
            pickup_address: String::new(),
            delivery_address: String::new(),
            window,
            weight_kg,
            volume_m3,
            fragile: false,
            hazardous: false,
            priority: Priority::Medium,
            customer_id: String::new(),
            service: ServiceKind::Shared,
            split_from: None,
        }
    }

    /// Whether this record was produced by load splitting.
    #[must_use]
    pub const fn is_fragment(&self) -> bool {
        self.split_from.is_some()
    }

    /// The id load-split fragments should reference: the original id for
    /// fragments, this shipment's own id otherwise.
    #[must_use]
    pub fn origin_id(&self) -> &str {
        self.split_from.as_deref().unwrap_or(&self.id)
    }

    /// Derive a split fragment carrying `weight_kg`/`volume_m3` of the
    /// original load. The fragment id is the original id with a
    /// `-part<seq>` suffix, and `split_from` references the original.
    #[must_use]
    pub fn fragment(&self, seq: usize, weight_kg: f64, volume_m3: f64) -> Self {
        Self {
            id: format!("{}-part{seq}", self.origin_id()),
            weight_kg,
            volume_m3,
            split_from: Some(self.origin_id().to_owned()),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rstest::rstest;

    fn shipment() -> Shipment {
        let window = TimeWindow::new(
            Utc.with_ymd_and_hms(2024, 3, 15, 9, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 15, 18, 0, 0).unwrap(),
        )
        .unwrap();
        Shipment::new(
            "SHP-1",
            Coord { x: 77.20, y: 28.61 },
            Coord { x: 77.25, y: 28.65 },
            window,
            900.0,
            3.0,
        )
    }

    #[rstest]
    fn fragment_references_original() {
        let fragment = shipment().fragment(1, 450.0, 1.5);
        assert_eq!(fragment.id, "SHP-1-part1");
        assert_eq!(fragment.split_from.as_deref(), Some("SHP-1"));
        assert_eq!(fragment.weight_kg, 450.0);
        assert_eq!(fragment.volume_m3, 1.5);
    }

    #[rstest]
    fn fragment_of_fragment_keeps_root_id() {
        let first = shipment().fragment(1, 450.0, 1.5);
        let second = first.fragment(2, 200.0, 0.7);
        assert_eq!(second.id, "SHP-1-part2");
        assert_eq!(second.split_from.as_deref(), Some("SHP-1"));
    }

    #[rstest]
    #[case(Priority::Urgent, 2.0)]
    #[case(Priority::Low, 0.8)]
    fn priority_factors(#[case] priority: Priority, #[case] factor: f64) {
        assert_eq!(priority.score_factor(), factor);
    }
}
