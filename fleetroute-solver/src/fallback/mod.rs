//! Fallback heuristics invoked when the primary solver cannot produce a
//! feasible plan.
//!
//! All three heuristics share the feasibility engine and travel matrix
//! with the primary solver and return the same uniform
//! [`HeuristicResult`] shape, so a fallback plan can be compared directly
//! against a primary plan. Fallbacks may relax time-window and
//! hub-sequencing constraints but never capacity or legal access.

mod emergency;
mod greedy;
mod nearest;

pub use emergency::emergency_routing;
pub use greedy::greedy_assignment;
pub use nearest::nearest_neighbor;

use serde::{Deserialize, Serialize};

use fleetroute_core::{HeuristicResult, OptimizeResult};

/// Caller-supplied knobs for the fallback heuristics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FallbackConfig {
    /// Emergency routing rejects pairings whose direct distance exceeds
    /// this ceiling.
    pub max_direct_distance_km: Option<f64>,
    /// Emergency routing rejects pairings whose direct duration exceeds
    /// this ceiling.
    pub max_direct_duration_min: Option<f64>,
}

/// Relative quality of a fallback plan versus the primary solver's.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeuristicComparison {
    /// Percentage distance increase over the primary plan, when one
    /// exists.
    pub distance_delta_pct: Option<f64>,
    /// Percentage duration increase over the primary plan.
    pub duration_delta_pct: Option<f64>,
    /// Qualitative verdict.
    pub recommendation: String,
}

/// Fallback plans within this relative distance of the primary plan are
/// considered acceptable.
const ACCEPTABLE_DELTA_PCT: f64 = 25.0;

/// Compare a fallback result against the primary solver's, producing
/// relative deltas and a qualitative recommendation.
#[must_use]
pub fn compare_with_primary(
    heuristic: &HeuristicResult,
    primary: Option<&OptimizeResult>,
) -> HeuristicComparison {
    let Some(primary) = primary else {
        return HeuristicComparison {
            distance_delta_pct: None,
            duration_delta_pct: None,
            recommendation: "no primary result to compare against".to_owned(),
        };
    };

    let distance_delta_pct =
        relative_delta(heuristic.totals.distance_km, primary.totals.distance_km);
    let duration_delta_pct =
        relative_delta(heuristic.totals.duration_min, primary.totals.duration_min);

    let worst = distance_delta_pct
        .unwrap_or(0.0)
        .max(duration_delta_pct.unwrap_or(0.0));
    let recommendation = if !heuristic.feasible {
        "fallback infeasible; investigate solver issues".to_owned()
    } else if worst <= ACCEPTABLE_DELTA_PCT {
        "acceptable fallback".to_owned()
    } else {
        "investigate solver issues".to_owned()
    };

    HeuristicComparison {
        distance_delta_pct,
        duration_delta_pct,
        recommendation,
    }
}

fn relative_delta(heuristic: f64, primary: f64) -> Option<f64> {
    if primary <= 0.0 {
        None
    } else {
        Some((heuristic - primary) / primary * 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleetroute_core::{Algorithm, RouteTotals};
    use rstest::rstest;

    fn heuristic(distance: f64, duration: f64, feasible: bool) -> HeuristicResult {
        HeuristicResult {
            routes: Vec::new(),
            totals: RouteTotals {
                distance_km: distance,
                duration_min: duration,
                cost: 0.0,
            },
            algorithm: Algorithm::NearestNeighbor,
            processing_ms: 1,
            feasible,
            unassigned: Vec::new(),
        }
    }

    fn primary(distance: f64, duration: f64) -> OptimizeResult {
        OptimizeResult {
            success: true,
            routes: Vec::new(),
            totals: RouteTotals {
                distance_km: distance,
                duration_min: duration,
                cost: 0.0,
            },
            optimization_ms: 1,
            algorithm: Algorithm::ClarkeWrightSavings,
            objective: distance,
            message: None,
            fallback_used: false,
            unassigned: Vec::new(),
            premium: Vec::new(),
        }
    }

    #[rstest]
    fn close_fallback_is_acceptable() {
        let comparison =
            compare_with_primary(&heuristic(110.0, 660.0, true), Some(&primary(100.0, 600.0)));
        let delta = comparison.distance_delta_pct.expect("primary present");
        assert!((delta - 10.0).abs() < 1e-6);
        assert_eq!(comparison.recommendation, "acceptable fallback");
    }

    #[rstest]
    fn distant_fallback_warrants_investigation() {
        let comparison =
            compare_with_primary(&heuristic(200.0, 600.0, true), Some(&primary(100.0, 600.0)));
        assert_eq!(comparison.recommendation, "investigate solver issues");
    }

    #[rstest]
    fn missing_primary_yields_no_deltas() {
        let comparison = compare_with_primary(&heuristic(100.0, 600.0, true), None);
        assert_eq!(comparison.distance_delta_pct, None);
        assert!(comparison.recommendation.contains("no primary result"));
    }
}
