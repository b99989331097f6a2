//! Routing solvers for the Fleetroute core.
//!
//! The primary Clarke-Wright savings solver, the hub-and-spoke engine
//! for oversized loads, the premium dedicated allocator and three
//! fallback heuristics, all driven through the [`dispatch`] entry
//! points. Every solver consumes the shared travel matrix and
//! feasibility engine from `fleetroute-core` and produces the same
//! route artifacts.

#![forbid(unsafe_code)]

pub mod dispatch;
pub mod fallback;
pub mod hub;
mod plan;
pub mod premium;
pub mod savings;

pub use dispatch::{optimize, optimize_hub_and_spoke, Dispatcher};
pub use fallback::{
    compare_with_primary, emergency_routing, greedy_assignment, nearest_neighbor,
    FallbackConfig, HeuristicComparison,
};
pub use hub::{hub_and_spoke, HubSpokeOutcome};
pub use premium::{premium_dedicated, premium_eligible, PremiumOutcome};
pub use savings::{SavingsOutcome, SavingsSolver};
