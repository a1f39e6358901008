//! Fairness scheduling policies for FairSim.
//!
//! This crate provides the [`Scheduler`] trait and the built-in policies
//! used to arbitrate between tenants sharing a simulated SSD:
//!
//! | Policy | Strategy | Best For |
//! |--------|----------|----------|
//! | [`RoundRobin`] | Rotate through tenant slots | Uniform request sizes |
//! | [`DeficitRoundRobin`] | Byte credit per round | Mixed request sizes |
//! | [`WeightedFair`] | Virtual-time finish tags | Weighted shares |
//! | [`StartGap`] | Identity rotation over a base policy | Spatial fair sharing |

pub mod deficit_round_robin;
pub mod round_robin;
pub mod start_gap;
pub mod traits;
pub mod weighted_fair;

pub use deficit_round_robin::DeficitRoundRobin;
pub use round_robin::RoundRobin;
pub use start_gap::StartGap;
pub use traits::*;
pub use weighted_fair::WeightedFair;

/// Create a scheduling policy by name.
///
/// `sgfs` composes a weighted-fair base with the default start-gap
/// rotation (200, 1); use [`StartGap::with_rotation`] for custom values.
pub fn scheduler_by_name(name: &str) -> Option<Box<dyn Scheduler>> {
    match name {
        "rr" => Some(Box::new(RoundRobin::new())),
        "drr" => Some(Box::new(DeficitRoundRobin::new())),
        "qfq" => Some(Box::new(WeightedFair::new())),
        "sgfs" => Some(Box::new(StartGap::new(Box::new(WeightedFair::new())))),
        _ => None,
    }
}

/// List all built-in policy names.
pub fn available_schedulers() -> Vec<&'static str> {
    vec!["rr", "drr", "qfq", "sgfs"]
}
