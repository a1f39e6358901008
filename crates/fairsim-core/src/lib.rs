//! FairSim — Discrete-event simulator for multi-tenant SSD scheduling.
//!
//! This crate provides the simulation core: the channel service model, the
//! event loop, trace ingestion, and per-tenant metrics. Scheduling policies
//! from `fairsim-schedulers` are plugged in to decide which tenant's
//! request is served next.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────┐     ┌───────────┐     ┌──────────────┐
//! │  Trace   │────▶│  Engine   │────▶│   Metrics    │
//! │ Ingestion│     │ (Events)  │     │  Collection  │
//! └──────────┘     └─────┬─────┘     └──────────────┘
//!                        │
//!                ┌───────┴───────┐
//!                │   Scheduler   │
//!                │  (Fairness)   │
//!                └───────┬───────┘
//!                        │
//!          ┌─────────────┼─────────────┐
//!          ▼             ▼             ▼
//!    ┌──────────┐  ┌──────────┐  ┌──────────┐
//!    │ Channel 0│  │ Channel 1│  │ Channel N│
//!    │  free_at │  │  free_at │  │  free_at │
//!    └──────────┘  └──────────┘  └──────────┘
//! ```

pub mod clock;
pub mod config;
pub mod device;
pub mod engine;
pub mod events;
pub mod metrics;
pub mod request;
pub mod trace;

// Re-export key types for convenience.
pub use clock::SimClock;
pub use config::SimConfig;
pub use device::SsdDevice;
pub use engine::SimulationEngine;
pub use events::{CompletionEvent, EventQueue};
pub use metrics::{MetricsCollector, SimulationReport};
pub use request::ActiveRequest;
pub use trace::load_trace;

use fairsim_schedulers::{Request, Scheduler, StartGap, WeightedFair};

/// Build a policy by name, threading the config knobs that matter at
/// construction time: `sgfs` composes a weighted-fair base with the
/// configured rotation parameters. `None` for an unknown name.
pub fn build_scheduler(name: &str, config: &SimConfig) -> Option<Box<dyn Scheduler>> {
    if name == "sgfs" {
        let base = Box::new(WeightedFair::new());
        return Some(Box::new(StartGap::with_rotation(
            base,
            config.scheduler.rotate_every,
            config.scheduler.gap,
        )));
    }
    fairsim_schedulers::scheduler_by_name(name)
}

/// Run a complete simulation with the given config, trace, and policy.
pub fn run_simulation(
    config: &SimConfig,
    requests: Vec<Request>,
    scheduler: Box<dyn Scheduler>,
) -> SimulationReport {
    let mut engine = SimulationEngine::new(config, scheduler);
    engine.load_trace(requests);
    engine.run()
}

/// Run several policies over the same trace and config.
pub fn compare_schedulers(
    config: &SimConfig,
    requests: &[Request],
    names: &[&str],
) -> Vec<SimulationReport> {
    names
        .iter()
        .filter_map(|name| {
            let scheduler = build_scheduler(name, config)?;
            Some(run_simulation(config, requests.to_vec(), scheduler))
        })
        .collect()
}
