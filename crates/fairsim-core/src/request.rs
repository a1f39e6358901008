//! Runtime request state for the simulation.
//!
//! The scheduler queues plain [`Request`] values; once the engine
//! dispatches one onto a channel it gains runtime timestamps, carried by
//! [`ActiveRequest`] through the completion event into the metrics.

use fairsim_schedulers::Request;
use serde::{Deserialize, Serialize};

/// A request dispatched onto a channel, annotated with service timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveRequest {
    pub request: Request,
    /// Time the engine handed the request to a channel, in seconds.
    pub start_ts: f64,
    /// Time the channel finishes serving the request, in seconds.
    pub finish_ts: f64,
}

impl ActiveRequest {
    pub fn new(request: Request) -> Self {
        Self {
            request,
            start_ts: 0.0,
            finish_ts: 0.0,
        }
    }

    /// End-to-end latency in seconds, clamped at zero.
    pub fn latency_s(&self) -> f64 {
        (self.finish_ts - self.request.arrival_ts).max(0.0)
    }
}
