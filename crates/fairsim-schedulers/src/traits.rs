//! Scheduling policy trait definitions.
//!
//! All policies implement the [`Scheduler`] trait. The simulator drives a
//! policy with three operations: `enqueue()` admits a request into the
//! tenant's queue, `pick_user()` selects the tenant to serve next, and
//! `pop()` removes the head request for the chosen tenant. Policies are
//! also told how many tenants exist (`set_users`) and can optionally accept
//! per-tenant weights or a byte quantum.

use serde::{Deserialize, Serialize};

/// Kind of I/O operation a request performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpKind {
    Read,
    Write,
}

/// A single I/O request flowing through the simulated device.
///
/// Requests are plain value records: the simulator copies them from the
/// trace into tenant queues and back out again on dispatch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    /// Tenant index this request belongs to.
    pub user_id: usize,
    /// Read or write.
    pub op: OpKind,
    /// Arrival timestamp in simulation seconds.
    pub arrival_ts: f64,
    /// Request size in bytes. May be zero.
    pub size_bytes: u32,
}

/// The core scheduling policy trait.
///
/// Contract: after `pick_user()` returns `Some(uid)`, `pop(uid)` must
/// return a request. Requests within one tenant's queue are always served
/// in FIFO order. `pick_user` is allowed to mutate policy state (deficit
/// round-robin accrues byte credit on every call), so repeated calls
/// without an intervening `pop` need not return the same tenant.
pub trait Scheduler: Send + Sync {
    /// Establish `n` tenant slots, discarding any prior queue state.
    fn set_users(&mut self, n: usize);

    /// Optional per-tenant weights. Ignored by policies that do not weight.
    fn set_weights(&mut self, _weights: &[f64]) {}

    /// Optional byte quantum. Ignored by policies that do not quantize.
    fn set_quantum(&mut self, _quantum: f64) {}

    /// Admit a request into the queue indexed by its `user_id`. Requests
    /// whose tenant id is out of range are silently dropped.
    fn enqueue(&mut self, request: Request);

    /// Select the next tenant to serve, if any.
    fn pick_user(&mut self, now: f64) -> Option<usize>;

    /// Remove and return the head request for `uid`. `None` means the
    /// queue is empty or the id is out of range.
    fn pop(&mut self, uid: usize) -> Option<Request>;

    /// True iff every tenant queue is empty.
    fn is_empty(&self) -> bool;

    /// Policy name for reports.
    fn name(&self) -> &str;
}
