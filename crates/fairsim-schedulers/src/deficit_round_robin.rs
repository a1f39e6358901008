//! Deficit round-robin scheduling policy.
//!
//! Enforces byte-level fairness: each tenant carries a deficit counter that
//! accrues quantum credit on every selection round and pays for dispatched
//! bytes. A tenant is only eligible when its accrued credit covers its head
//! request, so tenants issuing large requests wait through extra rounds
//! while small-request tenants proceed.

use crate::traits::*;
use std::collections::VecDeque;

const DEFAULT_QUANTUM: f64 = 4096.0;

/// Deficit round-robin scheduler.
pub struct DeficitRoundRobin {
    queues: Vec<VecDeque<Request>>,
    deficit: Vec<i64>,
    weights: Vec<f64>,
    quantum: f64,
    next: usize,
}

impl DeficitRoundRobin {
    pub fn new() -> Self {
        Self {
            queues: Vec::new(),
            deficit: Vec::new(),
            weights: Vec::new(),
            quantum: DEFAULT_QUANTUM,
            next: 0,
        }
    }
}

impl Default for DeficitRoundRobin {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for DeficitRoundRobin {
    fn set_users(&mut self, n: usize) {
        self.queues = vec![VecDeque::new(); n];
        self.deficit = vec![0; n];
        self.weights = vec![1.0; n];
        self.next = 0;
    }

    fn set_quantum(&mut self, quantum: f64) {
        if quantum > 0.0 {
            self.quantum = quantum;
        }
    }

    /// Weights reset to 1.0 before the provided values are copied, so a
    /// vector shorter than the tenant count leaves the tail at the default.
    fn set_weights(&mut self, weights: &[f64]) {
        if self.queues.is_empty() {
            return;
        }
        self.weights = vec![1.0; self.queues.len()];
        for (slot, &w) in self.weights.iter_mut().zip(weights.iter()) {
            *slot = w.max(0.0);
        }
    }

    fn enqueue(&mut self, request: Request) {
        if let Some(queue) = self.queues.get_mut(request.user_id) {
            queue.push_back(request);
        }
    }

    /// Grants every scanned tenant one round of credit, returning the first
    /// whose deficit covers its head request. Tenants that do not pass keep
    /// the credit they accrued, so this call is deliberately not idempotent.
    fn pick_user(&mut self, _now: f64) -> Option<usize> {
        let n = self.queues.len();
        for i in 0..n {
            let uid = (self.next + i) % n;
            if self.queues[uid].is_empty() {
                continue;
            }

            let credit = ((self.quantum * self.weights[uid]).floor() as i64).max(1);
            self.deficit[uid] += credit;

            let head = &self.queues[uid][0];
            if self.deficit[uid] >= i64::from(head.size_bytes) {
                self.next = (uid + 1) % n;
                return Some(uid);
            }
        }
        None
    }

    fn pop(&mut self, uid: usize) -> Option<Request> {
        let request = self.queues.get_mut(uid)?.pop_front()?;
        self.deficit[uid] = (self.deficit[uid] - i64::from(request.size_bytes)).max(0);
        Some(request)
    }

    fn is_empty(&self) -> bool {
        self.queues.iter().all(|q| q.is_empty())
    }

    fn name(&self) -> &str {
        "drr"
    }
}
