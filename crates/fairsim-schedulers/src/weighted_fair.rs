//! Weighted-fair queuing policy (virtual-time finish tags).
//!
//! Approximates WFQ by stamping every admitted request with a finish tag
//! `max(last_finish, V) + size / weight` and always serving the smallest
//! head tag. The virtual-time scalar V only moves forward, so tags grow
//! without bound on long runs; that is a modelling artifact, not a bug.

use crate::traits::*;
use std::collections::VecDeque;

const MIN_WEIGHT: f64 = 1e-9;

struct TaggedRequest {
    request: Request,
    finish_tag: f64,
}

/// Weighted-fair scheduler.
pub struct WeightedFair {
    queues: Vec<VecDeque<TaggedRequest>>,
    weights: Vec<f64>,
    last_finish: Vec<f64>,
    virtual_time: f64,
    active_flows: usize,
}

impl WeightedFair {
    pub fn new() -> Self {
        Self {
            queues: Vec::new(),
            weights: Vec::new(),
            last_finish: Vec::new(),
            virtual_time: 0.0,
            active_flows: 0,
        }
    }
}

impl Default for WeightedFair {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for WeightedFair {
    fn set_users(&mut self, n: usize) {
        self.queues = Vec::new();
        self.queues.resize_with(n, VecDeque::new);
        self.weights = vec![1.0; n];
        self.last_finish = vec![0.0; n];
        self.active_flows = 0;
    }

    /// Applies only once queues are sized; weights are floored at 1e-9 to
    /// keep the finish-tag division finite.
    fn set_weights(&mut self, weights: &[f64]) {
        if self.queues.is_empty() {
            return;
        }
        for (i, slot) in self.weights.iter_mut().enumerate() {
            *slot = match weights.get(i) {
                Some(&w) => w.max(MIN_WEIGHT),
                None => 1.0,
            };
        }
    }

    fn enqueue(&mut self, request: Request) {
        let uid = request.user_id;
        if uid >= self.queues.len() {
            return;
        }

        let weight = self.weights[uid];
        let start_tag = self.last_finish[uid].max(self.virtual_time);
        let finish_tag = start_tag + f64::from(request.size_bytes) / weight;
        self.last_finish[uid] = finish_tag;

        let was_empty = self.queues[uid].is_empty();
        self.queues[uid].push_back(TaggedRequest {
            request,
            finish_tag,
        });
        if was_empty {
            self.active_flows += 1;
        }
    }

    /// Serves the tenant with the smallest head tag; ties go to the lowest
    /// tenant id.
    fn pick_user(&mut self, now: f64) -> Option<usize> {
        if self.active_flows == 0 {
            return None;
        }
        self.virtual_time = self.virtual_time.max(now);

        let mut best_uid = None;
        let mut best_finish = f64::INFINITY;
        for (uid, queue) in self.queues.iter().enumerate() {
            if let Some(head) = queue.front() {
                if head.finish_tag < best_finish {
                    best_finish = head.finish_tag;
                    best_uid = Some(uid);
                }
            }
        }
        best_uid
    }

    fn pop(&mut self, uid: usize) -> Option<Request> {
        let tagged = self.queues.get_mut(uid)?.pop_front()?;
        if self.queues[uid].is_empty() {
            self.active_flows -= 1;
        }
        Some(tagged.request)
    }

    fn is_empty(&self) -> bool {
        self.queues.iter().all(|q| q.is_empty())
    }

    fn name(&self) -> &str {
        "qfq"
    }
}
