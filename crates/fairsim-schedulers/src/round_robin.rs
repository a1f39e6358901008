//! Round-robin scheduling policy.
//!
//! The simplest policy: a rotating cursor cycles through tenant queues,
//! serving one request from the first non-empty queue it finds. Purely
//! slot-based; request sizes are ignored.

use crate::traits::*;
use std::collections::VecDeque;

/// Round-robin scheduler.
pub struct RoundRobin {
    queues: Vec<VecDeque<Request>>,
    next: usize,
}

impl RoundRobin {
    pub fn new() -> Self {
        Self {
            queues: Vec::new(),
            next: 0,
        }
    }
}

impl Default for RoundRobin {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for RoundRobin {
    fn set_users(&mut self, n: usize) {
        self.queues = vec![VecDeque::new(); n];
        self.next = 0;
    }

    fn enqueue(&mut self, request: Request) {
        if let Some(queue) = self.queues.get_mut(request.user_id) {
            queue.push_back(request);
        }
    }

    fn pick_user(&mut self, _now: f64) -> Option<usize> {
        let n = self.queues.len();
        for i in 0..n {
            let candidate = (self.next + i) % n;
            if !self.queues[candidate].is_empty() {
                self.next = (candidate + 1) % n;
                return Some(candidate);
            }
        }
        None
    }

    fn pop(&mut self, uid: usize) -> Option<Request> {
        self.queues.get_mut(uid)?.pop_front()
    }

    fn is_empty(&self) -> bool {
        self.queues.iter().all(|q| q.is_empty())
    }

    fn name(&self) -> &str {
        "rr"
    }
}
