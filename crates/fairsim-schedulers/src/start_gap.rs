//! Start-gap fair-sharing wrapper.
//!
//! Wraps any base scheduler and periodically rotates the logical identity
//! of the tenants it reports, emulating spatial fair sharing across device
//! channels. Every `rotate_every` selections the rotation origin advances
//! by `gap` slots, and the returned tenant id is the base's choice shifted
//! by the current origin.

use crate::traits::*;
use std::collections::HashMap;

const DEFAULT_ROTATE_EVERY: usize = 200;
const DEFAULT_GAP: usize = 1;

/// Start-gap wrapper over an owned base scheduler.
///
/// Known limitation: the logical-to-actual mapping recorded by
/// `pick_user` is only erased by the next `pop` of that logical id. A
/// `pop` for an id that was never produced is delegated unchanged, and an
/// entry that is never popped lingers until overwritten.
pub struct StartGap {
    base: Box<dyn Scheduler>,
    rotate_every: usize,
    gap: usize,
    rotate_count: usize,
    start: usize,
    users: usize,
    remap: HashMap<usize, usize>,
}

impl StartGap {
    pub fn new(base: Box<dyn Scheduler>) -> Self {
        Self {
            base,
            rotate_every: DEFAULT_ROTATE_EVERY,
            gap: DEFAULT_GAP,
            rotate_count: 0,
            start: 0,
            users: 0,
            remap: HashMap::new(),
        }
    }

    pub fn with_rotation(base: Box<dyn Scheduler>, rotate_every: usize, gap: usize) -> Self {
        let mut wrapper = Self::new(base);
        wrapper.set_rotation(rotate_every, gap);
        wrapper
    }

    /// Both parameters are clamped to at least 1.
    pub fn set_rotation(&mut self, rotate_every: usize, gap: usize) {
        self.rotate_every = rotate_every.max(1);
        self.gap = gap.max(1);
    }

    /// Current rotation origin.
    pub fn rotation_start(&self) -> usize {
        self.start
    }
}

impl Scheduler for StartGap {
    fn set_users(&mut self, n: usize) {
        self.users = n;
        self.base.set_users(n);
        self.remap.clear();
        self.rotate_count = 0;
        self.start = 0;
    }

    fn set_weights(&mut self, weights: &[f64]) {
        self.base.set_weights(weights);
    }

    fn set_quantum(&mut self, quantum: f64) {
        self.base.set_quantum(quantum);
    }

    fn enqueue(&mut self, request: Request) {
        self.base.enqueue(request);
    }

    fn pick_user(&mut self, now: f64) -> Option<usize> {
        if self.users == 0 {
            return None;
        }
        let actual = self.base.pick_user(now)?;

        self.rotate_count += 1;
        if self.rotate_count >= self.rotate_every {
            self.start = (self.start + self.gap) % self.users;
            self.rotate_count = 0;
        }

        let mapped = (actual + self.start) % self.users;
        self.remap.insert(mapped, actual);
        Some(mapped)
    }

    fn pop(&mut self, uid: usize) -> Option<Request> {
        let actual = self.remap.remove(&uid).unwrap_or(uid);
        self.base.pop(actual)
    }

    fn is_empty(&self) -> bool {
        self.base.is_empty()
    }

    fn name(&self) -> &str {
        "sgfs"
    }
}
