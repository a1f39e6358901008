//! Completion event queue.
//!
//! A min-heap over completion times built on `BinaryHeap` with an
//! inverted ordering. Ties on time are broken by insertion sequence so the
//! pop order is fully deterministic.

use crate::request::ActiveRequest;
use std::collections::BinaryHeap;

/// A single completion notification emitted by the device.
#[derive(Debug, Clone)]
pub struct CompletionEvent {
    /// Completion timestamp in seconds.
    pub time: f64,
    /// Channel whose request finished.
    pub channel: usize,
    /// The request, carrying its runtime timestamps.
    pub request: ActiveRequest,
}

#[derive(Debug, Clone)]
struct QueuedCompletion {
    sequence: u64,
    event: CompletionEvent,
}

impl PartialEq for QueuedCompletion {
    fn eq(&self, other: &Self) -> bool {
        self.event.time == other.event.time && self.sequence == other.sequence
    }
}

impl Eq for QueuedCompletion {}

impl PartialOrd for QueuedCompletion {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueuedCompletion {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // BinaryHeap is a max-heap; invert for earliest-first ordering.
        other
            .event
            .time
            .total_cmp(&self.event.time)
            .then(other.sequence.cmp(&self.sequence))
    }
}

/// Pending completion events ordered by ascending completion time.
#[derive(Debug, Clone, Default)]
pub struct EventQueue {
    heap: BinaryHeap<QueuedCompletion>,
    sequence: u64,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: CompletionEvent) {
        self.heap.push(QueuedCompletion {
            sequence: self.sequence,
            event,
        });
        self.sequence += 1;
    }

    /// The earliest pending event, if any.
    pub fn peek(&self) -> Option<&CompletionEvent> {
        self.heap.peek().map(|q| &q.event)
    }

    /// Remove and return the earliest pending event.
    pub fn pop(&mut self) -> Option<CompletionEvent> {
        self.heap.pop().map(|q| q.event)
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }
}
