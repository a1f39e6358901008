//! Channel service model for the simulated SSD.
//!
//! The device is a fixed array of channels, each tracked by a single
//! `free_at` timestamp. Service time follows a fluid-bandwidth model: the
//! aggregate read or write bandwidth is split evenly across channels and a
//! request of B bytes occupies a channel for `B / per_channel_rate`
//! seconds. There is no command queue inside a channel and no
//! address-based channel mapping.

use fairsim_schedulers::{OpKind, Request};

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

fn per_channel_bytes_per_sec(bw_mbps: f64, channels: usize) -> f64 {
    if channels == 0 {
        return 0.0;
    }
    bw_mbps / channels as f64 * BYTES_PER_MB
}

/// Availability timeline of one channel.
#[derive(Debug, Clone, Copy, Default)]
struct ChannelState {
    /// Absolute time at which the channel becomes idle. Monotonically
    /// non-decreasing over the life of the simulation.
    free_at: f64,
}

/// A multi-channel SSD with per-channel fluid service times.
#[derive(Debug, Clone)]
pub struct SsdDevice {
    channels: Vec<ChannelState>,
    read_rate_bps: f64,
    write_rate_bps: f64,
}

impl SsdDevice {
    /// Build a device with `channels` parallel service units sharing the
    /// given aggregate bandwidths (in MB/s, 1 MB = 2^20 bytes).
    pub fn new(channels: usize, read_bw_mbps: f64, write_bw_mbps: f64) -> Self {
        Self {
            channels: vec![ChannelState::default(); channels],
            read_rate_bps: per_channel_bytes_per_sec(read_bw_mbps, channels),
            write_rate_bps: per_channel_bytes_per_sec(write_bw_mbps, channels),
        }
    }

    /// Dispatch `request` onto `channel` at time `now`, returning the
    /// completion time. Service begins at `max(now, free_at)`.
    ///
    /// # Panics
    ///
    /// Panics if `channel` is out of range. The engine only dispatches to
    /// indices returned by [`first_free_channel`](Self::first_free_channel).
    pub fn dispatch(&mut self, channel: usize, request: &Request, now: f64) -> f64 {
        let service = self.service_time_s(request.op, request.size_bytes);
        let state = &mut self.channels[channel];
        let start = now.max(state.free_at);
        state.free_at = start + service;
        state.free_at
    }

    /// Lowest-index channel idle at `now`, if any. The deterministic
    /// first-fit scan keeps traces reproducible; channel counts are small
    /// enough that a linear scan is the right tool.
    pub fn first_free_channel(&self, now: f64) -> Option<usize> {
        self.channels.iter().position(|c| c.free_at <= now)
    }

    /// Service time in seconds for an operation of `bytes`. Zero when the
    /// per-channel rate is zero.
    pub fn service_time_s(&self, op: OpKind, bytes: u32) -> f64 {
        let rate = match op {
            OpKind::Read => self.read_rate_bps,
            OpKind::Write => self.write_rate_bps,
        };
        if rate <= 0.0 {
            return 0.0;
        }
        f64::from(bytes) / rate
    }

    pub fn read_service_time_s(&self, bytes: u32) -> f64 {
        self.service_time_s(OpKind::Read, bytes)
    }

    pub fn write_service_time_s(&self, bytes: u32) -> f64 {
        self.service_time_s(OpKind::Write, bytes)
    }

    /// Whether channel `idx` is idle at `now`. False for invalid indices.
    pub fn is_free(&self, idx: usize, now: f64) -> bool {
        self.channels.get(idx).is_some_and(|c| c.free_at <= now)
    }

    /// Timestamp at which channel `idx` becomes idle. Zero for invalid
    /// indices; useful for debugging and visualization.
    pub fn free_at(&self, idx: usize) -> f64 {
        self.channels.get(idx).map_or(0.0, |c| c.free_at)
    }

    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }
}
