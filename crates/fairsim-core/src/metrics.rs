//! Per-tenant metrics collection and reporting.
//!
//! Tracks completed-request counts, latency sums, and bytes served per
//! tenant, and derives Jain's fairness index over the tenants that
//! actually moved data.

use crate::request::ActiveRequest;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::path::Path;

#[derive(Debug, Clone, Default)]
struct UserStats {
    completed: u64,
    total_latency_s: f64,
    bytes: u64,
}

/// Collects per-tenant throughput and latency statistics.
#[derive(Debug, Clone, Default)]
pub struct MetricsCollector {
    stats: Vec<UserStats>,
}

impl MetricsCollector {
    pub fn new(num_users: usize) -> Self {
        let mut collector = Self::default();
        collector.reset(num_users);
        collector
    }

    /// Prepare collectors for `num_users` tenants, discarding prior state.
    pub fn reset(&mut self, num_users: usize) {
        self.stats.clear();
        self.stats.resize_with(num_users, UserStats::default);
    }

    /// Ingest a completed request. Storage grows on demand if the request
    /// carries a tenant id beyond the current size.
    pub fn on_finish(&mut self, completed: &ActiveRequest) {
        let uid = completed.request.user_id;
        if uid >= self.stats.len() {
            self.stats.resize_with(uid + 1, UserStats::default);
        }

        let stats = &mut self.stats[uid];
        stats.completed += 1;
        stats.total_latency_s += completed.latency_s();
        stats.bytes += u64::from(completed.request.size_bytes);
    }

    pub fn num_users(&self) -> usize {
        self.stats.len()
    }

    /// Finished-request count for `user_id`; zero if out of range.
    pub fn completed(&self, user_id: usize) -> u64 {
        self.stats.get(user_id).map_or(0, |s| s.completed)
    }

    /// Mean latency in seconds for `user_id`; zero with no completions.
    pub fn avg_latency(&self, user_id: usize) -> f64 {
        match self.stats.get(user_id) {
            Some(s) if s.completed > 0 => s.total_latency_s / s.completed as f64,
            _ => 0.0,
        }
    }

    /// Bytes served for `user_id`; zero if out of range.
    pub fn total_bytes(&self, user_id: usize) -> u64 {
        self.stats.get(user_id).map_or(0, |s| s.bytes)
    }

    pub fn total_completed(&self) -> u64 {
        self.stats.iter().map(|s| s.completed).sum()
    }

    /// Jain's fairness index over tenants with non-zero byte totals.
    ///
    /// Idle tenants are excluded so unused slots do not depress the score.
    /// Zero when no tenant moved any bytes.
    pub fn fairness_index(&self) -> f64 {
        let mut sum = 0.0;
        let mut sum_sq = 0.0;
        let mut participants = 0usize;
        for s in &self.stats {
            if s.bytes == 0 {
                continue;
            }
            participants += 1;
            let x = s.bytes as f64;
            sum += x;
            sum_sq += x * x;
        }
        if participants == 0 || sum_sq == 0.0 {
            return 0.0;
        }
        (sum * sum) / (participants as f64 * sum_sq)
    }

    /// One summary row per tenant, in id order.
    pub fn user_summaries(&self) -> Vec<UserSummary> {
        self.stats
            .iter()
            .enumerate()
            .map(|(user_id, s)| UserSummary {
                user_id,
                completed: s.completed,
                avg_latency_s: self.avg_latency(user_id),
                total_bytes: s.bytes,
            })
            .collect()
    }
}

/// Per-tenant row of the final report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSummary {
    pub user_id: usize,
    pub completed: u64,
    pub avg_latency_s: f64,
    pub total_bytes: u64,
}

/// Aggregated result of one simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationReport {
    /// Policy name.
    pub scheduler: String,
    /// Number of tenant slots.
    pub num_users: usize,
    /// Requests in the trace, including any dropped on admission.
    pub total_requests: usize,
    /// Requests that completed service.
    pub completed_requests: u64,
    /// Requests dropped for carrying an unknown tenant id.
    pub dropped_requests: u64,
    /// Simulated time at which the run ended, in seconds.
    pub duration_s: f64,
    /// Jain's fairness index over non-idle tenants.
    pub fairness_index: f64,
    /// One row per tenant.
    pub per_user: Vec<UserSummary>,
}

impl SimulationReport {
    /// Write the per-tenant summary as CSV, creating parent directories so
    /// downstream tools can pick the file up from a fresh output tree.
    pub fn write_csv(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut out = String::from("user_id,completed,avg_latency_s,total_bytes\n");
        for row in &self.per_user {
            let _ = writeln!(
                out,
                "{},{},{},{}",
                row.user_id, row.completed, row.avg_latency_s, row.total_bytes
            );
        }
        std::fs::write(path, out)
    }
}

/// Format a report as a pretty-printed table string.
pub fn format_table(report: &SimulationReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\n{:=<64}", format!("  {} Results  ", report.scheduler));
    let _ = writeln!(
        out,
        "  Duration: {:.4}s | Requests: {} ({} completed, {} dropped)",
        report.duration_s, report.total_requests, report.completed_requests,
        report.dropped_requests,
    );
    let _ = writeln!(out, "{:-<64}", "  Per-tenant  ");
    for row in &report.per_user {
        let _ = writeln!(
            out,
            "  user {:<3} completed={:<8} avg latency={:>10.6}s  bytes={}",
            row.user_id, row.completed, row.avg_latency_s, row.total_bytes,
        );
    }
    let _ = writeln!(out, "{:-<64}", "");
    let _ = writeln!(out, "  Jain's fairness index: {:.4}", report.fairness_index);
    let _ = writeln!(out, "{:=<64}", "");
    out
}

/// Format a comparison table of multiple policy results.
pub fn format_comparison_table(reports: &[SimulationReport]) -> String {
    if reports.is_empty() {
        return String::from("No results to compare.\n");
    }

    let mut out = String::new();
    let _ = writeln!(out, "\n{:=<64}", "  Scheduler Comparison  ");
    let _ = writeln!(
        out,
        "{:<10} {:>10} {:>10} {:>14} {:>10}",
        "Scheduler", "Completed", "Dropped", "Duration (s)", "Jain's"
    );
    let _ = writeln!(out, "{:-<64}", "");
    for report in reports {
        let _ = writeln!(
            out,
            "{:<10} {:>10} {:>10} {:>14.4} {:>10.4}",
            report.scheduler,
            report.completed_requests,
            report.dropped_requests,
            report.duration_s,
            report.fairness_index,
        );
    }
    let _ = writeln!(out, "{:=<64}", "");
    out
}
