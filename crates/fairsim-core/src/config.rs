//! TOML configuration for FairSim.
//!
//! Defines the configuration schema for simulation runs: device shape,
//! scheduling policy and its knobs, and the trace source. Every field has
//! a default, so an empty config is a valid starting point for CLI
//! overrides.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Validation(String),
}

/// Top-level simulation configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimConfig {
    #[serde(default)]
    pub simulation: SimulationSection,
    #[serde(default)]
    pub device: DeviceSection,
    #[serde(default)]
    pub scheduler: SchedulerSection,
    #[serde(default)]
    pub trace: TraceSection,
}

/// General run parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationSection {
    /// Human-readable name for this run.
    #[serde(default = "default_sim_name")]
    pub name: String,
    /// Where the per-tenant result CSV is written.
    #[serde(default = "default_results_path")]
    pub results_path: String,
}

impl Default for SimulationSection {
    fn default() -> Self {
        Self {
            name: default_sim_name(),
            results_path: default_results_path(),
        }
    }
}

fn default_sim_name() -> String {
    "simulation".to_string()
}

fn default_results_path() -> String {
    "results.csv".to_string()
}

/// Device shape: channel count and aggregate bandwidths.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceSection {
    /// Number of parallel channels.
    #[serde(default = "default_channels")]
    pub channels: usize,
    /// Aggregate read bandwidth in MB/s (1 MB = 2^20 bytes).
    #[serde(default = "default_read_bw")]
    pub read_bw_mbps: f64,
    /// Aggregate write bandwidth in MB/s.
    #[serde(default = "default_write_bw")]
    pub write_bw_mbps: f64,
}

impl Default for DeviceSection {
    fn default() -> Self {
        Self {
            channels: default_channels(),
            read_bw_mbps: default_read_bw(),
            write_bw_mbps: default_write_bw(),
        }
    }
}

fn default_channels() -> usize {
    8
}
fn default_read_bw() -> f64 {
    2000.0
}
fn default_write_bw() -> f64 {
    1200.0
}

/// Scheduling policy selection and knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerSection {
    /// One of `rr`, `drr`, `qfq`, `sgfs`.
    #[serde(default = "default_policy")]
    pub policy: String,
    /// DRR byte quantum.
    #[serde(default = "default_quantum")]
    pub quantum: f64,
    /// Per-tenant weights; empty means all 1.0.
    #[serde(default)]
    pub weights: Vec<f64>,
    /// SGFS: selections between rotations.
    #[serde(default = "default_rotate_every")]
    pub rotate_every: usize,
    /// SGFS: rotation stride.
    #[serde(default = "default_gap")]
    pub gap: usize,
}

impl Default for SchedulerSection {
    fn default() -> Self {
        Self {
            policy: default_policy(),
            quantum: default_quantum(),
            weights: Vec::new(),
            rotate_every: default_rotate_every(),
            gap: default_gap(),
        }
    }
}

fn default_policy() -> String {
    "qfq".to_string()
}
fn default_quantum() -> f64 {
    4096.0
}
fn default_rotate_every() -> usize {
    200
}
fn default_gap() -> usize {
    1
}

/// Trace source configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceSection {
    /// Path to the trace file.
    #[serde(default = "default_trace_path")]
    pub path: String,
    /// Override the tenant count inferred from the trace.
    #[serde(default)]
    pub users: Option<usize>,
}

impl Default for TraceSection {
    fn default() -> Self {
        Self {
            path: default_trace_path(),
            users: None,
        }
    }
}

fn default_trace_path() -> String {
    "traces/example.csv".to_string()
}

impl SimConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Result<Self, ConfigError> {
        let config: SimConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration consistency.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if fairsim_schedulers::scheduler_by_name(&self.scheduler.policy).is_none() {
            return Err(ConfigError::Validation(format!(
                "unknown scheduler policy: {} (available: {:?})",
                self.scheduler.policy,
                fairsim_schedulers::available_schedulers(),
            )));
        }
        if !self.device.read_bw_mbps.is_finite() || self.device.read_bw_mbps < 0.0 {
            return Err(ConfigError::Validation(
                "read_bw_mbps must be finite and non-negative".to_string(),
            ));
        }
        if !self.device.write_bw_mbps.is_finite() || self.device.write_bw_mbps < 0.0 {
            return Err(ConfigError::Validation(
                "write_bw_mbps must be finite and non-negative".to_string(),
            ));
        }
        if self.scheduler.weights.iter().any(|w| !w.is_finite()) {
            return Err(ConfigError::Validation(
                "weights must be finite".to_string(),
            ));
        }
        Ok(())
    }
}

/// Parse the CLI's comma-separated weight list.
pub fn parse_weights(s: &str) -> Result<Vec<f64>, ConfigError> {
    s.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(|token| {
            token.parse::<f64>().map_err(|e| {
                ConfigError::Validation(format!("unparseable weight '{}': {}", token, e))
            })
        })
        .collect()
}
