//! FairSim CLI — replay I/O traces against multi-tenant SSD schedulers.

use clap::{Parser, Subcommand};
use fairsim_core::config::{self, SimConfig};
use fairsim_core::metrics;
use fairsim_core::trace;
use fairsim_schedulers::{OpKind, Request, Scheduler};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(
    name = "fairsim",
    about = "Study scheduling fairness on a simulated multi-channel SSD",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a simulation with a single scheduling policy.
    Run {
        /// Path to TOML configuration file.
        #[arg(long)]
        config: Option<PathBuf>,
        /// Path to trace file.
        #[arg(short, long)]
        trace: Option<PathBuf>,
        /// Scheduling policy: rr, drr, qfq, or sgfs.
        #[arg(short, long)]
        scheduler: Option<String>,
        /// DRR byte quantum.
        #[arg(short, long)]
        quantum: Option<f64>,
        /// Override the tenant count inferred from the trace.
        #[arg(short, long)]
        users: Option<usize>,
        /// Number of device channels.
        #[arg(short, long)]
        channels: Option<usize>,
        /// Aggregate read bandwidth in MB/s.
        #[arg(short = 'r', long = "read-bw")]
        read_bw: Option<f64>,
        /// Aggregate write bandwidth in MB/s.
        #[arg(short = 'w', long = "write-bw")]
        write_bw: Option<f64>,
        /// Comma-separated per-tenant weights.
        #[arg(short = 'W', long)]
        weights: Option<String>,
        /// SGFS: selections between rotations.
        #[arg(long = "rotate-every")]
        rotate_every: Option<usize>,
        /// SGFS: rotation stride.
        #[arg(long)]
        gap: Option<usize>,
        /// Where to write the per-tenant result CSV.
        #[arg(long)]
        results: Option<PathBuf>,
        /// Write the full report as JSON.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Compare several policies on the same trace.
    Compare {
        /// Path to TOML configuration file.
        #[arg(long)]
        config: Option<PathBuf>,
        /// Path to trace file.
        #[arg(short, long)]
        trace: Option<PathBuf>,
        /// Comma-separated list of policy names (default: all).
        #[arg(short = 'S', long, value_delimiter = ',')]
        schedulers: Vec<String>,
        /// Write the full reports as JSON.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Generate a synthetic multi-tenant trace.
    GenTrace {
        /// Number of tenants.
        #[arg(long, default_value = "4")]
        users: usize,
        /// Number of requests.
        #[arg(long, default_value = "1000")]
        requests: u64,
        /// Request size in bytes.
        #[arg(long, default_value = "4096")]
        size: u32,
        /// Maximum inter-arrival gap in microseconds.
        #[arg(long = "max-gap-us", default_value = "1000")]
        max_gap_us: u64,
        /// RNG seed.
        #[arg(long, default_value = "42")]
        seed: u64,
        /// Output file path.
        #[arg(short, long)]
        output: PathBuf,
    },
    /// List available scheduling policies.
    ListSchedulers,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            trace: trace_path,
            scheduler,
            quantum,
            users,
            channels,
            read_bw,
            write_bw,
            weights,
            rotate_every,
            gap,
            results,
            output,
        } => {
            let mut cfg = load_config(config.as_deref());
            if let Some(path) = trace_path {
                cfg.trace.path = path.display().to_string();
            }
            if let Some(policy) = scheduler {
                cfg.scheduler.policy = policy;
            }
            if let Some(q) = quantum {
                cfg.scheduler.quantum = q;
            }
            if let Some(n) = users {
                cfg.trace.users = Some(n);
            }
            if let Some(c) = channels {
                cfg.device.channels = c;
            }
            if let Some(bw) = read_bw {
                cfg.device.read_bw_mbps = bw;
            }
            if let Some(bw) = write_bw {
                cfg.device.write_bw_mbps = bw;
            }
            if let Some(list) = weights {
                cfg.scheduler.weights = config::parse_weights(&list).unwrap_or_else(|e| {
                    eprintln!("Error parsing weights: {}", e);
                    std::process::exit(1);
                });
            }
            if let Some(n) = rotate_every {
                cfg.scheduler.rotate_every = n;
            }
            if let Some(n) = gap {
                cfg.scheduler.gap = n;
            }
            if let Some(path) = results {
                cfg.simulation.results_path = path.display().to_string();
            }
            if let Err(e) = cfg.validate() {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }

            let requests = load_requests(&cfg);
            let scheduler = build_scheduler(&cfg);
            let report = fairsim_core::run_simulation(&cfg, requests, scheduler);

            println!("{}", metrics::format_table(&report));
            println!("Simulation complete.");
            println!("Fairness Index: {:.4}", report.fairness_index);

            let results_path = Path::new(&cfg.simulation.results_path);
            match report.write_csv(results_path) {
                Ok(()) => println!("Results saved to {}", results_path.display()),
                Err(e) => eprintln!(
                    "Warning: failed to write {}: {}",
                    results_path.display(),
                    e
                ),
            }

            if let Some(output_path) = output {
                let json = serde_json::to_string_pretty(&report).unwrap();
                std::fs::write(&output_path, json).unwrap_or_else(|e| {
                    eprintln!("Error writing output: {}", e);
                    std::process::exit(1);
                });
                println!("Report written to {}", output_path.display());
            }
        }
        Commands::Compare {
            config,
            trace: trace_path,
            schedulers,
            output,
        } => {
            let mut cfg = load_config(config.as_deref());
            if let Some(path) = trace_path {
                cfg.trace.path = path.display().to_string();
            }

            let requests = load_requests(&cfg);
            let names: Vec<&str> = if schedulers.is_empty() {
                fairsim_schedulers::available_schedulers()
            } else {
                schedulers.iter().map(|s| s.as_str()).collect()
            };
            for name in &names {
                if fairsim_core::build_scheduler(name, &cfg).is_none() {
                    eprintln!(
                        "Unknown scheduler policy: {}. Available: {:?}",
                        name,
                        fairsim_schedulers::available_schedulers()
                    );
                    std::process::exit(1);
                }
            }

            let reports = fairsim_core::compare_schedulers(&cfg, &requests, &names);
            println!("{}", metrics::format_comparison_table(&reports));
            for report in &reports {
                println!("{}", metrics::format_table(report));
            }

            if let Some(output_path) = output {
                let json = serde_json::to_string_pretty(&reports).unwrap();
                std::fs::write(&output_path, json).unwrap_or_else(|e| {
                    eprintln!("Error writing output: {}", e);
                    std::process::exit(1);
                });
                println!("Reports written to {}", output_path.display());
            }
        }
        Commands::GenTrace {
            users,
            requests,
            size,
            max_gap_us,
            seed,
            output,
        } => {
            use rand::{Rng, SeedableRng};
            use rand_chacha::ChaCha8Rng;

            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let mut generated = Vec::with_capacity(requests as usize);
            let mut ts_us: u64 = 0;
            for _ in 0..requests {
                let user_id = rng.gen_range(0..users.max(1));
                let op = if rng.gen_bool(0.5) {
                    OpKind::Read
                } else {
                    OpKind::Write
                };
                generated.push(Request {
                    user_id,
                    op,
                    arrival_ts: ts_us as f64 / 1_000_000.0,
                    size_bytes: size,
                });
                ts_us += rng.gen_range(1..=max_gap_us.max(1));
            }

            trace::write_trace_csv(&generated, &output).unwrap_or_else(|e| {
                eprintln!("Error writing trace: {}", e);
                std::process::exit(1);
            });
            println!(
                "Generated {} requests to {}",
                generated.len(),
                output.display()
            );
        }
        Commands::ListSchedulers => {
            println!("Available scheduling policies:");
            for name in fairsim_schedulers::available_schedulers() {
                println!("  - {}", name);
            }
        }
    }
}

fn load_config(path: Option<&Path>) -> SimConfig {
    match path {
        Some(p) => SimConfig::from_file(p).unwrap_or_else(|e| {
            eprintln!("Error loading config: {}", e);
            std::process::exit(1);
        }),
        None => SimConfig::default(),
    }
}

fn load_requests(cfg: &SimConfig) -> Vec<Request> {
    trace::load_trace(Path::new(&cfg.trace.path)).unwrap_or_else(|e| {
        eprintln!("Error loading trace: {}", e);
        std::process::exit(1);
    })
}

fn build_scheduler(cfg: &SimConfig) -> Box<dyn Scheduler> {
    fairsim_core::build_scheduler(&cfg.scheduler.policy, cfg).unwrap_or_else(|| {
        eprintln!(
            "Unknown scheduler policy: {}. Available: {:?}",
            cfg.scheduler.policy,
            fairsim_schedulers::available_schedulers()
        );
        std::process::exit(1);
    })
}
