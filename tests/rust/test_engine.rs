/// Integration tests for the simulation engine.
use fairsim_core::config::SimConfig;
use fairsim_schedulers::{scheduler_by_name, OpKind, Request};

const MIB: u32 = 1 << 20;

fn read_at(user_id: usize, arrival_ts: f64, size_bytes: u32) -> Request {
    Request {
        user_id,
        op: OpKind::Read,
        arrival_ts,
        size_bytes,
    }
}

fn config(users: usize, channels: usize, read_bw: f64, write_bw: f64) -> SimConfig {
    let mut cfg = SimConfig::default();
    cfg.trace.users = Some(users);
    cfg.device.channels = channels;
    cfg.device.read_bw_mbps = read_bw;
    cfg.device.write_bw_mbps = write_bw;
    cfg
}

#[test]
fn test_round_robin_alternates_on_single_channel() {
    // Two tenants, one 1 MB/s channel, four 1 MiB requests at t=0.
    let cfg = config(2, 1, 1.0, 1.0);
    let trace = vec![
        read_at(0, 0.0, MIB),
        read_at(1, 0.0, MIB),
        read_at(0, 0.0, MIB),
        read_at(1, 0.0, MIB),
    ];
    let report = fairsim_core::run_simulation(&cfg, trace, scheduler_by_name("rr").unwrap());

    // Service alternates 0, 1, 0, 1 finishing at 1, 2, 3, 4 seconds.
    assert_eq!(report.completed_requests, 4);
    assert_eq!(report.per_user[0].completed, 2);
    assert_eq!(report.per_user[1].completed, 2);
    assert!((report.duration_s - 4.0).abs() < 1e-9);
    assert!((report.per_user[0].avg_latency_s - 2.0).abs() < 1e-9);
    assert!((report.per_user[1].avg_latency_s - 3.0).abs() < 1e-9);
    assert!((report.fairness_index - 1.0).abs() < 1e-9);
}

#[test]
fn test_drr_eventually_serves_large_request() {
    // Tenant 0 issues ten 1 KiB reads, tenant 1 a single 64 KiB read. The
    // large request must wait for deficit credit but may not starve.
    let cfg = config(2, 1, 8.0, 8.0);
    let mut trace = vec![read_at(1, 0.0, 65536)];
    for _ in 0..10 {
        trace.push(read_at(0, 0.0, 1024));
    }
    let report = fairsim_core::run_simulation(&cfg, trace, scheduler_by_name("drr").unwrap());

    assert_eq!(report.completed_requests, 11);
    assert_eq!(report.per_user[0].total_bytes, 10_240);
    assert_eq!(report.per_user[1].total_bytes, 65_536);
    assert_eq!(report.per_user[1].completed, 1);
}

#[test]
fn test_idle_tenants_do_not_depress_fairness() {
    // Four tenant slots but only two submit (equal volume).
    let cfg = config(4, 2, 100.0, 100.0);
    let mut trace = Vec::new();
    for i in 0..8 {
        trace.push(read_at(i % 2, i as f64 * 0.001, 4096));
    }
    let report = fairsim_core::run_simulation(&cfg, trace, scheduler_by_name("qfq").unwrap());

    assert_eq!(report.per_user.len(), 4);
    assert_eq!(report.per_user[2].completed, 0);
    assert_eq!(report.per_user[3].completed, 0);
    assert!((report.fairness_index - 1.0).abs() < 1e-9);
}

#[test]
fn test_empty_trace_yields_zero_report() {
    let cfg = config(3, 8, 2000.0, 1200.0);
    let report = fairsim_core::run_simulation(&cfg, Vec::new(), scheduler_by_name("qfq").unwrap());

    assert_eq!(report.completed_requests, 0);
    assert_eq!(report.duration_s, 0.0);
    assert_eq!(report.fairness_index, 0.0);
    assert_eq!(report.per_user.len(), 3);

    let dir = std::env::temp_dir().join("fairsim-engine-test");
    let path = dir.join("empty-results.csv");
    report.write_csv(&path).unwrap();
    let contents = std::fs::read_to_string(&path).unwrap();
    assert_eq!(
        contents,
        "user_id,completed,avg_latency_s,total_bytes\n0,0,0,0\n1,0,0,0\n2,0,0,0\n"
    );
}

#[test]
fn test_conservation_across_channels() {
    // Staggered arrivals over three channels: every admitted request
    // produces exactly one completion.
    let cfg = config(3, 3, 50.0, 30.0);
    let mut trace = Vec::new();
    for i in 0..60 {
        let op = if i % 3 == 0 { OpKind::Write } else { OpKind::Read };
        trace.push(Request {
            user_id: i % 3,
            op,
            arrival_ts: (i / 6) as f64 * 0.01,
            size_bytes: 4096 * (1 + (i % 4) as u32),
        });
    }
    let report = fairsim_core::run_simulation(&cfg, trace, scheduler_by_name("drr").unwrap());

    assert_eq!(report.completed_requests, 60);
    assert_eq!(report.dropped_requests, 0);
    let per_user_total: u64 = report.per_user.iter().map(|u| u.completed).sum();
    assert_eq!(per_user_total, 60);
}

#[test]
fn test_deterministic_across_runs() {
    let cfg = config(4, 4, 320.0, 160.0);
    let trace: Vec<Request> = (0..200)
        .map(|i| Request {
            user_id: i % 4,
            op: if i % 5 == 0 { OpKind::Write } else { OpKind::Read },
            arrival_ts: i as f64 * 0.0005,
            size_bytes: 512 * (1 + (i % 8) as u32),
        })
        .collect();

    let first =
        fairsim_core::run_simulation(&cfg, trace.clone(), scheduler_by_name("drr").unwrap());
    let second = fairsim_core::run_simulation(&cfg, trace, scheduler_by_name("drr").unwrap());
    assert_eq!(first, second);
}

#[test]
fn test_service_time_matches_bandwidth() {
    // 16 MB/s over 2 channels = 8 MiB/s per channel; a 2 MiB read on an
    // idle device takes exactly 0.25 s.
    let cfg = config(1, 2, 16.0, 16.0);
    let report = fairsim_core::run_simulation(
        &cfg,
        vec![read_at(0, 0.0, 2 * MIB)],
        scheduler_by_name("rr").unwrap(),
    );
    assert!((report.duration_s - 0.25).abs() < 1e-9);
    assert!((report.per_user[0].avg_latency_s - 0.25).abs() < 1e-9);
}

#[test]
fn test_channels_serve_in_parallel() {
    // Two 1 MiB requests on two 1 MiB/s channels finish together at 1 s.
    let cfg = config(1, 2, 2.0, 2.0);
    let trace = vec![read_at(0, 0.0, MIB), read_at(0, 0.0, MIB)];
    let report = fairsim_core::run_simulation(&cfg, trace, scheduler_by_name("rr").unwrap());
    assert!((report.duration_s - 1.0).abs() < 1e-9);
    assert!((report.per_user[0].avg_latency_s - 1.0).abs() < 1e-9);
}

#[test]
fn test_zero_channels_terminates_without_service() {
    let cfg = config(2, 0, 2000.0, 1200.0);
    let trace = vec![read_at(0, 0.0, 4096), read_at(1, 0.5, 4096)];
    let report = fairsim_core::run_simulation(&cfg, trace, scheduler_by_name("rr").unwrap());

    assert_eq!(report.completed_requests, 0);
    assert_eq!(report.fairness_index, 0.0);
}

#[test]
fn test_all_policies_complete_mixed_workload() {
    let cfg = config(4, 8, 2000.0, 1200.0);
    let trace: Vec<Request> = (0..100)
        .map(|i| Request {
            user_id: i % 4,
            op: if i % 2 == 0 { OpKind::Read } else { OpKind::Write },
            arrival_ts: i as f64 * 0.0001,
            size_bytes: [1024, 4096, 16384, 65536][i % 4],
        })
        .collect();

    for name in fairsim_schedulers::available_schedulers() {
        let report =
            fairsim_core::run_simulation(&cfg, trace.clone(), scheduler_by_name(name).unwrap());
        assert_eq!(
            report.completed_requests, 100,
            "policy {} lost requests",
            name
        );
        assert!(report.fairness_index > 0.0 && report.fairness_index <= 1.0 + 1e-12);
    }
}

#[test]
fn test_build_scheduler_covers_all_policies() {
    let mut cfg = config(4, 8, 2000.0, 1200.0);
    cfg.scheduler.rotate_every = 2;
    cfg.scheduler.gap = 1;

    for name in fairsim_schedulers::available_schedulers() {
        let scheduler = fairsim_core::build_scheduler(name, &cfg)
            .unwrap_or_else(|| panic!("missing: {}", name));
        assert_eq!(scheduler.name(), name);
    }
    assert!(fairsim_core::build_scheduler("fifo", &cfg).is_none());
}

#[test]
fn test_late_arrivals_fast_forward() {
    // A long idle gap between arrivals: the clock jumps rather than
    // crawling, and latency is measured from arrival.
    let cfg = config(1, 1, 1.0, 1.0);
    let trace = vec![read_at(0, 0.0, MIB), read_at(0, 10.0, MIB)];
    let report = fairsim_core::run_simulation(&cfg, trace, scheduler_by_name("qfq").unwrap());
    assert!((report.duration_s - 11.0).abs() < 1e-9);
    assert!((report.per_user[0].avg_latency_s - 1.0).abs() < 1e-9);
}
