/// Integration tests for trace ingestion.
use fairsim_core::trace::{self, TraceError};
use fairsim_schedulers::OpKind;
use std::io::Write;
use std::path::PathBuf;

fn write_temp(name: &str, contents: &str) -> PathBuf {
    let dir = std::env::temp_dir().join("fairsim-ingestion-test");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    path
}

#[test]
fn test_load_legacy_csv_with_header() {
    let path = write_temp(
        "legacy.csv",
        "timestamp,process_id,type,address,size\n\
         2000,proc_b,WRITE,8192,8192\n\
         1000,proc_a,READ,4096,4096\n\
         3000,proc_a,read,0,512\n",
    );
    let requests = trace::load_trace(&path).unwrap();

    assert_eq!(requests.len(), 3);
    // Sorted by arrival even though the file was not.
    assert!((requests[0].arrival_ts - 0.001).abs() < 1e-12);
    assert!((requests[1].arrival_ts - 0.002).abs() < 1e-12);
    // Auto ids follow first-seen order in the file: proc_b then proc_a.
    assert_eq!(requests[0].user_id, 1);
    assert_eq!(requests[1].user_id, 0);
    assert_eq!(requests[0].op, OpKind::Read);
    assert_eq!(requests[1].op, OpKind::Write);
}

#[test]
fn test_load_extended_csv_explicit_ids() {
    let path = write_temp(
        "extended.csv",
        "timestamp_us,process_id,user_id,type,address,size\n\
         1000,proc_a,2,read,0,4096\n\
         1500,proc_b,0,write,0,1024\n\
         2000,proc_a,2,read,0,2048\n",
    );
    let requests = trace::load_trace(&path).unwrap();
    assert_eq!(requests.len(), 3);
    assert_eq!(requests[0].user_id, 2);
    assert_eq!(requests[1].user_id, 0);
    assert_eq!(trace::infer_users(&requests), 3);
}

#[test]
fn test_extended_csv_conflicting_id_is_fatal() {
    let path = write_temp(
        "conflict.csv",
        "1000,proc_a,0,read,0,4096\n2000,proc_a,1,read,0,4096\n",
    );
    match trace::load_trace(&path) {
        Err(TraceError::ConflictingUser { process, .. }) => assert_eq!(process, "proc_a"),
        other => panic!("expected ConflictingUser, got {:?}", other),
    }
}

#[test]
fn test_load_blkparse_output() {
    let path = write_temp(
        "blk.txt",
        "# blktrace sample\n\
         8,0 0 1 0.000000000 4509 Q R 1310720 + 256 [fio]\n\
         8,0 0 2 0.000001340 4509 G R 1310720 + 256 [fio]\n\
         8,0 1 1 0.002000000 4510 Q WS 2621440 + 64 [postgres]\n\
         8,0 1 2 0.002100000 4510 C WS 2621440 + 64 [postgres]\n",
    );
    let requests = trace::load_trace(&path).unwrap();

    // Only Q events become requests; sectors are 512 bytes.
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].size_bytes, 256 * 512);
    assert_eq!(requests[0].op, OpKind::Read);
    assert!((requests[0].arrival_ts - 0.0).abs() < 1e-12);
    assert_eq!(requests[1].size_bytes, 64 * 512);
    assert_eq!(requests[1].op, OpKind::Write);
    assert!((requests[1].arrival_ts - 0.002).abs() < 1e-12);
    assert_eq!(trace::infer_users(&requests), 2);
}

#[test]
fn test_missing_file_is_io_error() {
    let missing = std::env::temp_dir().join("fairsim-ingestion-test/definitely-missing.csv");
    assert!(matches!(
        trace::load_trace(&missing),
        Err(TraceError::Io(_))
    ));
}

#[test]
fn test_unknown_op_is_fatal() {
    let path = write_temp("badop.csv", "1000,proc_a,trim,0,4096\n");
    assert!(matches!(
        trace::load_trace(&path),
        Err(TraceError::UnknownOp { .. })
    ));
}

#[test]
fn test_comments_blank_lines_and_crlf() {
    let path = write_temp(
        "windows.csv",
        "# generated trace\r\n\r\n1000,proc_a,read,0,4096\r\n",
    );
    let requests = trace::load_trace(&path).unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].size_bytes, 4096);
}

#[test]
fn test_generated_trace_reloads_identically() {
    let requests = trace::load_trace(&write_temp(
        "source.csv",
        "1000,a,0,read,0,4096\n2000,b,1,write,0,8192\n3000,a,0,read,0,1024\n",
    ))
    .unwrap();

    let out = std::env::temp_dir().join("fairsim-ingestion-test/rewritten.csv");
    trace::write_trace_csv(&requests, &out).unwrap();
    let reloaded = trace::load_trace(&out).unwrap();
    assert_eq!(requests, reloaded);
}
