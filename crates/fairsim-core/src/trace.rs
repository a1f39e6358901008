//! Trace ingestion for FairSim.
//!
//! Three on-disk formats are recognized:
//! - **Legacy CSV**: `timestamp_us, process_id, type, address, size` with
//!   tenant ids auto-assigned in first-seen process order.
//! - **Extended CSV**: `timestamp_us, process_id, user_id, type, address,
//!   size` with explicit tenant ids that must stay consistent per process.
//! - **blkparse output**: whitespace-separated Linux blktrace text; only
//!   `Q` (queue) events produce requests.
//!
//! Timestamps in the CSV formats are microseconds and are converted to the
//! simulator's seconds timeline; blkparse already reports seconds. Comment
//! lines starting with `#` and blank lines are ignored, as is a leading
//! header row. The returned requests are sorted by `(arrival_ts, user_id)`.

use fairsim_schedulers::{OpKind, Request};
use std::collections::HashMap;
use std::io::{BufRead, BufReader, Read, Write};
use std::path::Path;
use thiserror::Error;

const SECTOR_SIZE_BYTES: u64 = 512;

#[derive(Error, Debug)]
pub enum TraceError {
    #[error("failed to read trace file: {0}")]
    Io(#[from] std::io::Error),
    #[error("line {line}: {reason}")]
    Malformed { line: usize, reason: String },
    #[error("line {line}: unknown op type: {op}")]
    UnknownOp { line: usize, op: String },
    #[error("line {line}: process '{process}' has conflicting user ids ({have} vs {got})")]
    ConflictingUser {
        line: usize,
        process: String,
        have: usize,
        got: usize,
    },
}

/// Load a trace file, auto-detecting the per-line format.
pub fn load_trace(path: &Path) -> Result<Vec<Request>, TraceError> {
    let file = std::fs::File::open(path)?;
    parse_trace(BufReader::new(file))
}

/// Parse trace text from any reader.
pub fn parse_trace<R: Read>(reader: BufReader<R>) -> Result<Vec<Request>, TraceError> {
    let mut parser = TraceParser::default();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        parser.feed(idx + 1, &line)?;
    }
    Ok(parser.finish())
}

/// Tenant count implied by a trace: highest id plus one.
pub fn infer_users(requests: &[Request]) -> usize {
    requests.iter().map(|r| r.user_id + 1).max().unwrap_or(0)
}

/// Write requests in the extended CSV format (explicit tenant ids).
pub fn write_trace_csv(requests: &[Request], path: &Path) -> Result<(), TraceError> {
    let file = std::fs::File::create(path)?;
    let mut writer = std::io::BufWriter::new(file);
    writeln!(writer, "timestamp_us,process_id,user_id,type,address,size")?;
    for r in requests {
        let op = match r.op {
            OpKind::Read => "read",
            OpKind::Write => "write",
        };
        writeln!(
            writer,
            "{:.0},tenant{},{},{},0,{}",
            r.arrival_ts * 1e6,
            r.user_id,
            r.user_id,
            op,
            r.size_bytes,
        )?;
    }
    Ok(())
}

#[derive(Default)]
struct TraceParser {
    requests: Vec<Request>,
    process_ids: HashMap<String, usize>,
    next_auto_id: usize,
    saw_data: bool,
}

impl TraceParser {
    fn feed(&mut self, line_no: usize, raw: &str) -> Result<(), TraceError> {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(());
        }
        if !self.saw_data && looks_like_header(line) {
            return Ok(());
        }
        self.parse_line(line_no, line)?;
        self.saw_data = true;
        Ok(())
    }

    fn finish(mut self) -> Vec<Request> {
        self.requests.sort_by(|a, b| {
            a.arrival_ts
                .total_cmp(&b.arrival_ts)
                .then(a.user_id.cmp(&b.user_id))
        });
        self.requests
    }

    fn parse_line(&mut self, line_no: usize, line: &str) -> Result<(), TraceError> {
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        match fields.len() {
            6 => self.parse_extended_csv(line_no, &fields),
            5 => self.parse_legacy_csv(line_no, &fields),
            _ => self.parse_blkparse(line_no, line),
        }
    }

    fn parse_extended_csv(&mut self, line_no: usize, fields: &[&str]) -> Result<(), TraceError> {
        let arrival_ts = parse_timestamp_us(fields[0], line_no)?;
        let process = fields[1];
        let declared: usize = fields[2].parse().map_err(|e| TraceError::Malformed {
            line: line_no,
            reason: format!("failed to parse user_id: {}", e),
        })?;
        let op = parse_op(fields[3], line_no)?;
        let size_bytes = parse_size(fields[5], line_no)?;

        match self.process_ids.get(process) {
            Some(&have) if have != declared => {
                return Err(TraceError::ConflictingUser {
                    line: line_no,
                    process: process.to_string(),
                    have,
                    got: declared,
                });
            }
            Some(_) => {}
            None => {
                self.process_ids.insert(process.to_string(), declared);
            }
        }

        self.requests.push(Request {
            user_id: declared,
            op,
            arrival_ts,
            size_bytes,
        });
        Ok(())
    }

    fn parse_legacy_csv(&mut self, line_no: usize, fields: &[&str]) -> Result<(), TraceError> {
        let arrival_ts = parse_timestamp_us(fields[0], line_no)?;
        let process = fields[1];
        let op = parse_op(fields[2], line_no)?;
        let size_bytes = parse_size(fields[4], line_no)?;
        let user_id = self.user_for_process(process);

        self.requests.push(Request {
            user_id,
            op,
            arrival_ts,
            size_bytes,
        });
        Ok(())
    }

    fn parse_blkparse(&mut self, line_no: usize, line: &str) -> Result<(), TraceError> {
        let format_error = || TraceError::Malformed {
            line: line_no,
            reason: "expected CSV or blkparse format".to_string(),
        };

        let mut tokens = line.split_whitespace();
        let device = tokens.next().ok_or_else(format_error)?;
        // blkparse device field is "major,minor".
        if !device.contains(',') {
            return Err(format_error());
        }

        let _cpu = tokens.next().ok_or_else(format_error)?;
        let _seq = tokens.next().ok_or_else(format_error)?;
        let ts_str = tokens.next().ok_or_else(format_error)?;
        let pid = tokens.next().ok_or_else(format_error)?;
        let action = tokens.next().ok_or_else(format_error)?;
        let rwbs = tokens.next().ok_or_else(format_error)?;

        // blkparse timestamps are already seconds.
        let arrival_ts: f64 = ts_str.parse().map_err(|_| format_error())?;

        // Non-queue events are recognized but do not generate requests.
        if action != "Q" {
            return Ok(());
        }

        let incomplete = || TraceError::Malformed {
            line: line_no,
            reason: "incomplete blkparse data for queue event".to_string(),
        };
        let _sector = tokens.next().ok_or_else(incomplete)?;
        let plus = tokens.next().ok_or_else(incomplete)?;
        let count_str = tokens.next().ok_or_else(incomplete)?;
        if plus != "+" {
            return Err(TraceError::Malformed {
                line: line_no,
                reason: "expected '+' before sector count".to_string(),
            });
        }

        let sectors: u64 = count_str.parse().map_err(|e| TraceError::Malformed {
            line: line_no,
            reason: format!("invalid sector count: {}", e),
        })?;
        let bytes = sectors * SECTOR_SIZE_BYTES;
        let size_bytes = u32::try_from(bytes).map_err(|_| TraceError::Malformed {
            line: line_no,
            reason: "request size exceeds u32".to_string(),
        })?;

        // Tenant label is "pid" or "pid:comm" when the command is present.
        let mut label = pid.to_string();
        if let Some(comm) = tokens.next() {
            let comm = comm.trim_start_matches('[').trim_end_matches(']');
            if !comm.is_empty() {
                label.push(':');
                label.push_str(comm);
            }
        }

        let op = if rwbs.to_ascii_uppercase().contains('W') {
            OpKind::Write
        } else {
            OpKind::Read
        };
        let user_id = self.user_for_process(&label);

        self.requests.push(Request {
            user_id,
            op,
            arrival_ts,
            size_bytes,
        });
        Ok(())
    }

    fn user_for_process(&mut self, process: &str) -> usize {
        if let Some(&uid) = self.process_ids.get(process) {
            return uid;
        }
        let uid = self.next_auto_id;
        self.next_auto_id += 1;
        self.process_ids.insert(process.to_string(), uid);
        uid
    }
}

fn looks_like_header(line: &str) -> bool {
    let first = line.split(',').next().unwrap_or("").trim();
    let first = first.split_whitespace().next().unwrap_or("");
    first.is_empty() || first.parse::<f64>().is_err()
}

fn parse_timestamp_us(value: &str, line_no: usize) -> Result<f64, TraceError> {
    let ts_us: f64 = value.parse().map_err(|e| TraceError::Malformed {
        line: line_no,
        reason: format!("failed to parse timestamp: {}", e),
    })?;
    Ok(ts_us / 1_000_000.0)
}

fn parse_size(value: &str, line_no: usize) -> Result<u32, TraceError> {
    value.parse().map_err(|e| TraceError::Malformed {
        line: line_no,
        reason: format!("failed to parse size: {}", e),
    })
}

fn parse_op(value: &str, line_no: usize) -> Result<OpKind, TraceError> {
    if value.eq_ignore_ascii_case("read") {
        Ok(OpKind::Read)
    } else if value.eq_ignore_ascii_case("write") {
        Ok(OpKind::Write)
    } else {
        Err(TraceError::UnknownOp {
            line: line_no,
            op: value.to_string(),
        })
    }
}
