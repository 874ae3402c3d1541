//! IG-010: Append-only JSONL run log.
//!
//! One line per stage outcome, written to `<output_dir>/runs.jsonl`.
//! Callers treat write failures as warnings; the log never aborts a run.

use crate::core::types::{RunEvent, TimestampedEvent};
use chrono::{SecondsFormat, Utc};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Run log file name inside the output directory.
pub const RUN_LOG_FILE: &str = "runs.jsonl";

/// Generate an RFC 3339 UTC timestamp.
pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Generate a run ID.
pub fn generate_run_id() -> String {
    let nanos = Utc::now()
        .timestamp_nanos_opt()
        .unwrap_or_default()
        .unsigned_abs();
    format!("r-{:012x}", nanos & 0xFFFF_FFFF_FFFF)
}

/// Derive the run log path for an output directory.
pub fn run_log_path(output_dir: &Path) -> PathBuf {
    output_dir.join(RUN_LOG_FILE)
}

/// Append an event to the run log.
pub fn append_event(output_dir: &Path, event: RunEvent) -> std::io::Result<()> {
    std::fs::create_dir_all(output_dir)?;

    let te = TimestampedEvent {
        ts: now_rfc3339(),
        event,
    };
    let json = serde_json::to_string(&te)?;

    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(run_log_path(output_dir))?;

    writeln!(file, "{}", json)
}

/// Read every event back, skipping lines that fail to parse.
pub fn read_events(output_dir: &Path) -> std::io::Result<Vec<TimestampedEvent>> {
    let content = std::fs::read_to_string(run_log_path(output_dir))?;
    Ok(content
        .lines()
        .filter_map(|line| serde_json::from_str(line).ok())
        .collect())
}
