//! Run-log discovery.
//!
//! Run logs are named `run.<timestamp>.log` where the timestamp carries its own
//! UTC offset (`20251218T001717-0600`). "Latest" compares instants, not names,
//! so logs written across a DST change or from another zone still order right.
use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const RUN_LOG_PREFIX: &str = "run.";
const RUN_LOG_SUFFIX: &str = ".log";
const RUN_LOG_TIMESTAMP_FORMAT: &str = "%Y%m%dT%H%M%S%z";

/// A run log selected by its filename timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunLogRef {
    pub path: PathBuf,
    pub timestamp: DateTime<FixedOffset>,
}

/// Parse the timestamp out of a `run.<timestamp>.log` file name.
pub fn parse_run_log_name(name: &str) -> Option<DateTime<FixedOffset>> {
    let stamp = name
        .strip_prefix(RUN_LOG_PREFIX)?
        .strip_suffix(RUN_LOG_SUFFIX)?;
    DateTime::parse_from_str(stamp, RUN_LOG_TIMESTAMP_FORMAT).ok()
}

/// Return the most recent run log in `dir`, or `None` when the directory is
/// missing or holds no parseable log names.
pub fn latest_run_log(dir: &Path) -> Result<Option<RunLogRef>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err).with_context(|| format!("read {}", dir.display())),
    };

    let mut latest: Option<RunLogRef> = None;
    for entry in entries {
        let entry = entry.with_context(|| format!("read {}", dir.display()))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
            continue;
        };
        let Some(timestamp) = parse_run_log_name(name) else {
            tracing::debug!(file = name, "skipping run log with unparseable name");
            continue;
        };
        let candidate = RunLogRef { path, timestamp };
        let newer = match &latest {
            None => true,
            Some(current) => {
                (candidate.timestamp, &candidate.path) > (current.timestamp, &current.path)
            }
        };
        if newer {
            latest = Some(candidate);
        }
    }
    Ok(latest)
}
