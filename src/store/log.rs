//! Append-only reading log
//!
//! Two artifacts on disk: a line-delimited JSON history file (one record per
//! line, append-only, never rewritten) and a snapshot file holding the most
//! recently appended record for O(1) "latest" reads.
//!
//! There is no index; every read is a linear scan from the requested
//! boundary. Readers tolerate a concurrently growing log by dropping any
//! malformed or unterminated trailing line.

use crate::store::error::StoreResult;
use crate::store::types::Reading;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// History log file name (one JSON record per line)
const LOG_FILE: &str = "historial.jsonl";
/// Snapshot file name (single JSON record, overwritten on every append)
const SNAPSHOT_FILE: &str = "ultimo.json";

/// Storage capability for reading records
///
/// Abstracts the flat-file layout so an implementation could swap in a
/// segment log or embedded key-value store without touching aggregation or
/// query logic. Read operations never fail on log content: a missing file or
/// a fully corrupt log yields empty results.
pub trait RecordStore: Send + Sync {
    /// Append one record to the log and overwrite the snapshot.
    ///
    /// Both writes must succeed; there is no two-phase guarantee, so a
    /// failure between the two can leave the snapshot and log inconsistent.
    fn append(&self, reading: &Reading) -> StoreResult<()>;

    /// Last `n` parseable records in append order. Unparseable lines are
    /// dropped and do not count toward `n`.
    fn read_tail(&self, n: usize) -> Vec<Reading>;

    /// Parsed records from at most the most recent `max_lines` raw lines.
    ///
    /// The cap applies to the line count before parsing, so a trailing run
    /// of corrupt lines reduces the effective yield.
    fn scan_bounded(&self, max_lines: usize) -> Vec<Reading>;

    /// The most recently appended record, if any.
    fn snapshot(&self) -> Option<Reading>;
}

/// Flat-file implementation of [`RecordStore`]
///
/// Appends are serialized under a mutex to prevent interleaved partial lines
/// from concurrent producers. Reads take no lock.
pub struct FileStore {
    log_path: PathBuf,
    snapshot_path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Open a store rooted at `data_dir`, creating the directory if needed
    pub fn open(data_dir: impl AsRef<Path>) -> StoreResult<Self> {
        let dir = data_dir.as_ref();
        std::fs::create_dir_all(dir)?;

        Ok(Self {
            log_path: dir.join(LOG_FILE),
            snapshot_path: dir.join(SNAPSHOT_FILE),
            write_lock: Mutex::new(()),
        })
    }

    /// Path of the history log file
    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    /// Number of raw lines currently in the log (valid or not)
    pub fn line_count(&self) -> usize {
        match std::fs::read_to_string(&self.log_path) {
            Ok(content) => content.lines().count(),
            Err(_) => 0,
        }
    }

    /// Read the raw log lines, newest last. Missing file reads as empty.
    fn read_lines(&self) -> Vec<String> {
        match std::fs::read_to_string(&self.log_path) {
            Ok(content) => content.lines().map(|l| l.to_string()).collect(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => {
                tracing::warn!(path = ?self.log_path, error = %e, "Failed to read log file");
                Vec::new()
            }
        }
    }
}

impl RecordStore for FileStore {
    fn append(&self, reading: &Reading) -> StoreResult<()> {
        let mut line = serde_json::to_string(reading)?;
        line.push('\n');
        let snapshot = serde_json::to_string(reading)?;

        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)?;
        file.write_all(line.as_bytes())?;
        file.flush()?;

        std::fs::write(&self.snapshot_path, snapshot)?;

        Ok(())
    }

    fn read_tail(&self, n: usize) -> Vec<Reading> {
        let lines = self.read_lines();
        let mut skipped = 0usize;

        let mut records: Vec<Reading> = Vec::with_capacity(n.min(lines.len()));
        for line in lines.iter().rev() {
            if records.len() >= n {
                break;
            }
            match serde_json::from_str(line) {
                Ok(r) => records.push(r),
                Err(_) => skipped += 1,
            }
        }

        if skipped > 0 {
            tracing::debug!(skipped, "Dropped unparseable log lines in tail read");
        }

        records.reverse();
        records
    }

    fn scan_bounded(&self, max_lines: usize) -> Vec<Reading> {
        let lines = self.read_lines();
        let start = lines.len().saturating_sub(max_lines);
        let mut skipped = 0usize;

        let records: Vec<Reading> = lines[start..]
            .iter()
            .filter_map(|line| match serde_json::from_str(line) {
                Ok(r) => Some(r),
                Err(_) => {
                    skipped += 1;
                    None
                }
            })
            .collect();

        if skipped > 0 {
            tracing::debug!(skipped, "Dropped unparseable log lines in bounded scan");
        }

        records
    }

    fn snapshot(&self) -> Option<Reading> {
        let content = std::fs::read_to_string(&self.snapshot_path).ok()?;
        serde_json::from_str(&content).ok()
    }
}
