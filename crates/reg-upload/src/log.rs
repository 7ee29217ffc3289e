//! Append-only upload progress log.
//!
//! One pipe-delimited line per attempt:
//!
//! ```text
//! itemKey|outcome|message|remoteId|secondaryId|timestamp
//! ```
//!
//! This format is the sole crash-recovery mechanism and must stay stable
//! across versions. The file is never truncated or rewritten; a key whose
//! history contains a SUCCESS line is skipped by every later run, while
//! DUPLICATE and FAILED keys stay eligible for resubmission.

use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tracing::debug;

use crate::error::Result;
use crate::outcome::{Outcome, Submission};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One logged attempt.
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub item_key: String,
    pub outcome: Outcome,
    pub message: String,
    pub remote_id: Option<String>,
    pub secondary_id: Option<String>,
    pub timestamp: DateTime<Local>,
}

impl LogEntry {
    /// Create an entry stamped with the current local time.
    pub fn new(item_key: impl Into<String>, outcome: Outcome, message: impl Into<String>) -> Self {
        Self {
            item_key: item_key.into(),
            outcome,
            message: message.into(),
            remote_id: None,
            secondary_id: None,
            timestamp: Local::now(),
        }
    }

    /// Create an entry from a submission result.
    pub fn from_submission(item_key: impl Into<String>, submission: &Submission) -> Self {
        Self {
            item_key: item_key.into(),
            outcome: submission.outcome,
            message: submission.message.clone(),
            remote_id: submission.remote_id.clone(),
            secondary_id: submission.secondary_id.clone(),
            timestamp: Local::now(),
        }
    }

    /// Serialize as one log line, newline-terminated.
    fn to_line(&self) -> String {
        format!(
            "{}|{}|{}|{}|{}|{}\n",
            self.item_key,
            self.outcome,
            flatten(&self.message),
            self.remote_id.as_deref().unwrap_or(""),
            self.secondary_id.as_deref().unwrap_or(""),
            self.timestamp.format(TIMESTAMP_FORMAT),
        )
    }
}

/// One attempt is one line; the field separator cannot appear in the
/// message column.
fn flatten(message: &str) -> String {
    message.replace(['\r', '\n'], " ").replace('|', "/")
}

/// Cumulative outcome counts over the full log history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LogStats {
    pub success: usize,
    pub duplicate: usize,
    pub failed: usize,
}

/// Durable, append-only record of per-attempt outcomes.
#[derive(Debug, Clone)]
pub struct UploadLog {
    path: PathBuf,
}

impl UploadLog {
    /// Open (lazily) the log at `path`. The file is created on first append.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The log file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Durably append one entry. Prior content is never touched.
    pub fn append(&self, entry: &LogEntry) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(entry.to_line().as_bytes())?;
        // The entry must survive process termination: it is what the next
        // run resumes from.
        file.sync_all()?;
        Ok(())
    }

    /// Keys whose history contains a SUCCESS outcome.
    ///
    /// Only SUCCESS counts toward skip-on-resume; malformed lines are
    /// skipped, not errors.
    pub fn completed_keys(&self) -> Result<HashSet<String>> {
        let mut keys = HashSet::new();
        if !self.path.exists() {
            return Ok(keys);
        }

        for line in BufReader::new(File::open(&self.path)?).lines() {
            let line = line?;
            let fields: Vec<&str> = line.split('|').collect();
            if fields.len() >= 3 && Outcome::parse(fields[1]) == Some(Outcome::Success) {
                keys.insert(fields[0].to_string());
            }
        }

        debug!(completed = keys.len(), "loaded completed keys");
        Ok(keys)
    }

    /// Cumulative outcome counts across the entire log history.
    pub fn stats(&self) -> Result<LogStats> {
        let mut stats = LogStats::default();
        if !self.path.exists() {
            return Ok(stats);
        }

        for line in BufReader::new(File::open(&self.path)?).lines() {
            let line = line?;
            let fields: Vec<&str> = line.split('|').collect();
            if fields.len() < 2 {
                continue;
            }
            match Outcome::parse(fields[1]) {
                Some(Outcome::Success) => stats.success += 1,
                Some(Outcome::Duplicate) => stats.duplicate += 1,
                Some(Outcome::Failed) => stats.failed += 1,
                None => {}
            }
        }

        Ok(stats)
    }
}
