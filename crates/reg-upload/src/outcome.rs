//! Submission outcomes and run summaries.

use std::fmt;

/// Terminal classification of one submission attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// The record was created.
    Success,
    /// The remote side already holds an equivalent record.
    Duplicate,
    /// The record was not accepted.
    Failed,
}

impl Outcome {
    /// The log-file spelling of this outcome.
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Success => "SUCCESS",
            Outcome::Duplicate => "DUPLICATE",
            Outcome::Failed => "FAILED",
        }
    }

    /// Parse the log-file spelling. Unknown text yields None.
    pub fn parse(s: &str) -> Option<Outcome> {
        match s {
            "SUCCESS" => Some(Outcome::Success),
            "DUPLICATE" => Some(Outcome::Duplicate),
            "FAILED" => Some(Outcome::Failed),
            _ => None,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one [`crate::UploadEngine::submit`] call.
#[derive(Debug, Clone)]
pub struct Submission {
    pub outcome: Outcome,
    pub message: String,
    pub remote_id: Option<String>,
    pub secondary_id: Option<String>,
}

impl Submission {
    /// A created record, with the ids the registry reported.
    pub fn success(remote_id: impl Into<String>, secondary_id: Option<String>) -> Self {
        Self {
            outcome: Outcome::Success,
            message: "Created".to_string(),
            remote_id: Some(remote_id.into()),
            secondary_id,
        }
    }

    /// A record the registry already holds.
    pub fn duplicate(message: impl Into<String>) -> Self {
        Self {
            outcome: Outcome::Duplicate,
            message: message.into(),
            remote_id: None,
            secondary_id: None,
        }
    }

    /// A record that was not accepted.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            outcome: Outcome::Failed,
            message: message.into(),
            remote_id: None,
            secondary_id: None,
        }
    }
}

/// Aggregate result of one bulk-driver invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    /// Records processed this run (after skip-on-resume filtering).
    pub total: usize,
    pub success: usize,
    pub duplicate: usize,
    pub failed: usize,
    pub duration_seconds: f64,
}
