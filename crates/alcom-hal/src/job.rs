//! Job lifecycle types.
//!
//! ```text
//!   new() ──→ Created ──→ Submitted ──→ Running ──→ Done
//!                            │            │
//!                            │            ├──→ Failed(reason)
//!                            │            │
//!                            └────────────┴──→ Cancelled
//! ```
//!
//! Transitions only move forward and terminal states (`Done`, `Failed`,
//! `Cancelled`) are permanent; [`Job::advance`] refuses anything else.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unique identifier for a job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(pub String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for JobId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for JobId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Status of a job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    /// Job object exists but has not been handed to a worker.
    Created,
    /// Job is queued for a worker.
    Submitted,
    /// The engine is running.
    Running,
    /// Job completed with a full result.
    Done,
    /// Job failed with an error message.
    Failed(String),
    /// Job was cancelled.
    Cancelled,
}

impl JobStatus {
    /// Check if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Done | JobStatus::Failed(_) | JobStatus::Cancelled
        )
    }

    /// Check if the job has not reached a terminal state yet.
    pub fn is_pending(&self) -> bool {
        !self.is_terminal()
    }

    pub fn is_success(&self) -> bool {
        matches!(self, JobStatus::Done)
    }

    fn rank(&self) -> u8 {
        match self {
            JobStatus::Created => 0,
            JobStatus::Submitted => 1,
            JobStatus::Running => 2,
            JobStatus::Done | JobStatus::Failed(_) | JobStatus::Cancelled => 3,
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobStatus::Created => write!(f, "Created"),
            JobStatus::Submitted => write!(f, "Submitted"),
            JobStatus::Running => write!(f, "Running"),
            JobStatus::Done => write!(f, "Done"),
            JobStatus::Failed(msg) => write!(f, "Failed: {msg}"),
            JobStatus::Cancelled => write!(f, "Cancelled"),
        }
    }
}

/// A job with lifecycle timestamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub status: JobStatus,
    /// Number of shots requested.
    pub shots: u32,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
    /// Backend the job was submitted to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend: Option<String>,
}

impl Job {
    pub fn new(id: impl Into<JobId>, shots: u32) -> Self {
        Self {
            id: id.into(),
            status: JobStatus::Created,
            shots,
            created_at: Utc::now(),
            started_at: None,
            finished_at: None,
            backend: None,
        }
    }

    pub fn with_backend(mut self, backend: impl Into<String>) -> Self {
        self.backend = Some(backend.into());
        self
    }

    /// Move to `status` if that is a forward transition.
    ///
    /// Returns `false` and leaves the job untouched when the job is already
    /// terminal or `status` would move it backwards.
    pub fn advance(&mut self, status: JobStatus) -> bool {
        if self.status.is_terminal() || status.rank() <= self.status.rank() {
            return false;
        }
        if matches!(status, JobStatus::Running) {
            self.started_at = Some(Utc::now());
        }
        if status.is_terminal() {
            self.finished_at = Some(Utc::now());
        }
        self.status = status;
        true
    }
}
