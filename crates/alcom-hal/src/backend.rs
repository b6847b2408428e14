//! Backend trait and configuration.
//!
//! ```text
//!   capabilities() ──→ validate() ──→ submit() ──→ status() ──→ result()
//!    (sync, &ref)       (async)       (async)      (async)      (async)
//! ```
//!
//! | Method | Kind | Required | Returns |
//! |--------|------|----------|---------|
//! | `name()` | sync | yes | `&str` |
//! | `capabilities()` | sync | yes | `&Capabilities` |
//! | `availability()` | async | yes | `HalResult<BackendAvailability>` |
//! | `validate()` | async | yes | `HalResult<ValidationResult>` |
//! | `submit()` | async | yes | `HalResult<JobId>` |
//! | `submit_batch()` | async | provided | `HalResult<JobId>` |
//! | `status()` | async | yes | `HalResult<JobStatus>` |
//! | `result()` | async | yes | `HalResult<ExecutionResult>` |
//! | `cancel()` | async | yes | `HalResult<()>` |
//! | `wait()` | async | provided | `HalResult<ExecutionResult>` |

use std::time::Duration;

use alcom_ir::Circuit;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::capability::Capabilities;
use crate::error::{HalError, HalResult};
use crate::job::{JobId, JobStatus};
use crate::result::ExecutionResult;

/// Configuration for a backend instance.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BackendConfig {
    pub name: String,
    /// Backend-specific settings.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl BackendConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            extra: serde_json::Map::new(),
        }
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.extra.get(key).and_then(serde_json::Value::as_u64)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.extra.get(key).and_then(serde_json::Value::as_str)
    }
}

/// Noise parameters. No backend in this workspace simulates noise; a
/// non-empty model is rejected at submission.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NoiseModel {
    #[serde(flatten)]
    pub params: serde_json::Map<String, serde_json::Value>,
}

impl NoiseModel {
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

/// Per-submission options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunOptions {
    pub shots: u32,
    /// Return the final statevector alongside counts.
    #[serde(default)]
    pub statevector: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub noise_model: Option<NoiseModel>,
    /// Run the backend's validation gate before the engine.
    #[serde(default = "default_validate")]
    pub validate: bool,
}

fn default_validate() -> bool {
    true
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            shots: 1024,
            statevector: false,
            seed: None,
            noise_model: None,
            validate: true,
        }
    }
}

impl RunOptions {
    pub fn with_shots(shots: u32) -> Self {
        Self {
            shots,
            ..Self::default()
        }
    }

    pub fn statevector(mut self, enabled: bool) -> Self {
        self.statevector = enabled;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn noise_model(mut self, model: NoiseModel) -> Self {
        self.noise_model = Some(model);
        self
    }
}

/// Trait for quantum backends.
///
/// - `capabilities()` is synchronous and infallible; backends build their
///   capabilities once at construction.
/// - `submit()` returns as soon as the job is queued; the job starts in
///   `Submitted`.
/// - `result()` is only meaningful once `status()` reports `Done`.
#[async_trait]
pub trait Backend: Send + Sync {
    fn name(&self) -> &str;

    fn capabilities(&self) -> &Capabilities;

    /// Liveness and queue information.
    async fn availability(&self) -> HalResult<BackendAvailability>;

    /// Check a circuit against backend constraints without running it.
    async fn validate(&self, circuit: &Circuit, options: &RunOptions) -> HalResult<ValidationResult>;

    /// Queue a circuit for execution.
    async fn submit(&self, circuit: &Circuit, options: &RunOptions) -> HalResult<JobId>;

    /// Queue a batch; only single-experiment batches are accepted.
    async fn submit_batch(&self, circuits: &[Circuit], options: &RunOptions) -> HalResult<JobId> {
        match circuits {
            [circuit] => self.submit(circuit, options).await,
            _ => Err(HalError::StructuralValidation(format!(
                "expected exactly one experiment, got {}",
                circuits.len()
            ))),
        }
    }

    async fn status(&self, job_id: &JobId) -> HalResult<JobStatus>;

    async fn result(&self, job_id: &JobId) -> HalResult<ExecutionResult>;

    async fn cancel(&self, job_id: &JobId) -> HalResult<()>;

    /// Wait for a job to finish and return its result.
    ///
    /// Default implementation polls every 20ms for up to 10 minutes.
    async fn wait(&self, job_id: &JobId) -> HalResult<ExecutionResult> {
        use tokio::time::sleep;

        let poll_interval = Duration::from_millis(20);
        let max_polls = 30_000;

        for _ in 0..max_polls {
            match self.status(job_id).await? {
                JobStatus::Done => return self.result(job_id).await,
                JobStatus::Failed(msg) => return Err(HalError::JobFailed(msg)),
                JobStatus::Cancelled => return Err(HalError::JobCancelled),
                JobStatus::Created | JobStatus::Submitted | JobStatus::Running => {
                    sleep(poll_interval).await;
                }
            }
        }

        Err(HalError::Timeout(job_id.0.clone()))
    }
}

/// Backend availability information.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendAvailability {
    /// Whether the backend is currently accepting jobs.
    pub operational: bool,
    /// Jobs not yet in a terminal state.
    pub pending_jobs: u32,
    /// Human-readable status message, empty when all is well.
    pub status_message: String,
}

impl BackendAvailability {
    pub fn operational(pending_jobs: u32) -> Self {
        Self {
            operational: true,
            pending_jobs,
            status_message: String::new(),
        }
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            operational: false,
            pending_jobs: 0,
            status_message: reason.into(),
        }
    }
}

/// Result of circuit validation against backend constraints.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationResult {
    Valid,
    Invalid {
        /// Reasons the circuit is invalid.
        reasons: Vec<String>,
    },
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }

    /// Collect reasons; no reasons means valid.
    pub fn from_reasons(reasons: Vec<String>) -> Self {
        if reasons.is_empty() {
            ValidationResult::Valid
        } else {
            ValidationResult::Invalid { reasons }
        }
    }
}

/// Trait for creating backends from configuration.
pub trait BackendFactory: Backend + Sized {
    fn from_config(config: BackendConfig) -> HalResult<Self>;
}
