//! The `qasm_simulator` backend.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use alcom_dd::CancelToken;
use alcom_hal::{
    Backend, BackendAvailability, BackendConfig, BackendFactory, Capabilities, ExecutionResult,
    HalError, HalResult, Job, JobId, JobStatus, RunOptions, ValidationResult,
};
use alcom_ir::Circuit;
use async_trait::async_trait;
use rustc_hash::FxHashMap;
use tokio::sync::Semaphore;
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

use crate::config::BddConfig;
use crate::controller::{Controller, ControllerError, DdController, SimulationRequest};
use crate::gates::supported_gates;
use crate::shaping::{ENGINE_FAILURE, ResultContext, shape_result};
use crate::validation::{check_circuit, check_structure, warn_if_unmeasured};

/// Version reported in capabilities and results.
pub const BACKEND_VERSION: &str = env!("CARGO_PKG_VERSION");

struct BddJob {
    job: Job,
    result: Option<ExecutionResult>,
    cancel: CancelToken,
}

type JobTable = Arc<Mutex<FxHashMap<String, BddJob>>>;

fn lock(jobs: &JobTable) -> MutexGuard<'_, FxHashMap<String, BddJob>> {
    jobs.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Local decision-diagram simulator behind the [`Backend`] trait.
///
/// Every submission becomes a tokio task that waits for a worker slot,
/// validates the circuit, emits it as OpenQASM 2.0 and runs the engine on
/// the blocking pool under the configured timeout.
pub struct BddBackend {
    config: Arc<BddConfig>,
    capabilities: Arc<Capabilities>,
    controller: Arc<dyn Controller>,
    semaphore: Arc<Semaphore>,
    jobs: JobTable,
}

impl BddBackend {
    pub fn new() -> Self {
        Self::with_config(BddConfig::default())
    }

    pub fn with_config(config: BddConfig) -> Self {
        let controller = Arc::new(DdController::with_gc_threshold(config.gc_threshold));
        Self::with_controller(config, controller)
    }

    /// Backend that runs circuits through `controller` instead of the
    /// built-in engine.
    pub fn with_controller(config: BddConfig, controller: Arc<dyn Controller>) -> Self {
        let capabilities = Capabilities::simulator(
            config.backend_name.clone(),
            BACKEND_VERSION,
            config.max_qubits,
            supported_gates(),
        )
        .with_max_shots(config.max_shots)
        .with_description("Decision-diagram quantum circuit simulator")
        .with_features(&["statevector", "mid_circuit_measurement", "reset", "seed"]);

        Self {
            semaphore: Arc::new(Semaphore::new(config.max_concurrent_jobs)),
            config: Arc::new(config),
            capabilities: Arc::new(capabilities),
            controller,
            jobs: Arc::new(Mutex::new(FxHashMap::default())),
        }
    }

    pub fn config(&self) -> &BddConfig {
        &self.config
    }
}

impl Default for BddBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BddBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<BddBackend('{}')>", self.config.backend_name)
    }
}

impl fmt::Debug for BddBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BddBackend")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Backend for BddBackend {
    fn name(&self) -> &str {
        &self.config.backend_name
    }

    fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    async fn availability(&self) -> HalResult<BackendAvailability> {
        let pending = lock(&self.jobs)
            .values()
            .filter(|j| j.job.status.is_pending())
            .count();
        Ok(BackendAvailability::operational(
            u32::try_from(pending).unwrap_or(u32::MAX),
        ))
    }

    async fn validate(&self, circuit: &Circuit, options: &RunOptions) -> HalResult<ValidationResult> {
        let mut reasons = check_circuit(&self.config, &self.capabilities, circuit, options);
        if let Err(err) = check_structure(options) {
            reasons.push(err.to_string());
        }
        Ok(ValidationResult::from_reasons(reasons))
    }

    #[instrument(skip(self, circuit, options), fields(circuit = circuit.name(), shots = options.shots))]
    async fn submit(&self, circuit: &Circuit, options: &RunOptions) -> HalResult<JobId> {
        check_structure(options)?;

        let job_id = JobId::new(Uuid::new_v4().to_string());
        let mut job = Job::new(job_id.clone(), options.shots).with_backend(self.config.backend_name.clone());
        job.advance(JobStatus::Submitted);
        let cancel = CancelToken::new();

        lock(&self.jobs).insert(
            job_id.0.clone(),
            BddJob {
                job,
                result: None,
                cancel: cancel.clone(),
            },
        );
        debug!("Submitted job: {}", job_id);

        let runner = JobRunner {
            job_id: job_id.clone(),
            circuit: circuit.clone(),
            options: options.clone(),
            config: Arc::clone(&self.config),
            capabilities: Arc::clone(&self.capabilities),
            controller: Arc::clone(&self.controller),
            semaphore: Arc::clone(&self.semaphore),
            jobs: Arc::clone(&self.jobs),
            cancel,
        };
        tokio::spawn(runner.run());

        Ok(job_id)
    }

    async fn status(&self, job_id: &JobId) -> HalResult<JobStatus> {
        lock(&self.jobs)
            .get(&job_id.0)
            .map(|j| j.job.status.clone())
            .ok_or_else(|| HalError::JobNotFound(job_id.0.clone()))
    }

    async fn result(&self, job_id: &JobId) -> HalResult<ExecutionResult> {
        let jobs = lock(&self.jobs);
        let entry = jobs
            .get(&job_id.0)
            .ok_or_else(|| HalError::JobNotFound(job_id.0.clone()))?;
        match &entry.job.status {
            JobStatus::Done => entry
                .result
                .clone()
                .ok_or_else(|| HalError::JobNotFound(job_id.0.clone())),
            JobStatus::Failed(reason) => Err(HalError::JobFailed(reason.clone())),
            JobStatus::Cancelled => Err(HalError::JobCancelled),
            status => Err(HalError::NotAvailable(format!(
                "job {job_id} is {status}; no result yet"
            ))),
        }
    }

    async fn cancel(&self, job_id: &JobId) -> HalResult<()> {
        let mut jobs = lock(&self.jobs);
        let entry = jobs
            .get_mut(&job_id.0)
            .ok_or_else(|| HalError::JobNotFound(job_id.0.clone()))?;
        entry.cancel.cancel();
        if entry.job.advance(JobStatus::Cancelled) {
            info!("Cancelled job: {}", job_id);
        }
        Ok(())
    }
}

impl BackendFactory for BddBackend {
    fn from_config(config: BackendConfig) -> HalResult<Self> {
        fn narrow(key: &str, value: u64) -> HalResult<u32> {
            u32::try_from(value)
                .map_err(|_| HalError::Configuration(format!("{key} = {value} is out of range")))
        }

        let mut bdd = BddConfig::default();
        if !config.name.is_empty() {
            bdd.backend_name = config.name.clone();
        }
        if let Some(v) = config.get_u64("max_qubits") {
            bdd.max_qubits = narrow("max_qubits", v)?;
        }
        if let Some(v) = config.get_u64("max_shots") {
            bdd.max_shots = narrow("max_shots", v)?;
        }
        if let Some(v) = config.get_u64("max_concurrent_jobs") {
            bdd.max_concurrent_jobs = narrow("max_concurrent_jobs", v)? as usize;
        }
        if let Some(v) = config.get_u64("job_timeout_secs") {
            bdd.job_timeout_secs = v;
        }
        if let Some(v) = config.get_u64("statevector_max_qubits") {
            bdd.statevector_max_qubits = narrow("statevector_max_qubits", v)?;
        }
        if let Some(v) = config.get_u64("gc_threshold") {
            bdd.gc_threshold = usize::try_from(v)
                .map_err(|_| HalError::Configuration(format!("gc_threshold = {v} is out of range")))?;
        }
        if let Some(v) = config.get_u64("seed") {
            bdd.seed = Some(v);
        }
        bdd.validate()
            .map_err(|e| HalError::Configuration(e.to_string()))?;
        Ok(Self::with_config(bdd))
    }
}

/// Everything one job task needs, detached from the backend borrow.
struct JobRunner {
    job_id: JobId,
    circuit: Circuit,
    options: RunOptions,
    config: Arc<BddConfig>,
    capabilities: Arc<Capabilities>,
    controller: Arc<dyn Controller>,
    semaphore: Arc<Semaphore>,
    jobs: JobTable,
    cancel: CancelToken,
}

impl JobRunner {
    #[instrument(skip(self), fields(job_id = %self.job_id))]
    async fn run(self) {
        match self.execute().await {
            Ok(result) => self.finish(JobStatus::Done, Some(result)),
            Err(reason) => self.finish(JobStatus::Failed(reason), None),
        }
    }

    async fn execute(&self) -> Result<ExecutionResult, String> {
        let _permit = Arc::clone(&self.semaphore)
            .acquire_owned()
            .await
            .map_err(|_| "worker pool is shut down".to_string())?;
        let started = Instant::now();

        if self.options.validate {
            let reasons = check_circuit(&self.config, &self.capabilities, &self.circuit, &self.options);
            if !reasons.is_empty() {
                return Err(reasons.join("; "));
            }
        }
        warn_if_unmeasured(&self.circuit);

        let qasm = alcom_qasm::emit(&self.circuit)
            .map_err(|e| format!("circuit cannot be written as OpenQASM 2.0: {e}"))?;

        if !self.transition(JobStatus::Running) {
            return Err("job left the queue before starting".into());
        }
        info!("Job running");

        let controller = Arc::clone(&self.controller);
        let cancel = self.cancel.clone();
        let statevector = self.options.statevector;
        let shots = self.options.shots;
        let seed = self.options.seed.or(self.config.seed);
        let engine = tokio::task::spawn_blocking(move || {
            controller.simulate(&SimulationRequest {
                qasm: &qasm,
                statevector,
                shots,
                seed,
                cancel,
            })
        });

        let limit = Duration::from_secs(self.config.job_timeout_secs);
        let output = match tokio::time::timeout(limit, engine).await {
            Err(_) => {
                self.cancel.cancel();
                error!(timeout_secs = self.config.job_timeout_secs, "Job exceeded its time limit");
                return Err(ENGINE_FAILURE.into());
            }
            Ok(Err(join_error)) => {
                error!(error = %join_error, "Engine task did not complete");
                return Err(ENGINE_FAILURE.into());
            }
            Ok(Ok(Err(ControllerError::Cancelled))) => return Err("job cancelled".into()),
            Ok(Ok(Err(ControllerError::MultipleExperiments(n)))) => {
                return Err(format!("expected exactly one experiment, got {n}"));
            }
            Ok(Ok(Err(cause))) => {
                error!(error = %cause, "Engine failed");
                return Err(ENGINE_FAILURE.into());
            }
            Ok(Ok(Ok(output))) => output,
        };

        let ctx = ResultContext {
            job_id: self.job_id.as_str(),
            backend_name: &self.config.backend_name,
            backend_version: BACKEND_VERSION,
            num_qubits: self.circuit.num_qubits(),
            shots,
            time_taken: started.elapsed().as_secs_f64(),
        };
        shape_result(output, &ctx).map_err(|_| ENGINE_FAILURE.to_string())
    }

    fn transition(&self, status: JobStatus) -> bool {
        lock(&self.jobs)
            .get_mut(&self.job_id.0)
            .is_some_and(|entry| entry.job.advance(status))
    }

    fn finish(&self, status: JobStatus, result: Option<ExecutionResult>) {
        let mut jobs = lock(&self.jobs);
        let Some(entry) = jobs.get_mut(&self.job_id.0) else {
            return;
        };
        let label = status.to_string();
        if entry.job.advance(status) {
            entry.result = result;
            info!("Job finished: {}", label);
        }
    }
}
