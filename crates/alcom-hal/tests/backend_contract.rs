//! Registry and provided-method behavior against an in-memory backend.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use alcom_hal::{
    Backend, BackendAvailability, BackendConfig, BackendFactory, BackendRegistry, Capabilities,
    Counts, ExecutionResult, GateConfig, HalError, HalResult, JobId, JobStatus, RunOptions,
    ValidationResult,
};
use alcom_ir::Circuit;
use async_trait::async_trait;

struct EchoBackend {
    capabilities: Capabilities,
    submitted: AtomicUsize,
}

impl EchoBackend {
    fn new(name: &str, n_qubits: u32, local: bool) -> Self {
        let mut capabilities = Capabilities::simulator(
            name,
            "1.0.0",
            n_qubits,
            vec![GateConfig::new("h", &[], "Hadamard")],
        );
        capabilities.local = local;
        Self {
            capabilities,
            submitted: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl Backend for EchoBackend {
    fn name(&self) -> &str {
        &self.capabilities.backend_name
    }

    fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    async fn availability(&self) -> HalResult<BackendAvailability> {
        Ok(BackendAvailability::operational(0))
    }

    async fn validate(&self, _circuit: &Circuit, _options: &RunOptions) -> HalResult<ValidationResult> {
        Ok(ValidationResult::Valid)
    }

    async fn submit(&self, _circuit: &Circuit, _options: &RunOptions) -> HalResult<JobId> {
        let n = self.submitted.fetch_add(1, Ordering::SeqCst);
        Ok(JobId::new(format!("job-{n}")))
    }

    async fn status(&self, _job_id: &JobId) -> HalResult<JobStatus> {
        Ok(JobStatus::Done)
    }

    async fn result(&self, job_id: &JobId) -> HalResult<ExecutionResult> {
        let counts: Counts = [("0", 4_u64)].into_iter().collect();
        Ok(ExecutionResult::new(counts, 4).with_job_id(job_id.as_str()))
    }

    async fn cancel(&self, _job_id: &JobId) -> HalResult<()> {
        Ok(())
    }
}

impl BackendFactory for EchoBackend {
    fn from_config(config: BackendConfig) -> HalResult<Self> {
        let n_qubits = config.get_u64("n_qubits").unwrap_or(4) as u32;
        Ok(EchoBackend::new(&config.name, n_qubits, true))
    }
}

#[tokio::test]
async fn test_batch_of_two_is_rejected_before_submit() {
    let backend = EchoBackend::new("echo", 2, true);
    let circuits = vec![Circuit::bell().unwrap(), Circuit::bell().unwrap()];

    let err = backend
        .submit_batch(&circuits, &RunOptions::with_shots(4))
        .await
        .unwrap_err();
    assert!(matches!(err, HalError::StructuralValidation(_)));
    assert_eq!(backend.submitted.load(Ordering::SeqCst), 0);

    let err = backend
        .submit_batch(&[], &RunOptions::with_shots(4))
        .await
        .unwrap_err();
    assert!(matches!(err, HalError::StructuralValidation(_)));
}

#[tokio::test]
async fn test_single_batch_and_wait() {
    let backend = EchoBackend::new("echo", 2, true);
    let job = backend
        .submit_batch(&[Circuit::bell().unwrap()], &RunOptions::with_shots(4))
        .await
        .unwrap();
    let result = backend.wait(&job).await.unwrap();
    assert_eq!(result.job_id, "job-0");
    assert_eq!(result.get_counts().get("0"), 4);
}

#[test]
fn test_registry_get_and_filter() {
    let mut registry = BackendRegistry::new();
    registry.register(Arc::new(EchoBackend::new("small", 5, true)));
    registry.register(Arc::new(EchoBackend::new("remote", 40, false)));

    assert_eq!(registry.names(), vec!["remote", "small"]);
    assert_eq!(registry.get("small").unwrap().capabilities().n_qubits, 5);

    let large = registry.filter(|b| b.capabilities().n_qubits > 10);
    assert_eq!(large.len(), 1);
    assert_eq!(large[0].name(), "remote");

    let local = registry.filter_by("local", &serde_json::json!(true));
    assert_eq!(local.len(), 1);
    assert_eq!(local[0].name(), "small");

    assert!(registry.filter_by("no_such_key", &serde_json::json!(1)).is_empty());
}

#[test]
fn test_registry_creates_from_factory() {
    let mut registry = BackendRegistry::new();
    registry.register_type::<EchoBackend>("echo");

    let backend = registry
        .create(
            "echo",
            BackendConfig::new("echo").with_extra("n_qubits", serde_json::json!(7)),
        )
        .unwrap();
    assert_eq!(backend.capabilities().n_qubits, 7);
    assert!(registry.has_backend("echo"));
}
