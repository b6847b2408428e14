//! Narrow entry point between the backend and the simulation engine.
//!
//! The backend never touches the decision-diagram engine directly; it hands
//! OpenQASM text to a [`Controller`] from a blocking worker thread.

use alcom_dd::{CancelToken, DdError, SimulationOptions, SimulationOutput, Simulator};
use thiserror::Error;
use tracing::debug;

/// One single-experiment simulation.
#[derive(Debug, Clone)]
pub struct SimulationRequest<'a> {
    /// OpenQASM 2.0 text of exactly one experiment.
    pub qasm: &'a str,
    pub statevector: bool,
    pub shots: u32,
    pub seed: Option<u64>,
    pub cancel: CancelToken,
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ControllerError {
    /// Input holds more than one experiment; rejected before any work.
    #[error("Expected a single experiment, found {0}")]
    MultipleExperiments(usize),

    #[error("Simulation cancelled")]
    Cancelled,

    #[error(transparent)]
    Engine(DdError),
}

impl From<DdError> for ControllerError {
    fn from(err: DdError) -> Self {
        match err {
            DdError::MultipleExperiments(n) => ControllerError::MultipleExperiments(n),
            DdError::Cancelled => ControllerError::Cancelled,
            other => ControllerError::Engine(other),
        }
    }
}

/// A simulation engine reachable from a blocking thread.
pub trait Controller: Send + Sync {
    fn simulate(&self, request: &SimulationRequest<'_>) -> Result<SimulationOutput, ControllerError>;
}

/// [`Controller`] backed by the decision-diagram simulator.
#[derive(Debug, Clone, Default)]
pub struct DdController {
    simulator: Simulator,
}

impl DdController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_gc_threshold(gc_threshold: usize) -> Self {
        Self {
            simulator: Simulator::with_gc_threshold(gc_threshold),
        }
    }
}

impl Controller for DdController {
    fn simulate(&self, request: &SimulationRequest<'_>) -> Result<SimulationOutput, ControllerError> {
        let experiments = alcom_qasm::count_experiments(request.qasm).map_err(DdError::from)?;
        if experiments > 1 {
            return Err(ControllerError::MultipleExperiments(experiments));
        }
        debug!(shots = request.shots, "Handing circuit to DD engine");
        let options = SimulationOptions {
            shots: request.shots,
            statevector: request.statevector,
            seed: request.seed,
            cancel: Some(request.cancel.clone()),
        };
        Ok(self.simulator.simulate_with(request.qasm, &options)?)
    }
}
