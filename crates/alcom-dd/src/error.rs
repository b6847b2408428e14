//! Error types for the decision-diagram engine.

use alcom_ir::IrError;
use alcom_qasm::ParseError;
use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DdError {
    /// The source text could not be read as a circuit.
    #[error("Invalid circuit text: {0}")]
    Parse(ParseError),

    /// The source text holds more than one circuit.
    #[error("Expected a single experiment, found {0}")]
    MultipleExperiments(usize),

    #[error("Circuit error: {0}")]
    Circuit(#[from] IrError),

    #[error("Shot count must be positive")]
    InvalidShots,

    #[error("Statevector of {qubits} qubits exceeds the supported maximum of {max}")]
    StatevectorTooLarge { qubits: usize, max: usize },

    /// The run was stopped through its cancel token.
    #[error("Simulation cancelled")]
    Cancelled,
}

impl From<ParseError> for DdError {
    fn from(err: ParseError) -> Self {
        match err {
            ParseError::MultipleExperiments(n) => DdError::MultipleExperiments(n),
            other => DdError::Parse(other),
        }
    }
}

pub type DdResult<T> = Result<T, DdError>;
