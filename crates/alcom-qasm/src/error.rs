//! Error types for the OpenQASM 2.0 front end.

use alcom_ir::IrError;
use thiserror::Error;

/// Errors raised while reading or writing OpenQASM 2.0.
///
/// Variants produced while reading a source carry the 1-based line number
/// of the offending statement.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ParseError {
    #[error("line {line}: {message}")]
    Lexer { line: usize, message: String },

    #[error("line {line}: expected {expected}, found {found}")]
    UnexpectedToken {
        line: usize,
        expected: String,
        found: String,
    },

    #[error("Unexpected end of input: expected {0}")]
    UnexpectedEof(String),

    #[error("Missing OPENQASM header")]
    MissingHeader,

    #[error("line {line}: unsupported OPENQASM version {version}, only 2.0 is accepted")]
    InvalidVersion { line: usize, version: String },

    /// The text holds more than one `OPENQASM` header.
    #[error("Input contains {0} experiments; exactly one circuit is supported per run")]
    MultipleExperiments(usize),

    #[error("line {line}: unsupported include \"{file}\"")]
    UnsupportedInclude { line: usize, file: String },

    #[error("line {line}: '{name}' is already declared")]
    DuplicateDeclaration { line: usize, name: String },

    #[error("line {line}: undefined register '{name}'")]
    UndefinedRegister { line: usize, name: String },

    #[error("line {line}: undefined identifier '{name}'")]
    UndefinedIdentifier { line: usize, name: String },

    #[error("line {line}: unknown gate '{name}'")]
    UnknownGate { line: usize, name: String },

    #[error("line {line}: gate '{name}' is declared opaque and has no definition")]
    OpaqueGate { line: usize, name: String },

    #[error("line {line}: gate '{gate}' expects {expected} qubit arguments, got {got}")]
    WrongQubitCount {
        line: usize,
        gate: String,
        expected: String,
        got: usize,
    },

    #[error("line {line}: gate '{gate}' expects {expected} parameters, got {got}")]
    WrongParameterCount {
        line: usize,
        gate: String,
        expected: usize,
        got: usize,
    },

    #[error("line {line}: index {index} out of bounds for register '{register}' of size {size}")]
    IndexOutOfBounds {
        line: usize,
        register: String,
        index: u32,
        size: u32,
    },

    #[error("line {line}: register arguments of '{operation}' have different sizes")]
    RegisterSizeMismatch { line: usize, operation: String },

    #[error("line {line}: {message}")]
    InvalidExpression { line: usize, message: String },

    #[error("line {line}: {source}")]
    Circuit {
        line: usize,
        #[source]
        source: IrError,
    },

    /// Raised by the emitter for a parameter that has no OpenQASM spelling.
    #[error("Cannot emit parameter {0}: value is not a finite number")]
    NonFiniteParameter(String),

    #[error(transparent)]
    Ir(#[from] IrError),
}

impl ParseError {
    /// Line of the offending statement, when known.
    pub fn line(&self) -> Option<usize> {
        match self {
            ParseError::Lexer { line, .. }
            | ParseError::UnexpectedToken { line, .. }
            | ParseError::InvalidVersion { line, .. }
            | ParseError::UnsupportedInclude { line, .. }
            | ParseError::DuplicateDeclaration { line, .. }
            | ParseError::UndefinedRegister { line, .. }
            | ParseError::UndefinedIdentifier { line, .. }
            | ParseError::UnknownGate { line, .. }
            | ParseError::OpaqueGate { line, .. }
            | ParseError::WrongQubitCount { line, .. }
            | ParseError::WrongParameterCount { line, .. }
            | ParseError::IndexOutOfBounds { line, .. }
            | ParseError::RegisterSizeMismatch { line, .. }
            | ParseError::InvalidExpression { line, .. }
            | ParseError::Circuit { line, .. } => Some(*line),
            _ => None,
        }
    }
}

pub type ParseResult<T> = Result<T, ParseError>;
