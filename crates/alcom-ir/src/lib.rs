//! ALCOM circuit intermediate representation.
//!
//! A [`Circuit`] is a flat, validated instruction list over named quantum and
//! classical registers. It is the common currency between the OpenQASM
//! parser, the decision-diagram engine and the backend layer.
//!
//! # Example
//!
//! ```rust
//! use alcom_ir::{Circuit, QubitId};
//!
//! let mut circuit = Circuit::with_size("bell", 2, 2);
//! circuit.h(QubitId(0)).unwrap();
//! circuit.cx(QubitId(0), QubitId(1)).unwrap();
//! circuit.measure_all().unwrap();
//!
//! assert_eq!(circuit.num_qubits(), 2);
//! assert_eq!(circuit.depth(), 3);
//! ```
//!
//! Gate parameters are [`ParameterExpression`]s; symbolic ones must be bound
//! before a circuit can be simulated.

pub mod circuit;
pub mod error;
pub mod gate;
pub mod instruction;
pub mod parameter;
pub mod qubit;

pub use circuit::Circuit;
pub use error::{IrError, IrResult};
pub use gate::{ClassicalCondition, StandardGate};
pub use instruction::{Instruction, InstructionKind};
pub use parameter::{MathFn, ParameterExpression};
pub use qubit::{ClbitId, QubitId, Register};
