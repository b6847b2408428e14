//! Decision-diagram quantum circuit simulator.
//!
//! States are edge-weighted vector diagrams over a per-run [`Package`];
//! gates are matrix diagrams multiplied into the state. Identical
//! sub-vectors are stored once, so structured states such as GHZ stay
//! linear in the number of qubits.
//!
//! # Example
//!
//! ```rust
//! use alcom_dd::Simulator;
//!
//! let qasm = r#"
//!     OPENQASM 2.0;
//!     include "qelib1.inc";
//!     qreg q[2];
//!     creg c[2];
//!     h q[0];
//!     cx q[0], q[1];
//!     measure q -> c;
//! "#;
//!
//! let out = Simulator::new().simulate(qasm, true, 100).unwrap();
//! assert_eq!(out.counts.values().sum::<u64>(), 100);
//! assert!(out.counts.keys().all(|k| k == "00" || k == "11"));
//! ```

pub mod complex;
pub mod error;
pub mod gates;
pub mod measure;
pub mod node;
pub mod package;
pub mod program;
pub mod simulator;

pub use error::{DdError, DdResult};
pub use node::{Edge, NodeId};
pub use package::Package;
pub use program::{Condition, Operation, Program};
pub use simulator::{
    CancelToken, MAX_STATEVECTOR_QUBITS, SimulationOptions, SimulationOutput, Simulator,
};
