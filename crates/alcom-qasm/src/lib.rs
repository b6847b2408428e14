//! OpenQASM 2.0 parser and emitter for ALCOM.
//!
//! | Feature | Example |
//! |---------|---------|
//! | Header and library include | `OPENQASM 2.0; include "qelib1.inc";` |
//! | Registers | `qreg q[5]; creg c[5];` |
//! | Gate calls with broadcast | `h q;`, `cx q[0], r;` |
//! | Parameter expressions | `u3(pi/2, -theta, sqrt(2)^-1) q[0];` |
//! | Measurement, reset, barrier | `measure q -> c;`, `reset q[1];` |
//! | Classical conditions | `if (c == 3) x q[2];` |
//! | Gate definitions (expanded inline) | `gate bell a, b { h a; cx a, b; }` |
//! | Multi-controlled gates | `mcx q[0], q[1], q[2], q[3];` |
//!
//! # Example
//!
//! ```rust
//! use alcom_qasm::{emit, parse};
//!
//! let source = r#"
//!     OPENQASM 2.0;
//!     include "qelib1.inc";
//!     qreg q[2];
//!     creg c[2];
//!     h q[0];
//!     cx q[0], q[1];
//!     measure q -> c;
//! "#;
//!
//! let circuit = parse(source).unwrap();
//! assert_eq!(circuit.num_qubits(), 2);
//!
//! let text = emit(&circuit).unwrap();
//! assert!(text.contains("cx q[0], q[1];"));
//! ```

pub mod ast;
pub mod emitter;
pub mod error;
pub mod lexer;
mod parser;

pub use emitter::emit;
pub use error::{ParseError, ParseResult};
pub use parser::{count_experiments, parse, parse_ast};
