//! The OpenQASM 2.0 gate vocabulary.

use serde::{Deserialize, Serialize};

use crate::parameter::ParameterExpression;

type Param = ParameterExpression;

/// Gates understood by the simulator.
///
/// The set covers the `qelib1.inc` library plus the variable-arity
/// multi-controlled family. For the `MC*` variants the `u32` is the number
/// of control qubits; controls come first in the operand list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StandardGate {
    I,
    X,
    Y,
    Z,
    H,
    S,
    Sdg,
    T,
    Tdg,
    SX,
    SXdg,
    Rx(Param),
    Ry(Param),
    Rz(Param),
    /// Phase gate, also spelled `u1`.
    P(Param),
    /// `u2(φ, λ)`.
    U2(Param, Param),
    /// `U(θ, φ, λ)`, also spelled `u3` and `u`.
    U(Param, Param, Param),

    CX,
    CY,
    CZ,
    CH,
    CSX,
    Swap,
    ISwap,
    CRx(Param),
    CRy(Param),
    CRz(Param),
    /// Controlled phase, also spelled `cu1`.
    CP(Param),
    CU2(Param, Param),
    CU3(Param, Param, Param),
    RXX(Param),
    RYY(Param),
    RZZ(Param),

    CCX,
    CSwap,

    MCX(u32),
    MCY(u32),
    MCZ(u32),
    MCU1(u32, Param),
    MCU2(u32, Param, Param),
    MCU3(u32, Param, Param, Param),
    MCSwap(u32),
}

impl StandardGate {
    /// Canonical lowercase name, as emitted in OpenQASM.
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            StandardGate::I => "id",
            StandardGate::X => "x",
            StandardGate::Y => "y",
            StandardGate::Z => "z",
            StandardGate::H => "h",
            StandardGate::S => "s",
            StandardGate::Sdg => "sdg",
            StandardGate::T => "t",
            StandardGate::Tdg => "tdg",
            StandardGate::SX => "sx",
            StandardGate::SXdg => "sxdg",
            StandardGate::Rx(_) => "rx",
            StandardGate::Ry(_) => "ry",
            StandardGate::Rz(_) => "rz",
            StandardGate::P(_) => "u1",
            StandardGate::U2(..) => "u2",
            StandardGate::U(..) => "u3",
            StandardGate::CX => "cx",
            StandardGate::CY => "cy",
            StandardGate::CZ => "cz",
            StandardGate::CH => "ch",
            StandardGate::CSX => "csx",
            StandardGate::Swap => "swap",
            StandardGate::ISwap => "iswap",
            StandardGate::CRx(_) => "crx",
            StandardGate::CRy(_) => "cry",
            StandardGate::CRz(_) => "crz",
            StandardGate::CP(_) => "cu1",
            StandardGate::CU2(..) => "cu2",
            StandardGate::CU3(..) => "cu3",
            StandardGate::RXX(_) => "rxx",
            StandardGate::RYY(_) => "ryy",
            StandardGate::RZZ(_) => "rzz",
            StandardGate::CCX => "ccx",
            StandardGate::CSwap => "cswap",
            StandardGate::MCX(_) => "mcx",
            StandardGate::MCY(_) => "mcy",
            StandardGate::MCZ(_) => "mcz",
            StandardGate::MCU1(..) => "mcu1",
            StandardGate::MCU2(..) => "mcu2",
            StandardGate::MCU3(..) => "mcu3",
            StandardGate::MCSwap(_) => "mcswap",
        }
    }

    /// Number of qubit operands.
    #[inline]
    pub fn num_qubits(&self) -> u32 {
        match self {
            StandardGate::I
            | StandardGate::X
            | StandardGate::Y
            | StandardGate::Z
            | StandardGate::H
            | StandardGate::S
            | StandardGate::Sdg
            | StandardGate::T
            | StandardGate::Tdg
            | StandardGate::SX
            | StandardGate::SXdg
            | StandardGate::Rx(_)
            | StandardGate::Ry(_)
            | StandardGate::Rz(_)
            | StandardGate::P(_)
            | StandardGate::U2(..)
            | StandardGate::U(..) => 1,

            StandardGate::CX
            | StandardGate::CY
            | StandardGate::CZ
            | StandardGate::CH
            | StandardGate::CSX
            | StandardGate::Swap
            | StandardGate::ISwap
            | StandardGate::CRx(_)
            | StandardGate::CRy(_)
            | StandardGate::CRz(_)
            | StandardGate::CP(_)
            | StandardGate::CU2(..)
            | StandardGate::CU3(..)
            | StandardGate::RXX(_)
            | StandardGate::RYY(_)
            | StandardGate::RZZ(_) => 2,

            StandardGate::CCX | StandardGate::CSwap => 3,

            StandardGate::MCX(n)
            | StandardGate::MCY(n)
            | StandardGate::MCZ(n)
            | StandardGate::MCU1(n, _)
            | StandardGate::MCU2(n, _, _)
            | StandardGate::MCU3(n, _, _, _) => n + 1,
            StandardGate::MCSwap(n) => n + 2,
        }
    }

    /// Parameters in source order.
    pub fn parameters(&self) -> Vec<&ParameterExpression> {
        match self {
            StandardGate::Rx(p)
            | StandardGate::Ry(p)
            | StandardGate::Rz(p)
            | StandardGate::P(p)
            | StandardGate::CRx(p)
            | StandardGate::CRy(p)
            | StandardGate::CRz(p)
            | StandardGate::CP(p)
            | StandardGate::RXX(p)
            | StandardGate::RYY(p)
            | StandardGate::RZZ(p)
            | StandardGate::MCU1(_, p) => vec![p],

            StandardGate::U2(a, b) | StandardGate::CU2(a, b) | StandardGate::MCU2(_, a, b) => {
                vec![a, b]
            }

            StandardGate::U(a, b, c)
            | StandardGate::CU3(a, b, c)
            | StandardGate::MCU3(_, a, b, c) => vec![a, b, c],

            _ => vec![],
        }
    }

    /// Whether some parameter is still an unbound symbol.
    pub fn is_parameterized(&self) -> bool {
        self.parameters().iter().any(|p| p.is_symbolic())
    }

    /// Control count for the variable-arity family, `None` otherwise.
    pub fn num_controls(&self) -> Option<u32> {
        match self {
            StandardGate::MCX(n)
            | StandardGate::MCY(n)
            | StandardGate::MCZ(n)
            | StandardGate::MCSwap(n)
            | StandardGate::MCU1(n, _)
            | StandardGate::MCU2(n, _, _)
            | StandardGate::MCU3(n, _, _, _) => Some(*n),
            _ => None,
        }
    }
}

/// Guard `if (register == value)` on an instruction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassicalCondition {
    pub register: String,
    pub value: u64,
}

impl ClassicalCondition {
    pub fn new(register: impl Into<String>, value: u64) -> Self {
        Self {
            register: register.into(),
            value,
        }
    }
}
