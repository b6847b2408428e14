//! Flattened gate sequence executed by the simulator.

use alcom_ir::{Circuit, InstructionKind, IrError, Register};

use crate::error::DdResult;
use crate::gates::{self, Controlled};

/// `register == value` over a contiguous clbit range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Condition {
    pub start: u32,
    pub size: u32,
    pub value: u64,
}

impl Condition {
    /// Evaluate against the classical bits, bit `start` being the least
    /// significant.
    pub fn holds(&self, clbits: &[bool]) -> bool {
        (0..self.size).all(|i| {
            let bit = clbits[(self.start + i) as usize];
            let expected = i < 64 && (self.value >> i) & 1 == 1;
            bit == expected
        }) && (self.size >= 64 || self.value >> self.size == 0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// One source gate, lowered to controlled single-qubit steps.
    Unitary {
        steps: Vec<Controlled>,
        condition: Option<Condition>,
    },
    Measure {
        qubit: u32,
        clbit: u32,
        condition: Option<Condition>,
    },
    Reset {
        qubit: u32,
        condition: Option<Condition>,
    },
    Barrier,
}

impl Operation {
    pub fn condition(&self) -> Option<&Condition> {
        match self {
            Operation::Unitary { condition, .. }
            | Operation::Measure { condition, .. }
            | Operation::Reset { condition, .. } => condition.as_ref(),
            Operation::Barrier => None,
        }
    }

    /// Qubits this operation reads or writes.
    pub fn touches(&self, qubit: u32) -> bool {
        match self {
            Operation::Unitary { steps, .. } => steps
                .iter()
                .any(|s| s.target == qubit || s.controls.contains(&qubit)),
            Operation::Measure { qubit: q, .. } | Operation::Reset { qubit: q, .. } => *q == qubit,
            Operation::Barrier => false,
        }
    }
}

/// A circuit ready for the engine: numeric parameters, flat qubit and clbit
/// indices, classical register layout.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub num_qubits: u32,
    pub num_clbits: u32,
    pub cregs: Vec<Register>,
    pub ops: Vec<Operation>,
}

impl Program {
    /// Lower a circuit; fails if a gate parameter is still symbolic.
    pub fn from_circuit(circuit: &Circuit) -> DdResult<Self> {
        let mut ops = Vec::with_capacity(circuit.len());
        for inst in circuit.instructions() {
            let condition = match &inst.condition {
                Some(cond) => {
                    let reg = circuit
                        .creg(&cond.register)
                        .ok_or_else(|| IrError::RegisterNotFound(cond.register.clone()))?;
                    Some(Condition {
                        start: reg.start,
                        size: reg.size,
                        value: cond.value,
                    })
                }
                None => None,
            };

            let qubits: Vec<u32> = inst.qubits.iter().map(|q| q.0).collect();
            match &inst.kind {
                InstructionKind::Gate(gate) => ops.push(Operation::Unitary {
                    steps: gates::lower(gate, &qubits)?,
                    condition,
                }),
                InstructionKind::Measure => {
                    for (q, c) in inst.qubits.iter().zip(&inst.clbits) {
                        ops.push(Operation::Measure {
                            qubit: q.0,
                            clbit: c.0,
                            condition,
                        });
                    }
                }
                InstructionKind::Reset => {
                    for q in &qubits {
                        ops.push(Operation::Reset {
                            qubit: *q,
                            condition,
                        });
                    }
                }
                InstructionKind::Barrier => ops.push(Operation::Barrier),
            }
        }

        Ok(Self {
            num_qubits: circuit.num_qubits() as u32,
            num_clbits: circuit.num_clbits() as u32,
            cregs: circuit.cregs().to_vec(),
            ops,
        })
    }

    pub fn has_measurements(&self) -> bool {
        self.ops
            .iter()
            .any(|op| matches!(op, Operation::Measure { .. }))
    }

    /// Whether every shot can be sampled from one final state: no
    /// conditions, no resets, and nothing touches a qubit after it has been
    /// measured.
    pub fn is_terminal_measurement(&self) -> bool {
        let mut measured = vec![false; self.num_qubits as usize];
        for op in &self.ops {
            if op.condition().is_some() {
                return false;
            }
            match op {
                Operation::Reset { .. } => return false,
                Operation::Measure { qubit, .. } => measured[*qubit as usize] = true,
                Operation::Unitary { .. } => {
                    if (0..self.num_qubits).any(|q| measured[q as usize] && op.touches(q)) {
                        return false;
                    }
                }
                Operation::Barrier => {}
            }
        }
        true
    }

    /// Index of the first operation that cannot be folded into a shared
    /// unitary prefix.
    pub fn unitary_prefix_len(&self) -> usize {
        self.ops
            .iter()
            .position(|op| {
                !matches!(
                    op,
                    Operation::Unitary {
                        condition: None,
                        ..
                    } | Operation::Barrier
                )
            })
            .unwrap_or(self.ops.len())
    }
}
