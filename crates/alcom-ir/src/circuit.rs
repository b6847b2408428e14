//! Circuit container and builder API.

use serde::{Deserialize, Serialize};

use crate::error::{IrError, IrResult};
use crate::gate::{ClassicalCondition, StandardGate};
use crate::instruction::{Instruction, InstructionKind};
use crate::parameter::ParameterExpression;
use crate::qubit::{ClbitId, QubitId, Register};

/// A single-experiment quantum circuit.
///
/// Qubits and classical bits live in named registers; instructions address
/// them by flat index. Every instruction is validated when it is appended,
/// so a `Circuit` never references a bit it does not declare.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circuit {
    name: String,
    qregs: Vec<Register>,
    cregs: Vec<Register>,
    instructions: Vec<Instruction>,
}

impl Circuit {
    /// Create an empty circuit without registers.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            qregs: vec![],
            cregs: vec![],
            instructions: vec![],
        }
    }

    /// Create a circuit with one `q` and one `c` register.
    ///
    /// A zero size skips the corresponding register.
    pub fn with_size(name: impl Into<String>, num_qubits: u32, num_clbits: u32) -> Self {
        let mut circuit = Self::new(name);
        if num_qubits > 0 {
            circuit.qregs.push(Register::new("q", num_qubits, 0));
        }
        if num_clbits > 0 {
            circuit.cregs.push(Register::new("c", num_clbits, 0));
        }
        circuit
    }

    /// Declare a quantum register and return its qubits.
    pub fn add_qreg(&mut self, name: impl Into<String>, size: u32) -> IrResult<Vec<QubitId>> {
        let name = name.into();
        if self.register_name_taken(&name) {
            return Err(IrError::DuplicateRegister(name));
        }
        let start = self.num_qubits() as u32;
        self.qregs.push(Register::new(name, size, start));
        Ok((start..start + size).map(QubitId).collect())
    }

    /// Declare a classical register and return its bits.
    pub fn add_creg(&mut self, name: impl Into<String>, size: u32) -> IrResult<Vec<ClbitId>> {
        let name = name.into();
        if self.register_name_taken(&name) {
            return Err(IrError::DuplicateRegister(name));
        }
        let start = self.num_clbits() as u32;
        self.cregs.push(Register::new(name, size, start));
        Ok((start..start + size).map(ClbitId).collect())
    }

    fn register_name_taken(&self, name: &str) -> bool {
        self.qregs.iter().chain(&self.cregs).any(|r| r.name == name)
    }

    /// Append an instruction after checking its operands.
    pub fn push(&mut self, instruction: Instruction) -> IrResult<&mut Self> {
        self.check(&instruction)?;
        self.instructions.push(instruction);
        Ok(self)
    }

    fn check(&self, inst: &Instruction) -> IrResult<()> {
        let gate_name = || Some(inst.name().to_string());
        let num_qubits = self.num_qubits() as u32;
        let num_clbits = self.num_clbits() as u32;

        for (i, &q) in inst.qubits.iter().enumerate() {
            if q.0 >= num_qubits {
                return Err(IrError::QubitNotFound {
                    qubit: q,
                    gate_name: gate_name(),
                });
            }
            if inst.qubits[..i].contains(&q) {
                return Err(IrError::DuplicateQubit {
                    qubit: q,
                    gate_name: gate_name(),
                });
            }
        }
        for &c in &inst.clbits {
            if c.0 >= num_clbits {
                return Err(IrError::ClbitNotFound {
                    clbit: c,
                    gate_name: gate_name(),
                });
            }
        }

        match &inst.kind {
            InstructionKind::Gate(g) => {
                let expected = g.num_qubits();
                let got = inst.qubits.len() as u32;
                if expected != got {
                    return Err(IrError::QubitCountMismatch {
                        gate_name: g.name().to_string(),
                        expected,
                        got,
                    });
                }
            }
            InstructionKind::Measure => {
                if inst.qubits.len() != inst.clbits.len() {
                    return Err(IrError::MeasureArity {
                        qubits: inst.qubits.len(),
                        clbits: inst.clbits.len(),
                    });
                }
            }
            InstructionKind::Reset => {
                if inst.qubits.len() != 1 {
                    return Err(IrError::QubitCountMismatch {
                        gate_name: "reset".into(),
                        expected: 1,
                        got: inst.qubits.len() as u32,
                    });
                }
            }
            InstructionKind::Barrier => {}
        }

        if let Some(cond) = &inst.condition {
            if self.creg(&cond.register).is_none() {
                return Err(IrError::RegisterNotFound(cond.register.clone()));
            }
        }
        Ok(())
    }

    /// Append a gate.
    pub fn gate(
        &mut self,
        gate: StandardGate,
        qubits: impl IntoIterator<Item = QubitId>,
    ) -> IrResult<&mut Self> {
        self.push(Instruction::gate(gate, qubits))
    }

    /// Append a gate guarded by `if (register == value)`.
    pub fn gate_if(
        &mut self,
        gate: StandardGate,
        qubits: impl IntoIterator<Item = QubitId>,
        register: &str,
        value: u64,
    ) -> IrResult<&mut Self> {
        self.push(
            Instruction::gate(gate, qubits).with_condition(ClassicalCondition::new(register, value)),
        )
    }

    pub fn h(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.gate(StandardGate::H, [qubit])
    }

    pub fn x(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.gate(StandardGate::X, [qubit])
    }

    pub fn y(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.gate(StandardGate::Y, [qubit])
    }

    pub fn z(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.gate(StandardGate::Z, [qubit])
    }

    pub fn s(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.gate(StandardGate::S, [qubit])
    }

    pub fn t(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.gate(StandardGate::T, [qubit])
    }

    pub fn sx(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.gate(StandardGate::SX, [qubit])
    }

    pub fn rx(&mut self, theta: impl Into<ParameterExpression>, qubit: QubitId) -> IrResult<&mut Self> {
        self.gate(StandardGate::Rx(theta.into()), [qubit])
    }

    pub fn ry(&mut self, theta: impl Into<ParameterExpression>, qubit: QubitId) -> IrResult<&mut Self> {
        self.gate(StandardGate::Ry(theta.into()), [qubit])
    }

    pub fn rz(&mut self, theta: impl Into<ParameterExpression>, qubit: QubitId) -> IrResult<&mut Self> {
        self.gate(StandardGate::Rz(theta.into()), [qubit])
    }

    pub fn p(&mut self, lambda: impl Into<ParameterExpression>, qubit: QubitId) -> IrResult<&mut Self> {
        self.gate(StandardGate::P(lambda.into()), [qubit])
    }

    /// Apply `U(θ, φ, λ)`.
    pub fn u(
        &mut self,
        theta: impl Into<ParameterExpression>,
        phi: impl Into<ParameterExpression>,
        lambda: impl Into<ParameterExpression>,
        qubit: QubitId,
    ) -> IrResult<&mut Self> {
        self.gate(
            StandardGate::U(theta.into(), phi.into(), lambda.into()),
            [qubit],
        )
    }

    pub fn cx(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.gate(StandardGate::CX, [control, target])
    }

    pub fn cz(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.gate(StandardGate::CZ, [control, target])
    }

    pub fn cp(
        &mut self,
        lambda: impl Into<ParameterExpression>,
        control: QubitId,
        target: QubitId,
    ) -> IrResult<&mut Self> {
        self.gate(StandardGate::CP(lambda.into()), [control, target])
    }

    pub fn swap(&mut self, q1: QubitId, q2: QubitId) -> IrResult<&mut Self> {
        self.gate(StandardGate::Swap, [q1, q2])
    }

    pub fn ccx(&mut self, c1: QubitId, c2: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.gate(StandardGate::CCX, [c1, c2, target])
    }

    /// Multi-controlled X; `controls` come first in the operand list.
    pub fn mcx(&mut self, controls: &[QubitId], target: QubitId) -> IrResult<&mut Self> {
        let operands = controls.iter().copied().chain([target]);
        self.gate(StandardGate::MCX(controls.len() as u32), operands)
    }

    pub fn measure(&mut self, qubit: QubitId, clbit: ClbitId) -> IrResult<&mut Self> {
        self.push(Instruction::measure(qubit, clbit))
    }

    /// Measure qubit `i` into classical bit `i` for every qubit.
    ///
    /// When there are fewer classical bits than qubits a `meas` register
    /// covering the difference is declared first.
    pub fn measure_all(&mut self) -> IrResult<&mut Self> {
        let nq = self.num_qubits() as u32;
        let nc = self.num_clbits() as u32;
        if nc < nq {
            self.add_creg("meas", nq - nc)?;
        }
        for i in 0..nq {
            self.measure(QubitId(i), ClbitId(i))?;
        }
        Ok(self)
    }

    pub fn reset(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.push(Instruction::reset(qubit))
    }

    pub fn barrier(&mut self, qubits: impl IntoIterator<Item = QubitId>) -> IrResult<&mut Self> {
        self.push(Instruction::barrier(qubits))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn num_qubits(&self) -> usize {
        self.qregs.iter().map(|r| r.size as usize).sum()
    }

    pub fn num_clbits(&self) -> usize {
        self.cregs.iter().map(|r| r.size as usize).sum()
    }

    pub fn qregs(&self) -> &[Register] {
        &self.qregs
    }

    pub fn cregs(&self) -> &[Register] {
        &self.cregs
    }

    pub fn qreg(&self, name: &str) -> Option<&Register> {
        self.qregs.iter().find(|r| r.name == name)
    }

    pub fn creg(&self, name: &str) -> Option<&Register> {
        self.cregs.iter().find(|r| r.name == name)
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn has_measurements(&self) -> bool {
        self.instructions.iter().any(Instruction::is_measure)
    }

    /// Number of layers when every instruction is scheduled as early as its
    /// qubits and classical bits allow. Barriers synchronize but add no layer.
    pub fn depth(&self) -> usize {
        let mut qubit_level = vec![0usize; self.num_qubits()];
        let mut clbit_level = vec![0usize; self.num_clbits()];
        let mut depth = 0;

        for inst in &self.instructions {
            let mut clbits: Vec<usize> = inst.clbits.iter().map(|c| c.0 as usize).collect();
            if let Some(reg) = inst.condition.as_ref().and_then(|c| self.creg(&c.register)) {
                clbits.extend(reg.indices().map(|i| i as usize));
            }

            let start = inst
                .qubits
                .iter()
                .map(|q| qubit_level[q.0 as usize])
                .chain(clbits.iter().map(|&c| clbit_level[c]))
                .max()
                .unwrap_or(0);
            let level = if matches!(inst.kind, InstructionKind::Barrier) {
                start
            } else {
                start + 1
            };

            for q in &inst.qubits {
                qubit_level[q.0 as usize] = level;
            }
            for c in clbits {
                clbit_level[c] = level;
            }
            depth = depth.max(level);
        }
        depth
    }

    /// H on qubit 0, CX onto qubit 1, measure both.
    pub fn bell() -> IrResult<Self> {
        let mut circuit = Self::with_size("bell", 2, 2);
        circuit
            .h(QubitId(0))?
            .cx(QubitId(0), QubitId(1))?
            .measure(QubitId(0), ClbitId(0))?
            .measure(QubitId(1), ClbitId(1))?;
        Ok(circuit)
    }

    /// n-qubit GHZ preparation with a CX chain, measured.
    pub fn ghz(n: u32) -> IrResult<Self> {
        let mut circuit = Self::with_size(format!("ghz_{n}"), n, n);
        if n == 0 {
            return Ok(circuit);
        }
        circuit.h(QubitId(0))?;
        for i in 0..n - 1 {
            circuit.cx(QubitId(i), QubitId(i + 1))?;
        }
        circuit.measure_all()?;
        Ok(circuit)
    }

    /// Textbook QFT with final bit-reversal swaps, unmeasured.
    pub fn qft(n: u32) -> IrResult<Self> {
        use std::f64::consts::PI;

        let mut circuit = Self::with_size(format!("qft_{n}"), n, 0);
        for i in 0..n {
            circuit.h(QubitId(i))?;
            for j in (i + 1)..n {
                let angle = PI / f64::from(1u32 << (j - i));
                circuit.cp(angle, QubitId(j), QubitId(i))?;
            }
        }
        for i in 0..n / 2 {
            circuit.swap(QubitId(i), QubitId(n - 1 - i))?;
        }
        Ok(circuit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_with_size() {
        let circuit = Circuit::with_size("test", 3, 2);
        assert_eq!(circuit.num_qubits(), 3);
        assert_eq!(circuit.num_clbits(), 2);
        assert_eq!(circuit.qregs()[0].name, "q");
        assert_eq!(circuit.cregs()[0].name, "c");

        let empty = Circuit::with_size("none", 0, 0);
        assert!(empty.qregs().is_empty());
        assert!(empty.cregs().is_empty());
    }

    #[test]
    fn test_named_registers() {
        let mut circuit = Circuit::new("regs");
        let a = circuit.add_qreg("a", 2).unwrap();
        let b = circuit.add_qreg("b", 3).unwrap();
        assert_eq!(a, vec![QubitId(0), QubitId(1)]);
        assert_eq!(b[0], QubitId(2));
        assert_eq!(circuit.qreg("b").map(|r| r.start), Some(2));
        assert!(matches!(
            circuit.add_creg("a", 1),
            Err(IrError::DuplicateRegister(ref n)) if n == "a"
        ));
    }

    #[test]
    fn test_push_validates_operands() {
        let mut circuit = Circuit::with_size("v", 2, 1);
        assert!(matches!(
            circuit.h(QubitId(2)),
            Err(IrError::QubitNotFound { .. })
        ));
        assert!(matches!(
            circuit.cx(QubitId(1), QubitId(1)),
            Err(IrError::DuplicateQubit { .. })
        ));
        assert!(matches!(
            circuit.measure(QubitId(0), ClbitId(1)),
            Err(IrError::ClbitNotFound { .. })
        ));
        assert!(matches!(
            circuit.gate(StandardGate::CX, [QubitId(0)]),
            Err(IrError::QubitCountMismatch { expected: 2, got: 1, .. })
        ));
        assert!(matches!(
            circuit.gate_if(StandardGate::X, [QubitId(0)], "nope", 1),
            Err(IrError::RegisterNotFound(_))
        ));
        assert!(circuit.is_empty());
    }

    #[test]
    fn test_bell_depth() {
        let circuit = Circuit::bell().unwrap();
        assert_eq!(circuit.len(), 4);
        assert!(circuit.has_measurements());
        assert_eq!(circuit.depth(), 3);
    }

    #[test]
    fn test_ghz_and_qft() {
        let ghz = Circuit::ghz(5).unwrap();
        assert_eq!(ghz.num_qubits(), 5);
        assert_eq!(ghz.num_clbits(), 5);

        let qft = Circuit::qft(3).unwrap();
        assert!(!qft.has_measurements());
        // 3 H + 3 CP + 1 swap
        assert_eq!(qft.len(), 7);
    }

    #[test]
    fn test_measure_all_adds_register() {
        let mut circuit = Circuit::with_size("m", 3, 1);
        circuit.measure_all().unwrap();
        assert_eq!(circuit.num_clbits(), 3);
        assert_eq!(circuit.creg("meas").map(|r| (r.start, r.size)), Some((1, 2)));
    }

    #[test]
    fn test_multi_controlled_builder() {
        let mut circuit = Circuit::with_size("mc", 4, 0);
        circuit
            .mcx(&[QubitId(0), QubitId(1), QubitId(2)], QubitId(3))
            .unwrap()
            .rx(PI / 2.0, QubitId(0))
            .unwrap();
        assert_eq!(
            circuit.instructions()[0].as_gate(),
            Some(&StandardGate::MCX(3))
        );
    }
}
