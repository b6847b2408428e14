//! OpenQASM 2.0 emitter.

use std::fmt::Write;

use alcom_ir::{Circuit, ClbitId, Instruction, InstructionKind, ParameterExpression, QubitId};

use crate::error::{ParseError, ParseResult};

/// Emit a circuit as OpenQASM 2.0 source.
///
/// Register declarations reproduce the circuit's registers, so names and
/// sizes survive a round trip. Parameters are written with the shortest
/// decimal form that reads back to the same `f64`; symbolic parameters are
/// rejected.
pub fn emit(circuit: &Circuit) -> ParseResult<String> {
    let mut emitter = Emitter {
        circuit,
        output: String::new(),
    };
    emitter.emit_circuit()?;
    Ok(emitter.output)
}

struct Emitter<'a> {
    circuit: &'a Circuit,
    output: String,
}

impl Emitter<'_> {
    fn emit_circuit(&mut self) -> ParseResult<()> {
        self.output.push_str("OPENQASM 2.0;\ninclude \"qelib1.inc\";\n");
        for reg in self.circuit.qregs() {
            let _ = writeln!(self.output, "qreg {}[{}];", reg.name, reg.size);
        }
        for reg in self.circuit.cregs() {
            let _ = writeln!(self.output, "creg {}[{}];", reg.name, reg.size);
        }
        for instruction in self.circuit.instructions() {
            self.emit_instruction(instruction)?;
        }
        Ok(())
    }

    fn emit_instruction(&mut self, instruction: &Instruction) -> ParseResult<()> {
        let prefix = instruction
            .condition
            .as_ref()
            .map(|c| format!("if({}=={}) ", c.register, c.value))
            .unwrap_or_default();

        match &instruction.kind {
            InstructionKind::Gate(gate) => {
                let params = gate
                    .parameters()
                    .into_iter()
                    .map(format_param)
                    .collect::<ParseResult<Vec<_>>>()?;
                let qubits = self.qubit_list(&instruction.qubits);
                let _ = if params.is_empty() {
                    writeln!(self.output, "{prefix}{} {qubits};", gate.name())
                } else {
                    writeln!(
                        self.output,
                        "{prefix}{}({}) {qubits};",
                        gate.name(),
                        params.join(",")
                    )
                };
            }
            InstructionKind::Measure => {
                for (q, c) in instruction.qubits.iter().zip(&instruction.clbits) {
                    let line = format!("{prefix}measure {} -> {};", self.qubit(*q), self.clbit(*c));
                    let _ = writeln!(self.output, "{line}");
                }
            }
            InstructionKind::Reset => {
                for q in &instruction.qubits {
                    let line = format!("{prefix}reset {};", self.qubit(*q));
                    let _ = writeln!(self.output, "{line}");
                }
            }
            InstructionKind::Barrier => {
                if !instruction.qubits.is_empty() {
                    let qubits = self.qubit_list(&instruction.qubits);
                    let _ = writeln!(self.output, "barrier {qubits};");
                }
            }
        }
        Ok(())
    }

    fn qubit(&self, q: QubitId) -> String {
        self.circuit
            .qregs()
            .iter()
            .find(|r| r.contains(q.0))
            .map_or_else(|| format!("q[{}]", q.0), |r| format!("{}[{}]", r.name, q.0 - r.start))
    }

    fn clbit(&self, c: ClbitId) -> String {
        self.circuit
            .cregs()
            .iter()
            .find(|r| r.contains(c.0))
            .map_or_else(|| format!("c[{}]", c.0), |r| format!("{}[{}]", r.name, c.0 - r.start))
    }

    fn qubit_list(&self, qubits: &[QubitId]) -> String {
        qubits
            .iter()
            .map(|q| self.qubit(*q))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// `Debug` formatting of `f64` is the shortest exact representation and
/// switches to exponent notation for very large or small magnitudes, which
/// the lexer reads back.
fn format_param(param: &ParameterExpression) -> ParseResult<String> {
    let value = param.value()?;
    if !value.is_finite() {
        return Err(ParseError::NonFiniteParameter(param.to_string()));
    }
    Ok(format!("{value:?}"))
}
