//! Lowering from the syntax tree to a [`Circuit`].
//!
//! User `gate` definitions are expanded inline, register arguments are
//! broadcast, and every parameter expression is evaluated to a number.

use std::rc::Rc;

use alcom_ir::{
    Circuit, ClassicalCondition, ClbitId, Instruction, IrError, ParameterExpression, QubitId,
    StandardGate,
};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::ast::{
    Argument, BinOp, Condition, Expression, GateBodyOp, GateCall, GateDef, Operation, Program,
    StatementKind,
};
use crate::error::{ParseError, ParseResult};

pub(crate) fn lower_to_circuit(program: &Program) -> ParseResult<Circuit> {
    let mut lowering = Lowering::default();
    for statement in &program.statements {
        lowering.line = statement.line;
        lowering.lower_statement(&statement.kind)?;
    }
    Ok(lowering.circuit)
}

/// Qubit arity of a built-in gate.
#[derive(Clone, Copy)]
enum Arity {
    Fixed(usize),
    /// Any number (at least one) of controls followed by `targets` targets.
    Controlled { targets: usize },
}

struct Builtin {
    params: usize,
    arity: Arity,
    build: fn(&[f64], u32) -> StandardGate,
}

fn fixed(params: usize, qubits: usize, build: fn(&[f64], u32) -> StandardGate) -> Builtin {
    Builtin {
        params,
        arity: Arity::Fixed(qubits),
        build,
    }
}

fn controlled(params: usize, targets: usize, build: fn(&[f64], u32) -> StandardGate) -> Builtin {
    Builtin {
        params,
        arity: Arity::Controlled { targets },
        build,
    }
}

fn p(value: f64) -> ParameterExpression {
    ParameterExpression::Constant(value)
}

/// The `qelib1.inc` gates plus `U`, `CX` and the multi-controlled family.
fn builtin(name: &str) -> Option<Builtin> {
    use StandardGate as G;

    Some(match name {
        "U" | "u" | "u3" => fixed(3, 1, |a, _| G::U(p(a[0]), p(a[1]), p(a[2]))),
        "u2" => fixed(2, 1, |a, _| G::U2(p(a[0]), p(a[1]))),
        "u1" | "p" => fixed(1, 1, |a, _| G::P(p(a[0]))),
        "id" => fixed(0, 1, |_, _| G::I),
        "x" => fixed(0, 1, |_, _| G::X),
        "y" => fixed(0, 1, |_, _| G::Y),
        "z" => fixed(0, 1, |_, _| G::Z),
        "h" => fixed(0, 1, |_, _| G::H),
        "s" => fixed(0, 1, |_, _| G::S),
        "sdg" => fixed(0, 1, |_, _| G::Sdg),
        "t" => fixed(0, 1, |_, _| G::T),
        "tdg" => fixed(0, 1, |_, _| G::Tdg),
        "sx" => fixed(0, 1, |_, _| G::SX),
        "sxdg" => fixed(0, 1, |_, _| G::SXdg),
        "rx" => fixed(1, 1, |a, _| G::Rx(p(a[0]))),
        "ry" => fixed(1, 1, |a, _| G::Ry(p(a[0]))),
        "rz" => fixed(1, 1, |a, _| G::Rz(p(a[0]))),
        "CX" | "cx" => fixed(0, 2, |_, _| G::CX),
        "cy" => fixed(0, 2, |_, _| G::CY),
        "cz" => fixed(0, 2, |_, _| G::CZ),
        "ch" => fixed(0, 2, |_, _| G::CH),
        "csx" => fixed(0, 2, |_, _| G::CSX),
        "swap" => fixed(0, 2, |_, _| G::Swap),
        "iswap" => fixed(0, 2, |_, _| G::ISwap),
        "crx" => fixed(1, 2, |a, _| G::CRx(p(a[0]))),
        "cry" => fixed(1, 2, |a, _| G::CRy(p(a[0]))),
        "crz" => fixed(1, 2, |a, _| G::CRz(p(a[0]))),
        "cu1" | "cp" => fixed(1, 2, |a, _| G::CP(p(a[0]))),
        "cu2" => fixed(2, 2, |a, _| G::CU2(p(a[0]), p(a[1]))),
        "cu3" => fixed(3, 2, |a, _| G::CU3(p(a[0]), p(a[1]), p(a[2]))),
        "rxx" => fixed(1, 2, |a, _| G::RXX(p(a[0]))),
        "ryy" => fixed(1, 2, |a, _| G::RYY(p(a[0]))),
        "rzz" => fixed(1, 2, |a, _| G::RZZ(p(a[0]))),
        "ccx" => fixed(0, 3, |_, _| G::CCX),
        "cswap" => fixed(0, 3, |_, _| G::CSwap),
        "c3x" => fixed(0, 4, |_, _| G::MCX(3)),
        "c4x" => fixed(0, 5, |_, _| G::MCX(4)),
        "mcx" => controlled(0, 1, |_, n| G::MCX(n)),
        "mcy" => controlled(0, 1, |_, n| G::MCY(n)),
        "mcz" => controlled(0, 1, |_, n| G::MCZ(n)),
        "mcu1" | "mcp" => controlled(1, 1, |a, n| G::MCU1(n, p(a[0]))),
        "mcu2" => controlled(2, 1, |a, n| G::MCU2(n, p(a[0]), p(a[1]))),
        "mcu3" => controlled(3, 1, |a, n| G::MCU3(n, p(a[0]), p(a[1]), p(a[2]))),
        "mcswap" => controlled(0, 2, |_, n| G::MCSwap(n)),
        _ => return None,
    })
}

/// Whether `name` resolves to a built-in gate.
pub(crate) fn is_builtin_gate(name: &str) -> bool {
    builtin(name).is_some()
}

struct Lowering {
    circuit: Circuit,
    gates: FxHashMap<String, Rc<GateDef>>,
    opaque: FxHashSet<String>,
    line: usize,
}

impl Default for Lowering {
    fn default() -> Self {
        Self {
            circuit: Circuit::new("circuit"),
            gates: FxHashMap::default(),
            opaque: FxHashSet::default(),
            line: 1,
        }
    }
}

impl Lowering {
    fn lower_statement(&mut self, kind: &StatementKind) -> ParseResult<()> {
        match kind {
            StatementKind::Include(file) => {
                if file != "qelib1.inc" {
                    return Err(ParseError::UnsupportedInclude {
                        line: self.line,
                        file: file.clone(),
                    });
                }
                Ok(())
            }
            StatementKind::QReg { name, size } => {
                self.check_fresh_name(name)?;
                self.circuit
                    .add_qreg(name.clone(), *size)
                    .map_err(|e| self.ir_error(e))?;
                Ok(())
            }
            StatementKind::CReg { name, size } => {
                self.check_fresh_name(name)?;
                self.circuit
                    .add_creg(name.clone(), *size)
                    .map_err(|e| self.ir_error(e))?;
                Ok(())
            }
            StatementKind::GateDef(def) => self.define_gate(def),
            StatementKind::Opaque { name, .. } => {
                self.check_fresh_name(name)?;
                self.opaque.insert(name.clone());
                Ok(())
            }
            StatementKind::Barrier(args) => {
                let mut qubits = Vec::new();
                for arg in args {
                    for q in self.resolve_qubits(arg)? {
                        if !qubits.contains(&q) {
                            qubits.push(q);
                        }
                    }
                }
                self.push(Instruction::barrier(qubits))
            }
            StatementKind::Operation { op, condition } => {
                let condition = condition
                    .as_ref()
                    .map(|c| self.resolve_condition(c))
                    .transpose()?;
                self.lower_operation(op, condition.as_ref())
            }
        }
    }

    fn check_fresh_name(&self, name: &str) -> ParseResult<()> {
        let taken = self.circuit.qreg(name).is_some()
            || self.circuit.creg(name).is_some()
            || self.gates.contains_key(name)
            || self.opaque.contains(name);
        if taken {
            return Err(ParseError::DuplicateDeclaration {
                line: self.line,
                name: name.into(),
            });
        }
        Ok(())
    }

    fn ir_error(&self, source: IrError) -> ParseError {
        ParseError::Circuit {
            line: self.line,
            source,
        }
    }

    fn push(&mut self, instruction: Instruction) -> ParseResult<()> {
        let line = self.line;
        self.circuit
            .push(instruction)
            .map(|_| ())
            .map_err(|source| ParseError::Circuit { line, source })
    }

    /// Record a definition after checking that its body only calls known
    /// gates on its own formal qubits.
    ///
    /// A definition named like a built-in is accepted but calls keep the
    /// built-in meaning.
    fn define_gate(&mut self, def: &GateDef) -> ParseResult<()> {
        if self.gates.contains_key(&def.name) || self.opaque.contains(&def.name) {
            return Err(ParseError::DuplicateDeclaration {
                line: self.line,
                name: def.name.clone(),
            });
        }
        for op in &def.body {
            let qubits: Vec<&String> = match op {
                GateBodyOp::Call(call) => {
                    let known = is_builtin_gate(&call.name)
                        || self.gates.contains_key(&call.name)
                        || self.opaque.contains(&call.name);
                    if !known {
                        return Err(ParseError::UnknownGate {
                            line: self.line,
                            name: call.name.clone(),
                        });
                    }
                    call.args.iter().map(|a| &a.register).collect()
                }
                GateBodyOp::Barrier(names) => names.iter().collect(),
            };
            if let Some(unknown) = qubits.into_iter().find(|q| !def.qubits.contains(*q)) {
                return Err(ParseError::UndefinedIdentifier {
                    line: self.line,
                    name: unknown.clone(),
                });
            }
        }
        if !is_builtin_gate(&def.name) {
            self.gates.insert(def.name.clone(), Rc::new(def.clone()));
        }
        Ok(())
    }

    fn resolve_condition(&self, condition: &Condition) -> ParseResult<ClassicalCondition> {
        if self.circuit.creg(&condition.register).is_none() {
            return Err(ParseError::UndefinedRegister {
                line: self.line,
                name: condition.register.clone(),
            });
        }
        Ok(ClassicalCondition::new(
            condition.register.clone(),
            condition.value,
        ))
    }

    fn resolve_qubits(&self, arg: &Argument) -> ParseResult<Vec<QubitId>> {
        let reg = self
            .circuit
            .qreg(&arg.register)
            .ok_or_else(|| ParseError::UndefinedRegister {
                line: self.line,
                name: arg.register.clone(),
            })?;
        match arg.index {
            Some(index) if index >= reg.size => Err(ParseError::IndexOutOfBounds {
                line: self.line,
                register: reg.name.clone(),
                index,
                size: reg.size,
            }),
            Some(index) => Ok(vec![QubitId(reg.start + index)]),
            None => Ok(reg.indices().map(QubitId).collect()),
        }
    }

    fn resolve_clbits(&self, arg: &Argument) -> ParseResult<Vec<ClbitId>> {
        let reg = self
            .circuit
            .creg(&arg.register)
            .ok_or_else(|| ParseError::UndefinedRegister {
                line: self.line,
                name: arg.register.clone(),
            })?;
        match arg.index {
            Some(index) if index >= reg.size => Err(ParseError::IndexOutOfBounds {
                line: self.line,
                register: reg.name.clone(),
                index,
                size: reg.size,
            }),
            Some(index) => Ok(vec![ClbitId(reg.start + index)]),
            None => Ok(reg.indices().map(ClbitId).collect()),
        }
    }

    /// Number of broadcast repetitions: the common size of all whole-register
    /// arguments, or 1 when every argument is indexed.
    fn broadcast_width(&self, sizes: &[(bool, usize)], operation: &str) -> ParseResult<usize> {
        let mut width: Option<usize> = None;
        for &(is_register, size) in sizes {
            if !is_register {
                continue;
            }
            match width {
                Some(w) if w != size => {
                    return Err(ParseError::RegisterSizeMismatch {
                        line: self.line,
                        operation: operation.into(),
                    });
                }
                _ => width = Some(size),
            }
        }
        Ok(width.unwrap_or(1))
    }

    fn lower_operation(
        &mut self,
        op: &Operation,
        condition: Option<&ClassicalCondition>,
    ) -> ParseResult<()> {
        let guard = |inst: Instruction| match condition {
            Some(c) => inst.with_condition(c.clone()),
            None => inst,
        };

        match op {
            Operation::Measure { qubit, bit } => {
                let qubits = self.resolve_qubits(qubit)?;
                let clbits = self.resolve_clbits(bit)?;
                if qubit.index.is_none() != bit.index.is_none() || qubits.len() != clbits.len() {
                    return Err(ParseError::RegisterSizeMismatch {
                        line: self.line,
                        operation: "measure".into(),
                    });
                }
                for (q, c) in qubits.into_iter().zip(clbits) {
                    self.push(guard(Instruction::measure(q, c)))?;
                }
                Ok(())
            }
            Operation::Reset(arg) => {
                for q in self.resolve_qubits(arg)? {
                    self.push(guard(Instruction::reset(q)))?;
                }
                Ok(())
            }
            Operation::Gate(call) => {
                let params = call
                    .params
                    .iter()
                    .map(|e| self.evaluate(e, &FxHashMap::default()))
                    .collect::<ParseResult<Vec<_>>>()?;

                let resolved = call
                    .args
                    .iter()
                    .map(|a| self.resolve_qubits(a))
                    .collect::<ParseResult<Vec<_>>>()?;
                let sizes: Vec<(bool, usize)> = call
                    .args
                    .iter()
                    .zip(&resolved)
                    .map(|(a, q)| (a.index.is_none(), q.len()))
                    .collect();
                let width = self.broadcast_width(&sizes, &call.name)?;

                for i in 0..width {
                    let qubits: Vec<QubitId> = call
                        .args
                        .iter()
                        .zip(&resolved)
                        .map(|(a, q)| if a.index.is_none() { q[i] } else { q[0] })
                        .collect();
                    self.apply_gate(&call.name, &params, &qubits, condition)?;
                }
                Ok(())
            }
        }
    }

    /// Apply a gate by name to concrete qubits, expanding definitions.
    fn apply_gate(
        &mut self,
        name: &str,
        params: &[f64],
        qubits: &[QubitId],
        condition: Option<&ClassicalCondition>,
    ) -> ParseResult<()> {
        if let Some(b) = builtin(name) {
            if params.len() != b.params {
                return Err(ParseError::WrongParameterCount {
                    line: self.line,
                    gate: name.into(),
                    expected: b.params,
                    got: params.len(),
                });
            }
            let controls = match b.arity {
                Arity::Fixed(n) if qubits.len() == n => 0,
                Arity::Controlled { targets } if qubits.len() > targets => {
                    qubits.len() - targets
                }
                arity => {
                    let expected = match arity {
                        Arity::Fixed(n) => n.to_string(),
                        Arity::Controlled { targets } => format!("at least {}", targets + 1),
                    };
                    return Err(ParseError::WrongQubitCount {
                        line: self.line,
                        gate: name.into(),
                        expected,
                        got: qubits.len(),
                    });
                }
            };
            let controls = u32::try_from(controls).unwrap_or(u32::MAX);
            let mut inst = Instruction::gate((b.build)(params, controls), qubits.iter().copied());
            if let Some(c) = condition {
                inst = inst.with_condition(c.clone());
            }
            return self.push(inst);
        }

        if self.opaque.contains(name) {
            return Err(ParseError::OpaqueGate {
                line: self.line,
                name: name.into(),
            });
        }

        let def = self
            .gates
            .get(name)
            .cloned()
            .ok_or_else(|| ParseError::UnknownGate {
                line: self.line,
                name: name.into(),
            })?;

        if params.len() != def.params.len() {
            return Err(ParseError::WrongParameterCount {
                line: self.line,
                gate: name.into(),
                expected: def.params.len(),
                got: params.len(),
            });
        }
        if qubits.len() != def.qubits.len() {
            return Err(ParseError::WrongQubitCount {
                line: self.line,
                gate: name.into(),
                expected: def.qubits.len().to_string(),
                got: qubits.len(),
            });
        }

        let env: FxHashMap<String, f64> = def
            .params
            .iter()
            .cloned()
            .zip(params.iter().copied())
            .collect();
        let binding: FxHashMap<&str, QubitId> = def
            .qubits
            .iter()
            .map(String::as_str)
            .zip(qubits.iter().copied())
            .collect();

        for op in &def.body {
            match op {
                GateBodyOp::Call(GateCall {
                    name: inner,
                    params: exprs,
                    args,
                }) => {
                    let values = exprs
                        .iter()
                        .map(|e| self.evaluate(e, &env))
                        .collect::<ParseResult<Vec<_>>>()?;
                    let mapped: Vec<QubitId> = args
                        .iter()
                        .filter_map(|a| binding.get(a.register.as_str()).copied())
                        .collect();
                    self.apply_gate(inner, &values, &mapped, condition)?;
                }
                GateBodyOp::Barrier(names) => {
                    let mapped: Vec<QubitId> = names
                        .iter()
                        .filter_map(|n| binding.get(n.as_str()).copied())
                        .collect();
                    self.push(Instruction::barrier(mapped))?;
                }
            }
        }
        Ok(())
    }

    fn evaluate(&self, expr: &Expression, env: &FxHashMap<String, f64>) -> ParseResult<f64> {
        let value = match expr {
            Expression::Real(v) => *v,
            #[allow(clippy::cast_precision_loss)]
            Expression::Int(v) => *v as f64,
            Expression::Pi => std::f64::consts::PI,
            Expression::Identifier(name) => {
                *env.get(name)
                    .ok_or_else(|| ParseError::UndefinedIdentifier {
                        line: self.line,
                        name: name.clone(),
                    })?
            }
            Expression::Neg(e) => -self.evaluate(e, env)?,
            Expression::Binary { op, left, right } => {
                let l = self.evaluate(left, env)?;
                let r = self.evaluate(right, env)?;
                match op {
                    BinOp::Add => l + r,
                    BinOp::Sub => l - r,
                    BinOp::Mul => l * r,
                    BinOp::Div => l / r,
                    BinOp::Pow => l.powf(r),
                }
            }
            Expression::Call { func, arg } => func.apply(self.evaluate(arg, env)?),
        };
        if !value.is_finite() {
            return Err(ParseError::InvalidExpression {
                line: self.line,
                message: "expression does not evaluate to a finite number".into(),
            });
        }
        Ok(value)
    }
}
