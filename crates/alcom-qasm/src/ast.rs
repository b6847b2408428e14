//! Syntax tree for OpenQASM 2.0.

use alcom_ir::MathFn;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Program {
    pub version: String,
    pub statements: Vec<Statement>,
}

/// A statement with the line it starts on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Statement {
    pub line: usize,
    pub kind: StatementKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StatementKind {
    Include(String),
    QReg { name: String, size: u32 },
    CReg { name: String, size: u32 },
    GateDef(GateDef),
    /// `opaque name(params) qargs;`
    Opaque {
        name: String,
        params: Vec<String>,
        qubits: Vec<String>,
    },
    /// A quantum operation, optionally guarded by `if (creg == value)`.
    Operation {
        op: Operation,
        condition: Option<Condition>,
    },
    Barrier(Vec<Argument>),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Operation {
    Gate(GateCall),
    Measure { qubit: Argument, bit: Argument },
    Reset(Argument),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateCall {
    pub name: String,
    pub params: Vec<Expression>,
    pub args: Vec<Argument>,
}

/// `name` or `name[index]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Argument {
    pub register: String,
    pub index: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Condition {
    pub register: String,
    pub value: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateDef {
    pub name: String,
    pub params: Vec<String>,
    pub qubits: Vec<String>,
    pub body: Vec<GateBodyOp>,
}

/// Body statements; arguments name formal qubits and carry no index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum GateBodyOp {
    Call(GateCall),
    Barrier(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expression {
    Real(f64),
    Int(u64),
    Pi,
    Identifier(String),
    Neg(Box<Expression>),
    Binary {
        op: BinOp,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    Call {
        func: MathFn,
        arg: Box<Expression>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}
