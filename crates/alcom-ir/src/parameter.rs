//! Gate parameter expressions.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::f64::consts::PI;
use std::fmt;

use crate::error::{IrError, IrResult};

/// Unary functions available in OpenQASM 2.0 expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MathFn {
    Sin,
    Cos,
    Tan,
    Exp,
    Ln,
    Sqrt,
}

impl MathFn {
    /// Look up a function by its source name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "sin" => Some(MathFn::Sin),
            "cos" => Some(MathFn::Cos),
            "tan" => Some(MathFn::Tan),
            "exp" => Some(MathFn::Exp),
            "ln" => Some(MathFn::Ln),
            "sqrt" => Some(MathFn::Sqrt),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            MathFn::Sin => "sin",
            MathFn::Cos => "cos",
            MathFn::Tan => "tan",
            MathFn::Exp => "exp",
            MathFn::Ln => "ln",
            MathFn::Sqrt => "sqrt",
        }
    }

    pub fn apply(self, x: f64) -> f64 {
        match self {
            MathFn::Sin => x.sin(),
            MathFn::Cos => x.cos(),
            MathFn::Tan => x.tan(),
            MathFn::Exp => x.exp(),
            MathFn::Ln => x.ln(),
            MathFn::Sqrt => x.sqrt(),
        }
    }
}

/// A numeric or symbolic gate parameter.
///
/// Circuits produced by the parser only contain [`ParameterExpression::Constant`]
/// values. Symbols appear in circuits built programmatically and must be bound
/// before simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParameterExpression {
    Constant(f64),
    Symbol(String),
    Pi,
    Neg(Box<ParameterExpression>),
    Add(Box<ParameterExpression>, Box<ParameterExpression>),
    Sub(Box<ParameterExpression>, Box<ParameterExpression>),
    Mul(Box<ParameterExpression>, Box<ParameterExpression>),
    Div(Box<ParameterExpression>, Box<ParameterExpression>),
    Pow(Box<ParameterExpression>, Box<ParameterExpression>),
    Func(MathFn, Box<ParameterExpression>),
}

impl ParameterExpression {
    pub fn constant(value: f64) -> Self {
        ParameterExpression::Constant(value)
    }

    pub fn symbol(name: impl Into<String>) -> Self {
        ParameterExpression::Symbol(name.into())
    }

    /// Whether any unbound symbol remains.
    pub fn is_symbolic(&self) -> bool {
        match self {
            ParameterExpression::Symbol(_) => true,
            ParameterExpression::Constant(_) | ParameterExpression::Pi => false,
            ParameterExpression::Neg(e) | ParameterExpression::Func(_, e) => e.is_symbolic(),
            ParameterExpression::Add(a, b)
            | ParameterExpression::Sub(a, b)
            | ParameterExpression::Mul(a, b)
            | ParameterExpression::Div(a, b)
            | ParameterExpression::Pow(a, b) => a.is_symbolic() || b.is_symbolic(),
        }
    }

    /// Evaluate to a number, or `None` while symbols remain.
    ///
    /// Division by zero yields an infinity the same way `f64` arithmetic does;
    /// callers that need finite angles check the result.
    pub fn as_f64(&self) -> Option<f64> {
        Some(match self {
            ParameterExpression::Constant(v) => *v,
            ParameterExpression::Symbol(_) => return None,
            ParameterExpression::Pi => PI,
            ParameterExpression::Neg(e) => -e.as_f64()?,
            ParameterExpression::Add(a, b) => a.as_f64()? + b.as_f64()?,
            ParameterExpression::Sub(a, b) => a.as_f64()? - b.as_f64()?,
            ParameterExpression::Mul(a, b) => a.as_f64()? * b.as_f64()?,
            ParameterExpression::Div(a, b) => a.as_f64()? / b.as_f64()?,
            ParameterExpression::Pow(a, b) => a.as_f64()?.powf(b.as_f64()?),
            ParameterExpression::Func(f, e) => f.apply(e.as_f64()?),
        })
    }

    /// Evaluate, reporting the first unbound symbol as an error.
    pub fn value(&self) -> IrResult<f64> {
        match self.as_f64() {
            Some(v) => Ok(v),
            None => {
                let name = self.symbols().into_iter().next().unwrap_or_default();
                Err(IrError::UnboundParameter(name))
            }
        }
    }

    /// All symbol names, sorted.
    pub fn symbols(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        self.collect_symbols(&mut out);
        out
    }

    fn collect_symbols(&self, out: &mut BTreeSet<String>) {
        match self {
            ParameterExpression::Constant(_) | ParameterExpression::Pi => {}
            ParameterExpression::Symbol(name) => {
                out.insert(name.clone());
            }
            ParameterExpression::Neg(e) | ParameterExpression::Func(_, e) => {
                e.collect_symbols(out);
            }
            ParameterExpression::Add(a, b)
            | ParameterExpression::Sub(a, b)
            | ParameterExpression::Mul(a, b)
            | ParameterExpression::Div(a, b)
            | ParameterExpression::Pow(a, b) => {
                a.collect_symbols(out);
                b.collect_symbols(out);
            }
        }
    }

    /// Replace every occurrence of `name` with `value`.
    pub fn bind(&self, name: &str, value: f64) -> Self {
        let rebind = |e: &ParameterExpression| Box::new(e.bind(name, value));
        match self {
            ParameterExpression::Symbol(n) if n == name => ParameterExpression::Constant(value),
            ParameterExpression::Constant(_)
            | ParameterExpression::Pi
            | ParameterExpression::Symbol(_) => self.clone(),
            ParameterExpression::Neg(e) => ParameterExpression::Neg(rebind(e)),
            ParameterExpression::Func(f, e) => ParameterExpression::Func(*f, rebind(e)),
            ParameterExpression::Add(a, b) => ParameterExpression::Add(rebind(a), rebind(b)),
            ParameterExpression::Sub(a, b) => ParameterExpression::Sub(rebind(a), rebind(b)),
            ParameterExpression::Mul(a, b) => ParameterExpression::Mul(rebind(a), rebind(b)),
            ParameterExpression::Div(a, b) => ParameterExpression::Div(rebind(a), rebind(b)),
            ParameterExpression::Pow(a, b) => ParameterExpression::Pow(rebind(a), rebind(b)),
        }
    }

    /// Fold to a constant when no symbols remain.
    pub fn simplify(&self) -> Self {
        match self.as_f64() {
            Some(v) => ParameterExpression::Constant(v),
            None => self.clone(),
        }
    }
}

/// Renders in OpenQASM 2.0 expression syntax.
impl fmt::Display for ParameterExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterExpression::Constant(v) => write!(f, "{v}"),
            ParameterExpression::Symbol(name) => write!(f, "{name}"),
            ParameterExpression::Pi => write!(f, "pi"),
            ParameterExpression::Neg(e) => write!(f, "-({e})"),
            ParameterExpression::Add(a, b) => write!(f, "({a} + {b})"),
            ParameterExpression::Sub(a, b) => write!(f, "({a} - {b})"),
            ParameterExpression::Mul(a, b) => write!(f, "({a} * {b})"),
            ParameterExpression::Div(a, b) => write!(f, "({a} / {b})"),
            ParameterExpression::Pow(a, b) => write!(f, "({a} ^ {b})"),
            ParameterExpression::Func(func, e) => write!(f, "{}({e})", func.name()),
        }
    }
}

impl From<f64> for ParameterExpression {
    fn from(value: f64) -> Self {
        ParameterExpression::Constant(value)
    }
}

impl From<&str> for ParameterExpression {
    fn from(name: &str) -> Self {
        ParameterExpression::Symbol(name.to_string())
    }
}
