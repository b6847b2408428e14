//! Gate matrices and the lowering of every [`StandardGate`] into controlled
//! single-qubit operations.

use std::f64::consts::{FRAC_1_SQRT_2, FRAC_PI_2, FRAC_PI_4};

use alcom_ir::{IrResult, ParameterExpression, StandardGate};
use num_complex::Complex64;

/// Row-major 2×2 complex matrix.
pub type Matrix2 = [[Complex64; 2]; 2];

const fn c(re: f64, im: f64) -> Complex64 {
    Complex64::new(re, im)
}

fn phase(angle: f64) -> Complex64 {
    Complex64::from_polar(1.0, angle)
}

pub fn identity() -> Matrix2 {
    [[c(1.0, 0.0), c(0.0, 0.0)], [c(0.0, 0.0), c(1.0, 0.0)]]
}

pub fn x() -> Matrix2 {
    [[c(0.0, 0.0), c(1.0, 0.0)], [c(1.0, 0.0), c(0.0, 0.0)]]
}

pub fn y() -> Matrix2 {
    [[c(0.0, 0.0), c(0.0, -1.0)], [c(0.0, 1.0), c(0.0, 0.0)]]
}

pub fn z() -> Matrix2 {
    diag(c(1.0, 0.0), c(-1.0, 0.0))
}

pub fn h() -> Matrix2 {
    let r = FRAC_1_SQRT_2;
    [[c(r, 0.0), c(r, 0.0)], [c(r, 0.0), c(-r, 0.0)]]
}

pub fn sx() -> Matrix2 {
    [[c(0.5, 0.5), c(0.5, -0.5)], [c(0.5, -0.5), c(0.5, 0.5)]]
}

pub fn sxdg() -> Matrix2 {
    [[c(0.5, -0.5), c(0.5, 0.5)], [c(0.5, 0.5), c(0.5, -0.5)]]
}

pub fn diag(a: Complex64, b: Complex64) -> Matrix2 {
    [[a, c(0.0, 0.0)], [c(0.0, 0.0), b]]
}

pub fn p(lambda: f64) -> Matrix2 {
    diag(c(1.0, 0.0), phase(lambda))
}

pub fn rx(theta: f64) -> Matrix2 {
    let (s, co) = (theta / 2.0).sin_cos();
    [[c(co, 0.0), c(0.0, -s)], [c(0.0, -s), c(co, 0.0)]]
}

pub fn ry(theta: f64) -> Matrix2 {
    let (s, co) = (theta / 2.0).sin_cos();
    [[c(co, 0.0), c(-s, 0.0)], [c(s, 0.0), c(co, 0.0)]]
}

pub fn rz(theta: f64) -> Matrix2 {
    diag(phase(-theta / 2.0), phase(theta / 2.0))
}

/// `U(θ, φ, λ)` as defined by OpenQASM 2.0 (`u3`).
pub fn u(theta: f64, phi: f64, lambda: f64) -> Matrix2 {
    let (s, co) = (theta / 2.0).sin_cos();
    [
        [c(co, 0.0), -phase(lambda) * s],
        [phase(phi) * s, phase(phi + lambda) * co],
    ]
}

/// Projector onto outcome `bit` of a single qubit.
pub fn projector(bit: bool) -> Matrix2 {
    if bit {
        diag(c(0.0, 0.0), c(1.0, 0.0))
    } else {
        diag(c(1.0, 0.0), c(0.0, 0.0))
    }
}

/// `matrix` applied to `target` when every control qubit is 1.
#[derive(Debug, Clone, PartialEq)]
pub struct Controlled {
    pub matrix: Matrix2,
    pub target: u32,
    pub controls: Vec<u32>,
}

impl Controlled {
    fn new(matrix: Matrix2, target: u32, controls: &[u32]) -> Self {
        Self {
            matrix,
            target,
            controls: controls.to_vec(),
        }
    }
}

fn value(p: &ParameterExpression) -> IrResult<f64> {
    p.value()
}

/// Lower a gate on the given qubits into controlled single-qubit operations,
/// in application order.
///
/// Gates without a direct controlled form are decomposed: `swap` into three
/// `cx`, `cswap`/`mcswap` into `cx`-conjugated Toffolis, `iswap` into
/// `s, h, cx` and the two-qubit rotations around a `cx`-`rz`-`cx` core.
pub fn lower(gate: &StandardGate, qubits: &[u32]) -> IrResult<Vec<Controlled>> {
    use StandardGate as G;

    let one = |m: Matrix2| vec![Controlled::new(m, qubits[0], &[])];
    let ctrl = |m: Matrix2| vec![Controlled::new(m, qubits[1], &qubits[..1])];
    let multi = |m: Matrix2, n: u32| {
        let n = n as usize;
        vec![Controlled::new(m, qubits[n], &qubits[..n])]
    };

    Ok(match gate {
        G::I => one(identity()),
        G::X => one(x()),
        G::Y => one(y()),
        G::Z => one(z()),
        G::H => one(h()),
        G::S => one(p(FRAC_PI_2)),
        G::Sdg => one(p(-FRAC_PI_2)),
        G::T => one(p(FRAC_PI_4)),
        G::Tdg => one(p(-FRAC_PI_4)),
        G::SX => one(sx()),
        G::SXdg => one(sxdg()),
        G::Rx(t) => one(rx(value(t)?)),
        G::Ry(t) => one(ry(value(t)?)),
        G::Rz(t) => one(rz(value(t)?)),
        G::P(l) => one(p(value(l)?)),
        G::U2(ph, l) => one(u(FRAC_PI_2, value(ph)?, value(l)?)),
        G::U(t, ph, l) => one(u(value(t)?, value(ph)?, value(l)?)),

        G::CX => ctrl(x()),
        G::CY => ctrl(y()),
        G::CZ => ctrl(z()),
        G::CH => ctrl(h()),
        G::CSX => ctrl(sx()),
        G::CRx(t) => ctrl(rx(value(t)?)),
        G::CRy(t) => ctrl(ry(value(t)?)),
        G::CRz(t) => ctrl(rz(value(t)?)),
        G::CP(l) => ctrl(p(value(l)?)),
        G::CU2(ph, l) => ctrl(u(FRAC_PI_2, value(ph)?, value(l)?)),
        G::CU3(t, ph, l) => ctrl(u(value(t)?, value(ph)?, value(l)?)),

        G::Swap => swap(qubits[0], qubits[1], &[]),
        G::ISwap => {
            let (a, b) = (qubits[0], qubits[1]);
            vec![
                Controlled::new(p(FRAC_PI_2), a, &[]),
                Controlled::new(p(FRAC_PI_2), b, &[]),
                Controlled::new(h(), a, &[]),
                Controlled::new(x(), b, &[a]),
                Controlled::new(x(), a, &[b]),
                Controlled::new(h(), b, &[]),
            ]
        }
        G::RZZ(t) => zz_rotation(value(t)?, qubits[0], qubits[1], None),
        G::RXX(t) => zz_rotation(value(t)?, qubits[0], qubits[1], Some((h(), h()))),
        G::RYY(t) => zz_rotation(
            value(t)?,
            qubits[0],
            qubits[1],
            Some((rx(FRAC_PI_2), rx(-FRAC_PI_2))),
        ),

        G::CCX => multi(x(), 2),
        G::CSwap => swap(qubits[1], qubits[2], &qubits[..1]),

        G::MCX(n) => multi(x(), *n),
        G::MCY(n) => multi(y(), *n),
        G::MCZ(n) => multi(z(), *n),
        G::MCU1(n, l) => multi(p(value(l)?), *n),
        G::MCU2(n, ph, l) => multi(u(FRAC_PI_2, value(ph)?, value(l)?), *n),
        G::MCU3(n, t, ph, l) => multi(u(value(t)?, value(ph)?, value(l)?), *n),
        G::MCSwap(n) => {
            let n = *n as usize;
            swap(qubits[n], qubits[n + 1], &qubits[..n])
        }
    })
}

/// Swap of `a` and `b` conditioned on `controls`: `cx b,a; c..cx a,b; cx b,a`.
fn swap(a: u32, b: u32, controls: &[u32]) -> Vec<Controlled> {
    let mut middle = controls.to_vec();
    middle.push(a);
    vec![
        Controlled::new(x(), a, &[b]),
        Controlled::new(x(), b, &middle),
        Controlled::new(x(), a, &[b]),
    ]
}

/// `exp(-i θ/2 P⊗P)` via `cx a,b; rz(θ) b; cx a,b`, with an optional basis
/// change `(into, back)` applied to both qubits around the core.
fn zz_rotation(theta: f64, a: u32, b: u32, basis: Option<(Matrix2, Matrix2)>) -> Vec<Controlled> {
    let mut ops = Vec::with_capacity(7);
    if let Some((into, _)) = &basis {
        ops.push(Controlled::new(*into, a, &[]));
        ops.push(Controlled::new(*into, b, &[]));
    }
    ops.push(Controlled::new(x(), b, &[a]));
    ops.push(Controlled::new(rz(theta), b, &[]));
    ops.push(Controlled::new(x(), b, &[a]));
    if let Some((_, back)) = &basis {
        ops.push(Controlled::new(*back, a, &[]));
        ops.push(Controlled::new(*back, b, &[]));
    }
    ops
}
