//! Randomized comparison of decision-diagram amplitudes against a plain
//! dense statevector simulation.

use alcom_dd::{SimulationOptions, Simulator};
use alcom_ir::{Circuit, QubitId, StandardGate};
use num_complex::Complex64;
use proptest::prelude::*;
use std::f64::consts::FRAC_1_SQRT_2;

/// Dense reference: 2^n amplitudes, index bit `q` is qubit `q`.
struct Dense {
    amps: Vec<Complex64>,
}

impl Dense {
    fn new(num_qubits: u32) -> Self {
        let mut amps = vec![Complex64::new(0.0, 0.0); 1 << num_qubits];
        amps[0] = Complex64::new(1.0, 0.0);
        Self { amps }
    }

    fn apply_1q(&mut self, m: [[Complex64; 2]; 2], target: u32, controls: &[u32]) {
        let mask = 1usize << target;
        let cmask: usize = controls.iter().map(|c| 1usize << c).sum();
        for i in 0..self.amps.len() {
            if i & mask != 0 || i & cmask != cmask {
                continue;
            }
            let j = i | mask;
            let (a, b) = (self.amps[i], self.amps[j]);
            self.amps[i] = m[0][0] * a + m[0][1] * b;
            self.amps[j] = m[1][0] * a + m[1][1] * b;
        }
    }

    fn swap(&mut self, a: u32, b: u32) {
        for i in 0..self.amps.len() {
            let bit_a = (i >> a) & 1;
            let bit_b = (i >> b) & 1;
            if bit_a == 1 && bit_b == 0 {
                let j = i ^ (1 << a) ^ (1 << b);
                self.amps.swap(i, j);
            }
        }
    }

    fn rzz(&mut self, theta: f64, a: u32, b: u32) {
        for (i, amp) in self.amps.iter_mut().enumerate() {
            let parity = ((i >> a) ^ (i >> b)) & 1;
            let sign = if parity == 0 { -1.0 } else { 1.0 };
            *amp *= Complex64::from_polar(1.0, sign * theta / 2.0);
        }
    }
}

fn c(re: f64, im: f64) -> Complex64 {
    Complex64::new(re, im)
}

#[derive(Debug, Clone)]
enum Op {
    H(u32),
    X(u32),
    Y(u32),
    T(u32),
    Rx(u32, f64),
    Ry(u32, f64),
    Rz(u32, f64),
    Cx(u32, u32),
    Cp(u32, u32, f64),
    Swap(u32, u32),
    Rzz(u32, u32, f64),
    Ccx(u32, u32, u32),
}

impl Op {
    fn push(&self, circuit: &mut Circuit) {
        let q = QubitId;
        let _ = match *self {
            Op::H(a) => circuit.h(q(a)),
            Op::X(a) => circuit.x(q(a)),
            Op::Y(a) => circuit.y(q(a)),
            Op::T(a) => circuit.t(q(a)),
            Op::Rx(a, t) => circuit.rx(t, q(a)),
            Op::Ry(a, t) => circuit.ry(t, q(a)),
            Op::Rz(a, t) => circuit.rz(t, q(a)),
            Op::Cx(a, b) => circuit.cx(q(a), q(b)),
            Op::Cp(a, b, t) => circuit.cp(t, q(a), q(b)),
            Op::Swap(a, b) => circuit.swap(q(a), q(b)),
            Op::Rzz(a, b, t) => circuit.gate(StandardGate::RZZ(t.into()), [q(a), q(b)]),
            Op::Ccx(a, b, t) => circuit.ccx(q(a), q(b), q(t)),
        };
    }

    fn apply(&self, dense: &mut Dense) {
        let r = FRAC_1_SQRT_2;
        match *self {
            Op::H(a) => dense.apply_1q([[c(r, 0.0), c(r, 0.0)], [c(r, 0.0), c(-r, 0.0)]], a, &[]),
            Op::X(a) => dense.apply_1q([[c(0.0, 0.0), c(1.0, 0.0)], [c(1.0, 0.0), c(0.0, 0.0)]], a, &[]),
            Op::Y(a) => dense.apply_1q([[c(0.0, 0.0), c(0.0, -1.0)], [c(0.0, 1.0), c(0.0, 0.0)]], a, &[]),
            Op::T(a) => dense.apply_1q(
                [[c(1.0, 0.0), c(0.0, 0.0)], [c(0.0, 0.0), c(r, r)]],
                a,
                &[],
            ),
            Op::Rx(a, t) => {
                let (s, co) = (t / 2.0).sin_cos();
                dense.apply_1q([[c(co, 0.0), c(0.0, -s)], [c(0.0, -s), c(co, 0.0)]], a, &[]);
            }
            Op::Ry(a, t) => {
                let (s, co) = (t / 2.0).sin_cos();
                dense.apply_1q([[c(co, 0.0), c(-s, 0.0)], [c(s, 0.0), c(co, 0.0)]], a, &[]);
            }
            Op::Rz(a, t) => dense.apply_1q(
                [
                    [Complex64::from_polar(1.0, -t / 2.0), c(0.0, 0.0)],
                    [c(0.0, 0.0), Complex64::from_polar(1.0, t / 2.0)],
                ],
                a,
                &[],
            ),
            Op::Cx(a, b) => dense.apply_1q([[c(0.0, 0.0), c(1.0, 0.0)], [c(1.0, 0.0), c(0.0, 0.0)]], b, &[a]),
            Op::Cp(a, b, t) => dense.apply_1q(
                [[c(1.0, 0.0), c(0.0, 0.0)], [c(0.0, 0.0), Complex64::from_polar(1.0, t)]],
                b,
                &[a],
            ),
            Op::Swap(a, b) => dense.swap(a, b),
            Op::Rzz(a, b, t) => dense.rzz(t, a, b),
            Op::Ccx(a, b, t) => {
                dense.apply_1q([[c(0.0, 0.0), c(1.0, 0.0)], [c(1.0, 0.0), c(0.0, 0.0)]], t, &[a, b]);
            }
        }
    }
}

fn pair(n: u32) -> impl Strategy<Value = (u32, u32)> {
    (0..n, 0..n).prop_filter("distinct qubits", |(a, b)| a != b)
}

fn arb_op(n: u32) -> impl Strategy<Value = Op> {
    let angle = -6.3_f64..6.3;
    let triple = (0..n, 0..n, 0..n).prop_filter("distinct qubits", |(a, b, t)| a != b && b != t && a != t);
    prop_oneof![
        (0..n).prop_map(Op::H),
        (0..n).prop_map(Op::X),
        (0..n).prop_map(Op::Y),
        (0..n).prop_map(Op::T),
        (0..n, angle.clone()).prop_map(|(a, t)| Op::Rx(a, t)),
        (0..n, angle.clone()).prop_map(|(a, t)| Op::Ry(a, t)),
        (0..n, angle.clone()).prop_map(|(a, t)| Op::Rz(a, t)),
        pair(n).prop_map(|(a, b)| Op::Cx(a, b)),
        (pair(n), angle.clone()).prop_map(|((a, b), t)| Op::Cp(a, b, t)),
        pair(n).prop_map(|(a, b)| Op::Swap(a, b)),
        (pair(n), angle).prop_map(|((a, b), t)| Op::Rzz(a, b, t)),
        triple.prop_map(|(a, b, t)| Op::Ccx(a, b, t)),
    ]
}

fn arb_program() -> impl Strategy<Value = (u32, Vec<Op>)> {
    (3_u32..=6).prop_flat_map(|n| (Just(n), prop::collection::vec(arb_op(n), 1..=30)))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn test_dd_matches_dense_reference((n, ops) in arb_program()) {
        let mut circuit = Circuit::with_size("random", n, 0);
        let mut dense = Dense::new(n);
        for op in &ops {
            op.push(&mut circuit);
            op.apply(&mut dense);
        }

        let options = SimulationOptions {
            shots: 1,
            statevector: true,
            seed: Some(0),
            cancel: None,
        };
        let out = Simulator::new().run_circuit(&circuit, &options).unwrap();
        let (re, im) = out.statevector.unwrap();
        prop_assert_eq!(re.len(), dense.amps.len());
        for (i, expected) in dense.amps.iter().enumerate() {
            let got = Complex64::new(re[i], im[i]);
            prop_assert!(
                (got - expected).norm() < 1e-9,
                "amplitude {} differs: dd {} vs dense {}", i, got, expected
            );
        }
    }

    #[test]
    fn test_dd_state_is_normalized((n, ops) in arb_program()) {
        let mut circuit = Circuit::with_size("random", n, 0);
        for op in &ops {
            op.push(&mut circuit);
        }
        let options = SimulationOptions {
            shots: 1,
            statevector: true,
            seed: Some(1),
            cancel: None,
        };
        let out = Simulator::new().run_circuit(&circuit, &options).unwrap();
        let (re, im) = out.statevector.unwrap();
        let norm: f64 = re.iter().zip(&im).map(|(a, b)| a * a + b * b).sum();
        prop_assert!((norm - 1.0).abs() < 1e-6);
    }
}

#[test]
fn test_near_pi_rotations_match_dense_reference() {
    use std::f64::consts::PI;

    // Weights along one branch shrink to ~eps while the other stays ~1, so
    // additions see weight ratios far beyond the compute-table key range.
    for (e1, e2) in [(1e-3, 2e-3), (1e-7, 2e-7), (1e-9, 3e-9), (2e-7, 1e-7)] {
        let ops = [
            Op::Ry(1, PI - e1),
            Op::Cx(1, 0),
            Op::H(1),
            Op::H(1),
            Op::Cx(1, 0),
            Op::Ry(1, -(PI - e1)),
            Op::Ry(1, PI - e2),
            Op::Cx(1, 0),
            Op::H(1),
        ];
        let mut circuit = Circuit::with_size("near_pi", 2, 0);
        let mut dense = Dense::new(2);
        for op in &ops {
            op.push(&mut circuit);
            op.apply(&mut dense);
        }

        let options = SimulationOptions {
            shots: 1,
            statevector: true,
            seed: Some(0),
            cancel: None,
        };
        let out = Simulator::new().run_circuit(&circuit, &options).unwrap();
        let (re, im) = out.statevector.unwrap();

        let norm: f64 = re.iter().zip(&im).map(|(a, b)| a * a + b * b).sum();
        assert!((norm - 1.0).abs() < 1e-9, "eps ({e1}, {e2}): norm {norm}");
        for (i, expected) in dense.amps.iter().enumerate() {
            let got = Complex64::new(re[i], im[i]);
            assert!(
                (got - expected).norm() < 1e-9,
                "eps ({e1}, {e2}): amplitude {i} differs: dd {got} vs dense {expected}"
            );
        }
    }
}
