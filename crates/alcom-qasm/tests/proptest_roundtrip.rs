//! Property tests: circuit → OpenQASM 2.0 → circuit is the identity.

use alcom_ir::{Circuit, ClbitId, QubitId, StandardGate};
use alcom_qasm::{emit, parse};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    H(u32),
    Rz(f64, u32),
    U(f64, f64, f64, u32),
    CX(u32, u32),
    Cp(f64, u32, u32),
    Measure(u32),
    ConditionalX(u64, u32),
}

impl Op {
    fn apply(self, circuit: &mut Circuit) {
        let _ = match self {
            Op::H(q) => circuit.h(QubitId(q)),
            Op::Rz(a, q) => circuit.rz(a, QubitId(q)),
            Op::U(t, p, l, q) => circuit.u(t, p, l, QubitId(q)),
            Op::CX(c, t) => circuit.cx(QubitId(c), QubitId(t)),
            Op::Cp(a, c, t) => circuit.cp(a, QubitId(c), QubitId(t)),
            Op::Measure(q) => circuit.measure(QubitId(q), ClbitId(q)),
            Op::ConditionalX(v, q) => circuit.gate_if(StandardGate::X, [QubitId(q)], "c", v),
        };
    }
}

fn arb_angle() -> impl Strategy<Value = f64> {
    prop_oneof![
        -10.0_f64..10.0,
        (-1e-12_f64..1e-12),
        Just(std::f64::consts::PI),
        (1e10_f64..1e30),
    ]
}

fn arb_op(n: u32) -> impl Strategy<Value = Op> {
    let pair = (0..n, 0..n).prop_filter("distinct qubits", |(a, b)| a != b);
    prop_oneof![
        (0..n).prop_map(Op::H),
        (arb_angle(), 0..n).prop_map(|(a, q)| Op::Rz(a, q)),
        (arb_angle(), arb_angle(), arb_angle(), 0..n).prop_map(|(t, p, l, q)| Op::U(t, p, l, q)),
        pair.clone().prop_map(|(c, t)| Op::CX(c, t)),
        (arb_angle(), pair).prop_map(|(a, (c, t))| Op::Cp(a, c, t)),
        (0..n).prop_map(Op::Measure),
        (0..4_u64, 0..n).prop_map(|(v, q)| Op::ConditionalX(v, q)),
    ]
}

fn arb_circuit() -> impl Strategy<Value = Circuit> {
    (2_u32..=5).prop_flat_map(|n| {
        prop::collection::vec(arb_op(n), 1..=20).prop_map(move |ops| {
            let mut circuit = Circuit::with_size("circuit", n, n);
            for op in ops {
                op.apply(&mut circuit);
            }
            circuit
        })
    })
}

proptest! {
    #[test]
    fn test_roundtrip_is_exact(circuit in arb_circuit()) {
        let qasm = emit(&circuit).expect("emit");
        let parsed = parse(&qasm).expect("parse emitted source");

        prop_assert_eq!(parsed.qregs(), circuit.qregs());
        prop_assert_eq!(parsed.cregs(), circuit.cregs());
        prop_assert_eq!(parsed.instructions(), circuit.instructions());
        prop_assert_eq!(parsed.depth(), circuit.depth());
    }

    #[test]
    fn test_emit_is_stable(circuit in arb_circuit()) {
        let once = emit(&circuit).expect("emit");
        let twice = emit(&parse(&once).expect("parse")).expect("emit again");
        prop_assert_eq!(once, twice);
    }
}
