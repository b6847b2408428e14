//! End-to-end simulator tests over OpenQASM input.

use alcom_dd::gates;
use alcom_dd::{CancelToken, DdError, Package, SimulationOptions, Simulator};
use std::f64::consts::FRAC_1_SQRT_2;

const HEADER: &str = "OPENQASM 2.0;\ninclude \"qelib1.inc\";\n";

fn seeded(shots: u32, statevector: bool) -> SimulationOptions {
    SimulationOptions {
        shots,
        statevector,
        seed: Some(42),
        cancel: None,
    }
}

fn run(body: &str, options: &SimulationOptions) -> alcom_dd::SimulationOutput {
    let source = format!("{HEADER}{body}");
    Simulator::new().simulate_with(&source, options).unwrap()
}

fn assert_amp(sv: &(Vec<f64>, Vec<f64>), index: usize, re: f64, im: f64) {
    assert!(
        (sv.0[index] - re).abs() < 1e-9 && (sv.1[index] - im).abs() < 1e-9,
        "amplitude {index} = ({}, {}), expected ({re}, {im})",
        sv.0[index],
        sv.1[index]
    );
}

#[test]
fn test_bell_counts_and_statevector() {
    let source = format!(
        "{HEADER}qreg q[2];\ncreg c[2];\nh q[0];\ncx q[0], q[1];\nmeasure q -> c;\n"
    );
    let out = Simulator::new().simulate(&source, true, 1024).unwrap();

    assert_eq!(out.counts.values().sum::<u64>(), 1024);
    assert!(out.counts.keys().all(|k| k == "00" || k == "11"));
    let zeros = out.counts.get("00").copied().unwrap_or(0);
    assert!(zeros > 400 && zeros < 624, "got {zeros} zeros");

    let sv = out.statevector.unwrap();
    assert_eq!(sv.0.len(), 4);
    assert_eq!(sv.1.len(), 4);
    assert_amp(&sv, 0, FRAC_1_SQRT_2, 0.0);
    assert_amp(&sv, 1, 0.0, 0.0);
    assert_amp(&sv, 2, 0.0, 0.0);
    assert_amp(&sv, 3, FRAC_1_SQRT_2, 0.0);
}

#[test]
fn test_seed_makes_runs_reproducible() {
    let body = "qreg q[3];\ncreg c[3];\nh q;\nmeasure q -> c;\n";
    let a = run(body, &seeded(200, false));
    let b = run(body, &seeded(200, false));
    assert_eq!(a, b);
    assert!(a.statevector.is_none());
}

#[test]
fn test_ghz_diagram_grows_linearly() {
    for n in [4_u32, 8, 16, 32] {
        let mut pkg = Package::new(n);
        let mut psi = pkg.zero_state();
        psi = pkg.apply(&gates::h(), 0, &[], psi);
        for q in 0..n - 1 {
            psi = pkg.apply(&gates::x(), q + 1, &[q], psi);
        }
        assert_eq!(pkg.size(psi), 2 * n as usize - 1);
    }
}

#[test]
fn test_ghz_sampling_is_all_or_nothing() {
    let out = run(
        "qreg q[12];\ncreg c[12];\nh q[0];\ncx q[0], q[1];\ncx q[1], q[2];\ncx q[2], q[3];\n\
         cx q[3], q[4];\ncx q[4], q[5];\ncx q[5], q[6];\ncx q[6], q[7];\ncx q[7], q[8];\n\
         cx q[8], q[9];\ncx q[9], q[10];\ncx q[10], q[11];\nmeasure q -> c;\n",
        &seeded(500, false),
    );
    assert_eq!(out.counts.values().sum::<u64>(), 500);
    for key in out.counts.keys() {
        assert!(key == "000000000000" || key == "111111111111", "unexpected {key}");
    }
}

#[test]
fn test_mid_circuit_measurement_drives_condition() {
    let out = run(
        "qreg q[2];\ncreg c[2];\nx q[0];\nmeasure q[0] -> c[0];\nif (c == 1) x q[1];\nmeasure q[1] -> c[1];\n",
        &seeded(64, true),
    );
    assert_eq!(out.counts.len(), 1);
    assert_eq!(out.counts["11"], 64);
    // final state of the last shot
    let sv = out.statevector.unwrap();
    assert_amp(&sv, 3, 1.0, 0.0);
}

#[test]
fn test_random_measurement_correlates_through_condition() {
    let out = run(
        "qreg q[2];\ncreg c[2];\nh q[0];\nmeasure q[0] -> c[0];\nif (c == 1) x q[1];\nmeasure q[1] -> c[1];\n",
        &seeded(400, false),
    );
    assert_eq!(out.counts.values().sum::<u64>(), 400);
    assert!(out.counts.keys().all(|k| k == "00" || k == "11"));
    assert_eq!(out.counts.len(), 2);
}

#[test]
fn test_measure_collapses_before_later_gates() {
    // H, measure, H again: the second measurement is uniform and
    // independent of the first.
    let out = run(
        "qreg q[1];\ncreg c[2];\nh q[0];\nmeasure q[0] -> c[0];\nh q[0];\nmeasure q[0] -> c[1];\n",
        &seeded(800, false),
    );
    assert_eq!(out.counts.len(), 4);
    for count in out.counts.values() {
        assert!(*count > 120 && *count < 280);
    }
}

#[test]
fn test_reset_restores_ground_state() {
    let out = run(
        "qreg q[2];\ncreg c[2];\nx q;\nreset q[0];\nmeasure q -> c;\n",
        &seeded(50, false),
    );
    assert_eq!(out.counts["10"], 50);
}

#[test]
fn test_registers_are_keyed_last_declared_first() {
    let out = run(
        "qreg q[3];\ncreg a[1];\ncreg b[2];\nx q[1];\nmeasure q[0] -> a[0];\nmeasure q[1] -> b[0];\nmeasure q[2] -> b[1];\n",
        &seeded(10, false),
    );
    assert_eq!(out.counts["01 0"], 10);
}

#[test]
fn test_no_classical_bits_gives_empty_key() {
    let out = run("qreg q[2];\nh q;\n", &seeded(16, false));
    assert_eq!(out.counts[""], 16);
}

#[test]
fn test_iswap_decomposition() {
    let out = run("qreg q[2];\nx q[0];\niswap q[0], q[1];\n", &seeded(1, true));
    let sv = out.statevector.unwrap();
    assert_amp(&sv, 2, 0.0, 1.0);
    assert_amp(&sv, 1, 0.0, 0.0);

    let out = run("qreg q[2];\nx q;\niswap q[0], q[1];\n", &seeded(1, true));
    assert_amp(&out.statevector.unwrap(), 3, 1.0, 0.0);
}

#[test]
fn test_two_qubit_rotations() {
    let theta: f64 = 0.8;
    let (s, c) = (theta / 2.0).sin_cos();

    let out = run(&format!("qreg q[2];\nrxx({theta}) q[0], q[1];\n"), &seeded(1, true));
    let sv = out.statevector.unwrap();
    assert_amp(&sv, 0, c, 0.0);
    assert_amp(&sv, 3, 0.0, -s);

    let out = run(&format!("qreg q[2];\nryy({theta}) q[0], q[1];\n"), &seeded(1, true));
    let sv = out.statevector.unwrap();
    assert_amp(&sv, 0, c, 0.0);
    assert_amp(&sv, 3, 0.0, s);

    let out = run(&format!("qreg q[2];\nrzz({theta}) q[0], q[1];\n"), &seeded(1, true));
    let sv = out.statevector.unwrap();
    assert_amp(&sv, 0, c, -s);
}

#[test]
fn test_cswap_and_mcx() {
    // control q0 set, q1 set: cswap moves the excitation to q2
    let out = run("qreg q[3];\nx q[0];\nx q[1];\ncswap q[0], q[1], q[2];\n", &seeded(1, true));
    assert_amp(&out.statevector.unwrap(), 0b101, 1.0, 0.0);

    let out = run("qreg q[4];\nx q[0];\nx q[1];\nx q[2];\nmcx q[0], q[1], q[2], q[3];\n", &seeded(1, true));
    assert_amp(&out.statevector.unwrap(), 0b1111, 1.0, 0.0);
}

#[test]
fn test_custom_gate_definition() {
    let out = run(
        "gate bell a, b { h a; cx a, b; }\nqreg q[2];\ncreg c[2];\nbell q[0], q[1];\nmeasure q -> c;\n",
        &seeded(100, false),
    );
    assert!(out.counts.keys().all(|k| k == "00" || k == "11"));
}

#[test]
fn test_multiple_experiments_rejected() {
    let source = format!("{HEADER}qreg q[1];\n{HEADER}qreg r[1];\n");
    let err = Simulator::new().simulate(&source, false, 10).unwrap_err();
    assert!(matches!(err, DdError::MultipleExperiments(2)));
}

#[test]
fn test_cancelled_run_stops() {
    let token = CancelToken::new();
    token.cancel();
    let options = SimulationOptions {
        cancel: Some(token),
        ..seeded(10, false)
    };
    let source = format!("{HEADER}qreg q[2];\ncreg c[2];\nh q;\nmeasure q -> c;\n");
    let err = Simulator::new().simulate_with(&source, &options).unwrap_err();
    assert!(matches!(err, DdError::Cancelled));
}

#[test]
fn test_small_gc_threshold_gives_same_state() {
    let mut body = String::from("qreg q[10];\n");
    for i in 0..10 {
        body.push_str(&format!("ry({}) q[{i}];\n", 0.1 + f64::from(i) * 0.37));
    }
    for i in 0..9 {
        body.push_str(&format!("cx q[{i}], q[{}];\nrz(0.3) q[{}];\n", i + 1, i + 1));
    }
    let source = format!("{HEADER}{body}");
    let options = seeded(1, true);

    let reference = Simulator::new().simulate_with(&source, &options).unwrap();
    let collected = Simulator::with_gc_threshold(0)
        .simulate_with(&source, &options)
        .unwrap();
    let (a, b) = (reference.statevector.unwrap(), collected.statevector.unwrap());
    for i in 0..a.0.len() {
        assert!((a.0[i] - b.0[i]).abs() < 1e-9);
        assert!((a.1[i] - b.1[i]).abs() < 1e-9);
    }
}
