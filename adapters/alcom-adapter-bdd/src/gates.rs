//! Gate list advertised by the `qasm_simulator` backend.

use alcom_hal::GateConfig;

/// Instructions that are not gates but are always accepted.
pub const NON_GATE_INSTRUCTIONS: &[&str] = &["measure", "reset", "barrier"];

/// Every gate the engine can lower, in `qelib1.inc` order.
pub fn supported_gates() -> Vec<GateConfig> {
    const THETA_PHI_LAMBDA: &[&str] = &["theta", "phi", "lambda"];

    vec![
        GateConfig::new("id", &[], "Identity"),
        GateConfig::new("x", &[], "Pauli-X"),
        GateConfig::new("y", &[], "Pauli-Y"),
        GateConfig::new("z", &[], "Pauli-Z"),
        GateConfig::new("h", &[], "Hadamard"),
        GateConfig::new("s", &[], "sqrt(Z) phase"),
        GateConfig::new("sdg", &[], "Conjugate of s"),
        GateConfig::new("t", &[], "sqrt(S) phase"),
        GateConfig::new("tdg", &[], "Conjugate of t"),
        GateConfig::new("sx", &[], "sqrt(X)"),
        GateConfig::new("sxdg", &[], "Conjugate of sx"),
        GateConfig::new("rx", &["theta"], "X-axis rotation"),
        GateConfig::new("ry", &["theta"], "Y-axis rotation"),
        GateConfig::new("rz", &["phi"], "Z-axis rotation"),
        GateConfig::new("u1", &["lambda"], "Phase gate"),
        GateConfig::new("u2", &["phi", "lambda"], "Single-pulse rotation")
            .with_qasm_def("gate u2(phi,lambda) q { U(pi/2,phi,lambda) q; }"),
        GateConfig::new("u3", THETA_PHI_LAMBDA, "Generic single-qubit rotation")
            .with_qasm_def("gate u3(theta,phi,lambda) q { U(theta,phi,lambda) q; }"),
        GateConfig::new("cx", &[], "Controlled-X"),
        GateConfig::new("cy", &[], "Controlled-Y"),
        GateConfig::new("cz", &[], "Controlled-Z"),
        GateConfig::new("ch", &[], "Controlled-Hadamard"),
        GateConfig::new("csx", &[], "Controlled-sqrt(X)"),
        GateConfig::new("swap", &[], "Swap"),
        GateConfig::new("iswap", &[], "Swap with i phase on |01> and |10>")
            .with_qasm_def("gate iswap a,b { s a; s b; h a; cx a,b; cx b,a; h b; }"),
        GateConfig::new("crx", &["theta"], "Controlled X rotation"),
        GateConfig::new("cry", &["theta"], "Controlled Y rotation"),
        GateConfig::new("crz", &["lambda"], "Controlled Z rotation"),
        GateConfig::new("cu1", &["lambda"], "Controlled phase"),
        GateConfig::new("cu2", &["phi", "lambda"], "Controlled u2"),
        GateConfig::new("cu3", THETA_PHI_LAMBDA, "Controlled u3"),
        GateConfig::new("rxx", &["theta"], "XX interaction")
            .with_qasm_def("gate rxx(theta) a,b { h a; h b; cx a,b; rz(theta) b; cx a,b; h b; h a; }"),
        GateConfig::new("ryy", &["theta"], "YY interaction"),
        GateConfig::new("rzz", &["theta"], "ZZ interaction")
            .with_qasm_def("gate rzz(theta) a,b { cx a,b; u1(theta) b; cx a,b; }"),
        GateConfig::new("ccx", &[], "Toffoli"),
        GateConfig::new("cswap", &[], "Fredkin"),
        GateConfig::new("mcx", &[], "Multi-controlled X"),
        GateConfig::new("mcy", &[], "Multi-controlled Y"),
        GateConfig::new("mcz", &[], "Multi-controlled Z"),
        GateConfig::new("mcu1", &["lambda"], "Multi-controlled phase"),
        GateConfig::new("mcu2", &["phi", "lambda"], "Multi-controlled u2"),
        GateConfig::new("mcu3", THETA_PHI_LAMBDA, "Multi-controlled u3"),
        GateConfig::new("mcswap", &[], "Multi-controlled swap"),
    ]
}
