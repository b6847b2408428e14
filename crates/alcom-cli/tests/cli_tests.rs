//! End-to-end tests of the `alcom` binary.

use std::io::Write;
use std::process::{Command, Output};

fn alcom(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_alcom"))
        .args(args)
        .env_remove("RUST_LOG")
        .env_remove("ALCOM_CONFIG")
        .output()
        .expect("failed to launch alcom")
}

fn qasm_file(body: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".qasm").tempfile().unwrap();
    write!(file, "OPENQASM 2.0;\ninclude \"qelib1.inc\";\n{body}").unwrap();
    file
}

#[test]
fn test_version() {
    let out = alcom(&["version"]);
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("ALCOM"));
    assert!(stdout.contains("alcom-dd"));
}

#[test]
fn test_run_bell_json() {
    let file = qasm_file("qreg q[2];\ncreg c[2];\nh q[0];\ncx q[0], q[1];\nmeasure q -> c;\n");
    let path = file.path().to_str().unwrap();
    let out = alcom(&["run", "-i", path, "-s", "500", "--seed", "9", "--format", "json"]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

    let json: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(json["shots"], 500);
    assert_eq!(json["backend_name"], "qasm_simulator");
    let counts = json["counts"].as_object().unwrap();
    let total: u64 = counts.values().map(|v| v.as_u64().unwrap()).sum();
    assert_eq!(total, 500);
    assert!(counts.keys().all(|k| k == "00" || k == "11"));
    assert!(json.get("statevector").is_none());
}

#[test]
fn test_run_statevector_json() {
    let file = qasm_file("qreg q[1];\nh q[0];\n");
    let path = file.path().to_str().unwrap();
    let out = alcom(&["run", "-i", path, "-s", "1", "--statevector", "--format", "json"]);
    assert!(out.status.success());

    let json: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    let re = json["statevector"][0].as_array().unwrap();
    assert_eq!(re.len(), 2);
    assert!((re[0].as_f64().unwrap() - std::f64::consts::FRAC_1_SQRT_2).abs() < 1e-9);
}

#[test]
fn test_run_seed_reproducible() {
    let file = qasm_file("qreg q[3];\ncreg c[3];\nh q;\nmeasure q -> c;\n");
    let path = file.path().to_str().unwrap();
    let args = ["run", "-i", path, "-s", "64", "--seed", "1234", "--format", "json"];
    let first: serde_json::Value = serde_json::from_slice(&alcom(&args).stdout).unwrap();
    let second: serde_json::Value = serde_json::from_slice(&alcom(&args).stdout).unwrap();
    assert_eq!(first["counts"], second["counts"]);
}

#[test]
fn test_run_two_experiments_fails() {
    let file = qasm_file("qreg q[1];\nOPENQASM 2.0;\nqreg r[1];\n");
    let out = alcom(&["run", "-i", file.path().to_str().unwrap()]);
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("Error:"));
}

#[test]
fn test_run_missing_file() {
    let out = alcom(&["run", "-i", "/nonexistent/circuit.qasm"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("File not found"));
}

#[test]
fn test_run_respects_config_file() {
    let mut config = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
    writeln!(config, "max_qubits: 2").unwrap();
    let file = qasm_file("qreg q[3];\ncreg c[3];\nmeasure q -> c;\n");
    let out = alcom(&[
        "run",
        "-i",
        file.path().to_str().unwrap(),
        "--config",
        config.path().to_str().unwrap(),
    ]);
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("at most 2"));
}

#[test]
fn test_backends_json() {
    let out = alcom(&["backends", "--json"]);
    assert!(out.status.success());
    let json: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    let list = json.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["backend_name"], "qasm_simulator");
    assert_eq!(list[0]["n_qubits"], 30);
}
