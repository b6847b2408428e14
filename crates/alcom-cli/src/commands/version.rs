//! Version command implementation.

use console::style;

use alcom_adapter_bdd::BACKEND_VERSION;

pub fn execute() {
    println!(
        "{} {} - decision-diagram quantum circuit simulator",
        style("ALCOM").cyan().bold(),
        style(format!("v{}", env!("CARGO_PKG_VERSION"))).yellow()
    );
    println!();
    println!("Components:");
    println!("  alcom-ir           Circuit intermediate representation");
    println!("  alcom-qasm         OpenQASM 2.0 parser and emitter");
    println!("  alcom-dd           Decision-diagram simulation engine");
    println!("  alcom-hal          Backend, job and result abstraction");
    println!("  alcom-adapter-bdd  qasm_simulator backend (v{BACKEND_VERSION})");
    println!();
    println!("License: {}", style("Apache-2.0").dim());
}
