//! Checks a circuit must pass before it reaches the engine.

use alcom_hal::{Capabilities, HalError, HalResult, RunOptions};
use alcom_ir::Circuit;
use tracing::warn;

use crate::config::BddConfig;
use crate::gates::NON_GATE_INSTRUCTIONS;

/// Reject submissions the backend cannot take at all, before a job exists.
pub fn check_structure(options: &RunOptions) -> HalResult<()> {
    if let Some(model) = &options.noise_model {
        if !model.is_empty() {
            return Err(HalError::StructuralValidation(
                "noise simulation is not supported by this backend".into(),
            ));
        }
    }
    Ok(())
}

/// Every reason `circuit` cannot run with `options`. Empty means valid.
pub fn check_circuit(
    config: &BddConfig,
    capabilities: &Capabilities,
    circuit: &Circuit,
    options: &RunOptions,
) -> Vec<String> {
    let mut reasons = Vec::new();
    let num_qubits = circuit.num_qubits();

    if num_qubits > config.max_qubits as usize {
        reasons.push(format!(
            "Circuit has {num_qubits} qubits but the backend supports at most {}",
            config.max_qubits
        ));
    }
    if options.shots == 0 || options.shots > config.max_shots {
        reasons.push(format!(
            "Shot count {} is outside 1..={}",
            options.shots, config.max_shots
        ));
    }
    if options.statevector && num_qubits > config.statevector_max_qubits as usize {
        reasons.push(format!(
            "Statevector requested for {num_qubits} qubits; the limit is {}",
            config.statevector_max_qubits
        ));
    }

    let mut unsupported: Vec<&str> = circuit
        .instructions()
        .iter()
        .map(|inst| inst.name())
        .filter(|name| !NON_GATE_INSTRUCTIONS.contains(name) && !capabilities.supports_gate(name))
        .collect();
    unsupported.sort_unstable();
    unsupported.dedup();
    for name in unsupported {
        reasons.push(format!("Gate '{name}' is not supported by {}", capabilities.backend_name));
    }

    reasons
}

/// Warn when classical bits exist but nothing writes to them.
pub fn warn_if_unmeasured(circuit: &Circuit) -> bool {
    if circuit.num_clbits() > 0 && !circuit.has_measurements() {
        warn!(
            "No measurements in circuit \"{}\": count data will return all zeros.",
            circuit.name()
        );
        return true;
    }
    false
}
