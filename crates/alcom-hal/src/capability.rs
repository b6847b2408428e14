//! Backend capability introspection.
//!
//! [`Capabilities`] is fixed at backend construction. Its serialized form is
//! what [`BackendRegistry::filter_by`](crate::BackendRegistry::filter_by)
//! matches against.

use serde::{Deserialize, Serialize};

/// One gate a backend accepts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateConfig {
    /// OpenQASM 2.0 name, e.g. `cx` or `mcu3`.
    pub name: String,
    /// Parameter names, e.g. `["theta", "phi", "lambda"]`.
    pub parameters: Vec<String>,
    /// Whether the gate may carry an `if (c == n)` condition.
    pub conditional: bool,
    pub description: String,
    /// Reference definition, empty for builtins.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub qasm_def: String,
}

impl GateConfig {
    pub fn new(name: impl Into<String>, parameters: &[&str], description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: parameters.iter().map(|p| (*p).to_string()).collect(),
            conditional: true,
            description: description.into(),
            qasm_def: String::new(),
        }
    }

    pub fn with_qasm_def(mut self, def: impl Into<String>) -> Self {
        self.qasm_def = def.into();
        self
    }
}

/// What a backend can run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Capabilities {
    pub backend_name: String,
    pub backend_version: String,
    /// Largest circuit, in qubits.
    pub n_qubits: u32,
    pub gates: Vec<GateConfig>,
    /// Names of every gate in `gates`, in the same order.
    pub basis_gates: Vec<String>,
    pub max_shots: u32,
    pub simulator: bool,
    pub local: bool,
    /// Classical conditions are supported.
    pub conditional: bool,
    /// Per-shot memory is returned.
    pub memory: bool,
    pub description: String,
    /// Capability flags such as `"statevector"` or `"mid_circuit_measurement"`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub features: Vec<String>,
}

impl Capabilities {
    /// Local simulator capabilities over the given gate list.
    pub fn simulator(
        name: impl Into<String>,
        version: impl Into<String>,
        n_qubits: u32,
        gates: Vec<GateConfig>,
    ) -> Self {
        let basis_gates = gates.iter().map(|g| g.name.clone()).collect();
        Self {
            backend_name: name.into(),
            backend_version: version.into(),
            n_qubits,
            gates,
            basis_gates,
            max_shots: 100_000,
            simulator: true,
            local: true,
            conditional: true,
            memory: false,
            description: String::new(),
            features: Vec::new(),
        }
    }

    pub fn with_max_shots(mut self, max_shots: u32) -> Self {
        self.max_shots = max_shots;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_features(mut self, features: &[&str]) -> Self {
        self.features = features.iter().map(|f| (*f).to_string()).collect();
        self
    }

    pub fn supports_gate(&self, name: &str) -> bool {
        self.basis_gates.iter().any(|g| g == name)
    }

    pub fn has_feature(&self, feature: &str) -> bool {
        self.features.iter().any(|f| f == feature)
    }
}
