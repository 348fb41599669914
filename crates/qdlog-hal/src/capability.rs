//! Backend capability introspection.

use serde::{Deserialize, Serialize};

/// Hardware capabilities of a backend.
///
/// Circuits produced by the phase-estimation orchestrators need
/// mid-circuit measurement, reset and classically conditioned gates
/// for every variant except the separate-register one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Capabilities {
    /// Name of the backend.
    pub name: String,
    /// Number of qubits available.
    pub num_qubits: u32,
    /// Supported gate names.
    pub gate_set: Vec<String>,
    /// Maximum number of shots per job.
    pub max_shots: u32,
    /// Whether this is a simulator.
    pub is_simulator: bool,
    /// Capability flags: `"mid_circuit_measurement"`, `"reset"`,
    /// `"classical_feedback"`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub features: Vec<String>,
}

impl Capabilities {
    /// Capabilities of a local simulator over the full gate set.
    pub fn simulator(num_qubits: u32) -> Self {
        Self {
            name: "simulator".into(),
            num_qubits,
            gate_set: ["x", "h", "z", "p", "cx", "cp", "ccx", "mcx", "swap", "cswap"]
                .into_iter()
                .map(String::from)
                .collect(),
            max_shots: 1_000_000,
            is_simulator: true,
            features: vec![
                "mid_circuit_measurement".into(),
                "reset".into(),
                "classical_feedback".into(),
            ],
        }
    }

    /// Whether `gate` is in the supported gate set.
    pub fn supports_gate(&self, gate: &str) -> bool {
        self.gate_set.iter().any(|g| g == gate)
    }

    /// Whether the capability flag `feature` is set.
    pub fn has_feature(&self, feature: &str) -> bool {
        self.features.iter().any(|f| f == feature)
    }
}
