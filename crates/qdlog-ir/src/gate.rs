//! Gate types.

use serde::{Deserialize, Serialize};

use crate::qubit::ClbitId;

/// The gate set used by the arithmetic and phase-estimation circuits.
///
/// Controlled gates take their controls as the leading qubit operands.
/// `P` and `CP` put the phase `e^{iθ}` on the |1⟩ (resp. |11⟩) component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StandardGate {
    /// Pauli-X gate.
    X,
    /// Hadamard gate.
    H,
    /// Pauli-Z gate.
    Z,
    /// Phase gate.
    P(f64),
    /// Controlled-X (CNOT) gate.
    CX,
    /// Controlled phase gate.
    CP(f64),
    /// Toffoli gate (CCX).
    CCX,
    /// Multi-controlled X with an arbitrary number of controls.
    MCX {
        /// Number of control qubits preceding the target.
        num_controls: u32,
    },
    /// SWAP gate.
    Swap,
    /// Fredkin gate (CSWAP).
    CSwap,
}

impl StandardGate {
    /// Get the name of this gate.
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            StandardGate::X => "x",
            StandardGate::H => "h",
            StandardGate::Z => "z",
            StandardGate::P(_) => "p",
            StandardGate::CX => "cx",
            StandardGate::CP(_) => "cp",
            StandardGate::CCX => "ccx",
            StandardGate::MCX { .. } => "mcx",
            StandardGate::Swap => "swap",
            StandardGate::CSwap => "cswap",
        }
    }

    /// Get the number of qubits this gate operates on.
    #[inline]
    pub fn num_qubits(&self) -> u32 {
        match self {
            StandardGate::X | StandardGate::H | StandardGate::Z | StandardGate::P(_) => 1,
            StandardGate::CX | StandardGate::CP(_) | StandardGate::Swap => 2,
            StandardGate::CCX | StandardGate::CSwap => 3,
            StandardGate::MCX { num_controls } => num_controls + 1,
        }
    }

    /// Number of leading control operands.
    #[inline]
    pub fn num_controls(&self) -> u32 {
        match self {
            StandardGate::CX | StandardGate::CP(_) | StandardGate::CSwap => 1,
            StandardGate::CCX => 2,
            StandardGate::MCX { num_controls } => *num_controls,
            _ => 0,
        }
    }

    /// The adjoint gate.
    pub fn inverse(&self) -> StandardGate {
        match self {
            StandardGate::P(theta) => StandardGate::P(-theta),
            StandardGate::CP(theta) => StandardGate::CP(-theta),
            other => other.clone(),
        }
    }

    /// Whether the gate is a permutation of basis states.
    pub fn is_classical(&self) -> bool {
        matches!(
            self,
            StandardGate::X
                | StandardGate::CX
                | StandardGate::CCX
                | StandardGate::MCX { .. }
                | StandardGate::Swap
                | StandardGate::CSwap
        )
    }
}

/// Classical condition on a conditioned gate.
///
/// The gate fires only when the little-endian value read from `clbits`
/// (first bit least significant) equals `value`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassicalCondition {
    /// Bits read by the condition.
    pub clbits: Vec<ClbitId>,
    /// The value to compare against.
    pub value: u64,
}

impl ClassicalCondition {
    /// Create a new classical condition.
    pub fn new(clbits: impl IntoIterator<Item = ClbitId>, value: u64) -> Self {
        Self {
            clbits: clbits.into_iter().collect(),
            value,
        }
    }

    /// Condition that a single bit reads 1.
    pub fn bit_set(clbit: ClbitId) -> Self {
        Self::new([clbit], 1)
    }

    /// Evaluate the condition against a lookup of bit values.
    pub fn is_satisfied(&self, bit: impl Fn(ClbitId) -> bool) -> bool {
        let read = self
            .clbits
            .iter()
            .enumerate()
            .fold(0u64, |acc, (k, &c)| acc | (u64::from(bit(c)) << k));
        read == self.value
    }
}

/// A gate with associated metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gate {
    /// The kind of gate.
    pub kind: StandardGate,
    /// Optional label for the gate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Optional classical condition.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<ClassicalCondition>,
}

impl Gate {
    /// Create a new unconditioned gate.
    pub fn standard(gate: StandardGate) -> Self {
        Self {
            kind: gate,
            label: None,
            condition: None,
        }
    }

    /// Add a label to the gate.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Add a classical condition to the gate.
    #[must_use]
    pub fn with_condition(mut self, condition: ClassicalCondition) -> Self {
        self.condition = Some(condition);
        self
    }

    /// Get the name of this gate.
    pub fn name(&self) -> &str {
        self.kind.name()
    }

    /// Get the number of qubits.
    pub fn num_qubits(&self) -> u32 {
        self.kind.num_qubits()
    }

    /// Whether the gate waits on classical bits.
    pub fn is_conditioned(&self) -> bool {
        self.condition.is_some()
    }
}

impl From<StandardGate> for Gate {
    fn from(gate: StandardGate) -> Self {
        Gate::standard(gate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_standard_gate_properties() {
        assert_eq!(StandardGate::H.num_qubits(), 1);
        assert_eq!(StandardGate::CP(PI).num_qubits(), 2);
        assert_eq!(StandardGate::CCX.num_qubits(), 3);
        assert_eq!(StandardGate::MCX { num_controls: 4 }.num_qubits(), 5);
        assert_eq!(StandardGate::MCX { num_controls: 4 }.num_controls(), 4);
        assert_eq!(StandardGate::Swap.num_controls(), 0);
    }

    #[test]
    fn test_inverse_negates_phases() {
        assert_eq!(StandardGate::P(0.5).inverse(), StandardGate::P(-0.5));
        assert_eq!(StandardGate::CP(-1.0).inverse(), StandardGate::CP(1.0));
        assert_eq!(StandardGate::CSwap.inverse(), StandardGate::CSwap);
    }

    #[test]
    fn test_condition_little_endian() {
        let cond = ClassicalCondition::new([ClbitId(4), ClbitId(2)], 0b01);
        assert!(cond.is_satisfied(|c| c == ClbitId(4)));
        assert!(!cond.is_satisfied(|c| c == ClbitId(2)));
        assert!(!cond.is_satisfied(|_| true));
    }

    #[test]
    fn test_gate_creation() {
        let g = Gate::standard(StandardGate::P(PI / 4.0))
            .with_condition(ClassicalCondition::bit_set(ClbitId(0)));
        assert_eq!(g.name(), "p");
        assert!(g.is_conditioned());
        assert!(g.label.is_none());
    }
}
