//! Named quantum and classical registers.

use serde::{Deserialize, Serialize};
use std::ops::Index;

use crate::qubit::{ClbitId, QubitId};

/// A named, fixed-size group of qubits.
///
/// Registers are created by [`Circuit::add_qreg`](crate::Circuit::add_qreg)
/// and never resized afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuantumRegister {
    name: String,
    qubits: Vec<QubitId>,
}

impl QuantumRegister {
    pub(crate) fn new(name: impl Into<String>, qubits: Vec<QubitId>) -> Self {
        Self {
            name: name.into(),
            qubits,
        }
    }

    /// Register name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of qubits.
    pub fn len(&self) -> usize {
        self.qubits.len()
    }

    /// Whether the register holds no qubits.
    pub fn is_empty(&self) -> bool {
        self.qubits.is_empty()
    }

    /// The qubit at `index`, if in range.
    pub fn get(&self, index: usize) -> Option<QubitId> {
        self.qubits.get(index).copied()
    }

    /// All qubits, least significant first.
    pub fn as_slice(&self) -> &[QubitId] {
        &self.qubits
    }

    /// Iterate over the qubits.
    pub fn iter(&self) -> impl Iterator<Item = QubitId> + '_ {
        self.qubits.iter().copied()
    }
}

impl Index<usize> for QuantumRegister {
    type Output = QubitId;

    fn index(&self, index: usize) -> &QubitId {
        &self.qubits[index]
    }
}

/// A named, fixed-size group of classical bits.
///
/// Bit `k` of the register is the `k`-th least significant bit of the value
/// it holds after measurement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassicalRegister {
    name: String,
    clbits: Vec<ClbitId>,
}

impl ClassicalRegister {
    pub(crate) fn new(name: impl Into<String>, clbits: Vec<ClbitId>) -> Self {
        Self {
            name: name.into(),
            clbits,
        }
    }

    /// Register name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of bits.
    pub fn len(&self) -> usize {
        self.clbits.len()
    }

    /// Whether the register holds no bits.
    pub fn is_empty(&self) -> bool {
        self.clbits.is_empty()
    }

    /// The bit at `index`, if in range.
    pub fn get(&self, index: usize) -> Option<ClbitId> {
        self.clbits.get(index).copied()
    }

    /// All bits, least significant first.
    pub fn as_slice(&self) -> &[ClbitId] {
        &self.clbits
    }

    /// Iterate over the bits.
    pub fn iter(&self) -> impl Iterator<Item = ClbitId> + '_ {
        self.clbits.iter().copied()
    }
}

impl Index<usize> for ClassicalRegister {
    type Output = ClbitId;

    fn index(&self, index: usize) -> &ClbitId {
        &self.clbits[index]
    }
}
