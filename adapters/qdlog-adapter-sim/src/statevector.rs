//! Sparse statevector simulation engine.
//!
//! Only non-zero amplitudes are stored, keyed by the basis-state index
//! (bit `q` of the key is qubit `q`). Arithmetic circuits keep most of the
//! register in computational-basis states, so the support stays small even
//! for circuits well beyond dense-simulation range.

use num_complex::Complex64;
use rustc_hash::FxHashMap;
use std::f64::consts::FRAC_1_SQRT_2;

use qdlog_hal::{HalError, HalResult};
use qdlog_ir::{Circuit, Instruction, InstructionKind, QubitId, StandardGate};

/// Amplitudes whose squared norm falls below this are dropped.
const PRUNE_NORM_SQR: f64 = 1e-20;

/// Largest supported register (basis indices are `u64`).
pub const MAX_QUBITS: usize = 64;

/// A sparse statevector.
#[derive(Debug, Clone)]
pub struct Statevector {
    amplitudes: FxHashMap<u64, Complex64>,
    num_qubits: usize,
}

impl Statevector {
    /// Create a new statevector initialized to |0...0⟩.
    pub fn new(num_qubits: usize) -> Self {
        Self::from_basis(num_qubits, 0)
    }

    /// Create the computational basis state `|index⟩`.
    pub fn from_basis(num_qubits: usize, index: u64) -> Self {
        let mut amplitudes = FxHashMap::default();
        amplitudes.insert(index, Complex64::new(1.0, 0.0));
        Self {
            amplitudes,
            num_qubits,
        }
    }

    /// Get the number of qubits.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Number of stored (non-negligible) amplitudes.
    pub fn support_size(&self) -> usize {
        self.amplitudes.len()
    }

    /// Amplitude of basis state `index`.
    pub fn amplitude(&self, index: u64) -> Complex64 {
        self.amplitudes
            .get(&index)
            .copied()
            .unwrap_or(Complex64::new(0.0, 0.0))
    }

    /// Squared norm of the state.
    pub fn norm_sqr(&self) -> f64 {
        self.amplitudes.values().map(Complex64::norm_sqr).sum()
    }

    /// Basis-state probabilities, sorted by index.
    pub fn probabilities(&self) -> Vec<(u64, f64)> {
        let mut probs: Vec<_> = self
            .amplitudes
            .iter()
            .map(|(&k, a)| (k, a.norm_sqr()))
            .collect();
        probs.sort_unstable_by_key(|&(k, _)| k);
        probs
    }

    /// Read the little-endian value of `qubits` out of a basis index.
    pub fn read_register(index: u64, qubits: &[QubitId]) -> u64 {
        qubits
            .iter()
            .enumerate()
            .fold(0, |acc, (k, q)| acc | (((index >> q.index()) & 1) << k))
    }

    /// Write `value` into the bits of `qubits` of a basis index.
    pub fn write_register(index: u64, qubits: &[QubitId], value: u64) -> u64 {
        qubits.iter().enumerate().fold(index, |acc, (k, q)| {
            let mask = 1u64 << q.index();
            if (value >> k) & 1 == 1 {
                acc | mask
            } else {
                acc & !mask
            }
        })
    }

    /// Apply every instruction of a unitary circuit.
    pub fn apply_circuit(&mut self, circuit: &Circuit) -> HalResult<()> {
        if circuit.num_qubits() != self.num_qubits {
            return Err(HalError::InvalidCircuit(format!(
                "circuit has {} qubits, state has {}",
                circuit.num_qubits(),
                self.num_qubits
            )));
        }
        for inst in circuit.instructions() {
            self.apply(inst)?;
        }
        Ok(())
    }

    /// Apply a single unconditioned gate or barrier.
    pub fn apply(&mut self, instruction: &Instruction) -> HalResult<()> {
        match &instruction.kind {
            InstructionKind::Gate(gate) if gate.condition.is_none() => {
                self.apply_gate(&gate.kind, &instruction.qubits);
                Ok(())
            }
            InstructionKind::Barrier => Ok(()),
            _ => Err(HalError::InvalidCircuit(format!(
                "'{}' needs classical state; run it through the simulator backend",
                instruction.name()
            ))),
        }
    }

    /// Apply a gate to specific qubits.
    pub fn apply_gate(&mut self, gate: &StandardGate, qubits: &[QubitId]) {
        let q: Vec<usize> = qubits.iter().map(|q| q.index()).collect();
        match gate {
            StandardGate::X => self.permute(|i| i ^ (1 << q[0])),
            StandardGate::CX => {
                let (c, t) = (1u64 << q[0], 1u64 << q[1]);
                self.permute(|i| if i & c != 0 { i ^ t } else { i });
            }
            StandardGate::CCX | StandardGate::MCX { .. } => {
                let (controls, target) = q.split_at(q.len() - 1);
                let cmask = controls.iter().fold(0u64, |m, &c| m | (1 << c));
                let t = 1u64 << target[0];
                self.permute(|i| if i & cmask == cmask { i ^ t } else { i });
            }
            StandardGate::Swap => self.permute(|i| swap_bits(i, q[0], q[1])),
            StandardGate::CSwap => {
                let c = 1u64 << q[0];
                self.permute(|i| if i & c != 0 { swap_bits(i, q[1], q[2]) } else { i });
            }
            StandardGate::Z => self.apply_phase(1 << q[0], std::f64::consts::PI),
            StandardGate::P(theta) => self.apply_phase(1 << q[0], *theta),
            StandardGate::CP(theta) => self.apply_phase((1 << q[0]) | (1 << q[1]), *theta),
            StandardGate::H => self.apply_h(q[0]),
        }
    }

    // =========================================================================
    // Gate kernels
    // =========================================================================

    fn permute(&mut self, f: impl Fn(u64) -> u64) {
        let old = std::mem::take(&mut self.amplitudes);
        self.amplitudes.reserve(old.len());
        for (k, a) in old {
            self.amplitudes.insert(f(k), a);
        }
    }

    /// Multiply by `e^{iθ}` every basis state that has all bits of `mask` set.
    fn apply_phase(&mut self, mask: u64, theta: f64) {
        let phase = Complex64::from_polar(1.0, theta);
        for (k, a) in &mut self.amplitudes {
            if k & mask == mask {
                *a *= phase;
            }
        }
    }

    fn apply_h(&mut self, qubit: usize) {
        let mask = 1u64 << qubit;
        let old = std::mem::take(&mut self.amplitudes);
        let mut next: FxHashMap<u64, Complex64> = FxHashMap::default();
        next.reserve(old.len() * 2);
        for (k, a) in old {
            let a = a * FRAC_1_SQRT_2;
            let k0 = k & !mask;
            let k1 = k | mask;
            *next.entry(k0).or_default() += a;
            if k & mask == 0 {
                *next.entry(k1).or_default() += a;
            } else {
                *next.entry(k1).or_default() -= a;
            }
        }
        next.retain(|_, a| a.norm_sqr() > PRUNE_NORM_SQR);
        self.amplitudes = next;
    }

    // =========================================================================
    // Non-unitary operations
    // =========================================================================

    /// Probability that `qubit` reads 1.
    pub fn probability_one(&self, qubit: QubitId) -> f64 {
        let mask = 1u64 << qubit.index();
        self.amplitudes
            .iter()
            .filter(|&(k, _)| k & mask != 0)
            .map(|(_, a)| a.norm_sqr())
            .sum()
    }

    /// Split the state by the value of `qubit`.
    ///
    /// Returns the normalized post-measurement states for outcome 0 and 1
    /// together with their probabilities. Outcomes of negligible
    /// probability are returned as `None`.
    pub fn split(self, qubit: QubitId) -> [Option<(Statevector, f64)>; 2] {
        let mask = 1u64 << qubit.index();
        let num_qubits = self.num_qubits;
        let mut zero = FxHashMap::default();
        let mut one = FxHashMap::default();
        for (k, a) in self.amplitudes {
            if k & mask == 0 {
                zero.insert(k, a);
            } else {
                one.insert(k, a);
            }
        }
        [zero, one].map(|amplitudes| {
            let p: f64 = amplitudes.values().map(Complex64::norm_sqr).sum();
            if p <= PRUNE_NORM_SQR {
                return None;
            }
            let norm = p.sqrt();
            let amplitudes = amplitudes.into_iter().map(|(k, a)| (k, a / norm)).collect();
            Some((
                Statevector {
                    amplitudes,
                    num_qubits,
                },
                p,
            ))
        })
    }
}

fn swap_bits(i: u64, a: usize, b: usize) -> u64 {
    let bit_a = (i >> a) & 1;
    let bit_b = (i >> b) & 1;
    if bit_a == bit_b {
        i
    } else {
        i ^ ((1 << a) | (1 << b))
    }
}
