//! Exact outcome distributions of circuits with mid-circuit measurement.
//!
//! Every measurement splits the running ensemble into branches that carry
//! their own post-measurement state, classical register and probability.
//! Resets are projective measurements whose result is discarded, followed by
//! a flip back to |0⟩. Classically conditioned gates act per branch.

use rand::Rng;
use rustc_hash::FxHashMap;
use tracing::debug;

use qdlog_hal::{Counts, HalError, HalResult};
use qdlog_ir::{Circuit, InstructionKind, QubitId, StandardGate};

use crate::statevector::{MAX_QUBITS, Statevector};

/// Branches below this probability are discarded.
const MIN_BRANCH_PROBABILITY: f64 = 1e-12;

/// Largest number of classical bits (outcomes are packed into `u64`).
pub const MAX_CLBITS: usize = 64;

struct Branch {
    state: Statevector,
    clbits: u64,
    probability: f64,
}

/// Probability of each classical outcome of a circuit.
#[derive(Debug, Clone)]
pub struct OutcomeDistribution {
    num_clbits: usize,
    /// `(packed clbits, probability)`, sorted by outcome.
    entries: Vec<(u64, f64)>,
}

impl OutcomeDistribution {
    /// Simulate `circuit` and collect the exact distribution of its
    /// classical bits.
    pub fn of_circuit(circuit: &Circuit) -> HalResult<Self> {
        let num_qubits = circuit.num_qubits();
        let num_clbits = circuit.num_clbits();
        if num_qubits > MAX_QUBITS {
            return Err(HalError::CircuitTooLarge(format!(
                "{num_qubits} qubits exceed the {MAX_QUBITS}-qubit index space"
            )));
        }
        if num_clbits > MAX_CLBITS {
            return Err(HalError::CircuitTooLarge(format!(
                "{num_clbits} classical bits exceed the {MAX_CLBITS}-bit outcome word"
            )));
        }

        let mut branches = vec![Branch {
            state: Statevector::new(num_qubits),
            clbits: 0,
            probability: 1.0,
        }];

        for inst in circuit.instructions() {
            match &inst.kind {
                InstructionKind::Gate(gate) => {
                    for branch in &mut branches {
                        let clbits = branch.clbits;
                        let fires = gate
                            .condition
                            .as_ref()
                            .is_none_or(|c| c.is_satisfied(|bit| (clbits >> bit.index()) & 1 == 1));
                        if fires {
                            branch.state.apply_gate(&gate.kind, &inst.qubits);
                        }
                    }
                }
                InstructionKind::Measure => {
                    for (&qubit, &clbit) in inst.qubits.iter().zip(&inst.clbits) {
                        let mask = 1u64 << clbit.index();
                        branches = split_all(branches, qubit, |mut b, outcome| {
                            b.clbits = if outcome == 1 {
                                b.clbits | mask
                            } else {
                                b.clbits & !mask
                            };
                            b
                        });
                    }
                }
                InstructionKind::Reset => {
                    let qubit = inst.qubits[0];
                    branches = split_all(branches, qubit, |mut b, outcome| {
                        if outcome == 1 {
                            b.state.apply_gate(&StandardGate::X, &[qubit]);
                        }
                        b
                    });
                }
                InstructionKind::Barrier => {}
            }
        }

        let mut merged: FxHashMap<u64, f64> = FxHashMap::default();
        for b in &branches {
            *merged.entry(b.clbits).or_insert(0.0) += b.probability;
        }
        let mut entries: Vec<_> = merged.into_iter().collect();
        entries.sort_unstable_by_key(|&(k, _)| k);

        debug!(
            circuit = circuit.name(),
            branches = branches.len(),
            outcomes = entries.len(),
            "Computed outcome distribution"
        );

        Ok(Self {
            num_clbits,
            entries,
        })
    }

    /// Number of classical bits per outcome.
    pub fn num_clbits(&self) -> usize {
        self.num_clbits
    }

    /// `(packed clbits, probability)` pairs sorted by outcome.
    pub fn entries(&self) -> &[(u64, f64)] {
        &self.entries
    }

    /// Probability of the outcome with packed clbits `outcome`.
    pub fn probability(&self, outcome: u64) -> f64 {
        self.entries
            .binary_search_by_key(&outcome, |&(k, _)| k)
            .map_or(0.0, |i| self.entries[i].1)
    }

    /// Format a packed outcome as a bitstring, highest clbit first.
    pub fn bitstring(&self, outcome: u64) -> String {
        (0..self.num_clbits)
            .rev()
            .map(|k| if (outcome >> k) & 1 == 1 { '1' } else { '0' })
            .collect()
    }

    /// Probability per bitstring.
    pub fn to_probabilities(&self) -> FxHashMap<String, f64> {
        self.entries
            .iter()
            .map(|&(k, p)| (self.bitstring(k), p))
            .collect()
    }

    /// Draw `shots` samples.
    pub fn sample(&self, shots: u32, rng: &mut impl Rng) -> Counts {
        let total: f64 = self.entries.iter().map(|&(_, p)| p).sum();
        let mut counts = Counts::new();
        if self.entries.is_empty() {
            return counts;
        }
        let mut tally: FxHashMap<u64, u64> = FxHashMap::default();
        for _ in 0..shots {
            let r: f64 = rng.r#gen::<f64>() * total;
            let mut cumulative = 0.0;
            let mut chosen = self.entries[self.entries.len() - 1].0;
            for &(k, p) in &self.entries {
                cumulative += p;
                if r < cumulative {
                    chosen = k;
                    break;
                }
            }
            *tally.entry(chosen).or_insert(0) += 1;
        }
        for (k, n) in tally {
            counts.insert(self.bitstring(k), n);
        }
        counts
    }
}

/// Measure `qubit` in every branch, keeping both outcomes.
fn split_all(
    branches: Vec<Branch>,
    qubit: QubitId,
    finish: impl Fn(Branch, u8) -> Branch,
) -> Vec<Branch> {
    let mut next = Vec::with_capacity(branches.len());
    for branch in branches {
        let Branch {
            state,
            clbits,
            probability,
        } = branch;
        let [zero, one] = state.split(qubit);
        for (outcome, part) in [(0u8, zero), (1u8, one)] {
            if let Some((state, p)) = part {
                if probability * p < MIN_BRANCH_PROBABILITY {
                    continue;
                }
                next.push(finish(
                    Branch {
                        state,
                        clbits,
                        probability: probability * p,
                    },
                    outcome,
                ));
            }
        }
    }
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use qdlog_ir::{ClassicalCondition, ClbitId};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_bell_distribution() {
        let mut circuit = Circuit::with_size("bell", 2, 2);
        circuit
            .h(QubitId(0))
            .unwrap()
            .cx(QubitId(0), QubitId(1))
            .unwrap()
            .measure_all([QubitId(0), QubitId(1)], [ClbitId(0), ClbitId(1)])
            .unwrap();
        let dist = OutcomeDistribution::of_circuit(&circuit).unwrap();
        assert_eq!(dist.entries().len(), 2);
        assert!((dist.probability(0b00) - 0.5).abs() < 1e-12);
        assert!((dist.probability(0b11) - 0.5).abs() < 1e-12);
        assert_eq!(dist.bitstring(0b01), "01");
    }

    #[test]
    fn test_feedback_corrects_measured_qubit() {
        // Measure a |+⟩ qubit, flip it back to |0⟩ when it read 1, measure again.
        let mut circuit = Circuit::with_size("feedback", 1, 2);
        circuit
            .h(QubitId(0))
            .unwrap()
            .measure(QubitId(0), ClbitId(0))
            .unwrap()
            .gate_if(
                StandardGate::X,
                [QubitId(0)],
                ClassicalCondition::bit_set(ClbitId(0)),
            )
            .unwrap()
            .measure(QubitId(0), ClbitId(1))
            .unwrap();
        let dist = OutcomeDistribution::of_circuit(&circuit).unwrap();
        assert!((dist.probability(0b00) - 0.5).abs() < 1e-12);
        assert!((dist.probability(0b01) - 0.5).abs() < 1e-12);
        assert_eq!(dist.probability(0b10), 0.0);
    }

    #[test]
    fn test_reset_returns_to_zero() {
        let mut circuit = Circuit::with_size("reset", 2, 1);
        circuit
            .h(QubitId(0))
            .unwrap()
            .cx(QubitId(0), QubitId(1))
            .unwrap()
            .reset(QubitId(0))
            .unwrap()
            .measure(QubitId(0), ClbitId(0))
            .unwrap();
        let dist = OutcomeDistribution::of_circuit(&circuit).unwrap();
        assert!((dist.probability(0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_sampling_is_reproducible() {
        let mut circuit = Circuit::with_size("coin", 1, 1);
        circuit
            .h(QubitId(0))
            .unwrap()
            .measure(QubitId(0), ClbitId(0))
            .unwrap();
        let dist = OutcomeDistribution::of_circuit(&circuit).unwrap();
        let a = dist.sample(200, &mut StdRng::seed_from_u64(11));
        let b = dist.sample(200, &mut StdRng::seed_from_u64(11));
        assert_eq!(a, b);
        assert_eq!(a.total_shots(), 200);
        assert!(a.get("0") > 0 && a.get("1") > 0);
    }
}
