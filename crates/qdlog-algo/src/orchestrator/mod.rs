//! Phase-estimation orchestrators.
//!
//! Each variant assembles a complete Mosca-Ekert circuit from pluggable
//! arithmetic and runs it on a [`Backend`]. They differ in how the two phase
//! registers are laid out and read:
//!
//! | Variant | Phase qubits | Inverse QFT | Mid-circuit |
//! |---------|--------------|-------------|-------------|
//! | [`SeparateRegister`] | `2n` | full | none |
//! | [`SharedRegister`] | `n` | full | measure, reset |
//! | [`SemiClassical`] | `n` | semiclassical | measure, feedback, reset |
//! | [`OneQubit`] | `1` | semiclassical | per bit |
//!
//! All four produce the same distribution over `(m1, m2)`.

mod one_qubit;
mod semiclassical;
mod separate;
mod shared;

pub use one_qubit::OneQubit;
pub use semiclassical::SemiClassical;
pub use separate::SeparateRegister;
pub use shared::SharedRegister;

use std::f64::consts::PI;
use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use qdlog_arith::ModExpBuilder;
use qdlog_hal::{Backend, HalError, ValidationResult};
use qdlog_ir::{Circuit, ClassicalCondition, ClbitId, QubitId, StandardGate};

use crate::aggregator::{DiscreteLogResult, combine, decode_counts};
use crate::config::DiscreteLogConfig;
use crate::error::{AlgoError, AlgoResult};
use crate::feedback::verify_feedback_order;

/// Orchestration variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Variant {
    /// Two phase registers, measured at the end.
    SeparateRegister,
    /// One phase register, measured and reset between stages.
    SharedRegister,
    /// One phase register read out with the semiclassical inverse QFT.
    SemiClassical,
    /// A single recycled control qubit.
    OneQubit,
}

impl Variant {
    /// All variants.
    pub const ALL: [Variant; 4] = [
        Variant::SeparateRegister,
        Variant::SharedRegister,
        Variant::SemiClassical,
        Variant::OneQubit,
    ];

    /// Short name used in circuit names and logs.
    pub fn name(self) -> &'static str {
        match self {
            Variant::SeparateRegister => "separate-register",
            Variant::SharedRegister => "shared-register",
            Variant::SemiClassical => "semi-classical",
            Variant::OneQubit => "one-qubit",
        }
    }

    /// Instantiate the variant with the arithmetic named in `config`.
    pub fn instantiate(
        self,
        config: DiscreteLogConfig,
    ) -> AlgoResult<Box<dyn DiscreteLogAlgorithm>> {
        Ok(match self {
            Variant::SeparateRegister => Box::new(SeparateRegister::new(config)?),
            Variant::SharedRegister => Box::new(SharedRegister::new(config)?),
            Variant::SemiClassical => Box::new(SemiClassical::new(config)?),
            Variant::OneQubit => Box::new(OneQubit::new(config)?),
        })
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A discrete-logarithm solver: circuit construction followed by execution
/// and classical post-processing.
#[async_trait]
pub trait DiscreteLogAlgorithm: Send + Sync {
    /// Which orchestration this is.
    fn variant(&self) -> Variant;

    /// The validated run parameters.
    fn config(&self) -> &DiscreteLogConfig;

    /// Assemble the full circuit without running it.
    fn construct_circuit(&self) -> AlgoResult<Circuit>;

    /// Construct the circuit, execute it on `backend` and combine the
    /// outcomes.
    #[instrument(skip(self, backend), fields(variant = %self.variant(), backend = backend.name()))]
    async fn run(&self, backend: &dyn Backend) -> AlgoResult<DiscreteLogResult> {
        let circuit = self.construct_circuit()?;
        verify_feedback_order(&circuit)?;

        if let ValidationResult::Invalid { reasons } = backend.validate(&circuit).await? {
            return Err(HalError::InvalidCircuit(reasons.join("; ")).into());
        }

        let config = self.config();
        let execution = backend.run(&circuit, config.shots).await?;
        debug!(
            outcomes = execution.counts.len(),
            elapsed_ms = execution.execution_time_ms,
            "execution finished"
        );

        let outcomes = decode_counts(&circuit, &execution.counts)?;
        let result = combine(outcomes, config);
        info!(
            variant = %self.variant(),
            m = ?result.m,
            success_probability = ?result.success_probability,
            "discrete logarithm run finished"
        );
        Ok(result)
    }
}

/// Build `g^x` and `b^x` and check that both fit behind an `n`-qubit
/// phase register.
pub(crate) fn exponentiation_pair(
    builder: &dyn ModExpBuilder,
    config: &DiscreteLogConfig,
    n: u32,
) -> AlgoResult<(Circuit, Circuit)> {
    let exp_g = builder.build(n, config.g, config.p)?;
    let exp_b = builder.build(n, config.b, config.p)?;
    for (base, circuit) in [("g", &exp_g), ("b", &exp_b)] {
        check_subcircuit(circuit, &format!("exponentiation of {base}"))?;
        if circuit.num_qubits() <= n as usize {
            return Err(AlgoError::BuilderContract(format!(
                "exponentiation of {base} has {} qubits, no room for a target behind {n} exponent qubits",
                circuit.num_qubits()
            )));
        }
    }
    if exp_g.num_qubits() != exp_b.num_qubits() {
        return Err(AlgoError::BuilderContract(format!(
            "exponentiations of g and b differ in width ({} vs {})",
            exp_g.num_qubits(),
            exp_b.num_qubits()
        )));
    }
    debug!(
        width = exp_g.num_qubits(),
        gates = exp_g.len() + exp_b.len(),
        "built exponentiation pair"
    );
    Ok((exp_g, exp_b))
}

/// A sub-circuit must be purely unitary and own no classical bits.
pub(crate) fn check_subcircuit(circuit: &Circuit, what: &str) -> AlgoResult<()> {
    if !circuit.is_unitary() {
        return Err(AlgoError::BuilderContract(format!(
            "{what} contains measurement, reset or classical control"
        )));
    }
    if circuit.num_clbits() != 0 {
        return Err(AlgoError::BuilderContract(format!(
            "{what} declares {} classical bits",
            circuit.num_clbits()
        )));
    }
    Ok(())
}

/// Qubits of a sub-circuit beyond its leading `leading` control qubits.
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn bottom_width(circuit: &Circuit, leading: u32) -> u32 {
    (circuit.num_qubits() - leading as usize) as u32
}

/// Phase corrections for the bit of weight `2^bit`: every earlier measured
/// bit `j` removes a phase of `π / 2^(bit - j)` from `qubit`.
pub(crate) fn phase_corrections(
    circuit: &mut Circuit,
    qubit: QubitId,
    clbits: &[ClbitId],
    bit: usize,
) -> AlgoResult<()> {
    for (j, &clbit) in clbits.iter().enumerate().take(bit) {
        #[allow(clippy::cast_possible_wrap, clippy::cast_possible_truncation)]
        let theta = -PI / 2f64.powi((bit - j) as i32);
        circuit.gate_if(
            StandardGate::P(theta),
            [qubit],
            ClassicalCondition::bit_set(clbit),
        )?;
    }
    Ok(())
}

/// Semiclassical inverse QFT of `top` into `clbits`.
///
/// Qubit `i` carries the bit of weight `2^(n-1-i)`, so the readout starts
/// from the last qubit: corrections, H, then measurement into
/// `clbits[n-1-i]`.
pub(crate) fn semiclassical_iqft(
    circuit: &mut Circuit,
    top: &[QubitId],
    clbits: &[ClbitId],
) -> AlgoResult<()> {
    let n = top.len();
    for (i, &qubit) in top.iter().enumerate().rev() {
        let bit = n - 1 - i;
        phase_corrections(circuit, qubit, clbits, bit)?;
        circuit.h(qubit)?;
        circuit.measure(qubit, clbits[bit])?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use qdlog_arith::{ArithError, ArithResult};

    #[test]
    fn test_variant_serde() {
        let json = serde_json::to_string(&Variant::SemiClassical).unwrap();
        assert_eq!(json, "\"semi-classical\"");
        let back: Variant = serde_json::from_str("\"one-qubit\"").unwrap();
        assert_eq!(back, Variant::OneQubit);
        assert_eq!(Variant::SharedRegister.to_string(), "shared-register");
    }

    #[test]
    fn test_semiclassical_iqft_layout() {
        let mut circuit = Circuit::with_size("sc", 3, 3);
        let top = [QubitId(0), QubitId(1), QubitId(2)];
        let clbits = [ClbitId(0), ClbitId(1), ClbitId(2)];
        semiclassical_iqft(&mut circuit, &top, &clbits).unwrap();

        // qubit 2: h, measure; qubit 1: 1 correction, h, measure;
        // qubit 0: 2 corrections, h, measure
        assert_eq!(circuit.len(), 9);
        let first = &circuit.instructions()[1];
        assert!(first.is_measure());
        assert_eq!(first.qubits, vec![QubitId(2)]);
        assert_eq!(first.clbits, vec![ClbitId(0)]);

        let last = circuit.instructions().last().unwrap();
        assert_eq!(last.qubits, vec![QubitId(0)]);
        assert_eq!(last.clbits, vec![ClbitId(2)]);
        assert!(verify_feedback_order(&circuit).is_ok());
    }

    #[test]
    fn test_exponentiation_pair_rejects_measuring_builder() {
        let measuring = |n: u32, _a: u64, _p: u64| -> ArithResult<Circuit> {
            let mut c = Circuit::with_size("bad", n + 2, 1);
            c.measure(QubitId(0), ClbitId(0))?;
            Ok(c)
        };
        let config = DiscreteLogConfig::new(4, 2, 17);
        assert!(matches!(
            exponentiation_pair(&measuring, &config, 5),
            Err(AlgoError::BuilderContract(_))
        ));
    }

    #[test]
    fn test_exponentiation_pair_rejects_mismatched_widths() {
        let uneven = |n: u32, a: u64, _p: u64| -> ArithResult<Circuit> {
            Ok(Circuit::with_size("uneven", n + 1 + a as u32, 0))
        };
        let config = DiscreteLogConfig::new(4, 2, 17);
        assert!(matches!(
            exponentiation_pair(&uneven, &config, 5),
            Err(AlgoError::BuilderContract(_))
        ));

        let failing = |_n: u32, a: u64, p: u64| -> ArithResult<Circuit> {
            Err(ArithError::NotInvertible { value: a, modulus: p })
        };
        assert!(matches!(
            exponentiation_pair(&failing, &config, 5),
            Err(AlgoError::Arith(_))
        ));
    }
}
