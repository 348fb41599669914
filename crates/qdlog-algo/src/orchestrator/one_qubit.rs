//! A single control qubit recycled for every phase bit.

use std::sync::Arc;

use tracing::debug;

use qdlog_arith::ModMulBuilder;
use qdlog_arith::numtheory::square_power;
use qdlog_ir::{Circuit, ClassicalRegister, QubitId};

use super::{DiscreteLogAlgorithm, Variant, bottom_width, check_subcircuit, phase_corrections};
use crate::config::DiscreteLogConfig;
use crate::error::{AlgoError, AlgoResult};
use crate::stage::{Schedule, Stage, StageTracker};

/// Mosca-Ekert on one control qubit.
///
/// Each phase bit, most significant power first, gets its own round: H,
/// controlled multiplication by `a^(2^i)`, the semiclassical corrections,
/// H, measurement and reset. The pluggable unit is a controlled multiplier
/// rather than a full exponentiation.
pub struct OneQubit {
    config: DiscreteLogConfig,
    builder: Arc<dyn ModMulBuilder>,
}

impl OneQubit {
    /// Validate `config` and use its arithmetic.
    pub fn new(config: DiscreteLogConfig) -> AlgoResult<Self> {
        config.validate()?;
        let builder = Arc::new(config.arithmetic);
        Ok(Self { config, builder })
    }

    /// Replace the multiplier builder.
    #[must_use]
    pub fn with_builder(mut self, builder: impl ModMulBuilder + 'static) -> Self {
        self.builder = Arc::new(builder);
        self
    }

    /// Controlled multipliers by `a^(2^i)` for `i` in `0..n`, all checked to
    /// share the same `[control][target][ancilla]` width.
    fn multipliers(&self, a: u64, n: u32) -> AlgoResult<Vec<Circuit>> {
        let p = self.config.p;
        let multipliers = (0..n)
            .map(|i| Ok(self.builder.build_multiplier(n, square_power(a, i, p), p)?))
            .collect::<AlgoResult<Vec<_>>>()?;

        let width = multipliers.first().map_or(0, Circuit::num_qubits);
        if width < 2 {
            return Err(AlgoError::BuilderContract(format!(
                "multiplier has {width} qubits, needs a control and a target"
            )));
        }
        for (i, multiplier) in multipliers.iter().enumerate() {
            check_subcircuit(multiplier, &format!("multiplier by {a}^(2^{i})"))?;
            if multiplier.num_qubits() != width {
                return Err(AlgoError::BuilderContract(format!(
                    "multiplier by {a}^(2^{i}) has {} qubits, expected {width}",
                    multiplier.num_qubits()
                )));
            }
        }
        Ok(multipliers)
    }

    fn emit_stage(
        circuit: &mut Circuit,
        tracker: &mut StageTracker,
        stages: (Stage, Stage),
        multipliers: &[Circuit],
        control: QubitId,
        operands: &[QubitId],
        creg: &ClassicalRegister,
    ) -> AlgoResult<()> {
        let (apply, measure) = stages;
        let n = multipliers.len();
        for (i, multiplier) in multipliers.iter().enumerate().rev() {
            tracker.advance(apply)?;
            circuit.h(control)?;
            circuit.append(multiplier, operands, &[])?;

            tracker.advance(measure)?;
            let bit = n - 1 - i;
            phase_corrections(circuit, control, creg.as_slice(), bit)?;
            circuit.h(control)?;
            circuit.measure(control, creg[bit])?;

            tracker.advance(Stage::Reset)?;
            circuit.reset(control)?;
            circuit.barrier(operands.iter().copied())?;
        }
        Ok(())
    }
}

impl DiscreteLogAlgorithm for OneQubit {
    fn variant(&self) -> Variant {
        Variant::OneQubit
    }

    fn config(&self) -> &DiscreteLogConfig {
        &self.config
    }

    fn construct_circuit(&self) -> AlgoResult<Circuit> {
        let n = self.config.top_width();
        let mul_g = self.multipliers(self.config.g, n)?;
        let mul_b = self.multipliers(self.config.b, n)?;
        if mul_g[0].num_qubits() != mul_b[0].num_qubits() {
            return Err(AlgoError::BuilderContract(format!(
                "multipliers for g and b differ in width ({} vs {})",
                mul_g[0].num_qubits(),
                mul_b[0].num_qubits()
            )));
        }

        let mut circuit = Circuit::new(format!("dlog_{}", self.variant()));
        let top = circuit.add_qreg("top", 1)?;
        let bot = circuit.add_qreg("bot", bottom_width(&mul_g[0], 1))?;
        let m1 = circuit.add_creg("m1", n)?;
        let m2 = circuit.add_creg("m2", n)?;
        let control = top[0];
        let operands: Vec<_> = top.iter().chain(bot.iter()).collect();
        let mut tracker = StageTracker::new(Schedule::Bitwise, n);

        circuit.x(bot[0])?;
        Self::emit_stage(
            &mut circuit,
            &mut tracker,
            (Stage::Stage1Apply, Stage::Stage1Measure),
            &mul_g,
            control,
            &operands,
            &m1,
        )?;
        Self::emit_stage(
            &mut circuit,
            &mut tracker,
            (Stage::Stage2Apply, Stage::Stage2Measure),
            &mul_b,
            control,
            &operands,
            &m2,
        )?;
        tracker.advance(Stage::Combine)?;

        debug!(
            qubits = circuit.num_qubits(),
            instructions = circuit.len(),
            depth = circuit.depth(),
            "assembled one-qubit circuit"
        );
        Ok(circuit)
    }
}
