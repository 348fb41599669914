//! Two phase registers sharing one target.

use std::sync::Arc;

use tracing::debug;

use qdlog_arith::ModExpBuilder;
use qdlog_ir::Circuit;

use super::{DiscreteLogAlgorithm, Variant, bottom_width, exponentiation_pair};
use crate::config::DiscreteLogConfig;
use crate::error::AlgoResult;
use crate::stage::{Schedule, Stage, StageTracker};

/// Mosca-Ekert with a dedicated phase register per stage.
///
/// Registers `topstage1[n]`, `topstage2[n]` and `bot`. Both stages act on
/// the same target; both registers are measured after the second inverse
/// QFT. Needs `2n` phase qubits but no mid-circuit measurement.
pub struct SeparateRegister {
    config: DiscreteLogConfig,
    builder: Arc<dyn ModExpBuilder>,
}

impl SeparateRegister {
    /// Validate `config` and use its arithmetic.
    pub fn new(config: DiscreteLogConfig) -> AlgoResult<Self> {
        config.validate()?;
        let builder = Arc::new(config.arithmetic);
        Ok(Self { config, builder })
    }

    /// Replace the exponentiation builder.
    #[must_use]
    pub fn with_builder(mut self, builder: impl ModExpBuilder + 'static) -> Self {
        self.builder = Arc::new(builder);
        self
    }
}

impl DiscreteLogAlgorithm for SeparateRegister {
    fn variant(&self) -> Variant {
        Variant::SeparateRegister
    }

    fn config(&self) -> &DiscreteLogConfig {
        &self.config
    }

    fn construct_circuit(&self) -> AlgoResult<Circuit> {
        let n = self.config.top_width();
        let (exp_g, exp_b) = exponentiation_pair(&*self.builder, &self.config, n)?;

        let mut circuit = Circuit::new(format!("dlog_{}", self.variant()));
        let top1 = circuit.add_qreg("topstage1", n)?;
        let top2 = circuit.add_qreg("topstage2", n)?;
        let bot = circuit.add_qreg("bot", bottom_width(&exp_g, n))?;
        let m1 = circuit.add_creg("m1", n)?;
        let m2 = circuit.add_creg("m2", n)?;
        let iqft = Circuit::iqft(n, true)?;
        let mut tracker = StageTracker::new(Schedule::Deferred, n);

        tracker.advance(Stage::Stage1Apply)?;
        for q in top1.iter() {
            circuit.h(q)?;
        }
        circuit.x(bot[0])?;
        let stage1: Vec<_> = top1.iter().chain(bot.iter()).collect();
        circuit.append(&exp_g, &stage1, &[])?;
        circuit.append(&iqft, top1.as_slice(), &[])?;

        tracker.advance(Stage::Stage2Apply)?;
        for q in top2.iter() {
            circuit.h(q)?;
        }
        let stage2: Vec<_> = top2.iter().chain(bot.iter()).collect();
        circuit.append(&exp_b, &stage2, &[])?;
        circuit.append(&iqft, top2.as_slice(), &[])?;

        tracker.advance(Stage::Stage1Measure)?;
        circuit.measure_all(top1.iter(), m1.iter())?;
        tracker.advance(Stage::Stage2Measure)?;
        circuit.measure_all(top2.iter(), m2.iter())?;
        tracker.advance(Stage::Combine)?;

        debug!(
            qubits = circuit.num_qubits(),
            instructions = circuit.len(),
            depth = circuit.depth(),
            "assembled separate-register circuit"
        );
        Ok(circuit)
    }
}
