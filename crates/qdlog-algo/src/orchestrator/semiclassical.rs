//! Shared phase register read out bit by bit.

use std::sync::Arc;

use tracing::debug;

use qdlog_arith::ModExpBuilder;
use qdlog_ir::Circuit;

use super::{
    DiscreteLogAlgorithm, Variant, bottom_width, exponentiation_pair, semiclassical_iqft,
};
use crate::config::DiscreteLogConfig;
use crate::error::AlgoResult;
use crate::stage::{Schedule, Stage, StageTracker};

/// Mosca-Ekert with the semiclassical inverse QFT.
///
/// Same layout as [`SharedRegister`](super::SharedRegister), but each
/// stage's inverse QFT is replaced by single-qubit rotations conditioned on
/// the bits already measured. No two-qubit gate acts on the phase register
/// after the exponentiation.
pub struct SemiClassical {
    config: DiscreteLogConfig,
    builder: Arc<dyn ModExpBuilder>,
}

impl SemiClassical {
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

impl DiscreteLogAlgorithm for SemiClassical {
    fn variant(&self) -> Variant {
        Variant::SemiClassical
    }

    fn config(&self) -> &DiscreteLogConfig {
        &self.config
    }

    fn construct_circuit(&self) -> AlgoResult<Circuit> {
        let n = self.config.top_width();
        let (exp_g, exp_b) = exponentiation_pair(&*self.builder, &self.config, n)?;

        let mut circuit = Circuit::new(format!("dlog_{}", self.variant()));
        let top = circuit.add_qreg("top", n)?;
        let bot = circuit.add_qreg("bot", bottom_width(&exp_g, n))?;
        let m1 = circuit.add_creg("m1", n)?;
        let m2 = circuit.add_creg("m2", n)?;
        let all: Vec<_> = top.iter().chain(bot.iter()).collect();
        let mut tracker = StageTracker::new(Schedule::Sequential, n);

        tracker.advance(Stage::Stage1Apply)?;
        for q in top.iter() {
            circuit.h(q)?;
        }
        circuit.x(bot[0])?;
        circuit.append(&exp_g, &all, &[])?;

        tracker.advance(Stage::Stage1Measure)?;
        semiclassical_iqft(&mut circuit, top.as_slice(), m1.as_slice())?;

        tracker.advance(Stage::Reset)?;
        for q in top.iter() {
            circuit.reset(q)?;
        }

        tracker.advance(Stage::Stage2Apply)?;
        for q in top.iter() {
            circuit.h(q)?;
        }
        circuit.append(&exp_b, &all, &[])?;

        tracker.advance(Stage::Stage2Measure)?;
        semiclassical_iqft(&mut circuit, top.as_slice(), m2.as_slice())?;
        tracker.advance(Stage::Combine)?;

        debug!(
            qubits = circuit.num_qubits(),
            instructions = circuit.len(),
            depth = circuit.depth(),
            "assembled semiclassical circuit"
        );
        Ok(circuit)
    }
}
