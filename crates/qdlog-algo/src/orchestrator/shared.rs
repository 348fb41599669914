//! One phase register reused across both stages.

use std::sync::Arc;

use tracing::debug;

use qdlog_arith::ModExpBuilder;
use qdlog_ir::Circuit;

use super::{DiscreteLogAlgorithm, Variant, bottom_width, exponentiation_pair};
use crate::config::DiscreteLogConfig;
use crate::error::AlgoResult;
use crate::stage::{Schedule, Stage, StageTracker};

/// Mosca-Ekert with a single phase register.
///
/// The register is measured into `m1` after the first inverse QFT, reset to
/// |0⟩ and put back into superposition for the second stage, which is read
/// into `m2`.
pub struct SharedRegister {
    config: DiscreteLogConfig,
    builder: Arc<dyn ModExpBuilder>,
}

impl SharedRegister {
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

impl DiscreteLogAlgorithm for SharedRegister {
    fn variant(&self) -> Variant {
        Variant::SharedRegister
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
        let iqft = Circuit::iqft(n, true)?;
        let mut tracker = StageTracker::new(Schedule::Sequential, n);

        tracker.advance(Stage::Stage1Apply)?;
        for q in top.iter() {
            circuit.h(q)?;
        }
        circuit.x(bot[0])?;
        circuit.append(&exp_g, &all, &[])?;
        circuit.append(&iqft, top.as_slice(), &[])?;

        tracker.advance(Stage::Stage1Measure)?;
        circuit.measure_all(top.iter(), m1.iter())?;

        tracker.advance(Stage::Reset)?;
        for q in top.iter() {
            circuit.reset(q)?;
        }

        tracker.advance(Stage::Stage2Apply)?;
        for q in top.iter() {
            circuit.h(q)?;
        }
        circuit.append(&exp_b, &all, &[])?;
        circuit.append(&iqft, top.as_slice(), &[])?;

        tracker.advance(Stage::Stage2Measure)?;
        circuit.measure_all(top.iter(), m2.iter())?;
        tracker.advance(Stage::Combine)?;

        debug!(
            qubits = circuit.num_qubits(),
            instructions = circuit.len(),
            depth = circuit.depth(),
            "assembled shared-register circuit"
        );
        Ok(circuit)
    }
}
