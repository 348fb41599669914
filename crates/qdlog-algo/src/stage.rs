//! Stage machine guarding the order of circuit assembly.
//!
//! ```text
//!   Init ─→ Stage1Apply ─→ Stage1Measure ─→ Reset ─→ Stage2Apply ─→ Stage2Measure ─→ Combine
//! ```
//!
//! The separate-register variant defers both measurements to the end and
//! never resets. The one-qubit variant walks apply → measure → reset once
//! per phase bit, so the tracker counts measured bits per stage.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AlgoError, AlgoResult};

/// Assembly stage of a phase-estimation circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    /// Nothing emitted yet.
    Init,
    /// Controlled powers of `g` are being applied.
    Stage1Apply,
    /// First-stage phase bits are being measured.
    Stage1Measure,
    /// The control qubits are being reset for reuse.
    Reset,
    /// Controlled powers of `b` are being applied.
    Stage2Apply,
    /// Second-stage phase bits are being measured.
    Stage2Measure,
    /// The circuit is complete; outcomes can be combined.
    Combine,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Init => "init",
            Stage::Stage1Apply => "stage1-apply",
            Stage::Stage1Measure => "stage1-measure",
            Stage::Reset => "reset",
            Stage::Stage2Apply => "stage2-apply",
            Stage::Stage2Measure => "stage2-measure",
            Stage::Combine => "combine",
        };
        f.write_str(name)
    }
}

/// How the two stages are interleaved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schedule {
    /// One register measured after each stage and reset in between.
    Sequential,
    /// Two registers, both measured after the second stage.
    Deferred,
    /// A single control qubit, measured and reset once per phase bit.
    Bitwise,
}

/// Tracks the current [`Stage`] and rejects out-of-order transitions.
#[derive(Debug, Clone)]
pub struct StageTracker {
    schedule: Schedule,
    current: Stage,
    bits_per_stage: u32,
    measured: [u32; 2],
}

impl StageTracker {
    /// Start in [`Stage::Init`] for a phase register of `bits_per_stage` bits.
    pub fn new(schedule: Schedule, bits_per_stage: u32) -> Self {
        Self {
            schedule,
            current: Stage::Init,
            bits_per_stage,
            measured: [0, 0],
        }
    }

    /// The current stage.
    pub fn current(&self) -> Stage {
        self.current
    }

    /// Phase bits measured so far in stage 1 and stage 2.
    pub fn measured_bits(&self) -> [u32; 2] {
        self.measured
    }

    /// Move to `next`, failing with [`AlgoError::InvalidTransition`] if the
    /// schedule does not allow it.
    pub fn advance(&mut self, next: Stage) -> AlgoResult<()> {
        if !self.allows(next) {
            return Err(AlgoError::InvalidTransition {
                from: self.current,
                to: next,
            });
        }
        let measured_now = match self.schedule {
            Schedule::Bitwise => 1,
            Schedule::Sequential | Schedule::Deferred => self.bits_per_stage,
        };
        match next {
            Stage::Stage1Measure => self.measured[0] += measured_now,
            Stage::Stage2Measure => self.measured[1] += measured_now,
            _ => {}
        }
        debug!(from = %self.current, to = %next, "stage transition");
        self.current = next;
        Ok(())
    }

    fn allows(&self, next: Stage) -> bool {
        use Stage::{
            Combine, Init, Reset, Stage1Apply, Stage1Measure, Stage2Apply, Stage2Measure,
        };
        let stage1_done = self.measured[0] >= self.bits_per_stage;
        let stage2_done = self.measured[1] >= self.bits_per_stage;

        match (self.schedule, self.current, next) {
            (_, Init, Stage1Apply) => true,

            (Schedule::Deferred, Stage1Apply, Stage2Apply)
            | (Schedule::Deferred, Stage2Apply, Stage1Measure)
            | (Schedule::Deferred, Stage1Measure, Stage2Measure)
            | (Schedule::Deferred, Stage2Measure, Combine) => true,
            (Schedule::Deferred, _, _) => false,

            (_, Stage1Apply, Stage1Measure) | (_, Stage2Apply, Stage2Measure) => true,
            (_, Stage1Measure, Reset) => true,
            (_, Reset, Stage2Apply) => stage1_done && !stage2_done,
            (Schedule::Sequential, Stage2Measure, Combine) => true,

            (Schedule::Bitwise, Reset, Stage1Apply) => !stage1_done,
            (Schedule::Bitwise, Stage2Measure, Reset) => true,
            (Schedule::Bitwise, Reset, Combine) => stage2_done,

            _ => false,
        }
    }
}
