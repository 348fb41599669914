//! Ordering check for classically conditioned gates.

use rustc_hash::FxHashSet;

use qdlog_ir::Circuit;

use crate::error::{AlgoError, AlgoResult};

/// Check that every conditioned gate reads only classical bits that an
/// earlier measurement has written.
pub fn verify_feedback_order(circuit: &Circuit) -> AlgoResult<()> {
    let mut written = FxHashSet::default();
    for (position, inst) in circuit.instructions().iter().enumerate() {
        if let Some(unwritten) = inst.read_clbits().iter().find(|c| !written.contains(*c)) {
            return Err(AlgoError::FeedbackOrder {
                instruction: position,
                clbit: unwritten.0,
            });
        }
        if inst.is_measure() {
            written.extend(inst.clbits.iter().copied());
        }
    }
    Ok(())
}
