//! Controlled incrementer using borrowed (dirty) qubits.

use qdlog_ir::Circuit;

use crate::error::{ArithResult, require_width};
use crate::ripple::takahashi_adder;

/// `|c⟩|x⟩|g⟩ -> |c⟩|x + c mod 2^n⟩|g⟩` for an arbitrary borrowed state `g`.
///
/// Layout: `[ctrl: 1][x: n][borrowed: n + 1]`.
///
/// The control is treated as the least significant bit of the `n + 1`-bit
/// value `v = c + 2x`. Subtracting `g` and then its complement `-g - 1`
/// yields `v + 1`, which carries into `x` exactly when `c = 1`; a final X
/// restores the control.
pub fn controlled_incrementer(n: u32) -> ArithResult<Circuit> {
    require_width("x", 1, n)?;
    let mut circuit = Circuit::new(format!("c_inc({n})"));
    let ctrl = circuit.add_qreg("ctrl", 1)?;
    let x = circuit.add_qreg("x", n)?;
    let borrowed = circuit.add_qreg("borrowed", n + 1)?;

    let subtractor = takahashi_adder(n + 1, false)?.inverse()?;
    let operands: Vec<_> = borrowed
        .iter()
        .chain(ctrl.iter())
        .chain(x.iter())
        .collect();

    circuit.append(&subtractor, &operands, &[])?;
    for q in borrowed.iter() {
        circuit.x(q)?;
    }
    circuit.append(&subtractor, &operands, &[])?;
    for q in borrowed.iter() {
        circuit.x(q)?;
    }
    circuit.x(ctrl[0])?;
    Ok(circuit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_incrementer_layout() {
        let c = controlled_incrementer(3).unwrap();
        assert_eq!(c.num_qubits(), 1 + 3 + 4);
        assert_eq!(c.qreg("borrowed").unwrap().len(), 4);
    }
}
