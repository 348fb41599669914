//! Divide-and-conquer constant adder with two borrowed qubits.

use qdlog_ir::{Circuit, QubitId};

use crate::carry::carry_gate;
use crate::error::{ArithResult, require_width};
use crate::incrementer::controlled_incrementer;
use crate::numtheory::twos_complement;

/// `|c⟩|x⟩|g⟩ -> |c⟩|x + c·constant mod 2^n⟩|g⟩` (Häner-Roetteler-Svore).
///
/// Layout: `[ctrl: 1][x: n][borrowed: 2]`. Negative constants are added in
/// two's complement. Both borrowed qubits are returned in their input
/// state, whatever it is.
pub fn controlled_constant_adder(n: u32, constant: i64) -> ArithResult<Circuit> {
    require_width("x", 1, n)?;
    let mut circuit = Circuit::new(format!("c_add({constant})"));
    let ctrl = circuit.add_qreg("ctrl", 1)?;
    let x = circuit.add_qreg("x", n)?;
    let borrowed = circuit.add_qreg("borrowed", 2)?;

    add_split(
        &mut circuit,
        x.as_slice(),
        twos_complement(constant, n),
        ctrl[0],
        borrowed[0],
        borrowed[1],
    )?;
    Ok(circuit)
}

/// Add the low `x.len()` bits of `constant` to `x`.
///
/// The register is split into a low and a high half. The carry out of the
/// low half is computed into `dirty` with a carry gate, and is turned into
/// an increment of the high half with the toggle trick: increment by the
/// dirty bit, flip on it, compute the carry, increment again, uncompute the
/// carry, flip again. Both halves then recurse independently.
fn add_split(
    circuit: &mut Circuit,
    x: &[QubitId],
    constant: u64,
    ctrl: QubitId,
    dirty: QubitId,
    extra: QubitId,
) -> ArithResult<()> {
    let bit = |i: usize| (constant >> i) & 1 == 1;
    match x.len() {
        0 => return Ok(()),
        1 => {
            if bit(0) {
                circuit.cx(ctrl, x[0])?;
            }
            return Ok(());
        }
        2 => {
            if bit(0) {
                circuit.ccx(ctrl, x[0], x[1])?;
                circuit.cx(ctrl, x[0])?;
            }
            if bit(1) {
                circuit.cx(ctrl, x[1])?;
            }
            return Ok(());
        }
        _ => {}
    }

    let n_low = x.len().div_ceil(2);
    let n_high = x.len() - n_low;
    let (low, high) = x.split_at(n_low);

    // The incrementer on the high half borrows n_high + 1 qubits: the low
    // half, plus `extra` when both halves are the same size.
    let mut inc_operands = Vec::with_capacity(2 * n_high + 2);
    inc_operands.push(dirty);
    inc_operands.extend_from_slice(high);
    inc_operands.extend_from_slice(low);
    if n_high + 1 > n_low {
        inc_operands.push(extra);
    }
    #[allow(clippy::cast_possible_truncation)]
    let incrementer = controlled_incrementer(n_high as u32)?;

    let low_mask = (1u64 << n_low) - 1;
    #[allow(clippy::cast_possible_truncation)]
    let carry = carry_gate(n_low as u32 + 1, constant & low_mask, 1)?;
    let mut carry_operands = Vec::with_capacity(2 * n_low + 1);
    carry_operands.push(ctrl);
    carry_operands.extend_from_slice(low);
    carry_operands.push(dirty);
    carry_operands.extend_from_slice(&high[..n_low - 1]);

    circuit.append(&incrementer, &inc_operands, &[])?;
    for &q in high {
        circuit.cx(dirty, q)?;
    }
    circuit.append(&carry, &carry_operands, &[])?;
    circuit.append(&incrementer, &inc_operands, &[])?;
    circuit.append(&carry, &carry_operands, &[])?;
    for &q in high {
        circuit.cx(dirty, q)?;
    }

    add_split(circuit, low, constant & low_mask, ctrl, dirty, extra)?;
    add_split(circuit, high, constant >> n_low, ctrl, dirty, extra)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_registers_use_only_controlled_nots() {
        let c = controlled_constant_adder(2, 3).unwrap();
        let ops = c.count_ops();
        assert_eq!(ops.get("ccx"), Some(&1));
        assert_eq!(ops.get("cx"), Some(&2));

        let c = controlled_constant_adder(2, 0).unwrap();
        assert!(c.is_empty());
    }

    #[test]
    fn test_layout() {
        let c = controlled_constant_adder(5, -7).unwrap();
        assert_eq!(c.num_qubits(), 1 + 5 + 2);
        assert!(!c.is_empty());
    }
}
