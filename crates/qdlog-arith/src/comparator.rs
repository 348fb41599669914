//! Comparison of a register against a classical constant.

use qdlog_ir::Circuit;

use crate::carry::carry_gate;
use crate::error::{ArithError, ArithResult, require_width};
use crate::numtheory::twos_complement;

/// Flip `res` when every control is set and `input < value`.
///
/// Layout: `[ctrl: num_controls][input: n][borrowed: n - 1][res: 1]`.
/// The flag is the sign bit of `input - value` over `n + 1` bits, computed
/// by a carry gate with `res` as its top qubit. `value` may be anything up
/// to `2^n`; the borrowed qubits are restored.
pub fn comparator(n: u32, value: u64, num_controls: u32) -> ArithResult<Circuit> {
    require_width("input", 2, n)?;
    if n >= 63 || value > 1u64 << n {
        return Err(ArithError::ConstantOutOfRange {
            value,
            modulus: 1u64 << n.min(63),
        });
    }
    let mut circuit = Circuit::new(format!("cmp({value})"));
    let ctrl = circuit.add_qreg("ctrl", num_controls)?;
    let input = circuit.add_qreg("input", n)?;
    let borrowed = circuit.add_qreg("borrowed", n - 1)?;
    let res = circuit.add_qreg("res", 1)?;

    #[allow(clippy::cast_possible_wrap)]
    let negated = twos_complement(-(value as i64), n + 1);
    let carry = carry_gate(n + 1, negated, num_controls)?;
    let operands: Vec<_> = ctrl
        .iter()
        .chain(input.iter())
        .chain(res.iter())
        .chain(borrowed.iter())
        .collect();
    circuit.append(&carry, &operands, &[])?;
    Ok(circuit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comparator_layout() {
        let c = comparator(4, 9, 2).unwrap();
        assert_eq!(c.num_qubits(), 2 + 4 + 3 + 1);
        assert_eq!(c.qregs().last().unwrap().name(), "res");
    }

    #[test]
    fn test_value_range() {
        assert!(comparator(3, 8, 1).is_ok());
        assert!(matches!(
            comparator(3, 9, 1),
            Err(ArithError::ConstantOutOfRange { value: 9, .. })
        ));
        assert!(matches!(
            comparator(1, 1, 1),
            Err(ArithError::WidthTooSmall { .. })
        ));
    }
}
