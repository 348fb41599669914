//! Toffoli-based modular arithmetic (Häner-Roetteler-Svore).
//!
//! Modular addition of a constant is two comparisons and two controlled
//! constant additions, all running on borrowed qubits. The only clean
//! ancilla of a multiplier is the comparison flag, so a multiplier needs
//! `2m + 2` qubits including its control.

use qdlog_ir::{Circuit, QubitId};
use tracing::debug;

use crate::comparator::comparator;
use crate::constant_adder::controlled_constant_adder;
use crate::error::{ArithError, ArithResult, require_width};
use crate::numtheory::{check_invertible, check_modulus, square_power};

/// Smallest target width the construction supports.
pub const MIN_WIDTH: u32 = 3;

/// `|b⟩ -> |b + a mod p⟩` when every control is set.
///
/// Layout: `[ctrl: num_controls][b: n][g: n - 1][flag: 1]`. Requires
/// `b < p <= 2^n`, `a < p` and a clean `flag`; `g` is borrowed.
#[allow(clippy::cast_possible_wrap, clippy::cast_possible_truncation)]
pub fn modular_adder(n: u32, a: u64, p: u64, num_controls: u32) -> ArithResult<Circuit> {
    require_width("b", MIN_WIDTH, n)?;
    if a >= p {
        return Err(ArithError::ConstantOutOfRange { value: a, modulus: p });
    }
    if n >= 63 || p > 1u64 << n {
        return Err(ArithError::InvalidModulus {
            modulus: p,
            reason: format!("does not fit {n} qubits"),
        });
    }

    let mut circuit = Circuit::new(format!("add({a})_mod({p})"));
    let ctrl = circuit.add_qreg("ctrl", num_controls)?;
    let b = circuit.add_qreg("b", n)?;
    let g = circuit.add_qreg("g", n - 1)?;
    let flag = circuit.add_qreg("flag", 1)?;

    let everything: Vec<QubitId> = (0..circuit.num_qubits() as u32).map(QubitId).collect();
    let adder_operands: Vec<_> = flag.iter().chain(b.iter()).chain([g[0], g[1]]).collect();

    // flag = [b < p - a]: add a if it stays below p
    circuit.append(&comparator(n, p - a, num_controls)?, &everything, &[])?;
    circuit.append(&controlled_constant_adder(n, a as i64)?, &adder_operands, &[])?;
    // otherwise add a - p
    circuit.mcx(ctrl.as_slice(), flag[0])?;
    circuit.append(
        &controlled_constant_adder(n, a as i64 - p as i64)?,
        &adder_operands,
        &[],
    )?;
    // the result is below a exactly when p was subtracted
    circuit.append(&comparator(n, a, num_controls)?, &everything, &[])?;
    Ok(circuit)
}

/// `|c⟩|x⟩|y⟩|0⟩ -> |c⟩|x⟩|y + c·a·x mod p⟩|0⟩`.
///
/// Layout: `[ctrl: 1][x: n][res: n][flag: 1]`. While bit `i` of `x`
/// controls an addition, the other `n - 1` bits of `x` serve as its
/// borrowed qubits.
#[allow(clippy::cast_possible_truncation)]
fn multiply_accumulate(n: u32, a: u64, p: u64) -> ArithResult<Circuit> {
    let mut circuit = Circuit::new(format!("c_mul_acc({a})_mod({p})"));
    let ctrl = circuit.add_qreg("ctrl", 1)?;
    let x = circuit.add_qreg("x", n)?;
    let res = circuit.add_qreg("res", n)?;
    let flag = circuit.add_qreg("flag", 1)?;

    for i in 0..n as usize {
        let summand = (u128::from(a) * (1u128 << i) % u128::from(p)) as u64;
        let adder = modular_adder(n, summand, p, 2)?;
        let operands: Vec<_> = [ctrl[0], x[i]]
            .into_iter()
            .chain(res.iter())
            .chain(x.iter().filter(|&q| q != x[i]))
            .chain(flag.iter())
            .collect();
        circuit.append(&adder, &operands, &[])?;
    }
    Ok(circuit)
}

/// Controlled in-place multiplication `|c⟩|x⟩|0⟩ -> |c⟩|a^c·x mod p⟩|0⟩`.
///
/// Layout: `[ctrl: 1][x: m][ancilla: m + 1]` with `m = ceil(log2 p)`.
/// Requires `gcd(a, p) = 1` and `x < p`.
pub fn controlled_multiplier(a: u64, p: u64) -> ArithResult<Circuit> {
    let m = check_modulus(p)?;
    require_width("target", MIN_WIDTH, m)?;
    let a_inv = check_invertible(a, p)?;

    let forward = multiply_accumulate(m, a, p)?;
    let backward = multiply_accumulate(m, p - a_inv, p)?;

    let mut circuit = Circuit::new(format!("c_mul({a})_mod({p})"));
    let ctrl = circuit.add_qreg("ctrl", 1)?;
    let x = circuit.add_qreg("x", m)?;
    let ancilla = circuit.add_qreg("ancilla", m + 1)?;
    let all: Vec<_> = ctrl.iter().chain(x.iter()).chain(ancilla.iter()).collect();

    circuit.append(&forward, &all, &[])?;
    for i in 0..m as usize {
        circuit.cswap(ctrl[0], x[i], ancilla[i])?;
    }
    // subtracting a^-1·(a·x) clears the accumulator
    circuit.append(&backward, &all, &[])?;
    Ok(circuit)
}

/// Modular exponentiation `|x⟩|y⟩|0⟩ -> |x⟩|y·a^x mod p⟩|0⟩`.
///
/// Layout: `[exponent: n][target: m][ancilla: m + 1]`.
pub fn mod_exp(n: u32, a: u64, p: u64) -> ArithResult<Circuit> {
    require_width("exponent", 1, n)?;
    let m = check_modulus(p)?;
    require_width("target", MIN_WIDTH, m)?;
    check_invertible(a, p)?;

    let mut circuit = Circuit::new(format!("{a}^x_mod({p})"));
    let exponent = circuit.add_qreg("exponent", n)?;
    let target = circuit.add_qreg("target", m)?;
    let ancilla = circuit.add_qreg("ancilla", m + 1)?;

    for (i, control) in exponent.iter().enumerate() {
        #[allow(clippy::cast_possible_truncation)]
        let factor = square_power(a, i as u32, p);
        let multiplier = controlled_multiplier(factor, p)?;
        let operands: Vec<_> = [control]
            .into_iter()
            .chain(target.iter())
            .chain(ancilla.iter())
            .collect();
        circuit.append(&multiplier, &operands, &[])?;
    }
    debug!(
        n,
        a,
        p,
        qubits = circuit.num_qubits(),
        gates = circuit.len(),
        "built HRS exponentiation"
    );
    Ok(circuit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout() {
        let c = mod_exp(2, 3, 7).unwrap();
        assert_eq!(c.num_qubits(), 2 + 3 + 4);
        assert_eq!(c.qreg("ancilla").unwrap().len(), 4);
    }

    #[test]
    fn test_rejects_narrow_modulus() {
        assert!(matches!(
            controlled_multiplier(1, 3),
            Err(ArithError::WidthTooSmall { required: 3, got: 2, .. })
        ));
    }

    #[test]
    fn test_rejects_non_invertible_base() {
        assert!(matches!(
            mod_exp(3, 3, 9),
            Err(ArithError::NotInvertible { value: 3, modulus: 9 })
        ));
    }

    #[test]
    fn test_modular_adder_range_checks() {
        assert!(matches!(
            modular_adder(3, 7, 7, 1),
            Err(ArithError::ConstantOutOfRange { .. })
        ));
        assert!(matches!(
            modular_adder(3, 1, 9, 1),
            Err(ArithError::InvalidModulus { modulus: 9, .. })
        ));
    }
}
