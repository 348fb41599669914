//! Montgomery modular multiplication in the Fourier basis (Rines-Chuang).
//!
//! A product `x·y'` with `y' = y·R mod p`, `R = 2^m`, is accumulated in a
//! `2m + 1` qubit Fourier register and reduced one bit at a time: each
//! low bit is read out with a Hadamard and, when set, `p` is subtracted
//! from the remaining higher qubits. The division by `R` is implicit in
//! the shrinking register. What is left is `x·y mod p` (after one
//! sign-controlled addition of `p`) next to `m + 1` reduction bits that
//! are cleared again by subtraction.

use qdlog_ir::{Circuit, QubitId};
use tracing::debug;

use crate::draper::{phi_add_controlled, phi_add_doubly_controlled};
use crate::error::{ArithError, ArithResult, require_width};
use crate::numtheory::{check_invertible, check_modulus, mod_inverse, square_power};

/// `y·2^m mod p`.
#[allow(clippy::cast_possible_truncation)]
pub fn to_montgomery(y: u64, m: u32, p: u64) -> u64 {
    ((u128::from(y) << m) % u128::from(p)) as u64
}

fn check_odd_modulus(p: u64) -> ArithResult<u32> {
    let m = check_modulus(p)?;
    if p % 2 == 0 {
        return Err(ArithError::InvalidModulus {
            modulus: p,
            reason: "Montgomery reduction needs an odd modulus".into(),
        });
    }
    Ok(m)
}

/// Out-of-place Montgomery product.
///
/// Layout: `[ctrl: 1][x: m][big: 2m + 1]`. With the control set,
/// `big[m..2m]` ends up holding `x·y mod p` when `y_mont = y·R mod p`;
/// the remaining `m + 1` qubits of `big` return to zero.
#[allow(clippy::cast_possible_truncation)]
pub fn montgomery_product(m: u32, y_mont: u64, p: u64) -> ArithResult<Circuit> {
    let mut circuit = Circuit::new(format!("c_mont_prod({y_mont})_mod({p})"));
    let ctrl = circuit.add_qreg("ctrl", 1)?;
    let x = circuit.add_qreg("x", m)?;
    let big = circuit.add_qreg("big", 2 * m + 1)?;

    let m_us = m as usize;
    let wide = 2 * m + 1;
    let summand = |i: usize| (u128::from(y_mont) * (1u128 << i) % u128::from(p)) as u64;

    circuit.append(&Circuit::qft(wide, false)?, big.as_slice(), &[])?;
    for i in 0..m_us {
        let add = phi_add_doubly_controlled(wide, summand(i), 1)?;
        let operands: Vec<_> = [ctrl[0], x[i]].into_iter().chain(big.iter()).collect();
        circuit.append(&add, &operands, &[])?;
    }

    // Reduction: bit i decides whether p is subtracted from big[i+1..]
    for i in 0..m_us {
        circuit.h(big[i])?;
        let sub = phi_add_controlled(wide - i as u32, p, -1, 1)?;
        circuit.append(&sub, &big.as_slice()[i..], &[])?;
    }
    circuit.barrier(big.iter())?;

    let result = &big.as_slice()[m_us..2 * m_us];
    let sign = big[2 * m_us];
    let upper: Vec<QubitId> = big.as_slice()[m_us..].to_vec();
    circuit.append(&Circuit::iqft(m + 1, false)?, &upper, &[])?;
    circuit.append(&Circuit::qft(m, false)?, result, &[])?;
    let fix: Vec<_> = std::iter::once(sign).chain(result.iter().copied()).collect();
    circuit.append(&phi_add_controlled(m, p, 1, 0)?, &fix, &[])?;
    // the low result bit is readable after a Hadamard
    circuit.h(result[0])?.cx(result[0], sign)?.h(result[0])?;

    // Clear the reduction bits: u = -x·y'·p^-1 mod 2^(m+1)
    let reduction: Vec<QubitId> = big.as_slice()[..m_us]
        .iter()
        .copied()
        .chain([sign])
        .collect();
    let modulus = 1u128 << (m + 1);
    let p_inv = mod_inverse(p, 1u64 << (m + 1)).ok_or(ArithError::InvalidModulus {
        modulus: p,
        reason: "Montgomery reduction needs an odd modulus".into(),
    })?;
    circuit.append(&Circuit::qft(m + 1, false)?, &reduction, &[])?;
    for i in 0..m_us {
        let u = (u128::from(summand(i)) * u128::from(p_inv) % modulus) as u64;
        let sub = phi_add_doubly_controlled(m + 1, u, -1)?;
        let operands: Vec<_> = [ctrl[0], x[i]]
            .into_iter()
            .chain(reduction.iter().copied())
            .collect();
        circuit.append(&sub, &operands, &[])?;
    }
    circuit.append(&Circuit::iqft(m, false)?, result, &[])?;
    circuit.append(&Circuit::iqft(m + 1, false)?, &reduction, &[])?;
    Ok(circuit)
}

/// Controlled in-place multiplication `|c⟩|x⟩|0⟩ -> |c⟩|a^c·x mod p⟩|0⟩`.
///
/// Layout: `[ctrl: 1][x: m][ancilla: 2m + 1]`. Requires an odd `p` and
/// `gcd(a, p) = 1`.
pub fn controlled_multiplier(a: u64, p: u64) -> ArithResult<Circuit> {
    let m = check_odd_modulus(p)?;
    let a_inv = check_invertible(a, p)?;

    let forward = montgomery_product(m, to_montgomery(a, m, p), p)?;
    let backward = montgomery_product(m, to_montgomery(a_inv, m, p), p)?.inverse()?;

    let mut circuit = Circuit::new(format!("c_mont_mul({a})_mod({p})"));
    let ctrl = circuit.add_qreg("ctrl", 1)?;
    let x = circuit.add_qreg("x", m)?;
    let ancilla = circuit.add_qreg("ancilla", 2 * m + 1)?;
    let all: Vec<_> = ctrl.iter().chain(x.iter()).chain(ancilla.iter()).collect();

    circuit.append(&forward, &all, &[])?;
    for i in 0..m as usize {
        circuit.cswap(ctrl[0], x[i], ancilla[m as usize + i])?;
    }
    circuit.append(&backward, &all, &[])?;
    Ok(circuit)
}

/// Modular exponentiation `|x⟩|y⟩|0⟩ -> |x⟩|y·a^x mod p⟩|0⟩`.
///
/// Layout: `[exponent: n][target: m][ancilla: 2m + 1]`.
pub fn mod_exp(n: u32, a: u64, p: u64) -> ArithResult<Circuit> {
    require_width("exponent", 1, n)?;
    let m = check_odd_modulus(p)?;
    check_invertible(a, p)?;

    let mut circuit = Circuit::new(format!("{a}^x_mod({p})"));
    let exponent = circuit.add_qreg("exponent", n)?;
    let target = circuit.add_qreg("target", m)?;
    let ancilla = circuit.add_qreg("ancilla", 2 * m + 1)?;

    for (i, control) in exponent.iter().enumerate() {
        #[allow(clippy::cast_possible_truncation)]
        let multiplier = controlled_multiplier(square_power(a, i as u32, p), p)?;
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
        "built Montgomery exponentiation"
    );
    Ok(circuit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_montgomery() {
        assert_eq!(to_montgomery(3, 3, 7), 24 % 7);
        assert_eq!(to_montgomery(0, 4, 11), 0);
    }

    #[test]
    fn test_layout() {
        let c = mod_exp(2, 2, 5).unwrap();
        assert_eq!(c.num_qubits(), 2 + 3 * 3 + 1);
        assert_eq!(montgomery_product(3, 1, 5).unwrap().num_qubits(), 1 + 3 + 7);
    }

    #[test]
    fn test_even_modulus_rejected() {
        assert!(matches!(
            controlled_multiplier(3, 8),
            Err(ArithError::InvalidModulus { modulus: 8, .. })
        ));
    }
}
