//! Fourier-basis (Draper) adders.
//!
//! All adders here act on a register that has been transformed by
//! [`Circuit::qft`] without swaps: qubit `k` carries the phase
//! `2π·x / 2^(k+1)`, so adding a constant `c` is one phase rotation of
//! `c·π / 2^k` per qubit.

use std::f64::consts::PI;

use qdlog_ir::Circuit;

use crate::error::{ArithError, ArithResult, require_width};

/// Rotation applied to Fourier qubit `k` when adding `c`: `c·π / 2^k`.
///
/// `c` is reduced modulo `2^(k+1)` first; the dropped part contributes a
/// multiple of `2π`, so the angle stays exact for large constants.
#[allow(clippy::cast_precision_loss)]
pub fn phase_angle(k: u32, c: u64) -> f64 {
    let reduced = if k + 1 < u64::BITS {
        c & ((1u64 << (k + 1)) - 1)
    } else {
        c
    };
    reduced as f64 * PI / 2f64.powi(k as i32)
}

#[allow(clippy::cast_precision_loss)]
fn signed(factor: i64) -> f64 {
    factor as f64
}

/// `|φ(x)⟩ -> |φ(x + factor·c)⟩` on `n` Fourier qubits.
pub fn phi_add(n: u32, c: u64, factor: i64) -> ArithResult<Circuit> {
    let mut circuit = Circuit::new(format!("phi_add({c}*{factor})"));
    let reg = circuit.add_qreg("phi", n)?;
    for (k, q) in (0..n).zip(reg.iter()) {
        circuit.p(signed(factor) * phase_angle(k, c), q)?;
    }
    Ok(circuit)
}

/// Singly controlled Fourier addition of `factor·c`.
///
/// Layout: `[ctrl: 1][phi: n - ignore_bits]`. The `ignore_bits` least
/// significant positions of the logical `n`-qubit register are left out of
/// the circuit entirely; qubit `k` of the logical register maps to
/// `phi[k - ignore_bits]`.
pub fn phi_add_controlled(n: u32, c: u64, factor: i64, ignore_bits: u32) -> ArithResult<Circuit> {
    if ignore_bits > n {
        return Err(ArithError::WidthTooSmall {
            register: "phi",
            required: ignore_bits,
            got: n,
        });
    }
    let mut circuit = Circuit::new(format!("c_phi_add({c}*{factor})"));
    let ctrl = circuit.add_qreg("ctrl", 1)?;
    let reg = circuit.add_qreg("phi", n - ignore_bits)?;
    for k in ignore_bits..n {
        let target = reg[(k - ignore_bits) as usize];
        circuit.cp(signed(factor) * phase_angle(k, c), ctrl[0], target)?;
    }
    Ok(circuit)
}

/// Doubly controlled phase `P(θ)`, built from three `CP` and two `CX`.
///
/// Layout: `[ctrl: 2][q: 1]`.
pub fn ccp(theta: f64) -> ArithResult<Circuit> {
    let mut circuit = Circuit::new("ccp");
    let ctrl = circuit.add_qreg("ctrl", 2)?;
    let q = circuit.add_qreg("q", 1)?;
    circuit
        .cp(theta / 2.0, ctrl[1], q[0])?
        .cx(ctrl[0], ctrl[1])?
        .cp(-theta / 2.0, ctrl[1], q[0])?
        .cx(ctrl[0], ctrl[1])?
        .cp(theta / 2.0, ctrl[0], q[0])?;
    Ok(circuit)
}

/// Doubly controlled Fourier addition of `factor·c`.
///
/// Layout: `[ctrl: 2][phi: n]`.
pub fn phi_add_doubly_controlled(n: u32, c: u64, factor: i64) -> ArithResult<Circuit> {
    let mut circuit = Circuit::new(format!("cc_phi_add({c}*{factor})"));
    let ctrl = circuit.add_qreg("ctrl", 2)?;
    let reg = circuit.add_qreg("phi", n)?;
    for (k, q) in (0..n).zip(reg.iter()) {
        let gate = ccp(signed(factor) * phase_angle(k, c))?;
        circuit.append(&gate, &[ctrl[0], ctrl[1], q], &[])?;
    }
    Ok(circuit)
}

/// `|x⟩ -> |x + factor·c mod 2^n⟩` in the computational basis.
pub fn draper_add_constant(n: u32, c: u64, factor: i64) -> ArithResult<Circuit> {
    require_width("x", 1, n)?;
    let mut circuit = Circuit::new(format!("add({c}*{factor})"));
    let reg = circuit.add_qreg("x", n)?;
    circuit
        .append(&Circuit::qft(n, false)?, reg.as_slice(), &[])?
        .append(&phi_add(n, c, factor)?, reg.as_slice(), &[])?
        .append(&Circuit::iqft(n, false)?, reg.as_slice(), &[])?;
    Ok(circuit)
}

/// Quantum-quantum Draper adder: `|a⟩|b⟩ -> |a⟩|a + b mod 2^(n+1)⟩`.
///
/// Layout: `[a: n][b: n + 1]`. Bit `j` of `a` adds `2^j` to `b` through
/// controlled phases; rotations that are whole turns are skipped.
pub fn fourier_adder(n: u32) -> ArithResult<Circuit> {
    require_width("a", 1, n)?;
    let mut circuit = Circuit::new("fourier_add");
    let a = circuit.add_qreg("a", n)?;
    let b = circuit.add_qreg("b", n + 1)?;
    circuit.append(&Circuit::qft(n + 1, false)?, b.as_slice(), &[])?;
    for j in 0..n {
        for k in j..=n {
            circuit.cp(phase_angle(k, 1u64 << j), a[j as usize], b[k as usize])?;
        }
    }
    circuit.append(&Circuit::iqft(n + 1, false)?, b.as_slice(), &[])?;
    Ok(circuit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_angle_reduces_whole_turns() {
        assert!((phase_angle(0, 1) - PI).abs() < 1e-12);
        assert!((phase_angle(2, 3) - 3.0 * PI / 4.0).abs() < 1e-12);
        // 9 ≡ 1 (mod 8) at k = 2
        assert!((phase_angle(2, 9) - phase_angle(2, 1)).abs() < 1e-12);
        assert_eq!(phase_angle(0, 2), 0.0);
    }

    #[test]
    fn test_phi_add_layout() {
        let c = phi_add(4, 5, 1).unwrap();
        assert_eq!(c.num_qubits(), 4);
        assert_eq!(c.len(), 4);
        assert_eq!(c.count_ops()["p"], 4);
    }

    #[test]
    fn test_controlled_ignore_bits() {
        let c = phi_add_controlled(5, 3, -1, 2).unwrap();
        assert_eq!(c.num_qubits(), 4);
        assert_eq!(c.len(), 3);
        assert!(c.instructions().iter().all(|i| i.qubits[0].0 == 0));

        assert!(matches!(
            phi_add_controlled(2, 1, 1, 3),
            Err(ArithError::WidthTooSmall { .. })
        ));
    }

    #[test]
    fn test_ccp_decomposition() {
        let c = ccp(1.0).unwrap();
        let ops = c.count_ops();
        assert_eq!(ops["cp"], 3);
        assert_eq!(ops["cx"], 2);
    }

    #[test]
    fn test_doubly_controlled_width() {
        let c = phi_add_doubly_controlled(3, 6, 1).unwrap();
        assert_eq!(c.num_qubits(), 5);
        assert_eq!(c.len(), 3 * 5);
    }

    #[test]
    fn test_draper_requires_a_qubit() {
        assert!(matches!(
            draper_add_constant(0, 1, 1),
            Err(ArithError::WidthTooSmall { register: "x", .. })
        ));
    }
}
