//! Fourier-basis modular arithmetic (Beauregard).

use qdlog_ir::Circuit;
use tracing::debug;

use crate::draper::{phi_add, phi_add_controlled, phi_add_doubly_controlled};
use crate::error::{ArithError, ArithResult, require_width};
use crate::numtheory::{check_invertible, check_modulus, square_power};

/// Doubly controlled modular addition in the Fourier basis:
/// `|φ(b)⟩|0⟩ -> |φ(b + y mod p)⟩|0⟩` when both controls are set.
///
/// Layout: `[ctrl: 2][b: n][aux: 1]`. Requires `b < p`, `y < p` and
/// `p < 2^(n-1)` so that the top qubit of `b` acts as a sign bit.
pub fn modular_adder_doubly_controlled(n: u32, y: u64, p: u64) -> ArithResult<Circuit> {
    require_width("b", 2, n)?;
    if y >= p {
        return Err(ArithError::ConstantOutOfRange { value: y, modulus: p });
    }
    if n > 63 || p > 1u64 << (n - 1) {
        return Err(ArithError::InvalidModulus {
            modulus: p,
            reason: format!("needs a sign bit above {} qubits", n - 1),
        });
    }

    let mut circuit = Circuit::new(format!("cc_add({y})_mod({p})"));
    let ctrl = circuit.add_qreg("ctrl", 2)?;
    let b = circuit.add_qreg("b", n)?;
    let aux = circuit.add_qreg("aux", 1)?;

    let qft = Circuit::qft(n, false)?;
    let iqft = Circuit::iqft(n, false)?;
    let add_y = phi_add_doubly_controlled(n, y, 1)?;
    let sub_y = phi_add_doubly_controlled(n, y, -1)?;
    let cc_operands: Vec<_> = ctrl.iter().chain(b.iter()).collect();
    let aux_operands: Vec<_> = aux.iter().chain(b.iter()).collect();
    let msb = b[n as usize - 1];

    circuit
        .append(&add_y, &cc_operands, &[])?
        .append(&phi_add(n, p, -1)?, b.as_slice(), &[])?;
    // sign of b + y - p
    circuit
        .append(&iqft, b.as_slice(), &[])?
        .cx(msb, aux[0])?
        .append(&qft, b.as_slice(), &[])?
        .append(&phi_add_controlled(n, p, 1, 0)?, &aux_operands, &[])?;
    // uncompute aux: the result is below y exactly when p was subtracted
    circuit
        .append(&sub_y, &cc_operands, &[])?
        .append(&iqft, b.as_slice(), &[])?
        .x(msb)?
        .cx(msb, aux[0])?
        .x(msb)?
        .append(&qft, b.as_slice(), &[])?
        .append(&add_y, &cc_operands, &[])?;
    Ok(circuit)
}

/// `|c⟩|x⟩|b⟩|0⟩ -> |c⟩|x⟩|b + c·y·x mod p⟩|0⟩`.
///
/// Layout: `[ctrl: 1][x: m][b: m + 1][aux: 1]`.
#[allow(clippy::cast_possible_truncation)]
fn multiply_accumulate(m: u32, y: u64, p: u64) -> ArithResult<Circuit> {
    let mut circuit = Circuit::new(format!("c_mul_acc({y})_mod({p})"));
    let ctrl = circuit.add_qreg("ctrl", 1)?;
    let x = circuit.add_qreg("x", m)?;
    let b = circuit.add_qreg("b", m + 1)?;
    let aux = circuit.add_qreg("aux", 1)?;

    circuit.append(&Circuit::qft(m + 1, false)?, b.as_slice(), &[])?;
    for k in 0..m as usize {
        let summand = (u128::from(y) * (1u128 << k) % u128::from(p)) as u64;
        let adder = modular_adder_doubly_controlled(m + 1, summand, p)?;
        let operands: Vec<_> = [ctrl[0], x[k]]
            .into_iter()
            .chain(b.iter())
            .chain(aux.iter())
            .collect();
        circuit.append(&adder, &operands, &[])?;
    }
    circuit.append(&Circuit::iqft(m + 1, false)?, b.as_slice(), &[])?;
    Ok(circuit)
}

/// Controlled in-place multiplication `|c⟩|x⟩|0⟩ -> |c⟩|a^c·x mod p⟩|0⟩`.
///
/// Layout: `[ctrl: 1][x: m][ancilla: m + 2]` with `m = ceil(log2 p)`.
/// Requires `gcd(a, p) = 1` and `x < p`.
pub fn controlled_multiplier(a: u64, p: u64) -> ArithResult<Circuit> {
    let m = check_modulus(p)?;
    let a_inv = check_invertible(a, p)?;

    let forward = multiply_accumulate(m, a, p)?;
    let backward = multiply_accumulate(m, a_inv, p)?.inverse()?;

    let mut circuit = Circuit::new(format!("c_mul({a})_mod({p})"));
    let ctrl = circuit.add_qreg("ctrl", 1)?;
    let x = circuit.add_qreg("x", m)?;
    let ancilla = circuit.add_qreg("ancilla", m + 2)?;
    let all: Vec<_> = ctrl.iter().chain(x.iter()).chain(ancilla.iter()).collect();

    circuit.append(&forward, &all, &[])?;
    // the accumulator's top qubit is always clear here
    for i in 0..m as usize {
        circuit.cswap(ctrl[0], x[i], ancilla[i])?;
    }
    circuit.append(&backward, &all, &[])?;
    Ok(circuit)
}

/// Modular exponentiation `|x⟩|y⟩|0⟩ -> |x⟩|y·a^x mod p⟩|0⟩`.
///
/// Layout: `[exponent: n][target: m][ancilla: m + 2]`.
pub fn mod_exp(n: u32, a: u64, p: u64) -> ArithResult<Circuit> {
    require_width("exponent", 1, n)?;
    let m = check_modulus(p)?;
    check_invertible(a, p)?;

    let mut circuit = Circuit::new(format!("{a}^x_mod({p})"));
    let exponent = circuit.add_qreg("exponent", n)?;
    let target = circuit.add_qreg("target", m)?;
    let ancilla = circuit.add_qreg("ancilla", m + 2)?;

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
        "built BRG exponentiation"
    );
    Ok(circuit)
}
