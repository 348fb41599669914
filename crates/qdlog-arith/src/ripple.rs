//! Ripple-carry adders built from CNOT and Toffoli gates.

use qdlog_ir::{Circuit, QubitId};

use crate::error::{ArithResult, require_width};

/// VBE ripple-carry adder: `|0⟩|a⟩|b⟩ -> |0⟩|a⟩|a + b mod 2^(n+1)⟩`.
///
/// Layout: `[carry: n][a: n][b: n + 1]`. Carries are computed from the least
/// significant bit up, the top carry lands in `b[n]`, and the carry register
/// is uncomputed on the way back down.
pub fn ripple_carry_adder(n: u32) -> ArithResult<Circuit> {
    require_width("a", 1, n)?;
    let mut circuit = Circuit::new("ripple_add");
    let carry = circuit.add_qreg("carry", n)?;
    let a = circuit.add_qreg("a", n)?;
    let b = circuit.add_qreg("b", n + 1)?;
    let n = n as usize;

    let next_carry = |i: usize| if i + 1 < n { carry[i + 1] } else { b[n] };

    for i in 0..n {
        carry_block(&mut circuit, carry[i], a[i], b[i], next_carry(i))?;
    }
    circuit.cx(a[n - 1], b[n - 1])?;
    sum_block(&mut circuit, carry[n - 1], a[n - 1], b[n - 1])?;
    for i in (0..n - 1).rev() {
        carry_block_dg(&mut circuit, carry[i], a[i], b[i], next_carry(i))?;
        sum_block(&mut circuit, carry[i], a[i], b[i])?;
    }
    Ok(circuit)
}

fn carry_block(
    circuit: &mut Circuit,
    c: QubitId,
    a: QubitId,
    b: QubitId,
    next: QubitId,
) -> ArithResult<()> {
    circuit.ccx(a, b, next)?.cx(a, b)?.ccx(c, b, next)?;
    Ok(())
}

fn carry_block_dg(
    circuit: &mut Circuit,
    c: QubitId,
    a: QubitId,
    b: QubitId,
    next: QubitId,
) -> ArithResult<()> {
    circuit.ccx(c, b, next)?.cx(a, b)?.ccx(a, b, next)?;
    Ok(())
}

fn sum_block(circuit: &mut Circuit, c: QubitId, a: QubitId, b: QubitId) -> ArithResult<()> {
    circuit.cx(a, b)?.cx(c, b)?;
    Ok(())
}

/// Ancilla-free ripple adder (Takahashi-Tani-Kunihiro): `|a⟩|b⟩ -> |a⟩|a + b⟩`.
///
/// Layout: `[a: n][b: n]`, or `[a: n][b: n + 1]` with `handle_overflow`, in
/// which case the final carry is written to `b[n]`. Without it the sum wraps
/// modulo `2^n`. Requires `n >= 2`.
pub fn takahashi_adder(n: u32, handle_overflow: bool) -> ArithResult<Circuit> {
    require_width("a", 2, n)?;
    let mut circuit = Circuit::new("ttk_add");
    let a = circuit.add_qreg("a", n)?;
    let b = circuit.add_qreg("b", if handle_overflow { n + 1 } else { n })?;
    let n = n as usize;

    for i in 1..n {
        circuit.cx(a[i], b[i])?;
    }
    if handle_overflow {
        circuit.cx(a[n - 1], b[n])?;
    }
    for i in (1..n - 1).rev() {
        circuit.cx(a[i], a[i + 1])?;
    }
    for i in 0..n - 1 {
        circuit.ccx(b[i], a[i], a[i + 1])?;
    }
    if handle_overflow {
        circuit.ccx(b[n - 1], a[n - 1], b[n])?;
    }
    for i in (1..n).rev() {
        circuit.cx(a[i], b[i])?;
        circuit.ccx(b[i - 1], a[i - 1], a[i])?;
    }
    for i in 1..n - 1 {
        circuit.cx(a[i], a[i + 1])?;
    }
    for i in 0..n {
        circuit.cx(a[i], b[i])?;
    }
    Ok(circuit)
}
