//! Carry computation against a classical constant.

use qdlog_ir::{Circuit, QubitId};

use crate::error::{ArithResult, require_width};

/// Toggle the most significant qubit with the carry of a constant addition.
///
/// Layout: `[ctrl: num_controls][a: n][g: n - 2]`. With all controls set,
/// `a[n-1]` is flipped by bit `n-1` of `a[0..n-1] + constant` (the top qubit
/// itself taking no part in the sum). The low `n - 1` qubits of `a` are
/// restored and the `g` qubits may hold arbitrary borrowed states.
/// Requires `n >= 3`.
/// `a[0]` doubles as the first carry, which saves one borrowed qubit.
pub fn carry_gate(n: u32, constant: u64, num_controls: u32) -> ArithResult<Circuit> {
    require_width("a", 3, n)?;
    let mut circuit = Circuit::new(format!("carry({n},{constant})"));
    let ctrl = circuit.add_qreg("ctrl", num_controls)?;
    let a = circuit.add_qreg("a", n)?;
    let g_reg = circuit.add_qreg("g", n - 2)?;

    let n = n as usize;
    let bit = |i: usize| (constant >> i) & 1 == 1;
    let g: Vec<QubitId> = std::iter::once(a[0]).chain(g_reg.iter()).collect();
    let top_controls: Vec<QubitId> = ctrl.iter().chain([g[n - 2]]).collect();
    // Without a low constant bit nothing carries out of position 0, so the
    // Toffoli on position 1 cancels with its mirror image.
    let skip_first = !bit(0);

    circuit.mcx(&top_controls, a[n - 1])?;
    for i in (1..n - 1).rev() {
        if bit(i) {
            circuit.cx(a[i], g[i])?.x(a[i])?;
        }
        if !(i == 1 && skip_first) {
            circuit.ccx(g[i - 1], a[i], g[i])?;
        }
    }
    for i in 2..n - 1 {
        circuit.ccx(g[i - 1], a[i], g[i])?;
    }
    circuit.mcx(&top_controls, a[n - 1])?;
    if bit(n - 1) {
        circuit.mcx(ctrl.as_slice(), a[n - 1])?;
    }

    for i in (2..n - 1).rev() {
        circuit.ccx(g[i - 1], a[i], g[i])?;
    }
    for i in 1..n - 1 {
        if !(i == 1 && skip_first) {
            circuit.ccx(g[i - 1], a[i], g[i])?;
        }
        if bit(i) {
            circuit.x(a[i])?.cx(a[i], g[i])?;
        }
    }
    Ok(circuit)
}
