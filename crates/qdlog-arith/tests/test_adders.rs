//! Adder correctness on computational basis states.

use proptest::prelude::*;

use qdlog_adapter_sim::Statevector;
use qdlog_arith::draper::{phi_add_controlled, phi_add_doubly_controlled};
use qdlog_arith::{draper_add_constant, fourier_adder, ripple_carry_adder, takahashi_adder};
use qdlog_ir::{Circuit, QubitId};

/// Run `circuit` on a basis state and return the single basis state it maps to.
fn run_basis(circuit: &Circuit, index: u64) -> u64 {
    let mut sv = Statevector::from_basis(circuit.num_qubits(), index);
    sv.apply_circuit(circuit).unwrap();
    let (out, p) = sv
        .probabilities()
        .into_iter()
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .unwrap();
    assert!(p > 1.0 - 1e-9, "output is not a basis state (max p = {p})");
    out
}

fn reg(circuit: &Circuit, name: &str) -> Vec<QubitId> {
    circuit.qreg(name).unwrap().as_slice().to_vec()
}

// ---------------------------------------------------------------------------
// Ripple-carry adders
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn ripple_carry_adds_and_clears_carries(n in 1u32..=4, a in 0u64..16, b in 0u64..16) {
        let a = a % (1 << n);
        let b = b % (1 << n);
        let circuit = ripple_carry_adder(n).unwrap();
        let (ra, rb, rc) = (reg(&circuit, "a"), reg(&circuit, "b"), reg(&circuit, "carry"));

        let input = Statevector::write_register(Statevector::write_register(0, &ra, a), &rb, b);
        let out = run_basis(&circuit, input);
        prop_assert_eq!(Statevector::read_register(out, &rb), a + b);
        prop_assert_eq!(Statevector::read_register(out, &ra), a);
        prop_assert_eq!(Statevector::read_register(out, &rc), 0);
    }

    #[test]
    fn takahashi_with_overflow(n in 2u32..=5, a in 0u64..32, b in 0u64..32) {
        let a = a % (1 << n);
        let b = b % (1 << n);
        let circuit = takahashi_adder(n, true).unwrap();
        let (ra, rb) = (reg(&circuit, "a"), reg(&circuit, "b"));

        let input = Statevector::write_register(Statevector::write_register(0, &ra, a), &rb, b);
        let out = run_basis(&circuit, input);
        prop_assert_eq!(Statevector::read_register(out, &rb), a + b);
        prop_assert_eq!(Statevector::read_register(out, &ra), a);
    }

    #[test]
    fn takahashi_wraps_without_overflow(n in 2u32..=5, a in 0u64..32, b in 0u64..32) {
        let a = a % (1 << n);
        let b = b % (1 << n);
        let circuit = takahashi_adder(n, false).unwrap();
        let (ra, rb) = (reg(&circuit, "a"), reg(&circuit, "b"));

        let input = Statevector::write_register(Statevector::write_register(0, &ra, a), &rb, b);
        let out = run_basis(&circuit, input);
        prop_assert_eq!(Statevector::read_register(out, &rb), (a + b) % (1 << n));
        prop_assert_eq!(Statevector::read_register(out, &ra), a);
    }

    #[test]
    fn draper_constant_addition(n in 1u32..=5, x in 0u64..32, c in 0u64..1000, negative: bool) {
        let x = x % (1 << n);
        let factor = if negative { -1 } else { 1 };
        let circuit = draper_add_constant(n, c, factor).unwrap();
        let modulus = 1i64 << n;
        let expected = (x as i64 + factor * c as i64).rem_euclid(modulus) as u64;
        prop_assert_eq!(run_basis(&circuit, x), expected);
    }
}

#[test]
fn fourier_adder_agrees_with_ripple_carry() {
    let n = 3;
    let fourier = fourier_adder(n).unwrap();
    let ripple = ripple_carry_adder(n).unwrap();
    let (fa, fb) = (reg(&fourier, "a"), reg(&fourier, "b"));
    let (ra, rb) = (reg(&ripple, "a"), reg(&ripple, "b"));

    for a in 0..(1 << n) {
        for b in 0..(1 << n) {
            let f_in = Statevector::write_register(Statevector::write_register(0, &fa, a), &fb, b);
            let r_in = Statevector::write_register(Statevector::write_register(0, &ra, a), &rb, b);
            let f_sum = Statevector::read_register(run_basis(&fourier, f_in), &fb);
            let r_sum = Statevector::read_register(run_basis(&ripple, r_in), &rb);
            assert_eq!(f_sum, r_sum, "a={a} b={b}");
            assert_eq!(f_sum, a + b);
        }
    }
}

#[test]
fn fourier_adder_wraps_the_top_bit() {
    let n = 2;
    let circuit = fourier_adder(n).unwrap();
    let (ra, rb) = (reg(&circuit, "a"), reg(&circuit, "b"));
    // b = 6 uses the carry qubit; 3 + 6 wraps modulo 8
    let input = Statevector::write_register(Statevector::write_register(0, &ra, 3), &rb, 6);
    assert_eq!(Statevector::read_register(run_basis(&circuit, input), &rb), 1);
}

/// Wrap a Fourier-basis adder acting on the trailing `n` qubits in a QFT pair.
fn in_fourier_basis(adder: &Circuit, n: u32) -> Circuit {
    let width = adder.num_qubits() as u32;
    let mut circuit = Circuit::new("wrapped");
    let q = circuit.add_qreg("q", width).unwrap();
    let phi = &q.as_slice()[(width - n) as usize..];
    circuit.append(&Circuit::qft(n, false).unwrap(), phi, &[]).unwrap();
    circuit.append(adder, q.as_slice(), &[]).unwrap();
    circuit.append(&Circuit::iqft(n, false).unwrap(), phi, &[]).unwrap();
    circuit
}

#[test]
fn controlled_phi_add_respects_control() {
    let n = 4;
    let circuit = in_fourier_basis(&phi_add_controlled(n, 5, 1, 0).unwrap(), n);
    for x in 0..16u64 {
        // qubit 0 is the control
        assert_eq!(run_basis(&circuit, x << 1), x << 1);
        assert_eq!(run_basis(&circuit, (x << 1) | 1), (((x + 5) % 16) << 1) | 1);
    }
}

#[test]
fn doubly_controlled_phi_add_needs_both_controls() {
    let n = 3;
    let circuit = in_fourier_basis(&phi_add_doubly_controlled(n, 3, -1).unwrap(), n);
    for x in 0..8u64 {
        for ctrl in 0..4u64 {
            let out = run_basis(&circuit, (x << 2) | ctrl);
            let expected = if ctrl == 3 { (x + 8 - 3) % 8 } else { x };
            assert_eq!(out, (expected << 2) | ctrl, "x={x} ctrl={ctrl:02b}");
        }
    }
}
