//! Borrowed-qubit primitives and modular adders.
//!
//! Borrowed qubits are prepared in arbitrary (dirty) basis states; every
//! primitive must hand them back untouched.

use proptest::prelude::*;

use qdlog_adapter_sim::Statevector;
use qdlog_arith::brg::modular_adder_doubly_controlled;
use qdlog_arith::hrs::modular_adder;
use qdlog_arith::{carry_gate, comparator, controlled_constant_adder, controlled_incrementer};
use qdlog_ir::{Circuit, QubitId};

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

/// Encode `(register, value)` pairs into a basis index.
fn encode(circuit: &Circuit, values: &[(&str, u64)]) -> u64 {
    values.iter().fold(0, |index, (name, value)| {
        Statevector::write_register(index, &reg(circuit, name), *value)
    })
}

fn read(circuit: &Circuit, index: u64, name: &str) -> u64 {
    Statevector::read_register(index, &reg(circuit, name))
}

#[test]
fn incrementer_with_dirty_qubits() {
    for n in 1..=3u32 {
        let circuit = controlled_incrementer(n).unwrap();
        for ctrl in 0..2 {
            for x in 0..(1u64 << n) {
                for dirty in 0..(1u64 << (n + 1)) {
                    let input =
                        encode(&circuit, &[("ctrl", ctrl), ("x", x), ("borrowed", dirty)]);
                    let out = run_basis(&circuit, input);
                    assert_eq!(read(&circuit, out, "x"), (x + ctrl) % (1 << n), "n={n}");
                    assert_eq!(read(&circuit, out, "ctrl"), ctrl);
                    assert_eq!(read(&circuit, out, "borrowed"), dirty);
                }
            }
        }
    }
}

#[test]
fn carry_gate_flips_top_qubit_with_the_carry() {
    for n in 3..=5u32 {
        for num_controls in 0..=2u32 {
            let circuit = carry_gate(n, 0b1_0110 % (1 << n), num_controls).unwrap();
            let constant = 0b1_0110 % (1u64 << n);
            let all_set = (1u64 << num_controls) - 1;
            for a in 0..(1u64 << n) {
                for g in [0u64, (1 << (n - 2)) - 1, 1] {
                    for ctrl in [0, all_set] {
                        let input = encode(&circuit, &[("ctrl", ctrl), ("a", a), ("g", g)]);
                        let out = run_basis(&circuit, input);
                        let low = a & ((1 << (n - 1)) - 1);
                        let carry = ((low + constant) >> (n - 1)) & 1;
                        let flip = if ctrl == all_set { carry } else { 0 };
                        assert_eq!(
                            read(&circuit, out, "a"),
                            a ^ (flip << (n - 1)),
                            "n={n} controls={num_controls} a={a} g={g}"
                        );
                        assert_eq!(read(&circuit, out, "g"), g);
                    }
                }
            }
        }
    }
}

#[test]
fn comparator_flags_smaller_inputs() {
    let n = 3u32;
    for value in 0..=(1u64 << n) {
        let circuit = comparator(n, value, 2).unwrap();
        for input in 0..(1u64 << n) {
            for dirty in [0u64, 0b01, 0b11] {
                for ctrl in 0..4u64 {
                    let state = encode(
                        &circuit,
                        &[("ctrl", ctrl), ("input", input), ("borrowed", dirty)],
                    );
                    let out = run_basis(&circuit, state);
                    let expected = u64::from(ctrl == 3 && input < value);
                    assert_eq!(read(&circuit, out, "res"), expected, "v={value} x={input}");
                    assert_eq!(read(&circuit, out, "input"), input);
                    assert_eq!(read(&circuit, out, "borrowed"), dirty);
                }
            }
        }
    }
}

proptest! {
    #[test]
    fn constant_adder_with_dirty_qubits(
        n in 1u32..=7,
        constant in -200i64..200,
        x in 0u64..128,
        dirty in 0u64..4,
        ctrl in 0u64..2,
    ) {
        let x = x % (1 << n);
        let circuit = controlled_constant_adder(n, constant).unwrap();
        let input = encode(&circuit, &[("ctrl", ctrl), ("x", x), ("borrowed", dirty)]);
        let out = run_basis(&circuit, input);

        let expected = (x as i64 + ctrl as i64 * constant).rem_euclid(1 << n) as u64;
        prop_assert_eq!(read(&circuit, out, "x"), expected);
        prop_assert_eq!(read(&circuit, out, "borrowed"), dirty);
        prop_assert_eq!(read(&circuit, out, "ctrl"), ctrl);
    }

    #[test]
    fn toffoli_modular_adder(
        p in prop::sample::select(vec![5u64, 7, 8, 11, 13]),
        a in 0u64..16,
        b in 0u64..16,
        dirty in 0u64..8,
        ctrl in 0u64..4,
    ) {
        let n = 4u32;
        let (a, b) = (a % p, b % p);
        let circuit = modular_adder(n, a, p, 2).unwrap();
        let input = encode(&circuit, &[("ctrl", ctrl), ("b", b), ("g", dirty)]);
        let out = run_basis(&circuit, input);

        let expected = if ctrl == 3 { (a + b) % p } else { b };
        prop_assert_eq!(read(&circuit, out, "b"), expected);
        prop_assert_eq!(read(&circuit, out, "g"), dirty);
        prop_assert_eq!(read(&circuit, out, "flag"), 0);
    }
}

#[test]
fn fourier_modular_adder() {
    let n = 4u32;
    for p in [3u64, 5, 7, 8] {
        let adder_for = |y| {
            let adder = modular_adder_doubly_controlled(n, y, p).unwrap();
            let mut circuit = Circuit::new("wrapped");
            let q = circuit.add_qreg("q", adder.num_qubits() as u32).unwrap();
            let b = &q.as_slice()[2..2 + n as usize];
            circuit.append(&Circuit::qft(n, false).unwrap(), b, &[]).unwrap();
            circuit.append(&adder, q.as_slice(), &[]).unwrap();
            circuit.append(&Circuit::iqft(n, false).unwrap(), b, &[]).unwrap();
            circuit
        };
        for y in 0..p {
            let circuit = adder_for(y);
            for b in 0..p {
                for ctrl in 0..4u64 {
                    let out = run_basis(&circuit, (b << 2) | ctrl);
                    let expected = if ctrl == 3 { (b + y) % p } else { b };
                    // aux is the top qubit and must be clean again
                    assert_eq!(out, (expected << 2) | ctrl, "p={p} y={y} b={b}");
                }
            }
        }
    }
}
