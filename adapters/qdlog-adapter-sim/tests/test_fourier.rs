use num_complex::Complex64;
use std::f64::consts::PI;

use qdlog_adapter_sim::Statevector;
use qdlog_ir::{Circuit, QubitId};

fn approx_eq(a: Complex64, b: Complex64) -> bool {
    (a - b).norm() < 1e-9
}

#[test]
fn test_qft_without_swaps_puts_phase_on_each_qubit() {
    let n = 3u32;
    let qft = Circuit::qft(n, false).unwrap();
    for x in 0..(1u64 << n) {
        let mut sv = Statevector::from_basis(n as usize, x);
        sv.apply_circuit(&qft).unwrap();
        let norm = 1.0 / f64::from(1u32 << n).sqrt();
        for y in 0..(1u64 << n) {
            let phase: f64 = (0..n)
                .filter(|j| (y >> j) & 1 == 1)
                .map(|j| 2.0 * PI * x as f64 / f64::from(1u32 << (j + 1)))
                .sum();
            assert!(
                approx_eq(sv.amplitude(y), Complex64::from_polar(norm, phase)),
                "x={x} y={y}"
            );
        }
    }
}

#[test]
fn test_qft_with_swaps_is_the_standard_transform() {
    let n = 4u32;
    let dim = 1u64 << n;
    let qft = Circuit::qft(n, true).unwrap();
    let x = 11u64;
    let mut sv = Statevector::from_basis(n as usize, x);
    sv.apply_circuit(&qft).unwrap();
    let norm = 1.0 / (dim as f64).sqrt();
    for y in 0..dim {
        let expected = Complex64::from_polar(norm, 2.0 * PI * (x * y) as f64 / dim as f64);
        assert!(approx_eq(sv.amplitude(y), expected), "y={y}");
    }
}

#[test]
fn test_inverse_qft_recovers_basis_state() {
    let n = 5u32;
    let qft = Circuit::qft(n, false).unwrap();
    let iqft = Circuit::iqft(n, false).unwrap();
    for x in [0u64, 1, 7, 19, 31] {
        let mut sv = Statevector::from_basis(n as usize, x);
        sv.apply_circuit(&qft).unwrap();
        sv.apply_circuit(&iqft).unwrap();
        assert_eq!(sv.support_size(), 1);
        assert!(approx_eq(sv.amplitude(x), Complex64::new(1.0, 0.0)));
    }
}

#[test]
fn test_embedded_transform_leaves_other_qubits_alone() {
    let mut circuit = Circuit::new("embed");
    let reg = circuit.add_qreg("r", 4).unwrap();
    let qft = Circuit::qft(3, true).unwrap();
    circuit.append(&qft, &reg.as_slice()[1..], &[]).unwrap();
    circuit
        .append(&qft.inverse().unwrap(), &reg.as_slice()[1..], &[])
        .unwrap();

    let mut sv = Statevector::from_basis(4, 0b1011);
    sv.apply_circuit(&circuit).unwrap();
    assert!(approx_eq(sv.amplitude(0b1011), Complex64::new(1.0, 0.0)));
    assert_eq!(Statevector::read_register(0b1011, &[QubitId(0)]), 1);
}
