//! Property-based tests for circuit construction and inversion.

use proptest::prelude::*;

use qdlog_ir::{Circuit, ClassicalCondition, ClbitId, QubitId, StandardGate};

const WIDTH: u32 = 4;

#[derive(Debug, Clone)]
enum Op {
    H(u32),
    X(u32),
    P(f64, u32),
    Cx(u32, u32),
    Cp(f64, u32, u32),
    Ccx(u32, u32, u32),
}

fn distinct_pair() -> impl Strategy<Value = (u32, u32)> {
    (0..WIDTH, 1..WIDTH).prop_map(|(a, offset)| (a, (a + offset) % WIDTH))
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..WIDTH).prop_map(Op::H),
        (0..WIDTH).prop_map(Op::X),
        (-3.0f64..3.0, 0..WIDTH).prop_map(|(t, q)| Op::P(t, q)),
        distinct_pair().prop_map(|(c, t)| Op::Cx(c, t)),
        (-3.0f64..3.0, distinct_pair()).prop_map(|(t, (c, q))| Op::Cp(t, c, q)),
        Just(Op::Ccx(0, 1, 2)),
    ]
}

fn build(ops: &[Op]) -> Circuit {
    let mut circuit = Circuit::with_size("random", WIDTH, 0);
    for op in ops {
        match *op {
            Op::H(q) => circuit.h(QubitId(q)),
            Op::X(q) => circuit.x(QubitId(q)),
            Op::P(t, q) => circuit.p(t, QubitId(q)),
            Op::Cx(c, t) => circuit.cx(QubitId(c), QubitId(t)),
            Op::Cp(t, c, q) => circuit.cp(t, QubitId(c), QubitId(q)),
            Op::Ccx(a, b, t) => circuit.ccx(QubitId(a), QubitId(b), QubitId(t)),
        }
        .unwrap();
    }
    circuit
}

proptest! {
    #[test]
    fn prop_double_inverse_is_identity(ops in prop::collection::vec(op(), 0..30)) {
        let circuit = build(&ops);
        let twice = circuit.inverse().unwrap().inverse().unwrap();
        prop_assert_eq!(twice.instructions(), circuit.instructions());
        prop_assert_eq!(twice.num_qubits(), circuit.num_qubits());
    }

    #[test]
    fn prop_append_preserves_operations(
        ops in prop::collection::vec(op(), 1..20),
        shift in 0..WIDTH,
    ) {
        let sub = build(&ops);
        let mapping: Vec<_> = (0..WIDTH).map(|q| QubitId((q + shift) % WIDTH)).collect();

        let mut outer = Circuit::with_size("outer", WIDTH, 0);
        outer.append(&sub, &mapping, &[]).unwrap();

        prop_assert_eq!(outer.len(), sub.len());
        prop_assert_eq!(outer.count_ops(), sub.count_ops());
        prop_assert!(outer.depth() <= outer.len());
    }
}

#[test]
fn test_conditioned_circuit_survives_json() {
    let mut circuit = Circuit::new("feedback");
    let q = circuit.add_qreg("q", 2).unwrap();
    let m = circuit.add_creg("m", 2).unwrap();
    circuit
        .h(q[0])
        .unwrap()
        .measure(q[0], m[0])
        .unwrap()
        .gate_if(StandardGate::X, [q[1]], ClassicalCondition::bit_set(m[0]))
        .unwrap()
        .reset(q[0])
        .unwrap()
        .measure(q[1], ClbitId(1))
        .unwrap();

    let json = serde_json::to_string(&circuit).unwrap();
    let restored: Circuit = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, circuit);
    assert_eq!(restored.creg("m").unwrap().len(), 2);
    assert!(restored.instructions()[2].condition().is_some());
}
