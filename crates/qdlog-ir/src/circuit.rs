//! High-level circuit builder API.

use std::f64::consts::PI;

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::dag::CircuitDag;
use crate::error::{IrError, IrResult};
use crate::gate::{ClassicalCondition, Gate, StandardGate};
use crate::instruction::{Instruction, InstructionKind};
use crate::qubit::{Clbit, ClbitId, Qubit, QubitId};
use crate::register::{ClassicalRegister, QuantumRegister};

/// A quantum circuit.
///
/// Instructions are kept in program order. Every instruction is validated
/// when it is added, so a `Circuit` never refers to a missing wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circuit {
    /// Name of the circuit.
    name: String,
    /// Qubits in the circuit.
    qubits: Vec<Qubit>,
    /// Classical bits in the circuit.
    clbits: Vec<Clbit>,
    /// Named quantum registers in allocation order.
    qregs: Vec<QuantumRegister>,
    /// Named classical registers in allocation order.
    cregs: Vec<ClassicalRegister>,
    /// Instructions in program order.
    instructions: Vec<Instruction>,
}

impl Circuit {
    /// Create a new empty circuit.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            qubits: vec![],
            clbits: vec![],
            qregs: vec![],
            cregs: vec![],
            instructions: vec![],
        }
    }

    /// Create a circuit with a given number of anonymous qubits and classical bits.
    pub fn with_size(name: impl Into<String>, num_qubits: u32, num_clbits: u32) -> Self {
        let mut circuit = Self::new(name);
        for _ in 0..num_qubits {
            circuit.add_qubit();
        }
        for _ in 0..num_clbits {
            circuit.add_clbit();
        }
        circuit
    }

    /// Add a single qubit to the circuit.
    pub fn add_qubit(&mut self) -> QubitId {
        let id = QubitId(self.qubits.len() as u32);
        self.qubits.push(Qubit::new(id));
        id
    }

    /// Add a quantum register with `size` fresh qubits.
    pub fn add_qreg(&mut self, name: impl Into<String>, size: u32) -> IrResult<QuantumRegister> {
        let name = name.into();
        if self.qregs.iter().any(|r| r.name() == name) {
            return Err(IrError::DuplicateRegister(name));
        }
        let mut ids = Vec::with_capacity(size as usize);
        for i in 0..size {
            let id = QubitId(self.qubits.len() as u32);
            self.qubits.push(Qubit::with_register(id, &name, i));
            ids.push(id);
        }
        let reg = QuantumRegister::new(name, ids);
        self.qregs.push(reg.clone());
        Ok(reg)
    }

    /// Add a single classical bit to the circuit.
    pub fn add_clbit(&mut self) -> ClbitId {
        let id = ClbitId(self.clbits.len() as u32);
        self.clbits.push(Clbit::new(id));
        id
    }

    /// Add a classical register with `size` fresh bits.
    pub fn add_creg(&mut self, name: impl Into<String>, size: u32) -> IrResult<ClassicalRegister> {
        let name = name.into();
        if self.cregs.iter().any(|r| r.name() == name) {
            return Err(IrError::DuplicateRegister(name));
        }
        let mut ids = Vec::with_capacity(size as usize);
        for i in 0..size {
            let id = ClbitId(self.clbits.len() as u32);
            self.clbits.push(Clbit::with_register(id, &name, i));
            ids.push(id);
        }
        let reg = ClassicalRegister::new(name, ids);
        self.cregs.push(reg.clone());
        Ok(reg)
    }

    /// Validate and append an instruction.
    #[allow(clippy::cast_possible_truncation)]
    pub fn push(&mut self, instruction: Instruction) -> IrResult<&mut Self> {
        let gate_name = match &instruction.kind {
            InstructionKind::Gate(gate) => Some(gate.name().to_string()),
            _ => None,
        };

        if let InstructionKind::Gate(gate) = &instruction.kind {
            let expected = gate.num_qubits() as usize;
            let got = instruction.qubits.len();
            if expected != got {
                return Err(IrError::QubitCountMismatch {
                    gate_name: gate.name().to_string(),
                    expected: expected as u32,
                    got: got as u32,
                });
            }
            if let Some(cond) = &gate.condition {
                if cond.clbits.is_empty()
                    || cond.clbits.len() > 64
                    || (cond.clbits.len() < 64 && cond.value >> cond.clbits.len() != 0)
                {
                    return Err(IrError::InvalidCondition(format!(
                        "value {} does not fit {} bits",
                        cond.value,
                        cond.clbits.len()
                    )));
                }
            }
        }
        if instruction.is_measure() && instruction.qubits.len() != instruction.clbits.len() {
            return Err(IrError::WidthMismatch {
                what: "measured clbits",
                expected: instruction.qubits.len(),
                got: instruction.clbits.len(),
            });
        }

        for &qubit in &instruction.qubits {
            if qubit.index() >= self.qubits.len() {
                return Err(IrError::QubitNotFound {
                    qubit,
                    gate_name: gate_name.clone(),
                });
            }
        }
        for &clbit in instruction.clbits.iter().chain(instruction.read_clbits()) {
            if clbit.index() >= self.clbits.len() {
                return Err(IrError::ClbitNotFound {
                    clbit,
                    gate_name: gate_name.clone(),
                });
            }
        }

        let mut seen = FxHashSet::default();
        for &qubit in &instruction.qubits {
            if !seen.insert(qubit) {
                return Err(IrError::DuplicateQubit {
                    qubit,
                    gate_name: gate_name.clone(),
                });
            }
        }

        self.instructions.push(instruction);
        Ok(self)
    }

    // =========================================================================
    // Single-qubit gates
    // =========================================================================

    /// Apply Hadamard gate.
    pub fn h(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.push(Instruction::single_qubit_gate(StandardGate::H, qubit))
    }

    /// Apply Pauli-X gate.
    pub fn x(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.push(Instruction::single_qubit_gate(StandardGate::X, qubit))
    }

    /// Apply Pauli-Z gate.
    pub fn z(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.push(Instruction::single_qubit_gate(StandardGate::Z, qubit))
    }

    /// Apply phase gate.
    pub fn p(&mut self, theta: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.push(Instruction::single_qubit_gate(StandardGate::P(theta), qubit))
    }

    // =========================================================================
    // Controlled gates
    // =========================================================================

    /// Apply CNOT gate.
    pub fn cx(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.push(Instruction::two_qubit_gate(StandardGate::CX, control, target))
    }

    /// Apply controlled phase gate.
    pub fn cp(&mut self, theta: f64, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.push(Instruction::two_qubit_gate(
            StandardGate::CP(theta),
            control,
            target,
        ))
    }

    /// Apply SWAP gate.
    pub fn swap(&mut self, q1: QubitId, q2: QubitId) -> IrResult<&mut Self> {
        self.push(Instruction::two_qubit_gate(StandardGate::Swap, q1, q2))
    }

    /// Apply Toffoli (CCX) gate.
    pub fn ccx(&mut self, c1: QubitId, c2: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.push(Instruction::gate(StandardGate::CCX, [c1, c2, target]))
    }

    /// Apply Fredkin (CSWAP) gate.
    pub fn cswap(&mut self, control: QubitId, t1: QubitId, t2: QubitId) -> IrResult<&mut Self> {
        self.push(Instruction::gate(StandardGate::CSwap, [control, t1, t2]))
    }

    /// Apply X controlled on every qubit in `controls`.
    ///
    /// Emits `x`, `cx` or `ccx` for up to two controls.
    pub fn mcx(&mut self, controls: &[QubitId], target: QubitId) -> IrResult<&mut Self> {
        match controls {
            [] => self.x(target),
            [c] => self.cx(*c, target),
            [c1, c2] => self.ccx(*c1, *c2, target),
            _ => self.push(Instruction::gate(
                StandardGate::MCX {
                    num_controls: controls.len() as u32,
                },
                controls.iter().copied().chain([target]),
            )),
        }
    }

    // =========================================================================
    // Other operations
    // =========================================================================

    /// Apply an arbitrary gate.
    pub fn gate(
        &mut self,
        gate: impl Into<Gate>,
        qubits: impl IntoIterator<Item = QubitId>,
    ) -> IrResult<&mut Self> {
        self.push(Instruction::gate(gate, qubits))
    }

    /// Apply a gate that fires only when `condition` holds at run time.
    pub fn gate_if(
        &mut self,
        gate: StandardGate,
        qubits: impl IntoIterator<Item = QubitId>,
        condition: ClassicalCondition,
    ) -> IrResult<&mut Self> {
        self.push(Instruction::conditioned_gate(gate, qubits, condition))
    }

    /// Measure a qubit to a classical bit.
    pub fn measure(&mut self, qubit: QubitId, clbit: ClbitId) -> IrResult<&mut Self> {
        self.push(Instruction::measure(qubit, clbit))
    }

    /// Measure `qubits[i]` into `clbits[i]`.
    pub fn measure_all(
        &mut self,
        qubits: impl IntoIterator<Item = QubitId>,
        clbits: impl IntoIterator<Item = ClbitId>,
    ) -> IrResult<&mut Self> {
        self.push(Instruction::measure_all(qubits, clbits)?)
    }

    /// Reset a qubit to |0⟩.
    pub fn reset(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.push(Instruction::reset(qubit))
    }

    /// Apply a barrier to specified qubits.
    pub fn barrier(&mut self, qubits: impl IntoIterator<Item = QubitId>) -> IrResult<&mut Self> {
        self.push(Instruction::barrier(qubits))
    }

    // =========================================================================
    // Composition
    // =========================================================================

    /// Embed `sub` into this circuit.
    ///
    /// Qubit `i` of `sub` is mapped to `qubits[i]` and clbit `j` to
    /// `clbits[j]`. The operand lists must match the widths of `sub` exactly.
    pub fn append(
        &mut self,
        sub: &Circuit,
        qubits: &[QubitId],
        clbits: &[ClbitId],
    ) -> IrResult<&mut Self> {
        if qubits.len() != sub.num_qubits() {
            return Err(IrError::WidthMismatch {
                what: "qubits",
                expected: sub.num_qubits(),
                got: qubits.len(),
            });
        }
        if clbits.len() != sub.num_clbits() {
            return Err(IrError::WidthMismatch {
                what: "clbits",
                expected: sub.num_clbits(),
                got: clbits.len(),
            });
        }
        self.instructions.reserve(sub.instructions.len());
        for inst in &sub.instructions {
            self.push(inst.remap(qubits, clbits))?;
        }
        Ok(self)
    }

    /// Sequence `other` after this circuit on the same wires.
    pub fn extend(&mut self, other: &Circuit) -> IrResult<&mut Self> {
        if other.num_qubits() != self.num_qubits() {
            return Err(IrError::WidthMismatch {
                what: "qubits",
                expected: self.num_qubits(),
                got: other.num_qubits(),
            });
        }
        if other.num_clbits() != self.num_clbits() {
            return Err(IrError::WidthMismatch {
                what: "clbits",
                expected: self.num_clbits(),
                got: other.num_clbits(),
            });
        }
        self.instructions.extend(other.instructions.iter().cloned());
        Ok(self)
    }

    /// The adjoint of a unitary circuit.
    ///
    /// Wires and registers are preserved; instructions are reversed and
    /// individually inverted. Fails with [`IrError::NonUnitary`] on
    /// measurement, reset or classically conditioned gates.
    pub fn inverse(&self) -> IrResult<Circuit> {
        let instructions = self
            .instructions
            .iter()
            .rev()
            .map(Instruction::inverse)
            .collect::<IrResult<Vec<_>>>()?;
        Ok(Self {
            name: format!("{}_dg", self.name),
            qubits: self.qubits.clone(),
            clbits: self.clbits.clone(),
            qregs: self.qregs.clone(),
            cregs: self.cregs.clone(),
            instructions,
        })
    }

    /// Rename the circuit.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Get the circuit name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the number of qubits.
    pub fn num_qubits(&self) -> usize {
        self.qubits.len()
    }

    /// Get the number of classical bits.
    pub fn num_clbits(&self) -> usize {
        self.clbits.len()
    }

    /// Get the qubits in the circuit.
    pub fn qubits(&self) -> &[Qubit] {
        &self.qubits
    }

    /// Get the classical bits in the circuit.
    pub fn clbits(&self) -> &[Clbit] {
        &self.clbits
    }

    /// Quantum registers in allocation order.
    pub fn qregs(&self) -> &[QuantumRegister] {
        &self.qregs
    }

    /// Classical registers in allocation order.
    pub fn cregs(&self) -> &[ClassicalRegister] {
        &self.cregs
    }

    /// Look up a quantum register by name.
    pub fn qreg(&self, name: &str) -> IrResult<&QuantumRegister> {
        self.qregs
            .iter()
            .find(|r| r.name() == name)
            .ok_or_else(|| IrError::RegisterNotFound(name.to_string()))
    }

    /// Look up a classical register by name.
    pub fn creg(&self, name: &str) -> IrResult<&ClassicalRegister> {
        self.cregs
            .iter()
            .find(|r| r.name() == name)
            .ok_or_else(|| IrError::RegisterNotFound(name.to_string()))
    }

    /// Instructions in program order.
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Number of instructions.
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Whether the circuit has no instructions.
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Whether the circuit contains only unconditioned gates and barriers.
    pub fn is_unitary(&self) -> bool {
        self.instructions.iter().all(|inst| match &inst.kind {
            InstructionKind::Gate(g) => g.condition.is_none(),
            InstructionKind::Barrier => true,
            InstructionKind::Measure | InstructionKind::Reset => false,
        })
    }

    /// Number of instructions per instruction name.
    pub fn count_ops(&self) -> FxHashMap<String, usize> {
        let mut counts = FxHashMap::default();
        for inst in &self.instructions {
            *counts.entry(inst.name().to_string()).or_insert(0) += 1;
        }
        counts
    }

    /// Build the dependency DAG of this circuit.
    pub fn to_dag(&self) -> CircuitDag {
        CircuitDag::from_circuit(self)
    }

    /// Get the circuit depth.
    pub fn depth(&self) -> usize {
        self.to_dag().depth()
    }

    // =========================================================================
    // Pre-built circuits
    // =========================================================================

    /// Quantum Fourier transform on `n` qubits.
    ///
    /// Without swaps, qubit `j` ends up carrying the phase `2π·x / 2^(j+1)`
    /// of the input value `x`; this is the layout the Fourier-basis adders
    /// operate on. With swaps the output is bit-reversed into the usual
    /// little-endian transform.
    pub fn qft(n: u32, do_swaps: bool) -> IrResult<Self> {
        let mut circuit = Self::with_size("qft", n, 0);

        for j in (0..n).rev() {
            circuit.h(QubitId(j))?;
            for k in (0..j).rev() {
                let lam = PI * 2f64.powi(k as i32 - j as i32);
                circuit.cp(lam, QubitId(j), QubitId(k))?;
            }
        }

        if do_swaps {
            for i in 0..n / 2 {
                circuit.swap(QubitId(i), QubitId(n - 1 - i))?;
            }
        }

        Ok(circuit)
    }

    /// Inverse quantum Fourier transform on `n` qubits.
    pub fn iqft(n: u32, do_swaps: bool) -> IrResult<Self> {
        Ok(Self::qft(n, do_swaps)?.inverse()?.with_name("iqft"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_circuit() {
        let circuit = Circuit::new("test");
        assert_eq!(circuit.name(), "test");
        assert_eq!(circuit.num_qubits(), 0);
        assert_eq!(circuit.num_clbits(), 0);
        assert!(circuit.is_empty());
    }

    #[test]
    fn test_add_registers() {
        let mut circuit = Circuit::new("test");
        let top = circuit.add_qreg("top", 3).unwrap();
        let bot = circuit.add_qreg("bot", 4).unwrap();
        let m1 = circuit.add_creg("m1", 3).unwrap();

        assert_eq!(top.as_slice(), &[QubitId(0), QubitId(1), QubitId(2)]);
        assert_eq!(bot[0], QubitId(3));
        assert_eq!(m1.len(), 3);
        assert_eq!(circuit.num_qubits(), 7);
        assert_eq!(circuit.qreg("bot").unwrap().len(), 4);
        assert!(matches!(
            circuit.add_qreg("top", 1),
            Err(IrError::DuplicateRegister(_))
        ));
        assert!(matches!(
            circuit.creg("m2"),
            Err(IrError::RegisterNotFound(_))
        ));
    }

    #[test]
    fn test_validation() {
        let mut circuit = Circuit::with_size("test", 2, 1);
        assert!(matches!(
            circuit.cx(QubitId(0), QubitId(0)),
            Err(IrError::DuplicateQubit { .. })
        ));
        assert!(matches!(
            circuit.h(QubitId(2)),
            Err(IrError::QubitNotFound { .. })
        ));
        assert!(matches!(
            circuit.measure(QubitId(0), ClbitId(1)),
            Err(IrError::ClbitNotFound { .. })
        ));
        assert!(matches!(
            circuit.gate(StandardGate::CX, [QubitId(0)]),
            Err(IrError::QubitCountMismatch { .. })
        ));
        assert!(matches!(
            circuit.gate_if(
                StandardGate::X,
                [QubitId(0)],
                ClassicalCondition::new([ClbitId(0)], 2)
            ),
            Err(IrError::InvalidCondition(_))
        ));
        assert!(circuit.is_empty());
    }

    #[test]
    fn test_mcx_dispatch() {
        let mut circuit = Circuit::with_size("test", 5, 0);
        let q: Vec<_> = (0..5).map(QubitId).collect();
        circuit
            .mcx(&[], q[0])
            .unwrap()
            .mcx(&q[..1], q[1])
            .unwrap()
            .mcx(&q[..2], q[2])
            .unwrap()
            .mcx(&q[..4], q[4])
            .unwrap();
        let names: Vec<_> = circuit.instructions().iter().map(|i| i.name()).collect();
        assert_eq!(names, vec!["x", "cx", "ccx", "mcx"]);
    }

    #[test]
    fn test_append_remaps_operands() {
        let mut sub = Circuit::with_size("sub", 2, 1);
        sub.cx(QubitId(0), QubitId(1))
            .unwrap()
            .measure(QubitId(1), ClbitId(0))
            .unwrap();

        let mut circuit = Circuit::with_size("outer", 4, 2);
        circuit
            .append(&sub, &[QubitId(3), QubitId(1)], &[ClbitId(1)])
            .unwrap();
        assert_eq!(circuit.instructions()[0].qubits, vec![QubitId(3), QubitId(1)]);
        assert_eq!(circuit.instructions()[1].clbits, vec![ClbitId(1)]);

        assert!(matches!(
            circuit.append(&sub, &[QubitId(0)], &[ClbitId(0)]),
            Err(IrError::WidthMismatch { what: "qubits", .. })
        ));
    }

    #[test]
    fn test_inverse_reverses_and_negates() {
        let mut circuit = Circuit::with_size("c", 2, 0);
        circuit
            .h(QubitId(0))
            .unwrap()
            .cp(0.5, QubitId(0), QubitId(1))
            .unwrap();
        let inv = circuit.inverse().unwrap();
        assert_eq!(inv.instructions()[0].name(), "cp");
        assert_eq!(
            inv.instructions()[0].as_gate().unwrap().kind,
            StandardGate::CP(-0.5)
        );
        assert_eq!(inv.instructions()[1].name(), "h");

        let mut measured = Circuit::with_size("m", 1, 1);
        measured.measure(QubitId(0), ClbitId(0)).unwrap();
        assert!(!measured.is_unitary());
        assert!(matches!(measured.inverse(), Err(IrError::NonUnitary(_))));
    }

    #[test]
    fn test_qft_gate_order() {
        let qft = Circuit::qft(3, false).unwrap();
        let names: Vec<_> = qft.instructions().iter().map(|i| i.name()).collect();
        assert_eq!(names, vec!["h", "cp", "cp", "h", "cp", "h"]);
        assert_eq!(qft.instructions()[0].qubits, vec![QubitId(2)]);
        assert_eq!(
            qft.instructions()[1].as_gate().unwrap().kind,
            StandardGate::CP(PI / 2.0)
        );
        assert_eq!(
            qft.instructions()[2].as_gate().unwrap().kind,
            StandardGate::CP(PI / 4.0)
        );

        let swapped = Circuit::qft(4, true).unwrap();
        assert_eq!(swapped.count_ops()["swap"], 2);
        assert_eq!(Circuit::iqft(4, true).unwrap().instructions()[0].name(), "swap");
    }

    #[test]
    fn test_depth() {
        let mut circuit = Circuit::with_size("test", 2, 2);
        circuit
            .h(QubitId(0))
            .unwrap()
            .cx(QubitId(0), QubitId(1))
            .unwrap()
            .measure(QubitId(0), ClbitId(0))
            .unwrap()
            .measure(QubitId(1), ClbitId(1))
            .unwrap();
        assert_eq!(circuit.depth(), 3);
    }
}
