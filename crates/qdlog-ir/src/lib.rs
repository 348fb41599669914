//! qdlog Circuit Intermediate Representation
//!
//! This crate provides the circuit model shared by the arithmetic builders,
//! the phase-estimation orchestrators and the execution backends.
//!
//! # Core Components
//!
//! - **Qubits and Classical Bits**: [`QubitId`], [`ClbitId`] index wires of a circuit
//! - **Registers**: [`QuantumRegister`], [`ClassicalRegister`] name fixed groups of wires
//! - **Gates**: [`StandardGate`] and [`Gate`], optionally guarded by a
//!   [`ClassicalCondition`]
//! - **Instructions**: [`Instruction`] combining gates with their operands
//! - **Circuit**: [`Circuit`] builder with composition, inversion and the
//!   Fourier transform
//! - **DAG**: [`CircuitDag`] dependency view used for depth and ordering
//!
//! # Example: Composing Sub-circuits
//!
//! ```rust
//! use qdlog_ir::{Circuit, QubitId};
//!
//! let qft = Circuit::qft(3, false).unwrap();
//!
//! let mut circuit = Circuit::new("outer");
//! let reg = circuit.add_qreg("b", 4).unwrap();
//! circuit.append(&qft, &reg.as_slice()[1..], &[]).unwrap();
//! circuit.append(&qft.inverse().unwrap(), &reg.as_slice()[1..], &[]).unwrap();
//!
//! assert_eq!(circuit.num_qubits(), 4);
//! assert_eq!(circuit.len(), 2 * qft.len());
//! ```
//!
//! # Supported Gates
//!
//! | Gate | Qubits | Description |
//! |------|--------|-------------|
//! | `X`, `Z` | 1 | Pauli gates |
//! | `H` | 1 | Hadamard gate |
//! | `P(θ)` | 1 | Phase gate |
//! | `CX` | 2 | Controlled-NOT (CNOT) |
//! | `CP(θ)` | 2 | Controlled phase |
//! | `Swap` | 2 | SWAP gate |
//! | `CCX` | 3 | Toffoli (CCNOT) gate |
//! | `CSwap` | 3 | Fredkin gate |
//! | `MCX` | k+1 | X with k controls |

pub mod circuit;
pub mod dag;
pub mod error;
pub mod gate;
pub mod instruction;
pub mod qubit;
pub mod register;

pub use circuit::Circuit;
pub use dag::{CircuitDag, DagEdge, DagNode, NodeIndex, WireId};
pub use error::{IrError, IrResult};
pub use gate::{ClassicalCondition, Gate, StandardGate};
pub use instruction::{Instruction, InstructionKind};
pub use qubit::{Clbit, ClbitId, Qubit, QubitId};
pub use register::{ClassicalRegister, QuantumRegister};
