//! Dependency DAG view of a circuit.

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex as PetNodeIndex};
use petgraph::visit::EdgeRef;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::circuit::Circuit;
use crate::instruction::{Instruction, InstructionKind};
use crate::qubit::{ClbitId, QubitId};

/// Node index type for the circuit DAG.
pub type NodeIndex = PetNodeIndex<u32>;

/// A node in the circuit DAG.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DagNode {
    /// Input node for a wire.
    In(WireId),
    /// Output node for a wire.
    Out(WireId),
    /// Operation node containing an instruction.
    Op(Instruction),
}

impl DagNode {
    /// Get the instruction if this is an operation node.
    #[inline]
    pub fn instruction(&self) -> Option<&Instruction> {
        match self {
            DagNode::Op(inst) => Some(inst),
            _ => None,
        }
    }
}

/// Identifier for a wire in the DAG.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WireId {
    /// A quantum wire.
    Qubit(QubitId),
    /// A classical wire.
    Clbit(ClbitId),
}

/// An edge in the circuit DAG representing a wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DagEdge {
    /// The wire this edge represents.
    pub wire: WireId,
}

/// Dependency graph of a [`Circuit`].
///
/// Nodes are wire inputs, wire outputs and operations; edges follow wires.
/// A classically conditioned gate is attached to the classical wires it
/// reads, so it always sits after the measurement that writes them.
#[derive(Debug)]
pub struct CircuitDag {
    graph: DiGraph<DagNode, DagEdge, u32>,
    /// Maps each wire to the node just before its output node.
    wire_front: FxHashMap<WireId, NodeIndex>,
    outputs: FxHashMap<WireId, NodeIndex>,
}

impl CircuitDag {
    /// Build the DAG of an already validated circuit.
    pub fn from_circuit(circuit: &Circuit) -> Self {
        let mut dag = Self {
            graph: DiGraph::default(),
            wire_front: FxHashMap::default(),
            outputs: FxHashMap::default(),
        };
        for q in circuit.qubits() {
            dag.add_wire(WireId::Qubit(q.id));
        }
        for c in circuit.clbits() {
            dag.add_wire(WireId::Clbit(c.id));
        }
        for inst in circuit.instructions() {
            dag.apply(inst);
        }
        dag
    }

    fn add_wire(&mut self, wire: WireId) {
        let in_node = self.graph.add_node(DagNode::In(wire));
        let out_node = self.graph.add_node(DagNode::Out(wire));
        self.graph.add_edge(in_node, out_node, DagEdge { wire });
        self.wire_front.insert(wire, in_node);
        self.outputs.insert(wire, out_node);
    }

    fn apply(&mut self, instruction: &Instruction) {
        let op_node = self.graph.add_node(DagNode::Op(instruction.clone()));

        let mut wires: Vec<WireId> = instruction.qubits.iter().map(|&q| WireId::Qubit(q)).collect();
        for &c in instruction.clbits.iter().chain(instruction.read_clbits()) {
            let wire = WireId::Clbit(c);
            if !wires.contains(&wire) {
                wires.push(wire);
            }
        }

        for wire in wires {
            let (Some(&prev_node), Some(&out_node)) =
                (self.wire_front.get(&wire), self.outputs.get(&wire))
            else {
                continue;
            };
            let edge_id = self
                .graph
                .edges_directed(prev_node, Direction::Outgoing)
                .find(|e| e.weight().wire == wire && e.target() == out_node)
                .map(|e| e.id());
            if let Some(eid) = edge_id {
                self.graph.remove_edge(eid);
            }
            self.graph.add_edge(prev_node, op_node, DagEdge { wire });
            self.graph.add_edge(op_node, out_node, DagEdge { wire });
            self.wire_front.insert(wire, op_node);
        }
    }

    /// Number of operation nodes.
    pub fn num_ops(&self) -> usize {
        self.graph
            .node_weights()
            .filter(|n| matches!(n, DagNode::Op(_)))
            .count()
    }

    /// Operations in a topological order.
    pub fn topological_ops(&self) -> Vec<(NodeIndex, &Instruction)> {
        petgraph::algo::toposort(&self.graph, None)
            .map(|order| {
                order
                    .into_iter()
                    .filter_map(|idx| self.graph[idx].instruction().map(|inst| (idx, inst)))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Immediate operation predecessors of a node.
    pub fn op_predecessors(&self, node: NodeIndex) -> Vec<NodeIndex> {
        let mut preds: Vec<_> = self
            .graph
            .neighbors_directed(node, Direction::Incoming)
            .filter(|&p| matches!(self.graph[p], DagNode::Op(_)))
            .collect();
        preds.sort_unstable();
        preds.dedup();
        preds
    }

    /// Length of the longest chain of operations, ignoring barriers.
    pub fn depth(&self) -> usize {
        let mut level: FxHashMap<NodeIndex, usize> = FxHashMap::default();
        let mut depth = 0;
        for (idx, inst) in self.topological_ops() {
            let base = self
                .op_predecessors(idx)
                .iter()
                .map(|p| level.get(p).copied().unwrap_or(0))
                .max()
                .unwrap_or(0);
            let own = usize::from(!matches!(inst.kind, InstructionKind::Barrier));
            level.insert(idx, base + own);
            depth = depth.max(base + own);
        }
        depth
    }
}
