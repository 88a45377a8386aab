//! The compiled, flattened, immutable graph `compile()` produces.

use std::collections::HashMap;

use patch_core::{Direction, EdgeId, GridPoint, NodeId, PortRole, Rotation};
use patch_registry::NodeState;

/// One compiled node: merged params, initial state, and the geometry
/// `patch-runtime` never needs but `patch-build` carries through anyway
/// since it's free to keep alongside everything else.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledNode {
    /// Stable identifier (namespaced with its group-instance prefix for
    /// nodes copied in during flattening).
    pub id: NodeId,
    /// Registry type key.
    pub type_key: String,
    /// Merged `param` (snapshot override else registry default).
    pub param: i32,
    /// Initial persistent state from `initState()`.
    pub state: NodeState,
    /// Grid position (for diagnostics/UI; the runtime itself is geometry-free).
    pub position: GridPoint,
    /// Rotation (for diagnostics/UI).
    pub rotation: Rotation,
}

/// One compiled edge: resolved role and delay, ready for scheduling.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledEdge {
    /// Stable identifier (namespaced for edges copied in during flattening).
    pub id: EdgeId,
    /// Source node.
    pub from_node: NodeId,
    /// Source output slot.
    pub from_slot: usize,
    /// Destination node.
    pub to_node: NodeId,
    /// Destination input slot.
    pub to_slot: usize,
    /// Role derived from the destination port (`signal` or `control`).
    pub role: PortRole,
    /// Base delay in ticks, non-negative.
    pub delay: f64,
}

/// Diagnostic record of one flattened group instance. Never consulted by
/// `patch-runtime` — flattened nodes/edges are all it sees.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupMeta {
    /// The group-node instance that was flattened away.
    pub instance_id: NodeId,
    /// The group definition id it projected.
    pub group_ref: String,
    /// Namespaced ids of every node copied in from the group's interior.
    pub node_ids: Vec<NodeId>,
    /// External signal input slots, in mapping order.
    pub external_inputs: usize,
    /// External outputs, in mapping order.
    pub external_outputs: usize,
    /// External control inputs, in mapping order.
    pub external_controls: usize,
}

/// The immutable, runtime-ready graph produced by a successful `compile()`.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledGraph {
    /// Nodes in insertion order (top-level nodes first, then flattened
    /// group interiors in group-then-node insertion order).
    pub nodes: Vec<CompiledNode>,
    /// Edges in insertion order.
    pub edges: Vec<CompiledEdge>,
    node_index: HashMap<NodeId, usize>,
    edge_index: HashMap<EdgeId, usize>,
    edges_by_node: HashMap<NodeId, Vec<usize>>,
    edge_by_directed_port: HashMap<(NodeId, Direction, usize), usize>,
    /// Diagnostic metadata for every flattened group instance.
    pub groups: Vec<GroupMeta>,
}

impl CompiledGraph {
    pub(crate) fn assemble(nodes: Vec<CompiledNode>, edges: Vec<CompiledEdge>, groups: Vec<GroupMeta>) -> Self {
        let mut node_index = HashMap::with_capacity(nodes.len());
        for (i, n) in nodes.iter().enumerate() {
            node_index.insert(n.id.clone(), i);
        }
        let mut edge_index = HashMap::with_capacity(edges.len());
        let mut edges_by_node: HashMap<NodeId, Vec<usize>> = HashMap::new();
        let mut edge_by_directed_port = HashMap::with_capacity(edges.len() * 2);
        for (i, e) in edges.iter().enumerate() {
            edge_index.insert(e.id.clone(), i);
            edges_by_node.entry(e.from_node.clone()).or_default().push(i);
            edges_by_node.entry(e.to_node.clone()).or_default().push(i);
            edge_by_directed_port.insert((e.from_node.clone(), Direction::Output, e.from_slot), i);
            edge_by_directed_port.insert((e.to_node.clone(), Direction::Input, e.to_slot), i);
        }
        Self { nodes, edges, node_index, edge_index, edges_by_node, edge_by_directed_port, groups }
    }

    /// Looks up a node's position in [`Self::nodes`] by id.
    #[must_use]
    pub fn node_index(&self, id: &NodeId) -> Option<usize> {
        self.node_index.get(id).copied()
    }

    /// Looks up an edge's position in [`Self::edges`] by id.
    #[must_use]
    pub fn edge_index(&self, id: &EdgeId) -> Option<usize> {
        self.edge_index.get(id).copied()
    }

    /// Every edge incident to `node` (as either endpoint), in insertion order.
    #[must_use]
    pub fn edges_of_node(&self, node: &NodeId) -> &[usize] {
        self.edges_by_node.get(node).map_or(&[], Vec::as_slice)
    }

    /// The edge connected to a specific directed port, if any.
    #[must_use]
    pub fn edge_at_port(&self, node: &NodeId, direction: Direction, slot: usize) -> Option<usize> {
        self.edge_by_directed_port.get(&(node.clone(), direction, slot)).copied()
    }
}
