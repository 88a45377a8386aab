//! Derived indices over a `GraphSnapshot`, always kept consistent with it.
//!
//! Indices are updated inside the same transaction that mutates the backing
//! records — there is no lazy rebuild path. `GraphModel` is the only writer;
//! everything else gets a `&GraphIndexes`.

use std::collections::HashMap;

use patch_core::{Direction, EdgeId, NodeId};

use crate::snapshot::GraphSnapshot;

/// Always-current derived indices over a graph's nodes and edges.
#[derive(Debug, Clone, Default)]
pub struct GraphIndexes {
    node_by_id: HashMap<NodeId, usize>,
    edge_by_id: HashMap<EdgeId, usize>,
    port_to_edge: HashMap<(NodeId, Direction, usize), EdgeId>,
    edges_by_node: HashMap<NodeId, Vec<EdgeId>>,
}

impl GraphIndexes {
    /// Rebuilds a fresh index set from a snapshot, in the snapshot's
    /// insertion order.
    #[must_use]
    pub fn build(snapshot: &GraphSnapshot) -> Self {
        let mut indices = Self::default();
        for (i, node) in snapshot.nodes.iter().enumerate() {
            indices.node_by_id.insert(node.id.clone(), i);
        }
        for (i, edge) in snapshot.edges.iter().enumerate() {
            indices.edge_by_id.insert(edge.id.clone(), i);
            indices.port_to_edge.insert((edge.from.node.clone(), Direction::Output, edge.from.slot), edge.id.clone());
            indices.port_to_edge.insert((edge.to.node.clone(), Direction::Input, edge.to.slot), edge.id.clone());
            indices.edges_by_node.entry(edge.from.node.clone()).or_default().push(edge.id.clone());
            indices.edges_by_node.entry(edge.to.node.clone()).or_default().push(edge.id.clone());
        }
        indices
    }

    /// Index of a node by id, if present.
    #[must_use]
    pub fn node_index(&self, id: &NodeId) -> Option<usize> {
        self.node_by_id.get(id).copied()
    }

    /// Index of an edge by id, if present.
    #[must_use]
    pub fn edge_index(&self, id: &EdgeId) -> Option<usize> {
        self.edge_by_id.get(id).copied()
    }

    /// The edge connected to a directed port, if any.
    #[must_use]
    pub fn edge_at_port(&self, node: &NodeId, direction: Direction, slot: usize) -> Option<&EdgeId> {
        self.port_to_edge.get(&(node.clone(), direction, slot))
    }

    /// All edges incident to a node, in insertion order, preserving
    /// duplicates if a self-loop connects a node to itself on both ends.
    #[must_use]
    pub fn edges_of_node(&self, id: &NodeId) -> &[EdgeId] {
        self.edges_by_node.get(id).map_or(&[], Vec::as_slice)
    }

    pub(crate) fn insert_node(&mut self, id: NodeId, index: usize) {
        self.node_by_id.insert(id, index);
    }

    pub(crate) fn remove_node(&mut self, id: &NodeId) {
        if let Some(removed) = self.node_by_id.remove(id) {
            for idx in self.node_by_id.values_mut() {
                if *idx > removed {
                    *idx -= 1;
                }
            }
        }
        self.edges_by_node.remove(id);
    }

    pub(crate) fn insert_edge(&mut self, id: EdgeId, index: usize, from: (NodeId, usize), to: (NodeId, usize)) {
        self.edge_by_id.insert(id.clone(), index);
        self.port_to_edge.insert((from.0.clone(), Direction::Output, from.1), id.clone());
        self.port_to_edge.insert((to.0.clone(), Direction::Input, to.1), id.clone());
        self.edges_by_node.entry(from.0).or_default().push(id.clone());
        self.edges_by_node.entry(to.0).or_default().push(id);
    }

    pub(crate) fn remove_edge(&mut self, id: &EdgeId, from: (NodeId, usize), to: (NodeId, usize)) {
        if let Some(removed) = self.edge_by_id.remove(id) {
            for idx in self.edge_by_id.values_mut() {
                if *idx > removed {
                    *idx -= 1;
                }
            }
        }
        self.port_to_edge.remove(&(from.0.clone(), Direction::Output, from.1));
        self.port_to_edge.remove(&(to.0.clone(), Direction::Input, to.1));
        if let Some(list) = self.edges_by_node.get_mut(&from.0) {
            list.retain(|e| e != id);
        }
        if let Some(list) = self.edges_by_node.get_mut(&to.0) {
            list.retain(|e| e != id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edge::{EdgeRecord, PortAddr};
    use crate::node::{NodeParams, NodeRecord};
    use patch_core::{GridPoint, Rotation};

    fn node(id: &str) -> NodeRecord {
        NodeRecord {
            id: NodeId::from(id),
            type_key: "pulse".to_string(),
            position: GridPoint::new(0, 0),
            rotation: Rotation::Deg0,
            params: NodeParams::new(1),
            name: None,
            group_ref: None,
        }
    }

    #[test]
    fn build_indexes_nodes_and_edges() {
        let mut snap = GraphSnapshot::new();
        snap.nodes.push(node("a"));
        snap.nodes.push(node("b"));
        snap.edges.push(EdgeRecord {
            id: EdgeId::from("e1"),
            from: PortAddr::new("a", 0),
            to: PortAddr::new("b", 0),
            corners: vec![],
        });
        let indices = GraphIndexes::build(&snap);
        assert_eq!(indices.node_index(&NodeId::from("a")), Some(0));
        assert_eq!(indices.node_index(&NodeId::from("b")), Some(1));
        assert_eq!(indices.edge_at_port(&NodeId::from("a"), Direction::Output, 0), Some(&EdgeId::from("e1")));
        assert_eq!(indices.edges_of_node(&NodeId::from("a")), &[EdgeId::from("e1")]);
    }
}
