//! `GraphSnapshot`: the cheaply-cloned, insertion-ordered view of a graph.

use std::collections::BTreeMap;

use crate::edge::EdgeRecord;
use crate::group::GroupDefinition;
use crate::node::NodeRecord;

/// Nodes, edges, and group definitions in insertion order.
///
/// This is the shape persisted verbatim as `graph` in project JSON (§6) and
/// returned by [`crate::GraphModel::snapshot`]. Array order is preserved on
/// both serialization and deserialization.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GraphSnapshot {
    /// Nodes in insertion order.
    #[serde(default)]
    pub nodes: Vec<NodeRecord>,
    /// Edges in insertion order.
    #[serde(default)]
    pub edges: Vec<EdgeRecord>,
    /// Group definitions keyed by id. `BTreeMap` gives a deterministic
    /// serialized key order, matching the determinism requirements §8
    /// places on everything downstream of the model.
    #[serde(default)]
    pub groups: BTreeMap<String, GroupDefinition>,
}

impl GraphSnapshot {
    /// An empty snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_snapshot_round_trips() {
        let snap = GraphSnapshot::new();
        let json = serde_json::to_string(&snap).unwrap();
        let back: GraphSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snap);
    }
}
