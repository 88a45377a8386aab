//! Group definitions: user-defined subgraphs exposed through mapped ports.

use crate::edge::PortAddr;
use crate::snapshot::GraphSnapshot;

/// Maps one external group-node port to an internal port inside the group's
/// sub-snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct GroupPortMapping {
    /// Internal port this external slot projects to/from.
    pub internal: PortAddr,
}

/// A user-defined subgraph, instantiated by `group`-type nodes that carry a
/// matching `groupRef`.
///
/// `snapshot` must not itself contain group definitions — groups do not
/// nest. This is enforced by `patch-model`'s op validation
/// (`addGroup` rejects a sub-snapshot whose `groups` map is non-empty), not
/// by the type system, since `GraphSnapshot` is reused for both the
/// top-level document and a group's interior for schema simplicity.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GroupDefinition {
    /// Stable identifier, referenced by `NodeRecord::group_ref`.
    pub id: String,
    /// The group's interior nodes and edges.
    pub snapshot: GraphSnapshot,
    /// Ordered external signal inputs, placed on the left edge.
    #[serde(default)]
    pub inputs: Vec<GroupPortMapping>,
    /// Ordered external outputs, placed on the right edge.
    #[serde(default)]
    pub outputs: Vec<GroupPortMapping>,
    /// Ordered external control inputs, appended after signal inputs on the
    /// left edge.
    #[serde(default)]
    pub controls: Vec<GroupPortMapping>,
}

impl GroupDefinition {
    /// `true` if the interior snapshot carries no nested group definitions.
    #[must_use]
    pub fn is_flat(&self) -> bool {
        self.snapshot.groups.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::GraphSnapshot;

    #[test]
    fn rejects_nesting_via_is_flat() {
        let mut inner = GraphSnapshot::default();
        inner.groups.insert("nested".to_string(), GroupDefinition {
            id: "nested".to_string(),
            snapshot: GraphSnapshot::default(),
            inputs: vec![],
            outputs: vec![],
            controls: vec![],
        });
        let group = GroupDefinition { id: "g".to_string(), snapshot: inner, inputs: vec![], outputs: vec![], controls: vec![] };
        assert!(!group.is_flat());
    }
}
