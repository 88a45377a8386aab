//! Node records: the persisted shape of a single graph node.

use patch_core::{GridPoint, NodeId, Rotation};

/// A node's parameter map.
///
/// Currently one key, `param` ∈ 1..=8; kept as its own struct (rather than a
/// bare `i32` field on [`NodeRecord`]) so a future extension point — more
/// named params — doesn't require widening `NodeRecord` itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct NodeParams {
    /// The node's single integer parameter, clamped to `1..=8` at the build
    /// boundary (the model itself does not clamp on write, only build does).
    pub param: i32,
}

impl NodeParams {
    /// Constructs a params map with the given `param` value.
    #[must_use]
    pub fn new(param: i32) -> Self {
        Self { param }
    }
}

/// A node in the graph: stable identity, type, geometry, and parameters.
///
/// Ports are never stored on `NodeRecord` — they're derived on demand from
/// `type_key` (via the registry) plus `position`/`rotation`, per the
/// universal invariant that port ordering comes from the registry layout
/// alone.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct NodeRecord {
    /// Stable, author-supplied identifier.
    pub id: NodeId,
    /// Kebab-case type key; must exist in the registry for the node to build.
    #[serde(rename = "type")]
    pub type_key: String,
    /// Integer grid position of the node's anchor corner.
    pub position: GridPoint,
    /// Rotation in 90° steps.
    #[serde(default)]
    pub rotation: Rotation,
    /// Parameter overrides (merged over the registry default at build time).
    pub params: NodeParams,
    /// Optional display name set by the user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// For `type_key == "group"`, the group definition this instance projects.
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "groupRef")]
    pub group_ref: Option<String>,
}
