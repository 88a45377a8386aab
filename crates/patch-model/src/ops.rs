//! Model ops: the only way a `GraphModel`'s state changes.

use patch_core::{Direction, EdgeId, NodeId};

use crate::group::GroupDefinition;

/// One endpoint of an `addEdge` op, direction-qualified so the model can
/// detect a reversed connection (`MODEL_EDGE_DIRECTION_INVALID`) rather than
/// assuming callers already got it right.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct EdgeEndpoint {
    /// Owning node.
    pub node: NodeId,
    /// Declared direction of this endpoint.
    pub direction: Direction,
    /// Zero-based port slot.
    pub slot: usize,
}

impl EdgeEndpoint {
    /// Constructs an endpoint.
    #[must_use]
    pub fn new(node: impl Into<NodeId>, direction: Direction, slot: usize) -> Self {
        Self { node: node.into(), direction, slot }
    }
}

/// A single structural change to a `GraphModel`.
///
/// Position-bearing ops carry raw `f64` coordinates rather than `GridPoint`
/// directly: the editor emits drag deltas that may be off-grid mid-gesture,
/// and the model — not the caller — is responsible for rejecting non-integer
/// positions (`MODEL_INVALID_POSITION`) rather than silently rounding them.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum Op {
    /// Creates a node.
    AddNode {
        /// New node id; must not collide with an existing node or edge id.
        id: NodeId,
        /// Registry type key.
        #[serde(rename = "type")]
        type_key: String,
        /// Grid x coordinate.
        x: f64,
        /// Grid y coordinate.
        y: f64,
        /// Rotation in degrees; must be one of 0/90/180/270.
        #[serde(default)]
        rotation: i32,
        /// Initial `param` value.
        #[serde(default = "default_param")]
        param: i32,
        /// Optional display name.
        #[serde(default)]
        name: Option<String>,
        /// For `type == "group"`, the group definition id.
        #[serde(default, rename = "groupRef")]
        group_ref: Option<String>,
    },
    /// Removes a node, cascading to its incident edges.
    RemoveNode {
        /// Target node.
        id: NodeId,
    },
    /// Moves a node to a new grid position.
    MoveNode {
        /// Target node.
        id: NodeId,
        /// New grid x coordinate.
        x: f64,
        /// New grid y coordinate.
        y: f64,
    },
    /// Rotates a node.
    RotateNode {
        /// Target node.
        id: NodeId,
        /// New rotation in degrees.
        rotation: i32,
    },
    /// Overwrites a node's `param`.
    SetParam {
        /// Target node.
        id: NodeId,
        /// New `param` value; stored as-is (clamping happens at build time).
        param: i32,
    },
    /// Overwrites a node's display name.
    RenameNode {
        /// Target node.
        id: NodeId,
        /// New display name, or `None` to clear it.
        name: Option<String>,
    },
    /// Creates an edge between two ports.
    AddEdge {
        /// New edge id; must not collide with an existing node or edge id.
        id: EdgeId,
        /// Source endpoint; must be `Direction::Output`.
        from: EdgeEndpoint,
        /// Destination endpoint; must be `Direction::Input`.
        to: EdgeEndpoint,
        /// Manual corners, in order.
        #[serde(default)]
        corners: Vec<(f64, f64)>,
    },
    /// Removes an edge.
    RemoveEdge {
        /// Target edge.
        id: EdgeId,
    },
    /// Inserts a manual corner at `index`.
    AddCorner {
        /// Target edge.
        edge: EdgeId,
        /// Insertion index into the corner list.
        index: usize,
        /// Grid x coordinate.
        x: f64,
        /// Grid y coordinate.
        y: f64,
    },
    /// Moves an existing manual corner.
    MoveCorner {
        /// Target edge.
        edge: EdgeId,
        /// Index of the corner to move.
        index: usize,
        /// New grid x coordinate.
        x: f64,
        /// New grid y coordinate.
        y: f64,
    },
    /// Removes a manual corner.
    RemoveCorner {
        /// Target edge.
        edge: EdgeId,
        /// Index of the corner to remove.
        index: usize,
    },
    /// Registers a group definition (does not itself create a node or
    /// rewire edges — grouping is composed externally from this plus
    /// `AddNode`/`RemoveNode`/`RemoveEdge`/`AddEdge`).
    AddGroup {
        /// The definition to register.
        definition: GroupDefinition,
    },
    /// Removes a group definition.
    RemoveGroup {
        /// Target group id.
        id: String,
    },
}

fn default_param() -> i32 {
    1
}

impl Op {
    /// The op's stable variant name, used in `OpError::op_type`.
    #[must_use]
    pub fn op_type(&self) -> &'static str {
        match self {
            Op::AddNode { .. } => "addNode",
            Op::RemoveNode { .. } => "removeNode",
            Op::MoveNode { .. } => "moveNode",
            Op::RotateNode { .. } => "rotateNode",
            Op::SetParam { .. } => "setParam",
            Op::RenameNode { .. } => "renameNode",
            Op::AddEdge { .. } => "addEdge",
            Op::RemoveEdge { .. } => "removeEdge",
            Op::AddCorner { .. } => "addCorner",
            Op::MoveCorner { .. } => "moveCorner",
            Op::RemoveCorner { .. } => "removeCorner",
            Op::AddGroup { .. } => "addGroup",
            Op::RemoveGroup { .. } => "removeGroup",
        }
    }

    /// The primary entity id the op targets, for error reporting.
    #[must_use]
    pub fn entity_id(&self) -> Option<String> {
        match self {
            Op::AddNode { id, .. } | Op::RemoveNode { id } | Op::MoveNode { id, .. } | Op::RotateNode { id, .. } | Op::SetParam { id, .. } | Op::RenameNode { id, .. } => {
                Some(id.to_string())
            }
            Op::AddEdge { id, .. } | Op::RemoveEdge { id } => Some(id.to_string()),
            Op::AddCorner { edge, .. } | Op::MoveCorner { edge, .. } | Op::RemoveCorner { edge, .. } => Some(edge.to_string()),
            Op::AddGroup { definition } => Some(definition.id.clone()),
            Op::RemoveGroup { id } => Some(id.clone()),
        }
    }
}

/// Outcome of `GraphModel::apply_ops`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyResult {
    /// `true` if the whole batch committed.
    pub ok: bool,
    /// `true` if the batch committed and was non-empty.
    pub changed: bool,
    /// Every validation failure found, across the whole batch
    /// (collect-all, not fail-fast).
    pub errors: Vec<crate::error::OpError>,
}
