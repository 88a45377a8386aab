//! Model validation errors (`MODEL_*`).

use thiserror::Error;

/// One structural validation failure, stable and machine-matchable.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelErrorKind {
    /// A position or corner coordinate was not integral.
    #[error("coordinate is not an integer grid position")]
    InvalidPosition,
    /// `type` named a type the registry doesn't know.
    #[error("unknown node type `{0}`")]
    UnknownNodeType(String),
    /// The op's id collides with an existing node or edge id.
    #[error("duplicate id `{0}`")]
    DuplicateId(String),
    /// A referenced slot is out of range for the node's derived layout.
    #[error("port slot {slot} is out of range for node `{node}`")]
    PortInvalid {
        /// The offending node.
        node: String,
        /// The out-of-range slot.
        slot: usize,
    },
    /// An edge's `from`/`to` did not resolve to an output→input pair.
    #[error("edge endpoints are not output -> input")]
    EdgeDirectionInvalid,
    /// An edge endpoint referenced a node that doesn't exist.
    #[error("edge endpoint references a missing node `{0}`")]
    EdgeDanglingEndpoint(String),
    /// The target port already has an edge connected, direction-qualified.
    #[error("port ({node}, slot {slot}) is already connected")]
    PortAlreadyConnected {
        /// The contended node.
        node: String,
        /// The contended slot.
        slot: usize,
    },
    /// `rotation` was not one of `{0, 90, 180, 270}`.
    #[error("rotation {0} is not one of 0/90/180/270")]
    InvalidRotation(i32),
    /// `removeGroup` was attempted while a node still references that id.
    #[error("group `{0}` is still referenced by a node")]
    GroupRefInvalid(String),
    /// `addGroup` supplied a sub-snapshot that itself contains group
    /// definitions; groups do not nest.
    #[error("group `{0}` definition is not flat (contains nested groups)")]
    GroupNotFlat(String),
    /// An op referenced a node id that isn't in the graph.
    #[error("node `{0}` does not exist")]
    NodeNotFound(String),
    /// An op referenced an edge id that isn't in the graph.
    #[error("edge `{0}` does not exist")]
    EdgeNotFound(String),
    /// An op referenced a corner index that isn't in the edge's corner list.
    #[error("corner index {index} is out of range for edge `{edge}`")]
    CornerIndexInvalid {
        /// The offending edge.
        edge: String,
        /// The out-of-range index.
        index: usize,
    },
}

impl ModelErrorKind {
    /// Stable machine-readable error code (`MODEL_*`).
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidPosition => "MODEL_INVALID_POSITION",
            Self::UnknownNodeType(_) => "MODEL_UNKNOWN_NODE_TYPE",
            Self::DuplicateId(_) => "MODEL_DUPLICATE_ID",
            Self::PortInvalid { .. } => "MODEL_PORT_INVALID",
            Self::EdgeDirectionInvalid => "MODEL_EDGE_DIRECTION_INVALID",
            Self::EdgeDanglingEndpoint(_) => "MODEL_EDGE_DANGLING_ENDPOINT",
            Self::PortAlreadyConnected { .. } => "MODEL_PORT_ALREADY_CONNECTED",
            Self::InvalidRotation(_) => "MODEL_INVALID_ROTATION",
            Self::GroupRefInvalid(_) => "MODEL_GROUP_REF_INVALID",
            Self::GroupNotFlat(_) => "MODEL_GROUP_NOT_FLAT",
            Self::NodeNotFound(_) => "MODEL_NODE_NOT_FOUND",
            Self::EdgeNotFound(_) => "MODEL_EDGE_NOT_FOUND",
            Self::CornerIndexInvalid { .. } => "MODEL_CORNER_INDEX_INVALID",
        }
    }
}

/// A single validation failure, tagged with where in the batch it occurred.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("op[{op_index}] ({op_type}): {kind}")]
pub struct OpError {
    /// Index of the failing op within the submitted batch.
    pub op_index: usize,
    /// The op's variant name (`"addNode"`, `"moveNode"`, ...).
    pub op_type: &'static str,
    /// The entity id the op targeted, if any.
    pub entity_id: Option<String>,
    /// The underlying validation failure.
    pub kind: ModelErrorKind,
}

impl OpError {
    /// The stable `MODEL_*` code of the underlying failure.
    #[must_use]
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }
}
