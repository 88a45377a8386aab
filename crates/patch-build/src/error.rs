//! Collected build failures (`BUILD_*`).
//!
//! Build never fails fast: every node and edge is checked, and every
//! violation found is returned together so a caller can report the whole
//! graph's problems in one pass.

use patch_core::{Direction, EdgeId, NodeId};
use thiserror::Error;

/// One violation found while compiling a snapshot.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// A node's `type` isn't registered.
    #[error("node `{node}` has unknown type `{type_key}`")]
    UnknownNodeType {
        /// The offending node.
        node: NodeId,
        /// The unregistered type key.
        type_key: String,
    },
    /// An edge endpoint's slot is out of range for its node's layout.
    #[error("edge `{edge}` references invalid {direction:?} slot {slot} on node `{node}`")]
    PortSlotInvalid {
        /// The offending edge.
        edge: EdgeId,
        /// The offending node.
        node: NodeId,
        /// Which side of the edge this is.
        direction: Direction,
        /// The out-of-range slot.
        slot: usize,
    },
    /// An edge endpoint resolved to a node with no ports at all on the
    /// required side (e.g. a sink node used as an edge source).
    #[error("edge `{edge}` connects {direction:?} on node `{node}`, which has no ports on that side")]
    SameDirection {
        /// The offending edge.
        edge: EdgeId,
        /// The offending node.
        node: NodeId,
        /// The side that has no ports.
        direction: Direction,
    },
    /// The two endpoints' registry-declared roles disagree.
    #[error("edge `{0}` connects ports whose roles disagree")]
    RoleMismatch(EdgeId),
    /// Two edges target the same directed port.
    #[error("port `{node}`/{direction:?}/{slot}` already has a connected edge")]
    PortAlreadyConnected {
        /// The contended node.
        node: NodeId,
        /// Which side.
        direction: Direction,
        /// The contended slot.
        slot: usize,
    },
    /// No delay entry was supplied for an edge (the caller must route before compiling).
    #[error("edge `{0}` has no routed delay")]
    MissingDelay(EdgeId),
    /// A group-node instance references an unknown `groupRef`, or a
    /// mapping inside a `GroupDefinition` targets a nonexistent internal port.
    #[error("group mapping invalid for node `{node}`: {reason}")]
    GroupMappingInvalid {
        /// The group-node instance.
        node: NodeId,
        /// Human-readable detail.
        reason: String,
    },
}

impl BuildError {
    /// Stable machine-readable error code (`BUILD_*`).
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnknownNodeType { .. } => "BUILD_UNKNOWN_NODE_TYPE",
            Self::PortSlotInvalid { .. } => "BUILD_PORT_SLOT_INVALID",
            Self::SameDirection { .. } => "BUILD_SAME_DIRECTION",
            Self::RoleMismatch(_) => "BUILD_ROLE_MISMATCH",
            Self::PortAlreadyConnected { .. } => "BUILD_PORT_ALREADY_CONNECTED",
            Self::MissingDelay(_) => "BUILD_MISSING_DELAY",
            Self::GroupMappingInvalid { .. } => "BUILD_GROUP_MAPPING_INVALID",
        }
    }
}
