//! Per-edge routing failures (`ROUTE_*`).
//!
//! Routing never falls back silently: a failed edge produces no geometry
//! and no delay, and the failure is reported next to every successfully
//! routed edge in the same batch.

use patch_core::{EdgeId, NodeId};
use thiserror::Error;

/// One edge's routing failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RouteError {
    /// An endpoint referenced a node that doesn't exist in the snapshot.
    #[error("edge `{edge}` references missing node `{node}`")]
    MissingNode {
        /// The offending edge.
        edge: EdgeId,
        /// The missing node.
        node: NodeId,
    },
    /// The edge id itself wasn't found (only relevant to `route_batch`'s
    /// changed-edge set referencing a stale id).
    #[error("edge `{0}` does not exist")]
    MissingEdge(EdgeId),
    /// An endpoint's slot is out of range for its node's derived layout.
    #[error("edge `{edge}` references invalid port slot {slot} on node `{node}`")]
    InvalidPort {
        /// The offending edge.
        edge: EdgeId,
        /// The offending node.
        node: NodeId,
        /// The out-of-range slot.
        slot: usize,
    },
    /// Anchor derivation failed (e.g. a `group` node instance with no
    /// resolvable group definition).
    #[error("edge `{edge}` could not derive a port anchor on node `{node}`")]
    AnchorFail {
        /// The offending edge.
        edge: EdgeId,
        /// The offending node.
        node: NodeId,
    },
    /// An invariant the algorithm itself assumes was violated.
    #[error("edge `{0}` hit an internal routing error: {1}")]
    Internal(EdgeId, String),
}

impl RouteError {
    /// Stable machine-readable error code (`ROUTE_*`).
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingNode { .. } => "ROUTE_MISSING_NODE",
            Self::MissingEdge(_) => "ROUTE_MISSING_EDGE",
            Self::InvalidPort { .. } => "ROUTE_INVALID_PORT",
            Self::AnchorFail { .. } => "ROUTE_ANCHOR_FAIL",
            Self::Internal(..) => "ROUTE_INTERNAL_ERROR",
        }
    }

    /// The edge this failure applies to.
    #[must_use]
    pub fn edge_id(&self) -> &EdgeId {
        match self {
            Self::MissingNode { edge, .. } | Self::InvalidPort { edge, .. } | Self::AnchorFail { edge, .. } => edge,
            Self::MissingEdge(edge) | Self::Internal(edge, _) => edge,
        }
    }
}
