//! Non-fatal runtime diagnostics (`RUNTIME_*`).
//!
//! Nothing in this crate fails a call outright: a malformed or stale event
//! is dropped (or clamped) and reported here, so a window query always
//! returns whatever it could process plus an explanation of what it
//! couldn't.

use patch_core::{EdgeId, NodeId};

/// One non-fatal condition observed while processing a window or patch.
#[derive(Debug, Clone, PartialEq)]
pub enum RuntimeWarning {
    /// An event referenced a node id no longer present in the graph.
    MissingNode {
        /// The absent node.
        node: NodeId,
    },
    /// An event referenced an edge id no longer present in the graph.
    MissingEdge {
        /// The absent edge.
        edge: EdgeId,
    },
    /// A patch added a node whose `type` isn't in the registry; the add
    /// was skipped.
    UnknownType {
        /// The node that would have been added.
        node: NodeId,
        /// The unrecognised type key.
        type_key: String,
    },
    /// An emitted value, speed, or param fell outside `1..=8` and was
    /// clamped back into range before scheduling.
    ValueClamped {
        /// The node whose `onSignal`/`onControl` produced the value.
        node: NodeId,
        /// Human-readable description of what was clamped.
        detail: String,
    },
    /// The scheduler's soft cap was exceeded; processing continued.
    QueueOverflow {
        /// Event count at the time the cap was exceeded.
        pending: usize,
    },
    /// A new event's target tick was at or behind the window already
    /// being closed out; scheduled anyway (ring/heap accept past-due
    /// entries) but flagged since it indicates a delay of zero or a
    /// clock regression upstream.
    LateEvent {
        /// The node the event targets.
        node: NodeId,
        /// The tick it was scheduled for.
        tick: f64,
    },
}

impl RuntimeWarning {
    /// Stable machine-readable code (`RUNTIME_*`).
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingNode { .. } => "RUNTIME_MISSING_NODE",
            Self::MissingEdge { .. } => "RUNTIME_MISSING_EDGE",
            Self::UnknownType { .. } => "RUNTIME_UNKNOWN_TYPE",
            Self::ValueClamped { .. } => "RUNTIME_VALUE_CLAMPED",
            Self::QueueOverflow { .. } => "RUNTIME_QUEUE_OVERFLOW",
            Self::LateEvent { .. } => "RUNTIME_LATE_EVENT",
        }
    }
}
