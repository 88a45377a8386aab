//! Results a window query (or a thumb snapshot) hands back to the caller.

use patch_core::{EdgeId, NodeId};
use patch_registry::ParamOverlay;

/// One pulse that reached an `output` node during a `query_window` call.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputEvent {
    /// The tick it arrived at.
    pub tick: f64,
    /// The `output` node it arrived at.
    pub node: NodeId,
    /// The pulse's value, already clamped to `1..=8`.
    pub value: i32,
    /// Any effect-parameter overlay carried along with it.
    pub params: Option<ParamOverlay>,
}

/// A snapshot of one in-flight pulse's progress along a cable, for the
/// editor's animated "thumb" UI.
#[derive(Debug, Clone, PartialEq)]
pub struct ThumbState {
    /// The cable the pulse is travelling along.
    pub edge: EdgeId,
    /// Fraction of the cable's effective delay travelled, clamped to `[0, 1]`.
    pub progress: f64,
    /// The pulse's speed.
    pub speed: i32,
    /// The tick the pulse was emitted at, if known.
    pub emit_tick: Option<f64>,
}
