//! An incremental graph diff applied directly to a live [`crate::Runtime`],
//! without a full recompile.

use std::collections::HashMap;

use patch_build::{CompiledEdge, CompiledNode};
use patch_core::{EdgeId, NodeId};

/// One incremental change to apply to a running graph.
///
/// Fields are processed in the order listed in [`crate::Runtime::apply_patch`]:
/// removals first, then additions, then in-place updates. A caller
/// typically builds this from the difference between two successive
/// `GraphModel` snapshots, coalescing rapid edits (e.g. a cable drag) into
/// one `Patch` rather than applying each intermediate step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Patch {
    /// Nodes to remove, along with every event in flight for them.
    pub removed_nodes: Vec<NodeId>,
    /// Edges to remove, along with every event in flight along them.
    pub removed_edges: Vec<EdgeId>,
    /// Nodes to splice in.
    pub added_nodes: Vec<CompiledNode>,
    /// Edges to splice in.
    pub added_edges: Vec<CompiledEdge>,
    /// `param` overwrites for existing live nodes.
    pub updated_params: HashMap<NodeId, i32>,
    /// Delay overwrites for existing live edges, paired with the upper
    /// bound of the audio lookahead window currently in flight — in-flight
    /// events on the edge are only rescheduled if their new tick lands
    /// strictly outside that window.
    pub updated_edges: HashMap<EdgeId, (f64, f64)>,
}
