//! Cross-validates a graph snapshot into a flattened, immutable,
//! runtime-ready [`CompiledGraph`].
//!
//! `patch-build` is a pure function over `(snapshot, registry, delays)` —
//! it never mutates the editor graph, and a failed compile leaves the
//! caller free to keep running its last-valid graph. Delays are supplied
//! by the caller (typically `patch-routing::RouteCache::route_batch`'s
//! successful entries), since routing and compiling are independent
//! concerns over the same snapshot.
//!
//! # Example
//!
//! ```rust
//! use std::collections::HashMap;
//!
//! use patch_core::EdgeId;
//! use patch_model::{EdgeRecord, GraphSnapshot, NodeParams, NodeRecord, PortAddr};
//! use patch_registry::NodeRegistry;
//!
//! let registry = NodeRegistry::new().unwrap();
//! let mut snapshot = GraphSnapshot::new();
//! snapshot.nodes.push(NodeRecord {
//!     id: "p1".into(), type_key: "pulse".into(), position: patch_core::GridPoint::new(0, 0),
//!     rotation: patch_core::Rotation::Deg0, params: NodeParams::new(1), name: None, group_ref: None,
//! });
//! snapshot.nodes.push(NodeRecord {
//!     id: "o1".into(), type_key: "output".into(), position: patch_core::GridPoint::new(2, 0),
//!     rotation: patch_core::Rotation::Deg0, params: NodeParams::new(1), name: None, group_ref: None,
//! });
//! snapshot.edges.push(EdgeRecord { id: "e1".into(), from: PortAddr::new("p1", 0), to: PortAddr::new("o1", 0), corners: vec![] });
//!
//! let mut delays = HashMap::new();
//! delays.insert(EdgeId::from("e1"), 2.0);
//!
//! let outcome = patch_build::compile(&snapshot, &registry, &delays);
//! assert!(outcome.ok);
//! ```

mod compile;
mod error;
mod graph;

pub use compile::{BuildOutcome, compile};
pub use error::BuildError;
pub use graph::{CompiledEdge, CompiledGraph, CompiledNode, GroupMeta};
