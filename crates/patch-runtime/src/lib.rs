//! Tick-accurate event simulation: control-first ordering, windowed
//! lookahead, per-node deterministic RNG, and live patching.
//!
//! `patch-runtime` is the only stateful core crate: it owns the pending
//! event schedule and every node's live `param`/state/RNG cursor. Everything
//! upstream (`patch-model`, `patch-routing`, `patch-build`) is pure; this is
//! where the engine actually runs.
//!
//! # Example
//!
//! ```rust
//! use patch_core::EdgeId;
//! use patch_model::{EdgeRecord, GraphSnapshot, NodeParams, NodeRecord, PortAddr};
//! use patch_registry::NodeRegistry;
//! use patch_runtime::{Runtime, RuntimeConfig};
//! use std::collections::HashMap;
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
//! let outcome = patch_build::compile(&snapshot, &registry, &delays);
//! let graph = outcome.value.unwrap();
//!
//! let mut runtime = Runtime::new(&graph, &registry, RuntimeConfig::default());
//! runtime.reset_pulses();
//! let (outputs, _warnings) = runtime.query_window(0.0, 10.0);
//! assert!(!outputs.is_empty());
//! ```

mod output;
mod patch;
mod runtime;
mod scheduler;
mod warning;

pub use output::{OutputEvent, ThumbState};
pub use patch::Patch;
pub use runtime::{Runtime, RuntimeConfig};
pub use scheduler::{RuntimeEvent, Scheduler};
pub use warning::RuntimeWarning;
