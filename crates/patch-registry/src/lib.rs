//! Static node-type catalog for the patchgraph engine.
//!
//! `NodeRegistry` is the leaf of the engine's data flow: it has no
//! knowledge of graph topology, routing, or scheduling, only the shape and
//! pure behavior of each node type. Everything downstream (`patch-model`,
//! `patch-build`, `patch-runtime`) holds a `&NodeRegistry` rather than
//! constructing its own.
//!
//! # Example
//!
//! ```rust
//! use patch_registry::NodeRegistry;
//!
//! let registry = NodeRegistry::new().expect("builtin catalog validates");
//! let pulse = registry.get("pulse").expect("pulse is a builtin type");
//! assert_eq!(pulse.default_param, 1);
//! ```

mod archetype;
mod builtins;
mod ctx;
mod descriptor;
mod error;
mod registry;

pub use archetype::{Archetype, GroupPorts, PortPlacement, group_port_placements, port_placements};
pub use ctx::{
    ControlOutcome, NodeCtx, NodeRng, NodeState, OutputPulse, ParamOverlay, Pulse, SignalOutcome, seed_for_node,
};
pub use descriptor::{Behavior, GeneratorSpec, MappingTable, NodeDescriptor, ParamMap};
pub use error::RegistryError;
pub use registry::NodeRegistry;
