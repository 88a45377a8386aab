//! Deterministic orthogonal routing and tick-delay derivation.
//!
//! `patch-routing` is a pure function over `(snapshot, registry, config)`:
//! given where nodes sit and how edges connect their ports, it produces a
//! grid-integer polyline, an SVG path, and a total length per edge. It knows
//! nothing about scheduling, audio, or the editor — only geometry.
//!
//! # Example
//!
//! ```rust
//! use patch_model::{EdgeRecord, GraphSnapshot, NodeParams, NodeRecord, PortAddr};
//! use patch_registry::NodeRegistry;
//! use patch_routing::{RoutingConfig, route_edge};
//!
//! let registry = NodeRegistry::new().unwrap();
//! let mut snapshot = GraphSnapshot::new();
//! snapshot.nodes.push(NodeRecord {
//!     id: "p1".into(), type_key: "pulse".into(), position: patch_core::GridPoint::new(0, 0),
//!     rotation: patch_core::Rotation::Deg0, params: NodeParams::new(1), name: None, group_ref: None,
//! });
//! snapshot.nodes.push(NodeRecord {
//!     id: "o1".into(), type_key: "output".into(), position: patch_core::GridPoint::new(5, 0),
//!     rotation: patch_core::Rotation::Deg0, params: NodeParams::new(1), name: None, group_ref: None,
//! });
//! let edge = EdgeRecord { id: "e1".into(), from: PortAddr::new("p1", 0), to: PortAddr::new("o1", 0), corners: vec![] };
//!
//! let result = route_edge(&snapshot, &registry, &edge, &RoutingConfig::default()).unwrap();
//! assert!(result.total_length > 0.0);
//! ```

mod anchor;
mod cache;
mod config;
mod error;
mod path;
mod placements;

pub use anchor::{footprint_extent, port_anchor, rotate_point, rotate_vector, stub_end};
pub use cache::RouteCache;
pub use config::{BendPreference, RoutingConfig};
pub use error::RouteError;
pub use path::{RouteResult, route_edge};
pub use placements::node_placements;
