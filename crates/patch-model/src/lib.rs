//! Canonical graph topology/geometry store for the patchgraph engine.
//!
//! `GraphModel` holds nodes, edges, manual corners, and group definitions;
//! applies batched ops transactionally (`apply_ops`); and maintains
//! always-current derived indices (`indices`). It is the single writer of
//! graph state — `patch-routing`, `patch-build`, and `patch-runtime` are all
//! pure consumers of the `GraphSnapshot` it produces.
//!
//! # Example
//!
//! ```rust
//! use patch_core::Direction;
//! use patch_model::{EdgeEndpoint, GraphModel, Op};
//! use patch_registry::NodeRegistry;
//!
//! let registry = NodeRegistry::new().unwrap();
//! let mut model = GraphModel::new(&registry);
//! let result = model.apply_ops(&[
//!     Op::AddNode { id: "p1".into(), type_key: "pulse".into(), x: 0.0, y: 0.0, rotation: 0, param: 1, name: None, group_ref: None },
//!     Op::AddNode { id: "o1".into(), type_key: "output".into(), x: 2.0, y: 0.0, rotation: 0, param: 1, name: None, group_ref: None },
//!     Op::AddEdge {
//!         id: "e1".into(),
//!         from: EdgeEndpoint::new("p1", Direction::Output, 0),
//!         to: EdgeEndpoint::new("o1", Direction::Input, 0),
//!         corners: vec![],
//!     },
//! ]);
//! assert!(result.ok);
//! ```

mod edge;
mod error;
mod group;
mod indices;
mod model;
mod node;
mod ops;
mod snapshot;

pub use edge::{EdgeRecord, PortAddr};
pub use error::{ModelErrorKind, OpError};
pub use group::{GroupDefinition, GroupPortMapping};
pub use indices::GraphIndexes;
pub use model::GraphModel;
pub use node::{NodeParams, NodeRecord};
pub use ops::{ApplyResult, EdgeEndpoint, Op};
pub use snapshot::GraphSnapshot;
