//! `GraphModel`: authoritative in-memory state, op application, and indices.

use patch_core::{Direction, GridPoint, NodeId, Rotation};
use patch_registry::NodeRegistry;

use crate::edge::{EdgeRecord, PortAddr};
use crate::error::{ModelErrorKind, OpError};
use crate::indices::GraphIndexes;
use crate::node::{NodeParams, NodeRecord};
use crate::ops::{ApplyResult, Op};
use crate::snapshot::GraphSnapshot;

fn to_grid_point(x: f64, y: f64) -> Result<GridPoint, ModelErrorKind> {
    if x.fract() != 0.0 || y.fract() != 0.0 {
        return Err(ModelErrorKind::InvalidPosition);
    }
    Ok(GridPoint::new(x as i32, y as i32))
}

/// Total `(inputs, outputs)` port counts for a node, resolved through the
/// registry (or, for a `group` instance, through the referenced
/// `GroupDefinition`). `inputs` spans both signal and control slots, per the
/// universal port-ordering invariant.
fn port_counts(snapshot: &GraphSnapshot, registry: &NodeRegistry, node: &NodeRecord) -> Option<(usize, usize)> {
    if node.type_key == "group" {
        let group_id = node.group_ref.as_ref()?;
        let def = snapshot.groups.get(group_id)?;
        return Some((def.inputs.len() + def.controls.len(), def.outputs.len()));
    }
    let descriptor = registry.get(&node.type_key)?;
    Some((descriptor.inputs + descriptor.control_ports, descriptor.outputs))
}

/// Authoritative graph state: nodes, edges, group definitions, and their
/// derived indices, mutated only through `apply_ops`.
pub struct GraphModel<'a> {
    registry: &'a NodeRegistry,
    snapshot: GraphSnapshot,
    indices: GraphIndexes,
    subscribers: Vec<Box<dyn FnMut(&[Op]) + Send>>,
}

impl<'a> GraphModel<'a> {
    /// Constructs an empty model backed by the given registry.
    #[must_use]
    pub fn new(registry: &'a NodeRegistry) -> Self {
        Self { registry, snapshot: GraphSnapshot::new(), indices: GraphIndexes::default(), subscribers: Vec::new() }
    }

    /// A cheap clone of the current nodes/edges/groups, in insertion order.
    #[must_use]
    pub fn snapshot(&self) -> GraphSnapshot {
        self.snapshot.clone()
    }

    /// The always-current derived indices.
    #[must_use]
    pub fn indices(&self) -> &GraphIndexes {
        &self.indices
    }

    /// Registers a callback invoked with the accepted op list after each
    /// committed transaction.
    pub fn subscribe(&mut self, callback: impl FnMut(&[Op]) + Send + 'static) {
        self.subscribers.push(Box::new(callback));
    }

    /// Applies a batch of ops all-or-nothing: validates every op against a
    /// scratch copy of the graph first, and only commits to the real state
    /// if the whole batch validates cleanly.
    pub fn apply_ops(&mut self, ops: &[Op]) -> ApplyResult {
        let mut scratch_snapshot = self.snapshot.clone();
        let mut scratch_indices = self.indices.clone();
        let mut errors = Vec::new();

        for (op_index, op) in ops.iter().enumerate() {
            if let Err(kind) = apply_one(op, &mut scratch_snapshot, &mut scratch_indices, self.registry) {
                errors.push(OpError { op_index, op_type: op.op_type(), entity_id: op.entity_id(), kind });
            }
        }

        if !errors.is_empty() {
            tracing::debug!(batch_len = ops.len(), error_count = errors.len(), "apply_ops rejected");
            return ApplyResult { ok: false, changed: false, errors };
        }

        self.snapshot = scratch_snapshot;
        self.indices = scratch_indices;
        let changed = !ops.is_empty();
        if changed {
            tracing::debug!(batch_len = ops.len(), "apply_ops committed");
            for subscriber in &mut self.subscribers {
                subscriber(ops);
            }
        }
        ApplyResult { ok: true, changed, errors: Vec::new() }
    }
}

fn apply_one(op: &Op, snapshot: &mut GraphSnapshot, indices: &mut GraphIndexes, registry: &NodeRegistry) -> Result<(), ModelErrorKind> {
    match op {
        Op::AddNode { id, type_key, x, y, rotation, param, name, group_ref } => {
            if indices.node_index(id).is_some() || indices.edge_index(&patch_core::EdgeId::from(id.as_str())).is_some() {
                return Err(ModelErrorKind::DuplicateId(id.to_string()));
            }
            if type_key != "group" && registry.get(type_key).is_none() {
                return Err(ModelErrorKind::UnknownNodeType(type_key.clone()));
            }
            if type_key == "group" {
                let group_id = group_ref.as_ref().ok_or_else(|| ModelErrorKind::GroupRefInvalid(String::new()))?;
                if !snapshot.groups.contains_key(group_id) {
                    return Err(ModelErrorKind::GroupRefInvalid(group_id.clone()));
                }
            }
            let rotation = Rotation::from_degrees(*rotation).ok_or(ModelErrorKind::InvalidRotation(*rotation))?;
            let position = to_grid_point(*x, *y)?;
            let node = NodeRecord {
                id: id.clone(),
                type_key: type_key.clone(),
                position,
                rotation,
                params: NodeParams::new(*param),
                name: name.clone(),
                group_ref: group_ref.clone(),
            };
            let index = snapshot.nodes.len();
            snapshot.nodes.push(node);
            indices.insert_node(id.clone(), index);
            Ok(())
        }

        Op::RemoveNode { id } => {
            let index = indices.node_index(id).ok_or_else(|| ModelErrorKind::NodeNotFound(id.to_string()))?;
            let incident: Vec<_> = indices.edges_of_node(id).to_vec();
            for edge_id in incident {
                remove_edge_record(&edge_id, snapshot, indices)?;
            }
            snapshot.nodes.remove(index);
            indices.remove_node(id);
            Ok(())
        }

        Op::MoveNode { id, x, y } => {
            let index = indices.node_index(id).ok_or_else(|| ModelErrorKind::NodeNotFound(id.to_string()))?;
            let position = to_grid_point(*x, *y)?;
            snapshot.nodes[index].position = position;
            Ok(())
        }

        Op::RotateNode { id, rotation } => {
            let index = indices.node_index(id).ok_or_else(|| ModelErrorKind::NodeNotFound(id.to_string()))?;
            let rotation = Rotation::from_degrees(*rotation).ok_or(ModelErrorKind::InvalidRotation(*rotation))?;
            snapshot.nodes[index].rotation = rotation;
            Ok(())
        }

        Op::SetParam { id, param } => {
            let index = indices.node_index(id).ok_or_else(|| ModelErrorKind::NodeNotFound(id.to_string()))?;
            snapshot.nodes[index].params.param = *param;
            Ok(())
        }

        Op::RenameNode { id, name } => {
            let index = indices.node_index(id).ok_or_else(|| ModelErrorKind::NodeNotFound(id.to_string()))?;
            snapshot.nodes[index].name = name.clone();
            Ok(())
        }

        Op::AddEdge { id, from, to, corners } => {
            if indices.edge_index(id).is_some() || indices.node_index(&NodeId::from(id.as_str())).is_some() {
                return Err(ModelErrorKind::DuplicateId(id.to_string()));
            }
            if from.direction != Direction::Output || to.direction != Direction::Input {
                return Err(ModelErrorKind::EdgeDirectionInvalid);
            }
            let from_idx = indices.node_index(&from.node).ok_or_else(|| ModelErrorKind::EdgeDanglingEndpoint(from.node.to_string()))?;
            let to_idx = indices.node_index(&to.node).ok_or_else(|| ModelErrorKind::EdgeDanglingEndpoint(to.node.to_string()))?;

            let (_, from_outputs) = port_counts(snapshot, registry, &snapshot.nodes[from_idx])
                .ok_or_else(|| ModelErrorKind::PortInvalid { node: from.node.to_string(), slot: from.slot })?;
            if from.slot >= from_outputs {
                return Err(ModelErrorKind::PortInvalid { node: from.node.to_string(), slot: from.slot });
            }
            let (to_inputs, _) = port_counts(snapshot, registry, &snapshot.nodes[to_idx])
                .ok_or_else(|| ModelErrorKind::PortInvalid { node: to.node.to_string(), slot: to.slot })?;
            if to.slot >= to_inputs {
                return Err(ModelErrorKind::PortInvalid { node: to.node.to_string(), slot: to.slot });
            }

            if indices.edge_at_port(&from.node, Direction::Output, from.slot).is_some() {
                return Err(ModelErrorKind::PortAlreadyConnected { node: from.node.to_string(), slot: from.slot });
            }
            if indices.edge_at_port(&to.node, Direction::Input, to.slot).is_some() {
                return Err(ModelErrorKind::PortAlreadyConnected { node: to.node.to_string(), slot: to.slot });
            }

            let mut grid_corners = Vec::with_capacity(corners.len());
            for (x, y) in corners {
                grid_corners.push(to_grid_point(*x, *y)?);
            }

            let record = EdgeRecord {
                id: id.clone(),
                from: PortAddr::new(from.node.clone(), from.slot),
                to: PortAddr::new(to.node.clone(), to.slot),
                corners: grid_corners,
            };
            let edge_index = snapshot.edges.len();
            snapshot.edges.push(record);
            indices.insert_edge(id.clone(), edge_index, (from.node.clone(), from.slot), (to.node.clone(), to.slot));
            Ok(())
        }

        Op::RemoveEdge { id } => remove_edge_record(id, snapshot, indices),

        Op::AddCorner { edge, index, x, y } => {
            let edge_idx = indices.edge_index(edge).ok_or_else(|| ModelErrorKind::EdgeNotFound(edge.to_string()))?;
            let point = to_grid_point(*x, *y)?;
            let corners = &mut snapshot.edges[edge_idx].corners;
            if *index > corners.len() {
                return Err(ModelErrorKind::CornerIndexInvalid { edge: edge.to_string(), index: *index });
            }
            corners.insert(*index, point);
            Ok(())
        }

        Op::MoveCorner { edge, index, x, y } => {
            let edge_idx = indices.edge_index(edge).ok_or_else(|| ModelErrorKind::EdgeNotFound(edge.to_string()))?;
            let point = to_grid_point(*x, *y)?;
            let corners = &mut snapshot.edges[edge_idx].corners;
            let slot = corners.get_mut(*index).ok_or_else(|| ModelErrorKind::CornerIndexInvalid { edge: edge.to_string(), index: *index })?;
            *slot = point;
            Ok(())
        }

        Op::RemoveCorner { edge, index } => {
            let edge_idx = indices.edge_index(edge).ok_or_else(|| ModelErrorKind::EdgeNotFound(edge.to_string()))?;
            let corners = &mut snapshot.edges[edge_idx].corners;
            if *index >= corners.len() {
                return Err(ModelErrorKind::CornerIndexInvalid { edge: edge.to_string(), index: *index });
            }
            corners.remove(*index);
            Ok(())
        }

        Op::AddGroup { definition } => {
            if snapshot.groups.contains_key(&definition.id) {
                return Err(ModelErrorKind::DuplicateId(definition.id.clone()));
            }
            if !definition.is_flat() {
                return Err(ModelErrorKind::GroupNotFlat(definition.id.clone()));
            }
            snapshot.groups.insert(definition.id.clone(), definition.clone());
            Ok(())
        }

        Op::RemoveGroup { id } => {
            if !snapshot.groups.contains_key(id) {
                return Err(ModelErrorKind::GroupRefInvalid(id.clone()));
            }
            if snapshot.nodes.iter().any(|n| n.group_ref.as_deref() == Some(id.as_str())) {
                return Err(ModelErrorKind::GroupRefInvalid(id.clone()));
            }
            snapshot.groups.remove(id);
            Ok(())
        }
    }
}

fn remove_edge_record(id: &patch_core::EdgeId, snapshot: &mut GraphSnapshot, indices: &mut GraphIndexes) -> Result<(), ModelErrorKind> {
    let index = indices.edge_index(id).ok_or_else(|| ModelErrorKind::EdgeNotFound(id.to_string()))?;
    let record = snapshot.edges.remove(index);
    indices.remove_edge(id, (record.from.node.clone(), record.from.slot), (record.to.node.clone(), record.to.slot));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::EdgeEndpoint;
    use patch_registry::NodeRegistry;

    fn add_node(id: &str, type_key: &str, x: f64, y: f64) -> Op {
        Op::AddNode { id: NodeId::from(id), type_key: type_key.to_string(), x, y, rotation: 0, param: 1, name: None, group_ref: None }
    }

    #[test]
    fn batch_commits_all_or_nothing() {
        let registry = NodeRegistry::new().unwrap();
        let mut model = GraphModel::new(&registry);
        let ops = vec![
            add_node("p1", "pulse", 0.0, 0.0),
            add_node("o1", "output", 2.0, 0.0),
            Op::AddEdge {
                id: patch_core::EdgeId::from("e1"),
                from: EdgeEndpoint::new("p1", Direction::Output, 0),
                to: EdgeEndpoint::new("o1", Direction::Input, 0),
                corners: vec![],
            },
        ];
        let result = model.apply_ops(&ops);
        assert!(result.ok);
        assert!(result.changed);
        assert_eq!(model.snapshot().nodes.len(), 2);
        assert_eq!(model.snapshot().edges.len(), 1);
    }

    #[test]
    fn one_bad_op_rejects_whole_batch() {
        let registry = NodeRegistry::new().unwrap();
        let mut model = GraphModel::new(&registry);
        let ops = vec![
            add_node("p1", "pulse", 0.0, 0.0),
            add_node("p1", "pulse", 1.0, 1.0), // duplicate id
        ];
        let result = model.apply_ops(&ops);
        assert!(!result.ok);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].code(), "MODEL_DUPLICATE_ID");
        assert_eq!(model.snapshot().nodes.len(), 0, "nothing should have been committed");
    }

    #[test]
    fn unknown_node_type_is_rejected() {
        let registry = NodeRegistry::new().unwrap();
        let mut model = GraphModel::new(&registry);
        let result = model.apply_ops(&[add_node("p1", "not-a-type", 0.0, 0.0)]);
        assert!(!result.ok);
        assert_eq!(result.errors[0].code(), "MODEL_UNKNOWN_NODE_TYPE");
    }

    #[test]
    fn non_integer_position_is_rejected() {
        let registry = NodeRegistry::new().unwrap();
        let mut model = GraphModel::new(&registry);
        let result = model.apply_ops(&[add_node("p1", "pulse", 0.5, 0.0)]);
        assert!(!result.ok);
        assert_eq!(result.errors[0].code(), "MODEL_INVALID_POSITION");
    }

    #[test]
    fn invalid_rotation_is_rejected() {
        let registry = NodeRegistry::new().unwrap();
        let mut model = GraphModel::new(&registry);
        let result = model.apply_ops(&[Op::AddNode {
            id: NodeId::from("p1"),
            type_key: "pulse".to_string(),
            x: 0.0,
            y: 0.0,
            rotation: 45,
            param: 1,
            name: None,
            group_ref: None,
        }]);
        assert!(!result.ok);
        assert_eq!(result.errors[0].code(), "MODEL_INVALID_ROTATION");
    }

    #[test]
    fn removing_a_node_cascades_to_incident_edges() {
        let registry = NodeRegistry::new().unwrap();
        let mut model = GraphModel::new(&registry);
        model.apply_ops(&[
            add_node("p1", "pulse", 0.0, 0.0),
            add_node("o1", "output", 2.0, 0.0),
            Op::AddEdge { id: patch_core::EdgeId::from("e1"), from: EdgeEndpoint::new("p1", Direction::Output, 0), to: EdgeEndpoint::new("o1", Direction::Input, 0), corners: vec![] },
        ]);
        let result = model.apply_ops(&[Op::RemoveNode { id: NodeId::from("p1") }]);
        assert!(result.ok);
        let snap = model.snapshot();
        assert_eq!(snap.nodes.len(), 1);
        assert!(snap.edges.is_empty());
        assert!(model.indices().edges_of_node(&NodeId::from("o1")).is_empty());
    }

    #[test]
    fn duplicate_port_connection_is_rejected() {
        let registry = NodeRegistry::new().unwrap();
        let mut model = GraphModel::new(&registry);
        model.apply_ops(&[
            add_node("p1", "pulse", 0.0, 0.0),
            add_node("p2", "pulse", 0.0, 1.0),
            add_node("o1", "output", 2.0, 0.0),
            Op::AddEdge { id: patch_core::EdgeId::from("e1"), from: EdgeEndpoint::new("p1", Direction::Output, 0), to: EdgeEndpoint::new("o1", Direction::Input, 0), corners: vec![] },
        ]);
        let result = model.apply_ops(&[Op::AddEdge {
            id: patch_core::EdgeId::from("e2"),
            from: EdgeEndpoint::new("p2", Direction::Output, 0),
            to: EdgeEndpoint::new("o1", Direction::Input, 0),
            corners: vec![],
        }]);
        assert!(!result.ok);
        assert_eq!(result.errors[0].code(), "MODEL_PORT_ALREADY_CONNECTED");
    }

    #[test]
    fn reversed_edge_direction_is_rejected() {
        let registry = NodeRegistry::new().unwrap();
        let mut model = GraphModel::new(&registry);
        model.apply_ops(&[add_node("p1", "pulse", 0.0, 0.0), add_node("o1", "output", 2.0, 0.0)]);
        let result = model.apply_ops(&[Op::AddEdge {
            id: patch_core::EdgeId::from("e1"),
            from: EdgeEndpoint::new("p1", Direction::Input, 0),
            to: EdgeEndpoint::new("o1", Direction::Input, 0),
            corners: vec![],
        }]);
        assert!(!result.ok);
        assert_eq!(result.errors[0].code(), "MODEL_EDGE_DIRECTION_INVALID");
    }

    #[test]
    fn subscriber_is_notified_once_per_committed_batch() {
        let registry = NodeRegistry::new().unwrap();
        let mut model = GraphModel::new(&registry);
        let count = std::sync::Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let count_clone = count.clone();
        model.subscribe(move |_ops| {
            count_clone.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        });
        model.apply_ops(&[add_node("p1", "pulse", 0.0, 0.0)]);
        model.apply_ops(&[add_node("p1", "pulse", 0.0, 0.0)]); // rejected, no notification
        assert_eq!(count.load(std::sync::atomic::Ordering::SeqCst), 1);
    }
}
