//! `compile()`: the pure `(snapshot, registry, delays) -> CompiledGraph` function.

use std::collections::{HashMap, HashSet};

use patch_core::{Direction, EdgeId, NodeId, PortRole};
use patch_model::{GraphSnapshot, NodeRecord};
use patch_registry::{Archetype, GroupPorts, NodeDescriptor, NodeRegistry, PortPlacement, group_port_placements, port_placements};

use crate::error::BuildError;
use crate::graph::{CompiledEdge, CompiledGraph, CompiledNode, GroupMeta};

/// Outcome of a `compile()` call: either a flattened [`CompiledGraph`], or
/// every [`BuildError`] found across the whole snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildOutcome {
    /// `true` iff `graph` is `Some`.
    pub ok: bool,
    /// The compiled graph, present only when `ok`.
    pub graph: Option<CompiledGraph>,
    /// Every violation found; empty iff `ok`.
    pub errors: Vec<BuildError>,
}

fn node_placements(node: &NodeRecord, registry: &NodeRegistry, snapshot: &GraphSnapshot) -> Option<(Vec<PortPlacement>, &'static NodeDescriptor)> {
    let descriptor = registry.get(&node.type_key)?;
    if descriptor.layout == Archetype::Custom {
        let group_ref = node.group_ref.as_ref()?;
        let group = snapshot.groups.get(group_ref)?;
        let placements = group_port_placements(GroupPorts {
            signal_inputs: group.inputs.len(),
            control_inputs: group.controls.len(),
            outputs: group.outputs.len(),
        });
        return Some((placements, descriptor));
    }
    Some((port_placements(descriptor.layout, descriptor.inputs, descriptor.control_ports, descriptor.outputs), descriptor))
}

/// One resolved, not-yet-flattened node.
struct ResolvedNode {
    record: NodeRecord,
    state: patch_registry::NodeState,
}

/// Resolves every node in `snapshot`, collecting `BUILD_UNKNOWN_NODE_TYPE`
/// violations, and returns the resolved nodes keyed by id for edge resolution.
fn resolve_nodes(snapshot: &GraphSnapshot, registry: &NodeRegistry, errors: &mut Vec<BuildError>) -> HashMap<NodeId, ResolvedNode> {
    let mut resolved = HashMap::with_capacity(snapshot.nodes.len());
    for node in &snapshot.nodes {
        let Some(descriptor) = registry.get(&node.type_key) else {
            errors.push(BuildError::UnknownNodeType { node: node.id.clone(), type_key: node.type_key.clone() });
            continue;
        };
        let state = (descriptor.behavior.init_state)(node.params.param);
        resolved.insert(node.id.clone(), ResolvedNode { record: node.clone(), state });
    }
    resolved
}

/// Resolves every edge in `snapshot` against already-resolved nodes,
/// collecting every `BUILD_*` edge violation, and returns the compiled edges.
fn resolve_edges(
    snapshot: &GraphSnapshot,
    registry: &NodeRegistry,
    nodes: &HashMap<NodeId, ResolvedNode>,
    delays: &HashMap<EdgeId, f64>,
    errors: &mut Vec<BuildError>,
) -> Vec<CompiledEdge> {
    let mut seen_ports: HashSet<(NodeId, Direction, usize)> = HashSet::new();
    let mut compiled = Vec::with_capacity(snapshot.edges.len());

    for edge in &snapshot.edges {
        let Some(from_node) = nodes.get(&edge.from.node).map(|r| &r.record) else { continue };
        let Some(to_node) = nodes.get(&edge.to.node).map(|r| &r.record) else { continue };

        let Some((from_placements, _)) = node_placements(from_node, registry, snapshot) else { continue };
        let Some((to_placements, _)) = node_placements(to_node, registry, snapshot) else { continue };

        let from_outputs: Vec<&PortPlacement> = from_placements.iter().filter(|p| p.direction == Direction::Output).collect();
        let to_inputs: Vec<&PortPlacement> = to_placements.iter().filter(|p| p.direction == Direction::Input).collect();

        let from_placement = if from_outputs.is_empty() {
            errors.push(BuildError::SameDirection { edge: edge.id.clone(), node: from_node.id.clone(), direction: Direction::Output });
            None
        } else if edge.from.slot >= from_outputs.len() {
            errors.push(BuildError::PortSlotInvalid { edge: edge.id.clone(), node: from_node.id.clone(), direction: Direction::Output, slot: edge.from.slot });
            None
        } else {
            Some(from_outputs[edge.from.slot])
        };

        let to_placement = if to_inputs.is_empty() {
            errors.push(BuildError::SameDirection { edge: edge.id.clone(), node: to_node.id.clone(), direction: Direction::Input });
            None
        } else if edge.to.slot >= to_inputs.len() {
            errors.push(BuildError::PortSlotInvalid { edge: edge.id.clone(), node: to_node.id.clone(), direction: Direction::Input, slot: edge.to.slot });
            None
        } else {
            Some(to_inputs[edge.to.slot])
        };

        let (Some(from_placement), Some(to_placement)) = (from_placement, to_placement) else { continue };

        if from_placement.role != PortRole::Signal && from_placement.role != to_placement.role {
            errors.push(BuildError::RoleMismatch(edge.id.clone()));
            continue;
        }
        let role = to_placement.role;

        let from_key = (from_node.id.clone(), Direction::Output, edge.from.slot);
        let to_key = (to_node.id.clone(), Direction::Input, edge.to.slot);
        if !seen_ports.insert(from_key) {
            errors.push(BuildError::PortAlreadyConnected { node: from_node.id.clone(), direction: Direction::Output, slot: edge.from.slot });
            continue;
        }
        if !seen_ports.insert(to_key) {
            errors.push(BuildError::PortAlreadyConnected { node: to_node.id.clone(), direction: Direction::Input, slot: edge.to.slot });
            continue;
        }

        let Some(&delay) = delays.get(&edge.id) else {
            errors.push(BuildError::MissingDelay(edge.id.clone()));
            continue;
        };

        compiled.push(CompiledEdge {
            id: edge.id.clone(),
            from_node: from_node.id.clone(),
            from_slot: edge.from.slot,
            to_node: to_node.id.clone(),
            to_slot: edge.to.slot,
            role,
            delay,
        });
    }

    compiled
}

fn namespaced(instance: &NodeId, inner: &NodeId) -> NodeId {
    NodeId::from(format!("{}::{}", instance.as_str(), inner.as_str()))
}

fn namespaced_edge(instance: &NodeId, inner: &EdgeId) -> EdgeId {
    EdgeId::from(format!("{}::{}", instance.as_str(), inner.as_str()))
}

/// Flattens every `group`-typed node instance in `top_nodes`/`top_edges`,
/// copying the group's interior (namespaced by the instance id) into the
/// main arrays and rewiring external connections to the mapped internal ports.
#[allow(clippy::too_many_lines)]
fn flatten_groups(
    snapshot: &GraphSnapshot,
    registry: &NodeRegistry,
    mut nodes: Vec<CompiledNode>,
    mut edges: Vec<CompiledEdge>,
    delays: &HashMap<EdgeId, f64>,
    errors: &mut Vec<BuildError>,
) -> (Vec<CompiledNode>, Vec<CompiledEdge>, Vec<GroupMeta>) {
    let mut groups = Vec::new();
    let mut instance_node_indices = Vec::new();

    for (i, node) in snapshot.nodes.iter().enumerate() {
        if node.type_key == "group" {
            instance_node_indices.push(i);
        }
    }

    for &i in &instance_node_indices {
        let instance = &snapshot.nodes[i];
        let Some(group_ref) = &instance.group_ref else {
            errors.push(BuildError::GroupMappingInvalid { node: instance.id.clone(), reason: "group node has no groupRef".to_string() });
            continue;
        };
        let Some(group) = snapshot.groups.get(group_ref) else {
            errors.push(BuildError::GroupMappingInvalid { node: instance.id.clone(), reason: format!("unknown groupRef `{group_ref}`") });
            continue;
        };

        let mut inner_errors = Vec::new();
        let inner_resolved = resolve_nodes(&group.snapshot, registry, &mut inner_errors);
        let inner_compiled_edges = resolve_edges(&group.snapshot, registry, &inner_resolved, delays, &mut inner_errors);
        for e in inner_errors {
            errors.push(match e {
                BuildError::UnknownNodeType { node, type_key } => {
                    BuildError::GroupMappingInvalid { node: instance.id.clone(), reason: format!("interior node `{node}` has unknown type `{type_key}`") }
                }
                other => other,
            });
        }

        let mut node_ids = Vec::with_capacity(inner_resolved.len());
        for inner_node in group.snapshot.nodes.iter() {
            let Some(resolved) = inner_resolved.get(&inner_node.id) else { continue };
            let id = namespaced(&instance.id, &inner_node.id);
            node_ids.push(id.clone());
            nodes.push(CompiledNode {
                id,
                type_key: inner_node.type_key.clone(),
                param: inner_node.params.param,
                state: resolved.state,
                position: inner_node.position,
                rotation: inner_node.rotation,
            });
        }

        for inner_edge in &inner_compiled_edges {
            edges.push(CompiledEdge {
                id: namespaced_edge(&instance.id, &inner_edge.id),
                from_node: namespaced(&instance.id, &inner_edge.from_node),
                from_slot: inner_edge.from_slot,
                to_node: namespaced(&instance.id, &inner_edge.to_node),
                to_slot: inner_edge.to_slot,
                role: inner_edge.role,
                delay: inner_edge.delay,
            });
        }

        rewrite_external_connections(&instance.id, group, &mut edges, errors);

        groups.push(GroupMeta {
            instance_id: instance.id.clone(),
            group_ref: group_ref.clone(),
            node_ids,
            external_inputs: group.inputs.len(),
            external_outputs: group.outputs.len(),
            external_controls: group.controls.len(),
        });
    }

    // Drop the group-instance pseudo-nodes themselves; they're never real
    // scheduling targets.
    let instance_ids: HashSet<NodeId> = instance_node_indices.iter().map(|&i| snapshot.nodes[i].id.clone()).collect();
    nodes.retain(|n| !instance_ids.contains(&n.id));
    edges.retain(|e| !instance_ids.contains(&e.from_node) && !instance_ids.contains(&e.to_node));

    (nodes, edges, groups)
}

fn rewrite_external_connections(
    instance_id: &NodeId,
    group: &patch_model::GroupDefinition,
    edges: &mut [CompiledEdge],
    errors: &mut Vec<BuildError>,
) {
    for edge in edges.iter_mut() {
        if &edge.to_node == instance_id {
            match group.inputs.len().checked_add(group.controls.len()) {
                Some(total) if edge.to_slot < total => {
                    let mapping = if edge.to_slot < group.inputs.len() {
                        group.inputs[edge.to_slot]
                    } else {
                        group.controls[edge.to_slot - group.inputs.len()]
                    };
                    edge.to_node = namespaced(instance_id, &mapping.internal.node);
                    edge.to_slot = mapping.internal.slot;
                }
                _ => errors.push(BuildError::GroupMappingInvalid {
                    node: instance_id.clone(),
                    reason: format!("external input slot {} has no mapping", edge.to_slot),
                }),
            }
        }
        if &edge.from_node == instance_id {
            if edge.from_slot < group.outputs.len() {
                let mapping = group.outputs[edge.from_slot];
                edge.from_node = namespaced(instance_id, &mapping.internal.node);
                edge.from_slot = mapping.internal.slot;
            } else {
                errors.push(BuildError::GroupMappingInvalid {
                    node: instance_id.clone(),
                    reason: format!("external output slot {} has no mapping", edge.from_slot),
                });
            }
        }
    }
}

/// Cross-validates `snapshot` against `registry` and a precomputed
/// `delays` map (edge id → base tick delay, typically from
/// `patch-routing::RouteCache::route_batch`), producing a flattened,
/// immutable [`CompiledGraph`].
///
/// Never fails fast: every node and edge is checked and every violation is
/// collected before deciding whether to emit a graph.
pub fn compile(snapshot: &GraphSnapshot, registry: &NodeRegistry, delays: &HashMap<EdgeId, f64>) -> BuildOutcome {
    let mut errors = Vec::new();

    let resolved_nodes = resolve_nodes(snapshot, registry, &mut errors);
    let compiled_edges = resolve_edges(snapshot, registry, &resolved_nodes, delays, &mut errors);

    let mut compiled_nodes: Vec<CompiledNode> = snapshot
        .nodes
        .iter()
        .filter_map(|n| {
            let resolved = resolved_nodes.get(&n.id)?;
            Some(CompiledNode { id: n.id.clone(), type_key: n.type_key.clone(), param: n.params.param, state: resolved.state, position: n.position, rotation: n.rotation })
        })
        .collect();

    let (flattened_nodes, flattened_edges, groups) = flatten_groups(snapshot, registry, std::mem::take(&mut compiled_nodes), compiled_edges, delays, &mut errors);

    if !errors.is_empty() {
        tracing::debug!(count = errors.len(), "compile rejected: {} build errors", errors.len());
        return BuildOutcome { ok: false, graph: None, errors };
    }

    let graph = CompiledGraph::assemble(flattened_nodes, flattened_edges, groups);
    tracing::debug!(nodes = graph.nodes.len(), edges = graph.edges.len(), "compiled graph");
    BuildOutcome { ok: true, graph: Some(graph), errors: Vec::new() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use patch_core::{GridPoint, Rotation};
    use patch_model::{EdgeRecord, GroupDefinition, GroupPortMapping, NodeParams, NodeRecord, PortAddr};

    fn node(id: &str, type_key: &str) -> NodeRecord {
        NodeRecord { id: NodeId::from(id), type_key: type_key.to_string(), position: GridPoint::new(0, 0), rotation: Rotation::Deg0, params: NodeParams::new(1), name: None, group_ref: None }
    }

    #[test]
    fn compiles_a_simple_valid_graph() {
        let registry = NodeRegistry::new().unwrap();
        let mut snapshot = GraphSnapshot::new();
        snapshot.nodes.push(node("p1", "pulse"));
        snapshot.nodes.push(node("o1", "output"));
        snapshot.edges.push(EdgeRecord { id: "e1".into(), from: PortAddr::new("p1", 0), to: PortAddr::new("o1", 0), corners: vec![] });
        let mut delays = HashMap::new();
        delays.insert(EdgeId::from("e1"), 2.0);

        let outcome = compile(&snapshot, &registry, &delays);
        assert!(outcome.ok);
        let graph = outcome.graph.unwrap();
        assert_eq!(graph.nodes.len(), 2);
        assert_eq!(graph.edges.len(), 1);
        assert_eq!(graph.edges[0].delay, 2.0);
    }

    #[test]
    fn unknown_node_type_is_collected() {
        let registry = NodeRegistry::new().unwrap();
        let mut snapshot = GraphSnapshot::new();
        snapshot.nodes.push(node("x1", "not-a-real-type"));
        let outcome = compile(&snapshot, &registry, &HashMap::new());
        assert!(!outcome.ok);
        assert!(outcome.errors.iter().any(|e| e.code() == "BUILD_UNKNOWN_NODE_TYPE"));
    }

    #[test]
    fn missing_delay_is_collected() {
        let registry = NodeRegistry::new().unwrap();
        let mut snapshot = GraphSnapshot::new();
        snapshot.nodes.push(node("p1", "pulse"));
        snapshot.nodes.push(node("o1", "output"));
        snapshot.edges.push(EdgeRecord { id: "e1".into(), from: PortAddr::new("p1", 0), to: PortAddr::new("o1", 0), corners: vec![] });
        let outcome = compile(&snapshot, &registry, &HashMap::new());
        assert!(!outcome.ok);
        assert!(outcome.errors.iter().any(|e| e.code() == "BUILD_MISSING_DELAY"));
    }

    #[test]
    fn duplicate_port_connection_is_collected() {
        let registry = NodeRegistry::new().unwrap();
        let mut snapshot = GraphSnapshot::new();
        snapshot.nodes.push(node("p1", "pulse"));
        snapshot.nodes.push(node("o1", "output"));
        snapshot.nodes.push(node("o2", "output"));
        snapshot.edges.push(EdgeRecord { id: "e1".into(), from: PortAddr::new("p1", 0), to: PortAddr::new("o1", 0), corners: vec![] });
        snapshot.edges.push(EdgeRecord { id: "e2".into(), from: PortAddr::new("p1", 0), to: PortAddr::new("o2", 0), corners: vec![] });
        let mut delays = HashMap::new();
        delays.insert(EdgeId::from("e1"), 1.0);
        delays.insert(EdgeId::from("e2"), 1.0);
        let outcome = compile(&snapshot, &registry, &delays);
        assert!(!outcome.ok);
        assert!(outcome.errors.iter().any(|e| e.code() == "BUILD_PORT_ALREADY_CONNECTED"));
    }

    #[test]
    fn sink_node_used_as_source_is_same_direction() {
        let registry = NodeRegistry::new().unwrap();
        let mut snapshot = GraphSnapshot::new();
        snapshot.nodes.push(node("o1", "output"));
        snapshot.nodes.push(node("o2", "output"));
        snapshot.edges.push(EdgeRecord { id: "e1".into(), from: PortAddr::new("o1", 0), to: PortAddr::new("o2", 0), corners: vec![] });
        let outcome = compile(&snapshot, &registry, &HashMap::new());
        assert!(!outcome.ok);
        assert!(outcome.errors.iter().any(|e| e.code() == "BUILD_SAME_DIRECTION"));
    }

    #[test]
    fn flattens_a_group_instance() {
        let registry = NodeRegistry::new().unwrap();
        let mut inner = GraphSnapshot::new();
        inner.nodes.push(node("inner-pulse", "pulse"));
        inner.nodes.push(node("inner-out", "output"));
        inner.edges.push(EdgeRecord { id: "inner-e".into(), from: PortAddr::new("inner-pulse", 0), to: PortAddr::new("inner-out", 0), corners: vec![] });

        let mut snapshot = GraphSnapshot::new();
        let mut group_instance = node("g1", "group");
        group_instance.group_ref = Some("synth".to_string());
        snapshot.nodes.push(group_instance);
        snapshot.groups.insert(
            "synth".to_string(),
            GroupDefinition { id: "synth".to_string(), snapshot: inner, inputs: vec![], outputs: vec![], controls: vec![] },
        );

        let mut delays = HashMap::new();
        delays.insert(EdgeId::from("inner-e"), 1.0);

        let outcome = compile(&snapshot, &registry, &delays);
        assert!(outcome.ok, "{:?}", outcome.errors);
        let graph = outcome.graph.unwrap();
        assert_eq!(graph.nodes.len(), 2);
        assert_eq!(graph.groups.len(), 1);
        assert_eq!(graph.groups[0].node_ids.len(), 2);
    }

    #[test]
    fn unknown_group_ref_is_collected() {
        let registry = NodeRegistry::new().unwrap();
        let mut snapshot = GraphSnapshot::new();
        let mut group_instance = node("g1", "group");
        group_instance.group_ref = Some("missing".to_string());
        snapshot.nodes.push(group_instance);
        let outcome = compile(&snapshot, &registry, &HashMap::new());
        assert!(!outcome.ok);
        assert!(outcome.errors.iter().any(|e| e.code() == "BUILD_GROUP_MAPPING_INVALID"));
    }
}
