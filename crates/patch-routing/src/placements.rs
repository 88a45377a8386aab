//! Resolves a node's port placements, accounting for `type_key == "group"`
//! instances whose layout is driven by a `GroupDefinition` rather than a
//! fixed `Archetype`.

use patch_model::{GraphSnapshot, NodeRecord};
use patch_registry::{Archetype, GroupPorts, NodeRegistry, PortPlacement, group_port_placements, port_placements};

/// Resolves the ordered port placements for `node`, or `None` if its
/// `type_key` isn't registered, or (for a group instance) its `group_ref`
/// doesn't resolve to a known group definition.
#[must_use]
pub fn node_placements(node: &NodeRecord, registry: &NodeRegistry, snapshot: &GraphSnapshot) -> Option<Vec<PortPlacement>> {
    let descriptor = registry.get(&node.type_key)?;
    if descriptor.layout == Archetype::Custom {
        let group_ref = node.group_ref.as_ref()?;
        let group = snapshot.groups.get(group_ref)?;
        return Some(group_port_placements(GroupPorts {
            signal_inputs: group.inputs.len(),
            control_inputs: group.controls.len(),
            outputs: group.outputs.len(),
        }));
    }
    Some(port_placements(descriptor.layout, descriptor.inputs, descriptor.control_ports, descriptor.outputs))
}
