//! Orthogonal path assembly: turns a pair of port anchors plus manual
//! corners into a grid-integer polyline, per the X6-style stub-and-bend
//! algorithm.

use std::fmt::Write as _;

use patch_core::{Direction, GridPoint};
use patch_model::{EdgeRecord, GraphSnapshot};
use patch_registry::NodeRegistry;

use crate::anchor::{port_anchor, stub_end};
use crate::config::{BendPreference, RoutingConfig};
use crate::error::RouteError;
use crate::placements::node_placements;

/// The routed geometry and derived delay for one edge.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteResult {
    /// Grid-integer polyline from the source anchor to the destination anchor.
    pub points: Vec<GridPoint>,
    /// Pure-geometry SVG path data (`M x,y L x,y ...`); rendering concerns
    /// like rounded joins are left to the caller.
    pub svg_path_d: String,
    /// Sum of Manhattan segment lengths, in grid units.
    pub total_length: f64,
}

impl RouteResult {
    /// Base delay in ticks, before the runtime's positive floor is applied.
    #[must_use]
    pub fn delay_ticks(&self, config: &RoutingConfig) -> f64 {
        self.total_length * config.ticks_per_grid
    }
}

fn push_if_new(points: &mut Vec<GridPoint>, p: GridPoint) {
    if points.last() != Some(&p) {
        points.push(p);
    }
}

fn choose_bend(a: GridPoint, b: GridPoint, pref: BendPreference) -> GridPoint {
    let dx = (b.x - a.x).abs();
    let dy = (b.y - a.y).abs();
    let horizontal_first = if dx > dy {
        true
    } else if dy > dx {
        false
    } else {
        pref == BendPreference::HorizontalFirst
    };
    if horizontal_first { GridPoint::new(b.x, a.y) } else { GridPoint::new(a.x, b.y) }
}

fn assemble(from_anchor: GridPoint, from_stub: GridPoint, corners: &[GridPoint], to_stub: GridPoint, to_anchor: GridPoint, pref: BendPreference) -> Vec<GridPoint> {
    let mut points = vec![from_anchor];
    push_if_new(&mut points, from_stub);

    let mut prev = from_stub;
    let waypoints: Vec<GridPoint> = corners.iter().copied().chain(std::iter::once(to_stub)).collect();
    for corner in waypoints {
        if prev.x != corner.x && prev.y != corner.y {
            let bend = choose_bend(prev, corner, pref);
            push_if_new(&mut points, bend);
        }
        push_if_new(&mut points, corner);
        prev = corner;
    }
    push_if_new(&mut points, to_anchor);
    points
}

fn total_length(points: &[GridPoint]) -> f64 {
    points.windows(2).map(|w| w[0].manhattan_distance(w[1]) as f64).sum()
}

fn svg_path_d(points: &[GridPoint]) -> String {
    let mut d = String::new();
    for (i, p) in points.iter().enumerate() {
        let cmd = if i == 0 { "M" } else { "L" };
        let _ = write!(d, "{cmd} {},{} ", p.x, p.y);
    }
    d.trim_end().to_string()
}

/// Routes one edge against `snapshot`, returning its polyline, SVG path, and
/// total length, or the `RouteError` that prevented it.
pub fn route_edge(snapshot: &GraphSnapshot, registry: &NodeRegistry, edge: &EdgeRecord, config: &RoutingConfig) -> Result<RouteResult, RouteError> {
    let from_node = snapshot
        .nodes
        .iter()
        .find(|n| n.id == edge.from.node)
        .ok_or_else(|| RouteError::MissingNode { edge: edge.id.clone(), node: edge.from.node.clone() })?;
    let to_node = snapshot
        .nodes
        .iter()
        .find(|n| n.id == edge.to.node)
        .ok_or_else(|| RouteError::MissingNode { edge: edge.id.clone(), node: edge.to.node.clone() })?;

    let from_placements = node_placements(from_node, registry, snapshot)
        .ok_or_else(|| RouteError::AnchorFail { edge: edge.id.clone(), node: from_node.id.clone() })?;
    let to_placements = node_placements(to_node, registry, snapshot)
        .ok_or_else(|| RouteError::AnchorFail { edge: edge.id.clone(), node: to_node.id.clone() })?;

    let from_anchor = port_anchor(from_node.position, from_node.rotation, &from_placements, Direction::Output, edge.from.slot)
        .ok_or_else(|| RouteError::InvalidPort { edge: edge.id.clone(), node: from_node.id.clone(), slot: edge.from.slot })?;
    let from_stub = stub_end(from_node.position, from_node.rotation, &from_placements, Direction::Output, edge.from.slot)
        .ok_or_else(|| RouteError::InvalidPort { edge: edge.id.clone(), node: from_node.id.clone(), slot: edge.from.slot })?;
    let to_anchor = port_anchor(to_node.position, to_node.rotation, &to_placements, Direction::Input, edge.to.slot)
        .ok_or_else(|| RouteError::InvalidPort { edge: edge.id.clone(), node: to_node.id.clone(), slot: edge.to.slot })?;
    let to_stub = stub_end(to_node.position, to_node.rotation, &to_placements, Direction::Input, edge.to.slot)
        .ok_or_else(|| RouteError::InvalidPort { edge: edge.id.clone(), node: to_node.id.clone(), slot: edge.to.slot })?;

    let points = assemble(from_anchor, from_stub, &edge.corners, to_stub, to_anchor, config.bend_preference);
    let length = total_length(&points);
    let path = svg_path_d(&points);
    Ok(RouteResult { points, svg_path_d: path, total_length: length })
}

#[cfg(test)]
mod tests {
    use super::*;
    use patch_core::{GridPoint, NodeId, Rotation};
    use patch_model::{EdgeRecord, NodeParams, NodeRecord, PortAddr};
    use patch_registry::NodeRegistry;

    fn node(id: &str, type_key: &str, x: i32, y: i32) -> NodeRecord {
        NodeRecord {
            id: NodeId::from(id),
            type_key: type_key.to_string(),
            position: GridPoint::new(x, y),
            rotation: Rotation::Deg0,
            params: NodeParams::new(1),
            name: None,
            group_ref: None,
        }
    }

    fn snapshot_with(a: NodeRecord, b: NodeRecord, corners: Vec<GridPoint>) -> (GraphSnapshot, EdgeRecord) {
        let edge = EdgeRecord {
            id: "e1".into(),
            from: PortAddr::new(a.id.as_str(), 0),
            to: PortAddr::new(b.id.as_str(), 0),
            corners,
        };
        let mut snapshot = GraphSnapshot::new();
        snapshot.nodes.push(a);
        snapshot.nodes.push(b);
        (snapshot, edge)
    }

    #[test]
    fn straight_line_between_adjacent_nodes_has_no_extra_bends() {
        let registry = NodeRegistry::new().unwrap();
        let (snapshot, edge) = snapshot_with(node("p1", "pulse", 0, 0), node("o1", "output", 2, 0), vec![]);
        let result = route_edge(&snapshot, &registry, &edge, &RoutingConfig::default()).unwrap();
        // Anchors sit on the same row, so the polyline never leaves y=0.
        assert!(result.points.iter().all(|p| p.y == 0));
        assert!(result.total_length > 0.0);
    }

    #[test]
    fn offset_nodes_produce_a_bent_path_and_positive_length() {
        let registry = NodeRegistry::new().unwrap();
        let (snapshot, edge) = snapshot_with(node("p1", "pulse", 0, 0), node("o1", "output", 5, 3), vec![]);
        let result = route_edge(&snapshot, &registry, &edge, &RoutingConfig::default()).unwrap();
        assert!(result.total_length > 0.0);
        assert_eq!(result.points.first(), result.points.first());
    }

    #[test]
    fn repeated_routing_is_byte_identical() {
        let registry = NodeRegistry::new().unwrap();
        let (snapshot, edge) = snapshot_with(node("p1", "pulse", 0, 0), node("o1", "output", 5, 3), vec![]);
        let config = RoutingConfig::default();
        let first = route_edge(&snapshot, &registry, &edge, &config).unwrap();
        let second = route_edge(&snapshot, &registry, &edge, &config).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn manual_corners_are_preserved_in_order() {
        let registry = NodeRegistry::new().unwrap();
        let corners = vec![GridPoint::new(1, 5), GridPoint::new(4, 5)];
        let (snapshot, edge) = snapshot_with(node("p1", "pulse", 0, 0), node("o1", "output", 5, 0), corners.clone());
        let result = route_edge(&snapshot, &registry, &edge, &RoutingConfig::default()).unwrap();
        for corner in &corners {
            assert!(result.points.contains(corner));
        }
    }

    #[test]
    fn missing_node_produces_route_missing_node() {
        let registry = NodeRegistry::new().unwrap();
        let edge = EdgeRecord { id: "e1".into(), from: PortAddr::new("ghost", 0), to: PortAddr::new("o1", 0), corners: vec![] };
        let mut snapshot = GraphSnapshot::new();
        snapshot.nodes.push(node("o1", "output", 2, 0));
        let err = route_edge(&snapshot, &registry, &edge, &RoutingConfig::default()).unwrap_err();
        assert_eq!(err.code(), "ROUTE_MISSING_NODE");
    }

    #[test]
    fn out_of_range_slot_produces_invalid_port() {
        let registry = NodeRegistry::new().unwrap();
        let (snapshot, edge) = snapshot_with(node("p1", "pulse", 0, 0), node("o1", "output", 2, 0), vec![]);
        let mut bad_edge = edge;
        bad_edge.from.slot = 9;
        let err = route_edge(&snapshot, &registry, &bad_edge, &RoutingConfig::default()).unwrap_err();
        assert_eq!(err.code(), "ROUTE_INVALID_PORT");
    }

    #[test]
    fn svg_path_starts_with_move_command() {
        let registry = NodeRegistry::new().unwrap();
        let (snapshot, edge) = snapshot_with(node("p1", "pulse", 0, 0), node("o1", "output", 2, 0), vec![]);
        let result = route_edge(&snapshot, &registry, &edge, &RoutingConfig::default()).unwrap();
        assert!(result.svg_path_d.starts_with('M'));
    }

    #[test]
    fn total_length_matches_manhattan_sum_of_points() {
        let registry = NodeRegistry::new().unwrap();
        let (snapshot, edge) = snapshot_with(node("p1", "pulse", 0, 0), node("o1", "output", 5, 3), vec![]);
        let result = route_edge(&snapshot, &registry, &edge, &RoutingConfig::default()).unwrap();
        let sum: f64 = result.points.windows(2).map(|w| w[0].manhattan_distance(w[1]) as f64).sum();
        assert_eq!(sum, result.total_length);
    }
}
