//! Anchor derivation: where a port sits on the grid, given a node's
//! position, rotation, and the registry's archetype-derived port placements.

use std::collections::HashMap;

use patch_core::{Direction, GridPoint, Rotation, Side};
use patch_registry::PortPlacement;

/// The square footprint side length shared by every side of a node, derived
/// from the archetype's busiest side.
///
/// `L = portsOnSide + 1` per side independently would give each side its own
/// extent; this implementation uses one shared `L` across all four sides
/// (the busiest side's `L`) so rotation has a single well-defined pivot — a
/// node's footprint is a square, not a side-dependent rectangle. See
/// `DESIGN.md`.
#[must_use]
pub fn footprint_extent(placements: &[PortPlacement]) -> i32 {
    let mut per_side: HashMap<Side, i32> = HashMap::new();
    for p in placements {
        *per_side.entry(p.side).or_insert(0) += 1;
    }
    per_side.values().copied().max().unwrap_or(0) + 1
}

fn local_anchor_unrotated(side: Side, side_index: usize, extent: i32) -> GridPoint {
    let along = side_index as i32 + 1;
    match side {
        Side::Left => GridPoint::new(0, along),
        Side::Right => GridPoint::new(extent, along),
        Side::Top => GridPoint::new(along, 0),
        Side::Bottom => GridPoint::new(along, extent),
    }
}

fn outward_normal(side: Side) -> (i32, i32) {
    match side {
        Side::Left => (-1, 0),
        Side::Right => (1, 0),
        Side::Top => (0, -1),
        Side::Bottom => (0, 1),
    }
}

/// Rotates a displacement vector clockwise by `turns` quarter-turns.
#[must_use]
pub fn rotate_vector(v: (i32, i32), turns: u32) -> (i32, i32) {
    let (mut x, mut y) = v;
    for _ in 0..(turns % 4) {
        (x, y) = (-y, x);
    }
    (x, y)
}

/// Rotates a point clockwise by `turns` quarter-turns around the center of
/// an `extent`-by-`extent` square footprint.
///
/// Uses doubled coordinates so the pivot (`extent/2`) never needs to leave
/// integer arithmetic, even when `extent` is odd.
#[must_use]
pub fn rotate_point(p: GridPoint, extent: i32, turns: u32) -> GridPoint {
    let (mut x, mut y) = (p.x, p.y);
    for _ in 0..(turns % 4) {
        let dx = 2 * x - extent;
        let dy = 2 * y - extent;
        let (ndx, ndy) = (-dy, dx);
        x = (ndx + extent) / 2;
        y = (ndy + extent) / 2;
    }
    GridPoint::new(x, y)
}

/// Finds the `n`th placement (in declaration order) matching `direction`,
/// where `n` is the port's slot index.
fn nth_placement(placements: &[PortPlacement], direction: Direction, slot: usize) -> Option<&PortPlacement> {
    placements.iter().filter(|p| p.direction == direction).nth(slot)
}

/// The absolute grid anchor of a port, given its owning node's position and
/// rotation. Returns `None` if no placement exists for `(direction, slot)`.
#[must_use]
pub fn port_anchor(node_position: GridPoint, rotation: Rotation, placements: &[PortPlacement], direction: Direction, slot: usize) -> Option<GridPoint> {
    let placement = nth_placement(placements, direction, slot)?;
    let extent = footprint_extent(placements);
    let local = local_anchor_unrotated(placement.side, placement.side_index, extent);
    let turns = rotation.quarter_turns();
    Some(node_position + rotate_point(local, extent, turns))
}

/// The grid point one unit outward from a port's anchor along its normal —
/// the far end of the unit-length routing stub.
#[must_use]
pub fn stub_end(node_position: GridPoint, rotation: Rotation, placements: &[PortPlacement], direction: Direction, slot: usize) -> Option<GridPoint> {
    let placement = nth_placement(placements, direction, slot)?;
    let anchor = port_anchor(node_position, rotation, placements, direction, slot)?;
    let turns = rotation.quarter_turns();
    let (dx, dy) = rotate_vector(outward_normal(placement.side), turns);
    Some(anchor + GridPoint::new(dx, dy))
}

#[cfg(test)]
mod tests {
    use super::*;
    use patch_core::PortRole;
    use patch_registry::{Archetype, port_placements};

    #[test]
    fn single_io_anchors_are_on_opposite_sides() {
        let placements = port_placements(Archetype::SingleIo, 1, 0, 1);
        let input = port_anchor(GridPoint::new(0, 0), Rotation::Deg0, &placements, Direction::Input, 0).unwrap();
        let output = port_anchor(GridPoint::new(0, 0), Rotation::Deg0, &placements, Direction::Output, 0).unwrap();
        assert_eq!(input, GridPoint::new(0, 1));
        assert_eq!(output, GridPoint::new(2, 1));
    }

    #[test]
    fn rotation_does_not_change_port_existence() {
        let placements = port_placements(Archetype::SingleIoControl, 1, 1, 1);
        for turns in 0..4 {
            let rotation = Rotation::from_degrees(turns * 90).unwrap();
            assert!(port_anchor(GridPoint::new(5, 5), rotation, &placements, Direction::Input, 0).is_some());
            assert!(port_anchor(GridPoint::new(5, 5), rotation, &placements, Direction::Input, 1).is_some());
            assert!(port_anchor(GridPoint::new(5, 5), rotation, &placements, Direction::Output, 0).is_some());
        }
    }

    #[test]
    fn full_turn_returns_to_the_original_anchor() {
        let placements = port_placements(Archetype::MultiOut6, 1, 0, 6);
        let base = port_anchor(GridPoint::new(3, 4), Rotation::Deg0, &placements, Direction::Output, 2).unwrap();
        let full_turn = port_anchor(GridPoint::new(3, 4), Rotation::Deg0, &placements, Direction::Output, 2).unwrap();
        assert_eq!(base, full_turn);
        // Rotating 90 four times (via repeated calls) returns to the start.
        let extent = footprint_extent(&placements);
        let mut p = base - GridPoint::new(3, 4);
        for _ in 0..4 {
            p = rotate_point(p, extent, 1);
        }
        assert_eq!(p, base - GridPoint::new(3, 4));
    }

    #[test]
    fn stub_end_moves_outward_along_normal() {
        let placements = port_placements(Archetype::SingleIo, 1, 0, 1);
        let anchor = port_anchor(GridPoint::new(0, 0), Rotation::Deg0, &placements, Direction::Output, 0).unwrap();
        let stub = stub_end(GridPoint::new(0, 0), Rotation::Deg0, &placements, Direction::Output, 0).unwrap();
        assert_eq!(stub, anchor + GridPoint::new(1, 0));
    }

    #[test]
    fn control_ports_follow_signal_ports_in_slot_order() {
        let placements = port_placements(Archetype::SingleIoControl, 1, 1, 1);
        let signal = placements.iter().filter(|p| p.direction == Direction::Input).next().unwrap();
        assert_eq!(signal.role, PortRole::Signal);
    }
}
