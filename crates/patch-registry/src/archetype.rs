//! Port-placement archetypes.
//!
//! An archetype is a named template that decides which side of a node's
//! bounding box each port lives on, and that side's local ordering. It does
//! *not* decide grid coordinates — that is `patch-routing`'s job, given a
//! node's position, rotation, and the placements this module produces.

use patch_core::{Direction, PortRole, Side};

/// A named port-placement template.
///
/// `Custom` is reserved for group-node instances, whose port placement is
/// driven by the group's `inputs`/`outputs`/`controls` mappings rather than
/// a fixed archetype (see `patch-registry::GroupPorts`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Archetype {
    /// One left input, one right output.
    SingleIo,
    /// One left signal input, one left control input, one right output.
    SingleIoControl,
    /// One left input, no outputs (a terminal/sink shape).
    SingleIn,
    /// One left input, six outputs across top/right/bottom.
    MultiOut6,
    /// `MultiOut6` plus one left control input.
    MultiOut6Control,
    /// Six inputs across top/right/bottom, one left output (mirror of `MultiOut6`).
    MultiIn6,
    /// Port placement driven by an external `GroupPorts` mapping, not a fixed shape.
    Custom,
}

impl Archetype {
    /// Returns the `(inputs, outputs, control_ports)` counts this archetype
    /// requires — used by `patch-registry`'s `REG_PORT_COUNT_MISMATCH` check.
    ///
    /// Returns `None` for `Custom`, whose counts come from a `GroupPorts`
    /// mapping supplied at call time, not a fixed shape.
    #[must_use]
    pub fn fixed_counts(self) -> Option<(usize, usize, usize)> {
        match self {
            Archetype::SingleIo => Some((1, 1, 0)),
            Archetype::SingleIoControl => Some((1, 1, 1)),
            Archetype::SingleIn => Some((1, 0, 0)),
            Archetype::MultiOut6 => Some((1, 6, 0)),
            Archetype::MultiOut6Control => Some((1, 6, 1)),
            Archetype::MultiIn6 => Some((6, 1, 0)),
            Archetype::Custom => None,
        }
    }

    /// Allows a control port at all (used by `REG_CONTROL_ON_DISALLOWED_LAYOUT`).
    #[must_use]
    pub fn allows_control(self) -> bool {
        matches!(
            self,
            Archetype::SingleIoControl | Archetype::MultiOut6Control | Archetype::Custom
        )
    }
}

/// Placement of a single port: which side it's anchored to, and its
/// zero-based index among the ports sharing that side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortPlacement {
    /// Direction (input/output).
    pub direction: Direction,
    /// Control vs signal role (inputs only; outputs are always signal).
    pub role: PortRole,
    /// Side of the node the port anchors to.
    pub side: Side,
    /// Index among the ports that share `side`, in top-to-bottom /
    /// left-to-right placement order.
    pub side_index: usize,
}

/// The fixed clockwise ordering used by every 6-way archetype, at rotation 0.
///
/// `top-left, top-right, right-top, right-bottom, bottom-right, bottom-left`.
/// This ordering is rotation-invariant: rotation changes which grid direction
/// "top" faces, never which slot index maps to which side-relative position.
const SIX_WAY_SIDES: [(Side, usize); 6] = [
    (Side::Top, 0),
    (Side::Top, 1),
    (Side::Right, 0),
    (Side::Right, 1),
    (Side::Bottom, 1),
    (Side::Bottom, 0),
];

/// Computes the ordered port placements for a non-custom archetype.
///
/// Inputs are ordered `[signal ports ... control ports]` per the universal
/// invariant; within the signal-input block and the output block, ports keep
/// registry declaration order.
#[must_use]
pub fn port_placements(archetype: Archetype, signal_inputs: usize, control_inputs: usize, outputs: usize) -> Vec<PortPlacement> {
    let mut placements = Vec::with_capacity(signal_inputs + control_inputs + outputs);

    match archetype {
        Archetype::SingleIo | Archetype::SingleIoControl | Archetype::SingleIn => {
            for i in 0..signal_inputs {
                placements.push(PortPlacement { direction: Direction::Input, role: PortRole::Signal, side: Side::Left, side_index: i });
            }
            for i in 0..control_inputs {
                placements.push(PortPlacement { direction: Direction::Input, role: PortRole::Control, side: Side::Left, side_index: signal_inputs + i });
            }
            for i in 0..outputs {
                placements.push(PortPlacement { direction: Direction::Output, role: PortRole::Signal, side: Side::Right, side_index: i });
            }
        }
        Archetype::MultiOut6 | Archetype::MultiOut6Control => {
            for i in 0..signal_inputs {
                placements.push(PortPlacement { direction: Direction::Input, role: PortRole::Signal, side: Side::Left, side_index: i });
            }
            for i in 0..control_inputs {
                placements.push(PortPlacement { direction: Direction::Input, role: PortRole::Control, side: Side::Left, side_index: signal_inputs + i });
            }
            for (i, &(side, side_index)) in SIX_WAY_SIDES.iter().enumerate().take(outputs) {
                let _ = i;
                placements.push(PortPlacement { direction: Direction::Output, role: PortRole::Signal, side, side_index });
            }
        }
        Archetype::MultiIn6 => {
            for (i, &(side, side_index)) in SIX_WAY_SIDES.iter().enumerate().take(signal_inputs) {
                let _ = i;
                placements.push(PortPlacement { direction: Direction::Input, role: PortRole::Signal, side, side_index });
            }
            for i in 0..control_inputs {
                placements.push(PortPlacement { direction: Direction::Input, role: PortRole::Control, side: Side::Left, side_index: i });
            }
            for i in 0..outputs {
                placements.push(PortPlacement { direction: Direction::Output, role: PortRole::Signal, side: Side::Left, side_index: i });
            }
        }
        Archetype::Custom => {
            // Custom placement is computed by `group_port_placements` instead.
        }
    }

    placements
}

/// External port mapping for a group-node instance (`Archetype::Custom`).
///
/// Mirrors `GroupDefinition.inputs/outputs/controls` ordering: signal inputs
/// on the left edge, then controls appended after signal inputs on the left
/// edge, then outputs on the right edge.
#[derive(Debug, Clone, Copy)]
pub struct GroupPorts {
    /// Number of mapped signal inputs.
    pub signal_inputs: usize,
    /// Number of mapped control inputs.
    pub control_inputs: usize,
    /// Number of mapped outputs.
    pub outputs: usize,
}

/// Computes port placements for a group-node instance.
#[must_use]
pub fn group_port_placements(group: GroupPorts) -> Vec<PortPlacement> {
    let mut placements = Vec::with_capacity(group.signal_inputs + group.control_inputs + group.outputs);
    for i in 0..group.signal_inputs {
        placements.push(PortPlacement { direction: Direction::Input, role: PortRole::Signal, side: Side::Left, side_index: i });
    }
    for i in 0..group.control_inputs {
        placements.push(PortPlacement { direction: Direction::Input, role: PortRole::Control, side: Side::Left, side_index: group.signal_inputs + i });
    }
    for i in 0..group.outputs {
        placements.push(PortPlacement { direction: Direction::Output, role: PortRole::Signal, side: Side::Right, side_index: i });
    }
    placements
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_io_control_orders_signal_before_control() {
        let placements = port_placements(Archetype::SingleIoControl, 1, 1, 1);
        let inputs: Vec<_> = placements.iter().filter(|p| p.direction == Direction::Input).collect();
        assert_eq!(inputs[0].role, PortRole::Signal);
        assert_eq!(inputs[1].role, PortRole::Control);
    }

    #[test]
    fn multi_out_6_uses_fixed_clockwise_order() {
        let placements = port_placements(Archetype::MultiOut6, 1, 0, 6);
        let outputs: Vec<_> = placements.iter().filter(|p| p.direction == Direction::Output).collect();
        assert_eq!(outputs.len(), 6);
        assert_eq!(outputs[0].side, Side::Top);
        assert_eq!(outputs[5].side, Side::Bottom);
    }

    #[test]
    fn multi_in_6_mirrors_multi_out_6() {
        let out_placements = port_placements(Archetype::MultiOut6, 0, 0, 6);
        let in_placements = port_placements(Archetype::MultiIn6, 6, 0, 0);
        for (o, i) in out_placements.iter().zip(in_placements.iter()) {
            assert_eq!(o.side, i.side);
            assert_eq!(o.side_index, i.side_index);
        }
    }

    #[test]
    fn fixed_counts_match_archetype_shape() {
        assert_eq!(Archetype::SingleIo.fixed_counts(), Some((1, 1, 0)));
        assert_eq!(Archetype::SingleIn.fixed_counts(), Some((1, 0, 0)));
        assert_eq!(Archetype::Custom.fixed_counts(), None);
    }
}
