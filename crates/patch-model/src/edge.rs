//! Edge records: directed connections between node ports.

use patch_core::{EdgeId, GridPoint, NodeId};

/// One endpoint of an edge: a node plus a zero-based port slot.
///
/// The slot is direction-qualified by context — `EdgeRecord::from` is always
/// an output slot, `EdgeRecord::to` is always an input slot (which, per the
/// universal invariant, spans `[signal ports ... control ports]`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct PortAddr {
    /// Owning node.
    pub node: NodeId,
    /// Zero-based slot index into that node's input or output list.
    pub slot: usize,
}

impl PortAddr {
    /// Constructs a port address.
    #[must_use]
    pub fn new(node: impl Into<NodeId>, slot: usize) -> Self {
        Self { node: node.into(), slot }
    }
}

/// A directed edge from an output port to an input port, with manual
/// routing corners.
///
/// `corners` are hard constraints preserved in order by `patch-routing`;
/// they are never reordered or deduplicated by the model itself.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct EdgeRecord {
    /// Stable, author-supplied identifier.
    pub id: EdgeId,
    /// Source: an output port.
    pub from: PortAddr,
    /// Destination: an input port.
    pub to: PortAddr,
    /// Manual corners in integer grid coordinates, in order.
    #[serde(default)]
    pub corners: Vec<GridPoint>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_json() {
        let edge = EdgeRecord {
            id: EdgeId::from("e-1"),
            from: PortAddr::new("osc-1", 0),
            to: PortAddr::new("out-1", 0),
            corners: vec![GridPoint::new(1, 1)],
        };
        let json = serde_json::to_string(&edge).unwrap();
        let back: EdgeRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, edge);
    }
}
