//! Shared types for the patchgraph engine crates.
//!
//! This crate provides the identifiers, grid geometry primitives, and
//! clamping helpers used by every downstream crate (`patch-registry`,
//! `patch-model`, `patch-routing`, `patch-build`, `patch-runtime`,
//! `patch-bridge`). It has no knowledge of graph topology, routing, or
//! scheduling — just the vocabulary those crates share.
//!
//! # Example
//!
//! ```rust
//! use patch_core::{GridPoint, NodeId, clamp_1_to_8};
//!
//! let a = NodeId::from("osc-1");
//! let p = GridPoint::new(2, 3);
//! assert_eq!(clamp_1_to_8(12), 8);
//! assert_eq!(a.as_str(), "osc-1");
//! ```

mod ids;
mod rotation;

pub use ids::{EdgeId, NodeId};
pub use rotation::Rotation;

/// Clamps an integer into the `1..=8` range used by params, pulse values, and speeds.
///
/// All boundary crossings in the runtime and audio bridge pass values
/// through this function rather than trusting upstream validation, per the
/// "clamp defensively at the runtime boundary" invariant.
#[must_use]
pub fn clamp_1_to_8(value: i32) -> i32 {
    value.clamp(1, 8)
}

/// Direction of a port relative to its owning node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Direction {
    /// Receives a pulse.
    Input,
    /// Emits a pulse.
    Output,
}

/// Role a port (and, once connected, an edge) plays in the control-first
/// scheduling model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PortRole {
    /// Carries audio-trigger pulses; invokes `onSignal`.
    Signal,
    /// Carries control pulses; invokes `onControl`.
    Control,
}

/// Side of a node's bounding box a port is anchored to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Side {
    /// Left edge.
    Left,
    /// Right edge.
    Right,
    /// Top edge.
    Top,
    /// Bottom edge.
    Bottom,
}

/// Identity of a derived port: never stored, always recomputed from a node
/// plus the registry layout that describes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PortRef<'a> {
    /// Owning node.
    pub node: &'a NodeId,
    /// Input or output.
    pub direction: Direction,
    /// Zero-based index into the node's input or output list.
    pub slot: usize,
}

/// One slot in the project's 8-slot sample table (`samples?: Slot[8]` in
/// §6's project JSON), identifying a sample by folder/name. Lives here
/// rather than in `patch-config` alone since `patch-bridge`'s sample
/// selection (`value ∈ 1..=8` indexes into this table) needs the same
/// shape without depending on the persistence crate.
#[derive(Debug, Clone, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub struct SampleSlot {
    /// Sample bank/folder, e.g. `"bd"`.
    pub s: String,
    /// Sample index within the bank.
    pub n: u32,
}

/// An integer grid coordinate.
///
/// Node positions and manual cable corners are always integer grid
/// coordinates; routing geometry and delay derivation both operate purely
/// in this space (1 grid unit ≡ 1 tick by default, see `patch-routing`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
pub struct GridPoint {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
}

impl GridPoint {
    /// Creates a new grid point.
    #[must_use]
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Manhattan distance to another point.
    ///
    /// Routing only ever produces axis-aligned segments, so Manhattan
    /// distance between consecutive polyline points equals their Euclidean
    /// segment length — this is the basis of the `totalLength` invariant.
    #[must_use]
    pub fn manhattan_distance(self, other: GridPoint) -> i64 {
        (i64::from(self.x) - i64::from(other.x)).abs()
            + (i64::from(self.y) - i64::from(other.y)).abs()
    }
}

impl core::ops::Add for GridPoint {
    type Output = GridPoint;

    fn add(self, rhs: GridPoint) -> GridPoint {
        GridPoint::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl core::ops::Sub for GridPoint {
    type Output = GridPoint;

    fn sub(self, rhs: GridPoint) -> GridPoint {
        GridPoint::new(self.x - rhs.x, self.y - rhs.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_clips_both_ends() {
        assert_eq!(clamp_1_to_8(-5), 1);
        assert_eq!(clamp_1_to_8(0), 1);
        assert_eq!(clamp_1_to_8(1), 1);
        assert_eq!(clamp_1_to_8(8), 8);
        assert_eq!(clamp_1_to_8(9), 8);
        assert_eq!(clamp_1_to_8(100), 8);
    }

    #[test]
    fn manhattan_distance_is_axis_sum() {
        let a = GridPoint::new(0, 0);
        let b = GridPoint::new(3, -4);
        assert_eq!(a.manhattan_distance(b), 7);
    }

    #[test]
    fn grid_point_arithmetic() {
        let a = GridPoint::new(1, 2);
        let b = GridPoint::new(3, 4);
        assert_eq!(a + b, GridPoint::new(4, 6));
        assert_eq!(b - a, GridPoint::new(2, 2));
    }
}
