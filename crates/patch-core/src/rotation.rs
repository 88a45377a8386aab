//! Node rotation, constrained to the four cardinal steps the editor allows.

/// A node's rotation in 90° steps around its center.
///
/// Rotation only ever affects port *anchors* (where a port sits on the
/// node's bounding box); it never permutes port *ordering*, which comes
/// from the registry layout alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
#[repr(i32)]
pub enum Rotation {
    /// No rotation.
    #[default]
    Deg0 = 0,
    /// Quarter turn clockwise.
    Deg90 = 90,
    /// Half turn.
    Deg180 = 180,
    /// Three-quarter turn clockwise.
    Deg270 = 270,
}

impl Rotation {
    /// Parses a raw degree value, accepting only the four valid steps.
    #[must_use]
    pub fn from_degrees(degrees: i32) -> Option<Self> {
        match degrees {
            0 => Some(Self::Deg0),
            90 => Some(Self::Deg90),
            180 => Some(Self::Deg180),
            270 => Some(Self::Deg270),
            _ => None,
        }
    }

    /// Returns the raw degree value.
    #[must_use]
    pub fn degrees(self) -> i32 {
        self as i32
    }

    /// Number of 90° quarter-turns clockwise, in `0..4`.
    #[must_use]
    pub fn quarter_turns(self) -> u32 {
        (self.degrees() / 90) as u32
    }
}
