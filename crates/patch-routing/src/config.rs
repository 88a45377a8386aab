//! Routing configuration: the only tunables the algorithm consults.

/// Which direction an unaligned two-segment bend resolves to when both
/// directions are equally valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BendPreference {
    /// Route the horizontal segment first.
    #[default]
    HorizontalFirst,
    /// Route the vertical segment first.
    VerticalFirst,
}

/// Tunables for `route_edge`/`route_batch`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoutingConfig {
    /// Grid units consumed by one tick of delay. Default `1.0`.
    pub ticks_per_grid: f64,
    /// Tie-break direction when `|Δx| == |Δy|` between two waypoints.
    pub bend_preference: BendPreference,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self { ticks_per_grid: 1.0, bend_preference: BendPreference::HorizontalFirst }
    }
}
