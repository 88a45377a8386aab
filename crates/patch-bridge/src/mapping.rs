//! Per-value lookup tables resolving a node's raw `1..=8` param into the
//! wire-format numeric value an effect key carries.
//!
//! Utility nodes (`decay`, `crush`, `hpf`, `lpf`) stash their raw,
//! unmapped `param` on a pulse's [`patch_registry::ParamOverlay`], keyed by
//! the target name (`"end"`, `"crush"`, `"hpf"`, `"lpf"`) — see
//! `patch-registry`'s `effect_param_chain_behavior`. `patch-bridge` is the
//! only place that knows how to turn those raw values into the host's
//! actual numbers, since the registry has no notion of audio-wire format.

use patch_registry::NodeRegistry;

/// `1..8 -> 1.0 .. 0.125`, output key `end` (decay/release length).
pub const DECAY_TABLE: [f64; 8] = [1.0, 0.875, 0.75, 0.625, 0.5, 0.375, 0.25, 0.125];

/// `1..8 -> 16 .. 2`, output key `crush` (bit-crush depth).
pub const CRUSH_TABLE: [f64; 8] = [16.0, 14.0, 12.0, 10.0, 8.0, 6.0, 4.0, 2.0];

/// `1..8 -> 100 .. 12000`, output key `hpf` (high-pass cutoff in Hz).
pub const HPF_TABLE: [f64; 8] = [100.0, 200.0, 400.0, 800.0, 1600.0, 3200.0, 6400.0, 12000.0];

/// `1..8 -> 12000 .. 100`, output key `lpf` (low-pass cutoff in Hz).
pub const LPF_TABLE: [f64; 8] = [12000.0, 6400.0, 3200.0, 1600.0, 800.0, 400.0, 200.0, 100.0];

/// The four effect-parameter channels the bridge can resolve, matching
/// `patch_registry::MappingTable` one-for-one but owning the actual
/// numeric tables (the registry only records *which* table a node uses,
/// never the resolved values — it has no notion of wire format).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EffectChannel {
    /// `end` — decay/release length.
    Decay,
    /// `crush` — bit-crush depth.
    Crush,
    /// `hpf` — high-pass cutoff.
    Hpf,
    /// `lpf` — low-pass cutoff.
    Lpf,
}

impl EffectChannel {
    /// All four channels, in the canonical record's field order.
    pub const ALL: [EffectChannel; 4] = [EffectChannel::Decay, EffectChannel::Crush, EffectChannel::Hpf, EffectChannel::Lpf];

    /// The params-overlay / wire-record key this channel is carried under.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            EffectChannel::Decay => "end",
            EffectChannel::Crush => "crush",
            EffectChannel::Hpf => "hpf",
            EffectChannel::Lpf => "lpf",
        }
    }

    /// The builtin node type whose `default_param` backs this channel when
    /// a pulse's overlay doesn't carry the key (no node of that type sat
    /// on the signal's path).
    #[must_use]
    pub fn registry_type_key(self) -> &'static str {
        match self {
            EffectChannel::Decay => "decay",
            EffectChannel::Crush => "crush",
            EffectChannel::Hpf => "hpf",
            EffectChannel::Lpf => "lpf",
        }
    }

    /// Resolves a clamped `1..=8` raw value through this channel's table.
    #[must_use]
    pub fn resolve(self, raw_1_8: i32) -> f64 {
        let idx = (raw_1_8.clamp(1, 8) - 1) as usize;
        match self {
            EffectChannel::Decay => DECAY_TABLE[idx],
            EffectChannel::Crush => CRUSH_TABLE[idx],
            EffectChannel::Hpf => HPF_TABLE[idx],
            EffectChannel::Lpf => LPF_TABLE[idx],
        }
    }

    /// The resolved value to use when a pulse's overlay carries no entry
    /// for this channel: the registry's default `param` for the channel's
    /// builtin type (or `1` if, implausibly, that type isn't registered).
    #[must_use]
    pub fn default_resolved(self, registry: &NodeRegistry) -> f64 {
        let raw = registry.get(self.registry_type_key()).map_or(1, |d| d.default_param);
        self.resolve(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decay_table_matches_spec_endpoints() {
        assert_eq!(EffectChannel::Decay.resolve(1), 1.0);
        assert_eq!(EffectChannel::Decay.resolve(8), 0.125);
    }

    #[test]
    fn crush_table_is_descending() {
        assert_eq!(EffectChannel::Crush.resolve(1), 16.0);
        assert_eq!(EffectChannel::Crush.resolve(8), 2.0);
    }

    #[test]
    fn hpf_and_lpf_tables_are_mirrored() {
        for v in 1..=8 {
            assert_eq!(EffectChannel::Hpf.resolve(v), EffectChannel::Lpf.resolve(9 - v));
        }
    }

    #[test]
    fn out_of_range_raw_values_clamp_before_lookup() {
        assert_eq!(EffectChannel::Decay.resolve(0), EffectChannel::Decay.resolve(1));
        assert_eq!(EffectChannel::Decay.resolve(20), EffectChannel::Decay.resolve(8));
    }

    #[test]
    fn default_resolved_falls_back_to_registry_default_param() {
        let registry = NodeRegistry::new().unwrap();
        // Builtin `decay` has default_param 1 -> table[0] == 1.0.
        assert_eq!(EffectChannel::Decay.default_resolved(&registry), 1.0);
    }
}
