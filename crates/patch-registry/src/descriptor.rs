//! Node-type descriptors: the static shape of a registry entry.

use crate::archetype::Archetype;
use crate::ctx::{ControlOutcome, NodeCtx, NodeState, SignalOutcome};

/// A const lookup table a `paramMap` can reference, keyed by its name.
///
/// Values are resolved by `patch-bridge`, not here — the registry only
/// records *which* table a node's `param` maps through and under what
/// output key, since the registry has no notion of audio-wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MappingTable {
    /// `1..8 -> 1.0 .. 0.125`, output key `end`.
    Decay,
    /// `1..8 -> 16 .. 2`, output key `crush`.
    Crush,
    /// `1..8 -> 100 .. 12000`, output key `hpf`.
    Hpf,
    /// `1..8 -> 12000 .. 100`, output key `lpf`.
    Lpf,
}

impl MappingTable {
    /// The wire-format key this table's resolved value is emitted under.
    #[must_use]
    pub fn output_key(self) -> &'static str {
        match self {
            MappingTable::Decay => "end",
            MappingTable::Crush => "crush",
            MappingTable::Hpf => "hpf",
            MappingTable::Lpf => "lpf",
        }
    }
}

/// Declares that a node's `param` should be carried, under `target`, through
/// a named const table before reaching the audio bridge's wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamMap {
    /// Key the mapped value is stashed under in a pulse's params overlay.
    pub target: &'static str,
    /// Which table resolves the raw `1..=8` param.
    pub mapping: MappingTable,
}

/// Period, in ticks, a `pulse`-archetype generator self-retriggers at.
///
/// Only generators (nodes with no real incoming edges, self-scheduling via
/// `reset_pulses`) carry this; everything else is `None`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeneratorSpec {
    /// Self-trigger period in ticks.
    pub period_ticks: f64,
}

/// Behavior functions for a node type, represented as plain function
/// pointers rather than trait objects — node behaviors are pure functions
/// over an explicit `NodeCtx`, never stateful objects with their own
/// lifetime, so a vtable-free `fn` table is both sufficient and cheap to
/// copy into a `NodeDescriptor`.
#[derive(Clone, Copy)]
pub struct Behavior {
    /// Produces the node's initial persistent state from its merged `param`.
    pub init_state: fn(param: i32) -> NodeState,
    /// Consumes a control pulse; `None` if the type has no control port.
    pub on_control: Option<fn(&mut NodeCtx) -> ControlOutcome>,
    /// Consumes a signal pulse and produces zero or more outputs. `None`
    /// only for structural types (the group pseudo-type), which are
    /// flattened away at build time and never actually invoked; every
    /// other type is validated to carry one (`REG_MISSING_ON_SIGNAL`).
    pub on_signal: Option<fn(&mut NodeCtx) -> SignalOutcome>,
}

/// A static catalog entry: one per node `type`.
#[derive(Clone, Copy)]
pub struct NodeDescriptor {
    /// Kebab-case, unique type key.
    pub type_key: &'static str,
    /// Human-readable name for editor UI.
    pub display_name: &'static str,
    /// Port-placement archetype.
    pub layout: Archetype,
    /// Number of signal inputs.
    pub inputs: usize,
    /// Number of outputs.
    pub outputs: usize,
    /// Number of control inputs.
    pub control_ports: usize,
    /// Default `param` value (`1..=8`) when a snapshot doesn't override it.
    pub default_param: i32,
    /// Optional effect-parameter mapping.
    pub param_map: Option<ParamMap>,
    /// `true` for `output`: the runtime records its pulses and emits no
    /// further downstream events from it.
    pub is_sink: bool,
    /// `true` for the group pseudo-type: exempted from the "missing
    /// `onSignal`" validation rule and never actually invoked at runtime,
    /// since group instances are fully flattened away at build time.
    pub is_structural: bool,
    /// Self-trigger period, for generator types.
    pub generator: Option<GeneratorSpec>,
    /// Behavior function table.
    pub behavior: Behavior,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mapping_tables_report_their_output_key() {
        assert_eq!(MappingTable::Decay.output_key(), "end");
        assert_eq!(MappingTable::Crush.output_key(), "crush");
        assert_eq!(MappingTable::Hpf.output_key(), "hpf");
        assert_eq!(MappingTable::Lpf.output_key(), "lpf");
    }
}
