//! The fixed builtin node-type catalog.
//!
//! Registered one `register(descriptor)` call per type from
//! `NodeRegistry::new()`, following the `register_builtin_effects()` pattern
//! of a private method that calls `register` once per entry rather than a
//! data table, so each type's behavior functions sit next to its descriptor.

use crate::archetype::Archetype;
use crate::ctx::{ControlOutcome, NodeCtx, NodeState, OutputPulse, SignalOutcome};
use crate::descriptor::{Behavior, GeneratorSpec, MappingTable, NodeDescriptor, ParamMap};

fn init_state_empty(_param: i32) -> NodeState {
    NodeState::Empty
}

fn init_state_scratch(param: i32) -> NodeState {
    NodeState::Scratch(param)
}

fn pass_through(ctx: &NodeCtx) -> OutputPulse {
    OutputPulse { slot: 0, value: ctx.pulse.value, speed: None, params: None }
}

fn on_signal_pulse(ctx: &mut NodeCtx) -> SignalOutcome {
    SignalOutcome { outputs: vec![pass_through(ctx)], state: None }
}

fn on_signal_output_sink(ctx: &mut NodeCtx) -> SignalOutcome {
    SignalOutcome { outputs: vec![pass_through(ctx)], state: None }
}

fn on_control_set(ctx: &mut NodeCtx) -> ControlOutcome {
    let value = ctx.pulse.value;
    ControlOutcome { param: Some(value), state: Some(NodeState::Scratch(value)) }
}

fn on_signal_set(ctx: &mut NodeCtx) -> SignalOutcome {
    let value = ctx.param;
    SignalOutcome {
        outputs: vec![OutputPulse { slot: 0, value, speed: None, params: None }],
        state: None,
    }
}

fn on_signal_speed(ctx: &mut NodeCtx) -> SignalOutcome {
    let speed = ctx.param;
    SignalOutcome {
        outputs: vec![OutputPulse { slot: 0, value: ctx.pulse.value, speed: Some(speed), params: None }],
        state: None,
    }
}

fn on_signal_random(ctx: &mut NodeCtx) -> SignalOutcome {
    let value = ctx.rng.next_1_8();
    SignalOutcome {
        outputs: vec![OutputPulse { slot: 0, value, speed: None, params: None }],
        state: None,
    }
}

fn effect_param_chain_behavior(target: &'static str) -> impl Fn(&mut NodeCtx) -> SignalOutcome {
    move |ctx: &mut NodeCtx| {
        let mut overlay = ctx.pulse.params.clone().unwrap_or_default();
        overlay.insert(target.to_string(), f64::from(ctx.param));
        SignalOutcome {
            outputs: vec![OutputPulse {
                slot: 0,
                value: ctx.pulse.value,
                speed: None,
                params: Some(overlay),
            }],
            state: None,
        }
    }
}

fn on_signal_decay(ctx: &mut NodeCtx) -> SignalOutcome {
    effect_param_chain_behavior("end")(ctx)
}

fn on_signal_crush(ctx: &mut NodeCtx) -> SignalOutcome {
    effect_param_chain_behavior("crush")(ctx)
}

fn on_signal_hpf(ctx: &mut NodeCtx) -> SignalOutcome {
    effect_param_chain_behavior("hpf")(ctx)
}

fn on_signal_lpf(ctx: &mut NodeCtx) -> SignalOutcome {
    effect_param_chain_behavior("lpf")(ctx)
}

/// Fans the incoming pulse out to every output slot of a `multi-out-6`
/// archetype. The build/runtime layer only wires edges to the slots that
/// are actually connected, so emitting all six unconditionally is safe —
/// unconnected slots simply have no outgoing edge to travel along.
fn on_signal_splitter6(ctx: &mut NodeCtx) -> SignalOutcome {
    let outputs = (0..6)
        .map(|slot| OutputPulse { slot, value: ctx.pulse.value, speed: None, params: None })
        .collect();
    SignalOutcome { outputs, state: None }
}

fn on_signal_merger6(ctx: &mut NodeCtx) -> SignalOutcome {
    SignalOutcome {
        outputs: vec![OutputPulse { slot: 0, value: ctx.pulse.value, speed: None, params: None }],
        state: None,
    }
}

fn on_control_gate6(ctx: &mut NodeCtx) -> ControlOutcome {
    ControlOutcome { param: Some(ctx.pulse.value), state: None }
}

/// Routes the incoming pulse to exactly one of six outputs, selected by the
/// node's current `param` (1-based, clamped into range).
fn on_signal_gate6(ctx: &mut NodeCtx) -> SignalOutcome {
    let slot = (ctx.param.clamp(1, 6) - 1) as usize;
    SignalOutcome {
        outputs: vec![OutputPulse { slot, value: ctx.pulse.value, speed: None, params: None }],
        state: None,
    }
}

/// Returns the fixed builtin catalog: `(descriptor)` pairs consumed by
/// `NodeRegistry::new()`.
pub(crate) fn builtin_descriptors() -> Vec<NodeDescriptor> {
    vec![
        NodeDescriptor {
            type_key: "pulse",
            display_name: "Pulse",
            layout: Archetype::SingleIo,
            inputs: 1,
            outputs: 1,
            control_ports: 0,
            default_param: 1,
            param_map: None,
            is_sink: false,
            is_structural: false,
            generator: Some(GeneratorSpec { period_ticks: 4.0 }),
            behavior: Behavior { init_state: init_state_empty, on_control: None, on_signal: Some(on_signal_pulse) },
        },
        NodeDescriptor {
            type_key: "output",
            display_name: "Output",
            layout: Archetype::SingleIn,
            inputs: 1,
            outputs: 0,
            control_ports: 0,
            default_param: 1,
            param_map: None,
            is_sink: true,
            is_structural: false,
            generator: None,
            behavior: Behavior { init_state: init_state_empty, on_control: None, on_signal: Some(on_signal_output_sink) },
        },
        NodeDescriptor {
            type_key: "set",
            display_name: "Set",
            layout: Archetype::SingleIoControl,
            inputs: 1,
            outputs: 1,
            control_ports: 1,
            default_param: 1,
            param_map: None,
            is_sink: false,
            is_structural: false,
            generator: None,
            behavior: Behavior { init_state: init_state_scratch, on_control: Some(on_control_set), on_signal: Some(on_signal_set) },
        },
        NodeDescriptor {
            type_key: "speed",
            display_name: "Speed",
            layout: Archetype::SingleIo,
            inputs: 1,
            outputs: 1,
            control_ports: 0,
            default_param: 1,
            param_map: None,
            is_sink: false,
            is_structural: false,
            generator: None,
            behavior: Behavior { init_state: init_state_empty, on_control: None, on_signal: Some(on_signal_speed) },
        },
        NodeDescriptor {
            type_key: "random",
            display_name: "Random",
            layout: Archetype::SingleIo,
            inputs: 1,
            outputs: 1,
            control_ports: 0,
            default_param: 1,
            param_map: None,
            is_sink: false,
            is_structural: false,
            generator: None,
            behavior: Behavior { init_state: init_state_empty, on_control: None, on_signal: Some(on_signal_random) },
        },
        NodeDescriptor {
            type_key: "decay",
            display_name: "Decay",
            layout: Archetype::SingleIo,
            inputs: 1,
            outputs: 1,
            control_ports: 0,
            default_param: 1,
            param_map: Some(ParamMap { target: "end", mapping: MappingTable::Decay }),
            is_sink: false,
            is_structural: false,
            generator: None,
            behavior: Behavior { init_state: init_state_empty, on_control: None, on_signal: Some(on_signal_decay) },
        },
        NodeDescriptor {
            type_key: "crush",
            display_name: "Crush",
            layout: Archetype::SingleIo,
            inputs: 1,
            outputs: 1,
            control_ports: 0,
            default_param: 1,
            param_map: Some(ParamMap { target: "crush", mapping: MappingTable::Crush }),
            is_sink: false,
            is_structural: false,
            generator: None,
            behavior: Behavior { init_state: init_state_empty, on_control: None, on_signal: Some(on_signal_crush) },
        },
        NodeDescriptor {
            type_key: "hpf",
            display_name: "High-pass Filter",
            layout: Archetype::SingleIo,
            inputs: 1,
            outputs: 1,
            control_ports: 0,
            default_param: 1,
            param_map: Some(ParamMap { target: "hpf", mapping: MappingTable::Hpf }),
            is_sink: false,
            is_structural: false,
            generator: None,
            behavior: Behavior { init_state: init_state_empty, on_control: None, on_signal: Some(on_signal_hpf) },
        },
        NodeDescriptor {
            type_key: "lpf",
            display_name: "Low-pass Filter",
            layout: Archetype::SingleIo,
            inputs: 1,
            outputs: 1,
            control_ports: 0,
            default_param: 1,
            param_map: Some(ParamMap { target: "lpf", mapping: MappingTable::Lpf }),
            is_sink: false,
            is_structural: false,
            generator: None,
            behavior: Behavior { init_state: init_state_empty, on_control: None, on_signal: Some(on_signal_lpf) },
        },
        NodeDescriptor {
            type_key: "splitter6",
            display_name: "Splitter (6-way)",
            layout: Archetype::MultiOut6,
            inputs: 1,
            outputs: 6,
            control_ports: 0,
            default_param: 1,
            param_map: None,
            is_sink: false,
            is_structural: false,
            generator: None,
            behavior: Behavior { init_state: init_state_empty, on_control: None, on_signal: Some(on_signal_splitter6) },
        },
        NodeDescriptor {
            type_key: "merger6",
            display_name: "Merger (6-way)",
            layout: Archetype::MultiIn6,
            inputs: 6,
            outputs: 1,
            control_ports: 0,
            default_param: 1,
            param_map: None,
            is_sink: false,
            is_structural: false,
            generator: None,
            behavior: Behavior { init_state: init_state_empty, on_control: None, on_signal: Some(on_signal_merger6) },
        },
        NodeDescriptor {
            type_key: "gate6",
            display_name: "Gate (6-way)",
            layout: Archetype::MultiOut6Control,
            inputs: 1,
            outputs: 6,
            control_ports: 1,
            default_param: 1,
            param_map: None,
            is_sink: false,
            is_structural: false,
            generator: None,
            behavior: Behavior { init_state: init_state_empty, on_control: Some(on_control_gate6), on_signal: Some(on_signal_gate6) },
        },
        NodeDescriptor {
            type_key: "group",
            display_name: "Group",
            layout: Archetype::Custom,
            inputs: 0,
            outputs: 0,
            control_ports: 0,
            default_param: 1,
            param_map: None,
            is_sink: false,
            is_structural: true,
            generator: None,
            behavior: Behavior { init_state: init_state_empty, on_control: None, on_signal: None },
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_has_thirteen_entries_with_unique_keys() {
        let descriptors = builtin_descriptors();
        assert_eq!(descriptors.len(), 13);
        let mut keys: Vec<_> = descriptors.iter().map(|d| d.type_key).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), 13);
    }

    #[test]
    fn only_group_is_structural() {
        for d in builtin_descriptors() {
            assert_eq!(d.is_structural, d.type_key == "group");
        }
    }
}
