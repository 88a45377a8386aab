//! End-to-end scenarios exercising the full runtime -> bridge pipeline.

use std::collections::HashMap;

use patch_core::{EdgeId, GridPoint, Rotation, SampleSlot};
use patch_model::{EdgeRecord, GraphSnapshot, NodeParams, NodeRecord, PortAddr};
use patch_registry::NodeRegistry;
use patch_runtime::{Runtime, RuntimeConfig};

use patch_bridge::{AudioBridge, BridgeConfig, HostLimits, TickClock};

fn node(id: &str, type_key: &str, x: i32, y: i32) -> NodeRecord {
    NodeRecord {
        id: id.into(),
        type_key: type_key.to_string(),
        position: GridPoint::new(x, y),
        rotation: Rotation::Deg0,
        params: NodeParams::new(1),
        name: None,
        group_ref: None,
    }
}

fn sample_table() -> [Option<SampleSlot>; 8] {
    std::array::from_fn(|i| Some(SampleSlot { s: "bd".into(), n: i as u32 }))
}

/// Scenario 6: two overlapping audio windows never emit the same event
/// twice, and every event is present exactly once, in ascending order.
#[test]
fn watermark_dedup_across_overlapping_windows() {
    let registry = NodeRegistry::new().unwrap();
    let mut snapshot = GraphSnapshot::new();
    snapshot.nodes.push(node("p1", "pulse", 0, 0));
    snapshot.nodes.push(node("o1", "output", 2, 0));
    snapshot.edges.push(EdgeRecord { id: "e1".into(), from: PortAddr::new("p1", 0), to: PortAddr::new("o1", 0), corners: vec![] });

    let mut delays = HashMap::new();
    delays.insert(EdgeId::from("e1"), 2.0);
    let outcome = patch_build::compile(&snapshot, &registry, &delays);
    let graph = outcome.graph.expect("compiles");
    let mut runtime = Runtime::new(&graph, &registry, RuntimeConfig::default());
    runtime.reset_pulses();

    // secondsPerTick = 60 / (1500 * 4) = 0.01s, so pulse period (4 ticks)
    // and edge delay (2 ticks) land at sub-second times: outputs fall at
    // ticks {2, 6, 10, 14, ...} -> {0.02, 0.06, 0.10, 0.14, ...} seconds.
    let clock = TickClock::new(1500.0, 0.0);
    let mut bridge = AudioBridge::new(clock, BridgeConfig { lookahead_sec: 0.0, horizon_sec: 0.1 });
    let samples = sample_table();
    let limits = HostLimits::default();

    let (first, _, _) = bridge.on_tick(&mut runtime, &registry, &samples, &limits, 0.0, 0.0);
    let (second, _, _) = bridge.on_tick(&mut runtime, &registry, &samples, &limits, 0.05, 0.0);

    let mut all_times: Vec<f64> = first.iter().chain(second.iter()).map(|e| e.time).collect();
    let before_dedup_len = all_times.len();
    all_times.sort_by(|a, b| a.partial_cmp(b).unwrap());
    all_times.dedup_by(|a, b| (*a - *b).abs() < 1e-9);
    assert_eq!(all_times.len(), before_dedup_len, "an event was emitted twice across overlapping windows");

    let sorted = {
        let mut v = all_times.clone();
        v.sort_by(|a, b| a.partial_cmp(b).unwrap());
        v
    };
    assert_eq!(all_times, sorted, "events must come back in ascending time order");
}

/// Param mapping end-to-end: a `decay` node on the signal path stashes its
/// raw param on the pulse overlay; the bridge resolves it through
/// `decayTable` before emitting.
#[test]
fn decay_param_resolves_through_its_table() {
    let registry = NodeRegistry::new().unwrap();
    let mut snapshot = GraphSnapshot::new();
    snapshot.nodes.push(node("p1", "pulse", 0, 0));
    let mut decay = node("d1", "decay", 2, 0);
    decay.params = NodeParams::new(8); // decayTable[8] = 0.125
    snapshot.nodes.push(decay);
    snapshot.nodes.push(node("o1", "output", 4, 0));
    snapshot.edges.push(EdgeRecord { id: "e1".into(), from: PortAddr::new("p1", 0), to: PortAddr::new("d1", 0), corners: vec![] });
    snapshot.edges.push(EdgeRecord { id: "e2".into(), from: PortAddr::new("d1", 0), to: PortAddr::new("o1", 0), corners: vec![] });

    let mut delays = HashMap::new();
    delays.insert(EdgeId::from("e1"), 1.0);
    delays.insert(EdgeId::from("e2"), 1.0);
    let outcome = patch_build::compile(&snapshot, &registry, &delays);
    let graph = outcome.graph.expect("compiles");
    let mut runtime = Runtime::new(&graph, &registry, RuntimeConfig::default());
    runtime.reset_pulses();

    let clock = TickClock::new(15.0, 0.0);
    let mut bridge = AudioBridge::new(clock, BridgeConfig { lookahead_sec: 0.0, horizon_sec: 1.0 });
    let samples = sample_table();
    let limits = HostLimits::default();

    let (events, _, _) = bridge.on_tick(&mut runtime, &registry, &samples, &limits, 0.0, 0.0);
    assert!(!events.is_empty());
    assert!((events[0].end - 0.125).abs() < 1e-9);
}
