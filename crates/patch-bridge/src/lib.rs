//! Windowed scheduler bridging `patch-runtime`'s tick-based events to an
//! external audio clock's absolute seconds, in the host's canonical wire
//! format.
//!
//! `patch-bridge` is the only crate in the workspace that knows about
//! wall-clock time, sample selection, and the `{time, s, n, end, crush,
//! lpf, hpf}` record shape — everything upstream works purely in ticks.
//! It performs no audio I/O itself; the host page/process calls
//! [`AudioBridge::on_tick`] from its own clock callback and forwards the
//! returned records to its `evaluate(events[])` entrypoint.
//!
//! # Browser host requirement
//!
//! When the host page backs its DSP engine with `SharedArrayBuffer`
//! (required for some worklet-based implementations), it must serve
//! `Cross-Origin-Opener-Policy: same-origin` and
//! `Cross-Origin-Embedder-Policy: require-corp` — a deployment constraint
//! on the embedding page, not something this crate can enforce in code.
//!
//! # Example
//!
//! ```rust
//! use std::collections::HashMap;
//!
//! use patch_core::{EdgeId, SampleSlot};
//! use patch_model::{EdgeRecord, GraphSnapshot, NodeParams, NodeRecord, PortAddr};
//! use patch_registry::NodeRegistry;
//! use patch_runtime::{Runtime, RuntimeConfig};
//! use patch_bridge::{AudioBridge, BridgeConfig, HostLimits, TickClock};
//!
//! let registry = NodeRegistry::new().unwrap();
//! let mut snapshot = GraphSnapshot::new();
//! snapshot.nodes.push(NodeRecord {
//!     id: "p1".into(), type_key: "pulse".into(), position: patch_core::GridPoint::new(0, 0),
//!     rotation: patch_core::Rotation::Deg0, params: NodeParams::new(1), name: None, group_ref: None,
//! });
//! snapshot.nodes.push(NodeRecord {
//!     id: "o1".into(), type_key: "output".into(), position: patch_core::GridPoint::new(2, 0),
//!     rotation: patch_core::Rotation::Deg0, params: NodeParams::new(1), name: None, group_ref: None,
//! });
//! snapshot.edges.push(EdgeRecord { id: "e1".into(), from: PortAddr::new("p1", 0), to: PortAddr::new("o1", 0), corners: vec![] });
//!
//! let mut delays = HashMap::new();
//! delays.insert(EdgeId::from("e1"), 2.0);
//! let outcome = patch_build::compile(&snapshot, &registry, &delays);
//! let graph = outcome.graph.unwrap();
//! let mut runtime = Runtime::new(&graph, &registry, RuntimeConfig::default());
//! runtime.reset_pulses();
//!
//! let mut bridge = AudioBridge::new(TickClock::new(120.0, 0.0), BridgeConfig::default());
//! let samples: [Option<SampleSlot>; 8] = std::array::from_fn(|i| Some(SampleSlot { s: "bd".into(), n: i as u32 }));
//! let (events, _warnings, _runtime_warnings) =
//!     bridge.on_tick(&mut runtime, &registry, &samples, &HostLimits::default(), 0.0, 0.0);
//! ```

mod bridge;
mod clock;
mod event;
mod mapping;
mod warning;

pub use bridge::{AudioBridge, BridgeConfig, HostLimits, SampleTable};
pub use clock::{TICKS_PER_BEAT, TickClock};
pub use event::{EncodedEvent, MAX_EVENT_BYTES};
pub use mapping::{CRUSH_TABLE, DECAY_TABLE, EffectChannel, HPF_TABLE, LPF_TABLE};
pub use warning::BridgeWarning;
