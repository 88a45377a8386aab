//! The windowed scheduler: pulls a tick-bounded batch from a [`Runtime`],
//! maps it to the host wire format, and dedups across overlapping windows.

use patch_core::{NodeId, SampleSlot};
use patch_registry::NodeRegistry;
use patch_runtime::{Runtime, RuntimeWarning};
use tracing::{debug, trace, warn};

use crate::clock::TickClock;
use crate::event::{EncodedEvent, resolved_channel};
use crate::mapping::EffectChannel;
use crate::warning::BridgeWarning;

/// Tunables for the windowing discipline: 60ms lookahead, 100ms horizon by
/// default.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BridgeConfig {
    /// How far ahead of the host clock's current time the pulled window starts.
    pub lookahead_sec: f64,
    /// Width of the pulled window, starting at `lookahead_sec` out.
    pub horizon_sec: f64,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self { lookahead_sec: 0.060, horizon_sec: 0.100 }
    }
}

/// Pre-flight caps the host imposes on a single window's emitted events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostLimits {
    /// Maximum encoded events this bridge may emit in one `on_tick` call.
    pub max_events: usize,
    /// Maximum simultaneous voices the host DSP can sustain; mirrors
    /// `max_events` as a cap here since `patch-bridge` has no polyphony
    /// model of its own — voice stealing is the host's concern.
    pub max_voices: usize,
}

impl Default for HostLimits {
    fn default() -> Self {
        Self { max_events: 256, max_voices: 64 }
    }
}

/// The project's 8-slot sample table, indexed by a pulse's `1..=8` value.
pub type SampleTable = [Option<SampleSlot>; 8];

/// Windowed pull-and-translate scheduler between a [`Runtime`] and an
/// external audio clock.
///
/// Owns the tick/seconds mapping and the dedup watermark; everything else
/// (graph state, pending events) lives in the [`Runtime`] it pulls from.
/// `patch-bridge` performs no locking — a single logical thread owns both
/// runtime and bridge state at a time.
pub struct AudioBridge {
    clock: TickClock,
    config: BridgeConfig,
    last_scheduled_tick: Option<f64>,
}

impl AudioBridge {
    /// Builds a bridge at the given tempo/origin and window tunables.
    #[must_use]
    pub fn new(clock: TickClock, config: BridgeConfig) -> Self {
        Self { clock, config, last_scheduled_tick: None }
    }

    /// The bridge's tick/seconds clock.
    #[must_use]
    pub fn clock(&self) -> &TickClock {
        &self.clock
    }

    /// Updates tempo. Transport changes take effect at the next window
    /// boundary (the next `on_tick` call); already-scheduled events in the
    /// host's lookahead window are not retimed. Resets the dedup watermark,
    /// since a tempo change invalidates the tick-to-seconds mapping those
    /// watermarked ticks were compared under.
    pub fn set_bpm(&mut self, bpm: f64) {
        self.clock.set_bpm(bpm);
        self.reset_watermark();
    }

    /// Updates the time origin. Same transport-change semantics as
    /// [`Self::set_bpm`].
    pub fn set_origin_sec(&mut self, origin_sec: f64) {
        self.clock.set_origin_sec(origin_sec);
        self.reset_watermark();
    }

    /// Call after a clock resync (host suspend/resume) or a
    /// [`Runtime::reset_pulses`] call; clears the dedup watermark so the
    /// next window isn't compared against a stale high-water tick.
    pub fn reset_watermark(&mut self) {
        self.last_scheduled_tick = None;
        debug!("bridge watermark reset");
    }

    /// Pulls and encodes one window's worth of events.
    ///
    /// `host_now_sec` is the host clock's current time (the callback's
    /// `t1`, in `onTick({t0, t1})` naming); `host_latency_sec`
    /// is the callback's own scheduling latency, used only to enforce
    /// "lookahead must always be ≥ latency + 10ms" — if the configured
    /// lookahead is too small for the observed latency, it's widened for
    /// this call rather than risking a window that starts behind the host
    /// clock.
    ///
    /// Returns encoded events (already watermark-deduped, in ascending
    /// time order), bridge warnings, and any runtime warnings surfaced by
    /// the underlying `query_window` call.
    pub fn on_tick(
        &mut self,
        runtime: &mut Runtime<'_>,
        registry: &NodeRegistry,
        samples: &SampleTable,
        limits: &HostLimits,
        host_now_sec: f64,
        host_latency_sec: f64,
    ) -> (Vec<EncodedEvent>, Vec<BridgeWarning>, Vec<RuntimeWarning>) {
        let lookahead = self.config.lookahead_sec.max(host_latency_sec + 0.010);
        let t_start = self.clock.tick_for_time(host_now_sec + lookahead);
        let t_end = t_start + self.config.horizon_sec / self.clock.seconds_per_tick();
        trace!(t_start, t_end, "bridge pulling window");

        let (outputs, runtime_warnings) = runtime.query_window(t_start, t_end);

        let mut encoded = Vec::with_capacity(outputs.len());
        let mut warnings = Vec::new();
        let mut observed_max = self.last_scheduled_tick;
        let watermark = self.last_scheduled_tick;

        for out in outputs {
            observed_max = Some(observed_max.map_or(out.tick, |m| m.max(out.tick)));
            if watermark.is_some_and(|wm| out.tick <= wm) {
                continue;
            }
            if encoded.len() >= limits.max_events {
                warnings.push(BridgeWarning::Overflow { pending: encoded.len() + 1 });
                continue;
            }

            let time_sec = self.clock.time_sec(out.tick);
            if time_sec < host_now_sec {
                warnings.push(BridgeWarning::LateEvent { node: out.node.clone(), time_sec });
                continue;
            }

            let Some(slot) = sample_slot(samples, out.value, &out.node, &mut warnings) else {
                continue;
            };

            check_unknown_keys(out.params.as_ref(), &out.node, &mut warnings);

            let end = resolved_channel(EffectChannel::Decay, out.params.as_ref(), registry);
            let crush = resolved_channel(EffectChannel::Crush, out.params.as_ref(), registry);
            let hpf = resolved_channel(EffectChannel::Hpf, out.params.as_ref(), registry);
            let lpf = resolved_channel(EffectChannel::Lpf, out.params.as_ref(), registry);
            let event = EncodedEvent { time: time_sec, s: slot.s.clone(), n: slot.n, end, crush, lpf, hpf };

            match event.encode() {
                Ok(_) => encoded.push(event),
                Err(size) => {
                    warn!(node = %out.node, size, "dropping oversize event");
                    warnings.push(BridgeWarning::EventOversize { node: out.node.clone(), size });
                }
            }
        }

        self.last_scheduled_tick = observed_max;
        debug!(emitted = encoded.len(), warnings = warnings.len(), "bridge window processed");
        (encoded, warnings, runtime_warnings)
    }
}

fn sample_slot<'a>(
    samples: &'a SampleTable,
    value: i32,
    node: &NodeId,
    warnings: &mut Vec<BridgeWarning>,
) -> Option<&'a SampleSlot> {
    let idx = (value.clamp(1, 8) - 1) as usize;
    match samples[idx].as_ref() {
        Some(slot) => Some(slot),
        None => {
            warnings.push(BridgeWarning::MissingSample { node: node.clone(), value });
            None
        }
    }
}

fn check_unknown_keys(overlay: Option<&patch_registry::ParamOverlay>, node: &NodeId, warnings: &mut Vec<BridgeWarning>) {
    let Some(overlay) = overlay else { return };
    for key in overlay.keys() {
        if !EffectChannel::ALL.iter().any(|c| c.key() == key.as_str()) {
            warnings.push(BridgeWarning::UnknownMappingKey { node: node.clone(), key: key.clone() });
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use patch_core::{EdgeId, GridPoint};
    use patch_model::{EdgeRecord, GraphSnapshot, NodeParams, NodeRecord, PortAddr};
    use patch_registry::NodeRegistry;

    use super::*;

    fn sample_table() -> SampleTable {
        std::array::from_fn(|i| Some(SampleSlot { s: "bd".into(), n: i as u32 }))
    }

    fn single_pulse_runtime(registry: &NodeRegistry, edge_len_ticks: f64) -> Runtime<'_> {
        let mut snapshot = GraphSnapshot::new();
        snapshot.nodes.push(NodeRecord {
            id: "p1".into(),
            type_key: "pulse".into(),
            position: GridPoint::new(0, 0),
            rotation: patch_core::Rotation::Deg0,
            params: NodeParams::new(1),
            name: None,
            group_ref: None,
        });
        snapshot.nodes.push(NodeRecord {
            id: "o1".into(),
            type_key: "output".into(),
            position: GridPoint::new(2, 0),
            rotation: patch_core::Rotation::Deg0,
            params: NodeParams::new(1),
            name: None,
            group_ref: None,
        });
        snapshot.edges.push(EdgeRecord { id: "e1".into(), from: PortAddr::new("p1", 0), to: PortAddr::new("o1", 0), corners: vec![] });

        let mut delays = HashMap::new();
        delays.insert(EdgeId::from("e1"), edge_len_ticks);
        let outcome = patch_build::compile(&snapshot, registry, &delays);
        let graph = outcome.graph.expect("compiles");
        let mut runtime = Runtime::new(&graph, registry, patch_runtime::RuntimeConfig::default());
        runtime.reset_pulses();
        runtime
    }

    #[test]
    fn watermark_prevents_double_emission_across_overlapping_windows() {
        let registry = NodeRegistry::new().unwrap();
        let mut runtime = single_pulse_runtime(&registry, 2.0);
        let clock = TickClock::new(600.0, 0.0); // 1 tick = 25ms at 600bpm/4 ticks-per-beat
        let mut bridge = AudioBridge::new(clock, BridgeConfig { lookahead_sec: 0.0, horizon_sec: 1.0 });
        let limits = HostLimits::default();
        let samples = sample_table();

        let (first, _, _) = bridge.on_tick(&mut runtime, &registry, &samples, &limits, 0.0, 0.0);
        let (second, _, _) = bridge.on_tick(&mut runtime, &registry, &samples, &limits, 0.01, 0.0);

        let total = first.len() + second.len();
        assert!(total >= 1);
        // No time value appears in both windows.
        for e in &second {
            assert!(!first.iter().any(|f| f.time == e.time));
        }
    }

    #[test]
    fn missing_sample_slot_warns_and_drops() {
        let registry = NodeRegistry::new().unwrap();
        let mut runtime = single_pulse_runtime(&registry, 1.0);
        let clock = TickClock::new(120.0, 0.0);
        let mut bridge = AudioBridge::new(clock, BridgeConfig { lookahead_sec: 0.0, horizon_sec: 5.0 });
        let limits = HostLimits::default();
        let mut samples: SampleTable = std::array::from_fn(|_| None);
        samples[0] = None;

        let (encoded, warnings, _) = bridge.on_tick(&mut runtime, &registry, &samples, &limits, 0.0, 0.0);
        assert!(encoded.is_empty());
        assert!(warnings.iter().any(|w| w.code() == "AUDIO_MISSING_SAMPLE"));
    }
}
