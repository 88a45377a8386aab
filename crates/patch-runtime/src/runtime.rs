//! The event-driven simulation core: control-first tick processing,
//! deterministic per-node RNG, live patching, and thumb projection.

use std::collections::HashMap;

use patch_build::CompiledGraph;
use patch_core::{EdgeId, NodeId, PortRole};
use patch_registry::{NodeCtx, NodeDescriptor, NodeRegistry, NodeRng, NodeState, ParamOverlay, Pulse, seed_for_node};
use tracing::{debug, trace};

use crate::output::{OutputEvent, ThumbState};
use crate::patch::Patch;
use crate::scheduler::{RuntimeEvent, Scheduler};
use crate::warning::RuntimeWarning;

/// Tunables a [`Runtime`] is constructed with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RuntimeConfig {
    /// XORed with a node's stable-hashed id to seed its RNG cursor.
    pub global_seed: u64,
    /// Floor applied to every `effectiveDelay`, preventing zero-time cycles.
    pub min_delay_ticks: f64,
    /// Pending-event count above which `RUNTIME_QUEUE_OVERFLOW` is warned.
    pub queue_soft_cap: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self { global_seed: 0, min_delay_ticks: 1e-3, queue_soft_cap: 10_000 }
    }
}

struct LiveNode<'a> {
    descriptor: &'a NodeDescriptor,
    param: i32,
    state: NodeState,
    rng_state: u64,
}

#[derive(Clone)]
struct LiveEdge {
    from_node: NodeId,
    from_slot: usize,
    to_node: NodeId,
    to_slot: usize,
    role: PortRole,
    delay: f64,
}

/// `effectiveDelay(edge, pulse) = max(edge.delay / pulse.speed, minDelayTicks)`.
fn effective_delay(edge_delay: f64, speed: i32, min_delay_ticks: f64) -> f64 {
    (edge_delay / f64::from(speed.max(1))).max(min_delay_ticks)
}

fn clamp_1_8(v: i32) -> (i32, bool) {
    let clamped = v.clamp(1, 8);
    (clamped, clamped != v)
}

/// Owns the live, mutable simulation state for one compiled graph: node
/// params/state/RNG, edge delays, and the pending-event schedule.
///
/// `patch-build::compile` and `patch-routing::route_edge` are both pure;
/// `Runtime` is where the engine actually becomes stateful, and it is the
/// only thing that owns the scheduler and per-node memory.
pub struct Runtime<'a> {
    registry: &'a NodeRegistry,
    config: RuntimeConfig,
    nodes: HashMap<NodeId, LiveNode<'a>>,
    edges: HashMap<EdgeId, LiveEdge>,
    out_edges: HashMap<(NodeId, usize), Vec<EdgeId>>,
    scheduler: Scheduler,
}

impl<'a> Runtime<'a> {
    /// Builds a runtime from a freshly compiled graph. Does not schedule
    /// any initial events — call [`Self::reset_pulses`] to arm generators.
    #[must_use]
    pub fn new(graph: &CompiledGraph, registry: &'a NodeRegistry, config: RuntimeConfig) -> Self {
        let mut runtime =
            Self { registry, config, nodes: HashMap::new(), edges: HashMap::new(), out_edges: HashMap::new(), scheduler: Scheduler::new() };
        runtime.load_graph(graph);
        runtime
    }

    fn load_graph(&mut self, graph: &CompiledGraph) {
        self.nodes.clear();
        self.edges.clear();
        self.out_edges.clear();
        for node in &graph.nodes {
            let Some(descriptor) = self.registry.get(&node.type_key) else {
                // `compile()` already validated every type; a dangling
                // reference here would mean the caller handed us a graph
                // built against a different registry.
                continue;
            };
            let rng_state = seed_for_node(self.config.global_seed, node.id.as_ref());
            self.nodes.insert(
                node.id.clone(),
                LiveNode { descriptor, param: node.param, state: (descriptor.init_state)(node.param), rng_state },
            );
        }
        for edge in &graph.edges {
            self.edges.insert(
                edge.id.clone(),
                LiveEdge {
                    from_node: edge.from_node.clone(),
                    from_slot: edge.from_slot,
                    to_node: edge.to_node.clone(),
                    to_slot: edge.to_slot,
                    role: edge.role,
                    delay: edge.delay,
                },
            );
            self.out_edges.entry((edge.from_node.clone(), edge.from_slot)).or_default().push(edge.id.clone());
        }
    }

    /// Replaces the live graph wholesale. Clears the scheduler; does not
    /// re-arm generator self-triggers (call [`Self::reset_pulses`] for that).
    pub fn set_graph(&mut self, graph: &CompiledGraph) {
        let cursor = self.scheduler.cursor();
        self.load_graph(graph);
        self.scheduler.clear(cursor);
    }

    /// Clears the scheduler and re-seeds one self-trigger per generator
    /// node (currently: every `pulse` node), firing immediately at the
    /// current cursor; `process_signal` re-arms each subsequent one at
    /// `tick + period` as it fires. Node params and persistent state are
    /// left untouched.
    pub fn reset_pulses(&mut self) {
        let cursor = self.scheduler.cursor();
        self.scheduler.clear(cursor);
        let generators: Vec<NodeId> =
            self.nodes.iter().filter_map(|(id, n)| n.descriptor.generator.map(|_| id.clone())).collect();
        for id in generators {
            self.scheduler.enqueue(RuntimeEvent::pending(cursor, id, None, PortRole::Signal, usize::MAX, Pulse::default_pulse(), cursor));
        }
    }

    /// Processes every pending event up to `t1` (the scheduler already
    /// knows where it left off; `t0` is the caller's record of that same
    /// boundary and is only asserted against it).
    ///
    /// Control events at a given `(node, tick)` are applied before signal
    /// events at that same bucket, so a signal sees the control's update.
    /// Returns every pulse that reached an `output` node, sorted by tick
    /// and stable within a tick, plus any warnings raised along the way.
    pub fn query_window(&mut self, t0: f64, t1: f64) -> (Vec<OutputEvent>, Vec<RuntimeWarning>) {
        debug_assert!(t1 >= t0, "query_window called with a window that runs backwards");
        let mut warnings = Vec::new();
        let mut outputs = Vec::new();

        // Intra-window cascades (e.g. pulse -> output with a short delay)
        // must resolve within this same call, so newly produced events with
        // `tick < t1` are kept in `local` and re-drained rather than handed
        // to the scheduler; only events landing at or beyond `t1` go back
        // to the scheduler for a later window. This also enforces the
        // half-open `[t0, t1)` bound: a popped event with `tick == t1`
        // exactly is deferred rather than processed now.
        let mut local = self.scheduler.pop_until(t1);
        trace!(count = local.len(), %t1, "popped events for window");

        loop {
            let mut ready = Vec::with_capacity(local.len());
            for ev in local.drain(..) {
                if ev.tick < t1 {
                    ready.push(ev);
                } else {
                    self.scheduler.enqueue(ev);
                }
            }
            if ready.is_empty() {
                break;
            }
            ready.sort_by(|a, b| a.tick.partial_cmp(&b.tick).unwrap_or(std::cmp::Ordering::Equal).then(a.seq().cmp(&b.seq())));

            let mut bucket_order: Vec<(NodeId, u64)> = Vec::new();
            let mut buckets: HashMap<(NodeId, u64), Vec<RuntimeEvent>> = HashMap::new();
            for ev in ready {
                let key = (ev.node.clone(), ev.tick.to_bits());
                if !buckets.contains_key(&key) {
                    bucket_order.push(key.clone());
                }
                buckets.entry(key).or_default().push(ev);
            }

            let mut produced = Vec::new();
            for key in bucket_order {
                let Some(mut events) = buckets.remove(&key) else { continue };
                events.sort_by_key(|e| if e.role == PortRole::Control { 0 } else { 1 });

                for event in events {
                    match event.role {
                        PortRole::Control => self.process_control(event, &mut warnings),
                        PortRole::Signal => self.process_signal(event, t1, &mut outputs, &mut produced, &mut warnings),
                    }
                }
            }
            local = produced;
        }

        if self.scheduler.len() > self.config.queue_soft_cap {
            warnings.push(RuntimeWarning::QueueOverflow { pending: self.scheduler.len() });
        }

        outputs.sort_by(|a, b| a.tick.partial_cmp(&b.tick).unwrap_or(std::cmp::Ordering::Equal));
        (outputs, warnings)
    }

    fn process_control(&mut self, event: RuntimeEvent, warnings: &mut Vec<RuntimeWarning>) {
        let Some(node) = self.nodes.get_mut(&event.node) else {
            warnings.push(RuntimeWarning::MissingNode { node: event.node });
            return;
        };
        let Some(on_control) = node.descriptor.on_control_fn() else {
            return;
        };
        let mut ctx = NodeCtx {
            tick: event.tick,
            input_slot: event.input_slot,
            param: node.param,
            state: &mut node.state,
            rng: NodeRng::new(&mut node.rng_state),
            pulse: &event.pulse,
        };
        let outcome = on_control(&mut ctx);
        if let Some(param) = outcome.param {
            node.param = param;
        }
        if let Some(state) = outcome.state {
            node.state = state;
        }
    }

    /// Runs `onSignal` for one event and routes whatever it produces.
    ///
    /// `window_end` is the caller's `t1`: a produced event with `tick <
    /// window_end` is an intra-window cascade and goes to `local` so
    /// `query_window`'s loop picks it straight back up; one landing at or
    /// beyond `window_end` is handed to the scheduler for a later window.
    fn process_signal(
        &mut self,
        event: RuntimeEvent,
        window_end: f64,
        outputs: &mut Vec<OutputEvent>,
        local: &mut Vec<RuntimeEvent>,
        warnings: &mut Vec<RuntimeWarning>,
    ) {
        let Some(node) = self.nodes.get_mut(&event.node) else {
            warnings.push(RuntimeWarning::MissingNode { node: event.node });
            return;
        };
        let Some(on_signal) = node.descriptor.on_signal_fn() else {
            return;
        };
        let is_sink = node.descriptor.is_sink;
        let generator = node.descriptor.generator;
        let mut ctx = NodeCtx {
            tick: event.tick,
            input_slot: event.input_slot,
            param: node.param,
            state: &mut node.state,
            rng: NodeRng::new(&mut node.rng_state),
            pulse: &event.pulse,
        };
        let outcome = on_signal(&mut ctx);
        if let Some(state) = outcome.state {
            node.state = state;
        }

        // A generator's self-trigger carries no edge; re-arm the next one at
        // `tick + period` so it keeps firing until `reset_pulses`/`set_graph`
        // clears it. A pulse reached through a real incoming edge does not
        // re-arm — only the self-sustaining chain started by `reset_pulses`
        // does.
        if event.edge.is_none() {
            if let Some(spec) = generator {
                let next = RuntimeEvent::pending(
                    event.tick + spec.period_ticks,
                    event.node.clone(),
                    None,
                    PortRole::Signal,
                    usize::MAX,
                    Pulse::default_pulse(),
                    event.tick,
                );
                self.route_new_event(next, window_end, local);
            }
        }

        for produced in outcome.outputs {
            let (value, value_clamped) = clamp_1_8(produced.value);
            let speed = produced.speed.unwrap_or(event.pulse.speed);
            let (speed, speed_clamped) = clamp_1_8(speed);
            let params = clamp_params(produced.params.or_else(|| event.pulse.params.clone()));
            if value_clamped || speed_clamped {
                warnings.push(RuntimeWarning::ValueClamped {
                    node: event.node.clone(),
                    detail: "output value or speed outside 1..=8".to_string(),
                });
            }

            if is_sink {
                outputs.push(OutputEvent { tick: event.tick, node: event.node.clone(), value, params });
                continue;
            }

            let Some(edge_ids) = self.out_edges.get(&(event.node.clone(), produced.slot)).cloned() else {
                continue;
            };
            for edge_id in edge_ids {
                let Some(edge) = self.edges.get(&edge_id) else {
                    warnings.push(RuntimeWarning::MissingEdge { edge: edge_id });
                    continue;
                };
                let delay = effective_delay(edge.delay, speed, self.config.min_delay_ticks);
                let new_tick = event.tick + delay;
                let next = RuntimeEvent::pending(
                    new_tick,
                    edge.to_node.clone(),
                    Some(edge_id),
                    edge.role,
                    edge.to_slot,
                    Pulse { value, speed, params: params.clone() },
                    event.tick,
                );
                self.route_new_event(next, window_end, local);
            }
        }
    }

    /// Keeps an intra-window event (`tick < window_end`) local so the
    /// caller's draining loop reprocesses it this same call; hands anything
    /// at or beyond the window bound to the scheduler for later.
    fn route_new_event(&mut self, event: RuntimeEvent, window_end: f64, local: &mut Vec<RuntimeEvent>) {
        if event.tick < window_end {
            local.push(event);
        } else {
            self.scheduler.enqueue(event);
        }
    }

    /// Applies an incremental graph diff without a full recompile, in the
    /// order: removals, additions, param overwrites, edge-delay overwrites.
    pub fn apply_patch(&mut self, patch: Patch) -> Vec<RuntimeWarning> {
        let mut warnings = Vec::new();

        for node_id in &patch.removed_nodes {
            self.scheduler.remove_by_node(node_id);
            self.nodes.remove(node_id);
        }
        for edge_id in &patch.removed_edges {
            self.scheduler.remove_by_edge(edge_id);
            if let Some(edge) = self.edges.remove(edge_id) {
                if let Some(list) = self.out_edges.get_mut(&(edge.from_node, edge.from_slot)) {
                    list.retain(|e| e != edge_id);
                }
            }
        }

        for added in patch.added_nodes {
            let Some(descriptor) = self.registry.get(&added.type_key) else {
                warnings.push(RuntimeWarning::UnknownType { node: added.id, type_key: added.type_key });
                continue;
            };
            let rng_state = seed_for_node(self.config.global_seed, added.id.as_ref());
            self.nodes.insert(added.id, LiveNode { descriptor, param: added.param, state: added.state, rng_state });
        }
        for added in patch.added_edges {
            self.out_edges.entry((added.from_node.clone(), added.from_slot)).or_default().push(added.id.clone());
            self.edges.insert(
                added.id,
                LiveEdge {
                    from_node: added.from_node,
                    from_slot: added.from_slot,
                    to_node: added.to_node,
                    to_slot: added.to_slot,
                    role: added.role,
                    delay: added.delay,
                },
            );
        }

        for (node_id, param) in patch.updated_params {
            if let Some(node) = self.nodes.get_mut(&node_id) {
                node.param = param;
            } else {
                warnings.push(RuntimeWarning::MissingNode { node: node_id });
            }
        }

        let min_delay = self.config.min_delay_ticks;
        for (edge_id, (new_delay, window_end)) in patch.updated_edges {
            let Some(edge) = self.edges.get_mut(&edge_id) else {
                warnings.push(RuntimeWarning::MissingEdge { edge: edge_id });
                continue;
            };
            edge.delay = new_delay;
            self.scheduler.reschedule_edge_if(&edge_id, |ev| {
                let candidate = ev.emit_time + effective_delay(new_delay, ev.pulse.speed, min_delay);
                (candidate > window_end).then_some(candidate)
            });
        }

        debug!(warnings = warnings.len(), "applied patch");
        warnings
    }

    /// Snapshots every in-flight cable pulse's travel progress at `now_tick`.
    #[must_use]
    pub fn get_thumb_state(&self, now_tick: f64) -> Vec<ThumbState> {
        self.scheduler
            .iter()
            .filter_map(|event| {
                let edge = event.edge.clone()?;
                let delay = event.effective_delay();
                let progress = if delay > 0.0 { ((now_tick - event.emit_time) / delay).clamp(0.0, 1.0) } else { 1.0 };
                Some(ThumbState { edge, progress, speed: event.pulse.speed, emit_tick: Some(event.emit_time) })
            })
            .collect()
    }

    /// The scheduler's current cursor tick.
    #[must_use]
    pub fn cursor(&self) -> f64 {
        self.scheduler.cursor()
    }
}

fn clamp_params(params: Option<ParamOverlay>) -> Option<ParamOverlay> {
    params.map(|overlay| overlay.into_iter().map(|(k, v)| (k, v.clamp(1.0, 8.0))).collect())
}
