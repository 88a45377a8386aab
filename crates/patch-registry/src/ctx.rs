//! The behavior contract: context passed to `onControl`/`onSignal`, and the
//! outcomes they return.

use std::collections::BTreeMap;

/// Effect-parameter overlay carried on a pulse.
///
/// For current scope a node's own `params` map contains exactly one key
/// (`param`), but pulses additionally carry this open string-keyed overlay
/// so utility nodes (`decay`, `crush`, `hpf`, `lpf`) can stash a named
/// parameter for `patch-bridge` to pick up later, without widening the core
/// `Node` schema. This is a deliberate extension point for future named
/// params.
pub type ParamOverlay = BTreeMap<String, f64>;

/// An in-flight pulse: the payload carried by a scheduled event.
#[derive(Debug, Clone, PartialEq)]
pub struct Pulse {
    /// Pulse value, clamped to `1..=8`.
    pub value: i32,
    /// Pulse speed, clamped to `1..=8`.
    pub speed: i32,
    /// Optional effect-parameter overlay.
    pub params: Option<ParamOverlay>,
}

impl Pulse {
    /// A neutral default pulse (`value=1, speed=1, params=None`), used to
    /// seed generator self-triggers that have no "incoming" pulse to copy.
    #[must_use]
    pub fn default_pulse() -> Self {
        Self { value: 1, speed: 1, params: None }
    }
}

/// Per-node persistent state returned by `initState`/`onControl`/`onSignal`
/// and threaded back in on the next call.
///
/// Kept as a small closed enum (rather than an open `serde_json::Value` bag)
/// since the current builtin catalog only needs "nothing" or "one scratch
/// integer" — the enum is the extension point, not a generic blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NodeState {
    /// No persistent state.
    #[default]
    Empty,
    /// A single scratch integer (used by `set` to remember its last value).
    Scratch(i32),
}

/// A small deterministic PRNG handed to behaviors that declare randomness.
///
/// xorshift64*, seeded once per node at graph-load time from
/// `global_seed ^ stable_hash(node_id)` and owned by the runtime
/// (`patch-runtime`), not by the node's own `state` — this keeps `NodeState`
/// free of PRNG internals while still replaying identically for a fixed
/// seed and graph, since the seed is a pure function of `(global_seed,
/// node_id)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeRng<'a> {
    state: &'a mut u64,
}

impl<'a> NodeRng<'a> {
    /// Wraps a mutable reference to the per-node PRNG cursor.
    pub fn new(state: &'a mut u64) -> Self {
        if *state == 0 {
            *state = 1;
        }
        Self { state }
    }

    /// Advances the PRNG and returns a value in `1..=8`.
    pub fn next_1_8(&mut self) -> i32 {
        let mut x = *self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        *self.state = x;
        1 + (x % 8) as i32
    }
}

/// Seeds a per-node PRNG cursor from a global seed and the node's stable id.
///
/// Uses FNV-1a over the id's UTF-8 bytes — simple, dependency-free, and
/// stable across platforms and Rust versions, unlike `std::hash`'s
/// `SipHash` (which is explicitly *not* guaranteed stable release to
/// release).
#[must_use]
pub fn seed_for_node(global_seed: u64, node_id: &str) -> u64 {
    const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;
    let mut hash = FNV_OFFSET;
    for byte in node_id.as_bytes() {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    global_seed ^ hash
}

/// Context passed to `onControl`/`onSignal`.
pub struct NodeCtx<'a> {
    /// Current simulation tick.
    pub tick: f64,
    /// Input slot the pulse arrived on (sentinel `usize::MAX` for a
    /// generator's self-trigger, which has no incoming port).
    pub input_slot: usize,
    /// The node's current merged `param`, readable and writable via
    /// `ControlOutcome`/returned state.
    pub param: i32,
    /// Per-node persistent state.
    pub state: &'a mut NodeState,
    /// Per-node deterministic RNG.
    pub rng: NodeRng<'a>,
    /// The incoming pulse.
    pub pulse: &'a Pulse,
}

/// Result of invoking `onControl`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ControlOutcome {
    /// New `param` value, if changed.
    pub param: Option<i32>,
    /// New persistent state, if changed.
    pub state: Option<NodeState>,
}

/// A single output pulse emitted by `onSignal`, destined for one output slot.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputPulse {
    /// Output slot index.
    pub slot: usize,
    /// Output value, clamped to `1..=8` by the runtime.
    pub value: i32,
    /// Output speed; `None` inherits the incoming pulse's speed.
    pub speed: Option<i32>,
    /// Output params overlay; `None` inherits the incoming pulse's overlay.
    pub params: Option<ParamOverlay>,
}

/// Result of invoking `onSignal`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SignalOutcome {
    /// Zero or more output pulses to fan out along outgoing edges.
    pub outputs: Vec<OutputPulse>,
    /// New persistent state, if changed.
    pub state: Option<NodeState>,
}
