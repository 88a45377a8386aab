//! The tick-indexed event scheduler: a ring buffer sliced by integer tick
//! floor, with a fallback min-heap for delays that exceed the ring's
//! horizon.
//!
//! Events at the same tick come back out in enqueue order (stable FIFO per
//! slot) — `query_window`'s control-before-signal bucketing depends on this.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, VecDeque};

use patch_core::{EdgeId, NodeId, PortRole};
use patch_registry::Pulse;

/// One scheduled occurrence: a pulse arriving at a node's input (or, when
/// `edge` is `None`, a generator's self-trigger with no incoming cable).
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeEvent {
    /// The tick this event is due to be processed at.
    pub tick: f64,
    /// Target node.
    pub node: NodeId,
    /// The cable this event travelled along, or `None` for a self-trigger.
    pub edge: Option<EdgeId>,
    /// Control or signal.
    pub role: PortRole,
    /// Destination input slot (`usize::MAX` for a self-trigger).
    pub input_slot: usize,
    /// The pulse payload.
    pub pulse: Pulse,
    /// The tick this event was scheduled at (its source event's tick plus
    /// the effective delay that produced it, or the tick it was created at
    /// for a self-trigger). Used by thumb projection.
    pub emit_time: f64,
    /// Monotonic enqueue sequence number, the scheduler's stable tie-break.
    seq: u64,
}

impl RuntimeEvent {
    /// Builds an event not yet assigned a sequence number; `Scheduler::enqueue`
    /// assigns one on insertion, so callers never need to set it themselves.
    #[must_use]
    pub fn pending(tick: f64, node: NodeId, edge: Option<EdgeId>, role: PortRole, input_slot: usize, pulse: Pulse, emit_time: f64) -> Self {
        Self { tick, node, edge, role, input_slot, pulse, emit_time, seq: 0 }
    }

    /// The cable's full travel time for this event, used to project a
    /// thumb's progress: `tick - emit_time`.
    #[must_use]
    pub fn effective_delay(&self) -> f64 {
        self.tick - self.emit_time
    }

    /// The scheduler-assigned enqueue sequence number, used as the stable
    /// tie-break when multiple events share a tick.
    #[must_use]
    pub(crate) fn seq(&self) -> u64 {
        self.seq
    }
}

/// Events with a delay this many ticks or more beyond the current cursor
/// fall through to the heap instead of the ring.
const RING_HORIZON: i64 = 4096;

fn tick_floor(tick: f64) -> i64 {
    tick.floor() as i64
}

#[derive(Debug, Clone, PartialEq)]
struct HeapEntry(RuntimeEvent);

impl Eq for HeapEntry {}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap; reverse so the earliest tick sorts first.
        other
            .0
            .tick
            .partial_cmp(&self.0.tick)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.0.seq.cmp(&self.0.seq))
    }
}

/// Ring-buffer-plus-heap event scheduler.
///
/// The ring holds `RING_HORIZON` integer-tick slots, addressed modulo its
/// length; events further out than that horizon spill into the heap and
/// are promoted into the ring lazily as the cursor approaches them.
pub struct Scheduler {
    ring: Vec<VecDeque<RuntimeEvent>>,
    heap: BinaryHeap<HeapEntry>,
    cursor: f64,
    next_seq: u64,
}

impl Scheduler {
    /// An empty scheduler with its cursor at tick 0.
    #[must_use]
    pub fn new() -> Self {
        Self {
            ring: (0..RING_HORIZON as usize).map(|_| VecDeque::new()).collect(),
            heap: BinaryHeap::new(),
            cursor: 0.0,
            next_seq: 0,
        }
    }

    /// The scheduler's current cursor tick.
    #[must_use]
    pub fn cursor(&self) -> f64 {
        self.cursor
    }

    /// Inserts an event, preserving enqueue order among events sharing a
    /// tick floor.
    pub fn enqueue(&mut self, mut event: RuntimeEvent) {
        event.seq = self.next_seq;
        self.next_seq += 1;
        let floor = tick_floor(event.tick);
        let cursor_floor = tick_floor(self.cursor);
        if floor - cursor_floor >= RING_HORIZON || floor < cursor_floor {
            self.heap.push(HeapEntry(event));
        } else {
            let idx = floor.rem_euclid(RING_HORIZON) as usize;
            self.ring[idx].push_back(event);
        }
    }

    /// Promotes any heap entries that now fall within the ring's horizon.
    fn promote_due_heap_entries(&mut self) {
        let cursor_floor = tick_floor(self.cursor);
        let mut promoted = Vec::new();
        while let Some(HeapEntry(top)) = self.heap.peek() {
            if tick_floor(top.tick) - cursor_floor < RING_HORIZON {
                let HeapEntry(event) = self.heap.pop().expect("peeked Some above");
                promoted.push(event);
            } else {
                break;
            }
        }
        for event in promoted {
            let idx = tick_floor(event.tick).rem_euclid(RING_HORIZON) as usize;
            self.ring[idx].push_back(event);
        }
    }

    /// Pops and returns every event with `tick <= until`, in `(tick, seq)`
    /// order, then advances the cursor to `until`.
    pub fn pop_until(&mut self, until: f64) -> Vec<RuntimeEvent> {
        self.promote_due_heap_entries();

        let start_floor = tick_floor(self.cursor);
        let end_floor = tick_floor(until);
        let mut result = Vec::new();

        if end_floor >= start_floor {
            for floor in start_floor..=end_floor {
                let idx = floor.rem_euclid(RING_HORIZON) as usize;
                let slot = &mut self.ring[idx];
                let mut keep = VecDeque::with_capacity(slot.len());
                for event in slot.drain(..) {
                    if tick_floor(event.tick) == floor && event.tick <= until {
                        result.push(event);
                    } else {
                        keep.push_back(event);
                    }
                }
                *slot = keep;
            }
        }

        while let Some(HeapEntry(top)) = self.heap.peek() {
            if top.tick <= until {
                let HeapEntry(event) = self.heap.pop().expect("peeked Some above");
                result.push(event);
            } else {
                break;
            }
        }

        result.sort_by(|a, b| a.tick.partial_cmp(&b.tick).unwrap_or(Ordering::Equal).then(a.seq.cmp(&b.seq)));
        self.cursor = until;
        result
    }

    /// Drops every pending event targeting `node`, from both ring and heap.
    pub fn remove_by_node(&mut self, node: &NodeId) {
        for slot in &mut self.ring {
            slot.retain(|e| &e.node != node);
        }
        let remaining: Vec<_> = self.heap.drain().filter(|HeapEntry(e)| &e.node != node).collect();
        self.heap = remaining.into_iter().collect();
    }

    /// Drops every pending event travelling along `edge`.
    pub fn remove_by_edge(&mut self, edge: &EdgeId) {
        for slot in &mut self.ring {
            slot.retain(|e| e.edge.as_ref() != Some(edge));
        }
        let remaining: Vec<_> = self.heap.drain().filter(|HeapEntry(e)| e.edge.as_ref() != Some(edge)).collect();
        self.heap = remaining.into_iter().collect();
    }

    /// The earliest pending tick across ring and heap, if any.
    #[must_use]
    pub fn peek_min_tick(&self) -> Option<f64> {
        let ring_min = (0..RING_HORIZON as usize)
            .filter_map(|i| self.ring[i].iter().map(|e| e.tick).reduce(f64::min))
            .reduce(f64::min);
        let heap_min = self.heap.peek().map(|HeapEntry(e)| e.tick);
        match (ring_min, heap_min) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (Some(a), None) => Some(a),
            (None, Some(b)) => Some(b),
            (None, None) => None,
        }
    }

    /// Total pending event count across ring and heap.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ring.iter().map(VecDeque::len).sum::<usize>() + self.heap.len()
    }

    /// True if no events are pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every pending event, in no particular order, for snapshotting
    /// (`get_thumb_state`) without disturbing the schedule.
    pub fn iter(&self) -> impl Iterator<Item = &RuntimeEvent> {
        self.ring.iter().flat_map(VecDeque::iter).chain(self.heap.iter().map(|HeapEntry(e)| e))
    }

    /// Visits every pending event travelling along `edge`; `compute` decides
    /// per event whether to retime it (`Some(new_tick)`) or leave it as-is
    /// (`None`). `emit_time` is preserved across a retime so projected
    /// progress stays continuous.
    pub fn reschedule_edge_if<F>(&mut self, edge: &EdgeId, mut compute: F)
    where
        F: FnMut(&RuntimeEvent) -> Option<f64>,
    {
        let mut matching: Vec<RuntimeEvent> = Vec::new();
        for slot in &mut self.ring {
            let mut i = 0;
            while i < slot.len() {
                if slot[i].edge.as_ref() == Some(edge) {
                    matching.push(slot.remove(i).expect("index in bounds"));
                } else {
                    i += 1;
                }
            }
        }
        let remaining: Vec<_> = self
            .heap
            .drain()
            .filter_map(|HeapEntry(e)| {
                if e.edge.as_ref() == Some(edge) {
                    matching.push(e);
                    None
                } else {
                    Some(HeapEntry(e))
                }
            })
            .collect();
        self.heap = remaining.into_iter().collect();

        for mut event in matching {
            if let Some(new_tick) = compute(&event) {
                event.tick = new_tick;
            }
            self.enqueue(event);
        }
    }

    /// Discards every pending event and resets the cursor to `cursor`.
    pub fn clear(&mut self, cursor: f64) {
        for slot in &mut self.ring {
            slot.clear();
        }
        self.heap.clear();
        self.cursor = cursor;
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}
