//! Non-fatal bridge diagnostics (`AUDIO_*`).
//!
//! Nothing here halts scheduling: an event that can't be mapped, doesn't
//! fit the host's wire budget, or arrives too late is dropped and reported,
//! exactly as `patch-runtime::RuntimeWarning` does one layer down.

use patch_core::{EdgeId, NodeId};

/// One non-fatal condition observed while pulling and encoding a window.
#[derive(Debug, Clone, PartialEq)]
pub enum BridgeWarning {
    /// `value` selected a sample slot the project's 8-slot table doesn't
    /// have a sample for.
    MissingSample {
        /// The node that produced the event.
        node: NodeId,
        /// The `1..=8` value that selected the missing slot.
        value: i32,
    },
    /// A pulse's params overlay carried a key this bridge doesn't know how
    /// to map (not one of `end`/`crush`/`hpf`/`lpf`); the key was skipped.
    UnknownMappingKey {
        /// The node that produced the event.
        node: NodeId,
        /// The unrecognised key.
        key: String,
    },
    /// The encoded record exceeded the host's 1024-byte event buffer; it
    /// was dropped rather than truncated.
    EventOversize {
        /// The node that produced the event.
        node: NodeId,
        /// The encoded size in bytes.
        size: usize,
    },
    /// Pre-flight event count against the host's `MAX_EVENTS`/`MAX_VOICES`
    /// failed; the event was dropped before encoding.
    Overflow {
        /// Events pending for this window at the time the cap was hit.
        pending: usize,
    },
    /// The event's mapped host time already fell behind the host clock by
    /// the time it was about to be emitted.
    LateEvent {
        /// The node the event targets.
        node: NodeId,
        /// The event's mapped absolute time, in seconds.
        time_sec: f64,
    },
    /// An in-flight event's edge had its delay changed while the event was
    /// already inside the bridge's lookahead window; the bridge accepts the
    /// resulting minor drift rather than retiming an event already handed
    /// to the host.
    DriftAccepted {
        /// The edge whose delay changed.
        edge: EdgeId,
    },
}

impl BridgeWarning {
    /// Stable machine-readable code (`AUDIO_*`).
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingSample { .. } => "AUDIO_MISSING_SAMPLE",
            Self::UnknownMappingKey { .. } => "AUDIO_UNKNOWN_MAPPING_KEY",
            Self::EventOversize { .. } => "AUDIO_EVENT_OVERSIZE",
            Self::Overflow { .. } => "AUDIO_OVERFLOW",
            Self::LateEvent { .. } => "AUDIO_LATE_EVENT",
            Self::DriftAccepted { .. } => "AUDIO_DRIFT_ACCEPTED",
        }
    }
}
