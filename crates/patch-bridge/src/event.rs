//! The host wire format: `{time, s, n, end, crush, lpf, hpf}` records, and
//! the encoder that guards them against the host's 1024-byte event buffer.

use serde::Serialize;

use crate::mapping::EffectChannel;

/// One record in the bridge's canonical output schema, ready to hand to
/// the external `evaluate(events[])` entrypoint. Field names are the wire
/// format verbatim — `patch-bridge` is the sole owner of this schema and
/// never emits aliases.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EncodedEvent {
    /// Absolute host-clock time, in seconds.
    pub time: f64,
    /// Sample bank.
    pub s: String,
    /// Sample index within the bank.
    pub n: u32,
    /// Resolved decay/release length (`decayTable`).
    pub end: f64,
    /// Resolved bit-crush depth (`crushTable`).
    pub crush: f64,
    /// Resolved low-pass cutoff in Hz (`lpfTable`).
    pub lpf: f64,
    /// Resolved high-pass cutoff in Hz (`hpfTable`).
    pub hpf: f64,
}

/// The host's fixed per-event wire buffer size; an encoded record larger
/// than this is dropped rather than truncated.
pub const MAX_EVENT_BYTES: usize = 1024;

impl EncodedEvent {
    /// Serializes to the host's wire representation and checks it against
    /// [`MAX_EVENT_BYTES`]. `serde_json::to_vec`'s length stands in for the
    /// host's actual binary wire size, which this crate has no visibility
    /// into — a deterministic, reproducible proxy for the same guard.
    ///
    /// # Errors
    ///
    /// Returns the oversize byte count if the encoded record doesn't fit.
    pub fn encode(&self) -> Result<Vec<u8>, usize> {
        let bytes = serde_json::to_vec(self).expect("EncodedEvent fields are all directly serializable");
        if bytes.len() > MAX_EVENT_BYTES { Err(bytes.len()) } else { Ok(bytes) }
    }
}

/// Looks up a raw `1..=8` overlay value for `channel`, falling back to the
/// registry default when the pulse's params overlay didn't carry it.
pub(crate) fn resolved_channel(
    channel: EffectChannel,
    overlay: Option<&patch_registry::ParamOverlay>,
    registry: &patch_registry::NodeRegistry,
) -> f64 {
    match overlay.and_then(|o| o.get(channel.key())) {
        Some(raw) => channel.resolve(*raw as i32),
        None => channel.default_resolved(registry),
    }
}
