//! Tick-to-seconds mapping under a transport the host's audio clock drives.
//!
//! Tracks bpm plus a cached derived-per-beat field, recomputed whenever
//! `bpm` changes, the way a sample-rate transport tracks samples-per-beat —
//! adapted here to seconds-per-tick since `patch-bridge` has no notion of a
//! sample rate, only ticks and wall-clock seconds.

/// `ticksPerBeat` is a global constant for the lifetime of a bridge: fixed,
/// not persisted per-project.
pub const TICKS_PER_BEAT: f64 = 4.0;

/// Converts between engine ticks and absolute host-clock seconds under a
/// given tempo and time origin.
///
/// `secondsPerTick = 60 / (bpm * ticksPerBeat)`; `timeSec = originSec + tick
/// * secondsPerTick`. Changing `bpm` or `originSec` is a transport update:
/// it takes effect for ticks computed after the call, but the caller (the
/// bridge) is responsible for resetting its watermark, since events already
/// queued to the host under the old mapping must not retime.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickClock {
    bpm: f64,
    origin_sec: f64,
    seconds_per_tick: f64,
}

impl TickClock {
    /// Builds a clock at the given tempo and time origin.
    #[must_use]
    pub fn new(bpm: f64, origin_sec: f64) -> Self {
        Self { bpm: bpm.max(1.0), origin_sec, seconds_per_tick: seconds_per_tick(bpm.max(1.0)) }
    }

    /// Current tempo in beats per minute.
    #[must_use]
    pub fn bpm(&self) -> f64 {
        self.bpm
    }

    /// The host-clock second a tick `0` origin was pinned to.
    #[must_use]
    pub fn origin_sec(&self) -> f64 {
        self.origin_sec
    }

    /// Cached `secondsPerTick` for the current tempo.
    #[must_use]
    pub fn seconds_per_tick(&self) -> f64 {
        self.seconds_per_tick
    }

    /// Updates the tempo, recomputing the cached `secondsPerTick`.
    pub fn set_bpm(&mut self, bpm: f64) {
        self.bpm = bpm.max(1.0);
        self.seconds_per_tick = seconds_per_tick(self.bpm);
    }

    /// Updates the time origin.
    pub fn set_origin_sec(&mut self, origin_sec: f64) {
        self.origin_sec = origin_sec;
    }

    /// Maps an engine tick to an absolute host-clock second.
    #[must_use]
    pub fn time_sec(&self, tick: f64) -> f64 {
        self.origin_sec + tick * self.seconds_per_tick
    }

    /// Maps an absolute host-clock second back to an engine tick (the
    /// inverse of [`Self::time_sec`]), used to derive the tick window a
    /// host-clock callback should pull.
    #[must_use]
    pub fn tick_for_time(&self, time_sec: f64) -> f64 {
        (time_sec - self.origin_sec) / self.seconds_per_tick
    }
}

fn seconds_per_tick(bpm: f64) -> f64 {
    60.0 / (bpm * TICKS_PER_BEAT)
}
