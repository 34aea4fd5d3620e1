//! Piecewise-constant tempo timeline and tick to millisecond conversion.

use serde::Serialize;

/// 120 BPM, the MIDI default when a file carries no tempo event
pub const DEFAULT_MICROS_PER_QUARTER: u32 = 500_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TempoChange {
    pub time_ticks: u64,
    pub micros_per_quarter: u32,
}

impl TempoChange {
    pub fn new(time_ticks: u64, micros_per_quarter: u32) -> Self {
        Self {
            time_ticks,
            micros_per_quarter,
        }
    }

    pub fn bpm(&self) -> f64 {
        60_000_000.0 / self.micros_per_quarter as f64
    }
}

/// Ordered, never-empty list of tempo changes
#[derive(Debug, Clone, PartialEq)]
pub struct TempoMap {
    changes: Vec<TempoChange>,
}

impl TempoMap {
    /// Sort changes by tick (stable, so same-tick changes keep decode order)
    /// and fall back to 120 BPM when there are none.
    pub fn new(mut changes: Vec<TempoChange>) -> Self {
        if changes.is_empty() {
            changes.push(TempoChange::new(0, DEFAULT_MICROS_PER_QUARTER));
        }
        changes.sort_by_key(|change| change.time_ticks);
        Self { changes }
    }

    pub fn changes(&self) -> &[TempoChange] {
        &self.changes
    }

    /// The tempo in effect at the start of the piece
    pub fn initial(&self) -> TempoChange {
        self.changes[0]
    }

    pub fn bpm_list(&self) -> Vec<f64> {
        self.changes.iter().map(TempoChange::bpm).collect()
    }
}

impl Default for TempoMap {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

/// Converts absolute ticks to milliseconds under a [`TempoMap`].
///
/// Ticks before the first change run at the first change's tempo.
/// Elapsed time at each change is precomputed, so a lookup is a binary search
/// plus the remainder inside the active segment.
#[derive(Debug, Clone)]
pub struct TimeConverter {
    changes: Vec<TempoChange>,
    ticks_per_quarter: u32,
    offsets_ms: Vec<f64>,
}

impl TimeConverter {
    pub fn new(map: &TempoMap, ticks_per_quarter: u32) -> Self {
        let changes = map.changes().to_vec();
        let ticks_per_quarter = ticks_per_quarter.max(1);

        let mut offsets_ms = Vec::with_capacity(changes.len());
        let mut elapsed = 0.0;
        let mut segment_start = 0;
        let mut tempo = changes[0].micros_per_quarter;

        for change in &changes {
            elapsed += segment_ms(change.time_ticks - segment_start, tempo, ticks_per_quarter);
            offsets_ms.push(elapsed);
            segment_start = change.time_ticks;
            tempo = change.micros_per_quarter;
        }

        Self {
            changes,
            ticks_per_quarter,
            offsets_ms,
        }
    }

    pub fn ticks_to_ms(&self, ticks: u64) -> f64 {
        let active = self.changes.partition_point(|change| change.time_ticks <= ticks);

        if active == 0 {
            return segment_ms(ticks, self.changes[0].micros_per_quarter, self.ticks_per_quarter);
        }

        let change = self.changes[active - 1];
        self.offsets_ms[active - 1]
            + segment_ms(ticks - change.time_ticks, change.micros_per_quarter, self.ticks_per_quarter)
    }
}

fn segment_ms(ticks: u64, micros_per_quarter: u32, ticks_per_quarter: u32) -> f64 {
    (ticks as f64 * micros_per_quarter as f64) / (ticks_per_quarter as f64 * 1000.0)
}
