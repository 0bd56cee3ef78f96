//! Stopwatch bookkeeping, independent of any timer source.

/// Elapsed-time accumulator with laps. All instants are host milliseconds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stopwatch {
    accumulated_ms: u64,
    running_since: Option<u64>,
    laps: Vec<u64>,
}

impl Stopwatch {
    /// Whether the clock is counting.
    pub fn is_running(&self) -> bool {
        self.running_since.is_some()
    }

    /// Starts or resumes. Returns `false` if already running.
    pub fn start(&mut self, now_ms: u64) -> bool {
        if self.is_running() {
            return false;
        }
        self.running_since = Some(now_ms);
        true
    }

    /// Pauses, folding the current run into the total. Returns `false` if not running.
    pub fn stop(&mut self, now_ms: u64) -> bool {
        let Some(since) = self.running_since.take() else {
            return false;
        };
        self.accumulated_ms = self
            .accumulated_ms
            .saturating_add(now_ms.saturating_sub(since));
        true
    }

    /// Total running time up to `now_ms`.
    pub fn elapsed_ms(&self, now_ms: u64) -> u64 {
        let running = self
            .running_since
            .map_or(0, |since| now_ms.saturating_sub(since));
        self.accumulated_ms.saturating_add(running)
    }

    /// Records the time since the previous lap (or since zero). Only while running.
    pub fn lap(&mut self, now_ms: u64) -> Option<u64> {
        if !self.is_running() {
            return None;
        }
        let recorded: u64 = self.laps.iter().sum();
        let split = self.elapsed_ms(now_ms).saturating_sub(recorded);
        self.laps.push(split);
        Some(split)
    }

    /// Lap splits, oldest first.
    pub fn laps(&self) -> &[u64] {
        &self.laps
    }

    /// Back to zero with no laps.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Formats milliseconds as `MM:SS.cc`, widening to `H:MM:SS.cc` past an hour.
pub fn format_stopwatch(ms: u64) -> String {
    let centis = (ms / 10) % 100;
    let seconds = (ms / 1_000) % 60;
    let minutes = (ms / 60_000) % 60;
    let hours = ms / 3_600_000;
    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}.{centis:02}")
    } else {
        format!("{minutes:02}:{seconds:02}.{centis:02}")
    }
}
