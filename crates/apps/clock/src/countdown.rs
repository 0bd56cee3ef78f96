//! Countdown timer bookkeeping.

/// A countdown toward zero. It finishes exactly once per reset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Countdown {
    duration_ms: u64,
    remaining_ms: u64,
    deadline_ms: Option<u64>,
    finished: bool,
}

impl Countdown {
    /// Creates a paused countdown.
    pub fn new(duration_ms: u64) -> Self {
        Self {
            duration_ms,
            remaining_ms: duration_ms,
            deadline_ms: None,
            finished: false,
        }
    }

    /// Configured length.
    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    /// Whether the clock is counting.
    pub fn is_running(&self) -> bool {
        self.deadline_ms.is_some()
    }

    /// Whether zero was reached since the last reset.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Replaces the duration and resets. Ignored while running.
    pub fn set_duration(&mut self, duration_ms: u64) -> bool {
        if self.is_running() {
            return false;
        }
        *self = Self::new(duration_ms);
        true
    }

    /// Starts or resumes. Returns `false` when running, finished, or there is nothing left.
    pub fn start(&mut self, now_ms: u64) -> bool {
        if self.is_running() || self.finished || self.remaining_ms == 0 {
            return false;
        }
        self.deadline_ms = Some(now_ms.saturating_add(self.remaining_ms));
        true
    }

    /// Freezes the remaining time. Returns `false` if not running.
    pub fn pause(&mut self, now_ms: u64) -> bool {
        let Some(deadline) = self.deadline_ms.take() else {
            return false;
        };
        self.remaining_ms = deadline.saturating_sub(now_ms);
        true
    }

    /// Restores the full duration.
    pub fn reset(&mut self) {
        *self = Self::new(self.duration_ms);
    }

    /// Time left at `now_ms`.
    pub fn remaining_ms(&self, now_ms: u64) -> u64 {
        self.deadline_ms
            .map_or(self.remaining_ms, |deadline| deadline.saturating_sub(now_ms))
    }

    /// Advances to `now_ms`. Returns `true` only on the tick that reaches zero.
    pub fn tick(&mut self, now_ms: u64) -> bool {
        match self.deadline_ms {
            Some(deadline) if now_ms >= deadline => {
                self.deadline_ms = None;
                self.remaining_ms = 0;
                self.finished = true;
                true
            }
            _ => false,
        }
    }
}

/// Formats milliseconds as `HH:MM:SS`, rounding partial seconds up.
pub fn format_countdown(ms: u64) -> String {
    let total_seconds = ms.div_ceil(1_000);
    format!(
        "{:02}:{:02}:{:02}",
        total_seconds / 3_600,
        (total_seconds / 60) % 60,
        total_seconds % 60
    )
}
