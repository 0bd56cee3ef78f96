//! Interval scheduling contract with owned, drop-cancelling handles.
//!
//! Every periodic callback in the shell goes through an [`IntervalScheduler`]. The returned
//! [`IntervalHandle`] is the only way to stop the interval, and dropping it stops the interval
//! too, so an owner that forgets its handle cannot leak a running timer.

use std::{
    cell::{Cell, RefCell},
    rc::{Rc, Weak},
};

/// Callback invoked on every interval tick.
pub type IntervalTick = Rc<dyn Fn()>;

/// Host service that runs periodic callbacks and reports the current time.
pub trait IntervalScheduler {
    /// Current time in milliseconds on the scheduler's clock.
    fn now_ms(&self) -> u64;

    /// Starts calling `tick` every `period_ms` milliseconds until the handle is cancelled or
    /// dropped.
    ///
    /// # Errors
    ///
    /// Returns an error when the host cannot install the interval.
    fn set_interval(&self, period_ms: u32, tick: IntervalTick) -> Result<IntervalHandle, String>;
}

/// Owned token for one running interval.
pub struct IntervalHandle {
    cancel: Box<dyn Fn()>,
    active: Cell<bool>,
}

impl IntervalHandle {
    /// Creates a handle from the host-specific cancel callback.
    pub fn new(cancel: impl Fn() + 'static) -> Self {
        Self {
            cancel: Box::new(cancel),
            active: Cell::new(true),
        }
    }

    /// Creates a handle for an interval that never runs.
    pub fn inert() -> Self {
        Self {
            cancel: Box::new(|| {}),
            active: Cell::new(false),
        }
    }

    /// Returns whether the interval is still scheduled.
    pub fn is_active(&self) -> bool {
        self.active.get()
    }

    /// Stops the interval. Calling this more than once is a no-op.
    pub fn cancel(&self) {
        if self.active.replace(false) {
            (self.cancel)();
        }
    }
}

impl std::fmt::Debug for IntervalHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntervalHandle")
            .field("active", &self.active.get())
            .finish()
    }
}

impl Drop for IntervalHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[derive(Debug, Clone, Copy, Default)]
/// Scheduler for hosts without timers; intervals never fire.
pub struct NoopIntervalScheduler;

impl IntervalScheduler for NoopIntervalScheduler {
    fn now_ms(&self) -> u64 {
        crate::time::unix_time_ms_now()
    }

    fn set_interval(&self, _period_ms: u32, _tick: IntervalTick) -> Result<IntervalHandle, String> {
        Ok(IntervalHandle::inert())
    }
}

struct ManualInterval {
    id: u64,
    period_ms: u64,
    next_due_ms: u64,
    tick: IntervalTick,
}

#[derive(Default)]
struct ManualSchedulerState {
    now_ms: u64,
    next_id: u64,
    intervals: Vec<ManualInterval>,
}

#[derive(Clone, Default)]
/// Deterministic scheduler driven by [`ManualIntervalScheduler::advance`].
///
/// Used as the host scheduler in tests. Clones share the same clock and interval table.
pub struct ManualIntervalScheduler {
    inner: Rc<RefCell<ManualSchedulerState>>,
}

impl ManualIntervalScheduler {
    /// Creates a scheduler whose clock starts at `now_ms`.
    pub fn starting_at(now_ms: u64) -> Self {
        let scheduler = Self::default();
        scheduler.inner.borrow_mut().now_ms = now_ms;
        scheduler
    }

    /// Number of intervals currently scheduled.
    pub fn active_count(&self) -> usize {
        self.inner.borrow().intervals.len()
    }

    /// Moves the clock forward by `ms`, firing every tick that falls due, in time order.
    pub fn advance(&self, ms: u64) {
        let target = self.inner.borrow().now_ms.saturating_add(ms);
        loop {
            let due = {
                let state = self.inner.borrow();
                state
                    .intervals
                    .iter()
                    .filter(|interval| interval.next_due_ms <= target)
                    .min_by_key(|interval| (interval.next_due_ms, interval.id))
                    .map(|interval| (interval.id, interval.next_due_ms, interval.tick.clone()))
            };
            let Some((id, due_ms, tick)) = due else {
                break;
            };
            {
                let mut state = self.inner.borrow_mut();
                state.now_ms = due_ms;
                if let Some(interval) = state.intervals.iter_mut().find(|i| i.id == id) {
                    interval.next_due_ms = due_ms.saturating_add(interval.period_ms);
                }
            }
            tick();
        }
        self.inner.borrow_mut().now_ms = target;
    }
}

impl IntervalScheduler for ManualIntervalScheduler {
    fn now_ms(&self) -> u64 {
        self.inner.borrow().now_ms
    }

    fn set_interval(&self, period_ms: u32, tick: IntervalTick) -> Result<IntervalHandle, String> {
        let period_ms = u64::from(period_ms.max(1));
        let id = {
            let mut state = self.inner.borrow_mut();
            let id = state.next_id;
            state.next_id += 1;
            let next_due_ms = state.now_ms.saturating_add(period_ms);
            state.intervals.push(ManualInterval {
                id,
                period_ms,
                next_due_ms,
                tick,
            });
            id
        };

        let weak: Weak<RefCell<ManualSchedulerState>> = Rc::downgrade(&self.inner);
        Ok(IntervalHandle::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.borrow_mut().intervals.retain(|interval| interval.id != id);
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counter() -> (Rc<Cell<u32>>, IntervalTick) {
        let count = Rc::new(Cell::new(0));
        let tick_count = count.clone();
        (count, Rc::new(move || tick_count.set(tick_count.get() + 1)))
    }

    #[test]
    fn manual_scheduler_fires_each_due_tick() {
        let scheduler = ManualIntervalScheduler::starting_at(1_000);
        let (count, tick) = counter();
        let handle = scheduler.set_interval(100, tick).expect("schedule");

        scheduler.advance(99);
        assert_eq!(count.get(), 0);
        scheduler.advance(1);
        assert_eq!(count.get(), 1);
        scheduler.advance(350);
        assert_eq!(count.get(), 4);
        assert_eq!(scheduler.now_ms(), 1_450);
        assert!(handle.is_active());
    }

    #[test]
    fn cancel_and_drop_remove_the_interval() {
        let scheduler = ManualIntervalScheduler::default();
        let (count, tick) = counter();
        let handle = scheduler.set_interval(10, tick.clone()).expect("schedule");
        let dropped = scheduler.set_interval(10, tick).expect("schedule");
        assert_eq!(scheduler.active_count(), 2);

        handle.cancel();
        handle.cancel();
        assert!(!handle.is_active());
        drop(dropped);
        assert_eq!(scheduler.active_count(), 0);

        scheduler.advance(100);
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn tick_may_cancel_its_own_interval() {
        let scheduler = ManualIntervalScheduler::default();
        let slot: Rc<RefCell<Option<IntervalHandle>>> = Rc::new(RefCell::new(None));
        let fired = Rc::new(Cell::new(0));
        let tick_slot = slot.clone();
        let tick_fired = fired.clone();
        let handle = scheduler
            .set_interval(
                5,
                Rc::new(move || {
                    tick_fired.set(tick_fired.get() + 1);
                    tick_slot.borrow_mut().take();
                }),
            )
            .expect("schedule");
        *slot.borrow_mut() = Some(handle);

        scheduler.advance(50);
        assert_eq!(fired.get(), 1);
        assert_eq!(scheduler.active_count(), 0);
    }

    #[test]
    fn inert_handle_is_inactive() {
        let handle = NoopIntervalScheduler
            .set_interval(1, Rc::new(|| {}))
            .expect("schedule");
        assert!(!handle.is_active());
    }
}
