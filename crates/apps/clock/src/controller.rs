//! Interval-owning controllers that drive [`Stopwatch`] and [`Countdown`].
//!
//! Each controller holds at most one [`IntervalHandle`]. Stopping, pausing, resetting,
//! finishing, or dropping the controller releases the handle, which cancels the interval.

use std::{
    cell::RefCell,
    rc::{Rc, Weak},
};

use desktop_app_contract::{NotificationService as ShellNotifications, CLOCK_APP_ID};
use leptos::{logging, spawn_local};
use platform_host::{IntervalHandle, IntervalScheduler, Notification, NotificationService};

use crate::{countdown::Countdown, stopwatch::Stopwatch};

/// Repaint cadence for the stopwatch display.
pub const STOPWATCH_TICK_MS: u32 = 50;
/// Poll cadence for the countdown deadline.
pub const COUNTDOWN_TICK_MS: u32 = 250;

/// Called after every tick so the view can repaint.
pub type TickListener = Rc<dyn Fn()>;

/// Receives the notification emitted when a countdown reaches zero.
pub trait FinishNotifier {
    /// Delivers `notification`. Failures are the implementor's to log.
    fn countdown_finished(&self, notification: Notification);
}

/// Routes notifications through the shell's command channel.
#[derive(Clone)]
pub struct ShellNotifier(pub ShellNotifications);

impl FinishNotifier for ShellNotifier {
    fn countdown_finished(&self, notification: Notification) {
        self.0.notify(notification.title, notification.message);
    }
}

/// Dispatches notifications straight to the host service.
#[derive(Clone)]
pub struct HostNotifier(pub Rc<dyn NotificationService>);

impl FinishNotifier for HostNotifier {
    fn countdown_finished(&self, notification: Notification) {
        let service = self.0.clone();
        spawn_local(async move {
            if let Err(err) = service.notify(&notification).await {
                logging::warn!("clock notification failed: {err}");
            }
        });
    }
}

/// Notification emitted when the countdown ends.
pub fn finished_notification() -> Notification {
    Notification::new("Timer", "Time's up!", CLOCK_APP_ID)
}

/// Stopwatch plus its repaint interval.
pub struct StopwatchController {
    scheduler: Rc<dyn IntervalScheduler>,
    state: Stopwatch,
    interval: Option<IntervalHandle>,
    on_tick: TickListener,
}

impl StopwatchController {
    /// Creates a stopped stopwatch on `scheduler`.
    pub fn new(scheduler: Rc<dyn IntervalScheduler>, on_tick: TickListener) -> Self {
        Self {
            scheduler,
            state: Stopwatch::default(),
            interval: None,
            on_tick,
        }
    }

    /// Starts the stopwatch and its repaint interval.
    ///
    /// # Errors
    ///
    /// Returns the scheduler error; the stopwatch is left stopped.
    pub fn start(&mut self) -> Result<(), String> {
        let now = self.scheduler.now_ms();
        if !self.state.start(now) {
            return Ok(());
        }
        let on_tick = self.on_tick.clone();
        match self
            .scheduler
            .set_interval(STOPWATCH_TICK_MS, Rc::new(move || on_tick()))
        {
            Ok(handle) => {
                self.interval = Some(handle);
                Ok(())
            }
            Err(err) => {
                self.state.stop(now);
                Err(err)
            }
        }
    }

    /// Pauses and releases the interval.
    pub fn stop(&mut self) {
        self.state.stop(self.scheduler.now_ms());
        self.interval = None;
    }

    /// Records a lap split while running.
    pub fn lap(&mut self) -> Option<u64> {
        self.state.lap(self.scheduler.now_ms())
    }

    /// Clears time and laps and releases the interval.
    pub fn reset(&mut self) {
        self.interval = None;
        self.state.reset();
    }

    /// Total running time so far.
    pub fn elapsed_ms(&self) -> u64 {
        self.state.elapsed_ms(self.scheduler.now_ms())
    }

    /// Lap splits, oldest first.
    pub fn laps(&self) -> &[u64] {
        self.state.laps()
    }

    /// Whether the stopwatch is counting.
    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }

    /// Whether a repaint interval is currently held.
    pub fn has_interval(&self) -> bool {
        self.interval.as_ref().is_some_and(IntervalHandle::is_active)
    }
}

/// Countdown plus its deadline poll and finish notifier.
pub struct CountdownController {
    scheduler: Rc<dyn IntervalScheduler>,
    state: Rc<RefCell<Countdown>>,
    interval: Rc<RefCell<Option<IntervalHandle>>>,
    notifier: Rc<dyn FinishNotifier>,
    on_tick: TickListener,
}

impl CountdownController {
    /// Creates a paused countdown of `duration_ms`.
    pub fn new(
        scheduler: Rc<dyn IntervalScheduler>,
        duration_ms: u64,
        notifier: Rc<dyn FinishNotifier>,
        on_tick: TickListener,
    ) -> Self {
        Self {
            scheduler,
            state: Rc::new(RefCell::new(Countdown::new(duration_ms))),
            interval: Rc::new(RefCell::new(None)),
            notifier,
            on_tick,
        }
    }

    /// Starts or resumes the countdown and its deadline poll.
    ///
    /// # Errors
    ///
    /// Returns the scheduler error; the countdown is left paused.
    pub fn start(&mut self) -> Result<(), String> {
        let now = self.scheduler.now_ms();
        if !self.state.borrow_mut().start(now) {
            return Ok(());
        }

        let tick = {
            let scheduler: Weak<dyn IntervalScheduler> = Rc::downgrade(&self.scheduler);
            let state = Rc::downgrade(&self.state);
            let interval = Rc::downgrade(&self.interval);
            let notifier = self.notifier.clone();
            let on_tick = self.on_tick.clone();
            Rc::new(move || {
                let (Some(scheduler), Some(state)) = (scheduler.upgrade(), state.upgrade()) else {
                    return;
                };
                let finished = state.borrow_mut().tick(scheduler.now_ms());
                if finished {
                    let handle = interval.upgrade().and_then(|slot| slot.borrow_mut().take());
                    drop(handle);
                    notifier.countdown_finished(finished_notification());
                }
                on_tick();
            })
        };

        match self.scheduler.set_interval(COUNTDOWN_TICK_MS, tick) {
            Ok(handle) => {
                *self.interval.borrow_mut() = Some(handle);
                Ok(())
            }
            Err(err) => {
                self.state.borrow_mut().pause(now);
                Err(err)
            }
        }
    }

    /// Pauses and releases the interval.
    pub fn pause(&mut self) {
        self.state.borrow_mut().pause(self.scheduler.now_ms());
        self.release_interval();
    }

    /// Restores the full duration and releases the interval.
    pub fn reset(&mut self) {
        self.release_interval();
        self.state.borrow_mut().reset();
    }

    /// Changes the duration while stopped. Returns `false` while running.
    pub fn set_duration(&mut self, duration_ms: u64) -> bool {
        self.state.borrow_mut().set_duration(duration_ms)
    }

    /// Configured length.
    pub fn duration_ms(&self) -> u64 {
        self.state.borrow().duration_ms()
    }

    /// Time left at the scheduler's current instant.
    pub fn remaining_ms(&self) -> u64 {
        self.state.borrow().remaining_ms(self.scheduler.now_ms())
    }

    /// Whether the countdown is running.
    pub fn is_running(&self) -> bool {
        self.state.borrow().is_running()
    }

    /// Whether the countdown reached zero since the last reset.
    pub fn is_finished(&self) -> bool {
        self.state.borrow().is_finished()
    }

    /// Whether a deadline poll is currently held.
    pub fn has_interval(&self) -> bool {
        self.interval
            .borrow()
            .as_ref()
            .is_some_and(IntervalHandle::is_active)
    }

    fn release_interval(&self) {
        let handle = self.interval.borrow_mut().take();
        drop(handle);
    }
}
