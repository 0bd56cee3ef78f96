//! Clock desktop app: stopwatch and countdown timer.
//!
//! Timing runs on the host [`IntervalScheduler`](platform_host::IntervalScheduler); every
//! running clock owns exactly one interval handle and releases it when it stops.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod controller;
pub mod countdown;
pub mod stopwatch;

use std::{cell::RefCell, rc::Rc};

use desktop_app_contract::AppServices;
use leptos::*;
use platform_host::HostServices;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use controller::{
    finished_notification, CountdownController, FinishNotifier, HostNotifier, ShellNotifier,
    StopwatchController, TickListener,
};
pub use countdown::{format_countdown, Countdown};
pub use stopwatch::{format_stopwatch, Stopwatch};

const DEFAULT_COUNTDOWN_MINUTES: u32 = 5;
const MAX_COUNTDOWN_MINUTES: u32 = 24 * 60;

/// Window state restored by the desktop manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockWindowState {
    /// Countdown length last chosen in this window.
    pub countdown_minutes: u32,
}

impl Default for ClockWindowState {
    fn default() -> Self {
        Self {
            countdown_minutes: DEFAULT_COUNTDOWN_MINUTES,
        }
    }
}

impl ClockWindowState {
    /// Reads a restored payload, clamping the duration to `1..=1440` minutes.
    pub fn from_restored(restored: Option<&Value>) -> Self {
        let minutes = restored
            .and_then(|value| serde_json::from_value::<Self>(value.clone()).ok())
            .unwrap_or_default()
            .countdown_minutes;
        Self {
            countdown_minutes: minutes.clamp(1, MAX_COUNTDOWN_MINUTES),
        }
    }

    /// Countdown length in milliseconds.
    pub fn countdown_ms(self) -> u64 {
        u64::from(self.countdown_minutes) * 60_000
    }
}

fn parse_minutes(raw: &str) -> Option<u32> {
    raw.trim()
        .parse::<u32>()
        .ok()
        .filter(|minutes| (1..=MAX_COUNTDOWN_MINUTES).contains(minutes))
}

#[component]
/// Clock app window contents: a stopwatch with laps and a countdown timer.
pub fn ClockApp(
    /// Host services providing the interval scheduler and notification fallback.
    host: HostServices,
    /// Manager-restored app state payload for this window instance.
    restored_state: Option<Value>,
    /// Optional app-host bridge for notifications and window state.
    services: Option<AppServices>,
) -> impl IntoView {
    let window_state = create_rw_signal(ClockWindowState::from_restored(restored_state.as_ref()));
    let revision = create_rw_signal(0u64);
    let notice = create_rw_signal::<Option<String>>(None);
    let dark_mode = services.as_ref().map(|services| services.theme.dark_mode);

    let on_tick: TickListener = Rc::new(move || revision.update(|n| *n = n.wrapping_add(1)));
    let notifier: Rc<dyn FinishNotifier> = match services.as_ref() {
        Some(services) => Rc::new(ShellNotifier(services.notifications.clone())),
        None => Rc::new(HostNotifier(host.notifications.clone())),
    };

    let stopwatch = Rc::new(RefCell::new(StopwatchController::new(
        host.scheduler.clone(),
        on_tick.clone(),
    )));
    let countdown = Rc::new(RefCell::new(CountdownController::new(
        host.scheduler.clone(),
        window_state.get_untracked().countdown_ms(),
        notifier,
        on_tick,
    )));

    {
        let (stopwatch, countdown) = (stopwatch.clone(), countdown.clone());
        on_cleanup(move || {
            stopwatch.borrow_mut().reset();
            countdown.borrow_mut().reset();
        });
    }

    let refresh = move || revision.update(|n| *n = n.wrapping_add(1));
    let report = move |result: Result<(), String>| {
        if let Err(err) = result {
            logging::warn!("clock interval failed: {err}");
            notice.set(Some("Timer unavailable".to_string()));
        }
    };

    let stopwatch_panel = {
        let (display, laps, toggle, lap, reset) = (
            stopwatch.clone(),
            stopwatch.clone(),
            stopwatch.clone(),
            stopwatch.clone(),
            stopwatch.clone(),
        );
        view! {
            <section class="clock-stopwatch">
                <h3>"Stopwatch"</h3>
                <div class="clock-display">
                    {move || {
                        revision.get();
                        format_stopwatch(display.borrow().elapsed_ms())
                    }}
                </div>
                <div class="clock-actions">
                    <button
                        type="button"
                        on:click=move |_| {
                            let mut sw = toggle.borrow_mut();
                            if sw.is_running() {
                                sw.stop();
                            } else {
                                report(sw.start());
                            }
                            drop(sw);
                            refresh();
                        }
                    >
                        {
                            let label = stopwatch.clone();
                            move || {
                                revision.get();
                                if label.borrow().is_running() { "Stop" } else { "Start" }
                            }
                        }
                    </button>
                    <button
                        type="button"
                        on:click=move |_| {
                            lap.borrow_mut().lap();
                            refresh();
                        }
                    >
                        "Lap"
                    </button>
                    <button
                        type="button"
                        on:click=move |_| {
                            reset.borrow_mut().reset();
                            refresh();
                        }
                    >
                        "Reset"
                    </button>
                </div>
                <ol class="clock-laps">
                    {move || {
                        revision.get();
                        laps.borrow()
                            .laps()
                            .iter()
                            .map(|split| view! { <li>{format_stopwatch(*split)}</li> })
                            .collect_view()
                    }}
                </ol>
            </section>
        }
    };

    let countdown_panel = {
        let (display, toggle, reset, minutes, label) = (
            countdown.clone(),
            countdown.clone(),
            countdown.clone(),
            countdown.clone(),
            countdown.clone(),
        );
        let services = services.clone();
        view! {
            <section class="clock-countdown">
                <h3>"Timer"</h3>
                <div class="clock-display">
                    {move || {
                        revision.get();
                        let cd = display.borrow();
                        if cd.is_finished() {
                            "Done".to_string()
                        } else {
                            format_countdown(cd.remaining_ms())
                        }
                    }}
                </div>
                <label>
                    "Minutes "
                    <input
                        type="number"
                        min="1"
                        max=MAX_COUNTDOWN_MINUTES.to_string()
                        prop:value=move || window_state.get().countdown_minutes.to_string()
                        on:change=move |ev| {
                            let Some(parsed) = parse_minutes(&event_target_value(&ev)) else {
                                notice.set(Some("Enter 1 to 1440 minutes".to_string()));
                                return;
                            };
                            let next = ClockWindowState { countdown_minutes: parsed };
                            if !minutes.borrow_mut().set_duration(next.countdown_ms()) {
                                notice.set(Some("Pause the timer to change it".to_string()));
                                return;
                            }
                            notice.set(None);
                            window_state.set(next);
                            if let Some(services) = services.as_ref() {
                                if let Ok(value) = serde_json::to_value(next) {
                                    services.state.persist_window_state(value);
                                }
                            }
                            refresh();
                        }
                    />
                </label>
                <div class="clock-actions">
                    <button
                        type="button"
                        on:click=move |_| {
                            let mut cd = toggle.borrow_mut();
                            if cd.is_running() {
                                cd.pause();
                            } else {
                                report(cd.start());
                            }
                            drop(cd);
                            refresh();
                        }
                    >
                        {move || {
                            revision.get();
                            if label.borrow().is_running() { "Pause" } else { "Start" }
                        }}
                    </button>
                    <button
                        type="button"
                        on:click=move |_| {
                            reset.borrow_mut().reset();
                            refresh();
                        }
                    >
                        "Reset"
                    </button>
                </div>
            </section>
        }
    };

    view! {
        <div class=move || {
            if dark_mode.is_some_and(|flag| flag.get()) {
                "app-clock-shell dark"
            } else {
                "app-clock-shell"
            }
        }>
            {stopwatch_panel}
            {countdown_panel}
            <div class="clock-notice" role="status">
                {move || notice.get().unwrap_or_default()}
            </div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn window_state_restores_and_clamps() {
        assert_eq!(
            ClockWindowState::from_restored(None),
            ClockWindowState::default()
        );
        let restored = json!({ "countdown_minutes": 25 });
        assert_eq!(
            ClockWindowState::from_restored(Some(&restored)).countdown_ms(),
            25 * 60_000
        );
        let huge = json!({ "countdown_minutes": 100_000 });
        assert_eq!(
            ClockWindowState::from_restored(Some(&huge)).countdown_minutes,
            MAX_COUNTDOWN_MINUTES
        );
        let zero = json!({ "countdown_minutes": 0 });
        assert_eq!(ClockWindowState::from_restored(Some(&zero)).countdown_minutes, 1);
    }

    #[test]
    fn minutes_input_accepts_only_the_supported_range() {
        assert_eq!(parse_minutes(" 15 "), Some(15));
        assert_eq!(parse_minutes("0"), None);
        assert_eq!(parse_minutes("1441"), None);
        assert_eq!(parse_minutes("soon"), None);
    }
}
