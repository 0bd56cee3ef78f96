//! Shared contract types between the desktop shell and managed apps.
//!
//! Apps never read ambient global UI state. Everything an app may observe or request from the
//! shell arrives through the [`AppServices`] bundle injected when the app view is constructed:
//! the dark-mode flag (read-only), window-state persistence, and notifications.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

use leptos::{Callable, Callback, ReadSignal};
use platform_host::Notification;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Stable identifier for an app package/module.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApplicationId(String);

impl ApplicationId {
    /// Returns the string form of the identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Creates an id without validation for trusted constants.
    pub fn trusted(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }
}

impl std::fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// App id of the calendar.
pub const CALENDAR_APP_ID: &str = "system.calendar";
/// App id of the clock (stopwatch and timer).
pub const CLOCK_APP_ID: &str = "system.clock";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Transport commands emitted by app services to the desktop shell.
pub enum AppCommand {
    /// Persist manager-owned state for the current window.
    PersistState {
        /// Serialized app state payload.
        state: Value,
    },
    /// Emit a user-visible notification.
    Notify(Notification),
}

#[derive(Clone, Copy)]
/// Window-scoped state persistence service.
pub struct StateService {
    sender: Callback<AppCommand>,
}

impl StateService {
    /// Persists manager-owned state for this window instance.
    pub fn persist_window_state(&self, state: Value) {
        self.sender.call(AppCommand::PersistState { state });
    }
}

#[derive(Clone, Copy)]
/// Read-only view of shell appearance. Only the shell changes the flag.
pub struct ThemeService {
    /// Current shell dark-mode flag.
    pub dark_mode: ReadSignal<bool>,
}

#[derive(Clone)]
/// Notification service stamped with the emitting app id.
pub struct NotificationService {
    sender: Callback<AppCommand>,
    app_id: ApplicationId,
}

impl NotificationService {
    /// Emits a notification `{ title, message, app }` through the shell.
    pub fn notify(&self, title: impl Into<String>, message: impl Into<String>) {
        self.sender.call(AppCommand::Notify(Notification::new(
            title,
            message,
            self.app_id.as_str(),
        )));
    }
}

#[derive(Clone)]
/// Injected app services bundle.
pub struct AppServices {
    /// Id of the app these services are scoped to.
    pub app_id: ApplicationId,
    /// State persistence service.
    pub state: StateService,
    /// Theme service.
    pub theme: ThemeService,
    /// Notification service.
    pub notifications: NotificationService,
}

impl AppServices {
    /// Creates service handles from the shell command callback and theme signal.
    pub fn new(
        app_id: ApplicationId,
        sender: Callback<AppCommand>,
        dark_mode: ReadSignal<bool>,
    ) -> Self {
        Self {
            state: StateService { sender },
            theme: ThemeService { dark_mode },
            notifications: NotificationService {
                sender,
                app_id: app_id.clone(),
            },
            app_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use leptos::{create_rw_signal, SignalGetUntracked, SignalSet};
    use serde_json::json;

    use super::*;

    fn recording_services(
        app_id: &str,
        dark_mode: ReadSignal<bool>,
    ) -> (AppServices, Rc<RefCell<Vec<AppCommand>>>) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = log.clone();
        let sender = Callback::new(move |command: AppCommand| sink.borrow_mut().push(command));
        (
            AppServices::new(ApplicationId::trusted(app_id), sender, dark_mode),
            log,
        )
    }

    #[test]
    fn window_state_is_sent_as_a_persist_command() {
        let _ = leptos::create_runtime();
        let (services, log) =
            recording_services(CALENDAR_APP_ID, create_rw_signal(false).read_only());
        services
            .state
            .persist_window_state(json!({ "selected": "2024-03-05" }));

        assert_eq!(services.app_id.to_string(), CALENDAR_APP_ID);
        assert_eq!(
            log.borrow().as_slice(),
            &[AppCommand::PersistState {
                state: json!({ "selected": "2024-03-05" })
            }]
        );
    }

    #[test]
    fn notifications_carry_the_app_id() {
        let _ = leptos::create_runtime();
        let (services, log) = recording_services(CLOCK_APP_ID, create_rw_signal(false).read_only());
        services.notifications.notify("Timer", "Done");

        assert_eq!(
            log.borrow().as_slice(),
            &[AppCommand::Notify(Notification::new(
                "Timer",
                "Done",
                CLOCK_APP_ID
            ))]
        );
    }

    #[test]
    fn theme_flag_follows_the_shell_signal() {
        let _ = leptos::create_runtime();
        let shell_flag = create_rw_signal(true);
        let (services, log) = recording_services(CALENDAR_APP_ID, shell_flag.read_only());
        assert!(services.theme.dark_mode.get_untracked());

        shell_flag.set(false);
        assert!(!services.theme.dark_mode.get_untracked());
        assert!(log.borrow().is_empty());
    }
}
