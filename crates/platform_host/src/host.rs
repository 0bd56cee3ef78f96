//! Host service bundle injected into desktop apps.

use std::rc::Rc;

use crate::{
    AppStateStore, IntervalScheduler, ManualIntervalScheduler, MemoryAppStateStore,
    MemoryNotificationService, MemoryPrefsStore, NotificationService, PrefsStore,
};

/// Stable host strategy selected for the current build/runtime composition path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostStrategy {
    /// Browser-backed services (`localStorage`, Web Notifications, `setInterval`).
    Browser,
    /// Placeholder/no-op services for non-browser builds.
    DesktopStub,
    /// In-memory services used by tests and previews.
    Memory,
}

impl HostStrategy {
    /// Returns a stable string token for diagnostics.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Browser => "browser",
            Self::DesktopStub => "desktop-stub",
            Self::Memory => "memory",
        }
    }
}

/// Runtime-selected host service bundle.
///
/// All environment-specific service selection happens before this bundle reaches an app, which
/// keeps app crates decoupled from browser adapter details.
#[derive(Clone)]
pub struct HostServices {
    /// Durable app-state store.
    pub app_state: Rc<dyn AppStateStore>,
    /// Lightweight typed preference store.
    pub prefs: Rc<dyn PrefsStore>,
    /// Notification delivery service.
    pub notifications: Rc<dyn NotificationService>,
    /// Interval scheduler and clock.
    pub scheduler: Rc<dyn IntervalScheduler>,
    /// Stable strategy identifier for diagnostics.
    pub host_strategy: HostStrategy,
}

/// Handles to the concrete in-memory services behind [`HostServices::memory`].
#[derive(Clone, Default)]
pub struct MemoryHost {
    /// Shared app-state store.
    pub app_state: MemoryAppStateStore,
    /// Shared preference store.
    pub prefs: MemoryPrefsStore,
    /// Recording notification service.
    pub notifications: MemoryNotificationService,
    /// Manually advanced scheduler.
    pub scheduler: ManualIntervalScheduler,
}

impl MemoryHost {
    /// Builds a service bundle that shares state with these handles.
    pub fn services(&self) -> HostServices {
        HostServices {
            app_state: Rc::new(self.app_state.clone()),
            prefs: Rc::new(self.prefs.clone()),
            notifications: Rc::new(self.notifications.clone()),
            scheduler: Rc::new(self.scheduler.clone()),
            host_strategy: HostStrategy::Memory,
        }
    }
}

impl HostServices {
    /// Creates an in-memory bundle and returns the handles needed to inspect it.
    pub fn memory() -> (Self, MemoryHost) {
        let host = MemoryHost::default();
        (host.services(), host)
    }
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;
    use serde_json::json;

    use super::*;
    use crate::{AppStateEnvelope, Notification};

    #[test]
    fn memory_bundle_shares_state_with_handles() {
        let (services, host) = HostServices::memory();
        assert_eq!(services.host_strategy.as_str(), "memory");

        let envelope = AppStateEnvelope::new("app.example", 1, json!([]));
        block_on(services.app_state.save_app_state_envelope(&envelope)).expect("save");
        assert!(host.app_state.envelope("app.example").is_some());

        block_on(
            services
                .notifications
                .notify(&Notification::new("t", "m", "system.clock")),
        )
        .expect("notify");
        assert_eq!(host.notifications.sent().len(), 1);

        host.scheduler.advance(25);
        assert_eq!(services.scheduler.now_ms(), 25);
    }
}
