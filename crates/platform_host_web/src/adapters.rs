use std::rc::Rc;

use platform_host::{
    HostServices, HostStrategy, NoopAppStateStore, NoopIntervalScheduler, NoopNotificationService,
    NoopPrefsStore,
};

use crate::{WebAppStateStore, WebIntervalScheduler, WebNotificationService, WebPrefsStore};

/// Returns the compile-time selected host strategy for the active build.
pub const fn selected_host_strategy() -> HostStrategy {
    #[cfg(feature = "desktop-host-stub")]
    {
        HostStrategy::DesktopStub
    }

    #[cfg(not(feature = "desktop-host-stub"))]
    {
        HostStrategy::Browser
    }
}

/// Returns the selected host strategy as a stable string token.
pub fn host_strategy_name() -> &'static str {
    selected_host_strategy().as_str()
}

/// Builds the host service bundle for the compile-time selected strategy.
pub fn build_host_services() -> HostServices {
    host_services_for(selected_host_strategy())
}

/// Builds the host service bundle for `strategy`.
///
/// The desktop stub gets no-op services and the memory strategy gets the in-memory adapters.
pub fn host_services_for(strategy: HostStrategy) -> HostServices {
    match strategy {
        HostStrategy::Browser => HostServices {
            app_state: Rc::new(WebAppStateStore::default()),
            prefs: Rc::new(WebPrefsStore),
            notifications: Rc::new(WebNotificationService),
            scheduler: Rc::new(WebIntervalScheduler),
            host_strategy: HostStrategy::Browser,
        },
        HostStrategy::DesktopStub => HostServices {
            app_state: Rc::new(NoopAppStateStore),
            prefs: Rc::new(NoopPrefsStore),
            notifications: Rc::new(NoopNotificationService),
            scheduler: Rc::new(NoopIntervalScheduler),
            host_strategy: HostStrategy::DesktopStub,
        },
        HostStrategy::Memory => HostServices::memory().0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundle_reports_selected_strategy() {
        let services = build_host_services();
        assert_eq!(services.host_strategy, selected_host_strategy());
        assert_eq!(host_strategy_name(), services.host_strategy.as_str());
    }

    #[test]
    fn every_strategy_bundle_reports_itself() {
        for strategy in [
            HostStrategy::Browser,
            HostStrategy::DesktopStub,
            HostStrategy::Memory,
        ] {
            assert_eq!(host_services_for(strategy).host_strategy, strategy);
        }
    }
}
