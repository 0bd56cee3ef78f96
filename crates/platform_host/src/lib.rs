//! Typed host-domain contracts and shared models used by desktop apps and browser adapters.
//!
//! This crate is the API-first boundary for platform services. It exposes versioned app-state
//! persistence, lightweight preferences, notifications, interval scheduling, and time helpers,
//! while concrete browser adapters live in `platform_host_web`.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod host;
pub mod notifications;
pub mod storage;
pub mod time;
pub mod timers;

pub use host::{HostServices, HostStrategy, MemoryHost};
pub use notifications::service::{
    MemoryNotificationService, NoopNotificationService, Notification, NotificationFuture,
    NotificationService,
};
pub use storage::app_state::{
    build_app_state_envelope, decode_app_state_envelope, load_app_state_typed_with,
    load_app_state_with_migration, migrate_envelope_payload, save_app_state_with,
    AppStateEnvelope, AppStateStore, AppStateStoreFuture, MemoryAppStateStore, NoopAppStateStore,
    APP_STATE_ENVELOPE_VERSION, CALENDAR_CORRUPT_STATE_NAMESPACE, CALENDAR_STATE_NAMESPACE,
};
pub use storage::prefs::{
    load_pref_with, save_pref_with, MemoryPrefsStore, NoopPrefsStore, PrefsStore, PrefsStoreFuture,
    CALENDAR_PREFS_KEY, LEGACY_CALENDAR_EVENTS_KEY,
};
pub use time::{next_monotonic_id_above, next_monotonic_timestamp_ms, unix_time_ms_now};
pub use timers::{
    IntervalHandle, IntervalScheduler, IntervalTick, ManualIntervalScheduler,
    NoopIntervalScheduler,
};
