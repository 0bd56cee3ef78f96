//! Browser (`wasm32`) implementations of [`platform_host`] service contracts.
//!
//! This crate is the concrete browser-side host wiring layer for app-state, prefs,
//! notifications, and interval scheduling. On non-wasm targets every adapter compiles to an
//! inert fallback so shared crates can still be unit tested natively.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

/// Compile-time host-strategy selection and host-service factory.
pub mod adapters;
pub mod notifications;
pub mod storage;
pub mod timers;

pub use adapters::{
    build_host_services, host_services_for, host_strategy_name, selected_host_strategy,
};
pub use notifications::WebNotificationService;
pub use storage::local_app_state::{app_state_storage_key, WebAppStateStore};
pub use storage::local_prefs::WebPrefsStore;
pub use timers::WebIntervalScheduler;
