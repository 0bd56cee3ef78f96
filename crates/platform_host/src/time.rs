//! Wall-clock and monotonic id helpers shared across host contracts and apps.

use std::cell::Cell;
#[cfg(not(target_arch = "wasm32"))]
use std::time::{SystemTime, UNIX_EPOCH};

thread_local! {
    static LAST_ISSUED_MS: Cell<u64> = const { Cell::new(0) };
}

/// Returns the current unix timestamp in milliseconds.
pub fn unix_time_ms_now() -> u64 {
    #[cfg(target_arch = "wasm32")]
    {
        js_sys::Date::now().max(0.0) as u64
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }
}

/// Returns a unix millisecond timestamp that is strictly greater than every value previously
/// returned on this thread, even when the system clock stalls or steps backwards.
pub fn next_monotonic_timestamp_ms() -> u64 {
    next_monotonic_id_above(0)
}

/// Like [`next_monotonic_timestamp_ms`], but also strictly greater than `floor`.
///
/// Apps use this to mint record ids that cannot collide with ids loaded from storage.
pub fn next_monotonic_id_above(floor: u64) -> u64 {
    let now = unix_time_ms_now();
    LAST_ISSUED_MS.with(|last| {
        let next = now
            .max(last.get().saturating_add(1))
            .max(floor.saturating_add(1));
        last.set(next);
        next
    })
}
