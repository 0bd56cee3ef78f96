//! `window.setInterval`-backed [`IntervalScheduler`].

use platform_host::{IntervalHandle, IntervalScheduler, IntervalTick};

#[derive(Debug, Clone, Copy, Default)]
/// Browser interval scheduler.
///
/// The JS closure lives inside the returned handle's cancel callback, so it is released exactly
/// when the interval is cleared.
pub struct WebIntervalScheduler;

impl IntervalScheduler for WebIntervalScheduler {
    fn now_ms(&self) -> u64 {
        platform_host::unix_time_ms_now()
    }

    fn set_interval(&self, period_ms: u32, tick: IntervalTick) -> Result<IntervalHandle, String> {
        #[cfg(target_arch = "wasm32")]
        {
            use wasm_bindgen::{closure::Closure, JsCast};

            let window = web_sys::window().ok_or_else(|| "window unavailable".to_string())?;
            let callback = Closure::<dyn FnMut()>::new(move || tick());
            let timeout = i32::try_from(period_ms.max(1)).unwrap_or(i32::MAX);
            let id = window
                .set_interval_with_callback_and_timeout_and_arguments_0(
                    callback.as_ref().unchecked_ref(),
                    timeout,
                )
                .map_err(|e| format!("setInterval failed: {e:?}"))?;

            Ok(IntervalHandle::new(move || {
                if let Some(window) = web_sys::window() {
                    window.clear_interval_with_handle(id);
                }
                let _ = &callback;
            }))
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = (period_ms, tick);
            Ok(IntervalHandle::inert())
        }
    }
}
