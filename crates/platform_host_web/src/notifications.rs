//! Notification host-service adapter backed by the Web Notifications API.

use platform_host::{Notification, NotificationFuture, NotificationService};

#[derive(Debug, Clone, Copy, Default)]
/// Browser notification adapter.
///
/// The emitting app id is carried as the notification tag so repeated notifications from one
/// app replace each other instead of stacking.
pub struct WebNotificationService;

impl NotificationService for WebNotificationService {
    fn notify<'a>(
        &'a self,
        notification: &'a Notification,
    ) -> NotificationFuture<'a, Result<(), String>> {
        Box::pin(async move {
            #[cfg(target_arch = "wasm32")]
            {
                use wasm_bindgen::JsValue;

                let options = web_sys::NotificationOptions::new();
                options.set_body(&notification.message);
                options.set_tag(&notification.app);
                return web_sys::Notification::new_with_options(&notification.title, &options)
                    .map(|_| ())
                    .map_err(|err: JsValue| format!("notification dispatch failed: {err:?}"));
            }

            #[cfg(not(target_arch = "wasm32"))]
            {
                let _ = notification;
                Ok(())
            }
        })
    }
}
