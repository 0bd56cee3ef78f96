//! Notification payload, service contract, and no-op/in-memory adapters.

use std::{cell::RefCell, future::Future, pin::Pin, rc::Rc};

use serde::{Deserialize, Serialize};

/// User-visible notification emitted by an app through the shell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Short headline.
    pub title: String,
    /// Body text; may be empty.
    pub message: String,
    /// Id of the emitting app (for example `system.clock`).
    pub app: String,
}

impl Notification {
    /// Creates a notification payload.
    pub fn new(
        title: impl Into<String>,
        message: impl Into<String>,
        app: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            app: app.into(),
        }
    }
}

/// Object-safe boxed future used by [`NotificationService`].
pub type NotificationFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Host service for user-visible notifications.
pub trait NotificationService {
    /// Dispatches a notification.
    fn notify<'a>(
        &'a self,
        notification: &'a Notification,
    ) -> NotificationFuture<'a, Result<(), String>>;
}

#[derive(Debug, Clone, Copy, Default)]
/// No-op notification service for unsupported targets.
pub struct NoopNotificationService;

impl NotificationService for NoopNotificationService {
    fn notify<'a>(
        &'a self,
        _notification: &'a Notification,
    ) -> NotificationFuture<'a, Result<(), String>> {
        Box::pin(async { Ok(()) })
    }
}

#[derive(Debug, Clone, Default)]
/// Notification service that records every dispatched notification. Clones share the log.
pub struct MemoryNotificationService {
    sent: Rc<RefCell<Vec<Notification>>>,
}

impl MemoryNotificationService {
    /// Returns every notification dispatched so far, oldest first.
    pub fn sent(&self) -> Vec<Notification> {
        self.sent.borrow().clone()
    }
}

impl NotificationService for MemoryNotificationService {
    fn notify<'a>(
        &'a self,
        notification: &'a Notification,
    ) -> NotificationFuture<'a, Result<(), String>> {
        Box::pin(async move {
            self.sent.borrow_mut().push(notification.clone());
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;

    use super::*;

    #[test]
    fn memory_service_records_in_order() {
        let service = MemoryNotificationService::default();
        let observer = service.clone();
        block_on(service.notify(&Notification::new("a", "", "system.clock"))).expect("notify");
        block_on(service.notify(&Notification::new("b", "", "system.clock"))).expect("notify");
        let titles = observer
            .sent()
            .into_iter()
            .map(|n| n.title)
            .collect::<Vec<_>>();
        assert_eq!(titles, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn notification_serializes_with_app_field() {
        let value = serde_json::to_value(Notification::new("t", "m", "system.calendar"))
            .expect("serialize");
        assert_eq!(value["app"], "system.calendar");
        assert_eq!(value["message"], "m");
    }
}
