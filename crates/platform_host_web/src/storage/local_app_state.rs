//! `localStorage`-backed app-state store.
//!
//! Each namespace is stored as one serialized [`AppStateEnvelope`] under
//! `app-state:<namespace>`, overwritten wholesale on every save.

use platform_host::{AppStateEnvelope, AppStateStore, AppStateStoreFuture};

use crate::WebPrefsStore;

const APP_STATE_KEY_PREFIX: &str = "app-state:";

/// Returns the localStorage key holding `namespace`.
pub fn app_state_storage_key(namespace: &str) -> String {
    format!("{APP_STATE_KEY_PREFIX}{namespace}")
}

#[derive(Debug, Clone, Copy, Default)]
/// Browser app-state store backed by `window.localStorage`.
pub struct WebAppStateStore {
    raw: WebPrefsStore,
}

impl WebAppStateStore {
    fn load(self, namespace: &str) -> Result<Option<AppStateEnvelope>, String> {
        let Some(raw) = self.raw.load_raw(&app_state_storage_key(namespace))? else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| format!("app state `{namespace}` is not a readable envelope: {e}"))
    }

    fn save(self, envelope: &AppStateEnvelope) -> Result<(), String> {
        let raw = serde_json::to_string(envelope).map_err(|e| e.to_string())?;
        self.raw
            .save_raw(&app_state_storage_key(&envelope.namespace), &raw)
    }
}

impl AppStateStore for WebAppStateStore {
    fn load_app_state_envelope<'a>(
        &'a self,
        namespace: &'a str,
    ) -> AppStateStoreFuture<'a, Result<Option<AppStateEnvelope>, String>> {
        let store = *self;
        Box::pin(async move { store.load(namespace) })
    }

    fn save_app_state_envelope<'a>(
        &'a self,
        envelope: &'a AppStateEnvelope,
    ) -> AppStateStoreFuture<'a, Result<(), String>> {
        let store = *self;
        Box::pin(async move { store.save(envelope) })
    }

    fn delete_app_state<'a>(
        &'a self,
        namespace: &'a str,
    ) -> AppStateStoreFuture<'a, Result<(), String>> {
        let store = *self;
        Box::pin(async move { store.raw.delete_raw(&app_state_storage_key(namespace)) })
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use futures::executor::block_on;
    use serde_json::json;

    use super::*;

    #[test]
    fn storage_key_is_namespaced() {
        assert_eq!(app_state_storage_key("app.calendar"), "app-state:app.calendar");
    }

    #[test]
    fn non_wasm_store_loads_nothing_and_accepts_writes() {
        let store = WebAppStateStore::default();
        let store_obj: &dyn AppStateStore = &store;
        let envelope = AppStateEnvelope::new("app.calendar", 1, json!({"events": []}));
        assert_eq!(
            block_on(store_obj.load_app_state_envelope("app.calendar")).expect("load"),
            None
        );
        block_on(store_obj.save_app_state_envelope(&envelope)).expect("save");
        block_on(store_obj.delete_app_state("app.calendar")).expect("delete");
    }
}
