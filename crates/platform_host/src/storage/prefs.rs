//! Per-key preference storage.
//!
//! Each key holds one JSON document as text. Calendar editor defaults live here, and so does the
//! unversioned event array written before [`crate::AppStateEnvelope`] existed; that key is read
//! once during migration and then removed.

use std::{cell::RefCell, collections::HashMap, future::Future, pin::Pin, rc::Rc};

use serde::{de::DeserializeOwned, Serialize};

/// Key of the legacy unversioned calendar event array.
pub const LEGACY_CALENDAR_EVENTS_KEY: &str = "calendar-events";
/// Key of the calendar editor defaults.
pub const CALENDAR_PREFS_KEY: &str = "calendar.prefs.v1";

/// Boxed local future returned by [`PrefsStore`].
pub type PrefsStoreFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Text-per-key preference storage.
pub trait PrefsStore {
    /// Returns the text stored under `key`, or `None` if the key was never written.
    fn load_pref<'a>(
        &'a self,
        key: &'a str,
    ) -> PrefsStoreFuture<'a, Result<Option<String>, String>>;

    /// Replaces the text stored under `key`.
    fn save_pref<'a>(
        &'a self,
        key: &'a str,
        raw_json: &'a str,
    ) -> PrefsStoreFuture<'a, Result<(), String>>;

    /// Removes `key`. Removing a missing key succeeds.
    fn delete_pref<'a>(&'a self, key: &'a str) -> PrefsStoreFuture<'a, Result<(), String>>;
}

#[derive(Debug, Clone, Copy, Default)]
/// Store that holds nothing and accepts every write.
pub struct NoopPrefsStore;

impl PrefsStore for NoopPrefsStore {
    fn load_pref<'a>(
        &'a self,
        _key: &'a str,
    ) -> PrefsStoreFuture<'a, Result<Option<String>, String>> {
        Box::pin(async { Ok(None) })
    }

    fn save_pref<'a>(
        &'a self,
        _key: &'a str,
        _raw_json: &'a str,
    ) -> PrefsStoreFuture<'a, Result<(), String>> {
        Box::pin(async { Ok(()) })
    }

    fn delete_pref<'a>(&'a self, _key: &'a str) -> PrefsStoreFuture<'a, Result<(), String>> {
        Box::pin(async { Ok(()) })
    }
}

#[derive(Debug, Clone, Default)]
/// Map-backed store. Clones share the same map, so a test can keep one clone for inspection.
pub struct MemoryPrefsStore {
    entries: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryPrefsStore {
    /// Store pre-populated with `raw` under `key`, e.g. a legacy payload awaiting migration.
    pub fn with_raw(key: &str, raw: impl Into<String>) -> Self {
        let store = Self::default();
        store.entries.borrow_mut().insert(key.to_string(), raw.into());
        store
    }

    /// Returns the text stored under `key`.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }
}

impl PrefsStore for MemoryPrefsStore {
    fn load_pref<'a>(
        &'a self,
        key: &'a str,
    ) -> PrefsStoreFuture<'a, Result<Option<String>, String>> {
        Box::pin(async move { Ok(self.raw(key)) })
    }

    fn save_pref<'a>(
        &'a self,
        key: &'a str,
        raw_json: &'a str,
    ) -> PrefsStoreFuture<'a, Result<(), String>> {
        Box::pin(async move {
            self.entries
                .borrow_mut()
                .insert(key.to_string(), raw_json.to_string());
            Ok(())
        })
    }

    fn delete_pref<'a>(&'a self, key: &'a str) -> PrefsStoreFuture<'a, Result<(), String>> {
        Box::pin(async move {
            self.entries.borrow_mut().remove(key);
            Ok(())
        })
    }
}

/// Reads `key` and decodes it as `T`.
///
/// # Errors
///
/// Returns the store error, or a decode error naming `key`.
pub async fn load_pref_with<S: PrefsStore + ?Sized, T: DeserializeOwned>(
    store: &S,
    key: &str,
) -> Result<Option<T>, String> {
    let Some(raw) = store.load_pref(key).await? else {
        return Ok(None);
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|e| format!("pref `{key}` does not decode: {e}"))
}

/// Encodes `value` as JSON and stores it under `key`.
///
/// # Errors
///
/// Returns the encode or store error.
pub async fn save_pref_with<S: PrefsStore + ?Sized, T: Serialize>(
    store: &S,
    key: &str,
    value: &T,
) -> Result<(), String> {
    let raw = serde_json::to_string(value).map_err(|e| e.to_string())?;
    store.save_pref(key, &raw).await
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;
    use serde::{Deserialize, Serialize};

    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Defaults {
        duration_minutes: u32,
    }

    #[test]
    fn legacy_payload_is_visible_until_deleted() {
        let store = MemoryPrefsStore::with_raw(LEGACY_CALENDAR_EVENTS_KEY, "[]");
        let observer = store.clone();
        let store: &dyn PrefsStore = &store;

        assert_eq!(
            block_on(store.load_pref(LEGACY_CALENDAR_EVENTS_KEY)).expect("load"),
            Some("[]".to_string())
        );
        block_on(store.delete_pref(LEGACY_CALENDAR_EVENTS_KEY)).expect("delete");
        block_on(store.delete_pref(LEGACY_CALENDAR_EVENTS_KEY)).expect("second delete");
        assert_eq!(observer.raw(LEGACY_CALENDAR_EVENTS_KEY), None);
    }

    #[test]
    fn typed_helpers_store_json_text() {
        let store = MemoryPrefsStore::default();
        block_on(save_pref_with(
            &store,
            CALENDAR_PREFS_KEY,
            &Defaults {
                duration_minutes: 30,
            },
        ))
        .expect("save");
        assert_eq!(
            store.raw(CALENDAR_PREFS_KEY).as_deref(),
            Some(r#"{"duration_minutes":30}"#)
        );

        let loaded: Option<Defaults> =
            block_on(load_pref_with(&store, CALENDAR_PREFS_KEY)).expect("load");
        assert_eq!(loaded.map(|d| d.duration_minutes), Some(30));
        let missing: Option<Defaults> =
            block_on(load_pref_with(&store, "calendar.prefs.v0")).expect("load");
        assert!(missing.is_none());
    }

    #[test]
    fn decode_error_names_the_key() {
        let store = MemoryPrefsStore::with_raw(CALENDAR_PREFS_KEY, "{not json");
        let err = block_on(load_pref_with::<_, Defaults>(&store, CALENDAR_PREFS_KEY))
            .expect_err("malformed json must fail");
        assert!(err.contains(CALENDAR_PREFS_KEY), "{err}");
    }

    #[test]
    fn noop_store_forgets_everything() {
        let store = NoopPrefsStore;
        block_on(store.save_pref(CALENDAR_PREFS_KEY, "{}")).expect("save");
        assert_eq!(block_on(store.load_pref(CALENDAR_PREFS_KEY)).expect("load"), None);
        block_on(store.delete_pref(CALENDAR_PREFS_KEY)).expect("delete");
    }
}
