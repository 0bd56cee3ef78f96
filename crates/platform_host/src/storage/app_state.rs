//! App-state persistence contracts, envelope types, and schema migration helpers.

use std::{cell::RefCell, collections::HashMap, future::Future, pin::Pin, rc::Rc};

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

/// Version for [`AppStateEnvelope`] metadata serialization.
pub const APP_STATE_ENVELOPE_VERSION: u32 = 1;
/// Namespace used by the calendar event collection.
pub const CALENDAR_STATE_NAMESPACE: &str = "app.calendar";
/// Namespace receiving a copy of an unreadable calendar envelope before reseeding.
pub const CALENDAR_CORRUPT_STATE_NAMESPACE: &str = "app.calendar.corrupt";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Versioned envelope for persisted app state payloads.
pub struct AppStateEnvelope {
    /// Envelope schema version.
    pub envelope_version: u32,
    /// Namespace identifying the owning app/domain.
    pub namespace: String,
    /// App-defined schema version for the payload.
    pub schema_version: u32,
    /// Last update time in unix milliseconds.
    pub updated_at_unix_ms: u64,
    /// Serialized app payload.
    pub payload: Value,
}

impl AppStateEnvelope {
    /// Creates a new envelope and stamps it with a monotonic timestamp.
    pub fn new(namespace: impl Into<String>, schema_version: u32, payload: Value) -> Self {
        Self {
            envelope_version: APP_STATE_ENVELOPE_VERSION,
            namespace: namespace.into(),
            schema_version,
            updated_at_unix_ms: crate::time::next_monotonic_timestamp_ms(),
            payload,
        }
    }

    /// Returns a copy of this envelope re-addressed to `namespace`.
    pub fn relocated(&self, namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            ..self.clone()
        }
    }
}

/// Object-safe boxed future used by [`AppStateStore`] async methods.
pub type AppStateStoreFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Storage service for loading and saving app-state envelopes by namespace.
pub trait AppStateStore {
    /// Loads a persisted app-state envelope by namespace.
    ///
    /// A stored value that is not a readable envelope is reported as an error, not as `None`.
    fn load_app_state_envelope<'a>(
        &'a self,
        namespace: &'a str,
    ) -> AppStateStoreFuture<'a, Result<Option<AppStateEnvelope>, String>>;

    /// Saves a full app-state envelope, replacing any previous value for its namespace.
    fn save_app_state_envelope<'a>(
        &'a self,
        envelope: &'a AppStateEnvelope,
    ) -> AppStateStoreFuture<'a, Result<(), String>>;

    /// Deletes persisted app state for a namespace.
    fn delete_app_state<'a>(
        &'a self,
        namespace: &'a str,
    ) -> AppStateStoreFuture<'a, Result<(), String>>;
}

#[derive(Debug, Clone, Copy, Default)]
/// No-op app-state store for unsupported targets and baseline tests.
pub struct NoopAppStateStore;

impl AppStateStore for NoopAppStateStore {
    fn load_app_state_envelope<'a>(
        &'a self,
        _namespace: &'a str,
    ) -> AppStateStoreFuture<'a, Result<Option<AppStateEnvelope>, String>> {
        Box::pin(async { Ok(None) })
    }

    fn save_app_state_envelope<'a>(
        &'a self,
        _envelope: &'a AppStateEnvelope,
    ) -> AppStateStoreFuture<'a, Result<(), String>> {
        Box::pin(async { Ok(()) })
    }

    fn delete_app_state<'a>(
        &'a self,
        _namespace: &'a str,
    ) -> AppStateStoreFuture<'a, Result<(), String>> {
        Box::pin(async { Ok(()) })
    }
}

#[derive(Debug, Clone, Default)]
/// In-memory app-state store keyed by namespace.
///
/// Clones share the same backing map, which lets tests reopen a store and observe what a previous
/// owner persisted.
pub struct MemoryAppStateStore {
    inner: Rc<RefCell<HashMap<String, AppStateEnvelope>>>,
    save_count: Rc<RefCell<usize>>,
}

impl MemoryAppStateStore {
    /// Returns the number of successful saves performed against this store.
    pub fn save_count(&self) -> usize {
        *self.save_count.borrow()
    }

    /// Returns the envelope stored under `namespace`, if any.
    pub fn envelope(&self, namespace: &str) -> Option<AppStateEnvelope> {
        self.inner.borrow().get(namespace).cloned()
    }
}

impl AppStateStore for MemoryAppStateStore {
    fn load_app_state_envelope<'a>(
        &'a self,
        namespace: &'a str,
    ) -> AppStateStoreFuture<'a, Result<Option<AppStateEnvelope>, String>> {
        Box::pin(async move { Ok(self.envelope(namespace)) })
    }

    fn save_app_state_envelope<'a>(
        &'a self,
        envelope: &'a AppStateEnvelope,
    ) -> AppStateStoreFuture<'a, Result<(), String>> {
        Box::pin(async move {
            self.inner
                .borrow_mut()
                .insert(envelope.namespace.clone(), envelope.clone());
            *self.save_count.borrow_mut() += 1;
            Ok(())
        })
    }

    fn delete_app_state<'a>(
        &'a self,
        namespace: &'a str,
    ) -> AppStateStoreFuture<'a, Result<(), String>> {
        Box::pin(async move {
            self.inner.borrow_mut().remove(namespace);
            Ok(())
        })
    }
}

/// Builds a versioned [`AppStateEnvelope`] from a serializable payload.
///
/// # Errors
///
/// Returns an error when `payload` cannot be converted to JSON.
pub fn build_app_state_envelope<T: Serialize>(
    namespace: &str,
    schema_version: u32,
    payload: &T,
) -> Result<AppStateEnvelope, String> {
    let payload = serde_json::to_value(payload).map_err(|e| e.to_string())?;
    Ok(AppStateEnvelope::new(
        namespace.to_string(),
        schema_version,
        payload,
    ))
}

/// Deserializes an envelope payload into a target type.
///
/// # Errors
///
/// Returns an error when deserialization fails.
pub fn migrate_envelope_payload<T: DeserializeOwned>(
    envelope: &AppStateEnvelope,
) -> Result<T, String> {
    serde_json::from_value(envelope.payload.clone()).map_err(|e| e.to_string())
}

/// Decodes an envelope written at `current_schema_version` or migrates an older one.
///
/// Envelopes at the current version decode directly. Older versions are handed to `migrate`,
/// which may return `Ok(None)` for versions it does not know how to upgrade.
///
/// # Errors
///
/// Returns an error when the envelope was written by a newer schema, when the envelope metadata
/// version is unknown, or when decoding/migration fails.
pub fn decode_app_state_envelope<T, F>(
    envelope: &AppStateEnvelope,
    current_schema_version: u32,
    migrate: F,
) -> Result<Option<T>, String>
where
    T: DeserializeOwned,
    F: FnOnce(u32, &AppStateEnvelope) -> Result<Option<T>, String>,
{
    if envelope.envelope_version != APP_STATE_ENVELOPE_VERSION {
        return Err(format!(
            "unsupported envelope version {} for `{}`",
            envelope.envelope_version, envelope.namespace
        ));
    }

    match envelope.schema_version.cmp(&current_schema_version) {
        std::cmp::Ordering::Equal => migrate_envelope_payload(envelope).map(Some),
        std::cmp::Ordering::Less => migrate(envelope.schema_version, envelope),
        std::cmp::Ordering::Greater => Err(format!(
            "`{}` schema version {} is newer than supported version {current_schema_version}",
            envelope.namespace, envelope.schema_version
        )),
    }
}

/// Loads and decodes a typed payload, migrating older schema versions through `migrate`.
///
/// # Errors
///
/// Returns an error when the store fails or the stored envelope cannot be decoded.
pub async fn load_app_state_with_migration<S, T, F>(
    store: &S,
    namespace: &str,
    current_schema_version: u32,
    migrate: F,
) -> Result<Option<T>, String>
where
    S: AppStateStore + ?Sized,
    T: DeserializeOwned,
    F: FnOnce(u32, &AppStateEnvelope) -> Result<Option<T>, String>,
{
    let Some(envelope) = store.load_app_state_envelope(namespace).await? else {
        return Ok(None);
    };
    decode_app_state_envelope(&envelope, current_schema_version, migrate)
}

/// Loads a typed payload stored at exactly `schema_version`.
///
/// Envelopes written at any other version load as `None`.
///
/// # Errors
///
/// Returns an error when the store fails or the payload cannot be decoded.
pub async fn load_app_state_typed_with<S, T>(
    store: &S,
    namespace: &str,
    schema_version: u32,
) -> Result<Option<T>, String>
where
    S: AppStateStore + ?Sized,
    T: DeserializeOwned,
{
    load_app_state_with_migration(store, namespace, schema_version, |_, _| Ok(None)).await
}

/// Serializes `payload` into a fresh envelope and saves it.
///
/// # Errors
///
/// Returns an error when serialization or the store save fails.
pub async fn save_app_state_with<S, T>(
    store: &S,
    namespace: &str,
    schema_version: u32,
    payload: &T,
) -> Result<(), String>
where
    S: AppStateStore + ?Sized,
    T: Serialize,
{
    let envelope = build_app_state_envelope(namespace, schema_version, payload)?;
    store.save_app_state_envelope(&envelope).await
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;
    use serde::Deserialize;
    use serde::Serialize;
    use serde_json::json;

    use super::*;

    #[derive(Debug, Deserialize, Serialize, PartialEq)]
    struct Counter {
        count: u32,
        label: String,
    }

    fn envelope(schema_version: u32, payload: Value) -> AppStateEnvelope {
        AppStateEnvelope {
            envelope_version: APP_STATE_ENVELOPE_VERSION,
            namespace: "app.example".to_string(),
            schema_version,
            updated_at_unix_ms: 1,
            payload,
        }
    }

    #[test]
    fn envelope_serializes_with_snake_case_metadata() {
        let value = serde_json::to_value(envelope(7, json!({"ok": true}))).expect("serialize");
        let object = value.as_object().expect("object");
        assert_eq!(object.get("envelope_version"), Some(&json!(1)));
        assert_eq!(object.get("namespace"), Some(&json!("app.example")));
        assert_eq!(object.get("schema_version"), Some(&json!(7)));
        assert_eq!(object.get("payload"), Some(&json!({"ok": true})));
        assert!(!object.contains_key("schemaVersion"));
    }

    #[test]
    fn new_envelopes_get_increasing_timestamps() {
        let first = AppStateEnvelope::new("app.example", 1, json!(1));
        let second = AppStateEnvelope::new("app.example", 1, json!(2));
        assert!(second.updated_at_unix_ms > first.updated_at_unix_ms);
    }

    #[test]
    fn relocated_keeps_payload_and_version() {
        let original = envelope(3, json!({"n": 1}));
        let moved = original.relocated("app.example.backup");
        assert_eq!(moved.namespace, "app.example.backup");
        assert_eq!(moved.schema_version, 3);
        assert_eq!(moved.payload, original.payload);
    }

    #[test]
    fn decode_current_version_reads_payload_directly() {
        let decoded: Option<Counter> = decode_app_state_envelope(
            &envelope(2, json!({"count": 3, "label": "ok"})),
            2,
            |_, _| panic!("migration must not run for the current version"),
        )
        .expect("decode");
        assert_eq!(
            decoded,
            Some(Counter {
                count: 3,
                label: "ok".to_string()
            })
        );
    }

    #[test]
    fn decode_older_version_runs_migration() {
        let decoded: Option<Counter> =
            decode_app_state_envelope(&envelope(1, json!(5)), 2, |version, env| {
                assert_eq!(version, 1);
                let count: u32 = migrate_envelope_payload(env)?;
                Ok(Some(Counter {
                    count,
                    label: "migrated".to_string(),
                }))
            })
            .expect("decode");
        assert_eq!(decoded.map(|c| c.count), Some(5));
    }

    #[test]
    fn decode_newer_version_is_an_error() {
        let err = decode_app_state_envelope::<Counter, _>(&envelope(9, json!({})), 2, |_, _| {
            Ok(None)
        })
        .expect_err("newer schema must fail");
        assert!(err.contains("newer"));
    }

    #[test]
    fn decode_type_mismatch_is_an_error() {
        let err = decode_app_state_envelope::<Counter, _>(
            &envelope(1, json!({"count": "bad"})),
            1,
            |_, _| Ok(None),
        )
        .expect_err("bad payload must fail");
        assert!(!err.is_empty());
    }

    #[test]
    fn typed_helpers_round_trip_through_memory_store() {
        let store = MemoryAppStateStore::default();
        let payload = Counter {
            count: 4,
            label: "four".to_string(),
        };
        block_on(save_app_state_with(&store, "app.example", 1, &payload)).expect("save");
        assert_eq!(store.save_count(), 1);

        let loaded: Option<Counter> =
            block_on(load_app_state_typed_with(&store, "app.example", 1)).expect("load");
        assert_eq!(loaded, Some(payload));

        let other_version: Option<Counter> =
            block_on(load_app_state_typed_with(&store, "app.example", 2)).expect("load");
        assert_eq!(other_version, None);
    }

    #[test]
    fn memory_store_clones_share_state_and_delete() {
        let store = MemoryAppStateStore::default();
        let reopened = store.clone();
        let store_obj: &dyn AppStateStore = &store;

        block_on(store_obj.save_app_state_envelope(&envelope(1, json!({"v": 1})))).expect("save");
        assert!(reopened.envelope("app.example").is_some());

        block_on(store_obj.delete_app_state("app.example")).expect("delete");
        assert_eq!(
            block_on(reopened.load_app_state_envelope("app.example")).expect("load"),
            None
        );
    }

    #[test]
    fn noop_store_is_empty_and_successful() {
        let store = NoopAppStateStore;
        let store_obj: &dyn AppStateStore = &store;
        assert_eq!(
            block_on(store_obj.load_app_state_envelope("noop")).expect("load"),
            None
        );
        block_on(store_obj.save_app_state_envelope(&envelope(1, json!({})))).expect("save");
        block_on(store_obj.delete_app_state("noop")).expect("delete");
    }
}
