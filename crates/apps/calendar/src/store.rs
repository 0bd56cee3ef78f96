//! Persistent calendar event collection.
//!
//! Events live in a flat, insertion-ordered list that is rewritten as a whole after every
//! mutation. The list is persisted as an [`AppStateEnvelope`] under
//! [`CALENDAR_STATE_NAMESPACE`]; the unversioned bare-array format written under the
//! [`LEGACY_CALENDAR_EVENTS_KEY`] preference is migrated on first load.

use std::{collections::BTreeMap, rc::Rc};

use chrono::NaiveDate;
use leptos::logging;
use platform_host::{
    decode_app_state_envelope, load_pref_with, migrate_envelope_payload, next_monotonic_id_above,
    save_app_state_with, AppStateEnvelope, AppStateStore, PrefsStore,
    CALENDAR_CORRUPT_STATE_NAMESPACE, CALENDAR_STATE_NAMESPACE, LEGACY_CALENDAR_EVENTS_KEY,
};
use serde::{Deserialize, Serialize};

use crate::{
    event::{CalendarEvent, EventFields, EventId},
    seed::seed_events,
};

/// Current schema version of the persisted calendar payload.
pub const CALENDAR_SCHEMA_VERSION: u32 = 1;

/// Persisted calendar payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedCalendar {
    /// All events in insertion order.
    pub events: Vec<CalendarEvent>,
}

#[derive(Serialize)]
struct PersistedCalendarRef<'a> {
    events: &'a [CalendarEvent],
}

/// Where the events of a freshly loaded store came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    /// A current-schema envelope.
    Stored,
    /// An older envelope or the legacy preference key, upgraded during load.
    Migrated,
    /// Nothing usable was stored; sample events were generated.
    Seeded,
}

/// Upgrades older calendar payloads.
///
/// Schema 0 is the legacy shape: a bare JSON array of events.
///
/// # Errors
///
/// Returns an error when the legacy payload does not decode.
pub fn migrate_calendar_state(
    schema_version: u32,
    envelope: &AppStateEnvelope,
) -> Result<Option<PersistedCalendar>, String> {
    match schema_version {
        0 => migrate_envelope_payload::<Vec<CalendarEvent>>(envelope).map(|events| {
            Some(PersistedCalendar {
                events: drop_untitled_events(events),
            })
        }),
        _ => Ok(None),
    }
}

// Legacy writers accepted blank titles; those entries are dropped.
fn drop_untitled_events(mut events: Vec<CalendarEvent>) -> Vec<CalendarEvent> {
    events.retain(|event| event.fields.has_title());
    events
}

/// Calendar event collection bound to an app-state store.
pub struct EventStore {
    events: Vec<CalendarEvent>,
    app_state: Rc<dyn AppStateStore>,
    source: LoadSource,
}

impl std::fmt::Debug for EventStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventStore")
            .field("events", &self.events)
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

impl EventStore {
    /// Wraps an existing event list without touching storage.
    pub fn with_events(app_state: Rc<dyn AppStateStore>, events: Vec<CalendarEvent>) -> Self {
        Self {
            events,
            app_state,
            source: LoadSource::Stored,
        }
    }

    /// Loads the collection: current envelope, then the legacy preference key, then sample
    /// events for `today`.
    ///
    /// Storage failures never surface. An envelope that cannot be decoded is copied to
    /// [`CALENDAR_CORRUPT_STATE_NAMESPACE`] before the sample events replace it. Sample events
    /// are not written until the first mutation.
    pub async fn load<P: PrefsStore + ?Sized>(
        app_state: Rc<dyn AppStateStore>,
        prefs: &P,
        today: NaiveDate,
    ) -> Self {
        let loaded = match app_state
            .load_app_state_envelope(CALENDAR_STATE_NAMESPACE)
            .await
        {
            Ok(Some(envelope)) => load_envelope(app_state.as_ref(), &envelope).await,
            Ok(None) => load_legacy(prefs).await,
            Err(err) => {
                logging::warn!("calendar state load failed: {err}");
                None
            }
        };

        let Some((events, source)) = loaded else {
            logging::log!("calendar storage empty or unreadable; using sample events");
            return Self {
                events: seed_events(today),
                app_state,
                source: LoadSource::Seeded,
            };
        };

        let store = Self {
            events,
            app_state,
            source,
        };
        if source == LoadSource::Migrated {
            match store.persist().await {
                Ok(()) => {
                    if let Err(err) = prefs.delete_pref(LEGACY_CALENDAR_EVENTS_KEY).await {
                        logging::warn!("calendar legacy key cleanup failed: {err}");
                    }
                }
                Err(err) => logging::warn!("calendar migration write failed: {err}"),
            }
        }
        store
    }

    /// Where the loaded events came from.
    pub fn source(&self) -> LoadSource {
        self.source
    }

    /// All events in insertion order.
    pub fn events(&self) -> &[CalendarEvent] {
        &self.events
    }

    /// Number of events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether there are no events.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Event with `id`, if present.
    pub fn get(&self, id: EventId) -> Option<&CalendarEvent> {
        self.events.iter().find(|event| event.id == id)
    }

    /// Events on `date`, in insertion order.
    pub fn list(&self, date: NaiveDate) -> Vec<&CalendarEvent> {
        self.events
            .iter()
            .filter(|event| event.fields.date == date)
            .collect()
    }

    /// Number of events per date within `start..=end`. Dates without events are absent.
    pub fn event_counts(&self, start: NaiveDate, end: NaiveDate) -> BTreeMap<NaiveDate, usize> {
        let mut counts = BTreeMap::new();
        for event in &self.events {
            let date = event.fields.date;
            if (start..=end).contains(&date) {
                *counts.entry(date).or_insert(0) += 1;
            }
        }
        counts
    }

    /// Appends a new event and persists the collection.
    ///
    /// Returns `None` without mutating when the title is blank.
    pub async fn create(&mut self, fields: EventFields) -> Option<EventId> {
        if !fields.has_title() {
            return None;
        }
        let floor = self.events.iter().map(|event| event.id.0).max().unwrap_or(0);
        let id = EventId(next_monotonic_id_above(floor));
        self.events.push(CalendarEvent { id, fields });
        self.persist_logged().await;
        Some(id)
    }

    /// Replaces the fields of event `id` and persists the collection.
    ///
    /// Returns `false` without mutating when `id` is unknown or the title is blank.
    pub async fn update(&mut self, id: EventId, fields: EventFields) -> bool {
        if !fields.has_title() {
            return false;
        }
        let Some(event) = self.events.iter_mut().find(|event| event.id == id) else {
            return false;
        };
        event.fields = fields;
        self.persist_logged().await;
        true
    }

    /// Removes event `id` and persists the collection. Returns `false` when `id` is unknown.
    pub async fn delete(&mut self, id: EventId) -> bool {
        let Some(index) = self.events.iter().position(|event| event.id == id) else {
            return false;
        };
        self.events.remove(index);
        self.persist_logged().await;
        true
    }

    /// Writes the whole collection to storage.
    ///
    /// # Errors
    ///
    /// Returns an error when serialization or the store write fails.
    pub async fn persist(&self) -> Result<(), String> {
        save_app_state_with(
            self.app_state.as_ref(),
            CALENDAR_STATE_NAMESPACE,
            CALENDAR_SCHEMA_VERSION,
            &PersistedCalendarRef {
                events: &self.events,
            },
        )
        .await
    }

    async fn persist_logged(&self) {
        if let Err(err) = self.persist().await {
            logging::warn!("calendar persist failed: {err}");
        }
    }
}

async fn load_envelope(
    app_state: &dyn AppStateStore,
    envelope: &AppStateEnvelope,
) -> Option<(Vec<CalendarEvent>, LoadSource)> {
    let decoded = decode_app_state_envelope::<PersistedCalendar, _>(
        envelope,
        CALENDAR_SCHEMA_VERSION,
        migrate_calendar_state,
    );
    match decoded {
        Ok(Some(persisted)) => {
            let source = if envelope.schema_version < CALENDAR_SCHEMA_VERSION {
                LoadSource::Migrated
            } else {
                LoadSource::Stored
            };
            Some((persisted.events, source))
        }
        Ok(None) => {
            logging::warn!(
                "calendar schema version {} has no migration",
                envelope.schema_version
            );
            back_up_corrupt(app_state, envelope).await;
            None
        }
        Err(err) => {
            logging::warn!("calendar state decode failed: {err}");
            back_up_corrupt(app_state, envelope).await;
            None
        }
    }
}

async fn back_up_corrupt(app_state: &dyn AppStateStore, envelope: &AppStateEnvelope) {
    let backup = envelope.relocated(CALENDAR_CORRUPT_STATE_NAMESPACE);
    if let Err(err) = app_state.save_app_state_envelope(&backup).await {
        logging::warn!("calendar corrupt-state backup failed: {err}");
    }
}

async fn load_legacy<P: PrefsStore + ?Sized>(
    prefs: &P,
) -> Option<(Vec<CalendarEvent>, LoadSource)> {
    match load_pref_with::<_, Vec<CalendarEvent>>(prefs, LEGACY_CALENDAR_EVENTS_KEY).await {
        Ok(Some(events)) => Some((drop_untitled_events(events), LoadSource::Migrated)),
        Ok(None) => None,
        Err(err) => {
            logging::warn!("calendar legacy load failed: {err}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroU32;

    use futures::executor::block_on;
    use platform_host::{
        AppStateStoreFuture, MemoryAppStateStore, MemoryPrefsStore, APP_STATE_ENVELOPE_VERSION,
    };
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::event::EventColor;

    struct FailingAppStateStore;

    impl AppStateStore for FailingAppStateStore {
        fn load_app_state_envelope<'a>(
            &'a self,
            _namespace: &'a str,
        ) -> AppStateStoreFuture<'a, Result<Option<AppStateEnvelope>, String>> {
            Box::pin(async { Err("storage offline".to_string()) })
        }

        fn save_app_state_envelope<'a>(
            &'a self,
            _envelope: &'a AppStateEnvelope,
        ) -> AppStateStoreFuture<'a, Result<(), String>> {
            Box::pin(async { Err("quota exceeded".to_string()) })
        }

        fn delete_app_state<'a>(
            &'a self,
            _namespace: &'a str,
        ) -> AppStateStoreFuture<'a, Result<(), String>> {
            Box::pin(async { Err("storage offline".to_string()) })
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 14).expect("date")
    }

    fn fields(title: &str, date: NaiveDate) -> EventFields {
        EventFields {
            title: title.to_string(),
            date,
            time: None,
            duration_minutes: NonZeroU32::new(30).expect("non-zero"),
            color: EventColor::Green,
            location: None,
        }
    }

    #[test]
    fn empty_storage_seeds_without_writing() {
        let memory = MemoryAppStateStore::default();
        let store = block_on(EventStore::load(
            Rc::new(memory.clone()),
            &MemoryPrefsStore::default(),
            today(),
        ));
        assert_eq!(store.source(), LoadSource::Seeded);
        assert_eq!(store.len(), 5);
        assert_eq!(memory.save_count(), 0);
    }

    #[test]
    fn create_assigns_ids_above_existing_ones() {
        let memory = MemoryAppStateStore::default();
        let mut store = EventStore::with_events(
            Rc::new(memory.clone()),
            vec![CalendarEvent {
                id: EventId(u64::MAX / 2),
                fields: fields("Existing", today()),
            }],
        );
        let id = block_on(store.create(fields("  New  ", today()))).expect("created");
        assert!(id.0 > u64::MAX / 2);
        assert_eq!(store.get(id).map(|e| e.fields.title.as_str()), Some("New"));
        assert_eq!(memory.save_count(), 1);
    }

    #[test]
    fn blank_titles_are_refused() {
        let memory = MemoryAppStateStore::default();
        let mut store = EventStore::with_events(Rc::new(memory.clone()), Vec::new());
        assert_eq!(block_on(store.create(fields("   ", today()))), None);

        let id = block_on(store.create(fields("Kept", today()))).expect("created");
        assert!(!block_on(store.update(id, fields("", today()))));
        assert_eq!(store.get(id).map(|e| e.fields.title.as_str()), Some("Kept"));
        assert_eq!(memory.save_count(), 1);
    }

    #[test]
    fn missing_ids_are_no_ops() {
        let memory = MemoryAppStateStore::default();
        let mut store = EventStore::with_events(Rc::new(memory.clone()), Vec::new());
        assert!(!block_on(store.update(EventId(7), fields("x", today()))));
        assert!(!block_on(store.delete(EventId(7))));
        assert_eq!(memory.save_count(), 0);
    }

    #[test]
    fn write_failures_keep_the_in_memory_change() {
        let mut store = EventStore::with_events(Rc::new(FailingAppStateStore), Vec::new());
        let id = block_on(store.create(fields("Offline", today()))).expect("created");
        assert_eq!(store.len(), 1);
        assert!(block_on(store.persist()).is_err());
        assert!(block_on(store.delete(id)));
        assert!(store.is_empty());
    }

    #[test]
    fn load_failure_falls_back_to_seed() {
        let store = block_on(EventStore::load(
            Rc::new(FailingAppStateStore),
            &MemoryPrefsStore::default(),
            today(),
        ));
        assert_eq!(store.source(), LoadSource::Seeded);
        assert_eq!(store.list(today()).len(), 1);
    }

    #[test]
    fn schema_zero_envelope_is_migrated_and_rewritten() {
        let memory = MemoryAppStateStore::default();
        let legacy_payload = json!([{
            "id": 10, "title": "Old", "date": "2024-05-14", "time": "08:15", "duration": 20,
            "color": "blue", "location": ""
        }]);
        block_on(memory.save_app_state_envelope(&AppStateEnvelope {
            envelope_version: APP_STATE_ENVELOPE_VERSION,
            namespace: CALENDAR_STATE_NAMESPACE.to_string(),
            schema_version: 0,
            updated_at_unix_ms: 1,
            payload: legacy_payload,
        }))
        .expect("seed envelope");

        let store = block_on(EventStore::load(
            Rc::new(memory.clone()),
            &MemoryPrefsStore::default(),
            today(),
        ));
        assert_eq!(store.source(), LoadSource::Migrated);
        assert_eq!(store.list(today())[0].fields.title, "Old");
        assert_eq!(store.list(today())[0].fields.location.as_deref(), Some(""));
        let rewritten = memory
            .envelope(CALENDAR_STATE_NAMESPACE)
            .expect("rewritten envelope");
        assert_eq!(rewritten.schema_version, CALENDAR_SCHEMA_VERSION);
    }

    #[test]
    fn event_counts_cover_only_the_requested_range() {
        let later = NaiveDate::from_ymd_opt(2024, 6, 30).expect("date");
        let store = EventStore::with_events(
            Rc::new(MemoryAppStateStore::default()),
            vec![
                CalendarEvent { id: EventId(1), fields: fields("a", today()) },
                CalendarEvent { id: EventId(2), fields: fields("b", today()) },
                CalendarEvent { id: EventId(3), fields: fields("c", later) },
            ],
        );
        let counts = store.event_counts(today(), today());
        assert_eq!(counts.into_iter().collect::<Vec<_>>(), vec![(today(), 2)]);
        assert_eq!(store.event_counts(today(), later).len(), 2);
    }
}
