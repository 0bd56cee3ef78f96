//! Event editor state machine.
//!
//! The editor owns at most one draft. Nothing reaches the [`EventStore`] until [`save`] or
//! [`delete`] succeeds; discarding a draft leaves the store untouched.
//!
//! [`save`]: EventEditor::save
//! [`delete`]: EventEditor::delete

use std::num::NonZeroU32;

use chrono::{NaiveDate, NaiveTime};

use crate::{
    event::{
        clock_time_label, date_key, parse_clock_time, parse_date_key, parse_duration_minutes,
        CalendarEvent, EventColor, EventFieldError, EventFields, EventId,
    },
    prefs::CalendarPrefs,
    store::EventStore,
};

/// In-memory, not yet persisted copy of an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDraft {
    /// Title as typed.
    pub title: String,
    /// Day the event falls on.
    pub date: NaiveDate,
    /// Start time; `None` for all day.
    pub time: Option<NaiveTime>,
    /// Length in minutes.
    pub duration_minutes: NonZeroU32,
    /// Palette color.
    pub color: EventColor,
    /// Free text; blank means no location.
    pub location: String,
}

impl EventDraft {
    /// Blank draft on `day` prefilled from `prefs`.
    pub fn for_day(day: NaiveDate, prefs: &CalendarPrefs) -> Self {
        Self {
            title: String::new(),
            date: day,
            time: prefs.default_time,
            duration_minutes: prefs.default_duration_minutes,
            color: prefs.default_color,
            location: String::new(),
        }
    }

    /// Working copy of a stored event.
    pub fn from_event(event: &CalendarEvent) -> Self {
        let fields = &event.fields;
        Self {
            title: fields.title.clone(),
            date: fields.date,
            time: fields.time,
            duration_minutes: fields.duration_minutes,
            color: fields.color,
            location: fields.location.clone().unwrap_or_default(),
        }
    }

    /// Whether the confirm control should be enabled.
    pub fn is_saveable(&self) -> bool {
        !self.title.trim().is_empty()
    }

    /// Fields as typed, or `None` while the title is blank.
    ///
    /// An empty location input maps to no location.
    pub fn to_fields(&self) -> Option<EventFields> {
        let fields = EventFields {
            title: self.title.clone(),
            date: self.date,
            time: self.time,
            duration_minutes: self.duration_minutes,
            color: self.color,
            location: (!self.location.is_empty()).then(|| self.location.clone()),
        };
        fields.has_title().then_some(fields)
    }

    /// Sets the date from a `YYYY-MM-DD` input value.
    ///
    /// # Errors
    ///
    /// Returns [`EventFieldError::InvalidDate`] and leaves the date unchanged.
    pub fn set_date_input(&mut self, raw: &str) -> Result<(), EventFieldError> {
        self.date = parse_date_key(raw)?;
        Ok(())
    }

    /// Sets the time from an `HH:MM` input value; a blank value clears it.
    ///
    /// # Errors
    ///
    /// Returns [`EventFieldError::InvalidTime`] and leaves the time unchanged.
    pub fn set_time_input(&mut self, raw: &str) -> Result<(), EventFieldError> {
        self.time = if raw.trim().is_empty() {
            None
        } else {
            Some(parse_clock_time(raw)?)
        };
        Ok(())
    }

    /// Sets the duration from a minutes input value.
    ///
    /// # Errors
    ///
    /// Returns [`EventFieldError::InvalidDuration`] and leaves the duration unchanged.
    pub fn set_duration_input(&mut self, raw: &str) -> Result<(), EventFieldError> {
        self.duration_minutes = parse_duration_minutes(raw)?;
        Ok(())
    }

    /// Date formatted for a date input.
    pub fn date_input(&self) -> String {
        date_key(self.date)
    }

    /// Time formatted for a time input; blank when unset.
    pub fn time_input(&self) -> String {
        self.time.map(clock_time_label).unwrap_or_default()
    }
}

/// Editor lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EditorState {
    /// No draft open.
    #[default]
    Closed,
    /// Drafting an event that does not exist yet.
    NewDraft(EventDraft),
    /// Editing a copy of a stored event.
    EditingExisting {
        /// Event being edited.
        id: EventId,
        /// Working copy of its fields.
        draft: EventDraft,
    },
}

/// Result of a confirm, delete, or discard request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorOutcome {
    /// The draft was written under this id.
    Saved(EventId),
    /// The event was removed.
    Deleted(EventId),
    /// The draft was dropped without touching the store.
    Discarded,
    /// The draft failed validation; the editor stays open.
    Rejected,
    /// Nothing applicable: no draft, wrong state, or the edited event no longer exists.
    Ignored,
}

/// Holds the single open draft and applies it to an [`EventStore`].
#[derive(Debug, Clone, Default)]
pub struct EventEditor {
    state: EditorState,
}

impl EventEditor {
    /// Current lifecycle state.
    pub fn state(&self) -> &EditorState {
        &self.state
    }

    /// Whether a draft is open.
    pub fn is_open(&self) -> bool {
        !matches!(self.state, EditorState::Closed)
    }

    /// Opens a blank draft on `day`, replacing any open draft.
    pub fn open_new(&mut self, day: NaiveDate, prefs: &CalendarPrefs) {
        self.state = EditorState::NewDraft(EventDraft::for_day(day, prefs));
    }

    /// Opens a copy of event `id`, replacing any open draft.
    ///
    /// Returns `false` and leaves the editor as it was when `id` is not in `store`.
    pub fn open_existing(&mut self, store: &EventStore, id: EventId) -> bool {
        let Some(event) = store.get(id) else {
            return false;
        };
        self.state = EditorState::EditingExisting {
            id,
            draft: EventDraft::from_event(event),
        };
        true
    }

    /// The open draft, if any.
    pub fn draft(&self) -> Option<&EventDraft> {
        match &self.state {
            EditorState::Closed => None,
            EditorState::NewDraft(draft) | EditorState::EditingExisting { draft, .. } => {
                Some(draft)
            }
        }
    }

    /// Mutable access to the open draft.
    pub fn draft_mut(&mut self) -> Option<&mut EventDraft> {
        match &mut self.state {
            EditorState::Closed => None,
            EditorState::NewDraft(draft) | EditorState::EditingExisting { draft, .. } => {
                Some(draft)
            }
        }
    }

    /// Whether a draft is open and has a title.
    pub fn can_save(&self) -> bool {
        self.draft().is_some_and(EventDraft::is_saveable)
    }

    /// Whether the open draft belongs to a stored event.
    pub fn can_delete(&self) -> bool {
        matches!(self.state, EditorState::EditingExisting { .. })
    }

    /// Validates the draft and writes it to `store`.
    ///
    /// A blank title is [`EditorOutcome::Rejected`] and keeps the draft open. If the edited
    /// event disappeared meanwhile the editor closes with [`EditorOutcome::Ignored`].
    pub async fn save(&mut self, store: &mut EventStore) -> EditorOutcome {
        let Some(fields) = self.draft().and_then(EventDraft::to_fields) else {
            return if self.is_open() {
                EditorOutcome::Rejected
            } else {
                EditorOutcome::Ignored
            };
        };

        let outcome = match &self.state {
            EditorState::Closed => return EditorOutcome::Ignored,
            EditorState::NewDraft(_) => match store.create(fields).await {
                Some(id) => EditorOutcome::Saved(id),
                None => return EditorOutcome::Rejected,
            },
            EditorState::EditingExisting { id, .. } => {
                let id = *id;
                if store.update(id, fields).await {
                    EditorOutcome::Saved(id)
                } else {
                    EditorOutcome::Ignored
                }
            }
        };
        self.state = EditorState::Closed;
        outcome
    }

    /// Deletes the event being edited. Drafts of new events cannot be deleted.
    pub async fn delete(&mut self, store: &mut EventStore) -> EditorOutcome {
        let EditorState::EditingExisting { id, .. } = &self.state else {
            return EditorOutcome::Ignored;
        };
        let id = *id;
        self.state = EditorState::Closed;
        if store.delete(id).await {
            EditorOutcome::Deleted(id)
        } else {
            EditorOutcome::Ignored
        }
    }

    /// Drops the draft without touching the store.
    pub fn discard(&mut self) -> EditorOutcome {
        if std::mem::take(&mut self.state) == EditorState::Closed {
            EditorOutcome::Ignored
        } else {
            EditorOutcome::Discarded
        }
    }
}
