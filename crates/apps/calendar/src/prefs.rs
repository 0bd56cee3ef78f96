//! Calendar preferences: defaults applied to new drafts.

use std::num::NonZeroU32;

use chrono::NaiveTime;
use leptos::logging;
use platform_host::{load_pref_with, save_pref_with, PrefsStore, CALENDAR_PREFS_KEY};
use serde::{Deserialize, Serialize};

use crate::event::{hh_mm, EventColor};

const DEFAULT_DURATION_MINUTES: NonZeroU32 = match NonZeroU32::new(60) {
    Some(minutes) => minutes,
    None => NonZeroU32::MIN,
};

/// User-adjustable defaults for new events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarPrefs {
    /// Start time prefilled into new drafts.
    #[serde(with = "hh_mm")]
    pub default_time: Option<NaiveTime>,
    /// Duration prefilled into new drafts.
    pub default_duration_minutes: NonZeroU32,
    /// Color prefilled into new drafts.
    pub default_color: EventColor,
}

impl Default for CalendarPrefs {
    fn default() -> Self {
        Self {
            default_time: NaiveTime::from_hms_opt(9, 0, 0),
            default_duration_minutes: DEFAULT_DURATION_MINUTES,
            default_color: EventColor::default(),
        }
    }
}

/// Loads calendar prefs, falling back to defaults when absent or unreadable.
pub async fn load_calendar_prefs<S: PrefsStore + ?Sized>(store: &S) -> CalendarPrefs {
    match load_pref_with::<_, CalendarPrefs>(store, CALENDAR_PREFS_KEY).await {
        Ok(Some(prefs)) => prefs,
        Ok(None) => CalendarPrefs::default(),
        Err(err) => {
            logging::warn!("calendar prefs load failed: {err}");
            CalendarPrefs::default()
        }
    }
}

/// Persists calendar prefs.
///
/// # Errors
///
/// Returns an error when serialization or the store write fails.
pub async fn save_calendar_prefs<S: PrefsStore + ?Sized>(
    store: &S,
    prefs: &CalendarPrefs,
) -> Result<(), String> {
    save_pref_with(store, CALENDAR_PREFS_KEY, prefs).await
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;
    use platform_host::{MemoryPrefsStore, PrefsStore};
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn missing_prefs_use_nine_oclock_hour_long_red() {
        let store = MemoryPrefsStore::default();
        let prefs = block_on(load_calendar_prefs(&store));
        assert_eq!(prefs, CalendarPrefs::default());
        assert_eq!(prefs.default_time, NaiveTime::from_hms_opt(9, 0, 0));
        assert_eq!(prefs.default_duration_minutes.get(), 60);
        assert_eq!(prefs.default_color, EventColor::Red);
    }

    #[test]
    fn prefs_round_trip_and_partial_payloads_fill_defaults() {
        let store = MemoryPrefsStore::default();
        let custom = CalendarPrefs {
            default_time: None,
            default_duration_minutes: NonZeroU32::new(15).expect("non-zero"),
            default_color: EventColor::Green,
        };
        block_on(save_calendar_prefs(&store, &custom)).expect("save");
        assert_eq!(block_on(load_calendar_prefs(&store)), custom);

        block_on(store.save_pref(CALENDAR_PREFS_KEY, r#"{"default_color":"blue"}"#))
            .expect("raw save");
        let partial = block_on(load_calendar_prefs(&store));
        assert_eq!(partial.default_color, EventColor::Blue);
        assert_eq!(partial.default_duration_minutes.get(), 60);
    }

    #[test]
    fn unreadable_prefs_fall_back_to_defaults() {
        let store = MemoryPrefsStore::default();
        block_on(store.save_pref(CALENDAR_PREFS_KEY, "not json")).expect("raw save");
        assert_eq!(block_on(load_calendar_prefs(&store)), CalendarPrefs::default());
    }
}
