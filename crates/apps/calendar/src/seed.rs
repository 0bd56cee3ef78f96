//! Sample events shown when nothing has been persisted yet.

use std::num::NonZeroU32;

use chrono::{Days, NaiveDate, NaiveTime};

use crate::event::{CalendarEvent, EventColor, EventFields, EventId};

struct SeedEntry {
    title: &'static str,
    day_offset: u64,
    time: (u32, u32),
    duration_minutes: u32,
    color: EventColor,
    location: Option<&'static str>,
}

const SEED: [SeedEntry; 5] = [
    SeedEntry {
        title: "Team Standup",
        day_offset: 0,
        time: (9, 0),
        duration_minutes: 30,
        color: EventColor::Blue,
        location: Some("Conference Room A"),
    },
    SeedEntry {
        title: "Lunch with Sarah",
        day_offset: 1,
        time: (12, 30),
        duration_minutes: 60,
        color: EventColor::Green,
        location: Some("Cafe Milano"),
    },
    SeedEntry {
        title: "Project Review",
        day_offset: 2,
        time: (14, 0),
        duration_minutes: 90,
        color: EventColor::Purple,
        location: None,
    },
    SeedEntry {
        title: "Gym",
        day_offset: 3,
        time: (18, 0),
        duration_minutes: 60,
        color: EventColor::Orange,
        location: Some("Fitness Center"),
    },
    SeedEntry {
        title: "Dentist Appointment",
        day_offset: 5,
        time: (10, 0),
        duration_minutes: 45,
        color: EventColor::Red,
        location: Some("Downtown Dental"),
    },
];

/// Builds the five sample events spanning `today` through `today + 5` days.
///
/// Seed ids are small fixed integers so freshly created events always sort after them.
pub fn seed_events(today: NaiveDate) -> Vec<CalendarEvent> {
    SEED.iter()
        .zip(1u64..)
        .filter_map(|(entry, id)| {
            Some(CalendarEvent {
                id: EventId(id),
                fields: EventFields {
                    title: entry.title.to_string(),
                    date: today.checked_add_days(Days::new(entry.day_offset))?,
                    time: NaiveTime::from_hms_opt(entry.time.0, entry.time.1, 0),
                    duration_minutes: NonZeroU32::new(entry.duration_minutes)?,
                    color: entry.color,
                    location: entry.location.map(str::to_string),
                },
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_spans_today_through_five_days_out() {
        let today = NaiveDate::from_ymd_opt(2024, 12, 29).expect("date");
        let events = seed_events(today);
        assert_eq!(events.len(), 5);
        assert_eq!(events[0].fields.date, today);
        assert_eq!(
            events[4].fields.date,
            NaiveDate::from_ymd_opt(2025, 1, 3).expect("date")
        );
        assert!(events.iter().all(|e| !e.fields.title.trim().is_empty()));

        let mut ids: Vec<u64> = events.iter().map(|e| e.id.0).collect();
        ids.dedup();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }
}
