//! Calendar event model, palette, and field parsing.

use std::num::NonZeroU32;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Unique, lifetime-stable event identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(pub u64);

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Fixed event color palette. The first entry is the default and the fallback for unknown
/// stored values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventColor {
    /// Red.
    #[default]
    Red,
    /// Blue.
    Blue,
    /// Green.
    Green,
    /// Purple.
    Purple,
    /// Orange.
    Orange,
}

/// Palette in display order.
pub const PALETTE: [EventColor; 5] = [
    EventColor::Red,
    EventColor::Blue,
    EventColor::Green,
    EventColor::Purple,
    EventColor::Orange,
];

impl EventColor {
    /// Stable lowercase token used in storage and CSS class names.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Blue => "blue",
            Self::Green => "green",
            Self::Purple => "purple",
            Self::Orange => "orange",
        }
    }

    /// Resolves a stored token, falling back to the first palette entry.
    pub fn from_token(token: &str) -> Self {
        PALETTE
            .into_iter()
            .find(|color| color.as_str().eq_ignore_ascii_case(token.trim()))
            .unwrap_or(PALETTE[0])
    }
}

impl<'de> Deserialize<'de> for EventColor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let token = String::deserialize(deserializer)?;
        Ok(Self::from_token(&token))
    }
}

/// Errors raised when turning user-entered text into event fields.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EventFieldError {
    /// The text is not a `YYYY-MM-DD` calendar date.
    #[error("`{0}` is not a YYYY-MM-DD date")]
    InvalidDate(String),
    /// The text is not a 24-hour `HH:MM` time.
    #[error("`{0}` is not an HH:MM time")]
    InvalidTime(String),
    /// The duration is zero or not a whole number of minutes.
    #[error("duration must be a positive number of minutes, got `{0}`")]
    InvalidDuration(String),
}

/// Formats a date as its canonical `YYYY-MM-DD` key.
pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Parses a `YYYY-MM-DD` key.
///
/// # Errors
///
/// Returns [`EventFieldError::InvalidDate`] for anything else.
pub fn parse_date_key(raw: &str) -> Result<NaiveDate, EventFieldError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| EventFieldError::InvalidDate(raw.to_string()))
}

/// Formats a time as `HH:MM`.
pub fn clock_time_label(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

/// Parses an `HH:MM` 24-hour time.
///
/// # Errors
///
/// Returns [`EventFieldError::InvalidTime`] for anything else.
pub fn parse_clock_time(raw: &str) -> Result<NaiveTime, EventFieldError> {
    NaiveTime::parse_from_str(raw.trim(), "%H:%M")
        .map_err(|_| EventFieldError::InvalidTime(raw.to_string()))
}

/// Parses a positive whole number of minutes.
///
/// # Errors
///
/// Returns [`EventFieldError::InvalidDuration`] for zero, negatives, and non-numbers.
pub fn parse_duration_minutes(raw: &str) -> Result<NonZeroU32, EventFieldError> {
    raw.trim()
        .parse::<NonZeroU32>()
        .map_err(|_| EventFieldError::InvalidDuration(raw.to_string()))
}

/// Serde adapter storing `Option<NaiveTime>` as `"HH:MM"` or `null`.
pub(crate) mod hh_mm {
    use chrono::NaiveTime;
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

    pub(crate) fn serialize<S: Serializer>(
        time: &Option<NaiveTime>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match time {
            Some(time) => serializer.serialize_some(&super::clock_time_label(*time)),
            None => serializer.serialize_none(),
        }
    }

    pub(crate) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveTime>, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => super::parse_clock_time(raw).map(Some).map_err(D::Error::custom),
        }
    }
}

/// Every user-editable field of an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventFields {
    /// Display title; non-empty once persisted.
    pub title: String,
    /// Calendar day the event belongs to.
    pub date: NaiveDate,
    /// Start time, `None` for all-day/unspecified.
    #[serde(default, with = "hh_mm")]
    pub time: Option<NaiveTime>,
    /// Length in minutes.
    #[serde(rename = "duration")]
    pub duration_minutes: NonZeroU32,
    /// Palette color.
    #[serde(default)]
    pub color: EventColor,
    /// Free-text location.
    #[serde(default)]
    pub location: Option<String>,
}

impl EventFields {
    /// Whether the title has any non-whitespace content.
    ///
    /// Only gates acceptance; titles are stored exactly as typed.
    pub fn has_title(&self) -> bool {
        !self.title.trim().is_empty()
    }
}

/// A persisted calendar event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    /// Identity assigned at creation.
    pub id: EventId,
    /// Editable content.
    #[serde(flatten)]
    pub fields: EventFields,
}

impl CalendarEvent {
    /// Returns the event's date key.
    pub fn date_key(&self) -> String {
        date_key(self.fields.date)
    }

    /// Human-readable start label (`"09:00"` or `"All day"`).
    pub fn time_label(&self) -> String {
        self.fields
            .time
            .map_or_else(|| "All day".to_string(), clock_time_label)
    }
}
