//! Durable storage contracts: versioned app-state envelopes and raw JSON preferences.

pub mod app_state;
pub mod prefs;
