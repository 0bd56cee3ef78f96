//! Browser storage adapters.

pub mod local_app_state;
pub mod local_prefs;
