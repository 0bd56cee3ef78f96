//! Notification contracts shared by apps and host adapters.

pub mod service;
