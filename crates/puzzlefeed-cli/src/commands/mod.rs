//! CLI command implementations.

pub mod browse;
pub mod fetch;
pub mod prefs;
