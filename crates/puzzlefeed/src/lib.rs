//! # puzzlefeed
//!
//! Bucketed pagination for chess puzzle feeds.
//!
//! This crate provides:
//! - Puzzle rows and their normalization from backend columns
//! - The data-source and preference-store seams the feed runs against
//! - The bucketed fetch policy (id windows, hopping, rating bands)
//! - The per-category prefetch/advance state machine
//! - An immutable theme value for front ends
//!
//! ## Feature Flags
//!
//! - `api`: Enables [`source::RestSource`], a blocking PostgREST client built on `ureq`.

pub mod category;
pub mod error;
pub mod feed;
pub mod fetch;
pub mod lifecycle;
pub mod prefs;
pub mod prelude;
pub mod puzzle;
pub mod source;
#[cfg(test)]
mod testing;
pub mod theme;

pub use category::Category;
pub use error::{Error, Result};
pub use feed::{CategoryFeed, FeedConfig, FeedConfigBuilder, PuzzleFeed, Transition};
pub use fetch::{FetchConfig, FetchConfigBuilder, FetchPolicy};
pub use lifecycle::MountSignal;
pub use prefs::{FilePreferences, MemoryPreferences, PreferenceStore, Preferences};
pub use puzzle::{PuzzleRow, RawPuzzleRow, Side};
#[cfg(feature = "api")]
pub use source::RestSource;
pub use source::{Column, Direction, MemorySource, OrderBy, PuzzleQuery, PuzzleSource};
pub use theme::{BoardColors, Color, ColorScheme, Colors, Theme};
