//! Prelude module for convenient imports
//!
//! ```ignore
//! use puzzlefeed::prelude::*;
//! ```
//!
//! This brings the following into scope:
//!
//! - Feed types: `PuzzleFeed`, `FeedConfig`, `Transition`, `MountSignal`
//! - Fetching: `FetchPolicy`, `FetchConfig`, `Category`
//! - Seams: `PuzzleSource`, `PreferenceStore`
//! - Error handling: `Error`, `Result`

pub use crate::category::Category;
pub use crate::error::{Error, Result};
pub use crate::feed::{FeedConfig, PuzzleFeed, Transition};
pub use crate::fetch::{FetchConfig, FetchPolicy};
pub use crate::lifecycle::MountSignal;
pub use crate::prefs::PreferenceStore;
pub use crate::puzzle::PuzzleRow;
pub use crate::source::PuzzleSource;
