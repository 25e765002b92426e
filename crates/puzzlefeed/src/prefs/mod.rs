//! Preference storage.
//!
//! Preferences hold two things:
//!
//! - **Bucket cursors**: the last bucket start reached in each category,
//!   keyed by [`Category::storage_key`]
//! - **Tactics rating**: the user's skill rating, used by the practice feed
//!
//! Writes are best-effort from the feed's point of view: callers log and drop
//! failures rather than surfacing them.

mod file;
mod memory;

pub use file::*;
pub use memory::*;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::category::Category;
use crate::error::Result;

/// Persisted preference record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Preferences {
    pub latest_puzzle_ids: BTreeMap<String, i64>,
    pub chess_tactics_rating: Option<i64>,
}

impl Preferences {
    pub fn bucket_start(&self, category: Category) -> Option<i64> {
        self.latest_puzzle_ids
            .get(category.storage_key())
            .copied()
    }

    pub fn set_bucket_start(&mut self, category: Category, start: i64) {
        self.latest_puzzle_ids
            .insert(category.storage_key().to_string(), start);
    }
}

/// Key/value store for feed cursors and the user's rating.
pub trait PreferenceStore: Send + Sync {
    /// Last bucket start persisted for `category`, if any
    fn bucket_start(&self, category: Category) -> Result<Option<i64>>;

    fn set_bucket_start(&self, category: Category, start: i64) -> Result<()>;

    fn rating(&self) -> Result<Option<i64>>;
}

impl<T: PreferenceStore + ?Sized> PreferenceStore for &T {
    fn bucket_start(&self, category: Category) -> Result<Option<i64>> {
        (**self).bucket_start(category)
    }

    fn set_bucket_start(&self, category: Category, start: i64) -> Result<()> {
        (**self).set_bucket_start(category, start)
    }

    fn rating(&self) -> Result<Option<i64>> {
        (**self).rating()
    }
}

impl<T: PreferenceStore + ?Sized> PreferenceStore for std::sync::Arc<T> {
    fn bucket_start(&self, category: Category) -> Result<Option<i64>> {
        (**self).bucket_start(category)
    }

    fn set_bucket_start(&self, category: Category, start: i64) -> Result<()> {
        (**self).set_bucket_start(category, start)
    }

    fn rating(&self) -> Result<Option<i64>> {
        (**self).rating()
    }
}
