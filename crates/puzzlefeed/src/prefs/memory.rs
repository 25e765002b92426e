use std::sync::Mutex;

use super::{PreferenceStore, Preferences};
use crate::category::Category;
use crate::error::{Error, Result};

/// Preferences held in memory for the lifetime of the process
#[derive(Debug, Default)]
pub struct MemoryPreferences {
    inner: Mutex<Preferences>,
}

impl MemoryPreferences {
    pub fn new(prefs: Preferences) -> Self {
        Self {
            inner: Mutex::new(prefs),
        }
    }

    pub fn with_rating(rating: i64) -> Self {
        Self::new(Preferences {
            chess_tactics_rating: Some(rating),
            ..Default::default()
        })
    }

    /// Copy of the current record
    pub fn snapshot(&self) -> Result<Preferences> {
        Ok(self.lock()?.clone())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Preferences>> {
        self.inner
            .lock()
            .map_err(|_| Error::Preferences("preference lock poisoned".to_string()))
    }
}

impl PreferenceStore for MemoryPreferences {
    fn bucket_start(&self, category: Category) -> Result<Option<i64>> {
        Ok(self.lock()?.bucket_start(category))
    }

    fn set_bucket_start(&self, category: Category, start: i64) -> Result<()> {
        self.lock()?.set_bucket_start(category, start);
        Ok(())
    }

    fn rating(&self) -> Result<Option<i64>> {
        Ok(self.lock()?.chess_tactics_rating)
    }
}
