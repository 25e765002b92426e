use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{debug, warn};

use super::{PreferenceStore, Preferences};
use crate::category::Category;
use crate::error::{Error, Result};

/// Preferences persisted as a JSON file.
///
/// A missing file reads as an empty record; the file and its parent
/// directory are created on first write.
pub struct FilePreferences {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FilePreferences {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the whole record
    pub fn load(&self) -> Result<Preferences> {
        let content = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Preferences file not found: {}", self.path.display());
                return Ok(Preferences::default());
            }
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str::<Preferences>(&content) {
            Ok(prefs) => Ok(prefs),
            Err(e) => {
                warn!(
                    "Failed to parse preferences file {}: {}",
                    self.path.display(),
                    e
                );
                Err(e.into())
            }
        }
    }

    /// Replace the whole record
    pub fn save(&self, prefs: &Preferences) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(prefs)?;
        fs::write(&self.path, content)?;
        debug!("Saved preferences to {}", self.path.display());
        Ok(())
    }

    /// Read, modify and write back under the store's lock
    pub fn update(&self, apply: impl FnOnce(&mut Preferences)) -> Result<()> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| Error::Preferences("preference lock poisoned".to_string()))?;
        let mut prefs = self.load()?;
        apply(&mut prefs);
        self.save(&prefs)
    }
}

impl PreferenceStore for FilePreferences {
    fn bucket_start(&self, category: Category) -> Result<Option<i64>> {
        Ok(self.load()?.bucket_start(category))
    }

    fn set_bucket_start(&self, category: Category, start: i64) -> Result<()> {
        self.update(|prefs| prefs.set_bucket_start(category, start))
    }

    fn rating(&self) -> Result<Option<i64>> {
        Ok(self.load()?.chess_tactics_rating)
    }
}
