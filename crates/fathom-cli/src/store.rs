//! Run record kept in a JSON file.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use fathom_simulation::store::apply_key;
use fathom_simulation::{RunRecord, RunStore, StoreError};

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    #[serde(default)]
    record: RunRecord,
    saved_at: Option<DateTime<Utc>>,
}

/// [`RunStore`] backed by a single JSON file. A missing file reads as an
/// empty record; every save rewrites the whole file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// When the file was last written, if ever.
    pub fn saved_at(&self) -> Result<Option<DateTime<Utc>>, StoreError> {
        Ok(self.read()?.saved_at)
    }

    fn read(&self) -> Result<StoreFile, StoreError> {
        if !self.path.exists() {
            return Ok(StoreFile::default());
        }
        let text = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&text)?)
    }
}

impl RunStore for JsonFileStore {
    fn load(&mut self) -> Result<RunRecord, StoreError> {
        Ok(self.read()?.record)
    }

    fn save(&mut self, key: &str, value: serde_json::Value) -> Result<(), StoreError> {
        let mut file = self.read()?;
        apply_key(&mut file.record, key, value)?;
        file.saved_at = Some(Utc::now());
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, serde_json::to_string_pretty(&file)?)?;
        tracing::debug!(path = %self.path.display(), key, "run record saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_file_is_an_empty_record() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonFileStore::new(dir.path().join("run.json"));
        assert_eq!(store.load().unwrap(), RunRecord::default());
        assert_eq!(store.saved_at().unwrap(), None);
    }

    #[test]
    fn saves_merge_into_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("run.json");
        let mut store = JsonFileStore::new(&path);
        store.save("essence", json!({ "shallow": 3 })).unwrap();
        store.save("size", json!(42.5)).unwrap();

        let mut reopened = JsonFileStore::new(&path);
        let record = reopened.load().unwrap();
        assert_eq!(record.essence.get("shallow"), Some(&3));
        assert_eq!(record.size, Some(42.5));
        assert!(reopened.saved_at().unwrap().is_some());
    }

    #[test]
    fn corrupt_file_is_a_serde_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.json");
        fs::write(&path, "{ not json").unwrap();
        let mut store = JsonFileStore::new(&path);
        assert!(matches!(store.load(), Err(StoreError::Serde(_))));
    }
}
