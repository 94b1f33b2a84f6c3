//! Persistence collaborator for run progress.
//!
//! The simulation never touches the filesystem itself; callers inject a
//! [`RunStore`]. Save failures are logged and reported as events, never fatal.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Errors a store implementation may report.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// What a previous run left behind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunRecord {
    /// Essence balance per currency type.
    pub essence: BTreeMap<String, u64>,
    /// Final size of the last completed level, if any.
    pub size: Option<f32>,
}

impl RunRecord {
    /// Total essence across every currency type.
    pub fn total_essence(&self) -> u64 {
        self.essence.values().sum()
    }
}

/// Loads and saves run progress.
pub trait RunStore: std::fmt::Debug {
    /// Read the persisted record. A missing record is an empty one.
    fn load(&mut self) -> Result<RunRecord, StoreError>;

    /// Persist one key of the record.
    fn save(&mut self, key: &str, value: serde_json::Value) -> Result<(), StoreError>;
}

/// Keeps the record in memory. Useful for tests and headless runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    record: RunRecord,
    saves: usize,
    fail_saves: bool,
}

impl MemoryStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with a record.
    pub fn with_record(record: RunRecord) -> Self {
        Self {
            record,
            ..Self::default()
        }
    }

    /// Make every save fail, for exercising the failure path.
    pub fn failing(mut self) -> Self {
        self.fail_saves = true;
        self
    }

    /// Current record.
    pub fn record(&self) -> &RunRecord {
        &self.record
    }

    /// Number of successful saves.
    pub fn save_count(&self) -> usize {
        self.saves
    }
}

impl RunStore for MemoryStore {
    fn load(&mut self) -> Result<RunRecord, StoreError> {
        Ok(self.record.clone())
    }

    fn save(&mut self, key: &str, value: serde_json::Value) -> Result<(), StoreError> {
        if self.fail_saves {
            return Err(StoreError::Unavailable("memory store set to fail".into()));
        }
        apply_key(&mut self.record, key, value)?;
        self.saves += 1;
        Ok(())
    }
}

/// Write one saved key into a record. Unknown keys are ignored.
pub fn apply_key(record: &mut RunRecord, key: &str, value: serde_json::Value) -> Result<(), StoreError> {
    match key {
        "essence" => record.essence = serde_json::from_value(value)?,
        "size" => record.size = serde_json::from_value(value)?,
        _ => {}
    }
    Ok(())
}
