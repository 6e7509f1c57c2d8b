//! Generated-content persistence.
//!
//! Provides the `ContentStore` trait plus an in-memory implementation and
//! a SQLite-backed one ([`sqlite::SqliteContentStore`]). Records are keyed
//! by id and carry an approval status that reviewers update after
//! generation.

pub mod sqlite;

pub use sqlite::SqliteContentStore;

use std::collections::HashMap;
use std::sync::RwLock;

use thiserror::Error;

use crate::generation::{ApprovalStatus, GeneratedContent};

/// Errors from content stores.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No record with this id.
    #[error("Content not found: {0}")]
    NotFound(String),

    /// SQLite failure.
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Metadata (de)serialization failure.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// File I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A stored row could not be decoded.
    #[error("Corrupt record: {0}")]
    Corrupt(String),

    /// A lock guarding the store was poisoned.
    #[error("Content store lock poisoned")]
    LockPoisoned,
}

/// Storage for generated content records.
pub trait ContentStore: Send + Sync + std::fmt::Debug {
    /// Insert or replace a record.
    fn save(&self, content: &GeneratedContent) -> Result<(), StoreError>;

    /// Fetch a record by id.
    fn get(&self, id: &str) -> Result<Option<GeneratedContent>, StoreError>;

    /// Records newest first, optionally only those for one character.
    fn list(&self, character_id: Option<&str>) -> Result<Vec<GeneratedContent>, StoreError>;

    /// Update the approval status and return the updated record.
    fn set_approval(&self, id: &str, status: ApprovalStatus) -> Result<GeneratedContent, StoreError>;
}

/// Process-local store, lost on restart.
#[derive(Debug, Default)]
pub struct InMemoryContentStore {
    records: RwLock<HashMap<String, GeneratedContent>>,
}

impl InMemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ContentStore for InMemoryContentStore {
    fn save(&self, content: &GeneratedContent) -> Result<(), StoreError> {
        let mut records = self.records.write().map_err(|_| StoreError::LockPoisoned)?;
        records.insert(content.id.to_string(), content.clone());
        Ok(())
    }

    fn get(&self, id: &str) -> Result<Option<GeneratedContent>, StoreError> {
        let records = self.records.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(records.get(id).cloned())
    }

    fn list(&self, character_id: Option<&str>) -> Result<Vec<GeneratedContent>, StoreError> {
        let records = self.records.read().map_err(|_| StoreError::LockPoisoned)?;
        let mut out: Vec<GeneratedContent> = records
            .values()
            .filter(|c| character_id.map_or(true, |id| c.character_id == id))
            .cloned()
            .collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(out)
    }

    fn set_approval(&self, id: &str, status: ApprovalStatus) -> Result<GeneratedContent, StoreError> {
        let mut records = self.records.write().map_err(|_| StoreError::LockPoisoned)?;
        let record = records
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        record.approval_status = status;
        Ok(record.clone())
    }
}
