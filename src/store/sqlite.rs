//! SQLite-backed content store.

use std::path::Path;
use std::str::FromStr;
use std::sync::Mutex;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use super::{ContentStore, StoreError};
use crate::generation::{ApprovalStatus, GeneratedContent};

const SELECT_COLUMNS: &str = "id, user_id, character_id, content_type, title, content, \
     metadata_json, approval_status, created_at";

/// File-based store using a single `generated_content` table.
///
/// The connection is guarded by a mutex, so the store can be shared across
/// request handlers.
#[derive(Debug)]
pub struct SqliteContentStore {
    /// Database path (`:memory:` for the in-memory variant).
    pub db_path: String,
    conn: Mutex<Connection>,
}

impl SqliteContentStore {
    /// Open (or create) the database at `path` and ensure the schema.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        Self::with_connection(conn, path.display().to_string())
    }

    /// Private in-memory database, mainly for tests.
    pub fn in_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?, ":memory:".to_string())
    }

    fn with_connection(conn: Connection, db_path: String) -> Result<Self, StoreError> {
        let store = Self {
            db_path,
            conn: Mutex::new(conn),
        };
        store.init_db()?;
        Ok(store)
    }

    fn init_db(&self) -> Result<(), StoreError> {
        let conn = self.conn.lock().map_err(|_| StoreError::LockPoisoned)?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS generated_content (
                id TEXT PRIMARY KEY,
                user_id TEXT,
                character_id TEXT NOT NULL,
                content_type TEXT NOT NULL,
                title TEXT NOT NULL,
                content TEXT NOT NULL,
                metadata_json TEXT NOT NULL,
                approval_status TEXT NOT NULL,
                created_at TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_generated_content_character
             ON generated_content(character_id, created_at)",
            [],
        )?;

        Ok(())
    }
}

fn row_to_content(row: &Row<'_>) -> rusqlite::Result<[Option<String>; 9]> {
    Ok([
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
        row.get(8)?,
    ])
}

fn decode(columns: [Option<String>; 9]) -> Result<GeneratedContent, StoreError> {
    let [id, user_id, character_id, content_type, title, content, metadata, status, created_at] =
        columns;
    let required = |value: Option<String>, name: &str| {
        value.ok_or_else(|| StoreError::Corrupt(format!("missing column {}", name)))
    };

    let id = required(id, "id")?;
    let id = Uuid::parse_str(&id).map_err(|e| StoreError::Corrupt(format!("bad id '{}': {}", id, e)))?;
    let status = required(status, "approval_status")?;
    let approval_status = ApprovalStatus::from_str(&status).map_err(StoreError::Corrupt)?;
    let created_at = required(created_at, "created_at")?;
    let created_at = DateTime::parse_from_rfc3339(&created_at)
        .map_err(|e| StoreError::Corrupt(format!("bad created_at '{}': {}", created_at, e)))?
        .with_timezone(&Utc);

    Ok(GeneratedContent {
        id,
        user_id,
        character_id: required(character_id, "character_id")?,
        content_type: required(content_type, "content_type")?,
        title: required(title, "title")?,
        content: required(content, "content")?,
        metadata: serde_json::from_str(&required(metadata, "metadata_json")?)?,
        approval_status,
        created_at,
    })
}

impl ContentStore for SqliteContentStore {
    fn save(&self, content: &GeneratedContent) -> Result<(), StoreError> {
        let conn = self.conn.lock().map_err(|_| StoreError::LockPoisoned)?;
        let metadata_json = serde_json::to_string(&content.metadata)?;

        conn.execute(
            "INSERT OR REPLACE INTO generated_content
                (id, user_id, character_id, content_type, title, content,
                 metadata_json, approval_status, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                content.id.to_string(),
                content.user_id,
                content.character_id,
                content.content_type,
                content.title,
                content.content,
                metadata_json,
                content.approval_status.as_str(),
                content.created_at.to_rfc3339_opts(SecondsFormat::Micros, true),
            ],
        )?;

        log::debug!(
            "SqliteContentStore::save: id={}, character={}",
            content.id,
            content.character_id
        );
        Ok(())
    }

    fn get(&self, id: &str) -> Result<Option<GeneratedContent>, StoreError> {
        let conn = self.conn.lock().map_err(|_| StoreError::LockPoisoned)?;
        let sql = format!("SELECT {} FROM generated_content WHERE id = ?1", SELECT_COLUMNS);
        let row = conn
            .query_row(&sql, params![id], row_to_content)
            .optional()?;
        row.map(decode).transpose()
    }

    fn list(&self, character_id: Option<&str>) -> Result<Vec<GeneratedContent>, StoreError> {
        let conn = self.conn.lock().map_err(|_| StoreError::LockPoisoned)?;
        let sql = format!(
            "SELECT {} FROM generated_content
             WHERE (?1 IS NULL OR character_id = ?1)
             ORDER BY created_at DESC",
            SELECT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![character_id], row_to_content)?;

        let mut out = Vec::new();
        for row in rows {
            out.push(decode(row?)?);
        }
        Ok(out)
    }

    fn set_approval(&self, id: &str, status: ApprovalStatus) -> Result<GeneratedContent, StoreError> {
        {
            let conn = self.conn.lock().map_err(|_| StoreError::LockPoisoned)?;
            let changed = conn.execute(
                "UPDATE generated_content SET approval_status = ?1 WHERE id = ?2",
                params![status.as_str(), id],
            )?;
            if changed == 0 {
                return Err(StoreError::NotFound(id.to_string()));
            }
        }
        self.get(id)?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::tests::sample;

    #[test]
    fn test_round_trip_and_approval() {
        let store = SqliteContentStore::in_memory().unwrap();
        let item = sample("sofia", "Voice guide", 0);
        store.save(&item).unwrap();

        let loaded = store.get(&item.id.to_string()).unwrap().unwrap();
        assert_eq!(loaded.id, item.id);
        assert_eq!(loaded.title, "Voice guide");
        assert_eq!(loaded.metadata, item.metadata);
        assert_eq!(loaded.approval_status, ApprovalStatus::Pending);

        let updated = store
            .set_approval(&item.id.to_string(), ApprovalStatus::Rejected)
            .unwrap();
        assert_eq!(updated.approval_status, ApprovalStatus::Rejected);
    }

    #[test]
    fn test_missing_record() {
        let store = SqliteContentStore::in_memory().unwrap();
        assert!(store.get("does-not-exist").unwrap().is_none());
        assert!(matches!(
            store.set_approval("does-not-exist", ApprovalStatus::Approved),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn test_list_on_disk_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("content.db");
        let store = SqliteContentStore::open(&path).unwrap();
        store.save(&sample("rachel", "older", 60)).unwrap();
        store.save(&sample("rachel", "newer", 2)).unwrap();
        store.save(&sample("alex", "elsewhere", 1)).unwrap();

        let titles: Vec<_> = store
            .list(Some("rachel"))
            .unwrap()
            .into_iter()
            .map(|c| c.title)
            .collect();
        assert_eq!(titles, vec!["newer", "older"]);
        assert_eq!(store.list(None).unwrap().len(), 3);

        drop(store);
        let reopened = SqliteContentStore::open(&path).unwrap();
        assert_eq!(reopened.list(None).unwrap().len(), 3);
    }
}
