//! SQLite-backed edit-record store

use crate::error::{StoreError, StoreResult};
use crate::record::{merge_metadata, EditRecord, EditStatus};
use crate::store::{EditStore, ListFilter};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use std::path::Path;
use std::sync::Mutex;
use uuid::Uuid;

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

/// Column values as stored, before JSON/uuid/timestamp decoding
struct RawRow {
    id: String,
    target: String,
    original_value: String,
    new_value: String,
    status: String,
    page_url: String,
    created_at: String,
    updated_at: String,
    metadata: String,
}

impl RawRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            target: row.get(1)?,
            original_value: row.get(2)?,
            new_value: row.get(3)?,
            status: row.get(4)?,
            page_url: row.get(5)?,
            created_at: row.get(6)?,
            updated_at: row.get(7)?,
            metadata: row.get(8)?,
        })
    }

    fn decode(self) -> StoreResult<EditRecord> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| StoreError::Serde(serde_json::Error::io(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                e,
            ))))?;
        Ok(EditRecord {
            id,
            target: serde_json::from_str(&self.target)?,
            original_value: self.original_value,
            new_value: self.new_value,
            status: EditStatus::parse(&self.status).ok_or_else(|| {
                StoreError::Serde(serde_json::Error::io(std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    format!("unknown status: {}", self.status),
                )))
            })?,
            page_url: self.page_url,
            created_at: parse_timestamp(&self.created_at)?,
            updated_at: parse_timestamp(&self.updated_at)?,
            metadata: serde_json::from_str(&self.metadata)?,
        })
    }
}

fn parse_timestamp(raw: &str) -> StoreResult<DateTime<Utc>> {
    raw.parse::<DateTime<Utc>>().map_err(|e| {
        StoreError::Serde(serde_json::Error::io(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            e,
        )))
    })
}

const SELECT_COLUMNS: &str = "id, target, original_value, new_value, status, page_url, \
                              created_at, updated_at, metadata";

impl SqliteStore {
    /// Open (creating if needed) the store at `path`
    pub fn open(path: &Path) -> StoreResult<Self> {
        Self::with_connection(Connection::open(path)?)
    }

    /// Ephemeral store, handy for tests
    pub fn in_memory() -> StoreResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> StoreResult<Self> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS edit_records (
                id TEXT PRIMARY KEY,
                target TEXT NOT NULL,
                original_value TEXT NOT NULL,
                new_value TEXT NOT NULL,
                status TEXT NOT NULL,
                page_url TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                metadata TEXT NOT NULL
            )",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_edit_records_status
             ON edit_records(status, created_at)",
            [],
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

impl EditStore for SqliteStore {
    fn save(&self, record: &EditRecord) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        let result = conn.execute(
            "INSERT INTO edit_records
             (id, target, original_value, new_value, status, page_url, created_at, updated_at, metadata)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                record.id.to_string(),
                serde_json::to_string(&record.target)?,
                record.original_value,
                record.new_value,
                record.status.as_str(),
                record.page_url,
                record.created_at.to_rfc3339(),
                record.updated_at.to_rfc3339(),
                serde_json::to_string(&record.metadata)?,
            ],
        );
        match result {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Err(StoreError::DuplicateId(record.id))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn update_status(
        &self,
        id: Uuid,
        status: EditStatus,
        metadata: Option<serde_json::Value>,
    ) -> StoreResult<EditRecord> {
        let mut record = self.get(id)?;
        if !record.status.can_transition(status) {
            return Err(StoreError::InvalidTransition {
                from: record.status,
                to: status,
            });
        }
        record.status = status;
        record.updated_at = Utc::now();
        if let Some(update) = metadata {
            merge_metadata(&mut record.metadata, update);
        }

        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE edit_records SET status = ?1, updated_at = ?2, metadata = ?3 WHERE id = ?4",
            params![
                record.status.as_str(),
                record.updated_at.to_rfc3339(),
                serde_json::to_string(&record.metadata)?,
                record.id.to_string(),
            ],
        )?;
        Ok(record)
    }

    fn get(&self, id: Uuid) -> StoreResult<EditRecord> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM edit_records WHERE id = ?1",
            SELECT_COLUMNS
        ))?;
        let mut rows = stmt.query_map(params![id.to_string()], RawRow::from_row)?;
        match rows.next() {
            Some(raw) => raw?.decode(),
            None => Err(StoreError::NotFound(id)),
        }
    }

    fn list(&self, filter: &ListFilter) -> StoreResult<Vec<EditRecord>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM edit_records ORDER BY created_at DESC",
            SELECT_COLUMNS
        ))?;
        let rows = stmt.query_map([], RawRow::from_row)?;

        let mut records = Vec::new();
        for raw in rows {
            let record = raw?.decode()?;
            if filter.matches(&record) {
                records.push(record);
            }
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{EditTarget, EditTargetKind};

    fn sample_record() -> EditRecord {
        EditRecord::new(
            EditTarget {
                kind: EditTargetKind::Text,
                page_key: "home".to_string(),
                component_id: Some("hero-title".to_string()),
                edit_id: None,
                field_path: None,
                instance: None,
                element_tag: Some("h1".to_string()),
            },
            "Welcome",
            "Welcome Home",
            "https://example.com/",
        )
    }

    #[test]
    fn test_save_and_get_roundtrip() {
        let store = SqliteStore::in_memory().unwrap();
        let record = sample_record();
        store.save(&record).unwrap();

        let loaded = store.get(record.id).unwrap();
        assert_eq!(loaded.original_value, "Welcome");
        assert_eq!(loaded.status, EditStatus::Pending);
        assert_eq!(loaded.target.component_id.as_deref(), Some("hero-title"));
    }

    #[test]
    fn test_resave_cannot_rewrite_original_value() {
        let store = SqliteStore::in_memory().unwrap();
        let record = sample_record();
        store.save(&record).unwrap();

        let mut tampered = record.clone();
        tampered.original_value = "Tampered".to_string();
        let err = store.save(&tampered).unwrap_err();
        assert!(matches!(err, StoreError::DuplicateId(id) if id == record.id));
        assert_eq!(store.get(record.id).unwrap().original_value, "Welcome");
    }

    #[test]
    fn test_update_status_walks_the_machine() {
        let store = SqliteStore::in_memory().unwrap();
        let record = sample_record();
        store.save(&record).unwrap();

        store
            .update_status(record.id, EditStatus::Processing, None)
            .unwrap();
        let applied = store
            .update_status(
                record.id,
                EditStatus::Applied,
                Some(serde_json::json!({ "appliedBy": "dev" })),
            )
            .unwrap();
        assert_eq!(applied.status, EditStatus::Applied);
        assert_eq!(applied.metadata["appliedBy"], "dev");

        // terminal: no way back
        let err = store
            .update_status(record.id, EditStatus::Failed, None)
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidTransition { .. }));
    }

    #[test]
    fn test_skipping_processing_is_rejected() {
        let store = SqliteStore::in_memory().unwrap();
        let record = sample_record();
        store.save(&record).unwrap();

        let err = store
            .update_status(record.id, EditStatus::Applied, None)
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidTransition { .. }));
    }

    #[test]
    fn test_list_filters_by_status() {
        let store = SqliteStore::in_memory().unwrap();
        let a = sample_record();
        let b = sample_record();
        store.save(&a).unwrap();
        store.save(&b).unwrap();
        store
            .update_status(b.id, EditStatus::Processing, None)
            .unwrap();

        let pending = store
            .list(&ListFilter::by_status(EditStatus::Pending))
            .unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, a.id);
    }

    #[test]
    fn test_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("edits.db");
        let record = sample_record();
        {
            let store = SqliteStore::open(&db_path).unwrap();
            store.save(&record).unwrap();
        }
        let store = SqliteStore::open(&db_path).unwrap();
        assert_eq!(store.get(record.id).unwrap().new_value, "Welcome Home");
    }
}
