//! In-memory store for tests and ephemeral development runs

use crate::error::{StoreError, StoreResult};
use crate::record::{merge_metadata, EditRecord, EditStatus};
use crate::store::{EditStore, ListFilter};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<Uuid, EditRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EditStore for MemoryStore {
    fn save(&self, record: &EditRecord) -> StoreResult<()> {
        let mut records = self.records.lock().unwrap();
        if records.contains_key(&record.id) {
            return Err(StoreError::DuplicateId(record.id));
        }
        records.insert(record.id, record.clone());
        Ok(())
    }

    fn update_status(
        &self,
        id: Uuid,
        status: EditStatus,
        metadata: Option<serde_json::Value>,
    ) -> StoreResult<EditRecord> {
        let mut records = self.records.lock().unwrap();
        let record = records.get_mut(&id).ok_or(StoreError::NotFound(id))?;

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
        Ok(record.clone())
    }

    fn get(&self, id: Uuid) -> StoreResult<EditRecord> {
        let records = self.records.lock().unwrap();
        records.get(&id).cloned().ok_or(StoreError::NotFound(id))
    }

    fn list(&self, filter: &ListFilter) -> StoreResult<Vec<EditRecord>> {
        let records = self.records.lock().unwrap();
        let mut matched: Vec<EditRecord> = records
            .values()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matched)
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
                element_tag: None,
            },
            "Welcome",
            "Welcome Home",
            "https://example.com/",
        )
    }

    #[test]
    fn test_resave_cannot_rewrite_original_value() {
        let store = MemoryStore::new();
        let record = sample_record();
        store.save(&record).unwrap();

        let mut tampered = record.clone();
        tampered.original_value = "Tampered".to_string();
        let err = store.save(&tampered).unwrap_err();
        assert!(matches!(err, StoreError::DuplicateId(id) if id == record.id));
        assert_eq!(store.get(record.id).unwrap().original_value, "Welcome");
    }
}
