use crate::error::StoreResult;
use crate::record::{EditRecord, EditStatus};
use uuid::Uuid;

/// Persistent, append-only store of edit records. There is deliberately no
/// delete operation: the records are the audit trail.
pub trait EditStore: Send + Sync {
    /// Persist a new record. An id that already exists is rejected with
    /// `DuplicateId`; saved values never change afterwards.
    fn save(&self, record: &EditRecord) -> StoreResult<()>;

    /// Advance the state machine. Only `status`, `updated_at`, and
    /// `metadata` change; invalid transitions are rejected.
    fn update_status(
        &self,
        id: Uuid,
        status: EditStatus,
        metadata: Option<serde_json::Value>,
    ) -> StoreResult<EditRecord>;

    fn get(&self, id: Uuid) -> StoreResult<EditRecord>;

    fn list(&self, filter: &ListFilter) -> StoreResult<Vec<EditRecord>>;
}

/// Filter for listing records, newest first
#[derive(Debug, Default, Clone)]
pub struct ListFilter {
    pub status: Option<EditStatus>,
    pub page_key: Option<String>,
}

impl ListFilter {
    pub fn by_status(status: EditStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn matches(&self, record: &EditRecord) -> bool {
        if let Some(status) = self.status {
            if record.status != status {
                return false;
            }
        }
        if let Some(page_key) = &self.page_key {
            if &record.target.page_key != page_key {
                return false;
            }
        }
        true
    }
}
