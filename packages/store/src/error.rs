use crate::record::EditStatus;
use thiserror::Error;
use uuid::Uuid;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Edit record not found: {0}")]
    NotFound(Uuid),

    #[error("Edit record already exists: {0}")]
    DuplicateId(Uuid),

    #[error("Invalid status transition: {from:?} -> {to:?}")]
    InvalidTransition { from: EditStatus, to: EditStatus },

    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}
