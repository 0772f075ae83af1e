//! Durable record of content edits flowing through the intake API.
//!
//! Records are append-only and carry a forward-only status machine; the
//! store is the audit trail for every edit the service ever accepted.

pub mod error;
pub mod memory;
pub mod record;
pub mod sqlite;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use record::{EditRecord, EditStatus, EditTarget, EditTargetKind};
pub use sqlite::SqliteStore;
pub use store::{EditStore, ListFilter};
