//! Identity layer: durable `data-edit-id` stamps on editable JSX nodes.
//!
//! Two operator-invoked passes over a source tree, both dry-run by default:
//! - **inject**: stamp unmarked elements with fresh UUID v4 identities;
//! - **strip**: remove every stamp (and any UUID-shaped `id` attribute)
//!   before a clean release build.

pub mod inject;
pub mod strip;
pub mod walk;

pub use inject::{inject_source, inject_tree, InjectSummary};
pub use strip::{is_uuid_v4, strip_source, strip_tree, FileReport, StripSummary};
pub use walk::{is_reserved, source_files, WalkError, WalkOptions, EXCLUDED_DIRS, SOURCE_EXTENSIONS};
