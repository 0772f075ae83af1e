//! Locate-and-patch pipeline for page-module sources.
//!
//! Two decoupled phases sharing one contract:
//! - **locate**: resolve an edit target (identity, component scope, or
//!   field path) to exactly one source span, or fail with a typed error;
//! - **patch**: splice only that span, verify the result still parses,
//!   and only then let it reach disk.

pub mod document;
pub mod errors;
pub mod locator;
pub mod splice;

pub use document::SourceDocument;
pub use errors::{PatchError, PatchResult};
pub use locator::{
    locate, normalize_text, FieldPath, LocatedKind, LocatedNode, PathSegment, TargetQuery,
    COMPONENT_ID_ATTR, EDIT_ID_ATTR,
};
pub use splice::{contains_markup, patch_source, splice};
