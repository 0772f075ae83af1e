//! Applier strategies: what happens to an edit record after it is saved.
//!
//! Development applies in place against the local source tree; production
//! leaves records `pending` for a later batch publish. Both paths go through
//! the same locator and patcher.

use copydesk_patch::{FieldPath, SourceDocument, TargetQuery};
use copydesk_store::{EditRecord, EditStatus, EditStore, EditTargetKind, StoreResult};
use std::collections::HashMap;
use std::path::PathBuf;

/// Resolves a page key to the page-module file that owns its content
#[derive(Debug, Clone)]
pub struct PageMap {
    content_dir: PathBuf,
    pages: HashMap<String, String>,
}

impl PageMap {
    pub fn new(content_dir: PathBuf, pages: HashMap<String, String>) -> Self {
        Self { content_dir, pages }
    }

    pub fn resolve(&self, page_key: &str) -> Option<PathBuf> {
        self.pages.get(page_key).map(|rel| self.content_dir.join(rel))
    }
}

/// Build the locator query an edit record describes. For metadata targets
/// the first `field_path` segment names the exported object.
pub fn target_query(record: &EditRecord) -> Result<TargetQuery, String> {
    let target = &record.target;
    match target.kind {
        EditTargetKind::Text | EditTargetKind::Attribute => {
            if let Some(edit_id) = &target.edit_id {
                Ok(TargetQuery::Identity {
                    edit_id: edit_id.clone(),
                    original: record.original_value.clone(),
                })
            } else if let Some(component_id) = &target.component_id {
                Ok(TargetQuery::ComponentText {
                    component_id: component_id.clone(),
                    original: record.original_value.clone(),
                    element_tag: target.element_tag.clone(),
                })
            } else {
                Err("target carries neither editId nor componentId".to_string())
            }
        }
        EditTargetKind::MetadataField => {
            let raw = target
                .field_path
                .as_deref()
                .ok_or_else(|| "metadata edit has no fieldPath".to_string())?;
            let (export_name, path) = raw
                .split_once('.')
                .ok_or_else(|| format!("fieldPath '{}' has no field segment", raw))?;
            Ok(TargetQuery::MetadataField {
                export_name: export_name.to_string(),
                path: FieldPath::parse(path),
                original: record.original_value.clone(),
            })
        }
        EditTargetKind::StructuredDataField => {
            let component_id = target
                .component_id
                .clone()
                .ok_or_else(|| "structured-data edit has no componentId".to_string())?;
            let raw = target
                .field_path
                .as_deref()
                .ok_or_else(|| "structured-data edit has no fieldPath".to_string())?;
            Ok(TargetQuery::StructuredData {
                component_id,
                instance: target.instance,
                path: FieldPath::parse(raw),
                original: record.original_value.clone(),
            })
        }
    }
}

/// Strategy selected once at startup. `apply` takes a freshly saved record
/// through its lifecycle and returns the final record; only store failures
/// are hard errors, a failed patch becomes a `failed` record.
pub trait EditApplier: Send + Sync {
    fn is_production(&self) -> bool;

    fn apply(&self, store: &dyn EditStore, record: &EditRecord) -> StoreResult<EditRecord>;
}

/// Development: locate, patch, and write the source file right away
pub struct ImmediateApplier {
    pages: PageMap,
}

impl ImmediateApplier {
    pub fn new(pages: PageMap) -> Self {
        Self { pages }
    }

    fn try_patch(&self, record: &EditRecord) -> Result<String, String> {
        let query = target_query(record)?;
        let path = self.pages.resolve(&record.target.page_key).ok_or_else(|| {
            format!("no source file mapped for page '{}'", record.target.page_key)
        })?;

        // fresh read: a stale originalValue must fail, not clobber
        let mut doc = SourceDocument::load(&path).map_err(|e| e.to_string())?;
        doc.apply(&query, &record.new_value).map_err(|e| e.to_string())?;
        doc.save().map_err(|e| e.to_string())?;

        tracing::info!(
            edit_id = %record.id,
            path = %path.display(),
            "edit applied to source"
        );
        Ok(path.display().to_string())
    }
}

impl EditApplier for ImmediateApplier {
    fn is_production(&self) -> bool {
        false
    }

    fn apply(&self, store: &dyn EditStore, record: &EditRecord) -> StoreResult<EditRecord> {
        // processing is persisted before the attempt so a crash mid-patch
        // leaves an honest record behind
        let current = store.update_status(record.id, EditStatus::Processing, None)?;

        match self.try_patch(&current) {
            Ok(path) => store.update_status(
                record.id,
                EditStatus::Applied,
                Some(serde_json::json!({ "appliedTo": path })),
            ),
            Err(message) => {
                tracing::warn!(edit_id = %record.id, error = %message, "edit failed to apply");
                store.update_status(
                    record.id,
                    EditStatus::Failed,
                    Some(serde_json::json!({ "error": message })),
                )
            }
        }
    }
}

/// Production: never touches the filesystem; records stay pending until a
/// batch publish replays them through the same locator and patcher
pub struct DeferredApplier;

impl EditApplier for DeferredApplier {
    fn is_production(&self) -> bool {
        true
    }

    fn apply(&self, _store: &dyn EditStore, record: &EditRecord) -> StoreResult<EditRecord> {
        tracing::info!(edit_id = %record.id, "edit recorded for deferred apply");
        Ok(record.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use copydesk_store::{EditTarget, MemoryStore};

    fn record(kind: EditTargetKind, target: EditTarget) -> EditRecord {
        EditRecord::new(
            EditTarget { kind, ..target },
            "Welcome",
            "Welcome Home",
            "https://example.com/",
        )
    }

    fn text_target() -> EditTarget {
        EditTarget {
            kind: EditTargetKind::Text,
            page_key: "home".to_string(),
            component_id: Some("hero-title".to_string()),
            edit_id: None,
            field_path: None,
            instance: None,
            element_tag: None,
        }
    }

    #[test]
    fn test_identity_takes_precedence_over_component() {
        let mut target = text_target();
        target.edit_id = Some("c56a4180-65aa-42ec-a945-5fd21dec0538".to_string());
        let query = target_query(&record(EditTargetKind::Text, target)).unwrap();
        assert!(matches!(query, TargetQuery::Identity { .. }));
    }

    #[test]
    fn test_metadata_field_path_splits_export_name() {
        let mut target = text_target();
        target.component_id = None;
        target.field_path = Some("metadata.openGraph.title".to_string());
        let query = target_query(&record(EditTargetKind::MetadataField, target)).unwrap();
        match query {
            TargetQuery::MetadataField {
                export_name, path, ..
            } => {
                assert_eq!(export_name, "metadata");
                assert_eq!(path.to_string(), "openGraph.title");
            }
            other => panic!("unexpected query: {:?}", other),
        }
    }

    #[test]
    fn test_target_without_any_address_is_rejected() {
        let mut target = text_target();
        target.component_id = None;
        let err = target_query(&record(EditTargetKind::Text, target)).unwrap_err();
        assert!(err.contains("neither"));
    }

    #[test]
    fn test_deferred_applier_leaves_record_pending() {
        let store = MemoryStore::new();
        let rec = record(EditTargetKind::Text, text_target());
        store.save(&rec).unwrap();

        let out = DeferredApplier.apply(&store, &rec).unwrap();
        assert_eq!(out.status, EditStatus::Pending);
        assert_eq!(store.get(rec.id).unwrap().status, EditStatus::Pending);
    }

    #[test]
    fn test_immediate_applier_marks_failed_when_page_unmapped() {
        let store = MemoryStore::new();
        let rec = record(EditTargetKind::Text, text_target());
        store.save(&rec).unwrap();

        let applier = ImmediateApplier::new(PageMap::new(PathBuf::from("/tmp"), HashMap::new()));
        let out = applier.apply(&store, &rec).unwrap();
        assert_eq!(out.status, EditStatus::Failed);
        assert!(out.metadata["error"]
            .as_str()
            .unwrap()
            .contains("no source file mapped"));
    }
}
