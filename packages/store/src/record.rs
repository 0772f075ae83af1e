use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle of one submitted edit.
///
/// Transitions are forward-only:
/// `Pending → Processing → Applied | Failed` (plus `Pending → Failed` for
/// submissions that die before an attempt). `Applied` and `Failed` are
/// terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EditStatus {
    Pending,
    Processing,
    Applied,
    Failed,
}

impl EditStatus {
    pub fn can_transition(self, next: EditStatus) -> bool {
        matches!(
            (self, next),
            (EditStatus::Pending, EditStatus::Processing)
                | (EditStatus::Pending, EditStatus::Failed)
                | (EditStatus::Processing, EditStatus::Applied)
                | (EditStatus::Processing, EditStatus::Failed)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, EditStatus::Applied | EditStatus::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EditStatus::Pending => "pending",
            EditStatus::Processing => "processing",
            EditStatus::Applied => "applied",
            EditStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(EditStatus::Pending),
            "processing" => Some(EditStatus::Processing),
            "applied" => Some(EditStatus::Applied),
            "failed" => Some(EditStatus::Failed),
            _ => None,
        }
    }
}

/// What kind of node an edit addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EditTargetKind {
    Text,
    Attribute,
    MetadataField,
    StructuredDataField,
}

/// Where an edit lands inside a page module
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditTarget {
    pub kind: EditTargetKind,
    pub page_key: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component_id: Option<String>,

    /// Durable `data-edit-id` identity, when the content carries one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edit_id: Option<String>,

    /// Dotted path for metadata / structured-data edits
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_path: Option<String>,

    /// Index among same-typed structured-data entries
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element_tag: Option<String>,
}

/// Durable, append-only record of one submitted content change.
/// `original_value` and `new_value` are fixed at creation; only `status`,
/// `updated_at`, and `metadata` ever change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditRecord {
    pub id: Uuid,
    pub target: EditTarget,
    pub original_value: String,
    pub new_value: String,
    pub status: EditStatus,
    pub page_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

impl EditRecord {
    pub fn new(
        target: EditTarget,
        original_value: impl Into<String>,
        new_value: impl Into<String>,
        page_url: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            target,
            original_value: original_value.into(),
            new_value: new_value.into(),
            status: EditStatus::Pending,
            page_url: page_url.into(),
            created_at: now,
            updated_at: now,
            metadata: serde_json::Value::Object(Default::default()),
        }
    }
}

/// Merge update metadata into existing metadata: object keys are merged,
/// anything else replaces wholesale
pub(crate) fn merge_metadata(existing: &mut serde_json::Value, update: serde_json::Value) {
    match (existing, update) {
        (serde_json::Value::Object(base), serde_json::Value::Object(patch)) => {
            base.extend(patch);
        }
        (slot, update) => *slot = update,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_machine_is_forward_only() {
        use EditStatus::*;
        assert!(Pending.can_transition(Processing));
        assert!(Pending.can_transition(Failed));
        assert!(Processing.can_transition(Applied));
        assert!(Processing.can_transition(Failed));

        assert!(!Pending.can_transition(Applied)); // must pass through processing
        assert!(!Applied.can_transition(Failed));
        assert!(!Failed.can_transition(Pending));
        assert!(!Processing.can_transition(Pending));
    }

    #[test]
    fn test_record_serializes_camel_case() {
        let record = EditRecord::new(
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
        );
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["status"], "pending");
        assert_eq!(json["originalValue"], "Welcome");
        assert_eq!(json["target"]["componentId"], "hero-title");
    }

    #[test]
    fn test_merge_metadata_extends_objects() {
        let mut meta = serde_json::json!({ "a": 1 });
        merge_metadata(&mut meta, serde_json::json!({ "b": 2 }));
        assert_eq!(meta, serde_json::json!({ "a": 1, "b": 2 }));
    }
}
