use crate::error::{RenderError, RenderResult};
use copydesk_parser::ast::{Module, Value};
use serde::{Deserialize, Serialize};

/// One entry of a page's default-exported descriptor array:
/// `{ type: "hero", props: { ... } }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub block_type: String,
    pub props: serde_json::Value,
}

impl Block {
    /// Decode a parsed object literal into a descriptor. The `type` key is
    /// required; `props` defaults to an empty object.
    pub fn from_value(value: &Value) -> RenderResult<Self> {
        let entries = match value {
            Value::Object { entries, .. } => entries,
            other => {
                return Err(RenderError::InvalidDescriptor(format!(
                    "expected an object literal, found {:?}",
                    std::mem::discriminant(other)
                )))
            }
        };

        let mut block_type = None;
        let mut props = serde_json::Value::Object(Default::default());
        for entry in entries {
            match entry.key.as_str() {
                "type" => match &entry.value {
                    Value::Str { value, .. } => block_type = Some(value.clone()),
                    _ => {
                        return Err(RenderError::InvalidDescriptor(
                            "block 'type' must be a string literal".to_string(),
                        ))
                    }
                },
                "props" => props = value_to_json(&entry.value),
                _ => {}
            }
        }

        let block_type = block_type.ok_or_else(|| {
            RenderError::InvalidDescriptor("block descriptor has no 'type' key".to_string())
        })?;
        Ok(Self { block_type, props })
    }

    /// String prop, if present and a string
    pub fn prop_str(&self, key: &str) -> Option<&str> {
        self.props.get(key).and_then(|v| v.as_str())
    }

    /// String prop or a `MissingProp` error
    pub fn require_str(&self, key: &str) -> RenderResult<&str> {
        self.prop_str(key).ok_or_else(|| RenderError::MissingProp {
            block_type: self.block_type.clone(),
            prop: key.to_string(),
        })
    }
}

/// Decode the default-exported block array of a page module. Malformed
/// entries fail the whole decode; rendering failures are handled later,
/// per block.
pub fn blocks_from_module(module: &Module) -> RenderResult<Vec<Block>> {
    let value = module.resolved_default().ok_or_else(|| {
        RenderError::InvalidDescriptor("module has no default export".to_string())
    })?;
    let items = match value {
        Value::Array { items, .. } => items,
        _ => {
            return Err(RenderError::InvalidDescriptor(
                "default export is not an array literal".to_string(),
            ))
        }
    };
    items.iter().map(Block::from_value).collect()
}

/// Lower a parsed literal to JSON. Numbers that don't parse and opaque
/// raw expressions are carried as strings.
pub fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Str { value, .. } => serde_json::Value::String(value.clone()),
        Value::Num { raw, .. } => raw
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map(serde_json::Value::Number)
            .unwrap_or_else(|| serde_json::Value::String(raw.clone())),
        Value::Bool { value, .. } => serde_json::Value::Bool(*value),
        Value::Null { .. } => serde_json::Value::Null,
        Value::Object { entries, .. } => serde_json::Value::Object(
            entries
                .iter()
                .map(|e| (e.key.clone(), value_to_json(&e.value)))
                .collect(),
        ),
        Value::Array { items, .. } => {
            serde_json::Value::Array(items.iter().map(value_to_json).collect())
        }
        Value::Raw { text, .. } => serde_json::Value::String(text.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use copydesk_parser::parse;

    const PAGE: &str = r#"
const blocks = [
  { type: "hero", props: { title: "Welcome", subtitle: "Hi there" } },
  { type: "text", props: { content: "Body copy." } },
];

export default blocks;
"#;

    #[test]
    fn test_decodes_default_export_through_const_reference() {
        let module = parse(PAGE).unwrap();
        let blocks = blocks_from_module(&module).unwrap();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].block_type, "hero");
        assert_eq!(blocks[0].prop_str("title"), Some("Welcome"));
        assert_eq!(blocks[1].prop_str("content"), Some("Body copy."));
    }

    #[test]
    fn test_descriptor_without_type_is_rejected() {
        let module = parse("export default [{ props: {} }];").unwrap();
        let err = blocks_from_module(&module).unwrap_err();
        assert!(matches!(err, RenderError::InvalidDescriptor(_)));
    }

    #[test]
    fn test_missing_prop_is_a_typed_error() {
        let block = Block {
            block_type: "hero".to_string(),
            props: serde_json::json!({}),
        };
        let err = block.require_str("title").unwrap_err();
        assert_eq!(
            err,
            RenderError::MissingProp {
                block_type: "hero".to_string(),
                prop: "title".to_string(),
            }
        );
    }
}
