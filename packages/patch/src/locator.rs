//! Node locator: resolve an edit target to exactly one source span.
//!
//! Matching never guesses. Zero candidates is `TargetNotFound`, more than
//! one is `AmbiguousTarget`; both are typed failures the intake API turns
//! into `failed` edit records.

use crate::errors::{PatchError, PatchResult};
use copydesk_parser::{AttrValue, Element, Module, Node, Value};
use serde::{Deserialize, Serialize};

/// Reserved attribute carrying a node's durable identity
pub const EDIT_ID_ATTR: &str = "data-edit-id";

/// Attribute scoping an element subtree to a named component
pub const COMPONENT_ID_ATTR: &str = "data-component-id";

/// What kind of literal the located span holds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum LocatedKind {
    /// JSX text run; span covers the raw text bytes
    JsxText,
    /// String-literal attribute value; span covers the quotes
    Attribute,
    /// String literal inside an exported object/array; span covers the quotes
    StringLiteral,
}

/// Handle to the exact syntax node to patch
#[derive(Debug, Clone, PartialEq)]
pub struct LocatedNode {
    pub kind: LocatedKind,
    pub start: usize,
    pub end: usize,
    /// Decoded current value (normalized comparison already passed)
    pub current: String,
}

/// Dotted path into an exported object (`openGraph.images.0.alt`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldPath(pub Vec<PathSegment>);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl FieldPath {
    pub fn parse(path: &str) -> Self {
        let segments = path
            .split('.')
            .filter(|s| !s.is_empty())
            .map(|s| match s.parse::<usize>() {
                Ok(idx) => PathSegment::Index(idx),
                Err(_) => PathSegment::Key(s.to_string()),
            })
            .collect();
        Self(segments)
    }
}

impl std::fmt::Display for FieldPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, seg) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            match seg {
                PathSegment::Key(k) => f.write_str(k)?,
                PathSegment::Index(n) => write!(f, "{}", n)?,
            }
        }
        Ok(())
    }
}

/// One edit target, as the locator understands it
#[derive(Debug, Clone, PartialEq)]
pub enum TargetQuery {
    /// Element addressed by its durable `data-edit-id`
    Identity { edit_id: String, original: String },

    /// Legacy: component scope plus exact text, optionally narrowed by tag.
    /// Weaker than identity addressing; kept for content authored before
    /// identities existed.
    ComponentText {
        component_id: String,
        original: String,
        element_tag: Option<String>,
    },

    /// Field inside a named exported object (page metadata)
    MetadataField {
        export_name: String,
        path: FieldPath,
        original: String,
    },

    /// Field inside one entry of the default-exported block array,
    /// selected by the entry's `type`
    StructuredData {
        component_id: String,
        instance: Option<usize>,
        path: FieldPath,
        original: String,
    },
}

/// Collapse interior whitespace runs and trim; applied to both sides of
/// every text comparison
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Resolve a query against a parsed module to exactly one node
pub fn locate(module: &Module, query: &TargetQuery) -> PatchResult<LocatedNode> {
    match query {
        TargetQuery::Identity { edit_id, original } => {
            let scopes = elements_with_attr(module, EDIT_ID_ATTR, edit_id);
            if scopes.is_empty() {
                return Err(PatchError::TargetNotFound(format!(
                    "no element with {}=\"{}\"",
                    EDIT_ID_ATTR, edit_id
                )));
            }
            if scopes.len() > 1 {
                return Err(PatchError::AmbiguousTarget {
                    count: scopes.len(),
                    detail: format!("{}=\"{}\"", EDIT_ID_ATTR, edit_id),
                });
            }
            find_in_scopes(&scopes, original, None, &format!("edit id {}", edit_id))
        }

        TargetQuery::ComponentText {
            component_id,
            original,
            element_tag,
        } => {
            let scopes = elements_with_attr(module, COMPONENT_ID_ATTR, component_id);
            if scopes.is_empty() {
                return Err(PatchError::TargetNotFound(format!(
                    "no component \"{}\"",
                    component_id
                )));
            }
            find_in_scopes(
                &scopes,
                original,
                element_tag.as_deref(),
                &format!("component {}", component_id),
            )
        }

        TargetQuery::MetadataField {
            export_name,
            path,
            original,
        } => {
            let decl = module.find_const(export_name).ok_or_else(|| {
                PatchError::TargetNotFound(format!("no exported object \"{}\"", export_name))
            })?;
            locate_field(&decl.value, path, original, export_name)
        }

        TargetQuery::StructuredData {
            component_id,
            instance,
            path,
            original,
        } => {
            let Some(Value::Array { items, .. }) = module.resolved_default() else {
                return Err(PatchError::TargetNotFound(
                    "module has no default-exported content array".to_string(),
                ));
            };

            let matches: Vec<&Value> = items
                .iter()
                .filter(|item| entry_type(item) == Some(component_id.as_str()))
                .collect();

            let entry = match (matches.len(), instance) {
                (0, _) => {
                    return Err(PatchError::TargetNotFound(format!(
                        "no content entry with type \"{}\"",
                        component_id
                    )))
                }
                (1, _) => matches[0],
                (n, Some(idx)) => matches.get(*idx).copied().ok_or_else(|| {
                    PatchError::TargetNotFound(format!(
                        "content type \"{}\" has {} entries, instance {} requested",
                        component_id, n, idx
                    ))
                })?,
                (n, None) => {
                    return Err(PatchError::AmbiguousTarget {
                        count: n,
                        detail: format!("content type \"{}\" without instance index", component_id),
                    })
                }
            };

            locate_field(entry, path, original, component_id)
        }
    }
}

/// The `type` tag of a block-descriptor object
fn entry_type(value: &Value) -> Option<&str> {
    let Value::Object { entries, .. } = value else {
        return None;
    };
    entries.iter().find_map(|e| {
        if e.key != "type" {
            return None;
        }
        match &e.value {
            Value::Str { value, .. } => Some(value.as_str()),
            _ => None,
        }
    })
}

/// Walk a field path to a string literal and check the expected value
fn locate_field(
    root: &Value,
    path: &FieldPath,
    original: &str,
    context: &str,
) -> PatchResult<LocatedNode> {
    let mut current = root;
    for segment in &path.0 {
        current = match (segment, current) {
            (PathSegment::Key(key), Value::Object { entries, .. }) => entries
                .iter()
                .find(|e| &e.key == key)
                .map(|e| &e.value)
                .ok_or_else(|| {
                    PatchError::TargetNotFound(format!(
                        "{}: no field \"{}\" in path {}",
                        context, key, path
                    ))
                })?,
            (PathSegment::Index(idx), Value::Array { items, .. }) => {
                items.get(*idx).ok_or_else(|| {
                    PatchError::TargetNotFound(format!(
                        "{}: index {} out of bounds in path {}",
                        context, idx, path
                    ))
                })?
            }
            _ => {
                return Err(PatchError::TargetNotFound(format!(
                    "{}: path {} does not resolve to a field",
                    context, path
                )))
            }
        };
    }

    let Value::Str { value, span } = current else {
        return Err(PatchError::TargetNotFound(format!(
            "{}: path {} is not a string literal",
            context, path
        )));
    };

    if normalize_text(value) != normalize_text(original) {
        return Err(PatchError::TargetNotFound(format!(
            "{}: value at {} no longer matches the submitted original",
            context, path
        )));
    }

    Ok(LocatedNode {
        kind: LocatedKind::StringLiteral,
        start: span.start,
        end: span.end,
        current: value.clone(),
    })
}

/// All elements in the module whose string attribute `name` equals `value`
fn elements_with_attr<'a>(module: &'a Module, name: &str, value: &str) -> Vec<&'a Element> {
    let mut found = Vec::new();
    for component in &module.components {
        collect_elements(&component.root, &mut |el| {
            if el.attr_str(name) == Some(value) {
                found.push(el);
            }
        });
    }
    found
}

fn collect_elements<'a>(element: &'a Element, visit: &mut impl FnMut(&'a Element)) {
    visit(element);
    for child in &element.children {
        if let Node::Element(el) = child {
            collect_elements(el, visit);
        }
    }
}

/// Search element subtrees for text children / string attributes whose
/// normalized value equals the expected original
fn find_in_scopes(
    scopes: &[&Element],
    original: &str,
    element_tag: Option<&str>,
    detail: &str,
) -> PatchResult<LocatedNode> {
    let wanted = normalize_text(original);
    let mut candidates: Vec<LocatedNode> = Vec::new();

    for scope in scopes {
        collect_elements(scope, &mut |el| {
            let tag_matches =
                element_tag.is_none() || el.tag.as_deref() == element_tag;

            if tag_matches {
                for child in &el.children {
                    if let Node::Text(text) = child {
                        if normalize_text(&text.raw) == wanted {
                            candidates.push(LocatedNode {
                                kind: LocatedKind::JsxText,
                                start: text.span.start,
                                end: text.span.end,
                                current: text.raw.clone(),
                            });
                        }
                    }
                }
            }

            for attr in &el.attributes {
                if attr.name == EDIT_ID_ATTR || attr.name == COMPONENT_ID_ATTR {
                    continue;
                }
                if !tag_matches {
                    continue;
                }
                if let Some(AttrValue::Str { value, span }) = &attr.value {
                    if normalize_text(value) == wanted {
                        candidates.push(LocatedNode {
                            kind: LocatedKind::Attribute,
                            start: span.start,
                            end: span.end,
                            current: value.clone(),
                        });
                    }
                }
            }
        });
    }

    match candidates.len() {
        0 => Err(PatchError::TargetNotFound(format!(
            "{}: no node matches the submitted original text",
            detail
        ))),
        1 => Ok(candidates.into_iter().next().unwrap()),
        n => Err(PatchError::AmbiguousTarget {
            count: n,
            detail: detail.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use copydesk_parser::parse;

    const PAGE: &str = r#"
export const metadata = {
    title: "Contact us",
    openGraph: { images: [ { url: "og.png", alt: "Old alt" } ] },
};

const blocks = [
    { type: "hero", props: { title: "Welcome" } },
    { type: "faq", props: { question: "Why?" } },
    { type: "faq", props: { question: "How?" } },
];

export default blocks;

export function HeroTitle() {
    return (
        <section data-component-id="hero-title" data-edit-id="3fa85f64-5717-4562-b3fc-2c963f66afa6">
            <h1>Welcome</h1>
            <img src="hero.png" alt="A sunny porch" />
        </section>
    );
}
"#;

    #[test]
    fn test_locate_by_identity() {
        let module = parse(PAGE).unwrap();
        let located = locate(
            &module,
            &TargetQuery::Identity {
                edit_id: "3fa85f64-5717-4562-b3fc-2c963f66afa6".to_string(),
                original: "Welcome".to_string(),
            },
        )
        .unwrap();
        assert_eq!(located.kind, LocatedKind::JsxText);
        assert_eq!(&PAGE[located.start..located.end], "Welcome");
    }

    #[test]
    fn test_locate_attribute_by_component() {
        let module = parse(PAGE).unwrap();
        let located = locate(
            &module,
            &TargetQuery::ComponentText {
                component_id: "hero-title".to_string(),
                original: "A sunny porch".to_string(),
                element_tag: None,
            },
        )
        .unwrap();
        assert_eq!(located.kind, LocatedKind::Attribute);
        assert_eq!(&PAGE[located.start..located.end], "\"A sunny porch\"");
    }

    #[test]
    fn test_locate_missing_text_is_not_found() {
        let module = parse(PAGE).unwrap();
        let err = locate(
            &module,
            &TargetQuery::ComponentText {
                component_id: "hero-title".to_string(),
                original: "Goodbye".to_string(),
                element_tag: None,
            },
        )
        .unwrap_err();
        assert!(matches!(err, PatchError::TargetNotFound(_)));
    }

    #[test]
    fn test_duplicate_text_is_ambiguous() {
        let source = r#"
export function Twice() {
    return (
        <div data-component-id="twice">
            <p>Same words</p>
            <p>Same words</p>
        </div>
    );
}
"#;
        let module = parse(source).unwrap();
        let err = locate(
            &module,
            &TargetQuery::ComponentText {
                component_id: "twice".to_string(),
                original: "Same words".to_string(),
                element_tag: None,
            },
        )
        .unwrap_err();
        assert!(matches!(err, PatchError::AmbiguousTarget { count: 2, .. }));
    }

    #[test]
    fn test_locate_metadata_field() {
        let module = parse(PAGE).unwrap();
        let located = locate(
            &module,
            &TargetQuery::MetadataField {
                export_name: "metadata".to_string(),
                path: FieldPath::parse("openGraph.images.0.alt"),
                original: "Old alt".to_string(),
            },
        )
        .unwrap();
        assert_eq!(located.kind, LocatedKind::StringLiteral);
        assert_eq!(&PAGE[located.start..located.end], "\"Old alt\"");
    }

    #[test]
    fn test_stale_metadata_original_is_not_found() {
        let module = parse(PAGE).unwrap();
        let err = locate(
            &module,
            &TargetQuery::MetadataField {
                export_name: "metadata".to_string(),
                path: FieldPath::parse("title"),
                original: "A title that was already changed".to_string(),
            },
        )
        .unwrap_err();
        assert!(matches!(err, PatchError::TargetNotFound(_)));
    }

    #[test]
    fn test_structured_data_requires_instance_for_duplicates() {
        let module = parse(PAGE).unwrap();
        let query = TargetQuery::StructuredData {
            component_id: "faq".to_string(),
            instance: None,
            path: FieldPath::parse("props.question"),
            original: "Why?".to_string(),
        };
        assert!(matches!(
            locate(&module, &query).unwrap_err(),
            PatchError::AmbiguousTarget { count: 2, .. }
        ));

        let located = locate(
            &module,
            &TargetQuery::StructuredData {
                component_id: "faq".to_string(),
                instance: Some(1),
                path: FieldPath::parse("props.question"),
                original: "How?".to_string(),
            },
        )
        .unwrap();
        assert_eq!(&PAGE[located.start..located.end], "\"How?\"");
    }

    #[test]
    fn test_unique_structured_entry_needs_no_instance() {
        let module = parse(PAGE).unwrap();
        let located = locate(
            &module,
            &TargetQuery::StructuredData {
                component_id: "hero".to_string(),
                instance: None,
                path: FieldPath::parse("props.title"),
                original: "Welcome".to_string(),
            },
        )
        .unwrap();
        assert_eq!(&PAGE[located.start..located.end], "\"Welcome\"");
    }
}
