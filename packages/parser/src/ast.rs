use serde::{Deserialize, Serialize};

/// Span information for source location tracking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// Root node of a parsed page module
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Module {
    pub imports: Vec<Import>,
    pub consts: Vec<ConstDecl>,
    pub components: Vec<ComponentFn>,
    pub default_export: Option<DefaultExport>,
}

/// Import statement, preserved verbatim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Import {
    pub raw: String,
    pub span: Span,
}

/// `const NAME = <value>;`, optionally exported
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstDecl {
    pub exported: bool,
    pub name: String,
    pub value: Value,
    pub span: Span,
}

/// `export default <value>;` — the page's block-descriptor array,
/// either inline or a reference to a const
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefaultExport {
    pub value: Value,
    pub span: Span,
}

/// `export function Name() { return ( <jsx/> ); }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentFn {
    pub exported: bool,
    pub name: String,
    pub root: Element,
    pub span: Span,
}

/// JSON-like literal value in a const/metadata/block position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Value {
    /// String literal; span covers the quotes
    Str { value: String, span: Span },

    /// Numeric literal, kept as written
    Num { raw: String, span: Span },

    Bool { value: bool, span: Span },

    Null { span: Span },

    Object { entries: Vec<ObjectEntry>, span: Span },

    Array { items: Vec<Value>, span: Span },

    /// Opaque expression (identifier path, call, ...), kept as written
    Raw { text: String, span: Span },
}

impl Value {
    pub fn span(&self) -> &Span {
        match self {
            Value::Str { span, .. }
            | Value::Num { span, .. }
            | Value::Bool { span, .. }
            | Value::Null { span }
            | Value::Object { span, .. }
            | Value::Array { span, .. }
            | Value::Raw { span, .. } => span,
        }
    }
}

/// One `key: value` pair of an object literal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectEntry {
    pub key: String,
    pub value: Value,
    pub span: Span,
}

/// JSX child node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Node {
    Element(Element),
    Text(TextNode),
    Expr(RawExpr),
}

/// JSX element or fragment (`tag` is None for `<>...</>`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub tag: Option<String>,
    pub attributes: Vec<Attribute>,
    pub children: Vec<Node>,
    pub self_closing: bool,
    pub span: Span,
}

/// Raw text run between elements; span covers the exact source bytes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextNode {
    pub raw: String,
    pub span: Span,
}

/// `{expression}` child, kept opaque
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawExpr {
    pub text: String,
    pub span: Span,
}

/// JSX attribute; span covers name through value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub value: Option<AttrValue>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AttrValue {
    /// String literal; span covers the quotes
    Str { value: String, span: Span },

    /// `{expression}` value; span covers the braces
    Expr { text: String, span: Span },
}

impl Element {
    /// Value of a string-literal attribute, if present
    pub fn attr_str(&self, name: &str) -> Option<&str> {
        self.attributes.iter().find_map(|a| {
            if a.name != name {
                return None;
            }
            match &a.value {
                Some(AttrValue::Str { value, .. }) => Some(value.as_str()),
                _ => None,
            }
        })
    }
}

impl Module {
    pub fn new() -> Self {
        Self {
            imports: Vec::new(),
            consts: Vec::new(),
            components: Vec::new(),
            default_export: None,
        }
    }

    /// Find a top-level const by name
    pub fn find_const(&self, name: &str) -> Option<&ConstDecl> {
        self.consts.iter().find(|c| c.name == name)
    }

    /// Resolve the default-exported value, following a single
    /// identifier reference to a const
    pub fn resolved_default(&self) -> Option<&Value> {
        let default = self.default_export.as_ref()?;
        match &default.value {
            Value::Raw { text, .. } => self.find_const(text.trim()).map(|c| &c.value),
            other => Some(other),
        }
    }
}

impl Default for Module {
    fn default() -> Self {
        Self::new()
    }
}
