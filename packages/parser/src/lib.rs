pub mod ast;
pub mod error;
pub mod parser;
pub mod tokenizer;

pub use ast::{
    AttrValue, Attribute, ComponentFn, ConstDecl, DefaultExport, Element, Import, Module, Node,
    ObjectEntry, RawExpr, Span, TextNode, Value,
};
pub use error::{ParseError, ParseResult};
pub use parser::{parse, Parser};
pub use tokenizer::{decode_string, encode_string, tokenize, Token};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_page() {
        let source = r#"
export const metadata = { title: "Contact" };
export default [ { type: "contact-form", props: {} } ];
"#;
        let module = parse(source).unwrap();
        assert!(module.find_const("metadata").is_some());
        assert!(module.default_export.is_some());
    }
}
