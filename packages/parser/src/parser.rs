use crate::ast::*;
use crate::error::{ParseError, ParseResult};
use crate::tokenizer::{decode_string, tokenize, Token};
use std::ops::Range;

/// Parser for page modules
pub struct Parser<'src> {
    source: &'src str,
    tokens: Vec<(Token<'src>, Range<usize>)>,
    pos: usize,
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src str) -> ParseResult<Self> {
        let tokens = tokenize(source)?;
        Ok(Self {
            source,
            tokens,
            pos: 0,
        })
    }

    /// Parse a complete page module
    pub fn parse_module(&mut self) -> ParseResult<Module> {
        let mut module = Module::new();

        while !self.is_at_end() {
            let start = self.current_pos();
            match self.peek() {
                Some(Token::Import) => {
                    module.imports.push(self.parse_import(start)?);
                }
                Some(Token::Export) => {
                    self.advance(); // consume 'export'
                    match self.peek() {
                        Some(Token::Default) => {
                            self.advance();
                            let value = self.parse_value()?;
                            self.expect(Token::Semi)?;
                            let end = self.previous_end();
                            module.default_export = Some(DefaultExport {
                                value,
                                span: Span::new(start, end),
                            });
                        }
                        Some(Token::Const) => {
                            module.consts.push(self.parse_const(true, start)?);
                        }
                        Some(Token::Function) => {
                            module.components.push(self.parse_component(true, start)?);
                        }
                        _ => {
                            return Err(ParseError::invalid_syntax(
                                self.current_pos(),
                                "Expected 'default', 'const', or 'function' after 'export'",
                            ));
                        }
                    }
                }
                Some(Token::Const) => {
                    module.consts.push(self.parse_const(false, start)?);
                }
                Some(Token::Function) => {
                    module.components.push(self.parse_component(false, start)?);
                }
                _ => {
                    return Err(ParseError::invalid_syntax(
                        self.current_pos(),
                        format!("Unexpected token at top level: {:?}", self.peek()),
                    ));
                }
            }
        }

        Ok(module)
    }

    /// Import statements are captured verbatim, through the semicolon
    fn parse_import(&mut self, start: usize) -> ParseResult<Import> {
        self.expect(Token::Import)?;
        while !self.is_at_end() && !matches!(self.peek(), Some(Token::Semi)) {
            self.advance();
        }
        self.expect(Token::Semi)?;
        let end = self.previous_end();

        Ok(Import {
            raw: self.source[start..end].to_string(),
            span: Span::new(start, end),
        })
    }

    fn parse_const(&mut self, exported: bool, start: usize) -> ParseResult<ConstDecl> {
        self.expect(Token::Const)?;
        let name = self.expect_ident()?.to_string();
        self.expect(Token::Eq)?;
        let value = self.parse_value()?;
        self.expect(Token::Semi)?;
        let end = self.previous_end();

        Ok(ConstDecl {
            exported,
            name,
            value,
            span: Span::new(start, end),
        })
    }

    fn parse_component(&mut self, exported: bool, start: usize) -> ParseResult<ComponentFn> {
        self.expect(Token::Function)?;
        let name = self.expect_ident()?.to_string();

        // Parameters are opaque (props destructuring allowed)
        self.expect(Token::LParen)?;
        let mut depth = 1usize;
        while depth > 0 {
            match self.advance() {
                Some((Token::LParen, _)) => depth += 1,
                Some((Token::RParen, _)) => depth -= 1,
                Some(_) => {}
                None => return Err(ParseError::unexpected_eof(self.source.len())),
            }
        }

        self.expect(Token::LBrace)?;
        self.expect(Token::Return)?;
        let parenthesized = self.match_token(Token::LParen);
        let root = self.parse_element()?;
        if parenthesized {
            self.expect(Token::RParen)?;
        }
        self.match_token(Token::Semi);
        self.expect(Token::RBrace)?;
        let end = self.previous_end();

        Ok(ComponentFn {
            exported,
            name,
            root,
            span: Span::new(start, end),
        })
    }

    /// Parse a JSON-like literal value
    pub fn parse_value(&mut self) -> ParseResult<Value> {
        let start = self.current_pos();
        match self.peek() {
            Some(Token::String(_)) => {
                let (value, range) = self.expect_string()?;
                Ok(Value::Str {
                    value,
                    span: Span::new(range.start, range.end),
                })
            }
            Some(Token::Number(raw)) => {
                let raw = raw.to_string();
                self.advance();
                let end = self.previous_end();
                Ok(Value::Num {
                    raw,
                    span: Span::new(start, end),
                })
            }
            Some(Token::True) | Some(Token::False) => {
                let value = matches!(self.peek(), Some(Token::True));
                self.advance();
                let end = self.previous_end();
                Ok(Value::Bool {
                    value,
                    span: Span::new(start, end),
                })
            }
            Some(Token::Null) => {
                self.advance();
                let end = self.previous_end();
                Ok(Value::Null {
                    span: Span::new(start, end),
                })
            }
            Some(Token::LBrace) => self.parse_object(start),
            Some(Token::LBracket) => self.parse_array(start),
            Some(_) => self.parse_raw_value(start),
            None => Err(ParseError::unexpected_eof(self.source.len())),
        }
    }

    fn parse_object(&mut self, start: usize) -> ParseResult<Value> {
        self.expect(Token::LBrace)?;
        let mut entries = Vec::new();

        while !matches!(self.peek(), Some(Token::RBrace)) {
            let entry_start = self.current_pos();
            let key = match self.peek() {
                Some(Token::Ident(name)) => {
                    let name = name.to_string();
                    self.advance();
                    name
                }
                Some(Token::String(_)) => self.expect_string()?.0,
                other => {
                    return Err(ParseError::invalid_syntax(
                        entry_start,
                        format!("Expected object key, found {:?}", other),
                    ));
                }
            };
            self.expect(Token::Colon)?;
            let value = self.parse_value()?;
            let entry_end = self.previous_end();
            entries.push(ObjectEntry {
                key,
                value,
                span: Span::new(entry_start, entry_end),
            });

            if !self.match_token(Token::Comma) {
                break;
            }
        }

        self.expect(Token::RBrace)?;
        let end = self.previous_end();
        Ok(Value::Object {
            entries,
            span: Span::new(start, end),
        })
    }

    fn parse_array(&mut self, start: usize) -> ParseResult<Value> {
        self.expect(Token::LBracket)?;
        let mut items = Vec::new();

        while !matches!(self.peek(), Some(Token::RBracket)) {
            items.push(self.parse_value()?);
            if !self.match_token(Token::Comma) {
                break;
            }
        }

        self.expect(Token::RBracket)?;
        let end = self.previous_end();
        Ok(Value::Array {
            items,
            span: Span::new(start, end),
        })
    }

    /// Opaque expression value: consumed until a delimiter at bracket depth 0
    fn parse_raw_value(&mut self, start: usize) -> ParseResult<Value> {
        let mut depth = 0usize;
        let mut consumed = 0usize;

        loop {
            match self.peek() {
                Some(Token::Comma) | Some(Token::Semi) if depth == 0 => break,
                Some(Token::RBrace) | Some(Token::RBracket) | Some(Token::RParen) if depth == 0 => {
                    break
                }
                Some(Token::LBrace) | Some(Token::LBracket) | Some(Token::LParen) => {
                    depth += 1;
                    self.advance();
                    consumed += 1;
                }
                Some(Token::RBrace) | Some(Token::RBracket) | Some(Token::RParen) => {
                    depth -= 1;
                    self.advance();
                    consumed += 1;
                }
                Some(_) => {
                    self.advance();
                    consumed += 1;
                }
                None => return Err(ParseError::unexpected_eof(self.source.len())),
            }
        }

        if consumed == 0 {
            return Err(ParseError::invalid_syntax(start, "Expected a value"));
        }

        let end = self.previous_end();
        Ok(Value::Raw {
            text: self.source[start..end].to_string(),
            span: Span::new(start, end),
        })
    }

    /// Parse one JSX element or fragment
    pub fn parse_element(&mut self) -> ParseResult<Element> {
        let start = self.current_pos();
        self.expect(Token::Lt)?;

        // Fragment: <>...</>
        if self.match_token(Token::Gt) {
            let children = self.parse_children(None)?;
            let end = self.previous_end();
            return Ok(Element {
                tag: None,
                attributes: Vec::new(),
                children,
                self_closing: false,
                span: Span::new(start, end),
            });
        }

        let tag = self.expect_ident()?.to_string();
        let mut attributes = Vec::new();

        loop {
            match self.peek() {
                Some(Token::Ident(_)) => {
                    attributes.push(self.parse_attribute()?);
                }
                Some(Token::Slash) => {
                    self.advance();
                    self.expect(Token::Gt)?;
                    let end = self.previous_end();
                    return Ok(Element {
                        tag: Some(tag),
                        attributes,
                        children: Vec::new(),
                        self_closing: true,
                        span: Span::new(start, end),
                    });
                }
                Some(Token::Gt) => {
                    self.advance();
                    let children = self.parse_children(Some(&tag))?;
                    let end = self.previous_end();
                    return Ok(Element {
                        tag: Some(tag),
                        attributes,
                        children,
                        self_closing: false,
                        span: Span::new(start, end),
                    });
                }
                other => {
                    return Err(ParseError::invalid_syntax(
                        self.current_pos(),
                        format!("Unexpected token in tag: {:?}", other),
                    ));
                }
            }
        }
    }

    fn parse_attribute(&mut self) -> ParseResult<Attribute> {
        let start = self.current_pos();
        let name = self.expect_ident()?.to_string();

        let value = if self.match_token(Token::Eq) {
            match self.peek() {
                Some(Token::String(_)) => {
                    let (value, range) = self.expect_string()?;
                    Some(AttrValue::Str {
                        value,
                        span: Span::new(range.start, range.end),
                    })
                }
                Some(Token::LBrace) => {
                    let brace_start = self.current_pos();
                    self.advance();
                    let text = self.expect_raw_expr()?.to_string();
                    self.expect(Token::RBrace)?;
                    let end = self.previous_end();
                    Some(AttrValue::Expr {
                        text,
                        span: Span::new(brace_start, end),
                    })
                }
                other => {
                    return Err(ParseError::invalid_syntax(
                        self.current_pos(),
                        format!("Expected attribute value, found {:?}", other),
                    ));
                }
            }
        } else {
            None
        };

        let end = self.previous_end();
        Ok(Attribute {
            name,
            value,
            span: Span::new(start, end),
        })
    }

    /// Parse children until the matching close tag is consumed
    fn parse_children(&mut self, expected_tag: Option<&str>) -> ParseResult<Vec<Node>> {
        let mut children = Vec::new();

        loop {
            match self.peek() {
                Some(Token::Text(raw)) => {
                    let raw = raw.to_string();
                    let range = self.current_range();
                    self.advance();
                    children.push(Node::Text(TextNode {
                        raw,
                        span: Span::new(range.start, range.end),
                    }));
                }
                Some(Token::LBrace) => {
                    let start = self.current_pos();
                    self.advance();
                    let text = self.expect_raw_expr()?.to_string();
                    self.expect(Token::RBrace)?;
                    let end = self.previous_end();
                    children.push(Node::Expr(RawExpr {
                        text,
                        span: Span::new(start, end),
                    }));
                }
                Some(Token::Lt) => {
                    if matches!(self.peek2(), Some(Token::Slash)) {
                        // closing tag
                        self.advance(); // <
                        self.advance(); // /
                        match expected_tag {
                            Some(expected) => {
                                let pos = self.current_pos();
                                let found = self.expect_ident()?.to_string();
                                if found != expected {
                                    return Err(ParseError::MismatchedTag {
                                        pos,
                                        expected: expected.to_string(),
                                        found,
                                    });
                                }
                            }
                            None => {} // fragment close: </>
                        }
                        self.expect(Token::Gt)?;
                        return Ok(children);
                    }
                    children.push(Node::Element(self.parse_element()?));
                }
                Some(other) => {
                    return Err(ParseError::invalid_syntax(
                        self.current_pos(),
                        format!("Unexpected token in element body: {:?}", other),
                    ));
                }
                None => return Err(ParseError::unexpected_eof(self.source.len())),
            }
        }
    }

    // --- token helpers ---

    fn peek(&self) -> Option<&Token<'src>> {
        self.tokens.get(self.pos).map(|(t, _)| t)
    }

    fn peek2(&self) -> Option<&Token<'src>> {
        self.tokens.get(self.pos + 1).map(|(t, _)| t)
    }

    fn advance(&mut self) -> Option<&(Token<'src>, Range<usize>)> {
        let item = self.tokens.get(self.pos);
        if item.is_some() {
            self.pos += 1;
        }
        item
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// Start offset of the current token (or end of source at EOF)
    fn current_pos(&self) -> usize {
        self.tokens
            .get(self.pos)
            .map(|(_, r)| r.start)
            .unwrap_or(self.source.len())
    }

    fn current_range(&self) -> Range<usize> {
        self.tokens
            .get(self.pos)
            .map(|(_, r)| r.clone())
            .unwrap_or(self.source.len()..self.source.len())
    }

    /// End offset of the most recently consumed token
    fn previous_end(&self) -> usize {
        if self.pos == 0 {
            return 0;
        }
        self.tokens
            .get(self.pos - 1)
            .map(|(_, r)| r.end)
            .unwrap_or(self.source.len())
    }

    fn expect(&mut self, expected: Token<'src>) -> ParseResult<()> {
        match self.peek() {
            Some(t) if *t == expected => {
                self.advance();
                Ok(())
            }
            Some(t) => Err(ParseError::unexpected_token(
                self.current_pos(),
                format!("{:?}", expected),
                format!("{:?}", t),
            )),
            None => Err(ParseError::unexpected_eof(self.source.len())),
        }
    }

    fn match_token(&mut self, expected: Token<'src>) -> bool {
        if self.peek() == Some(&expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect_ident(&mut self) -> ParseResult<&'src str> {
        match self.peek() {
            Some(Token::Ident(name)) => {
                let name = *name;
                self.advance();
                Ok(name)
            }
            Some(t) => Err(ParseError::unexpected_token(
                self.current_pos(),
                "identifier",
                format!("{:?}", t),
            )),
            None => Err(ParseError::unexpected_eof(self.source.len())),
        }
    }

    /// Decoded string plus the range of the quoted literal
    fn expect_string(&mut self) -> ParseResult<(String, Range<usize>)> {
        match self.tokens.get(self.pos) {
            Some((Token::String(literal), range)) => {
                let result = (decode_string(literal), range.clone());
                self.advance();
                Ok(result)
            }
            Some((t, _)) => Err(ParseError::unexpected_token(
                self.current_pos(),
                "string literal",
                format!("{:?}", t),
            )),
            None => Err(ParseError::unexpected_eof(self.source.len())),
        }
    }

    fn expect_raw_expr(&mut self) -> ParseResult<&'src str> {
        match self.peek() {
            Some(Token::RawExpr(text)) => {
                let text = *text;
                self.advance();
                Ok(text)
            }
            Some(t) => Err(ParseError::unexpected_token(
                self.current_pos(),
                "expression",
                format!("{:?}", t),
            )),
            None => Err(ParseError::unexpected_eof(self.source.len())),
        }
    }

}

/// Parse a page module from source text
pub fn parse(source: &str) -> ParseResult<Module> {
    let mut parser = Parser::new(source)?;
    parser.parse_module()
}
