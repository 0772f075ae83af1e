use crate::error::{ParseError, ParseResult};
use logos::Logos;
use std::ops::Range;

/// Code-position tokens, lexed by logos. JSX text runs and `{...}`
/// expressions are modal and produced by the `tokenize` driver instead.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\n\r]+")]
#[logos(skip r"//[^\n]*")]
#[logos(skip r"/\*([^*]|\*[^/])*\*/")]
enum CodeToken<'src> {
    #[token("import")]
    Import,

    #[token("export")]
    Export,

    #[token("default")]
    Default,

    #[token("const")]
    Const,

    #[token("function")]
    Function,

    #[token("return")]
    Return,

    #[token("from")]
    From,

    #[token("true")]
    True,

    #[token("false")]
    False,

    #[token("null")]
    Null,

    // Identifiers (dashes allowed for JSX attribute names like data-edit-id)
    #[regex(r"[a-zA-Z_$][a-zA-Z0-9_$-]*", |lex| lex.slice())]
    Ident(&'src str),

    // String literals, single or double quoted
    #[regex(r#""([^"\\\n]|\\.)*""#, |lex| lex.slice())]
    #[regex(r#"'([^'\\\n]|\\.)*'"#, |lex| lex.slice())]
    String(&'src str),

    #[regex(r"-?[0-9]+(\.[0-9]+)?", |lex| lex.slice())]
    Number(&'src str),

    #[token("{")]
    LBrace,

    #[token("}")]
    RBrace,

    #[token("[")]
    LBracket,

    #[token("]")]
    RBracket,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token("<")]
    Lt,

    #[token(">")]
    Gt,

    #[token("/")]
    Slash,

    #[token("=")]
    Eq,

    #[token(":")]
    Colon,

    #[token(",")]
    Comma,

    #[token(";")]
    Semi,

    #[token(".")]
    Dot,

    #[token("*")]
    Star,
}

/// Token stream consumed by the parser
#[derive(Debug, Clone, PartialEq)]
pub enum Token<'src> {
    Import,
    Export,
    Default,
    Const,
    Function,
    Return,
    From,
    True,
    False,
    Null,
    Ident(&'src str),
    String(&'src str),
    Number(&'src str),
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    LParen,
    RParen,
    Lt,
    Gt,
    Slash,
    Eq,
    Colon,
    Comma,
    Semi,
    Dot,
    Star,

    /// Raw JSX text run (exact source bytes, never produced when
    /// whitespace-only)
    Text(&'src str),

    /// Raw `{...}` expression body (without the braces)
    RawExpr(&'src str),
}

impl<'src> From<CodeToken<'src>> for Token<'src> {
    fn from(t: CodeToken<'src>) -> Self {
        match t {
            CodeToken::Import => Token::Import,
            CodeToken::Export => Token::Export,
            CodeToken::Default => Token::Default,
            CodeToken::Const => Token::Const,
            CodeToken::Function => Token::Function,
            CodeToken::Return => Token::Return,
            CodeToken::From => Token::From,
            CodeToken::True => Token::True,
            CodeToken::False => Token::False,
            CodeToken::Null => Token::Null,
            CodeToken::Ident(s) => Token::Ident(s),
            CodeToken::String(s) => Token::String(s),
            CodeToken::Number(s) => Token::Number(s),
            CodeToken::LBrace => Token::LBrace,
            CodeToken::RBrace => Token::RBrace,
            CodeToken::LBracket => Token::LBracket,
            CodeToken::RBracket => Token::RBracket,
            CodeToken::LParen => Token::LParen,
            CodeToken::RParen => Token::RParen,
            CodeToken::Lt => Token::Lt,
            CodeToken::Gt => Token::Gt,
            CodeToken::Slash => Token::Slash,
            CodeToken::Eq => Token::Eq,
            CodeToken::Colon => Token::Colon,
            CodeToken::Comma => Token::Comma,
            CodeToken::Semi => Token::Semi,
            CodeToken::Dot => Token::Dot,
            CodeToken::Star => Token::Star,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Mode {
    /// Top-level module code
    Code,
    /// Inside `<...>` of an open/close tag
    Tag { closing: bool },
    /// Between an open tag and its close tag
    Children,
}

/// Tokenize a page module. Modal: tracks JSX nesting so text runs and
/// embedded expressions are captured raw instead of mis-lexed as code.
pub fn tokenize(source: &str) -> ParseResult<Vec<(Token<'_>, Range<usize>)>> {
    let mut tokens: Vec<(Token, Range<usize>)> = Vec::new();
    let mut pos = 0usize;
    let mut mode = Mode::Code;
    let mut depth = 0usize; // open (non-self-closing) element nesting
    let mut last_was_slash = false;

    loop {
        match mode {
            Mode::Code | Mode::Tag { .. } => {
                let rest = &source[pos..];
                let mut lex = CodeToken::lexer(rest);
                let Some(item) = lex.next() else {
                    if depth > 0 {
                        return Err(ParseError::unexpected_eof(source.len()));
                    }
                    break;
                };
                let span = lex.span();
                let (start, end) = (pos + span.start, pos + span.end);
                let tok = item.map_err(|_| ParseError::lexer_error(start))?;
                pos = end;

                match mode {
                    Mode::Code => match tok {
                        CodeToken::Lt => {
                            let closing = source[pos..].starts_with('/');
                            tokens.push((Token::Lt, start..end));
                            mode = Mode::Tag { closing };
                            last_was_slash = false;
                        }
                        t => tokens.push((t.into(), start..end)),
                    },
                    Mode::Tag { closing } => match tok {
                        CodeToken::LBrace => {
                            tokens.push((Token::LBrace, start..end));
                            pos = push_braced_expr(source, pos, &mut tokens)?;
                            last_was_slash = false;
                        }
                        CodeToken::Slash => {
                            tokens.push((Token::Slash, start..end));
                            last_was_slash = true;
                        }
                        CodeToken::Gt => {
                            tokens.push((Token::Gt, start..end));
                            if closing {
                                depth = depth.checked_sub(1).ok_or_else(|| {
                                    ParseError::invalid_syntax(start, "unmatched closing tag")
                                })?;
                            } else if !last_was_slash {
                                depth += 1;
                            }
                            mode = if depth > 0 { Mode::Children } else { Mode::Code };
                            last_was_slash = false;
                        }
                        t => {
                            tokens.push((t.into(), start..end));
                            last_was_slash = false;
                        }
                    },
                    Mode::Children => unreachable!(),
                }
            }
            Mode::Children => {
                let bytes = source.as_bytes();
                let text_start = pos;
                let mut i = pos;
                while i < bytes.len() && bytes[i] != b'<' && bytes[i] != b'{' {
                    i += 1;
                }
                if i > text_start {
                    let slice = &source[text_start..i];
                    if !slice.trim().is_empty() {
                        tokens.push((Token::Text(slice), text_start..i));
                    }
                }
                if i >= bytes.len() {
                    return Err(ParseError::unexpected_eof(source.len()));
                }
                pos = i;
                if bytes[i] == b'<' {
                    let closing = source[i + 1..].starts_with('/');
                    tokens.push((Token::Lt, i..i + 1));
                    pos = i + 1;
                    mode = Mode::Tag { closing };
                    last_was_slash = false;
                } else {
                    tokens.push((Token::LBrace, i..i + 1));
                    pos = push_braced_expr(source, i + 1, &mut tokens)?;
                }
            }
        }
    }

    Ok(tokens)
}

/// Scan a brace-balanced raw expression starting just inside `{`.
/// Emits RawExpr + RBrace and returns the position after the closing brace.
fn push_braced_expr<'src>(
    source: &'src str,
    start: usize,
    tokens: &mut Vec<(Token<'src>, Range<usize>)>,
) -> ParseResult<usize> {
    let mut depth = 1usize;
    let mut in_string: Option<char> = None;
    let mut escaped = false;

    for (off, ch) in source[start..].char_indices() {
        let idx = start + off;
        if let Some(quote) = in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == quote {
                in_string = None;
            }
            continue;
        }
        match ch {
            '"' | '\'' | '`' => in_string = Some(ch),
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    tokens.push((Token::RawExpr(&source[start..idx]), start..idx));
                    tokens.push((Token::RBrace, idx..idx + 1));
                    return Ok(idx + 1);
                }
            }
            _ => {}
        }
    }

    Err(ParseError::unexpected_eof(source.len()))
}

/// Decode a quoted string literal (strip quotes, process escapes)
pub fn decode_string(literal: &str) -> String {
    let inner = &literal[1..literal.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => break,
        }
    }
    out
}

/// Quote and escape a string as a double-quoted literal
pub fn encode_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for ch in value.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            other => out.push(other),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_const() {
        let tokens = tokenize(r#"export const title = "Hello";"#).unwrap();
        assert!(matches!(tokens[0].0, Token::Export));
        assert!(matches!(tokens[1].0, Token::Const));
        assert!(matches!(tokens[2].0, Token::Ident("title")));
    }

    #[test]
    fn test_tokenize_jsx_text_is_raw() {
        // The apostrophe must not open a string literal
        let source = "export function A() { return (<p>Don't miss out</p>); }";
        let tokens = tokenize(source).unwrap();
        let text = tokens.iter().find_map(|(t, _)| match t {
            Token::Text(s) => Some(*s),
            _ => None,
        });
        assert_eq!(text, Some("Don't miss out"));
    }

    #[test]
    fn test_tokenize_nested_elements() {
        let source = "export function A() { return (<div><p>Hi</p><img src=\"x\" /></div>); }";
        let tokens = tokenize(source).unwrap();
        let texts: Vec<_> = tokens
            .iter()
            .filter(|(t, _)| matches!(t, Token::Text(_)))
            .collect();
        assert_eq!(texts.len(), 1);
    }

    #[test]
    fn test_tokenize_expression_child() {
        let source = "export function A() { return (<p>Total: {count + 1}</p>); }";
        let tokens = tokenize(source).unwrap();
        let raw = tokens.iter().find_map(|(t, _)| match t {
            Token::RawExpr(s) => Some(*s),
            _ => None,
        });
        assert_eq!(raw, Some("count + 1"));
    }

    #[test]
    fn test_tokenize_unclosed_element_fails() {
        let source = "export function A() { return (<p>Hello); }";
        assert!(tokenize(source).is_err());
    }

    #[test]
    fn test_text_spans_are_exact() {
        let source = "export function A() { return (<p>Hello</p>); }";
        let tokens = tokenize(source).unwrap();
        let (_, range) = tokens
            .iter()
            .find(|(t, _)| matches!(t, Token::Text(_)))
            .unwrap();
        assert_eq!(&source[range.clone()], "Hello");
    }

    #[test]
    fn test_decode_encode_string() {
        assert_eq!(decode_string(r#""a \"b\" c""#), "a \"b\" c");
        assert_eq!(decode_string("'it'"), "it");
        assert_eq!(encode_string("say \"hi\""), r#""say \"hi\"""#);
    }
}
