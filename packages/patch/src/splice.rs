//! Span-based source patching.
//!
//! The patcher never re-prints the AST. It substitutes exactly the located
//! node's byte span and leaves every other byte of the file alone, then
//! re-parses the result before anything is written back.

use crate::errors::{PatchError, PatchResult};
use crate::locator::{LocatedKind, LocatedNode};
use copydesk_parser::{encode_string, parse, Module};

/// Replace `[start, end)` of `source` with `replacement`
pub fn splice(source: &str, start: usize, end: usize, replacement: &str) -> String {
    let mut out = String::with_capacity(source.len() - (end - start) + replacement.len());
    out.push_str(&source[..start]);
    out.push_str(replacement);
    out.push_str(&source[end..]);
    out
}

/// Tag-like markup scan: `<` followed by a letter or `/`
pub fn contains_markup(value: &str) -> bool {
    let bytes = value.as_bytes();
    for (i, b) in bytes.iter().enumerate() {
        if *b == b'<' {
            match bytes.get(i + 1) {
                Some(c) if c.is_ascii_alphabetic() || *c == b'/' => return true,
                _ => {}
            }
        }
    }
    false
}

/// Patch one located node. Returns the updated source and the re-parsed
/// module; on any error the caller keeps the original text.
pub fn patch_source(
    source: &str,
    located: &LocatedNode,
    new_value: &str,
) -> PatchResult<(String, Module)> {
    let replacement = match located.kind {
        LocatedKind::JsxText => {
            // Preserve the original run's surrounding whitespace so sibling
            // formatting (indentation, spacing before `{`) is untouched
            let original = &source[located.start..located.end];
            let leading: String = original.chars().take_while(|c| c.is_whitespace()).collect();
            let trailing: String = original
                .chars()
                .rev()
                .take_while(|c| c.is_whitespace())
                .collect::<String>()
                .chars()
                .rev()
                .collect();
            format!("{}{}{}", leading, new_value.trim(), trailing)
        }
        LocatedKind::Attribute | LocatedKind::StringLiteral => {
            if contains_markup(new_value) {
                return Err(PatchError::MarkupNotAllowed);
            }
            encode_string(new_value)
        }
    };

    let updated = splice(source, located.start, located.end, &replacement);

    // A substitution that breaks the module must never reach disk
    let module = parse(&updated).map_err(PatchError::InvalidReplacement)?;

    Ok((updated, module))
}
