//! Identity injection: stamp every JSX element that lacks a `data-edit-id`
//! with a fresh UUID v4 so the editing overlay can address it later.

use crate::walk::{source_files, WalkError, WalkOptions};
use copydesk_parser::{parse, Element, Module, Node, ParseResult};
use copydesk_patch::{splice, EDIT_ID_ATTR};
use std::path::Path;
use uuid::Uuid;

/// Aggregate over an injection run
#[derive(Debug, Default)]
pub struct InjectSummary {
    pub files_scanned: usize,
    pub files_changed: usize,
    pub files_skipped: usize,
    pub identifiers_added: usize,
}

/// Stamp one source text. Fragments have no tag to attach to and are left
/// alone. Already-stamped elements are skipped, so the pass is idempotent.
pub fn inject_source(source: &str) -> ParseResult<(String, usize)> {
    let module = parse(source)?;

    // Insertion point: right after the tag name
    let mut insertions: Vec<usize> = Vec::new();
    for_each_element(&module, &mut |el| {
        let Some(tag) = &el.tag else {
            return;
        };
        if el.attr_str(EDIT_ID_ATTR).is_some() {
            return;
        }
        let mut offset = el.span.start + 1;
        while source.as_bytes()[offset].is_ascii_whitespace() {
            offset += 1;
        }
        insertions.push(offset + tag.len());
    });

    let added = insertions.len();
    insertions.sort_by(|a, b| b.cmp(a));
    let mut updated = source.to_string();
    for offset in insertions {
        let stamp = format!(" {}=\"{}\"", EDIT_ID_ATTR, Uuid::new_v4());
        updated = splice(&updated, offset, offset, &stamp);
    }

    Ok((updated, added))
}

fn for_each_element(module: &Module, visit: &mut impl FnMut(&Element)) {
    fn walk(element: &Element, visit: &mut impl FnMut(&Element)) {
        visit(element);
        for child in &element.children {
            if let Node::Element(el) = child {
                walk(el, visit);
            }
        }
    }
    for component in &module.components {
        walk(&component.root, visit);
    }
}

/// Stamp a whole source tree. Dry-run unless `write` is set; parse failures
/// skip the file and the run continues.
pub fn inject_tree(
    root: &Path,
    options: &WalkOptions,
    write: bool,
) -> Result<InjectSummary, WalkError> {
    let mut summary = InjectSummary::default();

    for path in source_files(root, options)? {
        summary.files_scanned += 1;
        let source = match std::fs::read_to_string(&path) {
            Ok(s) => s,
            Err(_) => {
                summary.files_skipped += 1;
                continue;
            }
        };
        match inject_source(&source) {
            Ok((updated, added)) if added > 0 => {
                summary.files_changed += 1;
                summary.identifiers_added += added;
                if write {
                    std::fs::write(&path, &updated)?;
                }
            }
            Ok(_) => {}
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "skipping unparseable file");
                summary.files_skipped += 1;
            }
        }
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strip::{is_uuid_v4, strip_source};

    const PLAIN: &str = r#"export function Hero() {
    return (
        <section>
            <h1>Welcome</h1>
        </section>
    );
}
"#;

    #[test]
    fn test_inject_stamps_every_element() {
        let (updated, added) = inject_source(PLAIN).unwrap();
        assert_eq!(added, 2);

        let module = copydesk_parser::parse(&updated).unwrap();
        let root = &module.components[0].root;
        let id = root.attr_str(EDIT_ID_ATTR).unwrap();
        assert!(is_uuid_v4(id));
    }

    #[test]
    fn test_inject_is_idempotent() {
        let (once, _) = inject_source(PLAIN).unwrap();
        let (twice, added) = inject_source(&once).unwrap();
        assert_eq!(added, 0);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_inject_then_strip_roundtrips() {
        let (stamped, added) = inject_source(PLAIN).unwrap();
        assert_eq!(added, 2);
        let (stripped, removed, _) = strip_source(&stamped).unwrap();
        assert_eq!(removed, 2);
        assert_eq!(stripped, PLAIN);
    }
}
