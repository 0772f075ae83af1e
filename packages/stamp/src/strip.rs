//! Bulk identity removal: strips every `data-edit-id` attribute and every
//! `id` attribute whose value is UUID-v4-shaped. Hand-authored semantic ids
//! (`id="hero"`) survive.

use crate::walk::{source_files, WalkError, WalkOptions};
use copydesk_parser::{parse, AttrValue, Element, Module, Node, ParseResult};
use copydesk_patch::{splice, EDIT_ID_ATTR};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Outcome of stripping one file
#[derive(Debug, Clone)]
pub struct FileReport {
    pub path: PathBuf,
    pub edit_ids_removed: usize,
    pub uuid_ids_removed: usize,
    /// Parse failure message when the file was skipped
    pub skipped: Option<String>,
}

impl FileReport {
    pub fn removed(&self) -> usize {
        self.edit_ids_removed + self.uuid_ids_removed
    }
}

/// Aggregate over a whole run
#[derive(Debug, Default)]
pub struct StripSummary {
    pub files_scanned: usize,
    pub files_changed: usize,
    pub files_skipped: usize,
    pub identifiers_removed: usize,
    pub reports: Vec<FileReport>,
}

/// UUID-v4 shape: 36-char hyphenated form with version nibble 4
pub fn is_uuid_v4(value: &str) -> bool {
    if value.len() != 36 {
        return false;
    }
    match Uuid::parse_str(value) {
        Ok(uuid) => uuid.get_version_num() == 4,
        Err(_) => false,
    }
}

/// Strip identities from one source text.
/// Returns the updated text and per-kind removal counts.
pub fn strip_source(source: &str) -> ParseResult<(String, usize, usize)> {
    let module = parse(source)?;

    // Collect attribute spans to drop, including the run of whitespace
    // that separates each attribute from what precedes it
    let mut removals: Vec<(usize, usize)> = Vec::new();
    let mut edit_ids = 0usize;
    let mut uuid_ids = 0usize;

    for_each_element(&module, &mut |el| {
        for attr in &el.attributes {
            let strip = if attr.name == EDIT_ID_ATTR {
                edit_ids += 1;
                true
            } else if attr.name == "id" {
                match &attr.value {
                    Some(AttrValue::Str { value, .. }) if is_uuid_v4(value) => {
                        uuid_ids += 1;
                        true
                    }
                    _ => false,
                }
            } else {
                false
            };

            if strip {
                let mut start = attr.span.start;
                while start > 0 && source.as_bytes()[start - 1].is_ascii_whitespace() {
                    start -= 1;
                }
                removals.push((start, attr.span.end));
            }
        }
    });

    removals.sort_by(|a, b| b.0.cmp(&a.0));
    let mut updated = source.to_string();
    for (start, end) in removals {
        updated = splice(&updated, start, end, "");
    }

    Ok((updated, edit_ids, uuid_ids))
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

/// Strip a whole source tree. Dry-run unless `write` is set.
/// A parse failure on one file is reported and that file skipped; the run
/// continues with the rest.
pub fn strip_tree(root: &Path, options: &WalkOptions, write: bool) -> Result<StripSummary, WalkError> {
    let mut summary = StripSummary::default();

    for path in source_files(root, options)? {
        summary.files_scanned += 1;
        let source = match std::fs::read_to_string(&path) {
            Ok(s) => s,
            Err(err) => {
                summary.files_skipped += 1;
                summary.reports.push(FileReport {
                    path,
                    edit_ids_removed: 0,
                    uuid_ids_removed: 0,
                    skipped: Some(err.to_string()),
                });
                continue;
            }
        };

        match strip_source(&source) {
            Ok((updated, edit_ids, uuid_ids)) => {
                let changed = updated != source;
                if changed {
                    summary.files_changed += 1;
                    summary.identifiers_removed += edit_ids + uuid_ids;
                    if write {
                        std::fs::write(&path, &updated)?;
                    }
                }
                summary.reports.push(FileReport {
                    path,
                    edit_ids_removed: edit_ids,
                    uuid_ids_removed: uuid_ids,
                    skipped: None,
                });
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "skipping unparseable file");
                summary.files_skipped += 1;
                summary.reports.push(FileReport {
                    path,
                    edit_ids_removed: 0,
                    uuid_ids_removed: 0,
                    skipped: Some(err.to_string()),
                });
            }
        }
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    const STAMPED: &str = r#"export function Hero() {
    return (
        <section data-edit-id="3fa85f64-5717-4562-b3fc-2c963f66afa6">
            <h1 id="3fa85f64-5717-4562-b3fc-2c963f66afa7">Welcome</h1>
            <form id="contact-form">
                <input name="email" />
            </form>
        </section>
    );
}
"#;

    #[test]
    fn test_is_uuid_v4_shape() {
        assert!(is_uuid_v4("3fa85f64-5717-4562-b3fc-2c963f66afa6"));
        assert!(!is_uuid_v4("contact-form"));
        assert!(!is_uuid_v4("hero"));
        // v1 uuid: version nibble is 1
        assert!(!is_uuid_v4("3fa85f64-5717-1562-b3fc-2c963f66afa6"));
    }

    #[test]
    fn test_strip_removes_injected_ids_only() {
        let (updated, edit_ids, uuid_ids) = strip_source(STAMPED).unwrap();
        assert_eq!(edit_ids, 1);
        assert_eq!(uuid_ids, 1);
        assert!(!updated.contains("data-edit-id"));
        assert!(!updated.contains("3fa85f64"));
        assert!(updated.contains(r#"<form id="contact-form">"#));
        assert!(updated.contains("<section>"));
        assert!(updated.contains("<h1>Welcome</h1>"));
    }

    #[test]
    fn test_strip_is_idempotent() {
        let (once, _, _) = strip_source(STAMPED).unwrap();
        let (twice, edit_ids, uuid_ids) = strip_source(&once).unwrap();
        assert_eq!(edit_ids + uuid_ids, 0);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_dry_run_does_not_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hero.tsx");
        std::fs::write(&path, STAMPED).unwrap();

        let summary = strip_tree(dir.path(), &WalkOptions::default(), false).unwrap();
        assert_eq!(summary.files_changed, 1);
        assert_eq!(summary.identifiers_removed, 2);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), STAMPED);
    }

    #[test]
    fn test_write_run_persists_and_second_run_is_clean() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hero.tsx");
        std::fs::write(&path, STAMPED).unwrap();

        let first = strip_tree(dir.path(), &WalkOptions::default(), true).unwrap();
        assert_eq!(first.identifiers_removed, 2);
        let after_first = std::fs::read_to_string(&path).unwrap();

        let second = strip_tree(dir.path(), &WalkOptions::default(), true).unwrap();
        assert_eq!(second.identifiers_removed, 0);
        assert_eq!(second.files_changed, 0);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), after_first);
    }

    #[test]
    fn test_parse_error_skips_file_but_run_continues() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("bad.tsx"), "export function Broken( {").unwrap();
        std::fs::write(dir.path().join("good.tsx"), STAMPED).unwrap();

        let summary = strip_tree(dir.path(), &WalkOptions::default(), true).unwrap();
        assert_eq!(summary.files_skipped, 1);
        assert_eq!(summary.files_changed, 1);
        let bad = summary
            .reports
            .iter()
            .find(|r| r.path.ends_with("bad.tsx"))
            .unwrap();
        assert!(bad.skipped.is_some());
    }
}
