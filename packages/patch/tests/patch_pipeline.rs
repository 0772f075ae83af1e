//! End-to-end locate → splice → save checks against fixture files

use copydesk_patch::{FieldPath, PatchError, SourceDocument, TargetQuery};

const PAGE: &str = r#"import Hero from "./components/hero";

export const metadata = {
    title: "Old title",
    description: "A page about things",
};

const blocks = [
    { type: "hero", props: { title: "Welcome" } },
];

export default blocks;

export function HeroTitle() {
    return (
        <section data-component-id="hero-title">
            <h1 data-edit-id="c56a4180-65aa-42ec-a945-5fd21dec0538">Hello</h1>
            <p>Unrelated copy</p>
        </section>
    );
}
"#;

fn write_fixture(dir: &tempfile::TempDir) -> std::path::PathBuf {
    let path = dir.path().join("page.tsx");
    std::fs::write(&path, PAGE).unwrap();
    path
}

#[test]
fn identity_patch_changes_only_the_target_text() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(&dir);

    let mut doc = SourceDocument::load(&path).unwrap();
    doc.apply(
        &TargetQuery::Identity {
            edit_id: "c56a4180-65aa-42ec-a945-5fd21dec0538".to_string(),
            original: "Hello".to_string(),
        },
        "Hi there",
    )
    .unwrap();
    doc.save().unwrap();

    let updated = std::fs::read_to_string(&path).unwrap();
    assert_eq!(updated, PAGE.replace(">Hello<", ">Hi there<"));
    // everything outside the text span is byte-identical
    assert!(updated.contains("<p>Unrelated copy</p>"));
    assert!(updated.contains("import Hero from \"./components/hero\";"));
}

#[test]
fn metadata_patch_preserves_sibling_fields() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(&dir);

    let mut doc = SourceDocument::load(&path).unwrap();
    doc.apply(
        &TargetQuery::MetadataField {
            export_name: "metadata".to_string(),
            path: FieldPath::parse("title"),
            original: "Old title".to_string(),
        },
        "New title",
    )
    .unwrap();
    doc.save().unwrap();

    let updated = std::fs::read_to_string(&path).unwrap();
    assert!(updated.contains(r#"title: "New title","#));
    assert!(updated.contains(r#"description: "A page about things","#));
}

#[test]
fn structured_data_patch_edits_one_block_entry() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(&dir);

    let mut doc = SourceDocument::load(&path).unwrap();
    doc.apply(
        &TargetQuery::StructuredData {
            component_id: "hero".to_string(),
            instance: None,
            path: FieldPath::parse("props.title"),
            original: "Welcome".to_string(),
        },
        "Welcome Home",
    )
    .unwrap();
    doc.save().unwrap();

    let updated = std::fs::read_to_string(&path).unwrap();
    assert!(updated.contains(r#"{ type: "hero", props: { title: "Welcome Home" } }"#));
}

#[test]
fn unknown_identity_leaves_file_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(&dir);

    let mut doc = SourceDocument::load(&path).unwrap();
    let err = doc
        .apply(
            &TargetQuery::Identity {
                edit_id: "00000000-0000-4000-8000-000000000000".to_string(),
                original: "Hello".to_string(),
            },
            "Hi",
        )
        .unwrap_err();
    assert!(matches!(err, PatchError::TargetNotFound(_)));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), PAGE);
}
