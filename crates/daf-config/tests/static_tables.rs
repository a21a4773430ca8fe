use std::fs;

use daf_config::{
    ConfigError, EXPLANATION_REFS_FILE, SEGMENT_COUNTS_FILE, SPLIT_MARKERS_FILE,
    load_static_tables,
};
use pretty_assertions::assert_eq;

#[test]
fn missing_directory_contents_yield_empty_tables() {
    let dir = tempfile::tempdir().unwrap();
    let tables = load_static_tables(dir.path()).unwrap();
    assert!(tables.segment_counts.is_empty());
    assert!(tables.span_refs.is_empty());
    assert!(tables.merge_pairs.is_empty());
}

#[test]
fn present_tables_are_loaded() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join(SEGMENT_COUNTS_FILE), r#"{"Berakhot 2a": 8}"#).unwrap();
    fs::write(
        dir.path().join(SPLIT_MARKERS_FILE),
        r#"{"Berakhot 2a:1": ["גמ׳"]}"#,
    )
    .unwrap();
    fs::write(dir.path().join(EXPLANATION_REFS_FILE), r#"["Siddur 1"]"#).unwrap();

    let tables = load_static_tables(dir.path()).unwrap();
    assert_eq!(tables.segment_counts.get("Berakhot 2a"), Some(8));
    assert_eq!(tables.split_markers["Berakhot 2a:1"], vec!["גמ׳".to_string()]);
    assert!(tables.explanation_refs.contains("Siddur 1"));
}

#[test]
fn malformed_table_names_the_file() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join(SEGMENT_COUNTS_FILE), r#"{"Berakhot 2a": "eight"}"#).unwrap();

    let err = load_static_tables(dir.path()).unwrap_err();
    match err {
        ConfigError::Table { path, .. } => assert!(path.ends_with(SEGMENT_COUNTS_FILE)),
        other => panic!("unexpected error: {other}"),
    }
}
