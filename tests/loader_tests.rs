mod common;

use common::go_project::{GoProject, MAIN_HTTP};
use matte::project::{load_project, SCRATCH_DIR};
use matte::MatteError;

#[test]
fn test_packages_load_breadth_first() {
    let project = GoProject::new("example.com/tree", MAIN_HTTP);
    project.write("b/b.go", "package b\n");
    project.write("a/a.go", "package a\n");
    project.write("a/deep/deep.go", "package deep\n");
    project.write("b/inner/inner.go", "package inner\n");
    project.write("a/a_test.go", "package a_test\n\nfunc broken( {\n");

    let loaded = load_project(project.root(), SCRATCH_DIR).unwrap();
    let paths: Vec<&str> = loaded
        .packages
        .iter()
        .map(|p| p.import_path.as_str())
        .collect();
    assert_eq!(
        paths,
        vec![
            "example.com/tree",
            "example.com/tree/a",
            "example.com/tree/b",
            "example.com/tree/a/deep",
            "example.com/tree/b/inner",
        ]
    );
    assert_eq!(loaded.packages[0].name, "main");
    assert_eq!(loaded.packages[1].files.len(), 1);
}

#[test]
fn test_tool_directories_are_skipped() {
    let project = GoProject::new("example.com/skips", MAIN_HTTP);
    for dir in [".git", "_build", "testdata", SCRATCH_DIR] {
        project.write(&format!("{dir}/x.go"), "this is not go\n");
    }
    project.write("api/api.go", "package api\n");

    let loaded = load_project(project.root(), SCRATCH_DIR).unwrap();
    let paths: Vec<&str> = loaded
        .packages
        .iter()
        .map(|p| p.import_path.as_str())
        .collect();
    assert_eq!(paths, vec!["example.com/skips", "example.com/skips/api"]);
}

#[test]
fn test_first_error_in_traversal_order_wins() {
    let project = GoProject::new("example.com/errs", MAIN_HTTP);
    project.write("a/nested/bad.go", "package nested\n\nfunc one( {\n");
    project.write("z/bad.go", "package z\n\nfunc two( {\n");

    let err = load_project(project.root(), SCRATCH_DIR).unwrap_err();
    match err {
        MatteError::Parse { file, .. } => assert!(file.ends_with("z/bad.go")),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_mixed_package_names_are_rejected() {
    let project = GoProject::new("example.com/mixed", MAIN_HTTP);
    project.write("api/a.go", "package api\n");
    project.write("api/b.go", "package other\n");
    let err = load_project(project.root(), SCRATCH_DIR).unwrap_err();
    assert!(matches!(err, MatteError::Parse { message, .. } if message.contains("other")));
}

#[test]
fn test_missing_manifest() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_project(dir.path(), SCRATCH_DIR).unwrap_err();
    assert!(matches!(err, MatteError::Configuration(m) if m.contains("go.mod")));
}
