//! Tests for TreeLoader against the real filesystem

use std::path::PathBuf;

use tempfile::TempDir;

use docfilter::config::Settings;
use docfilter::domain::NodeKind;
use docfilter::infrastructure::di::ServiceContainer;
use docfilter::infrastructure::InfraError;

fn create_tree_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).expect("write tree file");
    path
}

#[test]
fn given_json_forest_when_loading_then_builds_trees_in_order() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let path = create_tree_file(
        &temp,
        "api.json",
        r#"{
  "modules": [
    {
      "name": "pkg",
      "docstring": "Package.",
      "children": [
        {"name": "Client", "kind": "class", "docstring": "A client.",
         "children": [{"name": "connect", "kind": "function"}]},
        {"name": "TIMEOUT", "kind": "data"}
      ]
    },
    {"name": "pkg_util"}
  ]
}"#,
    );
    let container = ServiceContainer::new(Settings::default());

    // Act
    let trees = container.tree_loader().load(&path).unwrap();

    // Assert
    assert_eq!(trees.len(), 2);
    let client = trees[0].find_path(&["pkg", "Client"]).unwrap();
    assert_eq!(trees[0].get_node(client).unwrap().data.kind, NodeKind::Class);
    assert_eq!(trees[0].child_names(client), vec!["connect"]);
    assert_eq!(
        trees[0].qualified_name(trees[0].find_path(&["pkg", "Client", "connect"]).unwrap()),
        Some("pkg.Client.connect".to_string())
    );
    assert_eq!(trees[1].len(), 1);
}

#[test]
fn given_duplicate_module_names_when_loading_then_fails() {
    let temp = TempDir::new().unwrap();
    let path = create_tree_file(
        &temp,
        "api.toml",
        r#"
[[modules]]
name = "pkg"

[[modules]]
name = "pkg"
"#,
    );
    let container = ServiceContainer::new(Settings::default());

    let result = container.tree_loader().load(&path);

    assert!(matches!(result, Err(InfraError::Application(_))));
}

#[test]
fn given_missing_file_when_loading_then_not_found() {
    let temp = TempDir::new().unwrap();
    let container = ServiceContainer::new(Settings::default());

    let err = container
        .tree_loader()
        .load(&temp.path().join("absent.json"))
        .unwrap_err();

    match err {
        InfraError::Io { source, .. } => {
            assert_eq!(source.kind(), std::io::ErrorKind::NotFound)
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn given_loaded_tree_when_running_pipeline_then_filters_and_places() {
    let temp = TempDir::new().unwrap();
    let path = create_tree_file(
        &temp,
        "api.json",
        r#"{"name": "pkg", "children": [{"name": "_private"}, {"name": "__all__"}, {"name": "api"}]}"#,
    );
    let container = ServiceContainer::new(Settings::default());

    let mut trees = container.tree_loader().load(&path).unwrap();
    let placements = container.pipeline().unwrap().run(&mut trees).unwrap();

    let root = trees[0].root().unwrap();
    assert_eq!(trees[0].child_names(root), vec!["api"]);
    assert_eq!(placements, vec![PathBuf::from("docs/pkg.md")]);
}
