//! Integration tests for the processor/renderer pipeline.

use std::path::PathBuf;

use docfilter::application::registry::{ProcessorSpec, RendererSpec};
use docfilter::application::{FilterConfig, MkDocsConfig, Pipeline};
use docfilter::config::Settings;
use docfilter::domain::{DocTree, NodeSpec};
use docfilter::util::testing::{init_test_setup, tree_from};

fn settings(processors: Vec<FilterConfig>) -> Settings {
    Settings {
        processors: processors.into_iter().map(ProcessorSpec::Filter).collect(),
        renderer: RendererSpec::Mkdocs(MkDocsConfig {
            output_directory: PathBuf::from("site/api"),
        }),
    }
}

fn forest() -> Vec<DocTree> {
    vec![
        tree_from(
            &NodeSpec::module("alpha")
                .with_docstring("a")
                .with_children([NodeSpec::function("run"), NodeSpec::function("_impl")]),
        ),
        tree_from(&NodeSpec::module("beta").with_docstring("b")),
        tree_from(&NodeSpec::module("_gamma")),
    ]
}

#[test]
fn given_default_settings_when_running_then_places_every_module() {
    init_test_setup();
    let pipeline = Pipeline::from_settings(&settings(vec![FilterConfig::default()])).unwrap();
    let mut trees = forest();

    let placements = pipeline.run(&mut trees).unwrap();

    assert_eq!(
        placements,
        vec![
            PathBuf::from("site/api/alpha.md"),
            PathBuf::from("site/api/beta.md"),
            PathBuf::from("site/api/_gamma.md"),
        ]
    );
    assert_eq!(trees[0].len(), 2);
}

#[test]
fn given_expression_rejecting_module_when_running_then_module_not_placed() {
    let pipeline = Pipeline::from_settings(&settings(vec![FilterConfig {
        expression: Some("name != 'beta'".into()),
        ..FilterConfig::default()
    }]))
    .unwrap();
    let mut trees = forest();

    let placements = pipeline.run(&mut trees).unwrap();

    assert!(trees[1].is_empty());
    assert_eq!(
        placements,
        vec![
            PathBuf::from("site/api/alpha.md"),
            PathBuf::from("site/api/_gamma.md"),
        ]
    );
}

#[test]
fn given_chained_filters_when_running_then_applied_in_order() {
    let pipeline = Pipeline::from_settings(&settings(vec![
        FilterConfig {
            exclude_private: false,
            ..FilterConfig::default()
        },
        FilterConfig {
            documented_only: true,
            ..FilterConfig::default()
        },
    ]))
    .unwrap();
    let mut trees = forest();

    pipeline.process(&mut trees).unwrap();

    assert_eq!(pipeline.processor_names(), vec!["filter", "filter"]);
    let alpha = trees[0].root().unwrap();
    assert!(trees[0].child_names(alpha).is_empty());
}

#[test]
fn given_no_processors_when_running_then_trees_untouched() {
    let pipeline = Pipeline::from_settings(&settings(vec![])).unwrap();
    let mut trees = forest();

    let placements = pipeline.run(&mut trees).unwrap();

    assert_eq!(placements.len(), 3);
    assert_eq!(trees[0].len(), 3);
}

#[test]
fn given_invalid_expression_when_building_pipeline_then_fails() {
    let result = Pipeline::from_settings(&settings(vec![FilterConfig {
        expression: Some("name +".into()),
        ..FilterConfig::default()
    }]));
    assert!(result.is_err());
}
