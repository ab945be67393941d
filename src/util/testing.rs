//! Test support: one-time tracing setup and small tree fixtures.

use std::env;
use std::sync::Once;

use tracing::{debug, info};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use crate::domain::{DocTree, NodeSpec, TreeBuilder};

static TEST_SETUP: Once = Once::new();

pub fn init_test_setup() {
    TEST_SETUP.call_once(|| {
        if env::var("RUST_LOG").is_err() {
            env::set_var("RUST_LOG", "docfilter=debug");
        }
        // global logging subscriber, used by all tracing log macros
        setup_test_logging();
        info!("Test Setup complete");
    });
}

fn setup_test_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_test_writer()
            .with_target(true)
            .with_thread_names(false)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(env_filter),
    );

    // Only set if we haven't already set a global subscriber
    if tracing::dispatcher::has_been_set() {
        debug!("Tracing subscriber already set");
    } else {
        subscriber.try_init().unwrap_or_else(|e| {
            eprintln!("Error: Failed to set up logging: {}", e);
        });
    }
}

/// Builds a tree from `spec`, panicking on invalid input.
pub fn tree_from(spec: &NodeSpec) -> DocTree {
    TreeBuilder::new()
        .build(spec)
        .unwrap_or_else(|e| panic!("invalid test tree: {e}"))
}

/// Module `m` mixing public, private, special and undocumented members.
///
/// ```text
/// m            "module doc"
/// ├── public   "doc"
/// ├── _helper  "doc"
/// ├── __all__  "doc"
/// ├── _cfg_    "doc"
/// ├── bare     (no docstring)
/// └── Widget   "doc"
///     ├── draw     "doc"
///     ├── _paint   "doc"
///     └── __init__ "doc"
/// ```
pub fn sample_module() -> NodeSpec {
    NodeSpec::module("m")
        .with_docstring("module doc")
        .with_children([
            NodeSpec::function("public").with_docstring("doc"),
            NodeSpec::function("_helper").with_docstring("doc"),
            NodeSpec::data("__all__").with_docstring("doc"),
            NodeSpec::data("_cfg_").with_docstring("doc"),
            NodeSpec::function("bare"),
            NodeSpec::class("Widget")
                .with_docstring("doc")
                .with_children([
                    NodeSpec::function("draw").with_docstring("doc"),
                    NodeSpec::function("_paint").with_docstring("doc"),
                    NodeSpec::function("__init__").with_docstring("doc"),
                ]),
        ])
}
