//! Member filter: removes module and class members from a documentation tree
//!
//! Each node is checked twice, independently:
//!
//! 1. if an expression is configured and evaluates falsy, the node is removed;
//! 2. if the node is not the root and fails the default-retention check, it
//!    is removed as well.
//!
//! The checks are additive. An expression returning `True` does not keep a
//! node the default check rejects; expressions receive `default` so they can
//! reproduce or refine the default policy, e.g.
//!
//! ```toml
//! [[processors]]
//! type = "filter"
//! expression = "not name.startswith('_') and default()"
//! ```
//!
//! To keep members the default check drops, relax the matching
//! `exclude_*`/`documented_only` option instead.

use generational_arena::Index;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::application::error::ApplicationResult;
use crate::application::expression::{Expression, Scope};
use crate::application::processor::Processor;
use crate::domain::{DocTree, NodeData};

/// Reserved names dropped when `exclude_special` is set.
pub const SPECIAL_NAMES: [&str; 4] = ["__path__", "__annotations__", "__name__", "__all__"];

/// Options of the `filter` processor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Predicate evaluated per member; falsy result removes the member
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,
    /// Drop members without a docstring
    pub documented_only: bool,
    /// Drop `_private` members (names ending in `_` are kept)
    pub exclude_private: bool,
    /// Drop the reserved names in [`SPECIAL_NAMES`]
    pub exclude_special: bool,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            expression: None,
            documented_only: false,
            exclude_private: true,
            exclude_special: true,
        }
    }
}

impl FilterConfig {
    /// Configured expression, ignoring blank strings.
    pub fn expression(&self) -> Option<&str> {
        self.expression.as_deref().filter(|e| !e.trim().is_empty())
    }

    /// Default-retention check, short-circuiting at the first failing rule.
    pub fn default_retain(&self, data: &NodeData) -> bool {
        if self.documented_only && !data.has_docstring() {
            return false;
        }
        if self.exclude_private && is_private(&data.name) {
            return false;
        }
        if self.exclude_special && SPECIAL_NAMES.contains(&data.name.as_str()) {
            return false;
        }
        true
    }

    /// Compiles the configured expression, if any.
    pub fn compile(&self) -> ApplicationResult<Option<Expression>> {
        Ok(self.expression().map(Expression::compile).transpose()?)
    }
}

/// Leading underscore without a trailing one; `_reserved_` style names are public.
fn is_private(name: &str) -> bool {
    name.starts_with('_') && !name.ends_with('_')
}

/// Outcome of one filter pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterReport {
    /// Nodes the decision procedure ran on
    pub visited: usize,
    /// Nodes removed because the expression was falsy
    pub removed_by_expression: usize,
    /// Nodes removed by the default-retention check
    pub removed_by_default: usize,
    /// Nodes freed in total, including pruned descendants
    pub pruned: usize,
}

impl FilterReport {
    pub fn removed(&self) -> usize {
        self.removed_by_expression + self.removed_by_default
    }
}

/// Filters `tree` in place and hands it back.
///
/// Syntax errors and unknown names in the expression are reported before any
/// node is touched. An evaluation error on a concrete node aborts the pass at
/// that node: nodes visited earlier stay removed, the failing node and the
/// rest of the tree are left as they were.
pub fn process<'t>(config: &FilterConfig, tree: &'t mut DocTree) -> ApplicationResult<&'t mut DocTree> {
    let expression = config.compile()?;
    filter_tree(config, expression.as_ref(), tree)?;
    Ok(tree)
}

/// Runs the per-node decision procedure over every reachable node.
#[instrument(level = "debug", skip_all, fields(expression = expression.map(|e| e.source())))]
pub fn filter_tree(
    config: &FilterConfig,
    expression: Option<&Expression>,
    tree: &mut DocTree,
) -> ApplicationResult<FilterReport> {
    let mut report = FilterReport::default();
    tree.visit_mut(|tree, idx| process_member(config, expression, tree, idx, &mut report))?;
    debug!(?report, "filter pass complete");
    Ok(report)
}

fn process_member(
    config: &FilterConfig,
    expression: Option<&Expression>,
    tree: &mut DocTree,
    idx: Index,
    report: &mut FilterReport,
) -> ApplicationResult<()> {
    let Some(node) = tree.get_node(idx) else {
        return Ok(());
    };
    report.visited += 1;
    let retain = config.default_retain(&node.data);
    let has_parent = node.parent.is_some();

    if let Some(expression) = expression {
        let scope = Scope {
            name: &node.data.name,
            node: idx,
            default: retain,
        };
        if !expression.evaluate(tree, &scope)? {
            debug!(member = %qualified(tree, idx), "removed by expression");
            report.pruned += tree.remove(idx)?;
            report.removed_by_expression += 1;
            return Ok(());
        }
    }

    if has_parent && !retain {
        debug!(member = %qualified(tree, idx), "removed by default check");
        report.pruned += tree.remove(idx)?;
        report.removed_by_default += 1;
    }
    Ok(())
}

fn qualified(tree: &DocTree, idx: Index) -> String {
    tree.qualified_name(idx).unwrap_or_default()
}

/// The `filter` processor.
#[derive(Debug, Clone)]
pub struct FilterProcessor {
    config: FilterConfig,
    expression: Option<Expression>,
}

impl FilterProcessor {
    /// Fails when the configured expression does not compile.
    pub fn new(config: FilterConfig) -> ApplicationResult<Self> {
        let expression = config.compile()?;
        Ok(Self { config, expression })
    }

    /// Filters `tree` and reports what was removed.
    pub fn run(&self, tree: &mut DocTree) -> ApplicationResult<FilterReport> {
        filter_tree(&self.config, self.expression.as_ref(), tree)
    }
}

impl Processor for FilterProcessor {
    fn name(&self) -> &str {
        "filter"
    }

    fn process(&self, tree: &mut DocTree) -> ApplicationResult<()> {
        let module = tree
            .root_node()
            .map(|n| n.data.name.clone())
            .unwrap_or_default();
        let report = self.run(tree)?;
        info!(
            module = %module,
            visited = report.visited,
            removed = report.removed(),
            pruned = report.pruned,
            "filtered members"
        );
        Ok(())
    }
}
