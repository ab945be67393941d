//! Sandboxed predicate language for the filter processor
//!
//! Expressions are Python-flavoured boolean predicates such as
//! `not name.startswith('_') and default()`. Only three bindings are visible:
//! `name` (the member name), `node` (the member itself) and `default`
//! (callable returning the default-retention verdict). Nothing else from the
//! process is reachable.

mod error;
mod eval;
mod lexer;
mod parser;

use std::fmt;
use std::str::FromStr;

use tracing::instrument;

use crate::domain::DocTree;

pub use error::{ExpressionError, ExpressionResult};
pub use eval::{Function, Scope, StrMethod, Value};
pub use parser::{CompareOp, Expr, Literal};

use eval::Evaluator;
use lexer::tokenize;
use parser::Parser;

/// Names an expression may reference.
pub const BINDINGS: [&str; 3] = ["name", "node", "default"];

/// A parsed, name-checked filter expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expression {
    source: String,
    ast: Expr,
}

impl Expression {
    /// Parses `source` and resolves every identifier against [`BINDINGS`].
    #[instrument(level = "debug")]
    pub fn compile(source: &str) -> ExpressionResult<Self> {
        let tokens = tokenize(source)?;
        let ast = Parser::new(source, tokens).parse()?;

        if let Some(name) = ast.names().into_iter().find(|n| !BINDINGS.contains(n)) {
            return Err(ExpressionError::UndefinedName {
                expression: source.to_string(),
                name: name.to_string(),
            });
        }

        Ok(Self {
            source: source.to_string(),
            ast,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Evaluates the expression for one node and returns the raw value.
    pub fn evaluate_value(&self, tree: &DocTree, scope: &Scope<'_>) -> ExpressionResult<Value> {
        Evaluator::new(&self.source, tree, scope).eval(&self.ast)
    }

    /// Evaluates the expression for one node and returns its truthiness.
    pub fn evaluate(&self, tree: &DocTree, scope: &Scope<'_>) -> ExpressionResult<bool> {
        self.evaluate_value(tree, scope).map(|v| v.is_truthy())
    }
}

impl FromStr for Expression {
    type Err = ExpressionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::compile(s)
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{NodeData, NodeKind};
    use generational_arena::Index;
    use rstest::rstest;

    struct Fixture {
        tree: DocTree,
        helper: Index,
        class: Index,
    }

    fn fixture() -> Fixture {
        let mut tree = DocTree::new();
        let m = tree
            .insert_node(
                NodeData::new("m", NodeKind::Module).with_docstring("x"),
                None,
            )
            .unwrap();
        let helper = tree
            .insert_node(NodeData::new("_helper", NodeKind::Function), Some(m))
            .unwrap();
        let class = tree
            .insert_node(
                NodeData::new("Widget", NodeKind::Class).with_docstring("A widget."),
                Some(m),
            )
            .unwrap();
        Fixture {
            tree,
            helper,
            class,
        }
    }

    fn eval_on(source: &str, fx: &Fixture, idx: Index, default: bool) -> ExpressionResult<Value> {
        let name = fx.tree.get_node(idx).unwrap().data.name.clone();
        let scope = Scope {
            name: &name,
            node: idx,
            default,
        };
        Expression::compile(source)?.evaluate_value(&fx.tree, &scope)
    }

    #[rstest]
    #[case("not name.startswith('_') and default()", false)]
    #[case("name.startswith('_')", true)]
    #[case("name.endswith('_')", false)]
    #[case("name == '_helper'", true)]
    #[case("name != '_helper'", false)]
    #[case("'help' in name", true)]
    #[case("'help' not in name", false)]
    #[case("node.docstring", false)]
    #[case("node.docstring == None", true)]
    #[case("node.kind == 'function'", true)]
    #[case("node.parent.name == 'm'", true)]
    #[case("node.parent.is_root", true)]
    #[case("node.is_root", false)]
    #[case("node.children", false)]
    #[case("default", true)]
    #[case("default()", true)]
    #[case("not default()", false)]
    #[case("name.upper() == '_HELPER'", true)]
    #[case("name.islower()", true)]
    #[case("True == 1", true)]
    #[case("2 > 1 and 'a' < 'b'", true)]
    #[case("(False or None) or ''", false)]
    fn given_expression_when_evaluating_on_helper_then_matches_python_semantics(
        #[case] source: &str,
        #[case] expected: bool,
    ) {
        let fx = fixture();
        let value = eval_on(source, &fx, fx.helper, true).unwrap();
        assert_eq!(value.is_truthy(), expected, "{source}");
    }

    #[test]
    fn given_or_expression_when_evaluating_then_returns_deciding_operand() {
        let fx = fixture();
        let value = eval_on("node.docstring or name", &fx, fx.class, true).unwrap();
        assert_eq!(value, Value::Str("A widget.".into()));
    }

    #[test]
    fn given_default_false_when_calling_default_then_returns_false() {
        let fx = fixture();
        let value = eval_on("default()", &fx, fx.class, false).unwrap();
        assert_eq!(value, Value::Bool(false));
    }

    #[test]
    fn given_unknown_name_when_compiling_then_reports_undefined_name() {
        let err = Expression::compile("name == os").unwrap_err();
        assert_eq!(
            err,
            ExpressionError::UndefinedName {
                expression: "name == os".into(),
                name: "os".into()
            }
        );
    }

    #[test]
    fn given_python_builtin_when_compiling_then_rejected() {
        assert!(matches!(
            Expression::compile("len(name) > 3"),
            Err(ExpressionError::UndefinedName { .. })
        ));
    }

    #[rstest]
    #[case("name.startswith(1)")]
    #[case("name < 1")]
    #[case("1 in name")]
    #[case("'a' in 1")]
    #[case("name()")]
    #[case("default(1)")]
    #[case("node.parent.parent.name")]
    fn given_ill_typed_expression_when_evaluating_then_type_error(#[case] source: &str) {
        let fx = fixture();
        let err = eval_on(source, &fx, fx.helper, true).unwrap_err();
        assert!(matches!(err, ExpressionError::Type { .. }), "{source}: {err}");
        assert_eq!(err.expression(), source);
    }

    #[test]
    fn given_unknown_attribute_when_evaluating_then_reports_attribute() {
        let fx = fixture();
        let err = eval_on("node.__class__", &fx, fx.helper, true).unwrap_err();
        assert!(matches!(
            err,
            ExpressionError::UnknownAttribute { ref attribute, .. } if attribute == "__class__"
        ));
    }

    #[test]
    fn given_expression_when_displayed_then_shows_source() {
        let expr: Expression = "default()".parse().unwrap();
        assert_eq!(expr.to_string(), "default()");
        assert_eq!(expr.source(), "default()");
    }
}
