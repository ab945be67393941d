//! Tree-walking interpreter for compiled filter expressions

use std::cmp::Ordering;
use std::fmt;

use generational_arena::Index;

use crate::application::expression::error::{ExpressionError, ExpressionResult};
use crate::application::expression::parser::{CompareOp, Expr, Literal};
use crate::domain::DocTree;

/// Per-node bindings visible to an expression.
#[derive(Debug, Clone, Copy)]
pub struct Scope<'a> {
    /// Bound as `name`
    pub name: &'a str,
    /// Bound as `node`
    pub node: Index,
    /// Outcome of the default-retention check, returned by `default()`
    pub default: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrMethod {
    StartsWith,
    EndsWith,
    Lower,
    Upper,
    Strip,
    IsUpper,
    IsLower,
}

impl StrMethod {
    fn lookup(name: &str) -> Option<Self> {
        let method = match name {
            "startswith" => StrMethod::StartsWith,
            "endswith" => StrMethod::EndsWith,
            "lower" => StrMethod::Lower,
            "upper" => StrMethod::Upper,
            "strip" => StrMethod::Strip,
            "isupper" => StrMethod::IsUpper,
            "islower" => StrMethod::IsLower,
            _ => return None,
        };
        Some(method)
    }

    fn name(&self) -> &'static str {
        match self {
            StrMethod::StartsWith => "startswith",
            StrMethod::EndsWith => "endswith",
            StrMethod::Lower => "lower",
            StrMethod::Upper => "upper",
            StrMethod::Strip => "strip",
            StrMethod::IsUpper => "isupper",
            StrMethod::IsLower => "islower",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Function {
    Default,
    StrMethod { receiver: String, method: StrMethod },
}

/// Runtime value of an expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Str(String),
    None,
    Node(Index),
    Function(Function),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Str(_) => "str",
            Value::None => "NoneType",
            Value::Node(_) => "node",
            Value::Function(_) => "function",
        }
    }

    /// Python truthiness: `False`, `None`, `0` and `""` are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Str(s) => !s.is_empty(),
            Value::None => false,
            Value::Node(_) | Value::Function(_) => true,
        }
    }

    fn as_number(&self) -> Option<i64> {
        match self {
            Value::Bool(b) => Some(i64::from(*b)),
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(true) => f.write_str("True"),
            Value::Bool(false) => f.write_str("False"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Str(s) => write!(f, "{s:?}"),
            Value::None => f.write_str("None"),
            Value::Node(idx) => write!(f, "<node {idx:?}>"),
            Value::Function(Function::Default) => f.write_str("<function default>"),
            Value::Function(Function::StrMethod { method, .. }) => {
                write!(f, "<method str.{}>", method.name())
            }
        }
    }
}

pub(crate) struct Evaluator<'a> {
    source: &'a str,
    tree: &'a DocTree,
    scope: &'a Scope<'a>,
}

impl<'a> Evaluator<'a> {
    pub(crate) fn new(source: &'a str, tree: &'a DocTree, scope: &'a Scope<'a>) -> Self {
        Self {
            source,
            tree,
            scope,
        }
    }

    pub(crate) fn eval(&self, expr: &Expr) -> ExpressionResult<Value> {
        match expr {
            Expr::Literal(literal) => Ok(match literal {
                Literal::Bool(b) => Value::Bool(*b),
                Literal::Int(i) => Value::Int(*i),
                Literal::Str(s) => Value::Str(s.clone()),
                Literal::None => Value::None,
            }),
            Expr::Name(name) => self.lookup(name),
            Expr::Attribute { target, name } => {
                let target = self.eval(target)?;
                self.attribute(target, name)
            }
            Expr::Call { callee, args } => {
                let callee = self.eval(callee)?;
                let args = args
                    .iter()
                    .map(|arg| self.eval(arg))
                    .collect::<ExpressionResult<Vec<_>>>()?;
                self.call(callee, args)
            }
            Expr::Not(inner) => Ok(Value::Bool(!self.eval(inner)?.is_truthy())),
            Expr::And(left, right) => {
                let left = self.eval(left)?;
                if !left.is_truthy() {
                    return Ok(left);
                }
                self.eval(right)
            }
            Expr::Or(left, right) => {
                let left = self.eval(left)?;
                if left.is_truthy() {
                    return Ok(left);
                }
                self.eval(right)
            }
            Expr::Compare { op, left, right } => {
                let left = self.eval(left)?;
                let right = self.eval(right)?;
                self.compare(*op, &left, &right).map(Value::Bool)
            }
        }
    }

    fn lookup(&self, name: &str) -> ExpressionResult<Value> {
        match name {
            "name" => Ok(Value::Str(self.scope.name.to_string())),
            "node" => Ok(Value::Node(self.scope.node)),
            "default" => Ok(Value::Function(Function::Default)),
            _ => Err(ExpressionError::UndefinedName {
                expression: self.source.to_string(),
                name: name.to_string(),
            }),
        }
    }

    fn attribute(&self, target: Value, attribute: &str) -> ExpressionResult<Value> {
        match target {
            Value::Node(idx) => {
                let node = self
                    .tree
                    .get_node(idx)
                    .ok_or_else(|| self.type_error("node is no longer part of the tree"))?;
                match attribute {
                    "name" => Ok(Value::Str(node.data.name.clone())),
                    "docstring" => Ok(node
                        .data
                        .docstring
                        .clone()
                        .map(Value::Str)
                        .unwrap_or(Value::None)),
                    "kind" => Ok(Value::Str(node.data.kind.as_str().to_string())),
                    "parent" => Ok(node.parent.map(Value::Node).unwrap_or(Value::None)),
                    "is_root" => Ok(Value::Bool(node.is_root())),
                    "children" => Ok(Value::Int(node.children.len() as i64)),
                    _ => Err(self.unknown_attribute(attribute)),
                }
            }
            Value::Str(receiver) => match StrMethod::lookup(attribute) {
                Some(method) => Ok(Value::Function(Function::StrMethod { receiver, method })),
                None => Err(self.unknown_attribute(attribute)),
            },
            other => Err(self.type_error(format!(
                "'{}' object has no attribute '{attribute}'",
                other.type_name()
            ))),
        }
    }

    fn call(&self, callee: Value, args: Vec<Value>) -> ExpressionResult<Value> {
        let Value::Function(function) = callee else {
            return Err(self.type_error(format!(
                "'{}' object is not callable",
                callee.type_name()
            )));
        };

        match function {
            Function::Default => {
                self.expect_arity("default", 0, &args)?;
                Ok(Value::Bool(self.scope.default))
            }
            Function::StrMethod { receiver, method } => match method {
                StrMethod::StartsWith | StrMethod::EndsWith => {
                    self.expect_arity(method.name(), 1, &args)?;
                    let Value::Str(affix) = &args[0] else {
                        return Err(self.type_error(format!(
                            "{}() argument must be str, not {}",
                            method.name(),
                            args[0].type_name()
                        )));
                    };
                    let matched = if method == StrMethod::StartsWith {
                        receiver.starts_with(affix.as_str())
                    } else {
                        receiver.ends_with(affix.as_str())
                    };
                    Ok(Value::Bool(matched))
                }
                StrMethod::Lower => {
                    self.expect_arity(method.name(), 0, &args)?;
                    Ok(Value::Str(receiver.to_lowercase()))
                }
                StrMethod::Upper => {
                    self.expect_arity(method.name(), 0, &args)?;
                    Ok(Value::Str(receiver.to_uppercase()))
                }
                StrMethod::Strip => {
                    self.expect_arity(method.name(), 0, &args)?;
                    Ok(Value::Str(receiver.trim().to_string()))
                }
                StrMethod::IsUpper | StrMethod::IsLower => {
                    self.expect_arity(method.name(), 0, &args)?;
                    let cased = receiver
                        .chars()
                        .any(|c| c.is_uppercase() || c.is_lowercase());
                    let result = if method == StrMethod::IsUpper {
                        cased && !receiver.chars().any(char::is_lowercase)
                    } else {
                        cased && !receiver.chars().any(char::is_uppercase)
                    };
                    Ok(Value::Bool(result))
                }
            },
        }
    }

    fn compare(&self, op: CompareOp, left: &Value, right: &Value) -> ExpressionResult<bool> {
        match op {
            CompareOp::Eq => Ok(values_equal(left, right)),
            CompareOp::Ne => Ok(!values_equal(left, right)),
            CompareOp::In | CompareOp::NotIn => {
                let contained = match (left, right) {
                    (Value::Str(needle), Value::Str(haystack)) => {
                        haystack.contains(needle.as_str())
                    }
                    (_, Value::Str(_)) => {
                        return Err(self.type_error(format!(
                            "'in <string>' requires string as left operand, not {}",
                            left.type_name()
                        )))
                    }
                    _ => {
                        return Err(self.type_error(format!(
                            "argument of type '{}' is not iterable",
                            right.type_name()
                        )))
                    }
                };
                Ok(contained == (op == CompareOp::In))
            }
            CompareOp::Lt | CompareOp::Le | CompareOp::Gt | CompareOp::Ge => {
                let ordering = match (left, right) {
                    (Value::Str(l), Value::Str(r)) => l.cmp(r),
                    _ => match (left.as_number(), right.as_number()) {
                        (Some(l), Some(r)) => l.cmp(&r),
                        _ => {
                            return Err(self.type_error(format!(
                                "'{}' not supported between instances of '{}' and '{}'",
                                op.symbol(),
                                left.type_name(),
                                right.type_name()
                            )))
                        }
                    },
                };
                Ok(match op {
                    CompareOp::Lt => ordering == Ordering::Less,
                    CompareOp::Le => ordering != Ordering::Greater,
                    CompareOp::Gt => ordering == Ordering::Greater,
                    _ => ordering != Ordering::Less,
                })
            }
        }
    }

    fn expect_arity(&self, function: &str, expected: usize, args: &[Value]) -> ExpressionResult<()> {
        if args.len() == expected {
            return Ok(());
        }
        Err(self.type_error(format!(
            "{function}() takes {expected} argument(s) ({} given)",
            args.len()
        )))
    }

    fn type_error(&self, message: impl Into<String>) -> ExpressionError {
        ExpressionError::Type {
            expression: self.source.to_string(),
            message: message.into(),
        }
    }

    fn unknown_attribute(&self, attribute: &str) -> ExpressionError {
        ExpressionError::UnknownAttribute {
            expression: self.source.to_string(),
            attribute: attribute.to_string(),
        }
    }
}

fn values_equal(left: &Value, right: &Value) -> bool {
    match (left.as_number(), right.as_number()) {
        (Some(l), Some(r)) => l == r,
        _ => left == right,
    }
}
