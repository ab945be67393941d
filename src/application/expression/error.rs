//! Errors raised while compiling or evaluating a filter expression

use thiserror::Error;

/// A malformed or unevaluable filter expression.
///
/// Every variant carries the offending expression text so the error can be
/// reported without further context.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExpressionError {
    #[error("invalid filter expression {expression:?}: {message} (at offset {position})")]
    Syntax {
        expression: String,
        position: usize,
        message: String,
    },

    #[error("undefined name `{name}` in filter expression {expression:?} (available: name, node, default)")]
    UndefinedName { expression: String, name: String },

    #[error("unknown attribute `{attribute}` in filter expression {expression:?}")]
    UnknownAttribute {
        expression: String,
        attribute: String,
    },

    #[error("type error in filter expression {expression:?}: {message}")]
    Type { expression: String, message: String },
}

impl ExpressionError {
    /// Source text of the expression that failed.
    pub fn expression(&self) -> &str {
        match self {
            ExpressionError::Syntax { expression, .. }
            | ExpressionError::UndefinedName { expression, .. }
            | ExpressionError::UnknownAttribute { expression, .. }
            | ExpressionError::Type { expression, .. } => expression,
        }
    }
}

pub type ExpressionResult<T> = Result<T, ExpressionError>;
