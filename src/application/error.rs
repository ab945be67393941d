//! Application-level errors (wraps domain and expression errors)

use thiserror::Error;

use crate::application::expression::ExpressionError;
use crate::domain::DomainError;

/// Application errors wrap domain errors and add pipeline-level context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    /// Malformed or unevaluable filter expression.
    #[error("{0}")]
    Expression(#[from] ExpressionError),

    #[error("config error: {message}")]
    Config { message: String },

    #[error("render failed: {message}")]
    Render { message: String },
}

impl ApplicationError {
    /// True for errors caused by user configuration rather than input data.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            ApplicationError::Expression(_) | ApplicationError::Config { .. }
        )
    }
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
