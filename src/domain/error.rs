//! Domain-level errors (no external dependencies)

use generational_arena::Index;
use thiserror::Error;

/// Domain errors represent violations of the documentation tree structure.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid node: {0}")]
    InvalidNode(String),

    #[error("duplicate member `{name}` under `{parent}`")]
    DuplicateSibling { parent: String, name: String },

    #[error("node not found: {0:?}")]
    NodeNotFound(Index),

    #[error("tree already has a root: {0}")]
    RootExists(String),
}

/// Result type for tree operations.
pub type DomainResult<T> = Result<T, DomainError>;
