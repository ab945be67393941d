//! Domain layer: the documentation tree and its construction
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod builder;
pub mod entities;
pub mod error;

pub use arena::{DocNode, DocTree, NodeData};
pub use builder::TreeBuilder;
pub use entities::*;
pub use error::{DomainError, DomainResult};
