//! docfilter: prune extracted API documentation trees
//!
//! A documentation tree (one per module) is filtered in place by the
//! [`application::filter`] engine, then handed to a renderer that places the
//! surviving modules. Trees are loaded from JSON or TOML documents.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod tree_traits;
pub mod util;
