//! Loading extracted documentation trees from JSON or TOML files.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::application::ApplicationError;
use crate::domain::{DocTree, TreeBuilder, TreeDocument};
use crate::infrastructure::error::{InfraError, InfraResult};
use crate::infrastructure::traits::FileSystem;

/// Serialization format of a tree file, chosen by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeFormat {
    Json,
    Toml,
}

impl TreeFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
            "json" => Some(TreeFormat::Json),
            "toml" => Some(TreeFormat::Toml),
            _ => None,
        }
    }

    pub fn parse(&self, content: &str) -> Result<TreeDocument, String> {
        match self {
            TreeFormat::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
            TreeFormat::Toml => toml::from_str(content).map_err(|e| e.to_string()),
        }
    }
}

/// Reads tree documents through a [`FileSystem`] and builds one tree per module.
pub struct TreeLoader {
    fs: Arc<dyn FileSystem>,
}

impl TreeLoader {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    /// Parse the document at `path` without building trees.
    #[instrument(level = "debug", skip(self))]
    pub fn read_document(&self, path: &Path) -> InfraResult<TreeDocument> {
        let format = TreeFormat::from_path(path).ok_or_else(|| {
            InfraError::parse(path, "unsupported tree format (expected .json or .toml)")
        })?;

        if !self.fs.exists(path) {
            return Err(InfraError::io(
                format!("read tree {}", path.display()),
                std::io::Error::new(std::io::ErrorKind::NotFound, "file not found"),
            ));
        }
        let content = self
            .fs
            .read_to_string(path)
            .map_err(|e| InfraError::io(format!("read tree {}", path.display()), e))?;

        format.parse(&content).map_err(|e| InfraError::parse(path, e))
    }

    /// Load and build all module trees from `path`.
    #[instrument(level = "debug", skip(self))]
    pub fn load(&self, path: &Path) -> InfraResult<Vec<DocTree>> {
        let document = self.read_document(path)?;
        let mut builder = TreeBuilder::new();
        let trees = builder
            .build_document(&document)
            .map_err(ApplicationError::from)?;
        debug!(
            modules = trees.len(),
            nodes = builder.nodes_built(),
            "loaded documentation trees"
        );
        Ok(trees)
    }
}
