//! Service container for dependency injection
//!
//! Wires settings and the filesystem into the loader and pipeline.

use std::sync::Arc;

use crate::application::{ApplicationResult, Pipeline};
use crate::config::Settings;
use crate::infrastructure::loader::TreeLoader;
use crate::infrastructure::traits::{FileSystem, RealFileSystem};

/// Container holding the shared dependencies of all commands.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> Self {
        Self::with_deps(settings, Arc::new(RealFileSystem))
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(settings: Settings, fs: Arc<dyn FileSystem>) -> Self {
        let settings = Arc::new(settings);

        Self { settings, fs }
    }

    pub fn tree_loader(&self) -> TreeLoader {
        TreeLoader::new(Arc::clone(&self.fs))
    }

    /// Pipeline built from the container's settings.
    pub fn pipeline(&self) -> ApplicationResult<Pipeline> {
        Pipeline::from_settings(&self.settings)
    }
}
